pub mod token;
pub use token::{Claims, SessionTokens};

pub mod anime_service;
pub mod anime_service_impl;
pub use anime_service::{AnimeDetailsView, AnimeError, AnimeService, Listing};
pub use anime_service_impl::SeaOrmAnimeService;

pub mod auth_service;
pub mod auth_service_impl;
pub use auth_service::{AuthError, AuthService, LoginResult, SignupRequest};
pub use auth_service_impl::SeaOrmAuthService;

pub mod list_service;
pub mod list_service_impl;
pub use list_service::{AddOutcome, ListError, ListService};
pub use list_service_impl::SeaOrmListService;

pub mod provider_service;
pub mod provider_service_impl;
pub use provider_service::{ProviderError, ProviderService};
pub use provider_service_impl::SeaOrmProviderService;

pub mod profile_service;
pub mod profile_service_impl;
pub use profile_service::{ProfileError, ProfileService, ProfileUpdate};
pub use profile_service_impl::SeaOrmProfileService;
