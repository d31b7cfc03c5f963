pub use super::anime_cache::Entity as AnimeCache;
pub use super::anime_list_entries::Entity as AnimeListEntries;
pub use super::users::Entity as Users;
pub use super::watch_providers::Entity as WatchProviders;
