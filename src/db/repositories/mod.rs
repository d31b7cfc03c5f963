pub mod anime_cache;
pub mod anime_list;
pub mod provider;
pub mod user;
