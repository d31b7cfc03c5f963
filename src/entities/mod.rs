pub mod prelude;

pub mod anime_cache;
pub mod anime_list_entries;
pub mod users;
pub mod watch_providers;
