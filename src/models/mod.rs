pub mod anime;
pub mod list;
pub mod provider;
