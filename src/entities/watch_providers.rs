use sea_orm::entity::prelude::*;

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel)]
#[sea_orm(table_name = "watch_providers")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    /// Catalog id; independent of whether the cache has the title.
    pub anime_id: i32,
    pub provider_name: String,
    pub provider_url: String,
    /// ISO 3166-1 alpha-2 country code, upper-case.
    pub region: Option<String>,
    pub is_sub: bool,
    pub is_dub: bool,
    pub last_updated: String,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}
