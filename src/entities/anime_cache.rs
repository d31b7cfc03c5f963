use sea_orm::entity::prelude::*;

/// Reduced projection of a catalog record, keyed by the catalog's own id.
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel)]
#[sea_orm(table_name = "anime_cache")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: i32,
    pub title: String,
    pub cover_image: Option<String>,
    pub format: Option<String>,
    /// `None` means the catalog does not know the count.
    pub total_episodes: Option<i32>,
    pub created_at: String,
    pub updated_at: String,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}
