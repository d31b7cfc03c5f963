use sea_orm::entity::prelude::*;

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel)]
#[sea_orm(table_name = "users")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,

    #[sea_orm(unique)]
    pub username: String,

    #[sea_orm(unique)]
    pub email: String,

    /// Argon2id password hash
    pub password_hash: String,

    pub role: String,

    pub profile_picture: Option<String>,

    pub created_at: String,

    pub updated_at: String,

    /// Set when the account is soft-deleted.
    pub deleted_at: Option<String>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(has_many = "super::anime_list_entries::Entity")]
    AnimeListEntries,
}

impl Related<super::anime_list_entries::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::AnimeListEntries.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
