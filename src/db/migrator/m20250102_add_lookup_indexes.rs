use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

/// (user, anime) is looked up on every add-to-list but is deliberately not
/// unique; the handler updates the first match in place.
#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_index(
                Index::create()
                    .name("idx_anime_list_entries_user_id")
                    .table(AnimeListEntries::Table)
                    .col(AnimeListEntries::UserId)
                    .if_not_exists()
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_anime_list_entries_user_anime")
                    .table(AnimeListEntries::Table)
                    .col(AnimeListEntries::UserId)
                    .col(AnimeListEntries::AnimeId)
                    .if_not_exists()
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_watch_providers_anime_id")
                    .table(WatchProviders::Table)
                    .col(WatchProviders::AnimeId)
                    .if_not_exists()
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_index(
                Index::drop()
                    .name("idx_watch_providers_anime_id")
                    .table(WatchProviders::Table)
                    .to_owned(),
            )
            .await?;
        manager
            .drop_index(
                Index::drop()
                    .name("idx_anime_list_entries_user_anime")
                    .table(AnimeListEntries::Table)
                    .to_owned(),
            )
            .await?;
        manager
            .drop_index(
                Index::drop()
                    .name("idx_anime_list_entries_user_id")
                    .table(AnimeListEntries::Table)
                    .to_owned(),
            )
            .await
    }
}

#[derive(DeriveIden)]
enum AnimeListEntries {
    Table,
    UserId,
    AnimeId,
}

#[derive(DeriveIden)]
enum WatchProviders {
    Table,
    AnimeId,
}
