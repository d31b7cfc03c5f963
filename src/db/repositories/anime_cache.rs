use crate::entities::{anime_cache, prelude::*};
use crate::models::anime::AnimeSummary;
use anyhow::Result;
use sea_orm::{ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter, Set};

pub struct AnimeCacheRepository {
    conn: DatabaseConnection,
}

impl AnimeCacheRepository {
    #[must_use]
    pub const fn new(conn: DatabaseConnection) -> Self {
        Self { conn }
    }

    pub async fn get(&self, id: i32) -> Result<Option<AnimeSummary>> {
        let row = AnimeCache::find_by_id(id).one(&self.conn).await?;
        Ok(row.map(to_summary))
    }

    pub async fn get_many(&self, ids: &[i32]) -> Result<Vec<AnimeSummary>> {
        if ids.is_empty() {
            return Ok(Vec::new());
        }

        let rows = AnimeCache::find()
            .filter(anime_cache::Column::Id.is_in(ids.iter().copied()))
            .all(&self.conn)
            .await?;

        Ok(rows.into_iter().map(to_summary).collect())
    }

    /// Insert or refresh a projection. `created_at` survives refreshes.
    pub async fn upsert(&self, summary: &AnimeSummary) -> Result<()> {
        let now = chrono::Utc::now().to_rfc3339();

        let active_model = anime_cache::ActiveModel {
            id: Set(summary.id),
            title: Set(summary.title.clone()),
            cover_image: Set(summary.cover_image.clone()),
            format: Set(summary.format.clone()),
            total_episodes: Set(summary.total_episodes),
            created_at: Set(now.clone()),
            updated_at: Set(now),
        };

        AnimeCache::insert(active_model)
            .on_conflict(
                sea_orm::sea_query::OnConflict::column(anime_cache::Column::Id)
                    .update_columns([
                        anime_cache::Column::Title,
                        anime_cache::Column::CoverImage,
                        anime_cache::Column::Format,
                        anime_cache::Column::TotalEpisodes,
                        anime_cache::Column::UpdatedAt,
                    ])
                    .to_owned(),
            )
            .exec(&self.conn)
            .await?;

        Ok(())
    }
}

fn to_summary(row: anime_cache::Model) -> AnimeSummary {
    AnimeSummary {
        id: row.id,
        title: row.title,
        cover_image: row.cover_image,
        format: row.format,
        total_episodes: row.total_episodes,
    }
}
