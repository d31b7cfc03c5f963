use crate::domain::ListStatus;
use crate::entities::{anime_list_entries, prelude::*};
use crate::models::list::{ListEntry, ListEntryInput, ListEntryPatch};
use anyhow::Result;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter, QueryOrder, Set,
};

pub struct AnimeListRepository {
    conn: DatabaseConnection,
}

impl AnimeListRepository {
    #[must_use]
    pub const fn new(conn: DatabaseConnection) -> Self {
        Self { conn }
    }

    pub async fn get(&self, id: i32) -> Result<Option<ListEntry>> {
        let row = AnimeListEntries::find_by_id(id).one(&self.conn).await?;
        Ok(row.map(ListEntry::from))
    }

    /// The (user, anime) pair is not unique in the schema; the oldest row wins.
    pub async fn find_for_user(&self, user_id: i32, anime_id: i32) -> Result<Option<ListEntry>> {
        let row = AnimeListEntries::find()
            .filter(anime_list_entries::Column::UserId.eq(user_id))
            .filter(anime_list_entries::Column::AnimeId.eq(anime_id))
            .order_by_asc(anime_list_entries::Column::Id)
            .one(&self.conn)
            .await?;
        Ok(row.map(ListEntry::from))
    }

    pub async fn list_for_user(
        &self,
        user_id: i32,
        status: Option<ListStatus>,
    ) -> Result<Vec<ListEntry>> {
        let mut query =
            AnimeListEntries::find().filter(anime_list_entries::Column::UserId.eq(user_id));

        if let Some(status) = status {
            query = query.filter(anime_list_entries::Column::Status.eq(status.as_str()));
        }

        let rows = query
            .order_by_asc(anime_list_entries::Column::Id)
            .all(&self.conn)
            .await?;

        Ok(rows.into_iter().map(ListEntry::from).collect())
    }

    /// Overwrites every field of an existing entry, or inserts a new one.
    /// Returns the stored entry and whether it was created.
    pub async fn upsert_for_user(
        &self,
        user_id: i32,
        anime_id: i32,
        input: ListEntryInput,
    ) -> Result<(ListEntry, bool)> {
        let now = chrono::Utc::now().to_rfc3339();

        let existing = AnimeListEntries::find()
            .filter(anime_list_entries::Column::UserId.eq(user_id))
            .filter(anime_list_entries::Column::AnimeId.eq(anime_id))
            .order_by_asc(anime_list_entries::Column::Id)
            .one(&self.conn)
            .await?;

        if let Some(existing) = existing {
            let mut active: anime_list_entries::ActiveModel = existing.into();
            active.status = Set(input.status.as_str().to_string());
            active.score = Set(input.score);
            active.progress = Set(input.progress);
            active.start_date = Set(input.start_date);
            active.end_date = Set(input.end_date);
            active.notes = Set(input.notes);
            active.rewatch_count = Set(input.rewatch_count);
            active.updated_at = Set(now);

            let updated = active.update(&self.conn).await?;
            return Ok((ListEntry::from(updated), false));
        }

        let created = anime_list_entries::ActiveModel {
            user_id: Set(user_id),
            anime_id: Set(anime_id),
            status: Set(input.status.as_str().to_string()),
            score: Set(input.score),
            progress: Set(input.progress),
            start_date: Set(input.start_date),
            end_date: Set(input.end_date),
            notes: Set(input.notes),
            rewatch_count: Set(input.rewatch_count),
            created_at: Set(now.clone()),
            updated_at: Set(now),
            ..Default::default()
        }
        .insert(&self.conn)
        .await?;

        Ok((ListEntry::from(created), true))
    }

    /// Applies the present fields of `patch`. Returns `None` if the row is gone.
    pub async fn apply_patch(&self, id: i32, patch: ListEntryPatch) -> Result<Option<ListEntry>> {
        let Some(row) = AnimeListEntries::find_by_id(id).one(&self.conn).await? else {
            return Ok(None);
        };

        if patch.is_empty() {
            return Ok(Some(ListEntry::from(row)));
        }

        let mut active: anime_list_entries::ActiveModel = row.into();
        if let Some(status) = patch.status {
            active.status = Set(status.as_str().to_string());
        }
        if let Some(score) = patch.score {
            active.score = Set(Some(score));
        }
        if let Some(progress) = patch.progress {
            active.progress = Set(progress);
        }
        if let Some(start) = patch.start_date {
            active.start_date = Set(Some(start));
        }
        if let Some(end) = patch.end_date {
            active.end_date = Set(Some(end));
        }
        if let Some(notes) = patch.notes {
            active.notes = Set(notes);
        }
        if let Some(rewatch_count) = patch.rewatch_count {
            active.rewatch_count = Set(rewatch_count);
        }
        active.updated_at = Set(chrono::Utc::now().to_rfc3339());

        let updated = active.update(&self.conn).await?;
        Ok(Some(ListEntry::from(updated)))
    }

    pub async fn delete(&self, id: i32) -> Result<bool> {
        let result = AnimeListEntries::delete_by_id(id).exec(&self.conn).await?;
        Ok(result.rows_affected > 0)
    }
}
