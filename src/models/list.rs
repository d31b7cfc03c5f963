use chrono::{DateTime, Utc};
use serde::Serialize;
use std::collections::BTreeMap;

use crate::domain::ListStatus;
use crate::entities::anime_list_entries;
use crate::models::anime::AnimeSummary;

/// One row of a user's list.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ListEntry {
    pub id: i32,
    pub user_id: i32,
    pub anime_id: i32,
    pub status: String,
    pub score: Option<i32>,
    pub progress: i32,
    pub start_date: Option<DateTime<Utc>>,
    pub end_date: Option<DateTime<Utc>>,
    pub notes: String,
    pub rewatch_count: i32,
    pub created_at: String,
    pub updated_at: String,
}

impl From<anime_list_entries::Model> for ListEntry {
    fn from(model: anime_list_entries::Model) -> Self {
        Self {
            id: model.id,
            user_id: model.user_id,
            anime_id: model.anime_id,
            status: model.status,
            score: model.score,
            progress: model.progress,
            start_date: model.start_date,
            end_date: model.end_date,
            notes: model.notes,
            rewatch_count: model.rewatch_count,
            created_at: model.created_at,
            updated_at: model.updated_at,
        }
    }
}

impl ListEntry {
    #[must_use]
    pub fn stats_input(&self) -> StatsInput {
        StatsInput {
            status: self.status.parse().ok(),
            score: self.score,
            progress: self.progress,
        }
    }
}

/// Full set of values written by add-to-list. Every field overwrites.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ListEntryInput {
    pub status: ListStatus,
    pub score: Option<i32>,
    pub progress: i32,
    pub start_date: Option<DateTime<Utc>>,
    pub end_date: Option<DateTime<Utc>>,
    pub notes: String,
    pub rewatch_count: i32,
}

/// Partial update; `None` leaves the stored value alone.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ListEntryPatch {
    pub status: Option<ListStatus>,
    pub score: Option<i32>,
    pub progress: Option<i32>,
    pub start_date: Option<DateTime<Utc>>,
    pub end_date: Option<DateTime<Utc>>,
    pub notes: Option<String>,
    pub rewatch_count: Option<i32>,
}

impl ListEntryPatch {
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.status.is_none()
            && self.score.is_none()
            && self.progress.is_none()
            && self.start_date.is_none()
            && self.end_date.is_none()
            && self.notes.is_none()
            && self.rewatch_count.is_none()
    }
}

/// List row joined with its cached anime, as the list views return it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ListEntryView {
    pub id: i32,
    pub status: String,
    pub score: Option<i32>,
    pub progress: i32,
    pub start_date: Option<DateTime<Utc>>,
    pub end_date: Option<DateTime<Utc>>,
    pub notes: String,
    pub rewatch_count: i32,
    pub anime: AnimeSummary,
}

impl ListEntryView {
    #[must_use]
    pub fn new(entry: ListEntry, anime: AnimeSummary) -> Self {
        Self {
            id: entry.id,
            status: entry.status,
            score: entry.score,
            progress: entry.progress,
            start_date: entry.start_date,
            end_date: entry.end_date,
            notes: entry.notes,
            rewatch_count: entry.rewatch_count,
            anime,
        }
    }
}

/// Answer to "is this title on my list?".
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ListMembership {
    pub in_list: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub progress: Option<i32>,
    /// Present (possibly null) whenever `in_list` is true.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub score: Option<Option<i32>>,
}

impl ListMembership {
    #[must_use]
    pub const fn absent() -> Self {
        Self {
            in_list: false,
            status: None,
            progress: None,
            score: None,
        }
    }

    #[must_use]
    pub fn of(entry: &ListEntry) -> Self {
        Self {
            in_list: true,
            status: Some(entry.status.clone()),
            progress: Some(entry.progress),
            score: Some(entry.score),
        }
    }
}

/// Summary statistics over one user's list.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ListStats {
    pub total_anime: u64,
    pub episodes_watched: i64,
    /// Mean over scored entries only; `0.0` when nothing is scored.
    pub mean_score: f64,
    pub scored_entries: u64,
    /// Always carries all six statuses, zero counts included.
    pub status_counts: BTreeMap<String, u64>,
}

/// The fields the aggregation reads from a list entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StatsInput {
    pub status: Option<ListStatus>,
    pub score: Option<i32>,
    pub progress: i32,
}

impl ListStats {
    /// Single pass over the entries. Unknown status strings still count
    /// toward the total but not toward any status bucket.
    pub fn aggregate<I>(entries: I) -> Self
    where
        I: IntoIterator<Item = StatsInput>,
    {
        let mut status_counts: BTreeMap<String, u64> = ListStatus::ALL
            .iter()
            .map(|s| (s.as_str().to_string(), 0))
            .collect();

        let mut total_anime = 0u64;
        let mut episodes_watched = 0i64;
        let mut score_sum = 0i64;
        let mut scored_entries = 0u64;

        for entry in entries {
            total_anime += 1;
            episodes_watched += i64::from(entry.progress);

            if let Some(score) = entry.score {
                score_sum += i64::from(score);
                scored_entries += 1;
            }

            if let Some(status) = entry.status
                && let Some(count) = status_counts.get_mut(status.as_str())
            {
                *count += 1;
            }
        }

        #[allow(clippy::cast_precision_loss)]
        let mean_score = if scored_entries == 0 {
            0.0
        } else {
            score_sum as f64 / scored_entries as f64
        };

        Self {
            total_anime,
            episodes_watched,
            mean_score,
            scored_entries,
            status_counts,
        }
    }
}
