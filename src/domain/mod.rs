//! Domain types for the tracking service with strong typing.
//!
//! Catalog ids get a newtype so they are not mixed up with local ids. List
//! status and airing season are enums instead of free strings.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Identifier of an anime in the external catalog.
///
/// The local cache uses this value as its primary key, so there is no
/// translation between catalog ids and local ids.
///
/// # Examples
///
/// ```rust
/// use wawatch::domain::AnimeId;
///
/// let id = AnimeId::new(21);
/// assert_eq!(id.value(), 21);
/// assert_eq!(id.to_string(), "21");
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub struct AnimeId(i32);

impl AnimeId {
    #[must_use]
    pub const fn new(id: i32) -> Self {
        Self(id)
    }

    #[must_use]
    pub const fn value(&self) -> i32 {
        self.0
    }
}

impl fmt::Display for AnimeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<AnimeId> for i32 {
    fn from(id: AnimeId) -> Self {
        id.0
    }
}

impl From<i32> for AnimeId {
    fn from(id: i32) -> Self {
        Self::new(id)
    }
}

impl Serialize for AnimeId {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        serializer.serialize_i32(self.0)
    }
}

impl<'de> Deserialize<'de> for AnimeId {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        i32::deserialize(deserializer).map(Self::new)
    }
}

/// Watch status of a list entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ListStatus {
    Watching,
    Completed,
    Planned,
    Dropped,
    Paused,
    Rewatching,
}

impl ListStatus {
    pub const ALL: [Self; 6] = [
        Self::Watching,
        Self::Completed,
        Self::Planned,
        Self::Dropped,
        Self::Paused,
        Self::Rewatching,
    ];

    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Watching => "WATCHING",
            Self::Completed => "COMPLETED",
            Self::Planned => "PLANNED",
            Self::Dropped => "DROPPED",
            Self::Paused => "PAUSED",
            Self::Rewatching => "REWATCHING",
        }
    }
}

impl fmt::Display for ListStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("Invalid status: {0}")]
pub struct InvalidListStatus(pub String);

impl FromStr for ListStatus {
    type Err = InvalidListStatus;

    /// Exact match only; the API contract uses upper-case values.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|status| status.as_str() == s)
            .ok_or_else(|| InvalidListStatus(s.to_string()))
    }
}

/// Airing season as understood by the catalog.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Season {
    Winter,
    Spring,
    Summer,
    Fall,
}

impl Season {
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Winter => "WINTER",
            Self::Spring => "SPRING",
            Self::Summer => "SUMMER",
            Self::Fall => "FALL",
        }
    }
}

impl fmt::Display for Season {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("Invalid season: {0}. Use WINTER, SPRING, SUMMER, or FALL")]
pub struct InvalidSeason(pub String);

impl FromStr for Season {
    type Err = InvalidSeason;

    /// Case-insensitive, so `/season/2024/fall` works.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_uppercase().as_str() {
            "WINTER" => Ok(Self::Winter),
            "SPRING" => Ok(Self::Spring),
            "SUMMER" => Ok(Self::Summer),
            "FALL" => Ok(Self::Fall),
            _ => Err(InvalidSeason(s.to_string())),
        }
    }
}
