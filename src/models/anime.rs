use serde::{Deserialize, Serialize};

/// Full catalog payload for a single title.
///
/// Deserialized straight from the catalog's `Media` object and returned to
/// clients in the same camelCase shape. Never persisted as-is; see
/// [`AnimeDetails::to_summary`].
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AnimeDetails {
    pub id: i32,
    pub title: AnimeTitle,
    pub description: Option<String>,
    pub format: Option<String>,
    pub status: Option<String>,
    pub episodes: Option<i32>,
    /// Minutes per episode.
    pub duration: Option<i32>,
    #[serde(default)]
    pub genres: Vec<String>,
    #[serde(default)]
    pub start_date: FuzzyDate,
    #[serde(default)]
    pub end_date: FuzzyDate,
    pub season: Option<String>,
    pub season_year: Option<i32>,
    #[serde(default)]
    pub cover_image: CoverImage,
    pub banner_image: Option<String>,
    pub average_score: Option<i32>,
    pub popularity: Option<i32>,
    #[serde(default)]
    pub studios: Studios,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AnimeTitle {
    pub romaji: Option<String>,
    pub english: Option<String>,
    pub native: Option<String>,
}

impl AnimeTitle {
    /// English when present and non-empty, otherwise Romaji.
    #[must_use]
    pub fn display(&self) -> String {
        match self.english.as_deref() {
            Some(english) if !english.is_empty() => english.to_string(),
            _ => self.romaji.clone().unwrap_or_default(),
        }
    }
}

/// Partial date; the catalog leaves unknown parts null.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FuzzyDate {
    pub year: Option<i32>,
    pub month: Option<u32>,
    pub day: Option<u32>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CoverImage {
    pub large: Option<String>,
    pub medium: Option<String>,
}

impl CoverImage {
    #[must_use]
    pub fn best(&self) -> Option<String> {
        self.large.clone().or_else(|| self.medium.clone())
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Studios {
    #[serde(default)]
    pub nodes: Vec<StudioNode>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StudioNode {
    pub name: String,
}

impl AnimeDetails {
    /// Reduces the full payload to the cached projection.
    #[must_use]
    pub fn to_summary(&self) -> AnimeSummary {
        AnimeSummary {
            id: self.id,
            title: self.title.display(),
            cover_image: self.cover_image.best(),
            format: self.format.clone(),
            total_episodes: self.episodes,
        }
    }
}

/// Reduced record: what listing endpoints return and what the cache stores.
///
/// `total_episodes` is `None` when the catalog does not know the count,
/// which is different from a title with zero episodes.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AnimeSummary {
    pub id: i32,
    pub title: String,
    pub cover_image: Option<String>,
    pub format: Option<String>,
    pub total_episodes: Option<i32>,
}

/// One page of reduced records plus the catalog's total match count.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CatalogPage {
    pub items: Vec<AnimeSummary>,
    pub total: u64,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn title(romaji: Option<&str>, english: Option<&str>) -> AnimeTitle {
        AnimeTitle {
            romaji: romaji.map(str::to_string),
            english: english.map(str::to_string),
            native: None,
        }
    }

    #[test]
    fn display_title_prefers_english() {
        let t = title(Some("Shingeki no Kyojin"), Some("Attack on Titan"));
        assert_eq!(t.display(), "Attack on Titan");
    }

    #[test]
    fn display_title_falls_back_to_romaji() {
        assert_eq!(title(Some("Mushishi"), None).display(), "Mushishi");
        assert_eq!(title(Some("Mushishi"), Some("")).display(), "Mushishi");
        assert_eq!(title(None, None).display(), "");
    }

    #[test]
    fn summary_keeps_unknown_episode_count_absent() {
        let details = AnimeDetails {
            id: 1,
            title: title(Some("One Piece"), Some("ONE PIECE")),
            episodes: None,
            ..AnimeDetails::default()
        };
        let summary = details.to_summary();
        assert_eq!(summary.total_episodes, None);
        assert_eq!(summary.title, "ONE PIECE");
    }

    #[test]
    fn summary_keeps_zero_episodes() {
        let details = AnimeDetails {
            id: 2,
            episodes: Some(0),
            ..AnimeDetails::default()
        };
        assert_eq!(details.to_summary().total_episodes, Some(0));
    }

    #[test]
    fn cover_image_prefers_large() {
        let cover = CoverImage {
            large: Some("l.jpg".to_string()),
            medium: Some("m.jpg".to_string()),
        };
        assert_eq!(cover.best().as_deref(), Some("l.jpg"));

        let cover = CoverImage {
            large: None,
            medium: Some("m.jpg".to_string()),
        };
        assert_eq!(cover.best().as_deref(), Some("m.jpg"));
    }

    #[test]
    fn details_deserialize_from_catalog_shape() {
        let json = r#"{
            "id": 21,
            "title": {"romaji": "ONE PIECE", "english": null, "native": "ワンピース"},
            "description": "Pirates.",
            "format": "TV",
            "status": "RELEASING",
            "episodes": null,
            "duration": 24,
            "genres": ["Action", "Adventure"],
            "startDate": {"year": 1999, "month": 10, "day": 20},
            "endDate": {"year": null, "month": null, "day": null},
            "season": "FALL",
            "seasonYear": 1999,
            "coverImage": {"large": "https://img/large.jpg", "medium": "https://img/medium.jpg"},
            "bannerImage": null,
            "averageScore": 88,
            "popularity": 500000,
            "studios": {"nodes": [{"name": "Toei Animation"}]}
        }"#;

        let details: AnimeDetails = serde_json::from_str(json).unwrap();
        assert_eq!(details.id, 21);
        assert_eq!(details.episodes, None);
        assert_eq!(details.start_date.year, Some(1999));
        assert_eq!(details.studios.nodes[0].name, "Toei Animation");

        let summary = details.to_summary();
        assert_eq!(summary.title, "ONE PIECE");
        assert_eq!(summary.cover_image.as_deref(), Some("https://img/large.jpg"));
        assert_eq!(summary.format.as_deref(), Some("TV"));
    }
}
