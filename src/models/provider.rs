use serde::Serialize;
use uuid::Uuid;

use crate::entities::watch_providers;

/// Where a title can be streamed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct WatchProvider {
    pub id: Uuid,
    pub anime_id: i32,
    pub provider_name: String,
    pub provider_url: String,
    pub region: Option<String>,
    pub is_sub: bool,
    pub is_dub: bool,
    pub last_updated: String,
}

impl From<watch_providers::Model> for WatchProvider {
    fn from(model: watch_providers::Model) -> Self {
        Self {
            id: model.id,
            anime_id: model.anime_id,
            provider_name: model.provider_name,
            provider_url: model.provider_url,
            region: model.region,
            is_sub: model.is_sub,
            is_dub: model.is_dub,
            last_updated: model.last_updated,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewProvider {
    pub anime_id: i32,
    pub provider_name: String,
    pub provider_url: String,
    pub region: Option<String>,
    pub is_sub: bool,
    pub is_dub: bool,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ProviderPatch {
    pub provider_name: Option<String>,
    pub provider_url: Option<String>,
    pub region: Option<String>,
    pub is_sub: Option<bool>,
    pub is_dub: Option<bool>,
}

impl ProviderPatch {
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.provider_name.is_none()
            && self.provider_url.is_none()
            && self.region.is_none()
            && self.is_sub.is_none()
            && self.is_dub.is_none()
    }
}
