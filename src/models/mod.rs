use serde::{Deserialize, Serialize};

pub use media::{
    CoverImage, FavoriteSummary, Media, MediaTitle, Recommendation, RecommendationNode,
    RecommendedMedia,
};
pub use user::{ContentSettings, UserProfile};

mod media;
mod user;

/// Request body for `POST /api/search`
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SearchRequest {
    /// Free-text search, e.g. "peak romance anime from 2021 that isn't adult"
    #[serde(default)]
    pub query: String,
}

/// Success envelope shared by every endpoint.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiResponse<T> {
    pub status: u16,
    pub data: T,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub success: Option<bool>,
}

impl<T> ApiResponse<T> {
    pub fn ok(data: T) -> Self {
        Self {
            status: 200,
            data,
            success: None,
        }
    }

    pub fn success(data: T) -> Self {
        Self {
            status: 200,
            data,
            success: Some(true),
        }
    }
}
