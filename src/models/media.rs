use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct MediaTitle {
    pub english: Option<String>,
    pub native: Option<String>,
    pub romaji: Option<String>,
}

impl MediaTitle {
    /// English title when present, romaji otherwise.
    pub fn preferred(&self) -> Option<&str> {
        self.english
            .as_deref()
            .or(self.romaji.as_deref())
            .or(self.native.as_deref())
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CoverImage {
    pub large: Option<String>,
    pub extra_large: Option<String>,
}

/// A catalog media entry, restricted to the fields the service reads.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Media {
    pub id: i64,
    #[serde(default)]
    pub title: MediaTitle,
    pub description: Option<String>,
    #[serde(default)]
    pub genres: Vec<String>,
    pub format: Option<String>,
    pub episodes: Option<i32>,
    pub chapters: Option<i32>,
    pub status: Option<String>,
    pub average_score: Option<i32>,
    pub cover_image: Option<CoverImage>,
    pub site_url: Option<String>,
}

/// One catalog-suggested title for a target media.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RecommendationNode {
    pub rating: Option<i32>,
    pub user_rating: Option<String>,
    pub media_recommendation: Option<Media>,
}

/// Favorite summary used to ground recommendation prompts.
#[derive(Debug, Clone, Serialize)]
pub struct FavoriteSummary {
    pub title: Option<String>,
    pub description: Option<String>,
    pub genres: Vec<String>,
    pub format: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub episodes: Option<i32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub chapters: Option<i32>,
    pub status: Option<String>,
    pub score: Option<i32>,
}

impl From<&Media> for FavoriteSummary {
    fn from(media: &Media) -> Self {
        Self {
            title: media.title.preferred().map(str::to_string),
            description: media.description.clone(),
            genres: media.genres.clone(),
            format: media.format.clone(),
            episodes: media.episodes,
            chapters: media.chapters,
            status: media.status.clone(),
            score: media.average_score,
        }
    }
}

/// The media fields surfaced to the client alongside a verdict.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RecommendedMedia {
    pub id: i64,
    pub description: Option<String>,
    pub title: MediaTitle,
    pub genres: Vec<String>,
    pub cover_image: Option<CoverImage>,
    pub site_url: Option<String>,
}

impl From<Media> for RecommendedMedia {
    fn from(media: Media) -> Self {
        Self {
            id: media.id,
            description: media.description,
            title: media.title,
            genres: media.genres,
            cover_image: media.cover_image,
            site_url: media.site_url,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Recommendation {
    pub media: RecommendedMedia,
    pub would_recommend: bool,
    pub reason: String,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_media_deserializes_catalog_shape() {
        let media: Media = serde_json::from_value(json!({
            "id": 21,
            "title": { "english": "One Piece", "romaji": "ONE PIECE", "native": null },
            "description": "Pirates.",
            "genres": ["Action", "Adventure"],
            "format": "TV",
            "episodes": null,
            "status": "RELEASING",
            "averageScore": 88,
            "coverImage": { "large": "l.png", "extraLarge": "xl.png" },
            "siteUrl": "https://anilist.co/anime/21"
        }))
        .unwrap();

        assert_eq!(media.id, 21);
        assert_eq!(media.title.preferred(), Some("One Piece"));
        assert_eq!(media.average_score, Some(88));
        assert_eq!(
            media.cover_image.as_ref().and_then(|c| c.extra_large.as_deref()),
            Some("xl.png")
        );
    }

    #[test]
    fn test_recommended_media_drops_catalog_internals() {
        let media = Media {
            id: 1,
            format: Some("TV".to_string()),
            average_score: Some(70),
            ..Default::default()
        };
        let value = serde_json::to_value(RecommendedMedia::from(media)).unwrap();

        assert!(value.get("format").is_none());
        assert!(value.get("averageScore").is_none());
        assert!(value.get("siteUrl").is_some());
        assert!(value.get("coverImage").is_some());
    }

    #[test]
    fn test_preferred_title_falls_back_to_romaji() {
        let title = MediaTitle {
            english: None,
            romaji: Some("Shingeki no Kyojin".to_string()),
            native: None,
        };
        assert_eq!(title.preferred(), Some("Shingeki no Kyojin"));
    }
}
