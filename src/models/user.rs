use serde::Deserialize;

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ContentSettings {
    #[serde(default)]
    pub nsfw_content: Option<String>,
    #[serde(default)]
    pub model: Option<String>,
}

/// The parts of a stored user the search and recommendation flows read.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct UserProfile {
    pub id: String,
    #[serde(default)]
    pub favorites: Vec<i64>,
    #[serde(default)]
    pub about: String,
    #[serde(default)]
    pub interests: Vec<String>,
    #[serde(default, alias = "contentSettings")]
    pub content_settings: ContentSettings,
}

impl UserProfile {
    pub fn preferred_model(&self) -> Option<&str> {
        self.content_settings
            .model
            .as_deref()
            .map(str::trim)
            .filter(|model| !model.is_empty())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_profile_defaults() {
        let profile: UserProfile = serde_json::from_value(json!({ "id": "abc" })).unwrap();
        assert!(profile.favorites.is_empty());
        assert_eq!(profile.about, "");
        assert_eq!(profile.preferred_model(), None);
    }

    #[test]
    fn test_preferred_model() {
        let profile: UserProfile = serde_json::from_value(json!({
            "id": "abc",
            "favorites": [1, 2],
            "content_settings": { "nsfwContent": "blur", "model": "openai/gpt-4o-mini" }
        }))
        .unwrap();
        assert_eq!(profile.favorites, vec![1, 2]);
        assert_eq!(profile.preferred_model(), Some("openai/gpt-4o-mini"));
    }

    #[test]
    fn test_blank_model_is_ignored() {
        let profile: UserProfile = serde_json::from_value(json!({
            "id": "abc",
            "content_settings": { "model": " " }
        }))
        .unwrap();
        assert_eq!(profile.preferred_model(), None);
    }
}
