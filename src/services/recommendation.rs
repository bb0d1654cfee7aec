//! Spoiler-free "would you like this?" verdicts for a title's catalog
//! recommendations, grounded in the caller's favorites and profile.

use crate::{
    error::{ApiError, Result},
    models::{FavoriteSummary, Media, Recommendation, RecommendedMedia, UserProfile},
    services::{
        anilist::CatalogClient,
        llm::{LlmClient, ResponseSchema},
        supabase::UserStore,
    },
};
use futures::future::join_all;
use once_cell::sync::Lazy;
use serde::{Deserialize, Serialize};
use serde_json::json;
use std::{collections::HashSet, sync::Arc, time::Duration};
use tracing::{debug, info, warn};

pub const NO_RESPONSE_REASON: &str = "No response from LLM";
pub const PROCESSING_ERROR_REASON: &str = "Error processing recommendation";

const DEFAULT_RETRY_DELAY_MS: u64 = 100;

static VERDICT_SCHEMA: Lazy<ResponseSchema> = Lazy::new(|| ResponseSchema {
    name: "recommendation".to_string(),
    schema: json!({
        "type": "object",
        "properties": {
            "would_recommend": {
                "type": "boolean",
                "description": "Whether the user would likely enjoy the candidate title"
            },
            "reason": {
                "type": "string",
                "description": "One spoiler-free sentence of at most 100 characters"
            }
        },
        "required": ["would_recommend", "reason"],
        "additionalProperties": false
    }),
});

const EVALUATION_CRITERIA: &str = "Decide whether the user would enjoy the candidate title described in the user message. Weigh:
- overlap in genres and themes with the user's favorites
- whether the format (TV, movie, manga, novel, ...) and length suit what the user already watches or reads
- the candidate's quality and reception compared to the user's favorites
- anything the user says about themselves or their interests

Keep the reason to one sentence of at most 100 characters.
Never reveal plot twists, deaths, endings, identities or any other spoilers of the candidate or of the user's favorites. \
Refer only to premise-level information.";

/// Structured LLM answer for one candidate.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RecommendationVerdict {
    pub would_recommend: bool,
    pub reason: String,
}

/// Outcome of evaluating one candidate.
#[derive(Debug, Clone, PartialEq)]
pub enum Verdict {
    Generated(RecommendationVerdict),
    Failed { reason: &'static str },
}

/// Validate a structured answer. Tolerates prose or code fences around the
/// JSON object.
pub fn parse_verdict(raw: &str) -> std::result::Result<RecommendationVerdict, String> {
    let json = match (raw.find('{'), raw.rfind('}')) {
        (Some(start), Some(end)) if start < end => &raw[start..=end],
        _ => return Err(format!("no JSON object in answer: {}", raw)),
    };

    let mut verdict: RecommendationVerdict =
        serde_json::from_str(json).map_err(|e| format!("answer does not match schema: {}", e))?;

    verdict.reason = verdict.reason.trim().to_string();
    if verdict.reason.is_empty() {
        return Err("answer has an empty reason".to_string());
    }

    Ok(verdict)
}

/// Everything the LLM knows about the user: favorites plus free text.
pub fn build_grounding_context(favorites: &[FavoriteSummary], profile: &UserProfile) -> Result<String> {
    let favorites_json = serde_json::to_string_pretty(favorites)?;
    let about = match profile.about.trim() {
        "" => "(not provided)",
        about => about,
    };
    let interests = if profile.interests.is_empty() {
        "(not provided)".to_string()
    } else {
        profile.interests.join(", ")
    };

    Ok(format!(
        "The user's favorite titles:\n{}\n\nAbout the user: {}\nInterests: {}",
        favorites_json, about, interests
    ))
}

fn candidate_description(media: &Media) -> Result<String> {
    Ok(serde_json::to_string_pretty(&FavoriteSummary::from(media))?)
}

pub struct RecommendationService {
    llm: Arc<dyn LlmClient>,
    catalog: Arc<dyn CatalogClient>,
    users: Arc<dyn UserStore>,
    default_model: String,
    page_size: u32,
    retry_attempts: u32,
    retry_delay: Duration,
}

impl RecommendationService {
    pub fn new(
        llm: Arc<dyn LlmClient>,
        catalog: Arc<dyn CatalogClient>,
        users: Arc<dyn UserStore>,
        default_model: &str,
        page_size: u32,
    ) -> Self {
        Self {
            llm,
            catalog,
            users,
            default_model: default_model.to_string(),
            page_size,
            retry_attempts: 3,
            retry_delay: Duration::from_millis(DEFAULT_RETRY_DELAY_MS),
        }
    }

    /// Attempts per candidate and the base delay between them.
    pub fn with_retry_policy(mut self, attempts: u32, delay: Duration) -> Self {
        self.retry_attempts = attempts.max(1);
        self.retry_delay = delay;
        self
    }

    /// Evaluate the catalog's recommendations for `target_id` against the
    /// profile of `user_id`. Candidates whose evaluation failed are left out.
    pub async fn recommend(&self, user_id: &str, target_id: i64) -> Result<Vec<Recommendation>> {
        let profile = self
            .users
            .get_user_by_id(user_id)
            .await?
            .ok_or_else(|| ApiError::AuthenticationError("user not found".to_string()))?;
        let model = profile
            .preferred_model()
            .unwrap_or(self.default_model.as_str())
            .to_string();

        let (suggestions, favorites) = futures::join!(
            self.catalog.media_recommendations(target_id, self.page_size),
            self.fetch_favorites(&profile.favorites),
        );
        let suggestions = suggestions?;

        let context = build_grounding_context(&favorites, &profile)?;

        let mut seen = HashSet::new();
        let candidates: Vec<Media> = suggestions
            .into_iter()
            .filter_map(|node| node.media_recommendation)
            .filter(|media| media.id != target_id && seen.insert(media.id))
            .collect();

        let verdicts = join_all(
            candidates
                .iter()
                .map(|media| self.evaluate(&context, media, &model)),
        )
        .await;

        let total = candidates.len();
        let recommendations: Vec<Recommendation> = candidates
            .into_iter()
            .zip(verdicts)
            .filter_map(|(media, verdict)| match verdict {
                Verdict::Generated(verdict) => Some(Recommendation {
                    media: RecommendedMedia::from(media),
                    would_recommend: verdict.would_recommend,
                    reason: verdict.reason,
                }),
                Verdict::Failed { reason } => {
                    debug!("Dropping candidate {}: {}", media.id, reason);
                    None
                }
            })
            .collect();

        info!(
            "Recommendations for media {}: {} of {} candidates evaluated ({} favorites in context)",
            target_id,
            recommendations.len(),
            total,
            favorites.len()
        );

        Ok(recommendations)
    }

    /// Details of every favorite, fetched at once. Favorites that fail to
    /// load are skipped.
    async fn fetch_favorites(&self, ids: &[i64]) -> Vec<FavoriteSummary> {
        let lookups = ids.iter().map(|&id| async move {
            match self.catalog.media_details(id).await {
                Ok(Some(media)) => Some(FavoriteSummary::from(&media)),
                Ok(None) => {
                    warn!("Favorite {} not found in catalog", id);
                    None
                }
                Err(e) => {
                    warn!("Failed to load favorite {}: {}", id, e);
                    None
                }
            }
        });

        join_all(lookups).await.into_iter().flatten().collect()
    }

    async fn evaluate(&self, context: &str, media: &Media, model: &str) -> Verdict {
        let candidate = match candidate_description(media) {
            Ok(candidate) => candidate,
            Err(e) => {
                warn!("Failed to describe candidate {}: {}", media.id, e);
                return Verdict::Failed {
                    reason: PROCESSING_ERROR_REASON,
                };
            }
        };
        let system_prompt = format!("{}\n\n{}", context, EVALUATION_CRITERIA);

        for attempt in 1..=self.retry_attempts {
            match self
                .llm
                .complete(&system_prompt, &candidate, model, Some(&VERDICT_SCHEMA))
                .await
            {
                Ok(None) => {
                    return Verdict::Failed {
                        reason: NO_RESPONSE_REASON,
                    }
                }
                Ok(Some(raw)) => match parse_verdict(&raw) {
                    Ok(verdict) => return Verdict::Generated(verdict),
                    Err(e) => warn!(
                        "Candidate {} attempt {}/{}: {}",
                        media.id, attempt, self.retry_attempts, e
                    ),
                },
                Err(e) => warn!(
                    "Candidate {} attempt {}/{} failed: {}",
                    media.id, attempt, self.retry_attempts, e
                ),
            }

            if attempt < self.retry_attempts {
                tokio::time::sleep(self.retry_delay * attempt).await;
            }
        }

        Verdict::Failed {
            reason: PROCESSING_ERROR_REASON,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::services::llm::ResponseSchema;
    use async_trait::async_trait;
    use serde_json::Value;
    use std::collections::HashMap;
    use std::sync::Mutex;

    /// Catalog with three suggestions (10, 11, 12) for any target; favorite
    /// 99 fails to load.
    struct FakeCatalog;

    fn media_json(id: i64, title: &str) -> Value {
        json!({
            "id": id,
            "title": { "english": title, "romaji": null, "native": null },
            "description": format!("{} description", title),
            "genres": ["Drama"],
            "format": "TV",
            "episodes": 12,
            "status": "FINISHED",
            "averageScore": 80,
            "coverImage": { "large": "l.png", "extraLarge": "xl.png" },
            "siteUrl": format!("https://anilist.co/anime/{}", id)
        })
    }

    #[async_trait]
    impl CatalogClient for FakeCatalog {
        async fn execute(&self, query: &str, variables: &Value) -> Result<Value> {
            let id = variables["id"].as_i64().unwrap();
            if query.contains("recommendations") {
                return Ok(json!({ "Media": { "recommendations": { "nodes": [
                    { "rating": 30, "userRating": "NO_RATING", "mediaRecommendation": media_json(10, "Alpha") },
                    { "rating": 20, "userRating": "NO_RATING", "mediaRecommendation": media_json(11, "Beta") },
                    { "rating": 10, "userRating": "NO_RATING", "mediaRecommendation": media_json(12, "Gamma") },
                    { "rating": 5, "userRating": "NO_RATING", "mediaRecommendation": null }
                ] } } }));
            }
            if id == 99 {
                return Err(ApiError::ExternalServiceError("timeout".to_string()));
            }
            Ok(json!({ "Media": media_json(id, "Favorite") }))
        }
    }

    /// Scripted answers keyed by candidate title; each call pops the next one.
    struct FakeLlm {
        answers: Mutex<HashMap<&'static str, Vec<Result<Option<String>>>>>,
        prompts: Mutex<Vec<String>>,
    }

    impl FakeLlm {
        fn new(answers: Vec<(&'static str, Vec<Result<Option<String>>>)>) -> Self {
            Self {
                answers: Mutex::new(answers.into_iter().collect()),
                prompts: Mutex::new(Vec::new()),
            }
        }
    }

    fn yes(reason: &str) -> Result<Option<String>> {
        Ok(Some(
            json!({ "would_recommend": true, "reason": reason }).to_string(),
        ))
    }

    #[async_trait]
    impl LlmClient for FakeLlm {
        async fn complete(
            &self,
            system_prompt: &str,
            user_content: &str,
            _model: &str,
            response_schema: Option<&ResponseSchema>,
        ) -> Result<Option<String>> {
            assert!(response_schema.is_some());
            self.prompts.lock().unwrap().push(system_prompt.to_string());

            let mut answers = self.answers.lock().unwrap();
            let title = ["Alpha", "Beta", "Gamma"]
                .into_iter()
                .find(|title| user_content.contains(title))
                .unwrap();
            let queue = answers.get_mut(title).unwrap();
            if queue.is_empty() {
                return Err(ApiError::LlmError("exhausted".to_string()));
            }
            queue.remove(0)
        }

        async fn list_models(&self) -> Result<Vec<Value>> {
            Ok(Vec::new())
        }
    }

    struct FakeUsers;

    #[async_trait]
    impl UserStore for FakeUsers {
        async fn get_user_by_id(&self, id: &str) -> Result<Option<UserProfile>> {
            if id != "user-1" {
                return Ok(None);
            }
            Ok(Some(UserProfile {
                id: id.to_string(),
                favorites: vec![1, 99],
                about: "I like slow character dramas".to_string(),
                interests: vec!["music".to_string()],
                ..Default::default()
            }))
        }
    }

    fn service(llm: Arc<FakeLlm>) -> RecommendationService {
        RecommendationService::new(llm, Arc::new(FakeCatalog), Arc::new(FakeUsers), "model", 10)
            .with_retry_policy(3, Duration::ZERO)
    }

    #[tokio::test]
    async fn test_failed_candidate_is_dropped() {
        let llm = Arc::new(FakeLlm::new(vec![
            ("Alpha", vec![yes("Same quiet drama")]),
            ("Beta", vec![]),
            ("Gamma", vec![yes("Music-driven story")]),
        ]));

        let recommendations = service(llm).recommend("user-1", 1).await.unwrap();

        let ids: Vec<i64> = recommendations.iter().map(|r| r.media.id).collect();
        assert_eq!(ids, vec![10, 12]);
        assert!(recommendations.iter().all(|r| r.would_recommend));
        assert_eq!(recommendations[0].reason, "Same quiet drama");
    }

    #[tokio::test]
    async fn test_empty_answer_is_dropped_without_retry() {
        let llm = Arc::new(FakeLlm::new(vec![
            ("Alpha", vec![Ok(None), yes("unused")]),
            ("Beta", vec![yes("Fits")]),
            ("Gamma", vec![yes("Fits")]),
        ]));

        let recommendations = service(llm.clone()).recommend("user-1", 1).await.unwrap();

        assert_eq!(recommendations.len(), 2);
        assert_eq!(llm.answers.lock().unwrap()["Alpha"].len(), 1);
    }

    #[tokio::test]
    async fn test_transient_failures_are_retried() {
        let llm = Arc::new(FakeLlm::new(vec![
            (
                "Alpha",
                vec![
                    Err(ApiError::LlmError("LLM API error 502".to_string())),
                    Ok(Some("not json".to_string())),
                    yes("Third time lucky"),
                ],
            ),
            ("Beta", vec![yes("Fits")]),
            (
                "Gamma",
                vec![Ok(Some(
                    json!({ "would_recommend": false, "reason": "Too much gore" }).to_string(),
                ))],
            ),
        ]));

        let recommendations = service(llm).recommend("user-1", 1).await.unwrap();

        assert_eq!(recommendations.len(), 3);
        assert_eq!(recommendations[0].reason, "Third time lucky");
        assert!(!recommendations[2].would_recommend);
    }

    #[tokio::test]
    async fn test_favorite_failures_only_shrink_context() {
        let llm = Arc::new(FakeLlm::new(vec![
            ("Alpha", vec![yes("a")]),
            ("Beta", vec![yes("b")]),
            ("Gamma", vec![yes("c")]),
        ]));

        let recommendations = service(llm.clone()).recommend("user-1", 1).await.unwrap();
        assert_eq!(recommendations.len(), 3);

        let prompts = llm.prompts.lock().unwrap();
        assert!(prompts[0].contains("Favorite"));
        assert!(prompts[0].contains("I like slow character dramas"));
        assert!(prompts[0].contains("spoilers"));
    }

    #[tokio::test]
    async fn test_unknown_user_is_rejected() {
        let llm = Arc::new(FakeLlm::new(vec![]));
        let result = service(llm).recommend("nobody", 1).await;
        assert!(matches!(result, Err(ApiError::AuthenticationError(_))));
    }

    #[test]
    fn test_parse_verdict() {
        let verdict =
            parse_verdict("```json\n{\"would_recommend\": true, \"reason\": \" Cozy \"}\n```").unwrap();
        assert_eq!(
            verdict,
            RecommendationVerdict {
                would_recommend: true,
                reason: "Cozy".to_string()
            }
        );

        assert!(parse_verdict("{\"would_recommend\": true}").is_err());
        assert!(parse_verdict("{\"would_recommend\": true, \"reason\": \"\"}").is_err());
        assert!(parse_verdict("yes").is_err());
    }

    #[test]
    fn test_grounding_context_without_profile_text() {
        let profile = UserProfile {
            id: "u".to_string(),
            ..Default::default()
        };
        let context = build_grounding_context(&[], &profile).unwrap();
        assert!(context.contains("[]"));
        assert!(context.contains("About the user: (not provided)"));
    }
}
