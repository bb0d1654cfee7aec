use crate::{
    error::{ApiError, Result},
    models::{Media, RecommendationNode},
    services::query_compiler::CompiledQuery,
};
use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use serde::Deserialize;
use serde_json::{json, Value};
use std::time::Duration;
use tracing::debug;

/// Selection set returned for every searched media node.
pub const MEDIA_SEARCH_SELECTION: &str = r#"
        season
        title {
            english
            native
            romaji
        }
        popularity
        averageScore
        genres
        format
        description
        chapters
        episodes
        coverImage {
            large
            extraLarge
        }
        endDate {
            day
            month
            year
        }
        seasonYear
        siteUrl
        status
        type
        volumes
        isAdult
        id
"#;

const MEDIA_DETAILS_QUERY: &str = r#"
query ($id: Int) {
    Media(id: $id) {
        id
        title {
            english
            native
            romaji
        }
        description
        genres
        format
        episodes
        chapters
        status
        averageScore
    }
}
"#;

const MEDIA_RECOMMENDATIONS_QUERY: &str = r#"
query ($id: Int, $perPage: Int) {
    Media(id: $id) {
        recommendations(perPage: $perPage, sort: RATING_DESC) {
            nodes {
                rating
                userRating
                mediaRecommendation {
                    id
                    title {
                        english
                        native
                        romaji
                    }
                    description
                    genres
                    format
                    episodes
                    chapters
                    status
                    averageScore
                    coverImage {
                        large
                        extraLarge
                    }
                    siteUrl
                }
            }
        }
    }
}
"#;

/// GraphQL media catalog.
///
/// Implementors only provide [`CatalogClient::execute`]; the typed lookups
/// are built on top of it.
#[async_trait]
pub trait CatalogClient: Send + Sync {
    /// Run a GraphQL document and return its `data` member. A non-empty
    /// `errors` array becomes [`ApiError::CatalogQuery`].
    async fn execute(&self, query: &str, variables: &Value) -> Result<Value>;

    /// Run a compiled search and return the raw `Page.media` nodes.
    async fn search_media(&self, compiled: &CompiledQuery) -> Result<Vec<Value>> {
        let data = self
            .execute(&compiled.document, &Value::Object(compiled.variables.clone()))
            .await?;

        match data.pointer("/Page/media") {
            Some(Value::Array(media)) => Ok(media.clone()),
            _ => Ok(Vec::new()),
        }
    }

    /// Full details of one media, `None` when the catalog has no such node.
    async fn media_details(&self, id: i64) -> Result<Option<Media>> {
        let data = self.execute(MEDIA_DETAILS_QUERY, &json!({ "id": id })).await?;

        match data.get("Media") {
            Some(node) if !node.is_null() => Ok(Some(serde_json::from_value(node.clone())?)),
            _ => Ok(None),
        }
    }

    /// Catalog-suggested titles for `id`, best rated first.
    async fn media_recommendations(
        &self,
        id: i64,
        per_page: u32,
    ) -> Result<Vec<RecommendationNode>> {
        let data = self
            .execute(
                MEDIA_RECOMMENDATIONS_QUERY,
                &json!({ "id": id, "perPage": per_page }),
            )
            .await?;

        match data.pointer("/Media/recommendations/nodes") {
            Some(nodes) if !nodes.is_null() => Ok(serde_json::from_value(nodes.clone())?),
            _ => Err(ApiError::NotFound(format!("Media {} not found", id))),
        }
    }
}

#[derive(Debug, Deserialize)]
struct GraphQlError {
    message: String,
    #[serde(default)]
    status: Option<u16>,
}

#[derive(Debug, Deserialize)]
struct GraphQlResponse {
    #[serde(default)]
    data: Value,
    #[serde(default)]
    errors: Option<Vec<GraphQlError>>,
}

impl GraphQlResponse {
    /// A response whose only errors are 404s is a missing node: its `data`
    /// (with the node set to null) is returned for the lookups to handle.
    fn into_data(self) -> Result<Value> {
        match self.errors {
            Some(errors) if !errors.is_empty() && errors.iter().all(|e| e.status == Some(404)) => {
                debug!("Catalog node not found: {}", errors[0].message);
                Ok(self.data)
            }
            Some(errors) if !errors.is_empty() => Err(ApiError::CatalogQuery(
                errors
                    .into_iter()
                    .map(|e| e.message)
                    .collect::<Vec<_>>()
                    .join(", "),
            )),
            _ => Ok(self.data),
        }
    }
}

/// AniList GraphQL-over-HTTP client.
#[derive(Debug, Clone)]
pub struct AniListClient {
    client: Client,
    url: String,
}

impl AniListClient {
    pub fn new(url: &str, timeout_seconds: u64) -> Result<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(timeout_seconds))
            .build()
            .map_err(|e| ApiError::InternalError(format!("Failed to create HTTP client: {}", e)))?;

        Ok(Self {
            client,
            url: url.to_string(),
        })
    }
}

#[async_trait]
impl CatalogClient for AniListClient {
    async fn execute(&self, query: &str, variables: &Value) -> Result<Value> {
        debug!("Catalog query variables: {}", variables);

        let response = self
            .client
            .post(&self.url)
            .header("Accept", "application/json")
            .json(&json!({ "query": query, "variables": variables }))
            .send()
            .await?;

        // AniList reports GraphQL errors with a 4xx status and a regular body
        let status = response.status();
        let text = response.text().await?;
        parse_response(status, &text)
    }
}

fn parse_response(status: StatusCode, text: &str) -> Result<Value> {
    let body: GraphQlResponse = serde_json::from_str(text).map_err(|e| {
        ApiError::ExternalServiceError(format!(
            "Unexpected catalog response ({}): {}",
            status, e
        ))
    })?;

    body.into_data()
}
