use crate::{
    error::{ApiError, Result},
    models::UserProfile,
};
use async_trait::async_trait;
use reqwest::{Client, RequestBuilder, StatusCode};

const USERS_TABLE: &str = "users";
const PROFILE_COLUMNS: &str = "id,favorites,about,interests,content_settings";

/// Read access to stored user profiles.
#[async_trait]
pub trait UserStore: Send + Sync {
    async fn get_user_by_id(&self, id: &str) -> Result<Option<UserProfile>>;
}

/// User store backed by Supabase's PostgREST interface.
#[derive(Debug, Clone)]
pub struct SupabaseClient {
    client: Client,
    base_url: String,
    api_key: String,
}

impl SupabaseClient {
    pub fn new(base_url: &str, api_key: &str) -> Self {
        Self {
            client: Client::new(),
            base_url: base_url.trim_end_matches('/').to_string(),
            api_key: api_key.to_string(),
        }
    }

    fn user_request(&self, id: &str) -> RequestBuilder {
        self.client
            .get(format!("{}/rest/v1/{}", self.base_url, USERS_TABLE))
            .query(&[
                ("id", format!("eq.{}", id).as_str()),
                ("select", PROFILE_COLUMNS),
                ("limit", "1"),
            ])
            .header("apikey", &self.api_key)
            .header("Authorization", format!("Bearer {}", self.api_key))
    }
}

#[async_trait]
impl UserStore for SupabaseClient {
    async fn get_user_by_id(&self, id: &str) -> Result<Option<UserProfile>> {
        let response = self
            .user_request(id)
            .send()
            .await
            .map_err(|e| ApiError::ExternalServiceError(e.to_string()))?;

        match response.status() {
            StatusCode::OK => {
                let mut users: Vec<UserProfile> = response
                    .json()
                    .await
                    .map_err(|e| ApiError::SerializationError(e.to_string()))?;
                Ok(users.pop())
            }
            StatusCode::NOT_FOUND => Ok(None),
            status => Err(ApiError::ExternalServiceError(format!(
                "Unexpected status code from user store: {}",
                status
            ))),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_user_request() {
        let client = SupabaseClient::new("https://project.supabase.co/", "anon");
        let request = client.user_request("65f1c2").build().unwrap();

        let query: Vec<(String, String)> = request.url().query_pairs().into_owned().collect();
        assert_eq!(request.url().path(), "/rest/v1/users");
        assert_eq!(
            query,
            vec![
                ("id".to_string(), "eq.65f1c2".to_string()),
                ("select".to_string(), PROFILE_COLUMNS.to_string()),
                ("limit".to_string(), "1".to_string()),
            ]
        );
        assert_eq!(request.headers()["apikey"], "anon");
    }

    #[test]
    fn test_user_id_cannot_inject_query_parameters() {
        let client = SupabaseClient::new("https://project.supabase.co", "anon");
        let request = client
            .user_request("1&select=password&id=neq.0")
            .build()
            .unwrap();

        let query: Vec<(String, String)> = request.url().query_pairs().into_owned().collect();
        assert_eq!(query.len(), 3);
        assert_eq!(query[0].1, "eq.1&select=password&id=neq.0");
        assert!(!request.url().as_str().contains("&select=password"));
    }
}
