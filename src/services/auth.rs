use crate::error::{ApiError, Result};
use actix_web::{http::header::AUTHORIZATION, HttpRequest};
use jsonwebtoken::{decode, Algorithm, DecodingKey, Validation};
use serde::{Deserialize, Serialize};

/// Claims carried by session tokens.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    #[serde(rename = "_id")]
    pub id: String,
    #[serde(default)]
    pub username: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub exp: Option<u64>,
}

/// Verifies HS256 bearer tokens and resolves them to a user id.
#[derive(Clone)]
pub struct TokenVerifier {
    key: DecodingKey,
    validation: Validation,
}

impl TokenVerifier {
    pub fn new(secret: &str) -> Self {
        let mut validation = Validation::new(Algorithm::HS256);
        // Tokens without an expiry are accepted; an expired `exp` is not
        validation.required_spec_claims.clear();

        Self {
            key: DecodingKey::from_secret(secret.as_bytes()),
            validation,
        }
    }

    pub fn verify(&self, token: &str) -> Result<Claims> {
        Ok(decode::<Claims>(token, &self.key, &self.validation)?.claims)
    }

    /// `Ok(None)` when the request carries no bearer token at all.
    pub fn user_id(&self, request: &HttpRequest) -> Result<Option<String>> {
        match bearer_token(request) {
            Some(token) => self.verify(token).map(|claims| Some(claims.id)),
            None => Ok(None),
        }
    }

    /// Like [`TokenVerifier::user_id`], but a missing token is an error.
    pub fn require_user_id(&self, request: &HttpRequest) -> Result<String> {
        self.user_id(request)?
            .ok_or_else(|| ApiError::AuthenticationError("No token provided".to_string()))
    }
}

pub fn bearer_token(request: &HttpRequest) -> Option<&str> {
    request
        .headers()
        .get(AUTHORIZATION)?
        .to_str()
        .ok()?
        .strip_prefix("Bearer ")
        .map(str::trim)
        .filter(|token| !token.is_empty())
}
