//! REST persistence backend.
//!
//! Talks JSON over HTTPS with bearer authentication. Paths are relative
//! to the configured base URL:
//!
//! | Call | Method and path | Body |
//! |---|---|---|
//! | authenticate | `GET api/User/Auth` | |
//! | get pet | `GET api/Pet` | |
//! | create pet | `POST api/Pet` | `{"PetName": ...}` |
//! | delete pet | `DELETE api/Pet` | |
//! | save stats | `PUT api/Pet` | `{"XP": ..., "Health": ...}` |
//! | high score | `GET`/`PUT api/User/HighScore` | integer |
//! | theme | `GET`/`PUT api/User/Theme` | integer |

use std::time::Duration;

use reqwest::{Client, RequestBuilder, Response, StatusCode};
use serde::Serialize;
use serde::de::DeserializeOwned;
use tamagotchi_core::config::RemoteConfig;
use tamagotchi_types::{PetRecord, TokenSet};

use crate::error::RemoteError;

#[derive(Serialize)]
#[serde(rename_all = "PascalCase")]
struct CreatePetBody<'a> {
    pet_name: &'a str,
}

#[derive(Serialize)]
#[serde(rename_all = "PascalCase")]
struct UpdatePetBody {
    #[serde(rename = "XP")]
    xp: i64,
    health: f64,
}

/// Client for the REST persistence service.
#[derive(Debug, Clone)]
pub struct HttpPetStore {
    client: Client,
    base_url: String,
}

impl HttpPetStore {
    /// Build a client for the configured service.
    ///
    /// # Errors
    ///
    /// Returns [`RemoteError::Http`] if the HTTP client cannot be built.
    pub fn new(config: &RemoteConfig) -> Result<Self, RemoteError> {
        let client = Client::builder()
            .timeout(Duration::from_millis(config.request_timeout_ms))
            .build()?;
        Ok(Self {
            client,
            base_url: config.api_base_url.trim_end_matches('/').to_owned(),
        })
    }

    /// Absolute URL for a service path.
    pub fn endpoint(&self, path: &str) -> String {
        format!("{}/{}", self.base_url, path.trim_start_matches('/'))
    }

    fn request(&self, method: reqwest::Method, path: &str, tokens: &TokenSet) -> RequestBuilder {
        self.client
            .request(method, self.endpoint(path))
            .bearer_auth(&tokens.id_token)
            .header("Accept", "application/json")
    }

    pub(crate) async fn authenticate(&self, tokens: &TokenSet) -> Result<(), RemoteError> {
        let response = self
            .request(reqwest::Method::GET, "api/User/Auth", tokens)
            .send()
            .await?;
        check(response, "authenticate").await.map(drop)
    }

    pub(crate) async fn get_pet(&self, tokens: &TokenSet) -> Result<Option<PetRecord>, RemoteError> {
        let response = self
            .request(reqwest::Method::GET, "api/Pet", tokens)
            .send()
            .await?;
        if matches!(response.status(), StatusCode::NOT_FOUND | StatusCode::NO_CONTENT) {
            return Ok(None);
        }
        let response = check(response, "get pet").await?;
        let body = response.text().await?;
        // The service answers `null` for an account without a pet.
        serde_json::from_str(&body).map_err(|source| RemoteError::Decode {
            operation: "get pet",
            source,
        })
    }

    pub(crate) async fn create_pet(
        &self,
        tokens: &TokenSet,
        name: &str,
    ) -> Result<PetRecord, RemoteError> {
        let response = self
            .request(reqwest::Method::POST, "api/Pet", tokens)
            .json(&CreatePetBody { pet_name: name })
            .send()
            .await?;
        decode(check(response, "create pet").await?, "create pet").await
    }

    pub(crate) async fn delete_pet(&self, tokens: &TokenSet) -> Result<(), RemoteError> {
        let response = self
            .request(reqwest::Method::DELETE, "api/Pet", tokens)
            .send()
            .await?;
        check(response, "delete pet").await.map(drop)
    }

    pub(crate) async fn put_pet_stats(
        &self,
        tokens: &TokenSet,
        xp: i64,
        health: f64,
    ) -> Result<(), RemoteError> {
        let response = self
            .request(reqwest::Method::PUT, "api/Pet", tokens)
            .json(&UpdatePetBody { xp, health })
            .send()
            .await?;
        check(response, "save stats").await.map(drop)
    }

    pub(crate) async fn get_high_score(&self, tokens: &TokenSet) -> Result<i64, RemoteError> {
        let response = self
            .request(reqwest::Method::GET, "api/User/HighScore", tokens)
            .send()
            .await?;
        decode(check(response, "get high score").await?, "get high score").await
    }

    pub(crate) async fn update_high_score(
        &self,
        tokens: &TokenSet,
        score: i64,
    ) -> Result<(), RemoteError> {
        let response = self
            .request(reqwest::Method::PUT, "api/User/HighScore", tokens)
            .json(&score)
            .send()
            .await?;
        check(response, "update high score").await.map(drop)
    }

    pub(crate) async fn get_theme(&self, tokens: &TokenSet) -> Result<i64, RemoteError> {
        let response = self
            .request(reqwest::Method::GET, "api/User/Theme", tokens)
            .send()
            .await?;
        decode(check(response, "get theme").await?, "get theme").await
    }

    pub(crate) async fn put_theme(&self, tokens: &TokenSet, theme: i32) -> Result<(), RemoteError> {
        let response = self
            .request(reqwest::Method::PUT, "api/User/Theme", tokens)
            .json(&theme)
            .send()
            .await?;
        check(response, "put theme").await.map(drop)
    }
}

/// Turn a non-success status into an error carrying the response body.
pub(crate) async fn check(response: Response, operation: &'static str) -> Result<Response, RemoteError> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }
    let body = response
        .text()
        .await
        .unwrap_or_else(|_| "unable to read error body".to_owned());
    if matches!(status, StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN) {
        return Err(RemoteError::Unauthorized {
            reason: format!("{operation} returned {status}"),
        });
    }
    Err(RemoteError::Status {
        operation,
        status: status.as_u16(),
        body,
    })
}

/// Read a JSON body into `T`.
pub(crate) async fn decode<T: DeserializeOwned>(
    response: Response,
    operation: &'static str,
) -> Result<T, RemoteError> {
    let body = response.text().await?;
    serde_json::from_str(&body).map_err(|source| RemoteError::Decode { operation, source })
}
