// src/services/ed.rs

//! Ed discussion API client.

use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use serde::Deserialize;
use serde_json::Value;

use crate::error::{AppError, Result};
use crate::models::{EdConfig, RawThread};
use crate::services::fetcher::{ThreadPage, ThreadSource};
use crate::utils::{endpoint, http};

/// Environment variable holding the API token.
pub const TOKEN_ENV: &str = "ED_API_TOKEN";

#[derive(Deserialize)]
struct ThreadListResponse {
    #[serde(default)]
    threads: Vec<Value>,
}

/// Thread source backed by the Ed REST API.
pub struct EdClient {
    client: Client,
    base_url: String,
    course_id: u64,
    token: String,
}

impl EdClient {
    pub fn new(config: &EdConfig, token: impl Into<String>) -> Result<Self> {
        Ok(Self {
            client: http::create_api_client(config)?,
            base_url: config.base_url.clone(),
            course_id: config.course_id,
            token: token.into(),
        })
    }

    /// Build a client with the token from the environment.
    pub fn from_env(config: &EdConfig) -> Result<Self> {
        let token = std::env::var(TOKEN_ENV)
            .ok()
            .filter(|t| !t.trim().is_empty())
            .ok_or_else(|| AppError::auth(format!("{TOKEN_ENV} is not set")))?;
        Self::new(config, token)
    }

    fn check_auth(status: StatusCode, context: &str) -> Result<()> {
        if status == StatusCode::UNAUTHORIZED || status == StatusCode::FORBIDDEN {
            return Err(AppError::auth(format!("{context} returned {status}")));
        }
        Ok(())
    }
}

#[async_trait]
impl ThreadSource for EdClient {
    async fn login(&self) -> Result<()> {
        let url = endpoint(&self.base_url, "user")?;
        let response = self
            .client
            .get(url)
            .bearer_auth(&self.token)
            .send()
            .await
            .map_err(|e| AppError::auth(format!("cannot reach Ed API: {e}")))?;

        Self::check_auth(response.status(), "login")?;
        response
            .error_for_status()
            .map_err(|e| AppError::auth(format!("login failed: {e}")))?;

        log::info!("Authenticated against Ed API");
        Ok(())
    }

    async fn list_threads(&self, limit: usize, offset: usize) -> Result<ThreadPage> {
        let mut url = endpoint(&self.base_url, &format!("courses/{}/threads", self.course_id))?;
        url.query_pairs_mut()
            .append_pair("limit", &limit.to_string())
            .append_pair("offset", &offset.to_string())
            .append_pair("sort", "new");

        let response = self
            .client
            .get(url)
            .bearer_auth(&self.token)
            .send()
            .await?;
        Self::check_auth(response.status(), "list_threads")?;

        let status = response.status();
        if !status.is_success() {
            return Err(AppError::fetch(
                format!("course {} offset {offset}", self.course_id),
                status,
            ));
        }

        let body: ThreadListResponse = response.json().await?;
        let raw_count = body.threads.len();
        Ok(ThreadPage {
            threads: RawThread::decode_all(body.threads),
            raw_count,
        })
    }
}
