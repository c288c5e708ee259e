//! Pre-flight checks run before a transport is opened
//!
//! Both checks are plain queries: they never touch the session. A negative
//! answer means "do not connect"; an error means the server state is unknown
//! and the caller must not connect either.

use othello_net_protocol::preflight::{NAME_CHECK_PATH, ROOM_CHECK_PATH};
use othello_net_protocol::{CheckResponse, NameCheck, RoomCheck};
use serde::Serialize;

use crate::error::PreflightError;

/// HTTP client for `/name_check` and `/room_check`
#[derive(Debug, Clone)]
pub struct PreflightValidator {
    http: reqwest::Client,
    base_url: String,
    retries: u32,
}

impl PreflightValidator {
    /// Creates a validator sharing an existing HTTP client
    ///
    /// # Arguments
    /// * `http` - Client carrying the request timeout
    /// * `base_url` - Scheme, host and port of the game server
    /// * `retries` - Extra attempts when the server cannot be reached
    pub fn new(http: reqwest::Client, base_url: impl Into<String>, retries: u32) -> Self {
        Self {
            http,
            base_url: base_url.into(),
            retries,
        }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Returns whether `name` is free in the given room
    #[tracing::instrument(skip(self))]
    pub async fn check_name_available(
        &self,
        name: &str,
        room_id: Option<&str>,
    ) -> Result<bool, PreflightError> {
        let body = NameCheck {
            name: name.to_string(),
            room_id: room_id.map(str::to_string),
        };
        self.post_check(NAME_CHECK_PATH, &body).await
    }

    /// Returns whether `room_id` names a joinable room
    #[tracing::instrument(skip(self))]
    pub async fn check_room_exists(&self, room_id: &str) -> Result<bool, PreflightError> {
        let body = RoomCheck {
            room_id: room_id.to_string(),
        };
        self.post_check(ROOM_CHECK_PATH, &body).await
    }

    async fn post_check<B: Serialize>(
        &self,
        path: &'static str,
        body: &B,
    ) -> Result<bool, PreflightError> {
        let url = format!("{}{}", self.base_url, path);
        let mut attempt = 0;

        loop {
            let result = self.http.post(&url).json(body).send().await;

            let resp = match result {
                Ok(resp) => resp,
                Err(e) if attempt < self.retries && (e.is_connect() || e.is_timeout()) => {
                    attempt += 1;
                    tracing::warn!(error = %e, attempt, path, "Pre-flight request failed, retrying");
                    continue;
                }
                Err(e) => return Err(PreflightError::Request(e)),
            };

            let status = resp.status();
            if !status.is_success() {
                return Err(PreflightError::Status {
                    path,
                    status: status.as_u16(),
                });
            }

            let answer: CheckResponse = resp.json().await?;
            tracing::debug!(path, ok = answer.ok, "Pre-flight answer");
            return Ok(answer.ok);
        }
    }
}
