// SPDX-License-Identifier: BUSL-1.1

//! HTTP client for the synchronisation server, grounded in the teacher's
//! `mux_client.rs` registration-with-backoff pattern.

use std::time::Duration;

use sync_protocol::{
    ErrorResponse, RegisterProcessRequest, RegisterProcessResponse, UpdateSensitivitiesRequest,
};

const REGISTER_MAX_ATTEMPTS: u32 = 5;
const REGISTER_BASE_DELAY_MS: u64 = 500;

pub struct ServerClient {
    http: reqwest::Client,
    base_url: String,
    auth_token: Option<String>,
}

impl ServerClient {
    pub fn new(base_url: impl Into<String>, auth_token: Option<String>) -> Self {
        Self { http: reqwest::Client::new(), base_url: base_url.into(), auth_token }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub fn auth_token(&self) -> Option<&str> {
        self.auth_token.as_deref()
    }

    fn authorize(&self, builder: reqwest::RequestBuilder) -> reqwest::RequestBuilder {
        match &self.auth_token {
            Some(token) => builder.bearer_auth(token),
            None => builder,
        }
    }

    /// Registers this process's alphabet, retrying with exponential backoff —
    /// the same shape as `mux_client::run`'s registration loop, since a
    /// `fsm-client` started alongside a not-yet-ready `sync-server` should
    /// not fail immediately.
    pub async fn register_with_retry(
        &self,
        prefix: &str,
        actions: &[String],
    ) -> anyhow::Result<RegisterProcessResponse> {
        let mut last_error = None;
        for attempt in 0..REGISTER_MAX_ATTEMPTS {
            match self.register(prefix, actions).await {
                Ok(response) => return Ok(response),
                Err(err) => {
                    tracing::warn!(attempt, %err, "alphabet registration attempt failed");
                    last_error = Some(err);
                    let delay = REGISTER_BASE_DELAY_MS * 2u64.pow(attempt);
                    tokio::time::sleep(Duration::from_millis(delay)).await;
                }
            }
        }
        Err(last_error.unwrap_or_else(|| anyhow::anyhow!("registration retries exhausted")))
    }

    async fn register(
        &self,
        prefix: &str,
        actions: &[String],
    ) -> anyhow::Result<RegisterProcessResponse> {
        let url = format!("{}/api/v1/processes", self.base_url);
        let body = RegisterProcessRequest { prefix: prefix.to_owned(), actions: actions.to_vec() };
        let response = self.authorize(self.http.post(&url)).json(&body).send().await?;
        Self::parse_response(response).await
    }

    pub async fn update_sensitivities(
        &self,
        process_id: &str,
        sensitivities: &[bool],
    ) -> anyhow::Result<()> {
        let url = format!("{}/api/v1/processes/{process_id}/sensitivities", self.base_url);
        let body = UpdateSensitivitiesRequest { sensitivities: sensitivities.to_vec() };
        let response = self.authorize(self.http.post(&url)).json(&body).send().await?;
        Self::expect_ok(response).await
    }

    pub async fn delete(&self, process_id: &str) -> anyhow::Result<()> {
        let url = format!("{}/api/v1/processes/{process_id}", self.base_url);
        let response = self.authorize(self.http.delete(&url)).send().await?;
        Self::expect_ok(response).await
    }

    async fn parse_response<T: serde::de::DeserializeOwned>(
        response: reqwest::Response,
    ) -> anyhow::Result<T> {
        if response.status().is_success() {
            Ok(response.json::<T>().await?)
        } else {
            let error: ErrorResponse = response.json().await?;
            Err(anyhow::anyhow!("{}: {}", error.error.code, error.error.message))
        }
    }

    async fn expect_ok(response: reqwest::Response) -> anyhow::Result<()> {
        if response.status().is_success() {
            Ok(())
        } else {
            let error: ErrorResponse = response.json().await?;
            Err(anyhow::anyhow!("{}: {}", error.error.code, error.error.message))
        }
    }
}
