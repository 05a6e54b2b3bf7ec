// src/core/service_client.rs
//! Thin HTTP client for the downstream JSON services (France Travail and the
//! static site hosting the reference PDF).

use anyhow::{Context, Result};
use serde::{de::DeserializeOwned, Serialize};
use std::time::Duration;
use thiserror::Error;
use tracing::{error, trace};

#[derive(Debug, Error)]
pub enum ServiceError {
    #[error("Request to {url} failed: {message}")]
    Transport { url: String, message: String },
    #[error("{url} returned HTTP {status}: {body}")]
    Status { url: String, status: u16, body: String },
    #[error("Invalid JSON from {url}: {message}")]
    Decode { url: String, message: String },
}

impl ServiceError {
    pub fn status(&self) -> Option<u16> {
        match self {
            ServiceError::Status { status, .. } => Some(*status),
            _ => None,
        }
    }
}

#[derive(Clone)]
pub struct ServiceClient {
    client: reqwest::Client,
}

impl ServiceClient {
    pub fn new(timeout_seconds: u64) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(timeout_seconds))
            .build()
            .context("Failed to create HTTP client")?;

        Ok(Self { client })
    }

    /// POST an urlencoded form and decode the JSON reply.
    pub async fn post_form<R>(&self, url: &str, form: &[(&str, &str)]) -> Result<R, ServiceError>
    where
        R: DeserializeOwned,
    {
        let request = self.client.post(url).form(form);
        self.send(url, request)
            .await?
            .ok_or_else(|| ServiceError::Decode {
                url: url.to_string(),
                message: "empty body".to_string(),
            })
    }

    /// Authenticated GET. `None` when the service answers with no content.
    pub async fn get_json<R>(
        &self,
        url: &str,
        token: &str,
        query: &[(&str, String)],
    ) -> Result<Option<R>, ServiceError>
    where
        R: DeserializeOwned,
    {
        let request = self
            .client
            .get(url)
            .bearer_auth(token)
            .header(reqwest::header::ACCEPT, "application/json")
            .query(query);
        self.send(url, request).await
    }

    /// Authenticated JSON POST. `None` when the service answers with no content.
    pub async fn post_json<T, R>(&self, url: &str, token: &str, payload: &T) -> Result<Option<R>, ServiceError>
    where
        T: Serialize,
        R: DeserializeOwned,
    {
        let request = self
            .client
            .post(url)
            .bearer_auth(token)
            .header(reqwest::header::ACCEPT, "application/json")
            .json(payload);
        self.send(url, request).await
    }

    /// Raw download, used for the reference PDF.
    pub async fn get_bytes(&self, url: &str) -> Result<Vec<u8>, ServiceError> {
        let response = self
            .client
            .get(url)
            .send()
            .await
            .map_err(|e| transport(url, e))?;

        let status = response.status();
        if !status.is_success() {
            return Err(ServiceError::Status {
                url: url.to_string(),
                status: status.as_u16(),
                body: String::new(),
            });
        }

        response
            .bytes()
            .await
            .map(|b| b.to_vec())
            .map_err(|e| transport(url, e))
    }

    async fn send<R>(&self, url: &str, request: reqwest::RequestBuilder) -> Result<Option<R>, ServiceError>
    where
        R: DeserializeOwned,
    {
        let response = request.send().await.map_err(|e| transport(url, e))?;

        let status = response.status();
        trace!("{} answered {}", url, status);

        let body = response
            .text()
            .await
            .unwrap_or_else(|_| "Unknown error".to_string());

        if !status.is_success() {
            error!("Service error {} from {}: {}", status, url, body);
            return Err(ServiceError::Status {
                url: url.to_string(),
                status: status.as_u16(),
                body,
            });
        }

        decode_body(url, &body)
    }
}

fn transport(url: &str, e: reqwest::Error) -> ServiceError {
    ServiceError::Transport {
        url: url.to_string(),
        message: e.to_string(),
    }
}

fn decode_body<R: DeserializeOwned>(url: &str, body: &str) -> Result<Option<R>, ServiceError> {
    if body.trim().is_empty() {
        return Ok(None);
    }
    serde_json::from_str(body)
        .map(Some)
        .map_err(|e| ServiceError::Decode {
            url: url.to_string(),
            message: e.to_string(),
        })
}
