use std::{sync::Arc, time::Duration};

use async_trait::async_trait;
use reqwest::{Client, Response, StatusCode};
use serde::de::DeserializeOwned;
use shared::{
    domain::{Gift, GiftId},
    error::{ApiException, ErrorCode},
    protocol::{ContributionRequest, ContributionResponse, GiftListResponse, GiftResponse},
};
use thiserror::Error;
use tracing::debug;
use url::Url;

const CONTRIBUTE_PATH: &str = "api/contribuir";
const GIFTS_PATH: &str = "api/presentes";

#[derive(Debug, Error)]
pub enum GatewayError {
    #[error("invalid registry server url '{url}': {source}")]
    InvalidUrl {
        url: String,
        source: url::ParseError,
    },
    #[error("request to {url} failed: {source}")]
    Transport {
        url: String,
        source: reqwest::Error,
    },
    #[error("unexpected response from {url} (HTTP {status}): {detail}")]
    UnexpectedResponse {
        url: String,
        status: u16,
        detail: String,
    },
    #[error(transparent)]
    Api(#[from] ApiException),
}

#[async_trait]
pub trait ContributionGateway: Send + Sync {
    /// `POST /api/contribuir`. A decoded `success: false` body is returned as `Ok`; the
    /// caller decides how to surface it.
    async fn submit_contribution(
        &self,
        request: &ContributionRequest,
    ) -> Result<ContributionResponse, GatewayError>;

    async fn list_gifts(&self) -> Result<Vec<Gift>, GatewayError>;

    async fn fetch_gift(&self, gift_id: GiftId) -> Result<Gift, GatewayError>;
}

#[async_trait]
impl<G: ContributionGateway + ?Sized> ContributionGateway for Arc<G> {
    async fn submit_contribution(
        &self,
        request: &ContributionRequest,
    ) -> Result<ContributionResponse, GatewayError> {
        (**self).submit_contribution(request).await
    }

    async fn list_gifts(&self) -> Result<Vec<Gift>, GatewayError> {
        (**self).list_gifts().await
    }

    async fn fetch_gift(&self, gift_id: GiftId) -> Result<Gift, GatewayError> {
        (**self).fetch_gift(gift_id).await
    }
}

#[derive(Debug, Clone)]
pub struct RegistryClient {
    http: Client,
    base_url: Url,
}

impl RegistryClient {
    pub fn new(server_url: &str) -> Result<Self, GatewayError> {
        Ok(Self {
            http: Client::new(),
            base_url: parse_base_url(server_url)?,
        })
    }

    pub fn with_timeout(server_url: &str, timeout: Duration) -> Result<Self, GatewayError> {
        let base_url = parse_base_url(server_url)?;
        let http = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|source| GatewayError::Transport {
                url: base_url.to_string(),
                source,
            })?;
        Ok(Self { http, base_url })
    }

    fn endpoint(&self, path: &str) -> Result<Url, GatewayError> {
        self.base_url
            .join(path)
            .map_err(|source| GatewayError::InvalidUrl {
                url: format!("{}{path}", self.base_url),
                source,
            })
    }

    async fn send(
        &self,
        url: &Url,
        request: reqwest::RequestBuilder,
    ) -> Result<Response, GatewayError> {
        request
            .send()
            .await
            .map_err(|source| GatewayError::Transport {
                url: url.to_string(),
                source,
            })
    }

    /// Decodes the JSON body regardless of status: the backend reports business errors as
    /// `{success: false, error}` with 4xx/5xx codes.
    async fn read_json<T: DeserializeOwned>(
        &self,
        url: &Url,
        response: Response,
    ) -> Result<(StatusCode, T), GatewayError> {
        let status = response.status();
        let body = response
            .bytes()
            .await
            .map_err(|source| GatewayError::Transport {
                url: url.to_string(),
                source,
            })?;
        debug!(%url, status = status.as_u16(), bytes = body.len(), "registry response");

        match serde_json::from_slice::<T>(&body) {
            Ok(decoded) => Ok((status, decoded)),
            Err(err) => Err(GatewayError::UnexpectedResponse {
                url: url.to_string(),
                status: status.as_u16(),
                detail: if status.is_success() {
                    err.to_string()
                } else {
                    status
                        .canonical_reason()
                        .unwrap_or("request failed")
                        .to_string()
                },
            }),
        }
    }
}

#[async_trait]
impl ContributionGateway for RegistryClient {
    async fn submit_contribution(
        &self,
        request: &ContributionRequest,
    ) -> Result<ContributionResponse, GatewayError> {
        let url = self.endpoint(CONTRIBUTE_PATH)?;
        let response = self
            .send(&url, self.http.post(url.clone()).json(request))
            .await?;
        let (_, body) = self.read_json::<ContributionResponse>(&url, response).await?;
        Ok(body)
    }

    async fn list_gifts(&self) -> Result<Vec<Gift>, GatewayError> {
        let url = self.endpoint(GIFTS_PATH)?;
        let response = self.send(&url, self.http.get(url.clone())).await?;
        let (_, body) = self.read_json::<GiftListResponse>(&url, response).await?;
        if !body.success {
            return Err(ApiException::new(
                ErrorCode::Rejected,
                body.error
                    .unwrap_or_else(|| "gift list unavailable".to_string()),
            )
            .into());
        }
        Ok(body.gifts)
    }

    async fn fetch_gift(&self, gift_id: GiftId) -> Result<Gift, GatewayError> {
        let url = self.endpoint(&format!("{GIFTS_PATH}/{gift_id}"))?;
        let response = self.send(&url, self.http.get(url.clone())).await?;
        let (status, body) = self.read_json::<GiftResponse>(&url, response).await?;

        match (body.success, body.gift) {
            (true, Some(gift)) => Ok(gift),
            (true, None) => Err(GatewayError::UnexpectedResponse {
                url: url.to_string(),
                status: status.as_u16(),
                detail: "response has no gift".to_string(),
            }),
            (false, _) => {
                let code = if status == StatusCode::NOT_FOUND {
                    ErrorCode::NotFound
                } else {
                    ErrorCode::Rejected
                };
                let message = body
                    .error
                    .unwrap_or_else(|| format!("gift {gift_id} unavailable"));
                Err(ApiException::new(code, message).into())
            }
        }
    }
}

/// Parses the server url and makes sure relative endpoint paths resolve beneath it.
fn parse_base_url(server_url: &str) -> Result<Url, GatewayError> {
    let trimmed = server_url.trim();
    let with_slash = if trimmed.ends_with('/') {
        trimmed.to_string()
    } else {
        format!("{trimmed}/")
    };
    Url::parse(&with_slash).map_err(|source| GatewayError::InvalidUrl {
        url: trimmed.to_string(),
        source,
    })
}

#[cfg(test)]
#[path = "tests/gateway_tests.rs"]
mod tests;
