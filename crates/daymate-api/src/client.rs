//! HTTP client for the DayMate backend.

use std::time::Duration;

use reqwest::{Client, RequestBuilder, Response};
use serde::de::DeserializeOwned;
use tracing::instrument;
use url::Url;

use crate::error::ApiError;
use crate::retry::RetryPolicy;
use crate::types::*;

#[derive(Debug, Clone)]
pub struct DayMateClient {
    client: Client,
    base_url: Url,
    retry: RetryPolicy,
}

impl DayMateClient {
    /// Create a client for the backend at `base_url`.
    pub fn new(base_url: &str, timeout: Duration) -> Result<Self, ApiError> {
        let base_url = Url::parse(base_url)
            .map_err(|e| ApiError::InvalidUrl(format!("{}: {}", base_url, e)))?;
        if base_url.cannot_be_a_base() {
            return Err(ApiError::InvalidUrl(base_url.to_string()));
        }

        let client = Client::builder()
            .timeout(timeout)
            .user_agent(concat!("DayMate/", env!("CARGO_PKG_VERSION")))
            .build()?;

        Ok(Self {
            client,
            base_url,
            retry: RetryPolicy::default(),
        })
    }

    /// Replace the retry policy used for idempotent reads.
    pub fn with_retry(mut self, retry: RetryPolicy) -> Self {
        self.retry = retry;
        self
    }

    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    fn endpoint(&self, segments: &[&str]) -> Result<Url, ApiError> {
        let mut url = self.base_url.clone();
        url.path_segments_mut()
            .map_err(|_| ApiError::InvalidUrl(self.base_url.to_string()))?
            .pop_if_empty()
            .extend(segments);
        Ok(url)
    }

    fn authorize(request: RequestBuilder, token: Option<&str>) -> RequestBuilder {
        match token {
            Some(token) => request.bearer_auth(token),
            None => request,
        }
    }

    /// Exchange credentials for a bearer token.
    #[instrument(skip(self, password), level = "info")]
    pub async fn login(&self, email: &str, password: &str) -> Result<String, ApiError> {
        let url = self.endpoint(&["auth", "login"])?;
        let body = LoginRequest {
            email: email.to_string(),
            password: password.to_string(),
        };

        let response = self.client.post(url).json(&body).send().await?;
        let token: TokenResponse = Self::handle_response(response).await?;
        Ok(token.access_token)
    }

    /// Create an account. Does not authenticate.
    #[instrument(skip(self, password), level = "info")]
    pub async fn register(
        &self,
        full_name: &str,
        email: &str,
        password: &str,
    ) -> Result<(), ApiError> {
        let url = self.endpoint(&["auth", "register"])?;
        let body = RegisterRequest {
            full_name: full_name.to_string(),
            email: email.to_string(),
            password: password.to_string(),
        };

        let response = self.client.post(url).json(&body).send().await?;
        Self::check_status(response).await?;
        Ok(())
    }

    /// Saved locations for the account owning `token`.
    #[instrument(skip(self, token), level = "info")]
    pub async fn list_locations(&self, token: &str) -> Result<Vec<LocationRecord>, ApiError> {
        let url = self.endpoint(&["api", "locations"])?;
        let response = self
            .retry
            .run(|| self.client.get(url.clone()).bearer_auth(token).send())
            .await?;
        Self::handle_response(response).await
    }

    #[instrument(skip(self, token), level = "info")]
    pub async fn create_location(
        &self,
        token: &str,
        location: &NewLocation,
    ) -> Result<LocationRecord, ApiError> {
        let url = self.endpoint(&["api", "locations"])?;
        let response = self
            .client
            .post(url)
            .bearer_auth(token)
            .json(location)
            .send()
            .await?;
        Self::handle_response(response).await
    }

    #[instrument(skip(self, token), level = "info")]
    pub async fn delete_location(&self, token: &str, id: &str) -> Result<(), ApiError> {
        let url = self.endpoint(&["api", "locations", id])?;
        let response = self.client.delete(url).bearer_auth(token).send().await?;
        Self::check_status(response).await?;
        Ok(())
    }

    /// Current weather at the given coordinates. Sent once; a failure is
    /// reported to the user rather than retried.
    #[instrument(skip(self, token), level = "debug")]
    pub async fn weather(
        &self,
        lat: f64,
        lon: f64,
        token: Option<&str>,
    ) -> Result<WeatherSnapshot, ApiError> {
        let url = self.endpoint(&["api", "weather"])?;
        let response = Self::authorize(self.client.get(url), token)
            .query(&[("lat", lat), ("lon", lon)])
            .send()
            .await?;
        Self::handle_response(response).await
    }

    /// Headlines near the given coordinates. Sent once, like `weather`.
    #[instrument(skip(self, token), level = "debug")]
    pub async fn news(
        &self,
        lat: f64,
        lon: f64,
        token: Option<&str>,
    ) -> Result<NewsSnapshot, ApiError> {
        let url = self.endpoint(&["api", "news"])?;
        let response = Self::authorize(self.client.get(url), token)
            .query(&[("lat", lat), ("lon", lon)])
            .send()
            .await?;
        Self::handle_response(response).await
    }

    /// Ask the backend to generate a plan. Not retried: each call may be
    /// recorded in the account's history.
    #[instrument(skip(self, token, request), fields(location = %request.location_name), level = "info")]
    pub async fn generate_plan(
        &self,
        token: Option<&str>,
        request: &PlanRequest,
    ) -> Result<PlanEnvelope, ApiError> {
        let url = self.endpoint(&["api", "plan"])?;
        let response = Self::authorize(self.client.post(url), token)
            .json(request)
            .send()
            .await?;
        Self::handle_response(response).await
    }

    /// Past plans for the account, newest first.
    #[instrument(skip(self, token), level = "info")]
    pub async fn plan_history(&self, token: &str) -> Result<Vec<PlanHistoryEntry>, ApiError> {
        let url = self.endpoint(&["api", "plan", "history"])?;
        let response = self
            .retry
            .run(|| self.client.get(url.clone()).bearer_auth(token).send())
            .await?;
        let history: PlanHistoryResponse = Self::handle_response(response).await?;
        Ok(history.plans)
    }

    /// `GET /health`; true when the backend answers 2xx.
    pub async fn health_check(&self) -> Result<bool, ApiError> {
        let url = self.endpoint(&["health"])?;
        let response = self.client.get(url).send().await?;
        Ok(response.status().is_success())
    }

    async fn check_status(response: Response) -> Result<Response, ApiError> {
        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }

        let body = response.text().await.unwrap_or_default();
        tracing::debug!(status = status.as_u16(), "Backend returned error: {}", body);
        Err(ApiError::from_body(status.as_u16(), &body))
    }

    async fn handle_response<T: DeserializeOwned>(response: Response) -> Result<T, ApiError> {
        let response = Self::check_status(response).await?;
        let bytes = response.bytes().await?;
        serde_json::from_slice(&bytes).map_err(|e| ApiError::Decode(e.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn client(base: &str) -> DayMateClient {
        DayMateClient::new(base, Duration::from_secs(5)).unwrap()
    }

    #[test]
    fn test_invalid_base_url() {
        assert!(DayMateClient::new("not a url", Duration::from_secs(1)).is_err());
        assert!(DayMateClient::new("mailto:someone@example.com", Duration::from_secs(1)).is_err());
    }

    #[test]
    fn test_endpoint_joins_segments() {
        let c = client("http://localhost:8000");
        assert_eq!(
            c.endpoint(&["api", "plan", "history"]).unwrap().as_str(),
            "http://localhost:8000/api/plan/history"
        );
    }

    #[test]
    fn test_endpoint_respects_base_path_and_trailing_slash() {
        let c = client("http://example.com/daymate/");
        assert_eq!(
            c.endpoint(&["api", "locations"]).unwrap().as_str(),
            "http://example.com/daymate/api/locations"
        );
    }

    #[test]
    fn test_endpoint_escapes_ids() {
        let c = client("http://localhost:8000");
        let url = c.endpoint(&["api", "locations", "a/b"]).unwrap();
        assert_eq!(url.as_str(), "http://localhost:8000/api/locations/a%2Fb");
    }
}
