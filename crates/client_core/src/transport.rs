//! Thin typed REST transport for the portal API.

use reqwest::{Client, RequestBuilder, StatusCode};
use serde::{de::DeserializeOwned, Serialize};
use shared::error::{ApiError, ErrorCode};
use url::Url;

use crate::error::SessionError;

pub struct RestTransport {
    http: Client,
    base_url: Url,
}

impl RestTransport {
    pub fn new(base_url: Url) -> Self {
        Self {
            http: Client::new(),
            base_url,
        }
    }

    fn endpoint(&self, path: &str) -> String {
        format!(
            "{}/{}",
            self.base_url.as_str().trim_end_matches('/'),
            path.trim_start_matches('/')
        )
    }

    pub async fn get_json<R: DeserializeOwned>(
        &self,
        path: &str,
        bearer: Option<&str>,
    ) -> Result<R, SessionError> {
        let request = self.http.get(self.endpoint(path));
        execute_json(with_bearer(request, bearer)).await
    }

    pub async fn post_json<B: Serialize, R: DeserializeOwned>(
        &self,
        path: &str,
        body: &B,
        bearer: Option<&str>,
    ) -> Result<R, SessionError> {
        let request = self.http.post(self.endpoint(path)).json(body);
        execute_json(with_bearer(request, bearer)).await
    }

    pub async fn put_json<B: Serialize, R: DeserializeOwned>(
        &self,
        path: &str,
        body: &B,
        bearer: Option<&str>,
    ) -> Result<R, SessionError> {
        let request = self.http.put(self.endpoint(path)).json(body);
        execute_json(with_bearer(request, bearer)).await
    }

    /// POST without a body, discarding any response payload.
    pub async fn post_empty(&self, path: &str, bearer: Option<&str>) -> Result<(), SessionError> {
        let request = with_bearer(self.http.post(self.endpoint(path)), bearer);
        let response = request.send().await?;
        check_status(response).await?;
        Ok(())
    }
}

fn with_bearer(request: RequestBuilder, bearer: Option<&str>) -> RequestBuilder {
    match bearer {
        Some(token) => request.bearer_auth(token),
        None => request,
    }
}

async fn execute_json<R: DeserializeOwned>(request: RequestBuilder) -> Result<R, SessionError> {
    let response = request.send().await?;
    let response = check_status(response).await?;
    Ok(response.json::<R>().await?)
}

async fn check_status(response: reqwest::Response) -> Result<reqwest::Response, SessionError> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }

    if status == StatusCode::UNAUTHORIZED {
        return Err(SessionError::Unauthorized);
    }

    let error = response.json::<ApiError>().await.unwrap_or_else(|_| {
        ApiError::new(
            ErrorCode::Internal,
            format!("request failed with status {status}"),
        )
    });
    Err(SessionError::Api(error))
}
