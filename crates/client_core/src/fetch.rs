//! Remote collection fetcher over the asset management HTTP API.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use serde::de::DeserializeOwned;
use shared::{
    domain::AssetId,
    error::{ApiError, FetchError},
    protocol::{
        AssetDetail, AssetListQuery, AssetPage, AssignmentPage, CategorySummary, LoginRequest,
        Profile,
    },
};
use url::Url;

/// All requests that do not complete within this window fail as
/// [`FetchError::Network`].
pub const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

/// Read-side operations the console consumes from the backend.
///
/// Every operation is an idempotent GET and safe to re-invoke; superseded
/// in-flight requests are simply dropped by the caller.
#[async_trait]
pub trait AssetDirectory: Send + Sync {
    async fn list_assets(&self, query: &AssetListQuery) -> Result<AssetPage, FetchError>;
    async fn list_categories(&self) -> Result<Vec<CategorySummary>, FetchError>;
    async fn get_asset(&self, asset_id: AssetId) -> Result<AssetDetail, FetchError>;
    async fn list_assignments(&self, page: u32) -> Result<AssignmentPage, FetchError>;
}

/// reqwest-backed [`AssetDirectory`] for a real backend.
pub struct HttpAssetDirectory {
    http: Client,
    base_url: Url,
}

impl HttpAssetDirectory {
    pub fn new(base_url: &str) -> Result<Self, FetchError> {
        let base_url = Url::parse(base_url)
            .map_err(|err| FetchError::Validation(format!("invalid base url: {err}")))?;
        let http = Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .build()
            .map_err(FetchError::network)?;
        Ok(Self { http, base_url })
    }

    /// Signs in and returns the authenticated profile. Session storage is
    /// the caller's concern.
    pub async fn login(&self, request: &LoginRequest) -> Result<Profile, FetchError> {
        let url = self.endpoint("auth/login")?;
        let response = self
            .http
            .post(url)
            .json(request)
            .send()
            .await
            .map_err(map_transport_error)?;
        decode_response(response).await
    }

    fn endpoint(&self, path: &str) -> Result<Url, FetchError> {
        self.base_url
            .join(path)
            .map_err(|err| FetchError::Validation(format!("invalid endpoint path: {err}")))
    }

    async fn get_json<T: DeserializeOwned>(
        &self,
        path: &str,
        query: &[(&str, String)],
    ) -> Result<T, FetchError> {
        let url = self.endpoint(path)?;
        let response = self
            .http
            .get(url)
            .query(query)
            .send()
            .await
            .map_err(map_transport_error)?;
        decode_response(response).await
    }
}

#[async_trait]
impl AssetDirectory for HttpAssetDirectory {
    async fn list_assets(&self, query: &AssetListQuery) -> Result<AssetPage, FetchError> {
        if query.page == 0 {
            return Err(FetchError::Validation("page must be >= 1".into()));
        }
        self.get_json("assets", &query.to_query_pairs()).await
    }

    async fn list_categories(&self) -> Result<Vec<CategorySummary>, FetchError> {
        self.get_json("categories", &[]).await
    }

    async fn get_asset(&self, asset_id: AssetId) -> Result<AssetDetail, FetchError> {
        self.get_json(&format!("assets/{}", asset_id.0), &[]).await
    }

    async fn list_assignments(&self, page: u32) -> Result<AssignmentPage, FetchError> {
        if page == 0 {
            return Err(FetchError::Validation("page must be >= 1".into()));
        }
        self.get_json(
            "assignments",
            &[
                ("page", page.to_string()),
                ("take", crate::query::PAGE_SIZE.to_string()),
            ],
        )
        .await
    }
}

fn map_transport_error(err: reqwest::Error) -> FetchError {
    match err.status() {
        Some(status) => FetchError::Server {
            status: status.as_u16(),
            message: err.to_string(),
        },
        None => FetchError::network(err),
    }
}

async fn decode_response<T: DeserializeOwned>(
    response: reqwest::Response,
) -> Result<T, FetchError> {
    let status = response.status();
    if !status.is_success() {
        // Prefer the backend's structured error body when it decodes.
        let message = match response.json::<ApiError>().await {
            Ok(body) => body.message,
            Err(_) => status
                .canonical_reason()
                .unwrap_or("unknown error")
                .to_string(),
        };
        return Err(FetchError::Server {
            status: status.as_u16(),
            message,
        });
    }
    response.json::<T>().await.map_err(FetchError::decode)
}

#[cfg(test)]
#[path = "tests/fetch_tests.rs"]
mod tests;
