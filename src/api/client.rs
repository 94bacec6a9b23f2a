use std::time::Duration;

use reqwest::{RequestBuilder, Response, Url};
use serde::de::DeserializeOwned;
use tracing::debug;

use super::types::{Conversion, ErrorBody, LoginRequest, LoginResponse, Product, ProductDraft, ProductStatus, RegisterRequest, StatusUpdate};
use super::ProductApi;
use crate::error::{AppError, AppResult};
use crate::session::Credential;

/// reqwest-backed client for the product backend.
#[derive(Clone)]
pub struct HttpApi {
    base: Url,
    client: reqwest::Client,
}

impl HttpApi {
    pub fn new(base: &str, timeout: Duration) -> AppResult<Self> {
        let mut base_url = Url::parse(base)
            .map_err(|e| AppError::user("invalid_api_url".to_string(), format!("invalid API URL '{}': {}", base, e)))?;
        if !matches!(base_url.scheme(), "http" | "https") {
            return Err(AppError::user("invalid_api_url".to_string(), format!("API URL must be http or https: {}", base)));
        }
        // keep any path prefix when joining relative endpoints
        if !base_url.path().ends_with('/') {
            let p = format!("{}/", base_url.path());
            base_url.set_path(&p);
        }
        let client = reqwest::Client::builder().timeout(timeout).build()?;
        Ok(Self { base: base_url, client })
    }

    pub fn base(&self) -> &Url { &self.base }

    fn url(&self, path: &str) -> AppResult<Url> {
        self.base
            .join(path)
            .map_err(|e| AppError::internal("bad_endpoint".to_string(), format!("{}: {}", path, e)))
    }

    fn authorize(req: RequestBuilder, auth: Option<&Credential>) -> RequestBuilder {
        match auth {
            Some(c) => req.bearer_auth(c.expose()),
            None => req,
        }
    }

    async fn send_json<T: DeserializeOwned>(req: RequestBuilder, fallback: &str) -> AppResult<T> {
        let resp = check(req.send().await?, fallback).await?;
        Ok(resp.json::<T>().await?)
    }

    async fn send_unit(req: RequestBuilder, fallback: &str) -> AppResult<()> {
        check(req.send().await?, fallback).await?;
        Ok(())
    }
}

/// Pass successful responses through; turn anything else into an `AppError` carrying the
/// backend's `error` text, or `fallback` when the body has none.
async fn check(resp: Response, fallback: &str) -> AppResult<Response> {
    let status = resp.status();
    debug!(target: "productdesk", url = %resp.url().path(), status = status.as_u16(), "api response");
    if status.is_success() {
        return Ok(resp);
    }
    let text = resp.text().await.unwrap_or_default();
    let body: ErrorBody = serde_json::from_str(&text).unwrap_or_default();
    let message = body.error.filter(|m| !m.trim().is_empty()).unwrap_or_else(|| fallback.to_string());
    Err(AppError::from_status(status.as_u16(), message))
}

impl ProductApi for HttpApi {
    async fn sign_in(&self, email: &str, password: &str) -> AppResult<LoginResponse> {
        let req = self.client.post(self.url("api/auth/login")?).json(&LoginRequest { email, password });
        Self::send_json(req, "sign-in failed").await
    }

    async fn register(&self, req: &RegisterRequest) -> AppResult<()> {
        let rb = self.client.post(self.url("api/auth/registro")?).json(req);
        Self::send_unit(rb, "registration failed").await
    }

    async fn list_products(&self, auth: Option<&Credential>) -> AppResult<Vec<Product>> {
        let req = Self::authorize(self.client.get(self.url("api/productos")?), auth);
        Self::send_json(req, "could not load products").await
    }

    async fn create_product(&self, auth: Option<&Credential>, draft: &ProductDraft) -> AppResult<()> {
        let req = Self::authorize(self.client.post(self.url("api/productos")?), auth).json(draft);
        Self::send_unit(req, "could not create the request").await
    }

    async fn set_status(&self, auth: Option<&Credential>, id: i64, status: ProductStatus) -> AppResult<()> {
        let req = Self::authorize(self.client.put(self.url(&format!("api/productos/{}", id))?), auth)
            .json(&StatusUpdate { status });
        Self::send_unit(req, "could not update status").await
    }

    async fn delete_product(&self, auth: Option<&Credential>, id: i64) -> AppResult<()> {
        let req = Self::authorize(self.client.delete(self.url(&format!("api/productos/{}", id))?), auth);
        Self::send_unit(req, "could not delete the request").await
    }

    async fn convert(&self, auth: Option<&Credential>, id: i64, currency: &str) -> AppResult<Conversion> {
        let path = format!("api/productos/{}/convertir/{}", id, urlencoding::encode(currency));
        let req = Self::authorize(self.client.get(self.url(&path)?), auth);
        Self::send_json(req, "currency conversion failed").await
    }
}
