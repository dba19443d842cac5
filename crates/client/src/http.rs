//! `reqwest`-backed [`MarketplaceApi`].

use std::sync::Arc;

use reqwest::{Method, RequestBuilder, Response};
use serde::Serialize;
use serde::de::DeserializeOwned;
use serde_json::json;

use bazaar_auth::{UserAccount, UserStatus};
use bazaar_core::{Page, UserId};
use bazaar_orders::{AnalyticsSummary, FinancialSummary, OrderId, OrderRecord};
use bazaar_products::{ProductDetails, ProductId, ProductRecord, ReviewDecision};

use crate::api::{
    HealthStatus, MarketplaceApi, NewProduct, OrderQuery, OrderStatusUpdate, ProductQuery,
    UserQuery,
};
use crate::config::ClientConfig;
use crate::envelope::ApiEnvelope;
use crate::error::{ClientError, ClientResult};
use crate::token::{FileTokenStore, StaticToken, TokenSource};

/// REST client for the marketplace API.
#[derive(Clone)]
pub struct HttpMarketplaceApi {
    client: reqwest::Client,
    base_url: String,
    tokens: Option<Arc<dyn TokenSource>>,
}

impl std::fmt::Debug for HttpMarketplaceApi {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HttpMarketplaceApi")
            .field("base_url", &self.base_url)
            .field("authenticated", &self.tokens.is_some())
            .finish()
    }
}

impl HttpMarketplaceApi {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            client: reqwest::Client::new(),
            base_url: base_url.into().trim_end_matches('/').to_string(),
            tokens: None,
        }
    }

    /// Build from configuration: timeout, base URL and token source
    /// (`BAZAAR_API_TOKEN` first, then the token file).
    pub fn from_config(config: &ClientConfig) -> ClientResult<Self> {
        let client = reqwest::Client::builder()
            .timeout(config.http_timeout)
            .build()
            .map_err(|e| ClientError::Network(e.to_string()))?;

        let tokens: Arc<dyn TokenSource> = match (&config.api_token, &config.token_file) {
            (Some(token), _) => Arc::new(StaticToken::new(token.clone())),
            (None, Some(path)) => Arc::new(FileTokenStore::new(path.clone())),
            (None, None) => Arc::new(FileTokenStore::in_config_dir()?),
        };

        Ok(Self {
            client,
            base_url: config.api_url.clone(),
            tokens: Some(tokens),
        })
    }

    pub fn with_token_source(mut self, tokens: Arc<dyn TokenSource>) -> Self {
        self.tokens = Some(tokens);
        self
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn request(&self, method: Method, path: &str) -> ClientResult<RequestBuilder> {
        let url = format!("{}{}", self.base_url, path);
        tracing::debug!(%method, %url, "outbound request");
        let mut req = self.client.request(method, url);
        if let Some(tokens) = &self.tokens {
            if let Some(token) = tokens.token()? {
                req = req.bearer_auth(token);
            }
        }
        Ok(req)
    }

    async fn send(&self, req: RequestBuilder) -> ClientResult<(u16, Response)> {
        let resp = req.send().await.map_err(|e| {
            tracing::warn!(error = %e, "request failed");
            ClientError::Network(e.to_string())
        })?;
        let status = resp.status();
        if status.is_success() {
            return Ok((status.as_u16(), resp));
        }

        let body = resp.text().await.unwrap_or_default();
        let message = serde_json::from_str::<ApiEnvelope<serde_json::Value>>(&body)
            .ok()
            .and_then(|env| env.message)
            .unwrap_or(body);
        tracing::warn!(status = status.as_u16(), %message, "API returned an error");
        Err(ClientError::api(status.as_u16(), message))
    }

    async fn envelope<T: DeserializeOwned>(
        &self,
        req: RequestBuilder,
    ) -> ClientResult<(u16, ApiEnvelope<T>)> {
        let (status, resp) = self.send(req).await?;
        let envelope = resp
            .json::<ApiEnvelope<T>>()
            .await
            .map_err(|e| ClientError::Decode(e.to_string()))?;
        Ok((status, envelope))
    }

    async fn data<T: DeserializeOwned>(&self, req: RequestBuilder) -> ClientResult<T> {
        let (status, envelope) = self.envelope(req).await?;
        envelope.into_data(status)
    }

    async fn page<T: DeserializeOwned>(&self, req: RequestBuilder) -> ClientResult<Page<T>> {
        let (status, envelope) = self.envelope::<Vec<T>>(req).await?;
        envelope.into_page(status)
    }

    async fn data_with_body<B: Serialize + ?Sized, T: DeserializeOwned>(
        &self,
        method: Method,
        path: &str,
        body: &B,
    ) -> ClientResult<T> {
        self.data(self.request(method, path)?.json(body)).await
    }
}

#[async_trait::async_trait]
impl MarketplaceApi for HttpMarketplaceApi {
    async fn list_products(&self, query: &ProductQuery) -> ClientResult<Page<ProductRecord>> {
        let req = self
            .request(Method::GET, "/admin/products")?
            .query(&query.to_params());
        self.page(req).await
    }

    async fn get_product(&self, id: ProductId) -> ClientResult<ProductRecord> {
        self.data(self.request(Method::GET, &format!("/admin/products/{id}"))?)
            .await
    }

    async fn create_product(&self, product: &NewProduct) -> ClientResult<ProductRecord> {
        self.data_with_body(Method::POST, "/vendors/products", product)
            .await
    }

    async fn update_product(
        &self,
        id: ProductId,
        details: &ProductDetails,
    ) -> ClientResult<ProductRecord> {
        self.data_with_body(Method::PUT, &format!("/vendors/products/{id}"), details)
            .await
    }

    async fn submit_product(&self, id: ProductId) -> ClientResult<ProductRecord> {
        self.data(self.request(Method::POST, &format!("/vendors/products/{id}/submit"))?)
            .await
    }

    async fn review_product(
        &self,
        id: ProductId,
        decision: &ReviewDecision,
    ) -> ClientResult<ProductRecord> {
        self.data_with_body(
            Method::PATCH,
            &format!("/admin/products/{id}/status"),
            decision,
        )
        .await
    }

    async fn delete_product(&self, id: ProductId) -> ClientResult<()> {
        let req = self.request(Method::DELETE, &format!("/products/{id}"))?;
        let (status, envelope) = self.envelope::<serde_json::Value>(req).await?;
        if !envelope.success {
            return Err(ClientError::api(
                status,
                envelope.message.unwrap_or_else(|| "request failed".to_string()),
            ));
        }
        Ok(())
    }

    async fn list_orders(&self, query: &OrderQuery) -> ClientResult<Page<OrderRecord>> {
        let req = self.request(Method::GET, "/orders")?.query(&query.to_params());
        self.page(req).await
    }

    async fn get_order(&self, id: OrderId) -> ClientResult<OrderRecord> {
        self.data(self.request(Method::GET, &format!("/orders/{id}"))?)
            .await
    }

    async fn update_order_status(
        &self,
        id: OrderId,
        update: &OrderStatusUpdate,
    ) -> ClientResult<OrderRecord> {
        self.data_with_body(Method::PATCH, &format!("/orders/{id}/status"), update)
            .await
    }

    async fn refund_order(&self, id: OrderId) -> ClientResult<OrderRecord> {
        self.data(self.request(Method::POST, &format!("/orders/{id}/refund"))?)
            .await
    }

    async fn list_users(&self, query: &UserQuery) -> ClientResult<Page<UserAccount>> {
        let req = self
            .request(Method::GET, "/admin/users")?
            .query(&query.to_params());
        self.page(req).await
    }

    async fn update_user_status(
        &self,
        id: UserId,
        status: UserStatus,
    ) -> ClientResult<UserAccount> {
        self.data_with_body(
            Method::PATCH,
            &format!("/admin/users/{id}/status"),
            &json!({ "status": status }),
        )
        .await
    }

    async fn financial_summary(&self) -> ClientResult<FinancialSummary> {
        self.data(self.request(Method::GET, "/admin/financial")?)
            .await
    }

    async fn analytics_summary(&self) -> ClientResult<AnalyticsSummary> {
        self.data(self.request(Method::GET, "/admin/analytics")?)
            .await
    }

    async fn health(&self) -> ClientResult<HealthStatus> {
        self.data(self.request(Method::GET, "/health")?).await
    }
}
