use std::sync::atomic::{AtomicBool, Ordering};

use anyhow::{anyhow, Result};
use async_trait::async_trait;
use reqwest::{
    header::{HeaderMap, HeaderValue, AUTHORIZATION, CONTENT_TYPE},
    Client, Method, RequestBuilder, Response,
};
use serde::de::DeserializeOwned;
use serde_json::Value;
use tracing::{debug, error, info};

use shared_config::AppConfig;

use crate::store::{Collection, DocumentStore};

/// PostgREST-backed document store.
///
/// Each collection is a table whose key column is `Collection::key_field`.
/// Saves are upserts resolved on that column.
pub struct SupabaseClient {
    client: Client,
    base_url: String,
    service_key: String,
    closed: AtomicBool,
}

impl SupabaseClient {
    pub fn new(config: &AppConfig) -> Self {
        Self {
            client: Client::new(),
            base_url: config.supabase_url.trim_end_matches('/').to_string(),
            service_key: config.supabase_service_key.clone(),
            closed: AtomicBool::new(false),
        }
    }

    /// Builds the client and checks that the REST endpoint answers.
    pub async fn connect(config: &AppConfig) -> Result<Self> {
        if !config.is_store_configured() {
            return Err(anyhow!("Supabase store is not configured"));
        }

        let client = Self::new(config);
        client.send(Method::GET, "/rest/v1/", None, None).await?;
        info!("Connected to Supabase at {}", client.base_url);
        Ok(client)
    }

    fn get_headers(&self) -> Result<HeaderMap> {
        let mut headers = HeaderMap::new();
        headers.insert("apikey", HeaderValue::from_str(&self.service_key)?);
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
        headers.insert(
            AUTHORIZATION,
            HeaderValue::from_str(&format!("Bearer {}", self.service_key))?,
        );
        Ok(headers)
    }

    fn ensure_open(&self) -> Result<()> {
        if self.closed.load(Ordering::Acquire) {
            return Err(anyhow!("Supabase client is closed"));
        }
        Ok(())
    }

    fn builder(&self, method: Method, path: &str) -> Result<RequestBuilder> {
        let url = format!("{}{}", self.base_url, path);
        debug!("Making request to {}", url);
        Ok(self.client.request(method, &url).headers(self.get_headers()?))
    }

    async fn send(
        &self,
        method: Method,
        path: &str,
        body: Option<Value>,
        extra_headers: Option<HeaderMap>,
    ) -> Result<Response> {
        let mut req = self.builder(method, path)?;

        if let Some(headers) = extra_headers {
            req = req.headers(headers);
        }
        if let Some(body_data) = body {
            req = req.json(&body_data);
        }

        let response = req.send().await?;

        let status = response.status();
        if !status.is_success() {
            let error_text = response.text().await?;
            error!("API error ({}): {}", status, error_text);

            return Err(match status.as_u16() {
                401 | 403 => anyhow!("Authentication error: {}", error_text),
                404 => anyhow!("Resource not found: {}", error_text),
                _ => anyhow!("API error ({}): {}", status, error_text),
            });
        }

        Ok(response)
    }

    pub async fn request<T>(&self, method: Method, path: &str, body: Option<Value>) -> Result<T>
    where
        T: DeserializeOwned,
    {
        let response = self.send(method, path, body, None).await?;
        Ok(response.json::<T>().await?)
    }
}

#[async_trait]
impl DocumentStore for SupabaseClient {
    async fn find_one(&self, collection: Collection, key: &str) -> Result<Option<Value>> {
        self.ensure_open()?;
        let path = format!(
            "/rest/v1/{}?{}=eq.{}&limit=1",
            collection.table(),
            collection.key_field(),
            key
        );
        let rows: Vec<Value> = self.request(Method::GET, &path, None).await?;
        Ok(rows.into_iter().next())
    }

    async fn find(&self, collection: Collection) -> Result<Vec<Value>> {
        self.ensure_open()?;
        let path = format!("/rest/v1/{}?select=*", collection.table());
        self.request(Method::GET, &path, None).await
    }

    async fn save(&self, collection: Collection, key: &str, document: Value) -> Result<()> {
        self.ensure_open()?;
        debug!("Upserting {} document {}", collection, key);

        let path = format!(
            "/rest/v1/{}?on_conflict={}",
            collection.table(),
            collection.key_field()
        );
        let mut headers = HeaderMap::new();
        headers.insert(
            "Prefer",
            HeaderValue::from_static("resolution=merge-duplicates,return=minimal"),
        );

        self.send(Method::POST, &path, Some(document), Some(headers)).await?;
        Ok(())
    }

    async fn close(&self) -> Result<()> {
        self.closed.store(true, Ordering::Release);
        info!("Supabase client closed");
        Ok(())
    }
}
