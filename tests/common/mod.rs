#![allow(dead_code)]

use std::sync::Arc;
use std::time::{Duration, Instant};

use anyhow::{Context, Result};
use reqwest::StatusCode;
use serde_json::Value;

use nelloriens_api::store::MemoryStore;
use nelloriens_api::{build_router, AppConfig, AppState};

pub struct TestServer {
    pub port: u16,
    pub base_url: String,
    pub client: reqwest::Client,
    /// Direct handle on the server's store, for seeding documents the API would never write
    pub store: Arc<MemoryStore>,
}

impl TestServer {
    async fn spawn(config: AppConfig) -> Result<Self> {
        // Pick an unused port for isolation
        let port = portpicker::pick_unused_port().context("failed to pick free port")?;
        let base_url = format!("http://127.0.0.1:{}", port);

        let store = Arc::new(MemoryStore::new());
        let app = build_router(AppState::new(config, store.clone()));

        let listener = tokio::net::TcpListener::bind(("127.0.0.1", port))
            .await
            .with_context(|| format!("failed to bind test port {}", port))?;
        tokio::spawn(async move {
            if let Err(e) = axum::serve(listener, app).await {
                tracing::error!("test server stopped: {}", e);
            }
        });

        Ok(Self { port, base_url, client: reqwest::Client::new(), store })
    }

    async fn wait_ready(&self, timeout: Duration) -> Result<()> {
        let deadline = Instant::now() + timeout;
        loop {
            if Instant::now() > deadline {
                break;
            }
            if let Ok(resp) = self.client.get(self.url("/health")).send().await {
                if resp.status() == StatusCode::OK {
                    return Ok(());
                }
            }
            tokio::time::sleep(Duration::from_millis(50)).await;
        }
        anyhow::bail!("server did not become ready on {} within {:?}", self.base_url, timeout)
    }

    pub fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    /// POST a JSON body and return status plus parsed reply
    pub async fn post(&self, path: &str, body: Value) -> Result<(StatusCode, Value)> {
        let res = self.client.post(self.url(path)).json(&body).send().await?;
        Ok((res.status(), res.json().await?))
    }

    /// GET with a query string and return status plus parsed reply
    pub async fn get(&self, path: &str, query: &[(&str, &str)]) -> Result<(StatusCode, Value)> {
        let res = self.client.get(self.url(path)).query(query).send().await?;
        Ok((res.status(), res.json().await?))
    }

    /// GET carrying list parameters in a JSON body
    pub async fn get_with_body(&self, path: &str, body: Value) -> Result<(StatusCode, Value)> {
        let res = self.client.get(self.url(path)).json(&body).send().await?;
        Ok((res.status(), res.json().await?))
    }

    /// Create a record and return its id
    pub async fn create(&self, path: &str, body: Value) -> Result<String> {
        let (status, reply) = self.post(path, body).await?;
        anyhow::ensure!(status == StatusCode::OK, "create failed with {}: {}", status, reply);
        reply["id"]
            .as_str()
            .map(str::to_string)
            .with_context(|| format!("create reply without id: {}", reply))
    }
}

fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}

/// Start a fresh server over an empty in-memory store
pub async fn spawn_server() -> Result<TestServer> {
    spawn_server_with(AppConfig::development()).await
}

pub async fn spawn_server_with(config: AppConfig) -> Result<TestServer> {
    init_tracing();
    let server = TestServer::spawn(config).await?;
    server.wait_ready(Duration::from_secs(10)).await?;
    Ok(server)
}

/// Values of `field` across a list reply, in reply order
pub fn column<'a>(records: &'a Value, field: &str) -> Vec<&'a Value> {
    records
        .as_array()
        .map(|items| items.iter().map(|item| &item[field]).collect())
        .unwrap_or_default()
}
