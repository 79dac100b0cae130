use anyhow::{Context, Result};
use async_trait::async_trait;
use mixlink_core::Identity;
use serde::Serialize;

/// External login collaborator. The controller only needs an identity
/// back; transport details stay behind this trait.
#[async_trait]
pub trait AuthService: Send + Sync {
    async fn login(&self, name: &str) -> Result<Identity>;
}

#[derive(Serialize)]
struct LoginRequest<'a> {
    name: &'a str,
}

/// Production login over HTTP: `POST {base_url}/login {"name": ...}`.
pub struct HttpAuthClient {
    http: reqwest::Client,
    base_url: String,
}

impl HttpAuthClient {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            http: reqwest::Client::new(),
            base_url: base_url.into(),
        }
    }
}

#[async_trait]
impl AuthService for HttpAuthClient {
    async fn login(&self, name: &str) -> Result<Identity> {
        let identity = self
            .http
            .post(format!("{}/login", self.base_url))
            .json(&LoginRequest { name })
            .send()
            .await
            .context("login request failed")?
            .error_for_status()
            .context("login rejected")?
            .json::<Identity>()
            .await
            .context("login response is not a valid identity")?;
        Ok(identity)
    }
}
