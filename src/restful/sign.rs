use crate::error::{BitgetError, Result};
use async_trait::async_trait;
use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine;
use hmac::{Hmac, Mac};
use serde_json::Value;
use sha2::Sha256;
use std::collections::BTreeMap;

type HmacSha256 = Hmac<Sha256>;

/// Transport collaborator: one authenticated round trip per call. The
/// position client is written against this trait so the HTTP layer can be
/// swapped out in tests.
#[async_trait]
pub trait RequestHandler: Send + Sync {
    async fn request(
        &self,
        method: &str,
        path: &str,
        params: &BTreeMap<String, String>,
    ) -> Result<Value>;
}

/// Signed HTTP transport for the Bitget v2 REST API.
#[derive(Debug, Clone)]
pub struct HttpRequestHandler {
    pub debug: bool,
    api_key: String,
    secret_key: String,
    passphrase: String,
    domain: String,
    client: reqwest::Client,
}

impl HttpRequestHandler {
    pub fn new(
        api_key: impl Into<String>,
        secret_key: impl Into<String>,
        passphrase: impl Into<String>,
        domain: impl Into<String>,
        debug: bool,
    ) -> Self {
        HttpRequestHandler {
            debug,
            api_key: api_key.into(),
            secret_key: secret_key.into(),
            passphrase: passphrase.into(),
            domain: domain.into(),
            client: reqwest::Client::new(),
        }
    }

    /// HMAC-SHA256 over the prehash, base64-encoded.
    fn sign(&self, message: &str) -> Result<String> {
        let mut mac = HmacSha256::new_from_slice(self.secret_key.as_bytes())
            .map_err(|e| BitgetError::Sign(e.to_string()))?;
        mac.update(message.as_bytes());
        Ok(BASE64.encode(mac.finalize().into_bytes()))
    }

    /// Prehash layout required by the exchange:
    /// timestamp + METHOD + path[?query]
    fn pre_sign(timestamp: &str, method: &str, path: &str, query: &str) -> String {
        if query.is_empty() {
            format!("{}{}{}", timestamp, method, path)
        } else {
            format!("{}{}{}?{}", timestamp, method, path, query)
        }
    }

    /// `k=v&...` over the sorted map, values URL-encoded. The same string is
    /// signed and sent.
    fn build_query_string(params: &BTreeMap<String, String>) -> String {
        params
            .iter()
            .map(|(k, v)| format!("{}={}", k, urlencoding::encode(v)))
            .collect::<Vec<_>>()
            .join("&")
    }

    fn build_full_url(&self, path: &str, query: &str) -> String {
        if query.is_empty() {
            format!("{}{}", self.domain, path)
        } else {
            format!("{}{}?{}", self.domain, path, query)
        }
    }

    pub fn get_timestamp(&self) -> String {
        chrono::Utc::now().timestamp_millis().to_string()
    }
}

#[async_trait]
impl RequestHandler for HttpRequestHandler {
    async fn request(
        &self,
        method: &str,
        path: &str,
        params: &BTreeMap<String, String>,
    ) -> Result<Value> {
        let timestamp = self.get_timestamp();
        let query = Self::build_query_string(params);
        let sign = self.sign(&Self::pre_sign(&timestamp, method, path, &query))?;
        let url = self.build_full_url(path, &query);

        if self.debug {
            println!("[{}] URL: {}", method, url);
            println!("[{}] Params: {:?}", method, params);
            println!("[{}] Sign: {}", method, sign);
        }

        let request = match method {
            "POST" => self.client.post(&url),
            _ => self.client.get(&url),
        };
        let resp = request
            .header("ACCESS-KEY", &self.api_key)
            .header("ACCESS-SIGN", sign)
            .header("ACCESS-TIMESTAMP", &timestamp)
            .header("ACCESS-PASSPHRASE", &self.passphrase)
            .header("Content-Type", "application/json")
            .header("locale", "en-US")
            .send()
            .await?
            .text()
            .await?;

        if self.debug {
            println!("[{}] Response: {}", method, resp);
        }

        Ok(serde_json::from_str::<Value>(&resp)?)
    }
}
