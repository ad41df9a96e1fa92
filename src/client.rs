use crate::restful::position::BitgetPositionClient;
use crate::restful::sign::HttpRequestHandler;
use std::sync::Arc;

pub const DEFAULT_DOMAIN: &str = "https://api.bitget.com";

/// Entry point: wires the signed transport into the per-domain sub-clients.
#[derive(Clone)]
pub struct BitgetApi {
    pub position: BitgetPositionClient,
}

impl BitgetApi {
    /// Production API host, debug logging off.
    pub fn new(
        api_key: impl Into<String>,
        secret_key: impl Into<String>,
        passphrase: impl Into<String>,
    ) -> Self {
        Self::with_options(api_key, secret_key, passphrase, DEFAULT_DOMAIN, false)
    }

    pub fn with_options(
        api_key: impl Into<String>,
        secret_key: impl Into<String>,
        passphrase: impl Into<String>,
        domain: impl Into<String>,
        debug: bool,
    ) -> Self {
        let handler = Arc::new(HttpRequestHandler::new(
            api_key, secret_key, passphrase, domain, debug,
        ));
        BitgetApi {
            position: BitgetPositionClient::new(handler),
        }
    }
}
