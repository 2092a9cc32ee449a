// # HTTP Address Resolver
//
// This crate provides an HTTP address-echo resolver for the dydns updater.
//
// ## Architecture
//
// Issues one GET per `resolve()` call against a service that answers with
// the caller's address as a bare text body (e.g., ifconfig.me/ip,
// api.ipify.org, icanhazip.com). Nothing is cached between calls.

use dydns_core::config::ResolverConfig;
use dydns_core::traits::{AddressResolver, parse_public_address};
use dydns_core::{Error, Result};

use std::net::Ipv4Addr;
use std::time::Duration;

/// Default HTTP timeout for the echo request
const DEFAULT_HTTP_TIMEOUT: Duration = Duration::from_secs(10);

/// HTTP-based public address resolver
#[derive(Debug)]
pub struct HttpAddressResolver {
    /// URL to fetch the address from
    url: String,

    /// HTTP client
    client: reqwest::Client,
}

impl HttpAddressResolver {
    /// Create a new HTTP address resolver
    ///
    /// # Errors
    ///
    /// `Error::Config` if the URL is not HTTP(S) or the client cannot be built.
    pub fn new(config: &ResolverConfig) -> Result<Self> {
        config.validate()?;

        let client = reqwest::Client::builder()
            .timeout(DEFAULT_HTTP_TIMEOUT)
            .build()
            .map_err(|e| Error::config(format!("failed to build HTTP client: {}", e)))?;

        Ok(Self {
            url: config.url.clone(),
            client,
        })
    }

    /// URL queried on every call
    pub fn url(&self) -> &str {
        &self.url
    }
}

#[async_trait::async_trait]
impl AddressResolver for HttpAddressResolver {
    async fn resolve(&self) -> Result<Ipv4Addr> {
        let response = self
            .client
            .get(&self.url)
            .send()
            .await
            .map_err(|e| Error::resolution(format!("request failed: {}", e)))?;

        if !response.status().is_success() {
            return Err(Error::resolution(format!(
                "HTTP error: {}",
                response.status()
            )));
        }

        let body = response
            .text()
            .await
            .map_err(|e| Error::resolution(format!("failed to read response: {}", e)))?;

        let address = parse_public_address(&body)?;
        tracing::debug!(url = %self.url, %address, "Resolved public address");

        Ok(address)
    }

    fn resolver_name(&self) -> &'static str {
        "http"
    }
}
