// # Address Resolver Trait
//
// Defines the interface for discovering the caller's current public IPv4
// address.
//
// ## Implementations
//
// - HTTP address echo: `dydns-ip-http` crate
//
// ## Usage
//
// ```rust,ignore
// use dydns_core::AddressResolver;
//
// #[tokio::main]
// async fn main() -> anyhow::Result<()> {
//     let resolver = /* AddressResolver implementation */;
//
//     let address = resolver.resolve().await?;
//     println!("public address: {}", address);
//
//     Ok(())
// }
// ```

use async_trait::async_trait;
use std::net::{IpAddr, Ipv4Addr};

/// Trait for public address resolver implementations
///
/// A resolver answers a single question, once per call: what IPv4 address
/// does the outside world see right now?
///
/// ## Allowed Capabilities
/// - ✅ Perform one outbound request per call
/// - ✅ Parse the response into an `Ipv4Addr`
///
/// ## Forbidden Capabilities
/// - ❌ Cache an address across calls (every pass must see fresh data)
/// - ❌ Implement retry logic (the scheduler retries on the next tick)
/// - ❌ Spawn tasks or hold shared mutable state
#[async_trait]
pub trait AddressResolver: Send + Sync {
    /// Resolve the current public IPv4 address
    ///
    /// # Returns
    ///
    /// - `Ok(Ipv4Addr)`: The current public address
    /// - `Err(Error::Resolution)`: Network failure, non-2xx response, or a
    ///   body that is not an IPv4 address
    async fn resolve(&self) -> Result<Ipv4Addr, crate::Error>;

    /// Get the resolver name (for logging/debugging)
    fn resolver_name(&self) -> &'static str;
}

/// Parse an address-echo response body
///
/// The body must be the literal textual address; surrounding whitespace
/// (typically a trailing newline) is ignored. An IPv6 address is rejected,
/// since only A records are managed.
pub fn parse_public_address(body: &str) -> Result<Ipv4Addr, crate::Error> {
    let text = body.trim();

    match text.parse::<IpAddr>() {
        Ok(IpAddr::V4(addr)) => Ok(addr),
        Ok(IpAddr::V6(addr)) => Err(crate::Error::resolution(format!(
            "expected an IPv4 address, got IPv6 {addr}"
        ))),
        Err(_) => Err(crate::Error::resolution(format!(
            "response body is not an IP address: {:?}",
            truncate(text, 64)
        ))),
    }
}

fn truncate(text: &str, max: usize) -> &str {
    match text.char_indices().nth(max) {
        Some((idx, _)) => &text[..idx],
        None => text,
    }
}
