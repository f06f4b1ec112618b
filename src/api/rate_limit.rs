//! Request rate limiting for the sync and triage triggers.
//!
//! Each trigger route carries its own limiter, keyed by client address,
//! so one busy caller cannot exhaust the quota for everyone else.
//! Enforced before the orchestrator is invoked; the orchestrator itself
//! is unaware of it.

use std::convert::Infallible;
use std::net::{IpAddr, Ipv4Addr, SocketAddr};
use std::num::NonZeroU32;

use axum::extract::{ConnectInfo, FromRequestParts};
use axum::http::request::Parts;
use governor::clock::DefaultClock;
use governor::state::keyed::DefaultKeyedStateStore;
use governor::{Quota, RateLimiter};

/// Client address used as the rate-limit key.
///
/// Taken from the first `X-Forwarded-For` entry when one parses as an
/// address, else the peer address, else unspecified. Extraction never
/// fails.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ClientAddr(pub IpAddr);

impl<S: Send + Sync> FromRequestParts<S> for ClientAddr {
    type Rejection = Infallible;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Infallible> {
        let forwarded = parts
            .headers
            .get("x-forwarded-for")
            .and_then(|v| v.to_str().ok())
            .and_then(|v| v.split(',').next())
            .and_then(|v| v.trim().parse::<IpAddr>().ok());

        let ip = forwarded
            .or_else(|| {
                parts
                    .extensions
                    .get::<ConnectInfo<SocketAddr>>()
                    .map(|info| info.0.ip())
            })
            .unwrap_or(IpAddr::V4(Ipv4Addr::UNSPECIFIED));
        Ok(Self(ip))
    }
}

/// In-process limiter for one trigger route, with an independent quota
/// per client address.
pub struct TriggerLimiter {
    inner: RateLimiter<IpAddr, DefaultKeyedStateStore<IpAddr>, DefaultClock>,
}

impl TriggerLimiter {
    /// Allow `per_minute` requests per minute per client. Zero is
    /// coerced to one.
    pub fn per_minute(per_minute: u32) -> Self {
        let quota =
            Quota::per_minute(NonZeroU32::new(per_minute.max(1)).unwrap_or(NonZeroU32::MIN));
        Self {
            inner: RateLimiter::keyed(quota),
        }
    }

    /// Try to consume one request slot for `client`.
    pub fn check(&self, client: IpAddr) -> bool {
        self.inner.check_key(&client).is_ok()
    }
}
