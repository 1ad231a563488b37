//! Connectivity precondition checked before every request.

use std::net::ToSocketAddrs;
use std::sync::atomic::{AtomicBool, Ordering};

/// Answers "is the API host reachable right now?" synchronously.
pub trait Reachability: Send + Sync + 'static {
    fn is_reachable(&self) -> bool;
}

/// Treats the API host as reachable when its name resolves.
///
/// Resolution may block; the fetcher runs it on the blocking pool.
#[derive(Debug, Clone)]
pub struct HostReachability {
    authority: String,
}

impl HostReachability {
    /// Derive `host:port` from a base URL such as `https://pokeapi.co/api/v2`.
    pub fn for_base_url(base_url: &str) -> Self {
        let (rest, default_port) = match base_url.strip_prefix("https://") {
            Some(rest) => (rest, 443),
            None => (base_url.strip_prefix("http://").unwrap_or(base_url), 80),
        };
        let host = rest.split('/').next().unwrap_or_default();
        let authority = if host.rsplit_once(':').is_some_and(|(_, p)| p.parse::<u16>().is_ok()) {
            host.to_string()
        } else {
            format!("{host}:{default_port}")
        };
        Self { authority }
    }

    pub fn authority(&self) -> &str {
        &self.authority
    }
}

impl Reachability for HostReachability {
    fn is_reachable(&self) -> bool {
        match self.authority.to_socket_addrs() {
            Ok(mut addrs) => addrs.next().is_some(),
            Err(e) => {
                tracing::debug!(authority = %self.authority, error = %e, "host not resolvable");
                false
            }
        }
    }
}

/// Reachability driven by a flag, for hosts that already track network state
/// and for tests.
#[derive(Debug)]
pub struct StaticReachability {
    online: AtomicBool,
}

impl StaticReachability {
    pub fn new(online: bool) -> Self {
        Self {
            online: AtomicBool::new(online),
        }
    }

    pub fn set_online(&self, online: bool) {
        self.online.store(online, Ordering::SeqCst);
    }
}

impl Reachability for StaticReachability {
    fn is_reachable(&self) -> bool {
        self.online.load(Ordering::SeqCst)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn authority_defaults_port_by_scheme() {
        assert_eq!(
            HostReachability::for_base_url("https://pokeapi.co/api/v2").authority(),
            "pokeapi.co:443"
        );
        assert_eq!(
            HostReachability::for_base_url("http://localhost/api").authority(),
            "localhost:80"
        );
    }

    #[test]
    fn authority_keeps_explicit_port() {
        assert_eq!(
            HostReachability::for_base_url("http://127.0.0.1:3000/api/v2").authority(),
            "127.0.0.1:3000"
        );
    }

    #[test]
    fn loopback_is_reachable() {
        assert!(HostReachability::for_base_url("http://127.0.0.1:1/").is_reachable());
    }

    #[test]
    fn static_flag_toggles() {
        let r = StaticReachability::new(true);
        assert!(r.is_reachable());
        r.set_online(false);
        assert!(!r.is_reachable());
    }
}
