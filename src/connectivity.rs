//! Link-state tracking and the reachability probe seam.

use std::net::SocketAddr;
use std::time::Duration;

use async_trait::async_trait;

/// Whether the tracker is currently reachable.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LinkState {
    Online,
    Offline,
}

impl LinkState {
    #[must_use]
    pub const fn from_online(online: bool) -> Self {
        if online { Self::Online } else { Self::Offline }
    }

    #[must_use]
    pub const fn is_online(self) -> bool {
        matches!(self, Self::Online)
    }
}

/// Two-state connectivity machine.
///
/// Transitions are immediate and unconditional on every signal: a status
/// fetch outcome or a probe reading simply overwrites the state. There is
/// no intermediate "reconnecting" state.
#[derive(Debug, Clone, Copy)]
pub struct Connectivity {
    state: LinkState,
}

impl Connectivity {
    /// Starts optimistic, matching the tracker page's initial assumption.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            state: LinkState::Online,
        }
    }

    #[must_use]
    pub const fn state(&self) -> LinkState {
        self.state
    }

    #[must_use]
    pub const fn is_online(&self) -> bool {
        self.state.is_online()
    }

    /// Applies a connectivity signal.
    ///
    /// Returns `Some(new_state)` only on an actual transition, so the
    /// caller can fire exactly one notification per change. Re-applying
    /// the current state is harmless and returns `None`.
    pub fn apply(&mut self, state: LinkState) -> Option<LinkState> {
        if self.state == state {
            None
        } else {
            self.state = state;
            Some(state)
        }
    }
}

impl Default for Connectivity {
    fn default() -> Self {
        Self::new()
    }
}

/// Abstraction over the reachability check for testability.
#[async_trait]
pub trait ConnectivityProbe: Send + Sync {
    /// Reports whether the tracker currently looks reachable.
    async fn check(&self) -> bool;
}

/// Default probe: a TCP connect against the tracker address.
///
/// Unlike the fragment fetches, the probe carries its own short timeout.
/// It is the reachability signal itself, so a hung connect must read as
/// "offline" rather than stalling the watcher.
#[derive(Debug, Clone)]
pub struct TcpProbe {
    addr: SocketAddr,
    timeout: Duration,
}

impl TcpProbe {
    pub const DEFAULT_TIMEOUT: Duration = Duration::from_millis(800);

    #[must_use]
    pub const fn new(addr: SocketAddr) -> Self {
        Self {
            addr,
            timeout: Self::DEFAULT_TIMEOUT,
        }
    }

    /// Builds a probe from a tracker base URL, e.g. `http://192.168.4.1`.
    ///
    /// Returns `None` if the URL has no resolvable host.
    #[must_use]
    pub fn from_base_url(base_url: &str) -> Option<Self> {
        use std::net::ToSocketAddrs;

        let url = reqwest::Url::parse(base_url).ok()?;
        let host = url.host_str()?;
        let port = url.port_or_known_default()?;
        let addr = (host, port).to_socket_addrs().ok()?.next()?;
        Some(Self::new(addr))
    }
}

#[async_trait]
impl ConnectivityProbe for TcpProbe {
    async fn check(&self) -> bool {
        matches!(
            tokio::time::timeout(self.timeout, tokio::net::TcpStream::connect(self.addr)).await,
            Ok(Ok(_))
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn apply_reports_transitions_once() {
        let mut link = Connectivity::new();
        assert!(link.is_online());

        assert_eq!(link.apply(LinkState::Offline), Some(LinkState::Offline));
        assert_eq!(link.apply(LinkState::Offline), None);
        assert_eq!(link.apply(LinkState::Offline), None);
        assert!(!link.is_online());

        assert_eq!(link.apply(LinkState::Online), Some(LinkState::Online));
        assert_eq!(link.apply(LinkState::Online), None);
        assert!(link.is_online());
    }

    #[test]
    fn link_state_from_flag() {
        assert_eq!(LinkState::from_online(true), LinkState::Online);
        assert_eq!(LinkState::from_online(false), LinkState::Offline);
    }

    #[test]
    fn probe_from_base_url() {
        let probe = TcpProbe::from_base_url("http://192.168.4.1").unwrap();
        assert_eq!(probe.addr, "192.168.4.1:80".parse().unwrap());

        let probe = TcpProbe::from_base_url("http://10.0.0.9:8080").unwrap();
        assert_eq!(probe.addr, "10.0.0.9:8080".parse().unwrap());

        assert!(TcpProbe::from_base_url("not a url").is_none());
    }

    #[tokio::test]
    async fn tcp_probe_rejects_unreachable() {
        // TEST-NET-1 address, guaranteed non-routable
        let probe = TcpProbe::new("192.0.2.1:9".parse().unwrap());
        assert!(!probe.check().await);
    }
}
