//! Pre-flight network check performed before every fetch.

use std::path::{Path, PathBuf};
use std::time::Duration;

use async_trait::async_trait;
use tokio::net::TcpStream;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Transport {
    Cellular,
    Wifi,
    Ethernet,
    Loopback,
    Other,
}

/// What the active network reports it can carry.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct NetworkCapabilities {
    pub transports: Vec<Transport>,
}

impl NetworkCapabilities {
    pub fn has_transport(&self, transport: Transport) -> bool {
        self.transports.contains(&transport)
    }
}

#[async_trait]
pub trait NetworkMonitor {
    /// Capabilities of the active network, or `None` when there is none.
    async fn active_network(&self) -> Option<NetworkCapabilities>;
}

/// Connected iff the active network carries cellular, wifi or ethernet.
pub fn is_connected(capabilities: Option<&NetworkCapabilities>) -> bool {
    capabilities.is_some_and(|caps| {
        caps.has_transport(Transport::Cellular)
            || caps.has_transport(Transport::Wifi)
            || caps.has_transport(Transport::Ethernet)
    })
}

/// Monitor used when the check is disabled in config.
pub struct AlwaysOnline;

#[async_trait]
impl NetworkMonitor for AlwaysOnline {
    async fn active_network(&self) -> Option<NetworkCapabilities> {
        Some(NetworkCapabilities {
            transports: vec![Transport::Ethernet],
        })
    }
}

const SYSFS_NET: &str = "/sys/class/net";
const PROBE_TIMEOUT: Duration = Duration::from_secs(3);
const ARPHRD_ETHER: &str = "1";

/// Reads interface state from sysfs; falls back to a TCP probe of the API
/// host where sysfs is unavailable.
pub struct SystemNetworkMonitor {
    sysfs_root: PathBuf,
    probe_host: Option<(String, u16)>,
}

impl SystemNetworkMonitor {
    pub fn new(probe_host: Option<(String, u16)>) -> Self {
        Self {
            sysfs_root: PathBuf::from(SYSFS_NET),
            probe_host,
        }
    }

    pub fn for_base_url(base_url: &str) -> Self {
        let probe_host = url::Url::parse(base_url).ok().and_then(|u| {
            let host = u.host_str()?.to_string();
            let port = u.port_or_known_default()?;
            Some((host, port))
        });
        Self::new(probe_host)
    }

    #[cfg(test)]
    fn with_sysfs_root(root: PathBuf) -> Self {
        Self {
            sysfs_root: root,
            probe_host: None,
        }
    }

    async fn probe(&self) -> Option<NetworkCapabilities> {
        let (host, port) = self.probe_host.as_ref()?;
        match tokio::time::timeout(PROBE_TIMEOUT, TcpStream::connect((host.as_str(), *port))).await
        {
            Ok(Ok(_)) => Some(NetworkCapabilities {
                transports: vec![Transport::Ethernet],
            }),
            Ok(Err(e)) => {
                tracing::debug!("connectivity probe to {}:{} failed: {}", host, port, e);
                None
            }
            Err(_) => {
                tracing::debug!("connectivity probe to {}:{} timed out", host, port);
                None
            }
        }
    }
}

#[async_trait]
impl NetworkMonitor for SystemNetworkMonitor {
    async fn active_network(&self) -> Option<NetworkCapabilities> {
        let root = self.sysfs_root.clone();
        let scanned = tokio::task::spawn_blocking(move || scan_sysfs(&root))
            .await
            .ok()
            .flatten();

        match scanned {
            Some(caps) if caps.transports.is_empty() => None,
            Some(caps) => Some(caps),
            None => self.probe().await,
        }
    }
}

/// `None` when sysfs can't be read at all; otherwise the transports of every
/// interface whose operstate is `up`.
fn scan_sysfs(root: &Path) -> Option<NetworkCapabilities> {
    let entries = std::fs::read_dir(root).ok()?;
    let mut transports = Vec::new();

    for entry in entries.flatten() {
        let path = entry.path();
        let name = entry.file_name().to_string_lossy().into_owned();

        let operstate = read_trimmed(&path.join("operstate"));
        if operstate.as_deref() != Some("up") {
            continue;
        }

        let transport = classify_interface(&name, &path);
        if !transports.contains(&transport) {
            transports.push(transport);
        }
    }

    Some(NetworkCapabilities { transports })
}

fn classify_interface(name: &str, path: &Path) -> Transport {
    if name == "lo" {
        return Transport::Loopback;
    }
    if path.join("wireless").exists() || path.join("phy80211").exists() {
        return Transport::Wifi;
    }
    if ["wwan", "rmnet", "ccmni"].iter().any(|p| name.starts_with(p)) {
        return Transport::Cellular;
    }
    match read_trimmed(&path.join("type")).as_deref() {
        Some(ARPHRD_ETHER) => Transport::Ethernet,
        _ => Transport::Other,
    }
}

fn read_trimmed(path: &Path) -> Option<String> {
    std::fs::read_to_string(path)
        .ok()
        .map(|s| s.trim().to_string())
}
