use super::ConfigError;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::net::{IpAddr, SocketAddr};
use std::str::FromStr;

/// Transport used to carry queries to the target
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Transport {
    #[default]
    Udp,
    Tcp,
}

impl Transport {
    pub fn as_str(&self) -> &'static str {
        match self {
            Transport::Udp => "udp",
            Transport::Tcp => "tcp",
        }
    }
}

impl fmt::Display for Transport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for Transport {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "udp" => Ok(Transport::Udp),
            "tcp" => Ok(Transport::Tcp),
            _ => Err(format!("Invalid transport: {} (expected udp or tcp)", s)),
        }
    }
}

/// Address family of the target server
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum AddressFamily {
    #[default]
    Inet,
    Inet6,
}

impl AddressFamily {
    pub fn as_str(&self) -> &'static str {
        match self {
            AddressFamily::Inet => "inet",
            AddressFamily::Inet6 => "inet6",
        }
    }

    pub fn matches(&self, ip: &IpAddr) -> bool {
        matches!(
            (self, ip),
            (AddressFamily::Inet, IpAddr::V4(_)) | (AddressFamily::Inet6, IpAddr::V6(_))
        )
    }
}

impl fmt::Display for AddressFamily {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for AddressFamily {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "inet" => Ok(AddressFamily::Inet),
            "inet6" => Ok(AddressFamily::Inet6),
            _ => Err(format!("Invalid address family: {} (expected inet or inet6)", s)),
        }
    }
}

/// Name server under test
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct TargetConfig {
    /// Server IP address (default: "127.0.0.1")
    #[serde(default = "default_server")]
    pub server: String,

    /// Server port (default: 53)
    #[serde(default = "default_port")]
    pub port: u16,

    #[serde(default)]
    pub transport: Transport,

    #[serde(default)]
    pub family: AddressFamily,
}

impl TargetConfig {
    /// Resolves the configured server into a socket address, checking it
    /// belongs to the configured address family.
    pub fn socket_addr(&self) -> Result<SocketAddr, ConfigError> {
        let ip = IpAddr::from_str(&self.server).map_err(|e| {
            ConfigError::Validation(format!("Invalid server address '{}': {}", self.server, e))
        })?;

        if !self.family.matches(&ip) {
            return Err(ConfigError::Validation(format!(
                "Server address {} does not belong to address family {}",
                ip, self.family
            )));
        }

        Ok(SocketAddr::new(ip, self.port))
    }
}

impl Default for TargetConfig {
    fn default() -> Self {
        Self {
            server: default_server(),
            port: default_port(),
            transport: Transport::default(),
            family: AddressFamily::default(),
        }
    }
}

fn default_server() -> String {
    "127.0.0.1".to_string()
}

fn default_port() -> u16 {
    53
}
