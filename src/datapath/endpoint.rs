//! Datapath endpoints and host:port parsing.

use std::fmt;
use std::net::{IpAddr, SocketAddr};

use serde::{Deserialize, Serialize};

use crate::core::{KryptonError, KryptonResult};

/// IP family of an endpoint.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum IpProtocol {
    /// IPv4.
    V4,
    /// IPv6.
    V6,
}

impl From<&IpAddr> for IpProtocol {
    fn from(addr: &IpAddr) -> Self {
        match addr {
            IpAddr::V4(_) => Self::V4,
            IpAddr::V6(_) => Self::V6,
        }
    }
}

/// A resolved datapath endpoint.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Endpoint {
    /// The address exactly as it was handed to the selector.
    host_port: String,
    /// Parsed IP address.
    address: IpAddr,
    /// Port, if the candidate carried one.
    port: Option<u16>,
}

impl Endpoint {
    /// Parse `addr`, `addr:port`, `[v6]:port` or bare `v6`.
    ///
    /// Hostnames are not resolved; only IP literals are accepted.
    pub fn from_host_port(host_port: &str) -> KryptonResult<Self> {
        let (host, port) = split_host_port(host_port)?;
        let address: IpAddr = host.parse().map_err(|_| {
            KryptonError::invalid_argument(format!("not an IP address: {host_port}"))
        })?;
        Ok(Self {
            host_port: host_port.to_string(),
            address,
            port,
        })
    }

    /// The host:port string as given.
    pub fn host_port(&self) -> &str {
        &self.host_port
    }

    /// The IP address.
    pub fn address(&self) -> IpAddr {
        self.address
    }

    /// The port, if present.
    pub fn port(&self) -> Option<u16> {
        self.port
    }

    /// Address family.
    pub fn ip_protocol(&self) -> IpProtocol {
        IpProtocol::from(&self.address)
    }

    /// Socket address, when a port is known.
    pub fn socket_addr(&self) -> Option<SocketAddr> {
        self.port.map(|port| SocketAddr::new(self.address, port))
    }
}

impl fmt::Display for Endpoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.host_port)
    }
}

/// Split a host:port string into host and optional port.
///
/// A string with more than one colon and no brackets is a bare IPv6 address.
pub fn split_host_port(host_port: &str) -> KryptonResult<(&str, Option<u16>)> {
    if let Some(rest) = host_port.strip_prefix('[') {
        let (host, after) = rest.split_once(']').ok_or_else(|| {
            KryptonError::invalid_argument(format!("unterminated bracket: {host_port}"))
        })?;
        return match after {
            "" => Ok((host, None)),
            _ => {
                let port = after.strip_prefix(':').ok_or_else(|| {
                    KryptonError::invalid_argument(format!("expected ':' after ']': {host_port}"))
                })?;
                Ok((host, Some(parse_port(port, host_port)?)))
            }
        };
    }

    match host_port.matches(':').count() {
        0 => Ok((host_port, None)),
        1 => {
            let (host, port) = host_port
                .split_once(':')
                .unwrap_or((host_port, ""));
            Ok((host, Some(parse_port(port, host_port)?)))
        }
        _ => Ok((host_port, None)),
    }
}

fn parse_port(port: &str, host_port: &str) -> KryptonResult<u16> {
    port.parse()
        .map_err(|_| KryptonError::invalid_argument(format!("invalid port in {host_port}")))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_split_host_port() {
        assert_eq!(split_host_port("example.com:12345").unwrap(), ("example.com", Some(12345)));
        assert_eq!(split_host_port("127.0.0.1:12345").unwrap(), ("127.0.0.1", Some(12345)));
        assert_eq!(split_host_port("[2604:fe::03]:12345").unwrap(), ("2604:fe::03", Some(12345)));
        assert_eq!(split_host_port("2604:fe::3").unwrap(), ("2604:fe::3", None));
        assert_eq!(split_host_port("1.1.1.1").unwrap(), ("1.1.1.1", None));
        assert_eq!(split_host_port(":12345").unwrap(), ("", Some(12345)));
    }

    #[test]
    fn test_split_host_port_invalid() {
        assert!(split_host_port("1.1.1.1:port").is_err());
        assert!(split_host_port("[::1").is_err());
        assert!(split_host_port("[::1]2153").is_err());
        assert!(split_host_port("1.1.1.1:70000").is_err());
    }

    #[test]
    fn test_endpoint_v4() {
        let endpoint = Endpoint::from_host_port("192.0.2.1:2153").unwrap();
        assert_eq!(endpoint.ip_protocol(), IpProtocol::V4);
        assert_eq!(endpoint.port(), Some(2153));
        assert_eq!(
            endpoint.socket_addr(),
            Some("192.0.2.1:2153".parse().unwrap())
        );
        assert_eq!(endpoint.to_string(), "192.0.2.1:2153");
    }

    #[test]
    fn test_endpoint_v6() {
        let endpoint = Endpoint::from_host_port("[2001:db8::1]:2153").unwrap();
        assert_eq!(endpoint.ip_protocol(), IpProtocol::V6);
        assert_eq!(endpoint.host_port(), "[2001:db8::1]:2153");

        let bare = Endpoint::from_host_port("::1").unwrap();
        assert_eq!(bare.ip_protocol(), IpProtocol::V6);
        assert_eq!(bare.port(), None);
        assert_eq!(bare.socket_addr(), None);
    }

    #[test]
    fn test_endpoint_rejects_hostnames() {
        let err = Endpoint::from_host_port("example.com:443").unwrap_err();
        assert!(matches!(err, KryptonError::InvalidArgument(_)));
        assert!(Endpoint::from_host_port("300.1.1.1").is_err());
    }
}
