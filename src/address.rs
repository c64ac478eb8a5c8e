//! The address type used to identify servers in a topology.

use std::{fmt, str::FromStr};

use crate::error::{Error, Result};

const DEFAULT_PORT: u16 = 27017;

/// The address of a single server, used as a set/map key.
///
/// Equality is byte-wise on `host:port`: two differently-cased spellings of the same host are
/// distinct addresses.
#[derive(Clone, Debug, Eq, Hash, Ord, PartialEq, PartialOrd)]
pub struct ServerAddress {
    host: String,
    port: u16,
}

impl ServerAddress {
    /// Parses a `host` or `host:port` string into a [`ServerAddress`].
    ///
    /// The port defaults to 27017 when omitted.
    pub fn parse(address: impl AsRef<str>) -> Result<Self> {
        let address = address.as_ref();

        let mut parts = address.split(':');
        let host = match parts.next() {
            Some(part) if !part.is_empty() => part,
            _ => {
                return Err(Error::invalid_address(
                    address,
                    "hostname cannot be empty",
                ))
            }
        };

        let port = match parts.next() {
            Some(part) => {
                let port: u16 = part
                    .parse()
                    .map_err(|_| Error::invalid_address(address, "port must be a valid u16"))?;
                if port == 0 {
                    return Err(Error::invalid_address(address, "port must be non-zero"));
                }
                if parts.next().is_some() {
                    return Err(Error::invalid_address(
                        address,
                        "address contains more than one ':'",
                    ));
                }
                port
            }
            None => DEFAULT_PORT,
        };

        Ok(ServerAddress {
            host: host.to_string(),
            port,
        })
    }
}

impl FromStr for ServerAddress {
    type Err = Error;

    fn from_str(address: &str) -> Result<Self> {
        ServerAddress::parse(address)
    }
}

impl fmt::Display for ServerAddress {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.host, self.port)
    }
}

#[cfg(test)]
mod test {
    use pretty_assertions::assert_eq;

    use super::*;

    #[test]
    fn defaults_port_when_omitted() {
        let address = ServerAddress::parse("localhost").unwrap();
        assert_eq!(address.to_string(), "localhost:27017");
    }

    #[test]
    fn preserves_host_case() {
        let address = ServerAddress::parse("EXAMPLE.COM:27018").unwrap();
        assert_eq!(address.to_string(), "EXAMPLE.COM:27018");
    }

    #[test]
    fn equality_is_byte_wise() {
        let a = ServerAddress::parse("Example.com:27017").unwrap();
        let b = ServerAddress::parse("example.com:27017").unwrap();
        assert_ne!(a, b);

        let c = ServerAddress::parse("example.com:27017").unwrap();
        assert_eq!(b, c);
    }

    #[test]
    fn rejects_empty_host() {
        assert!(ServerAddress::parse(":27017").is_err());
        assert!(ServerAddress::parse("").is_err());
    }

    #[test]
    fn rejects_zero_and_invalid_port() {
        assert!(ServerAddress::parse("a:0").is_err());
        assert!(ServerAddress::parse("a:notaport").is_err());
    }

    #[test]
    fn rejects_extra_colons() {
        assert!(ServerAddress::parse("a:27017:extra").is_err());
    }
}
