// Copyright (c) 2022 Huawei Technologies Co.,Ltd. All rights reserved.
//
// sysMaster is licensed under Mulan PSL v2.
// You can use this software according to the terms and conditions of the Mulan
// PSL v2.
// You may obtain a copy of Mulan PSL v2 at:
//         http://license.coscl.org.cn/MulanPSL2
// THIS SOFTWARE IS PROVIDED ON AN "AS IS" BASIS, WITHOUT WARRANTIES OF ANY
// KIND, EITHER EXPRESS OR IMPLIED, INCLUDING BUT NOT LIMITED TO
// NON-INFRINGEMENT, MERCHANTABILITY OR FIT FOR A PARTICULAR PURPOSE.
// See the Mulan PSL v2 for more details.

//! Address of a transport endpoint.
//!
//! A unix socket is addressed by a filesystem path, which must fit into
//! sun_path. An IPv6 socket is addressed as `ADDR`, `[ADDR]` or
//! `[ADDR]:PORT`; the port defaults to [`INET6_PORT`].
use crate::error::*;
use constants::{INET6_ADDRSTRLEN, INET6_PORT, UNIX_PATH_MAX};
use std::{
    fmt::{self, Display},
    net::{Ipv6Addr, SocketAddrV6},
    os::unix::ffi::OsStrExt,
    path::{Path, PathBuf},
    str::FromStr,
};

/// where a socket lives
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Endpoint {
    /// a unix domain socket bound to a filesystem path
    Unix(PathBuf),
    /// an IPv6 address and port
    Inet6(SocketAddrV6),
}

fn invalid(what: &str, reason: &str) -> Error {
    Error::Endpoint {
        what: what.to_string(),
        reason: reason.to_string(),
    }
}

impl Endpoint {
    /// A unix endpoint, rejecting paths that do not fit into sun_path.
    pub fn unix<P: AsRef<Path>>(path: P) -> Result<Endpoint> {
        let path = path.as_ref();
        let len = path.as_os_str().as_bytes().len();
        if len == 0 {
            return Err(invalid("", "empty path"));
        }
        /* one byte is left for the terminating NUL */
        if len >= UNIX_PATH_MAX {
            return Err(invalid(
                &path.to_string_lossy(),
                &format!("path longer than {} bytes", UNIX_PATH_MAX - 1),
            ));
        }
        Ok(Endpoint::Unix(path.to_path_buf()))
    }

    /// Parse an IPv6 endpoint, falling back to `default_port` when the text
    /// carries none.
    pub fn inet6(s: &str, default_port: u16) -> Result<Endpoint> {
        let (addr, port) = match s.strip_prefix('[') {
            Some(rest) => {
                let (addr, tail) = rest
                    .split_once(']')
                    .ok_or_else(|| invalid(s, "missing ']'"))?;
                let port = match tail {
                    "" => default_port,
                    _ => tail
                        .strip_prefix(':')
                        .and_then(|p| p.parse::<u16>().ok())
                        .ok_or_else(|| invalid(s, "invalid port"))?,
                };
                (addr, port)
            }
            None => (s, default_port),
        };

        if addr.len() >= INET6_ADDRSTRLEN {
            return Err(invalid(s, "address too long"));
        }
        let ip = Ipv6Addr::from_str(addr).map_err(|_| invalid(s, "not an IPv6 address"))?;
        Ok(Endpoint::Inet6(SocketAddrV6::new(ip, port, 0, 0)))
    }

    /// check if the endpoint is a unix socket path
    pub fn is_unix(&self) -> bool {
        matches!(self, Endpoint::Unix(_))
    }
}

impl FromStr for Endpoint {
    type Err = Error;

    /// Paths start with `/` or `.`, everything else is an IPv6 endpoint.
    fn from_str(s: &str) -> Result<Self> {
        if s.is_empty() {
            return Err(invalid(s, "empty endpoint"));
        }
        if s.starts_with('/') || s.starts_with('.') {
            return Endpoint::unix(s);
        }
        Endpoint::inet6(s, INET6_PORT)
    }
}

impl Display for Endpoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Endpoint::Unix(path) => write!(f, "{}", path.display()),
            Endpoint::Inet6(addr) => write!(f, "{}", addr),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_unix() {
        let ep: Endpoint = "/tmp/ud_ucase".parse().unwrap();
        assert_eq!(ep, Endpoint::Unix(PathBuf::from("/tmp/ud_ucase")));
        assert!(ep.is_unix());
        assert_eq!(ep.to_string(), "/tmp/ud_ucase");

        let ep: Endpoint = "./sock".parse().unwrap();
        assert!(ep.is_unix());

        let longest = format!("/{}", "a".repeat(UNIX_PATH_MAX - 2));
        assert!(longest.parse::<Endpoint>().is_ok());
        let too_long = format!("/{}", "a".repeat(UNIX_PATH_MAX - 1));
        assert!(too_long.parse::<Endpoint>().is_err());

        assert!(Endpoint::unix("").is_err());
    }

    #[test]
    fn test_parse_inet6() {
        let ep: Endpoint = "::1".parse().unwrap();
        assert_eq!(
            ep,
            Endpoint::Inet6(SocketAddrV6::new(Ipv6Addr::LOCALHOST, INET6_PORT, 0, 0))
        );
        assert!(!ep.is_unix());

        let ep: Endpoint = "[::]:8080".parse().unwrap();
        assert_eq!(
            ep,
            Endpoint::Inet6(SocketAddrV6::new(Ipv6Addr::UNSPECIFIED, 8080, 0, 0))
        );
        assert_eq!(ep.to_string(), "[::]:8080");

        let ep: Endpoint = "[fe80::1]".parse().unwrap();
        assert_eq!(ep.to_string(), format!("[fe80::1]:{}", INET6_PORT));

        assert_eq!(
            Endpoint::inet6("::1", 7).unwrap(),
            Endpoint::Inet6(SocketAddrV6::new(Ipv6Addr::LOCALHOST, 7, 0, 0))
        );
    }

    #[test]
    fn test_parse_invalid() {
        for s in [
            "",
            "127.0.0.1",
            "localhost",
            "[::1",
            "[::1]:",
            "[::1]:port",
            "[::1]:70000",
            "[::1]8080",
            "::g",
        ] {
            let e = s.parse::<Endpoint>().unwrap_err();
            assert!(matches!(e, Error::Endpoint { .. }), "{}", s);
            assert_eq!(e.get_errno(), libc::EINVAL);
        }

        let long = format!("{}::1", "0:".repeat(30));
        assert!(long.parse::<Endpoint>().is_err());
    }
}
