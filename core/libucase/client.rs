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

//! Client side of the echo service: datagram message exchange, piping a
//! byte stream through the stream server, and host name resolution.
use crate::endpoint::Endpoint;
use crate::error::*;
use crate::transport::StreamConn;
use basic::{io_util, socket_util};
use constants::DGRAM_CLIENT_SOCKET_PREFIX;
use std::{
    io::{self, ErrorKind, Read, Write},
    net::{IpAddr, Ipv6Addr, SocketAddr, TcpStream, ToSocketAddrs, UdpSocket},
    os::unix::net::{UnixDatagram, UnixStream},
    path::{Path, PathBuf},
    process,
    time::Duration,
};

/// A datagram socket connected to one server.
pub trait Connected {
    ///
    fn send_msg(&self, buf: &[u8]) -> io::Result<usize>;
    ///
    fn recv_msg(&self, buf: &mut [u8]) -> io::Result<usize>;
    /// None blocks forever
    fn set_timeout(&self, timeout: Option<Duration>) -> io::Result<()>;
}

impl Connected for UdpSocket {
    fn send_msg(&self, buf: &[u8]) -> io::Result<usize> {
        self.send(buf)
    }

    fn recv_msg(&self, buf: &mut [u8]) -> io::Result<usize> {
        self.recv(buf)
    }

    fn set_timeout(&self, timeout: Option<Duration>) -> io::Result<()> {
        self.set_read_timeout(timeout)
    }
}

impl Connected for UnixDatagram {
    fn send_msg(&self, buf: &[u8]) -> io::Result<usize> {
        self.send(buf)
    }

    fn recv_msg(&self, buf: &mut [u8]) -> io::Result<usize> {
        self.recv(buf)
    }

    fn set_timeout(&self, timeout: Option<Duration>) -> io::Result<()> {
        self.set_read_timeout(timeout)
    }
}

/// Send every message and wait for its reply before sending the next one.
///
/// `on_reply` is called with the 1-based message number and the reply
/// bytes. A short send is an error, a reply longer than `buf_size` is
/// truncated.
pub fn exchange<S, M, F>(
    socket: &S,
    messages: &[M],
    buf_size: usize,
    timeout: Option<Duration>,
    mut on_reply: F,
) -> Result<()>
where
    S: Connected,
    M: AsRef<[u8]>,
    F: FnMut(usize, &[u8]),
{
    socket.set_timeout(timeout)?;
    let mut buf = vec![0u8; buf_size.max(1)];

    for (i, msg) in messages.iter().enumerate() {
        let msg = msg.as_ref();
        let sent = socket.send_msg(msg)?;
        if sent != msg.len() {
            return Err(Error::ShortSend {
                sent,
                expected: msg.len(),
            });
        }

        let n = loop {
            match socket.recv_msg(&mut buf) {
                Ok(n) => break n,
                Err(e) if e.kind() == ErrorKind::Interrupted => continue,
                Err(e) => return Err(Error::Io { source: e }),
            }
        };
        log::debug!("message {}: {} bytes sent, {} bytes back", i + 1, sent, n);
        on_reply(i + 1, &buf[..n]);
    }
    Ok(())
}

/// A unix datagram socket bound to its own reply path.
///
/// The server can only answer a named sender, so the client binds a path
/// of its own, which is removed again on drop.
#[derive(Debug)]
pub struct UnixClient {
    socket: UnixDatagram,
    path: PathBuf,
}

impl UnixClient {
    /// Bind `/tmp/ud_ucase_cl.<pid>` and connect it to the server path.
    pub fn connect<P: AsRef<Path>>(server: P) -> Result<UnixClient> {
        let path = PathBuf::from(format!("{}{}", DGRAM_CLIENT_SOCKET_PREFIX, process::id()));
        UnixClient::connect_from(path, server)
    }

    /// Bind the given reply path and connect it to the server path.
    pub fn connect_from<P: AsRef<Path>>(path: PathBuf, server: P) -> Result<UnixClient> {
        Endpoint::unix(&path)?;
        socket_util::remove_socket_path(&path)?;
        let socket = UnixDatagram::bind(&path)?;
        /* from here on drop cleans the path up */
        let client = UnixClient { socket, path };
        client.socket.connect(server)?;
        Ok(client)
    }

    ///
    pub fn socket(&self) -> &UnixDatagram {
        &self.socket
    }

    ///
    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl Drop for UnixClient {
    fn drop(&mut self) {
        if let Err(e) = socket_util::remove_socket_path(&self.path) {
            log::warn!("failed to remove {}: {}", self.path.display(), e);
        }
    }
}

/// A UDP socket on an ephemeral port, connected to an IPv6 server.
pub fn udp6_connect(endpoint: &Endpoint) -> Result<UdpSocket> {
    let addr = match endpoint {
        Endpoint::Inet6(addr) => *addr,
        Endpoint::Unix(path) => {
            return Err(Error::Endpoint {
                what: path.display().to_string(),
                reason: "not an IPv6 endpoint".to_string(),
            })
        }
    };
    let socket = UdpSocket::bind((Ipv6Addr::UNSPECIFIED, 0))?;
    socket.connect(SocketAddr::V6(addr))?;
    Ok(socket)
}

/// Connect a stream socket to the endpoint.
pub fn stream_connect(endpoint: &Endpoint) -> Result<StreamConn> {
    let conn = match endpoint {
        Endpoint::Unix(path) => StreamConn::Unix(UnixStream::connect(path)?),
        Endpoint::Inet6(addr) => StreamConn::Inet6(TcpStream::connect(SocketAddr::V6(*addr))?),
    };
    Ok(conn)
}

/// Copy `input` through the connection and the replies to `output`.
///
/// Each chunk read from input is written to the server completely and
/// exactly as many bytes are read back before the next chunk. Returns the
/// number of bytes piped once input reaches its end.
pub fn pipe<C, R, W>(conn: &mut C, input: &mut R, output: &mut W, buf_size: usize) -> Result<usize>
where
    C: Read + Write,
    R: Read,
    W: Write,
{
    let mut buf = vec![0u8; buf_size.max(1)];
    let mut total = 0;
    loop {
        let n = io_util::read_chunk(input, &mut buf)?;
        if n == 0 {
            return Ok(total);
        }

        io_util::loop_write(conn, &buf[..n])?;
        let got = io_util::loop_read(conn, &mut buf[..n])?;
        if got != n {
            return Err(Error::Eof { got, expected: n });
        }
        io_util::loop_write(output, &buf[..n])?;
        output.flush()?;
        total += n;
    }
}

/// Resolve a host name to its addresses, duplicates removed, in resolver
/// order. The service is a numeric port, 80 when omitted.
pub fn resolve(host: &str, service: Option<&str>) -> Result<Vec<IpAddr>> {
    let service = service.unwrap_or("80");
    let port = service.parse::<u16>().map_err(|_| Error::Endpoint {
        what: service.to_string(),
        reason: "service must be a port number".to_string(),
    })?;

    let mut ips: Vec<IpAddr> = Vec::new();
    for addr in (host, port).to_socket_addrs()? {
        if !ips.contains(&addr.ip()) {
            ips.push(addr.ip());
        }
    }
    Ok(ips)
}
