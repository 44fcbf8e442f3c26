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

//! Transport seams of the echo loops.
//!
//! [`Listener`] hands out connections of a connection-oriented socket,
//! [`Datagram`] receives and answers single messages. Both are implemented
//! for the std unix and inet sockets, and for the [`StreamSocket`] /
//! [`DgramSocket`] wrappers that [`bind_stream`] and [`bind_dgram`] create
//! from an [`Endpoint`].
use crate::endpoint::Endpoint;
use crate::error::*;
use basic::socket_util;
use std::{
    io::{self, Read, Write},
    net::{SocketAddr, TcpListener, TcpStream, UdpSocket},
    os::unix::{
        io::{AsRawFd, RawFd},
        net::{self as unix, UnixDatagram, UnixListener, UnixStream},
    },
};

/// A bound connection-oriented socket.
pub trait Listener {
    /// an accepted peer handle
    type Conn: Read + Write;

    /// Block until a peer connects, return its handle and a printable address.
    fn accept_conn(&self) -> io::Result<(Self::Conn, String)>;
}

/// A bound datagram socket.
pub trait Datagram {
    /// the address of a sender
    type Addr;

    /// Block until one message is queued, return its length without
    /// consuming it.
    fn next_size(&self) -> io::Result<usize>;

    /// Block until one message arrives, return its length and sender.
    fn recv_msg(&self, buf: &mut [u8]) -> io::Result<(usize, Self::Addr)>;

    /// Send one message to addr, return the number of bytes sent.
    fn send_msg(&self, buf: &[u8], addr: &Self::Addr) -> io::Result<usize>;

    /// printable form of a sender address
    fn describe(addr: &Self::Addr) -> String;
}

fn peek_size(fd: RawFd) -> io::Result<usize> {
    socket_util::next_datagram_size(fd).map_err(|e| io::Error::from_raw_os_error(e.get_errno()))
}

fn describe_unix(addr: &unix::SocketAddr) -> String {
    match addr.as_pathname() {
        Some(path) => path.display().to_string(),
        None => "(unnamed)".to_string(),
    }
}

impl Listener for UnixListener {
    type Conn = UnixStream;

    fn accept_conn(&self) -> io::Result<(UnixStream, String)> {
        let (conn, addr) = self.accept()?;
        Ok((conn, describe_unix(&addr)))
    }
}

impl Listener for TcpListener {
    type Conn = TcpStream;

    fn accept_conn(&self) -> io::Result<(TcpStream, String)> {
        let (conn, addr) = self.accept()?;
        Ok((conn, addr.to_string()))
    }
}

impl Datagram for UnixDatagram {
    type Addr = unix::SocketAddr;

    fn next_size(&self) -> io::Result<usize> {
        peek_size(self.as_raw_fd())
    }

    fn recv_msg(&self, buf: &mut [u8]) -> io::Result<(usize, unix::SocketAddr)> {
        self.recv_from(buf)
    }

    /// An unbound sender can not be answered.
    fn send_msg(&self, buf: &[u8], addr: &unix::SocketAddr) -> io::Result<usize> {
        match addr.as_pathname() {
            Some(path) => self.send_to(buf, path),
            None => Err(io::Error::new(
                io::ErrorKind::InvalidInput,
                "sender has no address to reply to",
            )),
        }
    }

    fn describe(addr: &unix::SocketAddr) -> String {
        describe_unix(addr)
    }
}

impl Datagram for UdpSocket {
    type Addr = SocketAddr;

    fn next_size(&self) -> io::Result<usize> {
        peek_size(self.as_raw_fd())
    }

    fn recv_msg(&self, buf: &mut [u8]) -> io::Result<(usize, SocketAddr)> {
        self.recv_from(buf)
    }

    fn send_msg(&self, buf: &[u8], addr: &SocketAddr) -> io::Result<usize> {
        self.send_to(buf, addr)
    }

    fn describe(addr: &SocketAddr) -> String {
        addr.to_string()
    }
}

/// A listening socket of either address family.
#[derive(Debug)]
pub enum StreamSocket {
    ///
    Unix(UnixListener),
    ///
    Inet6(TcpListener),
}

/// A connection accepted from a [`StreamSocket`].
#[derive(Debug)]
pub enum StreamConn {
    ///
    Unix(UnixStream),
    ///
    Inet6(TcpStream),
}

impl Read for StreamConn {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        match self {
            StreamConn::Unix(s) => s.read(buf),
            StreamConn::Inet6(s) => s.read(buf),
        }
    }
}

impl Write for StreamConn {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        match self {
            StreamConn::Unix(s) => s.write(buf),
            StreamConn::Inet6(s) => s.write(buf),
        }
    }

    fn flush(&mut self) -> io::Result<()> {
        match self {
            StreamConn::Unix(s) => s.flush(),
            StreamConn::Inet6(s) => s.flush(),
        }
    }
}

impl Listener for StreamSocket {
    type Conn = StreamConn;

    fn accept_conn(&self) -> io::Result<(StreamConn, String)> {
        match self {
            StreamSocket::Unix(l) => {
                let (conn, addr) = l.accept_conn()?;
                Ok((StreamConn::Unix(conn), addr))
            }
            StreamSocket::Inet6(l) => {
                let (conn, addr) = l.accept_conn()?;
                Ok((StreamConn::Inet6(conn), addr))
            }
        }
    }
}

impl AsRawFd for StreamSocket {
    fn as_raw_fd(&self) -> RawFd {
        match self {
            StreamSocket::Unix(l) => l.as_raw_fd(),
            StreamSocket::Inet6(l) => l.as_raw_fd(),
        }
    }
}

/// A bound datagram socket of either address family.
#[derive(Debug)]
pub enum DgramSocket {
    ///
    Unix(UnixDatagram),
    ///
    Inet6(UdpSocket),
}

/// The sender of a message received on a [`DgramSocket`].
#[derive(Debug)]
pub enum PeerAddr {
    ///
    Unix(unix::SocketAddr),
    ///
    Inet6(SocketAddr),
}

impl Datagram for DgramSocket {
    type Addr = PeerAddr;

    fn next_size(&self) -> io::Result<usize> {
        match self {
            DgramSocket::Unix(s) => s.next_size(),
            DgramSocket::Inet6(s) => s.next_size(),
        }
    }

    fn recv_msg(&self, buf: &mut [u8]) -> io::Result<(usize, PeerAddr)> {
        match self {
            DgramSocket::Unix(s) => {
                let (n, addr) = s.recv_msg(buf)?;
                Ok((n, PeerAddr::Unix(addr)))
            }
            DgramSocket::Inet6(s) => {
                let (n, addr) = s.recv_msg(buf)?;
                Ok((n, PeerAddr::Inet6(addr)))
            }
        }
    }

    fn send_msg(&self, buf: &[u8], addr: &PeerAddr) -> io::Result<usize> {
        match (self, addr) {
            (DgramSocket::Unix(s), PeerAddr::Unix(a)) => s.send_msg(buf, a),
            (DgramSocket::Inet6(s), PeerAddr::Inet6(a)) => s.send_msg(buf, a),
            _ => Err(io::Error::new(
                io::ErrorKind::InvalidInput,
                "address family of the peer does not match the socket",
            )),
        }
    }

    fn describe(addr: &PeerAddr) -> String {
        match addr {
            PeerAddr::Unix(a) => UnixDatagram::describe(a),
            PeerAddr::Inet6(a) => UdpSocket::describe(a),
        }
    }
}

impl AsRawFd for DgramSocket {
    fn as_raw_fd(&self) -> RawFd {
        match self {
            DgramSocket::Unix(s) => s.as_raw_fd(),
            DgramSocket::Inet6(s) => s.as_raw_fd(),
        }
    }
}

/// Bind a listening socket. A socket file a previous instance left behind
/// at a unix path is removed first.
pub fn bind_stream(endpoint: &Endpoint) -> Result<StreamSocket> {
    match endpoint {
        Endpoint::Unix(path) => {
            socket_util::remove_socket_path(path)?;
            Ok(StreamSocket::Unix(UnixListener::bind(path)?))
        }
        Endpoint::Inet6(addr) => Ok(StreamSocket::Inet6(TcpListener::bind(SocketAddr::V6(
            *addr,
        ))?)),
    }
}

/// Bind a datagram socket, see [`bind_stream`].
pub fn bind_dgram(endpoint: &Endpoint) -> Result<DgramSocket> {
    match endpoint {
        Endpoint::Unix(path) => {
            socket_util::remove_socket_path(path)?;
            Ok(DgramSocket::Unix(UnixDatagram::bind(path)?))
        }
        Endpoint::Inet6(addr) => Ok(DgramSocket::Inet6(UdpSocket::bind(SocketAddr::V6(*addr))?)),
    }
}

/// Apply SO_RCVBUF / SO_SNDBUF to a bound socket, 0 leaves a size untouched.
pub fn set_buffers(fd: RawFd, receive: usize, send: usize) -> Result<()> {
    if receive > 0 {
        socket_util::set_receive_buffer(fd, receive)?;
    }
    if send > 0 {
        socket_util::set_send_buffer(fd, send)?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use libtests::socket_path;

    #[test]
    fn test_bind_stream_replaces_stale_path() {
        let (_dir, path) = socket_path("stream");
        let ep = Endpoint::unix(&path).unwrap();

        /* a previous instance left its socket file behind */
        drop(UnixListener::bind(&path).unwrap());
        assert!(path.exists());

        let listener = bind_stream(&ep).unwrap();
        assert!(matches!(listener, StreamSocket::Unix(_)));
        set_buffers(listener.as_raw_fd(), 32768, 0).unwrap();

        let mut client = UnixStream::connect(&path).unwrap();
        let (mut conn, _) = listener.accept_conn().unwrap();
        client.write_all(b"ping").unwrap();
        let mut buf = [0u8; 4];
        conn.read_exact(&mut buf).unwrap();
        assert_eq!(&buf, b"ping");
    }

    #[test]
    fn test_bind_dgram_unix() {
        let (_dir, path) = socket_path("dgram");
        let ep = Endpoint::unix(&path).unwrap();
        let server = bind_dgram(&ep).unwrap();

        let (_cdir, cpath) = socket_path("client");
        let client = UnixDatagram::bind(&cpath).unwrap();
        client.send_to(b"abc", &path).unwrap();

        let mut buf = [0u8; 16];
        assert_eq!(server.next_size().unwrap(), 3);
        let (n, addr) = server.recv_msg(&mut buf).unwrap();
        assert_eq!(&buf[..n], b"abc");
        assert_eq!(DgramSocket::describe(&addr), cpath.display().to_string());
        assert_eq!(server.send_msg(&buf[..n], &addr).unwrap(), 3);

        let n = client.recv(&mut buf).unwrap();
        assert_eq!(&buf[..n], b"abc");
    }

    #[test]
    fn test_unnamed_sender() {
        let (_dir, path) = socket_path("dgram");
        let server = UnixDatagram::bind(&path).unwrap();
        let client = UnixDatagram::unbound().unwrap();
        client.send_to(b"x", &path).unwrap();

        let mut buf = [0u8; 4];
        let (n, addr) = server.recv_msg(&mut buf).unwrap();
        assert_eq!(n, 1);
        assert_eq!(UnixDatagram::describe(&addr), "(unnamed)");
        assert!(server.send_msg(&buf[..n], &addr).is_err());
    }

    #[test]
    fn test_bind_inet6() {
        if !socket_util::ipv6_is_supported() {
            return;
        }
        let ep = Endpoint::inet6("[::1]:0", 0).unwrap();
        let listener = bind_stream(&ep).unwrap();
        assert!(matches!(listener, StreamSocket::Inet6(_)));

        let udp = bind_dgram(&ep).unwrap();
        assert!(matches!(udp, DgramSocket::Inet6(_)));
    }
}
