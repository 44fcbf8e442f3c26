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

//! Datagram echo loop: every message is answered on its own, no state is
//! kept per sender.
use crate::error::*;
use crate::transport::Datagram;
use std::io::ErrorKind;

/// Answers each message received on a [`Datagram`] socket.
pub struct DgramServer<D, F> {
    socket: D,
    buf: Vec<u8>,
    transform: F,
}

impl<D, F> DgramServer<D, F>
where
    D: Datagram,
    F: Fn(&mut [u8]),
{
    /// buf_size is the initial receive buffer, it grows to fit a longer
    /// message.
    pub fn new(socket: D, buf_size: usize, transform: F) -> Self {
        DgramServer {
            socket,
            buf: vec![0u8; buf_size.max(1)],
            transform,
        }
    }

    ///
    pub fn socket(&self) -> &D {
        &self.socket
    }

    fn reserve(&mut self) -> Result<()> {
        let size = loop {
            match self.socket.next_size() {
                Ok(size) => break size,
                Err(e) if e.kind() == ErrorKind::Interrupted => continue,
                Err(e) => return Err(Error::Io { source: e }),
            }
        };
        if size > self.buf.len() {
            log::debug!(
                "growing the receive buffer from {} to {} bytes",
                self.buf.len(),
                size
            );
            self.buf.resize(size, 0);
        }
        Ok(())
    }

    fn recv(&mut self) -> Result<(usize, D::Addr)> {
        loop {
            match self.socket.recv_msg(&mut self.buf) {
                Ok(v) => return Ok(v),
                Err(e) if e.kind() == ErrorKind::Interrupted => continue,
                Err(e) => return Err(Error::Io { source: e }),
            }
        }
    }

    /// Receive one message, transform it in place and send it back to its
    /// sender. Returns the message length.
    ///
    /// A failed or short reply is reported as [`Error::Reply`] or
    /// [`Error::ShortSend`]; the socket stays usable.
    pub fn serve_one(&mut self) -> Result<usize> {
        self.reserve()?;
        let (n, addr) = self.recv()?;
        log::info!("received {} bytes from {}", n, D::describe(&addr));

        (self.transform)(&mut self.buf[..n]);

        let sent = self
            .socket
            .send_msg(&self.buf[..n], &addr)
            .context(ReplySnafu {
                peer: D::describe(&addr),
            })?;
        if sent != n {
            return Err(Error::ShortSend { sent, expected: n });
        }
        Ok(n)
    }

    /// Serve messages until receiving fails. A reply that can not be
    /// delivered only costs that sender its answer.
    pub fn serve_forever(&mut self) -> Result<()> {
        loop {
            match self.serve_one() {
                Ok(_) => {}
                Err(e) if is_peer_error(&e) => log::warn!("{}", e),
                Err(e) => return Err(e),
            }
        }
    }
}

fn is_peer_error(e: &Error) -> bool {
    matches!(e, Error::Reply { .. } | Error::ShortSend { .. })
}
