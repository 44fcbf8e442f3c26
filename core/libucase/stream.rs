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

//! Connection-oriented echo loop.
//!
//! ```text
//! Listening -> Accepting -> Serving -> Closing -> Listening
//! ```
//! One peer is served at a time, until it closes its side of the stream.
use crate::error::*;
use crate::transport::Listener;
use basic::io_util;
use std::{
    fmt::{self, Display},
    io::{Read, Write},
};

/// where the stream server is in its accept/serve cycle
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StreamState {
    /// bound, no peer requested yet
    Listening,
    /// blocked waiting for a peer
    Accepting,
    /// echoing the peer's bytes
    Serving,
    /// releasing the peer handle
    Closing,
}

impl Display for StreamState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            StreamState::Listening => "listening",
            StreamState::Accepting => "accepting",
            StreamState::Serving => "serving",
            StreamState::Closing => "closing",
        };
        write!(f, "{}", s)
    }
}

/// Echo one connection until the peer ends the stream.
///
/// Every chunk read is transformed and written back completely before the
/// next read. A zero-length read ends the connection without error. Returns
/// the number of bytes echoed.
pub fn serve_connection<C, F>(conn: &mut C, buf_size: usize, transform: &F) -> Result<usize>
where
    C: Read + Write,
    F: Fn(&mut [u8]),
{
    let mut buf = vec![0u8; buf_size.max(1)];
    let mut total = 0;
    loop {
        let n = io_util::read_chunk(conn, &mut buf)?;
        if n == 0 {
            return Ok(total);
        }

        transform(&mut buf[..n]);
        io_util::loop_write(conn, &buf[..n])?;
        total += n;
    }
}

/// Accepts peers on a [`Listener`] and echoes them one after another.
pub struct StreamServer<L, F> {
    listener: L,
    buf_size: usize,
    transform: F,
    state: StreamState,
}

impl<L, F> StreamServer<L, F>
where
    L: Listener,
    F: Fn(&mut [u8]),
{
    ///
    pub fn new(listener: L, buf_size: usize, transform: F) -> Self {
        StreamServer {
            listener,
            buf_size,
            transform,
            state: StreamState::Listening,
        }
    }

    ///
    pub fn state(&self) -> StreamState {
        self.state
    }

    ///
    pub fn listener(&self) -> &L {
        &self.listener
    }

    fn set_state(&mut self, state: StreamState) {
        log::debug!("stream server: {} -> {}", self.state, state);
        self.state = state;
    }

    /// Accept one peer, serve it to the end of its stream and close it.
    ///
    /// Returns the number of bytes echoed to the peer. Accept, read and
    /// write errors are returned; the peer handle is closed either way.
    pub fn serve_one(&mut self) -> Result<usize> {
        self.set_state(StreamState::Accepting);
        let (mut conn, peer) = match self.listener.accept_conn() {
            Ok(v) => v,
            Err(e) => {
                self.set_state(StreamState::Listening);
                return Err(Error::Io { source: e });
            }
        };
        log::info!("accepted connection from {}", peer);

        self.set_state(StreamState::Serving);
        let ret = serve_connection(&mut conn, self.buf_size, &self.transform);

        self.set_state(StreamState::Closing);
        drop(conn);
        self.set_state(StreamState::Listening);

        let n = ret?;
        log::info!("connection from {} closed, {} bytes echoed", peer, n);
        Ok(n)
    }

    /// Serve peers until an error occurs.
    pub fn serve_forever(&mut self) -> Result<()> {
        loop {
            self.serve_one()?;
        }
    }
}
