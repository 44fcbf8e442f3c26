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

//!
use crate::error::*;
use nix::{
    errno::Errno,
    sys::socket::{self, sockopt, MsgFlags},
};
use std::{io::ErrorKind, os::unix::prelude::RawFd, path::Path};

///
pub fn ipv6_is_supported() -> bool {
    Path::new("/proc/net/if_inet6").exists()
}

/// Remove the filesystem entry a previous instance left behind for a
/// unix socket, so the path can be bound again. A missing entry is fine.
pub fn remove_socket_path(path: &Path) -> Result<()> {
    match std::fs::remove_file(path) {
        Ok(()) => Ok(()),
        Err(e) if e.kind() == ErrorKind::NotFound => Ok(()),
        Err(e) => Err(Error::Io { source: e }),
    }
}

/// Set the receive buffer size of a socket.
///
/// The kernel doubles the value; if it did not take the size at all the
/// privileged RcvBufForce is tried.
pub fn set_receive_buffer(fd: RawFd, v: usize) -> Result<()> {
    if v > (std::isize::MAX) as usize {
        return Err(Error::Nix {
            source: Errno::ERANGE,
        });
    }

    socket::setsockopt(fd, sockopt::RcvBuf, &v).context(NixSnafu)?;

    let value = socket::getsockopt(fd, sockopt::RcvBuf).context(NixSnafu)?;
    if value < v {
        return socket::setsockopt(fd, sockopt::RcvBufForce, &v).context(NixSnafu);
    }
    Ok(())
}

/// Set the send buffer size of a socket, see [`set_receive_buffer`].
pub fn set_send_buffer(fd: RawFd, v: usize) -> Result<()> {
    if v > (std::isize::MAX) as usize {
        return Err(Error::Nix {
            source: Errno::ERANGE,
        });
    }

    socket::setsockopt(fd, sockopt::SndBuf, &v).context(NixSnafu)?;

    let value = socket::getsockopt(fd, sockopt::SndBuf).context(NixSnafu)?;
    if value < v {
        return socket::setsockopt(fd, sockopt::SndBufForce, &v).context(NixSnafu);
    }
    Ok(())
}

/// Size of the next datagram queued on fd, without consuming it.
///
/// Blocks until a datagram arrives unless the socket is non-blocking. Unlike
/// FIONREAD, recv(MSG_PEEK | MSG_TRUNC) reports the length of the datagram
/// itself rather than the bytes queued, so the buffer sized from it takes
/// the whole message. Sockets that refuse a zero-sized MSG_TRUNC peek fall
/// back to FIONREAD.
pub fn next_datagram_size(fd: RawFd) -> Result<usize> {
    let mut buf = [0u8; 0];
    loop {
        match socket::recv(fd, &mut buf, MsgFlags::MSG_PEEK | MsgFlags::MSG_TRUNC) {
            Ok(len) => return Ok(len),
            Err(Errno::EINTR) => continue,
            Err(Errno::EOPNOTSUPP) | Err(Errno::EFAULT) => break,
            Err(err) => return Err(Error::Nix { source: err }),
        }
    }

    let mut k: libc::c_int = 0;
    if unsafe { libc::ioctl(fd, libc::FIONREAD, &mut k) } < 0 {
        return Err(Error::Nix {
            source: Errno::last(),
        });
    }
    Ok(k as usize)
}
