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

//! Error define. Each crate defines its own error.rs; within libucase and the
//! two binaries only this Error is used.

/// Reuse the Errno from the nix library.
pub use nix::errno::Errno;
use snafu::prelude::*;
#[allow(unused_imports)]
pub use snafu::ResultExt;

/// Libucase Error:
/// errors inherited from the underlying crates (nix/io/basic) plus the
/// endpoint and transport conditions of the echo service.
#[allow(missing_docs)]
#[derive(Debug, Snafu)]
#[snafu(visibility(pub))]
#[non_exhaustive]
pub enum Error {
    #[snafu(display("Confique error: {}", source))]
    Confique { source: confique::Error },

    #[snafu(display("UtilError(libucase): {}", source))]
    Util { source: basic::error::Error },

    #[snafu(display("IoError(libucase): {}", source))]
    Io { source: std::io::Error },

    #[snafu(display("NixError(libucase): {}", source))]
    Nix { source: nix::Error },

    #[snafu(display("Invalid endpoint '{}': {}", what, reason))]
    Endpoint { what: String, reason: String },

    #[snafu(display("Reply to {} failed: {}", peer, source))]
    Reply { peer: String, source: std::io::Error },

    #[snafu(display("Short send: {} of {} bytes", sent, expected))]
    ShortSend { sent: usize, expected: usize },

    #[snafu(display("Unexpected end of stream after {} of {} bytes", got, expected))]
    Eof { got: usize, expected: usize },

    #[snafu(display("OtherError(libucase): '{}'.", msg))]
    Other { msg: String },
}

impl Error {
    /// Translate the error to an error number, used as process exit status.
    pub fn get_errno(&self) -> i32 {
        match self {
            Error::Confique { source: _ } => Errno::EINVAL as i32,
            Error::Util { source } => source.get_errno(),
            Error::Io { source } => source.raw_os_error().unwrap_or(Errno::EIO as i32),
            Error::Nix { source } => *source as i32,
            Error::Endpoint { what: _, reason: _ } => Errno::EINVAL as i32,
            Error::Reply { peer: _, source } => {
                source.raw_os_error().unwrap_or(Errno::EIO as i32)
            }
            Error::ShortSend {
                sent: _,
                expected: _,
            } => Errno::EMSGSIZE as i32,
            Error::Eof {
                got: _,
                expected: _,
            } => Errno::EPIPE as i32,
            Error::Other { msg: _ } => Errno::EINVAL as i32,
        }
    }
}

impl From<Error> for std::io::Error {
    fn from(e: Error) -> Self {
        match e {
            Error::Io { source } => source,
            _ => std::io::Error::from_raw_os_error(e.get_errno()),
        }
    }
}

#[allow(unused_macros)]
macro_rules! errfrom {
    ($($st:ty),* => $variant:ident) => (
        $(
            impl From<$st> for Error {
                fn from(e: $st) -> Error {
                    Error::$variant { source: e.into() }
                }
            }
        )*
    )
}

errfrom!(nix::errno::Errno => Nix);
errfrom!(std::io::Error => Io);
errfrom!(confique::Error => Confique);

impl From<basic::error::Error> for Error {
    fn from(e: basic::Error) -> Error {
        match e {
            basic::Error::Io { source } => Error::Io { source },
            basic::Error::Nix { source } => Error::Nix { source },
            _ => Error::Util { source: e },
        }
    }
}

/// new Result
pub type Result<T, E = Error> = std::result::Result<T, E>;
