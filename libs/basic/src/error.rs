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

//! error definitions
use nix::errno::Errno;
use snafu::prelude::*;
#[allow(unused_imports)]
pub use snafu::ResultExt;

#[allow(missing_docs)]
#[derive(Debug, Snafu)]
#[snafu(visibility(pub))]
#[non_exhaustive]
pub enum Error {
    #[snafu(display("Io: {}", source))]
    Io { source: std::io::Error },

    #[snafu(display("Errno: {}", source))]
    Nix { source: nix::Error },

    /// the process could not be duplicated, usually resource exhaustion
    #[snafu(display("Failed to fork: {}", source))]
    Fork { source: nix::Error },

    /// a new session could not be created, the caller is a process group leader
    #[snafu(display("Failed to create a new session: {}", source))]
    Setsid { source: nix::Error },

    /// the null device did not land on the expected standard descriptor
    #[snafu(display("Standard descriptor mismatch: expected {}, got {}", expected, got))]
    StdioMismatch { expected: i32, got: i32 },

    #[snafu(display("Invalid: '{}'.", what))]
    Invalid { what: String },

    #[snafu(display("OtherError: '{}'.", msg))]
    Other { msg: String },
}

impl Error {
    /// Translate the basic error to error number.
    pub fn get_errno(&self) -> i32 {
        match self {
            Error::Io { source } => source.raw_os_error().unwrap_or(Errno::EIO as i32),
            Error::Nix { source } => *source as i32,
            Error::Fork { source } => *source as i32,
            Error::Setsid { source } => *source as i32,
            Error::StdioMismatch {
                expected: _,
                got: _,
            } => Errno::EBADF as i32,
            Error::Invalid { what: _ } => Errno::EINVAL as i32,
            Error::Other { msg: _ } => Errno::EINVAL as i32,
        }
    }
}

impl From<std::io::Error> for Error {
    fn from(e: std::io::Error) -> Error {
        Error::Io { source: e }
    }
}

impl From<nix::Error> for Error {
    fn from(e: nix::Error) -> Error {
        Error::Nix { source: e }
    }
}

///
pub type Result<T, E = Error> = std::result::Result<T, E>;
