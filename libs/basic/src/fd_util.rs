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

//! descriptor helpers used when detaching a process from its environment
use crate::error::*;
use constants::{DAEMON_MAX_CLOSE, NULL_DEVICE};
use nix::{
    fcntl::OFlag,
    sys::stat::{self, Mode, SFlag},
    unistd::{self, SysconfVar},
};
use std::os::unix::prelude::RawFd;

/// check if the given stat.st_mode is char device
pub fn stat_is_char(st_mode: u32) -> bool {
    st_mode & SFlag::S_IFMT.bits() == SFlag::S_IFCHR.bits()
}

/// The highest descriptor number plus one a process may open.
///
/// Falls back to [`DAEMON_MAX_CLOSE`] when the limit is indeterminate or
/// can not be queried.
pub fn open_max() -> RawFd {
    match unistd::sysconf(SysconfVar::OPEN_MAX) {
        Ok(Some(v)) if v > 0 => RawFd::try_from(v).unwrap_or(RawFd::MAX),
        _ => DAEMON_MAX_CLOSE,
    }
}

/// Close every open descriptor in `0..max`.
///
/// The open descriptors are taken from /proc/self/fd when it is available,
/// otherwise every number in the range is tried. Numbers that are not open
/// fail with EBADF, which is expected and ignored. Nothing is logged here:
/// the log target itself may be among the closed descriptors.
pub fn close_all_fds(max: RawFd) {
    match proc_self_fds() {
        Some(fds) => {
            for fd in fds.into_iter().filter(|fd| *fd < max) {
                let _ = unistd::close(fd);
            }
        }
        None => {
            for fd in 0..max {
                let _ = unistd::close(fd);
            }
        }
    }
}

/// list the descriptors currently open, None if /proc is not mounted
fn proc_self_fds() -> Option<Vec<RawFd>> {
    let dir = std::fs::read_dir("/proc/self/fd").ok()?;
    let mut fds = Vec::new();
    for de in dir {
        let de = match de {
            Err(_) => continue,
            Ok(v) => v,
        };
        if let Ok(fd) = de.file_name().to_string_lossy().parse::<RawFd>() {
            fds.push(fd);
        }
    }
    /* the directory stream's own descriptor is listed too; it is closed
     * once the iterator drops and its close below fails with EBADF. */
    Some(fds)
}

/// Bind descriptors 0, 1 and 2 to the null device.
///
/// Must run right after [`close_all_fds`], so the kernel hands out the
/// lowest free number (0) to the null device.
pub fn reopen_stdio_null() -> Result<()> {
    let fd = nix::fcntl::open(NULL_DEVICE, OFlag::O_RDWR, Mode::empty()).context(NixSnafu)?;
    if fd != libc::STDIN_FILENO {
        return Err(Error::StdioMismatch {
            expected: libc::STDIN_FILENO,
            got: fd,
        });
    }

    for target in [libc::STDOUT_FILENO, libc::STDERR_FILENO] {
        let got = unistd::dup2(libc::STDIN_FILENO, target).context(NixSnafu)?;
        if got != target {
            return Err(Error::StdioMismatch {
                expected: target,
                got,
            });
        }
    }

    Ok(())
}

/// check if the descriptor refers to the file at path
pub fn fd_is_file(fd: RawFd, path: &str) -> Result<bool> {
    let fst = stat::fstat(fd).context(NixSnafu)?;
    let pst = stat::stat(path).context(NixSnafu)?;

    Ok(fst.st_dev == pst.st_dev && fst.st_ino == pst.st_ino && fst.st_rdev == pst.st_rdev)
}
