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

//! Turn the calling process into a daemon.
//!
//! The procedure is the classic double fork:
//!   - fork and let the parent exit, so the child is not a process group leader;
//!   - setsid() in the child, which detaches it from the controlling terminal;
//!   - fork again and let the session leader exit, so the grandchild can never
//!     reacquire a controlling terminal;
//!   - clear the umask and move to `/`;
//!   - close every inherited descriptor and bind 0, 1, 2 to `/dev/null`.
//!
//! Call [`become_daemon`] before acquiring any other resource (log sockets,
//! listening sockets, lock files): closing the inherited descriptors destroys
//! them.

use crate::error::*;
use crate::fd_util;
use nix::{
    sys::stat::{umask, Mode},
    unistd::{self, ForkResult},
};

/// Behavior toggles for [`become_daemon`].
///
/// No toggle is defined yet, [`DaemonFlags::default`] is the only value.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct DaemonFlags {
    bits: u32,
}

impl DaemonFlags {
    /// the raw flag bits
    pub fn bits(&self) -> u32 {
        self.bits
    }
}

/// Keep running in the child of a fork, terminate the parent at once.
///
/// The parent leaves through _exit() so that no atexit handler or buffered
/// stdio of the caller runs twice.
fn fork_and_exit_parent() -> Result<()> {
    match unsafe { unistd::fork() }.context(ForkSnafu)? {
        ForkResult::Child => Ok(()),
        ForkResult::Parent { child: _ } => unsafe { libc::_exit(libc::EXIT_SUCCESS) },
    }
}

/// Detach the calling process from its terminal and session.
///
/// Returns in the grandchild of the caller; the caller and the intermediate
/// session leader exit with status 0. On error the process that observed it
/// gets the error back; nothing is rolled back.
pub fn become_daemon(flags: DaemonFlags) -> Result<()> {
    let _ = flags;

    fork_and_exit_parent()?;

    unistd::setsid().context(SetsidSnafu)?;

    /* The session leader exits here, the grandchild is not a session leader
     * and can not acquire a controlling terminal by opening a tty. */
    fork_and_exit_parent()?;

    umask(Mode::empty());

    unistd::chdir("/").context(NixSnafu)?;

    fd_util::close_all_fds(fd_util::open_max());

    fd_util::reopen_stdio_null()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_flags() {
        let flags = DaemonFlags::default();
        assert_eq!(flags.bits(), 0);
        assert_eq!(flags, DaemonFlags::default());
    }
}
