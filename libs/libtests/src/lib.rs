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

//! This crate provides common functions for unit tests
use std::{
    env,
    io::{self, ErrorKind},
    path::PathBuf,
    thread,
    time::{Duration, Instant},
};
use tempfile::TempDir;

/// get the crate root path of the crate under test
pub fn get_crate_root() -> io::Result<PathBuf> {
    match env::var_os("CARGO_MANIFEST_DIR") {
        Some(dir) => Ok(PathBuf::from(dir)),
        None => Err(io::Error::new(ErrorKind::NotFound, "CARGO_MANIFEST_DIR")),
    }
}

/// A fresh directory and a socket path inside it.
///
/// The directory is removed when the returned guard drops, keep it alive
/// as long as the path is in use. Temporary directories are short enough
/// for sun_path.
pub fn socket_path(name: &str) -> (TempDir, PathBuf) {
    let dir = tempfile::Builder::new()
        .prefix("ucase")
        .tempdir()
        .expect("failed to create a temporary directory");
    let path = dir.path().join(name);
    (dir, path)
}

/// Poll until the predicate holds, give up after timeout.
pub fn wait_until<F: FnMut() -> bool>(mut pred: F, timeout: Duration) -> bool {
    let start = Instant::now();
    while start.elapsed() < timeout {
        if pred() {
            return true;
        }
        thread::sleep(Duration::from_millis(10));
    }
    pred()
}
