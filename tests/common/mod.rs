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

use libtests::{socket_path, wait_until};
use std::{
    fs,
    io::Write,
    net::{Ipv6Addr, TcpListener, TcpStream, UdpSocket},
    path::{Path, PathBuf},
    process::{Child, Command, Output, Stdio},
    time::Duration,
};
use tempfile::TempDir;

/// A ucased running in the foreground, killed on drop.
pub struct Server {
    child: Child,
    _dir: TempDir,
    pub path: PathBuf,
}

impl Drop for Server {
    fn drop(&mut self) {
        let _ = self.child.kill();
        let _ = self.child.wait();
    }
}

fn start(dir: &Path, transport: &str, listen: &str) -> Child {
    let config = dir.join("ucased.toml");
    fs::write(
        &config,
        "LogLevel = \"debug\"\nLogTarget = \"console\"\nDaemonize = false\n",
    )
    .unwrap();

    Command::new(env!("CARGO_BIN_EXE_ucased"))
        .arg("--config")
        .arg(&config)
        .arg("--transport")
        .arg(transport)
        .arg("--listen")
        .arg(listen)
        .stdin(Stdio::null())
        .stdout(Stdio::null())
        .stderr(Stdio::null())
        .spawn()
        .unwrap()
}

/// ucased on a scratch unix socket, ready once the socket file exists.
pub fn spawn_server(transport: &str) -> Server {
    let (dir, path) = socket_path("ucased");
    let child = start(dir.path(), transport, path.to_str().unwrap());

    let server = Server {
        child,
        _dir: dir,
        path,
    };
    assert!(
        wait_until(|| server.path.exists(), Duration::from_secs(10)),
        "[{}]: ucased did not bind {}",
        transport,
        server.path.display()
    );
    server
}

/// A loopback port that was free a moment ago.
pub fn free_port(transport: &str) -> u16 {
    let any = (Ipv6Addr::LOCALHOST, 0);
    match transport {
        "stream" => TcpListener::bind(any).unwrap().local_addr().unwrap().port(),
        _ => UdpSocket::bind(any).unwrap().local_addr().unwrap().port(),
    }
}

fn inet6_answers(transport: &str, port: u16) -> bool {
    let server = (Ipv6Addr::LOCALHOST, port);
    if transport == "stream" {
        return TcpStream::connect(server).is_ok();
    }

    let socket = match UdpSocket::bind((Ipv6Addr::LOCALHOST, 0)) {
        Ok(s) => s,
        Err(_) => return false,
    };
    let _ = socket.set_read_timeout(Some(Duration::from_millis(200)));
    let mut buf = [0u8; 8];
    socket.send_to(b"ready", server).is_ok() && socket.recv_from(&mut buf).is_ok()
}

/// ucased on [::1]:port, ready once it answers there. Returns the server
/// and its address in "[::1]:PORT" form.
pub fn spawn_inet6_server(transport: &str) -> (Server, String) {
    let port = free_port(transport);
    let listen = format!("[::1]:{}", port);
    let dir = tempfile::Builder::new().prefix("ucase").tempdir().unwrap();
    let child = start(dir.path(), transport, &listen);

    let server = Server {
        child,
        path: dir.path().join("ucased.toml"),
        _dir: dir,
    };
    assert!(
        wait_until(|| inet6_answers(transport, port), Duration::from_secs(10)),
        "[{}]: ucased does not answer on {}",
        transport,
        listen
    );
    (server, listen)
}

/// Run uctl to completion, feeding input to its stdin.
pub fn uctl(args: &[&str], input: &[u8]) -> Output {
    let mut child = Command::new(env!("CARGO_BIN_EXE_uctl"))
        .args(args)
        .stdin(Stdio::piped())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .spawn()
        .unwrap();

    /* uctl may exit before reading its input */
    let mut stdin = child.stdin.take().unwrap();
    let _ = stdin.write_all(input);
    drop(stdin);

    let output = child.wait_with_output().unwrap();
    println!("[uctl {:?}]: {}", args, output.status);
    output
}
