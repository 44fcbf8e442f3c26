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

mod common;

use basic::socket_util::ipv6_is_supported;
use libtests::socket_path;
use std::time::Duration;
use ucase::client::{self, UnixClient};

#[test]
fn echo_test_stream_pipe() {
    let server = common::spawn_server("stream");
    let path = server.path.to_str().unwrap();

    let output = common::uctl(&["pipe", path], b"hello\na1b2\n");
    assert!(output.status.success());
    assert_eq!(output.stdout, b"HELLO\nA1B2\n");

    /* the server is back to listening for the next peer */
    let output = common::uctl(&["pipe", path], b"again");
    assert!(output.status.success());
    assert_eq!(output.stdout, b"AGAIN");
}

#[test]
fn echo_test_unix_dgram() {
    let server = common::spawn_server("dgram");
    let (_dir, reply) = socket_path("client");
    let client = UnixClient::connect_from(reply, &server.path).unwrap();

    let mut replies = Vec::new();
    client::exchange(
        client.socket(),
        &["hello", "a1b2"],
        64,
        Some(Duration::from_secs(10)),
        |n, r| replies.push(format!("Response {}: {}", n, String::from_utf8_lossy(r))),
    )
    .unwrap();
    assert_eq!(replies, vec!["Response 1: HELLO", "Response 2: A1B2"]);
}

#[test]
fn echo_test_inet6_dgram() {
    if !ipv6_is_supported() {
        println!("IPv6 is not supported, skipped");
        return;
    }
    let (_server, addr) = common::spawn_inet6_server("dgram");

    let output = common::uctl(&["-w", "3", "send", &addr, "hello", "a1b2"], b"");
    assert!(output.status.success(), "{}", String::from_utf8_lossy(&output.stderr));
    assert_eq!(
        String::from_utf8(output.stdout).unwrap(),
        "Response 1: HELLO\nResponse 2: A1B2\n"
    );
}

#[test]
fn echo_test_inet6_stream_pipe() {
    if !ipv6_is_supported() {
        println!("IPv6 is not supported, skipped");
        return;
    }
    let (_server, addr) = common::spawn_inet6_server("stream");

    let output = common::uctl(&["pipe", &addr], b"hello\na1b2\n");
    assert!(output.status.success(), "{}", String::from_utf8_lossy(&output.stderr));
    assert_eq!(output.stdout, b"HELLO\nA1B2\n");

    let output = common::uctl(&["pipe", &addr], b"again");
    assert!(output.status.success());
    assert_eq!(output.stdout, b"AGAIN");
}

#[test]
fn echo_test_pipe_without_server() {
    let (_dir, path) = socket_path("nobody");
    let output = common::uctl(&["pipe", path.to_str().unwrap()], b"hello");
    assert_eq!(output.status.code(), Some(libc::ENOENT));
    assert!(!output.stderr.is_empty());
}

#[test]
fn echo_test_usage() {
    for args in [&[][..], &["--help"][..], &["usend"][..], &["resolve"][..]] {
        let output = common::uctl(args, b"");
        assert_eq!(output.status.code(), Some(0), "{:?}", args);
    }

    let output = common::uctl(&["resolve", "localhost", "8080"], b"");
    assert!(output.status.success());
    let stdout = String::from_utf8(output.stdout).unwrap();
    assert!(stdout.lines().all(|l| l.starts_with("IP: ")));
    assert!(stdout.lines().count() >= 1);
}
