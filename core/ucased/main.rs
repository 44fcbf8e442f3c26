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

//! ucased: the uppercase echo server
mod config;

use crate::config::{TransportKind, UcasedConfig};
use basic::daemon::{self, DaemonFlags};
use basic::logger;
use clap::Parser;
use constants::{DGRAM_BUF_SIZE, DGRAM_SOCKET, LOG_FILE_PATH, STREAM_SOCKET};
use std::os::unix::io::AsRawFd;
use std::process::exit;
use ucase::dgram::DgramServer;
use ucase::error::*;
use ucase::stream::StreamServer;
use ucase::transform::to_upper;
use ucase::{transport, Endpoint};

/// parse program arguments
#[derive(Parser, Debug)]
#[clap(author, version, about)]
struct Args {
    /// Configuration file, instead of /etc/ucased/ucased.toml
    #[clap(short, long)]
    config: Option<String>,

    /// Do not detach from the terminal
    #[clap(short, long)]
    foreground: bool,

    /// Transport to serve, overrides Transport of the configuration
    #[clap(short, long, arg_enum)]
    transport: Option<TransportKind>,

    /// Socket path or IPv6 address to listen on, overrides Listen
    #[clap(short, long)]
    listen: Option<String>,
}

/// A configured Listen of "" means the default socket of the transport.
fn listen_endpoint(listen: &str, kind: TransportKind) -> Result<Endpoint> {
    let listen = match (listen, kind) {
        ("", TransportKind::Stream) => STREAM_SOCKET,
        ("", TransportKind::Dgram) => DGRAM_SOCKET,
        (s, _) => s,
    };
    listen.parse()
}

fn run(args: Args) -> Result<()> {
    let config = UcasedConfig::new(args.config.as_deref())?;
    let kind = match args.transport {
        Some(t) => t,
        None => config.transport()?,
    };
    let listen = args.listen.as_deref().unwrap_or(config.Listen.as_str());
    let endpoint = listen_endpoint(listen, kind)?;

    /* detach before any descriptor worth keeping exists */
    if config.Daemonize && !args.foreground {
        daemon::become_daemon(DaemonFlags::default())?;
    }

    logger::init_log(
        "ucased",
        logger::parse_level(&config.LogLevel),
        &config.LogTarget,
        LOG_FILE_PATH,
        config.LogFileSize,
        config.LogFileNumber,
    );
    log::info!(
        "ucased {} serving {:?} on {}",
        env!("CARGO_PKG_VERSION"),
        kind,
        endpoint
    );

    match kind {
        TransportKind::Stream => {
            let listener = transport::bind_stream(&endpoint)?;
            transport::set_buffers(listener.as_raw_fd(), config.ReceiveBuffer, config.SendBuffer)?;
            StreamServer::new(listener, config.BufferSize, to_upper).serve_forever()
        }
        TransportKind::Dgram => {
            let socket = transport::bind_dgram(&endpoint)?;
            transport::set_buffers(socket.as_raw_fd(), config.ReceiveBuffer, config.SendBuffer)?;
            DgramServer::new(socket, DGRAM_BUF_SIZE, to_upper).serve_forever()
        }
    }
}

fn main() {
    let args = Args::parse();

    if let Err(e) = run(args) {
        log::error!("ucased exited: {}", e);
        eprintln!("ucased: {}", e);
        exit(e.get_errno());
    }
}
