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

//! uctl: talks to ucased over each of its transports

use basic::logger;
use clap::{ErrorKind, Parser};
use constants::{DGRAM_BUF_SIZE, DGRAM_SOCKET, INET6_PORT, STREAM_BUF_SIZE, STREAM_SOCKET};
use log::LevelFilter;
use std::io::{self, Write};
use std::process::exit;
use std::time::Duration;
use ucase::client::{self, UnixClient};
use ucase::error::*;
use ucase::Endpoint;

/// parse program arguments
#[derive(Parser, Debug)]
#[clap(author, version, about, long_about = None)]
#[clap(arg_required_else_help = true)]
struct Args {
    #[clap(subcommand)]
    subcmd: SubCmd,

    /// Seconds to wait for a datagram reply, 0 waits forever
    #[clap(short, long, default_value_t = 10, global = true)]
    wait: u64,

    /// Log debug messages to the console
    #[clap(short, long, global = true)]
    verbose: bool,
}

#[derive(Parser, Debug)]
enum SubCmd {
    /// `[dgram]` Send messages to an IPv6 datagram server
    #[clap(display_order = 1)]
    Send {
        /// IPv6 address of the server, [ADDR]:PORT picks another port
        #[clap(value_name = "HOST-ADDRESS")]
        host: String,
        #[clap(required = true, value_name = "MSG")]
        msgs: Vec<String>,
    },

    /// `[dgram]` Send messages to the unix datagram server
    #[clap(display_order = 2)]
    Usend {
        #[clap(required = true, value_name = "MSG")]
        msgs: Vec<String>,
    },

    /// `[stream]` Copy stdin through a stream server to stdout
    #[clap(display_order = 3)]
    Pipe {
        /// Socket path or IPv6 address of the server
        #[clap(default_value = STREAM_SOCKET)]
        endpoint: String,
    },

    /// `[name]` Print the addresses a host name resolves to
    #[clap(display_order = 4)]
    Resolve {
        host: String,
        /// Port number
        service: Option<String>,
    },
}

fn print_reply(n: usize, reply: &[u8]) {
    println!("Response {}: {}", n, String::from_utf8_lossy(reply));
}

fn run(args: Args) -> Result<()> {
    let timeout = match args.wait {
        0 => None,
        s => Some(Duration::from_secs(s)),
    };

    match args.subcmd {
        SubCmd::Send { host, msgs } => {
            let endpoint = Endpoint::inet6(&host, INET6_PORT)?;
            let socket = client::udp6_connect(&endpoint)?;
            client::exchange(&socket, msgs.as_slice(), DGRAM_BUF_SIZE, timeout, print_reply)
        }
        SubCmd::Usend { msgs } => {
            let client = UnixClient::connect(DGRAM_SOCKET)?;
            client::exchange(client.socket(), msgs.as_slice(), DGRAM_BUF_SIZE, timeout, print_reply)
        }
        SubCmd::Pipe { endpoint } => {
            let endpoint: Endpoint = endpoint.parse()?;
            let mut conn = client::stream_connect(&endpoint)?;
            let stdin = io::stdin();
            let stdout = io::stdout();
            let n = client::pipe(&mut conn, &mut stdin.lock(), &mut stdout.lock(), STREAM_BUF_SIZE)?;
            log::debug!("{} bytes piped through {}", n, endpoint);
            Ok(())
        }
        SubCmd::Resolve { host, service } => {
            let ips = client::resolve(&host, service.as_deref())?;
            let stdout = io::stdout();
            let mut out = stdout.lock();
            for ip in ips {
                writeln!(out, "IP: {}", ip)?;
            }
            Ok(())
        }
    }
}

fn main() {
    let args = match Args::try_parse() {
        Ok(args) => args,
        Err(e) => match e.kind() {
            ErrorKind::DisplayHelp
            | ErrorKind::DisplayVersion
            | ErrorKind::DisplayHelpOnMissingArgumentOrSubcommand
            | ErrorKind::MissingRequiredArgument
            | ErrorKind::MissingSubcommand => {
                let _ = e.print();
                exit(0);
            }
            _ => e.exit(),
        },
    };

    let level = if args.verbose {
        LevelFilter::Debug
    } else {
        LevelFilter::Warn
    };
    logger::init_log_to_console("uctl", level);

    if let Err(e) = run(args) {
        eprintln!("uctl: {}", e);
        exit(match e.get_errno() {
            0 => 1,
            errno => errno,
        });
    }
}
