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

//! Common used constants by ucased, uctl and the shared libraries.

/// Stream socket the server listens on when nothing else is configured
pub const STREAM_SOCKET: &str = "/tmp/socket";

/// Datagram socket the server binds when nothing else is configured
pub const DGRAM_SOCKET: &str = "/tmp/ud_ucase";

/// Prefix of the datagram client's own socket, suffixed with its pid
pub const DGRAM_CLIENT_SOCKET_PREFIX: &str = "/tmp/ud_ucase_cl.";

/// Port used by the IPv6 transports
pub const INET6_PORT: u16 = 50002;

/// Chunk size of a stream connection read
pub const STREAM_BUF_SIZE: usize = 500;

/// Largest datagram the server accepts in one receive
pub const DGRAM_BUF_SIZE: usize = 65536;

/// Upper bound of descriptors closed by the daemonizer when
/// the system limit can not be queried
pub const DAEMON_MAX_CLOSE: i32 = 8192;

/// The null device standard descriptors are bound to after daemonizing
pub const NULL_DEVICE: &str = "/dev/null";

/// Size of sun_path, including the terminating NUL
pub const UNIX_PATH_MAX: usize = 108;

/// Maximum length of a textual IPv6 address, including the terminating NUL
pub const INET6_ADDRSTRLEN: usize = 46;

/// Configuration file of ucased
pub const SYSTEM_CONFIG: &str = "/etc/ucased/ucased.toml";

/// Default log file path when LogTarget is configured to "file"
pub const LOG_FILE_PATH: &str = "/var/log/ucased/ucased.log";

