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
//
#![allow(non_snake_case)]

use clap::ArgEnum;
use confique::Config;
use constants::{STREAM_BUF_SIZE, SYSTEM_CONFIG};
use ucase::error::*;

/// which loop the server runs
#[derive(ArgEnum, Clone, Copy, Debug, PartialEq, Eq)]
pub enum TransportKind {
    /// connection-oriented, one peer at a time
    Stream,
    /// one message at a time
    Dgram,
}

#[derive(Config, Debug)]
pub struct UcasedConfig {
    #[config(default = "info")]
    pub LogLevel: String,
    #[config(default = "syslog")]
    pub LogTarget: String,
    #[config(default = 10240)]
    pub LogFileSize: u32,
    #[config(default = 10)]
    pub LogFileNumber: u32,

    #[config(default = true)]
    pub Daemonize: bool,

    #[config(default = "stream")]
    pub Transport: String,
    /// "" is the default socket of the transport
    #[config(default = "")]
    pub Listen: String,
    #[config(default = 500)] // STREAM_BUF_SIZE
    pub BufferSize: usize,
    #[config(default = 0)]
    pub ReceiveBuffer: usize,
    #[config(default = 0)]
    pub SendBuffer: usize,
}

impl UcasedConfig {
    /// Load the configuration from the environment and the file, falling
    /// back to the default values. A missing file is not an error.
    pub fn new(file: Option<&str>) -> Result<UcasedConfig> {
        let builder = UcasedConfig::builder().env();
        let config = builder.file(file.unwrap_or(SYSTEM_CONFIG)).load()?;
        Ok(config)
    }

    ///
    pub fn transport(&self) -> Result<TransportKind> {
        TransportKind::from_str(&self.Transport, true).map_err(|_| Error::Other {
            msg: format!("unknown Transport '{}'", self.Transport),
        })
    }
}

impl Default for UcasedConfig {
    fn default() -> Self {
        Self {
            LogLevel: "info".to_string(),
            LogTarget: "syslog".to_string(),
            LogFileSize: 10240,
            LogFileNumber: 10,
            Daemonize: true,
            Transport: "stream".to_string(),
            Listen: String::new(),
            BufferSize: STREAM_BUF_SIZE,
            ReceiveBuffer: 0,
            SendBuffer: 0,
        }
    }
}
