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

//! Process and descriptor utilities shared by ucased and uctl.
#[cfg(feature = "daemon")]
pub mod daemon;
pub mod error;
pub use error::*;
#[cfg(feature = "fd")]
pub mod fd_util;
#[cfg(feature = "io")]
pub mod io_util;
#[cfg(feature = "logger")]
pub mod logger;
#[cfg(feature = "socket")]
pub mod socket_util;
