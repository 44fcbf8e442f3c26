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

//! libucase, shared by ucased and uctl
///
/// dependency:
///    [stream  dgram]      [client]
///           ↘  ↓           ↙
///    [transport  transform]
///           ↓
///       [endpoint]
///
pub mod client;
pub mod dgram;
pub mod endpoint;
pub mod error;
pub mod stream;
pub mod transform;
pub mod transport;

pub use endpoint::Endpoint;
pub use error::*;
