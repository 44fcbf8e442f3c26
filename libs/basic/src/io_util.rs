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

//! io functions
use crate::error::*;
use std::io::{ErrorKind, Read, Write};

/// Read once into buf, restarting the call when it was interrupted.
///
/// Returns 0 on end of stream.
pub fn read_chunk(reader: &mut impl Read, buf: &mut [u8]) -> Result<usize> {
    loop {
        match reader.read(buf) {
            Ok(n) => return Ok(n),
            Err(e) if e.kind() == ErrorKind::Interrupted => continue,
            Err(e) => return Err(Error::Io { source: e }),
        }
    }
}

/// Read data from reader to buf until buf is full or the stream ends,
/// and return the number of bytes read.
pub fn loop_read(reader: &mut impl Read, buf: &mut [u8]) -> Result<usize> {
    let size = buf.len();
    let mut pos = 0;
    while pos < size {
        let read_size = read_chunk(reader, &mut buf[pos..])?;

        pos += read_size;
        if read_size == 0 {
            return Ok(pos);
        }
    }
    Ok(pos)
}

/// Write the whole buf, retrying partial and interrupted writes.
///
/// A writer that accepts zero bytes is reported as EPIPE.
pub fn loop_write(writer: &mut impl Write, buf: &[u8]) -> Result<()> {
    let mut pos = 0;
    while pos < buf.len() {
        match writer.write(&buf[pos..]) {
            Ok(0) => {
                return Err(Error::Nix {
                    source: nix::errno::Errno::EPIPE,
                })
            }
            Ok(n) => pos += n,
            Err(e) if e.kind() == ErrorKind::Interrupted => continue,
            Err(e) => return Err(Error::Io { source: e }),
        }
    }
    Ok(())
}
