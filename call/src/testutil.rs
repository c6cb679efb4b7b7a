// SPDX-License-Identifier: MIT

//! In-memory stand-in for the TPM character device, shared by unit tests.

use std::io::{Read, Result as IoResult, Write};

/// Captures the request and serves one canned response per `read`.
pub(crate) struct Loopback {
    pub(crate) request: Vec<u8>,
    pub(crate) response: Vec<u8>,
}

impl Loopback {
    pub(crate) fn respond(response: Vec<u8>) -> Self {
        Loopback {
            request: Vec::new(),
            response,
        }
    }
}

impl Write for Loopback {
    fn write(&mut self, buf: &[u8]) -> IoResult<usize> {
        self.request.extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> IoResult<()> {
        Ok(())
    }
}

impl Read for Loopback {
    fn read(&mut self, buf: &mut [u8]) -> IoResult<usize> {
        let count = self.response.len().min(buf.len());
        buf[..count].copy_from_slice(&self.response[..count]);
        Ok(count)
    }
}
