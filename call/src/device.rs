// SPDX-License-Identifier: MIT

//! The `/dev/tpm0` character-device channel.
//!
//! One request is written in a single operation and one response is read
//! back; the channel never splits or merges commands, and there are no
//! retries. TPM commands are not idempotent.

use crate::error::TpmResult;
use crate::MAX_COMMAND_SIZE;
use log::debug;
use std::{
    fs::{self, File, OpenOptions},
    io::{Error as IoError, ErrorKind, Read, Result as IoResult, Write},
    os::unix::fs::FileTypeExt,
    path::Path,
};

/// An open TPM character device.
///
/// The device is a strictly serial resource; callers needing concurrency
/// must serialize access to it externally. The handle closes on drop.
pub struct Device(File);

impl Device {
    /// Opens a TPM character device, `/dev/tpm0` by default.
    ///
    /// # Errors
    ///
    /// Returns an I/O error when `path` does not exist, is not a character
    /// device, or cannot be opened read-write.
    pub fn open(path: &str) -> IoResult<Device> {
        let path = Path::new(path);
        if !path.exists() {
            return Err(IoError::from(ErrorKind::InvalidInput));
        }
        let Ok(metadata) = fs::metadata(path) else {
            return Err(IoError::from(ErrorKind::InvalidInput));
        };
        if !metadata.file_type().is_char_device() {
            return Err(IoError::from(ErrorKind::InvalidInput));
        }
        let Ok(path) = fs::canonicalize(path) else {
            return Err(IoError::from(ErrorKind::InvalidInput));
        };
        debug!("opening {}", path.display());
        Ok(Device(
            OpenOptions::new().read(true).write(true).open(path)?,
        ))
    }
}

impl Read for Device {
    fn read(&mut self, buf: &mut [u8]) -> IoResult<usize> {
        self.0.read(buf)
    }
}

impl Write for Device {
    fn write(&mut self, buf: &[u8]) -> IoResult<usize> {
        self.0.write(buf)
    }

    fn flush(&mut self) -> IoResult<()> {
        self.0.flush()
    }
}

/// Writes one framed request and reads back one framed response.
///
/// # Errors
///
/// Returns [`crate::TpmError::Io`] when the write is short or the read
/// fails.
pub fn transact<T>(chip: &mut T, request: &[u8]) -> TpmResult<Vec<u8>>
where
    T: Read + Write,
{
    chip.write_all(request)?;
    let mut response = vec![0u8; MAX_COMMAND_SIZE];
    let count = chip.read(&mut response)?;
    response.truncate(count);
    Ok(response)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn open_rejects_regular_files() {
        let file = tempfile::NamedTempFile::new().unwrap();
        assert!(Device::open(file.path().to_str().unwrap()).is_err());
    }

    #[test]
    fn open_rejects_missing_paths() {
        assert!(Device::open("/nonexistent/tpm0").is_err());
    }
}
