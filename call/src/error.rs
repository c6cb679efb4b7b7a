// SPDX-License-Identifier: MIT

//! Status for TPM command execution.

use crate::ReturnCode;
use thiserror::Error;

/// Errors surfaced by the library.
///
/// A failing authorized command always closes the sessions it allocated
/// before one of these is returned.
#[derive(Debug, Error)]
pub enum TpmError {
    /// The device write or read failed, or returned truncated data.
    #[error("device i/o: {0}")]
    Io(#[from] std::io::Error),
    /// The response could not be decoded against the expected shape.
    #[error("malformed response: {0}")]
    Malformed(&'static str),
    /// The framed request would exceed the command buffer.
    #[error("command buffer overflow")]
    Boundary,
    /// The device returned a non-zero `TPM_RESULT`.
    #[error("TPM error code {0:#010x}")]
    Tpm(u32),
    /// The response authorization HMAC did not match. Distinct from
    /// [`TpmError::Tpm`] carrying `TPM_AUTHFAIL` from the device.
    #[error("response authorization digest mismatch")]
    AuthFail,
    /// A precondition was violated before any device I/O.
    #[error("{0}")]
    Usage(&'static str),
    /// The host random source failed while drawing a nonce.
    #[error("system randomness unavailable")]
    Rand,
    /// A signature presented to a verification helper did not check out.
    #[error("signature verification failed")]
    Signature,
}

impl TpmError {
    /// The raw `TPM_RESULT` carried by a device error, if any.
    #[must_use]
    pub fn tpm_code(&self) -> Option<u32> {
        match self {
            Self::Tpm(code) => Some(*code),
            _ => None,
        }
    }

    /// Decodes a device error into a known [`ReturnCode`].
    #[must_use]
    pub fn return_code(&self) -> Option<ReturnCode> {
        self.tpm_code().and_then(ReturnCode::from_repr)
    }
}

/// Result alias used throughout the crate.
pub type TpmResult<T> = Result<T, TpmError>;
