// SPDX-License-Identifier: MIT

//! Framing of commands and parsing of responses.
//!
//! The envelope is agnostic to authorization: trailing auth blocks are part
//! of the body handed in by the caller, and are split back off the response
//! by the caller. The authorization HMAC covers the logical parameters
//! without the auth blocks, so the envelope must not take them apart itself.

use crate::device::transact;
use crate::error::{TpmError, TpmResult};
use crate::structs::{ResponseAuth, RESPONSE_AUTH_SIZE};
use crate::wire::{TpmBuild, TpmParse, TpmWriter};
use crate::{Ordinal, Tag, MAX_COMMAND_SIZE};
use log::debug;
use std::io::{Read, Write};

/// Bytes in a request or response header.
pub(crate) const HEADER_SIZE: usize = 10;

fn response_tag(tag: Tag) -> Tag {
    match tag {
        Tag::RquAuth1Command => Tag::RspAuth1Command,
        Tag::RquAuth2Command => Tag::RspAuth2Command,
        _ => Tag::RspCommand,
    }
}

/// Frames and submits one command, returning the response body that
/// follows the header.
///
/// # Errors
///
/// Returns [`TpmError::Tpm`] for a non-zero return code, [`TpmError::Io`]
/// for short device transfers and [`TpmError::Malformed`] for a response
/// that does not parse.
pub(crate) fn exec<T>(chip: &mut T, tag: Tag, ordinal: Ordinal, body: &[u8]) -> TpmResult<Vec<u8>>
where
    T: Read + Write,
{
    let mut request = [0u8; MAX_COMMAND_SIZE];
    let mut writer = TpmWriter::new(&mut request);
    (tag as u16).build(&mut writer)?;
    0u32.build(&mut writer)?;
    (ordinal as u32).build(&mut writer)?;
    writer.write_bytes(body)?;
    let size = writer.len();
    let Ok(wire_size) = u32::try_from(size) else {
        return Err(TpmError::Boundary);
    };
    request[2..6].copy_from_slice(&wire_size.to_be_bytes());

    debug!("{ordinal:?}: request {size} bytes");
    let response = transact(chip, &request[..size])?;

    if response.len() < HEADER_SIZE {
        return Err(TpmError::Malformed("short response header"));
    }
    let (raw_tag, tail) = u16::parse(&response)?;
    let (declared, tail) = u32::parse(tail)?;
    let (return_code, tail) = u32::parse(tail)?;

    let declared = declared as usize;
    if declared > response.len() {
        return Err(TpmError::Io(std::io::Error::from(
            std::io::ErrorKind::UnexpectedEof,
        )));
    }
    if declared != response.len() || declared < HEADER_SIZE {
        return Err(TpmError::Malformed("response size mismatch"));
    }
    if return_code != 0 {
        debug!("{ordinal:?}: return code {return_code:#010x}");
        return Err(TpmError::Tpm(return_code));
    }
    // Error responses come back untagged for auth; only check on success.
    if Tag::from_repr(raw_tag) != Some(response_tag(tag)) {
        return Err(TpmError::Malformed("unexpected response tag"));
    }
    Ok(tail.to_vec())
}

/// Splits `sessions` trailing [`ResponseAuth`] blocks off a response body.
///
/// The blocks must align exactly to the end of the body.
pub(crate) fn split_auth(body: &[u8], sessions: usize) -> TpmResult<(&[u8], Vec<ResponseAuth>)> {
    let trailer = sessions * RESPONSE_AUTH_SIZE;
    if body.len() < trailer {
        return Err(TpmError::Malformed("response too short for auth trailer"));
    }
    let (params, mut tail) = body.split_at(body.len() - trailer);
    let mut auths = Vec::with_capacity(sessions);
    for _ in 0..sessions {
        let (auth, rest) = ResponseAuth::parse(tail)?;
        auths.push(auth);
        tail = rest;
    }
    Ok((params, auths))
}
