// SPDX-License-Identifier: MIT

//! The TPM 1.2 commands exposed by this library.
//!
//! Every function takes the device as `T: Read + Write` and performs one
//! command exchange (plus the session setup and teardown an authorized
//! command needs). Sessions opened here are closed on every exit path.

use crate::auth;
use crate::envelope::{exec, split_auth};
use crate::error::{TpmError, TpmResult};
use crate::session::{self, OiapSession, OsapSession};
use crate::structs::{
    pcr_values, CommandAuth, Key, PcrComposite, PcrInfoLong, PcrInfoShort, PcrSelection, Pubkey,
    StoredData,
};
use crate::verify::tpm_pubkey;
use crate::wire::{parse_all, split, TpmBuild, TpmParse, TpmWriter};
use crate::{
    EntityType, Handle, Ordinal, ResourceType, ReturnCode, Tag, DIGEST_SIZE, KH_OWNER, KH_SRK,
    MAX_COMMAND_SIZE, PCR_COUNT,
};
use rsa::RsaPublicKey;
use std::io::{Read, Write};

/// Reads one PCR.
///
/// # Errors
///
/// Returns [`TpmError::Usage`] for an index above 23 before any device I/O.
pub fn pcr_read<T>(chip: &mut T, pcr: u32) -> TpmResult<[u8; DIGEST_SIZE]>
where
    T: Read + Write,
{
    if pcr >= PCR_COUNT {
        return Err(TpmError::Usage("PCR index out of range"));
    }
    let body = exec(chip, Tag::RquCommand, Ordinal::PcrRead, &pcr.to_be_bytes())?;
    parse_all(&body)
}

/// Extends one PCR and returns its new value.
///
/// # Errors
///
/// Returns [`TpmError::Usage`] for an index above 23 before any device I/O.
pub fn extend<T>(
    chip: &mut T,
    pcr: u32,
    digest: &[u8; DIGEST_SIZE],
) -> TpmResult<[u8; DIGEST_SIZE]>
where
    T: Read + Write,
{
    if pcr >= PCR_COUNT {
        return Err(TpmError::Usage("PCR index out of range"));
    }
    let mut buffer = [0u8; 4 + DIGEST_SIZE];
    let mut writer = TpmWriter::new(&mut buffer);
    pcr.build(&mut writer)?;
    digest.build(&mut writer)?;
    let body = exec(chip, Tag::RquCommand, Ordinal::Extend, &buffer)?;
    parse_all(&body)
}

/// Draws hardware randomness from the TPM.
///
/// The device may return fewer bytes than requested.
pub fn get_random<T>(chip: &mut T, size: u32) -> TpmResult<Vec<u8>>
where
    T: Read + Write,
{
    let body = exec(chip, Tag::RquCommand, Ordinal::GetRandom, &size.to_be_bytes())?;
    parse_all(&body)
}

/// Reads the public part of the Endorsement Key.
///
/// Returns the raw `TPM_PUBKEY` bytes and the response checksum, after
/// checking `SHA1(pubKey || antiReplay)` against it.
///
/// # Errors
///
/// Returns [`TpmError::Malformed`] on a checksum mismatch.
pub fn read_pub_ek<T>(
    chip: &mut T,
    anti_replay: &[u8; DIGEST_SIZE],
) -> TpmResult<(Vec<u8>, [u8; DIGEST_SIZE])>
where
    T: Read + Write,
{
    let body = exec(chip, Tag::RquCommand, Ordinal::ReadPubek, anti_replay)?;
    let (_, tail) = Pubkey::parse(&body)?;
    let pubkey_len = body.len() - tail.len();
    let (checksum, tail) = <[u8; DIGEST_SIZE]>::parse(tail)?;
    if !tail.is_empty() {
        return Err(TpmError::Malformed("trailing bytes after EK checksum"));
    }
    let expected = auth::sha1_parts(&[&body[..pubkey_len], anti_replay]);
    if expected != checksum {
        return Err(TpmError::Malformed("endorsement key checksum mismatch"));
    }
    Ok((body[..pubkey_len].to_vec(), checksum))
}

/// Terminates a TPM-resident resource.
///
/// # Errors
///
/// Propagates the device return code for stale or foreign handles.
pub fn flush_specific<T>(chip: &mut T, handle: Handle, resource: ResourceType) -> TpmResult<()>
where
    T: Read + Write,
{
    session::flush(chip, handle, resource)
}

/// Loads a wrapped key under the SRK and returns its handle.
///
/// # Errors
///
/// Returns [`TpmError::Malformed`] when the blob does not parse, before any
/// device I/O.
pub fn load_key2<T>(chip: &mut T, key_blob: &[u8], srk_auth: &[u8; DIGEST_SIZE]) -> TpmResult<Handle>
where
    T: Read + Write,
{
    let _: Key = parse_all(key_blob)?;
    let mut session = OsapSession::open(chip, EntityType::Srk, KH_SRK, srk_auth)?;
    let result = load_key2_with(chip, &mut session, key_blob);
    finish(chip, &mut session, result)
}

fn load_key2_with<T>(
    chip: &mut T,
    session: &mut OsapSession,
    key_blob: &[u8],
) -> TpmResult<Handle>
where
    T: Read + Write,
{
    let command_auth = session.auth(1, Ordinal::LoadKey2, key_blob)?;
    let (body, auths) = run_auth(
        chip,
        Ordinal::LoadKey2,
        &[KH_SRK],
        key_blob,
        &[command_auth],
    )?;
    // The loaded handle leads the response and stays outside the digest.
    let (handle_bytes, out_params) = split(&body, 4)?;
    session.verify_and_roll(
        Ordinal::LoadKey2,
        out_params,
        &command_auth.nonce_odd,
        &auths[0],
    )?;
    if !out_params.is_empty() {
        return Err(TpmError::Malformed("trailing bytes after key handle"));
    }
    parse_all(handle_bytes)
}

/// Reads the public part of a loaded key as raw `TPM_PUBKEY` bytes.
pub fn get_pub_key<T>(
    chip: &mut T,
    handle: Handle,
    key_auth: &[u8; DIGEST_SIZE],
) -> TpmResult<Vec<u8>>
where
    T: Read + Write,
{
    let mut session = OsapSession::open(chip, EntityType::KeyHandle, handle, key_auth)?;
    let result = get_pub_key_with(chip, &mut session, handle);
    finish(chip, &mut session, result)
}

fn get_pub_key_with<T>(
    chip: &mut T,
    session: &mut OsapSession,
    handle: Handle,
) -> TpmResult<Vec<u8>>
where
    T: Read + Write,
{
    let command_auth = session.auth(1, Ordinal::GetPubKey, &[])?;
    let (body, auths) = run_auth(chip, Ordinal::GetPubKey, &[handle], &[], &[command_auth])?;
    session.verify_and_roll(Ordinal::GetPubKey, &body, &command_auth.nonce_odd, &auths[0])?;
    let _: Pubkey = parse_all(&body)?;
    Ok(body)
}

/// Seals `data` to the current values of `pcrs` at `locality`.
///
/// The sealed blob's own authorization secret is `srk_auth`, transported
/// under the OSAP shared secret as an `EncAuth`. The returned bytes are
/// opaque to everything but the TPM that produced them.
pub fn seal<T>(
    chip: &mut T,
    locality: u8,
    pcrs: &[u32],
    data: &[u8],
    srk_auth: &[u8; DIGEST_SIZE],
) -> TpmResult<Vec<u8>>
where
    T: Read + Write,
{
    let pcr_info = pcr_info_long(chip, locality, pcrs)?;
    let mut session = OsapSession::open(chip, EntityType::Srk, KH_SRK, srk_auth)?;
    let result = seal_with(chip, &mut session, &pcr_info, data, srk_auth);
    finish(chip, &mut session, result)
}

fn seal_with<T>(
    chip: &mut T,
    session: &mut OsapSession,
    pcr_info: &PcrInfoLong,
    data: &[u8],
    blob_auth: &[u8; DIGEST_SIZE],
) -> TpmResult<Vec<u8>>
where
    T: Read + Write,
{
    let enc_auth = auth::enc_auth(session.shared_secret(), &session.nonce_even(), blob_auth);

    // The digest input carries the literal pcrInfoSize and the raw
    // pcrInfoLong bytes, mirroring what the device hashes.
    let mut buffer = [0u8; MAX_COMMAND_SIZE];
    let mut writer = TpmWriter::new(&mut buffer);
    enc_auth.build(&mut writer)?;
    let info_size = u32::try_from(pcr_info.packed_size()).map_err(|_| TpmError::Boundary)?;
    info_size.build(&mut writer)?;
    pcr_info.build(&mut writer)?;
    let data_size = u32::try_from(data.len()).map_err(|_| TpmError::Boundary)?;
    data_size.build(&mut writer)?;
    writer.write_bytes(data)?;
    let len = writer.len();
    let params = &buffer[..len];

    let command_auth = session.auth(1, Ordinal::Seal, params)?;
    let (body, auths) = run_auth(chip, Ordinal::Seal, &[KH_SRK], params, &[command_auth])?;
    session.verify_and_roll(Ordinal::Seal, &body, &command_auth.nonce_odd, &auths[0])?;
    let _: StoredData = parse_all(&body)?;
    Ok(body)
}

/// Releases data sealed by [`seal`], provided the platform still satisfies
/// the bound PCR policy.
///
/// Two sessions authorize the command: an OSAP on the SRK keyed by its
/// shared secret, and an OIAP keyed by the sealed blob's secret directly.
pub fn unseal<T>(chip: &mut T, sealed: &[u8], srk_auth: &[u8; DIGEST_SIZE]) -> TpmResult<Vec<u8>>
where
    T: Read + Write,
{
    let _: StoredData = parse_all(sealed)?;
    let mut parent = OsapSession::open(chip, EntityType::Srk, KH_SRK, srk_auth)?;
    let mut data = match OiapSession::open(chip) {
        Ok(session) => session,
        Err(error) => {
            let _ = parent.close(chip);
            return Err(error);
        }
    };
    let result = unseal_with(chip, &mut parent, &mut data, sealed, srk_auth);
    if let Err(error) = &result {
        if device_ended(error) {
            parent.invalidate();
            data.invalidate();
        }
    }
    let parent_closed = parent.close(chip);
    let data_closed = data.close(chip);
    let value = result?;
    parent_closed?;
    data_closed?;
    Ok(value)
}

fn unseal_with<T>(
    chip: &mut T,
    parent: &mut OsapSession,
    data: &mut OiapSession,
    sealed: &[u8],
    blob_auth: &[u8; DIGEST_SIZE],
) -> TpmResult<Vec<u8>>
where
    T: Read + Write,
{
    let auth1 = parent.auth(1, Ordinal::Unseal, sealed)?;
    let auth2 = data.auth(blob_auth, 1, Ordinal::Unseal, sealed)?;
    let (body, auths) = run_auth(chip, Ordinal::Unseal, &[KH_SRK], sealed, &[auth1, auth2])?;
    parent.verify_and_roll(Ordinal::Unseal, &body, &auth1.nonce_odd, &auths[0])?;
    data.verify_and_roll(blob_auth, Ordinal::Unseal, &body, &auth2.nonce_odd, &auths[1])?;
    parse_all(&body)
}

/// Signs the current values of `pcrs` together with `SHA1(data)` using a
/// loaded AIK.
///
/// Returns the signature and the PCR values the device put into the quoted
/// composite.
pub fn quote<T>(
    chip: &mut T,
    handle: Handle,
    data: &[u8],
    pcrs: &[u32],
    aik_auth: &[u8; DIGEST_SIZE],
) -> TpmResult<(Vec<u8>, Vec<[u8; DIGEST_SIZE]>)>
where
    T: Read + Write,
{
    let selection = PcrSelection::from_pcrs(pcrs)?;
    let mut session = OsapSession::open(chip, EntityType::KeyHandle, handle, aik_auth)?;
    let result = quote_with(chip, &mut session, handle, data, selection);
    finish(chip, &mut session, result)
}

fn quote_with<T>(
    chip: &mut T,
    session: &mut OsapSession,
    handle: Handle,
    data: &[u8],
    selection: PcrSelection,
) -> TpmResult<(Vec<u8>, Vec<[u8; DIGEST_SIZE]>)>
where
    T: Read + Write,
{
    let external = auth::sha1_parts(&[data]);
    let mut buffer = [0u8; 64];
    let mut writer = TpmWriter::new(&mut buffer);
    external.build(&mut writer)?;
    selection.build(&mut writer)?;
    let len = writer.len();
    let params = &buffer[..len];

    let command_auth = session.auth(1, Ordinal::Quote, params)?;
    let (body, auths) = run_auth(chip, Ordinal::Quote, &[handle], params, &[command_auth])?;
    session.verify_and_roll(Ordinal::Quote, &body, &command_auth.nonce_odd, &auths[0])?;

    let (composite, tail) = PcrComposite::parse(&body)?;
    let (signature, tail) = Vec::<u8>::parse(tail)?;
    if !tail.is_empty() {
        return Err(TpmError::Malformed("trailing bytes after quote signature"));
    }
    Ok((signature, pcr_values(&composite.values)?))
}

/// The `TPM_Quote2` flavor: quotes a `TPM_PCR_INFO_SHORT` and optionally
/// the capability version blob.
pub fn quote2<T>(
    chip: &mut T,
    handle: Handle,
    data: &[u8],
    pcrs: &[u32],
    add_version: bool,
    aik_auth: &[u8; DIGEST_SIZE],
) -> TpmResult<(Vec<u8>, PcrInfoShort, Vec<u8>)>
where
    T: Read + Write,
{
    let selection = PcrSelection::from_pcrs(pcrs)?;
    let mut session = OsapSession::open(chip, EntityType::KeyHandle, handle, aik_auth)?;
    let result = quote2_with(chip, &mut session, handle, data, selection, add_version);
    finish(chip, &mut session, result)
}

fn quote2_with<T>(
    chip: &mut T,
    session: &mut OsapSession,
    handle: Handle,
    data: &[u8],
    selection: PcrSelection,
    add_version: bool,
) -> TpmResult<(Vec<u8>, PcrInfoShort, Vec<u8>)>
where
    T: Read + Write,
{
    let external = auth::sha1_parts(&[data]);
    let mut buffer = [0u8; 64];
    let mut writer = TpmWriter::new(&mut buffer);
    external.build(&mut writer)?;
    selection.build(&mut writer)?;
    u8::from(add_version).build(&mut writer)?;
    let len = writer.len();
    let params = &buffer[..len];

    let command_auth = session.auth(1, Ordinal::Quote2, params)?;
    let (body, auths) = run_auth(chip, Ordinal::Quote2, &[handle], params, &[command_auth])?;
    session.verify_and_roll(Ordinal::Quote2, &body, &command_auth.nonce_odd, &auths[0])?;

    let (pcr_data, tail) = PcrInfoShort::parse(&body)?;
    let (version_info, tail) = Vec::<u8>::parse(tail)?;
    let (signature, tail) = Vec::<u8>::parse(tail)?;
    if !tail.is_empty() {
        return Err(TpmError::Malformed("trailing bytes after quote signature"));
    }
    Ok((signature, pcr_data, version_info))
}

/// Mints a fresh Attestation Identity Key under the SRK.
///
/// `privacy_ca` and `label` either both given (their digest binds the AIK
/// to that CA) or both absent (the chosen-identity digest is all zero).
/// Returns the loadable AIK blob and the identity binding signature; the
/// binding is not verified here.
///
/// # Errors
///
/// Returns [`TpmError::Usage`] before any device I/O when exactly one of
/// `privacy_ca` and `label` is given.
pub fn make_identity<T>(
    chip: &mut T,
    srk_auth: &[u8; DIGEST_SIZE],
    owner_auth: &[u8; DIGEST_SIZE],
    aik_auth: &[u8; DIGEST_SIZE],
    privacy_ca: Option<&RsaPublicKey>,
    label: Option<&[u8]>,
) -> TpmResult<(Vec<u8>, Vec<u8>)>
where
    T: Read + Write,
{
    let ca_digest = match (privacy_ca, label) {
        (None, None) => [0u8; DIGEST_SIZE],
        (Some(privacy_ca), Some(label)) => {
            let pubkey = tpm_pubkey(privacy_ca)?;
            let mut buffer = [0u8; MAX_COMMAND_SIZE];
            let mut writer = TpmWriter::new(&mut buffer);
            pubkey.build(&mut writer)?;
            let len = writer.len();
            auth::sha1_parts(&[label, &buffer[..len]])
        }
        _ => {
            return Err(TpmError::Usage(
                "privacy CA key and label must be given together",
            ))
        }
    };

    let mut srk = OsapSession::open(chip, EntityType::Srk, KH_SRK, srk_auth)?;
    let mut owner = match OsapSession::open(chip, EntityType::Owner, KH_OWNER, owner_auth) {
        Ok(session) => session,
        Err(error) => {
            let _ = srk.close(chip);
            return Err(error);
        }
    };
    let result = make_identity_with(chip, &mut srk, &mut owner, aik_auth, &ca_digest);
    if let Err(error) = &result {
        if device_ended(error) {
            srk.invalidate();
            owner.invalidate();
        }
    }
    let srk_closed = srk.close(chip);
    let owner_closed = owner.close(chip);
    let value = result?;
    srk_closed?;
    owner_closed?;
    Ok(value)
}

fn make_identity_with<T>(
    chip: &mut T,
    srk: &mut OsapSession,
    owner: &mut OsapSession,
    aik_auth: &[u8; DIGEST_SIZE],
    ca_digest: &[u8; DIGEST_SIZE],
) -> TpmResult<(Vec<u8>, Vec<u8>)>
where
    T: Read + Write,
{
    // The new identity's secret rides under the owner session per the ADIP
    // rule for owner-authorized identity creation.
    let enc_auth = auth::enc_auth(owner.shared_secret(), &owner.nonce_even(), aik_auth);

    let template = Key::identity_template()?;
    let mut buffer = [0u8; MAX_COMMAND_SIZE];
    let mut writer = TpmWriter::new(&mut buffer);
    enc_auth.build(&mut writer)?;
    ca_digest.build(&mut writer)?;
    template.build(&mut writer)?;
    let len = writer.len();
    let params = &buffer[..len];

    let auth1 = srk.auth(1, Ordinal::MakeIdentity, params)?;
    let auth2 = owner.auth(1, Ordinal::MakeIdentity, params)?;
    let (body, auths) = run_auth(chip, Ordinal::MakeIdentity, &[], params, &[auth1, auth2])?;
    srk.verify_and_roll(Ordinal::MakeIdentity, &body, &auth1.nonce_odd, &auths[0])?;
    owner.verify_and_roll(Ordinal::MakeIdentity, &body, &auth2.nonce_odd, &auths[1])?;

    let (_, tail) = Key::parse(&body)?;
    let key_len = body.len() - tail.len();
    let (binding, tail) = Vec::<u8>::parse(tail)?;
    if !tail.is_empty() {
        return Err(TpmError::Malformed("trailing bytes after identity binding"));
    }
    Ok((body[..key_len].to_vec(), binding))
}

/// Resets the dictionary-attack lockout.
pub fn reset_lock_value<T>(chip: &mut T, owner_auth: &[u8; DIGEST_SIZE]) -> TpmResult<()>
where
    T: Read + Write,
{
    let mut session = OsapSession::open(chip, EntityType::Owner, KH_OWNER, owner_auth)?;
    let result = reset_lock_value_with(chip, &mut session);
    finish(chip, &mut session, result)
}

fn reset_lock_value_with<T>(chip: &mut T, session: &mut OsapSession) -> TpmResult<()>
where
    T: Read + Write,
{
    let command_auth = session.auth(1, Ordinal::ResetLockValue, &[])?;
    let (body, auths) = run_auth(chip, Ordinal::ResetLockValue, &[], &[], &[command_auth])?;
    session.verify_and_roll(
        Ordinal::ResetLockValue,
        &body,
        &command_auth.nonce_odd,
        &auths[0],
    )?;
    if !body.is_empty() {
        return Err(TpmError::Malformed("unexpected reset response body"));
    }
    Ok(())
}

/// Builds the `TPM_PCR_INFO_LONG` binding `pcrs` at their current values.
fn pcr_info_long<T>(chip: &mut T, locality: u8, pcrs: &[u32]) -> TpmResult<PcrInfoLong>
where
    T: Read + Write,
{
    let selection = PcrSelection::from_pcrs(pcrs)?;
    let mut values = Vec::with_capacity(pcrs.len());
    for pcr in selection.pcrs() {
        values.push(pcr_read(chip, pcr)?);
    }
    let digest = PcrComposite::new(selection, &values).digest()?;
    Ok(PcrInfoLong {
        locality_at_creation: locality,
        locality_at_release: locality,
        creation_selection: selection,
        release_selection: selection,
        digest_at_creation: digest,
        digest_at_release: digest,
    })
}

/// Frames, submits and splits one authorized command exchange.
fn run_auth<T>(
    chip: &mut T,
    ordinal: Ordinal,
    handles: &[Handle],
    params: &[u8],
    auths: &[CommandAuth],
) -> TpmResult<(Vec<u8>, Vec<crate::structs::ResponseAuth>)>
where
    T: Read + Write,
{
    let tag = if auths.len() == 2 {
        Tag::RquAuth2Command
    } else {
        Tag::RquAuth1Command
    };
    let mut buffer = [0u8; MAX_COMMAND_SIZE];
    let mut writer = TpmWriter::new(&mut buffer);
    for handle in handles {
        handle.build(&mut writer)?;
    }
    writer.write_bytes(params)?;
    for command_auth in auths {
        command_auth.build(&mut writer)?;
    }
    let len = writer.len();
    let body = exec(chip, tag, ordinal, &buffer[..len])?;
    let (out_params, response_auths) = split_auth(&body, auths.len())?;
    Ok((out_params.to_vec(), response_auths))
}

/// True when the device reported an authorization failure, which also
/// terminated the sessions carried by the command.
fn device_ended(error: &TpmError) -> bool {
    matches!(
        error.return_code(),
        Some(ReturnCode::AuthFail | ReturnCode::Auth2Fail)
    )
}

/// Closes the session and folds a close failure into the result, with the
/// operation's own error taking precedence.
fn finish<T, R>(chip: &mut T, session: &mut OsapSession, result: TpmResult<R>) -> TpmResult<R>
where
    T: Read + Write,
{
    if let Err(error) = &result {
        if device_ended(error) {
            session.invalidate();
        }
    }
    let closed = session.close(chip);
    let value = result?;
    closed?;
    Ok(value)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testutil::Loopback;

    #[test]
    fn pcr_index_is_checked_before_io() {
        let mut chip = Loopback::respond(Vec::new());
        assert!(matches!(
            pcr_read(&mut chip, 24),
            Err(TpmError::Usage(_))
        ));
        assert!(matches!(
            extend(&mut chip, 31, &[0; DIGEST_SIZE]),
            Err(TpmError::Usage(_))
        ));
        assert!(chip.request.is_empty());
    }

    #[test]
    fn half_specified_privacy_ca_is_usage() {
        let mut chip = Loopback::respond(Vec::new());
        let zero = [0u8; DIGEST_SIZE];
        assert!(matches!(
            make_identity(&mut chip, &zero, &zero, &zero, None, Some(b"label".as_slice())),
            Err(TpmError::Usage(_))
        ));
        assert!(chip.request.is_empty());
    }

    #[test]
    fn garbage_key_blob_is_rejected_before_io() {
        let mut chip = Loopback::respond(Vec::new());
        let zero = [0u8; DIGEST_SIZE];
        assert!(matches!(
            load_key2(&mut chip, &[1, 2, 3], &zero),
            Err(TpmError::Malformed(_))
        ));
        assert!(chip.request.is_empty());
    }

    #[test]
    fn garbage_sealed_blob_is_rejected_before_io() {
        let mut chip = Loopback::respond(Vec::new());
        let zero = [0u8; DIGEST_SIZE];
        assert!(matches!(
            unseal(&mut chip, &[0xFF; 5], &zero),
            Err(TpmError::Malformed(_))
        ));
        assert!(chip.request.is_empty());
    }
}
