// SPDX-License-Identifier: MIT

//! OIAP and OSAP authorization sessions.
//!
//! A session is owned by the operation that opened it and is closed on
//! every exit path, either explicitly through `TPM_FlushSpecific` or
//! implicitly when the device terminates it. The host-side copy of an OSAP
//! shared secret is zeroized when the session goes away.

use crate::auth::{self, osap_shared_secret, random_nonce};
use crate::envelope::exec;
use crate::error::{TpmError, TpmResult};
use crate::structs::{CommandAuth, ResponseAuth};
use crate::wire::{TpmBuild, TpmParse, TpmWriter};
use crate::{EntityType, Handle, Ordinal, ResourceType, Tag, DIGEST_SIZE};
use log::debug;
use std::io::{Read, Write};
use zeroize::{Zeroize, ZeroizeOnDrop};

#[derive(Zeroize, ZeroizeOnDrop)]
struct SharedSecret([u8; DIGEST_SIZE]);

/// Terminates a TPM resource through `TPM_FlushSpecific`.
pub(crate) fn flush<T>(chip: &mut T, handle: Handle, resource: ResourceType) -> TpmResult<()>
where
    T: Read + Write,
{
    let mut buffer = [0u8; 8];
    let mut writer = TpmWriter::new(&mut buffer);
    handle.build(&mut writer)?;
    (resource as u32).build(&mut writer)?;
    exec(chip, Tag::RquCommand, Ordinal::FlushSpecific, &buffer)?;
    Ok(())
}

/// An Object-Independent Authorization Protocol session.
///
/// OIAP has no shared secret: the entity's own authorization secret keys
/// the HMACs and is supplied per command.
pub(crate) struct OiapSession {
    handle: Handle,
    nonce_even: [u8; DIGEST_SIZE],
    open: bool,
}

impl OiapSession {
    pub(crate) fn open<T>(chip: &mut T) -> TpmResult<Self>
    where
        T: Read + Write,
    {
        let body = exec(chip, Tag::RquCommand, Ordinal::Oiap, &[])?;
        let (handle, tail) = u32::parse(&body)?;
        let (nonce_even, tail) = <[u8; DIGEST_SIZE]>::parse(tail)?;
        if !tail.is_empty() {
            return Err(TpmError::Malformed("trailing bytes after OIAP response"));
        }
        debug!("OIAP session {handle:#010x}");
        Ok(OiapSession {
            handle,
            nonce_even,
            open: true,
        })
    }

    pub(crate) fn auth(
        &self,
        key: &[u8; DIGEST_SIZE],
        continue_session: u8,
        ordinal: Ordinal,
        params: &[u8],
    ) -> TpmResult<CommandAuth> {
        if !self.open {
            return Err(TpmError::Usage("authorization session already closed"));
        }
        auth::command_auth(
            key,
            self.handle,
            &self.nonce_even,
            continue_session,
            ordinal,
            params,
        )
    }

    /// Verifies a response block and adopts its even nonce.
    pub(crate) fn verify_and_roll(
        &mut self,
        key: &[u8; DIGEST_SIZE],
        ordinal: Ordinal,
        params: &[u8],
        nonce_odd: &[u8; DIGEST_SIZE],
        response_auth: &ResponseAuth,
    ) -> TpmResult<()> {
        auth::verify_response_auth(key, ordinal, params, nonce_odd, response_auth)?;
        self.nonce_even = response_auth.nonce_even;
        if response_auth.continue_session == 0 {
            self.open = false;
        }
        Ok(())
    }

    /// Forgets the session after the device already terminated it.
    pub(crate) fn invalidate(&mut self) {
        self.open = false;
    }

    pub(crate) fn close<T>(&mut self, chip: &mut T) -> TpmResult<()>
    where
        T: Read + Write,
    {
        if !self.open {
            return Ok(());
        }
        self.open = false;
        flush(chip, self.handle, ResourceType::Auth)
    }
}

/// An Object-Specific Authorization Protocol session, bound to one entity.
pub(crate) struct OsapSession {
    handle: Handle,
    nonce_even: [u8; DIGEST_SIZE],
    shared_secret: SharedSecret,
    open: bool,
}

impl OsapSession {
    pub(crate) fn open<T>(
        chip: &mut T,
        entity_type: EntityType,
        entity_value: Handle,
        entity_auth: &[u8; DIGEST_SIZE],
    ) -> TpmResult<Self>
    where
        T: Read + Write,
    {
        let nonce_odd_osap = random_nonce()?;
        let mut buffer = [0u8; 2 + 4 + DIGEST_SIZE];
        let mut writer = TpmWriter::new(&mut buffer);
        (entity_type as u16).build(&mut writer)?;
        entity_value.build(&mut writer)?;
        nonce_odd_osap.build(&mut writer)?;

        let body = exec(chip, Tag::RquCommand, Ordinal::Osap, &buffer)?;
        let (handle, tail) = u32::parse(&body)?;
        let (nonce_even, tail) = <[u8; DIGEST_SIZE]>::parse(tail)?;
        let (nonce_even_osap, tail) = <[u8; DIGEST_SIZE]>::parse(tail)?;
        if !tail.is_empty() {
            return Err(TpmError::Malformed("trailing bytes after OSAP response"));
        }
        debug!("OSAP session {handle:#010x} on {entity_value:#010x}");
        Ok(OsapSession {
            handle,
            nonce_even,
            shared_secret: SharedSecret(osap_shared_secret(
                entity_auth,
                &nonce_even_osap,
                &nonce_odd_osap,
            )),
            open: true,
        })
    }

    pub(crate) fn nonce_even(&self) -> [u8; DIGEST_SIZE] {
        self.nonce_even
    }

    pub(crate) fn shared_secret(&self) -> &[u8; DIGEST_SIZE] {
        &self.shared_secret.0
    }

    pub(crate) fn auth(
        &self,
        continue_session: u8,
        ordinal: Ordinal,
        params: &[u8],
    ) -> TpmResult<CommandAuth> {
        if !self.open {
            return Err(TpmError::Usage("authorization session already closed"));
        }
        auth::command_auth(
            &self.shared_secret.0,
            self.handle,
            &self.nonce_even,
            continue_session,
            ordinal,
            params,
        )
    }

    /// Verifies a response block and adopts its even nonce.
    pub(crate) fn verify_and_roll(
        &mut self,
        ordinal: Ordinal,
        params: &[u8],
        nonce_odd: &[u8; DIGEST_SIZE],
        response_auth: &ResponseAuth,
    ) -> TpmResult<()> {
        auth::verify_response_auth(
            &self.shared_secret.0,
            ordinal,
            params,
            nonce_odd,
            response_auth,
        )?;
        self.nonce_even = response_auth.nonce_even;
        if response_auth.continue_session == 0 {
            self.open = false;
        }
        Ok(())
    }

    /// Forgets the session after the device already terminated it.
    pub(crate) fn invalidate(&mut self) {
        self.open = false;
    }

    pub(crate) fn close<T>(&mut self, chip: &mut T) -> TpmResult<()>
    where
        T: Read + Write,
    {
        let result = if self.open {
            self.open = false;
            flush(chip, self.handle, ResourceType::Auth)
        } else {
            Ok(())
        };
        self.shared_secret.zeroize();
        result
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testutil::Loopback;

    fn frame(tag: u16, body: &[u8]) -> Vec<u8> {
        let mut out = Vec::new();
        out.extend_from_slice(&tag.to_be_bytes());
        out.extend_from_slice(&u32::try_from(10 + body.len()).unwrap().to_be_bytes());
        out.extend_from_slice(&0u32.to_be_bytes());
        out.extend_from_slice(body);
        out
    }

    #[test]
    fn oiap_open_parses_handle_and_nonce() {
        let mut body = 0x0200_0007u32.to_be_bytes().to_vec();
        body.extend_from_slice(&[0x42; DIGEST_SIZE]);
        let mut chip = Loopback::respond(frame(0x00C4, &body));

        let session = OiapSession::open(&mut chip).unwrap();
        assert_eq!(session.handle, 0x0200_0007);
        assert_eq!(session.nonce_even, [0x42; DIGEST_SIZE]);
        // OIAP carries no body.
        assert_eq!(chip.request, vec![0, 0xC1, 0, 0, 0, 10, 0, 0, 0, 0x0A]);
    }

    #[test]
    fn osap_open_derives_shared_secret() {
        let entity_auth = [0u8; DIGEST_SIZE];
        let nonce_even_osap = [0x33; DIGEST_SIZE];
        let mut body = 0x0200_0009u32.to_be_bytes().to_vec();
        body.extend_from_slice(&[0x11; DIGEST_SIZE]);
        body.extend_from_slice(&nonce_even_osap);
        let mut chip = Loopback::respond(frame(0x00C4, &body));

        let session =
            OsapSession::open(&mut chip, EntityType::Srk, crate::KH_SRK, &entity_auth).unwrap();

        // The odd OSAP nonce went over the wire after the entity fields.
        let nonce_odd_osap: [u8; DIGEST_SIZE] =
            chip.request[16..36].try_into().unwrap();
        assert_eq!(&chip.request[10..12], &[0x00, 0x04]);
        assert_eq!(&chip.request[12..16], &crate::KH_SRK.to_be_bytes());
        assert_eq!(
            session.shared_secret(),
            &osap_shared_secret(&entity_auth, &nonce_even_osap, &nonce_odd_osap)
        );
        assert_eq!(session.nonce_even(), [0x11; DIGEST_SIZE]);
    }

    fn canned_osap(chip: &mut Loopback) -> OsapSession {
        let mut body = 0x0200_0001u32.to_be_bytes().to_vec();
        body.extend_from_slice(&[0x11; DIGEST_SIZE]);
        body.extend_from_slice(&[0x22; DIGEST_SIZE]);
        chip.response = frame(0x00C4, &body);
        OsapSession::open(chip, EntityType::Srk, crate::KH_SRK, &[0u8; DIGEST_SIZE]).unwrap()
    }

    #[test]
    fn roll_adopts_even_nonce_and_honors_continue_flag() {
        let mut chip = Loopback::respond(Vec::new());
        let mut session = canned_osap(&mut chip);

        let digest = crate::auth::response_digest(0, Ordinal::Seal, &[]);
        let nonce_even = [0x77; DIGEST_SIZE];
        let auth = crate::auth::hmac_sha1(
            session.shared_secret(),
            &[&digest, &nonce_even, &[0x01; DIGEST_SIZE], &[0]],
        );
        let response_auth = ResponseAuth {
            nonce_even,
            continue_session: 0,
            auth,
        };
        session
            .verify_and_roll(Ordinal::Seal, &[], &[0x01; DIGEST_SIZE], &response_auth)
            .unwrap();
        assert_eq!(session.nonce_even(), nonce_even);
        // continueSession of zero terminated the session on the device.
        assert!(matches!(
            session.auth(1, Ordinal::Seal, &[]),
            Err(TpmError::Usage(_))
        ));
        chip.request.clear();
        session.close(&mut chip).unwrap();
        assert!(chip.request.is_empty());
    }

    #[test]
    fn close_issues_flush_specific() {
        let mut chip = Loopback::respond(Vec::new());
        let mut session = canned_osap(&mut chip);
        chip.request.clear();
        chip.response = frame(0x00C4, &[]);

        session.close(&mut chip).unwrap();
        let mut expected = vec![0, 0xC1, 0, 0, 0, 18, 0, 0, 0, 0xBA];
        expected.extend_from_slice(&0x0200_0001u32.to_be_bytes());
        expected.extend_from_slice(&(ResourceType::Auth as u32).to_be_bytes());
        assert_eq!(chip.request, expected);

        // Double close stays quiet.
        chip.request.clear();
        session.close(&mut chip).unwrap();
        assert!(chip.request.is_empty());
    }

    #[test]
    fn invalidate_skips_the_flush() {
        let mut chip = Loopback::respond(Vec::new());
        let mut session = canned_osap(&mut chip);
        chip.request.clear();

        session.invalidate();
        session.close(&mut chip).unwrap();
        assert!(chip.request.is_empty());
    }
}
