// SPDX-License-Identifier: MIT

//! Authorization HMACs and the `EncAuth` mask.
//!
//! The request HMAC covers `SHA1(ordinal || params)` together with the
//! rolling nonces and the continue flag; the response HMAC covers
//! `SHA1(returnCode || ordinal || params)` the same way. Handles are never
//! part of either digest.

use crate::error::{TpmError, TpmResult};
use crate::structs::{CommandAuth, ResponseAuth};
use crate::{Handle, Ordinal, DIGEST_SIZE};
use hmac::{Hmac, Mac};
use sha1::{Digest, Sha1};
use subtle::ConstantTimeEq;
use zeroize::Zeroize;

type HmacSha1 = Hmac<Sha1>;

/// Draws a fresh 20-byte nonce from the operating system.
///
/// The TPM itself is never used as the source here.
///
/// # Errors
///
/// Returns [`TpmError::Rand`] when the OS random source fails.
pub(crate) fn random_nonce() -> TpmResult<[u8; DIGEST_SIZE]> {
    let mut nonce = [0u8; DIGEST_SIZE];
    getrandom::getrandom(&mut nonce).map_err(|_| TpmError::Rand)?;
    Ok(nonce)
}

pub(crate) fn sha1_parts(parts: &[&[u8]]) -> [u8; DIGEST_SIZE] {
    let mut hasher = Sha1::new();
    for part in parts {
        hasher.update(part);
    }
    hasher.finalize().into()
}

pub(crate) fn hmac_sha1(key: &[u8], parts: &[&[u8]]) -> [u8; DIGEST_SIZE] {
    let mut mac = HmacSha1::new_from_slice(key).expect("HMAC accepts any key length");
    for part in parts {
        mac.update(part);
    }
    mac.finalize().into_bytes().into()
}

/// `SHA1(ordinal || params)`, the `1H` input of a request HMAC.
pub(crate) fn command_digest(ordinal: Ordinal, params: &[u8]) -> [u8; DIGEST_SIZE] {
    sha1_parts(&[&(ordinal as u32).to_be_bytes(), params])
}

/// `SHA1(returnCode || ordinal || params)`, the `1H` input of a response
/// HMAC.
pub(crate) fn response_digest(
    return_code: u32,
    ordinal: Ordinal,
    params: &[u8],
) -> [u8; DIGEST_SIZE] {
    sha1_parts(&[
        &return_code.to_be_bytes(),
        &(ordinal as u32).to_be_bytes(),
        params,
    ])
}

/// Computes the trailing authorization block for one session of a request.
///
/// # Errors
///
/// Returns [`TpmError::Rand`] when no odd nonce can be drawn.
pub(crate) fn command_auth(
    key: &[u8; DIGEST_SIZE],
    auth_handle: Handle,
    nonce_even: &[u8; DIGEST_SIZE],
    continue_session: u8,
    ordinal: Ordinal,
    params: &[u8],
) -> TpmResult<CommandAuth> {
    let digest = command_digest(ordinal, params);
    let nonce_odd = random_nonce()?;
    let auth = hmac_sha1(
        key,
        &[&digest, nonce_even, &nonce_odd, &[continue_session]],
    );
    Ok(CommandAuth {
        auth_handle,
        nonce_odd,
        continue_session,
        auth,
    })
}

/// Verifies one trailing authorization block of a successful response.
///
/// The comparison is constant-time and the mismatching bytes are not
/// reported.
///
/// # Errors
///
/// Returns [`TpmError::AuthFail`] on mismatch.
pub(crate) fn verify_response_auth(
    key: &[u8; DIGEST_SIZE],
    ordinal: Ordinal,
    params: &[u8],
    nonce_odd: &[u8; DIGEST_SIZE],
    response_auth: &ResponseAuth,
) -> TpmResult<()> {
    let digest = response_digest(0, ordinal, params);
    let mut expected = hmac_sha1(
        key,
        &[
            &digest,
            &response_auth.nonce_even,
            nonce_odd,
            &[response_auth.continue_session],
        ],
    );
    let matches: bool = expected[..].ct_eq(&response_auth.auth[..]).into();
    expected.zeroize();
    if matches {
        Ok(())
    } else {
        Err(TpmError::AuthFail)
    }
}

/// Derives the OSAP shared secret:
/// `HMAC(entityAuth, nonceEvenOSAP || nonceOddOSAP)`.
pub(crate) fn osap_shared_secret(
    entity_auth: &[u8; DIGEST_SIZE],
    nonce_even_osap: &[u8; DIGEST_SIZE],
    nonce_odd_osap: &[u8; DIGEST_SIZE],
) -> [u8; DIGEST_SIZE] {
    hmac_sha1(entity_auth, &[nonce_even_osap, nonce_odd_osap])
}

/// Obfuscates a new authorization secret for transport:
/// `newAuth XOR SHA1(sharedSecret || nonceEven)`.
pub(crate) fn enc_auth(
    shared_secret: &[u8; DIGEST_SIZE],
    nonce_even: &[u8; DIGEST_SIZE],
    new_auth: &[u8; DIGEST_SIZE],
) -> [u8; DIGEST_SIZE] {
    let mut mask = sha1_parts(&[shared_secret, nonce_even]);
    let mut out = [0u8; DIGEST_SIZE];
    for (index, byte) in out.iter_mut().enumerate() {
        *byte = new_auth[index] ^ mask[index];
    }
    mask.zeroize();
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn hmac_sha1_matches_rfc2202_vector() {
        let digest = hmac_sha1(&[0x0B; 20], &[b"Hi There"]);
        assert_eq!(
            hex::encode(digest),
            "b617318655057264e28bc0b6fb378c8ef146be00"
        );
    }

    #[test]
    fn split_updates_equal_one_shot_hash() {
        let joined = sha1_parts(&[b"abc", b"def"]);
        let whole = sha1_parts(&[b"abcdef"]);
        assert_eq!(joined, whole);
    }

    #[test]
    fn command_auth_matches_manual_formula() {
        let key = [7u8; DIGEST_SIZE];
        let nonce_even = [9u8; DIGEST_SIZE];
        let params = [0xAB; 13];
        let auth = command_auth(&key, 2, &nonce_even, 1, Ordinal::Seal, &params).unwrap();

        let mut digest_input = Vec::new();
        digest_input.extend_from_slice(&(Ordinal::Seal as u32).to_be_bytes());
        digest_input.extend_from_slice(&params);
        let digest = sha1_parts(&[&digest_input]);
        let expected = hmac_sha1(
            &key,
            &[&digest, &nonce_even, &auth.nonce_odd, &[auth.continue_session]],
        );
        assert_eq!(auth.auth, expected);
        assert_eq!(auth.auth_handle, 2);
        assert_eq!(auth.continue_session, 1);
    }

    #[test]
    fn fresh_nonce_per_command() {
        let key = [7u8; DIGEST_SIZE];
        let nonce_even = [9u8; DIGEST_SIZE];
        let first = command_auth(&key, 2, &nonce_even, 1, Ordinal::Seal, &[]).unwrap();
        let second = command_auth(&key, 2, &nonce_even, 1, Ordinal::Seal, &[]).unwrap();
        assert_ne!(first.nonce_odd, second.nonce_odd);
    }

    fn sample_response(key: &[u8; DIGEST_SIZE], params: &[u8]) -> ([u8; DIGEST_SIZE], ResponseAuth) {
        let nonce_odd = [3u8; DIGEST_SIZE];
        let nonce_even = [4u8; DIGEST_SIZE];
        let digest = response_digest(0, Ordinal::Unseal, params);
        let auth = hmac_sha1(key, &[&digest, &nonce_even, &nonce_odd, &[1]]);
        (
            nonce_odd,
            ResponseAuth {
                nonce_even,
                continue_session: 1,
                auth,
            },
        )
    }

    #[test]
    fn response_auth_accepts_untampered() {
        let key = [0x11; DIGEST_SIZE];
        let params = [0x22; 9];
        let (nonce_odd, auth) = sample_response(&key, &params);
        verify_response_auth(&key, Ordinal::Unseal, &params, &nonce_odd, &auth).unwrap();
    }

    #[test]
    fn any_body_bit_flip_fails() {
        let key = [0x11; DIGEST_SIZE];
        let params = [0x22; 9];
        let (nonce_odd, auth) = sample_response(&key, &params);
        for index in 0..params.len() {
            for bit in 0..8 {
                let mut tampered = params;
                tampered[index] ^= 1 << bit;
                assert!(matches!(
                    verify_response_auth(&key, Ordinal::Unseal, &tampered, &nonce_odd, &auth),
                    Err(TpmError::AuthFail)
                ));
            }
        }
    }

    #[test]
    fn any_auth_bit_flip_fails() {
        let key = [0x11; DIGEST_SIZE];
        let params = [0x22; 9];
        let (nonce_odd, auth) = sample_response(&key, &params);
        for index in 0..DIGEST_SIZE {
            for bit in 0..8 {
                let mut tampered = auth;
                tampered.auth[index] ^= 1 << bit;
                assert!(matches!(
                    verify_response_auth(&key, Ordinal::Unseal, &params, &nonce_odd, &tampered),
                    Err(TpmError::AuthFail)
                ));
            }
        }
    }

    #[test]
    fn shared_secret_reproduces() {
        let entity_auth = [0u8; DIGEST_SIZE];
        let even = [0x5A; DIGEST_SIZE];
        let odd = [0xA5; DIGEST_SIZE];
        let derived = osap_shared_secret(&entity_auth, &even, &odd);

        let mut joined = Vec::new();
        joined.extend_from_slice(&even);
        joined.extend_from_slice(&odd);
        assert_eq!(derived, hmac_sha1(&entity_auth, &[&joined]));
    }

    #[test]
    fn enc_auth_is_xor_of_mask() {
        let shared = [0x31; DIGEST_SIZE];
        let even = [0x77; DIGEST_SIZE];
        let new_auth = [0x0F; DIGEST_SIZE];
        let masked = enc_auth(&shared, &even, &new_auth);

        let mask = sha1_parts(&[&shared, &even]);
        for index in 0..DIGEST_SIZE {
            assert_eq!(masked[index] ^ mask[index], new_auth[index]);
        }
    }
}
