// SPDX-License-Identifier: MIT

//! RSA helpers at the library boundary: extracting public keys from key
//! blobs and checking quote signatures. These never talk to the device.

use crate::auth::sha1_parts;
use crate::error::{TpmError, TpmResult};
use crate::structs::{Key, KeyParms, PcrComposite, PcrSelection, Pubkey, RsaParms};
use crate::wire::{parse_all, TpmBuild, TpmWriter};
use crate::{Algorithm, EncScheme, SigScheme, DIGEST_SIZE, STRUCT_VER_1_1};
use rsa::pkcs1v15::{Signature, VerifyingKey};
use rsa::signature::Verifier;
use rsa::traits::PublicKeyParts;
use rsa::{BigUint, RsaPublicKey};
use sha1::Sha1;

/// The default public exponent implied by an empty `TPM_RSA_KEY_PARMS`
/// exponent field.
const DEFAULT_EXPONENT: u32 = 65537;

fn rsa_from_parts(parms: &KeyParms, modulus: &[u8]) -> TpmResult<RsaPublicKey> {
    if parms.algorithm != Algorithm::Rsa as u32 {
        return Err(TpmError::Malformed("not an RSA key"));
    }
    let rsa_parms: RsaParms = parse_all(&parms.parms)?;
    let exponent = if rsa_parms.exponent.is_empty() {
        BigUint::from(DEFAULT_EXPONENT)
    } else {
        BigUint::from_bytes_be(&rsa_parms.exponent)
    };
    RsaPublicKey::new(BigUint::from_bytes_be(modulus), exponent)
        .map_err(|_| TpmError::Malformed("invalid RSA public key"))
}

/// Extracts the RSA public key from a loadable `TPM_KEY` blob.
///
/// # Errors
///
/// Returns [`TpmError::Malformed`] when the blob does not parse or does not
/// hold a well-formed RSA key.
pub fn public_key(key_blob: &[u8]) -> TpmResult<RsaPublicKey> {
    let key: Key = parse_all(key_blob)?;
    rsa_from_parts(&key.algorithm_parms, &key.pub_key)
}

/// Extracts the RSA public key from raw `TPM_PUBKEY` bytes, as returned by
/// `TPM_GetPubKey` and `TPM_ReadPubek`.
///
/// # Errors
///
/// Returns [`TpmError::Malformed`] when the record does not parse or does
/// not hold a well-formed RSA key.
pub fn public_key_of_pubkey(pubkey: &[u8]) -> TpmResult<RsaPublicKey> {
    let record: Pubkey = parse_all(pubkey)?;
    rsa_from_parts(&record.algorithm_parms, &record.key)
}

/// Builds the `TPM_PUBKEY` record of an RSA public key, as hashed into the
/// chosen-identity digest of `TPM_MakeIdentity`.
///
/// # Errors
///
/// Returns [`TpmError::Boundary`] when the key parameters overflow the
/// encoding buffer.
pub fn tpm_pubkey(key: &RsaPublicKey) -> TpmResult<Pubkey> {
    let exponent = key.e();
    let exponent_bytes = if *exponent == BigUint::from(DEFAULT_EXPONENT) {
        Vec::new()
    } else {
        exponent.to_bytes_be()
    };
    let rsa_parms = RsaParms {
        key_length: u32::try_from(key.size() * 8).map_err(|_| TpmError::Boundary)?,
        num_primes: 2,
        exponent: exponent_bytes,
    };
    Ok(Pubkey {
        algorithm_parms: KeyParms::rsa(EncScheme::RsaEsOaepSha1Mgf1, SigScheme::None, &rsa_parms)?,
        key: key.n().to_bytes_be(),
    })
}

/// Verifies a quote signature.
///
/// Reconstructs the `TPM_QUOTE_INFO` of the 1.2 specification, i.e.
/// `version 1.1.0.0 || "QUOT" || SHA1(pcrComposite) || SHA1(data)`, and
/// checks the RSASSA PKCS#1 v1.5 SHA-1 signature over it.
///
/// # Errors
///
/// Returns [`TpmError::Signature`] when the signature does not verify and
/// [`TpmError::Usage`] for an invalid PCR list.
pub fn verify_quote(
    key: &RsaPublicKey,
    signature: &[u8],
    data: &[u8],
    values: &[[u8; DIGEST_SIZE]],
    pcrs: &[u32],
) -> TpmResult<()> {
    let selection = PcrSelection::from_pcrs(pcrs)?;
    let composite_digest = PcrComposite::new(selection, values).digest()?;
    let external = sha1_parts(&[data]);

    let mut quote_info = [0u8; 4 + 4 + DIGEST_SIZE + DIGEST_SIZE];
    let mut writer = TpmWriter::new(&mut quote_info);
    STRUCT_VER_1_1.build(&mut writer)?;
    writer.write_bytes(b"QUOT")?;
    composite_digest.build(&mut writer)?;
    external.build(&mut writer)?;

    let signature = Signature::try_from(signature).map_err(|_| TpmError::Signature)?;
    VerifyingKey::<Sha1>::new(key.clone())
        .verify(&quote_info, &signature)
        .map_err(|_| TpmError::Signature)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{AuthDataUsage, KeyUsage};

    fn sample_modulus() -> Vec<u8> {
        let mut modulus = vec![0xC3u8; 256];
        modulus[255] |= 1;
        modulus
    }

    fn sample_key_blob(exponent: Vec<u8>) -> Vec<u8> {
        let rsa = RsaParms {
            key_length: 2048,
            num_primes: 2,
            exponent,
        };
        let key = Key {
            version: STRUCT_VER_1_1,
            key_usage: KeyUsage::Identity as u16,
            key_flags: 0,
            auth_data_usage: AuthDataUsage::Always as u8,
            algorithm_parms: KeyParms::rsa(EncScheme::None, SigScheme::RsaSsaPkcs1v15Sha1, &rsa)
                .unwrap(),
            pcr_info: Vec::new(),
            pub_key: sample_modulus(),
            enc_data: Vec::new(),
        };
        let mut buffer = [0u8; 2048];
        let mut writer = TpmWriter::new(&mut buffer);
        key.build(&mut writer).unwrap();
        let len = writer.len();
        buffer[..len].to_vec()
    }

    #[test]
    fn empty_exponent_means_default() {
        let key = public_key(&sample_key_blob(Vec::new())).unwrap();
        assert_eq!(key.e(), &BigUint::from(65537u32));
        assert_eq!(key.n().to_bytes_be(), sample_modulus());
    }

    #[test]
    fn explicit_exponent_is_honored() {
        let key = public_key(&sample_key_blob(vec![0x03])).unwrap();
        assert_eq!(key.e(), &BigUint::from(3u32));
    }

    #[test]
    fn non_rsa_blob_is_rejected() {
        let mut blob = sample_key_blob(Vec::new());
        // Corrupt the algorithm identifier.
        blob[11] = 0x05;
        assert!(matches!(public_key(&blob), Err(TpmError::Malformed(_))));
    }

    #[test]
    fn tpm_pubkey_round_trips_through_extraction() {
        let key = public_key(&sample_key_blob(Vec::new())).unwrap();
        let record = tpm_pubkey(&key).unwrap();
        assert_eq!(record.key, sample_modulus());
        let parms: RsaParms = parse_all(&record.algorithm_parms.parms).unwrap();
        assert_eq!(parms.key_length, 2048);
        assert!(parms.exponent.is_empty());

        let mut buffer = [0u8; 2048];
        let mut writer = TpmWriter::new(&mut buffer);
        record.build(&mut writer).unwrap();
        let len = writer.len();
        let extracted = public_key_of_pubkey(&buffer[..len]).unwrap();
        assert_eq!(extracted, key);
    }

    #[test]
    fn bogus_quote_signature_is_rejected() {
        let key = public_key(&sample_key_blob(Vec::new())).unwrap();
        let result = verify_quote(
            &key,
            &[0x42; 256],
            b"external",
            &[[0x11; DIGEST_SIZE]],
            &[17],
        );
        assert!(matches!(result, Err(TpmError::Signature)));
    }
}
