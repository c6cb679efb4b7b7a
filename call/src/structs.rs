// SPDX-License-Identifier: MIT

//! Typed records of the TPM 1.2 Structures specification used by this
//! library, with their exact field order on the wire.

use crate::error::{TpmError, TpmResult};
use crate::wire::{split, TpmBuild, TpmParse, TpmWriter};
use crate::{
    Algorithm, AuthDataUsage, EncScheme, Handle, KeyFlags, KeyUsage, SigScheme, DIGEST_SIZE,
    PCR_COUNT, STRUCT_VER_1_1, TAG_PCR_INFO_LONG,
};
use sha1::{Digest, Sha1};

/// `TPM_PCR_SELECTION`: a bit-indexed selector over the 24 PCRs.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PcrSelection {
    mask: [u8; 3],
}

impl PcrSelection {
    /// Builds a selection from PCR indices.
    ///
    /// # Errors
    ///
    /// Returns [`TpmError::Usage`] when an index is out of range.
    pub fn from_pcrs(pcrs: &[u32]) -> TpmResult<Self> {
        let mut mask = [0u8; 3];
        for &pcr in pcrs {
            if pcr >= PCR_COUNT {
                return Err(TpmError::Usage("PCR index out of range"));
            }
            mask[pcr as usize / 8] |= 1 << (pcr % 8);
        }
        Ok(PcrSelection { mask })
    }

    /// Selected PCR indices in ascending order.
    #[must_use]
    pub fn pcrs(&self) -> Vec<u32> {
        (0..PCR_COUNT)
            .filter(|pcr| self.mask[*pcr as usize / 8] & (1 << (pcr % 8)) != 0)
            .collect()
    }
}

impl TpmBuild for PcrSelection {
    fn build(&self, writer: &mut TpmWriter) -> TpmResult<()> {
        3u16.build(writer)?;
        self.mask.build(writer)
    }

    fn packed_size(&self) -> usize {
        2 + 3
    }
}

impl TpmParse for PcrSelection {
    fn parse(buf: &[u8]) -> TpmResult<(Self, &[u8])> {
        let (size, tail) = u16::parse(buf)?;
        if size != 3 {
            return Err(TpmError::Malformed("unexpected PCR selection size"));
        }
        let (mask, tail) = <[u8; 3]>::parse(tail)?;
        Ok((PcrSelection { mask }, tail))
    }
}

/// `TPM_PCR_COMPOSITE`: a selection bound to the concatenated values of the
/// selected registers.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PcrComposite {
    pub selection: PcrSelection,
    /// Concatenated 20-byte values, ascending PCR order.
    pub values: Vec<u8>,
}

impl PcrComposite {
    /// Assembles a composite from per-register values.
    #[must_use]
    pub fn new(selection: PcrSelection, values: &[[u8; DIGEST_SIZE]]) -> Self {
        let mut flat = Vec::with_capacity(values.len() * DIGEST_SIZE);
        for value in values {
            flat.extend_from_slice(value);
        }
        PcrComposite {
            selection,
            values: flat,
        }
    }

    /// `TPM_COMPOSITE_HASH`: SHA-1 of the wire encoding.
    ///
    /// # Errors
    ///
    /// Returns [`TpmError::Boundary`] when the composite exceeds the command
    /// buffer, which cannot happen for any valid selection.
    pub fn digest(&self) -> TpmResult<[u8; DIGEST_SIZE]> {
        let mut buffer = [0u8; crate::MAX_COMMAND_SIZE];
        let mut writer = TpmWriter::new(&mut buffer);
        self.build(&mut writer)?;
        let len = writer.len();
        let mut hasher = Sha1::new();
        hasher.update(&buffer[..len]);
        Ok(hasher.finalize().into())
    }
}

impl TpmBuild for PcrComposite {
    fn build(&self, writer: &mut TpmWriter) -> TpmResult<()> {
        self.selection.build(writer)?;
        self.values.build(writer)
    }

    fn packed_size(&self) -> usize {
        self.selection.packed_size() + self.values.packed_size()
    }
}

impl TpmParse for PcrComposite {
    fn parse(buf: &[u8]) -> TpmResult<(Self, &[u8])> {
        let (selection, tail) = PcrSelection::parse(buf)?;
        let (values, tail) = Vec::<u8>::parse(tail)?;
        if values.len() % DIGEST_SIZE != 0 {
            return Err(TpmError::Malformed("ragged PCR composite"));
        }
        Ok((PcrComposite { selection, values }, tail))
    }
}

/// `TPM_PCR_INFO_LONG`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PcrInfoLong {
    pub locality_at_creation: u8,
    pub locality_at_release: u8,
    pub creation_selection: PcrSelection,
    pub release_selection: PcrSelection,
    pub digest_at_creation: [u8; DIGEST_SIZE],
    pub digest_at_release: [u8; DIGEST_SIZE],
}

impl TpmBuild for PcrInfoLong {
    fn build(&self, writer: &mut TpmWriter) -> TpmResult<()> {
        TAG_PCR_INFO_LONG.build(writer)?;
        self.locality_at_creation.build(writer)?;
        self.locality_at_release.build(writer)?;
        self.creation_selection.build(writer)?;
        self.release_selection.build(writer)?;
        self.digest_at_creation.build(writer)?;
        self.digest_at_release.build(writer)
    }

    fn packed_size(&self) -> usize {
        2 + 1 + 1
            + self.creation_selection.packed_size()
            + self.release_selection.packed_size()
            + DIGEST_SIZE
            + DIGEST_SIZE
    }
}

impl TpmParse for PcrInfoLong {
    fn parse(buf: &[u8]) -> TpmResult<(Self, &[u8])> {
        let (tag, tail) = u16::parse(buf)?;
        if tag != TAG_PCR_INFO_LONG {
            return Err(TpmError::Malformed("not a TPM_PCR_INFO_LONG"));
        }
        let (locality_at_creation, tail) = u8::parse(tail)?;
        let (locality_at_release, tail) = u8::parse(tail)?;
        let (creation_selection, tail) = PcrSelection::parse(tail)?;
        let (release_selection, tail) = PcrSelection::parse(tail)?;
        let (digest_at_creation, tail) = <[u8; DIGEST_SIZE]>::parse(tail)?;
        let (digest_at_release, tail) = <[u8; DIGEST_SIZE]>::parse(tail)?;
        Ok((
            PcrInfoLong {
                locality_at_creation,
                locality_at_release,
                creation_selection,
                release_selection,
                digest_at_creation,
                digest_at_release,
            },
            tail,
        ))
    }
}

/// `TPM_PCR_INFO_SHORT`, as returned by `TPM_Quote2`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PcrInfoShort {
    pub selection: PcrSelection,
    pub locality_at_release: u8,
    pub digest_at_release: [u8; DIGEST_SIZE],
}

impl TpmBuild for PcrInfoShort {
    fn build(&self, writer: &mut TpmWriter) -> TpmResult<()> {
        self.selection.build(writer)?;
        self.locality_at_release.build(writer)?;
        self.digest_at_release.build(writer)
    }

    fn packed_size(&self) -> usize {
        self.selection.packed_size() + 1 + DIGEST_SIZE
    }
}

impl TpmParse for PcrInfoShort {
    fn parse(buf: &[u8]) -> TpmResult<(Self, &[u8])> {
        let (selection, tail) = PcrSelection::parse(buf)?;
        let (locality_at_release, tail) = u8::parse(tail)?;
        let (digest_at_release, tail) = <[u8; DIGEST_SIZE]>::parse(tail)?;
        Ok((
            PcrInfoShort {
                selection,
                locality_at_release,
                digest_at_release,
            },
            tail,
        ))
    }
}

/// `TPM_KEY_PARMS`
///
/// Algorithm and scheme fields are kept raw so that blobs produced by other
/// stacks survive a round trip unchanged.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct KeyParms {
    pub algorithm: u32,
    pub enc_scheme: u16,
    pub sig_scheme: u16,
    pub parms: Vec<u8>,
}

impl KeyParms {
    /// RSA key parameters with the given sub-parameters.
    ///
    /// # Errors
    ///
    /// Returns [`TpmError::Boundary`] when the sub-parameters overflow the
    /// command buffer.
    pub fn rsa(enc_scheme: EncScheme, sig_scheme: SigScheme, rsa: &RsaParms) -> TpmResult<Self> {
        let mut buffer = [0u8; 64];
        let mut writer = TpmWriter::new(&mut buffer);
        rsa.build(&mut writer)?;
        let len = writer.len();
        Ok(KeyParms {
            algorithm: Algorithm::Rsa as u32,
            enc_scheme: enc_scheme as u16,
            sig_scheme: sig_scheme as u16,
            parms: buffer[..len].to_vec(),
        })
    }
}

impl TpmBuild for KeyParms {
    fn build(&self, writer: &mut TpmWriter) -> TpmResult<()> {
        self.algorithm.build(writer)?;
        self.enc_scheme.build(writer)?;
        self.sig_scheme.build(writer)?;
        self.parms.build(writer)
    }

    fn packed_size(&self) -> usize {
        4 + 2 + 2 + self.parms.packed_size()
    }
}

impl TpmParse for KeyParms {
    fn parse(buf: &[u8]) -> TpmResult<(Self, &[u8])> {
        let (algorithm, tail) = u32::parse(buf)?;
        let (enc_scheme, tail) = u16::parse(tail)?;
        let (sig_scheme, tail) = u16::parse(tail)?;
        let (parms, tail) = Vec::<u8>::parse(tail)?;
        Ok((
            KeyParms {
                algorithm,
                enc_scheme,
                sig_scheme,
                parms,
            },
            tail,
        ))
    }
}

/// `TPM_RSA_KEY_PARMS`
///
/// An empty exponent stands for the default of 65537.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RsaParms {
    pub key_length: u32,
    pub num_primes: u32,
    pub exponent: Vec<u8>,
}

impl TpmBuild for RsaParms {
    fn build(&self, writer: &mut TpmWriter) -> TpmResult<()> {
        self.key_length.build(writer)?;
        self.num_primes.build(writer)?;
        self.exponent.build(writer)
    }

    fn packed_size(&self) -> usize {
        4 + 4 + self.exponent.packed_size()
    }
}

impl TpmParse for RsaParms {
    fn parse(buf: &[u8]) -> TpmResult<(Self, &[u8])> {
        let (key_length, tail) = u32::parse(buf)?;
        let (num_primes, tail) = u32::parse(tail)?;
        let (exponent, tail) = Vec::<u8>::parse(tail)?;
        Ok((
            RsaParms {
                key_length,
                num_primes,
                exponent,
            },
            tail,
        ))
    }
}

/// The `TPM_KEY`/`TPM_KEY12` surface used by loadable blobs.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Key {
    pub version: u32,
    pub key_usage: u16,
    pub key_flags: u32,
    pub auth_data_usage: u8,
    pub algorithm_parms: KeyParms,
    pub pcr_info: Vec<u8>,
    pub pub_key: Vec<u8>,
    pub enc_data: Vec<u8>,
}

impl Key {
    /// Decoded `TPM_KEY_FLAGS`, dropping unknown bits.
    #[must_use]
    pub fn flags(&self) -> KeyFlags {
        KeyFlags::from_bits_truncate(self.key_flags)
    }

    /// The template sent with `TPM_MakeIdentity`: RSA-2048, two primes,
    /// implicit exponent, identity usage, auth always, RSASSA PKCS#1 v1.5
    /// with SHA-1 and no encryption scheme.
    ///
    /// # Errors
    ///
    /// Does not fail in practice; propagates the [`TpmError::Boundary`] of
    /// sub-parameter encoding.
    pub fn identity_template() -> TpmResult<Self> {
        let rsa = RsaParms {
            key_length: 2048,
            num_primes: 2,
            exponent: Vec::new(),
        };
        Ok(Key {
            version: STRUCT_VER_1_1,
            key_usage: KeyUsage::Identity as u16,
            key_flags: 0,
            auth_data_usage: AuthDataUsage::Always as u8,
            algorithm_parms: KeyParms::rsa(EncScheme::None, SigScheme::RsaSsaPkcs1v15Sha1, &rsa)?,
            pcr_info: Vec::new(),
            pub_key: Vec::new(),
            enc_data: Vec::new(),
        })
    }
}

impl TpmBuild for Key {
    fn build(&self, writer: &mut TpmWriter) -> TpmResult<()> {
        self.version.build(writer)?;
        self.key_usage.build(writer)?;
        self.key_flags.build(writer)?;
        self.auth_data_usage.build(writer)?;
        self.algorithm_parms.build(writer)?;
        self.pcr_info.build(writer)?;
        self.pub_key.build(writer)?;
        self.enc_data.build(writer)
    }

    fn packed_size(&self) -> usize {
        4 + 2 + 4 + 1
            + self.algorithm_parms.packed_size()
            + self.pcr_info.packed_size()
            + self.pub_key.packed_size()
            + self.enc_data.packed_size()
    }
}

impl TpmParse for Key {
    fn parse(buf: &[u8]) -> TpmResult<(Self, &[u8])> {
        let (version, tail) = u32::parse(buf)?;
        let (key_usage, tail) = u16::parse(tail)?;
        let (key_flags, tail) = u32::parse(tail)?;
        let (auth_data_usage, tail) = u8::parse(tail)?;
        let (algorithm_parms, tail) = KeyParms::parse(tail)?;
        let (pcr_info, tail) = Vec::<u8>::parse(tail)?;
        let (pub_key, tail) = Vec::<u8>::parse(tail)?;
        let (enc_data, tail) = Vec::<u8>::parse(tail)?;
        Ok((
            Key {
                version,
                key_usage,
                key_flags,
                auth_data_usage,
                algorithm_parms,
                pcr_info,
                pub_key,
                enc_data,
            },
            tail,
        ))
    }
}

/// `TPM_PUBKEY`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Pubkey {
    pub algorithm_parms: KeyParms,
    pub key: Vec<u8>,
}

impl TpmBuild for Pubkey {
    fn build(&self, writer: &mut TpmWriter) -> TpmResult<()> {
        self.algorithm_parms.build(writer)?;
        self.key.build(writer)
    }

    fn packed_size(&self) -> usize {
        self.algorithm_parms.packed_size() + self.key.packed_size()
    }
}

impl TpmParse for Pubkey {
    fn parse(buf: &[u8]) -> TpmResult<(Self, &[u8])> {
        let (algorithm_parms, tail) = KeyParms::parse(buf)?;
        let (key, tail) = Vec::<u8>::parse(tail)?;
        Ok((
            Pubkey {
                algorithm_parms,
                key,
            },
            tail,
        ))
    }
}

/// The sealed blob returned by `TPM_Seal` and consumed by `TPM_Unseal`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoredData {
    pub version: u32,
    pub et: u32,
    pub seal_info: Vec<u8>,
    pub enc_data: Vec<u8>,
}

impl TpmBuild for StoredData {
    fn build(&self, writer: &mut TpmWriter) -> TpmResult<()> {
        self.version.build(writer)?;
        self.et.build(writer)?;
        self.seal_info.build(writer)?;
        self.enc_data.build(writer)
    }

    fn packed_size(&self) -> usize {
        4 + 4 + self.seal_info.packed_size() + self.enc_data.packed_size()
    }
}

impl TpmParse for StoredData {
    fn parse(buf: &[u8]) -> TpmResult<(Self, &[u8])> {
        let (version, tail) = u32::parse(buf)?;
        let (et, tail) = u32::parse(tail)?;
        let (seal_info, tail) = Vec::<u8>::parse(tail)?;
        let (enc_data, tail) = Vec::<u8>::parse(tail)?;
        Ok((
            StoredData {
                version,
                et,
                seal_info,
                enc_data,
            },
            tail,
        ))
    }
}

/// The trailing authorization block of a request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CommandAuth {
    pub auth_handle: Handle,
    pub nonce_odd: [u8; DIGEST_SIZE],
    pub continue_session: u8,
    pub auth: [u8; DIGEST_SIZE],
}

/// Wire length of a [`CommandAuth`] block.
pub const COMMAND_AUTH_SIZE: usize = 4 + DIGEST_SIZE + 1 + DIGEST_SIZE;

impl TpmBuild for CommandAuth {
    fn build(&self, writer: &mut TpmWriter) -> TpmResult<()> {
        self.auth_handle.build(writer)?;
        self.nonce_odd.build(writer)?;
        self.continue_session.build(writer)?;
        self.auth.build(writer)
    }

    fn packed_size(&self) -> usize {
        COMMAND_AUTH_SIZE
    }
}

impl TpmParse for CommandAuth {
    fn parse(buf: &[u8]) -> TpmResult<(Self, &[u8])> {
        let (auth_handle, tail) = u32::parse(buf)?;
        let (nonce_odd, tail) = <[u8; DIGEST_SIZE]>::parse(tail)?;
        let (continue_session, tail) = u8::parse(tail)?;
        let (auth, tail) = <[u8; DIGEST_SIZE]>::parse(tail)?;
        Ok((
            CommandAuth {
                auth_handle,
                nonce_odd,
                continue_session,
                auth,
            },
            tail,
        ))
    }
}

/// The trailing authorization block of a response.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ResponseAuth {
    pub nonce_even: [u8; DIGEST_SIZE],
    pub continue_session: u8,
    pub auth: [u8; DIGEST_SIZE],
}

/// Wire length of a [`ResponseAuth`] block.
pub const RESPONSE_AUTH_SIZE: usize = DIGEST_SIZE + 1 + DIGEST_SIZE;

impl TpmBuild for ResponseAuth {
    fn build(&self, writer: &mut TpmWriter) -> TpmResult<()> {
        self.nonce_even.build(writer)?;
        self.continue_session.build(writer)?;
        self.auth.build(writer)
    }

    fn packed_size(&self) -> usize {
        RESPONSE_AUTH_SIZE
    }
}

impl TpmParse for ResponseAuth {
    fn parse(buf: &[u8]) -> TpmResult<(Self, &[u8])> {
        let (nonce_even, tail) = <[u8; DIGEST_SIZE]>::parse(buf)?;
        let (continue_session, tail) = u8::parse(tail)?;
        let (auth, tail) = <[u8; DIGEST_SIZE]>::parse(tail)?;
        Ok((
            ResponseAuth {
                nonce_even,
                continue_session,
                auth,
            },
            tail,
        ))
    }
}

/// Reads `buf` as consecutive 20-byte PCR values.
///
/// # Errors
///
/// Returns [`TpmError::Malformed`] when the length is not a multiple of 20.
pub fn pcr_values(buf: &[u8]) -> TpmResult<Vec<[u8; DIGEST_SIZE]>> {
    if buf.len() % DIGEST_SIZE != 0 {
        return Err(TpmError::Malformed("ragged PCR value buffer"));
    }
    let mut values = Vec::with_capacity(buf.len() / DIGEST_SIZE);
    let mut rest = buf;
    while !rest.is_empty() {
        let (head, tail) = split(rest, DIGEST_SIZE)?;
        let mut value = [0u8; DIGEST_SIZE];
        value.copy_from_slice(head);
        values.push(value);
        rest = tail;
    }
    Ok(values)
}
