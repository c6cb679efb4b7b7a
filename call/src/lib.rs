// SPDX-License-Identifier: MIT
#![deny(clippy::all)]
#![deny(clippy::pedantic)]

use bitflags::bitflags;
use core::fmt;
use strum_macros::FromRepr;

mod auth;
mod envelope;
mod session;
#[cfg(test)]
mod testutil;

pub mod device;
pub mod error;
pub mod ops;
pub mod structs;
pub mod verify;
pub mod wire;

pub use device::Device;
pub use error::{TpmError, TpmResult};

/// A TPM object or authorization handle.
pub type Handle = u32;

/// Byte length of a SHA-1 digest, a nonce and an authorization secret.
pub const DIGEST_SIZE: usize = 20;

/// Number of PCR registers on a v1.2 TPM.
pub const PCR_COUNT: u32 = 24;

/// Upper bound for a framed command or response.
pub const MAX_COMMAND_SIZE: usize = 4096;

/// `TPM_KH_SRK`: the Storage Root Key.
pub const KH_SRK: Handle = 0x4000_0000;

/// `TPM_KH_OWNER`: the TPM Owner.
pub const KH_OWNER: Handle = 0x4000_0001;

/// `TPM_KH_EK`: the Endorsement Key.
pub const KH_EK: Handle = 0x4000_0006;

/// The 20 bytes of zero used as the well-known authorization secret.
pub const WELL_KNOWN_AUTH: [u8; DIGEST_SIZE] = [0; DIGEST_SIZE];

/// `TPM_TAG_PCR_INFO_LONG`
pub const TAG_PCR_INFO_LONG: u16 = 0x0006;

/// `TPM_STRUCT_VER` 1.1.0.0, as carried by `TPM_KEY` and stored data blobs.
pub const STRUCT_VER_1_1: u32 = 0x0101_0000;

/// `TPM_NON_FATAL`: offset of the non-fatal (warning) return codes.
pub const NON_FATAL: u32 = 0x800;

/// `TPM_LOC_ZERO`
pub const LOC_ZERO: u8 = 0x01;
/// `TPM_LOC_ONE`
pub const LOC_ONE: u8 = 0x02;
/// `TPM_LOC_TWO`
pub const LOC_TWO: u8 = 0x04;
/// `TPM_LOC_THREE`
pub const LOC_THREE: u8 = 0x08;
/// `TPM_LOC_FOUR`
pub const LOC_FOUR: u8 = 0x10;

/// Enumeration of the `TPM_TAG` values.
///
/// The possible values for `TPM_TAG` are described in the section 6 of the
/// TPM 1.2 Structures specification.
#[derive(FromRepr, Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u16)]
pub enum Tag {
    /// `TPM_TAG_RQU_COMMAND`
    RquCommand = 0x00C1,
    /// `TPM_TAG_RQU_AUTH1_COMMAND`
    RquAuth1Command = 0x00C2,
    /// `TPM_TAG_RQU_AUTH2_COMMAND`
    RquAuth2Command = 0x00C3,
    /// `TPM_TAG_RSP_COMMAND`
    RspCommand = 0x00C4,
    /// `TPM_TAG_RSP_AUTH1_COMMAND`
    RspAuth1Command = 0x00C5,
    /// `TPM_TAG_RSP_AUTH2_COMMAND`
    RspAuth2Command = 0x00C6,
}

/// Enumeration of the `TPM_COMMAND_CODE` (ordinal) values used by this
/// library.
///
/// The possible values are described in the section 17 of the TPM 1.2
/// Structures specification.
#[derive(FromRepr, Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u32)]
pub enum Ordinal {
    /// `TPM_ORD_OIAP`
    Oiap = 0x0000_000A,
    /// `TPM_ORD_OSAP`
    Osap = 0x0000_000B,
    /// `TPM_ORD_Extend`
    Extend = 0x0000_0014,
    /// `TPM_ORD_PcrRead`
    PcrRead = 0x0000_0015,
    /// `TPM_ORD_Quote`
    Quote = 0x0000_0016,
    /// `TPM_ORD_Seal`
    Seal = 0x0000_0017,
    /// `TPM_ORD_Unseal`
    Unseal = 0x0000_0018,
    /// `TPM_ORD_GetPubKey`
    GetPubKey = 0x0000_0021,
    /// `TPM_ORD_Quote2`
    Quote2 = 0x0000_003E,
    /// `TPM_ORD_ResetLockValue`
    ResetLockValue = 0x0000_0040,
    /// `TPM_ORD_LoadKey2`
    LoadKey2 = 0x0000_0041,
    /// `TPM_ORD_GetRandom`
    GetRandom = 0x0000_0046,
    /// `TPM_ORD_MakeIdentity`
    MakeIdentity = 0x0000_0079,
    /// `TPM_ORD_ReadPubek`
    ReadPubek = 0x0000_007C,
    /// `TPM_ORD_FlushSpecific`
    FlushSpecific = 0x0000_00BA,
}

/// Enumeration of the `TPM_ENTITY_TYPE` values.
///
/// The low byte selects the entity class. The high byte carries the ADIP
/// encryption scheme and is zero for the XOR scheme used here.
#[derive(FromRepr, Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u16)]
pub enum EntityType {
    /// `TPM_ET_KEYHANDLE`
    KeyHandle = 0x0001,
    /// `TPM_ET_OWNER`
    Owner = 0x0002,
    /// `TPM_ET_DATA`
    Data = 0x0003,
    /// `TPM_ET_SRK`
    Srk = 0x0004,
    /// `TPM_ET_KEY`
    Key = 0x0005,
}

/// Enumeration of the `TPM_RESOURCE_TYPE` values.
#[derive(FromRepr, Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u32)]
pub enum ResourceType {
    /// `TPM_RT_KEY`
    Key = 0x0000_0001,
    /// `TPM_RT_AUTH`
    Auth = 0x0000_0002,
    /// `TPM_RT_HASH`
    Hash = 0x0000_0003,
    /// `TPM_RT_TRANS`
    Trans = 0x0000_0004,
    /// `TPM_RT_CONTEXT`
    Context = 0x0000_0005,
}

/// Enumeration of the `TPM_ALGORITHM_ID` values.
#[derive(FromRepr, Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u32)]
pub enum Algorithm {
    /// `TPM_ALG_RSA`
    Rsa = 0x0000_0001,
    /// `TPM_ALG_SHA`
    Sha = 0x0000_0004,
    /// `TPM_ALG_HMAC`
    Hmac = 0x0000_0005,
    /// `TPM_ALG_AES128`
    Aes128 = 0x0000_0006,
    /// `TPM_ALG_MGF1`
    Mgf1 = 0x0000_0007,
    /// `TPM_ALG_AES192`
    Aes192 = 0x0000_0008,
    /// `TPM_ALG_AES256`
    Aes256 = 0x0000_0009,
    /// `TPM_ALG_XOR`
    Xor = 0x0000_000A,
}

/// Enumeration of the `TPM_ENC_SCHEME` values.
#[derive(FromRepr, Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u16)]
pub enum EncScheme {
    /// `TPM_ES_NONE`
    None = 0x0001,
    /// `TPM_ES_RSAESPKCSv15`
    RsaEsPkcs1v15 = 0x0002,
    /// `TPM_ES_RSAESOAEP_SHA1_MGF1`
    RsaEsOaepSha1Mgf1 = 0x0003,
    /// `TPM_ES_SYM_CTR`
    SymCtr = 0x0004,
    /// `TPM_ES_SYM_OFB`
    SymOfb = 0x0005,
}

/// Enumeration of the `TPM_SIG_SCHEME` values.
#[derive(FromRepr, Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u16)]
pub enum SigScheme {
    /// `TPM_SS_NONE`
    None = 0x0001,
    /// `TPM_SS_RSASSAPKCS1v15_SHA1`
    RsaSsaPkcs1v15Sha1 = 0x0002,
    /// `TPM_SS_RSASSAPKCS1v15_DER`
    RsaSsaPkcs1v15Der = 0x0003,
    /// `TPM_SS_RSASSAPKCS1v15_INFO`
    RsaSsaPkcs1v15Info = 0x0004,
}

/// Enumeration of the `TPM_KEY_USAGE` values.
#[derive(FromRepr, Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u16)]
pub enum KeyUsage {
    /// `TPM_KEY_SIGNING`
    Signing = 0x0010,
    /// `TPM_KEY_STORAGE`
    Storage = 0x0011,
    /// `TPM_KEY_IDENTITY`
    Identity = 0x0012,
    /// `TPM_KEY_AUTHCHANGE`
    AuthChange = 0x0013,
    /// `TPM_KEY_BIND`
    Bind = 0x0014,
    /// `TPM_KEY_LEGACY`
    Legacy = 0x0015,
    /// `TPM_KEY_MIGRATE`
    Migrate = 0x0016,
}

/// Enumeration of the `TPM_AUTH_DATA_USAGE` values.
#[derive(FromRepr, Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum AuthDataUsage {
    /// `TPM_AUTH_NEVER`
    Never = 0x00,
    /// `TPM_AUTH_ALWAYS`
    Always = 0x01,
    /// `TPM_NO_READ_PUBKEY_AUTH`
    NoReadPubkeyAuth = 0x03,
}

bitflags! {
    /// `TPM_KEY_FLAGS`
    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    pub struct KeyFlags : u32 {
        /// Key redirects its output
        const Redirection = 0x0000_0001;
        /// Key may leave this TPM under the migration protocol
        const Migratable = 0x0000_0002;
        /// Key is not persisted across power cycles
        const IsVolatile = 0x0000_0004;
        /// PCR state is ignored when reading the key
        const PcrIgnoredOnRead = 0x0000_0008;
        /// Key is a migration authority
        const MigrateAuthority = 0x0000_0010;
    }
}

/// Enumeration of the `TPM_RESULT` values.
///
/// The possible values for `TPM_RESULT` are described in the section 5 of
/// the TPM 1.2 Structures specification. Codes at [`NON_FATAL`] and above
/// are warnings rather than errors.
#[derive(FromRepr, Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u32)]
pub enum ReturnCode {
    /// `TPM_SUCCESS`
    Success = 0x00,
    /// `TPM_AUTHFAIL`
    AuthFail = 0x01,
    /// `TPM_BADINDEX`
    BadIndex = 0x02,
    /// `TPM_BAD_PARAMETER`
    BadParameter = 0x03,
    /// `TPM_AUDITFAILURE`
    AuditFailure = 0x04,
    /// `TPM_CLEAR_DISABLED`
    ClearDisabled = 0x05,
    /// `TPM_DEACTIVATED`
    Deactivated = 0x06,
    /// `TPM_DISABLED`
    Disabled = 0x07,
    /// `TPM_DISABLED_CMD`
    DisabledCmd = 0x08,
    /// `TPM_FAIL`
    Fail = 0x09,
    /// `TPM_BAD_ORDINAL`
    BadOrdinal = 0x0A,
    /// `TPM_INSTALL_DISABLED`
    InstallDisabled = 0x0B,
    /// `TPM_INVALID_KEYHANDLE`
    InvalidKeyHandle = 0x0C,
    /// `TPM_KEYNOTFOUND`
    KeyNotFound = 0x0D,
    /// `TPM_INAPPROPRIATE_ENC`
    InappropriateEnc = 0x0E,
    /// `TPM_MIGRATEFAIL`
    MigrateFail = 0x0F,
    /// `TPM_INVALID_PCR_INFO`
    InvalidPcrInfo = 0x10,
    /// `TPM_NOSPACE`
    NoSpace = 0x11,
    /// `TPM_NOSRK`
    NoSrk = 0x12,
    /// `TPM_NOTSEALED_BLOB`
    NotSealedBlob = 0x13,
    /// `TPM_OWNER_SET`
    OwnerSet = 0x14,
    /// `TPM_RESOURCES`
    Resources = 0x15,
    /// `TPM_SHORTRANDOM`
    ShortRandom = 0x16,
    /// `TPM_SIZE`
    Size = 0x17,
    /// `TPM_WRONGPCRVAL`
    WrongPcrVal = 0x18,
    /// `TPM_BAD_PARAM_SIZE`
    BadParamSize = 0x19,
    /// `TPM_SHA_THREAD`
    ShaThread = 0x1A,
    /// `TPM_SHA_ERROR`
    ShaError = 0x1B,
    /// `TPM_FAILEDSELFTEST`
    FailedSelfTest = 0x1C,
    /// `TPM_AUTH2FAIL`
    Auth2Fail = 0x1D,
    /// `TPM_BADTAG`
    BadTag = 0x1E,
    /// `TPM_IOERROR`
    IoError = 0x1F,
    /// `TPM_ENCRYPT_ERROR`
    EncryptError = 0x20,
    /// `TPM_DECRYPT_ERROR`
    DecryptError = 0x21,
    /// `TPM_INVALID_AUTHHANDLE`
    InvalidAuthHandle = 0x22,
    /// `TPM_NO_ENDORSEMENT`
    NoEndorsement = 0x23,
    /// `TPM_INVALID_KEYUSAGE`
    InvalidKeyUsage = 0x24,
    /// `TPM_WRONG_ENTITYTYPE`
    WrongEntityType = 0x25,
    /// `TPM_INVALID_POSTINIT`
    InvalidPostInit = 0x26,
    /// `TPM_INAPPROPRIATE_SIG`
    InappropriateSig = 0x27,
    /// `TPM_BAD_KEY_PROPERTY`
    BadKeyProperty = 0x28,
    /// `TPM_BAD_MIGRATION`
    BadMigration = 0x29,
    /// `TPM_BAD_SCHEME`
    BadScheme = 0x2A,
    /// `TPM_BAD_DATASIZE`
    BadDataSize = 0x2B,
    /// `TPM_BAD_MODE`
    BadMode = 0x2C,
    /// `TPM_BAD_PRESENCE`
    BadPresence = 0x2D,
    /// `TPM_BAD_VERSION`
    BadVersion = 0x2E,
    /// `TPM_NO_WRAP_TRANSPORT`
    NoWrapTransport = 0x2F,
    /// `TPM_AUDITFAIL_UNSUCCESSFUL`
    AuditFailUnsuccessful = 0x30,
    /// `TPM_AUDITFAIL_SUCCESSFUL`
    AuditFailSuccessful = 0x31,
    /// `TPM_NOTRESETABLE`
    NotResetable = 0x32,
    /// `TPM_NOTLOCAL`
    NotLocal = 0x33,
    /// `TPM_BAD_TYPE`
    BadType = 0x34,
    /// `TPM_INVALID_RESOURCE`
    InvalidResource = 0x35,
    /// `TPM_NOTFIPS`
    NotFips = 0x36,
    /// `TPM_INVALID_FAMILY`
    InvalidFamily = 0x37,
    /// `TPM_NO_NV_PERMISSION`
    NoNvPermission = 0x38,
    /// `TPM_REQUIRES_SIGN`
    RequiresSign = 0x39,
    /// `TPM_KEY_NOTSUPPORTED`
    KeyNotSupported = 0x3A,
    /// `TPM_AUTH_CONFLICT`
    AuthConflict = 0x3B,
    /// `TPM_AREA_LOCKED`
    AreaLocked = 0x3C,
    /// `TPM_BAD_LOCALITY`
    BadLocality = 0x3D,
    /// `TPM_READ_ONLY`
    ReadOnly = 0x3E,
    /// `TPM_PER_NOWRITE`
    PerNoWrite = 0x3F,
    /// `TPM_FAMILYCOUNT`
    FamilyCount = 0x40,
    /// `TPM_WRITE_LOCKED`
    WriteLocked = 0x41,
    /// `TPM_BAD_ATTRIBUTES`
    BadAttributes = 0x42,
    /// `TPM_INVALID_STRUCTURE`
    InvalidStructure = 0x43,
    /// `TPM_KEY_OWNER_CONTROL`
    KeyOwnerControl = 0x44,
    /// `TPM_BAD_COUNTER`
    BadCounter = 0x45,
    /// `TPM_NOT_FULLWRITE`
    NotFullWrite = 0x46,
    /// `TPM_CONTEXT_GAP`
    ContextGap = 0x47,
    /// `TPM_MAXNVWRITES`
    MaxNvWrites = 0x48,
    /// `TPM_NOOPERATOR`
    NoOperator = 0x49,
    /// `TPM_RESOURCEMISSING`
    ResourceMissing = 0x4A,
    /// `TPM_DELEGATE_LOCK`
    DelegateLock = 0x4B,
    /// `TPM_DELEGATE_FAMILY`
    DelegateFamily = 0x4C,
    /// `TPM_DELEGATE_ADMIN`
    DelegateAdmin = 0x4D,
    /// `TPM_TRANSPORT_NOTEXCLUSIVE`
    TransportNotExclusive = 0x4E,
    /// `TPM_OWNER_CONTROL`
    OwnerControl = 0x4F,
    /// `TPM_DAA_RESOURCES`
    DaaResources = 0x50,
    /// `TPM_DAA_INPUT_DATA0`
    DaaInputData0 = 0x51,
    /// `TPM_DAA_INPUT_DATA1`
    DaaInputData1 = 0x52,
    /// `TPM_DAA_ISSUER_SETTINGS`
    DaaIssuerSettings = 0x53,
    /// `TPM_DAA_TPM_SETTINGS`
    DaaTpmSettings = 0x54,
    /// `TPM_DAA_STAGE`
    DaaStage = 0x55,
    /// `TPM_DAA_ISSUER_VALIDITY`
    DaaIssuerValidity = 0x56,
    /// `TPM_DAA_WRONG_W`
    DaaWrongW = 0x57,
    /// `TPM_BAD_HANDLE`
    BadHandle = 0x58,
    /// `TPM_BAD_DELEGATE`
    BadDelegate = 0x59,
    /// `TPM_BADCONTEXT`
    BadContext = 0x5A,
    /// `TPM_TOOMANYCONTEXTS`
    TooManyContexts = 0x5B,
    /// `TPM_MA_TICKET_SIGNATURE`
    MaTicketSignature = 0x5C,
    /// `TPM_MA_DESTINATION`
    MaDestination = 0x5D,
    /// `TPM_MA_SOURCE`
    MaSource = 0x5E,
    /// `TPM_MA_AUTHORITY`
    MaAuthority = 0x5F,
    /// `TPM_PERMANENTEK`
    PermanentEk = 0x61,
    /// `TPM_BAD_SIGNATURE`
    BadSignature = 0x62,
    /// `TPM_NOCONTEXTSPACE`
    NoContextSpace = 0x63,
    /// `TPM_RETRY`
    Retry = 0x800,
    /// `TPM_NEEDS_SELFTEST`
    NeedsSelfTest = 0x801,
    /// `TPM_DOING_SELFTEST`
    DoingSelfTest = 0x802,
    /// `TPM_DEFEND_LOCK_RUNNING`
    DefendLockRunning = 0x803,
}

impl fmt::Display for ReturnCode {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Self::Success => write!(f, "TPM_SUCCESS"),
            Self::AuthFail => write!(f, "TPM_AUTHFAIL"),
            Self::BadIndex => write!(f, "TPM_BADINDEX"),
            Self::BadParameter => write!(f, "TPM_BAD_PARAMETER"),
            Self::AuditFailure => write!(f, "TPM_AUDITFAILURE"),
            Self::ClearDisabled => write!(f, "TPM_CLEAR_DISABLED"),
            Self::Deactivated => write!(f, "TPM_DEACTIVATED"),
            Self::Disabled => write!(f, "TPM_DISABLED"),
            Self::DisabledCmd => write!(f, "TPM_DISABLED_CMD"),
            Self::Fail => write!(f, "TPM_FAIL"),
            Self::BadOrdinal => write!(f, "TPM_BAD_ORDINAL"),
            Self::InstallDisabled => write!(f, "TPM_INSTALL_DISABLED"),
            Self::InvalidKeyHandle => write!(f, "TPM_INVALID_KEYHANDLE"),
            Self::KeyNotFound => write!(f, "TPM_KEYNOTFOUND"),
            Self::InappropriateEnc => write!(f, "TPM_INAPPROPRIATE_ENC"),
            Self::MigrateFail => write!(f, "TPM_MIGRATEFAIL"),
            Self::InvalidPcrInfo => write!(f, "TPM_INVALID_PCR_INFO"),
            Self::NoSpace => write!(f, "TPM_NOSPACE"),
            Self::NoSrk => write!(f, "TPM_NOSRK"),
            Self::NotSealedBlob => write!(f, "TPM_NOTSEALED_BLOB"),
            Self::OwnerSet => write!(f, "TPM_OWNER_SET"),
            Self::Resources => write!(f, "TPM_RESOURCES"),
            Self::ShortRandom => write!(f, "TPM_SHORTRANDOM"),
            Self::Size => write!(f, "TPM_SIZE"),
            Self::WrongPcrVal => write!(f, "TPM_WRONGPCRVAL"),
            Self::BadParamSize => write!(f, "TPM_BAD_PARAM_SIZE"),
            Self::ShaThread => write!(f, "TPM_SHA_THREAD"),
            Self::ShaError => write!(f, "TPM_SHA_ERROR"),
            Self::FailedSelfTest => write!(f, "TPM_FAILEDSELFTEST"),
            Self::Auth2Fail => write!(f, "TPM_AUTH2FAIL"),
            Self::BadTag => write!(f, "TPM_BADTAG"),
            Self::IoError => write!(f, "TPM_IOERROR"),
            Self::EncryptError => write!(f, "TPM_ENCRYPT_ERROR"),
            Self::DecryptError => write!(f, "TPM_DECRYPT_ERROR"),
            Self::InvalidAuthHandle => write!(f, "TPM_INVALID_AUTHHANDLE"),
            Self::NoEndorsement => write!(f, "TPM_NO_ENDORSEMENT"),
            Self::InvalidKeyUsage => write!(f, "TPM_INVALID_KEYUSAGE"),
            Self::WrongEntityType => write!(f, "TPM_WRONG_ENTITYTYPE"),
            Self::InvalidPostInit => write!(f, "TPM_INVALID_POSTINIT"),
            Self::InappropriateSig => write!(f, "TPM_INAPPROPRIATE_SIG"),
            Self::BadKeyProperty => write!(f, "TPM_BAD_KEY_PROPERTY"),
            Self::BadMigration => write!(f, "TPM_BAD_MIGRATION"),
            Self::BadScheme => write!(f, "TPM_BAD_SCHEME"),
            Self::BadDataSize => write!(f, "TPM_BAD_DATASIZE"),
            Self::BadMode => write!(f, "TPM_BAD_MODE"),
            Self::BadPresence => write!(f, "TPM_BAD_PRESENCE"),
            Self::BadVersion => write!(f, "TPM_BAD_VERSION"),
            Self::NoWrapTransport => write!(f, "TPM_NO_WRAP_TRANSPORT"),
            Self::AuditFailUnsuccessful => write!(f, "TPM_AUDITFAIL_UNSUCCESSFUL"),
            Self::AuditFailSuccessful => write!(f, "TPM_AUDITFAIL_SUCCESSFUL"),
            Self::NotResetable => write!(f, "TPM_NOTRESETABLE"),
            Self::NotLocal => write!(f, "TPM_NOTLOCAL"),
            Self::BadType => write!(f, "TPM_BAD_TYPE"),
            Self::InvalidResource => write!(f, "TPM_INVALID_RESOURCE"),
            Self::NotFips => write!(f, "TPM_NOTFIPS"),
            Self::InvalidFamily => write!(f, "TPM_INVALID_FAMILY"),
            Self::NoNvPermission => write!(f, "TPM_NO_NV_PERMISSION"),
            Self::RequiresSign => write!(f, "TPM_REQUIRES_SIGN"),
            Self::KeyNotSupported => write!(f, "TPM_KEY_NOTSUPPORTED"),
            Self::AuthConflict => write!(f, "TPM_AUTH_CONFLICT"),
            Self::AreaLocked => write!(f, "TPM_AREA_LOCKED"),
            Self::BadLocality => write!(f, "TPM_BAD_LOCALITY"),
            Self::ReadOnly => write!(f, "TPM_READ_ONLY"),
            Self::PerNoWrite => write!(f, "TPM_PER_NOWRITE"),
            Self::FamilyCount => write!(f, "TPM_FAMILYCOUNT"),
            Self::WriteLocked => write!(f, "TPM_WRITE_LOCKED"),
            Self::BadAttributes => write!(f, "TPM_BAD_ATTRIBUTES"),
            Self::InvalidStructure => write!(f, "TPM_INVALID_STRUCTURE"),
            Self::KeyOwnerControl => write!(f, "TPM_KEY_OWNER_CONTROL"),
            Self::BadCounter => write!(f, "TPM_BAD_COUNTER"),
            Self::NotFullWrite => write!(f, "TPM_NOT_FULLWRITE"),
            Self::ContextGap => write!(f, "TPM_CONTEXT_GAP"),
            Self::MaxNvWrites => write!(f, "TPM_MAXNVWRITES"),
            Self::NoOperator => write!(f, "TPM_NOOPERATOR"),
            Self::ResourceMissing => write!(f, "TPM_RESOURCEMISSING"),
            Self::DelegateLock => write!(f, "TPM_DELEGATE_LOCK"),
            Self::DelegateFamily => write!(f, "TPM_DELEGATE_FAMILY"),
            Self::DelegateAdmin => write!(f, "TPM_DELEGATE_ADMIN"),
            Self::TransportNotExclusive => write!(f, "TPM_TRANSPORT_NOTEXCLUSIVE"),
            Self::OwnerControl => write!(f, "TPM_OWNER_CONTROL"),
            Self::DaaResources => write!(f, "TPM_DAA_RESOURCES"),
            Self::DaaInputData0 => write!(f, "TPM_DAA_INPUT_DATA0"),
            Self::DaaInputData1 => write!(f, "TPM_DAA_INPUT_DATA1"),
            Self::DaaIssuerSettings => write!(f, "TPM_DAA_ISSUER_SETTINGS"),
            Self::DaaTpmSettings => write!(f, "TPM_DAA_TPM_SETTINGS"),
            Self::DaaStage => write!(f, "TPM_DAA_STAGE"),
            Self::DaaIssuerValidity => write!(f, "TPM_DAA_ISSUER_VALIDITY"),
            Self::DaaWrongW => write!(f, "TPM_DAA_WRONG_W"),
            Self::BadHandle => write!(f, "TPM_BAD_HANDLE"),
            Self::BadDelegate => write!(f, "TPM_BAD_DELEGATE"),
            Self::BadContext => write!(f, "TPM_BADCONTEXT"),
            Self::TooManyContexts => write!(f, "TPM_TOOMANYCONTEXTS"),
            Self::MaTicketSignature => write!(f, "TPM_MA_TICKET_SIGNATURE"),
            Self::MaDestination => write!(f, "TPM_MA_DESTINATION"),
            Self::MaSource => write!(f, "TPM_MA_SOURCE"),
            Self::MaAuthority => write!(f, "TPM_MA_AUTHORITY"),
            Self::PermanentEk => write!(f, "TPM_PERMANENTEK"),
            Self::BadSignature => write!(f, "TPM_BAD_SIGNATURE"),
            Self::NoContextSpace => write!(f, "TPM_NOCONTEXTSPACE"),
            Self::Retry => write!(f, "TPM_RETRY"),
            Self::NeedsSelfTest => write!(f, "TPM_NEEDS_SELFTEST"),
            Self::DoingSelfTest => write!(f, "TPM_DOING_SELFTEST"),
            Self::DefendLockRunning => write!(f, "TPM_DEFEND_LOCK_RUNNING"),
        }
    }
}
