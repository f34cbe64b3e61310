//! Issuer file framing: the 4 byte header, the ECDSA-signed envelope and the CA certificate that
//! authenticates envelopes.
//!
//! A signed file is `header || payload || r || s` where `(r, s)` is an ECDSA P-256 / SHA-256
//! signature over `header || payload` made by the issuing CA. Nothing in the payload is looked at
//! before the signature verifies.

use crate::error::EpidError;
use ark_std::vec::Vec;
use epid_math::{
    ecc::NamedCurve,
    ecdsa::{Ecdsa, EcdsaPublicKey, EcdsaSignature},
    MathError,
};
use epid_utils::{ByteReader, ByteWriter};
use serde::{Deserialize, Serialize};

/// Version bytes every file starts with.
pub const EPID_VERSION: [u8; 2] = [0x02, 0x00];
pub const HEADER_SIZE: usize = 4;
/// `r || s` of an ECDSA P-256 signature.
pub const ENVELOPE_SIG_SIZE: usize = 64;
const CA_KEY_SIZE: usize = 64;
const CA_DOMAIN_SIZE: usize = 6 * 32;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum FileType {
    IssuingCaPubKey,
    GroupPubKey,
    PrivRl,
    SigRl,
    GroupRl,
    /// Exported by verifiers and never signed.
    VerifierRl,
}

impl FileType {
    pub fn code(self) -> u16 {
        match self {
            FileType::GroupPubKey => 0x000C,
            FileType::PrivRl => 0x000D,
            FileType::SigRl => 0x000E,
            FileType::GroupRl => 0x000F,
            FileType::VerifierRl => 0x0010,
            FileType::IssuingCaPubKey => 0x0011,
        }
    }

    pub fn from_code(code: u16) -> Option<Self> {
        match code {
            0x000C => Some(FileType::GroupPubKey),
            0x000D => Some(FileType::PrivRl),
            0x000E => Some(FileType::SigRl),
            0x000F => Some(FileType::GroupRl),
            0x0010 => Some(FileType::VerifierRl),
            0x0011 => Some(FileType::IssuingCaPubKey),
            _ => None,
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct FileHeader {
    pub version: [u8; 2],
    pub file_type: FileType,
}

impl FileHeader {
    pub fn new(file_type: FileType) -> Self {
        Self {
            version: EPID_VERSION,
            file_type,
        }
    }

    /// Reads a header and checks it is a current-version header of type `expected`.
    pub fn read_expecting(r: &mut ByteReader<'_>, expected: FileType) -> Result<Self, EpidError> {
        let version: [u8; 2] = r.read_array()?;
        let file_type = FileType::from_code(r.read_u16()?).ok_or(EpidError::BadArg)?;
        if version != EPID_VERSION || file_type != expected {
            return Err(EpidError::BadArg);
        }
        Ok(Self { version, file_type })
    }

    pub fn write(&self, w: &mut ByteWriter) {
        w.put(&self.version).put_u16(self.file_type.code());
    }

    pub fn to_bytes(&self) -> [u8; HEADER_SIZE] {
        let c = self.file_type.code().to_be_bytes();
        [self.version[0], self.version[1], c[0], c[1]]
    }
}

/// Total size of a signed file around a payload of `payload_len` bytes.
pub const fn envelope_size(payload_len: usize) -> usize {
    HEADER_SIZE + payload_len + ENVELOPE_SIG_SIZE
}

/// The issuing CA's P-256 public key, in the self-signed certificate form distributed to members
/// and verifiers.
#[derive(Clone, Debug)]
pub struct CaCertificate {
    public_key: EcdsaPublicKey,
    signature: EcdsaSignature,
    ecdsa: Ecdsa,
}

impl CaCertificate {
    /// `header || x || y || prime || a || b || gx || gy || order || r || s`
    pub const SIZE: usize = envelope_size(CA_KEY_SIZE + CA_DOMAIN_SIZE);

    /// Parses a certificate, checks its curve is P-256 and verifies its self-signature.
    pub fn parse(bytes: &[u8]) -> Result<Self, EpidError> {
        if bytes.len() != Self::SIZE {
            return Err(EpidError::BadArg);
        }
        let ecdsa = Ecdsa::new(NamedCurve::P256)?;
        let mut r = ByteReader::new(bytes);
        FileHeader::read_expecting(&mut r, FileType::IssuingCaPubKey)?;
        let public_key = ecdsa
            .public_key_from_bytes(r.take(CA_KEY_SIZE)?)
            .map_err(|_| EpidError::BadArg)?;
        if r.take(CA_DOMAIN_SIZE)? != ecdsa.curve().domain_to_bytes()?.as_slice() {
            return Err(EpidError::BadArg);
        }
        let signature = ecdsa.signature_from_bytes(r.take(ENVELOPE_SIG_SIZE)?)?;
        r.finish()?;
        let cert = Self {
            public_key,
            signature,
            ecdsa,
        };
        cert.check_signature(&bytes[..Self::SIZE - ENVELOPE_SIG_SIZE], &cert.signature)?;
        Ok(cert)
    }

    pub(crate) fn from_parts(
        public_key: EcdsaPublicKey,
        signature: EcdsaSignature,
        ecdsa: Ecdsa,
    ) -> Self {
        Self {
            public_key,
            signature,
            ecdsa,
        }
    }

    /// The signed part of a certificate for `public_key`.
    pub(crate) fn signed_part(ecdsa: &Ecdsa, public_key: &EcdsaPublicKey) -> Result<Vec<u8>, EpidError> {
        let mut w = ByteWriter::with_capacity(Self::SIZE);
        FileHeader::new(FileType::IssuingCaPubKey).write(&mut w);
        w.put(public_key.as_bytes());
        w.put(&ecdsa.curve().domain_to_bytes()?);
        Ok(w.into_inner())
    }

    pub fn public_key(&self) -> &EcdsaPublicKey {
        &self.public_key
    }

    pub fn to_bytes(&self) -> Result<Vec<u8>, EpidError> {
        let mut out = Self::signed_part(&self.ecdsa, &self.public_key)?;
        out.extend_from_slice(self.signature.as_bytes());
        Ok(out)
    }

    /// Authenticates a signed file of type `expected` and returns its payload.
    ///
    /// A wrong length, version or type gives [`EpidError::BadArg`], a signature that does not
    /// verify gives [`EpidError::SigInvalid`].
    pub fn open_envelope<'b>(
        &self,
        bytes: &'b [u8],
        expected: FileType,
    ) -> Result<&'b [u8], EpidError> {
        if bytes.len() < envelope_size(0) {
            return Err(EpidError::BadArg);
        }
        FileHeader::read_expecting(&mut ByteReader::new(bytes), expected)?;
        let (signed, sig) = bytes.split_at(bytes.len() - ENVELOPE_SIG_SIZE);
        let sig = self.ecdsa.signature_from_bytes(sig)?;
        self.check_signature(signed, &sig)?;
        Ok(&signed[HEADER_SIZE..])
    }

    fn check_signature(&self, msg: &[u8], sig: &EcdsaSignature) -> Result<(), EpidError> {
        match self.ecdsa.verify(&self.public_key, msg, sig) {
            Ok(()) => Ok(()),
            Err(MathError::InvalidSignature) => Err(EpidError::SigInvalid),
            Err(e) => Err(e.into()),
        }
    }
}
