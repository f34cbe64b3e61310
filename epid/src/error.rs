use ark_serialize::SerializationError;
use epid_math::MathError;
use epid_utils::CodecError;

/// Status of every fallible protocol, parser and context operation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EpidError {
    Unspecified,
    /// Malformed input or an argument that breaks an operation's contract.
    BadArg,
    MemAlloc,
    /// A caller supplied buffer is too small.
    NoMemory,
    Math,
    DivideByZero,
    HashNotSupported,
    /// Random sampling gave up after its bounded number of attempts.
    RandMaxIter,
    Duplicate,
    /// The operation needs a basename and none is set, or the one set does not fit.
    InconsistentBasename,
    /// A signature, proof or file envelope failed to verify.
    SigInvalid,
    SigRevokedInGroupRl,
    SigRevokedInPrivRl,
    SigRevokedInSigRl,
    SigRevokedInVerifierRl,
}

impl From<MathError> for EpidError {
    fn from(e: MathError) -> Self {
        match e {
            MathError::DivideByZero => Self::DivideByZero,
            MathError::RandMaxIter => Self::RandMaxIter,
            _ => Self::Math,
        }
    }
}

impl From<CodecError> for EpidError {
    fn from(_: CodecError) -> Self {
        Self::BadArg
    }
}

impl From<SerializationError> for EpidError {
    fn from(_: SerializationError) -> Self {
        Self::BadArg
    }
}
