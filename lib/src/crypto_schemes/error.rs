use thiserror::Error;

/// Every way a registration or counting request can be refused.
///
/// None of these are fatal to the authority: each one aborts the single request that raised it
/// before any shared state has been touched.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum VotingError {
    #[error("message encodes to an integer that does not fit below the modulus")]
    EncodingTooLarge,

    #[error("blinding factor is not invertible modulo n")]
    NonInvertibleFactor,

    #[error("failed to encrypt payload: {0}")]
    EncryptionFailure(String),

    #[error("failed to decrypt payload")]
    DecryptionFailure,

    #[error("ballot signature did not verify")]
    SignatureVerificationFailure,

    #[error("ballot is not of the form ballot_id|voter_id|candidate")]
    MalformedBallotFormat,

    #[error("voter is not on the roster")]
    UnknownVoter,

    #[error("voter has already registered a ballot")]
    AlreadyRegisteredVoter,

    #[error("candidate index {0:?} is out of range")]
    InvalidCandidateIndex(String),

    #[error("ballot {0} has already been counted")]
    DuplicateBallotID(String),

    #[error("key generation failed: {0}")]
    KeyGeneration(String),

    #[error("invalid election config: {0}")]
    Config(String),
}

pub type Result<T, E = VotingError> = std::result::Result<T, E>;

impl From<rsa::Error> for VotingError {
    fn from(e: rsa::Error) -> Self {
        VotingError::KeyGeneration(e.to_string())
    }
}
