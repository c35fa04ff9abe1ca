use crate::foundation::types::{ChannelId, IdentityRef, MspId, PeerId, TxId};
use std::fmt;
use thiserror::Error;

pub type Result<T> = std::result::Result<T, EndorseError>;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCode {
    InvalidKey,
    SignatureEncoding,
    InvalidRequest,
    ProposalEncoding,
    NoPeersAvailable,
    DiscoveryUnavailable,
    PeerRejected,
    PolicyNotSatisfied,
    CommitTimeout,
    CommitRejected,
    CommitTransport,
    CommitEventStreamClosed,
    CommitEventStreamFailed,
    CommitAckMismatch,
    InvalidEndorsements,
    IdentityNotFound,
    InvalidStateTransition,
    ConfigError,
    SerializationError,
    Message,
}

/// Pipeline stage an error originated from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorPhase {
    Signing,
    Assembly,
    Discovery,
    Endorsement,
    Commit,
    Identity,
    Config,
    Internal,
}

impl fmt::Display for ErrorPhase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ErrorPhase::Signing => "signing",
            ErrorPhase::Assembly => "assembly",
            ErrorPhase::Discovery => "discovery",
            ErrorPhase::Endorsement => "endorsement",
            ErrorPhase::Commit => "commit",
            ErrorPhase::Identity => "identity",
            ErrorPhase::Config => "config",
            ErrorPhase::Internal => "internal",
        };
        f.write_str(name)
    }
}

#[derive(Debug, Clone)]
pub struct ErrorContext {
    pub code: ErrorCode,
    pub phase: ErrorPhase,
    pub message: String,
    pub retryable: bool,
}

/// A peer that could not be reached or answered with a transport-level failure.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PeerFailure {
    pub peer: PeerId,
    pub details: String,
}

impl fmt::Display for PeerFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.peer, self.details)
    }
}

/// Key handling and signature serialization failures. Never retried.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SigningError {
    #[error("invalid key material: {reason}")]
    InvalidKey { reason: String },

    #[error("signature encoding error: {reason}")]
    EncodingError { reason: String },
}

impl SigningError {
    pub fn invalid_key(reason: impl Into<String>) -> Self {
        SigningError::InvalidKey { reason: reason.into() }
    }

    pub fn encoding(reason: impl Into<String>) -> Self {
        SigningError::EncodingError { reason: reason.into() }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AssemblyError {
    #[error("invalid invocation request: {reason}")]
    InvalidRequest { reason: String },

    #[error("proposal encoding failed: {details}")]
    Encoding { details: String },
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DiscoveryError {
    #[error("no endorsing peers available on channel {channel}")]
    NoPeersAvailable { channel: ChannelId },

    #[error("peer discovery unavailable on channel {channel}: {details}")]
    Unavailable { channel: ChannelId, details: String },
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum EndorsementError {
    #[error("peer {peer} rejected the proposal: {reason}")]
    PeerRejected { peer: PeerId, reason: String },

    #[error(
        "endorsement policy not satisfied: policy={policy} endorsements={endorsements} timed_out={timed_out} failed_peers={}",
        .failures.len()
    )]
    PolicyNotSatisfied { policy: String, satisfied_orgs: Vec<MspId>, endorsements: usize, timed_out: bool, failures: Vec<PeerFailure> },
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CommitError {
    /// No acknowledgement within the commit timeout. The ledger state is unknown.
    #[error("commit outcome unknown for tx {tx_id}: no result within {waited_ms}ms")]
    Timeout { tx_id: TxId, waited_ms: u64 },

    #[error("commit rejected for tx {tx_id}: {reason}")]
    Rejected { tx_id: TxId, reason: String },

    /// The transaction was not delivered to the orderer.
    #[error("commit transport error for tx {tx_id}: {details}")]
    Transport { tx_id: TxId, details: String },

    /// The orderer accepted the transaction but the event stream ended first.
    #[error("commit event stream closed before tx {tx_id} was observed")]
    EventStreamClosed { tx_id: TxId },

    /// The orderer accepted the transaction but the event stream then failed.
    #[error("commit outcome unknown for tx {tx_id}: event stream failed: {details}")]
    EventStreamFailed { tx_id: TxId, details: String },

    /// The submission went out but the orderer acknowledged a different transaction.
    #[error("commit outcome unknown for tx {tx_id}: acknowledgement is for tx {acknowledged}")]
    AckMismatch { tx_id: TxId, acknowledged: TxId },

    #[error("invalid endorsements for commit: {reason}")]
    InvalidEndorsements { reason: String },
}

#[derive(Debug, Error)]
pub enum EndorseError {
    #[error(transparent)]
    Signing(#[from] SigningError),

    #[error(transparent)]
    Assembly(#[from] AssemblyError),

    #[error(transparent)]
    Discovery(#[from] DiscoveryError),

    #[error(transparent)]
    Endorsement(#[from] EndorsementError),

    #[error(transparent)]
    Commit(#[from] CommitError),

    #[error("identity not found: {0}")]
    IdentityNotFound(IdentityRef),

    #[error("invalid state transition: {from} -> {to}")]
    InvalidStateTransition { from: String, to: String },

    #[error("configuration error: {0}")]
    ConfigError(String),

    #[error("{format} serialization error: {details}")]
    SerializationError { format: String, details: String },

    #[error("{0}")]
    Message(String),
}

impl EndorseError {
    pub fn code(&self) -> ErrorCode {
        match self {
            EndorseError::Signing(SigningError::InvalidKey { .. }) => ErrorCode::InvalidKey,
            EndorseError::Signing(SigningError::EncodingError { .. }) => ErrorCode::SignatureEncoding,
            EndorseError::Assembly(AssemblyError::InvalidRequest { .. }) => ErrorCode::InvalidRequest,
            EndorseError::Assembly(AssemblyError::Encoding { .. }) => ErrorCode::ProposalEncoding,
            EndorseError::Discovery(DiscoveryError::NoPeersAvailable { .. }) => ErrorCode::NoPeersAvailable,
            EndorseError::Discovery(DiscoveryError::Unavailable { .. }) => ErrorCode::DiscoveryUnavailable,
            EndorseError::Endorsement(EndorsementError::PeerRejected { .. }) => ErrorCode::PeerRejected,
            EndorseError::Endorsement(EndorsementError::PolicyNotSatisfied { .. }) => ErrorCode::PolicyNotSatisfied,
            EndorseError::Commit(CommitError::Timeout { .. }) => ErrorCode::CommitTimeout,
            EndorseError::Commit(CommitError::Rejected { .. }) => ErrorCode::CommitRejected,
            EndorseError::Commit(CommitError::Transport { .. }) => ErrorCode::CommitTransport,
            EndorseError::Commit(CommitError::EventStreamClosed { .. }) => ErrorCode::CommitEventStreamClosed,
            EndorseError::Commit(CommitError::EventStreamFailed { .. }) => ErrorCode::CommitEventStreamFailed,
            EndorseError::Commit(CommitError::AckMismatch { .. }) => ErrorCode::CommitAckMismatch,
            EndorseError::Commit(CommitError::InvalidEndorsements { .. }) => ErrorCode::InvalidEndorsements,
            EndorseError::IdentityNotFound(_) => ErrorCode::IdentityNotFound,
            EndorseError::InvalidStateTransition { .. } => ErrorCode::InvalidStateTransition,
            EndorseError::ConfigError(_) => ErrorCode::ConfigError,
            EndorseError::SerializationError { .. } => ErrorCode::SerializationError,
            EndorseError::Message(_) => ErrorCode::Message,
        }
    }

    pub fn phase(&self) -> ErrorPhase {
        match self {
            EndorseError::Signing(_) => ErrorPhase::Signing,
            EndorseError::Assembly(_) => ErrorPhase::Assembly,
            EndorseError::Discovery(_) => ErrorPhase::Discovery,
            EndorseError::Endorsement(_) => ErrorPhase::Endorsement,
            EndorseError::Commit(_) => ErrorPhase::Commit,
            EndorseError::IdentityNotFound(_) => ErrorPhase::Identity,
            EndorseError::ConfigError(_) => ErrorPhase::Config,
            EndorseError::InvalidStateTransition { .. } | EndorseError::SerializationError { .. } | EndorseError::Message(_) => {
                ErrorPhase::Internal
            }
        }
    }

    /// Network-origin failures where retrying the same step may succeed.
    ///
    /// Signing and assembly failures are configuration or programming errors; a peer rejection or
    /// unsatisfied policy needs a new round decided by the caller, not a blind retry.
    pub fn is_retryable(&self) -> bool {
        matches!(self, EndorseError::Discovery(_) | EndorseError::Commit(CommitError::Transport { .. }))
    }

    /// The transaction may or may not have been committed. Resubmitting risks a duplicate.
    pub fn is_outcome_unknown(&self) -> bool {
        matches!(
            self,
            EndorseError::Commit(
                CommitError::Timeout { .. }
                    | CommitError::EventStreamClosed { .. }
                    | CommitError::EventStreamFailed { .. }
                    | CommitError::AckMismatch { .. }
            )
        )
    }

    pub fn context(&self) -> ErrorContext {
        ErrorContext { code: self.code(), phase: self.phase(), message: self.to_string(), retryable: self.is_retryable() }
    }

    pub fn invalid_request(reason: impl Into<String>) -> Self {
        EndorseError::Assembly(AssemblyError::InvalidRequest { reason: reason.into() })
    }

    pub fn config(reason: impl Into<String>) -> Self {
        EndorseError::ConfigError(reason.into())
    }
}

impl From<hex::FromHexError> for EndorseError {
    fn from(err: hex::FromHexError) -> Self {
        EndorseError::SerializationError { format: "hex".to_string(), details: err.to_string() }
    }
}

impl From<bincode::Error> for EndorseError {
    fn from(err: bincode::Error) -> Self {
        EndorseError::SerializationError { format: "bincode".to_string(), details: err.to_string() }
    }
}

impl From<serde_json::Error> for EndorseError {
    fn from(err: serde_json::Error) -> Self {
        EndorseError::SerializationError { format: "json".to_string(), details: err.to_string() }
    }
}

impl From<toml::de::Error> for EndorseError {
    fn from(err: toml::de::Error) -> Self {
        EndorseError::ConfigError(format!("TOML parsing error: {}", err))
    }
}

impl From<toml::ser::Error> for EndorseError {
    fn from(err: toml::ser::Error) -> Self {
        EndorseError::SerializationError { format: "toml".to_string(), details: err.to_string() }
    }
}
