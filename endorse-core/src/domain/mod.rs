pub mod commit;
pub mod digest;
pub mod endorsement;
pub mod proposal;
pub mod signature;

pub use commit::{
    build_commit, CommitAck, CommitAckStatus, CommitEvent, CommitResult, CommitStrategy, CommitTracker, SignedCommitTransaction,
    UnsignedCommitTransaction, ValidationCode,
};
pub use digest::DigestEngine;
pub use endorsement::{
    EndorsementPolicy, EndorsementResponse, EndorsementSet, EndorsementStatus, PeerEndpoint, QuorumDecision, QuorumRule, RoundPhase,
};
pub use proposal::{Identity, InvocationRequest, ProposalAssembler, SignedProposal, UnsignedProposal};
pub use signature::{Signature, SignatureEngine};
