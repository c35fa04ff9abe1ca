mod outcome;
mod transaction;

pub use outcome::{CommitAck, CommitAckStatus, CommitEvent, CommitResult, CommitStrategy, CommitTracker, ValidationCode};
pub use transaction::{build_commit, SignedCommitTransaction, UnsignedCommitTransaction};
