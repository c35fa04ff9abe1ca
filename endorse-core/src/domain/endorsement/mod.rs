mod aggregation;
mod peer;
mod policy;
mod response;
mod round;

pub use aggregation::{EndorsementSet, QuorumDecision};
pub use peer::PeerEndpoint;
pub use policy::{EndorsementPolicy, QuorumRule};
pub use response::{EndorsementResponse, EndorsementStatus};
pub use round::RoundPhase;
