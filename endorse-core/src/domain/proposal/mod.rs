mod assembler;
mod types;

pub(crate) use assembler::encode;
pub use assembler::ProposalAssembler;
pub use types::{Identity, InvocationRequest, Nonce, SignedProposal, UnsignedProposal};
