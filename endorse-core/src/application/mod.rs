//! Application layer: async orchestration across domain logic and infrastructure I/O.

pub mod commit;
pub mod endorsement;
pub mod gateway;
pub mod lifecycle;

pub use commit::CommitCoordinator;
pub use endorsement::{EndorsementCoordinator, QuorateRound};
pub use gateway::{Gateway, SubmitResult};
pub use lifecycle::{CompositeObserver, LoggingObserver, NoopObserver, RoundObserver};
