pub mod mock;
pub mod traits;

pub use mock::{MockOrderer, MockPeerNetwork, OrdererBehavior, PeerBehavior, StreamEnd};
pub use traits::{CommitEventSubscription, CommitTransport, PeerDiscovery, PeerEndpoint, PeerTransport};
