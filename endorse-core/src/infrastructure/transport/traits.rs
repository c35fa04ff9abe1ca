use crate::domain::{CommitAck, CommitEvent, EndorsementResponse, SignedCommitTransaction, SignedProposal};
use crate::foundation::{ChannelId, MspId, Result, TxId};
use async_trait::async_trait;
use futures_util::stream::BoxStream;
use futures_util::StreamExt;
use std::collections::BTreeSet;

pub use crate::domain::PeerEndpoint;

/// Commit events for one transaction, in delivery order. `None` means the stream closed.
pub struct CommitEventSubscription {
    inner: BoxStream<'static, Result<CommitEvent>>,
    _keepalive: Option<Box<dyn std::any::Any + Send>>,
}

impl CommitEventSubscription {
    pub fn new(inner: BoxStream<'static, Result<CommitEvent>>) -> Self {
        Self { inner, _keepalive: None }
    }

    pub fn new_with_keepalive(inner: BoxStream<'static, Result<CommitEvent>>, keepalive: Box<dyn std::any::Any + Send>) -> Self {
        Self { inner, _keepalive: Some(keepalive) }
    }

    pub async fn next(&mut self) -> Option<Result<CommitEvent>> {
        self.inner.next().await
    }
}

#[async_trait]
pub trait PeerDiscovery: Send + Sync {
    /// Endorsing peers on `channel`. An empty `organizations` set means every organization.
    async fn discover_peers(&self, channel: &ChannelId, organizations: &BTreeSet<MspId>) -> Result<Vec<PeerEndpoint>>;
}

#[async_trait]
pub trait PeerTransport: Send + Sync {
    /// `Ok` carries the peer's answer, including application rejections.
    /// `Err` means the peer could not be reached or the call failed in transit.
    async fn send_proposal(&self, peer: &PeerEndpoint, proposal: &SignedProposal) -> Result<EndorsementResponse>;
}

#[async_trait]
pub trait CommitTransport: Send + Sync {
    async fn submit_commit(&self, transaction: &SignedCommitTransaction) -> Result<CommitAck>;

    /// Subscribe before submitting so no event can be missed.
    async fn commit_events(&self, tx_id: &TxId) -> Result<CommitEventSubscription>;
}
