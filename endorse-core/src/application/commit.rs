use crate::application::lifecycle::{NoopObserver, RoundObserver};
use crate::domain::{
    build_commit, CommitAckStatus, CommitResult, CommitTracker, EndorsementResponse, PeerEndpoint, SignatureEngine, SignedCommitTransaction,
    UnsignedCommitTransaction, UnsignedProposal,
};
use crate::foundation::{CommitError, EndorseError, KeyMaterial, MspId, Result, TxId};
use crate::infrastructure::config::CommitConfig;
use crate::infrastructure::transport::CommitTransport;
use log::{debug, info};
use std::sync::Arc;
use tokio::time::timeout;

/// Builds, signs and submits commit transactions.
pub struct CommitCoordinator {
    transport: Arc<dyn CommitTransport>,
    config: CommitConfig,
    engine: SignatureEngine,
    observer: Arc<dyn RoundObserver>,
}

impl CommitCoordinator {
    pub fn new(transport: Arc<dyn CommitTransport>, config: CommitConfig) -> Self {
        Self { transport, config, engine: SignatureEngine::new(), observer: Arc::new(NoopObserver) }
    }

    pub fn with_observer(mut self, observer: Arc<dyn RoundObserver>) -> Self {
        self.observer = observer;
        self
    }

    pub fn config(&self) -> &CommitConfig {
        &self.config
    }

    /// The endorsements must already satisfy the round's policy; see [`build_commit`].
    pub fn build_commit(&self, proposal: UnsignedProposal, endorsements: Vec<EndorsementResponse>) -> Result<UnsignedCommitTransaction> {
        let transaction = build_commit(proposal, endorsements)?;
        debug!("commit transaction built tx_id={} endorsements={}", transaction.tx_id(), transaction.endorsements().len());
        Ok(transaction)
    }

    pub fn sign(&self, transaction: UnsignedCommitTransaction, key: &KeyMaterial) -> Result<SignedCommitTransaction> {
        let signature = self.engine.sign_canonical(&transaction.digest(), key)?;
        Ok(SignedCommitTransaction::new(transaction, signature)?)
    }

    /// Submit and wait for the configured commit strategy.
    ///
    /// `own_msp` and `peers` define the event scope. Everything from subscription to the last
    /// awaited event shares one timeout; running out of it yields `CommitError::Timeout`, which
    /// means the transaction may still commit.
    pub async fn submit(&self, transaction: &SignedCommitTransaction, own_msp: &MspId, peers: &[PeerEndpoint]) -> Result<CommitResult> {
        let tx_id = transaction.tx_id();
        let commit_timeout = self.config.timeout();
        let tracker = CommitTracker::new(tx_id, self.config.strategy, own_msp, peers);
        debug!("submitting commit tx_id={} strategy={:?} scope={}", tx_id, self.config.strategy, tracker.scope().len());

        let result = match timeout(commit_timeout, self.submit_and_wait(transaction, tracker)).await {
            Ok(result) => result,
            Err(_) => Err(CommitError::Timeout { tx_id, waited_ms: commit_timeout.as_millis() as u64 }.into()),
        };
        match &result {
            Ok(committed) => self.observer.on_committed(committed),
            Err(err) => self.observer.on_commit_failed(&tx_id, err),
        }
        result
    }

    async fn submit_and_wait(&self, transaction: &SignedCommitTransaction, mut tracker: CommitTracker) -> Result<CommitResult> {
        let tx_id = transaction.tx_id();
        let mut events = if tracker.requires_events() {
            Some(self.transport.commit_events(&tx_id).await.map_err(|err| transport_error(tx_id, err))?)
        } else {
            None
        };

        let ack = self.transport.submit_commit(transaction).await.map_err(|err| transport_error(tx_id, err))?;
        self.observer.on_commit_submitted(&tx_id);
        if ack.tx_id != tx_id {
            return Err(CommitError::AckMismatch { tx_id, acknowledged: ack.tx_id }.into());
        }
        if let CommitAckStatus::Rejected { reason } = ack.status {
            return Err(CommitError::Rejected { tx_id, reason }.into());
        }
        info!("commit accepted by orderer tx_id={}", tx_id);

        let Some(events) = events.as_mut() else {
            return Ok(tracker.into_result());
        };
        while !tracker.is_complete() {
            match events.next().await {
                Some(Ok(event)) => {
                    debug!("commit event tx_id={} peer={} block={}", tx_id, event.peer, event.block_number);
                    tracker.observe(&event)?;
                }
                Some(Err(err)) => return Err(stream_error(tx_id, err)),
                None => return Err(CommitError::EventStreamClosed { tx_id }.into()),
            }
        }
        Ok(tracker.into_result())
    }
}

// Before the ack nothing was delivered, so a failure is a plain transport error.
fn transport_error(tx_id: TxId, err: EndorseError) -> EndorseError {
    match err {
        EndorseError::Commit(_) => err,
        other => CommitError::Transport { tx_id, details: other.to_string() }.into(),
    }
}

// After the ack only a definite rejection keeps its meaning; anything else leaves the outcome open.
fn stream_error(tx_id: TxId, err: EndorseError) -> EndorseError {
    match err {
        EndorseError::Commit(CommitError::Rejected { .. }) => err,
        other => CommitError::EventStreamFailed { tx_id, details: other.to_string() }.into(),
    }
}
