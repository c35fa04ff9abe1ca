use crate::domain::{CommitResult, EndorsementResponse, PeerEndpoint, RoundPhase};
use crate::foundation::{EndorseError, PeerId, TxId};
use log::{debug, info, trace, warn};
use std::sync::Arc;

/// Hooks into endorsement rounds and commit submissions. Every method defaults to a no-op.
pub trait RoundObserver: Send + Sync {
    fn on_phase_changed(&self, _tx_id: &TxId, _from: RoundPhase, _to: RoundPhase) {}
    fn on_dispatched(&self, _tx_id: &TxId, _peer: &PeerEndpoint) {}
    fn on_response(&self, _tx_id: &TxId, _response: &EndorsementResponse) {}
    fn on_duplicate_dropped(&self, _tx_id: &TxId, _peer: &PeerId) {}
    fn on_peer_failed(&self, _tx_id: &TxId, _peer: &PeerId, _details: &str) {}
    fn on_quorate(&self, _tx_id: &TxId, _endorsements: usize) {}
    fn on_round_failed(&self, _tx_id: &TxId, _error: &EndorseError) {}
    fn on_commit_submitted(&self, _tx_id: &TxId) {}
    fn on_committed(&self, _result: &CommitResult) {}
    fn on_commit_failed(&self, _tx_id: &TxId, _error: &EndorseError) {}
}

pub struct NoopObserver;

impl RoundObserver for NoopObserver {}

pub struct CompositeObserver {
    observers: Vec<Arc<dyn RoundObserver>>,
}

impl CompositeObserver {
    pub fn new() -> Self {
        Self { observers: Vec::new() }
    }

    pub fn add_observer(&mut self, observer: Arc<dyn RoundObserver>) {
        self.observers.push(observer);
    }

    pub fn with_observer(mut self, observer: Arc<dyn RoundObserver>) -> Self {
        self.add_observer(observer);
        self
    }

    fn each(&self, hook: &str, f: impl Fn(&dyn RoundObserver)) {
        trace!("{} dispatch observer_count={}", hook, self.observers.len());
        for observer in &self.observers {
            f(observer.as_ref());
        }
    }
}

impl Default for CompositeObserver {
    fn default() -> Self {
        Self::new()
    }
}

impl RoundObserver for CompositeObserver {
    fn on_phase_changed(&self, tx_id: &TxId, from: RoundPhase, to: RoundPhase) {
        self.each("on_phase_changed", |observer| observer.on_phase_changed(tx_id, from, to));
    }

    fn on_dispatched(&self, tx_id: &TxId, peer: &PeerEndpoint) {
        self.each("on_dispatched", |observer| observer.on_dispatched(tx_id, peer));
    }

    fn on_response(&self, tx_id: &TxId, response: &EndorsementResponse) {
        self.each("on_response", |observer| observer.on_response(tx_id, response));
    }

    fn on_duplicate_dropped(&self, tx_id: &TxId, peer: &PeerId) {
        self.each("on_duplicate_dropped", |observer| observer.on_duplicate_dropped(tx_id, peer));
    }

    fn on_peer_failed(&self, tx_id: &TxId, peer: &PeerId, details: &str) {
        self.each("on_peer_failed", |observer| observer.on_peer_failed(tx_id, peer, details));
    }

    fn on_quorate(&self, tx_id: &TxId, endorsements: usize) {
        self.each("on_quorate", |observer| observer.on_quorate(tx_id, endorsements));
    }

    fn on_round_failed(&self, tx_id: &TxId, error: &EndorseError) {
        self.each("on_round_failed", |observer| observer.on_round_failed(tx_id, error));
    }

    fn on_commit_submitted(&self, tx_id: &TxId) {
        self.each("on_commit_submitted", |observer| observer.on_commit_submitted(tx_id));
    }

    fn on_committed(&self, result: &CommitResult) {
        self.each("on_committed", |observer| observer.on_committed(result));
    }

    fn on_commit_failed(&self, tx_id: &TxId, error: &EndorseError) {
        self.each("on_commit_failed", |observer| observer.on_commit_failed(tx_id, error));
    }
}

/// Writes every hook to the `log` facade.
pub struct LoggingObserver;

impl RoundObserver for LoggingObserver {
    fn on_phase_changed(&self, tx_id: &TxId, from: RoundPhase, to: RoundPhase) {
        debug!("round phase changed tx_id={} from={} to={}", tx_id, from, to);
    }

    fn on_dispatched(&self, tx_id: &TxId, peer: &PeerEndpoint) {
        trace!("proposal dispatched tx_id={} peer={} url={}", tx_id, peer.name, peer.url);
    }

    fn on_response(&self, tx_id: &TxId, response: &EndorsementResponse) {
        match response.rejection_reason() {
            Some(reason) => warn!("peer rejected proposal tx_id={} peer={} reason={}", tx_id, response.peer, reason),
            None => debug!("endorsement received tx_id={} peer={} msp_id={}", tx_id, response.peer, response.msp_id),
        }
    }

    fn on_duplicate_dropped(&self, tx_id: &TxId, peer: &PeerId) {
        debug!("duplicate response dropped tx_id={} peer={}", tx_id, peer);
    }

    fn on_peer_failed(&self, tx_id: &TxId, peer: &PeerId, details: &str) {
        warn!("peer call failed tx_id={} peer={} details={}", tx_id, peer, details);
    }

    fn on_quorate(&self, tx_id: &TxId, endorsements: usize) {
        info!("endorsement quorum reached tx_id={} endorsements={}", tx_id, endorsements);
    }

    fn on_round_failed(&self, tx_id: &TxId, error: &EndorseError) {
        warn!("endorsement round failed tx_id={} code={:?} error={}", tx_id, error.code(), error);
    }

    fn on_commit_submitted(&self, tx_id: &TxId) {
        info!("commit submitted tx_id={}", tx_id);
    }

    fn on_committed(&self, result: &CommitResult) {
        info!(
            "transaction committed tx_id={} strategy={:?} block={:?} committed_by={}",
            result.tx_id,
            result.strategy,
            result.block_number,
            result.committed_by.len()
        );
    }

    fn on_commit_failed(&self, tx_id: &TxId, error: &EndorseError) {
        if error.is_outcome_unknown() {
            warn!("commit outcome unknown tx_id={} error={}", tx_id, error);
        } else {
            warn!("commit failed tx_id={} code={:?} error={}", tx_id, error.code(), error);
        }
    }
}
