use crate::fixtures::{endorsing_network, gateway, peer, test_config, transfer_request, Recorded, RecordingObserver, ORG1_MSP, ORG2_MSP};
use endorse_core::application::Gateway;
use endorse_core::domain::{CommitStrategy, ValidationCode};
use endorse_core::foundation::{CommitError, EndorseError, ErrorCode, PeerId};
use endorse_core::infrastructure::config::AppConfig;
use endorse_core::infrastructure::transport::{MockOrderer, OrdererBehavior, StreamEnd};
use std::sync::Arc;

fn committing_orderer() -> MockOrderer {
    MockOrderer::new().with_committer(peer("peer0.org1", ORG1_MSP), ValidationCode::Valid).with_committer(peer("peer0.org2", ORG2_MSP), ValidationCode::Valid)
}

fn gateway_with(config: &AppConfig, orderer: &Arc<MockOrderer>) -> (Gateway, Arc<RecordingObserver>) {
    let observer = Arc::new(RecordingObserver::default());
    let gateway = gateway(config, endorsing_network(), orderer.clone()).with_observer(observer.clone());
    (gateway, observer)
}

#[tokio::test]
async fn test_submit_when_own_org_commits_then_result_reports_block() {
    let orderer = Arc::new(committing_orderer());
    let (gateway, observer) = gateway_with(&test_config(), &orderer);

    let result = gateway.submit(&transfer_request()).await.expect("committed");

    assert_eq!(result.commit.strategy, CommitStrategy::MspScopeAllForTx);
    assert_eq!(result.commit.committed_by, vec![PeerId::from("peer0.org1")]);
    assert_eq!(result.commit.block_number, Some(1));
    assert_eq!(orderer.submissions(), vec![result.tx_id]);
    assert_eq!(orderer.subscriptions(), 1);
    let events = observer.events();
    assert!(events.contains(&Recorded::CommitSubmitted(result.tx_id)));
    assert!(events.contains(&Recorded::Committed(result.tx_id)));
}

#[tokio::test]
async fn test_submit_when_network_scope_all_then_waits_for_every_endorser() {
    let orderer = Arc::new(committing_orderer().with_committer(peer("peer0.org3", "Org3MSP"), ValidationCode::Valid));
    let mut config = test_config();
    config.commit.strategy = CommitStrategy::NetworkScopeAllForTx;
    let (gateway, _) = gateway_with(&config, &orderer);

    let result = gateway.submit(&transfer_request()).await.expect("committed");

    assert_eq!(result.commit.committed_by.len(), 3);
}

#[tokio::test]
async fn test_submit_when_strategy_none_then_returns_on_ack_without_subscribing() {
    let orderer = Arc::new(MockOrderer::new());
    let mut config = test_config();
    config.commit.strategy = CommitStrategy::None;
    let (gateway, _) = gateway_with(&config, &orderer);

    let result = gateway.submit(&transfer_request()).await.expect("accepted");

    assert_eq!(result.commit.block_number, None);
    assert!(result.commit.committed_by.is_empty());
    assert_eq!(orderer.subscriptions(), 0);
}

#[tokio::test(start_paused = true)]
async fn test_submit_when_orderer_hangs_then_timeout_not_rejected() {
    let orderer = Arc::new(committing_orderer().with_behavior(OrdererBehavior::Hang));
    let (gateway, observer) = gateway_with(&test_config(), &orderer);

    let err = gateway.submit(&transfer_request()).await.expect_err("timeout");

    match &err {
        EndorseError::Commit(CommitError::Timeout { waited_ms, .. }) => assert_eq!(*waited_ms, 5_000),
        other => panic!("expected commit timeout, got {other:?}"),
    }
    assert!(err.is_outcome_unknown());
    assert_ne!(err.code(), ErrorCode::CommitRejected);
    // The transaction reached the orderer and may still commit.
    assert_eq!(orderer.submissions().len(), 1);
    assert!(observer.events().iter().any(|event| matches!(event, Recorded::CommitFailed(_))));
}

#[tokio::test(start_paused = true)]
async fn test_submit_when_commit_event_never_arrives_then_timeout() {
    // Accepted, but no peer in the submitter's organization reports the block.
    let orderer = Arc::new(MockOrderer::new().with_committer(peer("peer0.org2", ORG2_MSP), ValidationCode::Valid));
    let (gateway, _) = gateway_with(&test_config(), &orderer);

    let err = gateway.submit(&transfer_request()).await.expect_err("timeout");

    assert_eq!(err.code(), ErrorCode::CommitTimeout);
}

#[tokio::test]
async fn test_submit_when_orderer_rejects_then_commit_rejected() {
    let orderer = Arc::new(committing_orderer().with_behavior(OrdererBehavior::Reject { reason: "BAD_PAYLOAD".to_string() }));
    let (gateway, _) = gateway_with(&test_config(), &orderer);

    let err = gateway.submit(&transfer_request()).await.expect_err("rejected");

    match &err {
        EndorseError::Commit(CommitError::Rejected { reason, .. }) => assert_eq!(reason, "BAD_PAYLOAD"),
        other => panic!("expected commit rejection, got {other:?}"),
    }
    assert!(!err.is_outcome_unknown());
}

#[tokio::test]
async fn test_submit_when_peer_reports_invalid_then_commit_rejected() {
    let orderer = Arc::new(MockOrderer::new().with_committer(peer("peer0.org1", ORG1_MSP), ValidationCode::Invalid { code: "MVCC_READ_CONFLICT".to_string() }));
    let (gateway, _) = gateway_with(&test_config(), &orderer);

    let err = gateway.submit(&transfer_request()).await.expect_err("invalidated");

    match err {
        EndorseError::Commit(CommitError::Rejected { reason, .. }) => assert!(reason.contains("MVCC_READ_CONFLICT")),
        other => panic!("expected commit rejection, got {other:?}"),
    }
}

#[tokio::test]
async fn test_submit_when_event_stream_closes_early_then_outcome_unknown() {
    let orderer = Arc::new(MockOrderer::new().with_stream_end(StreamEnd::Close));
    let (gateway, _) = gateway_with(&test_config(), &orderer);

    let err = gateway.submit(&transfer_request()).await.expect_err("closed");

    assert_eq!(err.code(), ErrorCode::CommitEventStreamClosed);
    assert!(err.is_outcome_unknown());
}

#[tokio::test]
async fn test_submit_when_event_stream_fails_after_ack_then_outcome_unknown_not_retryable() {
    let orderer = Arc::new(MockOrderer::new().with_stream_end(StreamEnd::Fail));
    let mut config = test_config();
    config.commit.strategy = CommitStrategy::NetworkScopeAnyForTx;
    let (gateway, observer) = gateway_with(&config, &orderer);

    let err = gateway.submit(&transfer_request()).await.expect_err("stream failed");

    match &err {
        EndorseError::Commit(CommitError::EventStreamFailed { details, .. }) => assert!(details.contains("reset by peer")),
        other => panic!("expected event stream failure, got {other:?}"),
    }
    assert_eq!(err.code(), ErrorCode::CommitEventStreamFailed);
    assert!(err.is_outcome_unknown());
    assert!(!err.is_retryable());
    assert_eq!(orderer.submissions().len(), 1);
    assert!(observer.events().iter().any(|event| matches!(event, Recorded::CommitSubmitted(_))));
}

#[tokio::test]
async fn test_submit_when_ack_names_other_tx_then_outcome_unknown_not_retryable() {
    let orderer = Arc::new(committing_orderer().with_behavior(OrdererBehavior::AcknowledgeOther));
    let (gateway, _) = gateway_with(&test_config(), &orderer);

    let err = gateway.submit(&transfer_request()).await.expect_err("mismatched ack");

    assert_eq!(err.code(), ErrorCode::CommitAckMismatch);
    assert!(err.is_outcome_unknown());
    assert!(!err.is_retryable());
}

#[tokio::test]
async fn test_submit_when_orderer_unreachable_then_transport_error() {
    let orderer = Arc::new(committing_orderer().with_behavior(OrdererBehavior::Unavailable { details: "connection refused".to_string() }));
    let (gateway, _) = gateway_with(&test_config(), &orderer);

    let err = gateway.submit(&transfer_request()).await.expect_err("transport");

    assert_eq!(err.code(), ErrorCode::CommitTransport);
    assert!(err.is_retryable());
    assert!(orderer.submissions().is_empty());
}
