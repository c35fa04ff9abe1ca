use crate::fixtures::{success, test_key, transfer_request, unsigned_proposal, ORG1_MSP, ORG2_MSP, SAMPLE_RAW_DER_HEX};
use endorse_core::domain::{build_commit, DigestEngine, EndorsementResponse, SignatureEngine, SignedCommitTransaction};
use endorse_core::foundation::{CommitError, EndorseError, ErrorCode};

fn assert_invalid(result: Result<impl std::fmt::Debug, EndorseError>, fragment: &str) {
    match result {
        Err(EndorseError::Commit(CommitError::InvalidEndorsements { reason })) => {
            assert!(reason.contains(fragment), "reason {reason:?} should mention {fragment:?}")
        }
        other => panic!("expected InvalidEndorsements, got {other:?}"),
    }
}

#[test]
fn test_build_commit_when_unordered_then_sorted_by_peer() {
    let proposal = unsigned_proposal(&transfer_request());
    let tx_id = proposal.tx_id();
    let transaction =
        build_commit(proposal, vec![success("peer0.org2", ORG2_MSP, b"rw"), success("peer0.org1", ORG1_MSP, b"rw")]).expect("build");
    let peers: Vec<_> = transaction.endorsements().iter().map(|response| response.peer.to_string()).collect();
    assert_eq!(peers, vec!["peer0.org1", "peer0.org2"]);
    assert_eq!(transaction.tx_id(), tx_id);
    assert_eq!(transaction.digest(), DigestEngine::digest(transaction.payload()));
}

#[test]
fn test_build_commit_when_input_order_differs_then_same_payload() {
    let a = build_commit(unsigned_proposal(&transfer_request()), vec![success("peer0.org1", ORG1_MSP, b"rw"), success("peer0.org2", ORG2_MSP, b"rw")])
        .expect("build");
    let b = build_commit(unsigned_proposal(&transfer_request()), vec![success("peer0.org2", ORG2_MSP, b"rw"), success("peer0.org1", ORG1_MSP, b"rw")])
        .expect("build");
    assert_eq!(a.payload(), b.payload());
}

#[test]
fn test_build_commit_when_empty_then_invalid_endorsements() {
    let result = build_commit(unsigned_proposal(&transfer_request()), Vec::new());
    assert!(matches!(&result, Err(err) if err.code() == ErrorCode::InvalidEndorsements));
    assert_invalid(result, "no endorsements");
}

#[test]
fn test_build_commit_when_rejected_response_then_invalid_endorsements() {
    let responses = vec![success("peer0.org1", ORG1_MSP, b"rw"), EndorsementResponse::rejected("peer0.org2", ORG2_MSP, "denied")];
    assert_invalid(build_commit(unsigned_proposal(&transfer_request()), responses), "peer0.org2");
}

#[test]
fn test_build_commit_when_duplicate_peer_then_invalid_endorsements() {
    let responses = vec![success("peer0.org1", ORG1_MSP, b"rw"), success("peer0.org1", ORG1_MSP, b"rw")];
    assert_invalid(build_commit(unsigned_proposal(&transfer_request()), responses), "duplicate");
}

#[test]
fn test_build_commit_when_payloads_diverge_then_invalid_endorsements() {
    let responses = vec![success("peer0.org1", ORG1_MSP, b"rw-a"), success("peer0.org2", ORG2_MSP, b"rw-b")];
    assert_invalid(build_commit(unsigned_proposal(&transfer_request()), responses), "differs");
}

#[test]
fn test_signed_commit_when_high_s_then_refused() {
    let transaction = build_commit(unsigned_proposal(&transfer_request()), vec![success("peer0.org1", ORG1_MSP, b"rw")]).expect("build");
    let engine = SignatureEngine::new();
    let high_s = engine.decode(&hex::decode(SAMPLE_RAW_DER_HEX).expect("hex")).expect("decode");
    assert!(!high_s.is_low_s());
    assert!(SignedCommitTransaction::new(transaction, high_s).is_err());
}

#[test]
fn test_signed_commit_when_external_signature_then_normalized_and_verified() {
    let transaction = build_commit(unsigned_proposal(&transfer_request()), vec![success("peer0.org1", ORG1_MSP, b"rw")]).expect("build");
    let engine = SignatureEngine::new();
    let key = test_key();
    let public_key = engine.public_key(&key).expect("public key");

    let raw = engine.sign(&transaction.digest(), &key).expect("sign");
    let der = engine.encode(&raw).expect("encode");
    let signed = SignedCommitTransaction::from_external_signature(transaction.clone(), &der, &public_key).expect("attach");
    assert!(signed.signature().is_low_s());
    assert_eq!(signed.signature(), &raw.normalized());
    assert_eq!(engine.decode(signed.signature_der()).expect("decode"), raw.normalized());
    assert_eq!(signed.tx_id(), transaction.tx_id());
}

#[test]
fn test_signed_commit_when_signature_over_other_digest_then_refused() {
    let transaction = build_commit(unsigned_proposal(&transfer_request()), vec![success("peer0.org1", ORG1_MSP, b"rw")]).expect("build");
    let engine = SignatureEngine::new();
    let key = test_key();
    let public_key = engine.public_key(&key).expect("public key");
    let foreign = engine.sign_canonical(&DigestEngine::digest(b"something else"), &key).expect("sign");
    let der = engine.encode(&foreign).expect("encode");
    assert!(SignedCommitTransaction::from_external_signature(transaction, &der, &public_key).is_err());
}
