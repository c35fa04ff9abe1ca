use crate::fixtures::{success, ORG1_MSP, ORG2_MSP, ORG3_MSP};
use endorse_core::domain::{EndorsementPolicy, EndorsementResponse, EndorsementSet, QuorumDecision};
use endorse_core::foundation::{MspId, PeerId};
use proptest::prelude::*;
use std::collections::BTreeSet;

fn responses() -> Vec<EndorsementResponse> {
    vec![
        success("peer0.org1", ORG1_MSP, b"rw"),
        success("peer1.org1", ORG1_MSP, b"rw"),
        success("peer0.org2", ORG2_MSP, b"rw"),
        EndorsementResponse::rejected("peer0.org3", ORG3_MSP, "chaincode error"),
        EndorsementResponse::rejected("peer1.org3", ORG3_MSP, "access denied"),
        // Redelivery of an earlier response.
        success("peer0.org2", ORG2_MSP, b"rw"),
    ]
}

fn fold(responses: &[EndorsementResponse]) -> EndorsementSet {
    let mut set = EndorsementSet::new();
    for response in responses {
        set.record(response.clone());
    }
    set
}

#[test]
fn test_evaluate_when_rejection_present_then_rejected_even_if_policy_met() {
    let policy = EndorsementPolicy::all_of([ORG1_MSP, ORG2_MSP]);
    let mut set = EndorsementSet::new();
    set.record(success("peer0.org1", ORG1_MSP, b"rw"));
    set.record(success("peer0.org2", ORG2_MSP, b"rw"));
    set.record(EndorsementResponse::rejected("peer0.org3", ORG3_MSP, "denied"));
    assert_eq!(
        set.evaluate(&policy, &BTreeSet::new()),
        QuorumDecision::Rejected { peer: PeerId::from("peer0.org3"), reason: "denied".to_string() }
    );
}

#[test]
fn test_into_endorsements_when_mixed_then_only_successes_sorted_by_peer() {
    let set = fold(&[success("peer0.org2", ORG2_MSP, b"rw"), EndorsementResponse::rejected("peer0.org3", ORG3_MSP, "no"), success("peer0.org1", ORG1_MSP, b"rw")]);
    let peers: Vec<_> = set.into_endorsements().into_iter().map(|response| response.peer).collect();
    assert_eq!(peers, vec![PeerId::from("peer0.org1"), PeerId::from("peer0.org2")]);
}

#[test]
fn test_endorsing_orgs_when_two_peers_same_org_then_counted_once() {
    let set = fold(&[success("peer0.org1", ORG1_MSP, b"rw"), success("peer1.org1", ORG1_MSP, b"rw")]);
    assert_eq!(set.len(), 2);
    assert_eq!(set.endorsing_orgs(), [MspId::from(ORG1_MSP)].into_iter().collect());
}

proptest! {
    #[test]
    fn aggregation_is_order_independent(order in Just((0..responses().len()).collect::<Vec<_>>()).prop_shuffle()) {
        let base = responses();
        let shuffled: Vec<_> = order.iter().map(|idx| base[*idx].clone()).collect();
        let policy = EndorsementPolicy::all_of([ORG1_MSP, ORG2_MSP, ORG3_MSP]);
        let outstanding = BTreeSet::new();

        let reference = fold(&base);
        let candidate = fold(&shuffled);
        prop_assert_eq!(candidate.evaluate(&policy, &outstanding), reference.evaluate(&policy, &outstanding));
        prop_assert_eq!(candidate.endorsing_orgs(), reference.endorsing_orgs());
        prop_assert_eq!(
            candidate.evaluate(&policy, &outstanding),
            QuorumDecision::Rejected { peer: PeerId::from("peer0.org3"), reason: "chaincode error".to_string() }
        );
    }

    #[test]
    fn successful_rounds_are_order_independent(order in Just((0..4usize).collect::<Vec<_>>()).prop_shuffle()) {
        let base = vec![
            success("peer0.org1", ORG1_MSP, b"rw"),
            success("peer0.org2", ORG2_MSP, b"rw"),
            success("peer0.org3", ORG3_MSP, b"rw"),
            success("peer0.org2", ORG2_MSP, b"different"),
        ];
        let shuffled: Vec<_> = order.iter().map(|idx| base[*idx].clone()).collect();
        let policy = EndorsementPolicy::all_of([ORG1_MSP, ORG2_MSP, ORG3_MSP]);
        let set = fold(&shuffled);
        prop_assert_eq!(set.evaluate(&policy, &BTreeSet::new()), QuorumDecision::Quorate);
        prop_assert_eq!(set.len(), 3);
    }
}
