use crate::fixtures::{peer, three_org_peers, ORG1_MSP, ORG2_MSP, ORG3_MSP};
use endorse_core::domain::{EndorsementPolicy, QuorumRule};
use endorse_core::foundation::MspId;
use std::collections::BTreeSet;

fn orgs(names: &[&str]) -> BTreeSet<MspId> {
    names.iter().map(|name| MspId::from(*name)).collect()
}

#[test]
fn test_policy_when_majority_then_any_two_of_three_satisfy() {
    let policy = EndorsementPolicy::n_of(2, [ORG1_MSP, ORG2_MSP, ORG3_MSP].map(EndorsementPolicy::signed_by));
    assert!(policy.is_satisfied_by(&orgs(&[ORG1_MSP, ORG3_MSP])));
    assert!(policy.is_satisfied_by(&orgs(&[ORG2_MSP, ORG3_MSP])));
    assert!(!policy.is_satisfied_by(&orgs(&[ORG2_MSP])));
}

#[test]
fn test_policy_when_nested_then_organizations_flattened() {
    let policy = EndorsementPolicy::n_of(2, [EndorsementPolicy::signed_by(ORG1_MSP), EndorsementPolicy::any_of([ORG2_MSP, ORG3_MSP])]);
    assert_eq!(policy.organizations(), orgs(&[ORG1_MSP, ORG2_MSP, ORG3_MSP]));
    assert!(policy.is_satisfied_by(&orgs(&[ORG1_MSP, ORG3_MSP])));
    assert!(!policy.is_satisfied_by(&orgs(&[ORG2_MSP, ORG3_MSP])));
}

#[test]
fn test_policy_when_blank_msp_or_zero_threshold_then_invalid() {
    assert!(EndorsementPolicy::signed_by(" ").validate().is_err());
    assert!(EndorsementPolicy::n_of(0, [EndorsementPolicy::signed_by(ORG1_MSP)]).validate().is_err());
}

#[test]
fn test_quorum_rule_when_policy_then_scope_and_resolution_follow_policy() {
    let policy = EndorsementPolicy::any_of([ORG2_MSP]);
    let rule = QuorumRule::Policy(policy.clone());
    assert_eq!(rule.discovery_scope(), orgs(&[ORG2_MSP]));
    assert_eq!(rule.resolve(&three_org_peers()), policy);
}

#[test]
fn test_quorum_rule_when_all_organizations_then_duplicate_orgs_counted_once() {
    let mut peers = three_org_peers();
    peers.push(peer("peer1.org1", ORG1_MSP));
    let policy = QuorumRule::AllOrganizations.resolve(&peers);
    assert_eq!(policy.organizations().len(), 3);
    assert!(policy.is_satisfied_by(&orgs(&[ORG1_MSP, ORG2_MSP, ORG3_MSP])));
    assert!(!policy.is_satisfied_by(&orgs(&[ORG1_MSP, ORG2_MSP])));
}

#[test]
fn test_quorum_rule_when_toml_then_deserializes_both_forms() {
    #[derive(serde::Deserialize)]
    struct Wrapper {
        quorum: QuorumRule,
    }
    let all: Wrapper = toml::from_str(r#"quorum = "all_organizations""#).expect("unit variant");
    assert_eq!(all.quorum, QuorumRule::AllOrganizations);

    let explicit: Wrapper = toml::from_str(
        r#"
        [quorum.policy.out_of]
        n = 1
        rules = [{ signed_by = "Org1MSP" }, { signed_by = "Org2MSP" }]
        "#,
    )
    .expect("policy variant");
    assert_eq!(explicit.quorum, QuorumRule::Policy(EndorsementPolicy::any_of([ORG1_MSP, ORG2_MSP])));
}
