use super::peer::PeerEndpoint;
use crate::foundation::MspId;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::fmt;

/// Organization-level endorsement policy.
///
/// `SignedBy` is satisfied by any successful endorsement from a peer of that organization.
/// `OutOf { n, rules }` needs at least `n` of its sub-rules satisfied.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EndorsementPolicy {
    SignedBy(MspId),
    OutOf { n: usize, rules: Vec<EndorsementPolicy> },
}

impl EndorsementPolicy {
    pub fn signed_by(msp_id: impl Into<MspId>) -> Self {
        EndorsementPolicy::SignedBy(msp_id.into())
    }

    pub fn n_of<I>(n: usize, rules: I) -> Self
    where
        I: IntoIterator<Item = EndorsementPolicy>,
    {
        EndorsementPolicy::OutOf { n, rules: rules.into_iter().collect() }
    }

    pub fn all_of<I, M>(orgs: I) -> Self
    where
        I: IntoIterator<Item = M>,
        M: Into<MspId>,
    {
        let rules: Vec<_> = orgs.into_iter().map(Self::signed_by).collect();
        EndorsementPolicy::OutOf { n: rules.len(), rules }
    }

    pub fn any_of<I, M>(orgs: I) -> Self
    where
        I: IntoIterator<Item = M>,
        M: Into<MspId>,
    {
        Self::n_of(1, orgs.into_iter().map(Self::signed_by))
    }

    pub fn is_satisfied_by(&self, orgs: &BTreeSet<MspId>) -> bool {
        match self {
            EndorsementPolicy::SignedBy(msp_id) => orgs.contains(msp_id),
            EndorsementPolicy::OutOf { n, rules } => rules.iter().filter(|rule| rule.is_satisfied_by(orgs)).count() >= *n,
        }
    }

    /// Every organization named anywhere in the policy.
    pub fn organizations(&self) -> BTreeSet<MspId> {
        let mut out = BTreeSet::new();
        self.collect_organizations(&mut out);
        out
    }

    fn collect_organizations(&self, out: &mut BTreeSet<MspId>) {
        match self {
            EndorsementPolicy::SignedBy(msp_id) => {
                out.insert(msp_id.clone());
            }
            EndorsementPolicy::OutOf { rules, .. } => {
                for rule in rules {
                    rule.collect_organizations(out);
                }
            }
        }
    }

    pub fn validate(&self) -> Result<(), String> {
        match self {
            EndorsementPolicy::SignedBy(msp_id) if msp_id.is_blank() => Err("signed_by requires a non-empty MSP id".to_string()),
            EndorsementPolicy::SignedBy(_) => Ok(()),
            EndorsementPolicy::OutOf { n, rules } => {
                if *n == 0 {
                    return Err("out_of.n must be > 0".to_string());
                }
                if *n > rules.len() {
                    return Err(format!("out_of.n ({n}) exceeds number of rules ({})", rules.len()));
                }
                rules.iter().try_for_each(EndorsementPolicy::validate)
            }
        }
    }
}

impl fmt::Display for EndorsementPolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            EndorsementPolicy::SignedBy(msp_id) => write!(f, "{msp_id}"),
            EndorsementPolicy::OutOf { n, rules } => {
                write!(f, "{n}-of[")?;
                for (idx, rule) in rules.iter().enumerate() {
                    if idx > 0 {
                        f.write_str(", ")?;
                    }
                    write!(f, "{rule}")?;
                }
                f.write_str("]")
            }
        }
    }
}

/// How the quorum for a round is decided.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum QuorumRule {
    /// Every organization among the discovered peers must endorse.
    #[default]
    AllOrganizations,
    Policy(EndorsementPolicy),
}

impl QuorumRule {
    /// Organizations discovery should be scoped to; empty means "all".
    pub fn discovery_scope(&self) -> BTreeSet<MspId> {
        match self {
            QuorumRule::AllOrganizations => BTreeSet::new(),
            QuorumRule::Policy(policy) => policy.organizations(),
        }
    }

    pub fn resolve(&self, peers: &[PeerEndpoint]) -> EndorsementPolicy {
        match self {
            QuorumRule::AllOrganizations => {
                let orgs: BTreeSet<MspId> = peers.iter().map(|peer| peer.msp_id.clone()).collect();
                EndorsementPolicy::all_of(orgs)
            }
            QuorumRule::Policy(policy) => policy.clone(),
        }
    }
}
