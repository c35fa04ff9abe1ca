use crate::foundation::{MspId, PeerId};
use serde::{Deserialize, Serialize};
use std::fmt;

/// A reachable endorsing peer and its organization.
#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct PeerEndpoint {
    pub name: PeerId,
    pub msp_id: MspId,
    pub url: String,
}

impl PeerEndpoint {
    pub fn new(name: impl Into<PeerId>, msp_id: impl Into<MspId>, url: impl Into<String>) -> Self {
        Self { name: name.into(), msp_id: msp_id.into(), url: url.into() }
    }

    /// Same endpoint with its host replaced by `localhost`, keeping scheme, port and path.
    ///
    /// Used when the network runs in local containers that advertise internal host names.
    pub fn as_localhost(&self) -> Self {
        let (scheme, rest) = match self.url.split_once("://") {
            Some((scheme, rest)) => (Some(scheme), rest),
            None => (None, self.url.as_str()),
        };
        let host_end = rest.find(|c: char| c == ':' || c == '/').unwrap_or(rest.len());
        let rewritten = match scheme {
            Some(scheme) => format!("{scheme}://localhost{}", &rest[host_end..]),
            None => format!("localhost{}", &rest[host_end..]),
        };
        Self { name: self.name.clone(), msp_id: self.msp_id.clone(), url: rewritten }
    }
}

impl fmt::Display for PeerEndpoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}({})@{}", self.name, self.msp_id, self.url)
    }
}
