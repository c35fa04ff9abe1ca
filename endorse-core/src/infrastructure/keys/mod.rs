//! Identity provider seam: private keys and certificates per identity reference.

mod file;
mod memory;

pub use file::{load_certificate, load_key_material};
pub use memory::InMemoryIdentityProvider;

use crate::domain::Identity;
use crate::foundation::{IdentityRef, KeyMaterial, MspId, Result};
use async_trait::async_trait;

#[async_trait]
pub trait IdentityProvider: Send + Sync {
    /// Key material for one signing call. Callers drop it as soon as the signature exists.
    async fn private_key(&self, identity: &IdentityRef) -> Result<KeyMaterial>;

    async fn certificate(&self, identity: &IdentityRef) -> Result<Vec<u8>>;

    async fn msp_id(&self, identity: &IdentityRef) -> Result<MspId>;

    /// Public parts only, as embedded in proposal headers.
    async fn identity(&self, identity: &IdentityRef) -> Result<Identity> {
        Ok(Identity { reference: identity.clone(), msp_id: self.msp_id(identity).await?, certificate: self.certificate(identity).await? })
    }
}
