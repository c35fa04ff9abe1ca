use super::file::{load_certificate, load_key_material};
use super::IdentityProvider;
use crate::foundation::{EndorseError, IdentityRef, KeyMaterial, MspId, Result};
use async_trait::async_trait;
use parking_lot::RwLock;
use std::collections::HashMap;
use std::path::Path;

#[derive(Clone)]
struct StoredIdentity {
    msp_id: MspId,
    certificate: Vec<u8>,
    key: KeyMaterial,
}

/// Identities held in process memory; suitable for tests, tools and single-user clients.
#[derive(Default)]
pub struct InMemoryIdentityProvider {
    identities: RwLock<HashMap<IdentityRef, StoredIdentity>>,
}

impl InMemoryIdentityProvider {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_identity(self, reference: impl Into<IdentityRef>, msp_id: impl Into<MspId>, certificate: Vec<u8>, key: KeyMaterial) -> Self {
        self.insert(reference, msp_id, certificate, key);
        self
    }

    /// Replaces any identity already stored under `reference`.
    pub fn insert(&self, reference: impl Into<IdentityRef>, msp_id: impl Into<MspId>, certificate: Vec<u8>, key: KeyMaterial) {
        self.identities.write().insert(reference.into(), StoredIdentity { msp_id: msp_id.into(), certificate, key });
    }

    pub fn insert_from_files(&self, reference: impl Into<IdentityRef>, msp_id: impl Into<MspId>, cert_path: &Path, key_path: &Path) -> Result<()> {
        let certificate = load_certificate(cert_path)?;
        let key = load_key_material(key_path)?;
        self.insert(reference, msp_id, certificate, key);
        Ok(())
    }

    pub fn remove(&self, reference: &IdentityRef) -> bool {
        self.identities.write().remove(reference).is_some()
    }

    pub fn len(&self) -> usize {
        self.identities.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.identities.read().is_empty()
    }

    fn lookup<T>(&self, reference: &IdentityRef, f: impl FnOnce(&StoredIdentity) -> T) -> Result<T> {
        self.identities.read().get(reference).map(f).ok_or_else(|| EndorseError::IdentityNotFound(reference.clone()))
    }
}

#[async_trait]
impl IdentityProvider for InMemoryIdentityProvider {
    async fn private_key(&self, identity: &IdentityRef) -> Result<KeyMaterial> {
        self.lookup(identity, |stored| stored.key.clone())
    }

    async fn certificate(&self, identity: &IdentityRef) -> Result<Vec<u8>> {
        self.lookup(identity, |stored| stored.certificate.clone())
    }

    async fn msp_id(&self, identity: &IdentityRef) -> Result<MspId> {
        self.lookup(identity, |stored| stored.msp_id.clone())
    }
}
