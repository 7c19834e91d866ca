use std::collections::BTreeMap;
use std::sync::{PoisonError, RwLock};

use super::{BomStore, already_exists, validate_persist};
use crate::error::{BomError, Result};
use crate::model::{Bom, BomMeta};
use crate::short_name::ShortName;

#[derive(Debug, Default)]
struct Entry {
    meta: BomMeta,
    versions: BTreeMap<ShortName, Bom>,
}

/// In-process store. Listing order is `(owner, name)` ascending.
#[derive(Debug, Default)]
pub struct MemoryBomStore {
    entries: RwLock<BTreeMap<(ShortName, ShortName), Entry>>,
}

impl MemoryBomStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl BomStore for MemoryBomStore {
    fn get_meta(&self, owner: &ShortName, name: &ShortName) -> Result<BomMeta> {
        let entries = self.entries.read().unwrap_or_else(PoisonError::into_inner);
        entries
            .get(&(owner.clone(), name.clone()))
            .map(|entry| entry.meta.clone())
            .ok_or_else(|| BomError::NotFound(format!("BOM {owner}/{name}")))
    }

    fn get_bom(&self, owner: &ShortName, name: &ShortName, version: &ShortName) -> Result<Bom> {
        let entries = self.entries.read().unwrap_or_else(PoisonError::into_inner);
        entries
            .get(&(owner.clone(), name.clone()))
            .and_then(|entry| entry.versions.get(version))
            .cloned()
            .ok_or_else(|| BomError::NotFound(format!("BOM {owner}/{name} version {version}")))
    }

    fn list_boms(&self, owner: Option<&ShortName>) -> Result<Vec<BomMeta>> {
        let entries = self.entries.read().unwrap_or_else(PoisonError::into_inner);
        Ok(entries
            .iter()
            .filter(|((entry_owner, _), _)| owner.is_none_or(|owner| owner == entry_owner))
            .map(|(_, entry)| entry.meta.clone())
            .collect())
    }

    fn persist(&self, meta: &BomMeta, bom: &Bom, version: &ShortName) -> Result<()> {
        let (owner, name) = validate_persist(meta, bom, version)?;

        let mut entries = self.entries.write().unwrap_or_else(PoisonError::into_inner);
        let entry = entries.entry((owner.clone(), name.clone())).or_default();
        if entry.versions.contains_key(version) {
            return Err(already_exists(&owner, &name, version));
        }
        entry.versions.insert(version.clone(), bom.clone());
        entry.meta = meta.clone();
        Ok(())
    }
}
