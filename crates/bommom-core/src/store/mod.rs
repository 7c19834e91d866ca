//! Versioned BOM storage.
//!
//! Each `(owner, name)` has one mutable [`BomMeta`] record and any number of
//! immutable [`Bom`] snapshots keyed by version. `persist` never overwrites a
//! snapshot; it adds a new one and rewrites the metadata record, whose
//! `head_version` the caller sets.
//!
//! There is no locking. A persist is a check followed by two writes, and two
//! writers racing on the same `(owner, name)` can interleave between them.

mod file;
mod memory;

pub use file::JsonFileBomStore;
pub use memory::MemoryBomStore;

use crate::error::{BomError, Result, ValidationError};
use crate::model::{Bom, BomMeta};
use crate::short_name::ShortName;

pub trait BomStore {
    fn get_meta(&self, owner: &ShortName, name: &ShortName) -> Result<BomMeta>;

    fn get_bom(&self, owner: &ShortName, name: &ShortName, version: &ShortName) -> Result<Bom>;

    /// Resolve `head_version` and read that snapshot.
    ///
    /// An empty head on an existing record is [`BomError::PreconditionFailed`];
    /// a head that names a missing snapshot is [`BomError::NotFound`].
    fn get_head(&self, owner: &ShortName, name: &ShortName) -> Result<(BomMeta, Bom)> {
        let meta = self.get_meta(owner, name)?;
        if meta.head_version.is_empty() {
            return Err(BomError::PreconditionFailed {
                owner: owner.to_string(),
                name: name.to_string(),
            });
        }
        let version = ShortName::new(meta.head_version.as_str())?;
        let bom = self.get_bom(owner, name, &version)?;
        Ok((meta, bom))
    }

    /// BOMs of one owner, or of every owner when `owner` is `None`.
    ///
    /// Entries without a readable metadata record are skipped. Order is
    /// whatever the backend enumerates.
    fn list_boms(&self, owner: Option<&ShortName>) -> Result<Vec<BomMeta>>;

    /// Store `bom` as `version` of `meta.owner/meta.name` and rewrite `meta`.
    ///
    /// `bom.version` must equal `version`. Fails with
    /// [`BomError::AlreadyExists`], without writing, if that version is
    /// already stored.
    fn persist(&self, meta: &BomMeta, bom: &Bom, version: &ShortName) -> Result<()>;
}

/// Checks shared by every backend before anything is written. The snapshot
/// must carry the version it is stored under.
pub(crate) fn validate_persist(
    meta: &BomMeta,
    bom: &Bom,
    version: &ShortName,
) -> Result<(ShortName, ShortName)> {
    meta.validate()?;
    bom.validate()?;
    if bom.version != version.as_str() {
        return Err(ValidationError::VersionMismatch {
            bom: bom.version.clone(),
            version: version.to_string(),
        }
        .into());
    }
    let owner = ShortName::new(meta.owner.as_str())?;
    let name = ShortName::new(meta.name.as_str())?;
    Ok((owner, name))
}

pub(crate) fn already_exists(owner: &ShortName, name: &ShortName, version: &ShortName) -> BomError {
    BomError::AlreadyExists {
        owner: owner.to_string(),
        name: name.to_string(),
        version: version.to_string(),
    }
}
