use std::fs;
use std::io::{self, Write};
use std::path::{Path, PathBuf};

use atomicwrites::{AtomicFile, OverwriteBehavior};

use super::{BomStore, already_exists, validate_persist};
use crate::error::{BomError, Result};
use crate::formats::json;
use crate::model::{Bom, BomMeta};
use crate::short_name::ShortName;

const META_FILE: &str = "_meta.json";

/// Directory tree of JSON files:
///
/// ```text
/// <root>/<owner>/<name>/_meta.json
/// <root>/<owner>/<name>/<version>.json
/// ```
#[derive(Debug, Clone)]
pub struct JsonFileBomStore {
    root: PathBuf,
}

impl JsonFileBomStore {
    /// Create the root directory if needed and open it.
    pub fn init(root: impl Into<PathBuf>) -> Result<Self> {
        let root = root.into();
        fs::create_dir_all(&root)?;
        Ok(Self { root })
    }

    /// Open an existing store root.
    pub fn open(root: impl Into<PathBuf>) -> Result<Self> {
        let root = root.into();
        if !root.is_dir() {
            return Err(BomError::NotFound(format!(
                "store root {} (run `bommom init` first)",
                root.display()
            )));
        }
        Ok(Self { root })
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    fn bom_dir(&self, owner: &ShortName, name: &ShortName) -> PathBuf {
        self.root.join(owner.as_str()).join(name.as_str())
    }

    fn meta_path(&self, owner: &ShortName, name: &ShortName) -> PathBuf {
        self.bom_dir(owner, name).join(META_FILE)
    }

    fn snapshot_path(&self, owner: &ShortName, name: &ShortName, version: &ShortName) -> PathBuf {
        self.bom_dir(owner, name)
            .join(format!("{}.json", version.as_str()))
    }

    fn list_owner(&self, owner: &ShortName) -> Result<Vec<BomMeta>> {
        let mut metas = Vec::new();
        for name in short_name_dirs(&self.root.join(owner.as_str()))? {
            let path = self.meta_path(owner, &name);
            match fs::read(&path)
                .map_err(BomError::from)
                .and_then(|bytes| json::meta_from_slice(&bytes))
            {
                Ok(meta) => metas.push(meta),
                Err(err) => log::debug!("Skipping {owner}/{name} in listing: {err}"),
            }
        }
        Ok(metas)
    }
}

/// Read a file, mapping a missing file to [`BomError::NotFound`].
fn read_existing(path: &Path, what: impl FnOnce() -> String) -> Result<Vec<u8>> {
    match fs::read(path) {
        Ok(bytes) => Ok(bytes),
        Err(err) if err.kind() == io::ErrorKind::NotFound => Err(BomError::NotFound(what())),
        Err(err) => Err(err.into()),
    }
}

/// Subdirectories of `dir` whose names are valid ShortNames. A missing `dir`
/// has none.
fn short_name_dirs(dir: &Path) -> Result<Vec<ShortName>> {
    let entries = match fs::read_dir(dir) {
        Ok(entries) => entries,
        Err(err) if err.kind() == io::ErrorKind::NotFound => return Ok(Vec::new()),
        Err(err) => return Err(err.into()),
    };

    let mut names = Vec::new();
    for entry in entries {
        let entry = entry?;
        if !entry.file_type()?.is_dir() {
            continue;
        }
        let file_name = entry.file_name();
        match file_name.to_str().map(ShortName::new) {
            Some(Ok(name)) => names.push(name),
            _ => log::debug!("Ignoring directory {}", entry.path().display()),
        }
    }
    Ok(names)
}

fn atomic_write(path: &Path, overwrite: OverwriteBehavior, bytes: &[u8]) -> io::Result<()> {
    AtomicFile::new(path, overwrite)
        .write(|f| {
            f.write_all(bytes)?;
            f.flush()
        })
        .map_err(|err| match err {
            atomicwrites::Error::Internal(e) | atomicwrites::Error::User(e) => e,
        })
}

impl BomStore for JsonFileBomStore {
    fn get_meta(&self, owner: &ShortName, name: &ShortName) -> Result<BomMeta> {
        let bytes = read_existing(&self.meta_path(owner, name), || {
            format!("BOM {owner}/{name}")
        })?;
        json::meta_from_slice(&bytes)
    }

    fn get_bom(&self, owner: &ShortName, name: &ShortName, version: &ShortName) -> Result<Bom> {
        let bytes = read_existing(&self.snapshot_path(owner, name, version), || {
            format!("BOM {owner}/{name} version {version}")
        })?;
        json::bom_from_slice(&bytes)
    }

    fn list_boms(&self, owner: Option<&ShortName>) -> Result<Vec<BomMeta>> {
        if let Some(owner) = owner {
            return self.list_owner(owner);
        }
        let mut metas = Vec::new();
        for owner in short_name_dirs(&self.root)? {
            metas.extend(self.list_owner(&owner)?);
        }
        Ok(metas)
    }

    fn persist(&self, meta: &BomMeta, bom: &Bom, version: &ShortName) -> Result<()> {
        let (owner, name) = validate_persist(meta, bom, version)?;

        let snapshot = self.snapshot_path(&owner, &name, version);
        if snapshot.exists() {
            return Err(already_exists(&owner, &name, version));
        }

        let bom_bytes = json::bom_to_vec(bom)?;
        let meta_bytes = json::meta_to_vec(meta)?;
        fs::create_dir_all(self.bom_dir(&owner, &name))?;

        // The snapshot goes first so a crash in between leaves an unreferenced
        // snapshot rather than a head pointing at nothing.
        match atomic_write(&snapshot, OverwriteBehavior::DisallowOverwrite, &bom_bytes) {
            Ok(()) => {}
            Err(err) if err.kind() == io::ErrorKind::AlreadyExists => {
                return Err(already_exists(&owner, &name, version));
            }
            Err(err) => return Err(err.into()),
        }
        atomic_write(
            &self.meta_path(&owner, &name),
            OverwriteBehavior::AllowOverwrite,
            &meta_bytes,
        )?;

        log::debug!(
            "Persisted {owner}/{name} version {version} (head {})",
            meta.head_version
        );
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sn(s: &str) -> ShortName {
        ShortName::new(s).unwrap()
    }

    #[test]
    fn test_layout_on_disk() {
        let dir = tempfile::tempdir().unwrap();
        let store = JsonFileBomStore::init(dir.path().join("filestore")).unwrap();

        let meta = BomMeta {
            head_version: "v001".to_string(),
            ..BomMeta::new("common", "gizmo")
        };
        store
            .persist(&meta, &Bom::demo("v001"), &sn("v001"))
            .unwrap();

        let bom_dir = store.root().join("common").join("gizmo");
        assert!(bom_dir.join("_meta.json").is_file());
        assert!(bom_dir.join("v001.json").is_file());

        let raw: serde_json::Value =
            serde_json::from_slice(&fs::read(bom_dir.join("_meta.json")).unwrap()).unwrap();
        assert_eq!(raw["owner_name"], "common");
        assert_eq!(raw["head_version"], "v001");
    }

    #[test]
    fn test_open_missing_root() {
        let dir = tempfile::tempdir().unwrap();
        let err = JsonFileBomStore::open(dir.path().join("nope")).unwrap_err();
        assert!(matches!(err, BomError::NotFound(_)));
    }

    #[test]
    fn test_listing_skips_partial_entries() {
        let dir = tempfile::tempdir().unwrap();
        let store = JsonFileBomStore::init(dir.path()).unwrap();

        let meta = BomMeta {
            head_version: "v1".to_string(),
            ..BomMeta::new("alice", "amp")
        };
        store.persist(&meta, &Bom::new("v1"), &sn("v1")).unwrap();

        // A directory without metadata, one with garbage metadata, a stray
        // file and a directory that is not a ShortName.
        fs::create_dir_all(dir.path().join("alice").join("empty")).unwrap();
        fs::create_dir_all(dir.path().join("alice").join("broken")).unwrap();
        fs::write(dir.path().join("alice").join("broken").join("_meta.json"), "{").unwrap();
        fs::write(dir.path().join("alice").join("notes.txt"), "hi").unwrap();
        fs::create_dir_all(dir.path().join("Bob").join("thing")).unwrap();

        let all = store.list_boms(None).unwrap();
        assert_eq!(all.len(), 1);
        assert_eq!(all[0].name, "amp");

        assert!(store.list_boms(Some(&sn("nobody"))).unwrap().is_empty());
    }

    #[test]
    fn test_corrupt_snapshot_is_decode_error() {
        let dir = tempfile::tempdir().unwrap();
        let store = JsonFileBomStore::init(dir.path()).unwrap();
        let bom_dir = dir.path().join("alice").join("amp");
        fs::create_dir_all(&bom_dir).unwrap();
        fs::write(bom_dir.join("v1.json"), "not json").unwrap();

        let err = store.get_bom(&sn("alice"), &sn("amp"), &sn("v1")).unwrap_err();
        assert!(matches!(err, BomError::DecodeFailed { .. }));
    }
}
