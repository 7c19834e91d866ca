use std::path::Path;

use anyhow::{Context, Result};
use bommom_core::{Bom, BomError, BomMeta, BomStore, JsonFileBomStore, ShortName};
use colored::Colorize;

const SEED_OWNER: &str = "common";
const SEED_NAME: &str = "gizmo";
const SEED_VERSION: &str = "v001";

/// Create the store root and seed `common/gizmo` unless it is already there.
pub fn execute(path: &Path) -> Result<()> {
    let store = JsonFileBomStore::init(path)
        .with_context(|| format!("Failed to create BOM store at {}", path.display()))?;
    seed(&store)?;
    println!(
        "{} BOM store at {}",
        "Initialized".green(),
        store.root().display()
    );
    Ok(())
}

fn seed(store: &dyn BomStore) -> Result<()> {
    let owner: ShortName = SEED_OWNER.parse()?;
    let name: ShortName = SEED_NAME.parse()?;
    match store.get_meta(&owner, &name) {
        Ok(_) => {
            log::debug!("{owner}/{name} already exists, not seeding");
            return Ok(());
        }
        Err(BomError::NotFound(_)) => {}
        Err(e) => return Err(e.into()),
    }

    let meta = BomMeta {
        description: "fancy stuff".to_string(),
        head_version: SEED_VERSION.to_string(),
        is_public_view: true,
        is_public_edit: true,
        ..BomMeta::new(SEED_OWNER, SEED_NAME)
    };
    store
        .persist(&meta, &Bom::demo(SEED_VERSION), &SEED_VERSION.parse::<ShortName>()?)
        .context("Failed to seed example BOM")?;
    Ok(())
}
