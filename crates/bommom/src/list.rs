use anyhow::Result;
use bommom_core::{BomStore, ShortName};
use clap::Args;

#[derive(Args, Debug)]
pub struct ListArgs {
    /// Only list BOMs of this owner
    pub owner: Option<ShortName>,
}

pub fn execute(args: ListArgs, store: &dyn BomStore) -> Result<()> {
    let mut boms = store.list_boms(args.owner.as_ref())?;
    boms.sort_by(|a, b| (&a.owner, &a.name).cmp(&(&b.owner, &b.name)));
    for meta in boms {
        println!("{}/{}", meta.owner, meta.name);
    }
    Ok(())
}
