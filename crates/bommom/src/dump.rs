use std::fs::File;
use std::io::{self, BufWriter, Write};
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use bommom_core::{Bom, BomFormat, BomMeta, BomStore, ShortName};
use clap::Args;

#[derive(Args, Debug)]
pub struct DumpArgs {
    /// Owner of the BOM
    pub owner: ShortName,

    /// Name of the BOM
    pub name: ShortName,

    /// Write to this file instead of stdout
    #[arg(value_name = "FILE", value_hint = clap::ValueHint::FilePath)]
    pub file: Option<PathBuf>,
}

pub fn execute(args: DumpArgs, format: Option<BomFormat>, store: &dyn BomStore) -> Result<()> {
    let format = output_format(format, args.file.as_deref())?;
    let (meta, bom) = store
        .get_head(&args.owner, &args.name)
        .with_context(|| format!("Failed to read {}/{}", args.owner, args.name))?;
    write_output(format, &meta, &bom, args.file.as_deref())
}

/// An explicit `--format` wins, then the file extension, then text.
pub fn output_format(flag: Option<BomFormat>, file: Option<&Path>) -> Result<BomFormat> {
    match (flag, file) {
        (Some(format), _) => Ok(format),
        (None, Some(file)) => Ok(BomFormat::from_path(file)?),
        (None, None) => Ok(BomFormat::default()),
    }
}

pub fn write_output(
    format: BomFormat,
    meta: &BomMeta,
    bom: &Bom,
    file: Option<&Path>,
) -> Result<()> {
    match file {
        Some(path) => {
            let f = File::create(path)
                .with_context(|| format!("Failed to create {}", path.display()))?;
            let mut writer = BufWriter::new(f);
            format.dump(meta, bom, &mut writer)?;
            writer.flush()?;
            log::debug!("Wrote {format} to {}", path.display());
        }
        None => {
            let mut writer = io::stdout().lock();
            format.dump(meta, bom, &mut writer)?;
            writer.flush()?;
        }
    }
    Ok(())
}
