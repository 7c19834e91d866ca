use std::fs::File;
use std::io::BufReader;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result, bail};
use bommom_core::{
    Bom, BomError, BomFormat, BomMeta, BomStore, CsvOptions, ElementFilter, ShortName,
};
use chrono::Utc;
use clap::{Args, ValueEnum};
use colored::Colorize;

/// Which tokens of a CSV elements cell are kept as element ids.
#[derive(ValueEnum, Debug, Clone, Copy, Default)]
pub enum ElementsArg {
    /// Drop tokens that look like ShortNames
    #[default]
    ExcludeShortNames,
    /// Keep only tokens that look like ShortNames
    KeepShortNames,
    /// Keep every token
    KeepAll,
}

impl From<ElementsArg> for ElementFilter {
    fn from(arg: ElementsArg) -> Self {
        match arg {
            ElementsArg::ExcludeShortNames => ElementFilter::ExcludeShortNames,
            ElementsArg::KeepShortNames => ElementFilter::KeepShortNames,
            ElementsArg::KeepAll => ElementFilter::KeepAll,
        }
    }
}

#[derive(Args, Debug)]
pub struct LoadArgs {
    /// BOM file to import (.json, .csv or .xml)
    #[arg(value_name = "FILE", value_hint = clap::ValueHint::FilePath)]
    pub file: PathBuf,

    /// Owner to store the BOM under
    pub owner: ShortName,

    /// Name to store the BOM under
    pub name: ShortName,

    /// Version for the new snapshot; defaults to the version in the file
    #[arg(long)]
    pub version: Option<ShortName>,

    /// Provenance note for the new snapshot
    #[arg(long)]
    pub progeny: Option<String>,

    /// Input format; inferred from the file extension when omitted
    #[arg(long = "input-format", value_name = "FORMAT")]
    pub input_format: Option<BomFormat>,

    /// Element id filter for CSV input
    #[arg(long, value_enum, default_value_t = ElementsArg::default())]
    pub elements: ElementsArg,
}

pub fn execute(args: LoadArgs, store: &dyn BomStore) -> Result<()> {
    let (file_meta, mut bom) = read_input(&args.file, args.input_format, args.elements)?;

    let version = match args.version {
        Some(version) => version,
        None if bom.version.is_empty() => {
            bail!("{} has no version, pass one with --version", args.file.display())
        }
        None => bom.version.parse::<ShortName>()?,
    };
    bom.version = version.to_string();
    bom.created = Some(Utc::now());
    bom.progeny = args
        .progeny
        .unwrap_or_else(|| format!("File uploaded from {}", args.file.display()));

    // Keep description and visibility of an existing BOM, else take what the file carried.
    let mut meta = match store.get_meta(&args.owner, &args.name) {
        Ok(existing) => existing,
        Err(BomError::NotFound(_)) => file_meta.unwrap_or_default(),
        Err(e) => return Err(e.into()),
    };
    meta.owner = args.owner.to_string();
    meta.name = args.name.to_string();
    meta.head_version = version.to_string();

    store
        .persist(&meta, &bom, &version)
        .with_context(|| format!("Failed to store {}/{}", args.owner, args.name))?;
    println!(
        "{} {}/{} version {} ({} line items)",
        "Loaded".green(),
        args.owner,
        args.name,
        version,
        bom.len()
    );
    Ok(())
}

/// Decode a BOM file. Metadata is `None` for formats that carry none.
pub fn read_input(
    path: &Path,
    format: Option<BomFormat>,
    elements: ElementsArg,
) -> Result<(Option<BomMeta>, Bom)> {
    let format = match format {
        Some(format) => format,
        None => BomFormat::from_path(path)?,
    };
    let file = File::open(path).with_context(|| format!("Failed to open {}", path.display()))?;
    let options = CsvOptions {
        element_filter: elements.into(),
    };
    let loaded = format
        .load(BufReader::new(file), &options)
        .with_context(|| format!("Failed to load {}", path.display()))?;
    log::debug!(
        "Read {} line items from {} as {format}",
        loaded.1.len(),
        path.display()
    );
    Ok(loaded)
}
