use std::path::PathBuf;

use anyhow::Result;
use bommom_core::{BomFormat, BomMeta};
use clap::Args;

use crate::dump::{output_format, write_output};
use crate::load::{ElementsArg, read_input};

#[derive(Args, Debug)]
pub struct ConvertArgs {
    /// BOM file to read (.json, .csv or .xml)
    #[arg(value_name = "INFILE", value_hint = clap::ValueHint::FilePath)]
    pub input: PathBuf,

    /// File to write; stdout when omitted
    #[arg(value_name = "OUTFILE", value_hint = clap::ValueHint::FilePath)]
    pub output: Option<PathBuf>,

    /// Element id filter for CSV input
    #[arg(long, value_enum, default_value_t = ElementsArg::default())]
    pub elements: ElementsArg,
}

/// Convert without touching the store. Input without metadata is named
/// after the input file.
pub fn execute(args: ConvertArgs, format: Option<BomFormat>) -> Result<()> {
    let format = output_format(format, args.output.as_deref())?;
    let (meta, bom) = read_input(&args.input, None, args.elements)?;
    let meta = meta.unwrap_or_else(|| {
        let stem = args
            .input
            .file_stem()
            .map(|stem| stem.to_string_lossy().into_owned())
            .unwrap_or_default();
        BomMeta {
            head_version: bom.version.clone(),
            ..BomMeta::new("", stem)
        }
    });
    write_output(format, &meta, &bom, args.output.as_deref())
}
