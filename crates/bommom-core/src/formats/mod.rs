pub mod csv;
pub mod json;
pub mod text;
pub mod wire;
pub mod xml;

use std::fmt;
use std::io::{Read, Write};
use std::path::Path;
use std::str::FromStr;

use crate::error::{BomError, Result};
use crate::model::{Bom, BomMeta};

pub use self::csv::{CsvOptions, ElementFilter, dump_csv, load_csv, load_csv_with};
pub use self::json::{dump_json, load_json};
pub use self::text::dump_text;
pub use self::xml::{dump_xml, load_xml};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum BomFormat {
    /// Human-readable table; dump only
    #[default]
    Text,
    Json,
    Csv,
    Xml,
}

impl BomFormat {
    pub const ALL: [BomFormat; 4] = [
        BomFormat::Text,
        BomFormat::Json,
        BomFormat::Csv,
        BomFormat::Xml,
    ];

    /// Infer the format from a file extension. A missing extension, `.txt`
    /// and `.text` all mean text.
    pub fn from_path(path: &Path) -> Result<Self> {
        let ext = path
            .extension()
            .map(|ext| ext.to_string_lossy().to_lowercase())
            .unwrap_or_default();
        match ext.as_str() {
            "" | "txt" | "text" => Ok(BomFormat::Text),
            "json" => Ok(BomFormat::Json),
            "csv" => Ok(BomFormat::Csv),
            "xml" => Ok(BomFormat::Xml),
            _ => Err(BomError::UnknownFormat(format!(".{ext}"))),
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            BomFormat::Text => "text",
            BomFormat::Json => "json",
            BomFormat::Csv => "csv",
            BomFormat::Xml => "xml",
        }
    }

    pub fn dump<W: Write>(&self, meta: &BomMeta, bom: &Bom, out: W) -> Result<()> {
        match self {
            BomFormat::Text => dump_text(meta, bom, out),
            BomFormat::Json => dump_json(meta, bom, out),
            BomFormat::Csv => dump_csv(bom, out),
            BomFormat::Xml => dump_xml(meta, bom, out),
        }
    }

    /// Decode a BOM. Metadata is `None` for formats that do not carry it.
    pub fn load<R: Read>(
        &self,
        input: R,
        options: &CsvOptions,
    ) -> Result<(Option<BomMeta>, Bom)> {
        match self {
            BomFormat::Text => Err(BomError::UnsupportedFormat(self.as_str())),
            BomFormat::Json => load_json(input).map(|(meta, bom)| (Some(meta), bom)),
            BomFormat::Csv => load_csv_with(input, options).map(|bom| (None, bom)),
            BomFormat::Xml => load_xml(input).map(|(meta, bom)| (Some(meta), bom)),
        }
    }
}

impl fmt::Display for BomFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for BomFormat {
    type Err = BomError;

    fn from_str(s: &str) -> Result<Self> {
        BomFormat::ALL
            .into_iter()
            .find(|format| format.as_str().eq_ignore_ascii_case(s))
            .ok_or_else(|| BomError::UnknownFormat(s.to_string()))
    }
}
