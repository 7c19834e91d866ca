use std::io::Write;

use chrono::SecondsFormat;
use comfy_table::Table;
use comfy_table::presets::UTF8_FULL_CONDENSED;

use crate::error::Result;
use crate::model::{Bom, BomMeta};

/// Human-readable summary: a header block, then one table row per line item.
pub fn dump_text<W: Write>(meta: &BomMeta, bom: &Bom, mut out: W) -> Result<()> {
    let created = bom
        .created
        .map(|ts| ts.to_rfc3339_opts(SecondsFormat::Secs, true))
        .unwrap_or_else(|| "-".to_string());

    writeln!(out, "Name:        {}", meta.name)?;
    writeln!(out, "Version:     {}", bom.version)?;
    writeln!(out, "Creator:     {}", meta.owner)?;
    writeln!(out, "Timestamp:   {created}")?;
    if !meta.homepage.is_empty() {
        writeln!(out, "Homepage:    {}", meta.homepage)?;
    }
    if !bom.progeny.is_empty() {
        writeln!(out, "Source:      {}", bom.progeny)?;
    }
    if !meta.description.is_empty() {
        writeln!(out, "Description: {}", meta.description)?;
    }
    writeln!(out)?;

    let mut table = Table::new();
    table.load_preset(UTF8_FULL_CONDENSED);
    table.set_content_arrangement(comfy_table::ContentArrangement::Disabled);
    table.set_header(vec![
        "Qty",
        "Tag",
        "Manufacturer",
        "MPN",
        "Function",
        "Comment",
    ]);
    for li in &bom.line_items {
        table.add_row(vec![
            li.quantity().to_string(),
            li.tag.clone(),
            li.manufacturer.clone(),
            li.mpn.clone(),
            li.description.clone(),
            li.comment.clone(),
        ]);
    }

    writeln!(out, "{table}")?;
    Ok(())
}
