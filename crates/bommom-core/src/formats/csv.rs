use std::io::{Read, Write};

use crate::error::{BomError, Result};
use crate::model::{Bom, LineItem};
use crate::short_name::is_short_name;

const FORMAT: &str = "CSV";

/// Upper bound on a stated quantity or on the number of listed elements.
pub const MAX_ELEMENTS: usize = 99_999;

/// Columns written by [`dump_csv`], one row per line item.
pub const DUMP_HEADER: [&str; 10] = [
    "qty",
    "elements",
    "manufacturer",
    "mpn",
    "function",
    "form_factor",
    "specs",
    "category",
    "tag",
    "comment",
];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Column {
    Quantity,
    Mpn,
    Manufacturer,
    Elements,
    Description,
    FormFactor,
    Specs,
    Comment,
    Category,
    Tag,
}

/// Lowercased header text to line item field. Anything not listed is ignored.
const HEADER_SYNONYMS: &[(&str, Column)] = &[
    ("qty", Column::Quantity),
    ("quantity", Column::Quantity),
    ("qnty", Column::Quantity),
    ("mpn", Column::Mpn),
    ("manufacturer part number", Column::Mpn),
    ("part number", Column::Mpn),
    ("p/n", Column::Mpn),
    ("mfg", Column::Manufacturer),
    ("manufacturer", Column::Manufacturer),
    ("mfg name", Column::Manufacturer),
    ("manufacturer name", Column::Manufacturer),
    ("element", Column::Elements),
    ("elements", Column::Elements),
    ("id", Column::Elements),
    ("circuit element", Column::Elements),
    ("symbol_id", Column::Elements),
    ("symbol id", Column::Elements),
    ("symbols", Column::Elements),
    ("designator", Column::Elements),
    ("designators", Column::Elements),
    ("reference", Column::Elements),
    ("description", Column::Description),
    ("type", Column::Description),
    ("function", Column::Description),
    ("formfactor", Column::FormFactor),
    ("form_factor", Column::FormFactor),
    ("form factor", Column::FormFactor),
    ("case/package", Column::FormFactor),
    ("package", Column::FormFactor),
    ("symbol", Column::FormFactor),
    ("footprint", Column::FormFactor),
    ("specs", Column::Specs),
    ("specifications", Column::Specs),
    ("properties", Column::Specs),
    ("attributes", Column::Specs),
    ("value", Column::Specs),
    ("comment", Column::Comment),
    ("comments", Column::Comment),
    ("note", Column::Comment),
    ("notes", Column::Comment),
    ("category", Column::Category),
    ("tag", Column::Tag),
];

fn column_for(header: &str) -> Option<Column> {
    let header = header.trim().to_lowercase();
    HEADER_SYNONYMS
        .iter()
        .find(|(name, _)| *name == header)
        .map(|(_, column)| *column)
}

/// Which tokens of an elements cell become designators.
///
/// `ExcludeShortNames` keeps only tokens that are *not* ShortNames, so
/// `R1` and `U3` survive while `r1` or `gnd` are dropped. This is the
/// historical importer behavior and remains the default.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ElementFilter {
    #[default]
    ExcludeShortNames,
    KeepShortNames,
    KeepAll,
}

impl ElementFilter {
    fn accepts(self, token: &str) -> bool {
        match self {
            ElementFilter::ExcludeShortNames => !is_short_name(token),
            ElementFilter::KeepShortNames => is_short_name(token),
            ElementFilter::KeepAll => true,
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct CsvOptions {
    pub element_filter: ElementFilter,
}

pub fn dump_csv<W: Write>(bom: &Bom, out: W) -> Result<()> {
    let mut writer = ::csv::Writer::from_writer(out);
    writer
        .write_record(DUMP_HEADER)
        .map_err(std::io::Error::from)?;
    for li in &bom.line_items {
        let qty = li.quantity().to_string();
        let elements = li.elements.join(",");
        writer
            .write_record([
                qty.as_str(),
                elements.as_str(),
                li.manufacturer.as_str(),
                li.mpn.as_str(),
                li.description.as_str(),
                li.form_factor.as_str(),
                li.specs.as_str(),
                li.category.as_str(),
                li.tag.as_str(),
                li.comment.as_str(),
            ])
            .map_err(std::io::Error::from)?;
    }
    writer.flush()?;
    Ok(())
}

pub fn load_csv<R: Read>(input: R) -> Result<Bom> {
    load_csv_with(input, &CsvOptions::default())
}

/// Import line items from a spreadsheet export with loosely named columns.
///
/// The returned BOM has no version or timestamp; CSV carries no metadata.
pub fn load_csv_with<R: Read>(input: R, options: &CsvOptions) -> Result<Bom> {
    let mut reader = ::csv::ReaderBuilder::new()
        .flexible(true)
        .trim(::csv::Trim::All)
        .from_reader(input);

    let header = reader
        .headers()
        .map_err(|e| BomError::decode(FORMAT, e))?
        .clone();
    if header.is_empty() {
        return Err(BomError::decode(FORMAT, "missing header row"));
    }

    let columns: Vec<Option<Column>> = header.iter().map(column_for).collect();
    for (name, column) in header.iter().zip(&columns) {
        if column.is_none() {
            log::debug!("Ignoring unrecognized CSV column '{name}'");
        }
    }

    let mut bom = Bom::default();
    for (row, result) in reader.records().enumerate() {
        let record = result.map_err(|e| BomError::decode(FORMAT, e))?;
        if record.iter().all(|field| field.is_empty()) {
            log::debug!("Skipping blank CSV row {}", row + 1);
            continue;
        }

        let mut item = LineItem::default();
        let mut qty = String::new();
        for (i, column) in columns.iter().enumerate() {
            let Some(column) = column else { continue };
            let value = record.get(i).unwrap_or("");
            match column {
                Column::Quantity => append_field(&mut qty, value),
                Column::Elements => {
                    split_elements(value, options.element_filter, &mut item.elements)
                }
                Column::Mpn => append_field(&mut item.mpn, value),
                Column::Manufacturer => append_field(&mut item.manufacturer, value),
                Column::Description => append_field(&mut item.description, value),
                Column::FormFactor => append_field(&mut item.form_factor, value),
                Column::Specs => append_field(&mut item.specs, value),
                Column::Comment => append_field(&mut item.comment, value),
                Column::Category => append_field(&mut item.category, value),
                Column::Tag => append_field(&mut item.tag, value),
            }
        }

        reconcile_quantity(&qty, &mut item.elements)?;
        bom.add_line_item(item)?;
    }

    Ok(bom)
}

/// Repeated columns for the same field are joined with a space.
fn append_field(existing: &mut String, next: &str) {
    let next = next.trim();
    if existing.is_empty() {
        existing.push_str(next);
    } else {
        existing.push(' ');
        existing.push_str(next);
    }
}

fn split_elements(cell: &str, filter: ElementFilter, elements: &mut Vec<String>) {
    for token in cell.split(',').map(str::trim) {
        if filter.accepts(token) {
            elements.push(token.to_string());
        } else {
            log::debug!("Element id rejected by {filter:?}, skipped: '{token}'");
        }
    }
}

/// A stated quantity is a floor on the element count: short lists are
/// padded with empty placeholders, longer lists are kept whole.
fn reconcile_quantity(qty: &str, elements: &mut Vec<String>) -> Result<()> {
    if !qty.is_empty() {
        match qty.parse::<u64>() {
            Ok(n) => {
                let count = elements.len();
                if n > MAX_ELEMENTS as u64 {
                    return Err(BomError::QuantityTooLarge(n));
                }
                if count > MAX_ELEMENTS {
                    return Err(BomError::QuantityTooLarge(count as u64));
                }
                let n = n as usize;
                if count > n {
                    log::warn!("More elements ({count}) than qty ({n}), taking all elements");
                } else {
                    elements.resize(n, String::new());
                }
            }
            Err(_) => log::warn!("Ignoring unparseable quantity '{qty}'"),
        }
    }

    if elements.is_empty() {
        elements.push(String::new());
    }
    Ok(())
}
