//! XML encoding: a declaration followed by two sibling elements,
//! `<metadata/>` then `<bom>`, in that order.
//!
//! Scalar fields are attributes named after the wire constants; collections
//! are nested `line_item`, `element`, `offer` and `price_break` children.

use std::borrow::Cow;
use std::io::{BufRead, BufReader, Read, Write};

use chrono::{DateTime, SecondsFormat, Utc};
use quick_xml::escape::escape;
use quick_xml::events::attributes::Attribute;
use quick_xml::events::{BytesDecl, BytesEnd, BytesStart, Event};
use quick_xml::name::QName;
use quick_xml::{Reader, Writer};
use rust_decimal::Decimal;

use crate::error::{BomError, Result};
use crate::formats::wire::names;
use crate::model::{Bom, BomMeta, LineItem, Offer, OfferPrice};

const FORMAT: &str = "XML";

fn xml_err(err: impl std::fmt::Display) -> BomError {
    BomError::decode(FORMAT, err)
}

pub fn dump_xml<W: Write>(meta: &BomMeta, bom: &Bom, out: W) -> Result<()> {
    let mut writer = Writer::new_with_indent(out, b' ', 2);
    write(
        &mut writer,
        Event::Decl(BytesDecl::new("1.0", Some("UTF-8"), None)),
    )?;

    let mut start = BytesStart::new(names::METADATA);
    start.push_attribute(attr(names::NAME, meta.name.as_str()));
    start.push_attribute(attr(names::OWNER, meta.owner.as_str()));
    start.push_attribute(attr(names::DESCRIPTION, meta.description.as_str()));
    start.push_attribute(attr(names::HEAD_VERSION, meta.head_version.as_str()));
    start.push_attribute(attr(names::HOMEPAGE, meta.homepage.as_str()));
    start.push_attribute(attr(names::IS_PUBLIC_VIEW, bool_str(meta.is_public_view)));
    start.push_attribute(attr(names::IS_PUBLIC_EDIT, bool_str(meta.is_public_edit)));
    write(&mut writer, Event::Empty(start))?;

    let created = bom
        .created
        .map(|ts| ts.to_rfc3339_opts(SecondsFormat::AutoSi, true))
        .unwrap_or_default();
    let mut start = BytesStart::new(names::BOM);
    start.push_attribute(attr(names::VERSION, bom.version.as_str()));
    start.push_attribute(attr(names::CREATED, created.as_str()));
    start.push_attribute(attr(names::PROGENY, bom.progeny.as_str()));
    write(&mut writer, Event::Start(start))?;
    for li in &bom.line_items {
        write_line_item(&mut writer, li)?;
    }
    write(&mut writer, Event::End(BytesEnd::new(names::BOM)))?;

    let mut out = writer.into_inner();
    writeln!(out)?;
    Ok(())
}

fn write<W: Write>(writer: &mut Writer<W>, event: Event<'_>) -> Result<()> {
    writer
        .write_event(event)
        .map_err(|e| BomError::Io(std::io::Error::other(e.to_string())))
}

/// Escaped attribute value. Tabs and line breaks are written as character
/// references.
fn attr<'a>(key: &'a str, value: &str) -> Attribute<'a> {
    let mut escaped = String::with_capacity(value.len());
    for c in escape(value).chars() {
        match c {
            '\n' => escaped.push_str("&#10;"),
            '\r' => escaped.push_str("&#13;"),
            '\t' => escaped.push_str("&#9;"),
            c => escaped.push(c),
        }
    }
    Attribute {
        key: QName(key.as_bytes()),
        value: Cow::Owned(escaped.into_bytes()),
    }
}

fn bool_str(b: bool) -> &'static str {
    if b { "true" } else { "false" }
}

fn write_line_item<W: Write>(writer: &mut Writer<W>, li: &LineItem) -> Result<()> {
    let mut start = BytesStart::new(names::LINE_ITEM);
    start.push_attribute(attr(names::MANUFACTURER, li.manufacturer.as_str()));
    start.push_attribute(attr(names::MPN, li.mpn.as_str()));
    start.push_attribute(attr(names::DESCRIPTION, li.description.as_str()));
    start.push_attribute(attr(names::FORM_FACTOR, li.form_factor.as_str()));
    start.push_attribute(attr(names::SPECS, li.specs.as_str()));
    start.push_attribute(attr(names::COMMENT, li.comment.as_str()));
    start.push_attribute(attr(names::TAG, li.tag.as_str()));
    start.push_attribute(attr(names::CATEGORY, li.category.as_str()));
    write(writer, Event::Start(start))?;

    for element in &li.elements {
        let mut start = BytesStart::new(names::ELEMENT);
        start.push_attribute(attr(names::ELEMENT_ID, element.as_str()));
        write(writer, Event::Empty(start))?;
    }

    for offer in &li.offers {
        let available = offer.available_qty.to_string();
        let mut start = BytesStart::new(names::OFFER);
        start.push_attribute(attr(names::DISTRIBUTOR, offer.distributor.as_str()));
        start.push_attribute(attr(names::SKU, offer.sku.as_str()));
        start.push_attribute(attr(names::URL, offer.url.as_str()));
        start.push_attribute(attr(names::COMMENT, offer.comment.as_str()));
        start.push_attribute(attr(names::AVAILABLE_QTY, available.as_str()));
        write(writer, Event::Start(start))?;
        for price in &offer.prices {
            let min_qty = price.min_qty.to_string();
            let amount = price.price.to_string();
            let mut start = BytesStart::new(names::PRICE_BREAK);
            start.push_attribute(attr(names::CURRENCY, price.currency.as_str()));
            start.push_attribute(attr(names::MIN_QTY, min_qty.as_str()));
            start.push_attribute(attr(names::PRICE, amount.as_str()));
            write(writer, Event::Empty(start))?;
        }
        write(writer, Event::End(BytesEnd::new(names::OFFER)))?;
    }

    write(writer, Event::End(BytesEnd::new(names::LINE_ITEM)))
}

/// Attribute values of one start tag, unescaped.
struct Attrs(Vec<(String, String)>);

impl Attrs {
    fn from_start(start: &BytesStart<'_>) -> Result<Self> {
        let mut attrs = Vec::new();
        for attr in start.attributes() {
            let attr = attr.map_err(xml_err)?;
            let key = String::from_utf8_lossy(attr.key.as_ref()).into_owned();
            let value = attr.unescape_value().map_err(xml_err)?;
            attrs.push((key, value.into_owned()));
        }
        Ok(Self(attrs))
    }

    fn string(&mut self, key: &str) -> String {
        self.0
            .iter_mut()
            .find(|(k, _)| k == key)
            .map(|(_, v)| std::mem::take(v))
            .unwrap_or_default()
    }

    fn boolean(&mut self, key: &str) -> Result<bool> {
        match self.string(key).as_str() {
            "" | "false" | "0" => Ok(false),
            "true" | "1" => Ok(true),
            other => Err(xml_err(format!("invalid boolean '{other}' for '{key}'"))),
        }
    }

    fn number(&mut self, key: &str) -> Result<u32> {
        let value = self.string(key);
        if value.is_empty() {
            return Ok(0);
        }
        value
            .parse()
            .map_err(|_| xml_err(format!("invalid number '{value}' for '{key}'")))
    }

    fn decimal(&mut self, key: &str) -> Result<Decimal> {
        let value = self.string(key);
        value
            .parse()
            .map_err(|_| xml_err(format!("invalid decimal '{value}' for '{key}'")))
    }

    fn timestamp(&mut self, key: &str) -> Result<Option<DateTime<Utc>>> {
        let value = self.string(key);
        if value.is_empty() {
            return Ok(None);
        }
        DateTime::parse_from_rfc3339(&value)
            .map(|ts| Some(ts.with_timezone(&Utc)))
            .map_err(|e| xml_err(format!("invalid timestamp '{value}': {e}")))
    }
}

/// Pull-style reader that only surfaces element starts and ends.
struct ElementReader<R: BufRead> {
    reader: Reader<R>,
    buf: Vec<u8>,
}

enum Tag {
    /// Element name, its attributes, and whether it was self-closing.
    Open(String, Attrs, bool),
    Close(String),
    Eof,
}

impl<R: BufRead> ElementReader<R> {
    fn new(input: R) -> Self {
        let mut reader = Reader::from_reader(input);
        reader.config_mut().trim_text(true);
        Self {
            reader,
            buf: Vec::new(),
        }
    }

    fn next_tag(&mut self) -> Result<Tag> {
        loop {
            self.buf.clear();
            match self.reader.read_event_into(&mut self.buf).map_err(xml_err)? {
                Event::Start(e) => {
                    let name = String::from_utf8_lossy(e.name().as_ref()).into_owned();
                    return Ok(Tag::Open(name, Attrs::from_start(&e)?, false));
                }
                Event::Empty(e) => {
                    let name = String::from_utf8_lossy(e.name().as_ref()).into_owned();
                    return Ok(Tag::Open(name, Attrs::from_start(&e)?, true));
                }
                Event::End(e) => {
                    let name = String::from_utf8_lossy(e.name().as_ref()).into_owned();
                    return Ok(Tag::Close(name));
                }
                Event::Eof => return Ok(Tag::Eof),
                // Declarations, comments and whitespace carry nothing
                _ => {}
            }
        }
    }

    /// Next tag must open `expected`.
    fn open(&mut self, expected: &str) -> Result<(Attrs, bool)> {
        match self.next_tag()? {
            Tag::Open(name, attrs, empty) if name == expected => Ok((attrs, empty)),
            Tag::Open(name, ..) | Tag::Close(name) => Err(xml_err(format!(
                "expected <{expected}>, found <{name}>"
            ))),
            Tag::Eof => Err(xml_err(format!("expected <{expected}>, found end of input"))),
        }
    }

    /// Children of the element just opened, until its closing tag.
    fn child(&mut self, parent: &str) -> Result<Option<(String, Attrs, bool)>> {
        match self.next_tag()? {
            Tag::Open(name, attrs, empty) => Ok(Some((name, attrs, empty))),
            Tag::Close(name) if name == parent => Ok(None),
            Tag::Close(name) => Err(xml_err(format!(
                "unexpected </{name}> inside <{parent}>"
            ))),
            Tag::Eof => Err(xml_err(format!("unterminated <{parent}>"))),
        }
    }

    fn skip(&mut self, name: &str, empty: bool) -> Result<()> {
        if empty {
            return Ok(());
        }
        while let Some((child, _, child_empty)) = self.child(name)? {
            self.skip(&child, child_empty)?;
        }
        Ok(())
    }
}

pub fn load_xml<R: Read>(input: R) -> Result<(BomMeta, Bom)> {
    let mut reader = ElementReader::new(BufReader::new(input));

    let (mut attrs, empty) = reader.open(names::METADATA)?;
    let meta = BomMeta {
        name: attrs.string(names::NAME),
        owner: attrs.string(names::OWNER),
        description: attrs.string(names::DESCRIPTION),
        head_version: attrs.string(names::HEAD_VERSION),
        homepage: attrs.string(names::HOMEPAGE),
        is_public_view: attrs.boolean(names::IS_PUBLIC_VIEW)?,
        is_public_edit: attrs.boolean(names::IS_PUBLIC_EDIT)?,
    };
    reader.skip(names::METADATA, empty)?;

    let (mut attrs, empty) = reader.open(names::BOM)?;
    let mut bom = Bom {
        version: attrs.string(names::VERSION),
        created: attrs.timestamp(names::CREATED)?,
        progeny: attrs.string(names::PROGENY),
        line_items: Vec::new(),
    };
    if !empty {
        while let Some((name, attrs, empty)) = reader.child(names::BOM)? {
            if name == names::LINE_ITEM {
                bom.line_items.push(read_line_item(&mut reader, attrs, empty)?);
            } else {
                log::debug!("Skipping unknown <{name}> in <{}>", names::BOM);
                reader.skip(&name, empty)?;
            }
        }
    }

    Ok((meta, bom))
}

fn read_line_item<R: BufRead>(
    reader: &mut ElementReader<R>,
    mut attrs: Attrs,
    empty: bool,
) -> Result<LineItem> {
    let mut li = LineItem {
        manufacturer: attrs.string(names::MANUFACTURER),
        mpn: attrs.string(names::MPN),
        description: attrs.string(names::DESCRIPTION),
        form_factor: attrs.string(names::FORM_FACTOR),
        specs: attrs.string(names::SPECS),
        comment: attrs.string(names::COMMENT),
        tag: attrs.string(names::TAG),
        category: attrs.string(names::CATEGORY),
        elements: Vec::new(),
        offers: Vec::new(),
    };
    if empty {
        return Ok(li);
    }

    while let Some((name, mut attrs, empty)) = reader.child(names::LINE_ITEM)? {
        match name.as_str() {
            names::ELEMENT => {
                li.elements.push(attrs.string(names::ELEMENT_ID));
                reader.skip(&name, empty)?;
            }
            names::OFFER => li.offers.push(read_offer(reader, attrs, empty)?),
            _ => reader.skip(&name, empty)?,
        }
    }
    Ok(li)
}

fn read_offer<R: BufRead>(
    reader: &mut ElementReader<R>,
    mut attrs: Attrs,
    empty: bool,
) -> Result<Offer> {
    let mut offer = Offer {
        distributor: attrs.string(names::DISTRIBUTOR),
        sku: attrs.string(names::SKU),
        url: attrs.string(names::URL),
        comment: attrs.string(names::COMMENT),
        available_qty: attrs.number(names::AVAILABLE_QTY)?,
        prices: Vec::new(),
    };
    if empty {
        return Ok(offer);
    }

    while let Some((name, mut attrs, empty)) = reader.child(names::OFFER)? {
        if name == names::PRICE_BREAK {
            offer.prices.push(OfferPrice {
                currency: attrs.string(names::CURRENCY),
                min_qty: attrs.number(names::MIN_QTY)?,
                price: attrs.decimal(names::PRICE)?,
            });
        }
        reader.skip(&name, empty)?;
    }
    Ok(offer)
}
