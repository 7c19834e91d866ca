//! Version 1 of the on-the-wire field mapping.
//!
//! These types are the only place JSON field names are declared, and the XML
//! codec reuses the same names through the constants in [`names`]. The in-memory
//! model in [`crate::model`] carries no serialization attributes, so renaming a
//! Rust field never changes the durable format.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::model::{Bom, BomMeta, LineItem, Offer, OfferPrice};

/// Field and element names shared by the JSON and XML encodings.
pub mod names {
    pub const METADATA: &str = "metadata";
    pub const BOM: &str = "bom";

    pub const NAME: &str = "name";
    pub const OWNER: &str = "owner_name";
    pub const DESCRIPTION: &str = "description";
    pub const HEAD_VERSION: &str = "head_version";
    pub const HOMEPAGE: &str = "homepage";
    pub const IS_PUBLIC_VIEW: &str = "is_public_view";
    pub const IS_PUBLIC_EDIT: &str = "is_public_edit";

    pub const VERSION: &str = "version";
    pub const CREATED: &str = "created_ts";
    pub const PROGENY: &str = "progeny";
    pub const LINE_ITEMS: &str = "line_items";
    pub const LINE_ITEM: &str = "line_item";

    pub const MANUFACTURER: &str = "manufacturer";
    pub const MPN: &str = "mpn";
    pub const FORM_FACTOR: &str = "form_factor";
    pub const SPECS: &str = "specs";
    pub const COMMENT: &str = "comment";
    pub const TAG: &str = "tag";
    pub const CATEGORY: &str = "category";
    pub const ELEMENTS: &str = "elements";
    pub const ELEMENT: &str = "element";
    pub const ELEMENT_ID: &str = "id";
    pub const OFFERS: &str = "offers";
    pub const OFFER: &str = "offer";

    pub const DISTRIBUTOR: &str = "distributor";
    pub const SKU: &str = "sku";
    pub const URL: &str = "url";
    pub const AVAILABLE_QTY: &str = "available_qty";
    pub const PRICES: &str = "prices";
    pub const PRICE_BREAK: &str = "price_break";

    pub const CURRENCY: &str = "currency";
    pub const MIN_QTY: &str = "min_qty";
    pub const PRICE: &str = "price";
}

/// Top-level JSON document: exactly `metadata` and `bom`.
#[derive(Debug, Serialize, Deserialize)]
pub struct BomContainer {
    pub metadata: WireBomMeta,
    pub bom: WireBom,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WireBomMeta {
    pub name: String,
    #[serde(rename = "owner_name")]
    pub owner: String,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub description: String,
    #[serde(default)]
    pub head_version: String,
    #[serde(default)]
    pub homepage: String,
    #[serde(default)]
    pub is_public_view: bool,
    #[serde(default)]
    pub is_public_edit: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WireBom {
    pub version: String,
    #[serde(rename = "created_ts", default)]
    pub created: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub progeny: String,
    #[serde(default)]
    pub line_items: Vec<WireLineItem>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WireLineItem {
    pub manufacturer: String,
    pub mpn: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub form_factor: String,
    #[serde(default)]
    pub specs: String,
    #[serde(default)]
    pub comment: String,
    #[serde(default)]
    pub tag: String,
    #[serde(default)]
    pub category: String,
    #[serde(default)]
    pub elements: Vec<String>,
    #[serde(default)]
    pub offers: Vec<WireOffer>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WireOffer {
    pub distributor: String,
    pub sku: String,
    #[serde(default)]
    pub url: String,
    #[serde(default)]
    pub comment: String,
    #[serde(default)]
    pub available_qty: u32,
    #[serde(default)]
    pub prices: Vec<WireOfferPrice>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WireOfferPrice {
    pub currency: String,
    pub min_qty: u32,
    #[serde(with = "rust_decimal::serde::str")]
    pub price: Decimal,
}

impl From<&BomMeta> for WireBomMeta {
    fn from(meta: &BomMeta) -> Self {
        Self {
            name: meta.name.clone(),
            owner: meta.owner.clone(),
            description: meta.description.clone(),
            head_version: meta.head_version.clone(),
            homepage: meta.homepage.clone(),
            is_public_view: meta.is_public_view,
            is_public_edit: meta.is_public_edit,
        }
    }
}

impl From<WireBomMeta> for BomMeta {
    fn from(wire: WireBomMeta) -> Self {
        Self {
            name: wire.name,
            owner: wire.owner,
            description: wire.description,
            head_version: wire.head_version,
            homepage: wire.homepage,
            is_public_view: wire.is_public_view,
            is_public_edit: wire.is_public_edit,
        }
    }
}

impl From<&OfferPrice> for WireOfferPrice {
    fn from(price: &OfferPrice) -> Self {
        Self {
            currency: price.currency.clone(),
            min_qty: price.min_qty,
            price: price.price,
        }
    }
}

impl From<WireOfferPrice> for OfferPrice {
    fn from(wire: WireOfferPrice) -> Self {
        Self {
            currency: wire.currency,
            min_qty: wire.min_qty,
            price: wire.price,
        }
    }
}

impl From<&Offer> for WireOffer {
    fn from(offer: &Offer) -> Self {
        Self {
            distributor: offer.distributor.clone(),
            sku: offer.sku.clone(),
            url: offer.url.clone(),
            comment: offer.comment.clone(),
            available_qty: offer.available_qty,
            prices: offer.prices.iter().map(Into::into).collect(),
        }
    }
}

impl From<WireOffer> for Offer {
    fn from(wire: WireOffer) -> Self {
        Self {
            distributor: wire.distributor,
            sku: wire.sku,
            url: wire.url,
            comment: wire.comment,
            available_qty: wire.available_qty,
            prices: wire.prices.into_iter().map(Into::into).collect(),
        }
    }
}

impl From<&LineItem> for WireLineItem {
    fn from(li: &LineItem) -> Self {
        Self {
            manufacturer: li.manufacturer.clone(),
            mpn: li.mpn.clone(),
            description: li.description.clone(),
            form_factor: li.form_factor.clone(),
            specs: li.specs.clone(),
            comment: li.comment.clone(),
            tag: li.tag.clone(),
            category: li.category.clone(),
            elements: li.elements.clone(),
            offers: li.offers.iter().map(Into::into).collect(),
        }
    }
}

impl From<WireLineItem> for LineItem {
    fn from(wire: WireLineItem) -> Self {
        Self {
            manufacturer: wire.manufacturer,
            mpn: wire.mpn,
            description: wire.description,
            form_factor: wire.form_factor,
            specs: wire.specs,
            comment: wire.comment,
            tag: wire.tag,
            category: wire.category,
            elements: wire.elements,
            offers: wire.offers.into_iter().map(Into::into).collect(),
        }
    }
}

impl From<&Bom> for WireBom {
    fn from(bom: &Bom) -> Self {
        Self {
            version: bom.version.clone(),
            created: bom.created,
            progeny: bom.progeny.clone(),
            line_items: bom.line_items.iter().map(Into::into).collect(),
        }
    }
}

impl From<WireBom> for Bom {
    fn from(wire: WireBom) -> Self {
        Self {
            version: wire.version,
            created: wire.created,
            progeny: wire.progeny,
            line_items: wire.line_items.into_iter().map(Into::into).collect(),
        }
    }
}
