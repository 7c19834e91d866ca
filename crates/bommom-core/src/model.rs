use chrono::{DateTime, Utc};
use rust_decimal::Decimal;

use crate::error::{BomError, Result, ValidationError};
use crate::short_name::is_short_name;

/// A single price break.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct OfferPrice {
    pub currency: String,
    pub min_qty: u32,
    pub price: Decimal,
}

/// One sourcing option for a line item.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Offer {
    pub distributor: String,
    pub sku: String,
    pub url: String,
    pub comment: String,
    pub available_qty: u32,
    pub prices: Vec<OfferPrice>,
}

/// One distinct part in a BOM. Identified by `(manufacturer, mpn)`.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct LineItem {
    pub manufacturer: String,
    pub mpn: String,
    pub description: String,
    pub form_factor: String,
    /// Comma-joined attribute list
    pub specs: String,
    pub comment: String,
    /// Comma-joined labels
    pub tag: String,
    /// Comma-joined hierarchy path
    pub category: String,
    /// Reference designators. Order matters and empty placeholders are
    /// allowed, so the length is the quantity.
    pub elements: Vec<String>,
    pub offers: Vec<Offer>,
}

impl LineItem {
    pub fn new(manufacturer: impl Into<String>, mpn: impl Into<String>) -> Self {
        Self {
            manufacturer: manufacturer.into(),
            mpn: mpn.into(),
            ..Default::default()
        }
    }

    pub fn id(&self) -> String {
        format!("{}::{}", self.manufacturer, self.mpn)
    }

    pub fn quantity(&self) -> usize {
        self.elements.len()
    }

    fn matches(&self, manufacturer: &str, mpn: &str) -> bool {
        self.manufacturer == manufacturer && self.mpn == mpn
    }
}

/// The mutable anchor of a BOM: its identity, permissions and head pointer.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct BomMeta {
    pub name: String,
    pub owner: String,
    pub description: String,
    pub head_version: String,
    pub homepage: String,
    pub is_public_view: bool,
    pub is_public_edit: bool,
}

impl BomMeta {
    pub fn new(owner: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            owner: owner.into(),
            name: name.into(),
            ..Default::default()
        }
    }

    pub fn validate(&self) -> std::result::Result<(), ValidationError> {
        if !is_short_name(&self.name) {
            return Err(ValidationError::InvalidName(self.name.clone()));
        }
        if !is_short_name(&self.owner) {
            return Err(ValidationError::InvalidOwner(self.owner.clone()));
        }
        Ok(())
    }
}

/// A list of parts at one version. Immutable once persisted.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Bom {
    pub version: String,
    pub created: Option<DateTime<Utc>>,
    /// Where this BOM came from
    pub progeny: String,
    pub line_items: Vec<LineItem>,
}

impl Bom {
    pub fn new(version: impl Into<String>) -> Self {
        Self {
            version: version.into(),
            created: Some(Utc::now()),
            progeny: String::new(),
            line_items: Vec::new(),
        }
    }

    pub fn len(&self) -> usize {
        self.line_items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.line_items.is_empty()
    }

    pub fn find_line_item(&self, manufacturer: &str, mpn: &str) -> Option<&LineItem> {
        self.line_items
            .iter()
            .find(|li| li.matches(manufacturer, mpn))
    }

    pub fn add_line_item(&mut self, item: LineItem) -> Result<()> {
        if self.find_line_item(&item.manufacturer, &item.mpn).is_some() {
            return Err(BomError::DuplicateLineItem {
                manufacturer: item.manufacturer,
                mpn: item.mpn,
            });
        }
        self.line_items.push(item);
        Ok(())
    }

    pub fn validate(&self) -> std::result::Result<(), ValidationError> {
        if !is_short_name(&self.version) {
            return Err(ValidationError::InvalidVersion(self.version.clone()));
        }
        match self.created {
            Some(ts) if ts.timestamp() != 0 || ts.timestamp_subsec_nanos() != 0 => Ok(()),
            _ => Err(ValidationError::MissingTimestamp),
        }
    }

    /// Small example board used to seed a fresh store.
    pub fn demo(version: impl Into<String>) -> Self {
        let mut bom = Bom::new(version);
        bom.progeny = "Seeded by bommom init".to_string();

        let resistor = LineItem {
            description: "10k pull-up".to_string(),
            form_factor: "0603".to_string(),
            specs: "10k,1%".to_string(),
            category: "passive,resistor".to_string(),
            elements: vec!["R1".to_string(), "R2".to_string(), "R5".to_string()],
            offers: vec![Offer {
                distributor: "digikey".to_string(),
                sku: "311-10.0KHRCT-ND".to_string(),
                url: "https://www.digikey.com/".to_string(),
                available_qty: 120000,
                prices: vec![
                    OfferPrice {
                        currency: "USD".to_string(),
                        min_qty: 1,
                        price: Decimal::new(10, 2),
                    },
                    OfferPrice {
                        currency: "USD".to_string(),
                        min_qty: 100,
                        price: Decimal::new(12, 3),
                    },
                ],
                ..Default::default()
            }],
            ..LineItem::new("Yageo", "RC0603FR-0710KL")
        };
        let capacitor = LineItem {
            description: "Decoupling".to_string(),
            form_factor: "0402".to_string(),
            specs: "100nF,16V,X7R".to_string(),
            category: "passive,capacitor".to_string(),
            elements: vec!["C1".to_string(), "C2".to_string()],
            ..LineItem::new("Murata", "GRM155R71C104KA88D")
        };
        let mcu = LineItem {
            description: "Microcontroller".to_string(),
            form_factor: "TQFP-32".to_string(),
            tag: "core".to_string(),
            comment: "Program before assembly".to_string(),
            elements: vec!["U1".to_string()],
            ..LineItem::new("Microchip", "ATMEGA328P-AU")
        };

        bom.line_items = vec![resistor, capacitor, mcu];
        bom
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_bom() {
        let bom = Bom::new("v001");
        assert_eq!(bom.version, "v001");
        assert!(bom.created.is_some());
        assert!(bom.is_empty());
        assert!(bom.validate().is_ok());
    }

    #[test]
    fn test_add_duplicate_line_item() {
        let mut bom = Bom::new("v001");
        bom.add_line_item(LineItem::new("WidgetCo", "WIDG0001"))
            .unwrap();

        let err = bom
            .add_line_item(LineItem {
                description: "same part, different text".to_string(),
                ..LineItem::new("WidgetCo", "WIDG0001")
            })
            .unwrap_err();
        assert!(matches!(err, BomError::DuplicateLineItem { .. }));
        assert_eq!(bom.len(), 1);

        // Same MPN from another manufacturer is a different part
        bom.add_line_item(LineItem::new("OtherCo", "WIDG0001"))
            .unwrap();
        assert_eq!(bom.len(), 2);
    }

    #[test]
    fn test_find_line_item() {
        let bom = Bom::demo("v001");
        let item = bom.find_line_item("Murata", "GRM155R71C104KA88D").unwrap();
        assert_eq!(item.quantity(), 2);
        assert_eq!(item.id(), "Murata::GRM155R71C104KA88D");
        assert!(bom.find_line_item("Murata", "nope").is_none());
    }

    #[test]
    fn test_validate_bom() {
        let mut bom = Bom::new("v001");
        assert!(bom.validate().is_ok());

        bom.version = "V 1".to_string();
        assert_eq!(
            bom.validate(),
            Err(ValidationError::InvalidVersion("V 1".to_string()))
        );

        bom.version = "v2".to_string();
        bom.created = None;
        assert_eq!(bom.validate(), Err(ValidationError::MissingTimestamp));

        bom.created = Some(DateTime::<Utc>::UNIX_EPOCH);
        assert_eq!(bom.validate(), Err(ValidationError::MissingTimestamp));
    }

    #[test]
    fn test_validate_meta() {
        let meta = BomMeta::new("common", "gizmo");
        assert!(meta.validate().is_ok());

        let meta = BomMeta::new("common", "Gizmo");
        assert_eq!(
            meta.validate(),
            Err(ValidationError::InvalidName("Gizmo".to_string()))
        );

        let meta = BomMeta::new("_common", "gizmo");
        assert_eq!(
            meta.validate(),
            Err(ValidationError::InvalidOwner("_common".to_string()))
        );
    }
}
