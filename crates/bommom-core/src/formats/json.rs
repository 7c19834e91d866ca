use std::io::{Read, Write};

use crate::error::{BomError, Result};
use crate::formats::wire::{BomContainer, WireBom, WireBomMeta};
use crate::model::{Bom, BomMeta};

const FORMAT: &str = "JSON";

pub fn dump_json<W: Write>(meta: &BomMeta, bom: &Bom, mut out: W) -> Result<()> {
    let container = BomContainer {
        metadata: meta.into(),
        bom: bom.into(),
    };
    serde_json::to_writer_pretty(&mut out, &container).map_err(std::io::Error::from)?;
    writeln!(out)?;
    Ok(())
}

pub fn load_json<R: Read>(input: R) -> Result<(BomMeta, Bom)> {
    let container: BomContainer =
        serde_json::from_reader(input).map_err(|e| BomError::decode(FORMAT, e))?;
    Ok((container.metadata.into(), container.bom.into()))
}

/// Store-side encodings of the two halves of the container.
pub(crate) fn meta_to_vec(meta: &BomMeta) -> Result<Vec<u8>> {
    Ok(serde_json::to_vec_pretty(&WireBomMeta::from(meta)).map_err(std::io::Error::from)?)
}

pub(crate) fn meta_from_slice(bytes: &[u8]) -> Result<BomMeta> {
    let wire: WireBomMeta =
        serde_json::from_slice(bytes).map_err(|e| BomError::decode(FORMAT, e))?;
    Ok(wire.into())
}

pub(crate) fn bom_to_vec(bom: &Bom) -> Result<Vec<u8>> {
    Ok(serde_json::to_vec_pretty(&WireBom::from(bom)).map_err(std::io::Error::from)?)
}

pub(crate) fn bom_from_slice(bytes: &[u8]) -> Result<Bom> {
    let wire: WireBom = serde_json::from_slice(bytes).map_err(|e| BomError::decode(FORMAT, e))?;
    Ok(wire.into())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{LineItem, Offer, OfferPrice};

    fn gizmo() -> (BomMeta, Bom) {
        let meta = BomMeta {
            description: "fancy stuff".to_string(),
            head_version: "v001".to_string(),
            homepage: "https://example.com/gizmo".to_string(),
            is_public_view: true,
            is_public_edit: false,
            ..BomMeta::new("common", "gizmo")
        };
        (meta, Bom::demo("v001"))
    }

    #[test]
    fn test_json_round_trip() {
        let (meta, bom) = gizmo();
        let mut buf = Vec::new();
        dump_json(&meta, &bom, &mut buf).unwrap();

        let (meta2, bom2) = load_json(buf.as_slice()).unwrap();
        assert_eq!(meta, meta2);
        assert_eq!(bom, bom2);
    }

    #[test]
    fn test_json_container_shape() {
        let (meta, mut bom) = gizmo();
        bom.progeny.clear();
        bom.line_items[2].offers.clear();
        let mut buf = Vec::new();
        dump_json(&meta, &bom, &mut buf).unwrap();

        let value: serde_json::Value = serde_json::from_slice(&buf).unwrap();
        let keys: Vec<&String> = value.as_object().unwrap().keys().collect();
        assert_eq!(keys.len(), 2);
        assert_eq!(value["metadata"]["owner_name"], "common");
        assert_eq!(value["metadata"]["head_version"], "v001");
        assert!(value["bom"]["created_ts"].is_string());
        // Empty progeny is omitted, empty collections are not
        assert!(value["bom"].get("progeny").is_none());
        assert_eq!(value["bom"]["line_items"][2]["offers"], serde_json::json!([]));
    }

    #[test]
    fn test_json_snapshot() {
        let meta = BomMeta {
            head_version: "v1".to_string(),
            ..BomMeta::new("alice", "amp")
        };
        let mut bom = Bom::new("v1");
        bom.created = "2012-03-04T05:06:07Z".parse().ok();
        bom.line_items.push(LineItem {
            elements: vec!["U1".to_string()],
            offers: vec![Offer {
                distributor: "mouser".to_string(),
                sku: "595-NE5532P".to_string(),
                prices: vec![OfferPrice {
                    currency: "USD".to_string(),
                    min_qty: 1,
                    price: "0.58".parse().unwrap(),
                }],
                ..Default::default()
            }],
            ..LineItem::new("TI", "NE5532P")
        });

        let mut buf = Vec::new();
        dump_json(&meta, &bom, &mut buf).unwrap();
        insta::assert_snapshot!(String::from_utf8(buf).unwrap(), @r#"
        {
          "metadata": {
            "name": "amp",
            "owner_name": "alice",
            "head_version": "v1",
            "homepage": "",
            "is_public_view": false,
            "is_public_edit": false
          },
          "bom": {
            "version": "v1",
            "created_ts": "2012-03-04T05:06:07Z",
            "line_items": [
              {
                "manufacturer": "TI",
                "mpn": "NE5532P",
                "description": "",
                "form_factor": "",
                "specs": "",
                "comment": "",
                "tag": "",
                "category": "",
                "elements": [
                  "U1"
                ],
                "offers": [
                  {
                    "distributor": "mouser",
                    "sku": "595-NE5532P",
                    "url": "",
                    "comment": "",
                    "available_qty": 0,
                    "prices": [
                      {
                        "currency": "USD",
                        "min_qty": 1,
                        "price": "0.58"
                      }
                    ]
                  }
                ]
              }
            ]
          }
        }
        "#);
    }

    #[test]
    fn test_json_empty_description_omitted() {
        let meta = BomMeta::new("common", "gizmo");
        let bytes = meta_to_vec(&meta).unwrap();
        let value: serde_json::Value = serde_json::from_slice(&bytes).unwrap();
        assert!(value.get("description").is_none());
        assert_eq!(meta_from_slice(&bytes).unwrap(), meta);
    }

    #[test]
    fn test_json_malformed_is_recoverable() {
        let err = load_json(r#"{"metadata": {"name": "gizmo"#.as_bytes()).unwrap_err();
        assert!(matches!(err, BomError::DecodeFailed { format: "JSON", .. }));
        assert!(err.is_recoverable());

        let err = load_json(r#"{"bom": {"version": "v1"}}"#.as_bytes()).unwrap_err();
        assert!(matches!(err, BomError::DecodeFailed { .. }));
    }
}
