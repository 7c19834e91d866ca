//! Versioned BOM persistence and interchange.
//!
//! A BOM is owned by a user and addressed by `(owner, name)`. Each persisted
//! [`Bom`] is an immutable snapshot at a given version; the mutable
//! [`BomMeta`] record points at the current one through its `head_version`.
//!
//! * [`model`] – the in-memory data model.
//! * [`short_name`] – the [`ShortName`] identifier used for owners, names
//!   and versions.
//! * [`formats`] – JSON, CSV and XML load/dump codecs plus a text renderer.
//! * [`store`] – the [`BomStore`] contract and its directory-backed and
//!   in-memory implementations.

pub mod error;
pub mod formats;
pub mod model;
pub mod short_name;
pub mod store;

pub use error::{BomError, Result, ValidationError};
pub use formats::{BomFormat, CsvOptions, ElementFilter};
pub use model::{Bom, BomMeta, LineItem, Offer, OfferPrice};
pub use short_name::{ShortName, is_short_name};
pub use store::{BomStore, JsonFileBomStore, MemoryBomStore};
