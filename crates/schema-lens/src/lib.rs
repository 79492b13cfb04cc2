//! # schema-lens
//!
//! Schema-evolving views over one shared record.
//!
//! A record lives as an append-only [`Ledger`] of field writes. Each write
//! is a [`Delta`] tagged with the schema version it was made through. Any
//! number of [`View`]s, each bound to a different version of an evolving
//! schema, read and write the same ledger. A read replays every delta,
//! translating it from the version it was recorded in to the view's own.
//!
//! ## Schemas as migration chains
//!
//! Versions live in a [`Lineage`], an arena rooted at [`EMPTY_SCHEMA`].
//! Every version is produced from its predecessor by exactly one
//! [`Migration`]: add, rename, or remove a field.
//!
//! ```
//! use schema_lens::prelude::*;
//!
//! let mut lineage = Lineage::new();
//! let v1 = lineage.add_field(EMPTY_SCHEMA, "fieldX").unwrap();
//! let v1 = lineage.add_field(v1, "fieldY").unwrap();
//!
//! let v2 = lineage.remove_field(v1, "fieldY").unwrap();
//! let v2 = lineage.rename_field(v2, "fieldX", "fieldY").unwrap();
//! let v2 = lineage.add_field(v2, "fieldX").unwrap();
//!
//! let view1 = lineage.new_instance(v1, [("fieldX", "A"), ("fieldY", "B")]).unwrap();
//! let view2 = lineage.view_instance(v2, &view1).unwrap();
//!
//! assert_eq!(view2.get(&lineage, "fieldX").unwrap(), None);
//! assert_eq!(view2.get(&lineage, "fieldY").unwrap(), Some("A"));
//! ```
//!
//! ## Translation
//!
//! [`resolve_path`] finds the migrations between two versions on one
//! ancestor path, and [`translate_delta`] folds a delta across them one
//! step at a time. Writes to a field that does not exist on the other side
//! of a step collapse to [`Delta::NoOp`] and stay that way. Versions on
//! different branches cannot be reconciled and report
//! [`LensError::UnrelatedVersions`].
//!
//! ## `no_std` Support
//!
//! The crate needs only `alloc`. Disable the default `std` feature to drop
//! [`SyncLedger`] and the `std::error::Error` impl.

#![cfg_attr(not(feature = "std"), no_std)]
#![warn(missing_docs)]

extern crate alloc;

mod config;
mod delta;
mod error;
mod ledger;
mod lineage;
mod migration;
mod resolve;
mod view;

pub mod prelude;

pub use config::LensConfig;
pub use delta::{translate_delta, translate_step, Delta};
pub use error::LensError;
#[cfg(feature = "std")]
pub use ledger::SyncLedger;
pub use ledger::{Ledger, LedgerHandle, LocalLedger};
pub use lineage::{Ancestors, Lineage, LineageId, VersionId, VersionNode, EMPTY_SCHEMA};
pub use migration::{Direction, FieldFate, Migration};
pub use resolve::{resolve_path, PathStep};
pub use view::View;
