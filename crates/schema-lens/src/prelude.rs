//! Convenient re-exports for common usage.
//!
//! ```
//! use schema_lens::prelude::*;
//! ```

pub use crate::Delta;
pub use crate::LedgerHandle;
pub use crate::LensConfig;
pub use crate::LensError;
pub use crate::Lineage;
pub use crate::Migration;
pub use crate::VersionId;
pub use crate::View;
pub use crate::EMPTY_SCHEMA;
