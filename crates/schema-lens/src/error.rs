use alloc::string::String;
use core::fmt;

use crate::lineage::{LineageId, VersionId};

/// Error raised by schema construction, path resolution, translation, or
/// view access.
///
/// `UnrelatedVersions`, `UnknownVersion`, `MissingMigration`,
/// `ForeignLineage` and `CorruptLineage` mean a structural guarantee was
/// broken (a delta or view referring to a version outside the lineage it is
/// used with, or a lineage whose links do not lead back to the root).
/// Callers should treat them as fatal for the affected record: continuing
/// would produce silently wrong data.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LensError {
    /// Neither version is an ancestor of the other.
    UnrelatedVersions {
        /// Version the delta was expressed in.
        source: VersionId,
        /// Version the delta was being translated toward.
        target: VersionId,
    },
    /// The version id does not exist in this lineage.
    UnknownVersion(VersionId),
    /// A translation step named a node with no migration (the root).
    MissingMigration(VersionId),
    /// A field key that can never name a field (currently: the empty string).
    InvalidFieldKey(String),
    /// A migration rejected by strict mode.
    InvalidMigration {
        /// Version the migration would have been applied to.
        version: VersionId,
        /// Why the migration was rejected.
        reason: String,
    },
    /// A view was used with a lineage other than the one it was created
    /// from.
    ForeignLineage {
        /// Lineage the view belongs to.
        expected: LineageId,
        /// Lineage it was used with.
        found: LineageId,
    },
    /// A deserialized lineage whose nodes do not form a tree rooted at the
    /// empty schema.
    CorruptLineage {
        /// Offending node.
        version: VersionId,
        /// What is wrong with it.
        reason: &'static str,
    },
    /// The lineage already holds as many versions as a [`VersionId`] can
    /// number.
    LineageFull,
    /// A thread panicked while holding a shared ledger lock.
    LedgerPoisoned,
    /// The ledger was written to while a read of it was still in progress
    /// on the same thread.
    LedgerBusy,
}

impl fmt::Display for LensError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::UnrelatedVersions { source, target } => {
                write!(f, "versions {source} and {target} share no lineage path")
            }
            Self::UnknownVersion(v) => write!(f, "unknown schema version {v}"),
            Self::MissingMigration(v) => write!(f, "schema version {v} carries no migration"),
            Self::InvalidFieldKey(key) => write!(f, "invalid field key: {key:?}"),
            Self::InvalidMigration { version, reason } => {
                write!(f, "invalid migration on {version}: {reason}")
            }
            Self::ForeignLineage { expected, found } => {
                write!(f, "view belongs to {expected}, not {found}")
            }
            Self::CorruptLineage { version, reason } => {
                write!(f, "corrupt lineage at {version}: {reason}")
            }
            Self::LineageFull => write!(f, "lineage has no version ids left"),
            Self::LedgerPoisoned => write!(f, "shared ledger lock poisoned"),
            Self::LedgerBusy => write!(f, "ledger written to during a read of it"),
        }
    }
}

#[cfg(feature = "std")]
impl std::error::Error for LensError {}

/// Validate a field key supplied by a caller.
pub(crate) fn check_field_key(key: &str) -> Result<(), LensError> {
    if key.is_empty() {
        return Err(LensError::InvalidFieldKey(String::from(key)));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use alloc::string::ToString;

    #[test]
    fn display_messages() {
        let err = LensError::UnrelatedVersions {
            source: VersionId(3),
            target: VersionId(5),
        };
        assert_eq!(err.to_string(), "versions v3 and v5 share no lineage path");
        assert_eq!(
            LensError::UnknownVersion(VersionId(9)).to_string(),
            "unknown schema version v9"
        );
        assert_eq!(
            LensError::InvalidFieldKey(String::new()).to_string(),
            "invalid field key: \"\""
        );
        assert_eq!(
            LensError::CorruptLineage {
                version: VersionId(2),
                reason: "prev does not precede node",
            }
            .to_string(),
            "corrupt lineage at v2: prev does not precede node"
        );
        assert_eq!(
            LensError::LedgerBusy.to_string(),
            "ledger written to during a read of it"
        );
    }

    #[test]
    fn empty_key_rejected() {
        assert_eq!(
            check_field_key(""),
            Err(LensError::InvalidFieldKey(String::new()))
        );
        assert!(check_field_key("title").is_ok());
    }
}
