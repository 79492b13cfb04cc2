//! Recorded field writes and their translation across migrations.
//!
//! Translation is a sequential fold of single-migration steps in chain
//! order. Field identity is never tracked globally: when one migration
//! frees a name and a later one reuses it, which recorded value ends up
//! under which name depends on the order the migrations were applied.

use alloc::string::String;

use crate::error::LensError;
use crate::lineage::{Lineage, VersionId};
use crate::migration::{Direction, FieldFate};
use crate::resolve::{resolve_path, PathStep};

/// One recorded field write, tagged with the version whose field namespace
/// it is expressed in.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Delta<V> {
    /// A write that has no meaning in `version`.
    NoOp {
        /// Namespace the delta is expressed in.
        version: VersionId,
    },
    /// Set `field` to `value`.
    Set {
        /// Namespace the delta is expressed in.
        version: VersionId,
        /// Field name in that namespace.
        field: String,
        /// Written value.
        value: V,
    },
}

impl<V> Delta<V> {
    /// A `Set` delta.
    pub fn set(version: VersionId, field: impl Into<String>, value: V) -> Self {
        Self::Set {
            version,
            field: field.into(),
            value,
        }
    }

    /// The version tag.
    pub fn version(&self) -> VersionId {
        match self {
            Self::NoOp { version } | Self::Set { version, .. } => *version,
        }
    }

    /// The written field, `None` for `NoOp`.
    pub fn field(&self) -> Option<&str> {
        match self {
            Self::NoOp { .. } => None,
            Self::Set { field, .. } => Some(field),
        }
    }

    /// The written value, `None` for `NoOp`.
    pub fn value(&self) -> Option<&V> {
        match self {
            Self::NoOp { .. } => None,
            Self::Set { value, .. } => Some(value),
        }
    }

    /// True for `NoOp`.
    pub fn is_noop(&self) -> bool {
        matches!(self, Self::NoOp { .. })
    }

    /// Cross one migration. The result is tagged with the version whose
    /// namespace it now lives in: the step's node when upgrading, the
    /// node's predecessor when downgrading.
    fn step(self, step: PathStep, lineage: &Lineage) -> Result<Self, LensError> {
        let node = lineage.node(step.version)?;
        let migration = node
            .migration
            .as_ref()
            .ok_or(LensError::MissingMigration(step.version))?;
        let tag = match step.direction {
            Direction::Upgrade => step.version,
            Direction::Downgrade => node
                .prev
                .ok_or(LensError::MissingMigration(step.version))?,
        };

        let translated = match self {
            Self::NoOp { .. } => Self::NoOp { version: tag },
            Self::Set { field, value, .. } => match migration.map_field(&field, step.direction) {
                FieldFate::Keep => Self::Set {
                    version: tag,
                    field,
                    value,
                },
                FieldFate::Rename(name) => Self::Set {
                    version: tag,
                    field: name.into(),
                    value,
                },
                FieldFate::Drop => Self::NoOp { version: tag },
            },
        };
        tracing::trace!(
            node = %step.version,
            direction = ?step.direction,
            %migration,
            noop = translated.is_noop(),
            "translated delta step"
        );
        Ok(translated)
    }
}

/// Translate `delta` across a single migration step.
///
/// `NoOp` deltas stay `NoOp`; only their tag moves.
pub fn translate_step<V: Clone>(
    delta: &Delta<V>,
    step: PathStep,
    lineage: &Lineage,
) -> Result<Delta<V>, LensError> {
    delta.clone().step(step, lineage)
}

/// Translate `delta` from its own version to `target`.
///
/// Re-translating the result toward the same target returns it unchanged.
pub fn translate_delta<V: Clone>(
    delta: &Delta<V>,
    target: VersionId,
    lineage: &Lineage,
) -> Result<Delta<V>, LensError> {
    let path = resolve_path(lineage, delta.version(), target)?;
    path.into_iter()
        .try_fold(delta.clone(), |d, step| d.step(step, lineage))
}
