//! The three structural migrations and their per-field rule table.

use alloc::collections::BTreeSet;
use alloc::format;
use alloc::string::String;
use core::fmt;

/// The single structural operation that produces a version from its
/// predecessor.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Migration {
    /// Introduce a new field.
    AddField {
        /// Name of the added field.
        name: String,
    },
    /// Rename `old_name` to `new_name`, keeping its values.
    RenameField {
        /// Name in the predecessor version.
        old_name: String,
        /// Name in the produced version.
        new_name: String,
    },
    /// Drop a field.
    RemoveField {
        /// Name of the removed field.
        name: String,
    },
}

/// Traversal direction when translating along a lineage.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Direction {
    /// Older version toward newer: apply a migration forward.
    Upgrade,
    /// Newer version toward older: apply a migration in reverse.
    Downgrade,
}

/// What a single migration step does to one field name.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldFate<'a> {
    /// The field keeps its name.
    Keep,
    /// The field is now called by this name.
    Rename(&'a str),
    /// The field does not exist on the other side of the step.
    Drop,
}

impl Migration {
    /// Map `field` across this migration in the given direction.
    ///
    /// | Migration          | Upgrade                  | Downgrade                |
    /// |--------------------|--------------------------|--------------------------|
    /// | `AddField(n)`      | keep                     | drop if `field == n`     |
    /// | `RemoveField(n)`   | drop if `field == n`     | keep                     |
    /// | `RenameField(o,n)` | `o` becomes `n`          | `n` becomes `o`          |
    pub fn map_field(&self, field: &str, direction: Direction) -> FieldFate<'_> {
        match (self, direction) {
            (Self::AddField { name }, Direction::Downgrade)
            | (Self::RemoveField { name }, Direction::Upgrade)
                if name == field =>
            {
                FieldFate::Drop
            }
            (Self::RenameField { old_name, new_name }, Direction::Upgrade)
                if old_name == field =>
            {
                FieldFate::Rename(new_name)
            }
            (Self::RenameField { old_name, new_name }, Direction::Downgrade)
                if new_name == field =>
            {
                FieldFate::Rename(old_name)
            }
            _ => FieldFate::Keep,
        }
    }

    /// Apply this migration forward to a field set.
    pub(crate) fn apply_to_fields(&self, fields: &mut BTreeSet<String>) {
        match self {
            Self::AddField { name } => {
                fields.insert(name.clone());
            }
            Self::RenameField { old_name, new_name } => {
                if fields.remove(old_name) {
                    fields.insert(new_name.clone());
                }
            }
            Self::RemoveField { name } => {
                fields.remove(name);
            }
        }
    }

    /// Check this migration against the field set it would be applied to.
    ///
    /// Only consulted in strict mode.
    pub(crate) fn check_against(&self, fields: &BTreeSet<String>) -> Result<(), String> {
        match self {
            Self::AddField { name } if fields.contains(name) => {
                Err(format!("field {name:?} already exists"))
            }
            Self::RenameField { old_name, .. } if !fields.contains(old_name) => {
                Err(format!("cannot rename missing field {old_name:?}"))
            }
            Self::RenameField { new_name, .. } if fields.contains(new_name) => {
                Err(format!("rename target {new_name:?} already exists"))
            }
            Self::RemoveField { name } if !fields.contains(name) => {
                Err(format!("cannot remove missing field {name:?}"))
            }
            _ => Ok(()),
        }
    }

    /// Field names this migration mentions.
    pub fn field_names(&self) -> impl Iterator<Item = &str> {
        let (first, second) = match self {
            Self::AddField { name } | Self::RemoveField { name } => (name.as_str(), None),
            Self::RenameField { old_name, new_name } => {
                (old_name.as_str(), Some(new_name.as_str()))
            }
        };
        core::iter::once(first).chain(second)
    }
}

impl fmt::Display for Migration {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::AddField { name } => write!(f, "add {name}"),
            Self::RenameField { old_name, new_name } => {
                write!(f, "rename {old_name} -> {new_name}")
            }
            Self::RemoveField { name } => write!(f, "remove {name}"),
        }
    }
}
