/// Configuration for a [`Lineage`](crate::Lineage).
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct LensConfig {
    /// If true, reject migrations that do not fit the field set of the
    /// version they extend: adding a field that exists, renaming a missing
    /// field or onto an existing one, removing a missing field.
    ///
    /// Off by default. Permissive lineages accept every migration and let
    /// translation sort out the consequences.
    pub strict_migrations: bool,
}

impl LensConfig {
    /// A configuration with strict migration checking enabled.
    #[must_use]
    pub fn strict() -> Self {
        Self {
            strict_migrations: true,
        }
    }
}
