//! Schema versions stored as an append-only arena.
//!
//! Every [`Lineage`] starts with the empty schema at [`VersionId::ROOT`].
//! Each builder call appends one node whose parent is the version it was
//! called on, so the arena forms a tree. Nodes are never mutated after
//! they are created, and version equality is plain id comparison.
//!
//! Version ids are only meaningful inside the lineage that issued them, so
//! every lineage also carries a process-unique [`LineageId`] that views are
//! stamped with.

use alloc::collections::BTreeSet;
use alloc::string::String;
use alloc::vec;
use alloc::vec::Vec;
use core::fmt;
use core::sync::atomic::{AtomicU64, Ordering};

use crate::config::LensConfig;
use crate::error::{check_field_key, LensError};
use crate::migration::Migration;

/// Stable identifier of a schema version within its [`Lineage`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct VersionId(pub u32);

impl VersionId {
    /// The empty schema: no predecessor, no migration.
    pub const ROOT: VersionId = VersionId(0);

    fn index(self) -> usize {
        self.0 as usize
    }
}

impl fmt::Display for VersionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "v{}", self.0)
    }
}

/// The empty schema every lineage is rooted at.
pub const EMPTY_SCHEMA: VersionId = VersionId::ROOT;

static NEXT_LINEAGE: AtomicU64 = AtomicU64::new(1);

/// Identity of one [`Lineage`] value within this process.
///
/// Assigned on construction, on clone and on deserialization; never
/// persisted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct LineageId(u64);

impl LineageId {
    fn fresh() -> Self {
        Self(NEXT_LINEAGE.fetch_add(1, Ordering::Relaxed))
    }
}

impl fmt::Display for LineageId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "lineage#{}", self.0)
    }
}

/// Id for the node about to be pushed onto an arena of `len` nodes.
fn next_id(len: usize) -> Result<VersionId, LensError> {
    u32::try_from(len)
        .map(VersionId)
        .map_err(|_| LensError::LineageFull)
}

/// One node of the lineage tree.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct VersionNode {
    /// Predecessor, `None` only for the root.
    pub prev: Option<VersionId>,
    /// Migration that produced this node from `prev`, `None` only for the root.
    pub migration: Option<Migration>,
}

/// An arena of schema versions linked by single-parent references.
///
/// Equality compares the versions and configuration, not the identity.
/// A clone is a separate lineage: it starts out equal but gets its own
/// [`LineageId`], so views created from one cannot be read through the
/// other.
///
/// # Example
///
/// ```
/// use schema_lens::{Lineage, EMPTY_SCHEMA};
///
/// let mut lineage = Lineage::new();
/// let v1 = lineage.add_field(EMPTY_SCHEMA, "message").unwrap();
/// let v2 = lineage.rename_field(v1, "message", "printout").unwrap();
///
/// assert_eq!(lineage.prev(v2).unwrap(), Some(v1));
/// assert!(lineage.is_ancestor(v1, v2).unwrap());
/// assert!(lineage.fields(v2).unwrap().contains("printout"));
/// ```
#[derive(Debug)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(try_from = "RawLineage"))]
pub struct Lineage {
    #[cfg_attr(feature = "serde", serde(skip_serializing))]
    id: LineageId,
    nodes: Vec<VersionNode>,
    config: LensConfig,
}

impl Clone for Lineage {
    fn clone(&self) -> Self {
        Self {
            id: LineageId::fresh(),
            nodes: self.nodes.clone(),
            config: self.config,
        }
    }
}

impl PartialEq for Lineage {
    fn eq(&self, other: &Self) -> bool {
        self.nodes == other.nodes && self.config == other.config
    }
}

impl Eq for Lineage {}

/// Serialized form of a [`Lineage`], checked before it is accepted.
#[cfg(feature = "serde")]
#[derive(serde::Deserialize)]
struct RawLineage {
    nodes: Vec<VersionNode>,
    config: LensConfig,
}

#[cfg(feature = "serde")]
impl TryFrom<RawLineage> for Lineage {
    type Error = LensError;

    fn try_from(raw: RawLineage) -> Result<Self, LensError> {
        Self::from_nodes(raw.nodes, raw.config)
    }
}

/// Check that `nodes` is a tree rooted at the empty schema whose parents
/// always precede their children. Every version then reaches the root in
/// finitely many steps.
fn validate_nodes(nodes: &[VersionNode]) -> Result<(), LensError> {
    let corrupt = |version: VersionId, reason: &'static str| LensError::CorruptLineage {
        version,
        reason,
    };
    let root = nodes
        .first()
        .ok_or_else(|| corrupt(VersionId::ROOT, "missing root"))?;
    if root.prev.is_some() || root.migration.is_some() {
        return Err(corrupt(VersionId::ROOT, "root must have no prev and no migration"));
    }
    for (index, node) in nodes.iter().enumerate().skip(1) {
        let version = next_id(index)?;
        match node.prev {
            Some(prev) if prev < version => {}
            Some(_) => return Err(corrupt(version, "prev does not precede node")),
            None => return Err(corrupt(version, "non-root node without prev")),
        }
        let migration = node
            .migration
            .as_ref()
            .ok_or_else(|| corrupt(version, "non-root node without migration"))?;
        if migration.field_names().any(str::is_empty) {
            return Err(corrupt(version, "empty field name"));
        }
    }
    Ok(())
}

impl Lineage {
    /// Create a lineage holding only the empty schema.
    #[must_use]
    pub fn new() -> Self {
        Self::with_config(LensConfig::default())
    }

    /// Create a lineage with the given configuration.
    #[must_use]
    pub fn with_config(config: LensConfig) -> Self {
        Self {
            id: LineageId::fresh(),
            nodes: vec![VersionNode {
                prev: None,
                migration: None,
            }],
            config,
        }
    }

    /// Rebuild a lineage from stored nodes, indexed by version id.
    ///
    /// Fails with [`LensError::CorruptLineage`] unless node 0 is a bare
    /// root and every other node has a migration and a `prev` older than
    /// itself.
    pub fn from_nodes(nodes: Vec<VersionNode>, config: LensConfig) -> Result<Self, LensError> {
        validate_nodes(&nodes)?;
        Ok(Self {
            id: LineageId::fresh(),
            nodes,
            config,
        })
    }

    /// Identity of this lineage value.
    pub fn id(&self) -> LineageId {
        self.id
    }

    /// The configuration this lineage was created with.
    pub fn config(&self) -> &LensConfig {
        &self.config
    }

    /// Number of versions, the root included.
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    /// Always false: the root is present from construction.
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Return a new version that adds `name` to `version`.
    pub fn add_field(&mut self, version: VersionId, name: &str) -> Result<VersionId, LensError> {
        self.derive(version, Migration::AddField { name: name.into() })
    }

    /// Return a new version that renames `old_name` to `new_name`.
    pub fn rename_field(
        &mut self,
        version: VersionId,
        old_name: &str,
        new_name: &str,
    ) -> Result<VersionId, LensError> {
        self.derive(
            version,
            Migration::RenameField {
                old_name: old_name.into(),
                new_name: new_name.into(),
            },
        )
    }

    /// Return a new version that removes `name` from `version`.
    pub fn remove_field(&mut self, version: VersionId, name: &str) -> Result<VersionId, LensError> {
        self.derive(version, Migration::RemoveField { name: name.into() })
    }

    /// Append a child of `version` produced by `migration`.
    pub fn derive(
        &mut self,
        version: VersionId,
        migration: Migration,
    ) -> Result<VersionId, LensError> {
        self.node(version)?;
        for name in migration.field_names() {
            check_field_key(name)?;
        }
        if self.config.strict_migrations {
            let fields = self.fields(version)?;
            migration
                .check_against(&fields)
                .map_err(|reason| LensError::InvalidMigration { version, reason })?;
        }

        let id = next_id(self.nodes.len())?;
        tracing::debug!(parent = %version, child = %id, %migration, "derived schema version");
        self.nodes.push(VersionNode {
            prev: Some(version),
            migration: Some(migration),
        });
        Ok(id)
    }

    /// Look up a node.
    pub fn node(&self, version: VersionId) -> Result<&VersionNode, LensError> {
        self.nodes
            .get(version.index())
            .ok_or(LensError::UnknownVersion(version))
    }

    /// Predecessor of `version`.
    pub fn prev(&self, version: VersionId) -> Result<Option<VersionId>, LensError> {
        Ok(self.node(version)?.prev)
    }

    /// Migration that produced `version`.
    pub fn migration(&self, version: VersionId) -> Result<Option<&Migration>, LensError> {
        Ok(self.node(version)?.migration.as_ref())
    }

    /// Iterate from `version` back to the root, `version` first.
    pub fn ancestors(&self, version: VersionId) -> Result<Ancestors<'_>, LensError> {
        self.node(version)?;
        Ok(Ancestors {
            lineage: self,
            next: Some(version),
        })
    }

    /// Number of migrations between the root and `version`.
    pub fn depth(&self, version: VersionId) -> Result<usize, LensError> {
        Ok(self.ancestors(version)?.count() - 1)
    }

    /// True if `ancestor` is reachable from `version` by following `prev`
    /// links. A version counts as its own ancestor.
    pub fn is_ancestor(&self, ancestor: VersionId, version: VersionId) -> Result<bool, LensError> {
        self.node(ancestor)?;
        Ok(self.ancestors(version)?.any(|v| v == ancestor))
    }

    /// The field set of `version`, replayed from the root.
    pub fn fields(&self, version: VersionId) -> Result<BTreeSet<String>, LensError> {
        let mut chain: Vec<VersionId> = self.ancestors(version)?.collect();
        chain.reverse();

        let mut fields = BTreeSet::new();
        for v in chain {
            if let Some(migration) = &self.nodes[v.index()].migration {
                migration.apply_to_fields(&mut fields);
            }
        }
        Ok(fields)
    }

    /// All version ids in creation order.
    pub fn versions(&self) -> impl Iterator<Item = VersionId> + '_ {
        (0..=u32::MAX).take(self.nodes.len()).map(VersionId)
    }
}

impl Default for Lineage {
    fn default() -> Self {
        Self::new()
    }
}

/// Iterator over a version and its ancestors, see [`Lineage::ancestors`].
pub struct Ancestors<'a> {
    lineage: &'a Lineage,
    next: Option<VersionId>,
}

impl Iterator for Ancestors<'_> {
    type Item = VersionId;

    fn next(&mut self) -> Option<VersionId> {
        let current = self.next?;
        self.next = self
            .lineage
            .nodes
            .get(current.index())
            .and_then(|node| node.prev);
        Some(current)
    }
}
