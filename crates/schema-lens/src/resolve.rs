//! Path resolution: the migration steps connecting two versions.

use alloc::vec::Vec;

use crate::error::LensError;
use crate::lineage::{Lineage, VersionId};
use crate::migration::Direction;

/// One migration to cross while translating between two versions.
///
/// `version` is the node whose migration is applied: forward when
/// upgrading, inverted when downgrading.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PathStep {
    /// Node carrying the migration to cross.
    pub version: VersionId,
    /// Which way to cross it.
    pub direction: Direction,
}

/// Compute the ordered migration steps leading from `source` to `target`.
///
/// - `target` descends from `source`: every node in `(source, target]`,
///   oldest first, each an [`Direction::Upgrade`].
/// - `source` descends from `target`: every node in `(target, source]`,
///   newest first, each a [`Direction::Downgrade`].
/// - Otherwise the versions sit on different branches and the call fails
///   with [`LensError::UnrelatedVersions`].
///
/// The path is empty when `source == target`. Its length is the chain
/// distance between the two versions.
pub fn resolve_path(
    lineage: &Lineage,
    source: VersionId,
    target: VersionId,
) -> Result<Vec<PathStep>, LensError> {
    lineage.node(source)?;

    if let Some(mut chain) = chain_between(lineage, target, source)? {
        chain.reverse();
        return Ok(steps(chain, Direction::Upgrade));
    }
    if let Some(chain) = chain_between(lineage, source, target)? {
        return Ok(steps(chain, Direction::Downgrade));
    }

    Err(LensError::UnrelatedVersions { source, target })
}

/// Walk `prev` links from `descendant` toward `ancestor`, collecting every
/// node visited before reaching it. `None` if `ancestor` is never reached.
fn chain_between(
    lineage: &Lineage,
    descendant: VersionId,
    ancestor: VersionId,
) -> Result<Option<Vec<VersionId>>, LensError> {
    let mut chain = Vec::new();
    for v in lineage.ancestors(descendant)? {
        if v == ancestor {
            return Ok(Some(chain));
        }
        chain.push(v);
    }
    Ok(None)
}

fn steps(chain: Vec<VersionId>, direction: Direction) -> Vec<PathStep> {
    chain
        .into_iter()
        .map(|version| PathStep { version, direction })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::lineage::EMPTY_SCHEMA;
    use alloc::vec;

    fn up(version: VersionId) -> PathStep {
        PathStep {
            version,
            direction: Direction::Upgrade,
        }
    }

    fn down(version: VersionId) -> PathStep {
        PathStep {
            version,
            direction: Direction::Downgrade,
        }
    }

    fn linear() -> (Lineage, [VersionId; 4]) {
        let mut lineage = Lineage::new();
        let a = lineage.add_field(EMPTY_SCHEMA, "a").unwrap();
        let b = lineage.add_field(a, "b").unwrap();
        let c = lineage.rename_field(b, "a", "z").unwrap();
        (lineage, [EMPTY_SCHEMA, a, b, c])
    }

    #[test]
    fn same_version_is_empty_path() {
        let (lineage, [_, a, _, _]) = linear();
        assert!(resolve_path(&lineage, a, a).unwrap().is_empty());
    }

    #[test]
    fn upgrade_path_is_oldest_first() {
        let (lineage, [root, a, b, c]) = linear();
        let path = resolve_path(&lineage, root, c).unwrap();
        assert_eq!(path, vec![up(a), up(b), up(c)]);
    }

    #[test]
    fn downgrade_path_is_newest_first() {
        let (lineage, [_, a, b, c]) = linear();
        let path = resolve_path(&lineage, c, a).unwrap();
        assert_eq!(path, vec![down(c), down(b)]);
    }

    #[test]
    fn path_length_is_chain_distance() {
        let (lineage, versions) = linear();
        for (i, &from) in versions.iter().enumerate() {
            for (j, &to) in versions.iter().enumerate() {
                let path = resolve_path(&lineage, from, to).unwrap();
                assert_eq!(path.len(), i.abs_diff(j));
            }
        }
    }

    #[test]
    fn cross_branch_fails() {
        let mut lineage = Lineage::new();
        let base = lineage.add_field(EMPTY_SCHEMA, "a").unwrap();
        let left = lineage.add_field(base, "l").unwrap();
        let right = lineage.rename_field(base, "a", "r").unwrap();

        assert_eq!(
            resolve_path(&lineage, left, right),
            Err(LensError::UnrelatedVersions {
                source: left,
                target: right
            })
        );
        // Both branches still reach their common parent.
        assert_eq!(resolve_path(&lineage, left, base).unwrap().len(), 1);
        assert_eq!(resolve_path(&lineage, base, right).unwrap().len(), 1);
    }

    #[test]
    fn unknown_versions_fail() {
        let (lineage, [_, a, _, _]) = linear();
        let bogus = VersionId(77);
        assert_eq!(
            resolve_path(&lineage, bogus, a),
            Err(LensError::UnknownVersion(bogus))
        );
        assert_eq!(
            resolve_path(&lineage, a, bogus),
            Err(LensError::UnknownVersion(bogus))
        );
    }
}
