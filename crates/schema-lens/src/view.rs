//! Per-version read/write lenses over a shared ledger.

use alloc::collections::BTreeMap;
use alloc::string::String;
use core::marker::PhantomData;

use crate::delta::{translate_delta, Delta};
use crate::error::{check_field_key, LensError};
use crate::ledger::{LedgerHandle, LocalLedger};
use crate::lineage::{Lineage, LineageId, VersionId};

/// A lens pairing a shared ledger with the version it reads and writes
/// through.
///
/// Views hold no state of their own. Every read replays the whole ledger,
/// translating each delta from the version it was recorded in.
///
/// A view remembers the [`Lineage`] it was created from and refuses to be
/// read through any other one with [`LensError::ForeignLineage`].
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
/// let old = lineage.new_instance(v1, [("message", "hello")]).unwrap();
/// let new = lineage.view_instance(v2, &old).unwrap();
///
/// assert_eq!(new.get(&lineage, "printout").unwrap(), Some("hello"));
///
/// new.set("printout", "bye").unwrap();
/// assert_eq!(old.get(&lineage, "message").unwrap(), Some("bye"));
/// ```
#[derive(Debug)]
pub struct View<V, H = LocalLedger<V>> {
    lineage: LineageId,
    ledger: H,
    version: VersionId,
    _value: PhantomData<fn() -> V>,
}

impl<V, H: Clone> Clone for View<V, H> {
    fn clone(&self) -> Self {
        Self {
            lineage: self.lineage,
            ledger: self.ledger.clone(),
            version: self.version,
            _value: PhantomData,
        }
    }
}

impl<V: Clone, H: LedgerHandle<V>> View<V, H> {
    fn over(lineage: LineageId, ledger: H, version: VersionId) -> Self {
        Self {
            lineage,
            ledger,
            version,
            _value: PhantomData,
        }
    }

    /// The version this view reads and writes through.
    pub fn version(&self) -> VersionId {
        self.version
    }

    /// Identity of the lineage this view was created from.
    pub fn lineage_id(&self) -> LineageId {
        self.lineage
    }

    /// Handle to the shared ledger.
    pub fn ledger(&self) -> &H {
        &self.ledger
    }

    /// Another view over the same ledger through `version`.
    ///
    /// The version is not checked here; reads report
    /// [`LensError::UnknownVersion`] if the lineage does not contain it.
    pub fn at(&self, version: VersionId) -> Self {
        Self::over(self.lineage, self.ledger.clone(), version)
    }

    /// Record a write of `field` in this view's namespace.
    pub fn set(&self, field: &str, value: V) -> Result<(), LensError> {
        check_field_key(field)?;
        let position = self.ledger.append(Delta::set(self.version, field, value))?;
        tracing::trace!(version = %self.version, field, position, "recorded write");
        Ok(())
    }

    /// Current value of `field` as seen through this view.
    pub fn get(&self, lineage: &Lineage, field: &str) -> Result<Option<V>, LensError> {
        check_field_key(field)?;
        Ok(self.read(lineage)?.remove(field))
    }

    /// Replay the ledger into the field mapping seen through this view.
    pub fn read(&self, lineage: &Lineage) -> Result<BTreeMap<String, V>, LensError> {
        self.check_lineage(lineage)?;
        lineage.node(self.version)?;
        self.ledger.with_deltas(|deltas| replay(deltas, self.version, lineage))?
    }

    /// True if `field` currently holds a value through this view.
    pub fn contains(&self, lineage: &Lineage, field: &str) -> Result<bool, LensError> {
        Ok(self.get(lineage, field)?.is_some())
    }

    fn check_lineage(&self, lineage: &Lineage) -> Result<(), LensError> {
        if self.lineage != lineage.id() {
            return Err(LensError::ForeignLineage {
                expected: self.lineage,
                found: lineage.id(),
            });
        }
        Ok(())
    }
}

/// Fold `deltas` in ledger order into the mapping seen through `version`.
fn replay<V: Clone>(
    deltas: &[Delta<V>],
    version: VersionId,
    lineage: &Lineage,
) -> Result<BTreeMap<String, V>, LensError> {
    let mut state = BTreeMap::new();
    for delta in deltas {
        if let Delta::Set { field, value, .. } = translate_delta(delta, version, lineage)? {
            state.insert(field, value);
        }
    }
    Ok(state)
}

impl Lineage {
    /// Create a single-threaded instance defined at `version`, writing each
    /// `initial` entry in iteration order.
    pub fn new_instance<V, K, I>(
        &self,
        version: VersionId,
        initial: I,
    ) -> Result<View<V>, LensError>
    where
        V: Clone,
        K: AsRef<str>,
        I: IntoIterator<Item = (K, V)>,
    {
        self.instance_in(LocalLedger::new(), version, initial)
    }

    /// Like [`Lineage::new_instance`], backed by a ledger that can be shared
    /// across threads.
    #[cfg(feature = "std")]
    pub fn new_shared_instance<V, K, I>(
        &self,
        version: VersionId,
        initial: I,
    ) -> Result<View<V, crate::ledger::SyncLedger<V>>, LensError>
    where
        V: Clone,
        K: AsRef<str>,
        I: IntoIterator<Item = (K, V)>,
    {
        self.instance_in(crate::ledger::SyncLedger::new(), version, initial)
    }

    /// Create an instance over `ledger` defined at `version`.
    ///
    /// `ledger` should be empty or hold deltas recorded against this
    /// lineage: ledgers do not record which lineage wrote them.
    pub fn instance_in<V, H, K, I>(
        &self,
        ledger: H,
        version: VersionId,
        initial: I,
    ) -> Result<View<V, H>, LensError>
    where
        V: Clone,
        H: LedgerHandle<V>,
        K: AsRef<str>,
        I: IntoIterator<Item = (K, V)>,
    {
        self.node(version)?;
        let view = View::over(self.id(), ledger, version);
        let mut written = 0usize;
        for (field, value) in initial {
            view.set(field.as_ref(), value)?;
            written += 1;
        }
        tracing::debug!(%version, fields = written, "created instance");
        Ok(view)
    }

    /// A view of `existing`'s ledger through `version`. The ledger is shared,
    /// not copied.
    pub fn view_instance<V, H>(
        &self,
        version: VersionId,
        existing: &View<V, H>,
    ) -> Result<View<V, H>, LensError>
    where
        V: Clone,
        H: LedgerHandle<V>,
    {
        existing.check_lineage(self)?;
        self.node(version)?;
        Ok(existing.at(version))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::lineage::EMPTY_SCHEMA;

    fn renamed() -> (Lineage, VersionId, VersionId) {
        let mut lineage = Lineage::new();
        let v1 = lineage.add_field(EMPTY_SCHEMA, "message").unwrap();
        let v2 = lineage.rename_field(v1, "message", "printout").unwrap();
        (lineage, v1, v2)
    }

    #[test]
    fn write_then_read_same_view() {
        let (lineage, v1, _) = renamed();
        let view = lineage.new_instance::<i32, &str, _>(v1, []).unwrap();
        view.set("message", 7).unwrap();
        assert_eq!(view.get(&lineage, "message").unwrap(), Some(7));
        assert!(view.contains(&lineage, "message").unwrap());
        assert!(!view.contains(&lineage, "printout").unwrap());
    }

    #[test]
    fn initial_values_are_ledger_writes() {
        let (lineage, v1, _) = renamed();
        let view = lineage
            .new_instance(v1, [("message", 1), ("message", 2)])
            .unwrap();
        assert_eq!(view.ledger().len().unwrap(), 2);
        // Later writes win.
        assert_eq!(view.get(&lineage, "message").unwrap(), Some(2));
    }

    #[test]
    fn views_share_one_ledger() {
        let (lineage, v1, v2) = renamed();
        let a = lineage.new_instance(v1, [("message", "hi")]).unwrap();
        let b = lineage.view_instance(v2, &a).unwrap();
        assert!(a.ledger().same_ledger(b.ledger()));
        assert_eq!(b.version(), v2);

        b.set("printout", "yo").unwrap();
        assert_eq!(a.ledger().len().unwrap(), 2);
        assert_eq!(a.get(&lineage, "message").unwrap(), Some("yo"));
    }

    #[test]
    fn later_writes_overwrite() {
        let (lineage, v1, v2) = renamed();
        let a = lineage.new_instance(v1, [("message", 1)]).unwrap();
        let b = a.at(v2);
        b.set("printout", 2).unwrap();
        a.set("message", 3).unwrap();

        let state = b.read(&lineage).unwrap();
        assert_eq!(state.len(), 1);
        assert_eq!(state.get("printout"), Some(&3));
    }

    #[test]
    fn empty_field_key_rejected() {
        let (lineage, v1, _) = renamed();
        let view = lineage.new_instance::<i32, &str, _>(v1, []).unwrap();
        assert_eq!(
            view.set("", 1),
            Err(LensError::InvalidFieldKey(String::new()))
        );
        assert!(view.get(&lineage, "").is_err());
        assert!(lineage.new_instance(v1, [("", 1)]).is_err());
    }

    #[test]
    fn foreign_lineage_rejected_at_equal_length() {
        let (mine, _, _) = renamed();
        let mut theirs = Lineage::new();
        let t1 = theirs.add_field(EMPTY_SCHEMA, "other").unwrap();
        let t2 = theirs.rename_field(t1, "other", "printout").unwrap();
        assert_eq!(mine.len(), theirs.len());

        let view = mine.new_instance(t2, [("printout", 1)]).unwrap();
        let foreign = LensError::ForeignLineage {
            expected: mine.id(),
            found: theirs.id(),
        };
        assert_eq!(view.read(&theirs).unwrap_err(), foreign);
        assert_eq!(view.get(&theirs, "printout").unwrap_err(), foreign);
        assert_eq!(theirs.view_instance(t1, &view).unwrap_err(), foreign);
        // A clone is its own lineage too.
        assert!(view.read(&mine.clone()).is_err());
        assert_eq!(view.at(t1).lineage_id(), mine.id());
        assert_eq!(view.read(&mine).unwrap().get("printout"), Some(&1));
    }

    #[test]
    fn unknown_version_rejected() {
        let (lineage, v1, _) = renamed();
        let bogus = VersionId(99);
        assert!(lineage.new_instance::<i32, &str, _>(bogus, []).is_err());

        let view = lineage.new_instance::<i32, &str, _>(v1, []).unwrap();
        assert_eq!(
            lineage.view_instance(bogus, &view).unwrap_err(),
            LensError::UnknownVersion(bogus)
        );
        assert_eq!(
            view.at(bogus).read(&lineage).unwrap_err(),
            LensError::UnknownVersion(bogus)
        );
    }
}
