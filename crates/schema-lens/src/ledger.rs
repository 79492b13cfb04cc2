//! The append-only log of deltas behind an instance, and the handles views
//! use to share it.

use alloc::rc::Rc;
use alloc::vec::Vec;
use core::cell::RefCell;

use crate::delta::Delta;
use crate::error::LensError;

/// Append-only sequence of deltas in write order.
///
/// Entries are never reordered, rewritten, or removed.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Ledger<V> {
    deltas: Vec<Delta<V>>,
}

impl<V> Ledger<V> {
    /// Create an empty ledger.
    #[must_use]
    pub fn new() -> Self {
        Self { deltas: Vec::new() }
    }

    /// Append a delta. Returns its position.
    pub fn append(&mut self, delta: Delta<V>) -> usize {
        self.deltas.push(delta);
        self.deltas.len() - 1
    }

    /// Recorded deltas in write order.
    pub fn deltas(&self) -> &[Delta<V>] {
        &self.deltas
    }

    /// Number of recorded deltas.
    #[must_use]
    pub fn len(&self) -> usize {
        self.deltas.len()
    }

    /// True if nothing has been written.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.deltas.is_empty()
    }

    /// Iterate over recorded deltas in write order.
    pub fn iter(&self) -> impl Iterator<Item = &Delta<V>> {
        self.deltas.iter()
    }
}

impl<V> Default for Ledger<V> {
    fn default() -> Self {
        Self::new()
    }
}

/// Shared access to one instance's ledger.
///
/// Cloning a handle shares the ledger, it never copies it. Every view
/// derived from one instance holds a clone of the same handle.
pub trait LedgerHandle<V>: Clone {
    /// Append a delta to the shared ledger.
    fn append(&self, delta: Delta<V>) -> Result<usize, LensError>;

    /// Run `f` over the recorded deltas. The slice is a stable snapshot for
    /// the duration of the call.
    ///
    /// `f` must not append to the same ledger. [`LocalLedger`] reports such
    /// an append as [`LensError::LedgerBusy`]; [`SyncLedger`] blocks on it
    /// forever.
    fn with_deltas<R>(&self, f: impl FnOnce(&[Delta<V>]) -> R) -> Result<R, LensError>;

    /// Number of recorded deltas.
    fn len(&self) -> Result<usize, LensError> {
        self.with_deltas(|deltas| deltas.len())
    }

    /// True if both handles share one ledger.
    fn same_ledger(&self, other: &Self) -> bool;
}

/// Single-threaded shared ledger.
///
/// An append issued while a read is in progress fails with
/// [`LensError::LedgerBusy`] instead of panicking.
#[derive(Debug)]
pub struct LocalLedger<V>(Rc<RefCell<Ledger<V>>>);

impl<V> LocalLedger<V> {
    /// Create a handle to a new empty ledger.
    #[must_use]
    pub fn new() -> Self {
        Self(Rc::new(RefCell::new(Ledger::new())))
    }
}

impl<V> Default for LocalLedger<V> {
    fn default() -> Self {
        Self::new()
    }
}

impl<V> Clone for LocalLedger<V> {
    fn clone(&self) -> Self {
        Self(Rc::clone(&self.0))
    }
}

impl<V> LedgerHandle<V> for LocalLedger<V> {
    fn append(&self, delta: Delta<V>) -> Result<usize, LensError> {
        let mut ledger = self.0.try_borrow_mut().map_err(|_| LensError::LedgerBusy)?;
        Ok(ledger.append(delta))
    }

    fn with_deltas<R>(&self, f: impl FnOnce(&[Delta<V>]) -> R) -> Result<R, LensError> {
        let ledger = self.0.try_borrow().map_err(|_| LensError::LedgerBusy)?;
        Ok(f(ledger.deltas()))
    }

    fn same_ledger(&self, other: &Self) -> bool {
        Rc::ptr_eq(&self.0, &other.0)
    }
}

#[cfg(feature = "std")]
pub use sync::SyncLedger;

#[cfg(feature = "std")]
mod sync {
    use std::sync::{Arc, RwLock};

    use super::{Delta, Ledger, LedgerHandle, LensError};

    /// Thread-safe shared ledger.
    ///
    /// Appends are serialized by the write lock. A read holds the read lock
    /// for its whole fold, so it observes the ledger exactly as it was when
    /// the read started; appends issued meanwhile wait and land after it.
    ///
    /// The lock is not re-entrant: appending from inside
    /// [`with_deltas`](LedgerHandle::with_deltas) on the same thread
    /// deadlocks.
    #[derive(Debug)]
    pub struct SyncLedger<V>(Arc<RwLock<Ledger<V>>>);

    impl<V> SyncLedger<V> {
        /// Create a handle to a new empty ledger.
        #[must_use]
        pub fn new() -> Self {
            Self(Arc::new(RwLock::new(Ledger::new())))
        }
    }

    impl<V> Default for SyncLedger<V> {
        fn default() -> Self {
            Self::new()
        }
    }

    impl<V> Clone for SyncLedger<V> {
        fn clone(&self) -> Self {
            Self(Arc::clone(&self.0))
        }
    }

    impl<V> LedgerHandle<V> for SyncLedger<V> {
        fn append(&self, delta: Delta<V>) -> Result<usize, LensError> {
            let mut ledger = self.0.write().map_err(|_| LensError::LedgerPoisoned)?;
            Ok(ledger.append(delta))
        }

        fn with_deltas<R>(&self, f: impl FnOnce(&[Delta<V>]) -> R) -> Result<R, LensError> {
            let ledger = self.0.read().map_err(|_| LensError::LedgerPoisoned)?;
            Ok(f(ledger.deltas()))
        }

        fn same_ledger(&self, other: &Self) -> bool {
            Arc::ptr_eq(&self.0, &other.0)
        }
    }
}
