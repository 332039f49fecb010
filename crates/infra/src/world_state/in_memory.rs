use std::collections::{BTreeMap, HashSet};
use std::ops::Bound;
use std::sync::atomic::{AtomicU64, AtomicUsize, Ordering};
use std::sync::{Mutex, RwLock};

use uuid::Uuid;

use supplychain_core::{ClientId, TxId, TxTimestamp};

use super::{CursorGuard, KeyValue, StateError, StateRangeIter, WorldState};
use crate::context::{ContextError, TransactionContext};

/// Host failure modes that can be switched on for tests.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub enum Fault {
    /// Point reads fail.
    Reads,
    /// Point writes fail.
    Writes,
    /// Opening a range scan fails.
    Scans,
    /// The transaction context cannot supply a timestamp.
    Timestamp,
}

/// In-memory simulated ledger host.
///
/// Committed state lives in a `BTreeMap`, so scans are in lexicographic key
/// order. Intended for tests/dev. Not optimized for performance.
#[derive(Debug, Default)]
pub struct InMemoryLedger {
    committed: RwLock<BTreeMap<String, Vec<u8>>>,
    faults: RwLock<HashSet<Fault>>,
    open_cursors: AtomicUsize,
    height: AtomicU64,
}

impl InMemoryLedger {
    pub fn new() -> Self {
        Self::default()
    }

    /// Start a simulated transaction with a host-generated id.
    pub fn begin_at(&self, timestamp: TxTimestamp) -> LedgerTransaction<'_> {
        self.begin(TxId::new(Uuid::now_v7().to_string()), timestamp)
    }

    /// Start a simulated transaction.
    ///
    /// Reads see committed state only; writes are buffered until `commit`.
    pub fn begin(&self, tx_id: impl Into<TxId>, timestamp: TxTimestamp) -> LedgerTransaction<'_> {
        LedgerTransaction {
            ledger: self,
            tx_id: tx_id.into(),
            timestamp,
            client_id: None,
            writes: Mutex::new(BTreeMap::new()),
        }
    }

    pub fn inject_fault(&self, fault: Fault) {
        if let Ok(mut faults) = self.faults.write() {
            faults.insert(fault);
        }
    }

    pub fn clear_faults(&self) {
        if let Ok(mut faults) = self.faults.write() {
            faults.clear();
        }
    }

    fn has_fault(&self, fault: Fault) -> bool {
        self.faults
            .read()
            .map(|faults| faults.contains(&fault))
            .unwrap_or(false)
    }

    /// Committed value for `key`, bypassing any transaction.
    pub fn get(&self, key: &str) -> Option<Vec<u8>> {
        self.committed.read().ok()?.get(key).cloned()
    }

    /// Write committed state directly (seeding fixtures, corrupt records, ...).
    pub fn put_raw(&self, key: impl Into<String>, value: impl Into<Vec<u8>>) {
        if let Ok(mut committed) = self.committed.write() {
            committed.insert(key.into(), value.into());
        }
    }

    pub fn keys(&self) -> Vec<String> {
        match self.committed.read() {
            Ok(committed) => committed.keys().cloned().collect(),
            Err(_) => vec![],
        }
    }

    pub fn len(&self) -> usize {
        self.committed.read().map(|c| c.len()).unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Range cursors currently open against this ledger.
    pub fn open_cursors(&self) -> usize {
        self.open_cursors.load(Ordering::SeqCst)
    }

    /// Number of committed transactions that wrote at least one key.
    pub fn height(&self) -> u64 {
        self.height.load(Ordering::SeqCst)
    }

    fn read_committed(&self, key: &str) -> Result<Option<Vec<u8>>, StateError> {
        if self.has_fault(Fault::Reads) {
            return Err(StateError::Read(format!("injected read fault for key '{key}'")));
        }
        let committed = self.committed.read().map_err(|_| StateError::Poisoned)?;
        Ok(committed.get(key).cloned())
    }

    fn scan_committed(&self, start_key: &str, end_key: &str) -> Result<StateRangeIter<'_>, StateError> {
        if self.has_fault(Fault::Scans) {
            return Err(StateError::Scan("injected scan fault".to_string()));
        }

        let lower = if start_key.is_empty() {
            Bound::Unbounded
        } else {
            Bound::Included(start_key)
        };
        let upper = if end_key.is_empty() {
            Bound::Unbounded
        } else {
            Bound::Excluded(end_key)
        };

        let snapshot: Vec<KeyValue> = {
            let committed = self.committed.read().map_err(|_| StateError::Poisoned)?;
            // BTreeMap::range panics on inverted bounds.
            if !start_key.is_empty() && !end_key.is_empty() && start_key > end_key {
                Vec::new()
            } else {
                committed
                    .range::<str, _>((lower, upper))
                    .map(|(k, v)| KeyValue::new(k.clone(), v.clone()))
                    .collect()
            }
        };

        self.open_cursors.fetch_add(1, Ordering::SeqCst);
        let guard = CursorGuard::new(move || {
            self.open_cursors.fetch_sub(1, Ordering::SeqCst);
        });

        Ok(StateRangeIter::new(snapshot.into_iter().map(Ok), guard))
    }
}

/// One simulated transaction against an [`InMemoryLedger`].
///
/// Mirrors ledger-host semantics: reads come from committed state (a
/// transaction does not observe its own buffered writes), and nothing becomes
/// visible until `commit`. Dropping the transaction discards its writes.
#[derive(Debug)]
pub struct LedgerTransaction<'l> {
    ledger: &'l InMemoryLedger,
    tx_id: TxId,
    timestamp: TxTimestamp,
    client_id: Option<ClientId>,
    writes: Mutex<BTreeMap<String, Vec<u8>>>,
}

impl<'l> LedgerTransaction<'l> {
    pub fn with_client(mut self, client_id: impl Into<ClientId>) -> Self {
        self.client_id = Some(client_id.into());
        self
    }

    /// Keys written so far (not yet committed).
    pub fn pending_writes(&self) -> Vec<String> {
        match self.writes.lock() {
            Ok(writes) => writes.keys().cloned().collect(),
            Err(_) => vec![],
        }
    }

    /// Apply the whole write set atomically. Returns the number of keys written.
    pub fn commit(self) -> Result<usize, StateError> {
        let writes = self.writes.into_inner().map_err(|_| StateError::Poisoned)?;
        let written = writes.len();
        if written == 0 {
            return Ok(0);
        }

        let mut committed = self
            .ledger
            .committed
            .write()
            .map_err(|_| StateError::Poisoned)?;
        committed.extend(writes);
        self.ledger.height.fetch_add(1, Ordering::SeqCst);

        tracing::debug!(tx_id = %self.tx_id, written, "transaction committed");
        Ok(written)
    }
}

impl WorldState for LedgerTransaction<'_> {
    fn get_state(&self, key: &str) -> Result<Option<Vec<u8>>, StateError> {
        self.ledger.read_committed(key)
    }

    fn put_state(&self, key: &str, value: Vec<u8>) -> Result<(), StateError> {
        if key.is_empty() {
            return Err(StateError::InvalidKey("key must not be empty".to_string()));
        }
        if self.ledger.has_fault(Fault::Writes) {
            return Err(StateError::Write(format!("injected write fault for key '{key}'")));
        }
        let mut writes = self.writes.lock().map_err(|_| StateError::Poisoned)?;
        writes.insert(key.to_string(), value);
        Ok(())
    }

    fn get_state_by_range(
        &self,
        start_key: &str,
        end_key: &str,
    ) -> Result<StateRangeIter<'_>, StateError> {
        self.ledger.scan_committed(start_key, end_key)
    }
}

impl TransactionContext for LedgerTransaction<'_> {
    type State = Self;

    fn state(&self) -> &Self::State {
        self
    }

    fn tx_id(&self) -> &TxId {
        &self.tx_id
    }

    fn tx_timestamp(&self) -> Result<TxTimestamp, ContextError> {
        if self.ledger.has_fault(Fault::Timestamp) {
            return Err(ContextError::TimestampUnavailable(
                "injected timestamp fault".to_string(),
            ));
        }
        Ok(self.timestamp)
    }

    fn client_id(&self) -> Option<&ClientId> {
        self.client_id.as_ref()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ts(seconds: i64) -> TxTimestamp {
        TxTimestamp::new(seconds, 0)
    }

    fn seeded() -> InMemoryLedger {
        let ledger = InMemoryLedger::new();
        for key in ["c", "a", "e", "b", "d"] {
            ledger.put_raw(key, format!("v{key}"));
        }
        ledger
    }

    fn scan_keys(ledger: &InMemoryLedger, start: &str, end: &str) -> Vec<String> {
        let tx = ledger.begin("scan", ts(0));
        let keys = tx
            .get_state_by_range(start, end)
            .unwrap()
            .map(|kv| kv.unwrap().key)
            .collect();
        keys
    }

    #[test]
    fn writes_are_invisible_until_commit() {
        let ledger = InMemoryLedger::new();
        let tx = ledger.begin("tx1", ts(1));
        tx.put_state("k", b"v".to_vec()).unwrap();

        assert_eq!(tx.get_state("k").unwrap(), None);
        assert_eq!(ledger.get("k"), None);
        assert_eq!(tx.pending_writes(), vec!["k".to_string()]);

        assert_eq!(tx.commit().unwrap(), 1);
        assert_eq!(ledger.get("k"), Some(b"v".to_vec()));
        assert_eq!(ledger.height(), 1);
    }

    #[test]
    fn dropped_transaction_discards_writes() {
        let ledger = InMemoryLedger::new();
        {
            let tx = ledger.begin("tx1", ts(1));
            tx.put_state("k", b"v".to_vec()).unwrap();
        }
        assert!(ledger.is_empty());
        assert_eq!(ledger.height(), 0);
    }

    #[test]
    fn empty_bounds_scan_everything_in_key_order() {
        let ledger = seeded();
        assert_eq!(scan_keys(&ledger, "", ""), vec!["a", "b", "c", "d", "e"]);
    }

    #[test]
    fn range_is_start_inclusive_end_exclusive() {
        let ledger = seeded();
        assert_eq!(scan_keys(&ledger, "b", "d"), vec!["b", "c"]);
        assert_eq!(scan_keys(&ledger, "c", ""), vec!["c", "d", "e"]);
        assert_eq!(scan_keys(&ledger, "", "b"), vec!["a"]);
    }

    #[test]
    fn inverted_and_degenerate_ranges_are_empty() {
        let ledger = seeded();
        assert!(scan_keys(&ledger, "d", "b").is_empty());
        assert!(scan_keys(&ledger, "c", "c").is_empty());
    }

    #[test]
    fn scan_is_bounded_by_keys_present_at_start() {
        let ledger = seeded();
        let tx = ledger.begin("scan", ts(0));
        let mut iter = tx.get_state_by_range("", "").unwrap();
        assert_eq!(iter.next().unwrap().unwrap().key, "a");
        ledger.put_raw("f", "late");
        assert_eq!(iter.count(), 4);
    }

    #[test]
    fn cursors_are_released_on_every_path() {
        let ledger = seeded();
        let tx = ledger.begin("scan", ts(0));

        let exhausted: Vec<_> = tx.get_state_by_range("", "").unwrap().collect();
        assert_eq!(exhausted.len(), 5);
        assert_eq!(ledger.open_cursors(), 0);

        let mut early = tx.get_state_by_range("", "").unwrap();
        let _ = early.next();
        assert_eq!(ledger.open_cursors(), 1);
        drop(early);
        assert_eq!(ledger.open_cursors(), 0);
    }

    #[test]
    fn faults_surface_as_state_errors() {
        let ledger = seeded();
        let tx = ledger.begin("faulty", ts(0));

        ledger.inject_fault(Fault::Reads);
        assert!(matches!(tx.get_state("a"), Err(StateError::Read(_))));

        ledger.inject_fault(Fault::Writes);
        assert!(matches!(tx.put_state("z", vec![]), Err(StateError::Write(_))));

        ledger.inject_fault(Fault::Scans);
        assert!(matches!(tx.get_state_by_range("", ""), Err(StateError::Scan(_))));
        assert_eq!(ledger.open_cursors(), 0);

        ledger.inject_fault(Fault::Timestamp);
        assert!(tx.tx_timestamp().is_err());

        ledger.clear_faults();
        assert_eq!(tx.get_state("a").unwrap(), Some(b"va".to_vec()));
        assert_eq!(tx.tx_timestamp().unwrap(), ts(0));
    }

    #[test]
    fn empty_keys_cannot_be_written() {
        let ledger = InMemoryLedger::new();
        let tx = ledger.begin("tx", ts(0));
        assert!(matches!(tx.put_state("", vec![1]), Err(StateError::InvalidKey(_))));
    }

    #[test]
    fn context_exposes_host_identity() {
        let ledger = InMemoryLedger::new();
        let tx = ledger.begin("tx-42", ts(7)).with_client("Org1MSP");
        assert_eq!(tx.tx_id().as_str(), "tx-42");
        assert_eq!(tx.client_id().map(|c| c.as_str()), Some("Org1MSP"));

        let generated = ledger.begin_at(ts(7));
        assert!(!generated.tx_id().as_str().is_empty());
        assert_eq!(generated.client_id(), None);
    }
}
