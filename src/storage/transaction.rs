//! Single-writer, whole-database snapshot stack. Grounded on
//! `ADBMS/kk.py`'s `transaction`/`transaction_history` fields and
//! `begin_transaction`/`commit_transaction`/`rollback_transaction`/
//! `stop_transaction`: a deep copy of the *entire* database is pushed
//! before every mutation while a transaction is open; `rollback` pops and
//! restores one; `commit` just discards the most recent snapshot without
//! closing the transaction; `stop` clears the stack and closes it without
//! the ability to roll back. This is a last-write-undo log, not an ACID
//! transaction — see `spec.md` §4.C.

use crate::error::StateError;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum TxState {
    NoTx,
    Active,
    Stopped,
}

/// Generic over the snapshot type so `Database` can plug in its own state
/// as `T` without this module depending on it.
#[derive(Debug)]
pub struct TransactionManager<T> {
    state: TxState,
    stack: Vec<T>,
}

impl<T> Default for TransactionManager<T> {
    fn default() -> Self {
        Self {
            state: TxState::NoTx,
            stack: Vec::new(),
        }
    }
}

impl<T> TransactionManager<T> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_active(&self) -> bool {
        self.state == TxState::Active
    }

    /// Only legal from `NoTx`. A `Stopped` transaction cannot be restarted
    /// with `begin` — `ADBMS/kk.py`'s `begin_transaction` rejects whenever
    /// `self.transaction is not None`, which is true for both the active
    /// and the stopped state alike.
    pub fn begin(&mut self) -> Result<(), StateError> {
        if self.state != TxState::NoTx {
            return Err(StateError::AlreadyActive);
        }
        self.state = TxState::Active;
        self.stack.clear();
        Ok(())
    }

    /// Pushes a pre-image snapshot. No-op (and returns `false`) if no
    /// transaction is open — callers use the return value to decide
    /// whether to snapshot before a mutation at all.
    pub fn snapshot_if_active(&mut self, make_snapshot: impl FnOnce() -> T) -> bool {
        if self.state == TxState::Active {
            self.stack.push(make_snapshot());
            true
        } else {
            false
        }
    }

    /// Pops the most recent snapshot for the caller to restore. Returns
    /// `None` (and logs via the caller) if the stack is empty — rollback
    /// with nothing to undo is a documented no-op, not an error.
    pub fn rollback(&mut self) -> Result<Option<T>, StateError> {
        if self.state != TxState::Active {
            return Err(StateError::NoActiveTransaction);
        }
        Ok(self.stack.pop())
    }

    /// Discards the most recent snapshot, making that change permanent in
    /// the sense that it can no longer be rolled back. The transaction
    /// stays open — this is intentionally not a group commit.
    pub fn commit(&mut self) -> Result<(), StateError> {
        if self.state != TxState::Active {
            return Err(StateError::NoActiveTransaction);
        }
        self.stack.pop();
        Ok(())
    }

    pub fn stop(&mut self) -> Result<(), StateError> {
        if self.state != TxState::Active {
            return Err(StateError::NoActiveTransaction);
        }
        self.state = TxState::Stopped;
        self.stack.clear();
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn begin_twice_fails() {
        let mut tx: TransactionManager<i32> = TransactionManager::new();
        tx.begin().unwrap();
        assert!(tx.begin().is_err());
    }

    #[test]
    fn rollback_with_empty_stack_is_a_no_op_not_an_error() {
        let mut tx: TransactionManager<i32> = TransactionManager::new();
        tx.begin().unwrap();
        assert_eq!(tx.rollback().unwrap(), None);
    }

    #[test]
    fn commit_leaves_transaction_open_for_further_snapshots() {
        let mut tx: TransactionManager<i32> = TransactionManager::new();
        tx.begin().unwrap();
        tx.snapshot_if_active(|| 1);
        tx.commit().unwrap();
        assert!(tx.is_active());
        // commit after commit (nothing left on the stack) is still legal.
        tx.commit().unwrap();
    }

    #[test]
    fn rollback_restores_the_most_recent_snapshot() {
        let mut tx: TransactionManager<i32> = TransactionManager::new();
        tx.begin().unwrap();
        tx.snapshot_if_active(|| 1);
        tx.snapshot_if_active(|| 2);
        assert_eq!(tx.rollback().unwrap(), Some(2));
    }

    #[test]
    fn stop_clears_stack_and_closes_transaction() {
        let mut tx: TransactionManager<i32> = TransactionManager::new();
        tx.begin().unwrap();
        tx.snapshot_if_active(|| 1);
        tx.stop().unwrap();
        assert!(!tx.is_active());
        assert!(tx.rollback().is_err());
    }

    #[test]
    fn stopped_transaction_cannot_be_restarted_with_begin() {
        let mut tx: TransactionManager<i32> = TransactionManager::new();
        tx.begin().unwrap();
        tx.stop().unwrap();
        assert!(tx.begin().is_err());
    }

    #[test]
    fn outside_a_transaction_snapshot_if_active_is_a_no_op() {
        let mut tx: TransactionManager<i32> = TransactionManager::new();
        let mut called = false;
        let took = tx.snapshot_if_active(|| {
            called = true;
            1
        });
        assert!(!took);
        assert!(!called);
    }
}
