//! Explicit transaction scope for mutating operations.
//!
//! A [`UnitOfWork`] is begun at the start of a request (or a seed run), lent
//! to every service call that must share its atomicity, and finished with
//! [`UnitOfWork::commit`]. Dropping it without committing rolls back.

use crate::errors::ServiceError;
use sea_orm::{DatabaseConnection, DatabaseTransaction, TransactionTrait};
use tracing::{debug, warn};
use uuid::Uuid;

pub struct UnitOfWork {
    id: Uuid,
    txn: Option<DatabaseTransaction>,
}

impl UnitOfWork {
    pub async fn begin(db: &DatabaseConnection) -> Result<Self, ServiceError> {
        let txn = db.begin().await?;
        let id = Uuid::new_v4();
        debug!(unit_of_work = %id, "unit of work started");
        Ok(Self { id, txn: Some(txn) })
    }

    /// Connection every statement of this unit runs on.
    pub fn conn(&self) -> &DatabaseTransaction {
        // Only `commit`/`rollback` take the transaction, and both consume `self`.
        self.txn
            .as_ref()
            .expect("unit of work accessed after completion")
    }

    pub async fn commit(mut self) -> Result<(), ServiceError> {
        if let Some(txn) = self.txn.take() {
            txn.commit().await?;
            debug!(unit_of_work = %self.id, "unit of work committed");
        }
        Ok(())
    }

    pub async fn rollback(mut self) -> Result<(), ServiceError> {
        if let Some(txn) = self.txn.take() {
            txn.rollback().await?;
            debug!(unit_of_work = %self.id, "unit of work rolled back");
        }
        Ok(())
    }
}

impl Drop for UnitOfWork {
    fn drop(&mut self) {
        // The transaction rolls itself back when dropped.
        if self.txn.is_some() {
            warn!(unit_of_work = %self.id, "unit of work dropped without commit; rolling back");
        }
    }
}

impl std::fmt::Debug for UnitOfWork {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("UnitOfWork")
            .field("id", &self.id)
            .field("open", &self.txn.is_some())
            .finish()
    }
}
