//! Thin façade exposed to external operation handlers.
//!
//! Operation handlers (LDAP Add/Modify/Delete/ModifyDN/Search/Bind
//! processors, outside this crate's scope) call `addRead`/`addWrite` as they
//! touch regions of the namespace, and `logUserData` to attach whatever
//! operation-specific payload they want replayed on recovery. `LogManager`
//! does not interpret that payload; it only tags it with the calling
//! transaction and the kind of directory operation that produced it.

use dirtxn_core::dn::DistinguishedName;
use dirtxn_core::error::Result;
use dirtxn_core::scope::SearchScope;
use dirtxn_core::types::{OpKind, TransactionId};

use crate::manager::TransactionManager;

/// Facade over [`TransactionManager`] for code outside this crate that
/// processes directory operations and needs to record what they touched.
pub struct LogManager<'a> {
    manager: &'a TransactionManager,
}

impl<'a> LogManager<'a> {
    /// Wrap `manager` for use by an operation handler.
    pub fn new(manager: &'a TransactionManager) -> Self {
        LogManager { manager }
    }

    /// Record that `txn_id` read `dn` under `scope`.
    pub fn add_read(&self, txn_id: TransactionId, dn: DistinguishedName, scope: SearchScope) -> Result<()> {
        self.manager.add_read(txn_id, dn, scope)
    }

    /// Record that `txn_id` wrote `dn` under `scope`, tagged with `kind` for
    /// the benefit of whatever interprets `logUserData` payloads during
    /// replay. The tag itself does not participate in conflict detection.
    /// Errors with [`dirtxn_core::error::TxnError::ReadOnlyTxn`] if `txn_id`
    /// was opened read-only.
    pub fn add_write(
        &self,
        txn_id: TransactionId,
        dn: DistinguishedName,
        scope: SearchScope,
        kind: OpKind,
    ) -> Result<()> {
        self.manager.add_write(txn_id, dn, scope)?;
        self.manager
            .log_user_data(txn_id, encode_op_tag(kind))
    }

    /// Append an opaque payload to `txn_id`'s WAL span without touching its
    /// read or write sets. Used for operation data the core doesn't need to
    /// reason about conflicts over (e.g. the new attribute values of a
    /// modify), but must still be durable and replayable.
    pub fn log_user_data(&self, txn_id: TransactionId, payload: Vec<u8>) -> Result<()> {
        self.manager.log_user_data(txn_id, payload)
    }
}

fn encode_op_tag(kind: OpKind) -> Vec<u8> {
    let tag = match kind {
        OpKind::Add => 0u8,
        OpKind::Modify => 1,
        OpKind::Delete => 2,
        OpKind::ModifyDn => 3,
        OpKind::Search => 4,
        OpKind::Bind => 5,
    };
    vec![tag]
}
