pub(crate) mod ledger_errors;
pub(crate) mod ledger_model;
pub(crate) mod ledger_repository;
pub(crate) mod ledger_service;
pub(crate) mod ledger_traits;

#[cfg(test)]
mod ledger_service_tests;

pub use ledger_errors::LedgerError;
pub use ledger_model::{
    plan_resync, CurrentBalanceBatch, InvestedCashRow, LedgerBatch, LedgerEntry, LedgerEntryKind,
    NewLedgerEntry, ResyncAction, CAPITAL_ENTRY_KINDS,
};
pub use ledger_repository::LedgerRepository;
pub use ledger_service::LedgerService;
pub use ledger_traits::{LedgerRepositoryTrait, LedgerServiceTrait};
