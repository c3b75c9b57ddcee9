pub(crate) mod imports_model;
pub(crate) mod imports_service;


pub use imports_model::{ImportBatch, ImportOutcome};
pub use imports_service::{ImportService, ImportServiceTrait};
