pub mod db;

pub mod clients;
pub mod holdings;
pub mod imports;
pub mod instruments;
pub mod ledger;
pub mod pnl;
pub mod valuation;

pub mod constants;
pub mod errors;
pub mod models;
pub mod schema;
pub mod utils;

pub use errors::{Error, Result};
