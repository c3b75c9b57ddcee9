pub(crate) mod valuation_errors;
pub(crate) mod valuation_model;
pub(crate) mod valuation_service;
pub(crate) mod valuation_traits;
pub(crate) mod xirr;


pub use valuation_errors::ValuationError;
pub use valuation_model::{CashSummary, TotalPnl, ValuationRefreshSummary};
pub use valuation_service::ValuationService;
pub use valuation_traits::ValuationServiceTrait;
pub use xirr::{xirr, CashFlow};
