//! Paired ledger transactions for portfolio tracking.
//!
//! See [`pp`] for the model and [`pp::cross_entry`] for how buys, sells and
//! transfers keep their two transactions in sync.

pub mod errors;
pub mod pp;

pub use errors::{AttachmentError, LedgerError, Result, ValidationError};
