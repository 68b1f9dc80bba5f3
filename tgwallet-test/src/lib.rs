//! Stub of the wallet backend used by client and controller tests.
pub mod backend;
pub mod ledger;
pub mod runner;
