pub mod ledger;
pub mod models;


pub use ledger::WinRateLedger;
pub use models::*;
