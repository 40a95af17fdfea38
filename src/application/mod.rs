// Application layer - the stateful ledger and its errors.
// Presentation (the CLI, or any other front end) talks only to `Ledger`.

pub mod error;
pub mod ledger;

pub use error::*;
pub use ledger::*;
