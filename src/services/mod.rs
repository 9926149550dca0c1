pub mod ledger;
pub mod removal;
pub mod search;
