pub mod category;
pub mod employee;
pub mod transaction;
