pub mod classes;
pub mod payments;
pub mod schools;
