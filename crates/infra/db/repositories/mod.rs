pub mod classes;
pub mod subscriptions;
pub mod usage;
