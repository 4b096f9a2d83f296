pub mod classes;
pub mod entitlement_evaluator;
pub mod entitlement_guard;
pub mod subscriptions;
