pub mod admin_schools;
pub mod classes;
pub mod entitlements;
pub mod plans;
