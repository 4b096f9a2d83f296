pub mod decision_reasons;
pub mod plan_ids;
pub mod resource_kinds;
