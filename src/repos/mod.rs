pub mod entitlement_repo;
pub mod error;
pub mod thought_repo;
