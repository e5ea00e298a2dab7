pub mod enrollment_service;
pub mod enrollment_store;
pub mod slot_classifier;

pub use enrollment_service::*;
pub use enrollment_store::*;
pub use slot_classifier::*;
