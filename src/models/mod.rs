pub mod biometric;
pub mod common;
pub mod enrollment;
pub mod member;
pub mod pagination;

pub use biometric::*;
pub use common::*;
pub use enrollment::*;
pub use member::*;
pub use pagination::*;
