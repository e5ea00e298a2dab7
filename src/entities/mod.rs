pub mod biometric_data;
pub mod departments;
pub mod organization_members;
pub mod user_profiles;

pub use biometric_data as biometric_entity;
pub use departments as department_entity;
pub use organization_members as member_entity;
pub use user_profiles as profile_entity;
