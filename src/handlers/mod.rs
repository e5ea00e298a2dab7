pub mod finger;

pub use finger::finger_config;
