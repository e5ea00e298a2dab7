pub mod chunked;
pub mod jwt;

pub use chunked::*;
pub use jwt::*;
