pub mod error;
pub mod ids;
pub mod lenient;
pub mod money;
