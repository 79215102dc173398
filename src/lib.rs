pub mod expression;
pub mod mode;
pub mod session;
pub mod types;
