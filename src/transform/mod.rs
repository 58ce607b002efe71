pub mod clean_day;
pub mod columns;
pub mod error;
pub mod scalar;
pub mod session;
