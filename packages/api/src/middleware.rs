pub mod error_reporting;
pub mod session;
