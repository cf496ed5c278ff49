//! Command implementations.

pub mod run;
pub mod status;

pub use self::run::execute_run;
pub use self::status::execute_status;
