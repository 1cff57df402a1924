pub mod charts;
pub mod error;
pub mod files;
pub mod logger;
pub mod monitor;
pub mod timeutil;
pub mod validation;
