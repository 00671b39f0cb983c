pub mod commands;
pub mod error;
pub mod finder;
pub mod http;
pub mod query;
pub mod version;
