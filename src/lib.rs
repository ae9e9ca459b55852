pub mod aggregate;
pub mod args;
pub mod commands;
mod config;
mod error;
pub mod export;
pub mod import;
pub mod model;
mod store;
#[cfg(test)]
mod test;
mod utils;

pub use config::Config;
pub use error::Error;
pub use error::Result;
