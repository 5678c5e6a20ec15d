mod config;
mod revision;
mod store;

pub use config::*;
pub use store::*;
