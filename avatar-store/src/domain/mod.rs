mod cache;
mod error;
pub mod models;
pub mod ports;
pub mod services;

pub use cache::*;
pub use error::*;
