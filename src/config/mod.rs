//! Configuration for pixelrick
//!
//! Provides types and loading for the optional `pixelrick.toml` file.

pub mod loader;
pub mod schema;

pub use loader::*;
pub use schema::*;
