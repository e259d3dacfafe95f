// mcl_core/src/lib.rs

// This file defines the public modules of the library.
pub mod error;
pub mod messages;
pub mod models;
pub mod particles;
pub mod prelude;
pub mod registry;
pub mod types;
