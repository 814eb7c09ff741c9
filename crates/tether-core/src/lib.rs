//! Core tether library (session controller, backend client, event channel, config).

pub mod api;
pub mod config;
pub mod controller;
pub mod error;
pub mod stream;
pub mod text;

pub use tether_types as types;
