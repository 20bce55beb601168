pub mod api;
pub mod config;
pub mod domain;
pub mod error;
pub mod events;
pub mod repo;
pub mod service;
pub mod telemetry;
pub mod validate;
