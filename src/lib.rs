#![forbid(unsafe_code)]

pub mod api;
pub mod config;
pub mod console;
pub mod constants;
pub mod dashboard;
pub mod error;
pub mod gate;
pub mod models;
pub mod observability;
pub mod pagination;
pub mod routes;
pub mod session;
