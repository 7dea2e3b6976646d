// src/lib.rs

pub mod client;
pub mod config;
pub mod error;
pub mod handlers;
pub mod input;
pub mod models;
pub mod routes;
pub mod session;
pub mod state;
pub mod storage;
pub mod utils;

pub use routes::create_router;
