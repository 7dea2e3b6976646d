// src/models/mod.rs

pub mod question;
pub mod reply;
pub mod submission;
pub mod user;
