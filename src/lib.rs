//! Postnest - a small blog content backend
//!
//! Categories and posts behind a JSON API, with a post listing that can be
//! narrowed by category and by a case-insensitive text search.

pub mod api;
pub mod config;
pub mod db;
pub mod models;
pub mod services;
