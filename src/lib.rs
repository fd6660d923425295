//! TuklasVerse Embed Proxy Library
//!
//! This library provides the sanitizing reverse proxy that the TuklasVerse
//! front end points its player iframes at, along with small helpers for
//! building embed URLs.

pub mod config;
pub mod constants;
pub mod embed;
pub mod error;
pub mod models;
pub mod proxy;
pub mod routes;
pub mod sanitizer;
pub mod upstream;
