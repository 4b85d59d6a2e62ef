//! services/web/src/lib.rs
//!
//! The document summarizer web service: configuration, adapters for the core
//! ports, and the HTML handlers.

pub mod adapters;
pub mod config;
pub mod error;
pub mod web;
