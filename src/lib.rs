//! Folio Server Library
//!
//! This crate exposes the book processing pipeline for integration tests.
//! The server binary is in main.rs.
//!
//! # Modules
//!
//! - `epub`: Archive parsing (container, manifest, spine, navigation)
//! - `html`: Chapter markup rewriting (image inlining)
//! - `reader`: Assembly, pagination, and session state

pub mod config;
pub mod epub;
pub mod error;
pub mod html;
pub mod reader;
pub mod routes;
pub mod state;
