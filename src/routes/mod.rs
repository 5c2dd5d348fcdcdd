//! Route modules for the Folio server

pub mod reader;
pub mod upload;
