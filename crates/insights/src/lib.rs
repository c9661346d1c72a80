//! Realty insights server: HTTP facade over the insights library

pub mod api;
pub mod config;
