//! Pricing Calculation Core for multi-country tax-filing services.
//!
//! This crate turns a filing request (countries, service type, transaction
//! volume, filing frequency, additional services) into a deterministic,
//! itemized cost estimate by applying versioned, country-specific
//! tax-filing rules.

#![warn(missing_docs)]

pub mod api;
pub mod cache;
pub mod calculation;
pub mod config;
pub mod error;
pub mod expression;
pub mod models;
pub mod repository;
