//! MediCare Core - Shared types library.
//!
//! This crate provides common types used across all MediCare components:
//! - `storefront` - Client-side cart, session, catalog and prescription state
//! - `cli` - Command-line driver for the storefront state core
//!
//! # Architecture
//!
//! The core crate contains only types and parsing rules - no I/O, no storage
//! access, no HTTP clients. This keeps it lightweight and allows it to be used
//! anywhere.
//!
//! # Modules
//!
//! - [`types`] - Newtype wrappers for IDs, prices, emails, phone numbers,
//!   pincodes and locales

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod types;

pub use types::*;
