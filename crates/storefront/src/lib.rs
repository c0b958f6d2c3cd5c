//! MediCare Storefront library.
//!
//! Client-side state for the MediCare pharmacy storefront: the cart, the
//! login session, the product catalog view, prescription uploads and user
//! preferences. State is persisted through a key-value store and product and
//! account data come from the pharmacy REST backend.
//!
//! The entry point is [`Storefront`], which applies [`Command`]s and reports
//! [`Event`]s.

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod backend;
pub mod commands;
pub mod config;
pub mod error;
pub mod models;
pub mod services;
pub mod state;
pub mod storage;

pub use backend::{AccountApi, BackendClient, BackendError, CatalogApi};
pub use commands::{Command, Event};
pub use config::{ConfigError, StorefrontConfig};
pub use error::{AppError, Notice, Severity};
pub use state::Storefront;
