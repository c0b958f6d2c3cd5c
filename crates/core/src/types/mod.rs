//! Core types for the MediCare storefront.
//!
//! This module provides type-safe wrappers for common domain concepts.

pub mod email;
pub mod id;
pub mod locale;
pub mod phone;
pub mod pincode;
pub mod price;

pub use email::{Email, EmailError};
pub use id::*;
pub use locale::Locale;
pub use phone::{Phone, PhoneError};
pub use pincode::{DeliveryEstimate, Pincode, PincodeError};
pub use price::{Price, discount_percent};
