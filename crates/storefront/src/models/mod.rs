//! Domain models for the storefront.
//!
//! These are the shapes the storefront keeps in memory and persists. Backend
//! wire types live in [`crate::backend::types`].

pub mod account;
pub mod cart;
pub mod prescription;
pub mod product;
pub mod session;

pub use account::{Credentials, SignupForm};
pub use cart::{CartItem, CartLine, IdentityKey};
pub use prescription::{Prescription, PrescriptionFile};
pub use product::{Product, ProductDetail};
pub use session::{SESSION_TTL, SessionRecord, SessionState};
