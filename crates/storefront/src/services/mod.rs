//! Stateful services behind the storefront commands.
//!
//! # Services
//!
//! - `cart` - In-memory cart mirrored to the durable store
//! - `catalog` - Product listing, filtering and detail assembly
//! - `preferences` - Delivery pincode and display language
//! - `prescription` - Prescription capture and storage
//! - `session` - Login state with a 24 hour lifetime

pub mod cart;
pub mod catalog;
pub mod preferences;
pub mod prescription;
pub mod session;

pub use cart::CartManager;
pub use catalog::CatalogView;
pub use preferences::Preferences;
pub use prescription::{PrescriptionStore, UploadModal};
pub use session::SessionManager;
