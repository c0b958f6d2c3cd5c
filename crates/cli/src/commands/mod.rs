//! Subcommand implementations.
//!
//! Each command dispatches storefront commands and prints the resulting
//! events with [`report`]. A failure notice becomes a [`CliError`].

pub mod account;
pub mod cart;
pub mod catalog;
pub mod preferences;
pub mod prescription;

use medicare_storefront::storage::StorageError;
use medicare_storefront::{BackendClient, BackendError, ConfigError, Event, Storefront};
use thiserror::Error;

/// The storefront every command runs against.
pub type Store = Storefront<BackendClient>;

/// Errors that end a CLI invocation.
#[derive(Debug, Error)]
pub enum CliError {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("Storage error: {0}")]
    Storage(#[from] StorageError),

    #[error("Backend error: {0}")]
    Backend(#[from] BackendError),

    /// The storefront refused the command.
    #[error("{0}")]
    Rejected(String),
}

/// Print `events`, failing on the first notice.
#[allow(clippy::print_stdout)]
pub fn report(events: Vec<Event>) -> Result<(), CliError> {
    for event in events {
        match event {
            Event::Notice(notice) => {
                let mut message = notice.message;
                for field in notice.fields.iter().skip(1) {
                    message.push_str("\n  ");
                    message.push_str(&field.message);
                }
                return Err(CliError::Rejected(message));
            }
            Event::CatalogUpdated(products) => catalog::print_products(&products),
            Event::ProductLoaded { detail, related } => catalog::print_detail(&detail, &related),
            Event::CartCountChanged(count) => println!("Cart: {count} item(s)"),
            Event::CartCleared => println!("Cart cleared"),
            Event::LoggedIn(user) => {
                println!("Logged in as {} (user {})", user.display_name(), user.user_id);
            }
            Event::LoggedOut => println!("Logged out"),
            Event::PrescriptionPreview(file) => match file.media_type {
                Some(media_type) => println!("Read {} ({media_type})", file.file_name),
                None => println!("Read {}", file.file_name),
            },
            Event::DeliveryEstimate { pincode, estimate } => {
                println!("Delivery to {pincode}: {estimate}");
            }
            Event::LanguageChanged(locale) => println!("Language: {locale}"),
            Event::NavigateToCheckout => println!("Proceed to checkout"),
            Event::Message(message) => println!("{message}"),
            Event::AddedToCart { .. }
            | Event::UploadOpened(_)
            | Event::PrescriptionSaved { .. }
            | Event::UploadClosed => {}
        }
    }
    Ok(())
}
