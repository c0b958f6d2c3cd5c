//! Pincode and language preferences.

use medicare_storefront::Command;

use super::{CliError, Store, report};

pub async fn pincode(store: &mut Store, pincode: String) -> Result<(), CliError> {
    report(store.dispatch(Command::SetPincode(pincode)).await)
}

pub async fn language(store: &mut Store, language: String) -> Result<(), CliError> {
    report(store.dispatch(Command::SetLanguage(language)).await)
}
