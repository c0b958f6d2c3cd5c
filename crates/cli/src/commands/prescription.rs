//! Prescription upload.

use std::path::PathBuf;

use medicare_core::ProductId;
use medicare_storefront::Command;

use super::{CliError, Store, report};

/// Open the upload for `id`, read `path` and submit it.
pub async fn upload(store: &mut Store, id: i64, path: PathBuf) -> Result<(), CliError> {
    report(store.dispatch(Command::OpenPrescription(ProductId::new(id))).await)?;

    let captured = report(store.dispatch(Command::CapturePrescription { path }).await);
    if let Err(e) = captured {
        store.dispatch(Command::CancelPrescription).await;
        return Err(e);
    }

    report(store.dispatch(Command::SubmitPrescription).await)
}

/// Print every stored prescription.
#[allow(clippy::print_stdout)]
pub fn list(store: &Store) {
    let all = store.prescriptions().all();
    if all.is_empty() {
        println!("No prescriptions uploaded");
        return;
    }
    for (product_id, prescription) in all {
        let preview = if prescription.data_url.is_some() {
            "  (image)"
        } else {
            ""
        };
        println!(
            "{product_id:>6}  {}  {}{preview}",
            prescription.file_name,
            prescription.uploaded_at.format("%Y-%m-%d %H:%M")
        );
    }
}
