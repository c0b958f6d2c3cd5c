//! Cart commands.

use medicare_core::ProductId;
use medicare_storefront::Command;

use super::{CliError, Store, report};

/// Add one unit of a product, optionally continuing to checkout.
pub async fn add(
    store: &mut Store,
    id: i64,
    variant: Option<String>,
    size: Option<String>,
    buy_now: bool,
) -> Result<(), CliError> {
    let product_id = ProductId::new(id);
    let command = if buy_now {
        Command::BuyNow {
            product_id,
            variant,
            size,
        }
    } else {
        Command::AddToCart {
            product_id,
            variant,
            size,
        }
    };
    report(store.dispatch(command).await)
}

/// Print the cart lines and subtotal.
#[allow(clippy::print_stdout)]
pub fn show(store: &Store) {
    let cart = store.cart();
    if cart.is_empty() {
        println!("Your cart is empty");
        return;
    }
    for line in cart.lines() {
        let options: Vec<&str> = [line.variant.as_deref(), line.size.as_deref()]
            .into_iter()
            .flatten()
            .collect();
        let options = if options.is_empty() {
            String::new()
        } else {
            format!(" ({})", options.join(", "))
        };
        println!(
            "{:>6}  {}{options}  {} x {} = {}",
            line.id,
            line.name,
            line.quantity,
            line.price,
            line.line_total()
        );
    }
    println!("\n{} item(s), subtotal {}", cart.total_count(), cart.subtotal());
}

pub async fn clear(store: &mut Store) -> Result<(), CliError> {
    report(store.dispatch(Command::ClearCart).await)
}
