//! MediCare CLI - drive the storefront state from a terminal.
//!
//! # Usage
//!
//! ```bash
//! # Browse the catalog
//! medicare products --category "Pain Relief" --sort "Price: Low to High"
//! medicare product 42
//!
//! # Cart
//! medicare cart add 42 --size Large
//! medicare cart show
//!
//! # Account
//! medicare login -p 9876543210 --password secret1
//! medicare whoami
//!
//! # Prescriptions
//! medicare prescription upload 42 ./rx.jpg
//! ```
//!
//! # Environment Variables
//!
//! - `MEDICARE_API_BASE_URL` - Backend REST base URL
//! - `MEDICARE_DATA_DIR` - Directory holding the durable and session stores
//! - `RUST_LOG` - Log filter

#![cfg_attr(not(test), forbid(unsafe_code))]

use clap::{Parser, Subcommand};
use medicare_storefront::{BackendClient, Storefront, StorefrontConfig};

mod commands;

use commands::CliError;

#[derive(Parser)]
#[command(name = "medicare")]
#[command(author, version, about = "MediCare storefront CLI")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// List products
    Products {
        /// Only show this category
        #[arg(short, long)]
        category: Option<String>,

        /// Only show these brands (repeatable)
        #[arg(short, long)]
        brand: Vec<String>,

        /// Sort order (`Price: Low to High`, `Price: High to Low`, `Discount`)
        #[arg(short, long)]
        sort: Option<String>,
    },
    /// Show a product page
    Product {
        /// Product ID
        id: i64,
    },
    /// Manage the cart
    Cart {
        #[command(subcommand)]
        action: CartAction,
    },
    /// Log in with a phone number and password
    Login {
        /// 10-digit mobile number
        #[arg(short, long)]
        phone: String,

        /// Account password
        #[arg(long, env = "MEDICARE_PASSWORD", hide_env_values = true)]
        password: String,
    },
    /// Log out
    Logout,
    /// Show the logged-in user
    Whoami,
    /// Create an account and log in
    Signup(commands::account::SignupArgs),
    /// Manage prescriptions
    Prescription {
        #[command(subcommand)]
        action: PrescriptionAction,
    },
    /// Set the delivery pincode
    Pincode {
        /// 6-digit Indian pincode
        pincode: String,
    },
    /// Set the display language (English, Hindi, Marathi)
    Language {
        /// Language name or code
        language: String,
    },
}

#[derive(Subcommand)]
enum CartAction {
    /// Add one unit of a product
    Add {
        /// Product ID
        id: i64,

        #[arg(short, long)]
        variant: Option<String>,

        #[arg(short, long)]
        size: Option<String>,

        /// Continue to checkout after adding
        #[arg(long)]
        buy_now: bool,
    },
    /// Show the cart
    Show,
    /// Empty the cart
    Clear,
}

#[derive(Subcommand)]
enum PrescriptionAction {
    /// Upload a prescription file for a product
    Upload {
        /// Product ID
        id: i64,

        /// Image or PDF file
        path: std::path::PathBuf,
    },
    /// List stored prescriptions
    List,
}

#[tokio::main]
async fn main() {
    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| "medicare_storefront=info,medicare_cli=info".into());
    tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    if let Err(e) = run(cli).await {
        tracing::error!("Command failed: {e}");
        std::process::exit(1);
    }
}

async fn run(cli: Cli) -> Result<(), CliError> {
    let config = StorefrontConfig::from_env()?;
    let backend = BackendClient::new(&config)?;
    let mut store = Storefront::open(config, backend)?;

    match cli.command {
        Commands::Products {
            category,
            brand,
            sort,
        } => commands::catalog::products(&mut store, category, brand, sort).await,
        Commands::Product { id } => commands::catalog::product(&mut store, id).await,
        Commands::Cart { action } => match action {
            CartAction::Add {
                id,
                variant,
                size,
                buy_now,
            } => commands::cart::add(&mut store, id, variant, size, buy_now).await,
            CartAction::Show => {
                commands::cart::show(&store);
                Ok(())
            }
            CartAction::Clear => commands::cart::clear(&mut store).await,
        },
        Commands::Login { phone, password } => {
            commands::account::login(&mut store, phone, password).await
        }
        Commands::Logout => commands::account::logout(&mut store).await,
        Commands::Whoami => {
            commands::account::whoami(&store);
            Ok(())
        }
        Commands::Signup(args) => commands::account::signup(&mut store, args).await,
        Commands::Prescription { action } => match action {
            PrescriptionAction::Upload { id, path } => {
                commands::prescription::upload(&mut store, id, path).await
            }
            PrescriptionAction::List => {
                commands::prescription::list(&store);
                Ok(())
            }
        },
        Commands::Pincode { pincode } => commands::preferences::pincode(&mut store, pincode).await,
        Commands::Language { language } => {
            commands::preferences::language(&mut store, language).await
        }
    }
}
