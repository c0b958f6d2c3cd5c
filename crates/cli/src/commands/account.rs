//! Login, logout and signup.

use clap::Args;
use medicare_storefront::Command;
use medicare_storefront::models::{Credentials, SessionState, SignupForm};
use secrecy::SecretString;

use super::{CliError, Store, report};

/// Signup form fields.
#[derive(Debug, Args)]
pub struct SignupArgs {
    #[arg(long)]
    first_name: String,

    #[arg(long)]
    last_name: String,

    #[arg(long)]
    email: String,

    /// 10-digit mobile number
    #[arg(long)]
    phone: String,

    /// At least 6 characters
    #[arg(long, env = "MEDICARE_PASSWORD", hide_env_values = true)]
    password: String,

    /// Defaults to the password
    #[arg(long)]
    confirm_password: Option<String>,

    #[arg(long)]
    landmark: String,

    #[arg(long)]
    area: String,

    #[arg(long)]
    city: String,

    #[arg(long)]
    pincode: String,

    #[arg(long, default_value = "")]
    state: String,

    #[arg(long, default_value = "")]
    country: String,

    /// Home or Office
    #[arg(long, default_value = "Home")]
    address_type: String,

    /// Accept the terms and conditions
    #[arg(long)]
    accept_terms: bool,
}

impl From<SignupArgs> for SignupForm {
    fn from(args: SignupArgs) -> Self {
        let confirm = args.confirm_password.unwrap_or_else(|| args.password.clone());
        Self {
            first_name: args.first_name,
            last_name: args.last_name,
            email: args.email,
            phone: args.phone,
            password: SecretString::from(args.password),
            confirm_password: SecretString::from(confirm),
            landmark: args.landmark,
            area: args.area,
            city: args.city,
            pincode: args.pincode,
            state: args.state,
            country: args.country,
            address_type: args.address_type,
            accept_terms: args.accept_terms,
        }
    }
}

pub async fn login(store: &mut Store, phone: String, password: String) -> Result<(), CliError> {
    let credentials = Credentials::new(phone, password);
    report(store.dispatch(Command::Login(credentials)).await)
}

pub async fn logout(store: &mut Store) -> Result<(), CliError> {
    report(store.dispatch(Command::Logout).await)
}

pub async fn signup(store: &mut Store, args: SignupArgs) -> Result<(), CliError> {
    let form = SignupForm::from(args);
    report(store.dispatch(Command::Signup(Box::new(form))).await)
}

/// Print the logged-in user and when the session expires.
#[allow(clippy::print_stdout)]
pub fn whoami(store: &Store) {
    match store.session().state() {
        SessionState::LoggedIn(record) => println!(
            "{} (user {}), session valid until {}",
            record.user.display_name(),
            record.user.user_id,
            record.expires_at().format("%Y-%m-%d %H:%M UTC")
        ),
        SessionState::LoggedOut => println!("Not logged in"),
    }
}
