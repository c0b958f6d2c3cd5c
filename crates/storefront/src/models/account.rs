//! Login and signup form input.

use medicare_core::{Email, Phone, Pincode};
use secrecy::{ExposeSecret, SecretString};

use crate::backend::NewUser;
use crate::error::ValidationErrors;

/// Minimum signup password length.
pub const MIN_PASSWORD_LENGTH: usize = 6;

/// Default state for signup addresses.
pub const DEFAULT_STATE: &str = "Maharashtra";

/// Default country for signup addresses.
pub const DEFAULT_COUNTRY: &str = "India";

/// Raw login form input.
#[derive(Debug, Clone)]
pub struct Credentials {
    pub phone: String,
    pub password: SecretString,
}

impl Credentials {
    #[must_use]
    pub fn new(phone: impl Into<String>, password: impl Into<String>) -> Self {
        Self {
            phone: phone.into(),
            password: SecretString::from(password.into()),
        }
    }

    /// The parsed phone number, or `None` if the input cannot be submitted.
    ///
    /// A password that is blank after trimming is treated as missing.
    #[must_use]
    pub fn validate(&self) -> Option<Phone> {
        if self.password.expose_secret().trim().is_empty() {
            return None;
        }
        Phone::parse(&self.phone).ok()
    }
}

/// Raw signup form input.
#[derive(Debug, Clone)]
pub struct SignupForm {
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub phone: String,
    pub password: SecretString,
    pub confirm_password: SecretString,
    pub landmark: String,
    pub area: String,
    pub city: String,
    pub pincode: String,
    /// Defaults to [`DEFAULT_STATE`] when blank.
    pub state: String,
    /// Defaults to [`DEFAULT_COUNTRY`] when blank.
    pub country: String,
    /// Home or office.
    pub address_type: String,
    pub accept_terms: bool,
}

impl Default for SignupForm {
    fn default() -> Self {
        Self {
            first_name: String::new(),
            last_name: String::new(),
            email: String::new(),
            phone: String::new(),
            password: SecretString::from(String::new()),
            confirm_password: SecretString::from(String::new()),
            landmark: String::new(),
            area: String::new(),
            city: String::new(),
            pincode: String::new(),
            state: String::new(),
            country: String::new(),
            address_type: String::new(),
            accept_terms: false,
        }
    }
}

impl SignupForm {
    /// Validate every field and build the signup payload.
    ///
    /// All failing fields are reported together.
    ///
    /// # Errors
    ///
    /// Returns [`ValidationErrors`] listing each invalid field.
    pub fn validate(&self) -> Result<NewUser, ValidationErrors> {
        let mut errors = ValidationErrors::new();

        let first_name = self.first_name.trim();
        let last_name = self.last_name.trim();
        let email = self.email.trim();
        let phone = self.phone.trim();
        let password = self.password.expose_secret();
        let landmark = self.landmark.trim();
        let area = self.area.trim();
        let city = self.city.trim();
        let pincode = self.pincode.trim();
        let address_type = self.address_type.trim();

        if first_name.is_empty() {
            errors.push("firstName", "First Name is required");
        }
        if last_name.is_empty() {
            errors.push("lastName", "Last Name is required");
        }
        if Email::parse(email).is_err() {
            errors.push("email", "Enter a valid email");
        }
        if Phone::parse(phone).is_err() {
            errors.push("phone", "Enter a valid 10-digit Indian phone number");
        }
        if password.chars().count() < MIN_PASSWORD_LENGTH {
            errors.push("password", "Password must be at least 6 characters");
        }
        if password != self.confirm_password.expose_secret() {
            errors.push("confirmPassword", "Passwords do not match");
        }
        if landmark.is_empty() {
            errors.push("landmark", "Landmark is required");
        }
        if area.is_empty() {
            errors.push("area", "Area is required");
        }
        if city.is_empty() {
            errors.push("city", "City is required");
        }
        if Pincode::parse(pincode).is_err() {
            errors.push("pincode", "Please enter a valid 6-digit Indian pincode.");
        }
        if address_type.is_empty() {
            errors.push("addressType", "Please select address type");
        }
        if !self.accept_terms {
            errors.push("terms", "You must accept the terms");
        }

        errors.into_result(NewUser {
            first_name: first_name.to_string(),
            last_name: last_name.to_string(),
            email: email.to_string(),
            phone: phone.to_string(),
            password: self.password.clone(),
            address_landmark: landmark.to_string(),
            address_area: area.to_string(),
            address_city: city.to_string(),
            address_pincode: pincode.to_string(),
            address_state: or_default(&self.state, DEFAULT_STATE),
            address_country: or_default(&self.country, DEFAULT_COUNTRY),
            address_type: address_type.to_string(),
        })
    }
}

fn or_default(value: &str, default: &str) -> String {
    let value = value.trim();
    if value.is_empty() { default } else { value }.to_string()
}
