//! Form validation shared by the server and the browser client

use thiserror::Error;

use crate::models::PlotDraft;

pub const MIN_PASSWORD_LENGTH: usize = 6;
pub const MIN_BOUNDARY_POINTS: usize = 3;

pub const TEMPERATURE_RANGE: (f64, f64) = (0.0, 50.0);
pub const RAINFALL_RANGE: (f64, f64) = (0.0, 3000.0);

/// A rejected form field
#[derive(Debug, Clone, Error, PartialEq, Eq)]
#[error("{message}")]
pub struct ValidationError {
    pub field: &'static str,
    pub message: String,
}

impl ValidationError {
    pub fn new(field: &'static str, message: impl Into<String>) -> Self {
        Self {
            field,
            message: message.into(),
        }
    }
}

/// Validate a required text field
pub fn validate_required(value: &str) -> Result<(), &'static str> {
    if value.trim().is_empty() {
        return Err("This field is required");
    }
    Ok(())
}

/// Validate password length against the configured minimum
pub fn validate_password(password: &str, min_length: usize) -> Result<(), String> {
    if password.chars().count() < min_length {
        return Err(format!("Password must be at least {min_length} characters"));
    }
    Ok(())
}

pub fn validate_password_confirmation(password: &str, confirm: &str) -> Result<(), &'static str> {
    if password != confirm {
        return Err("Passwords do not match");
    }
    Ok(())
}

fn validate_range(value: f64, (min, max): (f64, f64), what: &str) -> Result<(), String> {
    if !value.is_finite() || value < min || value > max {
        return Err(format!("{what} must be between {min} and {max}"));
    }
    Ok(())
}

/// Signup form checks, in the order the form reports them
pub fn validate_signup(
    name: &str,
    email_or_phone: &str,
    password: &str,
    min_password_length: usize,
) -> Result<(), ValidationError> {
    validate_required(name).map_err(|m| ValidationError::new("name", m))?;
    validate_required(email_or_phone).map_err(|m| ValidationError::new("emailOrPhone", m))?;
    validate_password(password, min_password_length)
        .map_err(|m| ValidationError::new("password", m))?;
    Ok(())
}

/// Signup form checks including the client-only confirmation field
pub fn validate_signup_form(
    name: &str,
    email_or_phone: &str,
    password: &str,
    confirm_password: &str,
) -> Result<(), ValidationError> {
    validate_signup(name, email_or_phone, password, MIN_PASSWORD_LENGTH)?;
    validate_password_confirmation(password, confirm_password)
        .map_err(|m| ValidationError::new("confirmPassword", m))
}

pub fn validate_plot_draft(draft: &PlotDraft) -> Result<(), ValidationError> {
    validate_required(&draft.name).map_err(|m| ValidationError::new("name", m))?;
    validate_range(draft.temperature, TEMPERATURE_RANGE, "Temperature")
        .map_err(|m| ValidationError::new("temperature", m))?;
    validate_range(draft.rainfall, RAINFALL_RANGE, "Rainfall")
        .map_err(|m| ValidationError::new("rainfall", m))?;

    let points = crate::geometry::open_ring(&draft.boundary).len();
    if points < MIN_BOUNDARY_POINTS {
        return Err(ValidationError::new(
            "boundary",
            format!("Draw a plot with at least {MIN_BOUNDARY_POINTS} points"),
        ));
    }
    Ok(())
}
