//! Input checks for registration and login payloads.

pub mod email;
pub mod name;
pub mod password;

pub use email::{normalize_email, validate_email};
pub use name::validate_name;
pub use password::validate_password;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ValidationError {
    EmailEmpty,
    EmailTooLong,
    EmailInvalidFormat,
    PasswordEmpty,
    PasswordTooShort(usize),
    PasswordTooLong(usize),
    NameEmpty,
    NameTooLong,
    /// A required field other than the above was empty.
    Required(&'static str),
}

impl std::fmt::Display for ValidationError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::EmailEmpty => write!(f, "Email cannot be empty"),
            Self::EmailTooLong => write!(f, "Email is too long (max 254 characters)"),
            Self::EmailInvalidFormat => write!(f, "Invalid email format"),
            Self::PasswordEmpty => write!(f, "Password cannot be empty"),
            Self::PasswordTooShort(min) => write!(f, "Password must be at least {min} characters"),
            Self::PasswordTooLong(max) => write!(f, "Password is too long (max {max} characters)"),
            Self::NameEmpty => write!(f, "Name cannot be empty"),
            Self::NameTooLong => write!(f, "Name is too long (max 100 characters)"),
            Self::Required(field) => write!(f, "{field} is required"),
        }
    }
}

impl std::error::Error for ValidationError {}
