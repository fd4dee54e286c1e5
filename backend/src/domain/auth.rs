//! Authentication primitives: login credentials and sign-up requests.
//!
//! Inbound adapters hand raw strings to these constructors so validation
//! happens before any port is called. Passwords live in [`Zeroizing`] buffers.

use std::fmt;

use zeroize::Zeroizing;

use super::{Email, EmailValidationError, UniversityId};

/// Minimum length for newly chosen passwords.
pub const PASSWORD_MIN: usize = 8;

/// Validation errors raised while parsing credentials.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CredentialsValidationError {
    /// The email was invalid.
    Email(EmailValidationError),
    /// Password was blank.
    EmptyPassword,
    /// Password was shorter than [`PASSWORD_MIN`] characters.
    PasswordTooShort {
        /// Minimum accepted length.
        min: usize,
    },
}

impl fmt::Display for CredentialsValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Email(err) => err.fmt(f),
            Self::EmptyPassword => write!(f, "password must not be empty"),
            Self::PasswordTooShort { min } => {
                write!(f, "password must be at least {min} characters")
            }
        }
    }
}

impl std::error::Error for CredentialsValidationError {}

/// A plaintext password held only as long as needed.
#[derive(Clone, PartialEq, Eq)]
pub struct Password(Zeroizing<String>);

impl Password {
    /// Accept any non-empty password (used for login).
    pub fn existing(raw: &str) -> Result<Self, CredentialsValidationError> {
        if raw.is_empty() {
            return Err(CredentialsValidationError::EmptyPassword);
        }
        Ok(Self(Zeroizing::new(raw.to_owned())))
    }

    /// Accept a newly chosen password, enforcing the minimum length.
    pub fn new_secret(raw: &str) -> Result<Self, CredentialsValidationError> {
        let password = Self::existing(raw)?;
        if raw.chars().count() < PASSWORD_MIN {
            return Err(CredentialsValidationError::PasswordTooShort { min: PASSWORD_MIN });
        }
        Ok(password)
    }

    /// Expose the secret for hashing.
    pub fn expose(&self) -> &str {
        self.0.as_str()
    }
}

impl fmt::Debug for Password {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("Password(..)")
    }
}

/// Validated login credentials used by the account service.
///
/// # Examples
/// ```
/// use campus_clubs::domain::LoginCredentials;
///
/// let creds = LoginCredentials::try_from_parts(" Ada@Uni.Example", "pw").expect("valid");
/// assert_eq!(creds.email().as_ref(), "ada@uni.example");
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoginCredentials {
    email: Email,
    password: Password,
}

impl LoginCredentials {
    /// Construct credentials from raw inputs.
    pub fn try_from_parts(email: &str, password: &str) -> Result<Self, CredentialsValidationError> {
        let email = Email::parse(email).map_err(CredentialsValidationError::Email)?;
        let password = Password::existing(password)?;
        Ok(Self { email, password })
    }

    /// Email used for the account lookup.
    pub fn email(&self) -> &Email {
        &self.email
    }

    /// Password provided by the caller.
    pub fn password(&self) -> &Password {
        &self.password
    }
}

/// Student self-registration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SignupRequest {
    /// Login email.
    pub email: Email,
    /// Chosen password.
    pub password: Password,
    /// University the student attends.
    pub university: UniversityId,
}

impl SignupRequest {
    /// Validate raw sign-up inputs.
    pub fn try_from_parts(
        email: &str,
        password: &str,
        university: UniversityId,
    ) -> Result<Self, CredentialsValidationError> {
        Ok(Self {
            email: Email::parse(email).map_err(CredentialsValidationError::Email)?,
            password: Password::new_secret(password)?,
            university,
        })
    }
}
