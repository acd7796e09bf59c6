// Password gate of the raw data page.

use crate::houses::config_reader::HousesConfig;
use crate::houses::*;

/// Something that can tell whether an entered password is the admin one.
pub trait CredentialStore: std::fmt::Debug {
    fn verify(&self, entered: &str) -> bool;
}

/// A password known only by its SHA-256 digest (lowercase hexadecimal).
#[derive(Eq, PartialEq, Debug, Clone)]
pub struct Sha256Credential {
    digest: String,
}

impl Sha256Credential {
    pub fn from_hex_digest(digest: &str) -> Sha256Credential {
        Sha256Credential {
            digest: digest.trim().to_ascii_lowercase(),
        }
    }
}

impl CredentialStore for Sha256Credential {
    fn verify(&self, entered: &str) -> bool {
        sha256::digest(entered) == self.digest
    }
}

/// No password configured: nobody gets in.
#[derive(Eq, PartialEq, Debug, Clone)]
pub struct NoCredential;

impl CredentialStore for NoCredential {
    fn verify(&self, _entered: &str) -> bool {
        false
    }
}

#[derive(Eq, PartialEq, Debug, Clone, Copy)]
pub enum AccessDecision {
    Granted,
    /// A password was entered and it is wrong.
    Denied,
    /// Nothing was entered yet.
    Prompt,
}

impl AccessDecision {
    pub fn is_granted(&self) -> bool {
        matches!(self, AccessDecision::Granted)
    }

    /// The error shown next to the password field, if any.
    pub fn message(&self) -> Option<&'static str> {
        match self {
            AccessDecision::Denied => Some("Incorrect password."),
            _ => None,
        }
    }
}

pub fn check_access(store: &dyn CredentialStore, entered: &str) -> AccessDecision {
    if entered.is_empty() {
        return AccessDecision::Prompt;
    }
    if store.verify(entered) {
        AccessDecision::Granted
    } else {
        AccessDecision::Denied
    }
}

pub fn credential_store(config: &HousesConfig) -> Box<dyn CredentialStore> {
    match &config.admin_password_sha256 {
        Some(d) => Box::new(Sha256Credential::from_hex_digest(d)),
        None => {
            warn!("credential_store: no admin password configured, the raw data page is locked");
            Box::new(NoCredential)
        }
    }
}
