use serde::{Deserialize, Serialize};

use crate::validators::{self, Validity};

#[derive(Clone, Debug, Deserialize, Serialize)]
pub struct CredentialPair {
    pub email: String,
    pub password: String,
}

impl CredentialPair {
    pub fn validate_email_address(&self) -> Validity {
        validators::validate_email_address(&self.email)
    }
}

#[derive(Clone, Debug, Deserialize, Serialize)]
pub struct InputNewUser {
    pub full_name: String,
    pub email: String,
    pub password: String,
}

impl InputNewUser {
    pub fn validate(&self) -> Validity {
        if self.full_name.trim().is_empty() {
            return Validity::Invalid(String::from("Full name must not be empty"));
        }

        if let Validity::Invalid(msg) = validators::validate_email_address(&self.email) {
            return Validity::Invalid(msg);
        }

        validators::validate_password(&self.password)
    }
}

#[derive(Clone, Debug, Deserialize, Serialize)]
pub struct InputOnboarding {
    pub full_name: String,
    pub bio: String,
    pub native_language: String,
    pub learning_language: String,
    pub location: String,
}

impl InputOnboarding {
    /// The onboarding form requires every field; the names of the blank ones
    /// are reported back to the client.
    pub fn missing_fields(&self) -> Vec<&'static str> {
        let mut missing = Vec::new();

        if self.full_name.trim().is_empty() {
            missing.push("full_name");
        }
        if self.bio.trim().is_empty() {
            missing.push("bio");
        }
        if self.native_language.trim().is_empty() {
            missing.push("native_language");
        }
        if self.learning_language.trim().is_empty() {
            missing.push("learning_language");
        }
        if self.location.trim().is_empty() {
            missing.push("location");
        }

        missing
    }
}
