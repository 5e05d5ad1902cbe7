#[derive(Debug)]
pub enum Validity {
    Valid,
    Invalid(String),
}

impl Validity {
    pub fn is_valid(&self) -> bool {
        match &self {
            Validity::Valid => true,
            Validity::Invalid(_) => false,
        }
    }
}

pub fn validate_email_address(email: &str) -> Validity {
    if email.is_empty() {
        return Validity::Invalid(String::from("Email address must not be empty."));
    }

    if email.chars().count() > 320 {
        return Validity::Invalid(String::from("Email address is too long."));
    }

    if email.chars().any(|c| c.is_whitespace() || !c.is_ascii()) {
        return Validity::Invalid(String::from(
            "Email address cannot contain whitespace or non-ASCII characters.",
        ));
    }

    let (username, domain) = match email.split_once('@') {
        Some(parts) => parts,
        None => {
            return Validity::Invalid(String::from("Email address must contain an at symbol (@)."))
        }
    };

    if username.is_empty() {
        return Validity::Invalid(String::from("Email username must not be empty."));
    }

    if domain.len() < 3 || domain.contains('@') {
        return Validity::Invalid(String::from(
            "Email address must have only one at symbol (@) and a valid domain.",
        ));
    }

    if !domain.contains('.') || domain.starts_with('.') || domain.ends_with('.') {
        return Validity::Invalid(String::from(
            "Domain in email address must contain a period and cannot begin or end with one.",
        ));
    }

    Validity::Valid
}

pub fn validate_password(password: &str) -> Validity {
    const MIN_PASSWORD_LENGTH: usize = 6;

    if password.chars().count() < MIN_PASSWORD_LENGTH {
        return Validity::Invalid(format!(
            "Password must be at least {MIN_PASSWORD_LENGTH} characters long."
        ));
    }

    Validity::Valid
}
