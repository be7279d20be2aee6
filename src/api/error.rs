use thiserror::Error;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum AuthError {
    #[error("invalid email or password")]
    InvalidCredential,
    #[error("an account with this email already exists")]
    AccountExists,
    #[error("request rejected: {0}")]
    Rejected(String),
    #[error("network failure: {0}")]
    Network(String),
}

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum DbError {
    #[error("not found")]
    NotFound,
    /// The stored id token was rejected; the session has been dropped.
    #[error("session expired")]
    Unauthorized,
    #[error("network failure: {0}")]
    Network(String),
    #[error("malformed response: {0}")]
    Malformed(String),
}

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum StorageError {
    #[error("upload failed: {0}")]
    UploadFailed(String),
    #[error("not found")]
    NotFound,
    #[error("session expired")]
    Unauthorized,
    #[error("network failure: {0}")]
    Network(String),
}

impl From<reqwest::Error> for AuthError {
    fn from(e: reqwest::Error) -> Self {
        AuthError::Network(e.to_string())
    }
}

impl From<reqwest::Error> for DbError {
    fn from(e: reqwest::Error) -> Self {
        DbError::Network(e.to_string())
    }
}

impl From<reqwest::Error> for StorageError {
    fn from(e: reqwest::Error) -> Self {
        StorageError::Network(e.to_string())
    }
}

impl AuthError {
    /// Maps an Identity Toolkit error `message` (e.g. `EMAIL_EXISTS`, or
    /// `WEAK_PASSWORD : Password should be...`) onto the error taxonomy.
    pub fn from_code(message: &str) -> Self {
        let code = message.split(':').next().unwrap_or_default().trim();
        match code {
            "EMAIL_EXISTS" => AuthError::AccountExists,
            "EMAIL_NOT_FOUND"
            | "INVALID_PASSWORD"
            | "INVALID_LOGIN_CREDENTIALS"
            | "INVALID_EMAIL" => AuthError::InvalidCredential,
            other => AuthError::Rejected(other.to_string()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn identity_toolkit_codes_map_to_taxonomy() {
        assert_eq!(AuthError::from_code("EMAIL_EXISTS"), AuthError::AccountExists);
        assert_eq!(
            AuthError::from_code("INVALID_LOGIN_CREDENTIALS"),
            AuthError::InvalidCredential
        );
        assert_eq!(
            AuthError::from_code("WEAK_PASSWORD : Password should be at least 6 characters"),
            AuthError::Rejected("WEAK_PASSWORD".into())
        );
    }
}
