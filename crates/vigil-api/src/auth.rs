use secrecy::SecretString;

/// Source of the bearer token attached to every webhook call.
///
/// Token issuance and renewal happen elsewhere (the identity provider's
/// session); the client only asks for whatever token is current at the
/// moment a request is built.
pub trait TokenProvider: Send + Sync {
    /// The current bearer token, or `None` for unauthenticated endpoints.
    fn bearer_token(&self) -> Option<SecretString>;
}

/// A fixed token resolved once from configuration.
#[derive(Debug, Clone)]
pub struct StaticToken(SecretString);

impl StaticToken {
    pub fn new(token: SecretString) -> Self {
        Self(token)
    }
}

impl TokenProvider for StaticToken {
    fn bearer_token(&self) -> Option<SecretString> {
        Some(self.0.clone())
    }
}

/// No `Authorization` header at all.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoAuth;

impl TokenProvider for NoAuth {
    fn bearer_token(&self) -> Option<SecretString> {
        None
    }
}

