//! Per-request API key resolution.

use crate::error::{RecapError, Result};

/// Candidate keys for one provider invocation.
///
/// Built per request and never cached: the user key belongs to the request.
#[derive(Debug, Clone, Copy, Default)]
pub struct ApiKeyContext<'a> {
    pub user_key: Option<&'a str>,
    pub default_key: Option<&'a str>,
}

impl<'a> ApiKeyContext<'a> {
    pub fn new(user_key: Option<&'a str>, default_key: Option<&'a str>) -> Self {
        Self {
            user_key,
            default_key,
        }
    }

    /// The user key wins over the configured default; blank keys count as absent.
    pub fn resolve(&self, provider: &str) -> Result<String> {
        self.user_key
            .filter(|k| !k.trim().is_empty())
            .or(self.default_key.filter(|k| !k.trim().is_empty()))
            .map(|k| k.trim().to_string())
            .ok_or_else(|| RecapError::MissingApiKey(provider.to_string()))
    }
}
