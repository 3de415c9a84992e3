use std::fmt;
use std::str::FromStr;

use crate::error::Error;

const SEPARATOR: char = '/';
const SEGMENTS: usize = 3;

/// Where a variable lives: on an account, or on one site of that account.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct AccountScope {
    pub account_id: String,
    site_id: Option<String>,
}

impl AccountScope {
    /// An empty `site_id` is the same as no site.
    pub fn new(account_id: impl Into<String>, site_id: Option<String>) -> Self {
        Self {
            account_id: account_id.into(),
            site_id: site_id.filter(|s| !s.is_empty()),
        }
    }

    pub fn site_id(&self) -> Option<&str> {
        self.site_id.as_deref()
    }

    pub fn is_site_scoped(&self) -> bool {
        self.site_id.is_some()
    }
}

/// Composite identifier of a variable: `key/account_id/site_id`.
///
/// The site segment is empty for account-level variables. Keys and account
/// ids containing `/` are not escaped and will not decode back correctly.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct EnvVarId {
    pub scope: AccountScope,
    pub key: String,
}

impl EnvVarId {
    pub fn new(scope: AccountScope, key: impl Into<String>) -> Self {
        Self {
            scope,
            key: key.into(),
        }
    }

    pub fn encode(&self) -> String {
        format!(
            "{}{SEPARATOR}{}{SEPARATOR}{}",
            self.key,
            self.scope.account_id,
            self.scope.site_id().unwrap_or_default()
        )
    }

    // NOTE: Extra trailing segments are ignored so older `key/account//` ids still decode
    pub fn decode(id: &str) -> Result<Self, Error> {
        let segments: Vec<&str> = id.split(SEPARATOR).collect();
        if segments.len() < SEGMENTS {
            return Err(Error::MalformedId { id: id.to_string() });
        }

        let site_id = Some(segments[2].to_string());
        Ok(Self::new(
            AccountScope::new(segments[1], site_id),
            segments[0],
        ))
    }
}

impl fmt::Display for EnvVarId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.encode())
    }
}

impl FromStr for EnvVarId {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::decode(s)
    }
}
