//! OAuth scope handling.
//!
//! [`AuthScopes`] is the set of access scopes the app requests when a
//! merchant installs it, e.g. `read_products`.

use crate::error::ConfigError;
use std::collections::BTreeSet;
use std::fmt;
use std::str::FromStr;

/// A set of OAuth scopes requested during installation.
///
/// Scopes are kept sorted so the value placed in the authorization URL is
/// stable. Write scopes imply the matching read scope, so `write_products`
/// also yields `read_products`.
///
/// # Example
///
/// ```rust
/// use shopify_session_app::AuthScopes;
///
/// let scopes: AuthScopes = "write_products, read_orders".parse().unwrap();
/// assert_eq!(scopes.to_string(), "read_orders,read_products,write_products");
/// ```
#[derive(Clone, Debug, PartialEq, Eq, Default)]
pub struct AuthScopes {
    scopes: BTreeSet<String>,
}

impl AuthScopes {
    /// Creates an empty scope set.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns an iterator over the scopes in sorted order.
    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.scopes.iter().map(String::as_str)
    }

    fn implied_scope(scope: &str) -> Option<String> {
        scope
            .strip_prefix("unauthenticated_write_")
            .map(|rest| format!("unauthenticated_read_{rest}"))
            .or_else(|| {
                scope
                    .strip_prefix("write_")
                    .map(|rest| format!("read_{rest}"))
            })
    }
}

impl FromStr for AuthScopes {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let mut scopes = BTreeSet::new();

        for scope in s.split(',').map(str::trim).filter(|s| !s.is_empty()) {
            if !scope.chars().all(|c| c.is_ascii_alphanumeric() || c == '_') {
                return Err(ConfigError::InvalidScopes {
                    reason: format!("Invalid characters in scope: '{scope}'"),
                });
            }

            if let Some(implied) = Self::implied_scope(scope) {
                scopes.insert(implied);
            }
            scopes.insert(scope.to_string());
        }

        Ok(Self { scopes })
    }
}

impl fmt::Display for AuthScopes {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let joined = self.iter().collect::<Vec<_>>().join(",");
        f.write_str(&joined)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parses_comma_separated() {
        let scopes: AuthScopes = "read_products, read_orders".parse().unwrap();
        assert!(scopes.iter().any(|s| s == "read_products"));
        assert!(scopes.iter().any(|s| s == "read_orders"));
    }

    #[test]
    fn test_write_implies_read() {
        let scopes: AuthScopes = "write_products".parse().unwrap();
        assert!(scopes.iter().any(|s| s == "read_products"));

        let scopes: AuthScopes = "unauthenticated_write_checkouts".parse().unwrap();
        assert!(scopes.iter().any(|s| s == "unauthenticated_read_checkouts"));
    }

    #[test]
    fn test_display_is_sorted_and_stable() {
        let scopes: AuthScopes = "write_orders,read_products".parse().unwrap();
        assert_eq!(scopes.to_string(), "read_orders,read_products,write_orders");
    }

    #[test]
    fn test_rejects_invalid_characters() {
        let result: Result<AuthScopes, _> = "read products".parse();
        assert!(matches!(result, Err(ConfigError::InvalidScopes { .. })));
    }

    #[test]
    fn test_empty_input_gives_empty_set() {
        let scopes: AuthScopes = " , ".parse().unwrap();
        assert_eq!(scopes.iter().count(), 0);
        assert_eq!(scopes.to_string(), "");
    }
}
