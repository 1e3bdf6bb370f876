//! Integration tests for configuration loading and validation.

use std::collections::HashMap;

use shopify_session_app::{ApiVersion, AppConfig, ConfigError, ShopDomain};

fn lookup_from(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
    let vars: HashMap<String, String> = pairs
        .iter()
        .map(|(k, v)| ((*k).to_string(), (*v).to_string()))
        .collect();
    move |name| vars.get(name).cloned()
}

const MINIMAL: &[(&str, &str)] = &[
    ("SHOPIFY_API_KEY", "key"),
    ("SHOPIFY_API_SECRET", "secret"),
    ("DATABASE_URL", "memory"),
];

#[test]
fn test_minimal_environment_uses_defaults() {
    let config = AppConfig::from_lookup(lookup_from(MINIMAL)).unwrap();

    assert_eq!(config.api_version(), &ApiVersion::latest());
    assert_eq!(config.port(), 3000);
    assert!(config.session_cookie());
    assert!(!config.is_production());
}

#[test]
fn test_each_required_variable_is_reported() {
    for missing in ["SHOPIFY_API_KEY", "SHOPIFY_API_SECRET", "DATABASE_URL"] {
        let pairs: Vec<(&str, &str)> = MINIMAL
            .iter()
            .copied()
            .filter(|(name, _)| *name != missing)
            .collect();

        let result = AppConfig::from_lookup(lookup_from(&pairs));
        assert_eq!(
            result.unwrap_err(),
            ConfigError::MissingRequiredField { field: missing },
            "{missing}"
        );
    }
}

#[test]
fn test_blank_values_count_as_missing() {
    let result = AppConfig::from_lookup(lookup_from(&[
        ("SHOPIFY_API_KEY", "   "),
        ("SHOPIFY_API_SECRET", "secret"),
        ("DATABASE_URL", "memory"),
    ]));
    assert_eq!(
        result.unwrap_err(),
        ConfigError::MissingRequiredField {
            field: "SHOPIFY_API_KEY"
        }
    );
}

#[test]
fn test_invalid_values_are_rejected() {
    let with = |name: &'static str, value: &'static str| {
        let mut pairs = MINIMAL.to_vec();
        pairs.push((name, value));
        AppConfig::from_lookup(lookup_from(&pairs))
    };

    assert!(matches!(
        with("SHOPIFY_API_VERSION", "2025-13"),
        Err(ConfigError::InvalidApiVersion { .. })
    ));
    assert!(matches!(
        with("SHOPIFY_APP_URL", "app.example.com"),
        Err(ConfigError::InvalidHostUrl { .. })
    ));
    assert!(matches!(
        with("SESSION_COOKIE", "maybe"),
        Err(ConfigError::InvalidEnvValue {
            variable: "SESSION_COOKIE",
            ..
        })
    ));
    assert!(matches!(
        with("COOKIE_SECRET", "too-short"),
        Err(ConfigError::CookieSecretTooShort { len: 9 })
    ));
}

#[test]
fn test_shop_domain_accepts_only_myshopify_hosts() {
    assert!(ShopDomain::new("test-store.myshopify.com").is_ok());

    for invalid in [
        "",
        "test-store",
        "test-store.myshopify.com.evil.com",
        "evil.com",
        "-store.myshopify.com",
        "store_1.myshopify.com",
        "https://test-store.myshopify.com",
    ] {
        assert!(ShopDomain::new(invalid).is_err(), "{invalid}");
    }
}
