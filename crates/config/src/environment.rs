//! Deployment environment tags
//!
//! Provides the closed set of environments an application can run under and
//! forgiving-case parsing from command-line input.

use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// Error returned when a string does not name a known environment
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unknown environment '{0}'")]
pub struct UnknownEnvironment(pub String);

/// Deployment environment selecting which configuration block applies
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Environment {
    Development,
    Testing,
    Staging,
    Production,
}

impl Environment {
    /// Every environment, in promotion order
    pub const ALL: [Environment; 4] = [
        Environment::Development,
        Environment::Testing,
        Environment::Staging,
        Environment::Production,
    ];

    /// Canonical name, also the YAML lookup key
    pub const fn as_str(&self) -> &'static str {
        match self {
            Environment::Development => "Development",
            Environment::Testing => "Testing",
            Environment::Staging => "Staging",
            Environment::Production => "Production",
        }
    }
}

impl fmt::Display for Environment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Normalize a raw environment name: first character upper-cased, remainder
/// lower-cased. This is forgiving-case parsing, not fuzzy matching.
fn normalize(raw: &str) -> String {
    let mut chars = raw.chars();
    match chars.next() {
        Some(first) => first
            .to_uppercase()
            .chain(chars.flat_map(|c| c.to_lowercase()))
            .collect(),
        None => String::new(),
    }
}

impl FromStr for Environment {
    type Err = UnknownEnvironment;

    fn from_str(raw: &str) -> Result<Self, Self::Err> {
        match normalize(raw).as_str() {
            "Development" => Ok(Environment::Development),
            "Testing" => Ok(Environment::Testing),
            "Staging" => Ok(Environment::Staging),
            "Production" => Ok(Environment::Production),
            _ => Err(UnknownEnvironment(raw.to_string())),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    proptest! {
        #![proptest_config(ProptestConfig::with_cases(100))]

        // Any case-mangled spelling of a canonical name resolves to the same
        // environment.
        #[test]
        fn prop_case_variants_resolve_identically(
            env_idx in 0usize..4,
            flips in proptest::collection::vec(proptest::bool::ANY, 11),
        ) {
            let canonical = Environment::ALL[env_idx];
            let mangled: String = canonical
                .as_str()
                .chars()
                .zip(flips.iter().cycle())
                .map(|(c, flip)| {
                    if *flip {
                        c.to_uppercase().next().unwrap()
                    } else {
                        c.to_lowercase().next().unwrap()
                    }
                })
                .collect();

            prop_assert_eq!(mangled.parse::<Environment>(), Ok(canonical));
        }

        // Parsing never panics on arbitrary input.
        #[test]
        fn prop_parse_total(raw in ".*") {
            let _ = raw.parse::<Environment>();
        }
    }

    #[test]
    fn test_parse_canonical_names() {
        assert_eq!("Development".parse(), Ok(Environment::Development));
        assert_eq!("Testing".parse(), Ok(Environment::Testing));
        assert_eq!("Staging".parse(), Ok(Environment::Staging));
        assert_eq!("Production".parse(), Ok(Environment::Production));
    }

    #[test]
    fn test_parse_forgiving_case() {
        assert_eq!("PRODUCTION".parse(), Ok(Environment::Production));
        assert_eq!("production".parse(), Ok(Environment::Production));
        assert_eq!("pRoDuCtIoN".parse(), Ok(Environment::Production));
    }

    #[test]
    fn test_parse_rejects_prefixes_and_unknowns() {
        // Forgiving case only, no fuzzy matching
        assert_eq!(
            "devel".parse::<Environment>(),
            Err(UnknownEnvironment("devel".to_string()))
        );
        assert_eq!(
            "prod".parse::<Environment>(),
            Err(UnknownEnvironment("prod".to_string()))
        );
        assert!("".parse::<Environment>().is_err());
    }

    #[test]
    fn test_display_matches_canonical_name() {
        for env in Environment::ALL {
            assert_eq!(env.to_string(), env.as_str());
            assert_eq!(env.as_str().parse(), Ok(env));
        }
    }
}
