//! Validated string types for client identifiers and targets

use serde::{Deserialize, Serialize};
use std::{fmt, str::FromStr};
use thiserror::Error;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ValidationError {
    #[error("Invalid client identifier {0:?}")]
    InvalidClientId(String),
    #[error("Invalid target {0:?}")]
    InvalidTarget(String),
}

macro_rules! define_validated {
    (
        $(
            $(#[$attr:meta])*
            $typename:ident => $err:ident |$value:ident| $body:block
        )*
    ) => {
        $(
            $(#[$attr])*
            #[derive(Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
            #[serde(try_from = "String", into = "String")]
            pub struct $typename(String);

            impl $typename {
                /// Check whether the provided value is valid for this type
                pub fn validate($value: &str) -> Result<(), ValidationError> {
                    let valid: bool = $body;
                    if valid {
                        Ok(())
                    } else {
                        Err(ValidationError::$err($value.to_string()))
                    }
                }

                pub fn as_str(&self) -> &str {
                    &self.0
                }
            }

            impl FromStr for $typename {
                type Err = ValidationError;

                fn from_str(s: &str) -> Result<Self, Self::Err> {
                    Self::validate(s)?;
                    Ok(Self(s.to_string()))
                }
            }

            impl TryFrom<String> for $typename {
                type Error = ValidationError;

                fn try_from(s: String) -> Result<Self, Self::Error> {
                    Self::validate(&s)?;
                    Ok(Self(s))
                }
            }

            impl From<$typename> for String {
                fn from(v: $typename) -> String {
                    v.0
                }
            }

            impl AsRef<str> for $typename {
                fn as_ref(&self) -> &str {
                    &self.0
                }
            }

            impl fmt::Display for $typename {
                fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                    f.write_str(&self.0)
                }
            }

            impl PartialEq<str> for $typename {
                fn eq(&self, other: &str) -> bool {
                    self.0 == other
                }
            }
        )*
    };
}

fn has_no_whitespace(value: &str) -> bool {
    !value.chars().any(|c| c.is_whitespace() || c == '\0')
}

define_validated! {
    /// The relay-assigned name of one logical client connection slot.
    ///
    /// Identifiers may not contain `/`, since that separates the client from
    /// the target in stored watermark keys.
    ClientId => InvalidClientId |value| {
        !value.is_empty() && has_no_whitespace(value) && !value.contains('/')
    }

    /// A channel name or nick, exactly as it appears on the wire
    Target => InvalidTarget |value| {
        !value.is_empty() && has_no_whitespace(value)
    }
}
