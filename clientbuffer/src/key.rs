use crate::validated::*;
use std::{fmt, str::FromStr};

/// Identifies one watermark: a client and the target it has seen lines for.
///
/// Stored as `client/target`. Client identifiers can't contain `/`, so the
/// first `/` always separates the two even when the target contains one.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct WatermarkKey {
    pub client: ClientId,
    pub target: Target,
}

impl WatermarkKey {
    pub fn new(client: ClientId, target: Target) -> Self {
        Self { client, target }
    }

    /// The storage key prefix shared by all of `client`'s watermarks
    pub fn prefix_for(client: &ClientId) -> String {
        format!("{}/", client)
    }

    pub fn storage_key(&self) -> String {
        self.to_string()
    }

    /// Split a storage key back into its parts. Returns `None` for
    /// registration keys and anything else that isn't a valid watermark key.
    pub fn parse(key: &str) -> Option<Self> {
        let (client, target) = key.split_once('/')?;
        Some(Self {
            client: ClientId::from_str(client).ok()?,
            target: Target::from_str(target).ok()?,
        })
    }
}

impl fmt::Display for WatermarkKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.client, self.target)
    }
}
