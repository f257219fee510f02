//! Browser profiles used for the User-Agent and client fingerprint.

use rand::Rng;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum BrowserProfile {
    #[serde(rename = "edge99")]
    Edge99,
    #[serde(rename = "edge101")]
    Edge101,
    #[serde(rename = "safari15_3")]
    Safari15_3,
    #[serde(rename = "safari15_5")]
    Safari15_5,
    #[serde(rename = "chrome110")]
    Chrome110,
    #[serde(rename = "chrome116")]
    Chrome116,
}

impl BrowserProfile {
    pub const ALL: [BrowserProfile; 6] = [
        BrowserProfile::Edge99,
        BrowserProfile::Edge101,
        BrowserProfile::Safari15_3,
        BrowserProfile::Safari15_5,
        BrowserProfile::Chrome110,
        BrowserProfile::Chrome116,
    ];

    /// Picks a profile uniformly from [`BrowserProfile::ALL`].
    pub fn choose<R: Rng + ?Sized>(rng: &mut R) -> Self {
        Self::ALL[rng.gen_range(0..Self::ALL.len())]
    }

    pub fn name(&self) -> &'static str {
        match self {
            BrowserProfile::Edge99 => "edge99",
            BrowserProfile::Edge101 => "edge101",
            BrowserProfile::Safari15_3 => "safari15_3",
            BrowserProfile::Safari15_5 => "safari15_5",
            BrowserProfile::Chrome110 => "chrome110",
            BrowserProfile::Chrome116 => "chrome116",
        }
    }

    pub fn user_agent(&self) -> &'static str {
        match self {
            BrowserProfile::Edge99 => {
                "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/99.0.4844.51 Safari/537.36 Edg/99.0.1150.30"
            }
            BrowserProfile::Edge101 => {
                "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/101.0.4951.64 Safari/537.36 Edg/101.0.1210.47"
            }
            BrowserProfile::Safari15_3 => {
                "Mozilla/5.0 (Macintosh; Intel Mac OS X 10_15_7) AppleWebKit/605.1.15 (KHTML, like Gecko) Version/15.3 Safari/605.1.15"
            }
            BrowserProfile::Safari15_5 => {
                "Mozilla/5.0 (Macintosh; Intel Mac OS X 10_15_7) AppleWebKit/605.1.15 (KHTML, like Gecko) Version/15.5 Safari/605.1.15"
            }
            BrowserProfile::Chrome110 => {
                "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/110.0.0.0 Safari/537.36"
            }
            BrowserProfile::Chrome116 => {
                "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/116.0.0.0 Safari/537.36"
            }
        }
    }

    /// TLS and HTTP/2 fingerprint matching this profile.
    ///
    /// Edge 99 has no handshake of its own in `wreq-util` and uses Edge 101's.
    #[cfg(feature = "emulation")]
    pub fn emulation(&self) -> wreq_util::Emulation {
        use wreq_util::Emulation;

        match self {
            BrowserProfile::Edge99 | BrowserProfile::Edge101 => Emulation::Edge101,
            BrowserProfile::Safari15_3 => Emulation::Safari15_3,
            BrowserProfile::Safari15_5 => Emulation::Safari15_5,
            BrowserProfile::Chrome110 => Emulation::Chrome110,
            BrowserProfile::Chrome116 => Emulation::Chrome116,
        }
    }
}

impl fmt::Display for BrowserProfile {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for BrowserProfile {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim().to_ascii_lowercase();
        Self::ALL
            .iter()
            .copied()
            .find(|p| p.name() == wanted)
            .ok_or_else(|| {
                let names: Vec<&str> = Self::ALL.iter().map(|p| p.name()).collect();
                format!(
                    "Unknown browser profile '{}', expected one of: {}",
                    s,
                    names.join(", ")
                )
            })
    }
}
