// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Core domain types for the Slidewerk digitisation pipeline.

use serde::{Deserialize, Serialize};

/// Physical medium a scan was taken from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MediaKind {
    /// Mounted 35mm / medium-format slide on a flatbed scanner.
    Slide,
    /// Photographic print.
    Print,
}

impl MediaKind {
    /// Parse the media-type keyword used by the intake service.
    pub fn from_keyword(keyword: &str) -> Option<Self> {
        match keyword.to_ascii_lowercase().as_str() {
            "slide" | "slides" => Some(Self::Slide),
            "print" | "prints" => Some(Self::Print),
            _ => None,
        }
    }

    /// Keyword form, as accepted by [`MediaKind::from_keyword`].
    pub fn keyword(&self) -> &'static str {
        match self {
            Self::Slide => "slide",
            Self::Print => "print",
        }
    }
}

impl std::fmt::Display for MediaKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.keyword())
    }
}

/// Which physical aspect ratios a detected slide boundary may match.
///
/// Serialized as the keywords `"Any"`, `"4:3"`, `"3:2"` and `"1:1"`. Unknown
/// keywords deserialize to [`AspectRatioPolicy::Any`] so that a stale client
/// never blocks a batch.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(from = "String", into = "&'static str")]
pub enum AspectRatioPolicy {
    /// Accept any of the configured acceptable ratios.
    #[default]
    Any,
    /// 4:3 (1.33).
    FourThree,
    /// 3:2 (1.5), standard 35mm.
    ThreeTwo,
    /// 1:1, square / 6x6 format.
    Square,
}

impl AspectRatioPolicy {
    /// Parse a policy keyword, falling back to `Any` for anything unrecognised.
    pub fn from_keyword(keyword: &str) -> Self {
        match keyword.trim() {
            "4:3" => Self::FourThree,
            "3:2" => Self::ThreeTwo,
            "1:1" => Self::Square,
            _ => Self::Any,
        }
    }

    pub fn keyword(&self) -> &'static str {
        match self {
            Self::Any => "Any",
            Self::FourThree => "4:3",
            Self::ThreeTwo => "3:2",
            Self::Square => "1:1",
        }
    }

    /// The single ratio this policy enforces, or `None` for `Any`.
    pub fn enforced_ratio(&self) -> Option<f64> {
        match self {
            Self::Any => None,
            Self::FourThree => Some(1.33),
            Self::ThreeTwo => Some(1.5),
            Self::Square => Some(1.0),
        }
    }

    /// Ratios to test a candidate against, given the configured "any" set.
    pub fn ratios(&self, acceptable: &[f64]) -> Vec<f64> {
        match self.enforced_ratio() {
            Some(ratio) => vec![ratio],
            None => acceptable.to_vec(),
        }
    }
}

impl From<String> for AspectRatioPolicy {
    fn from(keyword: String) -> Self {
        Self::from_keyword(&keyword)
    }
}

impl From<AspectRatioPolicy> for &'static str {
    fn from(policy: AspectRatioPolicy) -> Self {
        policy.keyword()
    }
}

impl std::fmt::Display for AspectRatioPolicy {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.keyword())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn aspect_policy_keywords() {
        assert_eq!(AspectRatioPolicy::from_keyword("4:3"), AspectRatioPolicy::FourThree);
        assert_eq!(AspectRatioPolicy::from_keyword("3:2"), AspectRatioPolicy::ThreeTwo);
        assert_eq!(AspectRatioPolicy::from_keyword("1:1"), AspectRatioPolicy::Square);
        assert_eq!(AspectRatioPolicy::from_keyword("Any"), AspectRatioPolicy::Any);
        // Unknown keywords fall back rather than fail.
        assert_eq!(AspectRatioPolicy::from_keyword("16:9"), AspectRatioPolicy::Any);
    }

    #[test]
    fn aspect_policy_ratios() {
        let acceptable = [1.5, 1.33, 1.0];
        assert_eq!(AspectRatioPolicy::Any.ratios(&acceptable), vec![1.5, 1.33, 1.0]);
        assert_eq!(AspectRatioPolicy::ThreeTwo.ratios(&acceptable), vec![1.5]);
        assert_eq!(AspectRatioPolicy::FourThree.ratios(&acceptable), vec![1.33]);
        assert_eq!(AspectRatioPolicy::Square.ratios(&acceptable), vec![1.0]);
    }

    #[test]
    fn aspect_policy_serde_uses_keywords() {
        let json = serde_json::to_string(&AspectRatioPolicy::ThreeTwo).unwrap();
        assert_eq!(json, "\"3:2\"");
        let parsed: AspectRatioPolicy = serde_json::from_str("\"bogus\"").unwrap();
        assert_eq!(parsed, AspectRatioPolicy::Any);
    }

    #[test]
    fn media_kind_keywords() {
        assert_eq!(MediaKind::from_keyword("Slide"), Some(MediaKind::Slide));
        assert_eq!(MediaKind::from_keyword("prints"), Some(MediaKind::Print));
        assert_eq!(MediaKind::from_keyword("vhs"), None);
        assert_eq!(MediaKind::Print.to_string(), "print");
    }
}
