//! Gate verdicts.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// Admissibility decision for a single bundle.
///
/// `Hold` and `Deny` both block execution with an identical result shape;
/// there is no deferred re-submission path for `Hold`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Verdict {
    /// Bundle is admissible; execution proceeds.
    Allow,
    /// Bundle needs further evaluation; execution is blocked.
    Hold,
    /// Bundle is inadmissible; execution is blocked.
    Deny,
}

impl Verdict {
    /// Every verdict a conformant gate may return.
    pub const VALID_VERDICTS: [Verdict; 3] = [Verdict::Allow, Verdict::Hold, Verdict::Deny];

    pub fn as_str(self) -> &'static str {
        match self {
            Verdict::Allow => "ALLOW",
            Verdict::Hold => "HOLD",
            Verdict::Deny => "DENY",
        }
    }

    /// True when the verdict stops execution before dispatch.
    pub fn blocks(self) -> bool {
        matches!(self, Verdict::Hold | Verdict::Deny)
    }
}

impl fmt::Display for Verdict {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Verdict {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Verdict::VALID_VERDICTS
            .into_iter()
            .find(|verdict| verdict.as_str() == s)
            .ok_or_else(|| format!("invalid verdict '{s}' (expected ALLOW, HOLD or DENY)"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn valid_verdicts_cover_all_three() {
        let names: Vec<&str> = Verdict::VALID_VERDICTS
            .iter()
            .map(|verdict| verdict.as_str())
            .collect();
        assert_eq!(names, vec!["ALLOW", "HOLD", "DENY"]);
    }

    #[test]
    fn parses_exact_names_only() {
        assert_eq!("DENY".parse::<Verdict>(), Ok(Verdict::Deny));
        assert!("deny".parse::<Verdict>().is_err());
        assert!("MAYBE".parse::<Verdict>().is_err());
    }

    #[test]
    fn only_allow_lets_execution_through() {
        assert!(!Verdict::Allow.blocks());
        assert!(Verdict::Hold.blocks());
        assert!(Verdict::Deny.blocks());
    }

    #[test]
    fn serializes_as_upper_case_strings() {
        assert_eq!(
            serde_json::to_value(Verdict::Hold).expect("encode"),
            serde_json::json!("HOLD")
        );
    }
}
