use serde::{Deserialize, Serialize};
use std::fmt;

/// Result of the most recent probe against a domain
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CheckStatus {
    /// TLS completed and a certificate was observed
    Ok,
    /// Request construction, connection, or handshake failed
    #[default]
    Fail,
}

impl CheckStatus {
    /// Label value used in the exposition output
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Ok => "ok",
            Self::Fail => "fail",
        }
    }
}

impl fmt::Display for CheckStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Remaining certificate validity as measured by one probe.
///
/// `remaining_seconds` is negative once the certificate has expired and is
/// always zero for a failed probe.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ProbeOutcome {
    /// Seconds from the measurement until the certificate's `not_after`
    pub remaining_seconds: f64,
    /// Whether the probe observed a certificate
    pub status: CheckStatus,
}

impl ProbeOutcome {
    /// A successful measurement
    #[must_use]
    pub const fn ok(remaining_seconds: f64) -> Self {
        Self {
            remaining_seconds,
            status: CheckStatus::Ok,
        }
    }

    /// A failed probe
    #[must_use]
    pub const fn fail() -> Self {
        Self {
            remaining_seconds: 0.0,
            status: CheckStatus::Fail,
        }
    }

    /// Returns true if the probe observed a certificate
    #[must_use]
    pub fn is_ok(&self) -> bool {
        self.status == CheckStatus::Ok
    }

    /// Remaining validity in days, for log lines
    #[must_use]
    pub fn remaining_days(&self) -> f64 {
        self.remaining_seconds / 86_400.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fail_outcome_is_zero() {
        let outcome = ProbeOutcome::fail();
        assert_eq!(outcome.status, CheckStatus::Fail);
        assert!(outcome.remaining_seconds.abs() < f64::EPSILON);
        assert!(!outcome.is_ok());
    }

    #[test]
    fn test_status_labels() {
        assert_eq!(CheckStatus::Ok.to_string(), "ok");
        assert_eq!(CheckStatus::Fail.to_string(), "fail");
        assert_eq!(serde_json::to_string(&CheckStatus::Ok).unwrap(), "\"ok\"");
    }

    #[test]
    fn test_remaining_days() {
        let outcome = ProbeOutcome::ok(-3600.0 * 24.0);
        assert!((outcome.remaining_days() + 1.0).abs() < 1e-9);
        assert!(outcome.is_ok());
    }
}
