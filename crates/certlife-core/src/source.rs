//! The zone source abstraction.

use async_trait::async_trait;

use crate::Result;

/// An account at a DNS provider that can enumerate the names to probe.
///
/// Implementations hide authentication, pagination, and wire formats. A fetch
/// must be read-only with respect to the remote system and returns the FQDNs
/// of all A and CNAME records across every zone the credentials can reach,
/// apex entries excluded (see [`crate::ZoneRecord::is_probe_target`]).
#[async_trait]
pub trait ZoneSource: Send + Sync {
    /// Short provider identifier used in log fields
    fn name(&self) -> &'static str;

    /// Fetch the current set of FQDNs for this account.
    async fn fetch_domains(&self) -> Result<Vec<String>>;
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::CertlifeError;

    struct Fixed(Vec<&'static str>);

    #[async_trait]
    impl ZoneSource for Fixed {
        fn name(&self) -> &'static str {
            "fixed"
        }

        async fn fetch_domains(&self) -> Result<Vec<String>> {
            if self.0.is_empty() {
                return Err(CertlifeError::Internal("empty".into()));
            }
            Ok(self.0.iter().map(ToString::to_string).collect())
        }
    }

    #[tokio::test]
    async fn test_boxed_source_delegates() {
        let source: Box<dyn ZoneSource> = Box::new(Fixed(vec!["a.example", "b.example"]));
        assert_eq!(source.name(), "fixed");
        assert_eq!(
            source.fetch_domains().await.unwrap(),
            vec!["a.example", "b.example"]
        );
    }

    #[tokio::test]
    async fn test_source_error_surfaces() {
        let source = Fixed(vec![]);
        assert!(source.fetch_domains().await.is_err());
    }
}
