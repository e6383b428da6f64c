//! Connection health probe backed by a constant-result query.

use tracing::info;

use crate::client::GraphClient;

/// Query whose result is known ahead of time.
pub const PROBE_QUERY: &str = "select 2+2";

/// Value [`PROBE_QUERY`] must return on a working connection.
pub const PROBE_EXPECTED: i64 = 4;

/// Outcome of one health probe.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Probe {
    /// The probe query returned the expected value.
    Healthy,
    /// The probe query ran but returned something else.
    Mismatch(i64),
    /// The probe query failed outright.
    Failed(String),
}

impl Probe {
    pub fn is_healthy(&self) -> bool {
        matches!(self, Probe::Healthy)
    }

    /// Human-readable diagnostic: the returned value or the error text.
    pub fn detail(&self) -> String {
        match self {
            Probe::Healthy => PROBE_EXPECTED.to_string(),
            Probe::Mismatch(value) => value.to_string(),
            Probe::Failed(message) => message.clone(),
        }
    }
}

/// Runs [`PROBE_QUERY`] on the live connection and compares the result to
/// [`PROBE_EXPECTED`].
pub async fn probe<C: GraphClient>(client: &C) -> Probe {
    match client.query_single_i64(PROBE_QUERY).await {
        Ok(PROBE_EXPECTED) => {
            info!(query = PROBE_QUERY, "health probe passed");
            Probe::Healthy
        }
        Ok(value) => Probe::Mismatch(value),
        Err(error) => Probe::Failed(error.to_string()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::client::mock::MockClient;

    #[tokio::test]
    async fn test_with_expected_value() {
        let client = MockClient::default().single(4);

        let probe = probe(&client).await;
        assert!(probe.is_healthy());
        assert_eq!(probe.detail(), "4");
        assert_eq!(client.seen(), vec![PROBE_QUERY]);
    }

    #[tokio::test]
    async fn test_with_unexpected_value() {
        let client = MockClient::default().single(5);

        let probe = probe(&client).await;
        assert_eq!(probe, Probe::Mismatch(5));
        assert!(!probe.is_healthy());
        assert_eq!(probe.detail(), "5");
    }

    #[tokio::test]
    async fn test_with_failing_driver() {
        let client = MockClient::default().failing("connection refused");

        let probe = probe(&client).await;
        assert!(!probe.is_healthy());
        assert!(probe.detail().contains("connection refused"));
    }
}
