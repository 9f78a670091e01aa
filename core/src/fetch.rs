//! Parallel fan-out of per-identifier requests.
//!
//! All fetches are started together and polled concurrently on the caller's
//! task; no concurrency cap is applied. Outcomes come back in input order
//! regardless of which request finished first.

use std::future::Future;

use futures::future::join_all;
use serde_json::Value;

use crate::error::ApiError;
use crate::shape::Identifier;

/// Result of one per-identifier fetch.
pub type FetchOutcome = Result<Value, ApiError>;

/// Run `fetch` for every identifier concurrently, one outcome per id, in
/// input order.
pub async fn fetch_each<'a, F, Fut>(ids: &'a [Identifier], fetch: F) -> Vec<FetchOutcome>
where
    F: FnMut(&'a Identifier) -> Fut,
    Fut: Future<Output = FetchOutcome>,
{
    tracing::debug!(count = ids.len(), "fetching in parallel");
    join_all(ids.iter().map(fetch)).await
}

/// Fold outcomes into one result. The first failure in input order fails
/// the whole call and the remaining values are dropped.
pub fn aggregate(outcomes: Vec<FetchOutcome>) -> Result<Vec<Value>, ApiError> {
    outcomes.into_iter().collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ClientError;
    use serde_json::json;
    use std::time::Duration;

    fn ids(raw: &[&str]) -> Vec<Identifier> {
        raw.iter().map(|id| Identifier::new(*id)).collect()
    }

    #[tokio::test]
    async fn order_follows_input_not_completion() {
        let ids = ids(&["slow", "medium", "fast"]);
        let outcomes = fetch_each(&ids, |id| async move {
            let delay = match id.as_str() {
                "slow" => 60,
                "medium" => 30,
                _ => 0,
            };
            tokio::time::sleep(Duration::from_millis(delay)).await;
            Ok(json!({ "id": id.as_str() }))
        })
        .await;

        let values = aggregate(outcomes).unwrap();
        assert_eq!(
            values,
            vec![json!({"id": "slow"}), json!({"id": "medium"}), json!({"id": "fast"})]
        );
    }

    #[tokio::test]
    async fn fetches_are_in_flight_together() {
        let ids = ids(&["a", "b", "c"]);
        // Nobody gets past the barrier until all three fetches have started.
        let barrier = tokio::sync::Barrier::new(ids.len());
        let fetches = fetch_each(&ids, |id| {
            let barrier = &barrier;
            async move {
                barrier.wait().await;
                Ok(json!(id.as_str()))
            }
        });

        let outcomes = tokio::time::timeout(Duration::from_secs(5), fetches)
            .await
            .expect("fetches ran one after another");
        assert_eq!(aggregate(outcomes).unwrap(), vec![json!("a"), json!("b"), json!("c")]);
    }

    #[tokio::test]
    async fn every_fetch_runs_even_after_a_failure() {
        let ids = ids(&["bad", "good"]);
        let outcomes = fetch_each(&ids, |id| async move {
            if id.as_str() == "bad" {
                Err(ClientError::new("boom", None, None, None).into())
            } else {
                Ok(json!(id.as_str()))
            }
        })
        .await;

        assert_eq!(outcomes.len(), 2);
        assert!(outcomes[0].is_err());
        assert_eq!(outcomes[1].as_ref().unwrap(), &json!("good"));
    }

    #[test]
    fn aggregate_reports_first_failure_in_input_order() {
        let first: ApiError = ClientError::new("first", None, None, None).into();
        let second: ApiError = ClientError::new("second", None, None, None).into();
        let err = aggregate(vec![Ok(json!(1)), Err(first), Err(second)]).unwrap_err();
        assert_eq!(err.message(), "Client error: first");
    }
}
