//! Fan-out to every node, wait for the whole batch, then gate on a predicate.
//!
//! Responses from one round must be combined only with responses from the same
//! round, so nothing here races for the first `k` answers: every call is driven
//! to completion before the predicate sees the batch.

use core::future::Future;

use futures::future::join_all;

use crate::Error;

/// Drives all `calls` concurrently and returns their outputs in call order once
/// every one of them has settled.
pub async fn settle_all<I, F, T>(calls: I) -> Vec<T>
where
    I: IntoIterator<Item = F>,
    F: Future<Output = T>,
{
    join_all(calls).await
}

/// Drives all `calls` to completion, then hands the positional results to
/// `predicate`, which either accepts the batch (returning the filtered value)
/// or rejects it with the reason.
pub async fn gather<I, F, T, P, O>(calls: I, predicate: P) -> Result<O, Error>
where
    I: IntoIterator<Item = F>,
    F: Future<Output = T>,
    P: FnOnce(Vec<T>) -> Result<O, Error>,
{
    let results = settle_all(calls).await;
    predicate(results)
}

/// Keeps only the non-empty responses.
pub fn non_empty(responses: Vec<Option<String>>) -> Vec<String> {
    responses
        .into_iter()
        .flatten()
        .filter(|response| !response.is_empty())
        .collect()
}

#[cfg(test)]
mod tests {
    use core::time::Duration;

    use super::*;
    use crate::Phase;

    #[tokio::test]
    async fn gather_waits_for_slow_calls_and_keeps_order() {
        let calls = (0..4u64).map(|i| async move {
            tokio::time::sleep(Duration::from_millis(40 - 10 * i)).await;
            i
        });
        let results = gather(calls, Ok).await.unwrap();
        assert_eq!(results, vec![0, 1, 2, 3]);
    }

    #[tokio::test]
    async fn gather_propagates_predicate_failure() {
        let calls = (0..3).map(|i| async move { (i % 2 == 0).then(|| "ok".to_string()) });
        let result = gather(calls, |responses| {
            let received = non_empty(responses).len();
            if received >= 3 {
                Ok(received)
            } else {
                Err(Error::QuorumNotReached {
                    phase: Phase::Commitment,
                    received,
                    required: 3,
                })
            }
        })
        .await;
        assert_eq!(
            result,
            Err(Error::QuorumNotReached {
                phase: Phase::Commitment,
                received: 2,
                required: 3,
            })
        );
    }

    #[test]
    fn non_empty_drops_missing_and_blank_responses() {
        let responses = vec![Some("a".to_string()), None, Some(String::new())];
        assert_eq!(non_empty(responses), vec!["a".to_string()]);
    }
}
