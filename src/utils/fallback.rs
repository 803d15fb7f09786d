//! Ordered fallback over fallible async strategies.

use std::future::Future;

/// Tries `attempt` on each candidate in order and returns the first `Ok`.
///
/// Candidates are attempted strictly one at a time; later candidates are
/// never started once one succeeds. If all fail, every error is returned in
/// candidate order (an empty input yields `Err(vec![])`).
pub async fn first_success<I, T, E, F, Fut>(candidates: I, mut attempt: F) -> Result<T, Vec<E>>
where
    I: IntoIterator,
    F: FnMut(I::Item) -> Fut,
    Fut: Future<Output = Result<T, E>>,
{
    let mut errors = Vec::new();
    for candidate in candidates {
        match attempt(candidate).await {
            Ok(value) => return Ok(value),
            Err(e) => errors.push(e),
        }
    }
    Err(errors)
}
