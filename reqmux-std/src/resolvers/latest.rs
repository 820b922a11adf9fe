//! Default conflict policy.

use reqmux_core::{Applier, BoxError, Reply, Resolver};

/// Lets exactly one listener decide.
///
/// The winner is the applier with the highest `priority` (missing counts as
/// `0`); among equals the one registered last wins. Only the winner runs,
/// and its reply is returned unchanged. No appliers means the neutral reply.
#[derive(Debug, Clone, Copy, Default)]
pub struct LatestWins;

impl LatestWins {
    /// Picks the winning applier without running anything.
    pub fn select(appliers: Vec<Applier>) -> Option<Applier> {
        appliers.into_iter().max_by_key(|applier| {
            let ctx = applier.context();
            (ctx.priority.unwrap_or(0), ctx.order)
        })
    }
}

impl Resolver for LatestWins {
    async fn resolve(&self, appliers: Vec<Applier>) -> Result<Reply, BoxError> {
        match Self::select(appliers) {
            Some(winner) => Ok(winner.apply().await?),
            None => Ok(Reply::neutral()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::RecordingAction;
    use reqmux_core::{ContextOptions, ListenerError, RequestDetails};
    use std::sync::Arc;

    fn applier(order: u64, priority: Option<i32>, action: &RecordingAction) -> Applier {
        let mut options = ContextOptions::new();
        options.priority = priority;
        Applier::new(
            options.into_context(order),
            Arc::new(action.clone()),
            Arc::new(RequestDetails::new("http://test.com/")),
        )
    }

    #[tokio::test]
    async fn test_last_registered_decides() {
        let a = RecordingAction::replying(Reply::neutral().with("result", "A"));
        let b = RecordingAction::silent();
        let c = RecordingAction::replying(Reply::neutral().with("result", "X"));

        let reply = LatestWins
            .resolve(vec![
                applier(1, None, &a),
                applier(2, None, &b),
                applier(3, None, &c),
            ])
            .await
            .unwrap();

        assert_eq!(reply.get("result").and_then(|v| v.as_str()), Some("X"));
        assert_eq!(a.call_count(), 0);
        assert_eq!(b.call_count(), 0);
        assert_eq!(c.call_count(), 1);
    }

    #[tokio::test]
    async fn test_priority_beats_order() {
        let early = RecordingAction::replying(Reply::cancel());
        let late = RecordingAction::replying(Reply::redirect("http://elsewhere/"));

        let reply = LatestWins
            .resolve(vec![applier(1, Some(10), &early), applier(2, None, &late)])
            .await
            .unwrap();

        assert!(reply.cancel);
        assert_eq!(late.call_count(), 0);
    }

    #[tokio::test]
    async fn test_negative_priority_loses_to_default() {
        let late = RecordingAction::replying(Reply::cancel());
        let early = RecordingAction::replying(Reply::neutral());

        let reply = LatestWins
            .resolve(vec![applier(1, None, &early), applier(2, Some(-1), &late)])
            .await
            .unwrap();

        assert!(!reply.cancel);
        assert_eq!(late.call_count(), 0);
    }

    #[tokio::test]
    async fn test_empty_is_neutral() {
        assert!(LatestWins.resolve(Vec::new()).await.unwrap().is_neutral());
    }

    #[tokio::test]
    async fn test_winner_failure_propagates() {
        let failing = RecordingAction::failing("broken");

        let err = LatestWins
            .resolve(vec![applier(1, None, &failing)])
            .await
            .unwrap_err();

        assert!(matches!(
            err.downcast_ref::<ListenerError>(),
            Some(ListenerError::Failed(_))
        ));
    }
}
