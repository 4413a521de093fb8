use std::time::Duration;

use tokio::sync::mpsc;

/// Where simulation ticks come from. The cadence is pluggable so the match
/// loop runs identically off a wall-clock interval, a host frame callback
/// feeding the manual channel, or a test driving ticks by hand.
pub enum TickSource {
    Interval(tokio::time::Interval),
    Manual(mpsc::UnboundedReceiver<()>),
}

impl TickSource {
    /// Ticks at roughly the given rate. Missed ticks are skipped, not
    /// bunched.
    pub fn interval(hz: f32) -> Self {
        let mut interval = tokio::time::interval(Duration::from_secs_f32(1.0 / hz));
        interval.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Skip);
        Self::Interval(interval)
    }

    /// A tick source driven by hand. Each `send(())` yields one tick.
    pub fn manual() -> (Self, mpsc::UnboundedSender<()>) {
        let (tx, rx) = mpsc::unbounded_channel();
        (Self::Manual(rx), tx)
    }

    /// Wait for the next tick. Returns false once a manual source's sender
    /// is gone and all queued ticks are spent; an interval never ends.
    pub async fn tick(&mut self) -> bool {
        match self {
            Self::Interval(interval) => {
                interval.tick().await;
                true
            },
            Self::Manual(rx) => rx.recv().await.is_some(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn manual_source_yields_one_tick_per_send() {
        let (mut ticks, tx) = TickSource::manual();
        tx.send(()).unwrap();
        tx.send(()).unwrap();
        assert!(ticks.tick().await);
        assert!(ticks.tick().await);

        drop(tx);
        assert!(!ticks.tick().await, "Exhausted manual source must end");
    }

    #[tokio::test]
    async fn interval_source_keeps_ticking() {
        let mut ticks = TickSource::interval(1000.0);
        for _ in 0..3 {
            let fired = tokio::time::timeout(Duration::from_secs(1), ticks.tick())
                .await
                .expect("Interval tick should fire well within a second");
            assert!(fired);
        }
    }
}
