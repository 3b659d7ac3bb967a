//! Countdown driver.
//!
//! Runs a [`QuizSession`] against an injected one-second [`TickSource`] and
//! a channel of user [`Command`]s. The tick source is owned by the caller
//! and only borrowed here, so the timer is released as soon as the caller
//! drops it after [`drive`] returns.

use std::time::Duration;

use async_trait::async_trait;
use tokio::sync::mpsc;
use tokio::time::{interval_at, Instant, Interval, MissedTickBehavior};

use crate::error::SessionError;
use crate::scoring::ResultRecord;
use crate::session::{Command, QuizSession, SubmitReason, Tick};

/// A periodic clock signal.
#[async_trait]
pub trait TickSource: Send {
    /// Wait for the next tick.
    async fn next_tick(&mut self);
}

/// Ticks backed by a tokio interval.
pub struct IntervalTicks {
    interval: Interval,
}

impl IntervalTicks {
    /// First tick fires one `period` after creation, not immediately.
    pub fn new(period: Duration) -> Self {
        let mut interval = interval_at(Instant::now() + period, period);
        interval.set_missed_tick_behavior(MissedTickBehavior::Burst);
        Self { interval }
    }

    pub fn every_second() -> Self {
        Self::new(Duration::from_secs(1))
    }
}

#[async_trait]
impl TickSource for IntervalTicks {
    async fn next_tick(&mut self) {
        self.interval.tick().await;
    }
}

/// Callbacks fired while a session is driven.
pub trait SessionObserver: Send + Sync {
    fn on_tick(&self, remaining_secs: u32);
    /// A command was applied and the session is still active.
    fn on_changed(&self, session: &QuizSession);
    fn on_rejected(&self, error: &SessionError);
    fn on_submitted(&self, result: &ResultRecord, reason: SubmitReason);
}

/// Observer that ignores everything.
pub struct NoopObserver;

impl SessionObserver for NoopObserver {
    fn on_tick(&self, _: u32) {}
    fn on_changed(&self, _: &QuizSession) {}
    fn on_rejected(&self, _: &SessionError) {}
    fn on_submitted(&self, _: &ResultRecord, _: SubmitReason) {}
}

/// Drive `session` until it is submitted or abandoned.
///
/// Returns the result on manual submission or timeout. Returns `None` when
/// the command channel closes first; the session is then abandoned and no
/// result is produced.
pub async fn drive(
    session: &mut QuizSession,
    ticks: &mut dyn TickSource,
    commands: &mut mpsc::Receiver<Command>,
    observer: &dyn SessionObserver,
) -> Option<ResultRecord> {
    if let Some(result) = session.result() {
        return Some(result.clone());
    }

    loop {
        tokio::select! {
            biased;

            command = commands.recv() => {
                let Some(command) = command else {
                    tracing::info!(
                        answered = session.answered_count(),
                        "command channel closed, abandoning session"
                    );
                    return None;
                };
                match session.apply(command) {
                    Ok(Some(result)) => {
                        observer.on_submitted(&result, SubmitReason::Manual);
                        return Some(result);
                    }
                    Ok(None) => observer.on_changed(session),
                    Err(e) => {
                        tracing::debug!(?command, error = %e, "command rejected");
                        observer.on_rejected(&e);
                    }
                }
            }
            _ = ticks.next_tick() => {
                match session.tick() {
                    Tick::Running(remaining) => observer.on_tick(remaining),
                    Tick::Expired(result) => {
                        observer.on_submitted(&result, SubmitReason::Timeout);
                        return Some(result);
                    }
                    Tick::Idle => return session.result().cloned(),
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::fixtures;
    use std::sync::Mutex;

    fn session(n: usize) -> QuizSession {
        QuizSession::start(fixtures::questions(n), fixtures::settings(n as u32)).unwrap()
    }

    /// Ticks immediately, as fast as polled.
    struct InstantTicks {
        count: u32,
    }

    #[async_trait]
    impl TickSource for InstantTicks {
        async fn next_tick(&mut self) {
            self.count += 1;
            tokio::task::yield_now().await;
        }
    }

    #[derive(Default)]
    struct RecordingObserver {
        events: Mutex<Vec<String>>,
    }

    impl SessionObserver for RecordingObserver {
        fn on_tick(&self, remaining_secs: u32) {
            self.events
                .lock()
                .unwrap()
                .push(format!("tick {remaining_secs}"));
        }
        fn on_changed(&self, session: &QuizSession) {
            self.events
                .lock()
                .unwrap()
                .push(format!("changed {}", session.current_index()));
        }
        fn on_rejected(&self, _: &SessionError) {
            self.events.lock().unwrap().push("rejected".into());
        }
        fn on_submitted(&self, _: &ResultRecord, reason: SubmitReason) {
            self.events
                .lock()
                .unwrap()
                .push(format!("submitted {reason:?}"));
        }
    }

    #[tokio::test(start_paused = true)]
    async fn interval_times_out_the_session() {
        let mut s = session(1);
        let mut ticks = IntervalTicks::every_second();
        let (_tx, mut rx) = mpsc::channel(8);

        let started = Instant::now();
        let result = drive(&mut s, &mut ticks, &mut rx, &NoopObserver)
            .await
            .unwrap();

        assert_eq!(started.elapsed(), Duration::from_secs(60));
        assert_eq!(result.elapsed_seconds, 60);
        assert_eq!(result.unanswered_count, 1);
        assert_eq!(s.submit_reason(), Some(SubmitReason::Timeout));
    }

    #[tokio::test]
    async fn commands_are_applied_in_order() {
        let mut s = session(3);
        let mut ticks = IntervalTicks::every_second();
        let (tx, mut rx) = mpsc::channel(8);
        for command in [
            Command::Select(0),
            Command::Next,
            Command::Select(9),
            Command::Select(1),
            Command::Submit,
        ] {
            tx.send(command).await.unwrap();
        }

        let observer = RecordingObserver::default();
        let result = drive(&mut s, &mut ticks, &mut rx, &observer)
            .await
            .unwrap();

        assert_eq!(result.correct_count, 2);
        assert_eq!(result.unanswered_count, 1);
        assert_eq!(
            *observer.events.lock().unwrap(),
            vec![
                "changed 0",
                "changed 1",
                "rejected",
                "changed 1",
                "submitted Manual"
            ]
        );
    }

    #[tokio::test]
    async fn closed_channel_abandons_session() {
        let mut s = session(2);
        let mut ticks = IntervalTicks::every_second();
        let (tx, mut rx) = mpsc::channel(8);
        tx.send(Command::Select(0)).await.unwrap();
        drop(tx);

        let result = drive(&mut s, &mut ticks, &mut rx, &NoopObserver).await;
        assert!(result.is_none());
        assert!(!s.is_submitted());
    }

    #[tokio::test]
    async fn injected_ticks_drive_the_countdown() {
        let mut s = session(1);
        let mut ticks = InstantTicks { count: 0 };
        let (_tx, mut rx) = mpsc::channel::<Command>(1);
        let observer = RecordingObserver::default();

        let result = drive(&mut s, &mut ticks, &mut rx, &observer)
            .await
            .unwrap();

        assert_eq!(ticks.count, 60);
        assert_eq!(result.elapsed_seconds, 60);
        let events = observer.events.lock().unwrap();
        assert_eq!(events.first().map(String::as_str), Some("tick 59"));
        assert_eq!(events.last().map(String::as_str), Some("submitted Timeout"));
    }

    #[tokio::test]
    async fn already_submitted_session_returns_stored_result() {
        let mut s = session(2);
        let stored = s.submit();
        let mut ticks = InstantTicks { count: 0 };
        let (_tx, mut rx) = mpsc::channel::<Command>(1);

        let result = drive(&mut s, &mut ticks, &mut rx, &NoopObserver).await;
        assert_eq!(result, Some(stored));
        assert_eq!(ticks.count, 0);
    }
}
