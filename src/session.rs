//! A running playback session: the engine, a media clock, and the timer that ties them together.
//!
//! One tokio task owns the [`PlaybackEngine`] and the [`MediaClock`]. It waits on three things:
//! - cancellation (shutdown or drop of the [`Session`] handle)
//! - commands from the UI
//! - a fixed-interval timer (`PlayerOpts::tick_interval`, 10 Hz by default)
//!
//! The `select!` is biased in that order, so a queued seek or jump always lands before the next
//! tick samples the clock. Seeks are pushed into the clock before that sample is taken, which
//! keeps the position from snapping back to where it was before the seek.
//!
//! After every command and every tick the current [`PlaybackState`] is published on a `watch`
//! channel for presentation code.

use tokio::sync::{mpsc, watch};
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;
use tokio_util::sync::CancellationToken;
use tracing::{Instrument, debug, info_span};
use uuid::Uuid;

use crate::command::Command;
use crate::media::MediaClock;
use crate::playback::{PlaybackEngine, PlaybackState, Status};
use crate::{Error, Result};

/// Handle to a running session.
///
/// Dropping the handle stops the timer; use [`Session::shutdown`] to also get the engine back
/// (for example to carry its volume into the next session).
pub struct Session {
    id: Uuid,
    commands: mpsc::UnboundedSender<Command>,
    state: watch::Receiver<PlaybackState>,
    cancel: CancellationToken,
    task: Option<JoinHandle<PlaybackEngine>>,
}

impl Session {
    /// Start driving `engine` from `clock` on the current tokio runtime.
    ///
    /// If the engine already has a lesson loaded, the clock is pointed at its audio source.
    pub fn spawn<C>(engine: PlaybackEngine, clock: C) -> Self
    where
        C: MediaClock + 'static,
    {
        let id = Uuid::new_v4();
        let (commands_tx, commands_rx) = mpsc::unbounded_channel();
        let (state_tx, state_rx) = watch::channel(engine.state().clone());
        let cancel = CancellationToken::new();

        let span = info_span!("session", id = %id);
        let task = tokio::spawn(
            run(engine, clock, commands_rx, state_tx, cancel.clone()).instrument(span),
        );

        Self {
            id,
            commands: commands_tx,
            state: state_rx,
            cancel,
            task: Some(task),
        }
    }

    pub fn id(&self) -> Uuid {
        self.id
    }

    /// Queue a command. It is applied before the next tick.
    pub fn send(&self, command: Command) -> Result<()> {
        self.commands
            .send(command)
            .map_err(|_| Error::msg("playback session has stopped"))
    }

    /// The most recently published state.
    pub fn state(&self) -> PlaybackState {
        self.state.borrow().clone()
    }

    /// A receiver that is notified whenever the published state changes.
    pub fn subscribe(&self) -> watch::Receiver<PlaybackState> {
        self.state.clone()
    }

    /// Stop the timer, wait for the task to finish, and hand back the engine.
    pub async fn shutdown(mut self) -> Result<PlaybackEngine> {
        self.cancel.cancel();
        let task = self
            .task
            .take()
            .ok_or_else(|| Error::msg("playback session already shut down"))?;
        task.await
            .map_err(|err| Error::msg(format!("playback session task failed: {err}")))
    }
}

impl Drop for Session {
    fn drop(&mut self) {
        self.cancel.cancel();
    }
}

async fn run<C: MediaClock>(
    mut engine: PlaybackEngine,
    mut clock: C,
    mut commands: mpsc::UnboundedReceiver<Command>,
    state_tx: watch::Sender<PlaybackState>,
    cancel: CancellationToken,
) -> PlaybackEngine {
    let mut interval = tokio::time::interval(engine.opts().tick_interval);
    interval.set_missed_tick_behavior(MissedTickBehavior::Skip);

    if let Some(lesson) = engine.lesson() {
        clock.load(&lesson.audio_source);
    }
    clock.set_volume(engine.state().effective_volume());
    debug!("session started");

    loop {
        tokio::select! {
            biased;

            _ = cancel.cancelled() => break,

            command = commands.recv() => {
                let Some(command) = command else {
                    break;
                };
                apply_command(&mut engine, &mut clock, command);
            }

            _ = interval.tick() => {
                sample_clock(&mut engine, &clock);
            }
        }

        publish(&state_tx, engine.state());
    }

    if engine.state().is_playing {
        clock.pause();
    }
    debug!("session stopped");
    engine
}

/// Apply a command and mirror its effect onto the media clock.
fn apply_command<C: MediaClock>(engine: &mut PlaybackEngine, clock: &mut C, command: Command) {
    let was_playing = engine.state().is_playing;
    let moves_position = command.moves_position();
    let swaps_lesson = matches!(command, Command::Load(_) | Command::Unload);

    engine.apply(command);

    if swaps_lesson {
        match engine.lesson() {
            Some(lesson) => clock.load(&lesson.audio_source),
            None => clock.pause(),
        }
    }

    if moves_position {
        clock.seek(engine.state().position_seconds);
    }

    let is_playing = engine.state().is_playing;
    if is_playing != was_playing {
        if is_playing {
            clock.play();
        } else {
            clock.pause();
        }
    }

    clock.set_volume(engine.state().effective_volume());
}

/// One timer tick: pick up the media duration, then sample the position while playing.
fn sample_clock<C: MediaClock>(engine: &mut PlaybackEngine, clock: &C) {
    if engine.status() == Status::Idle {
        return;
    }

    if let Some(duration) = clock.duration() {
        if engine.media_duration() != Some(duration) {
            engine.on_duration_resolved(duration);
        }
    }

    if !engine.state().is_playing {
        return;
    }

    engine.tick(clock.position());
    if clock.has_ended() {
        engine.on_media_ended();
    }
}

fn publish(state_tx: &watch::Sender<PlaybackState>, state: &PlaybackState) {
    state_tx.send_if_modified(|published| {
        if published == state {
            return false;
        }
        published.clone_from(state);
        true
    });
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use super::*;
    use crate::lesson::Lesson;
    use crate::media::ManualClock;
    use crate::segments::TranscriptSegment;

    fn lesson() -> Lesson {
        Lesson::new(
            "/audio/Ghana independence.m4a",
            vec![
                TranscriptSegment::new(1, 0.0, 5.5, "Ŋmɛnɛ, mikase Ghana heyeli lɛ he nii."),
                TranscriptSegment::new(2, 5.5, 10.2, "Ghana ná heyeli yɛ March 6, 1957."),
            ],
        )
    }

    #[tokio::test(start_paused = true)]
    async fn sample_clock_resolves_duration_while_paused() -> anyhow::Result<()> {
        let clock = ManualClock::new(Some(52.0));
        let mut engine = PlaybackEngine::default();
        engine.load_lesson(lesson());

        let session = Session::spawn(engine, clock.clone());
        let mut rx = session.subscribe();
        rx.wait_for(|state| state.duration_seconds == 52.0).await?;

        assert!(!session.state().is_playing);
        assert_eq!(clock.source(), "/audio/Ghana independence.m4a");
        session.shutdown().await?;
        Ok(())
    }

    #[tokio::test(start_paused = true)]
    async fn send_after_the_task_exits_errors() -> anyhow::Result<()> {
        let session = Session::spawn(PlaybackEngine::default(), ManualClock::new(None));
        session.cancel.cancel();

        let mut rx = session.subscribe();
        let closed = tokio::time::timeout(Duration::from_secs(5), async {
            while rx.changed().await.is_ok() {}
        })
        .await;
        assert!(closed.is_ok());

        let err = session.send(Command::RequestPlay).unwrap_err();
        assert!(err.to_string().contains("has stopped"));
        Ok(())
    }
}
