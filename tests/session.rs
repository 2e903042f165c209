#![cfg(feature = "session")]

use std::time::Duration;

use lilt::media::ManualClock;
use lilt::{Command, Lesson, PlaybackEngine, PlaybackState, PlayerOpts, Session, TranscriptSegment};
use tokio::sync::watch;

fn cocoa() -> Lesson {
    Lesson::new(
        "/audio/Cocoa.m4a",
        vec![
            TranscriptSegment::new(1, 0.0, 5.5, "Ani osuɔɔ tsokolate?"),
            TranscriptSegment::new(2, 5.5, 10.2, "Mɛni hewɔ loo mɛni hewɔ?"),
            TranscriptSegment::new(3, 10.2, 15.8, "Sanebimɔi ni kɔɔ shishinumɔ he:"),
        ],
    )
}

fn spawn(clock: &ManualClock) -> Session {
    let mut engine = PlaybackEngine::default();
    engine.load_lesson(cocoa());
    Session::spawn(engine, clock.clone())
}

async fn wait_for(
    rx: &mut watch::Receiver<PlaybackState>,
    f: impl FnMut(&PlaybackState) -> bool,
) -> anyhow::Result<PlaybackState> {
    let state = tokio::time::timeout(Duration::from_secs(5), rx.wait_for(f)).await??;
    Ok(state.clone())
}

#[tokio::test(start_paused = true)]
async fn ticks_follow_the_media_clock() -> anyhow::Result<()> {
    let clock = ManualClock::new(None);
    let session = spawn(&clock);
    let mut rx = session.subscribe();

    session.send(Command::TogglePlayPause)?;
    wait_for(&mut rx, |s| s.is_playing).await?;
    assert!(clock.is_playing());

    clock.advance(6.0);
    let state = wait_for(&mut rx, |s| s.position_seconds == 6.0).await?;
    assert_eq!(state.active_segment_id, Some(2));

    clock.advance(5.0);
    let state = wait_for(&mut rx, |s| s.position_seconds == 11.0).await?;
    assert_eq!(state.active_segment_id, Some(3));

    session.shutdown().await?;
    Ok(())
}

#[tokio::test(start_paused = true)]
async fn ticks_run_at_the_configured_cadence() -> anyhow::Result<()> {
    let clock = ManualClock::new(None);
    let mut engine = PlaybackEngine::new(PlayerOpts {
        tick_interval: Duration::from_millis(250),
        ..PlayerOpts::default()
    });
    engine.load_lesson(cocoa());
    let session = Session::spawn(engine, clock.clone());
    let mut rx = session.subscribe();

    session.send(Command::RequestPlay)?;
    wait_for(&mut rx, |s| s.is_playing).await?;

    let started = tokio::time::Instant::now();
    clock.advance(1.0);
    wait_for(&mut rx, |s| s.position_seconds == 1.0).await?;
    assert!(started.elapsed() <= Duration::from_millis(250));

    session.shutdown().await?;
    Ok(())
}

#[tokio::test(start_paused = true)]
async fn seek_lands_before_the_next_tick() -> anyhow::Result<()> {
    let clock = ManualClock::new(None);
    let session = spawn(&clock);
    let mut rx = session.subscribe();

    session.send(Command::RequestPlay)?;
    wait_for(&mut rx, |s| s.is_playing).await?;
    clock.advance(2.0);
    wait_for(&mut rx, |s| s.position_seconds == 2.0).await?;

    session.send(Command::Seek(12.0))?;
    let state = wait_for(&mut rx, |s| s.position_seconds == 12.0).await?;
    assert_eq!(state.active_segment_id, Some(3));

    // Several ticks later the position must not have snapped back to 2.0.
    tokio::time::sleep(Duration::from_millis(350)).await;
    assert_eq!(session.state().position_seconds, 12.0);

    session.shutdown().await?;
    Ok(())
}

#[tokio::test(start_paused = true)]
async fn jump_while_paused_starts_the_media() -> anyhow::Result<()> {
    let clock = ManualClock::new(None);
    let session = spawn(&clock);
    let mut rx = session.subscribe();

    session.send(Command::JumpToSegment(2))?;
    let state = wait_for(&mut rx, |s| s.is_playing).await?;
    assert_eq!(state.position_seconds, 5.5);
    assert!(clock.is_playing());

    clock.advance(1.0);
    let state = wait_for(&mut rx, |s| s.position_seconds == 6.5).await?;
    assert_eq!(state.active_segment_id, Some(2));

    session.shutdown().await?;
    Ok(())
}

#[tokio::test(start_paused = true)]
async fn media_end_pauses_playback() -> anyhow::Result<()> {
    let clock = ManualClock::new(Some(15.8));
    let session = spawn(&clock);
    let mut rx = session.subscribe();

    session.send(Command::RequestPlay)?;
    wait_for(&mut rx, |s| s.is_playing).await?;

    clock.advance(60.0);
    let state = wait_for(&mut rx, |s| !s.is_playing).await?;
    assert_eq!(state.position_seconds, 15.8);
    assert_eq!(state.active_segment_id, Some(3));

    session.shutdown().await?;
    Ok(())
}

#[tokio::test(start_paused = true)]
async fn volume_changes_reach_the_media() -> anyhow::Result<()> {
    let clock = ManualClock::new(None);
    let session = spawn(&clock);
    let mut rx = session.subscribe();

    session.send(Command::SetVolume(0.4))?;
    wait_for(&mut rx, |s| s.volume == 0.4).await?;
    assert_eq!(clock.volume(), 0.4);

    session.send(Command::ToggleMute)?;
    wait_for(&mut rx, |s| s.is_muted).await?;
    assert_eq!(clock.volume(), 0.0);

    session.send(Command::ToggleMute)?;
    wait_for(&mut rx, |s| !s.is_muted).await?;
    assert_eq!(clock.volume(), 0.4);

    session.shutdown().await?;
    Ok(())
}

#[tokio::test(start_paused = true)]
async fn loading_another_lesson_resets_the_media() -> anyhow::Result<()> {
    let clock = ManualClock::new(Some(52.0));
    let session = spawn(&clock);
    let mut rx = session.subscribe();
    wait_for(&mut rx, |s| s.duration_seconds == 52.0).await?;

    session.send(Command::JumpToSegment(3))?;
    wait_for(&mut rx, |s| s.is_playing).await?;

    let accra = Lesson::new("/audio/Accra.m4a", Vec::new()).with_declared_duration("4:20");
    session.send(Command::Load(Box::new(accra)))?;
    let state = wait_for(&mut rx, |s| s.duration_seconds == 260.0).await?;
    assert!(!state.is_playing);
    assert_eq!(state.position_seconds, 0.0);
    assert_eq!(clock.source(), "/audio/Accra.m4a");
    assert!(!clock.is_playing());

    // The previous source's 52s must not leak into the new lesson.
    tokio::time::sleep(Duration::from_millis(500)).await;
    assert_eq!(session.state().duration_seconds, 260.0);
    session.send(Command::Seek(200.0))?;
    let state = wait_for(&mut rx, |s| s.position_seconds == 200.0).await?;
    assert_eq!(state.duration_seconds, 260.0);

    session.send(Command::Unload)?;
    wait_for(&mut rx, |s| s.duration_seconds == 0.0).await?;

    session.shutdown().await?;
    Ok(())
}

#[tokio::test(start_paused = true)]
async fn shutdown_stops_the_timer_and_returns_the_engine() -> anyhow::Result<()> {
    let clock = ManualClock::new(None);
    let session = spawn(&clock);
    let mut rx = session.subscribe();

    session.send(Command::RequestPlay)?;
    session.send(Command::SetVolume(0.25))?;
    wait_for(&mut rx, |s| s.volume == 0.25).await?;

    let engine = session.shutdown().await?;
    assert_eq!(engine.state().volume, 0.25);
    assert!(!clock.is_playing());

    // The task is gone, so nothing publishes states anymore.
    assert!(rx.has_changed().is_err());
    Ok(())
}

#[tokio::test(start_paused = true)]
async fn dropping_the_session_stops_the_timer() -> anyhow::Result<()> {
    let clock = ManualClock::new(None);
    let session = spawn(&clock);
    let mut rx = session.subscribe();

    session.send(Command::RequestPlay)?;
    wait_for(&mut rx, |s| s.is_playing).await?;
    drop(session);

    let closed = tokio::time::timeout(Duration::from_secs(5), async {
        while rx.changed().await.is_ok() {}
    })
    .await;
    assert!(closed.is_ok(), "session task kept running after drop");
    assert!(!clock.is_playing());
    Ok(())
}
