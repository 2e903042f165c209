use lilt::command::parse_script;
use lilt::lesson::{load_lessons, select_lesson};
use lilt::{PlaybackEngine, Status};

#[test]
fn demo_catalog_loads() -> anyhow::Result<()> {
    let lessons = load_lessons("demos/lessons.json")?;
    assert_eq!(lessons.len(), 5);
    assert!(lessons.iter().all(|lesson| lesson.transcript_issues().is_empty()));
    assert!(lessons.iter().all(|lesson| lesson.has_audio()));
    Ok(())
}

#[test]
fn demo_script_replays_against_the_first_lesson() -> anyhow::Result<()> {
    let lesson = select_lesson(load_lessons("demos/lessons.json")?, Some(1))?;
    let script = std::fs::read_to_string("demos/replay.txt")?;
    let commands = parse_script(&script)?;

    let mut engine = PlaybackEngine::default();
    engine.load_lesson(lesson);
    assert_eq!(engine.state().duration_seconds, 52.0);

    let mut states = Vec::new();
    for command in commands {
        engine.apply(command);
        states.push((engine.status(), engine.state().clone()));
    }

    // duration 225
    assert_eq!(states[0].1.duration_seconds, 225.0);
    // jump 3 starts playback at the segment start
    assert_eq!(states[1].0, Status::Playing);
    assert_eq!(states[1].1.position_seconds, 10.2);
    // tick 14.9 / tick 16.2
    assert_eq!(states[3].1.active_segment_id, Some(3));
    assert_eq!(states[4].1.active_segment_id, Some(4));
    // skip -5, back
    assert_eq!(states[5].1.position_seconds, 16.2 - 5.0);
    assert!((states[6].1.position_seconds - 6.2).abs() < 1e-9);
    assert_eq!(states[6].1.active_segment_id, Some(2));
    // volume 0 mutes, mute restores the default volume
    assert!(states[7].1.is_muted);
    assert!(!states[8].1.is_muted);
    assert_eq!(states[8].1.volume, 0.7);
    // toggle pauses, seek clamps to the media duration
    assert_eq!(states[9].0, Status::Paused);
    assert_eq!(states[10].1.position_seconds, 225.0);
    // ended while paused changes nothing
    assert_eq!(states[11].0, Status::Paused);
    Ok(())
}
