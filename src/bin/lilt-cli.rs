use std::io::{self, BufWriter, Read};
use std::path::PathBuf;
use std::time::Duration;

use anyhow::{Context, Result, bail};
use clap::Parser;
use tracing::error;

use lilt::command::parse_script;
use lilt::json_lines_encoder::JsonLinesEncoder;
use lilt::lesson::{LessonId, load_lessons, select_lesson};
use lilt::media::SimulatedClock;
use lilt::opts::{DEFAULT_SKIP_SECONDS, DEFAULT_VOLUME};
use lilt::state_encoder::{StateEncoder, StateFrame};
use lilt::text_encoder::TextEncoder;
use lilt::{Command, Lesson, OutputType, PlaybackEngine, PlayerOpts, Session, Status};

#[derive(Parser, Debug)]
#[command(name = "lilt-cli")]
#[command(about = "Play an audio lesson against its transcript")]
struct Params {
    /// Lesson JSON file: a single lesson object or an array of lessons.
    #[arg(short = 'l', long = "lesson")]
    lesson_path: PathBuf,

    /// Which lesson to play when the file holds more than one.
    #[arg(long = "lesson-id")]
    lesson_id: Option<LessonId>,

    #[arg(
        short = 'o',
        long = "output-type",
        value_enum,
        default_value_t = OutputType::Text
    )]
    output_type: OutputType,

    /// Replay a command script (`-` for stdin) instead of playing in real time.
    #[arg(short = 's', long = "script")]
    script: Option<String>,

    /// Media duration reported by the simulated player, in seconds.
    /// Defaults to the lesson's fallback duration.
    #[arg(long = "media-duration")]
    media_duration: Option<f64>,

    /// Playback speed of the simulated player.
    #[arg(long = "rate", default_value_t = 1.0)]
    rate: f64,

    #[arg(long = "volume", default_value_t = DEFAULT_VOLUME)]
    volume: f64,

    /// Step used by the `back` / `forward` commands, in seconds.
    #[arg(long = "skip-seconds", default_value_t = DEFAULT_SKIP_SECONDS)]
    skip_seconds: f64,

    /// Media clock polling interval, in milliseconds.
    #[arg(long = "tick-ms", default_value_t = 100)]
    tick_ms: u64,
}

impl Params {
    fn player_opts(&self) -> PlayerOpts {
        PlayerOpts {
            tick_interval: Duration::from_millis(self.tick_ms.max(1)),
            default_volume: self.volume,
            skip_seconds: self.skip_seconds,
            ..PlayerOpts::default()
        }
    }
}

#[tokio::main]
async fn main() {
    lilt::init_logging();

    if let Err(err) = run().await {
        error!(error = ?err, "lilt-cli failed");
        eprintln!("error: {err:#}");
        std::process::exit(1);
    }
}

async fn run() -> Result<()> {
    let params = Params::parse();

    let lessons = load_lessons(&params.lesson_path)
        .with_context(|| format!("failed to read lessons from '{}'", params.lesson_path.display()))?;
    let lesson = select_lesson(lessons, params.lesson_id).context("failed to pick a lesson")?;

    let stdout = io::stdout();
    let writer = BufWriter::new(stdout.lock());
    let mut encoder: Box<dyn StateEncoder> = match params.output_type {
        OutputType::Json => Box::new(JsonLinesEncoder::new(writer)),
        OutputType::Text => Box::new(TextEncoder::new(writer)),
    };

    let run_res = match params.script.as_deref() {
        Some(script) => replay_script(&params, lesson, script, &mut *encoder),
        None => play_realtime(&params, lesson, &mut *encoder).await,
    };
    let close_res = encoder.close().map_err(anyhow::Error::from);

    match (run_res, close_res) {
        (Ok(()), Ok(())) => Ok(()),
        (Ok(()), Err(close_err)) => Err(close_err),
        (Err(err), Ok(())) => Err(err),
        (Err(err), Err(close_err)) => Err(err.context(close_err)),
    }
}

/// Apply each scripted command in order, emitting the state after every one.
fn replay_script(
    params: &Params,
    lesson: Lesson,
    script: &str,
    encoder: &mut dyn StateEncoder,
) -> Result<()> {
    let text = read_script(script)?;
    let commands = parse_script(&text).context("invalid command script")?;

    let mut engine = PlaybackEngine::new(params.player_opts());
    engine.load_lesson(lesson);
    encoder.write_state(&StateFrame::from_engine(&engine))?;

    for command in commands {
        engine.apply(command);
        encoder.write_state(&StateFrame::from_engine(&engine))?;
    }

    Ok(())
}

/// Play the lesson from the start on a simulated media clock until it ends.
async fn play_realtime(
    params: &Params,
    lesson: Lesson,
    encoder: &mut dyn StateEncoder,
) -> Result<()> {
    let mut engine = PlaybackEngine::new(params.player_opts());
    engine.load_lesson(lesson.clone());
    if engine.status() == Status::Idle {
        bail!("lesson {} has no audio source to play", lesson.id);
    }

    let duration = params
        .media_duration
        .unwrap_or(engine.state().duration_seconds);
    let clock = SimulatedClock::new(Some(duration), params.rate);

    let session = Session::spawn(engine, clock);
    let mut rx = session.subscribe();
    encoder.write_state(&StateFrame::from_state(&session.state(), Some(&lesson)))?;
    session.send(Command::RequestPlay)?;

    let mut started = false;
    while rx.changed().await.is_ok() {
        let state = rx.borrow_and_update().clone();
        encoder.write_state(&StateFrame::from_state(&state, Some(&lesson)))?;

        if state.is_playing {
            started = true;
        } else if started {
            break;
        }
    }

    session.shutdown().await?;
    Ok(())
}

fn read_script(script: &str) -> Result<String> {
    if script == "-" {
        let mut text = String::new();
        io::stdin()
            .read_to_string(&mut text)
            .context("failed to read command script from stdin")?;
        return Ok(text);
    }

    std::fs::read_to_string(script).with_context(|| format!("failed to read script '{script}'"))
}
