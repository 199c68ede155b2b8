//! Replays command batches against a headless session and prints every
//! event the client would post, one JSON object per line.

mod surface;

use anyhow::{Context, Result, bail};
use clap::Parser;
use dataform_engine::{Engine, EngineConfig, EngineHost, Event};
use dataform_forms::{Language, Scheduler};
use std::path::{Path, PathBuf};
use std::rc::Rc;
use std::time::Duration;
use surface::TracingSurface;
use tracing::info;

#[derive(Parser)]
#[command(name = "dataform")]
#[command(about = "Replay server command batches against a headless form session")]
struct Args {
    /// Batch files; the first one opens the session
    #[arg(required = true)]
    batches: Vec<PathBuf>,

    /// Session configuration (JSON)
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Overrides the configured language
    #[arg(short, long, value_parser = parse_language)]
    language: Option<Language>,

    /// Virtual milliseconds to advance after each batch
    #[arg(long, default_value_t = 0)]
    advance_ms: u64,

    /// After the last batch, keep running timers in real time for this many
    /// milliseconds or until the session closes
    #[arg(long)]
    realtime: Option<u64>,
}

fn parse_language(value: &str) -> Result<Language, String> {
    match value.to_lowercase().as_str() {
        "en" | "english" => Ok(Language::English),
        "ru" | "russian" => Ok(Language::Russian),
        other => Err(format!("unknown language `{}`", other)),
    }
}

struct StdoutHost;

impl EngineHost for StdoutHost {
    fn post(&self, event: &Event) {
        println!("{}", event.to_value());
    }

    fn session_ended(&self, error: Option<&str>, success: Option<&str>) {
        info!(?error, ?success, "session ended");
    }

    fn form_drawn(&self, title: Option<&str>) {
        info!(?title, "form drawn");
    }
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive(tracing::Level::INFO.into()),
        )
        .with_writer(std::io::stderr)
        .init();

    let args = Args::parse();
    let mut config = match &args.config {
        Some(path) => EngineConfig::from_json(&read(path)?)
            .with_context(|| format!("invalid config {}", path.display()))?,
        None => EngineConfig::default(),
    };
    if let Some(language) = args.language {
        config.language = language;
    }

    let Some((first, rest)) = args.batches.split_first() else {
        bail!("no batch given");
    };
    let scheduler = Scheduler::new();
    let engine = Engine::builder(Rc::new(StdoutHost))
        .config(config)
        .scheduler(scheduler.clone())
        .surface(Rc::new(TracingSurface))
        .start(&read(first)?);
    info!(session = %engine.session_id(), "replaying {} batch(es)", args.batches.len());

    let step = Duration::from_millis(args.advance_ms);
    scheduler.advance(step);
    for path in rest {
        if engine.is_closed() {
            info!(batch = %path.display(), "session closed, skipping remaining batches");
            break;
        }
        engine.execute(&read(path)?);
        scheduler.advance(step);
    }

    if let Some(limit) = args.realtime {
        run_realtime(&engine, Duration::from_millis(limit))?;
    }
    engine.destroy();
    Ok(())
}

fn read(path: &Path) -> Result<String> {
    std::fs::read_to_string(path).with_context(|| format!("cannot read {}", path.display()))
}

/// Sleeps until each pending deadline and runs it, so timers tick at their
/// real pace.
fn run_realtime(engine: &Engine, limit: Duration) -> Result<()> {
    let runtime = tokio::runtime::Builder::new_current_thread()
        .enable_time()
        .build()
        .context("cannot start timer runtime")?;
    let scheduler = engine.scheduler();
    let offset = scheduler.now();
    let end = offset + limit;
    runtime.block_on(async {
        let origin = tokio::time::Instant::now();
        while !engine.is_closed() {
            let Some(deadline) = scheduler.next_deadline().filter(|d| *d <= end) else {
                break;
            };
            tokio::time::sleep_until(origin + deadline.saturating_sub(offset)).await;
            scheduler.advance_to(deadline);
        }
    });
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn language_names_are_case_insensitive() {
        assert_eq!(parse_language("English"), Ok(Language::English));
        assert_eq!(parse_language("ru"), Ok(Language::Russian));
        assert!(parse_language("fr").is_err());
    }
}
