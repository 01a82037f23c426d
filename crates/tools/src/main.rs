use std::env;
use std::fs;
use std::io::{self, Write};
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::Parser;
use deck::{Card, Session, SessionConfig, Side, parse_script};
use serde::Serialize;
use tracing::info;
use tracing_subscriber::{EnvFilter, filter::LevelFilter};

#[derive(Parser)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Path to the command script to run
    #[arg(short, long)]
    script: PathBuf,
    /// TOML file with scoring rules
    #[arg(short, long)]
    config: Option<PathBuf>,
    /// Audit the deck after every command (also enabled by DECK_VERIFY=1)
    #[arg(long)]
    verify: bool,
    /// Write the final deck as JSON to this path
    #[arg(long)]
    dump_json: Option<PathBuf>,
}

#[derive(Serialize)]
struct DeckDump<'a> {
    count: usize,
    snapshot_hash: u64,
    survivor_score: u32,
    stranger_score: u32,
    cards: Vec<&'a Card>,
}

fn load_config(path: Option<&Path>) -> Result<SessionConfig> {
    let Some(path) = path else {
        return Ok(SessionConfig::default());
    };
    let text = fs::read_to_string(path)
        .with_context(|| format!("Failed to read config file: {}", path.display()))?;
    toml::from_str(&text)
        .with_context(|| format!("Failed to parse config file: {}", path.display()))
}

fn run(args: &Args, out: &mut impl Write) -> Result<Session> {
    let config = load_config(args.config.as_deref())?;
    let text = fs::read_to_string(&args.script)
        .with_context(|| format!("Failed to read script file: {}", args.script.display()))?;
    let commands = parse_script(&text).context("Failed to parse script")?;
    info!(commands = commands.len(), verify = args.verify, "running script");

    let mut session = Session::new(config);
    for (index, command) in commands.into_iter().enumerate() {
        let report = session.apply(command);
        writeln!(out, "{report}")?;
        if args.verify {
            session
                .deck()
                .validate()
                .with_context(|| format!("Deck audit failed after command {}", index + 1))?;
        }
    }

    if let Some(path) = &args.dump_json {
        let deck = session.deck();
        let dump = DeckDump {
            count: deck.count(),
            snapshot_hash: deck.snapshot_hash(),
            survivor_score: session.score(Side::Survivor),
            stranger_score: session.score(Side::Stranger),
            cards: deck.iter().collect(),
        };
        let json = serde_json::to_string_pretty(&dump).context("Failed to serialize deck")?;
        fs::write(path, json)
            .with_context(|| format!("Failed to write deck dump: {}", path.display()))?;
    }
    Ok(session)
}

/// `RUST_LOG`-style directives, falling back to `info` when none are given.
fn log_filter(directives: &str) -> EnvFilter {
    EnvFilter::builder().with_default_directive(LevelFilter::INFO.into()).parse_lossy(directives)
}

fn main() -> Result<()> {
    let directives = env::var(EnvFilter::DEFAULT_ENV).unwrap_or_default();
    tracing_subscriber::fmt()
        .with_env_filter(log_filter(&directives))
        .with_writer(io::stderr)
        .init();

    let mut args = Args::parse();
    if env::var("DECK_VERIFY").is_ok_and(|value| value == "1") {
        args.verify = true;
    }

    let stdout = io::stdout();
    let session = run(&args, &mut stdout.lock())?;
    info!(hash = session.deck().snapshot_hash(), "script finished");
    Ok(())
}

#[cfg(test)]
mod tests {
    use std::sync::{Arc, Mutex};

    use deck::Deck;
    use tracing::subscriber;

    use super::*;

    #[derive(Clone, Default)]
    struct Captured(Arc<Mutex<Vec<u8>>>);

    impl Write for Captured {
        fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
            self.0.lock().unwrap().extend_from_slice(buf);
            Ok(buf.len())
        }

        fn flush(&mut self) -> io::Result<()> {
            Ok(())
        }
    }

    /// Log lines emitted while inserting one card under `directives`.
    fn logs_for(directives: &str) -> String {
        let captured = Captured::default();
        let writer = captured.clone();
        let logger = tracing_subscriber::fmt()
            .with_env_filter(log_filter(directives))
            .with_writer(move || writer.clone())
            .with_ansi(false)
            .finish();
        subscriber::with_default(logger, || {
            let mut deck = Deck::new();
            deck.insert(Card::new("C1", 3, 3, 1));
        });
        let bytes = captured.0.lock().unwrap().clone();
        String::from_utf8(bytes).unwrap()
    }

    fn args(script: PathBuf) -> Args {
        Args { script, config: None, verify: true, dump_json: None }
    }

    #[test]
    fn script_prints_one_line_per_command() {
        let dir = tempfile::tempdir().unwrap();
        let script = dir.path().join("game.txt");
        fs::write(&script, "# opening\ndraw C1 5 10\ndraw C2 3 4\nbattle 4 6\ncount\nwinner\n")
            .unwrap();

        let mut out = Vec::new();
        run(&args(script), &mut out).unwrap();
        let text = String::from_utf8(out).unwrap();
        assert_eq!(
            text.lines().collect::<Vec<_>>(),
            [
                "Added C1 to the deck",
                "Added C2 to the deck",
                "Found with priority 2, Survivor plays C1, the played card returned to deck, 0 cards revived",
                "Number of cards in the deck: 2",
                "The Survivor, Score: 1",
            ]
        );
    }

    #[test]
    fn config_file_overrides_scoring() {
        let dir = tempfile::tempdir().unwrap();
        let script = dir.path().join("game.txt");
        let config = dir.path().join("rules.toml");
        fs::write(&script, "battle 1 1\nwinner\n").unwrap();
        fs::write(&config, "[scoring]\nforfeit = 9\n").unwrap();

        let mut out = Vec::new();
        let session = run(&Args { config: Some(config), ..args(script) }, &mut out).unwrap();
        assert_eq!(session.score(Side::Stranger), 9);
        assert!(String::from_utf8(out).unwrap().ends_with("The Stranger, Score: 9\n"));
    }

    #[test]
    fn dump_lists_cards_in_deck_order() {
        let dir = tempfile::tempdir().unwrap();
        let script = dir.path().join("game.txt");
        let dump = dir.path().join("deck.json");
        fs::write(&script, "draw B 7 2\ndraw A 3 9\n").unwrap();

        run(&Args { dump_json: Some(dump.clone()), ..args(script) }, &mut Vec::new()).unwrap();
        let json: serde_json::Value =
            serde_json::from_str(&fs::read_to_string(dump).unwrap()).unwrap();
        assert_eq!(json["count"], 2);
        assert_eq!(json["cards"][0]["name"], "A");
        assert_eq!(json["cards"][1]["name"], "B");
    }

    #[test]
    fn malformed_script_is_rejected_with_its_line() {
        let dir = tempfile::tempdir().unwrap();
        let script = dir.path().join("bad.txt");
        fs::write(&script, "draw C1 5 10\nbattle five 6\n").unwrap();

        let error = run(&args(script), &mut Vec::new()).unwrap_err();
        assert!(format!("{error:#}").contains("line 2"));
    }

    #[test]
    fn log_filter_defaults_to_info() {
        assert_eq!(log_filter("").max_level_hint(), Some(LevelFilter::INFO));
        assert!(logs_for("").is_empty());
    }

    #[test]
    fn rust_log_debug_lets_library_events_through() {
        assert_eq!(log_filter("debug").max_level_hint(), Some(LevelFilter::DEBUG));
        assert!(logs_for("debug").contains("band created"));
        assert!(logs_for("deck=debug").contains("band created"));
        assert!(!logs_for("deck=warn").contains("band created"));
    }
}
