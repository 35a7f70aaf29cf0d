//! botcheck CLI
//!
//! Usage:
//!   botcheck --webdriver --user-agent "..."    # Single evaluation from flags
//!   botcheck --snapshot snapshot.json          # Single evaluation from file
//!   botcheck --stdin                           # One JSON snapshot per line
//!   botcheck --list                            # Registered detectors
//!   botcheck --serve                           # HTTP API server
//!   botcheck --snapshot s.json --json          # JSON output
//!
//! Single evaluation exits with status 2 when a bot is detected.

use clap::Parser;
use colored::Colorize;
use std::io::{self, BufRead};
use std::path::{Path, PathBuf};

use botcheck::config::Config;
use botcheck::core::{aggregator, append_audit_record, run_server, EvaluationEngine, FailurePolicy};
use botcheck::types::{EvaluationReport, Snapshot};
use botcheck::VERSION;

#[derive(Parser, Debug)]
#[command(
    name = "botcheck",
    version = VERSION,
    about = "Rule-based bot detection over a client environment snapshot",
    long_about = "botcheck runs a fixed set of named detectors against a snapshot of\n\
                  client attributes and reports a verdict plus every signal that fired.\n\n\
                  Detectors:\n  \
                  webDriver         - automation flag set\n  \
                  headlessBrowser   - user agent mentions headless\n  \
                  noLanguages       - no declared languages\n  \
                  inconsistentEval  - eval source length disagrees with browser\n  \
                  domManipulation   - selenium/webdriver/driver attribute on <html>"
)]
struct Args {
    /// Snapshot JSON file to evaluate
    #[arg(long, conflicts_with = "stdin")]
    snapshot: Option<PathBuf>,

    /// Read snapshots from stdin, one JSON object per line
    #[arg(long)]
    stdin: bool,

    /// Run as HTTP API server
    #[arg(short, long)]
    serve: bool,

    /// List registered detectors and exit
    #[arg(long)]
    list: bool,

    /// Automation flag (navigator.webdriver) is set
    #[arg(long)]
    webdriver: bool,

    /// User-agent string
    #[arg(long, default_value = "")]
    user_agent: String,

    /// Declared language (repeatable)
    #[arg(long = "language")]
    languages: Vec<String>,

    /// Length of the eval function source
    #[arg(long)]
    eval_length: Option<usize>,

    /// Attribute name on the root element (repeatable)
    #[arg(long = "root-attr")]
    root_attributes: Vec<String>,

    /// Server address (overrides config)
    #[arg(long)]
    addr: Option<String>,

    /// Configuration file (YAML)
    #[arg(long)]
    config: Option<PathBuf>,

    /// Record faulting detectors as fired
    #[arg(long)]
    fail_safe: bool,

    /// Append every report to this JSON-lines file
    #[arg(long)]
    audit_log: Option<PathBuf>,

    /// Output as JSON
    #[arg(long)]
    json: bool,

    /// Disable colors in output
    #[arg(long)]
    no_color: bool,

    /// Show per-detector breakdown
    #[arg(short, long)]
    verbose: bool,
}

#[tokio::main]
async fn main() {
    let args = Args::parse();

    let mut config = match Config::load_from(args.config.as_ref()) {
        Ok(config) => config,
        Err(e) => fail(&format!("configuration error: {}", e)),
    };
    apply_overrides(&mut config, &args);

    if let Err(e) = botcheck::logging::init(&config.logging) {
        fail(&format!("logging error: {}", e));
    }
    config.log_summary(args.config.as_deref());
    if args.no_color {
        colored::control::set_override(false);
    }

    let engine = config.build_engine();

    if args.list {
        run_list(&engine);
    } else if args.serve {
        run_serve(engine, &config).await;
    } else if args.stdin {
        run_stdin(&engine, &config, &args);
    } else if let Some(ref path) = args.snapshot {
        match read_snapshot_file(path) {
            Ok(snapshot) => run_single(&engine, &snapshot, &config, &args),
            Err(e) => fail(&e),
        }
    } else {
        run_single(&engine, &snapshot_from_flags(&args), &config, &args);
    }
}

/// CLI flags win over file and environment
fn apply_overrides(config: &mut Config, args: &Args) {
    if args.fail_safe {
        config.failure_policy = FailurePolicy::FailSafe;
    }
    if let Some(ref addr) = args.addr {
        config.server.addr = addr.clone();
    }
    if let Some(ref path) = args.audit_log {
        config.audit_log = Some(path.clone());
    }
}

/// Build a snapshot from the inline flags
fn snapshot_from_flags(args: &Args) -> Snapshot {
    Snapshot {
        automation_flag: args.webdriver,
        user_agent: args.user_agent.clone(),
        languages: args.languages.clone(),
        eval_source_length: args.eval_length,
        root_attribute_names: args.root_attributes.clone(),
    }
}

fn read_snapshot_file(path: &Path) -> Result<Snapshot, String> {
    let json = std::fs::read_to_string(path)
        .map_err(|e| format!("cannot read {}: {}", path.display(), e))?;
    serde_json::from_str(&json).map_err(|e| format!("invalid snapshot in {}: {}", path.display(), e))
}

/// Run single evaluation
fn run_single(engine: &EvaluationEngine, snapshot: &Snapshot, config: &Config, args: &Args) {
    let report = evaluate(engine, snapshot, config);
    print_report(&report, args, true);
    if report.verdict.is_bot() {
        std::process::exit(2);
    }
}

/// One snapshot per stdin line; bad lines are reported and skipped
fn run_stdin(engine: &EvaluationEngine, config: &Config, args: &Args) {
    let stdin = io::stdin();
    match process_lines(stdin.lock(), engine, config, args) {
        Ok(summary) => {
            if !args.json {
                eprintln!("Evaluated: {} | bots: {}", summary.evaluated, summary.bots);
            }
        }
        Err(e) => {
            tracing::error!(error = %e, "Failed to read snapshots from stdin");
            fail(&format!("stdin read error: {}", e));
        }
    }
}

/// Counts for one stdin run
#[derive(Debug, Default, PartialEq, Eq)]
struct StreamSummary {
    evaluated: u64,
    bots: u64,
    skipped: u64,
}

/// Evaluate every JSON line; a read error ends the stream with `Err`
fn process_lines<R: BufRead>(
    reader: R,
    engine: &EvaluationEngine,
    config: &Config,
    args: &Args,
) -> io::Result<StreamSummary> {
    let mut summary = StreamSummary::default();

    for (index, line) in reader.lines().enumerate() {
        let line = line?;
        let line = line.trim();
        if line.is_empty() {
            continue;
        }

        let snapshot: Snapshot = match serde_json::from_str(line) {
            Ok(snapshot) => snapshot,
            Err(e) => {
                tracing::warn!(line = index + 1, error = %e, "Skipping invalid snapshot");
                eprintln!("line {}: invalid snapshot: {}", index + 1, e);
                summary.skipped += 1;
                continue;
            }
        };

        let report = evaluate(engine, &snapshot, config);
        summary.evaluated += 1;
        if report.verdict.is_bot() {
            summary.bots += 1;
        }
        print_report(&report, args, false);
    }

    Ok(summary)
}

/// List detectors in registry order
fn run_list(engine: &EvaluationEngine) {
    for (index, name) in engine.registry().names().enumerate() {
        println!("{:>2}. {}", index + 1, name);
    }
    println!("failure policy: {:?}", engine.policy());
}

/// Run HTTP API server
async fn run_serve(engine: EvaluationEngine, config: &Config) {
    if let Err(e) = run_server(&config.server.addr, engine, config.audit_log.clone()).await {
        fail(&format!("server error: {}", e));
    }
}

fn evaluate(engine: &EvaluationEngine, snapshot: &Snapshot, config: &Config) -> EvaluationReport {
    let report = aggregator::report(engine.evaluate_with_diagnostics(snapshot), snapshot);
    if let Some(ref path) = config.audit_log {
        if let Err(e) = append_audit_record(&report, path) {
            tracing::error!(error = %e, "Failed to append audit record");
        }
    }
    report
}

fn print_report(report: &EvaluationReport, args: &Args, pretty_json: bool) {
    if args.json {
        let json = if pretty_json {
            serde_json::to_string_pretty(report)
        } else {
            serde_json::to_string(report)
        };
        match json {
            Ok(json) => println!("{}", json),
            Err(e) => eprintln!("cannot serialize report: {}", e),
        }
        return;
    }

    if args.no_color {
        println!("{}", report.to_parseable_string());
    } else {
        println!("{}", report.to_terminal_string());
    }
    if args.verbose {
        for line in report.breakdown_lines(args.no_color) {
            println!("{}", line);
        }
    }
}

fn fail(message: &str) -> ! {
    eprintln!("{} {}", "error:".red().bold(), message);
    std::process::exit(1);
}

#[cfg(test)]
mod tests {
    use super::*;
    use botcheck::core::DetectorRegistry;
    use std::io::{BufReader, Cursor, Read};

    /// Yields some bytes, then fails like a broken pipe
    struct BrokenReader {
        data: Cursor<Vec<u8>>,
    }

    impl Read for BrokenReader {
        fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
            match self.data.read(buf)? {
                0 => Err(io::Error::new(io::ErrorKind::BrokenPipe, "stdin closed")),
                n => Ok(n),
            }
        }
    }

    fn setup() -> (EvaluationEngine, Config, Args) {
        let engine = EvaluationEngine::new(DetectorRegistry::with_builtin_detectors());
        let args = Args::parse_from(["botcheck", "--stdin", "--json"]);
        (engine, Config::default(), args)
    }

    #[test]
    fn test_process_lines_counts() {
        let (engine, config, args) = setup();
        let input = "{\"automationFlag\": true}\n\nnot json\n{\"languages\": [\"en\"], \"evalSourceLength\": 33}\n";

        let summary = process_lines(Cursor::new(input), &engine, &config, &args).unwrap();
        assert_eq!(summary, StreamSummary { evaluated: 2, bots: 1, skipped: 1 });
    }

    #[test]
    fn test_process_lines_read_error_is_surfaced() {
        let (engine, config, args) = setup();
        let reader = BufReader::new(BrokenReader {
            data: Cursor::new(b"{\"automationFlag\": true}\n".to_vec()),
        });

        let err = process_lines(reader, &engine, &config, &args).unwrap_err();
        assert_eq!(err.kind(), io::ErrorKind::BrokenPipe);
    }
}
