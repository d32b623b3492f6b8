use std::{
    fs::File,
    io::{BufReader, Write as _},
    path::{Path, PathBuf},
};

use anyhow::Context as _;
use clap::{Args, Parser, Subcommand};
use serde::de::DeserializeOwned;

use lumina_compose::{
    ClarificationAnswer, ComposeOpts, DesignIntent, DesignSession, OrchestratorState,
    RooflineConfig,
};

#[derive(Parser, Debug)]
#[command(name = "lumina", version)]
struct Cli {
    #[command(subcommand)]
    cmd: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Validate and compose a design, printing the resulting session state as JSON.
    Compose(ComposeArgs),
    /// Apply clarification answers to a design and print the next session state.
    Answer(AnswerArgs),
}

#[derive(Args, Debug)]
struct CommonArgs {
    /// Roofline map JSON.
    #[arg(long)]
    roofline: PathBuf,

    /// Design intent JSON.
    #[arg(long)]
    intent: PathBuf,

    /// Compose options JSON.
    #[arg(long)]
    opts: Option<PathBuf>,

    /// Where to write the WLED payload when the design is ready.
    #[arg(long)]
    out: Option<PathBuf>,

    /// Render layers in parallel.
    #[arg(long)]
    parallel: bool,

    /// Log debug output to stderr.
    #[arg(long)]
    verbose: bool,
}

#[derive(Parser, Debug)]
struct ComposeArgs {
    #[command(flatten)]
    common: CommonArgs,
}

#[derive(Parser, Debug)]
struct AnswerArgs {
    #[command(flatten)]
    common: CommonArgs,

    /// JSON array of `{questionId, value}` answers.
    #[arg(long)]
    answers: PathBuf,
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    match cli.cmd {
        Command::Compose(args) => cmd_compose(args),
        Command::Answer(args) => cmd_answer(args),
    }
}

fn init_logging(verbose: bool) {
    let level = if verbose {
        tracing::Level::DEBUG
    } else {
        tracing::Level::WARN
    };
    tracing_subscriber::fmt()
        .with_max_level(level)
        .with_writer(std::io::stderr)
        .init();
}

struct Inputs {
    map: RooflineConfig,
    intent: DesignIntent,
    opts: ComposeOpts,
}

fn load_inputs(args: &CommonArgs) -> anyhow::Result<Inputs> {
    let map: RooflineConfig = read_json(&args.roofline, "roofline")?;
    let intent: DesignIntent = read_json(&args.intent, "intent")?;
    let mut opts: ComposeOpts = match &args.opts {
        Some(path) => read_json(path, "compose options")?,
        None => ComposeOpts::default(),
    };
    if args.parallel {
        opts.parallel = true;
    }
    Ok(Inputs { map, intent, opts })
}

fn cmd_compose(args: ComposeArgs) -> anyhow::Result<()> {
    init_logging(args.common.verbose);
    let inputs = load_inputs(&args.common)?;

    let session = DesignSession::new(inputs.intent).process(&inputs.map, &inputs.opts);
    finish(&session, args.common.out.as_deref())
}

fn cmd_answer(args: AnswerArgs) -> anyhow::Result<()> {
    init_logging(args.common.verbose);
    let inputs = load_inputs(&args.common)?;
    let answers: Vec<ClarificationAnswer> = read_json(&args.answers, "answers")?;

    let session = DesignSession::new(inputs.intent).process(&inputs.map, &inputs.opts);
    let session = if matches!(session.state, OrchestratorState::NeedsClarification { .. }) {
        let pending = session.clone();
        match session.answer(&answers, &inputs.map, &inputs.opts) {
            Ok(next) => next,
            Err(err) => {
                tracing::warn!(error = %err, "answers rejected");
                DesignSession {
                    state: OrchestratorState::Error {
                        message: err.to_string(),
                        suggestions: vec!["Answer the open questions listed by `compose`".into()],
                        recommend_manual: false,
                    },
                    ..pending
                }
            }
        }
    } else {
        tracing::warn!(state = session.state.name(), "no open questions; answers ignored");
        session
    };
    finish(&session, args.common.out.as_deref())
}

fn finish(session: &DesignSession, out: Option<&Path>) -> anyhow::Result<()> {
    if let OrchestratorState::Ready { pattern } = &session.state {
        if let Some(out) = out {
            if let Some(parent) = out.parent()
                && !parent.as_os_str().is_empty()
            {
                std::fs::create_dir_all(parent)
                    .with_context(|| format!("create output dir '{}'", parent.display()))?;
            }
            let f = File::create(out).with_context(|| format!("create '{}'", out.display()))?;
            serde_json::to_writer_pretty(f, &pattern.wled_payload)
                .with_context(|| format!("write payload '{}'", out.display()))?;
            eprintln!("wrote {}", out.display());
        }
        eprintln!("fingerprint {}", pattern.fingerprint());
    }

    let stdout = std::io::stdout();
    let mut lock = stdout.lock();
    serde_json::to_writer_pretty(&mut lock, session).context("write session JSON")?;
    writeln!(lock).context("write session JSON")?;
    Ok(())
}

fn read_json<T: DeserializeOwned>(path: &Path, what: &str) -> anyhow::Result<T> {
    let f = File::open(path).with_context(|| format!("open {what} '{}'", path.display()))?;
    serde_json::from_reader(BufReader::new(f))
        .with_context(|| format!("parse {what} JSON '{}'", path.display()))
}
