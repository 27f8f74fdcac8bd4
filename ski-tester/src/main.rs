mod common;
mod logic;

use anyhow::{Context, Result, bail};
use clap::Parser;
use colored::Colorize;
use ski_game::SkiConfig;
use std::fs::File;
use std::io::{BufWriter, Write, stdout};
use std::path::PathBuf;
use std::time::Instant;

use common::{load_config, split_csv};
use logic::{
    GameplayStrategy, RunRecord, ScriptedPolicy, aggregate_runs, resolve_seed_inputs, run_policy,
};

#[derive(Debug, Parser)]
#[command(name = "ski-tester", version = "0.1.0")]
#[command(about = "Automated play-testing for the ski game: scripted and strategy-driven runs")]
struct Args {
    /// Seeds to run (comma-separated integers or start..end ranges)
    #[arg(long, default_value = "1337")]
    seeds: String,

    /// Strategies to run (comma-separated, or "all")
    #[arg(long, default_value = "cruiser")]
    strategies: String,

    /// List all available strategies and exit
    #[arg(long)]
    list_strategies: bool,

    /// Scripted input tokens (comma-separated); replaces strategies
    #[arg(long)]
    script: Option<String>,

    /// Stop a run after this many simulated turns
    #[arg(long, default_value_t = 500)]
    max_turns: u64,

    /// JSON tuning file
    #[arg(long)]
    config: Option<PathBuf>,

    /// Override the slope length
    #[arg(long)]
    slope_length: Option<usize>,

    /// Output report format
    #[arg(long, default_value = "console")]
    #[arg(value_parser = ["json", "markdown", "console"])]
    report: String,

    /// Verbose output
    #[arg(short, long)]
    verbose: bool,

    /// Optional path to write the report output instead of stdout
    #[arg(long)]
    output: Option<PathBuf>,
}

fn main() -> Result<()> {
    env_logger::init();
    let args = Args::parse();

    if maybe_list_strategies(&args)? {
        return Ok(());
    }

    if args.report == "console" || args.output.is_some() {
        announce_banner();
    }

    let start_time = Instant::now();
    let config = load_config(args.config.as_deref(), args.slope_length)?;
    let seeds = resolve_seed_inputs(&split_csv(&args.seeds))?;
    let records = run_all(&args, &config, &seeds)?;

    write_reports(&args, &records, start_time)
}

fn maybe_list_strategies(args: &Args) -> Result<bool> {
    if !args.list_strategies {
        return Ok(false);
    }
    let mut output_target = OutputTarget::new(args.output.clone())?;
    writeln!(output_target.writer(), "Available strategies:")?;
    for strategy in GameplayStrategy::ALL {
        writeln!(
            output_target.writer(),
            "  {:10} - {}",
            strategy.key(),
            strategy.description()
        )?;
    }
    output_target.flush_inner()?;
    Ok(true)
}

fn announce_banner() {
    println!("{}", "⛷️  Ski Automated Tester".bright_cyan().bold());
    println!("{}", "========================".cyan());
}

fn expand_strategies(strategies_arg: &str) -> Result<Vec<GameplayStrategy>> {
    let mut strategies = Vec::new();
    for token in split_csv(strategies_arg) {
        if token.eq_ignore_ascii_case("all") {
            for strategy in GameplayStrategy::ALL {
                if !strategies.contains(&strategy) {
                    strategies.push(strategy);
                }
            }
            continue;
        }
        let Some(strategy) = GameplayStrategy::parse(&token) else {
            bail!("Unknown strategy: {token}");
        };
        if !strategies.contains(&strategy) {
            strategies.push(strategy);
        }
    }
    if strategies.is_empty() {
        bail!("No strategies selected");
    }
    Ok(strategies)
}

fn run_all(args: &Args, config: &SkiConfig, seeds: &[u64]) -> Result<Vec<RunRecord>> {
    let mut records = Vec::new();

    if let Some(script) = args.script.as_deref() {
        let tokens = split_csv(script);
        for &seed in seeds {
            let mut policy = ScriptedPolicy::from_tokens(&tokens);
            if policy.is_empty() {
                bail!("Script contains no commands");
            }
            records.push(run_policy(
                &mut policy,
                config,
                seed,
                args.max_turns,
                args.verbose,
            )?);
        }
        return Ok(records);
    }

    for strategy in expand_strategies(&args.strategies)? {
        if args.verbose {
            println!("{} {}", "▶".bright_yellow(), strategy.label().bold());
        }
        for &seed in seeds {
            let mut policy = strategy.create_policy(seed);
            let record = run_policy(policy.as_mut(), config, seed, args.max_turns, args.verbose)
                .with_context(|| format!("{strategy} run failed"))?;
            records.push(record);
        }
    }
    Ok(records)
}

fn write_reports(args: &Args, records: &[RunRecord], start_time: Instant) -> Result<()> {
    let aggregates = aggregate_runs(records);
    let mut output_target = OutputTarget::new(args.output.clone())?;

    match args.report.as_str() {
        "json" => logic::reports::generate_json_report(&mut output_target, records, &aggregates)?,
        "markdown" => {
            logic::reports::generate_markdown_report(&mut output_target, records, &aggregates)?;
        }
        _ => {
            logic::reports::generate_console_report(
                &mut output_target,
                records,
                &aggregates,
                start_time.elapsed(),
            )?;
            writeln!(&mut output_target)?;
            writeln!(&mut output_target, "🏁 Total time: {:?}", start_time.elapsed())?;
        }
    }

    output_target.flush_inner()?;
    Ok(())
}

enum OutputTarget {
    Stdout(BufWriter<std::io::Stdout>),
    File(BufWriter<File>),
}

impl OutputTarget {
    fn new(path: Option<PathBuf>) -> Result<Self> {
        if let Some(path) = path {
            let file = File::create(&path)
                .with_context(|| format!("failed to create {}", path.display()))?;
            Ok(Self::File(BufWriter::new(file)))
        } else {
            Ok(Self::Stdout(BufWriter::new(stdout())))
        }
    }

    fn writer(&mut self) -> &mut dyn Write {
        match self {
            Self::Stdout(w) => w,
            Self::File(w) => w,
        }
    }

    fn flush_inner(&mut self) -> std::io::Result<()> {
        match self {
            Self::Stdout(w) => w.flush(),
            Self::File(w) => w.flush(),
        }
    }
}

impl Write for OutputTarget {
    fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
        self.writer().write(buf)
    }

    fn flush(&mut self) -> std::io::Result<()> {
        self.flush_inner()
    }
}
