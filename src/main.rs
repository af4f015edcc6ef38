//! # cyclic-route CLI
//!
//! Command-line interface for the cyclic-route library.
//! Loads a periodic graph once, then answers `source destination` queries
//! from stdin or a file.

use std::fs::File;
use std::io::{self, BufRead, BufReader, BufWriter, Write};
use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;
use cyclic_route::{load_graph, QueryOutcome, QueryReader, Solver, SolverConfig, Termination};
use log::{debug, error, info, warn};

mod cli;

use cli::{OutputFormat, Summary};

/// Command-line interface for cyclic-route
#[derive(Parser)]
#[command(name = "cyclic-route")]
#[command(about = "Shortest paths over graphs with cyclically time-varying edge weights")]
#[command(long_about = "Answers shortest-path queries on a directed graph whose edges carry N weights.
The k-th edge of a walk pays its weight for phase (k-1) mod N.

Graph file format (whitespace separated):
  V N
  src tgt w_0 ... w_{N-1}
  ...

Queries are 'source destination' pairs, read from stdin unless --queries is given:
  echo '0 2' | cyclic-route graph.txt
  cyclic-route graph.txt --queries pairs.txt --format json")]
#[command(version = env!("CYCLIC_ROUTE_VERSION"))]
struct Cli {
    /// Graph file
    graph: PathBuf,

    /// Read queries from this file instead of stdin
    #[arg(short, long)]
    queries: Option<PathBuf>,

    /// Output format
    #[arg(long, value_enum, default_value_t = OutputFormat::Text)]
    format: OutputFormat,

    /// Finalize every state before answering instead of stopping early
    #[arg(long)]
    drain: bool,

    /// Print a summary of outcomes to stderr when done
    #[arg(long)]
    stats: bool,

    /// Enable verbose logging
    #[arg(short, long)]
    verbose: bool,
}

fn main() {
    if let Err(e) = run() {
        error!("❌ Error: {e:#}");
        std::process::exit(1);
    }
}

fn run() -> Result<()> {
    let cli = Cli::parse();

    // Initialize logging to stderr
    let mut logger = env_logger::Builder::from_default_env();
    if cli.verbose {
        logger.filter_level(log::LevelFilter::Debug);
    }
    logger.target(env_logger::Target::Stderr).init();

    let graph = load_graph(&cli.graph)
        .with_context(|| format!("failed to load graph from {}", cli.graph.display()))?;

    let config = SolverConfig {
        termination: if cli.drain {
            Termination::Drain
        } else {
            Termination::Bounded
        },
    };
    let solver = Solver::with_config(&graph, config);

    let stdout = io::stdout();
    let mut out = BufWriter::new(stdout.lock());

    let summary = match &cli.queries {
        Some(path) => {
            let file = File::open(path)
                .with_context(|| format!("failed to open queries file {}", path.display()))?;
            answer_queries(&solver, QueryReader::new(BufReader::new(file)), &mut out, cli.format)?
        }
        None => answer_queries(&solver, QueryReader::new(io::stdin().lock()), &mut out, cli.format)?,
    };

    if cli.stats {
        eprintln!("📊 {summary}");
    }
    Ok(())
}

/// Answer every query in the stream, flushing after each one.
///
/// Per-query failures are part of the output; internal errors and malformed
/// input stop the run.
fn answer_queries<R: BufRead, W: Write>(
    solver: &Solver<'_>,
    queries: QueryReader<R>,
    out: &mut W,
    format: OutputFormat,
) -> Result<Summary> {
    let mut summary = Summary::default();
    debug!(
        "answering queries over {} vertices, period {}",
        solver.graph().vertex_count(),
        solver.graph().period()
    );

    for query in queries {
        let query = query.context("failed to read queries")?;
        let outcome = solver
            .answer(query)
            .with_context(|| format!("query {} -> {} failed", query.source, query.destination))?;

        match &outcome {
            QueryOutcome::Route(route) => {
                info!(
                    "{} -> {}: weight {} over {} hops",
                    route.source,
                    route.destination,
                    route.weight,
                    route.hops()
                );
            }
            QueryOutcome::NoPath {
                source,
                destination,
            } => info!("{source} -> {destination}: no path"),
            QueryOutcome::InvalidVertex {
                vertex,
                vertex_count,
            } => warn!("rejected query with vertex {vertex} (graph has {vertex_count} vertices)"),
        }

        summary.record(&outcome);
        let rendered = cli::render(&outcome, format).context("failed to render result")?;
        writeln!(out, "{rendered}")?;
        out.flush()?;
    }

    Ok(summary)
}
