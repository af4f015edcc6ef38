//! CLI-specific output handling for cyclic-route
//!
//! Renders query outcomes as text or JSON lines and keeps a per-run tally.

use std::fmt;

use clap::ValueEnum;
use cyclic_route::QueryOutcome;

/// Output format for query results
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    /// Distance line followed by the vertex sequence
    Text,
    /// One JSON object per query
    Json,
}

/// Render one outcome in the requested format (no trailing newline)
pub fn render(outcome: &QueryOutcome, format: OutputFormat) -> serde_json::Result<String> {
    match format {
        OutputFormat::Text => Ok(render_text(outcome)),
        OutputFormat::Json => serde_json::to_string(outcome),
    }
}

fn render_text(outcome: &QueryOutcome) -> String {
    match outcome {
        QueryOutcome::Route(route) => {
            let path: Vec<String> = route.path.iter().map(|v| v.to_string()).collect();
            format!("Shortest path distance: {}\n{}", route.weight, path.join(" "))
        }
        QueryOutcome::NoPath {
            source,
            destination,
        } => format!("No path found from {source} to {destination}"),
        QueryOutcome::InvalidVertex {
            vertex,
            vertex_count,
        } => format!("Invalid vertex {vertex} (graph has {vertex_count} vertices)"),
    }
}

/// Outcome counts for `--stats`
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct Summary {
    pub routes: usize,
    pub no_path: usize,
    pub invalid: usize,
}

impl Summary {
    pub fn record(&mut self, outcome: &QueryOutcome) {
        match outcome {
            QueryOutcome::Route(_) => self.routes += 1,
            QueryOutcome::NoPath { .. } => self.no_path += 1,
            QueryOutcome::InvalidVertex { .. } => self.invalid += 1,
        }
    }

    pub fn total(&self) -> usize {
        self.routes + self.no_path + self.invalid
    }
}

impl fmt::Display for Summary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} queries: {} routed, {} without path, {} invalid",
            self.total(),
            self.routes,
            self.no_path,
            self.invalid
        )
    }
}
