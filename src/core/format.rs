//! Text graph format
//!
//! Whitespace-separated integers; line breaks carry no meaning beyond error
//! reporting:
//!
//! ```text
//! V N
//! src tgt w_0 ... w_{N-1}
//! ...
//! ```

use std::collections::VecDeque;
use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;
use std::str::FromStr;

use log::info;

use crate::core::error::{Error, Result};
use crate::core::graph::{GraphBuilder, PeriodicGraph};

/// Streaming whitespace tokenizer that remembers line numbers
pub(crate) struct Tokens<R> {
    reader: R,
    line: usize,
    pending: VecDeque<String>,
}

impl<R: BufRead> Tokens<R> {
    pub(crate) fn new(reader: R) -> Self {
        Self {
            reader,
            line: 0,
            pending: VecDeque::new(),
        }
    }

    /// Line of the most recently read input
    pub(crate) fn line(&self) -> usize {
        self.line
    }

    /// Next token with its line number, `None` at end of input
    pub(crate) fn next_token(&mut self) -> Result<Option<(usize, String)>> {
        loop {
            if let Some(token) = self.pending.pop_front() {
                return Ok(Some((self.line, token)));
            }
            let mut buf = String::new();
            if self.reader.read_line(&mut buf)? == 0 {
                return Ok(None);
            }
            self.line += 1;
            self.pending
                .extend(buf.split_whitespace().map(str::to_owned));
        }
    }

    /// Next token parsed as `T`; end of input is an error
    pub(crate) fn expect<T: FromStr>(&mut self, what: &str) -> Result<T> {
        match self.next_token()? {
            Some((line, token)) => parse_token(line, &token, what),
            None => Err(Error::Parse {
                line: self.line,
                message: format!("unexpected end of input, expected {what}"),
            }),
        }
    }
}

pub(crate) fn parse_token<T: FromStr>(line: usize, token: &str, what: &str) -> Result<T> {
    token.parse().map_err(|_| Error::Parse {
        line,
        message: format!("expected {what}, found '{token}'"),
    })
}

/// Parse a graph from any buffered reader
pub fn parse_graph<R: BufRead>(reader: R) -> Result<PeriodicGraph> {
    let mut tokens = Tokens::new(reader);
    let vertex_count: u32 = tokens.expect("vertex count")?;
    let period: u32 = tokens.expect("period")?;
    let mut builder = GraphBuilder::new(vertex_count, period)?;

    while let Some((line, token)) = tokens.next_token()? {
        let source: u32 = parse_token(line, &token, "edge source")?;
        let target: u32 = tokens.expect("edge target")?;
        let weights = (0..period)
            .map(|_| tokens.expect("edge weight"))
            .collect::<Result<Vec<u32>>>()?;

        builder
            .add_edge(source, target, weights)
            .map_err(|err| match err {
                Error::InvalidGraph(msg) => Error::InvalidGraph(format!("line {line}: {msg}")),
                other => other,
            })?;
    }

    let graph = builder.build();
    info!(
        "loaded graph: {} vertices, {} edges, period {} ({} lines)",
        graph.vertex_count(),
        graph.edge_count(),
        graph.period(),
        tokens.line()
    );
    Ok(graph)
}

/// Read and parse a graph file
pub fn load_graph<P: AsRef<Path>>(path: P) -> Result<PeriodicGraph> {
    let file = File::open(path.as_ref())?;
    parse_graph(BufReader::new(file))
}
