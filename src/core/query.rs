//! Query stream and per-query outcomes
//!
//! Queries are whitespace-separated `source destination` pairs. Ids are read
//! as signed integers so that a negative id is answered with
//! [`QueryOutcome::InvalidVertex`] instead of failing the whole stream.

use std::io::BufRead;

use serde::Serialize;

use crate::core::error::{Error, Result};
use crate::core::format::{parse_token, Tokens};
use crate::core::solver::{Route, Solver};

/// One `(source, destination)` request
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Query {
    pub source: i64,
    pub destination: i64,
}

/// Iterator over queries read from a text stream.
///
/// Yields at most one error, then ends.
pub struct QueryReader<R> {
    tokens: Tokens<R>,
    done: bool,
}

impl<R: BufRead> QueryReader<R> {
    pub fn new(reader: R) -> Self {
        Self {
            tokens: Tokens::new(reader),
            done: false,
        }
    }

    fn read_query(&mut self) -> Result<Option<Query>> {
        let Some((line, token)) = self.tokens.next_token()? else {
            return Ok(None);
        };
        let source: i64 = parse_token(line, &token, "source vertex")?;
        let destination = match self.tokens.next_token()? {
            Some((line, token)) => parse_token(line, &token, "destination vertex")?,
            None => {
                return Err(Error::Parse {
                    line,
                    message: format!("source {source} has no destination"),
                })
            }
        };
        Ok(Some(Query {
            source,
            destination,
        }))
    }
}

impl<R: BufRead> Iterator for QueryReader<R> {
    type Item = Result<Query>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.done {
            return None;
        }
        match self.read_query() {
            Ok(Some(query)) => Some(Ok(query)),
            Ok(None) => {
                self.done = true;
                None
            }
            Err(err) => {
                self.done = true;
                Some(Err(err))
            }
        }
    }
}

/// What a single query produced
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum QueryOutcome {
    Route(Route),
    NoPath { source: i64, destination: i64 },
    InvalidVertex { vertex: i64, vertex_count: u32 },
}

impl Solver<'_> {
    /// Answer a query, folding the per-query failures into [`QueryOutcome`].
    ///
    /// Only internal errors are returned as `Err`.
    pub fn answer(&self, query: Query) -> Result<QueryOutcome> {
        match self.shortest_path(query.source, query.destination) {
            Ok(Some(route)) => Ok(QueryOutcome::Route(route)),
            Ok(None) => Ok(QueryOutcome::NoPath {
                source: query.source,
                destination: query.destination,
            }),
            Err(Error::InvalidVertex {
                vertex,
                vertex_count,
            }) => Ok(QueryOutcome::InvalidVertex {
                vertex,
                vertex_count,
            }),
            Err(err) => Err(err),
        }
    }
}
