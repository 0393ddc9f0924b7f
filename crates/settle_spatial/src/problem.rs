//! Problem-file parsing.
//!
//! The on-disk format is plain UTF-8 text. The first line holds four
//! whitespace-separated integers `B N Ny Nx` (block count, net count, grid
//! height, grid width; note that the height precedes the width). Each of
//! the following `N` lines describes one net: a block count `K` followed by
//! `K` block ids. Trailing whitespace and empty final lines are tolerated,
//! and parsing stops after `N` net lines even if the file continues.

use crate::chip::Chip;
use crate::graph::Graph;
use crate::ids::{BlockId, NetId};
use settle_diagnostics::DiagnosticSink;
use std::path::Path;

/// Errors that abort loading a problem file.
///
/// Recoverable oddities (net-line count mismatches, unconnected blocks,
/// out-of-range ids) are reported as warnings to the sink instead.
#[derive(Debug, thiserror::Error)]
pub enum ProblemError {
    /// An I/O error occurred while reading the problem file.
    #[error("failed to read problem file: {0}")]
    Io(#[from] std::io::Error),

    /// The first line does not describe a valid problem.
    #[error("malformed problem header: {0}")]
    MalformedHeader(String),
}

impl Chip {
    /// Loads a problem file from disk into a fresh chip with an empty
    /// placement.
    pub fn load(path: &Path, sink: &DiagnosticSink) -> Result<Chip, ProblemError> {
        let text = std::fs::read_to_string(path)?;
        Self::parse_str(&text, sink)
    }

    /// Parses a problem from text into a fresh chip with an empty placement.
    pub fn parse_str(text: &str, sink: &DiagnosticSink) -> Result<Chip, ProblemError> {
        let mut lines = text.lines();

        let header = lines
            .next()
            .ok_or_else(|| ProblemError::MalformedHeader("empty file".into()))?;
        let fields: Vec<&str> = header.split_whitespace().collect();
        if fields.len() != 4 {
            return Err(ProblemError::MalformedHeader(format!(
                "expected 4 values on the first line, found {}",
                fields.len()
            )));
        }
        let parse = |field: &str, name: &str| -> Result<usize, ProblemError> {
            field.parse::<usize>().map_err(|_| {
                ProblemError::MalformedHeader(format!("{name} is not a non-negative integer"))
            })
        };
        let n_blocks = parse(fields[0], "block count")?;
        let n_nets = parse(fields[1], "net count")?;
        let ny = parse(fields[2], "grid height")?;
        let nx = parse(fields[3], "grid width")?;

        if n_blocks > nx * ny {
            sink.warn(format!(
                "problem declares {n_blocks} blocks but the grid has only {} slots",
                nx * ny
            ));
        }

        let mut graph = Graph::new(n_blocks, n_nets);
        let mut nets_read = 0usize;
        for line in lines {
            if nets_read >= n_nets {
                break;
            }
            let line = line.trim();
            if line.is_empty() {
                continue;
            }

            let mut fields = line.split_whitespace();
            let declared: Option<usize> = fields.next().and_then(|f| f.parse().ok());
            let mut blocks = Vec::new();
            for field in fields {
                match field.parse::<usize>() {
                    Ok(id) if id < n_blocks => blocks.push(BlockId::from_raw(id as u32)),
                    Ok(id) => sink.warn(format!(
                        "net line {}: block id {id} is out of range and was ignored",
                        nets_read + 1
                    )),
                    Err(_) => sink.warn(format!(
                        "net line {}: unparsable field '{field}' was ignored",
                        nets_read + 1
                    )),
                }
            }
            match declared {
                Some(k) if k != blocks.len() => sink.warn(format!(
                    "net line {}: declares {k} blocks but lists {}",
                    nets_read + 1,
                    blocks.len()
                )),
                Some(_) => {}
                None => sink.warn(format!(
                    "net line {}: missing or unparsable block count",
                    nets_read + 1
                )),
            }
            graph.set_net(NetId::from_raw(nets_read as u32), &blocks);
            nets_read += 1;
        }

        if nets_read < n_nets {
            sink.warn(format!(
                "problem declares {n_nets} nets but only {nets_read} net lines were found"
            ));
        }
        if !graph.all_blocks_connected() {
            sink.warn("some blocks are not connected to any net");
        }

        Ok(Chip::new(graph, nx, ny))
    }
}
