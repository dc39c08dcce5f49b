//! Decision core for a Crocomine agent.
//!
//! Crocomine is a Minesweeper relative: hidden cells on a land/sea grid are
//! Free or hold a Tiger (land), Shark (sea) or Crocodile (either). This crate
//! keeps the partial observations as CNF over a per-cell label encoding,
//! drives an incremental SAT solver to extract forced moves via UNSAT probes,
//! and falls back to a minimum-risk speculative move when deduction runs dry.
pub mod cardinality;
pub mod client;
pub mod codec;
pub mod driver;
pub mod engine;
pub mod knowledge;
pub mod oracle;

pub use engine::{Action, Agent};
pub use knowledge::{GridSpec, Observation, Species, Terrain};

use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;

use anyhow::Result;

use crate::codec::VarCodec;

/// Errors of the decision core, in the three fatal flavors the driver cares
/// about: the caller misused the API, the observations contradict each other,
/// or the solver itself failed.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("position ({row}, {col}) is outside the {height}x{width} grid")]
    OutOfBounds { row: usize, col: usize, height: usize, width: usize },
    #[error("bad request: {0}")]
    Usage(String),
    #[error("inconsistent observation: {0}")]
    Inconsistent(String),
    #[error("SAT solver failure: {0}")]
    Solver(String),
}

/// Writes a clause set in DIMACS CNF format, for offline inspection of what
/// the agent knew. The header declares the codec's full variable range, so
/// cell labels no clause mentions yet are still addressable.
pub fn write_clauses<P: AsRef<Path>>(
    output: P,
    codec: &VarCodec,
    clauses: &[Vec<isize>],
) -> Result<()> {
    let num_vars = codec.num_vars();

    let file = File::create(&output)?;
    let mut writer = BufWriter::new(file);

    writeln!(writer, "p cnf {num_vars} {}", clauses.len())?;
    for clause in clauses {
        for literal in clause {
            write!(writer, "{literal} ")?;
        }
        writeln!(writer, "0")?;
    }
    writer.flush()?;

    log::info!(
        "wrote {num_vars} variables, {} clauses to '{}'",
        clauses.len(),
        output.as_ref().display()
    );
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn dimacs_dump_has_header_and_terminators() {
        let path = std::env::temp_dir().join("crocomine_dump_test.cnf");
        let codec = VarCodec::new(1, 1);
        write_clauses(&path, &codec, &[vec![1, -3], vec![2]]).unwrap();
        let text = std::fs::read_to_string(&path).unwrap();
        assert_eq!(text, "p cnf 4 2\n1 -3 0\n2 0\n");
        std::fs::remove_file(&path).ok();
    }
}
