use varisat::{ExtendFormula, Lit, Solver};

use crate::Error;

/// Outcome of a solver call. On SAT the model is a complete assignment,
/// reported as DIMACS literals (positive = true).
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SolveResult {
    Sat(Vec<isize>),
    Unsat,
}

impl SolveResult {
    pub fn is_sat(&self) -> bool {
        matches!(self, SolveResult::Sat(_))
    }
}

/// An incremental CDCL solver: asserted clauses are permanent, solving may be
/// conditioned on assumption literals. Clauses and assumptions use the DIMACS
/// convention (non-zero `isize`, negative = negated).
pub trait SatOracle {
    fn add_clause(&mut self, clause: &[isize]);

    fn add_clauses(&mut self, clauses: &[Vec<isize>]) {
        for clause in clauses {
            self.add_clause(clause);
        }
    }

    /// Solves the asserted formula under the given assumptions. A hard solver
    /// failure is fatal and surfaces as [`Error::Solver`].
    fn solve(&mut self, assumptions: &[isize]) -> Result<SolveResult, Error>;
}

/// In-process varisat backend. Learned clauses are retained across calls,
/// which is what makes the one-literal probe loop affordable.
pub struct VarisatOracle {
    solver: Solver<'static>,
}

impl VarisatOracle {
    pub fn new() -> Self {
        VarisatOracle { solver: Solver::new() }
    }
}

impl Default for VarisatOracle {
    fn default() -> Self {
        Self::new()
    }
}

fn to_lits(dimacs: &[isize]) -> Vec<Lit> {
    dimacs.iter().map(|&l| Lit::from_dimacs(l)).collect()
}

impl SatOracle for VarisatOracle {
    fn add_clause(&mut self, clause: &[isize]) {
        self.solver.add_clause(&to_lits(clause));
    }

    fn solve(&mut self, assumptions: &[isize]) -> Result<SolveResult, Error> {
        // varisat keeps the assumption set until it is replaced; re-arm it on
        // every call so an unconditioned solve really is unconditioned.
        self.solver.assume(&to_lits(assumptions));
        match self.solver.solve() {
            Ok(true) => {
                let model = self
                    .solver
                    .model()
                    .ok_or_else(|| Error::Solver("SAT verdict without a model".into()))?;
                let dimacs = model
                    .iter()
                    .map(|lit| {
                        let var = lit.var().to_dimacs();
                        if lit.is_positive() { var } else { -var }
                    })
                    .collect();
                Ok(SolveResult::Sat(dimacs))
            }
            Ok(false) => Ok(SolveResult::Unsat),
            Err(e) => Err(Error::Solver(e.to_string())),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_formula_is_sat() {
        let mut oracle = VarisatOracle::new();
        assert!(oracle.solve(&[]).unwrap().is_sat());
    }

    #[test]
    fn unit_conflict_is_unsat() {
        let mut oracle = VarisatOracle::new();
        oracle.add_clause(&[1]);
        oracle.add_clause(&[-1]);
        assert_eq!(oracle.solve(&[]).unwrap(), SolveResult::Unsat);
    }

    #[test]
    fn assumptions_condition_a_single_call() {
        let mut oracle = VarisatOracle::new();
        oracle.add_clause(&[1, 2]);
        oracle.add_clause(&[-1, 2]);
        // Not 2 forces a contradiction, but only while assumed.
        assert_eq!(oracle.solve(&[-2]).unwrap(), SolveResult::Unsat);
        assert!(oracle.solve(&[]).unwrap().is_sat());
        assert!(oracle.solve(&[2]).unwrap().is_sat());
    }

    #[test]
    fn model_covers_asserted_variables() {
        let mut oracle = VarisatOracle::new();
        oracle.add_clauses(&[vec![1, 2], vec![-1], vec![3]]);
        let SolveResult::Sat(model) = oracle.solve(&[]).unwrap() else {
            panic!("expected SAT");
        };
        assert!(model.contains(&-1));
        assert!(model.contains(&2));
        assert!(model.contains(&3));
    }
}
