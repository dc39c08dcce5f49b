use std::collections::VecDeque;

use log::debug;
use rand::SeedableRng;
use rand::prelude::IndexedRandom;
use rand::rngs::StdRng;

use crate::Error;
use crate::codec::Label;
use crate::knowledge::{CellKind, GridSpec, KnowledgeBase, Observation, Species, Terrain};
use crate::oracle::{SatOracle, VarisatOracle};

/// Above this cell count chording is tried before any solver work; a chord
/// costs no probes and shrinks the board first.
const LARGE_BOARD_CELLS: usize = 5000;

/// Upper bound on C(unknowns, remaining) for emitting a board-wide species
/// cardinality; past it the pairwise encoding explodes.
const BOOST_BUDGET: u128 = 100_000;

/// Tolerance for risk ties; the scores compared are short sums of small
/// rationals.
const RISK_EPS: f64 = 1e-9;

/// One move, addressed in (row, col).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action {
    Chord((usize, usize)),
    Discover((usize, usize)),
    Guess((usize, usize), Species),
    /// Every step exhausted with nothing left to act on; lets the driver shut
    /// the grid down gracefully.
    NoMove,
}

/// The decision core: knowledge base, SAT oracle and the move policy.
///
/// Each turn picks exactly one action, in order of preference: a chord (free),
/// a deductively forced guess (UNSAT probe), a forced discover on the
/// frontier, and finally the minimum-risk speculative move. All randomness
/// flows through one seeded generator so games replay exactly.
pub struct Agent<O: SatOracle = VarisatOracle> {
    kb: KnowledgeBase,
    oracle: O,
    rng: StdRng,
    /// Cells proven to hold a specific species, awaiting emission.
    pending: VecDeque<(usize, Species)>,
    /// New clauses arrived since the last forced-guess sweep.
    refresh_guess: bool,
    /// Cells already chorded; a chord changes no knowledge by itself, so
    /// re-selecting one would loop.
    chorded: Vec<bool>,
    /// (unknowns, remaining) signature of the last board-wide cardinality per
    /// species; the clause log is append-only, so identical constraints are
    /// not re-emitted.
    boost_sig: [Option<(usize, u32)>; 3],
    /// Clause log prefix already pushed into the oracle.
    synced: usize,
    large: bool,
    turn_solves: u64,
}

impl Agent<VarisatOracle> {
    pub fn new(spec: &GridSpec, seed: u64) -> Result<Self, Error> {
        Self::with_oracle(spec, VarisatOracle::new(), seed)
    }
}

impl<O: SatOracle> Agent<O> {
    pub fn with_oracle(spec: &GridSpec, oracle: O, seed: u64) -> Result<Self, Error> {
        let kb = KnowledgeBase::new(spec)?;
        let cells = kb.height() * kb.width();
        Ok(Agent {
            kb,
            oracle,
            rng: StdRng::seed_from_u64(seed),
            pending: VecDeque::new(),
            refresh_guess: false,
            chorded: vec![false; cells],
            boost_sig: [None; 3],
            synced: 0,
            large: cells > LARGE_BOARD_CELLS,
            turn_solves: 0,
        })
    }

    pub fn kb(&self) -> &KnowledgeBase {
        &self.kb
    }

    /// Solver calls made by the most recent `decide`.
    pub fn turn_solve_calls(&self) -> u64 {
        self.turn_solves
    }

    /// Feeds one server response into the knowledge base and the oracle.
    pub fn observe(&mut self, batch: &[Observation]) -> Result<(), Error> {
        self.kb.begin_batch();
        for obs in batch {
            self.kb.add_observation(obs)?;
        }
        if self.sync() > 0 {
            self.refresh_guess = true;
        }
        Ok(())
    }

    fn sync(&mut self) -> usize {
        let fresh = self.kb.clauses().len() - self.synced;
        if fresh > 0 {
            self.oracle.add_clauses(&self.kb.clauses()[self.synced..]);
            self.synced = self.kb.clauses().len();
        }
        fresh
    }

    /// Chooses the next move.
    pub fn decide(&mut self) -> Result<Action, Error> {
        self.turn_solves = 0;
        if self.large {
            if let Some(idx) = self.chord_candidate() {
                return Ok(self.take_chord(idx));
            }
        }
        if let Some(action) = self.forced_guess()? {
            return Ok(action);
        }
        if !self.large {
            if let Some(idx) = self.chord_candidate() {
                return Ok(self.take_chord(idx));
            }
        }
        if self.cardinality_boost()? {
            self.refresh_guess = true;
            if let Some(action) = self.forced_guess()? {
                return Ok(action);
            }
        }
        if let Some(idx) = self.forced_free()? {
            return Ok(Action::Discover(self.kb.coords(idx)));
        }
        self.weighted_move()
    }

    fn probe(&mut self, lit: isize) -> Result<bool, Error> {
        self.turn_solves += 1;
        Ok(self.oracle.solve(&[lit])?.is_sat())
    }

    /// A visited Free cell whose nearby animals are all identified and which
    /// still borders something unrevealed. Needs counting only, no solver.
    fn chord_candidate(&self) -> Option<usize> {
        let mut best: Option<(usize, usize)> = None;
        for idx in self.kb.visited() {
            if self.chorded[idx] {
                continue;
            }
            let cell = self.kb.cell(idx);
            let Some(prox_sum) = cell.prox_sum() else { continue };
            if cell.known_animals() != prox_sum {
                continue;
            }
            let mut unknowns = 0;
            let mut revealable = false;
            for &n in &cell.neighbors {
                match self.kb.cell(n).kind {
                    CellKind::Unknown => {
                        unknowns += 1;
                        revealable = true;
                    }
                    CellKind::Animal(_) => revealable = true,
                    CellKind::Free => {}
                }
            }
            if !revealable {
                continue;
            }
            // Most unknown neighbors wins; first in visited order on ties.
            if best.is_none_or(|(most, _)| unknowns > most) {
                best = Some((unknowns, idx));
            }
        }
        best.map(|(_, idx)| idx)
    }

    fn take_chord(&mut self, idx: usize) -> Action {
        self.chorded[idx] = true;
        Action::Chord(self.kb.coords(idx))
    }

    /// Pops a proven species claim, refreshing the queue first if new clauses
    /// arrived. Probes are restricted to cells touched by the latest reveal.
    fn forced_guess(&mut self) -> Result<Option<Action>, Error> {
        if let Some(action) = self.pop_pending() {
            return Ok(Some(action));
        }
        if !self.refresh_guess {
            return Ok(None);
        }
        self.refresh_guess = false;
        let targets = self.kb.touched().to_vec();
        for idx in targets {
            if self.kb.cell(idx).kind != CellKind::Unknown {
                continue;
            }
            let mut forced = 0;
            for sp in Species::ALL {
                let lit = self.kb.lit(idx, sp.label());
                if !self.probe(-lit)? {
                    forced += 1;
                    if forced > 1 {
                        let (row, col) = self.kb.coords(idx);
                        return Err(Error::Inconsistent(format!(
                            "two species forced at ({row}, {col}), formula unsatisfiable"
                        )));
                    }
                    debug!("forced {sp} at {:?}", self.kb.coords(idx));
                    self.pending.push_back((idx, sp));
                }
            }
        }
        Ok(self.pop_pending())
    }

    fn pop_pending(&mut self) -> Option<Action> {
        while let Some((idx, sp)) = self.pending.pop_front() {
            // Entries can go stale when the server volunteers the cell first.
            if self.kb.cell(idx).kind == CellKind::Unknown {
                return Some(Action::Guess(self.kb.coords(idx), sp));
            }
        }
        None
    }

    /// Board-wide "exactly remaining" per species, emitted once the
    /// combination count fits the budget. Small late-game constraints like
    /// these unlock most endgame deductions.
    fn cardinality_boost(&mut self) -> Result<bool, Error> {
        let mut emitted = false;
        for sp in Species::ALL {
            let unknowns = self.kb.unknown_count();
            let remaining = self.kb.species_remaining(sp);
            let sig = (unknowns, remaining);
            if self.boost_sig[sp.index()] == Some(sig) {
                continue;
            }
            if combinations_capped(unknowns as u128, remaining as u128, BOOST_BUDGET)
                >= BOOST_BUDGET
            {
                continue;
            }
            if self.kb.assert_species_remaining(sp)? > 0 {
                debug!("asserted {remaining} {sp} over {unknowns} unknowns");
                emitted = true;
            }
            self.boost_sig[sp.index()] = Some(sig);
        }
        if emitted {
            self.sync();
        }
        Ok(emitted)
    }

    /// Probes the frontier for a cell that every model calls Free.
    fn forced_free(&mut self) -> Result<Option<usize>, Error> {
        let mut seen = vec![false; self.kb.cells().len()];
        let mut frontier = Vec::new();
        for idx in self.kb.visited() {
            let cell = self.kb.cell(idx);
            if cell.prox.is_none() {
                continue;
            }
            for &n in &cell.neighbors {
                if !seen[n] && self.kb.cell(n).kind == CellKind::Unknown {
                    seen[n] = true;
                    frontier.push(n);
                }
            }
        }
        for idx in frontier {
            let lit = self.kb.lit(idx, Label::Free);
            if !self.probe(-lit)? {
                debug!("forced free at {:?}", self.kb.coords(idx));
                return Ok(Some(idx));
            }
        }
        Ok(None)
    }

    /// Deduction is exhausted: score every frontier cell by its worst-case
    /// animal probability across the constraints that see it, compare with
    /// the whole-board density, and move on a uniformly chosen minimum.
    fn weighted_move(&mut self) -> Result<Action, Error> {
        let mut risk: Vec<Option<f64>> = vec![None; self.kb.cells().len()];
        let mut frontier: Vec<usize> = Vec::new();
        for idx in self.kb.visited().collect::<Vec<_>>() {
            let cell = self.kb.cell(idx);
            let Some(prox) = cell.prox else { continue };
            let unknowns: Vec<usize> = cell
                .neighbors
                .iter()
                .copied()
                .filter(|&n| self.kb.cell(n).kind == CellKind::Unknown)
                .collect();
            if unknowns.is_empty() {
                continue;
            }
            let left = |sp: Species| -> f64 {
                (prox[sp.index()] as i64 - cell.known[sp.label().index()] as i64).max(0) as f64
            };
            let (t, s, k) = (left(Species::Tiger), left(Species::Shark), left(Species::Croco));
            let u = unknowns.len() as f64;
            let u_land = unknowns
                .iter()
                .filter(|&&n| self.kb.cell(n).field == Some(Terrain::Land))
                .count() as f64;
            let u_sea = unknowns
                .iter()
                .filter(|&&n| self.kb.cell(n).field == Some(Terrain::Sea))
                .count() as f64;
            for &n in &unknowns {
                // Species-specific odds on known terrain, crocodiles anywhere;
                // terrain-blind cells get the full density of the neighborhood.
                let p = match self.kb.cell(n).field {
                    Some(Terrain::Sea) => s / u_sea + k / u,
                    Some(Terrain::Land) => t / u_land + k / u,
                    None => (t + s + k) / u,
                };
                match risk[n] {
                    Some(r) => risk[n] = Some(r.max(p)),
                    None => {
                        risk[n] = Some(p);
                        frontier.push(n);
                    }
                }
            }
        }

        let interior: Vec<usize> = self
            .kb
            .unknown_indices()
            .into_iter()
            .filter(|&idx| risk[idx].is_none())
            .collect();
        let blind = self.kb.blind_unknown_count();
        let remaining = self.kb.animals_remaining();
        let p_unknown = if blind == 0 { 1.0 } else { remaining as f64 / blind as f64 };

        let selected = if frontier.is_empty() {
            interior.choose(&mut self.rng).copied()
        } else {
            let min_risk = frontier
                .iter()
                .map(|&idx| risk[idx].unwrap_or(f64::INFINITY))
                .fold(f64::INFINITY, f64::min);
            let ties: Vec<usize> = frontier
                .iter()
                .copied()
                .filter(|&idx| (risk[idx].unwrap_or(f64::INFINITY) - min_risk).abs() < RISK_EPS)
                .collect();
            if min_risk < p_unknown - RISK_EPS {
                ties.choose(&mut self.rng).copied()
            } else if (min_risk - p_unknown).abs() <= RISK_EPS {
                let mut pool = ties;
                pool.extend(&interior);
                pool.choose(&mut self.rng).copied()
            } else if interior.is_empty() {
                ties.choose(&mut self.rng).copied()
            } else {
                interior.choose(&mut self.rng).copied()
            }
        };
        let Some(idx) = selected else {
            return Ok(Action::NoMove);
        };
        let pos = self.kb.coords(idx);
        debug!(
            "speculative move at {pos:?}, risk {:?}, baseline {p_unknown:.3}",
            risk[idx]
        );
        // With no constrained cells in sight, or no terrain-blind cells left to
        // spread the density over, discovery has no edge: claim a species
        // instead (unless none remain, in which case the pick is safe ground).
        if (frontier.is_empty() || blind == 0) && remaining > 0 {
            return Ok(Action::Guess(pos, self.best_guess_species(idx)));
        }
        Ok(Action::Discover(pos))
    }

    /// Species with the most unmarked animals among those the cell's terrain
    /// admits; T/S/C order on ties.
    fn best_guess_species(&self, idx: usize) -> Species {
        let field = self.kb.cell(idx).field;
        let mut best = Species::Croco;
        let mut best_remaining = 0;
        for sp in Species::ALL {
            if let Some(terrain) = field {
                if !sp.tolerates(terrain) {
                    continue;
                }
            }
            let left = self.kb.species_remaining(sp);
            if left > best_remaining {
                best = sp;
                best_remaining = left;
            }
        }
        best
    }
}

/// "n choose k", saturating at `cap`; the early exit keeps the running
/// product inside u128 for any board size.
fn combinations_capped(n: u128, k: u128, cap: u128) -> u128 {
    if k > n {
        return 0;
    }
    let k = k.min(n - k);
    let mut acc: u128 = 1;
    for i in 1..=k {
        acc = acc * (n - k + i) / i;
        if acc >= cap {
            return cap;
        }
    }
    acc
}
