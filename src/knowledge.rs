use std::collections::VecDeque;
use std::fmt;

use serde::{Deserialize, Serialize};

use crate::Error;
use crate::cardinality::exactly;
use crate::codec::{LABELS, Label, VarCodec};

/// The three animal species of Crocomine.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Species {
    #[serde(rename = "T")]
    Tiger,
    #[serde(rename = "S")]
    Shark,
    #[serde(rename = "C")]
    Croco,
}

impl Species {
    pub const ALL: [Species; 3] = [Species::Tiger, Species::Shark, Species::Croco];

    /// Position in proximity-count triples and per-species counters.
    pub fn index(self) -> usize {
        match self {
            Species::Tiger => 0,
            Species::Shark => 1,
            Species::Croco => 2,
        }
    }

    pub fn label(self) -> Label {
        match self {
            Species::Tiger => Label::Tiger,
            Species::Shark => Label::Shark,
            Species::Croco => Label::Croco,
        }
    }

    pub fn code(self) -> &'static str {
        match self {
            Species::Tiger => "T",
            Species::Shark => "S",
            Species::Croco => "C",
        }
    }

    pub fn from_code(code: &str) -> Result<Species, Error> {
        match code {
            "T" => Ok(Species::Tiger),
            "S" => Ok(Species::Shark),
            "C" => Ok(Species::Croco),
            other => Err(Error::Usage(format!("unknown species code '{other}'"))),
        }
    }

    /// Tigers stay on land, sharks in the sea, crocodiles go anywhere.
    pub fn tolerates(self, terrain: Terrain) -> bool {
        match self {
            Species::Tiger => terrain == Terrain::Land,
            Species::Shark => terrain == Terrain::Sea,
            Species::Croco => true,
        }
    }
}

impl fmt::Display for Species {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.code())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Terrain {
    Land,
    Sea,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CellKind {
    Unknown,
    Free,
    Animal(Species),
}

/// One observation returned by the game server after a move.
///
/// `prox_count` is present iff the cell was revealed Free; `animal` is present
/// iff the observation records an accepted guess. The two never coexist.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Observation {
    pub pos: (usize, usize),
    pub field: Terrain,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub prox_count: Option<[u8; 3]>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub animal: Option<Species>,
}

/// Grid dimensions and declared totals, as announced at grid creation.
/// The totals are expected to sum to `height * width` but this is not
/// enforced.
#[derive(Debug, Clone, Copy)]
pub struct GridSpec {
    pub height: usize,
    pub width: usize,
    pub tiger_count: u32,
    pub shark_count: u32,
    pub croco_count: u32,
    pub land_count: u32,
    pub sea_count: u32,
}

/// Per-cell knowledge. Neighbor lists are precomputed at grid creation and
/// hold flat indices into the cell array, in row-major order.
#[derive(Debug, Clone)]
pub struct Cell {
    pub kind: CellKind,
    pub field: Option<Terrain>,
    pub prox: Option<[u8; 3]>,
    /// How many neighbors are already determined per label (Free, T, S, C).
    pub known: [u32; 4],
    pub neighbors: Vec<usize>,
}

impl Cell {
    pub fn known_animals(&self) -> u32 {
        self.known[Label::Tiger.index()]
            + self.known[Label::Shark.index()]
            + self.known[Label::Croco.index()]
    }

    pub fn prox_sum(&self) -> Option<u32> {
        self.prox.map(|p| p.iter().map(|&c| c as u32).sum())
    }
}

/// The agent's knowledge of one grid: per-cell state, the append-only CNF
/// clause log, and the aggregate counters. `add_observation` is the sole
/// mutator; cells are never forgotten and clauses never retracted.
pub struct KnowledgeBase {
    height: usize,
    width: usize,
    codec: VarCodec,
    cells: Vec<Cell>,
    clauses: Vec<Vec<isize>>,
    /// Revealed-or-constrained cells: revealed cells are appended, newly
    /// constrained neighbors are prepended. The resulting order is the
    /// deterministic iteration order for the decision engine.
    visited: VecDeque<usize>,
    in_visited: Vec<bool>,
    animal_total: [u32; 3],
    animal_marked: [u32; 3],
    land_total: u32,
    sea_total: u32,
    land_found: u32,
    sea_found: u32,
    /// Cells named by the most recent reveal batch; bounds the probe count of
    /// the forced-guess refresh.
    touched: Vec<usize>,
    in_touched: Vec<bool>,
    touched_stale: bool,
}

impl KnowledgeBase {
    pub fn new(spec: &GridSpec) -> Result<Self, Error> {
        if spec.height == 0 || spec.width == 0 {
            return Err(Error::Usage(format!(
                "degenerate grid {}x{}",
                spec.height, spec.width
            )));
        }
        let n = spec.height * spec.width;
        let mut cells = Vec::with_capacity(n);
        for row in 0..spec.height {
            for col in 0..spec.width {
                let mut neighbors = Vec::new();
                for r in row.saturating_sub(1)..=(row + 1).min(spec.height - 1) {
                    for c in col.saturating_sub(1)..=(col + 1).min(spec.width - 1) {
                        if (r, c) != (row, col) {
                            neighbors.push(r * spec.width + c);
                        }
                    }
                }
                cells.push(Cell {
                    kind: CellKind::Unknown,
                    field: None,
                    prox: None,
                    known: [0; 4],
                    neighbors,
                });
            }
        }
        Ok(KnowledgeBase {
            height: spec.height,
            width: spec.width,
            codec: VarCodec::new(spec.height, spec.width),
            cells,
            clauses: Vec::new(),
            visited: VecDeque::new(),
            in_visited: vec![false; n],
            animal_total: [spec.tiger_count, spec.shark_count, spec.croco_count],
            animal_marked: [0; 3],
            land_total: spec.land_count,
            sea_total: spec.sea_count,
            land_found: 0,
            sea_found: 0,
            touched: Vec::new(),
            in_touched: vec![false; n],
            touched_stale: false,
        })
    }

    pub fn height(&self) -> usize {
        self.height
    }

    pub fn width(&self) -> usize {
        self.width
    }

    pub fn index(&self, row: usize, col: usize) -> usize {
        row * self.width + col
    }

    pub fn coords(&self, idx: usize) -> (usize, usize) {
        (idx / self.width, idx % self.width)
    }

    pub fn cell(&self, idx: usize) -> &Cell {
        &self.cells[idx]
    }

    pub fn cells(&self) -> &[Cell] {
        &self.cells
    }

    pub fn codec(&self) -> &VarCodec {
        &self.codec
    }

    /// Positive literal for "cell `idx` has `label`".
    pub fn lit(&self, idx: usize, label: Label) -> isize {
        let (row, col) = self.coords(idx);
        self.codec.encode(row, col, label)
    }

    pub fn clauses(&self) -> &[Vec<isize>] {
        &self.clauses
    }

    pub fn visited(&self) -> impl Iterator<Item = usize> + '_ {
        self.visited.iter().copied()
    }

    pub fn touched(&self) -> &[usize] {
        &self.touched
    }

    pub fn species_total(&self, sp: Species) -> u32 {
        self.animal_total[sp.index()]
    }

    pub fn species_marked(&self, sp: Species) -> u32 {
        self.animal_marked[sp.index()]
    }

    pub fn species_remaining(&self, sp: Species) -> u32 {
        self.animal_total[sp.index()] - self.animal_marked[sp.index()]
    }

    pub fn animals_remaining(&self) -> u32 {
        Species::ALL.iter().map(|&sp| self.species_remaining(sp)).sum()
    }

    pub fn terrain_found(&self, terrain: Terrain) -> u32 {
        match terrain {
            Terrain::Land => self.land_found,
            Terrain::Sea => self.sea_found,
        }
    }

    /// Flat indices of all cells still Unknown, row-major.
    pub fn unknown_indices(&self) -> Vec<usize> {
        (0..self.cells.len())
            .filter(|&idx| self.cells[idx].kind == CellKind::Unknown)
            .collect()
    }

    pub fn unknown_count(&self) -> usize {
        self.cells.iter().filter(|c| c.kind == CellKind::Unknown).count()
    }

    /// Unknown cells whose terrain has not leaked either; the denominator of
    /// the whole-board animal density estimate.
    pub fn blind_unknown_count(&self) -> usize {
        self.cells
            .iter()
            .filter(|c| c.kind == CellKind::Unknown && c.field.is_none())
            .count()
    }

    /// Marks the start of a server response. The last-touched set is replaced
    /// by the first reveal of the new batch; accepted-guess observations keep
    /// the previous reveal's set alive.
    pub fn begin_batch(&mut self) {
        self.touched_stale = true;
    }

    fn touch(&mut self, idx: usize) {
        if self.touched_stale {
            for &old in &self.touched {
                self.in_touched[old] = false;
            }
            self.touched.clear();
            self.touched_stale = false;
        }
        if !self.in_touched[idx] {
            self.in_touched[idx] = true;
            self.touched.push(idx);
        }
    }

    /// Ingests one observation, updating cell state and emitting the clauses
    /// it implies into the log.
    pub fn add_observation(&mut self, obs: &Observation) -> Result<(), Error> {
        let (row, col) = obs.pos;
        if row >= self.height || col >= self.width {
            return Err(Error::OutOfBounds {
                row,
                col,
                height: self.height,
                width: self.width,
            });
        }
        let idx = self.index(row, col);
        match (obs.prox_count, obs.animal) {
            (Some(_), Some(_)) => Err(Error::Usage(format!(
                "observation at ({row}, {col}) carries both prox_count and animal"
            ))),
            (Some(prox), None) => self.reveal_free(idx, obs.field, prox),
            (None, Some(sp)) => self.record_guess(idx, obs.field, sp),
            (None, None) => self.reveal_terrain(idx, obs.field),
        }
    }

    /// Terrain-only observation: the cell's terrain leaked without counts.
    fn reveal_terrain(&mut self, idx: usize, terrain: Terrain) -> Result<(), Error> {
        if self.set_field(idx, terrain)? {
            self.emit_terrain_exclusion(idx, terrain);
        }
        self.touch(idx);
        Ok(())
    }

    /// Free reveal with proximity counts.
    fn reveal_free(&mut self, idx: usize, terrain: Terrain, prox: [u8; 3]) -> Result<(), Error> {
        match self.cells[idx].kind {
            CellKind::Animal(sp) => {
                let (row, col) = self.coords(idx);
                return Err(Error::Inconsistent(format!(
                    "({row}, {col}) revealed Free but already marked {sp}"
                )));
            }
            // Re-reveals happen when a chord overlaps known ground; nothing new.
            CellKind::Free => return Ok(()),
            CellKind::Unknown => {}
        }
        let prox_sum: usize = prox.iter().map(|&c| c as usize).sum();
        let degree = self.cells[idx].neighbors.len();
        if prox_sum > degree {
            let (row, col) = self.coords(idx);
            return Err(Error::Inconsistent(format!(
                "({row}, {col}) reports {prox_sum} animals among {degree} neighbors"
            )));
        }

        self.cells[idx].kind = CellKind::Free;
        let terrain_is_new = self.set_field(idx, terrain)?;
        self.cells[idx].prox = Some(prox);
        self.touch(idx);

        if !self.in_visited[idx] {
            self.in_visited[idx] = true;
            self.visited.push_back(idx);
            self.emit_one_label(idx)?;
        }
        let free_lit = self.lit(idx, Label::Free);
        self.clauses.push(vec![free_lit]);
        if terrain_is_new {
            self.emit_terrain_exclusion(idx, terrain);
        }

        let neighbors = self.cells[idx].neighbors.clone();
        for &n in &neighbors {
            self.cells[n].known[Label::Free.index()] += 1;
            if !self.in_visited[n] {
                self.in_visited[n] = true;
                self.visited.push_front(n);
                self.emit_one_label(n)?;
            }
            self.touch(n);
        }

        for sp in Species::ALL {
            let lits: Vec<isize> = neighbors.iter().map(|&n| self.lit(n, sp.label())).collect();
            let emitted = exactly(&lits, prox[sp.index()] as usize)?;
            self.clauses.extend(emitted);
        }
        // Whatever the counts leave over in the neighborhood is Free; emitted
        // even when all three counts are zero.
        let free_lits: Vec<isize> =
            neighbors.iter().map(|&n| self.lit(n, Label::Free)).collect();
        let emitted = exactly(&free_lits, degree - prox_sum)?;
        self.clauses.extend(emitted);

        let (found, total) = match terrain {
            Terrain::Land => (&mut self.land_found, self.land_total),
            Terrain::Sea => (&mut self.sea_found, self.sea_total),
        };
        *found += 1;
        if *found > total {
            return Err(Error::Inconsistent(format!(
                "found {found} {terrain:?} cells but only {total} declared"
            )));
        }
        Ok(())
    }

    /// Accepted guess: the server confirmed `sp` at the cell. The aggregate
    /// counters move but no clause is emitted; the cell's literals stay
    /// constrained by the surrounding proximity clauses alone.
    fn record_guess(&mut self, idx: usize, terrain: Terrain, sp: Species) -> Result<(), Error> {
        let (row, col) = self.coords(idx);
        match self.cells[idx].kind {
            CellKind::Free => {
                return Err(Error::Inconsistent(format!(
                    "({row}, {col}) marked {sp} but already revealed Free"
                )));
            }
            CellKind::Animal(prev) if prev == sp => return Ok(()),
            CellKind::Animal(prev) => {
                return Err(Error::Inconsistent(format!(
                    "({row}, {col}) marked {sp} but already marked {prev}"
                )));
            }
            CellKind::Unknown => {}
        }
        if !sp.tolerates(terrain) {
            return Err(Error::Inconsistent(format!(
                "({row}, {col}) marked {sp} on {terrain:?}"
            )));
        }
        match self.cells[idx].field {
            None => self.cells[idx].field = Some(terrain),
            Some(prev) if prev != terrain => {
                return Err(Error::Inconsistent(format!(
                    "({row}, {col}) reported as {terrain:?} but known to be {prev:?}"
                )));
            }
            Some(_) => {}
        }
        self.cells[idx].kind = CellKind::Animal(sp);
        self.animal_marked[sp.index()] += 1;
        if self.animal_marked[sp.index()] > self.animal_total[sp.index()] {
            return Err(Error::Inconsistent(format!(
                "marked {} {sp} but only {} declared",
                self.animal_marked[sp.index()],
                self.animal_total[sp.index()]
            )));
        }
        let neighbors = self.cells[idx].neighbors.clone();
        for &n in &neighbors {
            self.cells[n].known[sp.label().index()] += 1;
        }
        Ok(())
    }

    /// Board-wide cardinality for one species over the remaining Unknown
    /// cells. The caller gates on the combination budget before asking.
    pub fn assert_species_remaining(&mut self, sp: Species) -> Result<usize, Error> {
        let remaining = self.species_remaining(sp) as usize;
        let lits: Vec<isize> = self
            .unknown_indices()
            .into_iter()
            .map(|idx| self.lit(idx, sp.label()))
            .collect();
        if lits.is_empty() && remaining == 0 {
            return Ok(0);
        }
        if remaining > lits.len() {
            return Err(Error::Inconsistent(format!(
                "{remaining} {sp} left for {} unknown cells",
                lits.len()
            )));
        }
        let emitted = exactly(&lits, remaining)?;
        let count = emitted.len();
        self.clauses.extend(emitted);
        Ok(count)
    }

    fn set_field(&mut self, idx: usize, terrain: Terrain) -> Result<bool, Error> {
        match self.cells[idx].field {
            None => {
                if let CellKind::Animal(sp) = self.cells[idx].kind {
                    if !sp.tolerates(terrain) {
                        let (row, col) = self.coords(idx);
                        return Err(Error::Inconsistent(format!(
                            "({row}, {col}) is {terrain:?} but marked {sp}"
                        )));
                    }
                }
                self.cells[idx].field = Some(terrain);
                Ok(true)
            }
            Some(prev) if prev == terrain => Ok(false),
            Some(prev) => {
                let (row, col) = self.coords(idx);
                Err(Error::Inconsistent(format!(
                    "({row}, {col}) reported as {terrain:?} but known to be {prev:?}"
                )))
            }
        }
    }

    /// No tiger at sea, no shark ashore.
    fn emit_terrain_exclusion(&mut self, idx: usize, terrain: Terrain) {
        let excluded = match terrain {
            Terrain::Sea => Label::Tiger,
            Terrain::Land => Label::Shark,
        };
        let lit = self.lit(idx, excluded);
        self.clauses.push(vec![-lit]);
    }

    /// Exactly one of the four labels holds at the cell.
    fn emit_one_label(&mut self, idx: usize) -> Result<(), Error> {
        let lits: Vec<isize> = LABELS.iter().map(|&l| self.lit(idx, l)).collect();
        let emitted = exactly(&lits, 1)?;
        self.clauses.extend(emitted);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::oracle::{SatOracle, SolveResult, VarisatOracle};

    fn spec_2x2() -> GridSpec {
        GridSpec {
            height: 2,
            width: 2,
            tiger_count: 1,
            shark_count: 0,
            croco_count: 0,
            land_count: 3,
            sea_count: 1,
        }
    }

    fn reveal(pos: (usize, usize), field: Terrain, prox: [u8; 3]) -> Observation {
        Observation { pos, field, prox_count: Some(prox), animal: None }
    }

    fn mark(pos: (usize, usize), field: Terrain, sp: Species) -> Observation {
        Observation { pos, field, prox_count: None, animal: Some(sp) }
    }

    #[test]
    fn neighbors_are_precomputed_row_major() {
        let kb = KnowledgeBase::new(&GridSpec {
            height: 3,
            width: 3,
            tiger_count: 0,
            shark_count: 0,
            croco_count: 0,
            land_count: 9,
            sea_count: 0,
        })
        .unwrap();
        assert_eq!(kb.cell(kb.index(0, 0)).neighbors, vec![1, 3, 4]);
        assert_eq!(kb.cell(kb.index(1, 1)).neighbors, vec![0, 1, 2, 3, 5, 6, 7, 8]);
        assert_eq!(kb.cell(kb.index(2, 2)).neighbors, vec![4, 5, 7]);
    }

    #[test]
    fn reveal_sets_cell_state_and_counters() {
        let mut kb = KnowledgeBase::new(&spec_2x2()).unwrap();
        kb.add_observation(&reveal((0, 0), Terrain::Land, [1, 0, 0])).unwrap();

        let cell = kb.cell(kb.index(0, 0));
        assert_eq!(cell.kind, CellKind::Free);
        assert_eq!(cell.field, Some(Terrain::Land));
        assert_eq!(cell.prox, Some([1, 0, 0]));
        assert_eq!(kb.terrain_found(Terrain::Land), 1);
        for &n in &[1, 2, 3] {
            assert_eq!(kb.cell(n).known[Label::Free.index()], 1);
        }
    }

    #[test]
    fn reveal_emits_free_unit_and_terrain_exclusion() {
        let mut kb = KnowledgeBase::new(&spec_2x2()).unwrap();
        kb.add_observation(&reveal((0, 0), Terrain::Land, [1, 0, 0])).unwrap();
        let free = kb.lit(0, Label::Free);
        let shark = kb.lit(0, Label::Shark);
        assert!(kb.clauses().contains(&vec![free]));
        assert!(kb.clauses().contains(&vec![-shark]));
    }

    #[test]
    fn visited_appends_reveal_and_prepends_neighbors() {
        let mut kb = KnowledgeBase::new(&spec_2x2()).unwrap();
        kb.add_observation(&reveal((0, 0), Terrain::Land, [1, 0, 0])).unwrap();
        let order: Vec<usize> = kb.visited().collect();
        // Neighbors 1, 2, 3 prepended in row-major order; the reveal at the back.
        assert_eq!(order, vec![3, 2, 1, 0]);
    }

    #[test]
    fn guess_moves_counters_but_emits_no_clause() {
        let mut kb = KnowledgeBase::new(&spec_2x2()).unwrap();
        kb.add_observation(&reveal((0, 0), Terrain::Land, [1, 0, 0])).unwrap();
        let before = kb.clauses().len();
        kb.add_observation(&mark((1, 1), Terrain::Land, Species::Tiger)).unwrap();
        assert_eq!(kb.clauses().len(), before);
        assert_eq!(kb.species_marked(Species::Tiger), 1);
        assert_eq!(kb.species_remaining(Species::Tiger), 0);
        assert_eq!(kb.cell(kb.index(1, 1)).kind, CellKind::Animal(Species::Tiger));
        // (0, 0) sees the new tiger.
        assert_eq!(kb.cell(0).known[Label::Tiger.index()], 1);
    }

    #[test]
    fn terrain_only_observation_emits_exclusion_once() {
        let mut kb = KnowledgeBase::new(&spec_2x2()).unwrap();
        let obs = Observation {
            pos: (1, 0),
            field: Terrain::Sea,
            prox_count: None,
            animal: None,
        };
        kb.add_observation(&obs).unwrap();
        kb.add_observation(&obs).unwrap();
        let tiger = kb.lit(kb.index(1, 0), Label::Tiger);
        let hits = kb.clauses().iter().filter(|c| **c == vec![-tiger]).count();
        assert_eq!(hits, 1);
    }

    #[test]
    fn touched_follows_the_latest_reveal_batch() {
        let mut kb = KnowledgeBase::new(&spec_2x2()).unwrap();
        kb.begin_batch();
        kb.add_observation(&reveal((0, 0), Terrain::Land, [1, 0, 0])).unwrap();
        assert_eq!(kb.touched(), &[0, 1, 2, 3]);

        // A guess-only batch keeps the previous reveal's set.
        kb.begin_batch();
        kb.add_observation(&mark((1, 1), Terrain::Land, Species::Tiger)).unwrap();
        assert_eq!(kb.touched(), &[0, 1, 2, 3]);
    }

    #[test]
    fn out_of_range_position_is_a_usage_error() {
        let mut kb = KnowledgeBase::new(&spec_2x2()).unwrap();
        let err = kb
            .add_observation(&reveal((2, 0), Terrain::Land, [0, 0, 0]))
            .unwrap_err();
        assert!(matches!(err, Error::OutOfBounds { .. }));
    }

    #[test]
    fn overfull_neighborhood_is_inconsistent() {
        let mut kb = KnowledgeBase::new(&spec_2x2()).unwrap();
        let err = kb
            .add_observation(&reveal((0, 0), Terrain::Land, [4, 0, 0]))
            .unwrap_err();
        assert!(matches!(err, Error::Inconsistent(_)));
    }

    #[test]
    fn conflicting_marks_are_inconsistent() {
        let mut kb = KnowledgeBase::new(&GridSpec {
            croco_count: 1,
            ..spec_2x2()
        })
        .unwrap();
        kb.add_observation(&mark((1, 1), Terrain::Land, Species::Tiger)).unwrap();
        let err = kb
            .add_observation(&mark((1, 1), Terrain::Land, Species::Croco))
            .unwrap_err();
        assert!(matches!(err, Error::Inconsistent(_)));
    }

    #[test]
    fn shark_ashore_is_inconsistent() {
        let mut kb = KnowledgeBase::new(&GridSpec {
            shark_count: 1,
            ..spec_2x2()
        })
        .unwrap();
        let err = kb
            .add_observation(&mark((1, 1), Terrain::Land, Species::Shark))
            .unwrap_err();
        assert!(matches!(err, Error::Inconsistent(_)));
    }

    #[test]
    fn clause_log_stays_satisfiable_under_legal_play() {
        let mut kb = KnowledgeBase::new(&spec_2x2()).unwrap();
        // Tiger at (1, 1), everything else free land except sea at (1, 0).
        kb.add_observation(&reveal((0, 0), Terrain::Land, [1, 0, 0])).unwrap();
        kb.add_observation(&reveal((0, 1), Terrain::Land, [1, 0, 0])).unwrap();
        kb.add_observation(&reveal((1, 0), Terrain::Sea, [1, 0, 0])).unwrap();
        kb.add_observation(&mark((1, 1), Terrain::Land, Species::Tiger)).unwrap();

        let mut oracle = VarisatOracle::new();
        oracle.add_clauses(kb.clauses());
        assert!(matches!(oracle.solve(&[]).unwrap(), SolveResult::Sat(_)));
        // Every model agrees that (1, 1) is the tiger.
        let tiger = kb.lit(kb.index(1, 1), Label::Tiger);
        assert!(matches!(oracle.solve(&[-tiger]).unwrap(), SolveResult::Unsat));
    }

    #[test]
    fn observation_round_trips_through_json() {
        let obs = reveal((2, 3), Terrain::Sea, [0, 2, 1]);
        let json = serde_json::to_string(&obs).unwrap();
        assert!(json.contains("\"sea\""));
        assert_eq!(serde_json::from_str::<Observation>(&json).unwrap(), obs);

        let bare: Observation =
            serde_json::from_str(r#"{"pos":[0,1],"field":"land"}"#).unwrap();
        assert_eq!(bare.prox_count, None);
        assert_eq!(bare.animal, None);

        let guessed: Observation =
            serde_json::from_str(r#"{"pos":[0,1],"field":"land","animal":"T"}"#).unwrap();
        assert_eq!(guessed.animal, Some(Species::Tiger));
    }
}
