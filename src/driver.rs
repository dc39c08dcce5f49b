use std::path::PathBuf;
use std::time::{Duration, Instant};

use anyhow::{Result, anyhow};
use log::{error, info, warn};
use serde::Deserialize;

use crate::engine::{Action, Agent};
use crate::knowledge::{GridSpec, Observation, Species};

/// Server verdict on a move: game continues, grid won, grid lost, or the
/// server is done handing out grids.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
pub enum Status {
    #[serde(rename = "OK")]
    Ok,
    #[serde(rename = "GG")]
    Gg,
    #[serde(rename = "KO")]
    Ko,
    #[serde(rename = "Err")]
    Err,
}

/// Grid announcement: dimensions (`m` rows by `n` columns), declared totals
/// and the opening position.
#[derive(Debug, Clone, Deserialize)]
pub struct GridInfo {
    pub m: usize,
    pub n: usize,
    pub tiger_count: u32,
    pub shark_count: u32,
    pub croco_count: u32,
    pub land_count: u32,
    pub sea_count: u32,
    pub start: (usize, usize),
}

impl GridInfo {
    pub fn spec(&self) -> GridSpec {
        GridSpec {
            height: self.m,
            width: self.n,
            tiger_count: self.tiger_count,
            shark_count: self.shark_count,
            croco_count: self.croco_count,
            land_count: self.land_count,
            sea_count: self.sea_count,
        }
    }
}

pub type ServerReply = (Status, String, Vec<Observation>);

/// The game server as seen by the agent; implemented over HTTP by
/// [`crate::client::CrocomineClient`]. Transport failures are `Err` results
/// and end the session; in-game failures travel in [`Status`].
pub trait GameServer {
    fn new_grid(&mut self) -> Result<(Status, String, Option<GridInfo>)>;
    fn discover(&mut self, row: usize, col: usize) -> Result<ServerReply>;
    fn guess(&mut self, row: usize, col: usize, species: Species) -> Result<ServerReply>;
    fn chord(&mut self, row: usize, col: usize) -> Result<ServerReply>;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GridOutcome {
    Won,
    Lost,
    /// The engine reported no possible move before the server ended the grid.
    Stalled,
    /// The agent's knowledge broke down (inconsistency or solver failure);
    /// the grid is abandoned, the session continues.
    Aborted,
}

#[derive(Debug, Default)]
pub struct SessionStats {
    pub grids: usize,
    pub wins: usize,
    pub losses: usize,
    pub stalled: usize,
    pub aborted: usize,
    pub moves: u64,
    pub elapsed: Duration,
}

#[derive(Debug, Default)]
pub struct RunConfig {
    /// Seed for the agent's tie-breaking random source.
    pub seed: u64,
    /// Dump the clause log of every non-won grid to this DIMACS file.
    pub cnf_file: Option<PathBuf>,
}

/// Plays grids until the server reports `Err`, one fresh agent per grid.
pub fn run<S: GameServer>(server: &mut S, config: &RunConfig) -> Result<SessionStats> {
    let mut stats = SessionStats::default();
    let session_start = Instant::now();
    loop {
        let (status, msg, info) = server.new_grid()?;
        if status == Status::Err {
            info!("server closed the session: {msg}");
            break;
        }
        let info = info.ok_or_else(|| anyhow!("grid announced without grid info"))?;
        info!(
            "grid '{msg}': {}x{}, {}T {}S {}C",
            info.m, info.n, info.tiger_count, info.shark_count, info.croco_count
        );
        stats.grids += 1;
        let (outcome, moves) = play_grid(server, &info, config)?;
        stats.moves += moves;
        match outcome {
            GridOutcome::Won => stats.wins += 1,
            GridOutcome::Lost => stats.losses += 1,
            GridOutcome::Stalled => stats.stalled += 1,
            GridOutcome::Aborted => stats.aborted += 1,
        }
    }
    stats.elapsed = session_start.elapsed();
    Ok(stats)
}

fn play_grid<S: GameServer>(
    server: &mut S,
    info: &GridInfo,
    config: &RunConfig,
) -> Result<(GridOutcome, u64)> {
    let grid_start = Instant::now();
    let mut agent = match Agent::new(&info.spec(), config.seed) {
        Ok(agent) => agent,
        Err(e) => {
            error!("rejecting grid: {e}");
            return Ok((GridOutcome::Aborted, 0));
        }
    };
    let (mut status, mut msg, mut infos) = server.discover(info.start.0, info.start.1)?;
    let mut moves: u64 = 0;
    let outcome = loop {
        match status {
            Status::Gg => break GridOutcome::Won,
            Status::Ko => break GridOutcome::Lost,
            Status::Err => {
                warn!("server error mid-grid: {msg}");
                break GridOutcome::Aborted;
            }
            Status::Ok => {}
        }
        let action = match agent.observe(&infos).and_then(|()| agent.decide()) {
            Ok(action) => action,
            Err(e) => {
                error!("abandoning grid: {e}");
                break GridOutcome::Aborted;
            }
        };
        moves += 1;
        (status, msg, infos) = match action {
            Action::Discover((row, col)) => server.discover(row, col)?,
            Action::Guess((row, col), sp) => server.guess(row, col, sp)?,
            Action::Chord((row, col)) => server.chord(row, col)?,
            Action::NoMove => break GridOutcome::Stalled,
        };
    };
    if outcome != GridOutcome::Won {
        if let Some(path) = &config.cnf_file {
            let kb = agent.kb();
            if let Err(e) = crate::write_clauses(path, kb.codec(), kb.clauses()) {
                warn!("could not dump clauses: {e}");
            }
        }
    }
    info!("{outcome:?} in {moves} moves ({:.2?})", grid_start.elapsed());
    Ok((outcome, moves))
}
