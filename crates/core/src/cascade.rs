//! Cascade engine - the grid state machine
//!
//! ```text
//!            request_swap (accepted)
//!   Idle ─────────────────────────────▶ Resolving
//!    ▲                                     │ tick
//!    │        no match left                ▼
//!    └──────────────────────────────── Settling ──▶ rescan ──▶ Resolving ...
//!    │
//!    └──▶ GameOver(TimeUp | NoMoves)
//! ```
//!
//! A swap is scored the moment it is accepted. Everything after that happens
//! in [`CascadeEngine::tick`]: atomic effects and the cascades they cause
//! resolve to a fixed point within one call, while a snake clears one path
//! cell per `SNAKE_STEP_DELAY_MS`. Every scored step is reported as a
//! [`StepEvent`] carrying a copy of the grid, so the presentation layer can
//! animate at its own pace using the `duration_ms` hints.

use serde::{Deserialize, Serialize};
use tracing::{debug, info, trace, warn};

use crate::catalog::{CatalogDraw, DropInSchedule, TokenSource};
use crate::config::EngineConfig;
use crate::effects::{resolve_bomb, resolve_color_clear, snake_path, SnakePath};
use crate::error::ConfigError;
use crate::grid::Grid;
use crate::matcher::{find_matches, has_any_match, union_cells};
use crate::rng::SimpleRng;
use crate::scoring::{score_groups, time_bonus_ms, BIG_CHAIN_LEN};
use crate::snapshot::{GameSnapshot, GridSnapshot};
use crate::swap::{classify_swap, find_move, has_moves, RejectReason, SwapClass};
use crate::types::{
    BombOrientation, Coord, Difficulty, GameOverReason, TokenValue, GRID_COLS,
    HIGHLIGHT_DELAY_MS, MAX_CASCADE_STEPS, SNAKE_PATH_LEN, SNAKE_STEP_DELAY_MS,
};

/// Fresh grids tried before falling back to the fixed pattern
const RESET_ATTEMPTS: u32 = 32;
/// Redraw passes over matched cells per fresh grid
const REPAIR_PASSES: u32 = 64;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum EngineState {
    #[default]
    Idle,
    /// Cells are highlighted and waiting to be removed
    Resolving,
    /// Gravity and refill in progress
    Settling,
    GameOver(GameOverReason),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum EffectKind {
    Match,
    Bomb(BombOrientation),
    /// Carries the cleared color
    ColorClear(u8),
    Snake,
}

impl EffectKind {
    pub fn is_special(&self) -> bool {
        !matches!(self, EffectKind::Match)
    }
}

/// What an accepted swap set in motion
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct EffectDescription {
    pub kind: EffectKind,
    /// Cells to be cleared; the full path for a snake
    pub cells: Vec<Coord>,
    pub score_delta: u32,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub enum SwapOutcome {
    Rejected(RejectReason),
    Accepted(EffectDescription),
}

impl SwapOutcome {
    pub fn is_accepted(&self) -> bool {
        matches!(self, SwapOutcome::Accepted(_))
    }
}

/// One highlighted step, emitted before its cells are removed
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct StepEvent {
    pub kind: EffectKind,
    pub groups: Vec<Vec<Coord>>,
    pub group_sizes: Vec<usize>,
    pub is_special: bool,
    pub score_delta: u32,
    /// Some group has five or more cells
    pub big_chain: bool,
    /// 1 for the step caused by the swap itself, +1 per cascade
    pub chain: u32,
    /// How long the presentation layer should hold the highlight
    pub duration_ms: u32,
    pub grid: GridSnapshot,
}

/// Final result of a round, keyed by difficulty for high-score tables
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct RoundReport {
    pub difficulty: Difficulty,
    pub score: u32,
    pub reason: GameOverReason,
}

impl RoundReport {
    pub fn difficulty_key(&self) -> &'static str {
        self.difficulty.as_str()
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub enum EngineEvent {
    Step(StepEvent),
    GameOver(RoundReport),
}

#[derive(Debug, Clone, Default)]
enum Pending {
    #[default]
    None,
    Atomic(Vec<Coord>),
    Snake {
        path: SnakePath,
        next: usize,
        elapsed_ms: u32,
    },
}

/// Match-3 grid engine
///
/// The token source is injectable; the default draws from the seeded catalog.
#[derive(Debug)]
pub struct CascadeEngine<S = CatalogDraw> {
    config: EngineConfig,
    source: S,
    drops: DropInSchedule,
    /// Snake walks, drop-in columns and picks
    rng: SimpleRng,
    grid: Grid,
    state: EngineState,
    pending: Pending,
    score: u32,
    remaining_ms: Option<u32>,
    round: u32,
    swaps: u32,
    chain: u32,
    /// Set when the grid changed outside a cascade and needs a deadlock check
    check_moves: bool,
    events: Vec<EngineEvent>,
}

impl CascadeEngine<CatalogDraw> {
    /// Engine drawing refills from the catalog, seeded by `config.seed`
    pub fn new(config: EngineConfig) -> Result<Self, ConfigError> {
        let source = CatalogDraw::new(config.seed, config.color_count);
        Self::with_source(config, source)
    }
}

impl<S: TokenSource> CascadeEngine<S> {
    /// Engine with an injected token source. Starts the first round.
    pub fn with_source(config: EngineConfig, source: S) -> Result<Self, ConfigError> {
        let mut engine = Self::build(config, source, Grid::new())?;
        engine.reset();
        Ok(engine)
    }

    /// Engine over a prepared grid, round already running.
    ///
    /// The grid is used as given; the first `tick` checks it for deadlock.
    pub fn from_grid(config: EngineConfig, source: S, grid: Grid) -> Result<Self, ConfigError> {
        let mut engine = Self::build(config, source, grid)?;
        engine.round = 1;
        engine.check_moves = true;
        Ok(engine)
    }

    fn build(config: EngineConfig, source: S, grid: Grid) -> Result<Self, ConfigError> {
        config.validate()?;
        Ok(Self {
            config,
            source,
            drops: DropInSchedule::new(),
            rng: SimpleRng::new(config.seed.rotate_left(16) ^ 0x9e37_79b9),
            grid,
            state: EngineState::Idle,
            pending: Pending::None,
            score: 0,
            remaining_ms: config.difficulty.duration_ms(),
            round: 0,
            swaps: 0,
            chain: 0,
            check_moves: false,
            events: Vec::new(),
        })
    }

    /// Start a new round: fresh playable grid, zero score, full clock.
    pub fn reset(&mut self) {
        self.source.reset();
        self.drops.reset();
        self.score = 0;
        self.swaps = 0;
        self.chain = 0;
        self.pending = Pending::None;
        self.state = EngineState::Idle;
        self.remaining_ms = self.config.difficulty.duration_ms();
        self.round = self.round.wrapping_add(1);
        self.events.clear();
        self.grid = self.fresh_grid();
        self.check_moves = false;
        info!(
            round = self.round,
            difficulty = self.config.difficulty.as_str(),
            "round started"
        );
    }

    fn fresh_grid(&mut self) -> Grid {
        let color_count = self.config.color_count;
        for attempt in 0..RESET_ATTEMPTS {
            let mut grid = Grid::new();
            let source = &mut self.source;
            grid.gravity_refill(|| source.draw(0));

            for _ in 0..REPAIR_PASSES {
                let groups = find_matches(&grid, color_count);
                if groups.is_empty() {
                    break;
                }
                for cell in union_cells(&groups) {
                    let _ = grid.set(cell, source.draw(0));
                }
            }

            if !has_any_match(&grid, color_count) && has_moves(&grid, color_count) {
                return grid;
            }
            debug!(attempt, "discarding unplayable grid");
        }
        warn!("token source never produced a playable grid; using the fixed pattern");
        fallback_grid()
    }

    /// Submit a swap between two cells.
    ///
    /// Accepted swaps are committed and their first step scored immediately;
    /// removal happens on the next [`tick`](Self::tick).
    pub fn request_swap(&mut self, a: Coord, b: Coord) -> SwapOutcome {
        match self.state {
            EngineState::GameOver(_) => return SwapOutcome::Rejected(RejectReason::RoundOver),
            EngineState::Idle => {}
            _ => return SwapOutcome::Rejected(RejectReason::EngineBusy),
        }

        let color_count = self.config.color_count;
        let class = classify_swap(&mut self.grid, a, b, color_count);
        if let SwapClass::Rejected(reason) = class {
            debug!(?a, ?b, reason = reason.code(), "swap rejected");
            return SwapOutcome::Rejected(reason);
        }
        if self.grid.swap(a, b).is_err() {
            return SwapOutcome::Rejected(RejectReason::InvalidSwap);
        }
        self.swaps += 1;
        self.chain = 1;
        self.state = EngineState::Resolving;

        let description = match class {
            SwapClass::Match => {
                let groups = find_matches(&self.grid, color_count);
                let step = score_groups(&groups);
                let cells = union_cells(&groups);
                self.award(EffectKind::Match, step.total);
                let groups = groups.iter().map(|g| g.cells().to_vec()).collect();
                self.emit_step(
                    EffectKind::Match,
                    groups,
                    step.total,
                    step.big_chain,
                    HIGHLIGHT_DELAY_MS,
                );
                self.pending = Pending::Atomic(cells.clone());
                EffectDescription {
                    kind: EffectKind::Match,
                    cells,
                    score_delta: step.total,
                }
            }
            SwapClass::Bomb { orientation, dest } => {
                let effect = resolve_bomb(orientation, dest);
                self.atomic_effect(EffectKind::Bomb(orientation), effect.cells, effect.score)
            }
            SwapClass::ColorClear { color, dest } => {
                let effect = resolve_color_clear(&self.grid, color, dest);
                self.atomic_effect(EffectKind::ColorClear(color), effect.cells, effect.score)
            }
            SwapClass::Snake { dest } => {
                let path = snake_path(&mut self.rng, dest, SNAKE_PATH_LEN);
                let cells = path.to_vec();
                if let Some(&head) = path.first() {
                    self.emit_step(EffectKind::Snake, vec![vec![head]], 0, false, SNAKE_STEP_DELAY_MS);
                }
                self.pending = Pending::Snake {
                    path,
                    next: 0,
                    elapsed_ms: 0,
                };
                EffectDescription {
                    kind: EffectKind::Snake,
                    cells,
                    score_delta: 0,
                }
            }
            SwapClass::Rejected(reason) => return SwapOutcome::Rejected(reason),
        };

        debug!(
            ?a,
            ?b,
            kind = ?description.kind,
            cells = description.cells.len(),
            score = self.score,
            "swap accepted"
        );
        SwapOutcome::Accepted(description)
    }

    fn atomic_effect(&mut self, kind: EffectKind, cells: Vec<Coord>, score: u32) -> EffectDescription {
        self.award(kind, score);
        let big_chain = cells.len() >= BIG_CHAIN_LEN;
        self.emit_step(kind, vec![cells.clone()], score, big_chain, HIGHLIGHT_DELAY_MS);
        self.pending = Pending::Atomic(cells.clone());
        EffectDescription {
            kind,
            cells,
            score_delta: score,
        }
    }

    /// Advance the round clock and any pending resolution.
    ///
    /// Returns true if the grid changed.
    pub fn tick(&mut self, elapsed_ms: u32) -> bool {
        if matches!(self.state, EngineState::GameOver(_)) {
            return false;
        }

        if let Some(remaining) = self.remaining_ms {
            let remaining = remaining.saturating_sub(elapsed_ms);
            self.remaining_ms = Some(remaining);
            if remaining == 0 {
                // A snake cut short leaves holes behind
                let refilled = if self.grid.is_full() { 0 } else { self.refill() };
                self.finish(GameOverReason::TimeUp);
                return refilled > 0;
            }
        }

        match std::mem::take(&mut self.pending) {
            Pending::None => {
                if self.state == EngineState::Idle && self.check_moves {
                    self.check_moves = false;
                    self.check_deadlock();
                }
                false
            }
            Pending::Atomic(cells) => {
                self.cascade(cells);
                true
            }
            Pending::Snake {
                path,
                next,
                elapsed_ms: waited,
            } => {
                let waited = waited.saturating_add(elapsed_ms);
                if waited < SNAKE_STEP_DELAY_MS {
                    self.pending = Pending::Snake {
                        path,
                        next,
                        elapsed_ms: waited,
                    };
                    return false;
                }

                if let Some(cell) = path.get(next) {
                    self.grid.remove_cells(std::slice::from_ref(cell));
                }
                let next = next + 1;
                match path.get(next).copied() {
                    Some(head) => {
                        self.emit_step(EffectKind::Snake, vec![vec![head]], 0, false, SNAKE_STEP_DELAY_MS);
                        self.pending = Pending::Snake {
                            path,
                            next,
                            elapsed_ms: 0,
                        };
                    }
                    None => self.cascade(Vec::new()),
                }
                true
            }
        }
    }

    /// Remove, settle, rescan until the grid is quiet.
    fn cascade(&mut self, mut cells: Vec<Coord>) {
        let color_count = self.config.color_count;
        let mut steps = 0;

        loop {
            self.state = EngineState::Resolving;
            self.grid.remove_cells(&cells);
            self.settle();

            let groups = find_matches(&self.grid, color_count);
            if groups.is_empty() {
                break;
            }
            steps += 1;
            if steps >= MAX_CASCADE_STEPS {
                warn!(steps, score = self.score, "cascade cap reached, leaving matches in place");
                break;
            }

            self.chain += 1;
            let step = score_groups(&groups);
            self.award(EffectKind::Match, step.total);
            cells = union_cells(&groups);
            debug!(
                chain = self.chain,
                groups = groups.len(),
                cells = cells.len(),
                score_delta = step.total,
                "cascade step"
            );
            let groups = groups.iter().map(|g| g.cells().to_vec()).collect();
            self.emit_step(
                EffectKind::Match,
                groups,
                step.total,
                step.big_chain,
                HIGHLIGHT_DELAY_MS,
            );
        }

        self.state = EngineState::Idle;
        self.check_deadlock();
    }

    /// Gravity, refill, then any scheduled drop-in.
    fn settle(&mut self) {
        self.state = EngineState::Settling;
        self.refill();

        if self.drops.take_due() {
            let col = self.rng.next_range(GRID_COLS as u32) as i8;
            let token = self.drops.pick(&mut self.rng);
            match self.grid.shift_column_down(col, token) {
                Ok(dropped) => debug!(
                    col,
                    token = %token.glyph(),
                    dropped = %dropped.glyph(),
                    "power token dropped in"
                ),
                Err(err) => warn!(%err, "drop-in skipped"),
            }
        }
    }

    fn refill(&mut self) -> usize {
        let score = self.score;
        let source = &mut self.source;
        let refilled = self.grid.gravity_refill(|| source.draw(score));
        trace!(refilled, score, "grid refilled");
        refilled
    }

    fn check_deadlock(&mut self) {
        if !has_moves(&self.grid, self.config.color_count) {
            self.finish(GameOverReason::NoMoves);
        }
    }

    /// Add a step's points, feeding the drop-in schedule and round clock.
    ///
    /// Color-clear steps only add points.
    fn award(&mut self, kind: EffectKind, points: u32) {
        if points == 0 {
            return;
        }
        self.score = self.score.saturating_add(points);
        if matches!(kind, EffectKind::ColorClear(_)) {
            return;
        }
        self.drops.record_step(self.score);

        let full = self.config.difficulty.duration_ms();
        let secs = self.config.difficulty.duration_secs();
        if let (Some(remaining), Some(full), Some(secs)) = (self.remaining_ms, full, secs) {
            self.remaining_ms = Some(remaining.saturating_add(time_bonus_ms(secs)).min(full));
        }
    }

    fn emit_step(
        &mut self,
        kind: EffectKind,
        groups: Vec<Vec<Coord>>,
        score_delta: u32,
        big_chain: bool,
        duration_ms: u32,
    ) {
        let group_sizes = groups.iter().map(Vec::len).collect();
        self.events.push(EngineEvent::Step(StepEvent {
            kind,
            groups,
            group_sizes,
            is_special: kind.is_special(),
            score_delta,
            big_chain,
            chain: self.chain,
            duration_ms,
            grid: GridSnapshot::capture(&self.grid),
        }));
    }

    fn finish(&mut self, reason: GameOverReason) {
        if matches!(self.state, EngineState::GameOver(_)) {
            return;
        }
        self.state = EngineState::GameOver(reason);
        self.pending = Pending::None;
        let report = RoundReport {
            difficulty: self.config.difficulty,
            score: self.score,
            reason,
        };
        info!(
            round = self.round,
            score = self.score,
            reason = reason.as_str(),
            swaps = self.swaps,
            "round over"
        );
        self.events.push(EngineEvent::GameOver(report));
    }

    /// Take every event emitted since the last call
    pub fn drain_events(&mut self) -> Vec<EngineEvent> {
        std::mem::take(&mut self.events)
    }

    pub fn grid(&self) -> &Grid {
        &self.grid
    }

    pub fn score(&self) -> u32 {
        self.score
    }

    pub fn state(&self) -> EngineState {
        self.state
    }

    pub fn is_idle(&self) -> bool {
        self.state == EngineState::Idle
    }

    pub fn game_over(&self) -> bool {
        matches!(self.state, EngineState::GameOver(_))
    }

    pub fn game_over_reason(&self) -> Option<GameOverReason> {
        match self.state {
            EngineState::GameOver(reason) => Some(reason),
            _ => None,
        }
    }

    /// `None` in untimed rounds
    pub fn remaining_ms(&self) -> Option<u32> {
        self.remaining_ms
    }

    pub fn difficulty(&self) -> Difficulty {
        self.config.difficulty
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    pub fn round(&self) -> u32 {
        self.round
    }

    pub fn swaps(&self) -> u32 {
        self.swaps
    }

    pub fn source(&self) -> &S {
        &self.source
    }

    /// Present once the round is over
    pub fn report(&self) -> Option<RoundReport> {
        self.game_over_reason().map(|reason| RoundReport {
            difficulty: self.config.difficulty,
            score: self.score,
            reason,
        })
    }

    /// First legal swap, if the engine is ready for one
    pub fn hint(&self) -> Option<(Coord, Coord)> {
        if !self.is_idle() {
            return None;
        }
        find_move(&self.grid, self.config.color_count)
    }

    pub fn snapshot_into(&self, out: &mut GameSnapshot) {
        out.grid = GridSnapshot::capture(&self.grid);
        out.score = self.score;
        out.state = self.state;
        out.remaining_ms = self.remaining_ms;
        out.difficulty = self.config.difficulty;
        out.round = self.round;
        out.swaps = self.swaps;
        out.game_over = self.game_over();
    }

    pub fn snapshot(&self) -> GameSnapshot {
        let mut s = GameSnapshot::default();
        self.snapshot_into(&mut s);
        s
    }
}

/// Diagonal three-color stripes with one cell changed so that swapping
/// (0, 1) and (0, 2) completes a run. Match-free for any catalog size.
fn fallback_grid() -> Grid {
    let mut grid = Grid::new();
    for coord in Grid::coords() {
        let color = ((coord.row + 2 * coord.col) % 3) as u8;
        let _ = grid.set(coord, TokenValue::Normal(color));
    }
    let _ = grid.set(Coord::new(0, 3), TokenValue::Normal(2));
    grid
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::TICK_MS;

    fn cycling_source() -> impl FnMut(u32) -> TokenValue {
        let mut n = 0u8;
        move |_: u32| {
            n = n.wrapping_add(1);
            TokenValue::Normal(n % 6)
        }
    }

    #[test]
    fn test_new_engine_starts_playable() {
        let engine = CascadeEngine::new(EngineConfig::default().with_seed(7)).unwrap();
        assert_eq!(engine.state(), EngineState::Idle);
        assert_eq!(engine.round(), 1);
        assert_eq!(engine.score(), 0);
        assert!(!has_any_match(engine.grid(), 6));
        assert!(engine.hint().is_some());
        assert_eq!(engine.remaining_ms(), Some(110_000));
    }

    #[test]
    fn test_invalid_config_is_rejected() {
        let config = EngineConfig::default().with_color_count(1);
        assert_eq!(
            CascadeEngine::new(config).err(),
            Some(ConfigError::ColorCount(1))
        );
    }

    #[test]
    fn test_fallback_grid_is_playable() {
        let grid = fallback_grid();
        for colors in 3..=8 {
            assert!(!has_any_match(&grid, colors));
            assert!(has_moves(&grid, colors));
        }
    }

    #[test]
    fn test_constant_source_falls_back() {
        let engine =
            CascadeEngine::with_source(EngineConfig::default(), |_: u32| TokenValue::Normal(0)).unwrap();
        assert_eq!(engine.grid(), &fallback_grid());
    }

    #[test]
    fn test_swap_scores_immediately_then_resolves_on_tick() {
        let mut engine =
            CascadeEngine::from_grid(EngineConfig::default(), cycling_source(), fallback_grid())
                .unwrap();
        let outcome = engine.request_swap(Coord::new(0, 1), Coord::new(0, 2));
        let SwapOutcome::Accepted(effect) = outcome else {
            panic!("expected an accepted swap, got {:?}", outcome);
        };
        assert_eq!(effect.kind, EffectKind::Match);
        assert_eq!(effect.score_delta, 15);
        assert_eq!(engine.score(), 15);
        assert_eq!(engine.state(), EngineState::Resolving);

        // Busy until ticked
        assert_eq!(
            engine.request_swap(Coord::new(5, 5), Coord::new(5, 6)),
            SwapOutcome::Rejected(RejectReason::EngineBusy)
        );

        assert!(engine.tick(TICK_MS));
        assert!(engine.is_idle() || engine.game_over());
        assert!(engine.grid().is_full());

        let events = engine.drain_events();
        let EngineEvent::Step(first) = &events[0] else {
            panic!("first event should be the swap step");
        };
        assert_eq!(first.chain, 1);
        assert_eq!(first.group_sizes, vec![3]);
        assert!(!first.is_special);
        assert_eq!(first.duration_ms, HIGHLIGHT_DELAY_MS);
    }

    #[test]
    fn test_time_runs_out() {
        let config = EngineConfig::default().with_difficulty(Difficulty::Hard);
        let mut engine = CascadeEngine::new(config).unwrap();
        assert!(!engine.tick(59_999));
        assert!(!engine.game_over());
        engine.tick(1);
        assert_eq!(engine.state(), EngineState::GameOver(GameOverReason::TimeUp));
        assert_eq!(
            engine.report(),
            Some(RoundReport {
                difficulty: Difficulty::Hard,
                score: 0,
                reason: GameOverReason::TimeUp
            })
        );
        let overs = engine
            .drain_events()
            .into_iter()
            .filter(|e| matches!(e, EngineEvent::GameOver(_)))
            .count();
        assert_eq!(overs, 1);

        engine.tick(1000);
        assert!(engine.drain_events().is_empty());
    }

    #[test]
    fn test_free_play_has_no_clock() {
        let config = EngineConfig::default().with_difficulty(Difficulty::FreePlay);
        let mut engine = CascadeEngine::new(config).unwrap();
        assert_eq!(engine.remaining_ms(), None);
        engine.tick(10_000_000);
        assert!(!engine.game_over());
    }

    #[test]
    fn test_time_bonus_is_capped() {
        let mut engine =
            CascadeEngine::from_grid(EngineConfig::default(), cycling_source(), fallback_grid())
                .unwrap();
        engine.tick(10_000);
        assert_eq!(engine.remaining_ms(), Some(100_000));
        engine.drain_events();
        assert!(engine.request_swap(Coord::new(0, 1), Coord::new(0, 2)).is_accepted());
        assert_eq!(engine.remaining_ms(), Some(101_650));

        let mut engine =
            CascadeEngine::from_grid(EngineConfig::default(), cycling_source(), fallback_grid())
                .unwrap();
        assert!(engine.request_swap(Coord::new(0, 1), Coord::new(0, 2)).is_accepted());
        assert_eq!(engine.remaining_ms(), Some(110_000));
    }

    #[test]
    fn test_color_clear_earns_no_time_bonus_or_drop_in_step() {
        let mut grid = fallback_grid();
        grid.set(Coord::new(4, 4), TokenValue::ColorClear).unwrap();
        let mut engine =
            CascadeEngine::from_grid(EngineConfig::default(), cycling_source(), grid).unwrap();
        engine.drops.record_step(1500);
        engine.tick(10_000);

        let outcome = engine.request_swap(Coord::new(4, 4), Coord::new(4, 5));
        assert!(outcome.is_accepted());
        assert_eq!(engine.score(), 540);
        assert_eq!(engine.remaining_ms(), Some(100_000));

        // 39 more counted steps would make a drop-in due only if the
        // color-clear had counted too
        for _ in 0..39 {
            engine.drops.record_step(1500);
        }
        assert!(!engine.drops.take_due());
    }

    #[test]
    fn test_reset_starts_new_round() {
        let mut engine = CascadeEngine::new(EngineConfig::default().with_seed(3)).unwrap();
        let (a, b) = engine.hint().unwrap();
        assert!(engine.request_swap(a, b).is_accepted());
        engine.tick(TICK_MS);
        engine.reset();
        assert_eq!(engine.round(), 2);
        assert_eq!(engine.score(), 0);
        assert_eq!(engine.swaps(), 0);
        assert!(engine.is_idle());
        assert!(engine.drain_events().is_empty());
    }

    #[test]
    fn test_due_drop_in_lands_on_top_row() {
        let mut engine =
            CascadeEngine::from_grid(EngineConfig::default(), cycling_source(), fallback_grid())
                .unwrap();
        engine.drops.record_step(1500);
        for _ in 0..40 {
            engine.drops.record_step(1500);
        }
        engine.settle();

        let top: Vec<TokenValue> = (0..GRID_COLS as i8)
            .filter_map(|col| engine.grid().cell(Coord::new(0, col)))
            .filter(|t| t.is_power())
            .collect();
        assert_eq!(top.len(), 1);
        assert!(matches!(top[0], TokenValue::Bomb(_)));
        assert!(engine.grid().is_full());
        assert!(!engine.drops.take_due());
    }

    #[test]
    fn test_endless_cascade_is_capped() {
        let mut engine = CascadeEngine::from_grid(
            EngineConfig::default().with_difficulty(Difficulty::FreePlay),
            |_: u32| TokenValue::Normal(0),
            fallback_grid(),
        )
        .unwrap();
        assert!(engine.request_swap(Coord::new(0, 1), Coord::new(0, 2)).is_accepted());
        assert!(engine.tick(TICK_MS));
        assert!(engine.is_idle());

        let steps = engine
            .drain_events()
            .iter()
            .filter(|e| matches!(e, EngineEvent::Step(_)))
            .count();
        assert_eq!(steps, MAX_CASCADE_STEPS as usize);
        // Matches were left in place, so the grid is still playable
        assert!(has_any_match(engine.grid(), 6));
    }

    #[test]
    fn test_snapshot_reflects_engine() {
        let engine = CascadeEngine::new(EngineConfig::default().with_seed(11)).unwrap();
        let snap = engine.snapshot();
        assert_eq!(snap.score, 0);
        assert_eq!(snap.state, EngineState::Idle);
        assert_eq!(snap.round, 1);
        assert!(snap.playable());
        assert_eq!(snap.grid, GridSnapshot::capture(engine.grid()));

        let json = serde_json::to_string(&snap).unwrap();
        assert!(json.contains("\"difficulty\":\"Normal\""));
    }
}
