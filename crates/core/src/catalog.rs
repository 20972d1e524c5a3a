//! Token catalog - classification and score-gated draw policy
//!
//! The catalog is static: every token kind is a [`TokenValue`] variant, and
//! [`TokenClass`] is the single place that decides how a kind behaves in a
//! scan. Refill draws go through the [`TokenSource`] trait so tests and
//! replays can inject their own sequence.

use arrayvec::ArrayVec;

use crate::rng::SimpleRng;
use crate::types::{
    BombOrientation, TokenValue, COLOR_CLEAR_UNLOCK_SCORE, DROP_IN_INTERVAL_STEPS,
    DROP_IN_UNLOCK_SCORE, MAX_COLOR_COUNT, NORMAL_COLOR_WEIGHT, RARE_DRAW_PERCENT,
    RARE_UNLOCK_SCORE, SNAKE_UNLOCK_SCORE, WILDCARD_UNLOCK_SCORE,
};

/// How a token behaves during match scanning
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TokenClass {
    Empty,
    /// Plain color inside the catalog
    Color(u8),
    Wildcard,
    ColorClear,
    /// Bomb or snake
    Power,
    /// Reserved or out-of-catalog value
    Blocker,
}

impl TokenClass {
    pub fn of(token: TokenValue, color_count: u8) -> Self {
        match token {
            TokenValue::Empty => TokenClass::Empty,
            TokenValue::Normal(c) if c < color_count => TokenClass::Color(c),
            TokenValue::Normal(_) | TokenValue::Blocker => TokenClass::Blocker,
            TokenValue::Wildcard => TokenClass::Wildcard,
            TokenValue::ColorClear => TokenClass::ColorClear,
            TokenValue::Bomb(_) | TokenValue::Snake => TokenClass::Power,
        }
    }

    /// Tokens that end a run in every scan mode
    pub fn terminates_run(&self) -> bool {
        matches!(
            self,
            TokenClass::Empty | TokenClass::ColorClear | TokenClass::Power | TokenClass::Blocker
        )
    }
}

/// Source of refill tokens, parameterized by the current score.
///
/// Implemented by [`CatalogDraw`] and by any `FnMut(u32) -> TokenValue`.
/// Implementations must never return `Empty` or `Blocker`.
pub trait TokenSource {
    fn draw(&mut self, score: u32) -> TokenValue;

    /// Called at the start of every round
    fn reset(&mut self) {}
}

impl<F> TokenSource for F
where
    F: FnMut(u32) -> TokenValue,
{
    fn draw(&mut self, score: u32) -> TokenValue {
        self(score)
    }
}

/// Special-token tier reached by the refill pool
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Default)]
pub enum UnlockTier {
    #[default]
    Base,
    Wildcard,
    ColorClear,
    Rare,
}

impl UnlockTier {
    pub fn for_score(score: u32) -> Self {
        if score >= RARE_UNLOCK_SCORE {
            UnlockTier::Rare
        } else if score >= COLOR_CLEAR_UNLOCK_SCORE {
            UnlockTier::ColorClear
        } else if score >= WILDCARD_UNLOCK_SCORE {
            UnlockTier::Wildcard
        } else {
            UnlockTier::Base
        }
    }
}

const POOL_CAPACITY: usize = MAX_COLOR_COUNT as usize * NORMAL_COLOR_WEIGHT + 3;

/// Seeded weighted draw over the catalog
///
/// Pool per draw: every normal color `NORMAL_COLOR_WEIGHT` times, plus one
/// entry per unlocked special. Tiers only ever go up until [`TokenSource::reset`].
#[derive(Debug, Clone)]
pub struct CatalogDraw {
    rng: SimpleRng,
    color_count: u8,
    tier: UnlockTier,
}

impl CatalogDraw {
    pub fn new(seed: u32, color_count: u8) -> Self {
        Self {
            rng: SimpleRng::new(seed),
            color_count: color_count.min(MAX_COLOR_COUNT),
            tier: UnlockTier::Base,
        }
    }

    pub fn tier(&self) -> UnlockTier {
        self.tier
    }

    pub fn color_count(&self) -> u8 {
        self.color_count
    }

    /// Drop back to the base pool. The rng keeps its position.
    pub fn reset_unlocks(&mut self) {
        self.tier = UnlockTier::Base;
    }

    fn pool(&mut self) -> ArrayVec<TokenValue, POOL_CAPACITY> {
        let mut pool = ArrayVec::new();
        for color in 0..self.color_count {
            for _ in 0..NORMAL_COLOR_WEIGHT {
                pool.push(TokenValue::Normal(color));
            }
        }
        if self.tier >= UnlockTier::Wildcard {
            pool.push(TokenValue::Wildcard);
        }
        if self.tier >= UnlockTier::ColorClear {
            pool.push(TokenValue::ColorClear);
        }
        if self.tier >= UnlockTier::Rare && self.rng.chance_percent(RARE_DRAW_PERCENT) {
            let orientation = self
                .rng
                .choose(&BombOrientation::ALL)
                .unwrap_or(BombOrientation::Cross);
            pool.push(TokenValue::Bomb(orientation));
        }
        pool
    }
}

impl TokenSource for CatalogDraw {
    fn draw(&mut self, score: u32) -> TokenValue {
        self.tier = self.tier.max(UnlockTier::for_score(score));
        let pool = self.pool();
        self.rng.choose(&pool).unwrap_or(TokenValue::Normal(0))
    }

    fn reset(&mut self) {
        self.reset_unlocks();
    }
}

/// Schedule for power tokens dropped into the top of a column
///
/// Bomb drop-ins unlock at `DROP_IN_UNLOCK_SCORE`; from then on every
/// `DROP_IN_INTERVAL_STEPS` scoring steps one is due. Snakes join the pool at
/// `SNAKE_UNLOCK_SCORE`.
#[derive(Debug, Clone, Default)]
pub struct DropInSchedule {
    bombs_unlocked: bool,
    snake_unlocked: bool,
    steps: u32,
}

impl DropInSchedule {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn reset(&mut self) {
        *self = Self::default();
    }

    pub fn bombs_unlocked(&self) -> bool {
        self.bombs_unlocked
    }

    pub fn snake_unlocked(&self) -> bool {
        self.snake_unlocked
    }

    /// Record one scoring step at the resulting score
    pub fn record_step(&mut self, score: u32) {
        if self.bombs_unlocked {
            self.steps += 1;
        } else if score >= DROP_IN_UNLOCK_SCORE {
            self.bombs_unlocked = true;
            self.steps = 0;
        }
        if score >= SNAKE_UNLOCK_SCORE {
            self.snake_unlocked = true;
        }
    }

    /// Consume a pending drop-in, if one is due
    pub fn take_due(&mut self) -> bool {
        if self.bombs_unlocked && self.steps >= DROP_IN_INTERVAL_STEPS {
            self.steps = 0;
            return true;
        }
        false
    }

    /// Pick the token to drop
    pub fn pick(&self, rng: &mut SimpleRng) -> TokenValue {
        let mut pool: ArrayVec<TokenValue, 4> = BombOrientation::ALL
            .iter()
            .map(|&o| TokenValue::Bomb(o))
            .collect();
        if self.snake_unlocked {
            pool.push(TokenValue::Snake);
        }
        rng.choose(&pool)
            .unwrap_or(TokenValue::Bomb(BombOrientation::Cross))
    }
}
