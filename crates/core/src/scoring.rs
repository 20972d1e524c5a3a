//! Scoring module - points per matched group and round-clock bonus
//!
//! Points grow linearly with group length, with a steeper slope once a
//! group reaches five cells:
//! - `len < 3`: 0
//! - `3..5`: `15 + (len - 3) * 15`
//! - `len >= 5`: `20 + (len - 3) * 20`
//!
//! Every group of a step is scored on its own; overlapping groups both count.

use crate::matcher::MatchGroup;
use crate::types::{MIN_RUN, TIME_BONUS_MS_PER_DURATION_SEC};

/// Length at which a group counts as a big chain
pub const BIG_CHAIN_LEN: usize = 5;

/// Score of one step
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct StepScore {
    pub total: u32,
    /// Any group of `BIG_CHAIN_LEN` or more cells
    pub big_chain: bool,
}

/// Points for a single group (or effect) of `len` cells
pub fn score_for_chain(len: usize) -> u32 {
    if len < MIN_RUN {
        return 0;
    }
    let extra = (len - MIN_RUN) as u32;
    if len < BIG_CHAIN_LEN {
        15 + extra * 15
    } else {
        20 + extra * 20
    }
}

pub fn score_groups(groups: &[MatchGroup]) -> StepScore {
    groups.iter().fold(StepScore::default(), |acc, group| StepScore {
        total: acc.total.saturating_add(score_for_chain(group.len())),
        big_chain: acc.big_chain || group.len() >= BIG_CHAIN_LEN,
    })
}

/// Milliseconds added to the round clock per scoring step
pub fn time_bonus_ms(duration_secs: u32) -> u32 {
    duration_secs.saturating_mul(TIME_BONUS_MS_PER_DURATION_SEC)
}
