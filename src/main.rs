//! Headless Bubble Pop runner (default binary).
//!
//! Plays one seeded round by always taking the first legal swap, ticking the
//! engine at the fixed frame rate between moves, then prints the final grid
//! and a round summary. Configuration comes from the environment (see
//! `bubble_pop::config`); logging is controlled with `RUST_LOG`.

use anyhow::{Context, Result};
use serde::Serialize;
use tracing::{debug, info};
use tracing_subscriber::EnvFilter;

use bubble_pop::config::SimConfig;
use bubble_pop::core::{CascadeEngine, EngineEvent, GridSnapshot, SwapOutcome};
use bubble_pop::types::{GameOverReason, TICK_MS};

/// Ticks allowed for one swap to settle before giving up on the round
const MAX_SETTLE_TICKS: u32 = 10_000;

#[derive(Debug, Default, Serialize)]
struct RunSummary {
    seed: u32,
    difficulty: &'static str,
    score: u32,
    swaps: u32,
    steps: u32,
    special_steps: u32,
    big_chains: u32,
    longest_chain: u32,
    elapsed_ms: u64,
    reason: Option<GameOverReason>,
    grid: Vec<String>,
}

impl RunSummary {
    fn record(&mut self, events: Vec<EngineEvent>) {
        for event in events {
            match event {
                EngineEvent::Step(step) => {
                    self.steps += 1;
                    self.longest_chain = self.longest_chain.max(step.chain);
                    if step.is_special {
                        self.special_steps += 1;
                    }
                    if step.big_chain {
                        self.big_chains += 1;
                    }
                }
                EngineEvent::GameOver(report) => self.reason = Some(report.reason),
            }
        }
    }
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_writer(std::io::stderr)
        .init();

    let config = SimConfig::from_env().context("reading BUBBLE_POP_* configuration")?;
    let mut engine = CascadeEngine::new(config.engine).context("creating engine")?;

    let summary = autoplay(&mut engine, config.max_moves)?;

    if config.json {
        println!("{}", serde_json::to_string_pretty(&summary)?);
    } else {
        print_text(&summary);
    }
    Ok(())
}

fn autoplay(engine: &mut CascadeEngine, max_moves: u32) -> Result<RunSummary> {
    let mut summary = RunSummary {
        seed: engine.config().seed,
        difficulty: engine.difficulty().as_str(),
        ..RunSummary::default()
    };

    while !engine.game_over() && engine.swaps() < max_moves {
        let Some((a, b)) = engine.hint() else {
            // Idle without a move: the next tick reports the deadlock
            engine.tick(TICK_MS);
            summary.elapsed_ms += TICK_MS as u64;
            summary.record(engine.drain_events());
            continue;
        };

        match engine.request_swap(a, b) {
            SwapOutcome::Accepted(effect) => {
                debug!(?a, ?b, kind = ?effect.kind, score = effect.score_delta, "autoplay swap");
            }
            SwapOutcome::Rejected(reason) => {
                anyhow::bail!("hinted swap {:?} -> {:?} was rejected: {}", a, b, reason.message());
            }
        }

        let mut ticks = 0;
        while !engine.is_idle() && !engine.game_over() {
            engine.tick(TICK_MS);
            summary.elapsed_ms += TICK_MS as u64;
            ticks += 1;
            if ticks > MAX_SETTLE_TICKS {
                anyhow::bail!("engine did not settle after {} ticks", MAX_SETTLE_TICKS);
            }
        }
        summary.record(engine.drain_events());
    }

    summary.score = engine.score();
    summary.swaps = engine.swaps();
    summary.grid = GridSnapshot::capture(engine.grid()).rows();
    info!(
        score = summary.score,
        swaps = summary.swaps,
        reason = summary.reason.map(|r| r.as_str()).unwrap_or("move_cap"),
        "autoplay finished"
    );
    Ok(summary)
}

fn print_text(summary: &RunSummary) {
    for row in &summary.grid {
        println!("  {}", row);
    }
    println!();
    println!("seed          {}", summary.seed);
    println!("difficulty    {}", summary.difficulty);
    println!("score         {}", summary.score);
    println!("swaps         {}", summary.swaps);
    println!(
        "steps         {} ({} special, {} big chains, longest chain {})",
        summary.steps, summary.special_steps, summary.big_chains, summary.longest_chain
    );
    println!("played        {:.1}s", summary.elapsed_ms as f64 / 1000.0);
    let ended = summary
        .reason
        .map(|r| r.as_str())
        .unwrap_or("move cap reached");
    println!("ended         {}", ended);
}
