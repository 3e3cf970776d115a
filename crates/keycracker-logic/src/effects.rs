//! Special effects overlay — per-round distortions layered on the base round.
//!
//! Effects are recomputed whenever a new round starts. Cadence-driven effects
//! fire on every Kth round, where K shrinks as the responsible item's level
//! rises; probability-driven effects are rolled against the session's RNG.
//!
//! | Effect | Source | Trigger |
//! |--------|--------|---------|
//! | Flash | Biometric Lock | cadence |
//! | Randomize keypad | Scrambler | cadence |
//! | Reverse sequence | Mirror / Overclock Drill | cadence / probability |
//! | Extra symbol | Quantum Lock | cadence |
//! | Decoy symbols | Decoy | every round, `level` symbols |
//! | Neutralize | Signal Jammer | probability, suppresses all of the above |
//!
//! ```
//! use keycracker_logic::effects::Cadence;
//!
//! let cadence = Cadence::new(5, 2, 1);
//! assert_eq!(cadence.period(1), 5);
//! assert_eq!(cadence.period(8), 1);
//! assert!(cadence.fires(1, 10));
//! assert!(!cadence.fires(1, 11));
//! ```

use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::config::CrackerConfig;
use crate::difficulty::ResolverContext;

/// "Every Kth round" activation, with K decreasing as level rises.
///
/// `period = max(min_period, base_period - level / levels_per_step)`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Cadence {
    pub base_period: u32,
    pub levels_per_step: u8,
    pub min_period: u32,
}

impl Cadence {
    pub const fn new(base_period: u32, levels_per_step: u8, min_period: u32) -> Self {
        Self {
            base_period,
            levels_per_step,
            min_period,
        }
    }

    /// Number of rounds between activations at the given item level.
    pub fn period(&self, level: u8) -> u32 {
        let steps = u32::from(level) / u32::from(self.levels_per_step.max(1));
        self.base_period
            .saturating_sub(steps)
            .max(self.min_period)
            .max(1)
    }

    /// Whether the effect fires on `count` (a 1-based round or entry count).
    pub fn fires(&self, level: u8, count: u32) -> bool {
        count > 0 && count % self.period(level) == 0
    }
}

/// Symbols periodically blink out while the sequence is shown.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Flash {
    /// How long the symbols stay hidden on each blink.
    pub blink_ms: u32,
}

/// The aggregate of distortions active for one round.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SpecialEffects {
    /// Only shown during memorisation.
    pub flash: Option<Flash>,
    /// Only meaningful during input.
    pub randomize_keypad: bool,
    pub reverse_sequence: bool,
    /// Inject the entangled symbol into this round's draw pool.
    pub extra_symbol: bool,
    /// Number of decoy symbols spliced into this round's sequence.
    pub decoy_symbols: u32,
    /// A neutralize roll suppressed this round's effects.
    pub neutralized: bool,
}

impl SpecialEffects {
    /// `true` if any distortion is active.
    pub fn any(&self) -> bool {
        self.flash.is_some()
            || self.randomize_keypad
            || self.reverse_sequence
            || self.extra_symbol
            || self.decoy_symbols > 0
    }
}

/// Compute the effects for `round` (1-based).
///
/// Rolls happen in a fixed order (reversal, then neutralize) and only for
/// tools that carry a chance, so a seeded RNG replays identically.
pub fn resolve_effects(
    ctx: &ResolverContext,
    round: u32,
    config: &CrackerConfig,
    rng: &mut impl Rng,
) -> SpecialEffects {
    let lock = ctx.lock.profile();
    let tool = ctx.tool.profile();
    let mut effects = SpecialEffects::default();

    if let Some(cadence) = lock.flash {
        if cadence.fires(ctx.lock_level, round) {
            effects.flash = Some(Flash {
                blink_ms: config.flash_base_ms.saturating_add(
                    config
                        .flash_per_level_ms
                        .saturating_mul(u32::from(ctx.lock_level)),
                ),
            });
        }
    }
    if let Some(cadence) = lock.entangled {
        effects.extra_symbol = cadence.fires(ctx.lock_level, round);
    }

    for fortifier in ctx.fortifiers_in_play(config) {
        let profile = fortifier.kind.profile();
        if let Some(cadence) = profile.keypad_shuffle {
            effects.randomize_keypad |= cadence.fires(fortifier.level, round);
        }
        if let Some(cadence) = profile.reverse {
            effects.reverse_sequence |= cadence.fires(fortifier.level, round);
        }
        effects.decoy_symbols += profile.decoys_per_level * u32::from(fortifier.level);
    }

    let reverse_chance = chance(
        tool.reverse_chance_per_level,
        ctx.tool_level,
        config.reverse_chance_cap,
    );
    if reverse_chance > 0.0 && rng.gen_bool(reverse_chance) {
        effects.reverse_sequence = true;
    }

    let neutralize_chance = chance(
        tool.neutralize_chance_per_level,
        ctx.tool_level,
        config.neutralize_chance_cap,
    );
    if neutralize_chance > 0.0 && rng.gen_bool(neutralize_chance) {
        log::debug!("round {}: effects neutralized", round);
        effects = SpecialEffects {
            neutralized: true,
            ..SpecialEffects::default()
        };
    }

    effects
}

fn chance(per_level: f32, level: u8, cap: f32) -> f64 {
    let cap = if cap.is_nan() { 0.0 } else { cap.clamp(0.0, 1.0) };
    f64::from((per_level * f32::from(level)).clamp(0.0, cap))
}
