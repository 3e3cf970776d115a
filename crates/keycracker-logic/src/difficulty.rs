//! Difficulty resolution — how hard a single infiltration attempt is.
//!
//! Given a [`ResolverContext`] (lock, fortifiers, tool, and round counters)
//! the resolver computes four numbers:
//!
//! | Parameter | Base | Floor |
//! |-----------|------|-------|
//! | Required entries | `level × entries_per_level` | 1 |
//! | Symbols displayed | 6, or the lock's own rule | 1 |
//! | Time allowed | 20 s, or the lock's own curve | 5 s |
//! | Strength reduction per entry | tool attack factor | 0 |
//!
//! Every function is pure and clamps its result; callers never validate.
//!
//! ```
//! use keycracker_logic::config::CrackerConfig;
//! use keycracker_logic::difficulty::{calculate_required_entries, ResolverContext};
//! use keycracker_logic::items::{names, Fortifier, Lock, Tool};
//!
//! let config = CrackerConfig::default();
//! let ctx = ResolverContext::new(
//!     &Lock::new(names::STANDARD_LOCK, 1),
//!     &[Fortifier::new(names::DUMMY, 3)],
//!     &Tool::new(names::BASIC_PICK, 1, 10.0),
//!     1,
//!     None,
//!     &config,
//! );
//! assert_eq!(calculate_required_entries(&ctx, &config), 13);
//! ```

use serde::{Deserialize, Serialize};

use crate::config::CrackerConfig;
use crate::items::{
    affinity, clamp_lock_level, ActiveFortifier, Fortifier, Lock, LockKind, SymbolRule, TimeRule,
    Tool, ToolKind,
};

/// Fraction of a tool's time bonus kept against locks that resist it.
const REDUCED_TIME_BONUS: f32 = 0.75;

/// Snapshot of everything the resolver reads, with item names already
/// resolved to kinds.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResolverContext {
    pub lock: LockKind,
    /// Level used for numeric scaling: the defender level if given,
    /// otherwise the lock's own level, clamped to 1–8.
    pub lock_level: u8,
    pub fortifiers: Vec<ActiveFortifier>,
    pub tool: ToolKind,
    pub tool_level: u8,
    pub attack_factor: f32,
    pub attacker_level: u8,
    pub successful_entries: u32,
}

impl ResolverContext {
    /// Resolve item names and apply fortifier neutralization.
    pub fn new(
        lock: &Lock,
        fortifiers: &[Fortifier],
        tool: &Tool,
        attacker_level: u8,
        defender_level: Option<u8>,
        config: &CrackerConfig,
    ) -> Self {
        let tool_kind = tool.kind();
        let fortifiers = fortifiers.iter().map(ActiveFortifier::from).collect();
        Self {
            lock: lock.kind(),
            lock_level: clamp_lock_level(defender_level.unwrap_or(lock.level)),
            fortifiers: neutralize_fortifiers(tool_kind, tool.level, fortifiers, config),
            tool: tool_kind,
            tool_level: tool.level,
            attack_factor: tool.attack_factor,
            attacker_level,
            successful_entries: 0,
        }
    }

    /// Whether the tool strips every fortifier for this session.
    pub fn fortifiers_neutralized(&self, config: &CrackerConfig) -> bool {
        self.tool.profile().neutralizes_fortifiers
            && self.tool_level >= config.universal_key_threshold
    }

    /// Fortifiers that contribute to this session.
    pub fn fortifiers_in_play(&self, config: &CrackerConfig) -> &[ActiveFortifier] {
        if self.fortifiers_neutralized(config) {
            &[]
        } else {
            &self.fortifiers
        }
    }
}

/// The four core parameters, resolved together.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Difficulty {
    pub required_entries: u32,
    pub symbols_displayed: u32,
    pub time_allowed: u32,
    pub strength_reduction_per_entry: f32,
}

/// Resolve every parameter for the context.
pub fn resolve(ctx: &ResolverContext, config: &CrackerConfig) -> Difficulty {
    Difficulty {
        required_entries: calculate_required_entries(ctx, config),
        symbols_displayed: calculate_symbols_displayed(ctx, config),
        time_allowed: calculate_time_allowed_per_sequence(ctx, config),
        strength_reduction_per_entry: calculate_strength_reduction_per_entry(ctx, config),
    }
}

/// Drop every fortifier if the tool is a Universal Key at or above the
/// configured threshold. Applied once, when the session is built.
pub fn neutralize_fortifiers(
    tool: ToolKind,
    tool_level: u8,
    fortifiers: Vec<ActiveFortifier>,
    config: &CrackerConfig,
) -> Vec<ActiveFortifier> {
    if tool.profile().neutralizes_fortifiers && tool_level >= config.universal_key_threshold {
        if !fortifiers.is_empty() {
            log::debug!(
                "{} level {} neutralized {} fortifier(s)",
                tool.name(),
                tool_level,
                fortifiers.len()
            );
        }
        Vec::new()
    } else {
        fortifiers
    }
}

/// Total correct entries needed to bypass the lock.
///
/// Order: tool override → lock base → tool counters (floored at zero) →
/// additive fortifiers → multiplicative fortifiers → round, clamp ≥ 1.
pub fn calculate_required_entries(ctx: &ResolverContext, config: &CrackerConfig) -> u32 {
    let tool = ctx.tool.profile();
    if let Some(entries) = tool.required_override {
        return entries.max(1);
    }

    let lock = ctx.lock.profile();
    let mut entries = f32::from(ctx.lock_level) * lock.entries_per_level;

    if let Some((countered, per_level)) = tool.counters {
        if countered == ctx.lock {
            entries = (entries - per_level * f32::from(ctx.tool_level)).max(0.0);
        }
    }

    let fortifiers = ctx.fortifiers_in_play(config);
    for fortifier in fortifiers {
        entries += fortifier.kind.profile().flat_entries_per_level * f32::from(fortifier.level);
    }
    for fortifier in fortifiers {
        entries *=
            1.0 + fortifier.kind.profile().entries_scale_per_level * f32::from(fortifier.level);
    }

    entries.round().max(1.0) as u32
}

/// Symbols shown per sequence this round.
pub fn calculate_symbols_displayed(ctx: &ResolverContext, config: &CrackerConfig) -> u32 {
    let lock = ctx.lock.profile();
    let base = match lock.symbols {
        SymbolRule::Fixed => config.base_symbols,
        SymbolRule::Scaling {
            base,
            levels_per_symbol,
            successes_per_symbol,
        } => {
            base + u32::from(ctx.lock_level) / u32::from(levels_per_symbol.max(1))
                + ctx.successful_entries / successes_per_symbol.max(1)
        }
    };

    let mut reduction = if ctx.tool.profile().reduces_symbols {
        (u32::from(ctx.tool_level) + 1) / 2
    } else {
        0
    };
    if lock.resists_symbol_reduction {
        reduction /= 2;
    }

    base.saturating_sub(reduction).max(1)
}

/// Seconds allowed per sequence, before any in-session decay.
pub fn calculate_time_allowed_per_sequence(ctx: &ResolverContext, config: &CrackerConfig) -> u32 {
    let base = match ctx.lock.profile().time {
        TimeRule::Fixed => config.base_time_seconds,
        TimeRule::Decreasing { start, per_level } => start - per_level * f32::from(ctx.lock_level),
    };

    let tool = ctx.tool.profile();
    let mut bonus = tool.time_bonus_per_level * f32::from(ctx.tool_level);
    if tool.time_bonus_reduced_against.contains(&ctx.lock) {
        bonus *= REDUCED_TIME_BONUS;
    }

    ((base + bonus).round().max(0.0) as u32).max(config.time_floor_seconds())
}

/// Lock strength removed by each correct entry.
pub fn calculate_strength_reduction_per_entry(
    ctx: &ResolverContext,
    config: &CrackerConfig,
) -> f32 {
    let fortifiers = ctx.fortifiers_in_play(config);
    if fortifiers
        .iter()
        .any(|f| f.kind.profile().nullifies == Some(ctx.tool))
    {
        return 0.0;
    }

    let mut reduction = ctx.attack_factor * affinity(ctx.tool, ctx.lock);

    let gap = ctx.attacker_level.saturating_sub(ctx.lock_level);
    let gap_bonus = 1.0 + config.level_gap_bonus_per_level * f32::from(gap);
    reduction *= gap_bonus.min(config.level_gap_bonus_cap);

    for fortifier in fortifiers {
        let bonus =
            fortifier.kind.profile().resistance_bonus_per_level * f32::from(fortifier.level);
        if bonus > 0.0 {
            reduction /= 1.0 + bonus / 100.0;
        }
    }

    // f32::max discards NaN from a malformed attack factor
    reduction.max(0.0)
}

/// Tool damage reported if the session fails. Fixed at session start.
pub fn calculate_tool_damage_on_fail(ctx: &ResolverContext, config: &CrackerConfig) -> f32 {
    let trap_damage: f32 = ctx
        .fortifiers_in_play(config)
        .iter()
        .filter(|f| f.kind.profile().damages_on_fail)
        .map(|f| config.trap_damage_per_level * f32::from(f.level))
        .sum();
    (config.default_fail_damage + trap_damage).max(0.0)
}

/// Extra attempts lost on each wrong entry or timeout.
pub fn attempt_penalty(ctx: &ResolverContext, config: &CrackerConfig) -> u32 {
    ctx.fortifiers_in_play(config)
        .iter()
        .map(|f| f.kind.profile().attempt_penalty_per_level * u32::from(f.level))
        .sum()
}

/// Seconds removed from the allowed time after the `ctx.successful_entries`th
/// success, if the lock decays time on that entry.
pub fn time_decay_after_success(ctx: &ResolverContext) -> Option<u32> {
    let cadence = ctx.lock.profile().time_decay?;
    cadence
        .fires(ctx.lock_level, ctx.successful_entries)
        .then(|| 1 + u32::from(ctx.lock_level) / 3)
}

/// Required entries the lock gains per second while the timer runs.
pub fn passive_growth_per_second(ctx: &ResolverContext) -> f32 {
    ctx.lock.profile().growth_per_level_per_second * f32::from(ctx.lock_level)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::items::names;

    fn ctx_with(
        lock: &str,
        lock_level: u8,
        fortifiers: &[Fortifier],
        tool: &str,
        tool_level: u8,
    ) -> ResolverContext {
        ResolverContext::new(
            &Lock::new(lock, lock_level),
            fortifiers,
            &Tool::new(tool, tool_level, 10.0),
            1,
            None,
            &CrackerConfig::default(),
        )
    }

    fn base_ctx() -> ResolverContext {
        ctx_with(names::STANDARD_LOCK, 1, &[], names::BASIC_PICK, 1)
    }

    #[test]
    fn base_lock_base_tool() {
        let config = CrackerConfig::default();
        let d = resolve(&base_ctx(), &config);
        assert_eq!(d.required_entries, 10);
        assert_eq!(d.symbols_displayed, 6);
        assert_eq!(d.time_allowed, 20);
        assert!((d.strength_reduction_per_entry - 10.0).abs() < f32::EPSILON);
    }

    #[test]
    fn required_entries_scale_with_level() {
        let config = CrackerConfig::default();
        let ctx = ctx_with(names::STANDARD_LOCK, 5, &[], names::BASIC_PICK, 1);
        assert_eq!(calculate_required_entries(&ctx, &config), 50);
        let quantum = ctx_with(names::QUANTUM_LOCK, 2, &[], names::BASIC_PICK, 1);
        assert_eq!(calculate_required_entries(&quantum, &config), 30);
    }

    #[test]
    fn defender_level_overrides_lock_level() {
        let config = CrackerConfig::default();
        let ctx = ResolverContext::new(
            &Lock::new(names::STANDARD_LOCK, 1),
            &[],
            &Tool::new(names::BASIC_PICK, 1, 10.0),
            1,
            Some(3),
            &config,
        );
        assert_eq!(ctx.lock_level, 3);
        assert_eq!(calculate_required_entries(&ctx, &config), 30);
    }

    #[test]
    fn dummy_adds_flat() {
        let config = CrackerConfig::default();
        let ctx = ctx_with(
            names::STANDARD_LOCK,
            1,
            &[Fortifier::new(names::DUMMY, 3)],
            names::BASIC_PICK,
            1,
        );
        assert_eq!(calculate_required_entries(&ctx, &config), 13);
    }

    #[test]
    fn amplifier_scales_after_additive() {
        let config = CrackerConfig::default();
        let ctx = ctx_with(
            names::STANDARD_LOCK,
            2,
            &[
                Fortifier::new(names::AMPLIFIER, 5),
                Fortifier::new(names::DUMMY, 4),
            ],
            names::BASIC_PICK,
            1,
        );
        // (20 + 4) × 1.5
        assert_eq!(calculate_required_entries(&ctx, &config), 36);
    }

    #[test]
    fn precision_counters_standard_only() {
        let config = CrackerConfig::default();
        let standard = ctx_with(names::STANDARD_LOCK, 2, &[], names::PRECISION_PICK, 3);
        assert_eq!(calculate_required_entries(&standard, &config), 14);
        let cipher = ctx_with(names::CIPHER_LOCK, 2, &[], names::PRECISION_PICK, 3);
        assert_eq!(calculate_required_entries(&cipher, &config), 20);
    }

    #[test]
    fn precision_cannot_go_below_one() {
        let config = CrackerConfig::default();
        let ctx = ctx_with(names::STANDARD_LOCK, 1, &[], names::PRECISION_PICK, 8);
        assert_eq!(calculate_required_entries(&ctx, &config), 1);
    }

    #[test]
    fn master_key_overrides_everything() {
        let config = CrackerConfig::default();
        let ctx = ctx_with(
            names::QUANTUM_LOCK,
            8,
            &[
                Fortifier::new(names::DUMMY, 8),
                Fortifier::new(names::AMPLIFIER, 8),
            ],
            names::MASTER_KEY,
            1,
        );
        assert_eq!(calculate_required_entries(&ctx, &config), 1);
    }

    #[test]
    fn universal_key_threshold() {
        let config = CrackerConfig::default();
        let fortifiers = [Fortifier::new(names::DUMMY, 5)];
        let low = ctx_with(names::STANDARD_LOCK, 1, &fortifiers, names::UNIVERSAL_KEY, 2);
        assert_eq!(calculate_required_entries(&low, &config), 15);
        let high = ctx_with(names::STANDARD_LOCK, 1, &fortifiers, names::UNIVERSAL_KEY, 3);
        assert!(high.fortifiers.is_empty());
        assert_eq!(calculate_required_entries(&high, &config), 10);
    }

    #[test]
    fn cipher_symbols_grow() {
        let config = CrackerConfig::default();
        let mut ctx = ctx_with(names::CIPHER_LOCK, 4, &[], names::BASIC_PICK, 1);
        assert_eq!(calculate_symbols_displayed(&ctx, &config), 7);
        ctx.successful_entries = 5;
        assert_eq!(calculate_symbols_displayed(&ctx, &config), 9);
    }

    #[test]
    fn decoder_reduction_halved_for_resistant_locks() {
        let config = CrackerConfig::default();
        let standard = ctx_with(names::STANDARD_LOCK, 1, &[], names::SIGNAL_DECODER, 5);
        assert_eq!(calculate_symbols_displayed(&standard, &config), 3);
        let quantum = ctx_with(names::QUANTUM_LOCK, 1, &[], names::SIGNAL_DECODER, 5);
        assert_eq!(calculate_symbols_displayed(&quantum, &config), 5);
    }

    #[test]
    fn symbols_floor_at_one() {
        let config = CrackerConfig {
            base_symbols: 2,
            ..CrackerConfig::default()
        };
        let ctx = ctx_with(names::STANDARD_LOCK, 1, &[], names::SIGNAL_DECODER, 8);
        assert_eq!(calculate_symbols_displayed(&ctx, &config), 1);
    }

    #[test]
    fn chrono_time_decreases_with_level() {
        let config = CrackerConfig::default();
        let low = ctx_with(names::CHRONO_LOCK, 1, &[], names::BASIC_PICK, 1);
        assert_eq!(calculate_time_allowed_per_sequence(&low, &config), 20);
        let high = ctx_with(names::CHRONO_LOCK, 8, &[], names::BASIC_PICK, 1);
        assert_eq!(calculate_time_allowed_per_sequence(&high, &config), 6);
    }

    #[test]
    fn dilator_bonus_reduced_against_chrono() {
        let config = CrackerConfig::default();
        let standard = ctx_with(names::STANDARD_LOCK, 1, &[], names::TIME_DILATOR, 4);
        assert_eq!(calculate_time_allowed_per_sequence(&standard, &config), 28);
        let chrono = ctx_with(names::CHRONO_LOCK, 1, &[], names::TIME_DILATOR, 4);
        assert_eq!(calculate_time_allowed_per_sequence(&chrono, &config), 26);
    }

    #[test]
    fn time_never_below_floor() {
        let config = CrackerConfig {
            base_time_seconds: 1.0,
            ..CrackerConfig::default()
        };
        assert_eq!(calculate_time_allowed_per_sequence(&base_ctx(), &config), 5);
    }

    #[test]
    fn lowered_min_time_cannot_undercut_floor() {
        let config = CrackerConfig {
            base_time_seconds: 2.0,
            min_time_seconds: 1.0,
            ..CrackerConfig::default()
        };
        assert_eq!(calculate_time_allowed_per_sequence(&base_ctx(), &config), 5);
    }

    #[test]
    fn affinity_applies_to_strength() {
        let config = CrackerConfig::default();
        let ideal = ctx_with(names::STANDARD_LOCK, 1, &[], names::PRECISION_PICK, 1);
        assert!((calculate_strength_reduction_per_entry(&ideal, &config) - 15.0).abs() < 1e-4);
        let poor = ctx_with(names::QUANTUM_LOCK, 1, &[], names::OVERCLOCK_DRILL, 1);
        assert!((calculate_strength_reduction_per_entry(&poor, &config) - 2.5).abs() < 1e-4);
    }

    #[test]
    fn dampener_divides_strength() {
        let config = CrackerConfig::default();
        let ctx = ctx_with(
            names::STANDARD_LOCK,
            1,
            &[Fortifier::new(names::DAMPENER, 5)],
            names::BASIC_PICK,
            1,
        );
        // 10 / 1.5
        let expected = 10.0 / 1.5;
        assert!((calculate_strength_reduction_per_entry(&ctx, &config) - expected).abs() < 1e-4);
    }

    #[test]
    fn nullifier_zeroes_overclock_only() {
        let config = CrackerConfig::default();
        let fortifiers = [Fortifier::new(names::NULLIFIER, 1)];
        let drill = ctx_with(names::STANDARD_LOCK, 1, &fortifiers, names::OVERCLOCK_DRILL, 3);
        assert_eq!(calculate_strength_reduction_per_entry(&drill, &config), 0.0);
        let pick = ctx_with(names::STANDARD_LOCK, 1, &fortifiers, names::BASIC_PICK, 3);
        assert!(calculate_strength_reduction_per_entry(&pick, &config) > 0.0);
    }

    #[test]
    fn level_gap_bonus_is_capped() {
        let config = CrackerConfig::default();
        let mut ctx = base_ctx();
        ctx.attacker_level = 5;
        assert!((calculate_strength_reduction_per_entry(&ctx, &config) - 12.0).abs() < 1e-4);
        ctx.attacker_level = 100;
        assert!((calculate_strength_reduction_per_entry(&ctx, &config) - 15.0).abs() < 1e-4);
    }

    #[test]
    fn negative_attack_factor_clamped() {
        let config = CrackerConfig::default();
        let mut ctx = base_ctx();
        ctx.attack_factor = -4.0;
        assert_eq!(calculate_strength_reduction_per_entry(&ctx, &config), 0.0);
        ctx.attack_factor = f32::NAN;
        assert_eq!(calculate_strength_reduction_per_entry(&ctx, &config), 0.0);
    }

    #[test]
    fn tripwire_adds_fail_damage() {
        let config = CrackerConfig::default();
        assert!((calculate_tool_damage_on_fail(&base_ctx(), &config) - 5.0).abs() < f32::EPSILON);
        let trapped = ctx_with(
            names::STANDARD_LOCK,
            1,
            &[Fortifier::new(names::TRIPWIRE, 2)],
            names::BASIC_PICK,
            1,
        );
        assert!((calculate_tool_damage_on_fail(&trapped, &config) - 25.0).abs() < f32::EPSILON);
    }

    #[test]
    fn decoy_attempt_penalty() {
        let config = CrackerConfig::default();
        assert_eq!(attempt_penalty(&base_ctx(), &config), 0);
        let ctx = ctx_with(
            names::STANDARD_LOCK,
            1,
            &[Fortifier::new(names::DECOY, 2)],
            names::BASIC_PICK,
            1,
        );
        assert_eq!(attempt_penalty(&ctx, &config), 2);
    }

    #[test]
    fn chrono_decay_cadence() {
        let mut ctx = ctx_with(names::CHRONO_LOCK, 3, &[], names::BASIC_PICK, 1);
        // period 4 - 1 = 3, amount 1 + 1 = 2
        ctx.successful_entries = 2;
        assert_eq!(time_decay_after_success(&ctx), None);
        ctx.successful_entries = 3;
        assert_eq!(time_decay_after_success(&ctx), Some(2));
        assert_eq!(time_decay_after_success(&base_ctx()), None);
    }

    #[test]
    fn adaptive_growth_rate() {
        let ctx = ctx_with(names::ADAPTIVE_LOCK, 4, &[], names::BASIC_PICK, 1);
        assert!((passive_growth_per_second(&ctx) - 0.2).abs() < 1e-6);
        assert_eq!(passive_growth_per_second(&base_ctx()), 0.0);
    }

    #[test]
    fn unknown_items_use_generic_rules() {
        let config = CrackerConfig::default();
        let ctx = ctx_with("Prototype Vault", 2, &[Fortifier::new("Moat", 4)], "Crowbar", 3);
        let d = resolve(&ctx, &config);
        assert_eq!(d.required_entries, 20);
        assert_eq!(d.symbols_displayed, 6);
        assert_eq!(d.time_allowed, 20);
    }
}
