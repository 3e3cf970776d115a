//! Item catalog — locks, fortifiers, and tools.
//!
//! Items arrive from the inventory layer as plain named records. Each name
//! maps to exactly one kind in a closed registry, and each kind carries a
//! modifier profile that the [`difficulty`](crate::difficulty) resolver reads.
//! Names are resolved once, when a session is built; unknown names fall back
//! to the generic kind of their family so new items degrade gracefully.
//!
//! # Locks
//!
//! | Name | Entries/level | Special |
//! |------|---------------|---------|
//! | Standard Lock | 10 | — |
//! | Biometric Lock | 10 | Flashing symbols |
//! | Quantum Lock | 15 | Entangled symbol, resists symbol reduction |
//! | Chrono Lock | 10 | Short timer, timer decays on success |
//! | Adaptive Lock | 12 | Required entries grow every second |
//! | Cipher Lock | 10 | Longer sequences, resists symbol reduction |
//!
//! ```
//! use keycracker_logic::items::{Lock, LockKind, Tool, ToolKind};
//!
//! let lock = Lock::new("Quantum Lock", 2);
//! assert_eq!(lock.kind(), LockKind::Quantum);
//!
//! let tool = Tool::new("Homemade Shim", 1, 10.0);
//! assert_eq!(tool.kind(), ToolKind::Basic);
//! ```

use serde::{Deserialize, Serialize};

use crate::effects::Cadence;

/// Lowest lock level.
pub const MIN_LOCK_LEVEL: u8 = 1;

/// Highest lock level.
pub const MAX_LOCK_LEVEL: u8 = 8;

/// Canonical item names as they appear in the inventory.
pub mod names {
    pub const STANDARD_LOCK: &str = "Standard Lock";
    pub const BIOMETRIC_LOCK: &str = "Biometric Lock";
    pub const QUANTUM_LOCK: &str = "Quantum Lock";
    pub const CHRONO_LOCK: &str = "Chrono Lock";
    pub const ADAPTIVE_LOCK: &str = "Adaptive Lock";
    pub const CIPHER_LOCK: &str = "Cipher Lock";

    pub const DUMMY: &str = "Dummy";
    pub const AMPLIFIER: &str = "Amplifier";
    pub const SCRAMBLER: &str = "Scrambler";
    pub const MIRROR: &str = "Mirror";
    pub const DECOY: &str = "Decoy";
    pub const DAMPENER: &str = "Dampener";
    pub const NULLIFIER: &str = "Nullifier";
    pub const TRIPWIRE: &str = "Tripwire";

    pub const BASIC_PICK: &str = "Basic Pick";
    pub const PRECISION_PICK: &str = "Precision Pick";
    pub const MASTER_KEY: &str = "Master Key";
    pub const UNIVERSAL_KEY: &str = "Universal Key";
    pub const SIGNAL_DECODER: &str = "Signal Decoder";
    pub const TIME_DILATOR: &str = "Time Dilator";
    pub const OVERCLOCK_DRILL: &str = "Overclock Drill";
    pub const SIGNAL_JAMMER: &str = "Signal Jammer";
}

/// A current/max pair, used for lock strength and resistance.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Meter {
    pub current: f32,
    pub max: f32,
}

impl Meter {
    /// A full meter.
    pub fn full(max: f32) -> Self {
        Self { current: max, max }
    }
}

// ── Locks ──────────────────────────────────────────────────────────────

/// The defended target of an infiltration attempt.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Lock {
    pub name: String,
    /// Lock level (1–8). Out-of-range values are clamped when read.
    pub level: u8,
    pub strength: Meter,
    pub resistance: Meter,
}

impl Lock {
    /// Create a lock at full strength. Strength and resistance scale with level.
    pub fn new(name: impl Into<String>, level: u8) -> Self {
        let level = clamp_lock_level(level);
        Self {
            name: name.into(),
            level,
            strength: Meter::full(100.0 * f32::from(level)),
            resistance: Meter::full(10.0 * f32::from(level)),
        }
    }

    pub fn kind(&self) -> LockKind {
        LockKind::from_name(&self.name)
    }
}

/// Clamp a lock level into `MIN_LOCK_LEVEL..=MAX_LOCK_LEVEL`.
pub fn clamp_lock_level(level: u8) -> u8 {
    level.clamp(MIN_LOCK_LEVEL, MAX_LOCK_LEVEL)
}

/// Closed set of lock behaviors.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum LockKind {
    /// Generic lock; also the fallback for unknown names.
    Standard,
    Biometric,
    Quantum,
    Chrono,
    Adaptive,
    Cipher,
}

/// How a lock decides its base symbol count.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum SymbolRule {
    /// Use the configured base count.
    Fixed,
    /// `base + level / levels_per_symbol`, plus one symbol for every
    /// `successes_per_symbol` successful entries.
    Scaling {
        base: u32,
        levels_per_symbol: u8,
        successes_per_symbol: u32,
    },
}

/// How a lock decides its base time per sequence.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum TimeRule {
    /// Use the configured base time.
    Fixed,
    /// `start - per_level × level` seconds.
    Decreasing { start: f32, per_level: f32 },
}

/// Modifier record for a lock kind.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LockProfile {
    /// Required entries per lock level.
    pub entries_per_level: f32,
    pub symbols: SymbolRule,
    pub time: TimeRule,
    /// Tool symbol reductions are halved (floored) against this lock.
    pub resists_symbol_reduction: bool,
    /// Symbols blink out during memorisation.
    pub flash: Option<Cadence>,
    /// Injects the entangled symbol into the draw pool.
    pub entangled: Option<Cadence>,
    /// Cadence over successful entries at which allowed time shrinks.
    pub time_decay: Option<Cadence>,
    /// Required entries gained per second, per lock level.
    pub growth_per_level_per_second: f32,
}

impl LockProfile {
    const STANDARD: LockProfile = LockProfile {
        entries_per_level: 10.0,
        symbols: SymbolRule::Fixed,
        time: TimeRule::Fixed,
        resists_symbol_reduction: false,
        flash: None,
        entangled: None,
        time_decay: None,
        growth_per_level_per_second: 0.0,
    };
}

impl LockKind {
    pub const ALL: [LockKind; 6] = [
        LockKind::Standard,
        LockKind::Biometric,
        LockKind::Quantum,
        LockKind::Chrono,
        LockKind::Adaptive,
        LockKind::Cipher,
    ];

    /// Resolve a lock name. Unknown names are treated as [`LockKind::Standard`].
    pub fn from_name(name: &str) -> Self {
        match name {
            names::BIOMETRIC_LOCK => LockKind::Biometric,
            names::QUANTUM_LOCK => LockKind::Quantum,
            names::CHRONO_LOCK => LockKind::Chrono,
            names::ADAPTIVE_LOCK => LockKind::Adaptive,
            names::CIPHER_LOCK => LockKind::Cipher,
            _ => LockKind::Standard,
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            LockKind::Standard => names::STANDARD_LOCK,
            LockKind::Biometric => names::BIOMETRIC_LOCK,
            LockKind::Quantum => names::QUANTUM_LOCK,
            LockKind::Chrono => names::CHRONO_LOCK,
            LockKind::Adaptive => names::ADAPTIVE_LOCK,
            LockKind::Cipher => names::CIPHER_LOCK,
        }
    }

    pub fn profile(self) -> LockProfile {
        match self {
            LockKind::Standard => LockProfile::STANDARD,
            LockKind::Biometric => LockProfile {
                flash: Some(Cadence::new(5, 2, 1)),
                ..LockProfile::STANDARD
            },
            LockKind::Quantum => LockProfile {
                entries_per_level: 15.0,
                resists_symbol_reduction: true,
                entangled: Some(Cadence::new(4, 3, 1)),
                ..LockProfile::STANDARD
            },
            LockKind::Chrono => LockProfile {
                time: TimeRule::Decreasing {
                    start: 22.0,
                    per_level: 2.0,
                },
                time_decay: Some(Cadence::new(4, 3, 1)),
                ..LockProfile::STANDARD
            },
            LockKind::Adaptive => LockProfile {
                entries_per_level: 12.0,
                growth_per_level_per_second: 0.05,
                ..LockProfile::STANDARD
            },
            LockKind::Cipher => LockProfile {
                symbols: SymbolRule::Scaling {
                    base: 5,
                    levels_per_symbol: 2,
                    successes_per_symbol: 2,
                },
                resists_symbol_reduction: true,
                ..LockProfile::STANDARD
            },
        }
    }
}

// ── Fortifiers ─────────────────────────────────────────────────────────

/// An attachment that adds a defensive rule to a lock.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Fortifier {
    pub name: String,
    pub level: u8,
}

impl Fortifier {
    pub fn new(name: impl Into<String>, level: u8) -> Self {
        Self {
            name: name.into(),
            level,
        }
    }

    pub fn kind(&self) -> FortifierKind {
        FortifierKind::from_name(&self.name)
    }
}

/// Closed set of fortifier behaviors.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum FortifierKind {
    /// Flat `+level` required entries.
    Dummy,
    /// `+10% × level` required entries.
    Amplifier,
    /// Shuffles the keypad on a cadence.
    Scrambler,
    /// Reverses the sequence on a cadence.
    Mirror,
    /// Splices decoy symbols and punishes wrong entries harder.
    Decoy,
    /// Divides tool effectiveness.
    Dampener,
    /// Zeroes out the Overclock Drill.
    Nullifier,
    /// Damages the tool when the attempt fails.
    Tripwire,
    /// Unrecognized fortifier; has no effect.
    Unknown,
}

/// Modifier record for a fortifier kind. Per-level fields are multiplied by
/// the fortifier's level.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FortifierProfile {
    pub flat_entries_per_level: f32,
    pub entries_scale_per_level: f32,
    pub keypad_shuffle: Option<Cadence>,
    pub reverse: Option<Cadence>,
    pub decoys_per_level: u32,
    pub attempt_penalty_per_level: u32,
    /// Percentage points of resistance per level.
    pub resistance_bonus_per_level: f32,
    pub nullifies: Option<ToolKind>,
    pub damages_on_fail: bool,
}

impl FortifierProfile {
    const INERT: FortifierProfile = FortifierProfile {
        flat_entries_per_level: 0.0,
        entries_scale_per_level: 0.0,
        keypad_shuffle: None,
        reverse: None,
        decoys_per_level: 0,
        attempt_penalty_per_level: 0,
        resistance_bonus_per_level: 0.0,
        nullifies: None,
        damages_on_fail: false,
    };
}

impl FortifierKind {
    pub fn from_name(name: &str) -> Self {
        match name {
            names::DUMMY => FortifierKind::Dummy,
            names::AMPLIFIER => FortifierKind::Amplifier,
            names::SCRAMBLER => FortifierKind::Scrambler,
            names::MIRROR => FortifierKind::Mirror,
            names::DECOY => FortifierKind::Decoy,
            names::DAMPENER => FortifierKind::Dampener,
            names::NULLIFIER => FortifierKind::Nullifier,
            names::TRIPWIRE => FortifierKind::Tripwire,
            _ => FortifierKind::Unknown,
        }
    }

    pub fn profile(self) -> FortifierProfile {
        match self {
            FortifierKind::Dummy => FortifierProfile {
                flat_entries_per_level: 1.0,
                ..FortifierProfile::INERT
            },
            FortifierKind::Amplifier => FortifierProfile {
                entries_scale_per_level: 0.10,
                ..FortifierProfile::INERT
            },
            FortifierKind::Scrambler => FortifierProfile {
                keypad_shuffle: Some(Cadence::new(5, 2, 1)),
                ..FortifierProfile::INERT
            },
            FortifierKind::Mirror => FortifierProfile {
                reverse: Some(Cadence::new(6, 2, 2)),
                ..FortifierProfile::INERT
            },
            FortifierKind::Decoy => FortifierProfile {
                decoys_per_level: 1,
                attempt_penalty_per_level: 1,
                ..FortifierProfile::INERT
            },
            FortifierKind::Dampener => FortifierProfile {
                resistance_bonus_per_level: 10.0,
                ..FortifierProfile::INERT
            },
            FortifierKind::Nullifier => FortifierProfile {
                nullifies: Some(ToolKind::Overclock),
                ..FortifierProfile::INERT
            },
            FortifierKind::Tripwire => FortifierProfile {
                damages_on_fail: true,
                ..FortifierProfile::INERT
            },
            FortifierKind::Unknown => FortifierProfile::INERT,
        }
    }
}

/// A fortifier with its name already resolved.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ActiveFortifier {
    pub kind: FortifierKind,
    pub level: u8,
}

impl From<&Fortifier> for ActiveFortifier {
    fn from(fortifier: &Fortifier) -> Self {
        Self {
            kind: fortifier.kind(),
            level: fortifier.level,
        }
    }
}

// ── Tools ──────────────────────────────────────────────────────────────

/// The attacker's equipped instrument.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Tool {
    pub name: String,
    pub level: u8,
    /// Base lock strength removed per correct entry.
    pub attack_factor: f32,
}

impl Tool {
    pub fn new(name: impl Into<String>, level: u8, attack_factor: f32) -> Self {
        Self {
            name: name.into(),
            level,
            attack_factor,
        }
    }

    pub fn kind(&self) -> ToolKind {
        ToolKind::from_name(&self.name)
    }
}

/// Closed set of tool behaviors.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ToolKind {
    /// Generic tool; also the fallback for unknown names.
    Basic,
    Precision,
    Master,
    Universal,
    Decoder,
    Dilator,
    Overclock,
    Jammer,
}

/// Modifier record for a tool kind.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ToolProfile {
    /// Forces required entries to this value, skipping every other rule.
    pub required_override: Option<u32>,
    /// Lock this tool counters, and required entries removed per tool level.
    pub counters: Option<(LockKind, f32)>,
    /// Strips every fortifier at session start once the tool reaches the
    /// configured universal-key level.
    pub neutralizes_fortifiers: bool,
    /// Reduces displayed symbols by `ceil(level / 2)`.
    pub reduces_symbols: bool,
    /// Seconds added per tool level.
    pub time_bonus_per_level: f32,
    /// Locks against which the time bonus is scaled down.
    pub time_bonus_reduced_against: &'static [LockKind],
    /// Per-level chance that a round's sequence is reversed.
    pub reverse_chance_per_level: f32,
    /// Per-level chance that a round's effects are suppressed.
    pub neutralize_chance_per_level: f32,
}

impl ToolProfile {
    const BASIC: ToolProfile = ToolProfile {
        required_override: None,
        counters: None,
        neutralizes_fortifiers: false,
        reduces_symbols: false,
        time_bonus_per_level: 0.0,
        time_bonus_reduced_against: &[],
        reverse_chance_per_level: 0.0,
        neutralize_chance_per_level: 0.0,
    };
}

impl ToolKind {
    pub const ALL: [ToolKind; 8] = [
        ToolKind::Basic,
        ToolKind::Precision,
        ToolKind::Master,
        ToolKind::Universal,
        ToolKind::Decoder,
        ToolKind::Dilator,
        ToolKind::Overclock,
        ToolKind::Jammer,
    ];

    /// Resolve a tool name. Unknown names are treated as [`ToolKind::Basic`].
    pub fn from_name(name: &str) -> Self {
        match name {
            names::PRECISION_PICK => ToolKind::Precision,
            names::MASTER_KEY => ToolKind::Master,
            names::UNIVERSAL_KEY => ToolKind::Universal,
            names::SIGNAL_DECODER => ToolKind::Decoder,
            names::TIME_DILATOR => ToolKind::Dilator,
            names::OVERCLOCK_DRILL => ToolKind::Overclock,
            names::SIGNAL_JAMMER => ToolKind::Jammer,
            _ => ToolKind::Basic,
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            ToolKind::Basic => names::BASIC_PICK,
            ToolKind::Precision => names::PRECISION_PICK,
            ToolKind::Master => names::MASTER_KEY,
            ToolKind::Universal => names::UNIVERSAL_KEY,
            ToolKind::Decoder => names::SIGNAL_DECODER,
            ToolKind::Dilator => names::TIME_DILATOR,
            ToolKind::Overclock => names::OVERCLOCK_DRILL,
            ToolKind::Jammer => names::SIGNAL_JAMMER,
        }
    }

    pub fn profile(self) -> ToolProfile {
        match self {
            ToolKind::Basic => ToolProfile::BASIC,
            ToolKind::Precision => ToolProfile {
                counters: Some((LockKind::Standard, 2.0)),
                ..ToolProfile::BASIC
            },
            ToolKind::Master => ToolProfile {
                required_override: Some(1),
                ..ToolProfile::BASIC
            },
            ToolKind::Universal => ToolProfile {
                neutralizes_fortifiers: true,
                ..ToolProfile::BASIC
            },
            ToolKind::Decoder => ToolProfile {
                reduces_symbols: true,
                ..ToolProfile::BASIC
            },
            ToolKind::Dilator => ToolProfile {
                time_bonus_per_level: 2.0,
                time_bonus_reduced_against: &[LockKind::Chrono],
                ..ToolProfile::BASIC
            },
            ToolKind::Overclock => ToolProfile {
                reverse_chance_per_level: 0.05,
                ..ToolProfile::BASIC
            },
            ToolKind::Jammer => ToolProfile {
                neutralize_chance_per_level: 0.10,
                ..ToolProfile::BASIC
            },
        }
    }
}

/// How well a tool matches a lock: a multiplier on strength reduction.
///
/// | Tool | Lock | Multiplier |
/// |------|------|-----------|
/// | Precision Pick | Standard | 1.5 |
/// | Signal Decoder | Cipher | 1.5 |
/// | Time Dilator | Chrono | 1.5 |
/// | Signal Jammer | Adaptive | 1.5 |
/// | Basic Pick | Quantum | 0.5 |
/// | Precision Pick | Quantum | 0.5 |
/// | Overclock Drill | Biometric | 0.5 |
/// | Overclock Drill | Quantum | 0.25 |
pub fn affinity(tool: ToolKind, lock: LockKind) -> f32 {
    match (tool, lock) {
        (ToolKind::Precision, LockKind::Standard)
        | (ToolKind::Decoder, LockKind::Cipher)
        | (ToolKind::Dilator, LockKind::Chrono)
        | (ToolKind::Jammer, LockKind::Adaptive) => 1.5,
        (ToolKind::Basic, LockKind::Quantum)
        | (ToolKind::Precision, LockKind::Quantum)
        | (ToolKind::Overclock, LockKind::Biometric) => 0.5,
        (ToolKind::Overclock, LockKind::Quantum) => 0.25,
        _ => 1.0,
    }
}
