//! Session state machine — one infiltration attempt from briefing to result.
//!
//! ```text
//! Instruction → Memorise → Input → Feedback → Memorise   (accepted)
//!                                           → Input      (invalid / time out)
//!                              ↘ GameOver (complete | failed)
//! ```
//!
//! A [`Session`] is an owned value. Every event consumes the session and
//! returns the next one; out-of-phase or malformed events return it
//! unchanged. Once `is_complete` or `is_failed` is set the session is frozen.
//!
//! ```
//! use keycracker_logic::config::CrackerConfig;
//! use keycracker_logic::items::{names, Lock, Tool};
//! use keycracker_logic::session::{Phase, Session, SessionSetup};
//!
//! let setup = SessionSetup::new(
//!     Lock::new(names::STANDARD_LOCK, 1),
//!     Tool::new(names::BASIC_PICK, 1, 10.0),
//! );
//! let mut session = Session::initialize(setup, CrackerConfig::default());
//! assert_eq!(session.total_required_entries, 10);
//!
//! session = session.on_submit_or_advance(); // start
//! session = session.on_submit_or_advance(); // done memorising
//! for symbol in session.current_sequence.clone() {
//!     session = session.on_symbol(symbol);
//! }
//! session = session.on_submit_or_advance();
//! assert_eq!(session.phase, Phase::Feedback);
//! assert_eq!(session.successful_entries, 1);
//! ```

use rand::rngs::StdRng;
use rand::SeedableRng;
use serde::{Deserialize, Serialize};

use crate::config::CrackerConfig;
use crate::difficulty::{
    attempt_penalty, calculate_required_entries, calculate_strength_reduction_per_entry,
    calculate_symbols_displayed, calculate_time_allowed_per_sequence,
    calculate_tool_damage_on_fail, passive_growth_per_second, time_decay_after_success,
    ResolverContext,
};
use crate::effects::{resolve_effects, SpecialEffects};
use crate::items::{Fortifier, Lock, Tool};
use crate::sequence::{generate_sequence, keypad_layout, Symbol, BASE_ALPHABET};

/// Display messages.
pub mod messages {
    pub const MEMORISE: &str = "memorise the sequence";
    pub const INPUT: &str = "enter the sequence";
    pub const INPUT_REVERSED: &str = "enter the sequence in reverse order";
    pub const ACCEPTED: &str = "accepted";
    pub const INVALID: &str = "invalid";
    pub const TIME_OUT: &str = "time out";
    pub const COMPLETE: &str = "lock bypassed";
    pub const FAILED: &str = "lock held";
    pub const ABORTED: &str = "aborted";
}

/// Where the session is in the round cycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Phase {
    /// Briefing before the first round.
    Instruction,
    /// Sequence is shown.
    Memorise,
    /// Player enters the sequence on the keypad.
    Input,
    /// Result of the last entry is shown.
    Feedback,
    /// Terminal; see `is_complete` / `is_failed`.
    GameOver,
}

/// Result of the most recent entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum RoundResult {
    Accepted,
    Invalid,
    TimedOut,
}

/// What the collaborator applies once the session ends.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum SessionOutcome {
    /// The lock's full strength is bypassed.
    Complete { strength_bypassed: f32 },
    /// The lock held. `tool_damage` is applied to the attacker's tool.
    Failed {
        strength_reduced: f32,
        tool_damage: f32,
    },
}

/// Everything needed to start a session.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SessionSetup {
    pub lock: Lock,
    pub fortifiers: Vec<Fortifier>,
    pub tool: Tool,
    pub attacker_level: u8,
    /// Overrides the lock level for numeric scaling.
    pub defender_level: Option<u8>,
    /// Clamped to at least 1.
    pub max_attempts_per_sequence: u32,
    /// Seed for sequence draws and effect rolls.
    pub seed: u64,
}

impl SessionSetup {
    /// Level-1 attacker, no fortifiers, three attempts, seed 0.
    pub fn new(lock: Lock, tool: Tool) -> Self {
        Self {
            lock,
            fortifiers: Vec::new(),
            tool,
            attacker_level: 1,
            defender_level: None,
            max_attempts_per_sequence: 3,
            seed: 0,
        }
    }
}

/// One infiltration attempt.
#[derive(Debug, Clone)]
pub struct Session {
    pub phase: Phase,
    /// Order the player must enter.
    pub current_sequence: Vec<Symbol>,
    /// Order shown while memorising.
    pub displayed_sequence: Vec<Symbol>,
    pub user_input: Vec<Symbol>,
    pub successful_entries: u32,
    pub total_required_entries: u32,
    pub time_remaining: u32,
    pub attempts_remaining: u32,
    pub max_attempts_per_sequence: u32,
    pub symbols_to_display_count: u32,
    /// Resolver output, fixed for the session.
    pub base_time_allowed: u32,
    /// Allowed time after in-session decay.
    pub current_time_allowed: u32,
    pub strength_reduction_per_entry: f32,
    pub special_effects: SpecialEffects,
    /// Bumped on every new sequence.
    pub sequence_id: u64,
    /// 1-based round counter; 0 before the first round.
    pub round: u32,
    pub keypad: Vec<Symbol>,
    pub message: String,
    pub last_result: Option<RoundResult>,
    pub is_complete: bool,
    pub is_failed: bool,
    pub aborted: bool,
    pub tool_damage_on_fail: f32,
    lock_strength: f32,
    pending_growth_milli: u32,
    context: ResolverContext,
    config: CrackerConfig,
    rng: StdRng,
}

impl Session {
    /// Build a session. Resolves every difficulty parameter once.
    pub fn initialize(setup: SessionSetup, config: CrackerConfig) -> Self {
        let context = ResolverContext::new(
            &setup.lock,
            &setup.fortifiers,
            &setup.tool,
            setup.attacker_level,
            setup.defender_level,
            &config,
        );
        let total_required_entries = calculate_required_entries(&context, &config);
        let base_time_allowed = calculate_time_allowed_per_sequence(&context, &config);
        let max_attempts = setup.max_attempts_per_sequence.max(1);

        log::info!(
            "key cracker: {} (level {}) vs {} (level {}): {} entries, {}s per sequence",
            setup.lock.name,
            context.lock_level,
            setup.tool.name,
            setup.tool.level,
            total_required_entries,
            base_time_allowed
        );

        Self {
            phase: Phase::Instruction,
            current_sequence: Vec::new(),
            displayed_sequence: Vec::new(),
            user_input: Vec::new(),
            successful_entries: 0,
            total_required_entries,
            time_remaining: base_time_allowed,
            attempts_remaining: max_attempts,
            max_attempts_per_sequence: max_attempts,
            symbols_to_display_count: calculate_symbols_displayed(&context, &config),
            base_time_allowed,
            current_time_allowed: base_time_allowed,
            strength_reduction_per_entry: calculate_strength_reduction_per_entry(
                &context, &config,
            ),
            special_effects: SpecialEffects::default(),
            sequence_id: 0,
            round: 0,
            keypad: BASE_ALPHABET.to_vec(),
            message: format!(
                "memorise each sequence, then enter it on the keypad. {} entries required",
                total_required_entries
            ),
            last_result: None,
            is_complete: false,
            is_failed: false,
            aborted: false,
            tool_damage_on_fail: calculate_tool_damage_on_fail(&context, &config),
            lock_strength: setup.lock.strength.current.max(0.0),
            pending_growth_milli: 0,
            context,
            config,
            rng: StdRng::seed_from_u64(setup.seed),
        }
    }

    pub fn is_terminal(&self) -> bool {
        self.is_complete || self.is_failed
    }

    /// Whether the renderer should blink the sequence right now.
    pub fn flash_active(&self) -> bool {
        self.phase == Phase::Memorise && self.special_effects.flash.is_some()
    }

    /// Whether the keypad is shown in shuffled order right now.
    pub fn keypad_shuffled(&self) -> bool {
        self.phase == Phase::Input && self.special_effects.randomize_keypad
    }

    /// Result to hand back to the collaborator, once terminal.
    pub fn outcome(&self) -> Option<SessionOutcome> {
        if self.is_complete {
            Some(SessionOutcome::Complete {
                strength_bypassed: self.lock_strength,
            })
        } else if self.aborted {
            Some(SessionOutcome::Failed {
                strength_reduced: 0.0,
                tool_damage: 0.0,
            })
        } else if self.is_failed {
            let reduced = self.successful_entries as f32 * self.strength_reduction_per_entry;
            Some(SessionOutcome::Failed {
                strength_reduced: reduced.min(self.lock_strength),
                tool_damage: self.tool_damage_on_fail,
            })
        } else {
            None
        }
    }

    // ── Events ─────────────────────────────────────────────────────────

    /// Append a keypad symbol. Ignored outside input, when the entry is
    /// already full, or for symbols that are not on the keypad.
    pub fn on_symbol(mut self, symbol: Symbol) -> Self {
        if self.phase != Phase::Input
            || !symbol.is_recognized()
            || self.user_input.len() >= self.current_sequence.len()
        {
            return self;
        }
        self.user_input.push(symbol);
        self
    }

    /// Remove the last entered symbol.
    pub fn on_backspace(mut self) -> Self {
        if self.phase == Phase::Input {
            self.user_input.pop();
        }
        self
    }

    /// The single "go" button: start, finish memorising, submit, or move on
    /// from feedback, depending on phase.
    pub fn on_submit_or_advance(self) -> Self {
        match self.phase {
            Phase::Instruction => self.begin_round(),
            Phase::Memorise => self.begin_input(),
            Phase::Input => self.submit(),
            Phase::Feedback => match self.last_result {
                Some(RoundResult::Accepted) => self.begin_round(),
                Some(RoundResult::Invalid) | Some(RoundResult::TimedOut) => self.retry(),
                None => self,
            },
            Phase::GameOver => self,
        }
    }

    /// One second of the external timer.
    pub fn on_tick(self) -> Self {
        if self.is_terminal() || !matches!(self.phase, Phase::Memorise | Phase::Input) {
            return self;
        }
        let mut session = self.apply_passive_lock_effects();
        session.time_remaining = session.time_remaining.saturating_sub(1);
        if session.time_remaining > 0 {
            return session;
        }
        match session.phase {
            Phase::Memorise => session.begin_input(),
            Phase::Input => session.consume_attempt(RoundResult::TimedOut),
            _ => session,
        }
    }

    /// Player-initiated cancellation.
    pub fn on_abort(mut self) -> Self {
        if self.is_terminal() {
            return self;
        }
        log::info!("key cracker aborted after {} entries", self.successful_entries);
        self.aborted = true;
        self.finish(false, messages::ABORTED)
    }

    /// Lock effects that run every second while the timer is live. Only the
    /// Adaptive Lock has one: its required entries keep growing.
    pub fn apply_passive_lock_effects(mut self) -> Self {
        if self.is_terminal() || !matches!(self.phase, Phase::Memorise | Phase::Input) {
            return self;
        }
        // accumulate in thousandths so fractional rates add up exactly
        let rate = (passive_growth_per_second(&self.context) * 1000.0)
            .round()
            .max(0.0) as u32;
        if rate == 0 {
            return self;
        }
        self.pending_growth_milli += rate;
        let whole = self.pending_growth_milli / 1000;
        if whole > 0 {
            self.pending_growth_milli %= 1000;
            self.total_required_entries += whole;
            let adapting = format!(
                "lock adapting: {} entries required",
                self.total_required_entries
            );
            // the reversal instruction must stay visible while typing
            self.message = if self.phase == Phase::Input && self.special_effects.reverse_sequence {
                format!("{} ({})", messages::INPUT_REVERSED, adapting)
            } else {
                adapting
            };
        }
        self
    }

    // ── Transitions ────────────────────────────────────────────────────

    fn begin_round(mut self) -> Self {
        self.round += 1;
        self.sequence_id += 1;
        self.context.successful_entries = self.successful_entries;
        self.symbols_to_display_count = calculate_symbols_displayed(&self.context, &self.config);
        self.special_effects =
            resolve_effects(&self.context, self.round, &self.config, &mut self.rng);

        let generated = generate_sequence(
            self.symbols_to_display_count,
            &self.special_effects,
            &mut self.rng,
        );
        self.displayed_sequence = generated.displayed;
        self.current_sequence = generated.expected;
        self.user_input.clear();
        self.attempts_remaining = self.max_attempts_per_sequence;
        self.time_remaining = self.current_time_allowed;
        self.last_result = None;
        self.phase = Phase::Memorise;
        self.message = messages::MEMORISE.to_string();

        log::debug!(
            "round {} (sequence {}): {} symbols, effects {:?}",
            self.round,
            self.sequence_id,
            self.current_sequence.len(),
            self.special_effects
        );
        self
    }

    fn begin_input(mut self) -> Self {
        self.keypad = keypad_layout(
            &self.current_sequence,
            self.special_effects.randomize_keypad,
            &mut self.rng,
        );
        self.enter_input()
    }

    fn retry(self) -> Self {
        self.enter_input()
    }

    fn enter_input(mut self) -> Self {
        self.phase = Phase::Input;
        self.user_input.clear();
        self.time_remaining = self.current_time_allowed;
        self.message = if self.special_effects.reverse_sequence {
            messages::INPUT_REVERSED
        } else {
            messages::INPUT
        }
        .to_string();
        self
    }

    fn submit(mut self) -> Self {
        if self.user_input.len() != self.current_sequence.len() {
            return self;
        }
        if self.user_input != self.current_sequence {
            return self.consume_attempt(RoundResult::Invalid);
        }

        self.successful_entries += 1;
        self.context.successful_entries = self.successful_entries;
        if let Some(decay) = time_decay_after_success(&self.context) {
            let floor = self.config.time_floor_seconds();
            self.current_time_allowed = self.current_time_allowed.saturating_sub(decay).max(floor);
            log::debug!("time allowed decayed to {}s", self.current_time_allowed);
        }

        if self.successful_entries >= self.total_required_entries {
            self.successful_entries = self.total_required_entries;
            log::info!("key cracker complete after {} rounds", self.round);
            return self.finish(true, messages::COMPLETE);
        }

        self.phase = Phase::Feedback;
        self.last_result = Some(RoundResult::Accepted);
        self.message = messages::ACCEPTED.to_string();
        self
    }

    /// Wrong entry or timeout: costs one attempt plus any fortifier penalty.
    fn consume_attempt(mut self, result: RoundResult) -> Self {
        let cost = 1 + attempt_penalty(&self.context, &self.config);
        self.attempts_remaining = self.attempts_remaining.saturating_sub(cost);
        self.user_input.clear();
        self.last_result = Some(result);

        if self.attempts_remaining == 0 {
            log::info!(
                "key cracker failed with {}/{} entries",
                self.successful_entries,
                self.total_required_entries
            );
            return self.finish(false, messages::FAILED);
        }

        self.phase = Phase::Feedback;
        self.message = match result {
            RoundResult::TimedOut => messages::TIME_OUT,
            _ => messages::INVALID,
        }
        .to_string();
        self
    }

    fn finish(mut self, complete: bool, message: &str) -> Self {
        self.phase = Phase::GameOver;
        self.is_complete = complete;
        self.is_failed = !complete;
        self.message = message.to_string();
        self
    }
}
