//! Key Cracker Headless Simulation Harness
//!
//! Validates the difficulty rules and the session state machine without a
//! renderer. Runs entirely in-process — no UI, no timer thread.
//!
//! Usage:
//!   cargo run -p keycracker-simtest
//!   cargo run -p keycracker-simtest -- --verbose
//!   cargo run -p keycracker-simtest -- --config balance.json

use std::path::{Path, PathBuf};

use keycracker_logic::config::{ConfigError, CrackerConfig, MIN_TIME_FLOOR_SECONDS};
use keycracker_logic::difficulty::{self, ResolverContext};
use keycracker_logic::items::{names, Fortifier, Lock, LockKind, Tool, ToolKind};
use keycracker_logic::sequence::Symbol;
use keycracker_logic::session::{Phase, Session, SessionOutcome, SessionSetup};
use serde::Deserialize;
use tracing_subscriber::EnvFilter;

// ── Loadouts (bot-driven sessions) ──────────────────────────────────────
const LOADOUTS_JSON: &str = include_str!("../../../data/loadouts.json");

/// Upper bound on events fed to one session before the bot gives up.
const MAX_EVENTS: usize = 100_000;

#[derive(Debug, Deserialize)]
struct LockSpec {
    name: String,
    level: u8,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
enum Expect {
    Complete,
    Failed,
}

#[derive(Debug, Deserialize)]
struct Loadout {
    name: String,
    lock: LockSpec,
    fortifiers: Vec<Fortifier>,
    tool: Tool,
    seed: u64,
    /// Every Nth submission is deliberately wrong; 0 never errs.
    mistake_every: u32,
    /// Ticks the bot waits in each input phase before answering.
    idle_ticks: u32,
    expect: Expect,
}

#[derive(Debug, thiserror::Error)]
enum ScenarioError {
    #[error("failed to read {path}: {source}")]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error(transparent)]
    Config(#[from] ConfigError),
    #[error("loadout data is not valid JSON: {0}")]
    Loadouts(#[from] serde_json::Error),
}

// ── Test harness ────────────────────────────────────────────────────────

struct TestResult {
    name: String,
    passed: bool,
    detail: String,
}

fn main() {
    let args: Vec<String> = std::env::args().collect();
    let verbose = args.iter().any(|a| a == "--verbose");
    init_logging(verbose);

    let config = match args
        .iter()
        .position(|a| a == "--config")
        .and_then(|i| args.get(i + 1))
    {
        Some(path) => match load_config(Path::new(path)) {
            Ok(config) => config,
            Err(e) => {
                eprintln!("error: {}", e);
                std::process::exit(2);
            }
        },
        None => CrackerConfig::default(),
    };

    println!("=== Key Cracker Simulation Harness ===\n");

    let mut results = Vec::new();

    // 1. Scripted core rules
    results.extend(validate_core_rules(&config));

    // 2. Resolver floors across every lock, tool, and level
    results.extend(validate_resolver_sweep(&config, verbose));

    // 3. Bot-driven loadouts
    results.extend(validate_loadouts(&config, verbose));

    // 4. Seeded replay
    results.extend(validate_reproducibility(&config));

    // ── Summary ──
    println!();
    let passed = results.iter().filter(|r| r.passed).count();
    let failed = results.iter().filter(|r| !r.passed).count();
    let total = results.len();

    for r in &results {
        let icon = if r.passed { "✓" } else { "✗" };
        if !r.passed || verbose {
            println!("  {} {}: {}", icon, r.name, r.detail);
        }
    }

    println!(
        "\n=== RESULT: {}/{} passed, {} failed ===",
        passed, total, failed
    );

    if failed > 0 {
        std::process::exit(1);
    }
}

fn init_logging(verbose: bool) {
    let default = if verbose { "debug" } else { "warn" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .init();
}

fn load_config(path: &Path) -> Result<CrackerConfig, ScenarioError> {
    let json = std::fs::read_to_string(path).map_err(|source| ScenarioError::Read {
        path: path.to_path_buf(),
        source,
    })?;
    let config = CrackerConfig::from_json(&json)?;
    log::info!("loaded config override from {}", path.display());
    Ok(config)
}

// ── Session driving ─────────────────────────────────────────────────────

/// Press "advance" until the session waits for keypad input or ends.
fn to_input(mut session: Session) -> Session {
    while !matches!(session.phase, Phase::Input | Phase::GameOver) {
        session = session.on_submit_or_advance();
    }
    session
}

fn answer(mut session: Session, correct: bool) -> Session {
    let symbols: Vec<Symbol> = if correct {
        session.current_sequence.clone()
    } else {
        session
            .current_sequence
            .iter()
            .map(|&s| if s == Symbol('A') { Symbol('B') } else { Symbol('A') })
            .collect()
    };
    for symbol in symbols {
        session = session.on_symbol(symbol);
    }
    session.on_submit_or_advance()
}

/// Play a session to the end. Returns the final session and events used.
fn play(mut session: Session, mistake_every: u32, idle_ticks: u32) -> (Session, usize) {
    let mut events = 0;
    let mut submissions = 0u32;
    while !session.is_terminal() && events < MAX_EVENTS {
        session = to_input(session);
        for _ in 0..idle_ticks {
            if session.phase != Phase::Input {
                break;
            }
            session = session.on_tick();
            events += 1;
        }
        if session.phase == Phase::Input {
            submissions += 1;
            let wrong = mistake_every > 0 && submissions % mistake_every == 0;
            session = answer(session, !wrong);
        }
        events += 1;
    }
    (session, events)
}

// ── 1. Core Rules ──────────────────────────────────────────────────────

fn validate_core_rules(config: &CrackerConfig) -> Vec<TestResult> {
    println!("--- Core Rules ---");
    let mut results = Vec::new();
    let base = || {
        SessionSetup::new(
            Lock::new(names::STANDARD_LOCK, 1),
            Tool::new(names::BASIC_PICK, 1, 10.0),
        )
    };

    let plain = Session::initialize(base(), config.clone());
    results.push(TestResult {
        name: "base_lock_needs_ten_entries".into(),
        passed: plain.total_required_entries == 10 && plain.base_time_allowed == 20,
        detail: format!(
            "{} entries, {}s",
            plain.total_required_entries, plain.base_time_allowed
        ),
    });

    let mut setup = base();
    setup.fortifiers = vec![Fortifier::new(names::DUMMY, 3)];
    let dummy = Session::initialize(setup, config.clone());
    results.push(TestResult {
        name: "dummy_fortifier_adds_entries".into(),
        passed: dummy.total_required_entries == 13,
        detail: format!("{} entries", dummy.total_required_entries),
    });

    let mut master_ok = true;
    for kind in LockKind::ALL {
        for level in 1..=8 {
            let mut setup = SessionSetup::new(
                Lock::new(kind.name(), level),
                Tool::new(names::MASTER_KEY, 1, 10.0),
            );
            setup.fortifiers = vec![
                Fortifier::new(names::DUMMY, 8),
                Fortifier::new(names::AMPLIFIER, 8),
            ];
            master_ok &= Session::initialize(setup, config.clone()).total_required_entries == 1;
        }
    }
    results.push(TestResult {
        name: "master_key_forces_one_entry".into(),
        passed: master_ok,
        detail: "master key forces 1 entry on every lock and level".into(),
    });

    let solved = answer(to_input(Session::initialize(base(), config.clone())), true);
    results.push(TestResult {
        name: "one_correct_entry_counts".into(),
        passed: solved.successful_entries == 1
            && solved.phase == Phase::Feedback
            && !solved.is_complete,
        detail: format!(
            "{} entries, phase {:?}",
            solved.successful_entries, solved.phase
        ),
    });

    let mut missed = Session::initialize(base(), config.clone());
    let mut trail = Vec::new();
    for _ in 0..3 {
        missed = answer(to_input(missed), false);
        trail.push(missed.attempts_remaining);
    }
    results.push(TestResult {
        name: "three_misses_fail_session".into(),
        passed: trail == [2, 1, 0] && missed.is_failed && missed.phase == Phase::GameOver,
        detail: format!("attempts {:?}, failed={}", trail, missed.is_failed),
    });

    results
}

// ── 2. Resolver Sweep ───────────────────────────────────────────────────

fn validate_resolver_sweep(config: &CrackerConfig, verbose: bool) -> Vec<TestResult> {
    println!("--- Resolver Sweep ---");
    let mut results = Vec::new();

    let fortifier_sets: [Vec<Fortifier>; 3] = [
        Vec::new(),
        vec![
            Fortifier::new(names::DUMMY, 8),
            Fortifier::new(names::AMPLIFIER, 8),
            Fortifier::new(names::DAMPENER, 8),
        ],
        vec![
            Fortifier::new(names::NULLIFIER, 1),
            Fortifier::new(names::DECOY, 4),
        ],
    ];

    let mut checked = 0;
    let mut violations = Vec::new();
    for lock_kind in LockKind::ALL {
        for level in 1..=8 {
            let lock = Lock::new(lock_kind.name(), level);
            for tool_kind in ToolKind::ALL {
                for tool_level in [1, 4, 8] {
                    let tool = Tool::new(tool_kind.name(), tool_level, 10.0);
                    for fortifiers in &fortifier_sets {
                        let ctx = ResolverContext::new(&lock, fortifiers, &tool, 1, None, config);
                        let d = difficulty::resolve(&ctx, config);
                        checked += 1;
                        if d.required_entries < 1
                            || d.symbols_displayed < 1
                            || (d.time_allowed as f32) < MIN_TIME_FLOOR_SECONDS
                            || d.strength_reduction_per_entry < 0.0
                        {
                            violations.push(format!(
                                "{} L{} / {} L{}: {:?}",
                                lock_kind.name(),
                                level,
                                tool_kind.name(),
                                tool_level,
                                d
                            ));
                        }
                    }
                }
            }
        }
    }
    results.push(TestResult {
        name: "resolver_floors".into(),
        passed: violations.is_empty(),
        detail: if violations.is_empty() {
            format!("{} combinations within floors", checked)
        } else {
            format!("{} violations, first: {}", violations.len(), violations[0])
        },
    });

    let mut mismatches = 0;
    for lock_kind in LockKind::ALL {
        for level in 1..=8 {
            let lock = Lock::new(lock_kind.name(), level);
            let key = Tool::new(names::UNIVERSAL_KEY, config.universal_key_threshold, 10.0);
            let with = ResolverContext::new(&lock, &fortifier_sets[1], &key, 1, None, config);
            let without = ResolverContext::new(&lock, &[], &key, 1, None, config);
            if difficulty::calculate_required_entries(&with, config)
                != difficulty::calculate_required_entries(&without, config)
            {
                mismatches += 1;
            }
        }
    }
    results.push(TestResult {
        name: "universal_key_neutralizes".into(),
        passed: mismatches == 0,
        detail: format!("{} locks differ with fortifiers attached", mismatches),
    });

    if verbose {
        println!("  Required entries by lock (level 1 / 4 / 8, Basic Pick):");
        let tool = Tool::new(names::BASIC_PICK, 1, 10.0);
        for lock_kind in LockKind::ALL {
            let row: Vec<String> = [1, 4, 8]
                .iter()
                .map(|&level| {
                    let ctx = ResolverContext::new(
                        &Lock::new(lock_kind.name(), level),
                        &[],
                        &tool,
                        1,
                        None,
                        config,
                    );
                    difficulty::calculate_required_entries(&ctx, config).to_string()
                })
                .collect();
            println!("    {:15}: {}", lock_kind.name(), row.join(" / "));
        }
    }

    results
}

// ── 3. Loadouts ─────────────────────────────────────────────────────────

fn validate_loadouts(config: &CrackerConfig, verbose: bool) -> Vec<TestResult> {
    println!("--- Bot Loadouts ---");
    let mut results = Vec::new();

    let loadouts: Vec<Loadout> = match serde_json::from_str(LOADOUTS_JSON) {
        Ok(l) => l,
        Err(e) => {
            results.push(TestResult {
                name: "loadouts_parse".into(),
                passed: false,
                detail: ScenarioError::from(e).to_string(),
            });
            return results;
        }
    };

    for loadout in loadouts {
        let setup = SessionSetup {
            fortifiers: loadout.fortifiers.clone(),
            seed: loadout.seed,
            ..SessionSetup::new(
                Lock::new(loadout.lock.name.as_str(), loadout.lock.level),
                loadout.tool.clone(),
            )
        };
        let session = Session::initialize(setup, config.clone());
        let required = session.total_required_entries;
        let (session, events) = play(session, loadout.mistake_every, loadout.idle_ticks);

        let got = match session.outcome() {
            Some(SessionOutcome::Complete { .. }) => Some(Expect::Complete),
            Some(SessionOutcome::Failed { .. }) => Some(Expect::Failed),
            None => None,
        };
        if verbose {
            println!(
                "  {:24} required={:<4} rounds={:<4} events={:<6} outcome={:?}",
                loadout.name,
                required,
                session.round,
                events,
                session.outcome()
            );
        }
        results.push(TestResult {
            name: format!("loadout_{}", loadout.name),
            passed: got == Some(loadout.expect),
            detail: format!(
                "expected {:?}, got {:?} after {} rounds",
                loadout.expect, got, session.round
            ),
        });
    }

    results
}

// ── 4. Reproducibility ──────────────────────────────────────────────────

fn validate_reproducibility(config: &CrackerConfig) -> Vec<TestResult> {
    println!("--- Seeded Replay ---");
    let run = |seed| {
        let setup = SessionSetup {
            fortifiers: vec![
                Fortifier::new(names::MIRROR, 5),
                Fortifier::new(names::DECOY, 1),
            ],
            seed,
            ..SessionSetup::new(
                Lock::new(names::QUANTUM_LOCK, 6),
                Tool::new(names::OVERCLOCK_DRILL, 6, 20.0),
            )
        };
        let mut session = Session::initialize(setup, config.clone());
        let mut sequences = Vec::new();
        for _ in 0..20 {
            session = to_input(session);
            sequences.push(session.current_sequence.clone());
            session = answer(session, true);
        }
        sequences
    };

    let first = run(31337);
    let second = run(31337);
    vec![TestResult {
        name: "seeded_replay".into(),
        passed: first == second,
        detail: format!("{} sequences replayed", first.len()),
    }]
}
