//! Pure Key Cracker minigame logic.
//!
//! This crate contains the difficulty rules and the round state machine of
//! the Key Cracker infiltration minigame, independent of any renderer,
//! inventory store, or timer. Functions take plain data and return results,
//! making them unit-testable and portable to any front end.
//!
//! # Module Overview
//!
//! | Module | Purpose |
//! |--------|---------|
//! | [`items`] | Locks, fortifiers, tools, and their modifier registry |
//! | [`config`] | Game-wide balance knobs with JSON overrides |
//! | [`difficulty`] | Required entries, symbols, time, strength reduction |
//! | [`effects`] | Per-round special effects and activation cadences |
//! | [`sequence`] | Symbol alphabet, sequence drawing, keypad layout |
//! | [`session`] | Session state machine driven by keypad events and a 1 Hz tick |

pub mod config;
pub mod difficulty;
pub mod effects;
pub mod items;
pub mod sequence;
pub mod session;
