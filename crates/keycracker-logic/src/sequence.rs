//! Sequence generation — the symbols a player must memorise each round.
//!
//! The keypad is a 3×3 grid of the base alphabet `A`–`I`. The Quantum Lock
//! can add the out-of-alphabet entangled symbol `Ψ`, which gets its own key
//! while it is part of the sequence.
//!
//! Round effects are applied in a fixed order:
//!
//! 1. draw `count` symbols (from the base alphabet, plus `Ψ` when the round
//!    carries an extra symbol),
//! 2. splice decoy symbols from the base alphabet at random positions,
//! 3. reverse the expected input order.
//!
//! ```
//! use keycracker_logic::effects::SpecialEffects;
//! use keycracker_logic::sequence::generate_sequence;
//! use rand::SeedableRng;
//!
//! let mut rng = rand::rngs::StdRng::seed_from_u64(3);
//! let effects = SpecialEffects { reverse_sequence: true, ..Default::default() };
//! let generated = generate_sequence(5, &effects, &mut rng);
//! assert_eq!(generated.displayed.len(), 5);
//! assert!(generated.displayed.iter().rev().eq(generated.expected.iter()));
//! ```

use std::fmt;

use rand::seq::SliceRandom;
use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::effects::SpecialEffects;

/// One keypad symbol.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Symbol(pub char);

/// The base keypad alphabet, in default layout order.
pub const BASE_ALPHABET: [Symbol; 9] = [
    Symbol('A'),
    Symbol('B'),
    Symbol('C'),
    Symbol('D'),
    Symbol('E'),
    Symbol('F'),
    Symbol('G'),
    Symbol('H'),
    Symbol('I'),
];

/// Out-of-alphabet symbol injected by entangled rounds.
pub const ENTANGLED: Symbol = Symbol('Ψ');

impl Symbol {
    /// `true` for symbols that can appear in a sequence.
    pub fn is_recognized(self) -> bool {
        self == ENTANGLED || BASE_ALPHABET.contains(&self)
    }
}

impl fmt::Display for Symbol {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// A freshly generated round sequence.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GeneratedSequence {
    /// Order shown to the player while memorising.
    pub displayed: Vec<Symbol>,
    /// Order the player must enter.
    pub expected: Vec<Symbol>,
    pub reversed: bool,
}

/// Draw a round's sequence and apply the round's sequence-level effects.
pub fn generate_sequence(
    count: u32,
    effects: &SpecialEffects,
    rng: &mut impl Rng,
) -> GeneratedSequence {
    let count = count.max(1) as usize;

    let mut pool = BASE_ALPHABET.to_vec();
    if effects.extra_symbol {
        pool.push(ENTANGLED);
    }
    let mut displayed: Vec<Symbol> = (0..count)
        .map(|_| pool[rng.gen_range(0..pool.len())])
        .collect();
    if effects.extra_symbol && !displayed.contains(&ENTANGLED) {
        let slot = rng.gen_range(0..displayed.len());
        displayed[slot] = ENTANGLED;
    }

    for _ in 0..effects.decoy_symbols {
        let decoy = BASE_ALPHABET[rng.gen_range(0..BASE_ALPHABET.len())];
        let at = rng.gen_range(0..=displayed.len());
        displayed.insert(at, decoy);
    }

    let mut expected = displayed.clone();
    if effects.reverse_sequence {
        expected.reverse();
    }

    GeneratedSequence {
        displayed,
        expected,
        reversed: effects.reverse_sequence,
    }
}

/// Keypad layout for the input phase.
///
/// The entangled key is appended when the sequence needs it; the whole
/// layout is shuffled when `shuffle` is set.
pub fn keypad_layout(sequence: &[Symbol], shuffle: bool, rng: &mut impl Rng) -> Vec<Symbol> {
    let mut keys = BASE_ALPHABET.to_vec();
    if sequence.contains(&ENTANGLED) {
        keys.push(ENTANGLED);
    }
    if shuffle {
        keys.shuffle(rng);
    }
    keys
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    #[test]
    fn plain_draw_uses_base_alphabet() {
        let mut rng = StdRng::seed_from_u64(11);
        for _ in 0..50 {
            let generated = generate_sequence(6, &SpecialEffects::default(), &mut rng);
            assert_eq!(generated.displayed.len(), 6);
            assert_eq!(generated.displayed, generated.expected);
            assert!(!generated.reversed);
            assert!(generated.displayed.iter().all(|s| BASE_ALPHABET.contains(s)));
        }
    }

    #[test]
    fn zero_count_still_draws_one() {
        let mut rng = StdRng::seed_from_u64(11);
        let generated = generate_sequence(0, &SpecialEffects::default(), &mut rng);
        assert_eq!(generated.displayed.len(), 1);
    }

    #[test]
    fn extra_symbol_always_present() {
        let mut rng = StdRng::seed_from_u64(5);
        let effects = SpecialEffects {
            extra_symbol: true,
            ..Default::default()
        };
        for _ in 0..50 {
            let generated = generate_sequence(4, &effects, &mut rng);
            assert_eq!(generated.displayed.len(), 4);
            assert!(generated.displayed.contains(&ENTANGLED));
        }
    }

    #[test]
    fn decoys_lengthen_sequence_from_base_alphabet() {
        let mut rng = StdRng::seed_from_u64(5);
        let effects = SpecialEffects {
            decoy_symbols: 3,
            ..Default::default()
        };
        let generated = generate_sequence(6, &effects, &mut rng);
        assert_eq!(generated.displayed.len(), 9);
        assert!(!generated.displayed.contains(&ENTANGLED));
    }

    #[test]
    fn reversal_applies_after_decoys() {
        let mut rng = StdRng::seed_from_u64(8);
        let effects = SpecialEffects {
            decoy_symbols: 2,
            reverse_sequence: true,
            ..Default::default()
        };
        let generated = generate_sequence(6, &effects, &mut rng);
        assert!(generated.reversed);
        assert_eq!(generated.expected.len(), 8);
        let mut undone = generated.expected.clone();
        undone.reverse();
        assert_eq!(undone, generated.displayed);
    }

    #[test]
    fn same_seed_same_sequence() {
        let effects = SpecialEffects::default();
        let a = generate_sequence(6, &effects, &mut StdRng::seed_from_u64(42));
        let b = generate_sequence(6, &effects, &mut StdRng::seed_from_u64(42));
        assert_eq!(a, b);
    }

    #[test]
    fn recognized_symbols() {
        assert!(Symbol('A').is_recognized());
        assert!(ENTANGLED.is_recognized());
        assert!(!Symbol('Z').is_recognized());
        assert!(!Symbol('a').is_recognized());
    }

    #[test]
    fn keypad_includes_entangled_only_when_needed() {
        let mut rng = StdRng::seed_from_u64(1);
        assert_eq!(keypad_layout(&[Symbol('A')], false, &mut rng), BASE_ALPHABET.to_vec());
        let keys = keypad_layout(&[ENTANGLED], false, &mut rng);
        assert_eq!(keys.len(), 10);
        assert_eq!(keys.last(), Some(&ENTANGLED));
    }

    #[test]
    fn shuffled_keypad_keeps_every_key() {
        let mut rng = StdRng::seed_from_u64(1);
        let mut keys = keypad_layout(&[Symbol('A')], true, &mut rng);
        keys.sort();
        assert_eq!(keys, BASE_ALPHABET.to_vec());
    }
}
