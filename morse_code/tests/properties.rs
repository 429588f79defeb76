use proptest::prelude::*;

use morse_code::{Accept, InputConfig, MorseTable, Symbol, SymbolInput};

fn symbol() -> impl Strategy<Value = Symbol> {
    prop_oneof![Just(Symbol::Dot), Just(Symbol::Dash)]
}

proptest! {
    #[test]
    fn pt_accepted_symbols_are_spaced_by_debounce(
        gaps in proptest::collection::vec(0_u64..800, 1..40),
        syms in proptest::collection::vec(symbol(), 40),
    ) {
        let mut input = SymbolInput::new(InputConfig::default(), 1_000);
        let mut now = 0;
        let mut accepted = Vec::new();
        for (gap, sym) in gaps.iter().zip(&syms) {
            now += gap;
            if input.on_symbol(*sym, now) == Accept::Accepted {
                accepted.push(now);
            }
        }
        for pair in accepted.windows(2) {
            prop_assert!(pair[1] - pair[0] >= 300);
        }
        prop_assert_eq!(input.code().len(), accepted.len());
    }

    #[test]
    fn pt_deadline_tracks_last_accepted(gaps in proptest::collection::vec(0_u64..3_000, 1..20)) {
        let mut input = SymbolInput::new(InputConfig::default(), 1_000);
        let mut now = 0;
        let mut last = None;
        for gap in gaps {
            now += gap;
            if input.on_symbol(Symbol::Dot, now) == Accept::Accepted {
                last = Some(now);
            }
            prop_assert_eq!(input.deadline(), last.map(|t| t + 2_000));
        }
    }

    #[test]
    fn pt_poll_never_fires_twice(polls in proptest::collection::vec(0_u64..10_000, 1..30)) {
        let mut input = SymbolInput::new(InputConfig::default(), 6);
        input.on_symbol(Symbol::Dash, 0);
        let mut sorted = polls;
        sorted.sort_unstable();
        let fired = sorted.iter().filter_map(|&t| input.poll(t)).count();
        let due = sorted.iter().any(|&t| t >= 2_000);
        prop_assert_eq!(fired, usize::from(due));
    }

    #[test]
    fn pt_every_char_code_decodes_back(idx in 0_usize..36) {
        let table = MorseTable::standard();
        let (c, code) = table.chars_with_codes().nth(idx).unwrap();
        prop_assert_eq!(table.letter_for(code), Some(c));
        prop_assert!(code.len() <= table.max_code_len());
    }
}
