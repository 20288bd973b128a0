//! Property-based tests for time values

use super::*;
use crate::resolve::RunContext;
use proptest::prelude::*;

fn arb_unit() -> impl Strategy<Value = TimeUnit> {
    prop_oneof![Just(TimeUnit::Iteration), Just(TimeUnit::Step), Just(TimeUnit::Epoch)]
}

fn arb_value() -> impl Strategy<Value = TimeValue> {
    (0u64..1_000_000, arb_unit()).prop_map(|(m, u)| TimeValue::new(m, u))
}

fn arb_context() -> impl Strategy<Value = RunContext> {
    (1u64..512, proptest::option::of(1u64..100_000))
        .prop_map(|(bs, len)| RunContext::new(bs, len).unwrap())
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(200))]

    #[test]
    fn prop_display_parses_back(value in arb_value()) {
        prop_assert_eq!(value.to_string().parse::<TimeValue>().unwrap(), value);
    }

    #[test]
    fn prop_record_parses_back(value in arb_value()) {
        let input = TimeValueInput::from(value);
        prop_assert_eq!(TimeField::ANY.parse(&input).unwrap(), value);
    }

    #[test]
    fn prop_same_unit_compare_matches_magnitude(
        a in 0u64..1_000_000,
        b in 0u64..1_000_000,
        unit in prop_oneof![Just(TimeUnit::Iteration), Just(TimeUnit::Step)],
        ctx in proptest::option::of(arb_context()),
    ) {
        let ord = TimeValue::new(a, unit).compare(&TimeValue::new(b, unit), ctx.as_ref()).unwrap();
        prop_assert_eq!(ord, a.cmp(&b));
    }

    #[test]
    fn prop_negative_numbers_rejected(n in i64::MIN..0) {
        prop_assert!(TimeField::ANY.parse(&TimeValueInput::from(n)).is_err());
    }

    #[test]
    fn prop_fractional_numbers_rejected(whole in 0u32..10_000, frac in 0.01f64..0.99) {
        let input = TimeValueInput::Number(RawNumber::Float(f64::from(whole) + frac));
        prop_assert!(TimeField::ANY.parse(&input).is_err());
    }

    #[test]
    fn prop_accumulation_never_yields_iterations(n in 0i64..10_000) {
        let text = format!("{n} iterations");
        prop_assert!(TimeField::GRADIENT_ACCUMULATION.parse_str(&text).is_err());
        let value = TimeField::GRADIENT_ACCUMULATION.parse(&TimeValueInput::from(n)).unwrap();
        prop_assert_eq!(value.unit(), TimeUnit::Step);
    }
}
