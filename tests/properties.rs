use proptest::prelude::*;

use vibe_index::config::WeightConfig;
use vibe_index::estimators::{LexicalBaseline, SocialLexicon};
use vibe_index::models::{comment_id, Source};
use vibe_index::weights::{bias_discount, WeightModel};

fn source() -> impl Strategy<Value = Source> {
    prop_oneof![
        Just(Source::Reddit),
        Just(Source::YouTube),
        Just(Source::Twitter),
        Just(Source::NewsComments),
        Just(Source::Unknown),
    ]
}

proptest! {
    #[test]
    fn length_weight_is_bounded_and_monotone(a in 1usize..2000, b in 1usize..2000) {
        let m = WeightModel::new(&WeightConfig::default());
        let (lo, hi) = if a <= b { (a, b) } else { (b, a) };
        prop_assert!((0.1..=1.0).contains(&m.length_weight(lo)));
        prop_assert!(m.length_weight(lo) <= m.length_weight(hi));
    }

    #[test]
    fn credibility_is_bounded_and_non_decreasing(src in source(), a in -1_000_000i64..1_000_000, b in -1_000_000i64..1_000_000) {
        let m = WeightModel::new(&WeightConfig::default());
        let (lo, hi) = if a <= b { (a, b) } else { (b, a) };
        let (c_lo, c_hi) = (m.credibility(src, lo), m.credibility(src, hi));
        prop_assert!((5.0..=100.0).contains(&c_lo));
        prop_assert!((5.0..=100.0).contains(&c_hi));
        prop_assert!(c_lo <= c_hi);
    }

    #[test]
    fn combined_weight_never_vanishes(cred in 5.0f64..=100.0, len_w in 0.0f64..=1.0, bias in 0.0f64..=100.0) {
        let m = WeightModel::new(&WeightConfig::default());
        let w = m.combined_weight(cred, len_w, bias);
        prop_assert!(w >= 0.01);
        prop_assert!(w <= 1.0);
        prop_assert!((0.0..=1.0).contains(&bias_discount(bias)));
    }

    #[test]
    fn comment_ids_are_stable(src in source(), id in "[a-zA-Z0-9_]{1,24}") {
        prop_assert_eq!(comment_id(src, &id), comment_id(src, &id));
        prop_assert_eq!(comment_id(src, &id).len(), 16);
    }

    #[test]
    fn lexical_scores_stay_in_range(text in "\\PC{0,200}") {
        let b = LexicalBaseline::new().score(&text);
        let s = SocialLexicon::new().score(&text);
        prop_assert!((0.0..=100.0).contains(&b));
        prop_assert!((0.0..=100.0).contains(&s));
    }
}
