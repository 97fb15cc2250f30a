use drugmatch_text::{jaccard, levenshtein_ratio, normalize, token_set_ratio};
use proptest::prelude::*;

fn drug_like() -> impl Strategy<Value = String> {
    "[a-zA-Z0-9 ,/+()&éüÇ-]{0,24}"
}

proptest! {
    #[test]
    fn normalize_is_idempotent(raw in any::<String>()) {
        let once = normalize(&raw);
        prop_assert_eq!(normalize(&once), once.clone());
        prop_assert!(once.chars().all(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || c == ' '));
        prop_assert!(!once.contains("  "));
    }

    #[test]
    fn normalize_folds_drug_like_names(raw in drug_like()) {
        let once = normalize(&raw);
        prop_assert_eq!(normalize(&once), once.clone());
        prop_assert!(!once.starts_with(' ') && !once.ends_with(' '));
    }

    #[test]
    fn jaccard_is_symmetric_and_below_one(left in drug_like(), right in drug_like()) {
        let forward = jaccard(&left, &right);
        let backward = jaccard(&right, &left);
        prop_assert_eq!(forward, backward);
        prop_assert!((0.0..1.0).contains(&forward));
    }

    #[test]
    fn token_set_ratio_is_symmetric(left in drug_like(), right in drug_like()) {
        let left = normalize(&left);
        let right = normalize(&right);
        let forward = token_set_ratio(&left, &right);
        prop_assert!((forward - token_set_ratio(&right, &left)).abs() < 1e-9);
        prop_assert!((0.0..=100.0).contains(&forward));
    }

    #[test]
    fn token_set_ratio_ignores_word_order(words in proptest::collection::vec("[a-z]{1,8}", 1..5)) {
        let forward = words.join(" ");
        let mut reversed = words.clone();
        reversed.reverse();
        prop_assert_eq!(token_set_ratio(&forward, &reversed.join(" ")), 100.0);
    }

    #[test]
    fn levenshtein_ratio_of_identical_text_is_full(raw in drug_like()) {
        prop_assert_eq!(levenshtein_ratio(&raw, &raw), 100.0);
    }
}

#[test]
fn empty_names_have_zero_overlap() {
    assert_eq!(jaccard("", ""), 0.0);
}
