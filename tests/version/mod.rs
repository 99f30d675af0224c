//! Integration tests for version ordering.

use installer_insight::version::{compare, highest, is_new_highest, VersionKey};
use std::cmp::Ordering;

fn permutations(items: &[&'static str]) -> Vec<Vec<&'static str>> {
    if items.len() <= 1 {
        return vec![items.to_vec()];
    }
    let mut out = Vec::new();
    for i in 0..items.len() {
        let mut rest = items.to_vec();
        let head = rest.remove(i);
        for mut tail in permutations(&rest) {
            tail.insert(0, head);
            out.push(tail);
        }
    }
    out
}

#[test]
fn test_documented_orderings() {
    assert_eq!(compare("2", "1"), Ordering::Greater);
    assert_eq!(highest(["1.0.1", "1.0", "1.0.0.1"]), Some("1.0.1"));
    assert_eq!(highest(["0.0.1-alpha", "0.0.1-alpha01"]), Some("0.0.1-alpha01"));
    assert_eq!(highest(["0.0.1-beta", "0.0.1-alpha", "0.0.1"]), Some("0.0.1"));
}

#[test]
fn test_maximum_is_permutation_invariant() {
    let set = ["1.0", "v1.0.0", "1.0.0-rc1", "1.0.0-rc01", "0.9.99", "1", "1.0-beta2", "", "x.y"];
    let expected = highest(set);
    for perm in permutations(&set[..6]) {
        let mut full = perm.clone();
        full.extend_from_slice(&set[6..]);
        assert_eq!(highest(full), expected);
    }
}

#[test]
fn test_order_is_total_and_transitive() {
    let set = ["1.2", "1.2.0", "v1.2", "1.2-alpha", "1.2-alpha1", "1.10", "01.2", "1.2-Beta", "-", ""];
    for a in set {
        assert_eq!(compare(a, a), Ordering::Equal);
        for b in set {
            assert_eq!(compare(a, b), compare(b, a).reverse(), "{a} vs {b}");
            for c in set {
                if compare(a, b) != Ordering::Greater && compare(b, c) != Ordering::Greater {
                    assert_ne!(compare(a, c), Ordering::Greater, "{a} <= {b} <= {c}");
                }
            }
        }
    }
}

#[test]
fn test_sorting_with_keys() {
    let mut versions = vec!["2.0", "10.0", "2.0-rc1", "1.99.99"];
    versions.sort_by_key(|v| VersionKey::parse(v));
    assert_eq!(versions, ["1.99.99", "2.0-rc1", "2.0", "10.0"]);
}

#[test]
fn test_new_highest_ignores_spelling() {
    let published = ["1.0", "v1.1.0", "1.2-beta"];
    for respelled in ["1.1", "v1.1", "1.1.0.0", "V1.1.0"] {
        assert!(!is_new_highest(respelled, published), "{respelled}");
    }
    assert!(!is_new_highest("1.2.0-beta", published));
    assert!(is_new_highest("1.2", published));
    assert!(is_new_highest("v1.2.0-rc1", published));
}
