//! Proptest generators for property-based testing.

use proptest::prelude::*;

use aemula_core::{ArticleDraft, ContentAddress};

/// Generate non-empty free text, including quotes, control characters and
/// non-ASCII.
pub fn text() -> impl Strategy<Value = String> {
    prop_oneof![
        "[A-Za-z0-9 ]{1,40}",
        "[\\PC]{1,40}",
        r#"["\\\x00-\x1fa-z]{1,20}"#,
    ]
}

/// Generate possibly-empty text.
pub fn maybe_empty_text() -> impl Strategy<Value = String> {
    prop_oneof![Just(String::new()), text()]
}

/// Generate an author address.
pub fn author_id() -> impl Strategy<Value = String> {
    "0x[0-9a-fA-F]{1,40}".prop_map(String::from)
}

/// Generate a valid postTime (positive unix seconds).
pub fn post_time() -> impl Strategy<Value = i64> {
    1i64..=4_102_444_800i64
}

/// Generate a draft that passes validation.
pub fn valid_draft() -> impl Strategy<Value = ArticleDraft> {
    (text(), text(), author_id(), post_time())
        .prop_map(|(title, body, author, time)| ArticleDraft::new(title, body, author, time))
}

/// Generate any draft, valid or not.
pub fn arbitrary_draft() -> impl Strategy<Value = ArticleDraft> {
    (
        maybe_empty_text(),
        maybe_empty_text(),
        maybe_empty_text(),
        prop_oneof![Just(0i64), Just(-1i64), any::<i64>(), post_time()],
    )
        .prop_map(|(title, body, author, time)| ArticleDraft::new(title, body, author, time))
}

/// Generate a CIDv1-looking address.
pub fn cid() -> impl Strategy<Value = ContentAddress> {
    "baf[a-z2-7]{8,52}".prop_map(ContentAddress::new)
}

/// Generate an ordered address list, duplicates allowed.
pub fn cid_list(max_len: usize) -> impl Strategy<Value = Vec<ContentAddress>> {
    prop::collection::vec(cid(), 0..=max_len)
}

/// Generate a list of distinct addresses, each tagged with whether it should
/// resolve.
pub fn cid_outcomes(max_len: usize) -> impl Strategy<Value = Vec<(ContentAddress, bool)>> {
    prop::collection::btree_set("[a-z2-7]{8,20}", 0..=max_len)
        .prop_flat_map(|names| {
            let len = names.len();
            (Just(names), prop::collection::vec(any::<bool>(), len))
        })
        .prop_map(|(names, available)| {
            names
                .into_iter()
                .map(|n| ContentAddress::new(format!("baf{}", n)))
                .zip(available)
                .collect()
        })
}

#[cfg(test)]
mod tests {
    use super::*;
    use aemula_core::validate;

    proptest! {
        #[test]
        fn valid_drafts_validate(draft in valid_draft()) {
            prop_assert!(validate(draft).is_ok());
        }

        #[test]
        fn cids_look_like_cids(cid in cid()) {
            prop_assert!(cid.as_str().starts_with("baf"));
        }

        #[test]
        fn outcomes_are_distinct(outcomes in cid_outcomes(20)) {
            let unique: std::collections::HashSet<_> = outcomes.iter().map(|(c, _)| c).collect();
            prop_assert_eq!(unique.len(), outcomes.len());
        }
    }
}
