//! Property-based tests for end-marker handling

use article_gen::provider::completion::{strip_end_marker, wrap_prompt, END_MARKER};
use proptest::prelude::*;

proptest! {
    #[test]
    fn stripped_text_never_contains_marker(
        before in "[a-z ]*",
        after in "[a-z ]*",
    ) {
        let text = format!("{}{}{}", before, END_MARKER, after);
        let stripped = strip_end_marker(&text);
        prop_assert!(!stripped.contains(END_MARKER));
        prop_assert_eq!(stripped.trim(), stripped.as_str());
    }

    #[test]
    fn wrapped_prompt_starts_with_original(prompt in ".*") {
        let wrapped = wrap_prompt(&prompt);
        prop_assert!(wrapped.starts_with(&prompt));
        prop_assert!(wrapped.contains(END_MARKER));
    }
}
