//! Property-based tests for body content cleaning

use article_gen::model::clean_content;
use proptest::prelude::*;

proptest! {
    /// The first line never survives and the rest is kept verbatim.
    #[test]
    fn first_line_is_dropped(title in "[^\r\n]*", body in "[^\r]*") {
        let raw = format!("{}\n{}", title, body);
        prop_assert_eq!(clean_content(&raw), body);
    }

    /// Cleaned output never contains a carriage return.
    #[test]
    fn no_carriage_returns_survive(raw in any::<String>()) {
        prop_assert!(!clean_content(&raw).contains('\r'));
    }

    /// CRLF and LF inputs clean to the same text.
    #[test]
    fn crlf_and_lf_agree(lines in prop::collection::vec("[^\r\n]*", 1..8)) {
        let lf = lines.join("\n");
        let crlf = lines.join("\r\n");
        prop_assert_eq!(clean_content(&lf), clean_content(&crlf));
    }

    /// Cleaning loses exactly one line.
    #[test]
    fn line_count_drops_by_one(lines in prop::collection::vec("[^\r\n]*", 2..8)) {
        let raw = lines.join("\n");
        let cleaned = clean_content(&raw);
        prop_assert_eq!(cleaned.split('\n').count(), lines.len() - 1);
    }
}
