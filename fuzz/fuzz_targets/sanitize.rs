//! Fuzz target for the value sanitizer.
//!
//! Every input must sanitize without panicking, and no denied element may
//! survive as a tag.

#![no_main]

use bulwark_xss::{Classification, HtmlPolicy, XssSanitizer, classify, encode_for_html};
use libfuzzer_sys::fuzz_target;

const DENIED: [&str; 7] = [
    "<script", "<iframe", "<object", "<embed", "<base", "<meta", "<link",
];

fuzz_target!(|input: &str| {
    let sanitizer = XssSanitizer::default();
    let result = sanitizer.sanitize_value(input);

    match result.classification {
        None => assert!(input.is_empty()),
        Some(Classification::Plain) => {
            assert_eq!(result.value, encode_for_html(input));
            assert!(!result.value.contains(['<', '>']));
        }
        Some(Classification::Html) => {
            assert_eq!(classify(input), Classification::Html);
            let cleaned = HtmlPolicy::shared().clean(input);
            assert_eq!(result.value, cleaned);

            let lower = cleaned.to_ascii_lowercase();
            for tag in DENIED {
                assert!(!lower.contains(tag), "{tag} survived in {cleaned}");
            }
        }
    }
});

