//! Custom property reference extraction.

use tracing::debug;

use crate::css::{ValueNode, parse_value};

/// A `var()` reference found at the start of a declaration value.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CustomPropertyReference {
    /// Property name, including the leading `--`.
    pub key: String,
    /// Normalized fallback text, `None` when the reference has no fallback.
    pub value: Option<String>,
}

/// Find the custom property reference of a declaration value.
///
/// Only the first top-level node is inspected, and it must be a function.
/// Its first identifier argument is the property name and its first raw
/// argument the fallback. References nested inside the fallback are left
/// alone; they are part of the fallback text.
///
/// Values that fail to parse are treated as having no reference.
pub fn extract(value: &str) -> Option<CustomPropertyReference> {
    let nodes = match parse_value(value) {
        Ok(nodes) => nodes,
        Err(err) => {
            debug!(%err, value, "skipping unparsable value");
            return None;
        }
    };

    let Some(ValueNode::Function { arguments, .. }) = nodes.first() else {
        return None;
    };

    let key = arguments.iter().find_map(|node| match node {
        ValueNode::Identifier(name) => Some(name.clone()),
        _ => None,
    })?;
    let value = arguments.iter().find_map(|node| match node {
        ValueNode::Raw(text) => Some(normalize_fallback(text)),
        _ => None,
    });

    Some(CustomPropertyReference { key, value })
}

/// Flatten a value to one line.
///
/// Line breaks are removed, runs of two or more whitespace characters
/// become a single space and the result is trimmed. Applying it twice gives
/// the same result as applying it once.
pub fn normalize_fallback(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    let mut run = 0usize;
    let mut run_start = ' ';

    for c in text.chars().filter(|c| !matches!(c, '\n' | '\r')) {
        if c.is_whitespace() {
            if run == 0 {
                run_start = c;
            }
            run += 1;
            continue;
        }
        match run {
            0 => {}
            1 => out.push(run_start),
            _ => out.push(' '),
        }
        run = 0;
        out.push(c);
    }

    out.trim().to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn reference(key: &str, value: Option<&str>) -> Option<CustomPropertyReference> {
        Some(CustomPropertyReference {
            key: key.to_string(),
            value: value.map(str::to_string),
        })
    }

    #[test]
    fn test_extracts_key_and_fallback() {
        assert_eq!(
            extract("var(--border-radius, 5px)"),
            reference("--border-radius", Some("5px"))
        );
    }

    #[test]
    fn test_reference_without_fallback() {
        assert_eq!(extract("var(--danger-radius)"), reference("--danger-radius", None));
    }

    #[test]
    fn test_nested_fallback_is_kept_whole() {
        assert_eq!(
            extract("var(--custom-border, var(--border-radius, 5px) solid var(--color-red, #FA0000))"),
            reference(
                "--custom-border",
                Some("var(--border-radius, 5px) solid var(--color-red, #FA0000)")
            )
        );
    }

    #[test]
    fn test_multiline_fallback_matches_single_line() {
        let multiline = "var(--shadow,\n    0 1px 2px   red,\n    0 0 1px blue\n  )";
        assert_eq!(
            extract(multiline),
            reference("--shadow", Some("0 1px 2px red, 0 0 1px blue"))
        );
        assert_eq!(
            extract("var(--shadow, 0 1px 2px red, 0 0 1px blue)"),
            extract(multiline)
        );
    }

    #[test]
    fn test_empty_fallback_is_empty_string() {
        assert_eq!(extract("var(--x,)"), reference("--x", Some("")));
        assert_eq!(extract("var(--x, )"), reference("--x", Some("")));
    }

    #[test]
    fn test_no_function_means_no_reference() {
        assert_eq!(extract("1.2rem"), None);
        assert_eq!(extract("red"), None);
        assert_eq!(extract(""), None);
    }

    #[test]
    fn test_function_must_come_first() {
        assert_eq!(extract("1px solid var(--color-red, red)"), None);
    }

    #[test]
    fn test_function_without_identifier() {
        assert_eq!(extract("hsla(292, 56%, 33%, 1)"), None);
        assert_eq!(extract("calc(var(--gap, 1px) * 2)"), None);
    }

    #[test]
    fn test_unparsable_value() {
        assert_eq!(extract("var(--x 4px)"), None);
        assert_eq!(extract("var(--x, 4px))"), None);
    }

    #[test]
    fn test_normalize_fallback() {
        assert_eq!(normalize_fallback("  4px  "), "4px");
        assert_eq!(normalize_fallback("a\n    b"), "a b");
        assert_eq!(normalize_fallback("a\r\n  b"), "a b");
        assert_eq!(normalize_fallback("a\tb"), "a\tb");
        assert_eq!(normalize_fallback("a \t b"), "a b");
        assert_eq!(normalize_fallback(""), "");
    }

    proptest! {
        #[test]
        fn prop_normalize_is_idempotent(s in "[a-z0-9#(),\\- \\t\\r\\n]{0,40}") {
            let once = normalize_fallback(&s);
            prop_assert_eq!(normalize_fallback(&once), once.clone());
            prop_assert!(!once.contains('\n'));
            prop_assert!(!once.contains("  "));
        }

        #[test]
        fn prop_reindenting_does_not_change_result(
            words in prop::collection::vec("[a-z0-9#]{1,6}", 1..6),
            indent in 2usize..8,
        ) {
            let single = words.join(" ");
            let multi = words.join(&format!(" \n{}", " ".repeat(indent)));
            prop_assert_eq!(normalize_fallback(&multi), normalize_fallback(&single));
        }
    }
}
