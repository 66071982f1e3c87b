//! Decide which path a value takes: allow-list cleaning or plain encoding.

use serde::Serialize;

/// Which transformation applies to a value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Classification {
    /// Contains a literal `<` and a literal `>`; cleaned by the policy
    Html,
    /// Everything else; encoded for an HTML text context
    Plain,
}

impl Classification {
    pub fn is_html(self) -> bool {
        self == Classification::Html
    }
}

/// A value is HTML iff it holds at least one literal `<` and at least one
/// literal `>`, in any order.
///
/// This is a heuristic and not a parser: `a < b > c` is HTML, while
/// `&lt;b&gt;` is plain because no literal bracket is left.
pub fn classify(value: &str) -> Classification {
    if value.contains('<') && value.contains('>') {
        Classification::Html
    } else {
        Classification::Plain
    }
}
