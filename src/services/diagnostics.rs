use crate::models::{Diagnostic, ToolFamily};
use regex::Regex;

/// Extracts normalized error locations from raw minifier output.
///
/// This is pattern matching, not parsing: the raw text is usually a full
/// exception dump and only a small fragment of it is meaningful. Each tool
/// family has its own extraction rules, tried in a fixed order, and the
/// first match wins. Adding a third tool family means adding a rule here;
/// callers are untouched.
///
/// The extractor pre-compiles its patterns at construction time:
///
/// - `parse_error`: the JS minifier's `<label> at <identifier>:<line>,<column>`
///   fragment, e.g. "Parse error at 0:114,5"
/// - `line_field` / `column_field`: the CSS minifier's separate
///   `line: <int>` and `column: <int>` key-value fragments
/// - `kind_field`: the CSS minifier's optional `kind: <Identifier>(` error
///   category tag, e.g. "kind: InvalidSelector("
pub struct DiagnosticExtractor {
    parse_error: Regex,
    line_field: Regex,
    column_field: Regex,
    kind_field: Regex,
}

impl DiagnosticExtractor {
    pub fn new() -> Self {
        Self {
            parse_error: Regex::new(r"\bat\s+(\S+):(\d+),(\d+)")
                .expect("Invalid parse error regex"),
            line_field: Regex::new(r"line:\s*(\d+)").expect("Invalid line field regex"),
            column_field: Regex::new(r"column:\s*(\d+)").expect("Invalid column field regex"),
            kind_field: Regex::new(r"kind:\s*([A-Za-z_][A-Za-z0-9_]*)\s*\(")
                .expect("Invalid kind field regex"),
        }
    }

    /// Extract a located diagnostic from raw error text.
    ///
    /// Line and column are taken 0-based, exactly as found. Returns `None`
    /// when no rule for the family matches or a captured number does not
    /// parse; the caller then falls back to presenting the raw text.
    pub fn extract(&self, raw: &str, family: ToolFamily) -> Option<Diagnostic> {
        let diagnostic = match family {
            ToolFamily::Js => self.extract_parse_error(raw),
            ToolFamily::Css => self.extract_location_fields(raw),
        };

        if diagnostic.is_none() {
            tracing::debug!("no recognized {} error pattern in tool output", family.label());
        }
        diagnostic
    }

    /// Rule for `<label> at <identifier>:<line>,<column>` fragments
    fn extract_parse_error(&self, raw: &str) -> Option<Diagnostic> {
        let caps = self.parse_error.captures(raw)?;
        let line = caps.get(2)?.as_str().parse().ok()?;
        let column = caps.get(3)?.as_str().parse().ok()?;

        Some(Diagnostic {
            line,
            column,
            message: summary_line(raw),
            kind: None,
        })
    }

    /// Rule for separate `line: <int>` / `column: <int>` fragments with an
    /// optional `kind: <Identifier>(` category
    fn extract_location_fields(&self, raw: &str) -> Option<Diagnostic> {
        let line = self
            .line_field
            .captures(raw)
            .and_then(|c| c.get(1))?
            .as_str()
            .parse()
            .ok()?;
        let column = self
            .column_field
            .captures(raw)
            .and_then(|c| c.get(1))?
            .as_str()
            .parse()
            .ok()?;
        let kind = self
            .kind_field
            .captures(raw)
            .and_then(|c| c.get(1))
            .map(|m| m.as_str().to_string());

        Some(Diagnostic {
            line,
            column,
            message: summary_line(raw),
            kind,
        })
    }
}

impl Default for DiagnosticExtractor {
    fn default() -> Self {
        Self::new()
    }
}

/// First non-empty line of the raw text, trimmed
fn summary_line(raw: &str) -> String {
    raw.lines()
        .map(str::trim)
        .find(|l| !l.is_empty())
        .unwrap_or("")
        .to_string()
}
