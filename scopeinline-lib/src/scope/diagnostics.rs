use lightningcss::stylesheet::{ParserOptions, StyleSheet};

/// Why a rewritten stylesheet did not parse.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CssDiagnostic {
    pub message: String,
    pub line: Option<u32>,
    pub column: Option<u32>,
}

/// Parses `css` with lightningcss and returns the number of top level
/// rules. Only used for reporting; the rewrite result is never changed.
pub fn check_stylesheet(css: &str) -> Result<usize, CssDiagnostic> {
    match StyleSheet::parse(css, ParserOptions::default()) {
        Ok(sheet) => Ok(sheet.rules.0.len()),
        Err(err) => Err(CssDiagnostic {
            message: err.kind.to_string(),
            line: err.loc.as_ref().map(|loc| loc.line),
            column: err.loc.as_ref().map(|loc| loc.column),
        }),
    }
}
