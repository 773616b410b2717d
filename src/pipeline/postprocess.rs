//! Post-processing: deterministic cleanup of model-generated LaTeX.
//!
//! The instruction block asks for raw LaTeX only, yet models still wrap the
//! answer in ```` ```latex ```` fences now and then, emit CRLF line endings,
//! or pad lines with trailing spaces. These rules fix such quirks without
//! touching the document body.
//!
//! ## Rule Order
//!
//! Line endings are normalised first so the fence regex only has to match
//! LF, and the final-newline pass runs last.

use once_cell::sync::Lazy;
use regex::Regex;

/// Apply all post-processing rules to the raw model output.
///
/// Rules (applied in order):
/// 1. Normalise line endings (CRLF → LF)
/// 2. Strip an outer code fence (`latex`, `tex` or none)
/// 3. Trim trailing whitespace per line
/// 4. Collapse 3+ consecutive blank lines down to 2
/// 5. Strip invisible Unicode (zero-width spaces, BOM, …)
/// 6. Ensure the file ends with exactly one newline
pub fn clean_latex(input: &str) -> String {
    let s = normalise_line_endings(input);
    let s = strip_code_fences(&s);
    let s = trim_trailing_whitespace(&s);
    let s = collapse_blank_lines(&s);
    let s = remove_invisible_chars(&s);
    ensure_final_newline(&s)
}

// ── Rule 1: Normalise line endings ───────────────────────────────────────────

fn normalise_line_endings(input: &str) -> String {
    input.replace("\r\n", "\n").replace('\r', "\n")
}

// ── Rule 2: Strip outer code fences ──────────────────────────────────────────

static RE_OUTER_FENCES: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?s)^```[ \t]*(?:latex|tex|LaTeX)?[ \t]*\n(.*)\n```\s*$").unwrap()
});

fn strip_code_fences(input: &str) -> String {
    if let Some(caps) = RE_OUTER_FENCES.captures(input.trim()) {
        caps[1].to_string()
    } else {
        input.to_string()
    }
}

// ── Rule 3: Trim trailing whitespace per line ────────────────────────────────

fn trim_trailing_whitespace(input: &str) -> String {
    input
        .lines()
        .map(|line| line.trim_end())
        .collect::<Vec<_>>()
        .join("\n")
}

// ── Rule 4: Collapse excessive blank lines ───────────────────────────────────

static RE_BLANK_LINES: Lazy<Regex> = Lazy::new(|| Regex::new(r"\n{4,}").unwrap());

fn collapse_blank_lines(input: &str) -> String {
    RE_BLANK_LINES.replace_all(input, "\n\n\n").to_string()
}

// ── Rule 5: Remove invisible Unicode characters ─────────────────────────────

fn remove_invisible_chars(input: &str) -> String {
    input.replace(
        [
            '\u{200B}', '\u{FEFF}', '\u{200C}', '\u{200D}', '\u{2060}',
        ],
        "",
    )
}

// ── Rule 6: Ensure file ends with single newline ─────────────────────────────

fn ensure_final_newline(input: &str) -> String {
    let trimmed = input.trim_end();
    if trimmed.is_empty() {
        String::from("\n")
    } else {
        format!("{}\n", trimmed)
    }
}

// ── Tests ────────────────────────────────────────────────────────────────────
