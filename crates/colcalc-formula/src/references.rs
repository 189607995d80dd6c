//! Static column-reference extraction
//!
//! Determines which columns a formula reads without parsing or executing it.
//! The scan is purely lexical, so it also works on formulas that would fail
//! to parse, which is what the validator wants.
//!
//! Classification, in order:
//! 1. quoted string literals are blanked out,
//! 2. every identifier directly after `@` is a function name,
//! 3. every identifier followed by `=` is a keyword name,
//! 4. scientific-notation numbers are removed (`1e6` would otherwise leave `e6`),
//! 5. the remaining identifier-shaped tokens, minus function names, keyword
//!    names and plain numbers, are the references.

use lazy_regex::regex;
use std::borrow::Cow;
use std::collections::BTreeSet;

/// Set of column names referenced by one or more formulas
pub type ReferenceSet = BTreeSet<String>;

/// Extract the column names a formula depends on
///
/// # Example
/// ```rust
/// use colcalc_formula::extract_references;
///
/// let refs = extract_references("@div(@clip(score, lower=0), 1e6)");
/// assert_eq!(refs.into_iter().collect::<Vec<_>>(), vec!["score"]);
///
/// assert!(extract_references("101325").is_empty());
/// ```
pub fn extract_references(formula: &str) -> ReferenceSet {
    let text = strip_string_literals(formula);

    let functions = marker_names(&text);
    let keywords: BTreeSet<&str> = regex!(r"\b([A-Za-z_][A-Za-z0-9_]*)\s*=")
        .captures_iter(&text)
        .filter_map(|caps| caps.get(1))
        .map(|m| m.as_str())
        .collect();

    let text = regex!(r"(?:\b\d+(?:\.\d*)?|\.\d+)[eE][+-]?\d+\b").replace_all(&text, " ");

    let refs: ReferenceSet = regex!(r"[A-Za-z_][A-Za-z0-9_]*(?:\.[A-Za-z_][A-Za-z0-9_]*|\[\d+\])*")
        .find_iter(&text)
        .map(|m| m.as_str())
        .filter(|token| !functions.contains(token))
        .filter(|token| !keywords.contains(token))
        .filter(|token| !is_numeric_literal(token))
        .map(str::to_string)
        .collect();

    log::trace!("references of {:?}: {:?}", formula, refs);
    refs
}

/// Union of the references of several formulas
pub fn extract_references_batch<I, S>(formulas: I) -> ReferenceSet
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    formulas
        .into_iter()
        .flat_map(|formula| extract_references(formula.as_ref()))
        .collect()
}

/// Names of every `@name` function marker in a formula, at any nesting depth
pub fn function_markers(formula: &str) -> BTreeSet<String> {
    let text = strip_string_literals(formula);
    marker_names(&text).into_iter().map(str::to_string).collect()
}

fn marker_names(text: &str) -> BTreeSet<&str> {
    regex!(r"@([A-Za-z_][A-Za-z0-9_]*)")
        .captures_iter(text)
        .filter_map(|caps| caps.get(1))
        .map(|m| m.as_str())
        .collect()
}

fn strip_string_literals(formula: &str) -> Cow<'_, str> {
    regex!(r#"'[^']*'|"[^"]*""#).replace_all(formula, " ")
}

fn is_numeric_literal(token: &str) -> bool {
    regex!(r"^(?:\d+(?:\.\d*)?|\.\d+)$").is_match(token)
}
