/// "See X" cross references between glossary entries.
use std::sync::LazyLock;

use regex::Regex;

static SEE_REFERENCE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"^(?i:see)(?::\s*|\s+)([A-Z][A-Za-z,\s\-()']+?)(?:\s*\.|\s+[A-Z][a-z]+:|\s+\(|\s*$)",
    )
    .expect("valid regex")
});
static TRAILING_PUNCT: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"[,;:\s]+$").expect("valid regex"));
static TRAILING_FILLER: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)\s+(and|or|of|the|a|an)$").expect("valid regex"));
static FIGURE_TARGET: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)^figs?\b").expect("valid regex"));

/// Referenced term when `definition` is a cross reference, e.g. "See Tragus." -> "Tragus".
pub fn detect_see_reference(definition: &str) -> Option<String> {
    let caps = SEE_REFERENCE.captures(definition.trim())?;
    let target = caps.get(1)?.as_str().trim();
    let target = TRAILING_PUNCT.replace(target, "");
    let target = TRAILING_FILLER.replace(&target, "").trim().to_string();
    if target.is_empty() || FIGURE_TARGET.is_match(&target) {
        return None;
    }
    Some(target)
}

/// Definition text stored for a cross reference.
pub fn reference_definition(target: &str) -> String {
    format!("See: {target}")
}
