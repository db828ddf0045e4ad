/// Glossary parsers for the extracted document text.
///
/// The morphology papers come in two layouts:
/// - colon layout: `Term: definition ...`, running to the next `Term:` line.
///   Two-column PDFs put two terms on one line (`Term one     Term two:`) with
///   both definitions in the block, separated by an inner `Definition:` marker.
/// - definition-block layout:
///   ```text
///   Helix, Absent
///   Definition: Complete absence of the helix. objective
///   Comment: Usually part of a broader malformation.
///   ```
///
/// Parser approach: header regex per block, body runs to the next boundary match.
use std::str::FromStr;
use std::sync::LazyLock;

use regex::Regex;

use atlas_common::text::{collapse_whitespace, truncate_chars, truncate_with_ellipsis};

use crate::error::AppError;

static COLON_HEADER: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?m)^\s*([A-Z][A-Za-z,\s\-()'/]+?):\s+").expect("valid regex")
});
static COLON_BOUNDARY: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\n\s*[A-Z][A-Za-z,\s\-()'/]+?:\s").expect("valid regex")
});
static TWO_COLUMN_TERM: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^([A-Z][A-Za-z,\s\-()']+?)\s{2,}([A-Z][A-Za-z,\s\-()']+?)$").expect("valid regex")
});
static INNER_DEFINITION: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)\s+Definition[:.]?\s+").expect("valid regex"));
static LEADING_DEFINITION: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)^Definition[:.]?\s*").expect("valid regex"));
static TRAILING_DEFINITION: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)\s+Definition\s*$").expect("valid regex"));

static BLOCK_HEADER: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?m)^([A-Z][A-Za-z,\s\-()']+?)\s*\n+Definition:\s+").expect("valid regex")
});
static BLOCK_BOUNDARY: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\n\s*[A-Z][A-Za-z,\s\-()']+?\s*\n+Definition:").expect("valid regex")
});
static DEFINITION_LINE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?m)^\s*Definition:").expect("valid regex"));
static ASSESSMENT_MARKER: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)\s+(objective|subjective)\s*$").expect("valid regex"));

/// Substrings (of the lowercased term) that mark page furniture rather than a term.
static INVALID_TERM_PATTERNS: LazyLock<Vec<Regex>> = LazyLock::new(|| {
    [
        r"^anatomical?\s+variation",
        r"^all\s+the\s+",
        r"fig\.",
        r"table\s+\d",
        r"http",
        r"www\.",
        r"\.com",
        r"@",
        r"copyright",
        r"received\s+\d",
        r"doi\s*:",
        r"^\d+\.",
    ]
    .iter()
    .map(|p| Regex::new(p).expect("valid regex"))
    .collect()
});

const COLON_DEFINITION_MAX: usize = 800;
const BLOCK_DEFINITION_MAX: usize = 1500;
const COMMENT_MAX: usize = 500;

/// A term as read from one document, before categorization and cleaning.
#[derive(Debug, Clone, PartialEq)]
pub struct ParsedTerm {
    pub term: String,
    pub definition: String,
    pub comment: Option<String>,
}

pub trait TermParser {
    fn parse(&self, text: &str) -> Vec<ParsedTerm>;
}

/// Which parser to run over a document.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Layout {
    /// Definition-block layout when the text has `Definition:` lines, colon layout otherwise.
    Auto,
    Colon,
    DefinitionBlock,
}

impl FromStr for Layout {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "auto" => Ok(Layout::Auto),
            "colon" => Ok(Layout::Colon),
            "definition-block" | "definition_block" => Ok(Layout::DefinitionBlock),
            other => Err(AppError::Config(format!(
                "unknown term layout '{other}' (expected auto, colon or definition-block)"
            ))),
        }
    }
}

impl Layout {
    /// Concrete layout for `text`.
    pub fn resolve(self, text: &str) -> Layout {
        match self {
            Layout::Auto if DEFINITION_LINE.is_match(text) => Layout::DefinitionBlock,
            Layout::Auto => Layout::Colon,
            other => other,
        }
    }

    pub fn parser_for(self, text: &str) -> &'static dyn TermParser {
        match self.resolve(text) {
            Layout::DefinitionBlock => &DefinitionBlockParser,
            _ => &ColonParser,
        }
    }
}

/// `Term: definition` glossaries, including two-column artifacts.
pub struct ColonParser;

impl TermParser for ColonParser {
    fn parse(&self, text: &str) -> Vec<ParsedTerm> {
        let mut terms = Vec::new();
        for (term_line, body) in blocks(text, &COLON_HEADER, &COLON_BOUNDARY) {
            let term_line = term_line.trim();
            let body = body.trim();

            match split_two_column_term(term_line) {
                Some((first, second)) => {
                    let parts: Vec<&str> = INNER_DEFINITION.split(body).collect();
                    if parts.len() == 2 {
                        push_colon_term(&mut terms, first, parts[0]);
                        push_colon_term(&mut terms, second, parts[1]);
                    } else {
                        push_colon_term(&mut terms, first, body);
                    }
                }
                None => push_colon_term(&mut terms, term_line, body),
            }
        }
        terms
    }
}

fn push_colon_term(terms: &mut Vec<ParsedTerm>, raw_term: &str, raw_definition: &str) {
    let term = clean_term(raw_term);
    let definition = clean_definition(raw_definition);
    if is_valid_term(&term) && definition.chars().count() > 20 {
        terms.push(ParsedTerm {
            term,
            definition,
            comment: None,
        });
    }
}

/// `Term\nDefinition: ...\nComment: ...` glossaries.
pub struct DefinitionBlockParser;

impl TermParser for DefinitionBlockParser {
    fn parse(&self, text: &str) -> Vec<ParsedTerm> {
        let mut terms = Vec::new();
        for (raw_term, body) in blocks(text, &BLOCK_HEADER, &BLOCK_BOUNDARY) {
            let term = collapse_whitespace(raw_term);
            let body = body.trim();

            let (definition, comment) = match body.split_once("Comment:") {
                Some((definition, comment)) => (definition, Some(comment)),
                None => (body, None),
            };
            let definition = collapse_whitespace(definition);
            let definition = ASSESSMENT_MARKER.replace(&definition, "").into_owned();

            if !is_valid_block_term(&term, &definition) {
                continue;
            }

            let comment = comment
                .map(collapse_whitespace)
                .filter(|c| c.chars().count() > 10)
                .map(|c| truncate_chars(&c, COMMENT_MAX));

            terms.push(ParsedTerm {
                term,
                definition: truncate_chars(&definition, BLOCK_DEFINITION_MAX),
                comment,
            });
        }
        terms
    }
}

/// Header captures and bodies. Each body starts after its header and runs to the
/// first boundary found at least one character later, or to the end of the text.
fn blocks<'t>(text: &'t str, header: &Regex, boundary: &Regex) -> Vec<(&'t str, &'t str)> {
    let mut out = Vec::new();
    let mut pos = 0;
    while let Some(caps) = header.captures_at(text, pos) {
        let (Some(whole), Some(term)) = (caps.get(0), caps.get(1)) else {
            break;
        };
        let body_start = whole.end();
        let Some(first_char) = text[body_start..].chars().next() else {
            break;
        };
        let body_end = boundary
            .find_at(text, body_start + first_char.len_utf8())
            .map(|m| m.start())
            .unwrap_or(text.len());
        out.push((term.as_str(), &text[body_start..body_end]));
        pos = body_end;
    }
    out
}

/// Split `"Term one     Term two"` into its two columns when both look like terms.
fn split_two_column_term(term_line: &str) -> Option<(&str, &str)> {
    let caps = TWO_COLUMN_TERM.captures(term_line)?;
    let first = caps.get(1)?.as_str().trim();
    let second = caps.get(2)?.as_str().trim();
    let plausible = |t: &str| (4..100).contains(&t.chars().count());
    (plausible(first) && plausible(second)).then_some((first, second))
}

fn clean_term(term: &str) -> String {
    let term = collapse_whitespace(term);
    let term = term.trim_end_matches(['.', ',', ';', ':']);
    TRAILING_DEFINITION.replace(term, "").into_owned()
}

fn clean_definition(definition: &str) -> String {
    let definition = collapse_whitespace(definition);
    let definition = LEADING_DEFINITION.replace(&definition, "");
    truncate_with_ellipsis(&definition, COLON_DEFINITION_MAX)
}

fn is_valid_term(term: &str) -> bool {
    if !term.chars().next().is_some_and(char::is_uppercase) {
        return false;
    }
    let lower = term.to_lowercase();
    if INVALID_TERM_PATTERNS.iter().any(|p| p.is_match(&lower)) {
        return false;
    }
    let len = term.chars().count();
    (3..=80).contains(&len) && term.split_whitespace().count() <= 10
}

fn is_valid_block_term(term: &str, definition: &str) -> bool {
    const REJECTED_PREFIXES: [&str; 5] = ["http", "www", "DOI", "Fig", "Table"];
    const REJECTED_MARKERS: [&str; 3] = ["Copyright", "Received", "@"];
    const SECTION_WORDS: [&str; 3] = ["Definition", "Comment", "Synonym"];

    !term.is_empty()
        && term.chars().count() < 100
        && term.split_whitespace().count() <= 15
        && definition.chars().count() > 10
        && !REJECTED_PREFIXES.iter().any(|p| term.starts_with(p))
        && !REJECTED_MARKERS.iter().any(|m| term.contains(m))
        && !SECTION_WORDS.contains(&term)
}

#[cfg(test)]
mod tests {
    use super::*;

    const COLON_TEXT: &str = "\
Antihelix: A Y-shaped ridge of cartilage separating the concha from the scapha.
Helix: The folded rim of the auricle, extending from the crus
  to the lobe.
Copyright holder: Wiley Periodicals, all rights reserved in full.
";

    const BLOCK_TEXT: &str = "\
Helix, Absent
Definition: Complete absence of the helix in an otherwise formed ear. objective
Comment: This is usually seen as part of a broader malformation.

Tragus, Bifid
Definition: Cleft dividing the tragus into two distinct parts. subjective
";

    #[test]
    fn test_colon_layout() {
        let terms = ColonParser.parse(COLON_TEXT);
        assert_eq!(terms.len(), 2);
        assert_eq!(terms[0].term, "Antihelix");
        assert_eq!(
            terms[0].definition,
            "A Y-shaped ridge of cartilage separating the concha from the scapha."
        );
        assert_eq!(terms[1].term, "Helix");
        assert_eq!(
            terms[1].definition,
            "The folded rim of the auricle, extending from the crus to the lobe."
        );
        assert!(terms.iter().all(|t| t.comment.is_none()));
    }

    #[test]
    fn test_two_column_term_with_split_definition() {
        let text = "Crus helix    Tragus: The helix origin above the concha. Definition: Small cartilage flap in front of the canal.\n";
        let terms = ColonParser.parse(text);
        assert_eq!(terms.len(), 2);
        assert_eq!(terms[0].term, "Crus helix");
        assert_eq!(terms[0].definition, "The helix origin above the concha.");
        assert_eq!(terms[1].term, "Tragus");
        assert_eq!(terms[1].definition, "Small cartilage flap in front of the canal.");
    }

    #[test]
    fn test_two_column_term_without_split_keeps_first() {
        let text = "Crus helix    Tragus: The helix origin above the concha, nothing else here.\n";
        let terms = ColonParser.parse(text);
        assert_eq!(terms.len(), 1);
        assert_eq!(terms[0].term, "Crus helix");
    }

    #[test]
    fn test_short_definitions_are_dropped() {
        let terms = ColonParser.parse("Lobe: Too short.\n");
        assert!(terms.is_empty());
    }

    #[test]
    fn test_long_definition_is_capped() {
        let text = format!("Concha: {}\n", "cavity ".repeat(200));
        let terms = ColonParser.parse(&text);
        assert_eq!(terms[0].definition.chars().count(), 800);
        assert!(terms[0].definition.ends_with("..."));
    }

    #[test]
    fn test_clean_term() {
        assert_eq!(clean_term("  Crus   helix;  "), "Crus helix");
        assert_eq!(clean_term("Antitragus Definition"), "Antitragus");
    }

    #[test]
    fn test_term_validity() {
        assert!(is_valid_term("Palpebral fissure, lateral"));
        assert!(!is_valid_term("helix"));
        assert!(!is_valid_term("Ab"));
        assert!(!is_valid_term("Anatomical variation of the ear"));
        assert!(!is_valid_term("See Fig. 3"));
        assert!(!is_valid_term("Copyright notice"));
        assert!(!is_valid_term("One two three four five six seven eight nine ten eleven"));
    }

    #[test]
    fn test_definition_block_layout() {
        let terms = DefinitionBlockParser.parse(BLOCK_TEXT);
        assert_eq!(terms.len(), 2);
        assert_eq!(terms[0].term, "Helix, Absent");
        assert_eq!(
            terms[0].definition,
            "Complete absence of the helix in an otherwise formed ear."
        );
        assert_eq!(
            terms[0].comment.as_deref(),
            Some("This is usually seen as part of a broader malformation.")
        );
        assert_eq!(terms[1].term, "Tragus, Bifid");
        assert_eq!(terms[1].definition, "Cleft dividing the tragus into two distinct parts.");
        assert_eq!(terms[1].comment, None);
    }

    #[test]
    fn test_block_section_words_rejected() {
        assert!(!is_valid_block_term("Synonym", "A long enough definition"));
        assert!(!is_valid_block_term("Table 2", "A long enough definition"));
        assert!(!is_valid_block_term("Helix", "short"));
        assert!(is_valid_block_term("Helix, Absent", "A long enough definition"));
    }

    #[test]
    fn test_auto_layout_detection() {
        assert_eq!(Layout::Auto.resolve(BLOCK_TEXT), Layout::DefinitionBlock);
        assert_eq!(Layout::Auto.resolve(COLON_TEXT), Layout::Colon);
        assert_eq!(Layout::Colon.resolve(BLOCK_TEXT), Layout::Colon);
        assert_eq!(Layout::Auto.parser_for(BLOCK_TEXT).parse(BLOCK_TEXT).len(), 2);
    }

    #[test]
    fn test_layout_from_str() {
        assert_eq!("definition-block".parse::<Layout>().unwrap(), Layout::DefinitionBlock);
        assert_eq!(" Colon ".parse::<Layout>().unwrap(), Layout::Colon);
        assert!("columns".parse::<Layout>().is_err());
    }
}
