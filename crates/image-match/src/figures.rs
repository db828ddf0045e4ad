/// Figure references inside definitions and figure -> image file lookup.
use std::sync::LazyLock;

use regex::Regex;

static FIGURE_REFERENCES: LazyLock<Vec<Regex>> = LazyLock::new(|| {
    [
        r"(?i)\(Fig\.?\s*(\d+[a-z]?(?:-\d+)?)\)",
        r"(?i)\(Figs\.?\s*([\d,\s\-]+)\)",
        r"(?i)\bFigure\s+(\d+[a-z]?)",
        r"(?i)\bFIG\.?\s+(\d+[a-z]?)",
    ]
    .iter()
    .map(|p| Regex::new(p).expect("valid regex"))
    .collect()
});
static LEADING_NUMBER: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^\s*(\d+)").expect("valid regex"));
static IMAGE_NUMBER: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"[-_](\d+)\.png$").expect("valid regex"));

/// Ranges wider than this are treated as noise ("Figs. 1-9999").
const MAX_RANGE_SPAN: u32 = 50;

/// Figure numbers a definition points at, sorted and deduplicated.
///
/// Understands `(Fig. 3)`, `(Fig. 3a)`, `(Fig. 3-5)`, `(Figs. 2, 4-6)`, `Figure 7` and
/// `FIG. 8`. Letter suffixes are ignored.
pub fn extract_figure_references(definition: &str) -> Vec<u32> {
    let mut figures = Vec::new();
    for pattern in FIGURE_REFERENCES.iter() {
        for caps in pattern.captures_iter(definition) {
            if let Some(list) = caps.get(1) {
                expand_figure_list(list.as_str(), &mut figures);
            }
        }
    }
    figures.sort_unstable();
    figures.dedup();
    figures
}

fn expand_figure_list(list: &str, out: &mut Vec<u32>) {
    for part in list.split(',') {
        let part = part.trim();
        if part.is_empty() {
            continue;
        }
        match part.split_once('-') {
            Some((start, end)) => {
                let (Some(start), Some(end)) = (leading_number(start), leading_number(end)) else {
                    continue;
                };
                if end >= start && end - start <= MAX_RANGE_SPAN {
                    out.extend(start..=end);
                } else {
                    out.push(start);
                }
            }
            None => {
                if let Some(n) = leading_number(part) {
                    out.push(n);
                }
            }
        }
    }
}

fn leading_number(s: &str) -> Option<u32> {
    LEADING_NUMBER.captures(s)?.get(1)?.as_str().parse().ok()
}

/// First image in catalog order whose name ends with a numeric suffix equal to
/// `figure`: `-NNN`, `-NN`, `_NNN`, `_NN`, `-N` or `_N`, followed by `.png`.
pub fn image_for_figure(images: &[String], figure: u32) -> Option<&String> {
    let suffixes = [
        format!("-{figure:03}.png"),
        format!("-{figure:02}.png"),
        format!("_{figure:03}.png"),
        format!("_{figure:02}.png"),
        format!("-{figure}.png"),
        format!("_{figure}.png"),
    ];
    images
        .iter()
        .find(|image| suffixes.iter().any(|suffix| image.ends_with(suffix.as_str())))
}

/// Number encoded in an image file name, e.g. `ear-003.png` -> 3.
pub fn image_number(image: &str) -> Option<u32> {
    IMAGE_NUMBER.captures(image)?.get(1)?.as_str().parse().ok()
}
