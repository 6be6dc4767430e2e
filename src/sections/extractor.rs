//! Section extraction from one document
//!
//! Two passes locate a section's span:
//!
//! 1. **Header pass**: the first header-shaped line containing one of the section's
//!    keywords opens the span; the next header-shaped line containing a keyword of
//!    *any* configured section closes it (exclusive), else the text's end does.
//! 2. **Density pass**, only when no header matched: every line is scored as
//!    `2 × hits(line) + Σ hits(neighbour)` over the five lines on each side. The first
//!    line with the highest score anchors a window from five lines before to
//!    `context_lines` after, provided the score is at least 2.
//!
//! A line is header-shaped when its trimmed length is under 100 characters and it
//! ends with `:`, starts with `#`, or is upper-case.

use crate::config::SectionConfig;
use std::fmt;

/// Lines kept after the anchor line in the density pass
pub const DEFAULT_CONTEXT_LINES: usize = 15;

const HEADER_MAX_CHARS: usize = 100;
const HEADER_MARKER: char = '#';
const NEIGHBOUR_LINES: usize = 5;
const MIN_DENSITY_SCORE: usize = 2;

/// Which pass located a section
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExtractionPass {
    /// Found under a header line
    Header,
    /// Found by keyword density
    Density,
}

impl fmt::Display for ExtractionPass {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Header => f.write_str("header"),
            Self::Density => f.write_str("density"),
        }
    }
}

/// A located section span
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Extraction {
    /// Extracted lines joined with `\n`
    pub text: String,
    /// Pass that found the span
    pub pass: ExtractionPass,
    /// First line index (inclusive)
    pub start_line: usize,
    /// Last line index (exclusive)
    pub end_line: usize,
}

impl Extraction {
    /// Number of lines in the span
    pub fn line_count(&self) -> usize {
        self.end_line - self.start_line
    }
}

/// Locates configured sections inside document text
#[derive(Debug, Clone)]
pub struct SectionExtractor {
    sections: Vec<SectionConfig>,
    boundary_keywords: Vec<String>,
    context_lines: usize,
}

impl SectionExtractor {
    /// Create an extractor for an ordered section list
    ///
    /// Keywords are lower-cased; blank and repeated keywords are dropped.
    pub fn new(sections: &[SectionConfig]) -> Self {
        let sections: Vec<SectionConfig> = sections
            .iter()
            .map(|s| SectionConfig {
                name: s.name.clone(),
                keywords: normalize_keywords(&s.keywords),
            })
            .collect();

        let all: Vec<String> = sections
            .iter()
            .flat_map(|s| s.keywords.iter().cloned())
            .collect();
        let boundary_keywords = normalize_keywords(&all);

        Self {
            sections,
            boundary_keywords,
            context_lines: DEFAULT_CONTEXT_LINES,
        }
    }

    /// Set the number of lines kept after the density anchor
    pub fn with_context_lines(mut self, context_lines: usize) -> Self {
        self.context_lines = context_lines;
        self
    }

    /// Configured sections with normalized keywords
    pub fn sections(&self) -> &[SectionConfig] {
        &self.sections
    }

    /// Lines kept after the density anchor
    pub fn context_lines(&self) -> usize {
        self.context_lines
    }

    /// Extract a section's text for `keywords`, or an empty string if absent
    pub fn extract(&self, text: &str, keywords: &[String]) -> String {
        self.locate(text, keywords)
            .map(|e| e.text)
            .unwrap_or_default()
    }

    /// Extract a configured section by name
    ///
    /// Returns `None` for an unknown section name.
    pub fn extract_section(&self, text: &str, name: &str) -> Option<String> {
        let section = self.sections.iter().find(|s| s.name == name)?;
        Some(self.extract(text, &section.keywords))
    }

    /// Locate a section's span, reporting which pass found it
    pub fn locate(&self, text: &str, keywords: &[String]) -> Option<Extraction> {
        if text.is_empty() {
            return None;
        }
        let keywords = normalize_keywords(keywords);
        if keywords.is_empty() {
            return None;
        }

        let lines: Vec<&str> = text.split('\n').collect();
        let lowered: Vec<String> = lines.iter().map(|l| l.to_lowercase()).collect();

        let (pass, (start, end)) = match self.header_span(&lines, &lowered, &keywords) {
            Some(span) => (ExtractionPass::Header, span),
            None => (
                ExtractionPass::Density,
                self.density_span(&lowered, &keywords)?,
            ),
        };

        Some(Extraction {
            text: lines[start..end].join("\n"),
            pass,
            start_line: start,
            end_line: end,
        })
    }

    fn header_span(
        &self,
        lines: &[&str],
        lowered: &[String],
        keywords: &[String],
    ) -> Option<(usize, usize)> {
        let start = (0..lines.len())
            .find(|&i| is_header_shaped(lines[i]) && contains_any(&lowered[i], keywords))?;

        let end = (start + 1..lines.len())
            .find(|&j| is_header_shaped(lines[j]) && contains_any(&lowered[j], &self.boundary_keywords))
            .unwrap_or(lines.len());

        Some((start, end))
    }

    fn density_span(&self, lowered: &[String], keywords: &[String]) -> Option<(usize, usize)> {
        let hits: Vec<usize> = lowered.iter().map(|l| count_hits(l, keywords)).collect();
        let last = hits.len() - 1;

        let mut best: Option<usize> = None;
        let mut best_score = 0;
        for i in 0..hits.len() {
            let lo = i.saturating_sub(NEIGHBOUR_LINES);
            let hi = (i + NEIGHBOUR_LINES).min(last);
            let context: usize = (lo..=hi).filter(|&j| j != i).map(|j| hits[j]).sum();
            let score = 2 * hits[i] + context;
            if score > best_score {
                best_score = score;
                best = Some(i);
            }
        }

        let anchor = best?;
        if best_score < MIN_DENSITY_SCORE {
            return None;
        }

        let start = anchor.saturating_sub(NEIGHBOUR_LINES);
        let end = (anchor + self.context_lines).min(last) + 1;
        Some((start, end))
    }
}

/// Whether a line looks like a section header
pub fn is_header_shaped(line: &str) -> bool {
    let trimmed = line.trim();
    trimmed.chars().count() < HEADER_MAX_CHARS
        && (trimmed.ends_with(':') || trimmed.starts_with(HEADER_MARKER) || is_upper_case(trimmed))
}

/// At least one cased character and no lower-case ones
fn is_upper_case(s: &str) -> bool {
    s.chars().any(char::is_uppercase) && !s.chars().any(char::is_lowercase)
}

fn contains_any(lowered: &str, keywords: &[String]) -> bool {
    keywords.iter().any(|k| lowered.contains(k.as_str()))
}

fn count_hits(lowered: &str, keywords: &[String]) -> usize {
    keywords.iter().filter(|k| lowered.contains(k.as_str())).count()
}

fn normalize_keywords(keywords: &[String]) -> Vec<String> {
    let mut normalized: Vec<String> = Vec::with_capacity(keywords.len());
    for keyword in keywords {
        let keyword = keyword.trim().to_lowercase();
        if !keyword.is_empty() && !normalized.contains(&keyword) {
            normalized.push(keyword);
        }
    }
    normalized
}
