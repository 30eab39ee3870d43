//! Parsing of generated completion text into structured records.
//!
//! The completion API returns free-form prose with machine-readable regions
//! embedded in it, bounded and tagged by the literal markers below. This
//! module extracts those regions into typed records. All parsing here is
//! total: malformed or missing structure degrades to empty output, never to
//! an error, because generated text is unreliable by nature.
//!
//! The marker strings are a wire contract with the prompt templates in
//! [`crate::prompt`]; changing one side without the other silently breaks
//! extraction.

use crate::links::generate_product_links;
use crate::types::{RecommendationBlock, SongSuggestion};
use regex::Regex;

/// Opens the style-recommendation region of the generated text.
pub const STYLE_START_MARKER: &str = "[STYLE_RECOMMENDATIONS]";
/// Closes the style-recommendation region.
pub const STYLE_END_MARKER: &str = "[/STYLE_RECOMMENDATIONS]";
/// Introduces one category segment within the region.
pub const CATEGORY_TAG: &str = "CATEGORY:";
/// Introduces the comma-separated item list of a segment.
pub const ITEMS_TAG: &str = "ITEMS:";
/// Introduces the one-line style description of a segment.
pub const STYLE_TAG: &str = "STYLE:";
/// Introduces a suggested song title.
pub const SONG_TAG: &str = "SONG:";
/// Introduces the artist for the preceding song line.
pub const ARTIST_TAG: &str = "ARTIST:";

/// A suggestion line after classification.
///
/// Classifying first and folding second keeps the accumulation logic
/// independent of the literal tag strings.
#[derive(Debug, PartialEq, Eq)]
enum SuggestionLine<'a> {
    Song(&'a str),
    Artist(&'a str),
    Ignored,
}

fn classify_suggestion_line(line: &str) -> SuggestionLine<'_> {
    if let Some(rest) = line.strip_prefix(SONG_TAG) {
        SuggestionLine::Song(rest.trim())
    } else if let Some(rest) = line.strip_prefix(ARTIST_TAG) {
        SuggestionLine::Artist(rest.trim())
    } else {
        SuggestionLine::Ignored
    }
}

/// Parser for the structured regions of generated completion text.
///
/// Stateless; methods are pure functions of their input. The analysis flows
/// hold one instance per request, but sharing one across requests would be
/// equally fine.
#[derive(Debug, Clone)]
pub struct AnalysisParser;

impl AnalysisParser {
    /// Create a new parser instance.
    pub fn new() -> Self {
        Self
    }

    /// Extract style-recommendation records from the generated text.
    ///
    /// Scans for the first `[STYLE_RECOMMENDATIONS]` region and splits it
    /// into `CATEGORY:` segments. A segment becomes a record only if it has
    /// a non-empty category label on its first line and at least one item;
    /// anything else is silently dropped. Each record's outbound links are
    /// synthesized on the way out.
    ///
    /// Returns an empty vector when either marker is absent. Marker pairs
    /// beyond the first are ignored.
    pub fn parse_style_recommendations(&self, analysis: &str) -> Vec<RecommendationBlock> {
        let mut recommendations = Vec::new();

        let Some(content) = extract_marked_region(analysis) else {
            log::debug!("No style recommendation markers found in analysis text");
            return recommendations;
        };

        for section in content.split(CATEGORY_TAG) {
            let section = section.trim();
            if section.is_empty() {
                // Also skips any preamble before the first CATEGORY: tag.
                continue;
            }

            let mut lines = section.lines();
            let category = lines.next().map(str::trim).unwrap_or_default();
            if category.is_empty() {
                continue;
            }

            let mut items: Vec<String> = Vec::new();
            let mut style = String::new();

            // Field lines may appear in any order; a repeated tag overwrites
            // the previous value (last write wins).
            for line in lines {
                let line = line.trim();
                if let Some(rest) = line.strip_prefix(ITEMS_TAG) {
                    items = rest
                        .split(',')
                        .map(str::trim)
                        .filter(|item| !item.is_empty())
                        .map(str::to_string)
                        .collect();
                } else if let Some(rest) = line.strip_prefix(STYLE_TAG) {
                    style = rest.trim().to_string();
                }
            }

            // A category header with no items yields no record.
            if items.is_empty() {
                log::debug!("Dropping category '{category}' with no items");
                continue;
            }

            let links = generate_product_links(category, &items);
            recommendations.push(RecommendationBlock {
                category: category.to_string(),
                items,
                style,
                links,
            });
        }

        log::debug!(
            "Parsed {} style recommendation blocks",
            recommendations.len()
        );
        recommendations
    }

    /// Reconstruct `(song, artist)` pairs from suggestion-formatted text.
    ///
    /// Processes non-blank lines in order, folding `SONG:`/`ARTIST:` tags
    /// into an in-progress suggestion. A suggestion is finalized when the
    /// next `SONG:` tag arrives or the input ends, and only if its title is
    /// non-empty. An `ARTIST:` line with no suggestion in progress is
    /// dropped. Repeated `ARTIST:` lines overwrite (last write wins).
    pub fn parse_song_suggestions(&self, suggestions: &str) -> Vec<SongSuggestion> {
        let mut parsed = Vec::new();
        let mut current: Option<SongSuggestion> = None;

        for line in suggestions.lines().filter(|line| !line.trim().is_empty()) {
            match classify_suggestion_line(line) {
                SuggestionLine::Song(title) => {
                    if let Some(suggestion) = current.take() {
                        if !suggestion.song.is_empty() {
                            parsed.push(suggestion);
                        }
                    }
                    current = Some(SongSuggestion {
                        song: title.to_string(),
                        artist: String::new(),
                    });
                }
                SuggestionLine::Artist(name) => {
                    if let Some(suggestion) = current.as_mut() {
                        suggestion.artist = name.to_string();
                    }
                }
                SuggestionLine::Ignored => {}
            }
        }

        if let Some(suggestion) = current {
            if !suggestion.song.is_empty() {
                parsed.push(suggestion);
            }
        }

        log::debug!("Parsed {} song suggestions", parsed.len());
        parsed
    }

    /// Remove every style-recommendation region from the analysis text,
    /// leaving only the critic's prose for display.
    ///
    /// Unlike extraction, stripping removes all marker pairs, not just the
    /// first, so no machine-readable residue reaches the dashboard.
    pub fn strip_style_recommendations(&self, analysis: &str) -> String {
        let region = Regex::new(
            r"(?s)\[STYLE_RECOMMENDATIONS\].*?\[/STYLE_RECOMMENDATIONS\]",
        )
        .unwrap();
        region.replace_all(analysis, "").trim().to_string()
    }
}

impl Default for AnalysisParser {
    fn default() -> Self {
        Self::new()
    }
}

/// The trimmed text strictly between the first start marker and the first
/// end marker after it, or `None` when either is missing.
fn extract_marked_region(text: &str) -> Option<&str> {
    let start = text.find(STYLE_START_MARKER)? + STYLE_START_MARKER.len();
    let end = text[start..].find(STYLE_END_MARKER)? + start;
    Some(text[start..end].trim())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_extract_marked_region_requires_both_markers() {
        assert_eq!(extract_marked_region("no markers at all"), None);
        assert_eq!(
            extract_marked_region("[STYLE_RECOMMENDATIONS] dangling start"),
            None
        );
        assert_eq!(
            extract_marked_region("dangling end [/STYLE_RECOMMENDATIONS]"),
            None
        );
    }

    #[test]
    fn test_extract_marked_region_trims_content() {
        let text = "x[STYLE_RECOMMENDATIONS]\n  hello \n[/STYLE_RECOMMENDATIONS]y";
        assert_eq!(extract_marked_region(text), Some("hello"));
    }

    #[test]
    fn test_classify_suggestion_line() {
        assert_eq!(
            classify_suggestion_line("SONG: Blue"),
            SuggestionLine::Song("Blue")
        );
        assert_eq!(
            classify_suggestion_line("ARTIST: Joni Mitchell"),
            SuggestionLine::Artist("Joni Mitchell")
        );
        assert_eq!(classify_suggestion_line("a comment"), SuggestionLine::Ignored);
    }

    #[test]
    fn test_repeated_items_tag_last_write_wins() {
        let text = "[STYLE_RECOMMENDATIONS]\nCATEGORY: clothing\nITEMS: a, b\nITEMS: c\n[/STYLE_RECOMMENDATIONS]";
        let parser = AnalysisParser::new();
        let blocks = parser.parse_style_recommendations(text);
        assert_eq!(blocks.len(), 1);
        assert_eq!(blocks[0].items, vec!["c"]);
    }

    #[test]
    fn test_strip_removes_all_regions() {
        let text = "intro [STYLE_RECOMMENDATIONS]a[/STYLE_RECOMMENDATIONS] middle \
                    [STYLE_RECOMMENDATIONS]b[/STYLE_RECOMMENDATIONS] outro";
        let parser = AnalysisParser::new();
        let stripped = parser.strip_style_recommendations(text);
        assert!(!stripped.contains("STYLE_RECOMMENDATIONS"));
        assert!(stripped.starts_with("intro"));
        assert!(stripped.ends_with("outro"));
    }
}
