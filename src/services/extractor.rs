//! Turns the model's free-text replies into structured records.
//!
//! Model output carries no formatting guarantee, so every field is extracted on
//! its own and anything unreadable falls back to a default. Nothing here fails.

use lazy_static::lazy_static;
use regex::Regex;

use crate::models::{
    FocusAreaScore, Nutrient, NutrientProfile, PcosAnalysis, DEFAULT_FOCUS_SCORE,
};

// `<word> : <number> [%]`, allowing markdown emphasis around the colon
// as in `**Protein:** 42%`
const NUTRIENT_PATTERN: &str = r"(?i)(\w+)[*_]*\s*:[*_]*\s*(\d+(?:\.\d+)?)\s*%?";

lazy_static! {
    static ref NUTRIENT_REGEX: Regex =
        Regex::new(NUTRIENT_PATTERN).expect("Nutrient pattern should be valid");
}

const SCORE_MARKER: &str = "PCOS_SCORE:";
const FOCUS_MARKER: &str = "FOCUS_AREAS:";
const SUGGESTIONS_MARKER: &str = "SUGGESTIONS:";

const EMPHASIS: &[char] = &['*', '_'];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Section {
    None,
    Score,
    FocusAreas,
    Suggestions,
}

/// Pulls protein/fat/carbs/fiber percentages out of arbitrary text.
///
/// Later mentions of a nutrient overwrite earlier ones. An all-zero result
/// means nothing was found and should be shown as a warning, not as data.
pub fn extract_nutrients(text: &str) -> NutrientProfile {
    let mut profile = NutrientProfile::default();

    for caps in NUTRIENT_REGEX.captures_iter(text) {
        let label = caps[1].to_lowercase();
        let Some(nutrient) = Nutrient::from_label(&label) else {
            continue;
        };

        let Ok(value) = caps[2].parse::<f64>() else {
            continue;
        };
        if !value.is_finite() {
            continue;
        }

        let percent = value.round().clamp(0.0, 100.0) as u8;
        profile.set(nutrient, percent);
    }

    if profile.is_empty() {
        log::warn!("⚠️ No nutrient percentages found in model response");
    } else {
        log::debug!("🥗 Extracted nutrients: {:?}", profile);
    }

    profile
}

/// Parses the `PCOS_SCORE:` / `FOCUS_AREAS:` / `SUGGESTIONS:` reply format.
///
/// Sections may come in any order; the parser follows whichever marker it saw
/// last. Malformed lines are dropped without affecting their neighbours.
pub fn extract_pcos_analysis(text: &str) -> PcosAnalysis {
    let mut analysis = PcosAnalysis::default();
    let mut section = Section::None;

    for raw_line in text.lines() {
        let line = raw_line.trim();
        if line.is_empty() {
            continue;
        }

        if let Some(marker) = section_marker(line) {
            section = marker;
            if marker == Section::Score {
                analysis.overall_score = after_first_colon(line)
                    .trim()
                    .trim_matches(EMPHASIS)
                    .trim()
                    .to_string();
            }
            continue;
        }

        match section {
            Section::FocusAreas => {
                if let Some(entry) = parse_focus_area_line(line) {
                    analysis.focus_areas.insert(entry);
                }
            }
            Section::Suggestions => {
                if let Some((key, value)) = parse_suggestion_line(line) {
                    if !analysis.suggestions.set(&key, value) {
                        log::debug!("⏭️ Ignoring unknown suggestion key: {}", key);
                    }
                }
            }
            Section::Score | Section::None => {}
        }
    }

    log::debug!(
        "📋 Extracted PCOS analysis: score='{}', {} focus areas",
        analysis.overall_score,
        analysis.focus_areas.len()
    );

    analysis
}

/// Matches `PCOS_SCORE:` and friends, also when wrapped in markdown emphasis
/// (`**PCOS_SCORE:**`, `__FOCUS_AREAS__:`)
fn section_marker(line: &str) -> Option<Section> {
    let (head, _) = line.split_once(':')?;
    let label = head.trim().trim_matches(EMPHASIS).trim().to_uppercase();

    [
        (SCORE_MARKER, Section::Score),
        (FOCUS_MARKER, Section::FocusAreas),
        (SUGGESTIONS_MARKER, Section::Suggestions),
    ]
    .into_iter()
    .find(|(marker, _)| label == marker.trim_end_matches(':'))
    .map(|(_, section)| section)
}

fn after_first_colon(line: &str) -> &str {
    line.split_once(':').map(|(_, rest)| rest).unwrap_or("")
}

/// `<area>|<score>|<explanation>`; anything but exactly three parts is skipped
fn parse_focus_area_line(line: &str) -> Option<FocusAreaScore> {
    let parts: Vec<&str> = line.split('|').collect();
    let [area, score, explanation] = parts.as_slice() else {
        log::debug!("⏭️ Skipping malformed focus area line: {}", line);
        return None;
    };

    let score = score
        .trim()
        .trim_matches(&['[', ']'][..])
        .trim()
        .parse::<i64>()
        .map(|s| s.clamp(1, 5) as u8)
        .unwrap_or(DEFAULT_FOCUS_SCORE);

    Some(FocusAreaScore {
        area: area.trim().to_string(),
        score,
        explanation: explanation.trim().to_string(),
    })
}

/// `<key>: <value>`, split on the first colon. The key is canonicalized to
/// lower snake case, e.g. `Quick Fix` becomes `quick_fix`.
fn parse_suggestion_line(line: &str) -> Option<(String, String)> {
    let (key, value) = line.split_once(':')?;
    let key = key
        .trim()
        .to_lowercase()
        .split_whitespace()
        .collect::<Vec<_>>()
        .join("_");
    if key.is_empty() {
        return None;
    }
    Some((key, value.trim().to_string()))
}
