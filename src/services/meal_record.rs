use chrono::{DateTime, TimeZone, Timelike};

use crate::models::{
    ImageUpload, MealLogEntry, MealType, NutrientProfile, PcosAnalysis, DEFAULT_FOCUS_SCORE,
    UNKNOWN_MEAL_NAME,
};

pub const TIME_FORMAT: &str = "%H:%M";
pub const DATE_FORMAT: &str = "%Y-%m-%d";

/// Classifies a local timestamp by its hour of day
pub fn classify_meal_type<Tz: TimeZone>(now: &DateTime<Tz>) -> MealType {
    MealType::from_hour(now.hour())
}

/// Short meal name from a bullet list of food items.
///
/// Takes the first line with content, drops bullet markup and anything from the
/// first parenthesis on (usually a weight like "(150g)").
pub fn derive_meal_name(details: &str) -> String {
    details
        .lines()
        .map(|line| line.trim())
        .find(|line| !line.is_empty())
        .map(|line| {
            let line = strip_bullet(line);
            let line = match line.find('(') {
                Some(idx) => &line[..idx],
                None => line,
            };
            line.trim().trim_end_matches('*').trim().to_string()
        })
        .filter(|name| !name.is_empty())
        .unwrap_or_else(|| UNKNOWN_MEAL_NAME.to_string())
}

fn strip_bullet(line: &str) -> &str {
    let line = line
        .trim_start_matches(|c: char| c.is_whitespace() || matches!(c, '•' | '-' | '*' | '+' | '·'));

    // Numbered lists: "1. Rice" or "2) Beans", but not "1.5 cups rice"
    let digits = line.chars().take_while(|c| c.is_ascii_digit()).count();
    if digits > 0 {
        let rest = &line[digits..];
        if let Some(rest) = rest.strip_prefix('.').or_else(|| rest.strip_prefix(')')) {
            if rest.is_empty() || rest.starts_with(char::is_whitespace) {
                return rest.trim_start();
            }
        }
    }

    line.trim_start()
}

/// Star rating for a new entry: mean focus-area score, or the neutral score
/// when the meal was never analysed
pub fn derive_rating(pcos: &PcosAnalysis) -> u8 {
    if pcos.focus_areas.is_empty() {
        return DEFAULT_FOCUS_SCORE;
    }
    let total: u32 = pcos.focus_areas.iter().map(|a| a.score as u32).sum();
    let mean = total as f64 / pcos.focus_areas.len() as f64;
    (mean.round() as u8).clamp(1, 5)
}

/// Builds the log entry recorded by "Log Activity"
pub fn assemble_entry<Tz: TimeZone>(
    now: &DateTime<Tz>,
    details: &str,
    image: ImageUpload,
    nutrition: Option<NutrientProfile>,
    pcos: Option<PcosAnalysis>,
) -> MealLogEntry
where
    Tz::Offset: std::fmt::Display,
{
    let pcos = pcos.unwrap_or_default();
    let entry = MealLogEntry {
        meal_type: classify_meal_type(now),
        name: derive_meal_name(details),
        details: details.to_string(),
        time: now.format(TIME_FORMAT).to_string(),
        date: now.format(DATE_FORMAT).to_string(),
        image: image.bytes,
        image_mime_type: image.mime_type,
        nutrition: nutrition.unwrap_or_default(),
        rating: derive_rating(&pcos),
        pcos,
    };

    log::debug!(
        "🍽️ Assembled {} entry '{}' at {} {}",
        entry.meal_type,
        entry.name,
        entry.date,
        entry.time
    );

    entry
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{FocusAreaScore, Suggestions};
    use chrono_tz::Tz;

    fn at(hour: u32, minute: u32) -> DateTime<Tz> {
        chrono_tz::Europe::Istanbul
            .with_ymd_and_hms(2024, 3, 8, hour, minute, 0)
            .unwrap()
    }

    fn jpeg() -> ImageUpload {
        ImageUpload::new(vec![0xFF, 0xD8, 0xFF], "image/jpeg").unwrap()
    }

    #[test]
    fn test_classify_meal_type() {
        assert_eq!(classify_meal_type(&at(7, 0)), MealType::Breakfast);
        assert_eq!(classify_meal_type(&at(13, 0)), MealType::Lunch);
        assert_eq!(classify_meal_type(&at(20, 0)), MealType::Dinner);
        assert_eq!(classify_meal_type(&at(1, 0)), MealType::Dinner);
    }

    #[test]
    fn test_derive_meal_name_from_bullets() {
        assert_eq!(
            derive_meal_name("• Grilled chicken (200g)\n• Rice (100g)"),
            "Grilled chicken"
        );
    }

    #[test]
    fn test_derive_meal_name_skips_blank_lines_and_markup() {
        assert_eq!(derive_meal_name("\n\n  - **Oatmeal** (1 bowl)\n- Berries"), "Oatmeal");
        assert_eq!(derive_meal_name("1. Lentil soup\n2. Bread"), "Lentil soup");
        assert_eq!(derive_meal_name("Avocado toast"), "Avocado toast");
    }

    #[test]
    fn test_derive_meal_name_keeps_leading_quantities() {
        assert_eq!(
            derive_meal_name("1.5 cups oatmeal (cooked)\n• Berries"),
            "1.5 cups oatmeal"
        );
        assert_eq!(derive_meal_name("2 eggs (scrambled)"), "2 eggs");
        assert_eq!(derive_meal_name("3) 0.5 avocado"), "0.5 avocado");
    }

    #[test]
    fn test_derive_meal_name_defaults() {
        assert_eq!(derive_meal_name(""), UNKNOWN_MEAL_NAME);
        assert_eq!(derive_meal_name("   \n \n"), UNKNOWN_MEAL_NAME);
        assert_eq!(derive_meal_name("• (200g)"), UNKNOWN_MEAL_NAME);
    }

    #[test]
    fn test_derive_rating() {
        assert_eq!(derive_rating(&PcosAnalysis::default()), 3);

        let mut pcos = PcosAnalysis::default();
        for (area, score) in [("A", 4), ("B", 5), ("C", 4), ("D", 5)] {
            pcos.focus_areas.insert(FocusAreaScore {
                area: area.to_string(),
                score,
                explanation: String::new(),
            });
        }
        assert_eq!(derive_rating(&pcos), 5);
    }

    #[test]
    fn test_assemble_entry_with_analysis() {
        let nutrition = NutrientProfile {
            protein: 40,
            fat: 20,
            carbs: 30,
            fiber: 10,
        };
        let mut pcos = PcosAnalysis {
            overall_score: "Promising".to_string(),
            suggestions: Suggestions {
                quick_fix: "Add greens".to_string(),
                ..Default::default()
            },
            ..Default::default()
        };
        pcos.focus_areas.insert(FocusAreaScore {
            area: "Fiber & Nutrients".to_string(),
            score: 2,
            explanation: "Low fiber".to_string(),
        });

        let details = "• Grilled chicken (200g)\n• Rice (100g)";
        let entry = assemble_entry(&at(12, 45), details, jpeg(), Some(nutrition), Some(pcos.clone()));

        assert_eq!(entry.meal_type, MealType::Lunch);
        assert_eq!(entry.name, "Grilled chicken");
        assert_eq!(entry.details, details);
        assert_eq!(entry.time, "12:45");
        assert_eq!(entry.date, "2024-03-08");
        assert_eq!(entry.image, vec![0xFF, 0xD8, 0xFF]);
        assert_eq!(entry.image_mime_type, "image/jpeg");
        assert_eq!(entry.nutrition, nutrition);
        assert_eq!(entry.pcos, pcos);
        assert_eq!(entry.rating, 2);
    }

    #[test]
    fn test_assemble_entry_without_analysis() {
        let entry = assemble_entry(&at(2, 5), "", jpeg(), None, None);

        assert_eq!(entry.meal_type, MealType::Dinner);
        assert_eq!(entry.name, UNKNOWN_MEAL_NAME);
        assert!(entry.nutrition.is_empty());
        assert_eq!(entry.pcos, PcosAnalysis::default());
        assert_eq!(entry.rating, 3);
    }
}
