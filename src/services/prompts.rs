use crate::models::{Profile, FOCUS_AREAS};

pub const DETECTION_INSTRUCTION: &str = "Food Detection";

pub const DETECTION_PROMPT: &str = "Identify all food items present in the image, providing their names and estimated quantities.\n\
Answer with one bullet per item, most prominent item first, in the form:\n\
• <food name> (<estimated quantity>)";

pub const RECOMMENDATION_INSTRUCTION: &str =
    "Provide a nutritional overview and alternatives based on the provided food items.";

/// Recommendation prompt in the reply format the extractor understands,
/// tailored to the user's profile and the food list they confirmed
pub fn recommendation_prompt(profile: &Profile, food_items: &str) -> String {
    let areas = FOCUS_AREAS
        .iter()
        .map(|area| format!("{}|<score 1-5>|<one sentence explanation>", area))
        .collect::<Vec<_>>()
        .join("\n");

    let food_items = if food_items.trim().is_empty() {
        "(not confirmed, use the image)"
    } else {
        food_items.trim()
    };

    format!(
        "Act as a nutritionist specializing in managing PCOS (Polycystic Ovary Syndrome) and analyse the dish in the image.\n\
\n\
The dish contains:\n\
{food_items}\n\
\n\
The user's main symptoms are: {symptoms}.\n\
Their dietary preference is: {preference}.\n\
\n\
Reply in EXACTLY this format, with no markdown and no extra sections:\n\
\n\
Protein: <percent>%\n\
Fat: <percent>%\n\
Carbs: <percent>%\n\
Fiber: <percent>%\n\
PCOS_SCORE: <Promising | Can Do Better | Needs Improvement>\n\
FOCUS_AREAS:\n\
{areas}\n\
SUGGESTIONS:\n\
Quick Fix: <a small change for this meal>\n\
Swap Out: <an ingredient to replace and what to use instead>\n\
Pro Moves: <a habit around this meal that helps with PCOS>",
        food_items = food_items,
        symptoms = profile.symptoms.join(", "),
        preference = profile.dietary_preference,
        areas = areas,
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::services::extractor::{extract_nutrients, extract_pcos_analysis};

    #[test]
    fn test_recommendation_prompt_mentions_profile_and_areas() {
        let profile = Profile::default();
        let prompt = recommendation_prompt(&profile, "• Grilled chicken (200g)");

        assert!(prompt.contains("Grilled chicken"));
        assert!(prompt.contains(&profile.dietary_preference));
        assert!(prompt.contains(&profile.symptoms[0]));
        for area in FOCUS_AREAS {
            assert!(prompt.contains(area));
        }
    }

    #[test]
    fn test_prompt_template_extracts_to_defaults() {
        // Placeholders in the template must not be mistaken for data
        let prompt = recommendation_prompt(&Profile::default(), "");
        assert!(extract_nutrients(&prompt).is_empty());

        let analysis = extract_pcos_analysis(&prompt);
        for area in analysis.focus_areas.iter() {
            assert_eq!(area.score, 3);
        }
    }
}
