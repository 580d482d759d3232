use serde::{Deserialize, Serialize};

/// Placeholder name used when the food item description has no usable line
pub const UNKNOWN_MEAL_NAME: &str = "Unknown Meal";

/// Score given to a focus area when the model's score can't be read
pub const DEFAULT_FOCUS_SCORE: u8 = 3;

/// The four areas the recommendation prompt asks the model to score
pub const FOCUS_AREAS: [&str; 4] = [
    "Hormonal Balance & Insulin Sensitivity",
    "Protein & Healthy Fats",
    "Fiber & Nutrients",
    "Inflammation & Portion Control",
];

pub const ALL_SYMPTOMS: [&str; 8] = [
    "Irregular Periods (Menstrual Irregularities)",
    "Weight Gain or Difficulty Losing Weight",
    "Acne and Oily Skin",
    "Excess Hair Growth (Hirsutism)",
    "Hair Loss (Alopecia)",
    "Fatigue",
    "Mood Swings and Anxiety",
    "Infertility or Trouble Conceiving",
];

pub const DIETARY_PREFERENCES: [&str; 10] = [
    "Vegetarian",
    "Ketogenic (Keto)",
    "Gluten-Free",
    "Lactose-Free",
    "Halal",
    "Kosher",
    "Low-Carb",
    "Mediterranean",
    "Raw Foodism",
    "Flexitarian",
];

pub const MAX_SYMPTOMS: usize = 3;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Nutrient {
    Protein,
    Fat,
    Carbs,
    Fiber,
}

impl Nutrient {
    pub const ALL: [Nutrient; 4] = [
        Nutrient::Protein,
        Nutrient::Fat,
        Nutrient::Carbs,
        Nutrient::Fiber,
    ];

    /// Matches an already lower-cased label against the closed nutrient set
    pub fn from_label(label: &str) -> Option<Self> {
        match label {
            "protein" => Some(Nutrient::Protein),
            "fat" => Some(Nutrient::Fat),
            "carbs" => Some(Nutrient::Carbs),
            "fiber" => Some(Nutrient::Fiber),
            _ => None,
        }
    }
}

impl std::fmt::Display for Nutrient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            Nutrient::Protein => "Protein",
            Nutrient::Fat => "Fat",
            Nutrient::Carbs => "Carbs",
            Nutrient::Fiber => "Fiber",
        };
        write!(f, "{}", s)
    }
}

/// Approximate share of each nutrient in a dish, in percent.
///
/// Values are independent estimates and are not expected to sum to 100.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct NutrientProfile {
    pub protein: u8,
    pub fat: u8,
    pub carbs: u8,
    pub fiber: u8,
}

impl NutrientProfile {
    pub fn get(&self, nutrient: Nutrient) -> u8 {
        match nutrient {
            Nutrient::Protein => self.protein,
            Nutrient::Fat => self.fat,
            Nutrient::Carbs => self.carbs,
            Nutrient::Fiber => self.fiber,
        }
    }

    pub fn set(&mut self, nutrient: Nutrient, value: u8) {
        let value = value.min(100);
        match nutrient {
            Nutrient::Protein => self.protein = value,
            Nutrient::Fat => self.fat = value,
            Nutrient::Carbs => self.carbs = value,
            Nutrient::Fiber => self.fiber = value,
        }
    }

    /// All four values at zero means nothing was extracted
    pub fn is_empty(&self) -> bool {
        Nutrient::ALL.iter().all(|n| self.get(*n) == 0)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FocusAreaScore {
    pub area: String,
    pub score: u8,
    pub explanation: String,
}

/// Focus areas in the order the model first mentioned them
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct FocusAreaAssessment {
    areas: Vec<FocusAreaScore>,
}

impl FocusAreaAssessment {
    /// Records an area, replacing an earlier entry with the same name
    pub fn insert(&mut self, entry: FocusAreaScore) {
        match self.areas.iter_mut().find(|a| a.area == entry.area) {
            Some(existing) => *existing = entry,
            None => self.areas.push(entry),
        }
    }

    #[cfg(test)]
    pub fn get(&self, area: &str) -> Option<&FocusAreaScore> {
        self.areas.iter().find(|a| a.area == area)
    }

    pub fn iter(&self) -> impl Iterator<Item = &FocusAreaScore> {
        self.areas.iter()
    }

    pub fn len(&self) -> usize {
        self.areas.len()
    }

    pub fn is_empty(&self) -> bool {
        self.areas.is_empty()
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Suggestions {
    pub quick_fix: String,
    pub swap_out: String,
    pub pro_moves: String,
}

impl Suggestions {
    /// Stores a value under its canonical key; unknown keys are ignored
    pub fn set(&mut self, key: &str, value: String) -> bool {
        match key {
            "quick_fix" => self.quick_fix = value,
            "swap_out" => self.swap_out = value,
            "pro_moves" => self.pro_moves = value,
            _ => return false,
        }
        true
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum OverallRating {
    Promising,
    CanDoBetter,
    NeedsImprovement,
}

impl OverallRating {
    pub fn from_string(s: &str) -> Option<Self> {
        match s.trim().to_lowercase().as_str() {
            "promising" => Some(OverallRating::Promising),
            "can do better" => Some(OverallRating::CanDoBetter),
            "needs improvement" => Some(OverallRating::NeedsImprovement),
            _ => None,
        }
    }
}

impl std::fmt::Display for OverallRating {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            OverallRating::Promising => "Promising",
            OverallRating::CanDoBetter => "Can Do Better",
            OverallRating::NeedsImprovement => "Needs Improvement",
        };
        write!(f, "{}", s)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PcosAnalysis {
    /// Verbatim text from the `PCOS_SCORE:` line, empty when absent
    pub overall_score: String,
    pub focus_areas: FocusAreaAssessment,
    pub suggestions: Suggestions,
}

impl PcosAnalysis {
    pub fn overall_rating(&self) -> Option<OverallRating> {
        OverallRating::from_string(&self.overall_score)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum MealType {
    Breakfast,
    Lunch,
    Dinner,
}

impl std::fmt::Display for MealType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            MealType::Breakfast => "Breakfast",
            MealType::Lunch => "Lunch",
            MealType::Dinner => "Dinner",
        };
        write!(f, "{}", s)
    }
}

impl MealType {
    /// Breakfast is [3,11), lunch [11,15); every other hour, including the
    /// 0-2 late-night window, counts as dinner.
    pub fn from_hour(hour: u32) -> Self {
        match hour {
            3..=10 => MealType::Breakfast,
            11..=14 => MealType::Lunch,
            _ => MealType::Dinner,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MealLogEntry {
    pub meal_type: MealType,
    pub name: String,
    pub details: String,
    pub time: String,
    pub date: String,
    #[serde(skip)]
    pub image: Vec<u8>,
    pub image_mime_type: String,
    pub nutrition: NutrientProfile,
    pub pcos: PcosAnalysis,
    pub rating: u8,
}

/// Fields a user may change on a logged meal
#[derive(Debug, Clone, Default, Deserialize)]
pub struct MealEdit {
    pub name: Option<String>,
    pub details: Option<String>,
    pub time: Option<String>,
    pub rating: Option<u8>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Profile {
    pub symptoms: Vec<String>,
    pub dietary_preference: String,
}

impl Default for Profile {
    fn default() -> Self {
        Self {
            symptoms: ALL_SYMPTOMS[..MAX_SYMPTOMS]
                .iter()
                .map(|s| s.to_string())
                .collect(),
            dietary_preference: DIETARY_PREFERENCES[0].to_string(),
        }
    }
}

/// An uploaded dish photo
#[derive(Debug, Clone)]
pub struct ImageUpload {
    pub bytes: Vec<u8>,
    pub mime_type: String,
}

impl ImageUpload {
    /// Accepts JPEG and PNG only; `image/jpg` is normalized to `image/jpeg`
    pub fn new(bytes: Vec<u8>, mime_type: &str) -> Option<Self> {
        let mime_type = match mime_type.to_lowercase().as_str() {
            "image/jpeg" | "image/jpg" => "image/jpeg",
            "image/png" => "image/png",
            _ => return None,
        };
        Some(Self {
            bytes,
            mime_type: mime_type.to_string(),
        })
    }
}

/// Work in progress on the recommendation screen, before "Log Activity"
#[derive(Debug, Clone, Default)]
pub struct MealDraft {
    pub image: Option<ImageUpload>,
    pub detected_items: String,
    pub edited_items: Option<String>,
    pub nutrition: Option<NutrientProfile>,
    pub pcos: Option<PcosAnalysis>,
    pub recommendation: Option<String>,
}

impl MealDraft {
    /// The user's edited food list if they saved one, otherwise the detected list
    pub fn food_items(&self) -> &str {
        self.edited_items.as_deref().unwrap_or(&self.detected_items)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_meal_type_boundaries() {
        assert_eq!(MealType::from_hour(7), MealType::Breakfast);
        assert_eq!(MealType::from_hour(13), MealType::Lunch);
        assert_eq!(MealType::from_hour(20), MealType::Dinner);
        assert_eq!(MealType::from_hour(1), MealType::Dinner);
        assert_eq!(MealType::from_hour(3), MealType::Breakfast);
        assert_eq!(MealType::from_hour(11), MealType::Lunch);
        assert_eq!(MealType::from_hour(15), MealType::Dinner);
        assert_eq!(MealType::from_hour(2), MealType::Dinner);
    }

    #[test]
    fn test_focus_area_insert_replaces_same_name() {
        let mut areas = FocusAreaAssessment::default();
        areas.insert(FocusAreaScore {
            area: "Fiber & Nutrients".to_string(),
            score: 2,
            explanation: "first".to_string(),
        });
        areas.insert(FocusAreaScore {
            area: "Protein & Healthy Fats".to_string(),
            score: 4,
            explanation: "second".to_string(),
        });
        areas.insert(FocusAreaScore {
            area: "Fiber & Nutrients".to_string(),
            score: 5,
            explanation: "third".to_string(),
        });

        assert_eq!(areas.len(), 2);
        assert_eq!(areas.get("Fiber & Nutrients").unwrap().score, 5);
        assert_eq!(areas.iter().next().unwrap().area, "Fiber & Nutrients");
    }

    #[test]
    fn test_overall_rating_from_string() {
        assert_eq!(OverallRating::from_string(" Promising "), Some(OverallRating::Promising));
        assert_eq!(OverallRating::from_string("can do better"), Some(OverallRating::CanDoBetter));
        assert_eq!(OverallRating::from_string("Great"), None);
        assert_eq!(OverallRating::from_string(""), None);
    }

    #[test]
    fn test_image_upload_accepts_jpeg_and_png_only() {
        assert_eq!(ImageUpload::new(vec![1], "image/jpg").unwrap().mime_type, "image/jpeg");
        assert_eq!(ImageUpload::new(vec![1], "IMAGE/PNG").unwrap().mime_type, "image/png");
        assert!(ImageUpload::new(vec![1], "image/gif").is_none());
    }

    #[test]
    fn test_default_profile() {
        let profile = Profile::default();
        assert_eq!(profile.symptoms.len(), 3);
        assert_eq!(profile.symptoms[0], ALL_SYMPTOMS[0]);
        assert_eq!(profile.dietary_preference, "Vegetarian");
    }
}
