use chrono::Utc;
use chrono_tz::Tz;
use serde::Serialize;
use std::sync::Arc;

use crate::error::AppError;
use crate::models::{
    ImageUpload, MealDraft, MealEdit, NutrientProfile, OverallRating, PcosAnalysis,
};
use crate::services::ai_service::VisionModel;
use crate::services::extractor::{extract_nutrients, extract_pcos_analysis};
use crate::services::meal_log::{LoggedMeal, MealLogSummary};
use crate::services::meal_record::assemble_entry;
use crate::services::prompts::{
    recommendation_prompt, DETECTION_INSTRUCTION, DETECTION_PROMPT, RECOMMENDATION_INSTRUCTION,
};
use crate::services::session::{AppSession, SessionStore};

pub const NUTRITION_WARNING: &str =
    "Could not read nutrient percentages from the model's answer. Nutrition values are unavailable for this meal.";

/// What the recommendation screen shows about the meal in progress
#[derive(Debug, Clone, Serialize)]
pub struct DraftView {
    pub has_image: bool,
    pub image_mime_type: Option<String>,
    pub detected_items: String,
    pub edited_items: Option<String>,
    pub food_items: String,
    pub nutrition: Option<NutrientProfile>,
    pub pcos: Option<PcosAnalysis>,
    pub recommendation: Option<String>,
}

impl From<&MealDraft> for DraftView {
    fn from(draft: &MealDraft) -> Self {
        Self {
            has_image: draft.image.is_some(),
            image_mime_type: draft.image.as_ref().map(|i| i.mime_type.clone()),
            detected_items: draft.detected_items.clone(),
            edited_items: draft.edited_items.clone(),
            food_items: draft.food_items().to_string(),
            nutrition: draft.nutrition,
            pcos: draft.pcos.clone(),
            recommendation: draft.recommendation.clone(),
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct Recommendation {
    pub nutrition: NutrientProfile,
    pub nutrition_extracted: bool,
    pub warning: Option<String>,
    pub pcos: PcosAnalysis,
    pub overall_rating: Option<OverallRating>,
    pub raw_response: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct MealLogView {
    pub entries: Vec<LoggedMeal>,
    pub summary: MealLogSummary,
}

/// Drives one meal from photo upload to log entry, and manages the log
pub struct MealHandler {
    sessions: Arc<SessionStore>,
    model: Arc<dyn VisionModel>,
    timezone: Tz,
}

impl MealHandler {
    pub fn new(sessions: Arc<SessionStore>, model: Arc<dyn VisionModel>, timezone: Tz) -> Self {
        Self {
            sessions,
            model,
            timezone,
        }
    }

    async fn session<T>(
        &self,
        token: &str,
        f: impl FnOnce(&mut AppSession) -> Result<T, AppError>,
    ) -> Result<T, AppError> {
        self.sessions
            .with_session(token, f)
            .await
            .ok_or(AppError::InvalidSession)?
    }

    /// Uploads a dish photo, starts a fresh draft and asks the model what food it shows
    pub async fn analyze_image(&self, token: &str, image: ImageUpload) -> Result<DraftView, AppError> {
        // Reject unknown sessions before paying for a model call
        self.session(token, |_| Ok(())).await?;

        log::info!("📸 Analyzing uploaded image ({} bytes, {})", image.bytes.len(), image.mime_type);

        let detected = self
            .model
            .generate(DETECTION_INSTRUCTION, &image, DETECTION_PROMPT)
            .await
            .map_err(|e| {
                log::error!("❌ Food detection failed: {}", e);
                AppError::Model(e)
            })?;

        self.session(token, move |session| {
            session.replace_draft(MealDraft {
                image: Some(image),
                detected_items: detected.trim().to_string(),
                ..Default::default()
            });
            Ok(DraftView::from(&session.draft))
        })
        .await
    }

    pub async fn draft(&self, token: &str) -> Result<DraftView, AppError> {
        self.session(token, |session| Ok(DraftView::from(&session.draft)))
            .await
    }

    /// "Save Changes" on the detected food list
    pub async fn save_food_items(&self, token: &str, items: String) -> Result<DraftView, AppError> {
        self.session(token, move |session| {
            if session.draft.image.is_none() {
                return Err(AppError::MissingImage);
            }
            session.draft.edited_items = Some(items);
            Ok(DraftView::from(&session.draft))
        })
        .await
    }

    /// "Provide Recommendation": one model call, then nutrient and PCOS extraction
    pub async fn recommend(&self, token: &str) -> Result<Recommendation, AppError> {
        let (image, prompt, generation) = self
            .session(token, |session| {
                let image = session.draft.image.clone().ok_or(AppError::MissingImage)?;
                let prompt = recommendation_prompt(&session.profile, session.draft.food_items());
                Ok((image, prompt, session.draft_generation))
            })
            .await?;

        let raw_response = self
            .model
            .generate(RECOMMENDATION_INSTRUCTION, &image, &prompt)
            .await
            .map_err(|e| {
                log::error!("❌ Recommendation generation failed: {}", e);
                AppError::Model(e)
            })?;

        let nutrition = extract_nutrients(&raw_response);
        let pcos = extract_pcos_analysis(&raw_response);
        let nutrition_extracted = !nutrition.is_empty();

        let recommendation = Recommendation {
            nutrition,
            nutrition_extracted,
            warning: (!nutrition_extracted).then(|| NUTRITION_WARNING.to_string()),
            overall_rating: pcos.overall_rating(),
            pcos: pcos.clone(),
            raw_response: raw_response.clone(),
        };

        // Another upload may have replaced the meal during the model call
        self.session(token, move |session| {
            if session.draft_generation != generation {
                log::warn!("⚠️ Discarding recommendation for a replaced meal");
                return Err(AppError::DraftChanged);
            }
            session.draft.nutrition = Some(nutrition);
            session.draft.pcos = Some(pcos);
            session.draft.recommendation = Some(raw_response);
            Ok(())
        })
        .await?;

        log::info!(
            "✅ Recommendation ready: nutrition_extracted={}, score='{}'",
            recommendation.nutrition_extracted,
            recommendation.pcos.overall_score
        );

        Ok(recommendation)
    }

    /// "Log Activity": turns the draft into a log entry and starts over
    pub async fn log_activity(&self, token: &str) -> Result<LoggedMeal, AppError> {
        let now = Utc::now().with_timezone(&self.timezone);

        self.session(token, move |session| {
            let image = session.draft.image.take().ok_or(AppError::MissingImage)?;
            let draft = session.replace_draft(MealDraft::default());
            let details = draft.food_items().to_string();

            let entry = assemble_entry(&now, &details, image, draft.nutrition, draft.pcos);
            let position = session.meal_log.append(entry.clone());

            log::info!("📝 Logged {} '{}' at position {}", entry.meal_type, entry.name, position);
            Ok(LoggedMeal { position, entry })
        })
        .await
    }

    pub async fn meal_log(&self, token: &str) -> Result<MealLogView, AppError> {
        self.session(token, |session| {
            Ok(MealLogView {
                entries: session.meal_log.entries_newest_first(),
                summary: session.meal_log.summary(),
            })
        })
        .await
    }

    pub async fn get_entry(&self, token: &str, position: usize) -> Result<LoggedMeal, AppError> {
        self.session(token, |session| {
            let entry = session
                .meal_log
                .get(position)
                .cloned()
                .ok_or(AppError::EntryNotFound(position))?;
            Ok(LoggedMeal { position, entry })
        })
        .await
    }

    pub async fn entry_image(&self, token: &str, position: usize) -> Result<ImageUpload, AppError> {
        self.session(token, |session| {
            let entry = session
                .meal_log
                .get(position)
                .ok_or(AppError::EntryNotFound(position))?;
            Ok(ImageUpload {
                bytes: entry.image.clone(),
                mime_type: entry.image_mime_type.clone(),
            })
        })
        .await
    }

    pub async fn edit_entry(
        &self,
        token: &str,
        position: usize,
        edit: MealEdit,
    ) -> Result<LoggedMeal, AppError> {
        if let Some(rating) = edit.rating {
            if !(1..=5).contains(&rating) {
                return Err(AppError::Invalid("Rating must be between 1 and 5".to_string()));
            }
        }
        if edit.name.as_deref().is_some_and(|n| n.trim().is_empty()) {
            return Err(AppError::Invalid("Meal name cannot be empty".to_string()));
        }

        self.session(token, move |session| {
            let entry = session
                .meal_log
                .edit(position, edit)
                .cloned()
                .ok_or(AppError::EntryNotFound(position))?;
            log::info!("✏️ Edited meal at position {}", position);
            Ok(LoggedMeal { position, entry })
        })
        .await
    }

    pub async fn delete_entry(&self, token: &str, position: usize) -> Result<LoggedMeal, AppError> {
        self.session(token, |session| {
            let entry = session
                .meal_log
                .delete(position)
                .ok_or(AppError::EntryNotFound(position))?;
            log::info!("🗑️ Deleted meal '{}' at position {}", entry.name, position);
            Ok(LoggedMeal { position, entry })
        })
        .await
    }

    pub async fn clear_log(&self, token: &str) -> Result<usize, AppError> {
        self.session(token, |session| {
            let removed = session.meal_log.clear();
            log::info!("🧹 Cleared meal log ({} entries)", removed);
            Ok(removed)
        })
        .await
    }
}
