use crate::error::AppError;
use crate::models::{Profile, ALL_SYMPTOMS, DIETARY_PREFERENCES, MAX_SYMPTOMS};

/// Replaces the user's top symptoms (1 to 3 distinct entries from the fixed list)
pub fn update_symptoms(profile: &mut Profile, symptoms: Vec<String>) -> Result<(), AppError> {
    if symptoms.is_empty() || symptoms.len() > MAX_SYMPTOMS {
        return Err(AppError::Invalid(format!(
            "Please select between 1 and {} symptoms",
            MAX_SYMPTOMS
        )));
    }

    for (i, symptom) in symptoms.iter().enumerate() {
        if !ALL_SYMPTOMS.contains(&symptom.as_str()) {
            return Err(AppError::Invalid(format!("Unknown symptom: {}", symptom)));
        }
        if symptoms[..i].contains(symptom) {
            return Err(AppError::Invalid(format!("Duplicate symptom: {}", symptom)));
        }
    }

    log::info!("📝 Symptoms updated: {:?}", symptoms);
    profile.symptoms = symptoms;
    Ok(())
}

pub fn update_dietary_preference(profile: &mut Profile, preference: String) -> Result<(), AppError> {
    if !DIETARY_PREFERENCES.contains(&preference.as_str()) {
        return Err(AppError::Invalid(format!(
            "Unknown dietary preference: {}",
            preference
        )));
    }

    log::info!("📝 Dietary preference updated: {}", preference);
    profile.dietary_preference = preference;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_update_symptoms() {
        let mut profile = Profile::default();
        update_symptoms(&mut profile, vec!["Fatigue".to_string()]).unwrap();
        assert_eq!(profile.symptoms, vec!["Fatigue".to_string()]);
    }

    #[test]
    fn test_update_symptoms_rejects_bad_selections() {
        let mut profile = Profile::default();
        let before = profile.symptoms.clone();

        assert!(update_symptoms(&mut profile, vec![]).is_err());
        assert!(update_symptoms(&mut profile, ALL_SYMPTOMS[..4].iter().map(|s| s.to_string()).collect()).is_err());
        assert!(update_symptoms(&mut profile, vec!["Headache".to_string()]).is_err());
        assert!(update_symptoms(&mut profile, vec!["Fatigue".to_string(), "Fatigue".to_string()]).is_err());

        assert_eq!(profile.symptoms, before);
    }

    #[test]
    fn test_update_dietary_preference() {
        let mut profile = Profile::default();
        update_dietary_preference(&mut profile, "Mediterranean".to_string()).unwrap();
        assert_eq!(profile.dietary_preference, "Mediterranean");

        assert!(update_dietary_preference(&mut profile, "Carnivore".to_string()).is_err());
        assert_eq!(profile.dietary_preference, "Mediterranean");
    }
}
