use serde::Serialize;

use crate::models::{MealEdit, MealLogEntry};

/// A logged meal together with its position in the log
#[derive(Debug, Clone, Serialize)]
pub struct LoggedMeal {
    pub position: usize,
    #[serde(flatten)]
    pub entry: MealLogEntry,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MealLogSummary {
    pub total_meals: usize,
    pub average_rating: f64,
}

/// Meals logged in one session, oldest first.
///
/// Positions are indices into insertion order; display order is the reverse.
#[derive(Debug, Clone, Default)]
pub struct MealLog {
    entries: Vec<MealLogEntry>,
}

impl MealLog {
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends an entry and returns its position
    pub fn append(&mut self, entry: MealLogEntry) -> usize {
        self.entries.push(entry);
        self.entries.len() - 1
    }

    pub fn get(&self, position: usize) -> Option<&MealLogEntry> {
        self.entries.get(position)
    }

    pub fn entries_newest_first(&self) -> Vec<LoggedMeal> {
        self.entries
            .iter()
            .enumerate()
            .rev()
            .map(|(position, entry)| LoggedMeal {
                position,
                entry: entry.clone(),
            })
            .collect()
    }

    pub fn edit(&mut self, position: usize, edit: MealEdit) -> Option<&MealLogEntry> {
        let entry = self.entries.get_mut(position)?;

        if let Some(name) = edit.name {
            entry.name = name;
        }
        if let Some(details) = edit.details {
            entry.details = details;
        }
        if let Some(time) = edit.time {
            entry.time = time;
        }
        if let Some(rating) = edit.rating {
            entry.rating = rating.clamp(1, 5);
        }

        Some(entry)
    }

    pub fn delete(&mut self, position: usize) -> Option<MealLogEntry> {
        if position < self.entries.len() {
            Some(self.entries.remove(position))
        } else {
            None
        }
    }

    pub fn clear(&mut self) -> usize {
        let removed = self.entries.len();
        self.entries.clear();
        removed
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn summary(&self) -> MealLogSummary {
        let total_meals = self.entries.len();
        let average_rating = if !self.is_empty() {
            let total: u32 = self.entries.iter().map(|e| e.rating as u32).sum();
            let avg = total as f64 / total_meals as f64;
            (avg * 100.0).round() / 100.0
        } else {
            0.0
        };

        MealLogSummary {
            total_meals,
            average_rating,
        }
    }
}
