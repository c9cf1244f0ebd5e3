use serde::{Deserialize, Serialize};

use crate::models::{CategoryRef, Mood};
use crate::sampler::Weighted;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DailyPrompt {
    pub id: String,
    pub title: String,
    pub prompt: String,
    pub emoji: Option<String>,
    pub category: Option<CategoryRef>,
    pub suggested_mood: Option<Mood>,
    pub is_active: bool,
    /// Relative selection weight; absent means 1
    pub weight: Option<f64>,
    pub tags: Vec<String>,
    pub created_at: String,
}

impl Weighted for DailyPrompt {
    fn weight(&self) -> Option<f64> {
        self.weight
    }
}

#[derive(Debug, Clone, Default)]
pub struct NewPrompt {
    pub title: String,
    pub prompt: String,
    pub emoji: Option<String>,
    pub category_id: Option<String>,
    pub suggested_mood: Option<Mood>,
    pub weight: Option<f64>,
    pub tags: Vec<String>,
}
