//! Category scores, the weighted overall score and letter grades.

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::domain::{Category, CategoryPenalties, CategoryScores};

/// Score assumed for a category that was not scored.
pub const DEFAULT_CATEGORY_SCORE: f64 = 70.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Grade {
    #[serde(rename = "A+")]
    APlus,
    A,
    B,
    C,
    D,
    F,
}

impl Grade {
    pub fn as_str(&self) -> &'static str {
        match self {
            Grade::APlus => "A+",
            Grade::A => "A",
            Grade::B => "B",
            Grade::C => "C",
            Grade::D => "D",
            Grade::F => "F",
        }
    }
}

impl fmt::Display for Grade {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// `100 - penalty`, floored at 0, for every evaluated category. Categories
/// no check looked at stay unscored.
pub fn calculate_category_scores(penalties: &CategoryPenalties) -> CategoryScores {
    let mut scores = CategoryScores::new();
    for (category, penalty) in penalties.iter() {
        if let Some(penalty) = penalty {
            let score = 100u32.saturating_sub(penalty);
            scores.set(category, score as u8);
        }
    }
    scores
}

/// Weighted average of the category scores, rounded half away from zero.
pub fn calculate_overall_score(scores: &CategoryScores) -> u8 {
    let (weighted, total_weight) = Category::ALL.iter().fold((0.0, 0.0), |(sum, weights), c| {
        let score = scores
            .get(*c)
            .map(f64::from)
            .unwrap_or(DEFAULT_CATEGORY_SCORE);
        (sum + score * c.weight(), weights + c.weight())
    });
    if total_weight <= 0.0 {
        return DEFAULT_CATEGORY_SCORE as u8;
    }
    (weighted / total_weight).round().clamp(0.0, 100.0) as u8
}

pub fn score_to_grade(score: i32) -> Grade {
    match score {
        s if s >= 95 => Grade::APlus,
        s if s >= 90 => Grade::A,
        s if s >= 80 => Grade::B,
        s if s >= 70 => Grade::C,
        s if s >= 60 => Grade::D,
        _ => Grade::F,
    }
}
