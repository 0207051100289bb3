//! Scoring categories and the fixed-size maps keyed by them.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::ops::{Index, IndexMut};
use std::str::FromStr;

use crate::error::AuditError;

/// One of the eight fixed scoring buckets.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Category {
    Onpage,
    Technical,
    Performance,
    Links,
    Social,
    Usability,
    Local,
    Security,
}

impl Category {
    pub const ALL: [Category; 8] = [
        Category::Onpage,
        Category::Technical,
        Category::Performance,
        Category::Links,
        Category::Social,
        Category::Usability,
        Category::Local,
        Category::Security,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Category::Onpage => "onpage",
            Category::Technical => "technical",
            Category::Performance => "performance",
            Category::Links => "links",
            Category::Social => "social",
            Category::Usability => "usability",
            Category::Local => "local",
            Category::Security => "security",
        }
    }

    /// Weight of this category in the overall score. Weights sum to 1.0.
    pub fn weight(&self) -> f64 {
        match self {
            Category::Onpage => 0.25,
            Category::Technical => 0.20,
            Category::Performance => 0.20,
            Category::Links => 0.10,
            Category::Social => 0.08,
            Category::Usability => 0.07,
            Category::Security => 0.05,
            Category::Local => 0.05,
        }
    }

    fn index(self) -> usize {
        self as usize
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Category {
    type Err = AuditError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Category::ALL
            .into_iter()
            .find(|c| c.as_str() == s)
            .ok_or_else(|| AuditError::UnknownCategory(s.to_string()))
    }
}

/// Dense map with one slot per category.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct CategoryMap<T>([T; 8]);

impl<T: Copy> CategoryMap<T> {
    pub fn filled(value: T) -> Self {
        Self([value; 8])
    }

    pub fn iter(&self) -> impl Iterator<Item = (Category, T)> + '_ {
        Category::ALL.into_iter().map(move |c| (c, self.0[c.index()]))
    }
}

impl<T> Index<Category> for CategoryMap<T> {
    type Output = T;

    fn index(&self, category: Category) -> &T {
        &self.0[category.index()]
    }
}

impl<T> IndexMut<Category> for CategoryMap<T> {
    fn index_mut(&mut self, category: Category) -> &mut T {
        &mut self.0[category.index()]
    }
}

// Serialized as a `{"onpage": .., "technical": ..}` object so the JSON shape
// matches a string-keyed map.
impl<T: Serialize + Copy> Serialize for CategoryMap<T> {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        use serde::ser::SerializeMap;
        let mut map = serializer.serialize_map(Some(8))?;
        for (category, value) in self.iter() {
            map.serialize_entry(category.as_str(), &value)?;
        }
        map.end()
    }
}

impl<'de, T: Deserialize<'de> + Copy + Default> Deserialize<'de> for CategoryMap<T> {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let entries = std::collections::HashMap::<Category, T>::deserialize(deserializer)?;
        let mut map = CategoryMap::filled(T::default());
        for (category, value) in entries {
            map[category] = value;
        }
        Ok(map)
    }
}

/// Accumulated penalty per category for one evaluation pass. A slot stays
/// `None` until some check for that category has run, so categories nothing
/// looked at can be told apart from categories that passed cleanly.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CategoryPenalties(CategoryMap<Option<u32>>);

impl CategoryPenalties {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record that `category` was evaluated without adding any penalty.
    pub fn mark_evaluated(&mut self, category: Category) {
        self.0[category].get_or_insert(0);
    }

    pub fn add(&mut self, category: Category, penalty: u32) {
        *self.0[category].get_or_insert(0) += penalty;
    }

    /// Penalty for `category`; zero when it was not evaluated.
    pub fn get(&self, category: Category) -> u32 {
        self.0[category].unwrap_or(0)
    }

    pub fn is_evaluated(&self, category: Category) -> bool {
        self.0[category].is_some()
    }

    /// Sum another pass into this one.
    pub fn merge(&mut self, other: &CategoryPenalties) {
        for (category, penalty) in other.iter() {
            if let Some(penalty) = penalty {
                self.add(category, penalty);
            }
        }
    }

    pub fn iter(&self) -> impl Iterator<Item = (Category, Option<u32>)> + '_ {
        self.0.iter()
    }

    pub fn total(&self) -> u32 {
        self.iter().filter_map(|(_, p)| p).sum()
    }
}

/// Score per category in `[0, 100]`; `None` when the category was not scored.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CategoryScores(CategoryMap<Option<u8>>);

impl CategoryScores {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set(&mut self, category: Category, score: u8) {
        self.0[category] = Some(score.min(100));
    }

    pub fn get(&self, category: Category) -> Option<u8> {
        self.0[category]
    }

    pub fn iter(&self) -> impl Iterator<Item = (Category, Option<u8>)> + '_ {
        self.0.iter()
    }
}
