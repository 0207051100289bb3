pub mod category;
pub mod models;

pub use category::{Category, CategoryMap, CategoryPenalties, CategoryScores};
