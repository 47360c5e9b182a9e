//! Recipes shared by their chefs.
//!
//! Any signed-in user may publish a recipe; they become its chef. Views join
//! the chef's public identity and how many recipes they have published.

use chrono::{DateTime, Utc};
use uuid::Uuid;

use super::sanitize::{FieldViolation, bounded_text, required_list};
use super::{AuthorSummary, UserId};

const TITLE_MIN: usize = 3;
const TITLE_MAX: usize = 255;
const SHORT_MAX: usize = 64;
/// Maximum number of ingredients or instruction steps.
pub const MAX_STEPS: usize = 100;

/// A stored recipe.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Recipe {
    pub id: Uuid,
    pub chef: UserId,
    pub title: String,
    pub ingredients: Vec<String>,
    pub instructions: Vec<String>,
    /// Free-form preparation time, e.g. `45 min`.
    pub time: String,
    /// Free-form difficulty, e.g. `easy`.
    pub level: String,
    /// Path relative to the upload root.
    pub image: String,
    pub created_at: DateTime<Utc>,
}

impl Recipe {
    /// True when `keyword` occurs case-insensitively in the title, an
    /// ingredient or an instruction.
    ///
    /// ```
    /// # use campus::domain::{Recipe, UserId};
    /// # use chrono::Utc;
    /// # use uuid::Uuid;
    /// let recipe = Recipe {
    ///     id: Uuid::new_v4(),
    ///     chef: UserId::random(),
    ///     title: "Saffron rice".into(),
    ///     ingredients: vec!["Basmati".into()],
    ///     instructions: vec!["Rinse twice".into()],
    ///     time: "40 min".into(),
    ///     level: "easy".into(),
    ///     image: "uploads/recipes/a.png".into(),
    ///     created_at: Utc::now(),
    /// };
    /// assert!(recipe.matches_keyword("basmati"));
    /// assert!(!recipe.matches_keyword("lamb"));
    /// ```
    pub fn matches_keyword(&self, keyword: &str) -> bool {
        let needle = keyword.to_lowercase();
        std::iter::once(&self.title)
            .chain(&self.ingredients)
            .chain(&self.instructions)
            .any(|field| field.to_lowercase().contains(&needle))
    }
}

/// A recipe joined with its chef.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecipeView {
    pub recipe: Recipe,
    pub chef: Option<AuthorSummary>,
    /// Recipes the chef has published, this one included.
    pub chef_recipes: usize,
}

/// Validated input for a new recipe.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecipeDraft {
    pub title: String,
    pub ingredients: Vec<String>,
    pub instructions: Vec<String>,
    pub time: String,
    pub level: String,
}

impl RecipeDraft {
    pub fn try_from_parts(
        title: &str,
        ingredients: Vec<String>,
        instructions: Vec<String>,
        time: &str,
        level: &str,
    ) -> Result<Self, FieldViolation> {
        Ok(Self {
            title: bounded_text("title", "title", title, TITLE_MIN, TITLE_MAX)?,
            ingredients: required_list("ingredients", "ingredients", ingredients, MAX_STEPS)?,
            instructions: required_list("instructions", "instructions", instructions, MAX_STEPS)?,
            time: bounded_text("time", "time", time, 1, SHORT_MAX)?,
            level: bounded_text("level", "level", level, 1, SHORT_MAX)?,
        })
    }

    /// Materialise the recipe for `chef`.
    pub fn into_recipe(self, chef: UserId, image: String, now: DateTime<Utc>) -> Recipe {
        Recipe {
            id: Uuid::new_v4(),
            chef,
            title: self.title,
            ingredients: self.ingredients,
            instructions: self.instructions,
            time: self.time,
            level: self.level,
            image,
            created_at: now,
        }
    }
}
