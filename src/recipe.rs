use serde::{Deserialize, Serialize};

/// Base servings assumed when a template does not declare any (or declares zero).
pub const DEFAULT_SERVINGS: u32 = 2;

fn default_servings() -> u32 {
    DEFAULT_SERVINGS
}

#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum Difficulty {
    Facile,
    Moyen,
    Difficile,
}

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct RecipeIngredient {
    pub id: String,
    pub name: String,
    /// Base (unscaled) amount for the template's declared servings.
    pub quantity: f32,
    pub unit: String,
    #[serde(default)]
    pub optional: bool,
}

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct RecipeStep {
    pub id: String,
    pub order: u32,
    pub instruction: String,
    /// Minutes.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub duration: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tip: Option<String>,
}

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct RecipeTemplate {
    pub id: String,
    pub title: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image_url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub difficulty: Option<Difficulty>,
    /// Matching-only list; may differ from `ingredients`.
    #[serde(default)]
    pub key_ingredients: Vec<String>,
    #[serde(default)]
    pub ingredients: Vec<RecipeIngredient>,
    #[serde(default)]
    pub steps: Vec<RecipeStep>,
    #[serde(default = "default_servings")]
    pub servings: u32,
    #[serde(default)]
    pub tags: Vec<String>,
    /// Total preparation time in minutes.
    pub time: u32,
    pub kcal: u32,
}

/// The user's current overrides for one recipe. Saving a new one replaces the old one.
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct RecipeAdjustment {
    pub recipe_id: String,
    pub servings: u32,
    #[serde(default)]
    pub added_ingredients: Vec<String>,
    #[serde(default)]
    pub excluded_ingredients: Vec<String>,
    pub timestamp: i64,
}

impl RecipeAdjustment {
    pub fn new(recipe_id: impl Into<String>, servings: u32) -> Self {
        Self {
            recipe_id: recipe_id.into(),
            servings,
            added_ingredients: Vec::new(),
            excluded_ingredients: Vec::new(),
            timestamp: timestamp_millis(),
        }
    }

    /// Exact (non-normalized) name match against `excluded_ingredients`.
    pub fn excludes(&self, ingredient_name: &str) -> bool {
        self.excluded_ingredients.iter().any(|name| name == ingredient_name)
    }

    pub fn is_valid(&self) -> bool {
        self.servings >= 1 && !self.recipe_id.is_empty()
    }
}

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Favorite {
    pub recipe_id: String,
    pub recipe_title: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub recipe_image_url: Option<String>,
    pub timestamp: i64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub adjustment: Option<RecipeAdjustment>,
}

impl Favorite {
    /// Checks the constraints serde cannot express on its own.
    pub fn is_valid(&self) -> bool {
        !self.recipe_id.is_empty() && self.adjustment.as_ref().map_or(true, RecipeAdjustment::is_valid)
    }
}

pub fn timestamp_millis() -> i64 {
    chrono::Utc::now().timestamp_millis()
}
