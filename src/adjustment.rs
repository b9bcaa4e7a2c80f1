use serde::Serialize;

use crate::recipe::{timestamp_millis, RecipeAdjustment, RecipeIngredient, RecipeTemplate, DEFAULT_SERVINGS};

/// Base servings with 0 treated as [`DEFAULT_SERVINGS`], so it is always safe to divide by.
pub fn effective_servings(base_servings: u32) -> u32 {
    if base_servings == 0 {
        DEFAULT_SERVINGS
    } else {
        base_servings
    }
}

/// Ratio of target to base servings. Without an adjustment the recipe is shown as written.
pub fn multiplier(adjustment: Option<&RecipeAdjustment>, base_servings: u32) -> f32 {
    match adjustment {
        Some(adjustment) => adjustment.servings as f32 / effective_servings(base_servings) as f32,
        None => 1.0,
    }
}

pub fn round_to_tenth(value: f32) -> f32 {
    (value * 10.0).round() / 10.0
}

/// Scaled quantity of one ingredient, rounded to one decimal place.
///
/// Input validation on `adjustment.servings` is the caller's job (see [`AdjustmentDraft`]).
pub fn compute_display_quantity(
    ingredient: &RecipeIngredient,
    adjustment: Option<&RecipeAdjustment>,
    base_servings: u32,
) -> f32 {
    round_to_tenth(ingredient.quantity * multiplier(adjustment, base_servings))
}

pub fn format_quantity(quantity: f32) -> String {
    format!("{:.1}", quantity)
}

/// One line of the rendered ingredient list.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "camelCase")]
pub enum DisplayIngredient {
    Scaled {
        id: String,
        name: String,
        quantity: f32,
        unit: String,
        optional: bool,
    },
    /// Free-text addition; never scaled.
    Added { name: String },
}

impl DisplayIngredient {
    pub fn name(&self) -> &str {
        match self {
            DisplayIngredient::Scaled { name, .. } | DisplayIngredient::Added { name } => name,
        }
    }

    pub fn label(&self) -> String {
        match self {
            DisplayIngredient::Scaled {
                name,
                quantity,
                unit,
                optional,
                ..
            } => {
                let suffix = if *optional { " (facultatif)" } else { "" };
                format!("{} {} {}{}", name, format_quantity(*quantity), unit, suffix)
            }
            DisplayIngredient::Added { name } => format!("{} (ajoute)", name),
        }
    }
}

/// The ingredient list as displayed: scaled, minus exclusions, followed by additions.
///
/// This is a view only; the template's ingredients are left untouched.
pub fn render_ingredients(recipe: &RecipeTemplate, adjustment: Option<&RecipeAdjustment>) -> Vec<DisplayIngredient> {
    let mut lines: Vec<DisplayIngredient> = recipe
        .ingredients
        .iter()
        .filter(|ingredient| !adjustment.map_or(false, |a| a.excludes(&ingredient.name)))
        .map(|ingredient| DisplayIngredient::Scaled {
            id: ingredient.id.clone(),
            name: ingredient.name.clone(),
            quantity: compute_display_quantity(ingredient, adjustment, recipe.servings),
            unit: ingredient.unit.clone(),
            optional: ingredient.optional,
        })
        .collect();

    if let Some(adjustment) = adjustment {
        lines.extend(
            adjustment
                .added_ingredients
                .iter()
                .map(|name| DisplayIngredient::Added { name: name.clone() }),
        );
    }
    lines
}

/// Editable adjustment state before it is saved.
///
/// Servings never drop below 1 through this type.
#[derive(Debug, Clone, PartialEq)]
pub struct AdjustmentDraft {
    recipe_id: String,
    base_servings: u32,
    servings: u32,
    added_ingredients: Vec<String>,
    excluded_ingredients: Vec<String>,
}

impl AdjustmentDraft {
    /// Starts from `initial` if given, else from the recipe's own servings.
    pub fn new(recipe: &RecipeTemplate, initial: Option<&RecipeAdjustment>) -> Self {
        let base_servings = effective_servings(recipe.servings);
        let servings = initial
            .map(|adjustment| adjustment.servings)
            .filter(|servings| *servings >= 1)
            .unwrap_or(base_servings);
        Self {
            recipe_id: recipe.id.clone(),
            base_servings,
            servings,
            added_ingredients: initial.map(|a| a.added_ingredients.clone()).unwrap_or_default(),
            excluded_ingredients: initial.map(|a| a.excluded_ingredients.clone()).unwrap_or_default(),
        }
    }

    pub fn servings(&self) -> u32 {
        self.servings
    }

    pub fn added_ingredients(&self) -> &[String] {
        &self.added_ingredients
    }

    pub fn excluded_ingredients(&self) -> &[String] {
        &self.excluded_ingredients
    }

    pub fn increment_servings(&mut self) {
        self.servings = self.servings.saturating_add(1);
    }

    /// Stops at 1.
    pub fn decrement_servings(&mut self) {
        self.servings = self.servings.saturating_sub(1).max(1);
    }

    pub fn set_servings(&mut self, servings: u32) {
        self.servings = servings.max(1);
    }

    /// Returns false for blank input or an exact duplicate.
    pub fn add_ingredient(&mut self, name: &str) -> bool {
        let name = name.trim();
        if name.is_empty() || self.added_ingredients.iter().any(|existing| existing == name) {
            return false;
        }
        self.added_ingredients.push(name.to_string());
        true
    }

    pub fn remove_added(&mut self, name: &str) {
        self.added_ingredients.retain(|existing| existing != name);
    }

    /// Flips exclusion for `ingredient_name`; returns whether it is now excluded.
    pub fn toggle_excluded(&mut self, ingredient_name: &str) -> bool {
        if let Some(pos) = self.excluded_ingredients.iter().position(|n| n == ingredient_name) {
            self.excluded_ingredients.remove(pos);
            false
        } else {
            self.excluded_ingredients.push(ingredient_name.to_string());
            true
        }
    }

    pub fn is_excluded(&self, ingredient_name: &str) -> bool {
        self.excluded_ingredients.iter().any(|n| n == ingredient_name)
    }

    pub fn multiplier(&self) -> f32 {
        self.servings as f32 / self.base_servings as f32
    }

    pub fn finish_at(self, timestamp: i64) -> RecipeAdjustment {
        RecipeAdjustment {
            recipe_id: self.recipe_id,
            servings: self.servings,
            added_ingredients: self.added_ingredients,
            excluded_ingredients: self.excluded_ingredients,
            timestamp,
        }
    }

    pub fn finish(self) -> RecipeAdjustment {
        self.finish_at(timestamp_millis())
    }
}
