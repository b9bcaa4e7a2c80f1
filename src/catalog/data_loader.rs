use std::collections::HashSet;
use std::path::{Path, PathBuf};

use thiserror::Error;

use crate::recipe::RecipeTemplate;

pub const TEMPLATES_FILE: &str = "recipe_templates.json";
pub const FALLBACK_FILE: &str = "fallback_recipes.json";
pub const TRENDING_FILE: &str = "trending_recipes.json";

#[derive(Debug, Error)]
pub enum CatalogError {
    #[error("catalog file not found at: {0:?}")]
    NotFound(PathBuf),
    #[error("failed to read catalog file {path:?}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to parse recipe list '{list}': {source}")]
    Parse {
        list: String,
        #[source]
        source: serde_json::Error,
    },
    #[error("duplicate recipe id '{id}' in '{list}'")]
    DuplicateId { list: String, id: String },
    #[error("recipe '{recipe}' has an invalid step order {order}")]
    InvalidStepOrder { recipe: String, order: u32 },
    #[error("recipe '{recipe}' has an invalid quantity for ingredient '{ingredient}'")]
    InvalidQuantity { recipe: String, ingredient: String },
}

/// Parses and validates one JSON recipe list. `list` only labels errors.
pub fn parse_recipe_list(list: &str, contents: &str) -> Result<Vec<RecipeTemplate>, CatalogError> {
    let recipes: Vec<RecipeTemplate> = serde_json::from_str(contents).map_err(|source| CatalogError::Parse {
        list: list.to_string(),
        source,
    })?;
    validate_recipes(list, &recipes)?;
    Ok(recipes)
}

pub fn load_recipe_list(path: &Path) -> Result<Vec<RecipeTemplate>, CatalogError> {
    if !path.exists() {
        return Err(CatalogError::NotFound(path.to_path_buf()));
    }
    let contents = std::fs::read_to_string(path).map_err(|source| CatalogError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    let list = path
        .file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string());
    parse_recipe_list(&list, &contents)
}

fn validate_recipes(list: &str, recipes: &[RecipeTemplate]) -> Result<(), CatalogError> {
    let mut seen_ids = HashSet::new();
    for recipe in recipes {
        if !seen_ids.insert(recipe.id.as_str()) {
            return Err(CatalogError::DuplicateId {
                list: list.to_string(),
                id: recipe.id.clone(),
            });
        }

        let mut seen_orders = HashSet::new();
        for step in &recipe.steps {
            if step.order == 0 || !seen_orders.insert(step.order) {
                return Err(CatalogError::InvalidStepOrder {
                    recipe: recipe.id.clone(),
                    order: step.order,
                });
            }
        }

        if let Some(ingredient) = recipe
            .ingredients
            .iter()
            .find(|ingredient| !ingredient.quantity.is_finite() || ingredient.quantity < 0.0)
        {
            return Err(CatalogError::InvalidQuantity {
                recipe: recipe.id.clone(),
                ingredient: ingredient.name.clone(),
            });
        }
    }
    Ok(())
}
