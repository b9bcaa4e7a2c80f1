pub mod data_loader;

use std::path::Path;

use tracing::info;

use crate::recipe::RecipeTemplate;
pub use data_loader::{load_recipe_list, parse_recipe_list, CatalogError};
use data_loader::{FALLBACK_FILE, TEMPLATES_FILE, TRENDING_FILE};

const BUILTIN_TEMPLATES: &str = include_str!("../../data/recipe_templates.json");
const BUILTIN_FALLBACK: &str = include_str!("../../data/fallback_recipes.json");
const BUILTIN_TRENDING: &str = include_str!("../../data/trending_recipes.json");

/// Which list a recipe was found in.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CatalogSource {
    Templates,
    Trending,
    Fallback,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum CatalogLookup<'a> {
    Found {
        recipe: &'a RecipeTemplate,
        source: CatalogSource,
    },
    NotFound,
}

impl<'a> CatalogLookup<'a> {
    pub fn recipe(&self) -> Option<&'a RecipeTemplate> {
        match self {
            CatalogLookup::Found { recipe, .. } => Some(*recipe),
            CatalogLookup::NotFound => None,
        }
    }
}

/// Read-only recipe collection, loaded once.
///
/// `templates` feed the matcher, `fallback` is returned when nothing matches, and
/// `trending` is only browsable. [`Catalog::lookup`] resolves an id across all three.
#[derive(Debug, Clone)]
pub struct Catalog {
    templates: Vec<RecipeTemplate>,
    fallback: Vec<RecipeTemplate>,
    trending: Vec<RecipeTemplate>,
}

impl Catalog {
    pub fn new(templates: Vec<RecipeTemplate>, fallback: Vec<RecipeTemplate>, trending: Vec<RecipeTemplate>) -> Self {
        Self {
            templates,
            fallback,
            trending,
        }
    }

    /// The lists embedded in the binary.
    pub fn builtin() -> Result<Self, CatalogError> {
        let catalog = Self::new(
            parse_recipe_list(TEMPLATES_FILE, BUILTIN_TEMPLATES)?,
            parse_recipe_list(FALLBACK_FILE, BUILTIN_FALLBACK)?,
            parse_recipe_list(TRENDING_FILE, BUILTIN_TRENDING)?,
        );
        info!(
            templates = catalog.templates.len(),
            fallback = catalog.fallback.len(),
            trending = catalog.trending.len(),
            "loaded builtin catalog"
        );
        Ok(catalog)
    }

    /// Loads the three lists from `dir`. A missing trending file is allowed; the other two
    /// are required.
    pub fn from_dir(dir: &Path) -> Result<Self, CatalogError> {
        let templates = load_recipe_list(&dir.join(TEMPLATES_FILE))?;
        let fallback = load_recipe_list(&dir.join(FALLBACK_FILE))?;
        let trending = match load_recipe_list(&dir.join(TRENDING_FILE)) {
            Ok(recipes) => recipes,
            Err(CatalogError::NotFound(_)) => Vec::new(),
            Err(e) => return Err(e),
        };
        info!(
            dir = %dir.display(),
            templates = templates.len(),
            fallback = fallback.len(),
            trending = trending.len(),
            "loaded catalog"
        );
        Ok(Self::new(templates, fallback, trending))
    }

    pub fn templates(&self) -> &[RecipeTemplate] {
        &self.templates
    }

    pub fn fallback(&self) -> &[RecipeTemplate] {
        &self.fallback
    }

    pub fn trending(&self) -> &[RecipeTemplate] {
        &self.trending
    }

    /// Resolves an id, probing templates, then trending, then fallback.
    pub fn lookup(&self, id: &str) -> CatalogLookup<'_> {
        let sources = [
            (CatalogSource::Templates, &self.templates),
            (CatalogSource::Trending, &self.trending),
            (CatalogSource::Fallback, &self.fallback),
        ];
        sources
            .into_iter()
            .find_map(|(source, recipes)| {
                recipes
                    .iter()
                    .find(|recipe| recipe.id == id)
                    .map(|recipe| CatalogLookup::Found { recipe, source })
            })
            .unwrap_or(CatalogLookup::NotFound)
    }
}
