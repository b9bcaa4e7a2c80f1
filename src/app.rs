use std::sync::Arc;

use anyhow::{bail, Context, Result};
use tracing::info;

use crate::catalog::{Catalog, CatalogLookup};
use crate::config::{AppConfig, StoreLocation};
use crate::cooking::CookingSession;
use crate::detail::RecipeDetail;
use crate::favorites::FavoritesLedger;
use crate::generator::RecipeGenerator;
use crate::ingredients::IngredientList;
use crate::recipe::{Favorite, RecipeAdjustment, RecipeTemplate};
use crate::session::UserSession;
use crate::store::{FileStore, KeyValueStore, MemoryStore};

/// Everything a running app owns, wired together once at startup.
pub struct AppContext {
    catalog: Arc<Catalog>,
    favorites: FavoritesLedger,
    session: UserSession,
    ingredients: IngredientList,
    generator: RecipeGenerator,
}

impl AppContext {
    pub fn init(config: &AppConfig) -> Result<Self> {
        let catalog = match &config.catalog_dir {
            Some(dir) => Catalog::from_dir(dir)
                .with_context(|| format!("Failed to load recipe catalog from '{}'", dir.display()))?,
            None => Catalog::builtin().context("Failed to load the builtin recipe catalog")?,
        };
        let store: Arc<dyn KeyValueStore> = match &config.store {
            StoreLocation::File(path) => Arc::new(
                FileStore::open(path)
                    .with_context(|| format!("Failed to open store file '{}'", path.display()))?,
            ),
            StoreLocation::Memory => Arc::new(MemoryStore::new()),
        };
        Ok(Self::with_parts(catalog, store, config))
    }

    /// Builds a context over an existing store handle.
    pub fn with_parts(catalog: Catalog, store: Arc<dyn KeyValueStore>, config: &AppConfig) -> Self {
        let catalog = Arc::new(catalog);
        let mut favorites = FavoritesLedger::new(Arc::clone(&store));
        favorites.load_all();
        let mut session = UserSession::new(store);
        session.init();

        info!(
            favorites = favorites.all().len(),
            signed_in = session.is_authenticated(),
            "app context ready"
        );

        Self {
            generator: RecipeGenerator::new(Arc::clone(&catalog), config.generation_delay),
            catalog,
            favorites,
            session,
            ingredients: IngredientList::new(),
        }
    }

    pub fn catalog(&self) -> &Catalog {
        &self.catalog
    }

    pub fn lookup(&self, id: &str) -> CatalogLookup<'_> {
        self.catalog.lookup(id)
    }

    pub fn ingredients(&self) -> &IngredientList {
        &self.ingredients
    }

    pub fn ingredients_mut(&mut self) -> &mut IngredientList {
        &mut self.ingredients
    }

    pub fn generator(&self) -> &RecipeGenerator {
        &self.generator
    }

    pub fn session(&self) -> &UserSession {
        &self.session
    }

    pub fn session_mut(&mut self) -> &mut UserSession {
        &mut self.session
    }

    pub fn favorites(&self) -> &[Favorite] {
        self.favorites.all()
    }

    pub fn is_favorite(&self, recipe_id: &str) -> bool {
        self.favorites.is_favorite(recipe_id)
    }

    /// Suggestions for the current ingredient list.
    pub async fn generate(&self) -> Vec<RecipeTemplate> {
        self.generator.generate(self.ingredients.items()).await
    }

    /// The adjustment shown for a recipe: an explicit one wins over the favorited snapshot.
    pub fn active_adjustment(&self, recipe_id: &str, explicit: Option<&RecipeAdjustment>) -> Option<RecipeAdjustment> {
        explicit
            .cloned()
            .or_else(|| self.favorites.get(recipe_id).and_then(|f| f.adjustment.clone()))
    }

    pub fn recipe_detail(&self, recipe_id: &str, explicit: Option<&RecipeAdjustment>) -> Option<RecipeDetail> {
        let recipe = self.catalog.lookup(recipe_id).recipe()?;
        let adjustment = self.active_adjustment(recipe_id, explicit);
        Some(RecipeDetail::build(recipe, adjustment.as_ref()))
    }

    /// Returns whether the recipe is a favorite afterwards.
    pub fn toggle_favorite(&mut self, recipe_id: &str, current_adjustment: Option<RecipeAdjustment>) -> Result<bool> {
        if self.favorites.is_favorite(recipe_id) {
            self.favorites.remove(recipe_id);
            info!(recipe = recipe_id, "removed favorite");
            return Ok(false);
        }
        let Some(recipe) = self.catalog.lookup(recipe_id).recipe() else {
            bail!("Unknown recipe '{}'", recipe_id);
        };
        self.favorites.add(
            &recipe.id,
            &recipe.title,
            recipe.image_url.as_deref(),
            current_adjustment,
        );
        info!(recipe = recipe_id, "added favorite");
        Ok(true)
    }

    /// Stores the adjustment with the favorite. Returns false, persisting nothing, when the
    /// recipe is not a favorite.
    pub fn save_adjustment(&mut self, adjustment: RecipeAdjustment) -> bool {
        let Some(favorite) = self.favorites.get(&adjustment.recipe_id) else {
            return false;
        };
        let (title, image_url) = (favorite.recipe_title.clone(), favorite.recipe_image_url.clone());
        let recipe_id = adjustment.recipe_id.clone();
        self.favorites.add(&recipe_id, &title, image_url.as_deref(), Some(adjustment));
        true
    }

    pub fn start_cooking(&self, recipe_id: &str, explicit: Option<&RecipeAdjustment>) -> Result<CookingSession> {
        let Some(recipe) = self.catalog.lookup(recipe_id).recipe() else {
            bail!("Unknown recipe '{}'", recipe_id);
        };
        let adjustment = self.active_adjustment(recipe_id, explicit);
        Ok(CookingSession::new(recipe, adjustment)?)
    }

    pub fn teardown(self) {
        self.generator.clear();
        info!(favorites = self.favorites.all().len(), "app context closed");
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn context() -> Result<AppContext> {
        AppContext::init(&AppConfig::ephemeral())
    }

    #[test]
    fn test_toggle_favorite_round_trip() -> Result<()> {
        let mut app = context()?;
        assert!(app.toggle_favorite("pates-pesto", None)?);
        assert_eq!(app.favorites()[0].recipe_title, app.lookup("pates-pesto").recipe().unwrap().title);
        assert!(!app.toggle_favorite("pates-pesto", None)?);
        assert!(app.favorites().is_empty());
        assert!(app.toggle_favorite("no-such-recipe", None).is_err());
        Ok(())
    }

    #[test]
    fn test_save_adjustment_requires_favorite() -> Result<()> {
        let mut app = context()?;
        assert!(!app.save_adjustment(RecipeAdjustment::new("pates-pesto", 4)));
        assert!(app.favorites().is_empty());

        app.toggle_favorite("pates-pesto", None)?;
        assert!(app.save_adjustment(RecipeAdjustment::new("pates-pesto", 4)));
        let detail = app.recipe_detail("pates-pesto", None).unwrap();
        assert!(detail.adjusted);
        assert_eq!(detail.servings, 4);
        Ok(())
    }

    #[test]
    fn test_explicit_adjustment_overrides_favorite() -> Result<()> {
        let mut app = context()?;
        app.toggle_favorite("pates-pesto", Some(RecipeAdjustment::new("pates-pesto", 4)))?;
        let explicit = RecipeAdjustment::new("pates-pesto", 6);
        assert_eq!(app.recipe_detail("pates-pesto", Some(&explicit)).unwrap().servings, 6);
        assert!(app.recipe_detail("missing", None).is_none());
        Ok(())
    }

    #[tokio::test]
    async fn test_generate_uses_ingredient_list() -> Result<()> {
        let mut app = context()?;
        assert!(app.generate().await.is_empty());
        app.ingredients_mut().add_transcript("poulet riz curry");
        let recipes = app.generate().await;
        assert_eq!(recipes.first().map(|r| r.id.as_str()), Some("poulet-curry-riz"));
        app.teardown();
        Ok(())
    }
}
