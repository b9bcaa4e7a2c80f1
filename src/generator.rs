use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

use tokio::sync::watch;
use tracing::{debug, info};

use crate::catalog::Catalog;
use crate::matcher::match_recipes;
use crate::recipe::RecipeTemplate;

/// Cosmetic pause before suggestions appear, long enough for a loading state to render.
pub const DEFAULT_GENERATION_DELAY: Duration = Duration::from_millis(800);

#[derive(Debug, Clone, Default, PartialEq)]
pub struct GenerationState {
    pub is_generating: bool,
    pub recipes: Vec<RecipeTemplate>,
}

/// Asynchronous front of the matcher.
///
/// Requests may overlap and are never cancelled: each one publishes its result when it
/// resolves, overwriting whatever was there, so the last request to resolve wins.
/// `is_generating` stays set while any request is in flight, including requests whose
/// future was dropped before resolving.
pub struct RecipeGenerator {
    catalog: Arc<Catalog>,
    delay: Duration,
    in_flight: AtomicUsize,
    state: watch::Sender<GenerationState>,
}

/// Counts one pending request; the count drops when the request resolves or is abandoned.
struct InFlight<'a> {
    generator: &'a RecipeGenerator,
}

impl<'a> InFlight<'a> {
    fn enter(generator: &'a RecipeGenerator) -> Self {
        generator.in_flight.fetch_add(1, Ordering::SeqCst);
        generator.state.send_if_modified(|state| !std::mem::replace(&mut state.is_generating, true));
        Self { generator }
    }
}

impl Drop for InFlight<'_> {
    fn drop(&mut self) {
        if self.generator.in_flight.fetch_sub(1, Ordering::SeqCst) == 1 {
            self.generator
                .state
                .send_if_modified(|state| std::mem::replace(&mut state.is_generating, false));
        }
    }
}

impl RecipeGenerator {
    pub fn new(catalog: Arc<Catalog>, delay: Duration) -> Self {
        let (state, _) = watch::channel(GenerationState::default());
        Self {
            catalog,
            delay,
            in_flight: AtomicUsize::new(0),
            state,
        }
    }

    pub fn subscribe(&self) -> watch::Receiver<GenerationState> {
        self.state.subscribe()
    }

    pub fn state(&self) -> GenerationState {
        self.state.borrow().clone()
    }

    pub fn is_generating(&self) -> bool {
        self.state.borrow().is_generating
    }

    pub fn recipes(&self) -> Vec<RecipeTemplate> {
        self.state.borrow().recipes.clone()
    }

    /// Runs one suggestion pass and publishes its result.
    ///
    /// Empty input clears the suggestions at once, with no delay and no fallback.
    pub async fn generate<S: AsRef<str>>(&self, ingredients: &[S]) -> Vec<RecipeTemplate> {
        if ingredients.is_empty() {
            self.clear();
            return Vec::new();
        }

        let in_flight = InFlight::enter(self);
        tokio::time::sleep(self.delay).await;

        let recipes: Vec<RecipeTemplate> = match_recipes(ingredients, self.catalog.templates(), self.catalog.fallback())
            .into_iter()
            .cloned()
            .collect();
        info!(ingredients = ingredients.len(), suggestions = recipes.len(), "generated suggestions");

        let pending = self.in_flight.load(Ordering::SeqCst) - 1;
        if pending > 0 {
            debug!(pending, "other generations still running");
        }
        self.state.send_modify(|state| state.recipes = recipes.clone());
        drop(in_flight);
        recipes
    }

    pub fn clear(&self) {
        self.state.send_modify(|state| state.recipes.clear());
    }
}
