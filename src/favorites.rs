use std::sync::Arc;

use tracing::{debug, warn};

use crate::recipe::{timestamp_millis, Favorite, RecipeAdjustment};
use crate::store::KeyValueStore;

pub const FAVORITES_KEY: &str = "smartmeal_favorites_v1";

/// Decodes the stored favorites list, dropping what does not validate.
///
/// Anything other than a JSON array yields an empty list; inside the array each record is
/// validated on its own, so one corrupt entry does not hide the others.
pub fn decode_favorites(raw: &str) -> Vec<Favorite> {
    let items = match serde_json::from_str::<serde_json::Value>(raw) {
        Ok(serde_json::Value::Array(items)) => items,
        Ok(_) => {
            warn!("stored favorites are not a list, ignoring them");
            return Vec::new();
        }
        Err(e) => {
            warn!(error = %e, "stored favorites are not valid JSON, ignoring them");
            return Vec::new();
        }
    };

    let total = items.len();
    let favorites: Vec<Favorite> = items
        .into_iter()
        .filter_map(|item| serde_json::from_value::<Favorite>(item).ok())
        .filter(Favorite::is_valid)
        .collect();
    if favorites.len() < total {
        warn!(dropped = total - favorites.len(), "dropped invalid favorite records");
    }
    favorites
}

/// Favorited recipes, at most one entry per recipe id.
///
/// Holds the working set in memory and writes the whole list back on every change.
pub struct FavoritesLedger {
    store: Arc<dyn KeyValueStore>,
    favorites: Vec<Favorite>,
}

impl FavoritesLedger {
    /// An empty ledger; call [`FavoritesLedger::load_all`] to read the store.
    pub fn new(store: Arc<dyn KeyValueStore>) -> Self {
        Self {
            store,
            favorites: Vec::new(),
        }
    }

    pub fn load_all(&mut self) -> &[Favorite] {
        self.favorites = self.store.get(FAVORITES_KEY).map(|raw| decode_favorites(&raw)).unwrap_or_default();
        debug!(count = self.favorites.len(), "loaded favorites");
        &self.favorites
    }

    pub fn all(&self) -> &[Favorite] {
        &self.favorites
    }

    /// Upsert: any previous entry for `recipe_id` is replaced wholesale, adjustment included.
    pub fn add(
        &mut self,
        recipe_id: &str,
        title: &str,
        image_url: Option<&str>,
        adjustment: Option<RecipeAdjustment>,
    ) {
        self.favorites.retain(|favorite| favorite.recipe_id != recipe_id);
        self.favorites.push(Favorite {
            recipe_id: recipe_id.to_string(),
            recipe_title: title.to_string(),
            recipe_image_url: image_url.map(String::from),
            timestamp: timestamp_millis(),
            adjustment,
        });
        self.persist();
    }

    pub fn remove(&mut self, recipe_id: &str) {
        let before = self.favorites.len();
        self.favorites.retain(|favorite| favorite.recipe_id != recipe_id);
        if self.favorites.len() != before {
            self.persist();
        }
    }

    pub fn is_favorite(&self, recipe_id: &str) -> bool {
        self.favorites.iter().any(|favorite| favorite.recipe_id == recipe_id)
    }

    pub fn get(&self, recipe_id: &str) -> Option<&Favorite> {
        self.favorites.iter().find(|favorite| favorite.recipe_id == recipe_id)
    }

    fn persist(&self) {
        let serialized = match serde_json::to_string(&self.favorites) {
            Ok(serialized) => serialized,
            Err(e) => {
                warn!(error = %e, "failed to serialize favorites");
                return;
            }
        };
        if let Err(e) = self.store.set(FAVORITES_KEY, &serialized) {
            warn!(error = %e, "failed to save favorites");
        }
    }
}
