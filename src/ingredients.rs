use tracing::debug;

use crate::normalizer::{normalize, split_transcript};

/// Ingredients the user has on hand, in insertion order.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct IngredientList {
    items: Vec<String>,
}

impl IngredientList {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds `raw` trimmed. Blank input and items whose normalized form is already listed are
    /// ignored; returns whether the list changed.
    pub fn add(&mut self, raw: &str) -> bool {
        let item = raw.trim();
        if item.is_empty() {
            return false;
        }
        let key = normalize(item);
        if self.items.iter().any(|existing| normalize(existing) == key) {
            debug!(item, "ingredient already listed");
            return false;
        }
        self.items.push(item.to_string());
        true
    }

    /// Adds every token of a dictated transcript. Returns how many were new.
    pub fn add_transcript(&mut self, transcript: &str) -> usize {
        split_transcript(transcript)
            .iter()
            .filter(|word| self.add(word))
            .count()
    }

    /// Exact match on the stored text.
    pub fn remove(&mut self, item: &str) {
        self.items.retain(|existing| existing != item);
    }

    pub fn clear(&mut self) {
        self.items.clear();
    }

    pub fn items(&self) -> &[String] {
        &self.items
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }
}

impl<S: AsRef<str>> Extend<S> for IngredientList {
    fn extend<I: IntoIterator<Item = S>>(&mut self, iter: I) {
        for item in iter {
            self.add(item.as_ref());
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_add_trims_and_skips_blank() {
        let mut list = IngredientList::new();
        assert!(list.add("  tomate "));
        assert!(!list.add("   "));
        assert_eq!(list.items(), ["tomate"]);
    }

    #[test]
    fn test_add_dedupes_on_normalized_form() {
        let mut list = IngredientList::new();
        assert!(list.add("Tomate"));
        assert!(!list.add("tômate"));
        assert!(!list.add("TOMATE!"));
        assert!(list.add("basilic"));
        assert_eq!(list.items(), ["Tomate", "basilic"]);
    }

    #[test]
    fn test_add_transcript() {
        let mut list = IngredientList::new();
        list.add("riz");
        let added = list.add_transcript("poulet, riz  curry,,oignon");
        assert_eq!(added, 3);
        assert_eq!(list.items(), ["riz", "poulet", "curry", "oignon"]);
    }

    #[test]
    fn test_remove_is_exact() {
        let mut list = IngredientList::new();
        list.extend(["Tomate", "riz"]);
        list.remove("tomate");
        assert_eq!(list.items().len(), 2);
        list.remove("Tomate");
        assert_eq!(list.items(), ["riz"]);
        list.clear();
        assert!(list.is_empty());
    }
}
