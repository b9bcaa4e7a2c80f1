use std::cmp::Ordering;

use tracing::debug;

use crate::normalizer::normalize;
use crate::recipe::RecipeTemplate;

/// Points for every (user, key ingredient) pair that overlaps.
pub const PAIR_POINTS: f32 = 10.0;
/// Weight of the matched fraction of key ingredients.
pub const COVERAGE_POINTS: f32 = 20.0;
/// A recipe must score strictly above this to be suggested.
pub const MIN_SCORE: f32 = 5.0;
pub const MAX_SUGGESTIONS: usize = 6;

#[derive(Debug, Clone, Copy)]
pub struct ScoredRecipe<'a> {
    pub recipe: &'a RecipeTemplate,
    pub score: f32,
}

// Substring in either direction.
fn overlaps(a: &str, b: &str) -> bool {
    a.contains(b) || b.contains(a)
}

fn normalize_all<S: AsRef<str>>(items: &[S]) -> Vec<String> {
    items.iter().map(|item| normalize(item.as_ref())).collect()
}

fn score_normalized(key_ingredients: &[String], user_ingredients: &[String]) -> f32 {
    let mut score = 0.0_f32;
    for user_ing in user_ingredients {
        for key_ing in key_ingredients {
            if overlaps(user_ing, key_ing) {
                score += PAIR_POINTS;
            }
        }
    }

    if !key_ingredients.is_empty() {
        let matched = key_ingredients
            .iter()
            .filter(|key_ing| user_ingredients.iter().any(|user_ing| overlaps(user_ing, key_ing)))
            .count();
        let match_ratio = matched as f32 / key_ingredients.len() as f32;
        score += match_ratio * COVERAGE_POINTS;
    }

    score
}

/// Scores one recipe's key ingredients against the user's ingredients.
///
/// Matching is deliberately permissive: "tomate" matches "tomates cerise", but "riz" also
/// matches "chorizo". A token that normalizes to nothing (such as "!!!") is a substring of
/// every key ingredient and so matches all of them.
pub fn match_score<K: AsRef<str>, U: AsRef<str>>(key_ingredients: &[K], user_ingredients: &[U]) -> f32 {
    score_normalized(&normalize_all(key_ingredients), &normalize_all(user_ingredients))
}

/// Scores every catalog recipe, best first. Equal scores keep catalog order.
pub fn rank_recipes<'a, U: AsRef<str>>(
    user_ingredients: &[U],
    catalog: &'a [RecipeTemplate],
) -> Vec<ScoredRecipe<'a>> {
    let normalized_user = normalize_all(user_ingredients);
    let mut scored: Vec<ScoredRecipe<'a>> = catalog
        .iter()
        .map(|recipe| ScoredRecipe {
            recipe,
            score: score_normalized(&normalize_all(&recipe.key_ingredients), &normalized_user),
        })
        .collect();

    // `sort_by` is stable, which is what keeps ties in catalog order.
    scored.sort_by(|a, b| b.score.partial_cmp(&a.score).unwrap_or(Ordering::Equal));
    scored
}

/// Suggests at most [`MAX_SUGGESTIONS`] recipes scoring above [`MIN_SCORE`].
///
/// Returns `fallback` as-is when nothing qualifies, and an empty list when the user gave
/// no ingredients at all.
pub fn match_recipes<'a, U: AsRef<str>>(
    user_ingredients: &[U],
    catalog: &'a [RecipeTemplate],
    fallback: &'a [RecipeTemplate],
) -> Vec<&'a RecipeTemplate> {
    if user_ingredients.is_empty() {
        return Vec::new();
    }

    let ranked = rank_recipes(user_ingredients, catalog);
    for candidate in ranked.iter().take(MAX_SUGGESTIONS) {
        debug!(recipe = %candidate.recipe.id, score = candidate.score, "scored recipe");
    }

    let top: Vec<&'a RecipeTemplate> = ranked
        .into_iter()
        .filter(|candidate| candidate.score > MIN_SCORE)
        .take(MAX_SUGGESTIONS)
        .map(|candidate| candidate.recipe)
        .collect();

    if top.is_empty() {
        debug!(fallback = fallback.len(), "no recipe above threshold, using fallback list");
        fallback.iter().collect()
    } else {
        top
    }
}
