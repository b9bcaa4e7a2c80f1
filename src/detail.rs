use serde::Serialize;

use crate::adjustment::{effective_servings, render_ingredients, DisplayIngredient};
use crate::normalizer::normalize;
use crate::recipe::{RecipeAdjustment, RecipeIngredient, RecipeStep, RecipeTemplate};

/// Steps in `order` sequence, whatever order the template lists them in.
pub fn ordered_steps(recipe: &RecipeTemplate) -> Vec<&RecipeStep> {
    let mut steps: Vec<&RecipeStep> = recipe.steps.iter().collect();
    steps.sort_by_key(|step| step.order);
    steps
}

/// Ingredients a step mentions: the normalized name appears in the normalized instruction.
/// Excluded ingredients are never reported.
pub fn relevant_ingredients<'a>(
    step: &RecipeStep,
    ingredients: &'a [RecipeIngredient],
    adjustment: Option<&RecipeAdjustment>,
) -> Vec<&'a RecipeIngredient> {
    let instruction = normalize(&step.instruction);
    ingredients
        .iter()
        .filter(|ingredient| !adjustment.map_or(false, |a| a.excludes(&ingredient.name)))
        .filter(|ingredient| {
            let name = normalize(&ingredient.name);
            !name.is_empty() && instruction.contains(&name)
        })
        .collect()
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StepView {
    pub order: u32,
    pub instruction: String,
    pub duration: Option<u32>,
    pub tip: Option<String>,
    pub ingredients: Vec<String>,
}

/// Everything the recipe screen shows, adjustment applied.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RecipeDetail {
    pub id: String,
    pub title: String,
    pub servings: u32,
    pub adjusted: bool,
    pub ingredients: Vec<DisplayIngredient>,
    pub excluded: Vec<String>,
    pub steps: Vec<StepView>,
}

impl RecipeDetail {
    pub fn build(recipe: &RecipeTemplate, adjustment: Option<&RecipeAdjustment>) -> Self {
        let steps = ordered_steps(recipe)
            .into_iter()
            .map(|step| StepView {
                order: step.order,
                instruction: step.instruction.clone(),
                duration: step.duration,
                tip: step.tip.clone(),
                ingredients: relevant_ingredients(step, &recipe.ingredients, adjustment)
                    .into_iter()
                    .map(|ingredient| ingredient.name.clone())
                    .collect(),
            })
            .collect();

        Self {
            id: recipe.id.clone(),
            title: recipe.title.clone(),
            servings: adjustment
                .map(|a| a.servings)
                .unwrap_or_else(|| effective_servings(recipe.servings)),
            adjusted: adjustment.is_some(),
            ingredients: render_ingredients(recipe, adjustment),
            excluded: adjustment.map(|a| a.excluded_ingredients.clone()).unwrap_or_default(),
            steps,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::Catalog;
    use anyhow::Result;

    fn curry() -> Result<RecipeTemplate> {
        let catalog = Catalog::builtin()?;
        catalog
            .lookup("poulet-curry-riz")
            .recipe()
            .cloned()
            .ok_or_else(|| anyhow::anyhow!("missing builtin recipe"))
    }

    #[test]
    fn test_steps_sorted_by_order() -> Result<()> {
        let catalog = Catalog::builtin()?;
        let salad = catalog.lookup("salade-tomates-basilic").recipe().unwrap();
        let orders: Vec<u32> = ordered_steps(salad).iter().map(|s| s.order).collect();
        assert_eq!(orders, vec![1, 2, 3]);
        assert!(ordered_steps(salad)[0].instruction.starts_with("Couper"));
        Ok(())
    }

    #[test]
    fn test_relevant_ingredients_by_normalized_name() -> Result<()> {
        let recipe = curry()?;
        let step = &recipe.steps[0]; // "Emincer l'oignon et couper le poulet en des."
        let names: Vec<&str> = relevant_ingredients(step, &recipe.ingredients, None)
            .iter()
            .map(|i| i.name.as_str())
            .collect();
        assert_eq!(names, vec!["Poulet", "Oignon"]);
        Ok(())
    }

    #[test]
    fn test_relevant_ingredients_skip_excluded() -> Result<()> {
        let recipe = curry()?;
        let mut adjustment = RecipeAdjustment::new(&recipe.id, 2);
        adjustment.excluded_ingredients.push("Oignon".to_string());
        let names: Vec<&str> = relevant_ingredients(&recipe.steps[0], &recipe.ingredients, Some(&adjustment))
            .iter()
            .map(|i| i.name.as_str())
            .collect();
        assert_eq!(names, vec!["Poulet"]);
        Ok(())
    }

    #[test]
    fn test_detail_with_adjustment() -> Result<()> {
        let recipe = curry()?;
        let mut adjustment = RecipeAdjustment::new(&recipe.id, 4);
        adjustment.excluded_ingredients.push("Coriandre".to_string());
        adjustment.added_ingredients.push("Citron vert".to_string());

        let detail = RecipeDetail::build(&recipe, Some(&adjustment));
        assert!(detail.adjusted);
        assert_eq!(detail.servings, 4);
        assert_eq!(detail.excluded, vec!["Coriandre".to_string()]);
        assert!(detail.ingredients.iter().all(|line| line.name() != "Coriandre"));
        assert_eq!(detail.ingredients.last().map(DisplayIngredient::name), Some("Citron vert"));
        assert!(matches!(
            &detail.ingredients[0],
            DisplayIngredient::Scaled { name, quantity, .. } if name == "Poulet" && *quantity == 600.0
        ));
        // last step mentions coriandre, which is excluded
        assert!(detail.steps[3].ingredients.iter().all(|name| name != "Coriandre"));
        Ok(())
    }

    #[test]
    fn test_detail_without_adjustment_uses_default_servings() -> Result<()> {
        let catalog = Catalog::builtin()?;
        let bowl = catalog.lookup("trending-buddha-bowl").recipe().unwrap();
        assert_eq!(bowl.servings, 0);
        let detail = RecipeDetail::build(bowl, None);
        assert_eq!(detail.servings, 2);
        assert!(!detail.adjusted);
        assert!(detail.excluded.is_empty());
        Ok(())
    }
}
