use std::time::Duration;

use anyhow::Result;
use smart_meal::adjustment::{AdjustmentDraft, DisplayIngredient};
use smart_meal::app::AppContext;
use smart_meal::catalog::{CatalogLookup, CatalogSource};
use smart_meal::config::{AppConfig, StoreLocation};
use smart_meal::plans::PlanId;
use tempfile::TempDir;

fn file_config(dir: &TempDir) -> AppConfig {
    AppConfig {
        store: StoreLocation::File(dir.path().join("store.json")),
        generation_delay: Duration::ZERO,
        ..AppConfig::default()
    }
}

#[tokio::test]
async fn test_suggest_favorite_adjust_and_reopen() -> Result<()> {
    let dir = TempDir::new()?;
    let config = file_config(&dir);

    {
        let mut app = AppContext::init(&config)?;
        app.ingredients_mut().add_transcript("Poulet, riz, curry");
        let suggestions = app.generate().await;
        assert_eq!(suggestions[0].id, "poulet-curry-riz");

        let recipe = suggestions[0].clone();
        assert!(app.toggle_favorite(&recipe.id, None)?);

        let mut draft = AdjustmentDraft::new(&recipe, None);
        draft.set_servings(4);
        draft.toggle_excluded("Coriandre");
        draft.add_ingredient("Citron vert");
        assert!(app.save_adjustment(draft.finish()));
        app.teardown();
    }

    let app = AppContext::init(&config)?;
    assert!(app.is_favorite("poulet-curry-riz"));
    let detail = app
        .recipe_detail("poulet-curry-riz", None)
        .expect("favorited recipe resolves");
    assert_eq!(detail.servings, 4);
    assert!(detail.ingredients.iter().all(|line| line.name() != "Coriandre"));
    assert!(detail.ingredients.contains(&DisplayIngredient::Added {
        name: "Citron vert".to_string()
    }));
    Ok(())
}

#[tokio::test]
async fn test_unmatched_ingredients_fall_back() -> Result<()> {
    let app_config = AppConfig::ephemeral();
    let mut app = AppContext::init(&app_config)?;
    app.ingredients_mut().add("zzzz");
    let suggestions = app.generate().await;
    let fallback: Vec<&str> = app.catalog().fallback().iter().map(|r| r.id.as_str()).collect();
    let ids: Vec<&str> = suggestions.iter().map(|r| r.id.as_str()).collect();
    assert_eq!(ids, fallback);
    Ok(())
}

#[test]
fn test_trending_and_fallback_recipes_resolve() -> Result<()> {
    let app = AppContext::init(&AppConfig::ephemeral())?;
    assert!(matches!(
        app.lookup("trending-ratatouille"),
        CatalogLookup::Found {
            source: CatalogSource::Trending,
            ..
        }
    ));
    assert!(matches!(
        app.lookup("fallback-pates-ail"),
        CatalogLookup::Found {
            source: CatalogSource::Fallback,
            ..
        }
    ));
    assert!(matches!(app.lookup("nope"), CatalogLookup::NotFound));
    Ok(())
}

#[test]
fn test_session_survives_reopen() -> Result<()> {
    let dir = TempDir::new()?;
    let config = file_config(&dir);

    {
        let mut app = AppContext::init(&config)?;
        app.session_mut().login_with_email("camille@example.com");
        app.session_mut().set_plan(Some(PlanId::Monthly));
    }

    let mut app = AppContext::init(&config)?;
    let user = app.session().user().expect("session restored");
    assert_eq!(user.name, "Camille");
    assert_eq!(user.plan, Some(PlanId::Monthly));

    app.session_mut().logout();
    let app = AppContext::init(&config)?;
    assert!(!app.session().is_authenticated());
    Ok(())
}

#[tokio::test]
async fn test_cooking_uses_favorited_adjustment() -> Result<()> {
    let mut app = AppContext::init(&AppConfig::ephemeral())?;
    let mut adjustment = smart_meal::recipe::RecipeAdjustment::new("poulet-curry-riz", 1);
    adjustment.excluded_ingredients.push("Oignon".to_string());
    app.toggle_favorite("poulet-curry-riz", Some(adjustment))?;

    let mut session = app.start_cooking("poulet-curry-riz", None)?;
    let lines = session.relevant_ingredients();
    assert_eq!(lines.len(), 1);
    assert!(matches!(
        &lines[0],
        DisplayIngredient::Scaled { name, quantity, .. } if name == "Poulet" && *quantity == 150.0
    ));
    assert!(session.start_timer());
    session.finish();
    assert_eq!(session.remaining_seconds(), None);
    Ok(())
}
