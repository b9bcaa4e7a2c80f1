use std::time::Duration;

use anyhow::{bail, Result};
use smart_meal::adjustment::AdjustmentDraft;
use smart_meal::app::AppContext;
use smart_meal::cli::{parse_args, Cli, Command};
use smart_meal::config::{AppConfig, StoreLocation};
use smart_meal::cooking::{format_clock, step_seconds, CookingSession};
use smart_meal::detail::RecipeDetail;
use smart_meal::logging::init_logging;
use smart_meal::plans::{PlanId, PLANS, PREMIUM_PLANS};
use smart_meal::recipe::{RecipeAdjustment, RecipeTemplate};
use tokio::io::{AsyncBufReadExt, BufReader};

fn config_from(cli: &Cli) -> AppConfig {
    let mut config = AppConfig::from_env();
    if let Some(path) = &cli.store {
        config.store = StoreLocation::File(path.clone());
    }
    if let Some(dir) = &cli.catalog_dir {
        config.catalog_dir = Some(dir.clone());
    }
    if let Some(ms) = cli.delay_ms {
        config.generation_delay = Duration::from_millis(ms);
    }
    config
}

fn print_suggestions(recipes: &[RecipeTemplate]) {
    if recipes.is_empty() {
        println!("No ingredients given, nothing to suggest.");
        return;
    }
    for recipe in recipes {
        println!(
            "{:<26} {} ({} min, {} kcal, {:?})",
            recipe.id, recipe.title, recipe.time, recipe.kcal, recipe.difficulty
        );
    }
}

fn print_detail(detail: &RecipeDetail, is_favorite: bool) {
    let star = if is_favorite { " *" } else { "" };
    println!("{}{}", detail.title, star);
    println!("{} portions{}", detail.servings, if detail.adjusted { " (ajuste)" } else { "" });
    println!("\nIngredients:");
    for line in &detail.ingredients {
        println!("  - {}", line.label());
    }
    if !detail.excluded.is_empty() {
        println!("Ingredients exclus : {}", detail.excluded.join(", "));
    }
    println!("\nEtapes:");
    for step in &detail.steps {
        let duration = step.duration.map(|m| format!(" [{} min]", m)).unwrap_or_default();
        println!("  {}. {}{}", step.order, step.instruction, duration);
        if let Some(tip) = &step.tip {
            println!("     Astuce : {}", tip);
        }
    }
}

/// Draft built from the favorite's snapshot (if any) and the command-line edits.
fn explicit_adjustment(
    app: &AppContext,
    recipe: &RecipeTemplate,
    servings: Option<u32>,
    exclude: &[String],
    add: &[String],
) -> Option<RecipeAdjustment> {
    if servings.is_none() && exclude.is_empty() && add.is_empty() {
        return None;
    }
    let initial = app.active_adjustment(&recipe.id, None);
    let mut draft = AdjustmentDraft::new(recipe, initial.as_ref());
    if let Some(servings) = servings {
        draft.set_servings(servings);
    }
    for name in exclude {
        if !draft.is_excluded(name) {
            draft.toggle_excluded(name);
        }
    }
    for name in add {
        draft.add_ingredient(name);
    }
    Some(draft.finish())
}

fn print_step(session: &CookingSession) {
    let (n, total) = session.position();
    let step = session.current_step();
    println!("\nEtape {} sur {} ({}%)", n, total, session.progress_percent());
    println!("{}", step.instruction);
    if let Some(tip) = &step.tip {
        println!("Astuce : {}", tip);
    }
    for line in session.relevant_ingredients() {
        println!("  - {}", line.label());
    }
    if let Some(minutes) = step.duration {
        println!("Minuteur : {} (t pour lancer)", format_clock(step_seconds(minutes)));
    }
}

async fn cook(mut session: CookingSession) -> Result<()> {
    println!("Commandes : [n]ext, [p]revious, [t]imer, [s]top, [r]emaining, [f]inish, [q]uit");
    print_step(&session);
    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    while let Some(line) = lines.next_line().await? {
        match line.trim() {
            "" | "n" => {
                if session.is_last_step() {
                    session.finish();
                    println!("Bon appetit !");
                    break;
                }
                session.next_step();
                print_step(&session);
            }
            "p" => {
                session.previous_step();
                print_step(&session);
            }
            "t" => {
                if !session.start_timer() {
                    println!("Pas de minuteur pour cette etape.");
                }
            }
            "s" => session.stop_timer(),
            "r" => match session.remaining_seconds() {
                Some(0) => println!("Temps ecoule !"),
                Some(seconds) => println!("{}", format_clock(seconds)),
                None => println!("Minuteur non lance."),
            },
            "f" => {
                session.finish();
                println!("Bon appetit !");
                break;
            }
            "q" => break,
            other => println!("Commande inconnue : {}", other),
        }
    }
    Ok(())
}

async fn run(app: &mut AppContext, command: Command) -> Result<()> {
    match command {
        Command::Suggest {
            ingredients,
            transcript,
        } => {
            app.ingredients_mut().extend(&ingredients);
            if let Some(transcript) = transcript {
                app.ingredients_mut().add_transcript(&transcript);
            }
            println!("Generating suggestions for: {}", app.ingredients().items().join(", "));
            let recipes = app.generate().await;
            print_suggestions(&recipes);
        }
        Command::Show {
            id,
            servings,
            exclude,
            add,
            save,
        } => {
            let Some(recipe) = app.lookup(&id).recipe().cloned() else {
                bail!("Unknown recipe '{}'", id);
            };
            let explicit = explicit_adjustment(app, &recipe, servings, &exclude, &add);
            if save {
                match explicit.clone() {
                    Some(adjustment) => {
                        if app.save_adjustment(adjustment) {
                            println!("Adjustment saved.");
                        } else {
                            println!("Not a favorite, adjustment not saved.");
                        }
                    }
                    None => println!("Nothing to save."),
                }
            }
            if let Some(detail) = app.recipe_detail(&id, explicit.as_ref()) {
                print_detail(&detail, app.is_favorite(&id));
            }
        }
        Command::Favorite { id } => {
            if app.toggle_favorite(&id, None)? {
                println!("Added '{}' to favorites.", id);
            } else {
                println!("Removed '{}' from favorites.", id);
            }
        }
        Command::Favorites => {
            if app.favorites().is_empty() {
                println!("No favorites yet.");
            }
            for favorite in app.favorites() {
                let servings = favorite
                    .adjustment
                    .as_ref()
                    .map(|a| format!(" ({} portions)", a.servings))
                    .unwrap_or_default();
                println!("{:<26} {}{}", favorite.recipe_id, favorite.recipe_title, servings);
            }
        }
        Command::Cook { id } => {
            let session = app.start_cooking(&id, None)?;
            cook(session).await?;
        }
        Command::Login { email, provider } => {
            let user = match (email, provider) {
                (Some(email), _) => app.session_mut().login_with_email(&email),
                (None, Some(provider)) => app.session_mut().login_with_provider(provider.into()),
                (None, None) => bail!("Pass --email or --provider"),
            };
            println!("Signed in as {} <{}>", user.name, user.email);
        }
        Command::Plan { id } => {
            if !app.session().is_authenticated() {
                bail!("Sign in before choosing a plan");
            }
            let plan = match id.trim() {
                "none" => None,
                other => Some(other.parse::<PlanId>().map_err(anyhow::Error::msg)?),
            };
            app.session_mut().set_plan(plan);
            match plan {
                Some(plan) => println!("Plan set to {}.", plan.plan().display_name),
                None => println!("Plan removed."),
            }
        }
        Command::Plans => {
            for id in PREMIUM_PLANS {
                let plan = id.plan();
                let extras: Vec<&str> = [plan.badge, plan.discount].into_iter().flatten().collect();
                println!(
                    "{:<8} {:<8} {} EUR {} {}",
                    plan.id,
                    plan.display_name,
                    plan.price_display,
                    plan.period,
                    extras.join(" ")
                );
            }
            println!("{:<8} {:<8} gratuit", PLANS[0].id, PLANS[0].display_name);
        }
        Command::Whoami => match app.session().user() {
            Some(user) => {
                let plan = user.plan.map(|p| p.plan().display_name).unwrap_or("aucun");
                println!("{} <{}> ({}), plan: {}", user.name, user.email, user.id, plan);
            }
            None => println!("Not signed in."),
        },
        Command::Logout => {
            app.session_mut().logout();
            println!("Signed out.");
        }
    }
    Ok(())
}

#[tokio::main]
async fn main() -> Result<()> {
    dotenv::dotenv().ok();

    let cli = parse_args();
    let config = config_from(&cli);
    init_logging(&config.log_level)?;

    let mut app = AppContext::init(&config)?;
    let result = run(&mut app, cli.command).await;
    app.teardown();
    result
}
