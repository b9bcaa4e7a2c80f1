use std::path::PathBuf;

use clap::{Parser, Subcommand, ValueEnum};

use crate::session::LoginProvider;

#[derive(Parser, Debug)]
#[command(author, version, about = "Recipe suggestions from the ingredients you have", long_about = None)]
pub struct Cli {
    /// Path to the JSON store file (overrides SMART_MEAL_STORE_PATH)
    #[arg(long, global = true)]
    pub store: Option<PathBuf>,

    /// Directory holding the recipe catalog JSON files (overrides SMART_MEAL_CATALOG_DIR)
    #[arg(long, global = true)]
    pub catalog_dir: Option<PathBuf>,

    /// Pause before suggestions are shown, in milliseconds
    #[arg(long, global = true)]
    pub delay_ms: Option<u64>,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Suggest recipes for a list of ingredients
    Suggest {
        ingredients: Vec<String>,
        /// Dictated text, split on commas and spaces
        #[arg(long)]
        transcript: Option<String>,
    },
    /// Show a recipe, optionally adjusted
    Show {
        id: String,
        #[arg(long)]
        servings: Option<u32>,
        /// Ingredient to leave out (repeatable)
        #[arg(long)]
        exclude: Vec<String>,
        /// Extra ingredient (repeatable)
        #[arg(long)]
        add: Vec<String>,
        /// Save the adjustment with the favorite
        #[arg(long)]
        save: bool,
    },
    /// Add or remove a favorite
    Favorite { id: String },
    /// List favorites
    Favorites,
    /// Walk through a recipe step by step
    Cook { id: String },
    /// Sign in
    Login {
        #[arg(long, conflicts_with = "provider", required_unless_present = "provider")]
        email: Option<String>,
        #[arg(long, value_enum)]
        provider: Option<ProviderArg>,
    },
    /// Choose a plan, or `none` to drop it
    Plan { id: String },
    /// List the available plans
    Plans,
    /// Show the signed-in user
    Whoami,
    /// Sign out
    Logout,
}

#[derive(ValueEnum, Clone, Copy, Debug, PartialEq, Eq)]
pub enum ProviderArg {
    Apple,
    Google,
}

impl From<ProviderArg> for LoginProvider {
    fn from(arg: ProviderArg) -> Self {
        match arg {
            ProviderArg::Apple => LoginProvider::Apple,
            ProviderArg::Google => LoginProvider::Google,
        }
    }
}

pub fn parse_args() -> Cli {
    Cli::parse()
}
