use crate::prelude::*;
use colored::Colorize;

use nutriai_core::recipe::{Recipe, RecipeSource, SelectedIngredients};

use crate::render::amount;

pub mod generate;
pub mod pick;

#[derive(Debug, clap::Parser)]
#[command(name = "recipe")]
#[command(about = "Build recipes from selected ingredients")]
pub struct App {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Debug, clap::Subcommand)]
pub enum Commands {
    /// Generate a recipe from CODE:GRAMS ingredient specs
    #[clap(name = "generate")]
    Generate(generate::GenerateOptions),

    /// Pick ingredients interactively, then generate a recipe
    #[clap(name = "pick")]
    Pick(pick::PickOptions),
}

pub async fn run(app: App, global: crate::Global) -> Result<()> {
    match app.command {
        Commands::Generate(options) => generate::run(options, global).await,
        Commands::Pick(options) => pick::run(options, global).await,
    }
}

pub(crate) fn format_selected_text(selected: &SelectedIngredients) -> String {
    if selected.is_empty() {
        return f!("{}\n", "No ingredients selected.".yellow());
    }

    let mut result = f!("{}\n", "SELECTED INGREDIENTS".bright_cyan().bold());
    for item in selected.items() {
        result.push_str(&f!(
            "  {} {} {}\n",
            f!("[{}]", item.food.code).yellow(),
            item.food.name.bright_white(),
            f!("{}g", amount(item.grams)).green()
        ));
    }
    result
}

pub(crate) fn format_recipe_text(recipe: &Recipe) -> String {
    let mut result = String::new();

    result.push_str(&f!("\n{}\n", "=".repeat(80).bright_cyan()));
    result.push_str(&f!("{}\n", recipe.title.bright_cyan().bold()));
    result.push_str(&f!("{}\n", "=".repeat(80).bright_cyan()));
    result.push_str(&f!(
        "{}: {} | {}: {}\n",
        "Cook time".green(),
        recipe.cook_time,
        "Servings".green(),
        recipe.servings
    ));
    if recipe.source == RecipeSource::Local {
        result.push_str(&f!("{}\n", "Generated locally".bright_black()));
    }

    result.push_str(&f!("\n{}\n", "INGREDIENTS".bright_white().bold()));
    for line in &recipe.ingredients {
        result.push_str(&f!("  - {line}\n"));
    }

    result.push_str(&f!("\n{}\n", "INSTRUCTIONS".bright_white().bold()));
    for line in recipe.instructions.lines() {
        result.push_str(&f!("  {}\n", line.trim()));
    }

    let n = &recipe.nutrition;
    result.push_str(&f!("\n{}\n", "NUTRITION (whole recipe)".bright_white().bold()));
    result.push_str(&f!(
        "  {} kcal | protein {}g | carbohydrates {}g | fat {}g | fiber {}g\n",
        amount(n.energy_kcal),
        amount(n.protein_g),
        amount(n.carbohydrate_g),
        amount(n.fat_g),
        amount(n.fiber_g)
    ));
    result.push_str(&f!(
        "  calcium {}mg | iron {}mg | vitamin C {}mg\n",
        amount(n.calcium_mg),
        amount(n.iron_mg),
        amount(n.vitamin_c_mg)
    ));

    result.push('\n');
    result
}
