use crate::prelude::{eprintln, println, *};
use colored::Colorize;
use futures::future::join_all;
use serde::{Deserialize, Serialize};

use nutriai_core::error::{code_lookup_message, ApiError};
use nutriai_core::recipe::{parse_ingredient_spec, Recipe, SelectedIngredients};

use super::{format_recipe_text, format_selected_text};
use crate::client::{NutritionApi, Transport};
use crate::config::ApiConfig;

#[derive(Debug, clap::Args, Serialize, Deserialize, Clone)]
#[command(after_help = "EXAMPLES:
  # 150 g of chicken breast with the default 100 g of rice:
  nutriai recipe generate 101001:150 201002

NOTES:
  - Quantities below 10 g are raised to 10 g
  - When the recipe service is unavailable a simple local recipe is shown")]
pub struct GenerateOptions {
    /// Ingredients as CODE:GRAMS (or CODE=GRAMS, or a bare CODE for 100 g)
    #[arg(value_name = "INGREDIENT", required = true)]
    pub ingredients: Vec<String>,

    /// Output as JSON
    #[arg(long)]
    pub json: bool,
}

#[derive(Debug, Serialize)]
pub struct GeneratedRecipe {
    pub recipe: Recipe,
    /// Why the local fallback was used, if it was
    #[serde(skip_serializing_if = "Option::is_none")]
    pub fallback_reason: Option<String>,
}

/// Resolve every spec to a food and collect the selection
pub async fn select_ingredients<T: Transport>(
    api: &NutritionApi<T>,
    specs: &[String],
) -> Result<SelectedIngredients> {
    let parsed = specs
        .iter()
        .map(|spec| parse_ingredient_spec(spec))
        .collect::<std::result::Result<Vec<_>, _>>()?;

    let lookups = parsed.iter().map(|(code, _)| api.get(*code));
    let foods = join_all(lookups).await;

    let mut selected = SelectedIngredients::new();
    for ((code, grams), food) in parsed.into_iter().zip(foods) {
        let food = food.map_err(|e: ApiError| eyre!(code_lookup_message(code, &e)))?;
        if !selected.add_with_quantity(food, grams) {
            log::warn!("ingredient {code} listed more than once, keeping the first quantity");
        }
    }

    Ok(selected)
}

pub async fn generate_data<T: Transport>(
    api: &NutritionApi<T>,
    selected: &SelectedIngredients,
) -> Result<GeneratedRecipe> {
    let (recipe, fallback) = api.generate_recipe(selected).await?;
    Ok(GeneratedRecipe {
        recipe,
        fallback_reason: fallback.map(|e| e.to_string()),
    })
}

pub(crate) fn print_generated(output: &GeneratedRecipe, json: bool) -> Result<()> {
    if json {
        println!("{}", serde_json::to_string_pretty(output)?);
        return Ok(());
    }

    if let Some(reason) = &output.fallback_reason {
        eprintln!(
            "{} {}",
            "Recipe service unavailable, showing a local recipe:".yellow(),
            reason
        );
    }
    print!("{}", format_recipe_text(&output.recipe));
    Ok(())
}

pub async fn run(options: GenerateOptions, global: crate::Global) -> Result<()> {
    let config = ApiConfig::from_env()?.with_overrides(&global);
    let api = NutritionApi::from_config(&config);

    let selected = select_ingredients(&api, &options.ingredients).await?;
    if global.verbose {
        print!("{}", format_selected_text(&selected));
    }

    let output = generate_data(&api, &selected).await?;
    print_generated(&output, options.json)
}
