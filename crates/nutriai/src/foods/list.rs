use crate::prelude::{println, *};
use colored::Colorize;
use serde::{Deserialize, Serialize};

use nutriai_core::error::search_message;
use nutriai_core::fetch::{food_page, FoodPage};
use nutriai_core::filters::{FilterCriteria, FilterError, Nutrient};

use super::page_window;
use crate::client::{NutritionApi, Transport};
use crate::config::ApiConfig;
use crate::render::food_table;

#[derive(Debug, clap::Args, Serialize, Deserialize, Clone)]
pub struct ListOptions {
    /// Page number (1-indexed)
    #[arg(short, long, default_value = "1")]
    pub page: usize,

    /// Output as JSON
    #[arg(long)]
    pub json: bool,
}

#[derive(Debug, clap::Args, Serialize, Deserialize, Clone)]
#[command(after_help = "EXAMPLES:
  # High protein, low fat foods:
  nutriai foods search --min-protein 20 --max-fat 5

  # Cheeses under 300 kcal:
  nutriai foods search --name queso --max-calories 300

NOTES:
  - Ranges: calories 0-1000 kcal, carbohydrates/protein/fat 0-100 g, fiber 0-50 g
  - Bounds left at the edge of their range are not sent")]
pub struct SearchOptions {
    /// Food name to combine with the ranges
    #[arg(long)]
    pub name: Option<String>,

    #[arg(long)]
    pub min_calories: Option<f64>,
    #[arg(long)]
    pub max_calories: Option<f64>,
    #[arg(long)]
    pub min_carbs: Option<f64>,
    #[arg(long)]
    pub max_carbs: Option<f64>,
    #[arg(long)]
    pub min_protein: Option<f64>,
    #[arg(long)]
    pub max_protein: Option<f64>,
    #[arg(long)]
    pub min_fat: Option<f64>,
    #[arg(long)]
    pub max_fat: Option<f64>,
    #[arg(long)]
    pub min_fiber: Option<f64>,
    #[arg(long)]
    pub max_fiber: Option<f64>,

    /// Page number (1-indexed)
    #[arg(short, long, default_value = "1")]
    pub page: usize,

    /// Output as JSON
    #[arg(long)]
    pub json: bool,
}

#[derive(Debug, clap::Args, Serialize, Deserialize, Clone)]
pub struct FindOptions {
    /// Part of the food name (at least 2 characters)
    #[arg(value_name = "TERM")]
    pub term: String,

    /// Page number (1-indexed)
    #[arg(short, long, default_value = "1")]
    pub page: usize,

    /// Output as JSON
    #[arg(long)]
    pub json: bool,
}

impl SearchOptions {
    /// Filter criteria from the range flags, in min-then-max order per nutrient
    pub fn criteria(&self) -> std::result::Result<FilterCriteria, FilterError> {
        let mut criteria = FilterCriteria::new();
        let bounds = [
            (Nutrient::Calories, self.min_calories, self.max_calories),
            (Nutrient::Carbohydrates, self.min_carbs, self.max_carbs),
            (Nutrient::Protein, self.min_protein, self.max_protein),
            (Nutrient::Fat, self.min_fat, self.max_fat),
            (Nutrient::Fiber, self.min_fiber, self.max_fiber),
        ];

        for (nutrient, min, max) in bounds {
            if let Some(max) = max {
                criteria.set_max(nutrient, max)?;
            }
            if let Some(min) = min {
                criteria.set_min(nutrient, min)?;
            }
        }

        Ok(criteria)
    }

    fn command(&self) -> String {
        let mut command = "nutriai foods search".to_string();
        if let Some(name) = &self.name {
            command.push_str(&f!(" --name {name:?}"));
        }
        let flags = [
            ("--min-calories", self.min_calories),
            ("--max-calories", self.max_calories),
            ("--min-carbs", self.min_carbs),
            ("--max-carbs", self.max_carbs),
            ("--min-protein", self.min_protein),
            ("--max-protein", self.max_protein),
            ("--min-fat", self.min_fat),
            ("--max-fat", self.max_fat),
            ("--min-fiber", self.min_fiber),
            ("--max-fiber", self.max_fiber),
        ];
        for (flag, value) in flags {
            if let Some(value) = value {
                command.push_str(&f!(" {flag} {value}"));
            }
        }
        command
    }
}

pub async fn list_foods_data<T: Transport>(
    api: &NutritionApi<T>,
    page: usize,
    page_size: usize,
) -> Result<FoodPage> {
    let (cursor, request) = page_window(page, page_size);
    let foods = api.list(request).await.map_err(|e| eyre!(search_message(&e)))?;
    Ok(food_page(cursor, page.max(1), foods, "nutriai foods list"))
}

pub async fn search_foods_data<T: Transport>(
    api: &NutritionApi<T>,
    options: &SearchOptions,
    page_size: usize,
) -> Result<FoodPage> {
    let criteria = options.criteria()?;
    let (cursor, request) = page_window(options.page, page_size);
    let name = options
        .name
        .as_deref()
        .map(str::trim)
        .filter(|n| !n.is_empty());

    let foods = api
        .search(&criteria, name, request)
        .await
        .map_err(|e| eyre!(search_message(&e)))?;
    Ok(food_page(cursor, options.page.max(1), foods, &options.command()))
}

pub async fn find_foods_data<T: Transport>(
    api: &NutritionApi<T>,
    term: &str,
    page: usize,
    page_size: usize,
) -> Result<FoodPage> {
    let (cursor, request) = page_window(page, page_size);
    let foods = api
        .find(term, request)
        .await
        .map_err(|e| eyre!(search_message(&e)))?;
    let command = f!("nutriai foods find {term:?}");
    Ok(food_page(cursor, page.max(1), foods, &command))
}

pub async fn run_list(options: ListOptions, api: &NutritionApi, config: &ApiConfig) -> Result<()> {
    let output = list_foods_data(api, options.page, config.page_size).await?;
    print_page(&output, options.json)
}

pub async fn run_search(
    options: SearchOptions,
    api: &NutritionApi,
    config: &ApiConfig,
) -> Result<()> {
    let output = search_foods_data(api, &options, config.page_size).await?;
    print_page(&output, options.json)
}

pub async fn run_find(options: FindOptions, api: &NutritionApi, config: &ApiConfig) -> Result<()> {
    let output = find_foods_data(api, &options.term, options.page, config.page_size).await?;
    print_page(&output, options.json)
}

fn print_page(output: &FoodPage, json: bool) -> Result<()> {
    if json {
        println!("{}", serde_json::to_string_pretty(output)?);
    } else {
        print!("{}", format_page_text(output));
    }
    Ok(())
}

fn format_page_text(output: &FoodPage) -> String {
    let info = &output.pagination;
    let mut result = String::new();

    if output.foods.is_empty() {
        result.push_str(&f!("\n{}\n", "No foods on this page.".yellow()));
    } else {
        result.push_str(&f!(
            "\n{} {} (page {})\n\n",
            output.foods.len().to_string().bright_cyan().bold(),
            "foods".bright_white(),
            info.page
        ));
        let offset = (info.page - 1) * info.page_size;
        result.push_str(&food_table(&output.foods, offset).to_string());
    }

    match &info.next_page_command {
        Some(command) => result.push_str(&f!("\n{}: {}\n", "Next page".green(), command.cyan())),
        None if !output.foods.is_empty() => {
            result.push_str(&f!("\n{}\n", "End of results.".bright_black()))
        }
        None => {}
    }
    if let Some(first) = output.foods.first() {
        result.push_str(&f!(
            "{}: {}\n",
            "Details".green(),
            f!("nutriai nutrition {}", first.code).cyan()
        ));
    }

    result
}
