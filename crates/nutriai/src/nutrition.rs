use crate::prelude::{println, *};
use serde::{Deserialize, Serialize};

use nutriai_core::analysis::{analyze, FoodAnalysis};
use nutriai_core::error::search_message;
use nutriai_core::request::PageRequest;

use crate::client::{NutritionApi, Transport};
use crate::config::ApiConfig;
use crate::foods::get::{get_food_data, parse_code};
use crate::render::analysis_text;

#[derive(Debug, clap::Args, Serialize, Deserialize, Clone)]
#[command(about = "Nutrition analysis of one food")]
pub struct App {
    /// Food code (codigomex2); defaults to the first food of the catalog
    #[arg(value_name = "CODE")]
    pub code: Option<String>,

    /// Output as JSON
    #[arg(long)]
    pub json: bool,
}

pub async fn analysis_data<T: Transport>(
    api: &NutritionApi<T>,
    code: Option<u64>,
) -> Result<FoodAnalysis> {
    let food = match code {
        Some(code) => get_food_data(api, code).await?,
        None => api
            .list(PageRequest::page(1, 1))
            .await
            .map_err(|e| eyre!(search_message(&e)))?
            .into_iter()
            .next()
            .ok_or_eyre("The food catalog is empty")?,
    };

    Ok(analyze(food))
}

pub async fn run(app: App, global: crate::Global) -> Result<()> {
    let config = ApiConfig::from_env()?.with_overrides(&global);
    let api = NutritionApi::from_config(&config);

    let code = app.code.as_deref().map(parse_code).transpose()?;
    let analysis = analysis_data(&api, code).await?;

    if app.json {
        println!("{}", serde_json::to_string_pretty(&analysis)?);
    } else {
        print!("{}", analysis_text(&analysis));
    }

    Ok(())
}
