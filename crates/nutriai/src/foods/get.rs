use crate::prelude::{println, *};
use serde::{Deserialize, Serialize};

use nutriai_core::error::code_lookup_message;
use nutriai_core::food::Food;
use nutriai_core::request::parse_food_code;

use crate::client::{NutritionApi, Transport};
use crate::render::food_card;

#[derive(Debug, clap::Args, Serialize, Deserialize, Clone)]
pub struct GetOptions {
    /// Food code (codigomex2)
    #[arg(value_name = "CODE")]
    pub code: String,

    /// Output as JSON
    #[arg(long)]
    pub json: bool,
}

/// Parse a code argument or explain why it is not one
pub fn parse_code(input: &str) -> Result<u64> {
    parse_food_code(input).ok_or_else(|| Error::InvalidCode(input.trim().to_string()).into())
}

pub async fn get_food_data<T: Transport>(api: &NutritionApi<T>, code: u64) -> Result<Food> {
    api.get(code)
        .await
        .map_err(|e| eyre!(code_lookup_message(code, &e)))
}

pub async fn run(options: GetOptions, api: &NutritionApi) -> Result<()> {
    let code = parse_code(&options.code)?;
    let food = get_food_data(api, code).await?;

    if options.json {
        println!("{}", serde_json::to_string_pretty(&food)?);
    } else {
        print!("{}", food_card(&food));
    }

    Ok(())
}
