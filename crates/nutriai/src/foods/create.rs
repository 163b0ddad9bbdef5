use crate::prelude::{println, *};
use colored::Colorize;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use nutriai_core::food::{map_remote_food, RemoteFood};

use crate::client::{NutritionApi, Transport};
use crate::render::food_card;

#[derive(Debug, clap::Args, Serialize, Deserialize, Clone)]
#[command(after_help = "The file holds one food record using the service field names, e.g.:
  { \"codigomex2\": 990001, \"nombre_del_alimento\": \"Tortilla de maíz\", \"energ_kcal\": 218 }")]
pub struct CreateOptions {
    /// JSON file with the food record
    #[arg(value_name = "FILE")]
    pub file: PathBuf,

    /// Output as JSON
    #[arg(long)]
    pub json: bool,
}

pub fn read_food_file(path: &Path) -> Result<RemoteFood> {
    let content = std::fs::read_to_string(path).map_err(|e| Error::ReadFile {
        path: path.display().to_string(),
        reason: e.to_string(),
    })?;

    serde_json::from_str(&content)
        .wrap_err_with(|| f!("{} is not a valid food record", path.display()))
}

pub async fn create_food_data<T: Transport>(
    api: &NutritionApi<T>,
    food: &RemoteFood,
) -> Result<nutriai_core::food::Food> {
    let created = api
        .create(food)
        .await
        .map_err(|e| eyre!("Failed to create food {}: {}", food.code, e))?;

    // Services that answer without a body get the submitted record echoed
    Ok(created.unwrap_or_else(|| map_remote_food(food.clone())))
}

pub async fn run(options: CreateOptions, api: &NutritionApi) -> Result<()> {
    let remote = read_food_file(&options.file)?;
    let food = create_food_data(api, &remote).await?;

    if options.json {
        println!("{}", serde_json::to_string_pretty(&food)?);
    } else {
        println!("{}", "Food created".green().bold());
        print!("{}", food_card(&food));
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::client::testing::FakeTransport;
    use serde_json::json;
    use std::io::Write;

    #[test]
    fn test_read_food_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(
            file,
            r#"{{ "codigomex2": 990001, "nombre_del_alimento": "Tortilla de maíz", "energ_kcal": "218" }}"#
        )
        .unwrap();

        let food = read_food_file(file.path()).unwrap();

        assert_eq!(food.code, 990001);
        assert_eq!(food.name.as_deref(), Some("Tortilla de maíz"));
        assert_eq!(food.energ_kcal, Some(218.0));
    }

    #[test]
    fn test_read_food_file_errors() {
        let dir = tempfile::tempdir().unwrap();
        let missing = dir.path().join("missing.json");
        let err = read_food_file(&missing).unwrap_err();
        assert!(err.to_string().starts_with("Failed to read"));

        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, "not json").unwrap();
        let err = read_food_file(file.path()).unwrap_err();
        assert!(err.to_string().contains("is not a valid food record"));
    }

    #[tokio::test]
    async fn test_create_food_data_posts_record() {
        let api = NutritionApi::new(FakeTransport::new(|_| {
            (std::time::Duration::ZERO, Ok(None))
        }));
        let remote = RemoteFood {
            code: 990001,
            name: Some("Tortilla de maíz".to_string()),
            ..Default::default()
        };

        let food = create_food_data(&api, &remote).await.unwrap();

        assert_eq!(food.name, "Tortilla de maíz");
        let calls = api.transport().calls.borrow();
        assert_eq!(calls[0].path, "/alimento");
        assert_eq!(calls[0].body.as_ref().unwrap()["codigomex2"], json!(990001));
    }
}
