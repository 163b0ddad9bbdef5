//! Ingredient selection and recipe shaping.
//!
//! The recipe service only returns a title, ingredient lines, instructions
//! and four nutrition totals. Everything else shown for a recipe is computed
//! here from the per-100 g values of the selected foods, which also makes it
//! possible to build a complete recipe locally when the service fails.

use regex::Regex;
use std::sync::LazyLock;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::ApiError;
use crate::food::{number_from_value, Food};
use crate::request::{self, ApiRequest};

/// Quantity given to a newly added ingredient
pub const DEFAULT_QUANTITY_G: f64 = 100.0;

/// Smallest quantity an ingredient can be set to
pub const MIN_QUANTITY_G: f64 = 10.0;

pub const DEFAULT_COOK_TIME: &str = "20 min";
pub const DEFAULT_SERVINGS: u32 = 2;

#[derive(thiserror::Error, Debug, Clone, PartialEq)]
pub enum RecipeError {
    #[error("Invalid ingredient '{0}'. Expected CODE:GRAMS, e.g. 101001:150")]
    InvalidSpec(String),
}

#[derive(Debug, Serialize, Clone, PartialEq)]
pub struct SelectedIngredient {
    pub food: Food,
    pub grams: f64,
}

/// Ordered ingredient list, unique by food code
#[derive(Debug, Serialize, Clone, Default, PartialEq)]
pub struct SelectedIngredients {
    items: Vec<SelectedIngredient>,
}

impl SelectedIngredients {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn items(&self) -> &[SelectedIngredient] {
        &self.items
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn contains(&self, code: u64) -> bool {
        self.items.iter().any(|i| i.food.code == code)
    }

    pub fn get(&self, code: u64) -> Option<&SelectedIngredient> {
        self.items.iter().find(|i| i.food.code == code)
    }

    /// Append `food` with the default quantity; false if already selected
    pub fn add(&mut self, food: Food) -> bool {
        self.add_with_quantity(food, DEFAULT_QUANTITY_G)
    }

    pub fn add_with_quantity(&mut self, food: Food, grams: f64) -> bool {
        if self.contains(food.code) {
            return false;
        }
        self.items.push(SelectedIngredient {
            food,
            grams: clamp_quantity(grams),
        });
        true
    }

    /// Remove by code; the order of the remaining ingredients is kept
    pub fn remove(&mut self, code: u64) -> Option<SelectedIngredient> {
        let index = self.items.iter().position(|i| i.food.code == code)?;
        Some(self.items.remove(index))
    }

    /// Set the quantity of one ingredient, never below the 10 g minimum
    pub fn set_quantity(&mut self, code: u64, grams: f64) -> bool {
        match self.items.iter_mut().find(|i| i.food.code == code) {
            Some(item) => {
                item.grams = clamp_quantity(grams);
                true
            }
            None => false,
        }
    }

    pub fn clear(&mut self) {
        self.items.clear();
    }

    /// `(code, grams)` pairs in selection order
    pub fn pairs(&self) -> Vec<(u64, f64)> {
        self.items.iter().map(|i| (i.food.code, i.grams)).collect()
    }

    pub fn to_request(&self) -> Result<ApiRequest, ApiError> {
        request::generate_recipe(&self.pairs())
    }

    /// Search results minus the foods already selected
    pub fn exclude_selected(&self, candidates: Vec<Food>) -> Vec<Food> {
        candidates
            .into_iter()
            .filter(|f| !self.contains(f.code))
            .collect()
    }
}

fn clamp_quantity(grams: f64) -> f64 {
    if grams.is_finite() {
        grams.max(MIN_QUANTITY_G)
    } else {
        MIN_QUANTITY_G
    }
}

static INGREDIENT_SPEC: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^\s*(\d+)\s*(?:[:=]\s*(\d+(?:\.\d+)?)\s*g?)?\s*$").unwrap()
});

/// Parse `CODE:GRAMS` (also `CODE=GRAMS`, optional `g` suffix).
///
/// A bare code gets the default quantity.
pub fn parse_ingredient_spec(spec: &str) -> Result<(u64, f64), RecipeError> {
    let caps = INGREDIENT_SPEC
        .captures(spec)
        .ok_or_else(|| RecipeError::InvalidSpec(spec.to_string()))?;

    let code = caps[1]
        .parse::<u64>()
        .map_err(|_| RecipeError::InvalidSpec(spec.to_string()))?;
    let grams = match caps.get(2) {
        Some(m) => m
            .as_str()
            .parse::<f64>()
            .map_err(|_| RecipeError::InvalidSpec(spec.to_string()))?,
        None => DEFAULT_QUANTITY_G,
    };

    Ok((code, grams))
}

/// Nutrition totals of a whole recipe
#[derive(Debug, Serialize, Clone, Default, PartialEq)]
pub struct NutritionTotals {
    pub energy_kcal: f64,
    pub protein_g: f64,
    pub fat_g: f64,
    pub carbohydrate_g: f64,
    pub fiber_g: f64,
    pub calcium_mg: f64,
    pub iron_mg: f64,
    pub vitamin_c_mg: f64,
}

impl NutritionTotals {
    /// Display rounding: energy, calcium and vitamin C to whole units, the
    /// rest to one decimal
    pub fn rounded(&self) -> Self {
        Self {
            energy_kcal: self.energy_kcal.round(),
            protein_g: round1(self.protein_g),
            fat_g: round1(self.fat_g),
            carbohydrate_g: round1(self.carbohydrate_g),
            fiber_g: round1(self.fiber_g),
            calcium_mg: self.calcium_mg.round(),
            iron_mg: round1(self.iron_mg),
            vitamin_c_mg: self.vitamin_c_mg.round(),
        }
    }
}

fn round1(value: f64) -> f64 {
    (value * 10.0).round() / 10.0
}

/// Sum the per-100 g values of every ingredient scaled by its quantity
pub fn nutrition_totals(selected: &SelectedIngredients) -> NutritionTotals {
    selected
        .items()
        .iter()
        .fold(NutritionTotals::default(), |total, item| {
            let factor = item.grams / 100.0;
            let food = &item.food;
            NutritionTotals {
                energy_kcal: total.energy_kcal + food.energy_kcal * factor,
                protein_g: total.protein_g + food.protein_g * factor,
                fat_g: total.fat_g + food.fat_g * factor,
                carbohydrate_g: total.carbohydrate_g + food.carbohydrate_g * factor,
                fiber_g: total.fiber_g + food.fiber_g * factor,
                calcium_mg: total.calcium_mg + food.calcium_mg * factor,
                iron_mg: total.iron_mg + food.iron_mg * factor,
                vitamin_c_mg: total.vitamin_c_mg + food.vitamin_c_mg * factor,
            }
        })
}

/// `POST /receta` response; every field may be missing
#[derive(Debug, Deserialize, Clone, Default, PartialEq)]
pub struct RecipeResponse {
    #[serde(default)]
    pub titulo: Option<String>,
    #[serde(default)]
    pub ingredientes: Option<Vec<String>>,
    #[serde(default)]
    pub instrucciones: Option<String>,
    #[serde(default)]
    pub nutricion_total: Option<RecipeResponseNutrition>,
}

#[derive(Debug, Deserialize, Clone, Default, PartialEq)]
pub struct RecipeResponseNutrition {
    #[serde(default)]
    pub energ_kcal: Option<Value>,
    #[serde(default)]
    pub protein: Option<Value>,
    #[serde(default)]
    pub fat: Option<Value>,
    #[serde(default)]
    pub carbs: Option<Value>,
}

impl RecipeResponse {
    pub fn from_body(body: Option<Value>) -> Result<Self, ApiError> {
        let body = body.ok_or_else(|| ApiError::Decode("empty recipe response".to_string()))?;
        serde_json::from_value(body).map_err(|e| ApiError::Decode(format!("recipe response: {e}")))
    }
}

#[derive(Debug, Serialize, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum RecipeSource {
    Service,
    Local,
}

/// Recipe as displayed
#[derive(Debug, Serialize, Clone, PartialEq)]
pub struct Recipe {
    pub title: String,
    pub ingredients: Vec<String>,
    pub instructions: String,
    pub cook_time: String,
    pub servings: u32,
    pub nutrition: NutritionTotals,
    pub source: RecipeSource,
}

fn ingredient_lines(selected: &SelectedIngredients) -> Vec<String> {
    selected
        .items()
        .iter()
        .map(|i| format!("{}g of {}", i.grams, i.food.name.to_lowercase()))
        .collect()
}

fn first_name(selected: &SelectedIngredients) -> String {
    selected
        .items()
        .first()
        .map(|i| i.food.name.clone())
        .unwrap_or_default()
}

/// Non-empty string or nothing
fn present(text: Option<String>) -> Option<String> {
    text.filter(|t| !t.trim().is_empty())
}

/// Non-zero number or nothing
fn nonzero(value: Option<&Value>) -> Option<f64> {
    value.and_then(number_from_value).filter(|v| *v != 0.0)
}

/// Combine the service response with locally computed totals.
///
/// Service values win whenever they are present and non-zero.
pub fn merge_recipe(response: RecipeResponse, selected: &SelectedIngredients) -> Recipe {
    let computed = nutrition_totals(selected);
    let remote = response.nutricion_total.unwrap_or_default();

    let nutrition = NutritionTotals {
        energy_kcal: nonzero(remote.energ_kcal.as_ref()).unwrap_or(computed.energy_kcal),
        protein_g: nonzero(remote.protein.as_ref()).unwrap_or(computed.protein_g),
        fat_g: nonzero(remote.fat.as_ref()).unwrap_or(computed.fat_g),
        carbohydrate_g: nonzero(remote.carbs.as_ref()).unwrap_or(computed.carbohydrate_g),
        ..computed
    }
    .rounded();

    Recipe {
        title: present(response.titulo)
            .unwrap_or_else(|| format!("Recipe with {}", first_name(selected))),
        ingredients: response
            .ingredientes
            .filter(|lines| !lines.is_empty())
            .unwrap_or_else(|| ingredient_lines(selected)),
        instructions: present(response.instrucciones)
            .unwrap_or_else(|| "AI-generated instructions".to_string()),
        cook_time: DEFAULT_COOK_TIME.to_string(),
        servings: DEFAULT_SERVINGS,
        nutrition,
        source: RecipeSource::Service,
    }
}

/// Build a recipe without the service
pub fn local_recipe(selected: &SelectedIngredients) -> Recipe {
    let names: Vec<String> = selected
        .items()
        .iter()
        .map(|i| i.food.name.to_lowercase())
        .collect();
    let has = |needle: &str| names.iter().any(|n| n.contains(needle));

    let (title, instructions) = if has("pollo") && has("arroz") {
        (
            "Chicken and Rice Bowl".to_string(),
            "1. Cook the rice following the package instructions.\n\
             2. Season the chicken and cook it on the grill.\n\
             3. Combine all ingredients and serve hot."
                .to_string(),
        )
    } else {
        (
            format!("Healthy dish with {}", first_name(selected)),
            "1. Prepare all the ingredients.\n\
             2. Cook as needed.\n\
             3. Combine and serve."
                .to_string(),
        )
    };

    Recipe {
        title,
        ingredients: ingredient_lines(selected),
        instructions,
        cook_time: DEFAULT_COOK_TIME.to_string(),
        servings: DEFAULT_SERVINGS,
        nutrition: nutrition_totals(selected).rounded(),
        source: RecipeSource::Local,
    }
}
