//! Food records as served by the nutrition API and as consumed by the CLI.
//!
//! The service speaks the column names of its database model (`carbohydrt`,
//! `lipid_tot`, `vit_c`, ...) and any nutrient may be missing or `null`. The
//! rest of the application works with [`Food`], where every nutrient is a
//! plain number. [`map_remote_food`] is the only place where absence is
//! resolved, always to zero.

use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;

use crate::error::ApiError;

/// Display name used when the service omits `nombre_del_alimento`
pub const UNNAMED_FOOD: &str = "Unnamed food";

/// Food record exactly as returned by the API
#[derive(Debug, Deserialize, Serialize, Clone, Default, PartialEq)]
pub struct RemoteFood {
    #[serde(rename = "codigomex2")]
    pub code: u64,
    #[serde(
        rename = "nombre_del_alimento",
        default,
        skip_serializing_if = "Option::is_none"
    )]
    pub name: Option<String>,
    #[serde(default, deserialize_with = "lenient_number", skip_serializing_if = "Option::is_none")]
    pub energ_kcal: Option<f64>,
    #[serde(default, deserialize_with = "lenient_number", skip_serializing_if = "Option::is_none")]
    pub carbohydrt: Option<f64>,
    #[serde(default, deserialize_with = "lenient_number", skip_serializing_if = "Option::is_none")]
    pub lipid_tot: Option<f64>,
    #[serde(default, deserialize_with = "lenient_number", skip_serializing_if = "Option::is_none")]
    pub protein: Option<f64>,
    #[serde(default, deserialize_with = "lenient_number", skip_serializing_if = "Option::is_none")]
    pub fiber_td: Option<f64>,
    #[serde(default, deserialize_with = "lenient_number", skip_serializing_if = "Option::is_none")]
    pub calcium: Option<f64>,
    #[serde(default, deserialize_with = "lenient_number", skip_serializing_if = "Option::is_none")]
    pub iron: Option<f64>,
    #[serde(default, deserialize_with = "lenient_number", skip_serializing_if = "Option::is_none")]
    pub ironhem: Option<f64>,
    #[serde(default, deserialize_with = "lenient_number", skip_serializing_if = "Option::is_none")]
    pub ironnohem: Option<f64>,
    #[serde(default, deserialize_with = "lenient_number", skip_serializing_if = "Option::is_none")]
    pub zinc: Option<f64>,
    #[serde(default, deserialize_with = "lenient_number", skip_serializing_if = "Option::is_none")]
    pub vit_c: Option<f64>,
    #[serde(default, deserialize_with = "lenient_number", skip_serializing_if = "Option::is_none")]
    pub thiamin: Option<f64>,
    #[serde(default, deserialize_with = "lenient_number", skip_serializing_if = "Option::is_none")]
    pub riboflavin: Option<f64>,
    #[serde(default, deserialize_with = "lenient_number", skip_serializing_if = "Option::is_none")]
    pub niacin: Option<f64>,
    #[serde(default, deserialize_with = "lenient_number", skip_serializing_if = "Option::is_none")]
    pub panto_acid: Option<f64>,
    #[serde(default, deserialize_with = "lenient_number", skip_serializing_if = "Option::is_none")]
    pub vit_b6: Option<f64>,
    #[serde(default, deserialize_with = "lenient_number", skip_serializing_if = "Option::is_none")]
    pub folic_acid: Option<f64>,
    #[serde(default, deserialize_with = "lenient_number", skip_serializing_if = "Option::is_none")]
    pub food_folate: Option<f64>,
    #[serde(default, deserialize_with = "lenient_number", skip_serializing_if = "Option::is_none")]
    pub folate_dfe: Option<f64>,
    #[serde(default, deserialize_with = "lenient_number", skip_serializing_if = "Option::is_none")]
    pub vit_b12: Option<f64>,
    #[serde(default, deserialize_with = "lenient_number", skip_serializing_if = "Option::is_none")]
    pub vit_a_rae: Option<f64>,
    #[serde(default, deserialize_with = "lenient_number", skip_serializing_if = "Option::is_none")]
    pub vit_e: Option<f64>,
    #[serde(default, deserialize_with = "lenient_number", skip_serializing_if = "Option::is_none")]
    pub vit_d_iu: Option<f64>,
    #[serde(default, deserialize_with = "lenient_number", skip_serializing_if = "Option::is_none")]
    pub vit_k: Option<f64>,
    #[serde(default, deserialize_with = "lenient_number", skip_serializing_if = "Option::is_none")]
    pub fa_sat: Option<f64>,
    #[serde(default, deserialize_with = "lenient_number", skip_serializing_if = "Option::is_none")]
    pub fa_mono: Option<f64>,
    #[serde(default, deserialize_with = "lenient_number", skip_serializing_if = "Option::is_none")]
    pub fa_poly: Option<f64>,
    #[serde(default, deserialize_with = "lenient_number", skip_serializing_if = "Option::is_none")]
    pub chole: Option<f64>,
}

/// Normalized food record used everywhere outside the transport layer
#[derive(Debug, Serialize, Deserialize, Clone, Default, PartialEq)]
pub struct Food {
    pub code: u64,
    pub name: String,
    pub energy_kcal: f64,
    pub carbohydrate_g: f64,
    pub fat_g: f64,
    pub protein_g: f64,
    pub fiber_g: f64,
    pub calcium_mg: f64,
    pub iron_mg: f64,
    pub heme_iron_mg: f64,
    pub non_heme_iron_mg: f64,
    pub zinc_mg: f64,
    pub vitamin_c_mg: f64,
    pub thiamin_mg: f64,
    pub riboflavin_mg: f64,
    pub niacin_mg: f64,
    pub pantothenic_acid_mg: f64,
    pub vitamin_b6_mg: f64,
    pub folic_acid_mcg: f64,
    pub food_folate_mcg: f64,
    pub folate_dfe_mcg: f64,
    pub vitamin_b12_mcg: f64,
    pub vitamin_a_rae_mcg: f64,
    pub vitamin_e_mg: f64,
    pub vitamin_d_iu: f64,
    pub vitamin_k_mcg: f64,
    pub saturated_fat_g: f64,
    pub monounsaturated_fat_g: f64,
    pub polyunsaturated_fat_g: f64,
    pub cholesterol_mg: f64,
}

/// Accept numbers, numeric strings and `null`.
///
/// Anything else (including NaN and infinities) decodes to `None`, which the
/// mapper later turns into zero.
fn lenient_number<'de, D>(deserializer: D) -> Result<Option<f64>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<Value>::deserialize(deserializer)?;
    Ok(value.and_then(|v| number_from_value(&v)))
}

pub(crate) fn number_from_value(value: &Value) -> Option<f64> {
    let number = match value {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse::<f64>().ok(),
        _ => None,
    };
    number.filter(|n| n.is_finite())
}

/// Translate an API record into the normalized shape
pub fn map_remote_food(remote: RemoteFood) -> Food {
    let zero = |v: Option<f64>| v.unwrap_or(0.0);

    Food {
        code: remote.code,
        name: remote.name.unwrap_or_else(|| UNNAMED_FOOD.to_string()),
        energy_kcal: zero(remote.energ_kcal),
        carbohydrate_g: zero(remote.carbohydrt),
        fat_g: zero(remote.lipid_tot),
        protein_g: zero(remote.protein),
        fiber_g: zero(remote.fiber_td),
        calcium_mg: zero(remote.calcium),
        iron_mg: zero(remote.iron),
        heme_iron_mg: zero(remote.ironhem),
        non_heme_iron_mg: zero(remote.ironnohem),
        zinc_mg: zero(remote.zinc),
        vitamin_c_mg: zero(remote.vit_c),
        thiamin_mg: zero(remote.thiamin),
        riboflavin_mg: zero(remote.riboflavin),
        niacin_mg: zero(remote.niacin),
        pantothenic_acid_mg: zero(remote.panto_acid),
        vitamin_b6_mg: zero(remote.vit_b6),
        folic_acid_mcg: zero(remote.folic_acid),
        food_folate_mcg: zero(remote.food_folate),
        folate_dfe_mcg: zero(remote.folate_dfe),
        vitamin_b12_mcg: zero(remote.vit_b12),
        vitamin_a_rae_mcg: zero(remote.vit_a_rae),
        vitamin_e_mg: zero(remote.vit_e),
        vitamin_d_iu: zero(remote.vit_d_iu),
        vitamin_k_mcg: zero(remote.vit_k),
        saturated_fat_g: zero(remote.fa_sat),
        monounsaturated_fat_g: zero(remote.fa_mono),
        polyunsaturated_fat_g: zero(remote.fa_poly),
        cholesterol_mg: zero(remote.chole),
    }
}

/// Map the body of a list or search endpoint.
///
/// A missing body (HTTP 204) and any non-array body both yield an empty list.
pub fn map_remote_foods(body: Option<Value>) -> Result<Vec<Food>, ApiError> {
    let items = match body {
        Some(Value::Array(items)) => items,
        _ => return Ok(Vec::new()),
    };

    items
        .into_iter()
        .map(|item| {
            serde_json::from_value::<RemoteFood>(item)
                .map(map_remote_food)
                .map_err(|e| ApiError::Decode(format!("invalid food record: {e}")))
        })
        .collect()
}

/// Map the body of a single-record endpoint
pub fn map_remote_food_value(body: Option<Value>) -> Result<Food, ApiError> {
    let body = body.ok_or_else(|| ApiError::Decode("empty response body".to_string()))?;
    let remote: RemoteFood = serde_json::from_value(body)
        .map_err(|e| ApiError::Decode(format!("invalid food record: {e}")))?;
    Ok(map_remote_food(remote))
}
