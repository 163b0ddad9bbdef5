//! Nutrient range filters for the food search.
//!
//! Each dimension carries a `(min, max)` pair that starts at the dimension's
//! full range. Edits that would invert a pair are rejected, and bounds left
//! at their default are omitted from the request body so the service can
//! tell "no filter" apart from "filter at the boundary".

use serde::Serialize;

/// Filterable nutrient dimensions
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Nutrient {
    Calories,
    Carbohydrates,
    Protein,
    Fat,
    Fiber,
}

impl Nutrient {
    pub const ALL: [Nutrient; 5] = [
        Nutrient::Calories,
        Nutrient::Carbohydrates,
        Nutrient::Protein,
        Nutrient::Fat,
        Nutrient::Fiber,
    ];

    /// Full range of the dimension; this is also its unfiltered default
    pub fn full_range(self) -> (f64, f64) {
        match self {
            Nutrient::Calories => (0.0, 1000.0),
            Nutrient::Carbohydrates | Nutrient::Protein | Nutrient::Fat => (0.0, 100.0),
            Nutrient::Fiber => (0.0, 50.0),
        }
    }

    pub fn unit(self) -> &'static str {
        match self {
            Nutrient::Calories => "kcal",
            _ => "g",
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Nutrient::Calories => "calories",
            Nutrient::Carbohydrates => "carbohydrates",
            Nutrient::Protein => "protein",
            Nutrient::Fat => "fat",
            Nutrient::Fiber => "fiber",
        }
    }

    fn index(self) -> usize {
        match self {
            Nutrient::Calories => 0,
            Nutrient::Carbohydrates => 1,
            Nutrient::Protein => 2,
            Nutrient::Fat => 3,
            Nutrient::Fiber => 4,
        }
    }
}

impl std::str::FromStr for Nutrient {
    type Err = FilterError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "calories" | "kcal" | "energy" => Ok(Nutrient::Calories),
            "carbohydrates" | "carbs" | "carbohydrate" => Ok(Nutrient::Carbohydrates),
            "protein" | "proteins" => Ok(Nutrient::Protein),
            "fat" | "fats" | "lipids" => Ok(Nutrient::Fat),
            "fiber" | "fibre" => Ok(Nutrient::Fiber),
            other => Err(FilterError::UnknownNutrient(other.to_string())),
        }
    }
}

/// Reasons a filter edit is rejected
#[derive(thiserror::Error, Debug, Clone, PartialEq)]
pub enum FilterError {
    #[error("The minimum {nutrient} ({value}) cannot be greater than the maximum ({max})")]
    MinAboveMax {
        nutrient: &'static str,
        value: f64,
        max: f64,
    },

    #[error("The maximum {nutrient} ({value}) cannot be lower than the minimum ({min})")]
    MaxBelowMin {
        nutrient: &'static str,
        value: f64,
        min: f64,
    },

    #[error("{value} is outside the {nutrient} range {floor}-{ceiling}")]
    OutOfRange {
        nutrient: &'static str,
        value: f64,
        floor: f64,
        ceiling: f64,
    },

    #[error("Unknown nutrient: {0}. Valid nutrients: calories, carbohydrates, protein, fat, fiber")]
    UnknownNutrient(String),
}

/// Current `(min, max)` bounds for every dimension
#[derive(Debug, Clone, PartialEq)]
pub struct FilterCriteria {
    bounds: [(f64, f64); 5],
}

impl Default for FilterCriteria {
    fn default() -> Self {
        Self {
            bounds: Nutrient::ALL.map(Nutrient::full_range),
        }
    }
}

impl FilterCriteria {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn bounds(&self, nutrient: Nutrient) -> (f64, f64) {
        self.bounds[nutrient.index()]
    }

    pub fn min(&self, nutrient: Nutrient) -> f64 {
        self.bounds(nutrient).0
    }

    pub fn max(&self, nutrient: Nutrient) -> f64 {
        self.bounds(nutrient).1
    }

    /// Move the lower bound, rejecting edits that would pass the upper bound
    pub fn set_min(&mut self, nutrient: Nutrient, value: f64) -> Result<(), FilterError> {
        check_range(nutrient, value)?;
        let max = self.max(nutrient);
        if value > max {
            return Err(FilterError::MinAboveMax {
                nutrient: nutrient.label(),
                value,
                max,
            });
        }
        self.bounds[nutrient.index()].0 = value;
        Ok(())
    }

    /// Move the upper bound, rejecting edits that would pass the lower bound
    pub fn set_max(&mut self, nutrient: Nutrient, value: f64) -> Result<(), FilterError> {
        check_range(nutrient, value)?;
        let min = self.min(nutrient);
        if value < min {
            return Err(FilterError::MaxBelowMin {
                nutrient: nutrient.label(),
                value,
                min,
            });
        }
        self.bounds[nutrient.index()].1 = value;
        Ok(())
    }

    pub fn reset(&mut self) {
        *self = Self::default();
    }

    /// True when no bound differs from its dimension default
    pub fn is_unfiltered(&self) -> bool {
        Nutrient::ALL.iter().all(|n| {
            let (floor, ceiling) = n.full_range();
            let (min, max) = self.bounds(*n);
            min == floor && max == ceiling
        })
    }

    /// Bounds that differ from their default, as `(min, max)` options
    pub fn active_bounds(&self, nutrient: Nutrient) -> (Option<f64>, Option<f64>) {
        let (floor, ceiling) = nutrient.full_range();
        let (min, max) = self.bounds(nutrient);
        (
            (min != floor).then_some(min),
            (max != ceiling).then_some(max),
        )
    }

    /// Build the `/buscar` body, leaving out every default bound
    pub fn to_search_body(&self, name: Option<&str>) -> SearchBody {
        let (min_calorias, max_calorias) = self.active_bounds(Nutrient::Calories);
        let (min_carbohidratos, max_carbohidratos) = self.active_bounds(Nutrient::Carbohydrates);
        let (min_proteina, max_proteina) = self.active_bounds(Nutrient::Protein);
        let (min_lipidos, max_lipidos) = self.active_bounds(Nutrient::Fat);
        let (min_fiber_td, max_fiber_td) = self.active_bounds(Nutrient::Fiber);

        SearchBody {
            nombre: name
                .map(str::trim)
                .filter(|n| !n.is_empty())
                .map(str::to_string),
            min_calorias,
            max_calorias,
            min_carbohidratos,
            max_carbohidratos,
            min_proteina,
            max_proteina,
            min_lipidos,
            max_lipidos,
            min_fiber_td,
            max_fiber_td,
        }
    }
}

fn check_range(nutrient: Nutrient, value: f64) -> Result<(), FilterError> {
    let (floor, ceiling) = nutrient.full_range();
    if !value.is_finite() || value < floor || value > ceiling {
        return Err(FilterError::OutOfRange {
            nutrient: nutrient.label(),
            value,
            floor,
            ceiling,
        });
    }
    Ok(())
}

/// JSON body of the filtered search endpoint
#[derive(Debug, Serialize, Clone, Default, PartialEq)]
pub struct SearchBody {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub nombre: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub min_calorias: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_calorias: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub min_carbohidratos: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_carbohidratos: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub min_proteina: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_proteina: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub min_lipidos: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_lipidos: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub min_fiber_td: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_fiber_td: Option<f64>,
}

impl SearchBody {
    pub fn is_empty(&self) -> bool {
        *self == SearchBody::default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_default_criteria_are_unfiltered() {
        let criteria = FilterCriteria::new();
        assert!(criteria.is_unfiltered());
        assert!(criteria.to_search_body(None).is_empty());
        assert_eq!(serde_json::to_value(criteria.to_search_body(None)).unwrap(), json!({}));
    }

    #[test]
    fn test_equal_bounds_are_accepted() {
        let mut criteria = FilterCriteria::new();
        criteria.set_min(Nutrient::Calories, 1000.0).unwrap();
        assert_eq!(criteria.bounds(Nutrient::Calories), (1000.0, 1000.0));
    }

    #[test]
    fn test_min_above_max_is_rejected() {
        let mut criteria = FilterCriteria::new();
        criteria.set_max(Nutrient::Calories, 500.0).unwrap();
        criteria.set_min(Nutrient::Calories, 500.0).unwrap();

        let err = criteria.set_min(Nutrient::Calories, 510.0).unwrap_err();
        assert!(matches!(err, FilterError::MinAboveMax { .. }));
        assert_eq!(criteria.bounds(Nutrient::Calories), (500.0, 500.0));
    }

    #[test]
    fn test_min_past_full_range_is_rejected() {
        let mut criteria = FilterCriteria::new();
        criteria.set_min(Nutrient::Calories, 1000.0).unwrap();

        let err = criteria.set_min(Nutrient::Calories, 1001.0).unwrap_err();
        assert!(matches!(err, FilterError::OutOfRange { .. }));
        assert_eq!(criteria.min(Nutrient::Calories), 1000.0);
    }

    #[test]
    fn test_max_below_min_is_rejected() {
        let mut criteria = FilterCriteria::new();
        criteria.set_min(Nutrient::Protein, 20.0).unwrap();

        let err = criteria.set_max(Nutrient::Protein, 10.0).unwrap_err();
        assert!(matches!(err, FilterError::MaxBelowMin { .. }));
        assert_eq!(criteria.max(Nutrient::Protein), 100.0);
    }

    #[test]
    fn test_search_body_only_carries_active_bounds() {
        let mut criteria = FilterCriteria::new();
        criteria.set_min(Nutrient::Protein, 15.0).unwrap();
        criteria.set_max(Nutrient::Fiber, 10.0).unwrap();

        let value = serde_json::to_value(criteria.to_search_body(Some("pollo"))).unwrap();
        assert_eq!(
            value,
            json!({ "nombre": "pollo", "min_proteina": 15.0, "max_fiber_td": 10.0 })
        );
    }

    #[test]
    fn test_bound_moved_back_to_default_is_omitted() {
        let mut criteria = FilterCriteria::new();
        criteria.set_max(Nutrient::Calories, 300.0).unwrap();
        assert!(!criteria.is_unfiltered());

        criteria.set_max(Nutrient::Calories, 1000.0).unwrap();
        assert!(criteria.is_unfiltered());
        assert_eq!(criteria.to_search_body(None).max_calorias, None);
    }

    #[test]
    fn test_reset() {
        let mut criteria = FilterCriteria::new();
        criteria.set_min(Nutrient::Fat, 5.0).unwrap();
        criteria.reset();
        assert!(criteria.is_unfiltered());
    }

    #[test]
    fn test_nutrient_from_str() {
        assert_eq!("kcal".parse::<Nutrient>().unwrap(), Nutrient::Calories);
        assert_eq!("Carbs".parse::<Nutrient>().unwrap(), Nutrient::Carbohydrates);
        assert!("sugar".parse::<Nutrient>().is_err());
    }

    #[test]
    fn test_blank_name_is_dropped() {
        let criteria = FilterCriteria::new();
        assert_eq!(criteria.to_search_body(Some("   ")).nombre, None);
    }
}
