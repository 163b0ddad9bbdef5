//! Derived nutrition values shown on the analysis view.

use serde::Serialize;

use crate::food::Food;

/// Approximate adult reference daily values
pub mod daily {
    pub const ENERGY_KCAL: f64 = 2000.0;
    pub const PROTEIN_G: f64 = 50.0;
    pub const CARBOHYDRATE_G: f64 = 300.0;
    pub const FAT_G: f64 = 65.0;
    pub const FIBER_G: f64 = 25.0;
    pub const CALCIUM_MG: f64 = 1000.0;
    pub const IRON_MG: f64 = 18.0;
    pub const VITAMIN_C_MG: f64 = 90.0;
    pub const VITAMIN_A_MCG: f64 = 900.0;
    pub const VITAMIN_E_MG: f64 = 15.0;
    pub const VITAMIN_K_MCG: f64 = 120.0;
}

const KCAL_PER_G_PROTEIN: f64 = 4.0;
const KCAL_PER_G_CARBOHYDRATE: f64 = 4.0;
const KCAL_PER_G_FAT: f64 = 9.0;

/// `amount` as a percentage of `reference`
pub fn percent_of_daily_value(amount: f64, reference: f64) -> f64 {
    if reference <= 0.0 {
        return 0.0;
    }
    amount / reference * 100.0
}

#[derive(Debug, Serialize, Clone, PartialEq)]
pub struct CalorieBreakdown {
    pub protein_kcal: f64,
    pub carbohydrate_kcal: f64,
    pub fat_kcal: f64,
    pub total_kcal: f64,
}

/// Energy contributed by each macronutrient (4/4/9 kcal per gram)
pub fn calorie_breakdown(food: &Food) -> CalorieBreakdown {
    let protein_kcal = food.protein_g * KCAL_PER_G_PROTEIN;
    let carbohydrate_kcal = food.carbohydrate_g * KCAL_PER_G_CARBOHYDRATE;
    let fat_kcal = food.fat_g * KCAL_PER_G_FAT;

    CalorieBreakdown {
        protein_kcal,
        carbohydrate_kcal,
        fat_kcal,
        total_kcal: protein_kcal + carbohydrate_kcal + fat_kcal,
    }
}

/// One line of a "% of daily value" chart
#[derive(Debug, Serialize, Clone, PartialEq)]
pub struct DailyValueRow {
    pub label: &'static str,
    pub unit: &'static str,
    pub amount: f64,
    pub reference: f64,
    pub percent: f64,
}

impl DailyValueRow {
    fn new(label: &'static str, unit: &'static str, amount: f64, reference: f64) -> Self {
        Self {
            label,
            unit,
            amount,
            reference,
            percent: percent_of_daily_value(amount, reference),
        }
    }
}

/// Macronutrient and fiber rows, in display order
pub fn macro_split(food: &Food) -> [DailyValueRow; 4] {
    [
        DailyValueRow::new("Protein", "g", food.protein_g, daily::PROTEIN_G),
        DailyValueRow::new("Carbohydrates", "g", food.carbohydrate_g, daily::CARBOHYDRATE_G),
        DailyValueRow::new("Fat", "g", food.fat_g, daily::FAT_G),
        DailyValueRow::new("Fiber", "g", food.fiber_g, daily::FIBER_G),
    ]
}

pub fn vitamin_rows(food: &Food) -> Vec<DailyValueRow> {
    vec![
        DailyValueRow::new("Vitamin C", "mg", food.vitamin_c_mg, daily::VITAMIN_C_MG),
        DailyValueRow::new("Vitamin A", "mcg", food.vitamin_a_rae_mcg, daily::VITAMIN_A_MCG),
        DailyValueRow::new("Vitamin E", "mg", food.vitamin_e_mg, daily::VITAMIN_E_MG),
        DailyValueRow::new("Vitamin K", "mcg", food.vitamin_k_mcg, daily::VITAMIN_K_MCG),
    ]
}

pub fn mineral_rows(food: &Food) -> Vec<DailyValueRow> {
    vec![
        DailyValueRow::new("Calcium", "mg", food.calcium_mg, daily::CALCIUM_MG),
        DailyValueRow::new("Iron", "mg", food.iron_mg, daily::IRON_MG),
    ]
}

/// Percent-of-daily-value profile across the radar chart axes
pub fn radar_profile(food: &Food) -> Vec<(&'static str, f64)> {
    vec![
        ("Protein", percent_of_daily_value(food.protein_g, daily::PROTEIN_G)),
        ("Fiber", percent_of_daily_value(food.fiber_g, daily::FIBER_G)),
        ("Calcium", percent_of_daily_value(food.calcium_mg, daily::CALCIUM_MG)),
        ("Iron", percent_of_daily_value(food.iron_mg, daily::IRON_MG)),
        ("Vitamin C", percent_of_daily_value(food.vitamin_c_mg, daily::VITAMIN_C_MG)),
        ("Vitamin A", percent_of_daily_value(food.vitamin_a_rae_mcg, daily::VITAMIN_A_MCG)),
    ]
}

#[derive(Debug, Serialize, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum Badge {
    HighProtein,
    HighFiber,
    LowCalorie,
    HighVitaminC,
    HighCalcium,
    HighIron,
}

impl Badge {
    pub fn label(self) -> &'static str {
        match self {
            Badge::HighProtein => "High protein",
            Badge::HighFiber => "High fiber",
            Badge::LowCalorie => "Low calorie",
            Badge::HighVitaminC => "High vitamin C",
            Badge::HighCalcium => "High calcium",
            Badge::HighIron => "High iron",
        }
    }
}

/// Highlight badges for a search result card
pub fn badges(food: &Food) -> Vec<Badge> {
    let rules = [
        (food.protein_g > 15.0, Badge::HighProtein),
        (food.fiber_g > 5.0, Badge::HighFiber),
        (food.energy_kcal < 100.0, Badge::LowCalorie),
        (food.vitamin_c_mg > 30.0, Badge::HighVitaminC),
        (food.calcium_mg > 150.0, Badge::HighCalcium),
        (food.iron_mg > 5.0, Badge::HighIron),
    ];

    rules
        .into_iter()
        .filter_map(|(applies, badge)| applies.then_some(badge))
        .collect()
}

/// Highlights on the analysis view, which uses its own, lower thresholds
pub fn analysis_badges(food: &Food) -> Vec<Badge> {
    let rules = [
        (food.protein_g > 15.0, Badge::HighProtein),
        (food.fiber_g > 5.0, Badge::HighFiber),
        (food.calcium_mg > 100.0, Badge::HighCalcium),
        (food.vitamin_c_mg > 20.0, Badge::HighVitaminC),
        (food.iron_mg > 2.0, Badge::HighIron),
        (food.energy_kcal < 50.0, Badge::LowCalorie),
    ];

    rules
        .into_iter()
        .filter_map(|(applies, badge)| applies.then_some(badge))
        .collect()
}

/// Everything the analysis view renders for one food
#[derive(Debug, Serialize, Clone)]
pub struct FoodAnalysis {
    pub food: Food,
    pub energy_percent: f64,
    pub macros: [DailyValueRow; 4],
    pub calories: CalorieBreakdown,
    pub vitamins: Vec<DailyValueRow>,
    pub minerals: Vec<DailyValueRow>,
    pub radar: Vec<(&'static str, f64)>,
    pub badges: Vec<Badge>,
}

pub fn analyze(food: Food) -> FoodAnalysis {
    FoodAnalysis {
        energy_percent: percent_of_daily_value(food.energy_kcal, daily::ENERGY_KCAL),
        macros: macro_split(&food),
        calories: calorie_breakdown(&food),
        vitamins: vitamin_rows(&food),
        minerals: mineral_rows(&food),
        radar: radar_profile(&food),
        badges: analysis_badges(&food),
        food,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn chicken() -> Food {
        Food {
            code: 1,
            name: "Pechuga de pollo".to_string(),
            energy_kcal: 165.0,
            protein_g: 31.0,
            carbohydrate_g: 0.0,
            fat_g: 3.6,
            iron_mg: 1.0,
            ..Default::default()
        }
    }

    #[test]
    fn test_percent_of_daily_value() {
        assert_eq!(percent_of_daily_value(45.0, 90.0), 50.0);
        assert_eq!(percent_of_daily_value(5.0, 0.0), 0.0);
    }

    #[test]
    fn test_calorie_breakdown() {
        let breakdown = calorie_breakdown(&chicken());
        assert_eq!(breakdown.protein_kcal, 124.0);
        assert_eq!(breakdown.carbohydrate_kcal, 0.0);
        assert!((breakdown.fat_kcal - 32.4).abs() < 1e-9);
        assert!((breakdown.total_kcal - 156.4).abs() < 1e-9);
    }

    #[test]
    fn test_badges() {
        assert_eq!(badges(&chicken()), vec![Badge::HighProtein]);

        let spinach = Food {
            energy_kcal: 23.0,
            fiber_g: 2.2,
            vitamin_c_mg: 28.1,
            calcium_mg: 99.0,
            iron_mg: 2.7,
            ..Default::default()
        };
        assert_eq!(badges(&spinach), vec![Badge::LowCalorie]);
    }

    #[test]
    fn test_badge_thresholds_are_strict() {
        let food = Food {
            protein_g: 15.0,
            energy_kcal: 100.0,
            iron_mg: 5.0,
            ..Default::default()
        };
        assert!(badges(&food).is_empty());
    }

    #[test]
    fn test_analysis_badges_use_lower_thresholds() {
        let food = Food {
            energy_kcal: 70.0,
            calcium_mg: 120.0,
            vitamin_c_mg: 25.0,
            iron_mg: 3.0,
            ..Default::default()
        };

        assert_eq!(badges(&food), vec![Badge::LowCalorie]);
        assert_eq!(
            analysis_badges(&food),
            vec![Badge::HighCalcium, Badge::HighVitaminC, Badge::HighIron]
        );
        assert_eq!(analyze(food).badges.len(), 3);

        let light = Food {
            energy_kcal: 40.0,
            ..Default::default()
        };
        assert_eq!(analysis_badges(&light), vec![Badge::LowCalorie]);
    }

    #[test]
    fn test_radar_profile() {
        let profile = radar_profile(&chicken());
        assert_eq!(profile[0].0, "Protein");
        assert!((profile[0].1 - 62.0).abs() < 1e-9);
        assert_eq!(profile.len(), 6);
    }

    #[test]
    fn test_analyze() {
        let analysis = analyze(chicken());
        assert!((analysis.energy_percent - 8.25).abs() < 1e-9);
        assert_eq!(analysis.macros[0].label, "Protein");
        assert_eq!(analysis.minerals[1].label, "Iron");
        assert_eq!(analysis.badges, vec![Badge::HighProtein]);
    }
}
