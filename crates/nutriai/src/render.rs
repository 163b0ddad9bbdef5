//! Terminal rendering shared by the commands.

use colored::Colorize;
use prettytable::{row, Table};

use nutriai_core::analysis::{badges, Badge, DailyValueRow, FoodAnalysis};
use nutriai_core::food::Food;

use crate::prelude::*;

const BAR_WIDTH: usize = 20;

/// Numbers the way the food cards show them: at most one decimal
pub fn amount(value: f64) -> String {
    let rounded = (value * 10.0).round() / 10.0;
    if rounded.fract() == 0.0 {
        f!("{}", rounded as i64)
    } else {
        f!("{rounded:.1}")
    }
}

/// Fixed-width bar for a percentage, capped at 100%
pub fn percent_bar(percent: f64) -> String {
    let clamped = if percent.is_finite() {
        percent.clamp(0.0, 100.0)
    } else {
        0.0
    };
    let filled = ((clamped / 100.0) * BAR_WIDTH as f64).round() as usize;
    f!("{}{}", "█".repeat(filled), "░".repeat(BAR_WIDTH - filled))
}

pub fn badge_list(badges: &[Badge]) -> String {
    badges
        .iter()
        .map(|b| f!("[{}]", b.label()))
        .collect::<Vec<_>>()
        .join(" ")
}

/// Listing table: code, name and the headline nutrients
pub fn food_table(foods: &[Food], offset: usize) -> Table {
    let mut table = new_table();
    table.add_row(row!["#", "Code", "Name", "Kcal", "Protein", "Carbs", "Fat", "Fiber"]);

    for (idx, food) in foods.iter().enumerate() {
        table.add_row(row![
            offset + idx + 1,
            food.code,
            food.name,
            amount(food.energy_kcal),
            f!("{}g", amount(food.protein_g)),
            f!("{}g", amount(food.carbohydrate_g)),
            f!("{}g", amount(food.fat_g)),
            f!("{}g", amount(food.fiber_g))
        ]);
    }

    table
}

/// Detail card for one food
pub fn food_card(food: &Food) -> String {
    let mut out = String::new();
    out.push_str(&f!(
        "\n{} {}\n",
        food.name.bright_white().bold(),
        f!("({})", food.code).bright_black()
    ));
    out.push_str(&f!(
        "  {} kcal per 100 g\n",
        amount(food.energy_kcal).bright_yellow().bold()
    ));

    let tags = badges(food);
    if !tags.is_empty() {
        out.push_str(&f!("  {}\n", badge_list(&tags).green()));
    }

    let rows = [
        ("Protein", food.protein_g, "g"),
        ("Carbohydrates", food.carbohydrate_g, "g"),
        ("Fat", food.fat_g, "g"),
        ("Saturated fat", food.saturated_fat_g, "g"),
        ("Fiber", food.fiber_g, "g"),
        ("Cholesterol", food.cholesterol_mg, "mg"),
        ("Calcium", food.calcium_mg, "mg"),
        ("Iron", food.iron_mg, "mg"),
        ("Zinc", food.zinc_mg, "mg"),
        ("Vitamin C", food.vitamin_c_mg, "mg"),
        ("Vitamin A", food.vitamin_a_rae_mcg, "mcg"),
        ("Vitamin B12", food.vitamin_b12_mcg, "mcg"),
    ];
    for (label, value, unit) in rows {
        out.push_str(&f!("  {:<16} {}{}\n", label.green(), amount(value), unit));
    }

    out
}

fn daily_value_lines(title: &str, rows: &[DailyValueRow]) -> String {
    let mut out = f!("\n{}\n", title.bright_cyan().bold());
    for row in rows {
        out.push_str(&f!(
            "  {:<14} {} {:>5}%  {}{}\n",
            row.label,
            percent_bar(row.percent).cyan(),
            amount(row.percent),
            amount(row.amount),
            row.unit
        ));
    }
    out
}

/// Full analysis view
pub fn analysis_text(analysis: &FoodAnalysis) -> String {
    let food = &analysis.food;
    let mut out = String::new();

    out.push_str(&f!("\n{}\n", "=".repeat(80).bright_cyan()));
    out.push_str(&f!("{}\n", food.name.to_uppercase().bright_cyan().bold()));
    out.push_str(&f!("{}\n", "=".repeat(80).bright_cyan()));
    out.push_str(&f!(
        "\n{} kcal per 100 g ({}% of a 2000 kcal diet)\n",
        amount(food.energy_kcal).bright_yellow().bold(),
        amount(analysis.energy_percent)
    ));
    if !analysis.badges.is_empty() {
        out.push_str(&f!("{}\n", badge_list(&analysis.badges).green()));
    }

    out.push_str(&daily_value_lines("MACRONUTRIENTS (% daily value)", &analysis.macros));

    let calories = &analysis.calories;
    out.push_str(&f!("\n{}\n", "CALORIE BREAKDOWN".bright_cyan().bold()));
    for (label, kcal) in [
        ("Protein", calories.protein_kcal),
        ("Carbohydrates", calories.carbohydrate_kcal),
        ("Fat", calories.fat_kcal),
    ] {
        let share = if calories.total_kcal > 0.0 {
            kcal / calories.total_kcal * 100.0
        } else {
            0.0
        };
        out.push_str(&f!(
            "  {:<14} {} {:>5} kcal ({}%)\n",
            label,
            percent_bar(share).yellow(),
            amount(kcal),
            amount(share)
        ));
    }

    out.push_str(&daily_value_lines("VITAMINS (% daily value)", &analysis.vitamins));
    out.push_str(&daily_value_lines("MINERALS (% daily value)", &analysis.minerals));

    out.push_str(&f!("\n{}\n", "NUTRIENT PROFILE".bright_cyan().bold()));
    for (label, percent) in &analysis.radar {
        out.push_str(&f!(
            "  {:<14} {} {}%\n",
            label,
            percent_bar(*percent).magenta(),
            amount(*percent)
        ));
    }

    out.push('\n');
    out
}
