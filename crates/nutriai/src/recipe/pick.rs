//! Interactive ingredient picker.
//!
//! Typing text runs a debounced name search (10 results, already selected
//! foods hidden); `:`-commands manage the selection and generate the recipe.

use crate::prelude::{eprintln, println, *};
use colored::Colorize;
use serde::{Deserialize, Serialize};
use tokio::io::{AsyncBufReadExt, BufReader};

use nutriai_core::error::ApiError;
use nutriai_core::food::Food;
use nutriai_core::recipe::SelectedIngredients;
use nutriai_core::request::{PageRequest, MIN_NAME_SEARCH_LEN};

use super::format_selected_text;
use super::generate::{generate_data, print_generated};
use crate::client::{NutritionApi, Transport};
use crate::config::ApiConfig;
use crate::debounce::Debounce;
use crate::render::{amount, badge_list};

/// Name search results offered in the picker
pub const PICKER_RESULTS: usize = 10;

const HELP: &str = "Type part of a food name to search. Commands:
  :add N          add candidate N (100 g)
  :rm CODE        remove an ingredient
  :qty CODE G     set the quantity in grams (minimum 10)
  :list           show the selection
  :clear          empty the selection
  :generate       generate the recipe
  :quit           leave";

#[derive(Debug, clap::Args, Serialize, Deserialize, Clone)]
pub struct PickOptions {
    /// Output the generated recipe as JSON
    #[arg(long)]
    pub json: bool,
}

#[derive(Debug, Clone, PartialEq)]
pub enum PickCommand {
    Search(String),
    Add(usize),
    Remove(u64),
    Quantity(u64, f64),
    List,
    Clear,
    Generate,
    Help,
    Quit,
}

pub fn parse_pick_line(line: &str) -> std::result::Result<PickCommand, String> {
    let line = line.trim();
    let Some(command) = line.strip_prefix(':') else {
        return Ok(PickCommand::Search(line.to_string()));
    };

    let parts: Vec<&str> = command.split_whitespace().collect();
    let number = |idx: usize| -> std::result::Result<&str, String> {
        parts
            .get(idx)
            .copied()
            .ok_or_else(|| f!("missing argument for :{}", parts.first().unwrap_or(&"")))
    };

    match parts.first().copied() {
        Some("add") => number(1)?
            .parse()
            .map(PickCommand::Add)
            .map_err(|_| "usage: :add N".to_string()),
        Some("rm") => number(1)?
            .parse()
            .map(PickCommand::Remove)
            .map_err(|_| "usage: :rm CODE".to_string()),
        Some("qty") => {
            let code = number(1)?.parse().map_err(|_| "usage: :qty CODE G")?;
            let grams = number(2)?.parse().map_err(|_| "usage: :qty CODE G")?;
            Ok(PickCommand::Quantity(code, grams))
        }
        Some("list") => Ok(PickCommand::List),
        Some("clear") => Ok(PickCommand::Clear),
        Some("generate") => Ok(PickCommand::Generate),
        Some("help") => Ok(PickCommand::Help),
        Some("quit") | Some("q") => Ok(PickCommand::Quit),
        _ => Err(f!("unknown command :{command}, try :help")),
    }
}

/// Selection plus the candidates of the last search
#[derive(Debug, Default)]
pub struct Picker {
    pub selected: SelectedIngredients,
    pub candidates: Vec<Food>,
    term: String,
}

impl Picker {
    /// Record a new search term. Returns whether a search should be scheduled.
    pub fn set_term(&mut self, term: &str) -> bool {
        let term = term.trim();
        self.term = term.to_string();
        if term.chars().count() < MIN_NAME_SEARCH_LEN {
            self.candidates.clear();
            return false;
        }
        true
    }

    pub fn term(&self) -> &str {
        &self.term
    }

    pub fn set_candidates(&mut self, foods: Vec<Food>) {
        self.candidates = self.selected.exclude_selected(foods);
    }

    /// Move candidate `n` (1-indexed) into the selection
    pub fn add_candidate(&mut self, n: usize) -> std::result::Result<&Food, String> {
        let idx = n
            .checked_sub(1)
            .filter(|i| *i < self.candidates.len())
            .ok_or_else(|| f!("no candidate {n}"))?;
        let food = self.candidates.remove(idx);
        let code = food.code;
        self.selected.add(food);
        self.selected
            .get(code)
            .map(|item| &item.food)
            .ok_or_else(|| f!("no candidate {n}"))
    }
}

pub async fn search_candidates<T: Transport>(
    api: &NutritionApi<T>,
    term: &str,
) -> std::result::Result<Vec<Food>, ApiError> {
    match api.find(term, PageRequest::new(PICKER_RESULTS, 0)).await {
        Ok(foods) => Ok(foods),
        Err(err) if err.is_not_found() => Ok(Vec::new()),
        Err(err) => Err(err),
    }
}

fn format_candidates_text(picker: &Picker) -> String {
    if picker.candidates.is_empty() {
        return f!("{} '{}'\n", "No foods found for".yellow(), picker.term());
    }

    let mut result = String::new();
    for (idx, food) in picker.candidates.iter().enumerate() {
        result.push_str(&f!(
            "  {} {} {} {}\n",
            f!("{:>2}.", idx + 1).yellow().bold(),
            food.name.bright_white(),
            f!("{} kcal", amount(food.energy_kcal)).bright_black(),
            badge_list(&nutriai_core::analysis::badges(food)).green()
        ));
    }
    result
}

async fn refresh_candidates<T: Transport>(api: &NutritionApi<T>, picker: &mut Picker) {
    match search_candidates(api, picker.term()).await {
        Ok(foods) => {
            picker.set_candidates(foods);
            print!("{}", format_candidates_text(picker));
        }
        Err(err) => eprintln!("{}", err.to_string().red()),
    }
}

/// Run a search still waiting on the debounce right away.
///
/// Returns whether a search was run.
async fn flush_search<T: Transport>(
    api: &NutritionApi<T>,
    picker: &mut Picker,
    debounce: &mut Debounce,
) -> bool {
    if !debounce.is_armed() {
        return false;
    }
    debounce.cancel();
    refresh_candidates(api, picker).await;
    true
}

pub async fn run(options: PickOptions, global: crate::Global) -> Result<()> {
    let config = ApiConfig::from_env()?.with_overrides(&global);
    let api = NutritionApi::from_config(&config);

    let mut picker = Picker::default();
    let mut debounce = Debounce::new(config.debounce);
    let mut lines = BufReader::new(tokio::io::stdin()).lines();

    println!("{}", HELP.bright_black());

    loop {
        tokio::select! {
            line = lines.next_line() => {
                let Some(line) = line? else {
                    flush_search(&api, &mut picker, &mut debounce).await;
                    break;
                };
                let command = match parse_pick_line(&line) {
                    Ok(command) => command,
                    Err(message) => {
                        eprintln!("{}", message.red());
                        continue;
                    }
                };

                match command {
                    PickCommand::Search(term) => {
                        if picker.set_term(&term) {
                            debounce.schedule();
                        } else {
                            debounce.cancel();
                        }
                    }
                    PickCommand::Add(n) => match picker.add_candidate(n) {
                        Ok(food) => println!("{} {}", "Added".green(), food.name),
                        Err(message) => eprintln!("{}", message.red()),
                    },
                    PickCommand::Remove(code) => match picker.selected.remove(code) {
                        Some(item) => println!("{} {}", "Removed".green(), item.food.name),
                        None => eprintln!("{}", f!("{code} is not selected").red()),
                    },
                    PickCommand::Quantity(code, grams) => {
                        if !picker.selected.set_quantity(code, grams) {
                            eprintln!("{}", f!("{code} is not selected").red());
                        }
                        print!("{}", format_selected_text(&picker.selected));
                    }
                    PickCommand::List => print!("{}", format_selected_text(&picker.selected)),
                    PickCommand::Clear => {
                        picker.selected.clear();
                        println!("{}", "Selection cleared".green());
                    }
                    PickCommand::Generate => {
                        if picker.selected.is_empty() {
                            eprintln!("{}", "Add at least one ingredient first".red());
                            continue;
                        }
                        println!("{}", "Generating recipe...".bright_black());
                        let output = generate_data(&api, &picker.selected).await?;
                        print_generated(&output, options.json)?;
                    }
                    PickCommand::Help => println!("{HELP}"),
                    PickCommand::Quit => break,
                }
            }
            _ = debounce.fired(), if debounce.is_armed() => {
                refresh_candidates(&api, &mut picker).await;
            }
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::client::testing::FakeTransport;
    use serde_json::json;

    fn food(code: u64, name: &str) -> Food {
        Food {
            code,
            name: name.to_string(),
            ..Default::default()
        }
    }

    #[test]
    fn test_parse_pick_line() {
        assert_eq!(
            parse_pick_line("  arroz "),
            Ok(PickCommand::Search("arroz".to_string()))
        );
        assert_eq!(parse_pick_line(":add 2"), Ok(PickCommand::Add(2)));
        assert_eq!(parse_pick_line(":rm 101001"), Ok(PickCommand::Remove(101001)));
        assert_eq!(
            parse_pick_line(":qty 101001 150"),
            Ok(PickCommand::Quantity(101001, 150.0))
        );
        assert_eq!(parse_pick_line(":generate"), Ok(PickCommand::Generate));
        assert_eq!(parse_pick_line(":q"), Ok(PickCommand::Quit));
        assert!(parse_pick_line(":add").is_err());
        assert!(parse_pick_line(":qty 1 lots").is_err());
        assert!(parse_pick_line(":dance").is_err());
    }

    #[test]
    fn test_short_term_clears_candidates() {
        let mut picker = Picker::default();
        picker.set_candidates(vec![food(1, "Arroz")]);

        assert!(!picker.set_term("a"));
        assert!(picker.candidates.is_empty());
        assert!(picker.set_term("ar"));
    }

    #[test]
    fn test_add_candidate_hides_it_from_later_searches() {
        let mut picker = Picker::default();
        picker.set_candidates(vec![food(1, "Arroz blanco"), food(2, "Arroz integral")]);

        assert_eq!(picker.add_candidate(2).unwrap().name, "Arroz integral");
        assert!(picker.add_candidate(5).is_err());
        assert!(picker.add_candidate(0).is_err());

        picker.set_candidates(vec![food(1, "Arroz blanco"), food(2, "Arroz integral")]);
        assert_eq!(picker.candidates.len(), 1);
        assert_eq!(picker.candidates[0].code, 1);
        assert_eq!(picker.selected.get(2).unwrap().grams, 100.0);
    }

    #[tokio::test]
    async fn test_search_candidates_limits_results() {
        let api = NutritionApi::new(FakeTransport::replying(json!([{ "codigomex2": 1 }])));

        let foods = search_candidates(&api, "pollo").await.unwrap();

        assert_eq!(foods.len(), 1);
        assert_eq!(
            api.transport().paths(),
            vec!["/buscar_alimento?nombre=pollo&limit=10&offset=0"]
        );
    }

    #[tokio::test(start_paused = true)]
    async fn test_flush_search_runs_pending_term() {
        let api = NutritionApi::new(FakeTransport::replying(json!([
            { "codigomex2": 1, "nombre_del_alimento": "Arroz blanco" }
        ])));
        let mut picker = Picker::default();
        let mut debounce = Debounce::new(std::time::Duration::from_millis(500));
        assert!(picker.set_term("arroz"));
        debounce.schedule();

        assert!(flush_search(&api, &mut picker, &mut debounce).await);

        assert!(!debounce.is_armed());
        assert_eq!(picker.candidates[0].name, "Arroz blanco");
        assert_eq!(
            api.transport().paths(),
            vec!["/buscar_alimento?nombre=arroz&limit=10&offset=0"]
        );

        assert!(!flush_search(&api, &mut picker, &mut debounce).await);
        assert_eq!(api.transport().calls.borrow().len(), 1);
    }

    #[tokio::test]
    async fn test_search_candidates_not_found_is_empty() {
        let api = NutritionApi::new(FakeTransport::failing(ApiError::from_response(
            404,
            "",
            Some("Not Found"),
        )));

        assert!(search_candidates(&api, "zzz").await.unwrap().is_empty());
    }
}
