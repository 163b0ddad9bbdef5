//! Interactive food browser on top of [`SearchController`].
//!
//! Each stdin line is either search text or a `:`-command. Edits go through
//! the debounce; results are printed whenever a fetch lands.

use crate::prelude::{eprintln, println, *};
use colored::Colorize;
use serde::{Deserialize, Serialize};
use tokio::io::{AsyncBufReadExt, BufReader};

use nutriai_core::fetch::{FetchState, ResultsView, SearchQuery};
use nutriai_core::filters::Nutrient;
use nutriai_core::pagination::PageCursor;

use crate::client::{NutritionApi, Transport};
use crate::config::ApiConfig;
use crate::controller::{Input, SearchController, Update};
use crate::render::food_table;

const HELP: &str = "Type a food name or code to search (empty line lists everything). Commands:
  :min NUTRIENT VALUE   lower bound (calories, carbs, protein, fat, fiber)
  :max NUTRIENT VALUE   upper bound
  :clear                reset all ranges
  :more                 load the next page
  :retry                run the current search again
  :show                 print the current results
  :quit                 leave";

#[derive(Debug, clap::Args, Serialize, Deserialize, Clone)]
#[command(about = "Browse foods interactively with live search and filters")]
pub struct App {}

#[derive(Debug, Clone, PartialEq)]
pub enum BrowseCommand {
    Input(Input),
    Show,
    Help,
    Quit,
}

pub fn parse_browse_line(line: &str) -> std::result::Result<BrowseCommand, String> {
    let line = line.trim();
    let Some(command) = line.strip_prefix(':') else {
        return Ok(BrowseCommand::Input(Input::Term(line.to_string())));
    };

    let parts: Vec<&str> = command.split_whitespace().collect();
    match parts.as_slice() {
        ["min", nutrient, value] | ["max", nutrient, value] => {
            let nutrient: Nutrient = nutrient.parse().map_err(|e| f!("{e}"))?;
            let value: f64 = value
                .parse()
                .map_err(|_| f!("'{value}' is not a number"))?;
            if parts[0] == "min" {
                Ok(BrowseCommand::Input(Input::SetMin(nutrient, value)))
            } else {
                Ok(BrowseCommand::Input(Input::SetMax(nutrient, value)))
            }
        }
        ["min" | "max", ..] => Err(f!("usage: :{} NUTRIENT VALUE", parts[0])),
        ["clear"] => Ok(BrowseCommand::Input(Input::ClearFilters)),
        ["more"] => Ok(BrowseCommand::Input(Input::LoadMore)),
        ["retry"] | ["refresh"] => Ok(BrowseCommand::Input(Input::Refresh)),
        ["show"] => Ok(BrowseCommand::Show),
        ["help"] => Ok(BrowseCommand::Help),
        ["quit"] | ["q"] => Ok(BrowseCommand::Quit),
        _ => Err(f!("unknown command :{command}, try :help")),
    }
}

fn format_view_text(view: &ResultsView) -> String {
    let mut result = String::new();

    if view.foods.is_empty() {
        if view.error().is_none() {
            result.push_str(&f!("{}\n", "No foods found.".yellow()));
        }
    } else {
        result.push_str(&food_table(&view.foods, 0).to_string());
    }

    match &view.state {
        FetchState::Error { message } => {
            result.push_str(&f!("{}\n", message.red()));
            result.push_str(&f!("{}\n", "Type :retry to try again.".bright_black()));
        }
        FetchState::Loading { page } => {
            result.push_str(&f!("{}\n", f!("Loading page {page}...").bright_black()));
        }
        FetchState::Loaded if view.cursor.has_more => {
            result.push_str(&f!(
                "{} {}\n",
                f!("{} foods shown.", view.foods.len()).bright_white(),
                "Type :more to load more.".bright_black()
            ));
        }
        FetchState::Loaded => {
            result.push_str(&f!(
                "{}\n",
                f!("{} foods, end of results.", view.foods.len()).bright_white()
            ));
        }
        FetchState::Idle => {}
    }

    result
}

fn format_query_text(query: &SearchQuery) -> String {
    let mut parts = Vec::new();
    if !query.term.trim().is_empty() {
        parts.push(f!("'{}'", query.term.trim()));
    }
    for nutrient in Nutrient::ALL {
        let (min, max) = query.criteria.active_bounds(nutrient);
        let unit = nutrient.unit();
        match (min, max) {
            (Some(min), Some(max)) => parts.push(f!("{} {min}-{max}{unit}", nutrient.label())),
            (Some(min), None) => parts.push(f!("{} >= {min}{unit}", nutrient.label())),
            (None, Some(max)) => parts.push(f!("{} <= {max}{unit}", nutrient.label())),
            (None, None) => {}
        }
    }

    if parts.is_empty() {
        "All foods".to_string()
    } else {
        parts.join(", ")
    }
}

fn report<T: Transport>(controller: &SearchController<'_, T>, update: Update) {
    match update {
        Update::Started { page } => {
            println!("{}", f!("Loading page {page}...").bright_black());
        }
        Update::Applied | Update::Failed { .. } => {
            print!("{}", format_view_text(controller.view()));
        }
        Update::Stale => {}
    }
}

/// Let the pending search and fetches in flight land once input has ended
async fn drain<T: Transport>(controller: &mut SearchController<'_, T>) -> usize {
    let mut updates = 0;
    while let Some(update) = controller.tick().await {
        report(controller, update);
        updates += 1;
    }
    updates
}

pub async fn run(_app: App, global: crate::Global) -> Result<()> {
    let config = ApiConfig::from_env()?.with_overrides(&global);
    let api = NutritionApi::from_config(&config);
    if global.verbose {
        println!("Nutrition API: {}", config.base_url);
    }

    let mut controller =
        SearchController::new(&api, PageCursor::new(config.page_size), config.debounce);
    let mut lines = BufReader::new(tokio::io::stdin()).lines();

    println!("{}", HELP.bright_black());
    if let Ok(Some(update)) = controller.handle(Input::Refresh) {
        report(&controller, update);
    }

    loop {
        let pending = controller.is_pending();
        tokio::select! {
            line = lines.next_line() => {
                let Some(line) = line? else {
                    drain(&mut controller).await;
                    break;
                };
                match parse_browse_line(&line) {
                    Ok(BrowseCommand::Input(input)) => match controller.handle(input) {
                        Ok(Some(update)) => report(&controller, update),
                        Ok(None) => {}
                        Err(err) => eprintln!("{}", err.to_string().red()),
                    },
                    Ok(BrowseCommand::Show) => {
                        println!("{}", format_query_text(controller.query()).bright_white().bold());
                        print!("{}", format_view_text(controller.view()));
                    }
                    Ok(BrowseCommand::Help) => println!("{HELP}"),
                    Ok(BrowseCommand::Quit) => break,
                    Err(message) => eprintln!("{}", message.red()),
                }
            }
            Some(update) = controller.tick(), if pending => report(&controller, update),
        }
    }

    Ok(())
}
