use crate::prelude::{println, *};

use nutriai_core::pagination::PageCursor;
use nutriai_core::request::PageRequest;

use crate::client::NutritionApi;
use crate::config::ApiConfig;

pub mod create;
pub mod get;
pub mod list;

#[derive(Debug, clap::Parser)]
#[command(name = "foods")]
#[command(about = "Browse and manage the food catalog")]
pub struct App {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Debug, clap::Subcommand)]
pub enum Commands {
    /// List foods page by page
    #[clap(name = "list")]
    List(list::ListOptions),

    /// Show one food by its code
    #[clap(name = "get")]
    Get(get::GetOptions),

    /// Search foods by nutrient ranges and optional name
    #[clap(name = "search")]
    Search(list::SearchOptions),

    /// Find foods by name
    #[clap(name = "find")]
    Find(list::FindOptions),

    /// Create a food from a JSON file
    #[clap(name = "create")]
    Create(create::CreateOptions),
}

pub async fn run(app: App, global: crate::Global) -> Result<()> {
    let config = ApiConfig::from_env()?.with_overrides(&global);
    if global.verbose {
        println!("Nutrition API: {}", config.base_url);
        println!();
    }

    let api = NutritionApi::from_config(&config);

    match app.command {
        Commands::List(options) => list::run_list(options, &api, &config).await,
        Commands::Get(options) => get::run(options, &api).await,
        Commands::Search(options) => list::run_search(options, &api, &config).await,
        Commands::Find(options) => list::run_find(options, &api, &config).await,
        Commands::Create(options) => create::run(options, &api).await,
    }
}

/// Cursor and request for one CLI page
pub(crate) fn page_window(page: usize, page_size: usize) -> (PageCursor, PageRequest) {
    let page = page.max(1);
    let cursor = PageCursor::new(page_size);
    let request = PageRequest::new(cursor.request_limit(), cursor.offset_for(page));
    (cursor, request)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_page_window() {
        let (cursor, request) = page_window(3, 20);
        assert_eq!(cursor.page_size, 20);
        assert_eq!(request, PageRequest::new(20, 40));

        let (_, request) = page_window(0, 10);
        assert_eq!(request.offset, 0);
    }
}
