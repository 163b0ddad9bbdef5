use crate::prelude::*;
use clap::Parser;

mod ask;
mod browse;
mod client;
mod config;
mod controller;
mod debounce;
mod error;
mod foods;
mod nutrition;
mod prelude;
mod recipe;
mod render;

#[derive(Debug, clap::Parser)]
#[command(
    author,
    version,
    about,
    long_about = "Command line client for the NutriAI nutrition service"
)]
pub struct App {
    #[command(subcommand)]
    pub command: SubCommands,

    #[clap(flatten)]
    global: Global,
}

#[derive(Debug, Clone, clap::Args)]
pub struct Global {
    /// Base URL of the nutrition service [env: NUTRIAI_API_URL]
    #[clap(long, global = true)]
    api_url: Option<String>,

    /// Foods per page [env: NUTRIAI_PAGE_SIZE]
    #[clap(long, global = true)]
    page_size: Option<usize>,

    /// Whether to display additional information.
    #[clap(long, env = "NUTRIAI_VERBOSE", global = true, default_value = "false")]
    verbose: bool,
}

#[derive(Debug, clap::Parser)]
pub enum SubCommands {
    /// Food catalog operations (list, get, search, find, create)
    Foods(crate::foods::App),

    /// Nutrition analysis of one food
    Nutrition(crate::nutrition::App),

    /// Recipe generation from selected ingredients
    Recipe(crate::recipe::App),

    /// Ask nutrition questions
    Ask(crate::ask::App),

    /// Interactive food browser with live search
    Browse(crate::browse::App),
}

#[tokio::main]
async fn main() -> Result<()> {
    env_logger::init();
    color_eyre::install()?;

    let app = App::parse();

    match app.command {
        SubCommands::Foods(sub_app) => crate::foods::run(sub_app, app.global).await,
        SubCommands::Nutrition(sub_app) => crate::nutrition::run(sub_app, app.global).await,
        SubCommands::Recipe(sub_app) => crate::recipe::run(sub_app, app.global).await,
        SubCommands::Ask(sub_app) => crate::ask::run(sub_app, app.global).await,
        SubCommands::Browse(sub_app) => crate::browse::run(sub_app, app.global).await,
    }
    .map_err(|err: color_eyre::eyre::Report| eyre!(err))
}
