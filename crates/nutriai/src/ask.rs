use crate::prelude::{println, *};
use chrono::Utc;
use colored::Colorize;
use serde::{Deserialize, Serialize};
use tokio::io::{AsyncBufReadExt, BufReader};

use nutriai_core::chat::{
    error_answer, format_time, ChatAnswer, ChatMessage, Conversation, Role, SUGGESTED_QUESTIONS,
};
use nutriai_core::request::DEFAULT_MAX_RESULTS;

use crate::client::{NutritionApi, Transport};
use crate::config::ApiConfig;

#[derive(Debug, clap::Args, Serialize, Deserialize, Clone)]
#[command(about = "Ask nutrition questions about the food database")]
#[command(after_help = "EXAMPLES:
  nutriai ask \"Which foods are rich in iron?\"
  nutriai ask --max-results 5 \"Sources of vitamin C\"

  # Interactive session (type 'exit' to leave):
  nutriai ask")]
pub struct App {
    /// Question to ask; starts an interactive session when omitted
    #[arg(value_name = "QUESTION")]
    pub question: Option<String>,

    /// Maximum number of foods in each answer
    #[arg(long, default_value_t = DEFAULT_MAX_RESULTS)]
    pub max_results: usize,

    /// Print example questions and exit
    #[arg(long)]
    pub suggestions: bool,

    /// Output as JSON
    #[arg(long)]
    pub json: bool,
}

/// Ask one question; failures become an apology answer
pub async fn answer_data<T: Transport>(
    api: &NutritionApi<T>,
    question: &str,
    max_results: usize,
) -> ChatAnswer {
    match api.ask(question, Some(max_results)).await {
        Ok(answer) => answer,
        Err(err) => {
            log::debug!("ask failed: {err}");
            error_answer(&err)
        }
    }
}

fn format_message_text(message: &ChatMessage) -> String {
    let who = match message.role {
        Role::User => "You".bright_green().bold(),
        Role::Assistant => "NutriAI".bright_cyan().bold(),
    };
    let mut result = f!(
        "{} {} {}\n",
        who,
        format_time(&message.timestamp).bright_black(),
        message.text
    );

    for food in &message.foods {
        result.push_str(&f!(
            "  {} {}\n",
            food.name.bright_white().bold(),
            f!("({})", food.code).bright_black()
        ));
        let nutrients = food
            .nutrients()
            .into_iter()
            .map(|(label, value)| f!("{}: {}", label.green(), value))
            .collect::<Vec<_>>();
        if !nutrients.is_empty() {
            result.push_str(&f!("    {}\n", nutrients.join(" | ")));
        }
    }

    result
}

fn format_suggestions_text() -> String {
    let mut result = f!("{}\n", "Try asking:".bright_white().bold());
    for question in SUGGESTED_QUESTIONS {
        result.push_str(&f!("  - {}\n", question.cyan()));
    }
    result
}

async fn interactive<T: Transport>(api: &NutritionApi<T>, max_results: usize) -> Result<()> {
    let mut conversation = Conversation::new(Utc::now());
    if let Some(greeting) = conversation.messages().first() {
        print!("{}", format_message_text(greeting));
    }
    print!("{}", format_suggestions_text());

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    while let Some(line) = lines.next_line().await? {
        let question = line.trim();
        if question.is_empty() {
            continue;
        }
        if matches!(question, "exit" | "quit" | ":q") {
            break;
        }

        conversation.push_question(question, Utc::now());
        println!("{}", "Thinking...".bright_black());
        let answer = answer_data(api, question, max_results).await;
        let message = conversation.push_answer(answer, Utc::now());
        print!("{}", format_message_text(message));
    }

    Ok(())
}

pub async fn run(app: App, global: crate::Global) -> Result<()> {
    if app.suggestions {
        print!("{}", format_suggestions_text());
        return Ok(());
    }

    let config = ApiConfig::from_env()?.with_overrides(&global);
    let api = NutritionApi::from_config(&config);

    let Some(question) = app.question else {
        return interactive(&api, app.max_results).await;
    };

    let answer = answer_data(&api, &question, app.max_results).await;
    if app.json {
        println!("{}", serde_json::to_string_pretty(&answer)?);
    } else {
        let mut conversation = Conversation::new(Utc::now());
        let message = conversation.push_answer(answer, Utc::now());
        print!("{}", format_message_text(message));
    }

    Ok(())
}
