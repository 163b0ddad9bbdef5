//! Question answering: shaping `/ask` results into chat messages.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;

use crate::error::ApiError;
use crate::food::number_from_value;

pub const GREETING: &str = "Hi! I'm your nutrition assistant. I can help you find foods, \
nutrients and answers to nutrition questions based on our food database. \
What would you like to know?";

pub const NO_RESULTS: &str = "I couldn't find specific foods for your question. Try being more \
specific about the nutrient or kind of food you're interested in, for example: \
'foods high in protein', 'sources of iron' or 'low calorie options'.";

/// Questions offered to get a conversation started
pub const SUGGESTED_QUESTIONS: [&str; 8] = [
    "Which foods have the most protein?",
    "Give me low calorie options",
    "Which foods are rich in iron?",
    "Foods with healthy fats",
    "What has the most zinc?",
    "Sources of vitamin C",
    "Foods rich in calcium",
    "Which ones have the most fiber?",
];

fn zero_default<'de, D>(deserializer: D) -> Result<f64, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<Value>::deserialize(deserializer)?;
    Ok(value.as_ref().and_then(number_from_value).unwrap_or(0.0))
}

fn code_default<'de, D>(deserializer: D) -> Result<u64, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<Value>::deserialize(deserializer)?;
    Ok(value.and_then(|v| v.as_u64()).unwrap_or(0))
}

fn name_default<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<String>::deserialize(deserializer)?;
    Ok(value
        .filter(|n| !n.is_empty())
        .unwrap_or_else(|| "Unknown food".to_string()))
}

/// One food in an `/ask` answer
#[derive(Debug, Deserialize, Serialize, Clone, PartialEq)]
pub struct AnswerFood {
    #[serde(rename(deserialize = "codigomex2"), default, deserialize_with = "code_default")]
    pub code: u64,
    #[serde(
        rename(deserialize = "nombre_del_alimento"),
        default = "unknown_name",
        deserialize_with = "name_default"
    )]
    pub name: String,
    #[serde(rename(deserialize = "energ_kcal"), default, deserialize_with = "zero_default")]
    pub energy_kcal: f64,
    #[serde(rename(deserialize = "protein"), default, deserialize_with = "zero_default")]
    pub protein_g: f64,
    #[serde(rename(deserialize = "lipid_tot"), default, deserialize_with = "zero_default")]
    pub fat_g: f64,
    #[serde(rename(deserialize = "carbohydrt"), default, deserialize_with = "zero_default")]
    pub carbohydrate_g: f64,
    #[serde(rename(deserialize = "fiber_td"), default, deserialize_with = "zero_default")]
    pub fiber_g: f64,
    #[serde(rename(deserialize = "iron"), default, deserialize_with = "zero_default")]
    pub iron_mg: f64,
    #[serde(rename(deserialize = "vit_c"), default, deserialize_with = "zero_default")]
    pub vitamin_c_mg: f64,
    #[serde(rename(deserialize = "calcium"), default, deserialize_with = "zero_default")]
    pub calcium_mg: f64,
    #[serde(rename(deserialize = "zinc"), default, deserialize_with = "zero_default")]
    pub zinc_mg: f64,
    #[serde(rename(deserialize = "vit_a_rae"), default, deserialize_with = "zero_default")]
    pub vitamin_a_mcg: f64,
    #[serde(rename(deserialize = "vit_e"), default, deserialize_with = "zero_default")]
    pub vitamin_e_mg: f64,
    #[serde(rename(deserialize = "vit_k"), default, deserialize_with = "zero_default")]
    pub vitamin_k_mcg: f64,
}

fn unknown_name() -> String {
    "Unknown food".to_string()
}

impl AnswerFood {
    /// `(label, value, unit)` for every nutrient worth showing
    pub fn nutrients(&self) -> Vec<(&'static str, String)> {
        [
            ("Energy", self.energy_kcal, " kcal"),
            ("Protein", self.protein_g, "g"),
            ("Fat", self.fat_g, "g"),
            ("Carbohydrates", self.carbohydrate_g, "g"),
            ("Fiber", self.fiber_g, "g"),
            ("Iron", self.iron_mg, "mg"),
            ("Vitamin C", self.vitamin_c_mg, "mg"),
            ("Calcium", self.calcium_mg, "mg"),
            ("Zinc", self.zinc_mg, "mg"),
            ("Vitamin A", self.vitamin_a_mcg, "mcg"),
            ("Vitamin E", self.vitamin_e_mg, "mg"),
            ("Vitamin K", self.vitamin_k_mcg, "mcg"),
        ]
        .into_iter()
        .filter(|(_, value, _)| is_meaningful(*value))
        .map(|(label, value, unit)| (label, format_nutrient(value, unit)))
        .collect()
    }
}

fn is_meaningful(value: f64) -> bool {
    value.is_finite() && value > 0.01
}

/// Render a nutrient value rounded to two decimals, or `-` when negligible
pub fn format_nutrient(value: f64, unit: &str) -> String {
    if !is_meaningful(value) {
        return "-".to_string();
    }
    let rounded = (value * 100.0).round() / 100.0;
    format!("{rounded}{unit}")
}

#[derive(Debug, Serialize, Clone, PartialEq)]
pub struct ChatAnswer {
    pub text: String,
    pub foods: Vec<AnswerFood>,
}

/// Turn an `/ask` body into an answer. Non-array bodies count as no results.
pub fn answer_from_results(body: Option<Value>) -> Result<ChatAnswer, ApiError> {
    let items = match body {
        Some(Value::Array(items)) => items,
        _ => Vec::new(),
    };

    let foods = items
        .into_iter()
        .map(|item| {
            serde_json::from_value::<AnswerFood>(item)
                .map_err(|e| ApiError::Decode(format!("invalid answer item: {e}")))
        })
        .collect::<Result<Vec<_>, _>>()?;

    let text = if foods.is_empty() {
        NO_RESULTS.to_string()
    } else {
        format!("Found {} foods matching your question:", foods.len())
    };

    Ok(ChatAnswer { text, foods })
}

/// Apology shown in place of an answer when the call failed
pub fn error_answer(err: &ApiError) -> ChatAnswer {
    ChatAnswer {
        text: format!(
            "Sorry, there was an error processing your question. {err}. \
             Please try again with a more specific question."
        ),
        foods: Vec::new(),
    }
}

#[derive(Debug, Serialize, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum Role {
    User,
    Assistant,
}

#[derive(Debug, Serialize, Clone, PartialEq)]
pub struct ChatMessage {
    pub role: Role,
    pub text: String,
    pub timestamp: DateTime<Utc>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub foods: Vec<AnswerFood>,
}

/// Running chat transcript, opened with the assistant's greeting
#[derive(Debug, Serialize, Clone)]
pub struct Conversation {
    messages: Vec<ChatMessage>,
}

impl Conversation {
    pub fn new(now: DateTime<Utc>) -> Self {
        Self {
            messages: vec![ChatMessage {
                role: Role::Assistant,
                text: GREETING.to_string(),
                timestamp: now,
                foods: Vec::new(),
            }],
        }
    }

    pub fn messages(&self) -> &[ChatMessage] {
        &self.messages
    }

    pub fn push_question(&mut self, question: &str, now: DateTime<Utc>) -> &ChatMessage {
        self.push(ChatMessage {
            role: Role::User,
            text: question.to_string(),
            timestamp: now,
            foods: Vec::new(),
        })
    }

    pub fn push_answer(&mut self, answer: ChatAnswer, now: DateTime<Utc>) -> &ChatMessage {
        self.push(ChatMessage {
            role: Role::Assistant,
            text: answer.text,
            timestamp: now,
            foods: answer.foods,
        })
    }

    fn push(&mut self, message: ChatMessage) -> &ChatMessage {
        self.messages.push(message);
        &self.messages[self.messages.len() - 1]
    }
}

/// `HH:MM` label for a message
pub fn format_time(timestamp: &DateTime<Utc>) -> String {
    timestamp.format("%H:%M").to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_answer_from_results() {
        let answer = answer_from_results(Some(json!([
            { "codigomex2": 101001, "nombre_del_alimento": "Hígado de res", "iron": 6.5, "protein": "20.4" },
            { "nombre_del_alimento": null, "zinc": null }
        ])))
        .unwrap();

        assert_eq!(answer.text, "Found 2 foods matching your question:");
        assert_eq!(answer.foods[0].code, 101001);
        assert_eq!(answer.foods[0].iron_mg, 6.5);
        assert_eq!(answer.foods[0].protein_g, 20.4);
        assert_eq!(answer.foods[1].code, 0);
        assert_eq!(answer.foods[1].name, "Unknown food");
        assert_eq!(answer.foods[1].zinc_mg, 0.0);
    }

    #[test]
    fn test_empty_results() {
        let answer = answer_from_results(Some(json!([]))).unwrap();
        assert_eq!(answer.text, NO_RESULTS);
        assert!(answer.foods.is_empty());

        let answer = answer_from_results(None).unwrap();
        assert_eq!(answer.text, NO_RESULTS);

        let answer = answer_from_results(Some(json!({ "answer": "?" }))).unwrap();
        assert!(answer.foods.is_empty());
    }

    #[test]
    fn test_error_answer() {
        let answer = error_answer(&ApiError::from_response(503, "down", None));
        assert!(answer.text.contains("API error 503: down"));
        assert!(answer.text.starts_with("Sorry"));
    }

    #[test]
    fn test_format_nutrient() {
        assert_eq!(format_nutrient(0.0, "g"), "-");
        assert_eq!(format_nutrient(0.01, "g"), "-");
        assert_eq!(format_nutrient(3.14159, "mg"), "3.14mg");
        assert_eq!(format_nutrient(20.0, "g"), "20g");
    }

    #[test]
    fn test_nutrients_skip_negligible_values() {
        let food: AnswerFood =
            serde_json::from_value(json!({ "codigomex2": 1, "iron": 2.5, "zinc": 0.001 })).unwrap();
        let nutrients = food.nutrients();

        assert_eq!(nutrients, vec![("Iron", "2.5mg".to_string())]);
    }

    #[test]
    fn test_conversation() {
        let now = DateTime::<Utc>::from_timestamp(1609459200, 0).unwrap();
        let mut conversation = Conversation::new(now);
        assert_eq!(conversation.messages().len(), 1);
        assert_eq!(conversation.messages()[0].role, Role::Assistant);

        conversation.push_question("¿Qué tiene más zinc?", now);
        let answer = answer_from_results(Some(json!([{ "codigomex2": 3 }]))).unwrap();
        let last = conversation.push_answer(answer, now);
        assert_eq!(last.foods.len(), 1);

        assert_eq!(conversation.messages().len(), 3);
        assert_eq!(conversation.messages()[1].role, Role::User);
        assert_eq!(format_time(&now), "00:00");
    }
}
