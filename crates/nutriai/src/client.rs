//! HTTP access to the nutrition service.
//!
//! Every request shape is built by `nutriai_core::request`; this module only
//! moves bytes. [`Transport`] is the seam the tests replace with a fake.

use reqwest::StatusCode;
use serde_json::Value;

use nutriai_core::chat::{answer_from_results, ChatAnswer};
use nutriai_core::error::ApiError;
use nutriai_core::fetch::{FetchKind, Ticket};
use nutriai_core::filters::FilterCriteria;
use nutriai_core::food::{map_remote_food_value, map_remote_foods, Food, RemoteFood};
use nutriai_core::recipe::{local_recipe, merge_recipe, Recipe, RecipeResponse, SelectedIngredients};
use nutriai_core::request::{self, ApiRequest, Method, PageRequest};

use crate::config::ApiConfig;

/// Sends one request and returns the decoded JSON body, if any
#[allow(async_fn_in_trait)]
pub trait Transport {
    async fn send(&self, request: &ApiRequest) -> Result<Option<Value>, ApiError>;
}

/// `reqwest` backed transport
#[derive(Debug, Clone)]
pub struct HttpTransport {
    client: reqwest::Client,
    base_url: String,
}

impl HttpTransport {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            client: reqwest::Client::new(),
            base_url: base_url.into(),
        }
    }
}

impl Transport for HttpTransport {
    async fn send(&self, request: &ApiRequest) -> Result<Option<Value>, ApiError> {
        let url = request.url(&self.base_url);
        log::debug!("{} {}", request.method, url);

        let mut builder = match request.method {
            Method::Get => self.client.get(&url),
            Method::Post => self.client.post(&url),
        };
        if let Some(body) = &request.body {
            builder = builder.json(body);
        }

        let response = builder
            .send()
            .await
            .map_err(|e| ApiError::Transport(e.to_string()))?;
        let status = response.status();
        log::debug!("{} {} -> {}", request.method, url, status);

        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(ApiError::from_response(
                status.as_u16(),
                &body,
                status.canonical_reason(),
            ));
        }

        if status == StatusCode::NO_CONTENT {
            return Ok(None);
        }

        let text = response
            .text()
            .await
            .map_err(|e| ApiError::Transport(e.to_string()))?;
        if text.trim().is_empty() {
            return Ok(None);
        }

        serde_json::from_str(&text)
            .map(Some)
            .map_err(|e| ApiError::Decode(e.to_string()))
    }
}

/// Typed operations on top of a [`Transport`]
#[derive(Debug, Clone)]
pub struct NutritionApi<T = HttpTransport> {
    transport: T,
}

impl NutritionApi<HttpTransport> {
    pub fn from_config(config: &ApiConfig) -> Self {
        Self::new(HttpTransport::new(config.base_url.clone()))
    }
}

impl<T: Transport> NutritionApi<T> {
    pub fn new(transport: T) -> Self {
        Self { transport }
    }

    #[cfg(test)]
    pub fn transport(&self) -> &T {
        &self.transport
    }

    pub async fn list(&self, page: PageRequest) -> Result<Vec<Food>, ApiError> {
        let body = self.transport.send(&request::list(page)).await?;
        map_remote_foods(body)
    }

    pub async fn get(&self, code: u64) -> Result<Food, ApiError> {
        let body = self.transport.send(&request::get_by_id(code)).await?;
        map_remote_food_value(body)
    }

    pub async fn search(
        &self,
        criteria: &FilterCriteria,
        name: Option<&str>,
        page: PageRequest,
    ) -> Result<Vec<Food>, ApiError> {
        let req = request::filtered_search(criteria, name, page)?;
        map_remote_foods(self.transport.send(&req).await?)
    }

    pub async fn find(&self, term: &str, page: PageRequest) -> Result<Vec<Food>, ApiError> {
        let req = request::name_search(term, page)?;
        map_remote_foods(self.transport.send(&req).await?)
    }

    /// Create a food; the service echoes the stored record back
    pub async fn create(&self, food: &RemoteFood) -> Result<Option<Food>, ApiError> {
        let body = self.transport.send(&request::create(food)?).await?;
        match body {
            Some(Value::Object(_)) => map_remote_food_value(body).map(Some),
            _ => Ok(None),
        }
    }

    pub async fn ask(
        &self,
        question: &str,
        max_results: Option<usize>,
    ) -> Result<ChatAnswer, ApiError> {
        let req = request::ask(question, max_results)?;
        answer_from_results(self.transport.send(&req).await?)
    }

    /// Ask the service for a recipe, falling back to a locally built one.
    ///
    /// The error that triggered the fallback is returned next to the recipe.
    pub async fn generate_recipe(
        &self,
        selected: &SelectedIngredients,
    ) -> Result<(Recipe, Option<ApiError>), ApiError> {
        let req = selected.to_request()?;

        let response = match self.transport.send(&req).await {
            Ok(body) => RecipeResponse::from_body(body),
            Err(err) => Err(err),
        };

        match response {
            Ok(response) => Ok((merge_recipe(response, selected), None)),
            Err(err) => {
                log::warn!("recipe service failed, using local recipe: {err}");
                Ok((local_recipe(selected), Some(err)))
            }
        }
    }

    /// Run the request behind `ticket` and decode it the way its kind expects
    pub async fn fetch(&self, ticket: &Ticket) -> Result<Vec<Food>, ApiError> {
        let body = self.transport.send(&ticket.request).await?;
        match ticket.kind {
            FetchKind::Single { .. } => map_remote_food_value(body).map(|food| vec![food]),
            FetchKind::Replace | FetchKind::Append => map_remote_foods(body),
        }
    }
}
