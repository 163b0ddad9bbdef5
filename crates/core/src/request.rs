//! Request shapes for every nutrition API operation.
//!
//! Builders are pure: they turn UI-level parameters into an [`ApiRequest`]
//! that the transport sends as-is.

use serde::Serialize;
use serde_json::Value;

use crate::error::ApiError;
use crate::filters::FilterCriteria;
use crate::food::RemoteFood;

/// Minimum number of characters before a name search is issued
pub const MIN_NAME_SEARCH_LEN: usize = 2;

/// Default cap on the number of foods returned by `/ask`
pub const DEFAULT_MAX_RESULTS: usize = 10;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Method {
    Get,
    Post,
}

impl std::fmt::Display for Method {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Method::Get => write!(f, "GET"),
            Method::Post => write!(f, "POST"),
        }
    }
}

/// `limit`/`offset` pair for paged endpoints
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageRequest {
    pub limit: usize,
    pub offset: usize,
}

impl PageRequest {
    pub fn new(limit: usize, offset: usize) -> Self {
        Self { limit, offset }
    }

    /// Page `page` (1-indexed) of `limit` records
    pub fn page(page: usize, limit: usize) -> Self {
        Self {
            limit,
            offset: page.saturating_sub(1) * limit,
        }
    }

    fn params(&self) -> Vec<(String, String)> {
        vec![
            ("limit".to_string(), self.limit.to_string()),
            ("offset".to_string(), self.offset.to_string()),
        ]
    }
}

/// Description of a single HTTP call to the nutrition service
#[derive(Debug, Clone, PartialEq)]
pub struct ApiRequest {
    pub method: Method,
    pub path: String,
    pub query: Vec<(String, String)>,
    pub body: Option<Value>,
}

impl ApiRequest {
    fn get(path: impl Into<String>) -> Self {
        Self {
            method: Method::Get,
            path: path.into(),
            query: Vec::new(),
            body: None,
        }
    }

    fn post(path: impl Into<String>, body: Value) -> Self {
        Self {
            method: Method::Post,
            path: path.into(),
            query: Vec::new(),
            body: Some(body),
        }
    }

    fn with_query(mut self, query: Vec<(String, String)>) -> Self {
        self.query = query;
        self
    }

    /// Path plus the URL-encoded query string
    pub fn path_and_query(&self) -> String {
        if self.query.is_empty() {
            return self.path.clone();
        }

        let query = self
            .query
            .iter()
            .map(|(k, v)| format!("{}={}", urlencoding::encode(k), urlencoding::encode(v)))
            .collect::<Vec<_>>()
            .join("&");

        format!("{}?{}", self.path, query)
    }

    /// Full URL against `base_url`, with or without a trailing slash
    pub fn url(&self, base_url: &str) -> String {
        format!("{}{}", base_url.trim_end_matches('/'), self.path_and_query())
    }

    /// Requests with a body are sent as JSON
    pub fn is_json(&self) -> bool {
        self.body.is_some()
    }
}

/// One ingredient of a recipe request
#[derive(Debug, Serialize, Clone, PartialEq)]
pub struct IngredientRequest {
    pub codigomex2: u64,
    pub cantidad_g: f64,
}

#[derive(Debug, Serialize, Clone, PartialEq)]
pub struct RecipeRequest {
    pub ingredientes: Vec<IngredientRequest>,
}

#[derive(Debug, Serialize, Clone, PartialEq)]
pub struct AskRequest {
    pub question: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_results: Option<usize>,
}

/// Parse a food code typed into a search field.
///
/// Only plain digit strings count; anything else is free text.
pub fn parse_food_code(input: &str) -> Option<u64> {
    let input = input.trim();
    if input.is_empty() || !input.chars().all(|c| c.is_ascii_digit()) {
        return None;
    }
    input.parse().ok()
}

/// `GET /alimentos?limit&offset`
pub fn list(page: PageRequest) -> ApiRequest {
    ApiRequest::get("/alimentos").with_query(page.params())
}

/// `GET /alimento/{code}`
pub fn get_by_id(code: u64) -> ApiRequest {
    ApiRequest::get(format!("/alimento/{code}"))
}

/// `POST /buscar?limit&offset`, or the plain listing when nothing filters.
///
/// An unfiltered search is sent to `/alimentos` rather than posting an empty
/// filter body.
pub fn filtered_search(
    criteria: &FilterCriteria,
    name: Option<&str>,
    page: PageRequest,
) -> Result<ApiRequest, ApiError> {
    let body = criteria.to_search_body(name);
    if body.is_empty() {
        return Ok(list(page));
    }

    let body = serde_json::to_value(&body)
        .map_err(|e| ApiError::InvalidRequest(format!("search body: {e}")))?;
    Ok(ApiRequest::post("/buscar", body).with_query(page.params()))
}

/// `GET /buscar_alimento?nombre&limit&offset`
pub fn name_search(term: &str, page: PageRequest) -> Result<ApiRequest, ApiError> {
    let term = term.trim();
    if term.chars().count() < MIN_NAME_SEARCH_LEN {
        return Err(ApiError::InvalidRequest(format!(
            "search term must have at least {MIN_NAME_SEARCH_LEN} characters"
        )));
    }

    let mut query = vec![("nombre".to_string(), term.to_string())];
    query.extend(page.params());
    Ok(ApiRequest::get("/buscar_alimento").with_query(query))
}

/// `POST /alimento`
pub fn create(food: &RemoteFood) -> Result<ApiRequest, ApiError> {
    let body = serde_json::to_value(food)
        .map_err(|e| ApiError::InvalidRequest(format!("food record: {e}")))?;
    Ok(ApiRequest::post("/alimento", body))
}

/// `POST /ask`
pub fn ask(question: &str, max_results: Option<usize>) -> Result<ApiRequest, ApiError> {
    let question = question.trim();
    if question.is_empty() {
        return Err(ApiError::InvalidRequest("question is empty".to_string()));
    }

    let body = serde_json::to_value(AskRequest {
        question: question.to_string(),
        max_results,
    })
    .map_err(|e| ApiError::InvalidRequest(format!("ask body: {e}")))?;
    Ok(ApiRequest::post("/ask", body))
}

/// `POST /receta`
pub fn generate_recipe(ingredients: &[(u64, f64)]) -> Result<ApiRequest, ApiError> {
    if ingredients.is_empty() {
        return Err(ApiError::InvalidRequest(
            "a recipe needs at least one ingredient".to_string(),
        ));
    }

    let request = RecipeRequest {
        ingredientes: ingredients
            .iter()
            .map(|(code, grams)| IngredientRequest {
                codigomex2: *code,
                cantidad_g: *grams,
            })
            .collect(),
    };
    let body = serde_json::to_value(&request)
        .map_err(|e| ApiError::InvalidRequest(format!("recipe body: {e}")))?;
    Ok(ApiRequest::post("/receta", body))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::filters::Nutrient;
    use serde_json::json;

    #[test]
    fn test_list_request() {
        let request = list(PageRequest::page(3, 20));
        assert_eq!(request.method, Method::Get);
        assert_eq!(request.path_and_query(), "/alimentos?limit=20&offset=40");
        assert!(!request.is_json());
    }

    #[test]
    fn test_get_by_id_request() {
        let request = get_by_id(101001);
        assert_eq!(request.path_and_query(), "/alimento/101001");
        assert_eq!(
            request.url("http://localhost:8000/"),
            "http://localhost:8000/alimento/101001"
        );
    }

    #[test]
    fn test_unfiltered_search_degenerates_to_list() {
        let criteria = FilterCriteria::new();
        let request = filtered_search(&criteria, None, PageRequest::new(20, 0)).unwrap();
        assert_eq!(request, list(PageRequest::new(20, 0)));
    }

    #[test]
    fn test_filtered_search_request() {
        let mut criteria = FilterCriteria::new();
        criteria.set_max(Nutrient::Calories, 200.0).unwrap();

        let request = filtered_search(&criteria, None, PageRequest::new(20, 20)).unwrap();
        assert_eq!(request.method, Method::Post);
        assert_eq!(request.path_and_query(), "/buscar?limit=20&offset=20");
        assert_eq!(request.body, Some(json!({ "max_calorias": 200.0 })));
        assert!(request.is_json());
    }

    #[test]
    fn test_name_only_search_posts_name() {
        let criteria = FilterCriteria::new();
        let request = filtered_search(&criteria, Some("leche"), PageRequest::new(20, 0)).unwrap();
        assert_eq!(request.path, "/buscar");
        assert_eq!(request.body, Some(json!({ "nombre": "leche" })));
    }

    #[test]
    fn test_name_search_encodes_term() {
        let request = name_search("pan dulce", PageRequest::new(10, 0)).unwrap();
        assert_eq!(
            request.path_and_query(),
            "/buscar_alimento?nombre=pan%20dulce&limit=10&offset=0"
        );
    }

    #[test]
    fn test_name_search_requires_two_characters() {
        assert!(name_search("a", PageRequest::new(10, 0)).is_err());
        assert!(name_search(" a ", PageRequest::new(10, 0)).is_err());
        assert!(name_search("ñu", PageRequest::new(10, 0)).is_ok());
    }

    #[test]
    fn test_ask_request() {
        let request = ask("¿Qué tiene más zinc?", Some(10)).unwrap();
        assert_eq!(request.path, "/ask");
        assert_eq!(
            request.body,
            Some(json!({ "question": "¿Qué tiene más zinc?", "max_results": 10 }))
        );

        let request = ask("hierro", None).unwrap();
        assert_eq!(request.body, Some(json!({ "question": "hierro" })));

        assert!(ask("   ", None).is_err());
    }

    #[test]
    fn test_generate_recipe_request() {
        let request = generate_recipe(&[(101001, 150.0), (202002, 80.0)]).unwrap();
        assert_eq!(request.path, "/receta");
        assert_eq!(
            request.body,
            Some(json!({
                "ingredientes": [
                    { "codigomex2": 101001, "cantidad_g": 150.0 },
                    { "codigomex2": 202002, "cantidad_g": 80.0 }
                ]
            }))
        );

        assert!(generate_recipe(&[]).is_err());
    }

    #[test]
    fn test_create_request() {
        let food = RemoteFood {
            code: 9,
            name: Some("Nopal".to_string()),
            energ_kcal: Some(16.0),
            ..Default::default()
        };
        let request = create(&food).unwrap();
        assert_eq!(request.method, Method::Post);
        assert_eq!(request.path, "/alimento");
        assert_eq!(
            request.body,
            Some(json!({ "codigomex2": 9, "nombre_del_alimento": "Nopal", "energ_kcal": 16.0 }))
        );
    }

    #[test]
    fn test_parse_food_code() {
        assert_eq!(parse_food_code("101001"), Some(101001));
        assert_eq!(parse_food_code(" 42 "), Some(42));
        assert_eq!(parse_food_code(""), None);
        assert_eq!(parse_food_code("12ab"), None);
        assert_eq!(parse_food_code("-5"), None);
        assert_eq!(parse_food_code("pollo"), None);
    }
}
