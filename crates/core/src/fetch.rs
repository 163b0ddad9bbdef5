//! State machine behind the incremental food browser.
//!
//! [`ResultsView`] owns everything the browser displays: the accumulated
//! foods, the page cursor and the fetch state. Every dispatched fetch gets a
//! [`Ticket`] stamped with a generation number; a response is only applied
//! when its ticket is still the latest one, so a slow response for an old
//! query can never overwrite the results of a newer one.

use serde::Serialize;

use crate::error::{code_lookup_message, search_message, ApiError};
use crate::filters::FilterCriteria;
use crate::food::Food;
use crate::pagination::PageCursor;
use crate::request::{self, parse_food_code, ApiRequest, PageRequest, MIN_NAME_SEARCH_LEN};

/// What the user has typed and selected
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SearchQuery {
    pub term: String,
    pub criteria: FilterCriteria,
}

/// Which endpoint a query resolves to
#[derive(Debug, Clone, PartialEq)]
pub enum QueryPlan {
    /// A numeric code overrides every other criterion
    ByCode(u64),
    ByName(String),
    Filtered { name: Option<String> },
    List,
}

impl SearchQuery {
    pub fn new(term: impl Into<String>, criteria: FilterCriteria) -> Self {
        Self {
            term: term.into(),
            criteria,
        }
    }

    fn name_term(&self) -> Option<String> {
        let term = self.term.trim();
        (term.chars().count() >= MIN_NAME_SEARCH_LEN).then(|| term.to_string())
    }

    pub fn plan(&self) -> QueryPlan {
        if let Some(code) = parse_food_code(&self.term) {
            return QueryPlan::ByCode(code);
        }

        let name = self.name_term();
        if !self.criteria.is_unfiltered() {
            return QueryPlan::Filtered { name };
        }

        match name {
            Some(name) => QueryPlan::ByName(name),
            None => QueryPlan::List,
        }
    }

    /// Request for `page` of this query
    pub fn request(&self, page: PageRequest) -> Result<ApiRequest, ApiError> {
        match self.plan() {
            QueryPlan::ByCode(code) => Ok(request::get_by_id(code)),
            QueryPlan::ByName(name) => request::name_search(&name, page),
            QueryPlan::Filtered { name } => {
                request::filtered_search(&self.criteria, name.as_deref(), page)
            }
            QueryPlan::List => Ok(request::list(page)),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "state", rename_all = "snake_case")]
pub enum FetchState {
    Idle,
    Loading { page: usize },
    Loaded,
    Error { message: String },
}

/// How a finished fetch is merged into the view
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FetchKind {
    /// First page of a query; replaces the list
    Replace,
    /// Next page of the current query; appends to the list
    Append,
    /// Lookup by code; the list becomes that single food
    Single { code: u64 },
}

/// Handle for one dispatched fetch
#[derive(Debug, Clone, PartialEq)]
pub struct Ticket {
    pub generation: u64,
    pub page: usize,
    pub kind: FetchKind,
    pub request: ApiRequest,
}

/// Outcome of applying a fetch result
#[derive(Debug, Clone, PartialEq)]
pub enum Completion {
    Applied,
    Failed { message: String },
    /// A newer fetch was dispatched in the meantime; nothing changed
    Stale,
}

#[derive(Debug, Clone, Serialize)]
pub struct ResultsView {
    pub foods: Vec<Food>,
    pub cursor: PageCursor,
    pub state: FetchState,
    #[serde(skip)]
    generation: u64,
    #[serde(skip)]
    last_query: Option<SearchQuery>,
}

impl Default for ResultsView {
    fn default() -> Self {
        Self::new(PageCursor::default())
    }
}

impl ResultsView {
    pub fn new(cursor: PageCursor) -> Self {
        Self {
            foods: Vec::new(),
            cursor,
            state: FetchState::Idle,
            generation: 0,
            last_query: None,
        }
    }

    pub fn is_loading(&self) -> bool {
        matches!(self.state, FetchState::Loading { .. })
    }

    pub fn generation(&self) -> u64 {
        self.generation
    }

    pub fn error(&self) -> Option<&str> {
        match &self.state {
            FetchState::Error { message } => Some(message),
            _ => None,
        }
    }

    fn page_request(&self, page: usize) -> PageRequest {
        PageRequest::new(self.cursor.request_limit(), self.cursor.offset_for(page))
    }

    /// Start page 1 of `query`, superseding any fetch still in flight
    pub fn begin_query(&mut self, query: &SearchQuery) -> Result<Ticket, ApiError> {
        let request = query.request(self.page_request(1))?;
        self.cursor.reset();
        let kind = match query.plan() {
            QueryPlan::ByCode(code) => FetchKind::Single { code },
            _ => FetchKind::Replace,
        };

        self.generation += 1;
        self.last_query = Some(query.clone());
        self.state = FetchState::Loading { page: 1 };

        Ok(Ticket {
            generation: self.generation,
            page: 1,
            kind,
            request,
        })
    }

    /// Start the next page of the last query, if there is one to fetch
    pub fn begin_load_more(&mut self) -> Option<Ticket> {
        if self.is_loading() || !self.cursor.has_more {
            return None;
        }

        let query = self.last_query.as_ref()?;
        if matches!(query.plan(), QueryPlan::ByCode(_)) {
            return None;
        }

        let page = self.cursor.next_page();
        let request = query.request(self.page_request(page)).ok()?;

        self.generation += 1;
        self.state = FetchState::Loading { page };

        Some(Ticket {
            generation: self.generation,
            page,
            kind: FetchKind::Append,
            request,
        })
    }

    /// Apply the result of the fetch identified by `ticket`
    pub fn complete(&mut self, ticket: &Ticket, result: Result<Vec<Food>, ApiError>) -> Completion {
        if ticket.generation != self.generation {
            return Completion::Stale;
        }

        match result {
            Ok(mut foods) => {
                match ticket.kind {
                    FetchKind::Single { .. } => {
                        foods.truncate(1);
                        self.foods = foods;
                        self.cursor.collapse_to_single();
                    }
                    FetchKind::Replace => {
                        let kept = self.cursor.record_page(ticket.page, foods.len());
                        foods.truncate(kept);
                        self.foods = foods;
                    }
                    FetchKind::Append => {
                        let kept = self.cursor.record_page(ticket.page, foods.len());
                        foods.truncate(kept);
                        self.foods.extend(foods);
                    }
                }
                self.state = FetchState::Loaded;
                Completion::Applied
            }
            Err(err) => {
                let message = match ticket.kind {
                    FetchKind::Single { code } => {
                        self.foods.clear();
                        self.cursor.collapse_to_single();
                        code_lookup_message(code, &err)
                    }
                    FetchKind::Replace => {
                        // Nothing to page past until a retry succeeds
                        self.foods.clear();
                        self.cursor.has_more = false;
                        search_message(&err)
                    }
                    // Earlier pages stay visible next to the error
                    FetchKind::Append => search_message(&err),
                };
                self.state = FetchState::Error {
                    message: message.clone(),
                };
                Completion::Failed { message }
            }
        }
    }
}

/// One page of a one-shot listing
#[derive(Debug, Clone, Serialize)]
pub struct FoodPage {
    pub foods: Vec<Food>,
    pub pagination: PageInfo,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PageInfo {
    pub page: usize,
    pub page_size: usize,
    pub has_more: bool,
    pub next_page_command: Option<String>,
}

/// Trim `foods` to the page and describe how to reach the next one
pub fn food_page(mut cursor: PageCursor, page: usize, mut foods: Vec<Food>, command: &str) -> FoodPage {
    let kept = cursor.record_page(page, foods.len());
    foods.truncate(kept);

    FoodPage {
        foods,
        pagination: PageInfo {
            page,
            page_size: cursor.page_size,
            has_more: cursor.has_more,
            next_page_command: cursor
                .has_more
                .then(|| format!("{command} --page {}", page + 1)),
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::filters::Nutrient;

    fn foods(start: u64, count: usize) -> Vec<Food> {
        (0..count as u64)
            .map(|i| Food {
                code: start + i,
                name: format!("Food {}", start + i),
                ..Default::default()
            })
            .collect()
    }

    fn not_found() -> ApiError {
        ApiError::from_response(404, "Not Found", None)
    }

    #[test]
    fn test_plan_prefers_code() {
        let mut criteria = FilterCriteria::new();
        criteria.set_min(Nutrient::Protein, 10.0).unwrap();

        let query = SearchQuery::new("101001", criteria);
        assert_eq!(query.plan(), QueryPlan::ByCode(101001));
    }

    #[test]
    fn test_plan_name_list_and_filtered() {
        assert_eq!(SearchQuery::default().plan(), QueryPlan::List);
        assert_eq!(
            SearchQuery::new("x", FilterCriteria::new()).plan(),
            QueryPlan::List
        );
        assert_eq!(
            SearchQuery::new("pollo", FilterCriteria::new()).plan(),
            QueryPlan::ByName("pollo".to_string())
        );

        let mut criteria = FilterCriteria::new();
        criteria.set_max(Nutrient::Calories, 100.0).unwrap();
        assert_eq!(
            SearchQuery::new("pollo", criteria.clone()).plan(),
            QueryPlan::Filtered {
                name: Some("pollo".to_string())
            }
        );
        assert_eq!(
            SearchQuery::new("", criteria).plan(),
            QueryPlan::Filtered { name: None }
        );
    }

    #[test]
    fn test_first_page_full_has_more() {
        let mut view = ResultsView::default();
        let ticket = view.begin_query(&SearchQuery::default()).unwrap();
        assert_eq!(ticket.request.path_and_query(), "/alimentos?limit=20&offset=0");
        assert!(view.is_loading());

        assert_eq!(view.complete(&ticket, Ok(foods(1, 20))), Completion::Applied);
        assert_eq!(view.foods.len(), 20);
        assert!(view.cursor.has_more);
        assert_eq!(view.state, FetchState::Loaded);
    }

    #[test]
    fn test_load_more_appends_and_stops_on_short_page() {
        let mut view = ResultsView::default();
        let ticket = view.begin_query(&SearchQuery::default()).unwrap();
        view.complete(&ticket, Ok(foods(1, 20)));

        let more = view.begin_load_more().unwrap();
        assert_eq!(more.page, 2);
        assert_eq!(more.request.path_and_query(), "/alimentos?limit=20&offset=20");
        view.complete(&more, Ok(foods(21, 7)));

        assert_eq!(view.foods.len(), 27);
        assert_eq!(view.foods[20].code, 21);
        assert!(!view.cursor.has_more);
        assert_eq!(view.cursor.total_pages, Some(2));
        assert!(view.begin_load_more().is_none());
    }

    #[test]
    fn test_load_more_refused_while_loading() {
        let mut view = ResultsView::default();
        let ticket = view.begin_query(&SearchQuery::default()).unwrap();
        assert!(view.begin_load_more().is_none());
        view.complete(&ticket, Ok(foods(1, 20)));
        assert!(view.begin_load_more().is_some());
    }

    #[test]
    fn test_new_query_replaces_results() {
        let mut view = ResultsView::default();
        let ticket = view.begin_query(&SearchQuery::default()).unwrap();
        view.complete(&ticket, Ok(foods(1, 20)));
        let more = view.begin_load_more().unwrap();
        view.complete(&more, Ok(foods(21, 20)));
        assert_eq!(view.cursor.page, 2);

        let ticket = view
            .begin_query(&SearchQuery::new("frijol", FilterCriteria::new()))
            .unwrap();
        assert_eq!(view.cursor.page, 1);
        view.complete(&ticket, Ok(foods(500, 3)));

        assert_eq!(view.foods.len(), 3);
        assert_eq!(view.foods[0].code, 500);
    }

    #[test]
    fn test_stale_response_is_discarded() {
        let mut view = ResultsView::default();
        let old = view.begin_query(&SearchQuery::new("pollo", FilterCriteria::new())).unwrap();
        let new = view.begin_query(&SearchQuery::new("arroz", FilterCriteria::new())).unwrap();

        assert_eq!(view.complete(&new, Ok(foods(2, 2))), Completion::Applied);
        assert_eq!(view.complete(&old, Ok(foods(1, 20))), Completion::Stale);

        assert_eq!(view.foods.len(), 2);
        assert_eq!(view.foods[0].code, 2);
    }

    #[test]
    fn test_code_lookup_collapses_pagination() {
        let mut view = ResultsView::default();
        let ticket = view
            .begin_query(&SearchQuery::new("101001", FilterCriteria::new()))
            .unwrap();
        assert_eq!(ticket.kind, FetchKind::Single { code: 101001 });
        assert_eq!(ticket.request.path_and_query(), "/alimento/101001");

        view.complete(&ticket, Ok(foods(101001, 1)));
        assert_eq!(view.foods.len(), 1);
        assert!(!view.cursor.has_more);
        assert_eq!(view.cursor.total_pages, Some(1));
        assert!(view.begin_load_more().is_none());
    }

    #[test]
    fn test_code_lookup_not_found_message() {
        let mut view = ResultsView::default();
        let ticket = view
            .begin_query(&SearchQuery::new("101001", FilterCriteria::new()))
            .unwrap();

        let completion = view.complete(&ticket, Err(not_found()));
        assert_eq!(
            completion,
            Completion::Failed {
                message: "No food found with code 101001".to_string()
            }
        );
        assert!(view.foods.is_empty());
        assert_eq!(view.error(), Some("No food found with code 101001"));
    }

    #[test]
    fn test_first_page_failure_clears_results() {
        let mut view = ResultsView::default();
        let ticket = view.begin_query(&SearchQuery::default()).unwrap();
        view.complete(&ticket, Ok(foods(1, 20)));

        let ticket = view.begin_query(&SearchQuery::default()).unwrap();
        view.complete(&ticket, Err(ApiError::Transport("refused".to_string())));

        assert!(view.foods.is_empty());
        assert_eq!(view.error(), Some("Network error: refused"));
    }

    #[test]
    fn test_first_page_failure_blocks_load_more() {
        let mut view = ResultsView::default();
        let ticket = view.begin_query(&SearchQuery::default()).unwrap();
        view.complete(&ticket, Err(ApiError::Transport("refused".to_string())));

        assert!(view.foods.is_empty());
        assert!(!view.cursor.has_more);
        assert!(view.begin_load_more().is_none());

        // A retry starts over from page 1
        let retry = view.begin_query(&SearchQuery::default()).unwrap();
        assert_eq!(retry.request.path_and_query(), "/alimentos?limit=20&offset=0");
        view.complete(&retry, Ok(foods(1, 20)));
        assert_eq!(view.begin_load_more().unwrap().page, 2);
    }

    #[test]
    fn test_new_query_resets_cursor_after_paging() {
        let mut view = ResultsView::new(PageCursor::new(2));
        let ticket = view.begin_query(&SearchQuery::default()).unwrap();
        view.complete(&ticket, Ok(foods(1, 2)));
        let more = view.begin_load_more().unwrap();
        view.complete(&more, Ok(foods(3, 1)));
        assert_eq!(view.cursor.page, 2);
        assert!(!view.cursor.has_more);

        let ticket = view
            .begin_query(&SearchQuery::new("queso", FilterCriteria::new()))
            .unwrap();

        assert_eq!(ticket.page, 1);
        assert_eq!(
            ticket.request.path_and_query(),
            "/buscar_alimento?nombre=queso&limit=2&offset=0"
        );
        assert_eq!(view.cursor.page, 1);
        assert!(view.cursor.has_more);
    }

    #[test]
    fn test_load_more_failure_keeps_results() {
        let mut view = ResultsView::default();
        let ticket = view.begin_query(&SearchQuery::default()).unwrap();
        view.complete(&ticket, Ok(foods(1, 20)));

        let more = view.begin_load_more().unwrap();
        view.complete(&more, Err(not_found()));

        assert_eq!(view.foods.len(), 20);
        assert!(view.error().unwrap().starts_with("No foods match"));
        // The cursor still points at the last good page so the user can retry
        assert_eq!(view.cursor.page, 1);
        assert!(view.begin_load_more().is_some());
    }

    #[test]
    fn test_single_character_term_rides_without_name() {
        let mut view = ResultsView::default();
        let mut criteria = FilterCriteria::new();
        criteria.set_min(Nutrient::Fiber, 3.0).unwrap();
        let ticket = view.begin_query(&SearchQuery::new("a", criteria)).unwrap();
        assert_eq!(ticket.request.path, "/buscar");
        assert_eq!(ticket.request.body, Some(serde_json::json!({ "min_fiber_td": 3.0 })));
        assert_eq!(view.generation(), 1);
    }

    #[test]
    fn test_food_page_full_page_offers_next() {
        let output = food_page(PageCursor::new(3), 2, foods(1, 3), "nutriai foods list");

        assert_eq!(output.foods.len(), 3);
        assert!(output.pagination.has_more);
        assert_eq!(
            output.pagination.next_page_command.as_deref(),
            Some("nutriai foods list --page 3")
        );
    }

    #[test]
    fn test_food_page_lookahead_trims_extra_record() {
        let cursor = PageCursor::new(3).with_strategy(crate::pagination::HasMore::Lookahead);
        let output = food_page(cursor.clone(), 1, foods(1, 4), "nutriai foods list");
        assert_eq!(output.foods.len(), 3);
        assert!(output.pagination.has_more);

        let output = food_page(cursor, 1, foods(1, 2), "nutriai foods list");
        assert!(!output.pagination.has_more);
        assert_eq!(output.pagination.next_page_command, None);
    }
}
