//! Incremental fetch controller.
//!
//! Owns the [`ResultsView`], the current [`SearchQuery`], the debounce timer
//! and the set of fetches in flight. Query edits only re-arm the timer; the
//! fetch is dispatched when [`SearchController::tick`] sees the timer fire.
//! Responses are applied through [`ResultsView::complete`], which discards
//! anything older than the latest dispatch.

use futures::future::LocalBoxFuture;
use futures::stream::FuturesUnordered;
use futures::{FutureExt, StreamExt};
use std::time::Duration;

use nutriai_core::error::ApiError;
use nutriai_core::fetch::{Completion, ResultsView, SearchQuery, Ticket};
use nutriai_core::filters::{FilterError, Nutrient};
use nutriai_core::food::Food;
use nutriai_core::pagination::PageCursor;

use crate::client::{NutritionApi, Transport};
use crate::debounce::Debounce;

/// A user action on the browser
#[derive(Debug, Clone, PartialEq)]
pub enum Input {
    Term(String),
    SetMin(Nutrient, f64),
    SetMax(Nutrient, f64),
    ClearFilters,
    LoadMore,
    /// Dispatch page 1 of the current query right away
    Refresh,
}

/// Something the display should react to
#[derive(Debug, Clone, PartialEq)]
pub enum Update {
    /// A fetch for `page` went out
    Started { page: usize },
    Applied,
    Failed { message: String },
    /// A superseded response arrived and was dropped
    Stale,
}

type InFlight<'a> = LocalBoxFuture<'a, (Ticket, Result<Vec<Food>, ApiError>)>;

pub struct SearchController<'a, T: Transport> {
    api: &'a NutritionApi<T>,
    query: SearchQuery,
    view: ResultsView,
    debounce: Debounce,
    in_flight: FuturesUnordered<InFlight<'a>>,
}

impl<'a, T: Transport + 'a> SearchController<'a, T> {
    pub fn new(api: &'a NutritionApi<T>, cursor: PageCursor, delay: Duration) -> Self {
        Self {
            api,
            query: SearchQuery::default(),
            view: ResultsView::new(cursor),
            debounce: Debounce::new(delay),
            in_flight: FuturesUnordered::new(),
        }
    }

    pub fn view(&self) -> &ResultsView {
        &self.view
    }

    pub fn query(&self) -> &SearchQuery {
        &self.query
    }

    /// Whether `tick` has anything to wait for
    pub fn is_pending(&self) -> bool {
        self.debounce.is_armed() || !self.in_flight.is_empty()
    }

    /// Apply one input. Rejected filter edits leave the query untouched.
    pub fn handle(&mut self, input: Input) -> Result<Option<Update>, FilterError> {
        match input {
            Input::Term(term) => {
                if term == self.query.term {
                    return Ok(None);
                }
                self.query.term = term;
                self.debounce.schedule();
            }
            Input::SetMin(nutrient, value) => {
                self.query.criteria.set_min(nutrient, value)?;
                self.debounce.schedule();
            }
            Input::SetMax(nutrient, value) => {
                self.query.criteria.set_max(nutrient, value)?;
                self.debounce.schedule();
            }
            Input::ClearFilters => {
                self.query.criteria.reset();
                self.debounce.schedule();
            }
            Input::LoadMore => {
                let Some(ticket) = self.view.begin_load_more() else {
                    log::debug!("load more ignored");
                    return Ok(None);
                };
                let page = ticket.page;
                self.dispatch(ticket);
                return Ok(Some(Update::Started { page }));
            }
            Input::Refresh => {
                self.debounce.cancel();
                return Ok(Some(self.dispatch_query()));
            }
        }
        Ok(None)
    }

    /// Wait for the next event: the debounce firing or a fetch finishing.
    ///
    /// Returns `None` right away when nothing is pending. Cancel-safe.
    pub async fn tick(&mut self) -> Option<Update> {
        if !self.is_pending() {
            return None;
        }

        let armed = self.debounce.is_armed();
        let busy = !self.in_flight.is_empty();

        tokio::select! {
            _ = self.debounce.fired(), if armed => Some(self.dispatch_query()),
            Some((ticket, result)) = self.in_flight.next(), if busy => {
                Some(self.apply(&ticket, result))
            }
        }
    }

    fn dispatch_query(&mut self) -> Update {
        match self.view.begin_query(&self.query) {
            Ok(ticket) => {
                let page = ticket.page;
                self.dispatch(ticket);
                Update::Started { page }
            }
            Err(err) => Update::Failed {
                message: err.to_string(),
            },
        }
    }

    fn dispatch(&mut self, ticket: Ticket) {
        log::debug!(
            "dispatch generation {} page {}: {} {}",
            ticket.generation,
            ticket.page,
            ticket.request.method,
            ticket.request.path_and_query()
        );
        let api = self.api;
        self.in_flight.push(
            async move {
                let result = api.fetch(&ticket).await;
                (ticket, result)
            }
            .boxed_local(),
        );
    }

    fn apply(&mut self, ticket: &Ticket, result: Result<Vec<Food>, ApiError>) -> Update {
        match self.view.complete(ticket, result) {
            Completion::Applied => Update::Applied,
            Completion::Failed { message } => Update::Failed { message },
            Completion::Stale => {
                log::debug!(
                    "discarded stale response for generation {} (latest {})",
                    ticket.generation,
                    self.view.generation()
                );
                Update::Stale
            }
        }
    }
}
