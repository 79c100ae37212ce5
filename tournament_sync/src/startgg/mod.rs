//! Remote query gateway for the start.gg tournament API.
//!
//! Pages through the GraphQL `tournaments` query with a fixed page size,
//! stopping once a page comes back short, the page cap is reached, or the
//! results run past the query window. Every page fetch is retried through
//! the shared [`RetryPolicy`]; a page that keeps failing aborts the whole
//! fetch rather than returning a truncated collection.

pub mod errors;
pub mod models;

use async_trait::async_trait;
use serde_json::json;

pub use errors::FetchError;
use models::{GraphqlRequest, GraphqlResponse};

use crate::errors::ConfigError;
use crate::retry::RetryPolicy;
use crate::tournament::models::{OwnerId, TimeWindow, TournamentRecord};

/// Fixed page size for upstream queries.
pub const PER_PAGE: usize = 200;

/// Hard cap on pages fetched per query, the run's only cancellation bound.
const MAX_PAGES: u32 = 25;

const GQL_ENDPOINT: &str = "https://api.start.gg/gql/alpha";

const TOURNAMENTS_BY_STATE_QUERY: &str = r#"query TournamentsByState($page: Int!, $perPage: Int!, $state: String!, $afterDate: Timestamp!, $beforeDate: Timestamp!) {
  tournaments(query: {
    page: $page
    perPage: $perPage
    sortBy: "startAt asc"
    filter: { addrState: $state, afterDate: $afterDate, beforeDate: $beforeDate }
  }) {
    nodes {
      id
      name
      slug
      url
      startAt
      endAt
      addrState
      venueAddress
      owner { id }
      events { id videogame { slug } }
    }
  }
}"#;

const TOURNAMENTS_BY_OWNER_QUERY: &str = r#"query TournamentsByOwner($page: Int!, $perPage: Int!, $ownerId: ID!, $afterDate: Timestamp!, $beforeDate: Timestamp!) {
  tournaments(query: {
    page: $page
    perPage: $perPage
    sortBy: "startAt asc"
    filter: { ownerId: $ownerId, afterDate: $afterDate, beforeDate: $beforeDate }
  }) {
    nodes {
      id
      name
      slug
      url
      startAt
      endAt
      addrState
      venueAddress
      owner { id }
      events { id videogame { slug } }
    }
  }
}"#;

/// Source of tournament listings, behind a trait so tests can substitute a
/// fake for the live API.
///
/// Region and owner queries are mutually exclusive selection modes; callers
/// wanting both call twice and concatenate.
#[async_trait]
pub trait TournamentSource {
    /// Tournaments held in a US state within the window.
    async fn tournaments_by_state(
        &self,
        state: &str,
        window: &TimeWindow,
    ) -> Result<Vec<TournamentRecord>, FetchError>;

    /// Tournaments run by any of the given owners within the window.
    async fn tournaments_by_owners(
        &self,
        owners: &[OwnerId],
        window: &TimeWindow,
    ) -> Result<Vec<TournamentRecord>, FetchError>;
}

/// One pageable upstream query; [`drain_pages`] drives it to exhaustion.
#[async_trait]
pub(crate) trait PageSource {
    async fn page(&self, page: u32, per_page: usize)
    -> Result<Vec<TournamentRecord>, FetchError>;
}

/// Fetch pages until one comes back short, the cap is hit, or the results
/// run past the window's end.
///
/// The early exit relies on the upstream sorting by start time; the final
/// window filter is applied independently, so unsorted results degrade the
/// exit to a plain retrieval bound rather than corrupting the result.
pub(crate) async fn drain_pages<P: PageSource + Sync>(
    source: &P,
    window: &TimeWindow,
    retry: &RetryPolicy,
    per_page: usize,
) -> Result<Vec<TournamentRecord>, FetchError> {
    let mut all = Vec::new();
    for page in 1..=MAX_PAGES {
        let nodes = retry
            .run("tournament page fetch", || source.page(page, per_page))
            .await
            .map_err(|source| FetchError::RetriesExhausted {
                attempts: retry.max_attempts.max(1),
                source: Box::new(source),
            })?;
        let page_len = nodes.len();
        let past_window = nodes
            .last()
            .is_some_and(|record| record.start_at >= window.end);
        all.extend(nodes);
        if page_len < per_page || past_window {
            break;
        }
    }
    all.retain(|record| window.contains(record.start_at));
    Ok(all)
}

/// Client for the start.gg GraphQL endpoint.
pub struct StartggClient {
    http: reqwest::Client,
    endpoint: String,
    api_key: String,
    retry: RetryPolicy,
}

impl StartggClient {
    /// Create a client against the live start.gg endpoint.
    pub fn new(api_key: String) -> Self {
        Self::with_endpoint(api_key, GQL_ENDPOINT.to_string())
    }

    /// Create a client against a custom endpoint (local test servers).
    pub fn with_endpoint(api_key: String, endpoint: String) -> Self {
        Self {
            http: reqwest::Client::new(),
            endpoint,
            api_key,
            retry: RetryPolicy::default(),
        }
    }

    /// Replace the per-page retry budget.
    pub fn with_retry(mut self, retry: RetryPolicy) -> Self {
        self.retry = retry;
        self
    }

    async fn query_page(
        &self,
        query: &'static str,
        mut variables: serde_json::Value,
        page: u32,
        per_page: usize,
    ) -> Result<Vec<TournamentRecord>, FetchError> {
        variables["page"] = json!(page);
        variables["perPage"] = json!(per_page);
        let request = GraphqlRequest { query, variables };

        let response = self
            .http
            .post(&self.endpoint)
            .header("Authorization", format!("Bearer {}", self.api_key))
            .json(&request)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(FetchError::Status {
                status: status.as_u16(),
                body,
            });
        }

        let body: GraphqlResponse = response.json().await?;
        records_from_response(body)
    }
}

/// Map a parsed GraphQL body to domain records. Query-level errors arrive
/// alongside a 200 status and take precedence over any partial data.
fn records_from_response(body: GraphqlResponse) -> Result<Vec<TournamentRecord>, FetchError> {
    if let Some(error) = body.errors.into_iter().next() {
        return Err(FetchError::Api(error.message));
    }
    let page = body
        .data
        .and_then(|data| data.tournaments)
        .ok_or_else(|| FetchError::Malformed("response carries no tournaments".to_string()))?;
    page.nodes
        .into_iter()
        .map(models::TournamentNode::into_record)
        .collect()
}

struct StateQuery<'a> {
    client: &'a StartggClient,
    state: &'a str,
    window: &'a TimeWindow,
}

#[async_trait]
impl PageSource for StateQuery<'_> {
    async fn page(
        &self,
        page: u32,
        per_page: usize,
    ) -> Result<Vec<TournamentRecord>, FetchError> {
        let variables = json!({
            "state": self.state,
            "afterDate": self.window.start.timestamp(),
            "beforeDate": self.window.end.timestamp(),
        });
        self.client
            .query_page(TOURNAMENTS_BY_STATE_QUERY, variables, page, per_page)
            .await
    }
}

struct OwnerQuery<'a> {
    client: &'a StartggClient,
    owner: OwnerId,
    window: &'a TimeWindow,
}

#[async_trait]
impl PageSource for OwnerQuery<'_> {
    async fn page(
        &self,
        page: u32,
        per_page: usize,
    ) -> Result<Vec<TournamentRecord>, FetchError> {
        let variables = json!({
            "ownerId": self.owner,
            "afterDate": self.window.start.timestamp(),
            "beforeDate": self.window.end.timestamp(),
        });
        self.client
            .query_page(TOURNAMENTS_BY_OWNER_QUERY, variables, page, per_page)
            .await
    }
}

#[async_trait]
impl TournamentSource for StartggClient {
    async fn tournaments_by_state(
        &self,
        state: &str,
        window: &TimeWindow,
    ) -> Result<Vec<TournamentRecord>, FetchError> {
        if state.is_empty() {
            return Err(ConfigError::EmptySelector { what: "state" }.into());
        }
        let query = StateQuery {
            client: self,
            state,
            window,
        };
        drain_pages(&query, window, &self.retry, PER_PAGE).await
    }

    async fn tournaments_by_owners(
        &self,
        owners: &[OwnerId],
        window: &TimeWindow,
    ) -> Result<Vec<TournamentRecord>, FetchError> {
        if owners.is_empty() {
            return Err(ConfigError::EmptySelector { what: "owner list" }.into());
        }
        let mut all = Vec::new();
        for &owner in owners {
            let query = OwnerQuery {
                client: self,
                owner,
                window,
            };
            all.extend(drain_pages(&query, window, &self.retry, PER_PAGE).await?);
        }
        Ok(all)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tournament::models::TournamentEvent;
    use chrono::{DateTime, Duration as ChronoDuration, Utc};
    use std::sync::Mutex;
    use std::sync::atomic::{AtomicU32, Ordering};
    use std::time::Duration;

    fn window() -> TimeWindow {
        TimeWindow::new(
            DateTime::from_timestamp(1_750_000_000, 0).unwrap(),
            DateTime::from_timestamp(1_760_000_000, 0).unwrap(),
        )
        .unwrap()
    }

    fn record(id: i64, start_at: DateTime<Utc>) -> TournamentRecord {
        TournamentRecord {
            id,
            name: format!("Tournament {id}"),
            slug: format!("tournament/{id}"),
            url: format!("/tournament/{id}"),
            start_at,
            end_at: start_at + ChronoDuration::hours(8),
            address_state: Some("NC".to_string()),
            venue_address: None,
            owner_id: 1,
            events: vec![TournamentEvent {
                event_id: id * 10,
                game_slug: "game/street-fighter-6".to_string(),
            }],
        }
    }

    /// Splits `total` in-window records into `per_page`-sized pages.
    fn scripted_pages(total: i64, per_page: usize) -> Vec<Vec<TournamentRecord>> {
        let start = window().start;
        let records: Vec<_> = (0..total)
            .map(|i| record(i + 1, start + ChronoDuration::minutes(i)))
            .collect();
        records
            .chunks(per_page)
            .map(|chunk| chunk.to_vec())
            .collect()
    }

    struct ScriptedSource {
        pages: Mutex<Vec<Vec<TournamentRecord>>>,
        requests: AtomicU32,
        failures_before_success: AtomicU32,
    }

    impl ScriptedSource {
        fn new(pages: Vec<Vec<TournamentRecord>>) -> Self {
            Self {
                pages: Mutex::new(pages),
                requests: AtomicU32::new(0),
                failures_before_success: AtomicU32::new(0),
            }
        }

        fn failing_first(mut self, failures: u32) -> Self {
            self.failures_before_success = AtomicU32::new(failures);
            self
        }
    }

    #[async_trait]
    impl PageSource for ScriptedSource {
        async fn page(
            &self,
            page: u32,
            _per_page: usize,
        ) -> Result<Vec<TournamentRecord>, FetchError> {
            self.requests.fetch_add(1, Ordering::SeqCst);
            let remaining = self.failures_before_success.load(Ordering::SeqCst);
            if remaining > 0 {
                self.failures_before_success
                    .store(remaining - 1, Ordering::SeqCst);
                return Err(FetchError::Malformed("scripted failure".to_string()));
            }
            let pages = self.pages.lock().unwrap();
            Ok(pages.get((page - 1) as usize).cloned().unwrap_or_default())
        }
    }

    fn immediate_retry() -> RetryPolicy {
        RetryPolicy::new(3, Duration::ZERO)
    }

    #[tokio::test]
    async fn pagination_issues_exactly_the_needed_requests() {
        // 7 records at 3 per page: pages of 3, 3, 1 -> 3 requests.
        let source = ScriptedSource::new(scripted_pages(7, 3));
        let records = drain_pages(&source, &window(), &immediate_retry(), 3)
            .await
            .unwrap();

        assert_eq!(source.requests.load(Ordering::SeqCst), 3);
        assert_eq!(records.len(), 7);
        let mut ids: Vec<_> = records.iter().map(|r| r.id).collect();
        ids.sort_unstable();
        ids.dedup();
        assert_eq!(ids.len(), 7, "each record retrieved exactly once");
    }

    #[tokio::test]
    async fn exact_multiple_of_page_size_fetches_one_trailing_empty_page() {
        // 6 records at 3 per page: the second full page forces a third,
        // empty request to observe the end of data.
        let source = ScriptedSource::new(scripted_pages(6, 3));
        let records = drain_pages(&source, &window(), &immediate_retry(), 3)
            .await
            .unwrap();
        assert_eq!(source.requests.load(Ordering::SeqCst), 3);
        assert_eq!(records.len(), 6);
    }

    #[tokio::test]
    async fn empty_result_is_not_an_error() {
        let source = ScriptedSource::new(vec![]);
        let records = drain_pages(&source, &window(), &immediate_retry(), 3)
            .await
            .unwrap();
        assert!(records.is_empty());
        assert_eq!(source.requests.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn stops_paging_once_results_pass_the_window_end() {
        let w = window();
        let in_window = w.start + ChronoDuration::hours(1);
        let beyond = w.end + ChronoDuration::hours(1);
        // Full first page already ends past the window; no second request.
        let pages = vec![
            vec![record(1, in_window), record(2, in_window), record(3, beyond)],
            vec![record(4, beyond), record(5, beyond), record(6, beyond)],
        ];
        let source = ScriptedSource::new(pages);
        let records = drain_pages(&source, &w, &immediate_retry(), 3)
            .await
            .unwrap();

        assert_eq!(source.requests.load(Ordering::SeqCst), 1);
        // Out-of-window records are filtered even when fetched.
        assert_eq!(
            records.iter().map(|r| r.id).collect::<Vec<_>>(),
            vec![1, 2]
        );
    }

    #[tokio::test]
    async fn unsorted_results_still_end_up_window_filtered() {
        let w = window();
        let in_window = w.start + ChronoDuration::hours(1);
        let beyond = w.end + ChronoDuration::hours(1);
        // Short page whose stray out-of-window record sits mid-page.
        let pages = vec![vec![record(1, in_window), record(2, beyond)]];
        let source = ScriptedSource::new(pages);
        let records = drain_pages(&source, &w, &immediate_retry(), 3)
            .await
            .unwrap();
        assert_eq!(records.iter().map(|r| r.id).collect::<Vec<_>>(), vec![1]);
    }

    #[tokio::test]
    async fn transient_page_failures_are_retried() {
        let source = ScriptedSource::new(scripted_pages(2, 3)).failing_first(2);
        let records = drain_pages(&source, &window(), &immediate_retry(), 3)
            .await
            .unwrap();
        assert_eq!(records.len(), 2);
        // 2 failures + 1 success for page 1.
        assert_eq!(source.requests.load(Ordering::SeqCst), 3);
    }

    #[tokio::test]
    async fn persistent_page_failure_aborts_the_whole_fetch() {
        let source = ScriptedSource::new(scripted_pages(2, 3)).failing_first(10);
        let err = drain_pages(&source, &window(), &immediate_retry(), 3)
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            FetchError::RetriesExhausted { attempts: 3, .. }
        ));
        assert_eq!(source.requests.load(Ordering::SeqCst), 3);
    }

    #[tokio::test]
    async fn empty_state_selector_fails_before_any_request() {
        let client = StartggClient::with_endpoint(
            "key".to_string(),
            "http://127.0.0.1:9/gql".to_string(),
        )
        .with_retry(RetryPolicy::new(1, Duration::ZERO));
        let err = client
            .tournaments_by_state("", &window())
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            FetchError::Config(ConfigError::EmptySelector { what: "state" })
        ));
    }

    #[tokio::test]
    async fn empty_owner_list_fails_before_any_request() {
        let client = StartggClient::with_endpoint(
            "key".to_string(),
            "http://127.0.0.1:9/gql".to_string(),
        );
        let err = client
            .tournaments_by_owners(&[], &window())
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            FetchError::Config(ConfigError::EmptySelector { what: "owner list" })
        ));
    }

    #[test]
    fn graphql_level_errors_surface_as_api_errors() {
        // start.gg reports query failures in an errors array on a 200.
        let body: GraphqlResponse = serde_json::from_value(serde_json::json!({
            "data": null,
            "errors": [ { "message": "Invalid authentication token" } ]
        }))
        .unwrap();
        let err = records_from_response(body).unwrap_err();
        assert!(
            matches!(err, FetchError::Api(ref message) if message == "Invalid authentication token")
        );
    }

    #[test]
    fn response_without_tournaments_is_malformed() {
        let body: GraphqlResponse = serde_json::from_value(serde_json::json!({
            "data": null
        }))
        .unwrap();
        let err = records_from_response(body).unwrap_err();
        assert!(matches!(err, FetchError::Malformed(_)));
    }

    #[test]
    fn successful_response_yields_its_nodes() {
        let body: GraphqlResponse = serde_json::from_value(serde_json::json!({
            "data": { "tournaments": { "nodes": [ {
                "id": 42,
                "name": "Winter Clash",
                "slug": "tournament/winter-clash",
                "url": "/tournament/winter-clash",
                "startAt": 1_750_000_000i64,
                "owner": { "id": 7 },
                "events": []
            } ] } }
        }))
        .unwrap();
        let records = records_from_response(body).unwrap();
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].id, 42);
    }

    #[test]
    fn wire_node_converts_to_domain_record() {
        let node: models::TournamentNode = serde_json::from_value(serde_json::json!({
            "id": 42,
            "name": "Winter Clash",
            "slug": "tournament/winter-clash",
            "url": "/tournament/winter-clash",
            "startAt": 1_750_000_000i64,
            "endAt": 1_750_030_000i64,
            "addrState": "NC",
            "venueAddress": "123 Main St",
            "owner": { "id": 7 },
            "events": [ { "id": 1, "videogame": { "slug": "game/street-fighter-6" } } ]
        }))
        .unwrap();
        let record = node.into_record().unwrap();
        assert_eq!(record.id, 42);
        assert_eq!(record.owner_id, 7);
        assert_eq!(record.start_at.timestamp(), 1_750_000_000);
        assert_eq!(record.events[0].game_slug, "game/street-fighter-6");
    }

    #[test]
    fn wire_node_missing_end_falls_back_to_start() {
        let node: models::TournamentNode = serde_json::from_value(serde_json::json!({
            "id": 42,
            "name": "Winter Clash",
            "slug": "tournament/winter-clash",
            "url": "/tournament/winter-clash",
            "startAt": 1_750_000_000i64,
            "owner": { "id": 7 },
            "events": []
        }))
        .unwrap();
        let record = node.into_record().unwrap();
        assert_eq!(record.end_at, record.start_at);
        assert!(record.address_state.is_none());
    }
}
