use crate::{
    common::{
        data::{HandlerConfig, RequestPayload, Resolution},
        error::Error,
        util::{decode, lock},
    },
    server::{
        base_url::BaseUrl,
        handler::{normalize_method, HandlerRecord},
        matchers::{self, query::parse_query, MatchTarget, Matcher, Mismatch},
    },
};
use std::{
    collections::VecDeque,
    sync::{
        atomic::{AtomicBool, Ordering},
        Mutex,
    },
};
use url::Url;

/// The closest unmatched request for a handler, or the closest handler for an unmatched
/// request, together with the reasons why they did not match.
#[derive(Debug, Clone, PartialEq)]
pub struct ClosestMatch {
    pub request: RequestPayload,
    pub request_index: usize,
    pub handler: String,
    pub mismatches: Vec<Mismatch>,
}

/// A snapshot of the call history of a handler.
#[derive(Debug, Clone, Default, PartialEq)]
pub(crate) struct CallHistory {
    pub call_counter: usize,
    pub last_request: Option<RequestPayload>,
}

struct HandlerList {
    next_handler_id: usize,
    handlers: Vec<HandlerRecord>,
    unmatched: VecDeque<RequestPayload>,
}

/// The state behind one mock server: its base URL and the ordered handler list.
///
/// All handler and call history mutations happen while holding the same lock, so a
/// resolution is never observable half applied.
pub(crate) struct ServerState {
    base_url: BaseUrl,
    history_limit: usize,
    disposed: AtomicBool,
    matchers: Vec<Box<dyn Matcher + Sync + Send>>,
    state: Mutex<HandlerList>,
}

impl ServerState {
    pub fn new(base_url: BaseUrl, history_limit: usize) -> Self {
        Self {
            base_url,
            history_limit,
            disposed: AtomicBool::new(false),
            matchers: matchers::all(),
            state: Mutex::new(HandlerList {
                next_handler_id: 0,
                handlers: Vec::new(),
                unmatched: VecDeque::new(),
            }),
        }
    }

    pub fn base_url(&self) -> &BaseUrl {
        &self.base_url
    }

    pub fn is_disposed(&self) -> bool {
        self.disposed.load(Ordering::SeqCst)
    }

    /// Drops all handlers and history. Handles that still point to this server observe it as
    /// empty and can no longer register handlers.
    pub fn dispose(&self) {
        self.disposed.store(true, Ordering::SeqCst);
        let mut state = lock(&self.state);
        state.handlers.clear();
        state.unmatched.clear();
    }

    pub fn add_handler(
        &self,
        method: &str,
        pattern: &str,
        config: &HandlerConfig,
    ) -> Result<usize, Error> {
        let mut state = lock(&self.state);

        // Checked under the lock, so a concurrent dispose either sees this handler or rejects it.
        if self.is_disposed() {
            return Err(Error::ServerDisposed(self.base_url.as_str().to_string()));
        }

        let id = state.next_handler_id;
        let record = HandlerRecord::new(id, method, pattern, config)?;

        tracing::debug!(
            "Adding handler with id={} to {}: {}",
            id,
            self.base_url.as_str(),
            record.describe()
        );

        state.handlers.push(record);
        state.next_handler_id += 1;

        Ok(id)
    }

    pub fn call_history(&self, id: usize) -> Option<CallHistory> {
        let state = lock(&self.state);

        state
            .handlers
            .iter()
            .find(|h| h.id == id)
            .map(|h| CallHistory {
                call_counter: h.call_counter,
                last_request: h.last_request.clone(),
            })
    }

    pub fn delete_handler(&self, id: usize) -> bool {
        let mut state = lock(&self.state);

        let before = state.handlers.len();
        state.handlers.retain(|h| h.id != id);
        let deleted = state.handlers.len() != before;

        if deleted {
            tracing::debug!("Deleted handler with id={} from {}", id, self.base_url.as_str());
        } else {
            tracing::warn!(
                "Could not delete handler with id={} from {} (no handler with that id found)",
                id,
                self.base_url.as_str()
            );
        }

        deleted
    }

    pub fn delete_all_handlers(&self) {
        let mut state = lock(&self.state);
        state.handlers.clear();
        state.unmatched.clear();

        tracing::debug!("Deleted all handlers of {}", self.base_url.as_str());
    }

    /// Resets call counters, captured requests and the unmatched request history. Handlers
    /// stay registered.
    pub fn clear_history(&self) {
        let mut state = lock(&self.state);
        state.handlers.iter_mut().for_each(HandlerRecord::clear_history);
        state.unmatched.clear();

        tracing::trace!("Cleared call history of {}", self.base_url.as_str());
    }

    pub fn unmatched_requests(&self) -> Vec<RequestPayload> {
        lock(&self.state).unmatched.iter().cloned().collect()
    }

    /// Resolves a request to the first handler, in registration order, that passes all
    /// matchers. The matched handler records the request before its response is returned.
    pub fn resolve(&self, req: RequestPayload) -> Resolution {
        let target = match self.match_target(&req) {
            Some(target) => target,
            None => return Resolution::Unhandled,
        };

        let mut state = lock(&self.state);

        let found = state
            .handlers
            .iter()
            .position(|handler| self.handler_matches(&target, handler));

        if let Some(idx) = found {
            let handler = &mut state.handlers[idx];

            tracing::debug!(
                "Matched handler with id={} ({}) to the following request: {:#?}",
                handler.id,
                handler.describe(),
                req
            );

            handler.record_call(req);
            return Resolution::Matched(handler.response.clone());
        }

        if let Some(closest) = self.closest_handler(&target, &state.handlers) {
            tracing::debug!(
                "Closest handler for unmatched request {} {} is {}: {:#?}",
                req.method(),
                req.url(),
                closest.0,
                closest.1
            );
        }

        tracing::warn!(
            "Could not match any handler of {} to the following request: {} {}",
            self.base_url.as_str(),
            req.method(),
            req.url()
        );

        if self.history_limit > 0 {
            if state.unmatched.len() >= self.history_limit {
                state.unmatched.pop_front();
            }
            state.unmatched.push_back(req);
        }

        Resolution::NotFound
    }

    /// Finds the unmatched request that comes closest to the given handler.
    pub fn closest_match(&self, id: usize) -> Option<ClosestMatch> {
        let state = lock(&self.state);

        let handler = state.handlers.iter().find(|h| h.id == id)?;

        state
            .unmatched
            .iter()
            .enumerate()
            .filter_map(|(idx, req)| {
                let target = self.match_target(req)?;
                let mismatches = self.mismatches(&target, handler);
                let score = score(&mismatches);
                Some((score, idx, req, mismatches))
            })
            .min_by(|a, b| a.0.cmp(&b.0))
            .map(|(_, idx, req, mismatches)| ClosestMatch {
                request: req.clone(),
                request_index: idx,
                handler: handler.describe(),
                mismatches,
            })
    }

    /// Describes every handler that has never been called.
    pub fn uncalled_handlers(&self) -> Vec<(usize, String)> {
        lock(&self.state)
            .handlers
            .iter()
            .filter(|h| h.call_counter == 0)
            .map(|h| (h.id, h.describe()))
            .collect()
    }

    fn handler_matches(&self, target: &MatchTarget, handler: &HandlerRecord) -> bool {
        tracing::trace!("Matching request against handler {}", handler.describe());
        self.matchers.iter().all(|m| m.matches(target, handler))
    }

    fn mismatches(&self, target: &MatchTarget, handler: &HandlerRecord) -> Vec<Mismatch> {
        self.matchers
            .iter()
            .flat_map(|m| m.mismatches(target, handler))
            .collect()
    }

    fn closest_handler(
        &self,
        target: &MatchTarget,
        handlers: &[HandlerRecord],
    ) -> Option<(String, Vec<Mismatch>)> {
        handlers
            .iter()
            .map(|h| (h.describe(), self.mismatches(target, h)))
            .min_by(|a, b| score(&a.1).cmp(&score(&b.1)))
    }

    fn match_target(&self, req: &RequestPayload) -> Option<MatchTarget> {
        let url = Url::parse(req.url()).ok()?;
        let raw_segments = self.base_url.strip(&url)?;

        Some(MatchTarget {
            method: normalize_method(req.method()),
            path: format!("/{}", raw_segments.join("/")),
            segments: raw_segments
                .into_iter()
                .map(|s| decode(s).into_owned())
                .collect(),
            query: url.query().map(parse_query).unwrap_or_default(),
        })
    }
}

/// Orders candidates by number of failed checks first and by how far off the values are second.
fn score(mismatches: &[Mismatch]) -> (usize, usize) {
    (
        mismatches.len(),
        mismatches.iter().map(Mismatch::distance).sum(),
    )
}
