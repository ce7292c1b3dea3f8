//! Per-user search state: the input box, the last result, and busy flags.
//!
//! Each submitted search takes a new sequence number. A search only writes
//! to the shared state while it is still the latest one, so a slow lookup
//! can never overwrite the results of a search started after it.
//!
//! Every change to the state is also published on a `watch` channel, so a
//! front end can redraw busy indicators without polling.

use chrono::{Local, Timelike};
use tokio::sync::{Mutex, watch};
use tracing::{debug, info};

use crate::{CityName, WeatherError, WeatherProvider, WeatherRecord, summary::Summarizer};

/// What the presentation layer renders.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SessionState {
    pub input: String,
    pub record: Option<WeatherRecord>,
    /// User-facing message of the last failed search.
    pub error: Option<String>,
    pub summary: Option<String>,
    /// A weather lookup is in flight.
    pub is_loading: bool,
    /// Summary generation is in flight.
    pub is_summarizing: bool,
}

#[derive(Debug)]
pub enum SearchOutcome {
    /// Input was blank; nothing was fetched.
    Ignored,
    Found { record: WeatherRecord, summary: String },
    Failed(WeatherError),
    /// A newer search started before this one finished; its results were dropped.
    Superseded,
}

#[derive(Debug, Default)]
struct Inner {
    view: SessionState,
    latest_search: u64,
}

#[derive(Debug)]
pub struct SearchSession {
    provider: Box<dyn WeatherProvider>,
    summarizer: Summarizer,
    inner: Mutex<Inner>,
    updates: watch::Sender<SessionState>,
}

impl SearchSession {
    pub fn new(provider: Box<dyn WeatherProvider>, summarizer: Summarizer) -> Self {
        let (updates, _) = watch::channel(SessionState::default());
        Self { provider, summarizer, inner: Mutex::new(Inner::default()), updates }
    }

    pub async fn snapshot(&self) -> SessionState {
        self.inner.lock().await.view.clone()
    }

    /// Receiver that sees every state change made after this call.
    pub fn subscribe(&self) -> watch::Receiver<SessionState> {
        self.updates.subscribe()
    }

    /// The user edited the city field.
    pub async fn set_input(&self, text: impl Into<String>) {
        let mut inner = self.inner.lock().await;
        inner.view.input = text.into();
        self.publish(&inner.view);
    }

    /// Search for the current input, using the local wall-clock hour for the summary.
    pub async fn submit(&self) -> SearchOutcome {
        self.submit_at(Local::now().hour()).await
    }

    pub async fn submit_at(&self, now_hour: u32) -> SearchOutcome {
        let (city, search) = {
            let mut inner = self.inner.lock().await;
            let Some(city) = CityName::parse(&inner.view.input) else {
                debug!("blank input, search ignored");
                return SearchOutcome::Ignored;
            };

            inner.latest_search += 1;
            inner.view.is_loading = true;
            inner.view.error = None;
            self.publish(&inner.view);
            (city, inner.latest_search)
        };

        info!(%city, search, "searching");
        let fetched = self.provider.fetch_weather(&city).await;

        let record = {
            let mut inner = self.inner.lock().await;
            if inner.latest_search != search {
                debug!(search, "search superseded during fetch");
                return SearchOutcome::Superseded;
            }

            // Any summary still being generated belongs to an older search.
            let view = &mut inner.view;
            view.is_loading = false;
            view.is_summarizing = false;
            view.summary = None;

            let record = match fetched {
                Ok(record) => {
                    view.record = Some(record.clone());
                    view.error = None;
                    view.is_summarizing = true;
                    record
                }
                Err(err) => {
                    view.record = None;
                    view.error = Some(err.to_string());
                    self.publish(view);
                    return SearchOutcome::Failed(err);
                }
            };
            self.publish(view);
            record
        };

        let summary = self.summarizer.generate_summary(&record, now_hour).await;

        let mut inner = self.inner.lock().await;
        if inner.latest_search != search {
            debug!(search, "search superseded during summary generation");
            return SearchOutcome::Superseded;
        }
        inner.view.summary = Some(summary.clone());
        inner.view.is_summarizing = false;
        self.publish(&inner.view);

        SearchOutcome::Found { record, summary }
    }

    fn publish(&self, view: &SessionState) {
        self.updates.send_replace(view.clone());
    }
}
