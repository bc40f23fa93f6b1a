//! CLI runner - executes commands

use crate::cli::commands::{Cli, Commands, OutputFormat, SessionArgs};
use crate::config::PagingConfig;
use crate::error::{Error, Result, ResultExt};
use crate::fetcher::PagingEvent;
use crate::load_state::LoadState;
use crate::pager::{Pager, PagingCollector, PagingDataSink};
use crate::source::{HttpPagingSource, HttpSourceConfig, SampleSource};
use futures::StreamExt;
use serde::Serialize;
use serde_json::{json, Value};
use std::fmt::Debug;
use std::path::Path;
use std::time::{Duration, Instant};
use tracing::{debug, info, warn};

/// Outcome of one paging session
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct SessionSummary {
    /// Events received
    pub events: usize,
    /// Items held at the end
    pub items: usize,
    /// Pages held at the end
    pub pages: usize,
    /// Retries issued
    pub retries: u32,
    /// Whether the source reported no more data
    pub end_reached: bool,
    /// Error that ended the session, if any
    pub failure: Option<String>,
}

/// Drive a pager until the list is fully loaded, a page limit is hit, or a
/// failure can no longer be retried
///
/// Every event is handed to `on_event` before it is applied. The pager is
/// closed on return.
pub async fn run_session<K, T, F>(
    pager: &Pager<K, T>,
    args: &SessionArgs,
    mut on_event: F,
) -> (PagingCollector<T>, SessionSummary)
where
    K: Clone + Debug + Send + Sync + 'static,
    T: Clone + Send + 'static,
    F: FnMut(&PagingEvent<T>),
{
    let mut events = pager.events();
    let mut collector = PagingCollector::new();
    let mut summary = SessionSummary::default();
    let mut retries_left = args.retries;

    pager.refresh();

    while let Some(event) = events.next().await {
        on_event(&event);
        summary.events += 1;

        let load_type = event.load_type();
        collector.apply(event);

        let state = collector.load_states().get(load_type).clone();
        if !state.is_terminal() {
            continue;
        }

        match state {
            LoadState::Failure(error) => {
                if retries_left > 0 && error.is_retryable() {
                    retries_left -= 1;
                    summary.retries += 1;
                    info!("Retrying {load_type} after: {error}");
                    pager.retry();
                } else {
                    warn!("Giving up on {load_type}: {error}");
                    summary.failure = Some(error.to_string());
                    break;
                }
            }
            _ => {
                if collector.is_end_reached() {
                    debug!("End of list reached after {} pages", collector.pages());
                    break;
                }
                if args.max_pages.is_some_and(|max| collector.pages() >= max) {
                    debug!("Page limit reached at {} pages", collector.pages());
                    break;
                }
                let len = collector.len();
                pager.on_item_accessed(len.saturating_sub(1), len);
            }
        }
    }

    pager.close();

    summary.items = collector.len();
    summary.pages = collector.pages();
    summary.end_reached = collector.is_end_reached();
    (collector, summary)
}

/// CLI runner
pub struct Runner {
    cli: Cli,
}

impl Runner {
    /// Create a new runner
    pub fn new(cli: Cli) -> Self {
        Self { cli }
    }

    /// Run the CLI command
    pub async fn run(&self) -> Result<()> {
        match &self.cli.command {
            Commands::Demo {
                max_page,
                page_size,
                refresh_failures,
                append_failures,
                delay_ms,
                session,
            } => {
                let source = SampleSource::new(*max_page)
                    .with_refresh_failures(*refresh_failures)
                    .with_append_failures(*append_failures)
                    .with_delay(Duration::from_millis(*delay_ms));
                let pager = Pager::new(
                    PagingConfig::new(*page_size),
                    SampleSource::INITIAL_KEY,
                    source,
                )?;
                self.session(&pager, session).await
            }
            Commands::Fetch {
                source,
                config,
                session,
            } => self.fetch(source, config.as_deref(), session).await,
            Commands::Validate { config } => self.validate(config),
        }
    }

    /// Page through an HTTP endpoint
    async fn fetch(
        &self,
        source_path: &Path,
        config_path: Option<&Path>,
        session: &SessionArgs,
    ) -> Result<()> {
        let source_config = HttpSourceConfig::from_file(source_path)
            .with_context(|| format!("Loading source '{}'", source_path.display()))?;
        let config = match config_path {
            Some(path) => PagingConfig::from_file(path)
                .with_context(|| format!("Loading paging config '{}'", path.display()))?,
            None => PagingConfig::default(),
        };

        self.output_message(&json!({
            "type": "LOG",
            "log": {
                "level": "INFO",
                "message": format!("Fetching {} (page_size={})", source_config.url, config.page_size)
            }
        }));

        let source = HttpPagingSource::new(source_config)?;
        let init_key = source.initial_key();
        let pager = Pager::new(config, init_key, source)?;
        self.session(&pager, session).await
    }

    /// Run a session, printing each event and the summary
    async fn session<K, T>(&self, pager: &Pager<K, T>, args: &SessionArgs) -> Result<()>
    where
        K: Clone + Debug + Send + Sync + 'static,
        T: Clone + Send + Serialize + 'static,
    {
        let start = Instant::now();
        let (_, summary) = run_session(pager, args, |event| self.output_event(event)).await;

        self.output_message(&json!({
            "type": "SESSION_SUMMARY",
            "summary": summary,
            "duration_ms": start.elapsed().as_millis() as u64,
        }));

        match summary.failure {
            Some(failure) => Err(Error::Other(format!("Session failed: {failure}"))),
            None => Ok(()),
        }
    }

    /// Validate a paging config file
    fn validate(&self, path: &Path) -> Result<()> {
        let config = PagingConfig::from_file(path)?;

        self.output_message(&json!({
            "type": "LOG",
            "log": {
                "level": "INFO",
                "message": format!("Paging config '{}' is valid", path.display())
            }
        }));
        self.output_message(&json!({
            "type": "CONFIG",
            "config": config,
        }));

        Ok(())
    }

    fn output_event<T: Serialize>(&self, event: &PagingEvent<T>) {
        let states = event.states();
        match self.cli.format {
            OutputFormat::Json => self.output_message(&json!({
                "type": "EVENT",
                "event": {
                    "load_type": event.load_type().as_str(),
                    "refresh": states.refresh.to_string(),
                    "append": states.append.to_string(),
                    "items": event.data(),
                }
            })),
            OutputFormat::Pretty => {
                let delta = event
                    .data()
                    .map(|data| format!(" (+{} items)", data.len()))
                    .unwrap_or_default();
                println!("[{}] {states}{delta}", event.load_type());
            }
        }
    }

    fn output_message(&self, msg: &Value) {
        match self.cli.format {
            OutputFormat::Json => {
                println!("{}", serde_json::to_string(msg).unwrap_or_default());
            }
            OutputFormat::Pretty => {
                println!("{}", serde_json::to_string_pretty(msg).unwrap_or_default());
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::load_state::LoadType;
    use pretty_assertions::assert_eq;

    fn sample_pager(source: SampleSource) -> Pager<u32, String> {
        Pager::new(PagingConfig::new(2), SampleSource::INITIAL_KEY, source).unwrap()
    }

    #[tokio::test]
    async fn test_session_loads_everything() {
        let pager = sample_pager(SampleSource::new(3));
        let mut seen = Vec::new();

        let (collector, summary) =
            run_session(&pager, &SessionArgs::default(), |e| seen.push(e.load_type())).await;

        assert_eq!(
            summary,
            SessionSummary {
                events: 6,
                items: 6,
                pages: 3,
                retries: 0,
                end_reached: true,
                failure: None,
            }
        );
        assert_eq!(collector.items()[0], "Page 1 Item 0");
        assert_eq!(collector.items()[5], "Page 3 Item 1");
        assert_eq!(
            seen,
            vec![
                LoadType::Refresh,
                LoadType::Refresh,
                LoadType::Append,
                LoadType::Append,
                LoadType::Append,
                LoadType::Append,
            ]
        );
        assert!(pager.is_closed());
    }

    #[tokio::test]
    async fn test_session_retries_failed_append() {
        let pager = sample_pager(SampleSource::new(3).with_append_failures(1));
        let args = SessionArgs {
            retries: 1,
            max_pages: None,
        };

        let (_, summary) = run_session(&pager, &args, |_| {}).await;

        assert_eq!(summary.retries, 1);
        assert_eq!(summary.items, 6);
        assert!(summary.end_reached);
        assert_eq!(summary.failure, None);
    }

    #[tokio::test]
    async fn test_session_stops_on_failure_without_retries() {
        let pager = sample_pager(SampleSource::new(3).with_refresh_failures(1));

        let (collector, summary) = run_session(&pager, &SessionArgs::default(), |_| {}).await;

        assert_eq!(summary.events, 2);
        assert_eq!(summary.items, 0);
        assert!(!summary.end_reached);
        assert!(summary
            .failure
            .unwrap()
            .contains("simulated refresh failure for page 1"));
        assert!(collector.can_retry());
    }

    #[tokio::test]
    async fn test_session_page_limit() {
        let pager = sample_pager(SampleSource::new(10));
        let args = SessionArgs {
            retries: 0,
            max_pages: Some(2),
        };

        let (_, summary) = run_session(&pager, &args, |_| {}).await;

        assert_eq!(summary.pages, 2);
        assert_eq!(summary.items, 4);
        assert!(!summary.end_reached);
    }
}
