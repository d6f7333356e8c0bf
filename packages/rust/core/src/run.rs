//! End-to-end collection run: enumerate → fetch → extract → aggregate.

use std::time::{Duration, Instant};

use tracing::{info, instrument, warn};

use jobscout_crawler::{
    CollectProgress, CollectResult, DocumentSnapshot, Pacer, PageSource, PositionalCollector,
};
use jobscout_shared::{
    AppConfig, Identifier, JobScoutError, Position, Record, Result, RunId, SourceConfig,
};

use crate::aggregator::ResultAggregator;
use crate::pipeline::ExtractionPipeline;

/// What to collect.
#[derive(Debug, Clone, Default)]
pub struct RunRequest {
    /// Fresh per request; tags logs, the report and job status.
    pub run_id: RunId,
    /// Listing query (absolute URL or bare query string). Empty skips enumeration.
    pub query: String,
    /// Stop after this many identifiers; `None` is unbounded.
    pub limit: Option<usize>,
    pub start: Position,
    /// Used only when enumeration yields nothing.
    pub manual_identifiers: Vec<Identifier>,
}

/// Where the processed identifiers came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IdentifierOrigin {
    Collected,
    Manual,
}

/// Result of a completed run.
#[derive(Debug)]
pub struct RunReport {
    pub run_id: RunId,
    pub origin: IdentifierOrigin,
    /// Enumeration result, if enumeration ran.
    pub collection: Option<CollectResult>,
    pub aggregator: ResultAggregator,
    pub duration: Duration,
}

/// Progress callback for a whole run. Extends the collection observer.
pub trait RunProgress: CollectProgress {
    /// Called when entering a new phase.
    fn phase(&self, _name: &str) {}

    /// Called after each record is built.
    fn on_record(&self, _record: &Record, _current: usize, _total: usize) {}
}

/// No-op progress for headless/test usage.
pub struct SilentRunProgress;

impl CollectProgress for SilentRunProgress {}
impl RunProgress for SilentRunProgress {}

/// Holds everything a run needs besides the page source.
pub struct CollectionRunner {
    collector: PositionalCollector,
    pipeline: ExtractionPipeline,
    pacer: Pacer,
    source: SourceConfig,
}

impl CollectionRunner {
    pub fn new(
        collector: PositionalCollector,
        pipeline: ExtractionPipeline,
        pacer: Pacer,
        source: SourceConfig,
    ) -> Self {
        Self {
            collector,
            pipeline,
            pacer,
            source,
        }
    }

    /// Build a runner with the default pipeline from loaded configuration.
    pub fn from_config(config: &AppConfig) -> Result<Self> {
        let pacer = Pacer::new(config.into());
        let collector = PositionalCollector::new(config.into(), pacer)?;
        Ok(Self::new(
            collector,
            ExtractionPipeline::default(),
            pacer,
            config.into(),
        ))
    }

    pub fn pipeline(&self) -> &ExtractionPipeline {
        &self.pipeline
    }

    /// Run once against `source`. The source is closed on every exit path.
    #[instrument(
        skip_all,
        fields(
            run_id = %request.run_id,
            source = source.name(),
            limit = ?request.limit,
            start = request.start,
        )
    )]
    pub async fn run<P: RunProgress>(
        &self,
        source: &mut dyn PageSource,
        request: &RunRequest,
        progress: &P,
    ) -> Result<RunReport> {
        let result = self.run_inner(source, request, progress).await;

        if let Err(e) = source.close().await {
            warn!(error = %e, "failed to close page source");
        }
        if let Err(e) = &result {
            warn!(error = %e, "run ended with error");
        }
        result
    }

    async fn run_inner<P: RunProgress>(
        &self,
        source: &mut dyn PageSource,
        request: &RunRequest,
        progress: &P,
    ) -> Result<RunReport> {
        let started = Instant::now();

        let collection = if request.query.trim().is_empty() {
            None
        } else {
            progress.phase("Collecting identifiers");
            let result = self
                .collector
                .collect(source, &request.query, request.limit, request.start, progress)
                .await?;
            Some(result)
        };

        let collected: &[Identifier] = collection
            .as_ref()
            .map(|c| c.identifiers.as_slice())
            .unwrap_or_default();

        let (ids, origin) = if !collected.is_empty() {
            (collected.to_vec(), IdentifierOrigin::Collected)
        } else if !request.manual_identifiers.is_empty() {
            info!(count = request.manual_identifiers.len(), "no identifiers collected, using manual list");
            (request.manual_identifiers.clone(), IdentifierOrigin::Manual)
        } else {
            return Err(JobScoutError::NoResults(
                "no identifiers collected and no manual list given".into(),
            ));
        };

        progress.phase("Extracting records");
        let mut aggregator = ResultAggregator::new();
        let total = ids.len();

        for (index, id) in ids.into_iter().enumerate() {
            if index > 0 {
                self.pacer.between_records().await;
            }

            let url = self.source.item_url(id.as_str());
            let snapshot = match source.navigate(&url).await {
                Ok(snapshot) => snapshot,
                Err(e) if e.is_transient() => {
                    warn!(id = %id, error = %e, "item fetch failed, recording sentinels");
                    DocumentSnapshot {
                        location: url,
                        ..DocumentSnapshot::default()
                    }
                }
                Err(e) => return Err(e),
            };

            let record = self.pipeline.build(id, &snapshot);
            progress.on_record(&record, index + 1, total);
            aggregator.add(record);
        }

        let report = RunReport {
            run_id: request.run_id.clone(),
            origin,
            collection,
            aggregator,
            duration: started.elapsed(),
        };

        let summary = report.aggregator.summary();
        info!(
            records = summary.total_records,
            origin = ?report.origin,
            duration_ms = report.duration.as_millis() as u64,
            "run complete"
        );

        Ok(report)
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use std::collections::HashMap;
    use std::sync::Mutex;

    use async_trait::async_trait;
    use jobscout_crawler::{ElementHandle, ElementQuery, find_in_html};
    use jobscout_shared::{CategoryLabel, CollectorConfig, PacingConfig};

    const UNRESOLVABLE: &str = include_str!("../../../../fixtures/html/unresolvable.html");
    const POSTING: &str = include_str!("../../../../fixtures/html/job_posting.html");

    /// In-memory source: known URLs serve their page, everything else the
    /// unresolvable page. Activation follows the element's href.
    #[derive(Default)]
    pub(crate) struct FakeSource {
        pub pages: HashMap<String, String>,
        pub fail_after: Option<usize>,
        pub panics: bool,
        pub delay: Duration,
        pub navigations: usize,
        pub closed: bool,
        current: String,
    }

    impl FakeSource {
        pub fn page(mut self, url: &str, html: &str) -> Self {
            self.pages.insert(url.to_string(), html.to_string());
            self
        }
    }

    #[async_trait]
    impl PageSource for FakeSource {
        async fn navigate(&mut self, url: &str) -> Result<DocumentSnapshot> {
            if !self.delay.is_zero() {
                tokio::time::sleep(self.delay).await;
            }
            self.navigations += 1;
            if self.panics {
                panic!("page source crashed");
            }
            if self.fail_after.is_some_and(|n| self.navigations > n) {
                return Err(JobScoutError::Session("browser went away".into()));
            }
            self.current = url.to_string();
            let html = self.pages.get(url).map(String::as_str).unwrap_or(UNRESOLVABLE);
            Ok(DocumentSnapshot::from_html(url, html))
        }

        fn current_location(&self) -> String {
            self.current.clone()
        }

        async fn find_first(&mut self, query: &ElementQuery) -> Result<Option<ElementHandle>> {
            Ok(self
                .pages
                .get(&self.current)
                .and_then(|html| find_in_html(html, query)))
        }

        async fn activate(&mut self, element: &ElementHandle) -> Result<bool> {
            match &element.href {
                Some(href) => {
                    self.current = href.clone();
                    Ok(true)
                }
                None => Ok(false),
            }
        }

        async fn close(&mut self) -> Result<()> {
            self.closed = true;
            Ok(())
        }

        fn name(&self) -> &str {
            "fake"
        }
    }

    pub(crate) fn runner() -> CollectionRunner {
        let config = AppConfig::default();
        let collector_config = CollectorConfig {
            max_attempts: 50,
            ..CollectorConfig::from(&config)
        };
        CollectionRunner::new(
            PositionalCollector::new(collector_config, Pacer::none()).unwrap(),
            ExtractionPipeline::default(),
            Pacer::new(PacingConfig::none()),
            SourceConfig::from(&config),
        )
    }

    fn manual(n: usize) -> Vec<Identifier> {
        (0..n)
            .map(|i| Identifier::new(format!("40000000{i:02}")).unwrap())
            .collect()
    }

    fn listing(id: &str) -> String {
        format!(
            r#"<ul><li class="jobs-search-results__list-item">
                 <a href="https://www.linkedin.com/jobs/view/{id}/">Job</a></li></ul>"#
        )
    }

    #[derive(Default)]
    struct Recorder {
        phases: Mutex<Vec<String>>,
        records: Mutex<Vec<(usize, usize)>>,
    }

    impl CollectProgress for Recorder {}

    impl RunProgress for Recorder {
        fn phase(&self, name: &str) {
            self.phases.lock().unwrap().push(name.to_string());
        }

        fn on_record(&self, _record: &Record, current: usize, total: usize) {
            self.records.lock().unwrap().push((current, total));
        }
    }

    #[tokio::test]
    async fn manual_identifiers_with_unresolvable_documents() {
        let mut source = FakeSource::default();
        let request = RunRequest {
            manual_identifiers: manual(10),
            ..RunRequest::default()
        };

        let report = runner().run(&mut source, &request, &SilentRunProgress).await.unwrap();

        assert_eq!(report.origin, IdentifierOrigin::Manual);
        assert!(report.collection.is_none());
        assert_eq!(report.aggregator.summary().total_records, 10);
        for record in report.aggregator.records() {
            assert_eq!(record.title, "Unknown Title");
            assert_eq!(record.organization, "Unknown Company");
            assert_eq!(record.location, "Unknown Location");
            assert_eq!(record.country, "Unknown");
            assert!(record.classifications.iter().all(|(_, s)| s.is_empty()));
        }
        assert!(source.closed);
    }

    #[tokio::test]
    async fn collected_identifiers_are_fetched_in_order() {
        let base = "https://www.linkedin.com/jobs/search/?keywords=cloud";
        let mut source = FakeSource::default()
            .page(&format!("{base}&start=0"), &listing("111"))
            .page(&format!("{base}&start=1"), &listing("222"))
            .page("https://www.linkedin.com/jobs/view/222/", POSTING);
        let request = RunRequest {
            query: base.to_string(),
            limit: Some(2),
            manual_identifiers: manual(3),
            ..RunRequest::default()
        };
        let progress = Recorder::default();

        let report = runner().run(&mut source, &request, &progress).await.unwrap();

        assert_eq!(report.origin, IdentifierOrigin::Collected);
        let ids: Vec<&str> = report.aggregator.records().iter().map(|r| r.id.as_str()).collect();
        assert_eq!(ids, vec!["111", "222"]);
        assert_eq!(report.aggregator.records()[1].organization, "Northwind Traders");
        let summary = report.aggregator.summary();
        assert_eq!(summary.count(CategoryLabel::CloudProviderA), 1);
        assert_eq!(
            *progress.phases.lock().unwrap(),
            vec!["Collecting identifiers", "Extracting records"]
        );
        assert_eq!(*progress.records.lock().unwrap(), vec![(1, 2), (2, 2)]);
    }

    #[tokio::test]
    async fn empty_enumeration_falls_back_to_manual_list() {
        let mut source = FakeSource::default();
        let request = RunRequest {
            query: "keywords=cloud".into(),
            manual_identifiers: manual(2),
            ..RunRequest::default()
        };

        let report = runner().run(&mut source, &request, &SilentRunProgress).await.unwrap();
        assert_eq!(report.origin, IdentifierOrigin::Manual);
        assert!(report.collection.as_ref().unwrap().identifiers.is_empty());
        assert_eq!(report.aggregator.len(), 2);
    }

    #[tokio::test]
    async fn nothing_to_process_is_no_results() {
        let mut source = FakeSource::default();
        let request = RunRequest {
            query: "keywords=cloud".into(),
            ..RunRequest::default()
        };

        let err = runner().run(&mut source, &request, &SilentRunProgress).await.unwrap_err();
        assert!(matches!(err, JobScoutError::NoResults(_)));
        assert!(source.closed);
    }

    #[tokio::test]
    async fn session_loss_ends_the_run_and_closes_the_source() {
        let mut source = FakeSource {
            fail_after: Some(3),
            ..FakeSource::default()
        };
        let request = RunRequest {
            manual_identifiers: manual(5),
            ..RunRequest::default()
        };

        let err = runner().run(&mut source, &request, &SilentRunProgress).await.unwrap_err();
        assert!(matches!(err, JobScoutError::Session(_)));
        assert!(source.closed);
    }
}
