//! Run orchestration for jobscout.
//!
//! This crate provides:
//! - [`ExtractionPipeline`]: document snapshot → [`Record`](jobscout_shared::Record)
//! - [`ResultAggregator`]: records plus recomputed summary counts
//! - [`CollectionRunner`]: enumerate, fall back to manual identifiers, extract
//! - [`JobController`]: one job at a time with a serializable status
//! - [`CheckpointWriter`] and [`to_csv`] for the collaborator-side outputs

pub mod aggregator;
pub mod checkpoint;
pub mod export;
pub mod job;
pub mod pipeline;
pub mod run;

pub use aggregator::{ResultAggregator, summarize};
pub use checkpoint::{CheckpointWriter, read_checkpoint};
pub use export::{SENTENCE_JOINER, export_file_name, header, to_csv};
pub use job::{JobController, JobState, JobStatus, LogEntry, LogLevel, MAX_LOG_ENTRIES};
pub use pipeline::ExtractionPipeline;
pub use run::{
    CollectionRunner, IdentifierOrigin, RunProgress, RunReport, RunRequest, SilentRunProgress,
};

#[cfg(test)]
mod tests {
    use super::*;
    use jobscout_crawler::HttpPageSource;
    use jobscout_shared::{AppConfig, CategoryLabel, Identifier, SourceConfig};
    use wiremock::matchers::{method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    const POSTING: &str = include_str!("../../../../fixtures/html/job_posting.html");

    /// Full run over HTTP: two listing positions, then both item pages.
    #[tokio::test]
    async fn http_run_end_to_end() {
        let server = MockServer::start().await;

        for (start, id) in [("0", "4176105597"), ("1", "4191492284")] {
            Mock::given(method("GET"))
                .and(path("/jobs/search/"))
                .and(query_param("start", start))
                .respond_with(ResponseTemplate::new(200).set_body_string(format!(
                    r#"<ul><li class="base-card"><a href="/jobs/view/{id}/">Job</a></li></ul>"#
                )))
                .mount(&server)
                .await;
        }
        Mock::given(method("GET"))
            .and(path("/jobs/view/4176105597/"))
            .respond_with(ResponseTemplate::new(200).set_body_string(POSTING))
            .mount(&server)
            .await;
        // Served once while enumerating, gone by the time it is fetched.
        Mock::given(method("GET"))
            .and(path("/jobs/view/4191492284/"))
            .respond_with(ResponseTemplate::new(200).set_body_string("<html></html>"))
            .up_to_n_times(1)
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(path("/jobs/view/4191492284/"))
            .respond_with(ResponseTemplate::new(404))
            .mount(&server)
            .await;

        let mut config = AppConfig::default();
        config.source.item_url_template = format!("{}/jobs/view/{{id}}/", server.uri());
        config.pacing.position_min_ms = 0;
        config.pacing.position_max_ms = 0;
        config.pacing.record_min_ms = 0;
        config.pacing.record_max_ms = 0;

        let runner = CollectionRunner::from_config(&config).unwrap();
        let mut source = HttpPageSource::new(&SourceConfig::from(&config)).unwrap();
        let request = RunRequest {
            query: format!("{}/jobs/search/?keywords=cloud", server.uri()),
            limit: Some(2),
            manual_identifiers: vec![Identifier::new("1").unwrap()],
            ..RunRequest::default()
        };

        let report = runner.run(&mut source, &request, &SilentRunProgress).await.unwrap();

        assert_eq!(report.origin, IdentifierOrigin::Collected);
        let records = report.aggregator.records();
        assert_eq!(records.len(), 2);
        assert_eq!(records[0].title, "Senior Cloud Platform Engineer");
        // 404 is transient: the record is built from sentinels.
        assert_eq!(records[1].title, "Unknown Title");

        let summary = report.aggregator.summary();
        assert_eq!(summary.total_records, 2);
        assert_eq!(summary.count(CategoryLabel::CloudProviderA), 1);
        assert!(!to_csv(records).unwrap().is_empty());
    }
}
