//! Integration tests for the Extractor

#[cfg(test)]
mod tests {
    use crate::chunking::testing::BytePageCodec;
    use crate::pdf::testing::{make_test_pdf, page_contents};
    use crate::progress::testing::CollectingObserver;
    use crate::retry::testing::RecordingSleeper;
    use crate::{
        AnalysisClient, ExtractionStatus, Extractor, ExtractorConfig, ExtractorError,
        FailureClass, LopdfCodec, Strategy,
    };
    use serde_json::json;
    use sift_domain::{
        Document, ExtractionRequest, ProgressObserver, ProgressPhase, Sentiment, PDF_MIME_TYPE,
    };
    use sift_llm::{LlmError, MockProvider};
    use std::sync::Arc;
    use std::time::Duration;

    fn config_with_page_bound(max_pages: usize) -> ExtractorConfig {
        ExtractorConfig {
            max_pages_per_chunk: max_pages,
            ..ExtractorConfig::default()
        }
    }

    fn pdf_extractor(
        mock: &MockProvider,
        config: ExtractorConfig,
        sleeper: Arc<RecordingSleeper>,
    ) -> Extractor<MockProvider, LopdfCodec> {
        Extractor::with_parts(Arc::new(mock.clone()), LopdfCodec, config, sleeper).unwrap()
    }

    fn pdf_request(pages: usize) -> ExtractionRequest {
        ExtractionRequest::new("List every page label")
            .with_document(Document::new(PDF_MIME_TYPE, make_test_pdf(pages), "report.pdf"))
    }

    #[tokio::test]
    async fn test_paged_document_is_chunked_in_order() {
        let mock = MockProvider::default();
        mock.push_response(r#"[{"page": 1}]"#);
        mock.push_response(r#"[{"page": 2}, {"page": "2b"}]"#);
        mock.push_response(r#"[{"page": 3}]"#);
        let sleeper = RecordingSleeper::new();

        let extractor = pdf_extractor(&mock, config_with_page_bound(1), sleeper.clone());
        let result = extractor.extract(&pdf_request(3), &[]).await.unwrap();

        assert_eq!(result.metadata.strategy, Strategy::PagedChunks);
        assert_eq!(result.metadata.chunk_count, 3);
        assert_eq!(mock.call_count(), 3);
        assert_eq!(sleeper.slept(), vec![Duration::from_secs(4); 2]);

        let pages: Vec<_> = result.records.iter().map(|r| r["page"].clone()).collect();
        assert_eq!(pages, vec![json!(1), json!(2), json!("2b"), json!(3)]);

        for (i, request) in mock.requests().iter().enumerate() {
            assert_eq!(request.parts.len(), 1);
            assert_eq!(request.parts[0].mime_type, PDF_MIME_TYPE);
            let contents = page_contents(&request.parts[0].data);
            assert_eq!(contents.len(), 1);
            assert!(contents[0].contains(&format!("(Page {})", i + 1)));
            assert!(request.instruction.contains(&format!("part {} of 3", i + 1)));
        }
    }

    #[tokio::test]
    async fn test_multiple_documents_are_compared_in_one_call() {
        let mock = MockProvider::new(r#"[{"diff": "price"}]"#);
        let codec = BytePageCodec::default();
        let extractor = Extractor::with_parts(
            Arc::new(mock.clone()),
            codec.clone(),
            config_with_page_bound(1),
            RecordingSleeper::new(),
        )
        .unwrap();

        let request = ExtractionRequest::new("Compare the quotes")
            .with_text("Focus on totals")
            .with_document(Document::new(PDF_MIME_TYPE, b"abcdef".to_vec(), "a.pdf"))
            .with_document(Document::new(PDF_MIME_TYPE, b"ghijkl".to_vec(), "b.pdf"));

        let result = extractor.extract(&request, &[]).await.unwrap();

        assert_eq!(result.metadata.strategy, Strategy::Comparison);
        assert_eq!(codec.loads(), 0);
        assert_eq!(mock.call_count(), 1);

        let sent = &mock.requests()[0];
        assert_eq!(sent.parts.len(), 2);
        assert_eq!(sent.context_text.as_deref(), Some("Focus on totals"));
    }

    #[tokio::test]
    async fn test_long_text_is_chunked() {
        let mock = MockProvider::new(r#"[{"ok": true}]"#);
        let sleeper = RecordingSleeper::new();
        let config = ExtractorConfig {
            max_text_chars: 10,
            throttle_delay_ms: 500,
            ..ExtractorConfig::default()
        };
        let extractor = Extractor::with_parts(
            Arc::new(mock.clone()),
            BytePageCodec::default(),
            config,
            sleeper.clone(),
        )
        .unwrap();

        let text = "0123456789abcdefghijKLMNO";
        let result = extractor
            .extract(&ExtractionRequest::new("all").with_text(text), &[])
            .await
            .unwrap();

        assert_eq!(result.metadata.strategy, Strategy::TextChunks);
        assert_eq!(result.records.len(), 3);

        let pieces: Vec<String> = mock
            .requests()
            .iter()
            .map(|r| r.context_text.clone().unwrap())
            .collect();
        assert_eq!(pieces, vec!["0123456789", "abcdefghij", "KLMNO"]);
        assert_eq!(sleeper.slept(), vec![Duration::from_millis(500); 2]);
    }

    #[tokio::test]
    async fn test_corrupt_document_falls_back_to_single_shot() {
        let mock = MockProvider::new(r#"[{"a": 1}]"#);
        let extractor = pdf_extractor(&mock, config_with_page_bound(1), RecordingSleeper::new());

        let request = ExtractionRequest::new("anything").with_document(Document::new(
            PDF_MIME_TYPE,
            b"%PDF-1.4 truncated garbage".to_vec(),
            "broken.pdf",
        ));
        let result = extractor.extract(&request, &[]).await.unwrap();

        assert_eq!(result.metadata.strategy, Strategy::SingleShot);
        assert_eq!(result.records.len(), 1);
        assert_eq!(mock.call_count(), 1);
        assert_eq!(
            mock.requests()[0].parts[0].data,
            b"%PDF-1.4 truncated garbage".to_vec()
        );
    }

    #[tokio::test]
    async fn test_damaged_page_mid_document_throttles_before_fallback() {
        let mock = MockProvider::new(r#"[{"a": 1}]"#);
        let sleeper = RecordingSleeper::new();
        let extractor = Extractor::with_parts(
            Arc::new(mock.clone()),
            BytePageCodec::default(),
            config_with_page_bound(1),
            sleeper.clone(),
        )
        .unwrap();

        let request = ExtractionRequest::new("anything")
            .with_document(Document::new(PDF_MIME_TYPE, b"ab!".to_vec(), "torn.pdf"));
        let result = extractor.extract(&request, &[]).await.unwrap();

        assert_eq!(result.metadata.strategy, Strategy::SingleShot);
        assert_eq!(result.records.len(), 1);
        assert_eq!(mock.call_count(), 3);
        assert_eq!(mock.requests()[2].parts[0].data, b"ab!".to_vec());
        assert_eq!(sleeper.slept(), vec![Duration::from_secs(4); 2]);
    }

    #[tokio::test]
    async fn test_failure_mid_chunk_aborts_and_reports_error() {
        let mock = MockProvider::default();
        mock.push_response(r#"[{"page": 1}]"#);
        mock.push_error(LlmError::SafetyBlocked("SAFETY".to_string()));
        let observer = CollectingObserver::default();
        let observers: [&dyn ProgressObserver; 1] = [&observer];

        let extractor = pdf_extractor(&mock, config_with_page_bound(1), RecordingSleeper::new());
        let result = extractor.extract(&pdf_request(3), &observers).await;

        match result {
            Err(ExtractorError::Oracle { class, attempts, .. }) => {
                assert_eq!(class, FailureClass::Safety);
                assert_eq!(attempts, 1);
            }
            other => panic!("expected oracle failure, got {:?}", other),
        }
        assert_eq!(mock.call_count(), 2);

        let states = observer.states();
        let last = states.last().unwrap();
        assert_eq!(last.phase, ProgressPhase::Error);
        assert!(last.percent < 100);
        assert!(last.status.contains("safety"));
    }

    #[tokio::test]
    async fn test_quota_inside_chunk_is_retried() {
        let mock = MockProvider::new(r#"[{"x": 1}]"#);
        mock.push_response(r#"[{"x": 1}]"#);
        mock.push_error(LlmError::RateLimitExceeded("quota".to_string()));
        let sleeper = RecordingSleeper::new();

        let extractor = pdf_extractor(&mock, config_with_page_bound(1), sleeper.clone());
        let result = extractor.extract(&pdf_request(2), &[]).await.unwrap();

        assert_eq!(result.records.len(), 2);
        assert_eq!(result.metadata.oracle_calls, 3);
        assert_eq!(
            sleeper.slept(),
            vec![Duration::from_secs(4), Duration::from_secs(10)]
        );
    }

    #[tokio::test]
    async fn test_progress_is_monotonic() {
        let mock = MockProvider::new(r#"[{"x": 1}]"#);
        let first = CollectingObserver::default();
        let second = CollectingObserver::default();
        let observers: [&dyn ProgressObserver; 2] = [&first, &second];

        let extractor = pdf_extractor(&mock, config_with_page_bound(2), RecordingSleeper::new());
        extractor.extract(&pdf_request(7), &observers).await.unwrap();

        let percents = first.percents();
        assert_eq!(percents.first(), Some(&10));
        assert_eq!(percents.last(), Some(&100));
        assert!(percents.windows(2).all(|w| w[0] <= w[1]));
        assert!(percents.contains(&95));
        assert_eq!(first.states(), second.states());
        assert_eq!(first.states().last().unwrap().phase, ProgressPhase::Complete);
    }

    #[tokio::test]
    async fn test_single_shot_progress() {
        let mock = MockProvider::new(r#"[{"x": 1}]"#);
        let observer = CollectingObserver::default();
        let observers: [&dyn ProgressObserver; 1] = [&observer];

        let extractor = pdf_extractor(&mock, ExtractorConfig::default(), RecordingSleeper::new());
        extractor
            .extract(&ExtractionRequest::new("x").with_text("some text"), &observers)
            .await
            .unwrap();

        let percents = observer.percents();
        assert_eq!(percents.first(), Some(&10));
        assert_eq!(percents.last(), Some(&100));
    }

    #[tokio::test]
    async fn test_no_records_found_is_success() {
        let mock = MockProvider::new("[]");
        let extractor = pdf_extractor(&mock, ExtractorConfig::default(), RecordingSleeper::new());

        let result = extractor
            .extract(&ExtractionRequest::new("unicorns").with_text("plain text"), &[])
            .await
            .unwrap();

        assert_eq!(result.status, ExtractionStatus::NoRecordsFound);
        assert!(result.records.is_empty());
    }

    #[tokio::test]
    async fn test_validation_happens_before_any_call() {
        let mock = MockProvider::default();
        let observer = CollectingObserver::default();
        let observers: [&dyn ProgressObserver; 1] = [&observer];
        let extractor = pdf_extractor(&mock, ExtractorConfig::default(), RecordingSleeper::new());

        let no_goal = ExtractionRequest::new("  ").with_text("text");
        assert_eq!(
            extractor.extract(&no_goal, &observers).await.unwrap_err(),
            ExtractorError::NoGoalProvided
        );

        let no_input = ExtractionRequest::new("goal");
        assert_eq!(
            extractor.extract(&no_input, &[]).await.unwrap_err(),
            ExtractorError::NoInputProvided
        );

        assert_eq!(mock.call_count(), 0);
        assert_eq!(observer.states().len(), 1);
        assert_eq!(observer.states()[0].phase, ProgressPhase::Error);
    }

    #[tokio::test]
    async fn test_missing_credential() {
        let mock = MockProvider::default().without_credential();
        let extractor = pdf_extractor(&mock, ExtractorConfig::default(), RecordingSleeper::new());

        let result = extractor
            .extract(&ExtractionRequest::new("goal").with_text("text"), &[])
            .await;

        assert_eq!(result.unwrap_err(), ExtractorError::MissingCredential);
        assert_eq!(mock.call_count(), 0);
    }

    #[tokio::test]
    async fn test_extract_then_analyze_with_failing_oracle() {
        let mock = MockProvider::new(r#"[{"name": "Alice", "zip": "02139"}]"#);
        let sleeper = RecordingSleeper::new();
        let extractor = pdf_extractor(&mock, ExtractorConfig::default(), sleeper.clone());

        let result = extractor
            .extract(&ExtractionRequest::new("people").with_text("Alice, 02139"), &[])
            .await
            .unwrap();
        assert_eq!(result.records[0]["zip"], json!("02139"));

        for _ in 0..4 {
            mock.push_error(LlmError::Http {
                status: 503,
                message: "overloaded".to_string(),
            });
        }
        let analysis = AnalysisClient::with_sleeper(
            Arc::new(mock.clone()),
            ExtractorConfig::default().analysis,
            sleeper,
        )
        .analyze(&result.records)
        .await;

        assert_eq!(analysis.sentiment, Sentiment::Neutral);
        assert!(!analysis.summary.is_empty());
    }
}
