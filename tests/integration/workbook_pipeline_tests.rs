/*!
 * End-to-end pipeline tests on the sample workbook
 */

use twbtrans::errors::ErrorKind;
use twbtrans::providers::mock::{MockBehavior, MockProvider};
use twbtrans::extraction::RuleSet;
use twbtrans::translation::{plan_document, PipelineOptions, RetryPolicy, RunReport, TranslationPipeline};

use crate::common::{self, SAMPLE_UNITS, SAMPLE_WORKBOOK};

fn options(batch_size: usize) -> PipelineOptions {
    common::init_test_logging();
    PipelineOptions {
        target_language: "English".to_string(),
        batch_size,
        retry: RetryPolicy {
            max_retries: 3,
            backoff_base_ms: 1,
        },
    }
}

fn output_text(bytes: Vec<u8>) -> String {
    String::from_utf8(bytes).expect("output should be UTF-8")
}

#[tokio::test]
async fn test_run_withEchoProvider_shouldReturnInputByteForByte() {
    let rules = common::sample_rules();
    let provider = MockProvider::echo();
    let pipeline = TranslationPipeline::new(&rules, &provider, options(20));

    let output = pipeline.run(SAMPLE_WORKBOOK.as_bytes()).await.unwrap();

    assert_eq!(output.bytes, SAMPLE_WORKBOOK.as_bytes());
    assert_eq!(output.report.rewritten, 0);
    assert_eq!(provider.request_count(), 1);
}

#[tokio::test]
async fn test_run_shouldSubmitEveryDistinctTextOnceInDocumentOrder() {
    let rules = common::sample_rules();
    let provider = MockProvider::echo();
    let pipeline = TranslationPipeline::new(&rules, &provider, options(20));

    let output = pipeline.run(SAMPLE_WORKBOOK.as_bytes()).await.unwrap();

    assert_eq!(provider.submitted_texts(), SAMPLE_UNITS.to_vec());
    assert_eq!(output.report.units, SAMPLE_UNITS.len());
    assert_eq!(output.report.fragments, 16);
    assert_eq!(output.report.locations, 16);
    assert_eq!(output.report.references_followed, 7);
    assert_eq!(output.report.references_unmatched, 0);
}

#[tokio::test]
async fn test_run_withPrefixProvider_shouldGiveEveryLocationItsOwnTranslation() {
    let rules = common::sample_rules();
    let provider = MockProvider::prefix("T");
    let pipeline = TranslationPipeline::new(&rules, &provider, options(20));

    let output = output_text(pipeline.run(SAMPLE_WORKBOOK.as_bytes()).await.unwrap().bytes);

    assert!(output.contains("<datasource caption='TMüügiandmed'"));
    assert!(output.contains("caption='TPiirkond'"));
    assert!(output.contains("value='TPõhja'"));
    assert!(output.contains("value='TLõuna'"));
    assert!(output.contains("caption='TFiltreeri piirkond'"));
    assert!(output.contains("<run bold='true'>TAasta muutus</run>"));
    assert!(output.contains("<run fontsize='9'>TPiirkond &amp; aasta</run>"));

    // The sheet and every reference to it share one translation
    assert_eq!(output.matches("name='TAasta muutus'").count(), 5);
    assert_eq!(output.matches("worksheet='TAasta muutus'").count(), 1);
    assert_eq!(output.matches("name='TÜlevaade'").count(), 2);
    assert_eq!(output.matches("dashboard='TÜlevaade'").count(), 1);
    assert_eq!(output.matches("'Aasta muutus'").count(), 0);
}

#[tokio::test]
async fn test_run_withExclusions_shouldNeverSubmitOrChangeExcludedTexts() {
    let rules = common::sample_rules();
    let provider = MockProvider::prefix("T");
    let pipeline = TranslationPipeline::new(&rules, &provider, options(20));

    let output = output_text(pipeline.run(SAMPLE_WORKBOOK.as_bytes()).await.unwrap().bytes);

    let submitted = provider.submitted_texts();
    assert!(!submitted.iter().any(|text| text == "Kokku" || text == "Tartu"));
    assert!(output.contains("caption='Kokku'"));
    assert!(output.contains("<worksheet name='Tartu'>"));
    assert!(output.contains("id='4' name='Tartu'"));

    // Exclusions are passed on as terms to keep
    let requests = provider.requests();
    assert_eq!(requests[0].preserve_terms, vec!["Kokku", "Tartu"]);
}

#[tokio::test]
async fn test_run_withDictionary_shouldRenameSheetAndLeaveEverythingElseUntouched() {
    let rules = common::sample_rules();
    let provider = MockProvider::dictionary([("Aasta muutus", "Year Change")]);
    let pipeline = TranslationPipeline::new(&rules, &provider, options(20));

    let output = pipeline.run(SAMPLE_WORKBOOK.as_bytes()).await.unwrap();

    let expected = SAMPLE_WORKBOOK
        .replace("'Aasta muutus'", "'Year Change'")
        .replace(">Aasta muutus<", ">Year Change<");
    assert_eq!(output_text(output.bytes), expected);
    assert_eq!(output.report.rewritten, 7);
}

#[tokio::test]
async fn test_run_withSmallBatches_shouldSplitUnitsInOrder() {
    let rules = common::sample_rules();
    let provider = MockProvider::echo();
    let pipeline = TranslationPipeline::new(&rules, &provider, options(3));
    let mut progress = Vec::new();

    let output = pipeline
        .run_with_progress(SAMPLE_WORKBOOK.as_bytes(), |p| progress.push((p.completed, p.total, p.units)))
        .await
        .unwrap();

    let sizes: Vec<usize> = provider.requests().iter().map(|r| r.texts.len()).collect();
    assert_eq!(sizes, vec![3, 3, 2]);
    assert_eq!(progress, vec![(1, 3, 3), (2, 3, 3), (3, 3, 2)]);
    assert_eq!(output.report.batches, 3);
    assert_eq!(provider.submitted_texts(), SAMPLE_UNITS.to_vec());
}

#[tokio::test]
async fn test_run_withMissingTranslation_shouldFailWithLengthMismatch() {
    let rules = common::sample_rules();
    let provider = MockProvider::new(MockBehavior::DropLast);
    let pipeline = TranslationPipeline::new(&rules, &provider, options(20));

    let error = pipeline.run(SAMPLE_WORKBOOK.as_bytes()).await.unwrap_err();

    assert_eq!(error.kind(), ErrorKind::GatewayLengthMismatch);
    // Never retried
    assert_eq!(provider.request_count(), 1);
}

#[tokio::test]
async fn test_run_withTransientFailures_shouldRetryAndSucceed() {
    let rules = common::sample_rules();
    let provider = MockProvider::new(MockBehavior::FailTransient { times: 2 });
    let pipeline = TranslationPipeline::new(&rules, &provider, options(20));

    let output = pipeline.run(SAMPLE_WORKBOOK.as_bytes()).await.unwrap();

    assert_eq!(output.bytes, SAMPLE_WORKBOOK.as_bytes());
    assert_eq!(provider.request_count(), 3);
}

#[tokio::test]
async fn test_run_withPersistentFailure_shouldStopAfterRetries() {
    let rules = common::sample_rules();
    let provider = MockProvider::failing();
    let pipeline = TranslationPipeline::new(&rules, &provider, options(20));

    let error = pipeline.run(SAMPLE_WORKBOOK.as_bytes()).await.unwrap_err();

    assert_eq!(error.kind(), ErrorKind::GatewayTransportFailure);
    assert_eq!(provider.request_count(), 4);
}

#[tokio::test]
async fn test_run_withTruncatedInput_shouldFailBeforeCallingProvider() {
    let rules = common::sample_rules();
    let provider = MockProvider::echo();
    let pipeline = TranslationPipeline::new(&rules, &provider, options(20));
    let truncated = &SAMPLE_WORKBOOK.as_bytes()[..SAMPLE_WORKBOOK.len() / 2];

    let error = pipeline.run(truncated).await.unwrap_err();

    assert_eq!(error.kind(), ErrorKind::MalformedInputXml);
    assert_eq!(provider.request_count(), 0);
}

#[tokio::test]
async fn test_run_withWhitespaceVariants_shouldSubmitEachExactText() {
    let source = "<workbook><column caption='Kokku'/><column caption=' Kokku'/>\
                  <run>Kokku </run><column caption='Kokku'/></workbook>";
    let rules = RuleSet::default();
    let provider = MockProvider::dictionary([("Kokku", "Total"), (" Kokku", "Total"), ("Kokku ", "Total")]);
    let pipeline = TranslationPipeline::new(&rules, &provider, options(20));

    let output = pipeline.run(source.as_bytes()).await.unwrap();

    assert_eq!(provider.submitted_texts(), vec!["Kokku", " Kokku", "Kokku "]);
    assert_eq!(
        output_text(output.bytes),
        "<workbook><column caption='Total'/><column caption=' Total'/>\
         <run>Total </run><column caption='Total'/></workbook>"
    );
}

#[tokio::test]
async fn test_run_withControlCharacterInTranslation_shouldFailAsMalformedOutput() {
    let rules = common::sample_rules();
    let provider = MockProvider::dictionary([("Piirkond", "Re\u{1}gion")]);
    let pipeline = TranslationPipeline::new(&rules, &provider, options(20));

    let error = pipeline.run(SAMPLE_WORKBOOK.as_bytes()).await.unwrap_err();

    assert_eq!(error.kind(), ErrorKind::MalformedOutputXml);
}

#[test]
fn test_plan_document_shouldReportWithoutProvider() {
    let rules = common::sample_rules();
    let (_, plan) = plan_document(SAMPLE_WORKBOOK.as_bytes(), &rules).unwrap();

    let report = RunReport::planned(&plan, &rules, 5);

    assert_eq!(report.units, 8);
    assert_eq!(report.batches, 2);
    assert_eq!(report.rewritten, 0);
    assert!(report.per_rule.contains(&("worksheet@name".to_string(), 1)));
    assert!(report.per_rule.contains(&("run#text".to_string(), 2)));
    assert!(report.to_string().contains("Translation units:   8"));
}
