use hemrisk::{Config, RiskService};
use hemrisk_core::{PatientFeatures, RiskCategory};
use hemrisk_model::{score, Classifier, Estimator, ModelArtifact, ModelCache};
use tests::{demo_config_path, demo_model_path, request};

fn init_logging() {
    let _ = env_logger::builder().is_test(true).try_init();
}

fn demo_service() -> RiskService {
    init_logging();
    RiskService::new(Config::load(demo_config_path()).unwrap()).unwrap()
}

#[test]
fn demo_artifact_loads_and_matches_training_columns() {
    init_logging();
    let artifact = ModelArtifact::load(demo_model_path()).unwrap();
    assert_eq!(artifact.name, "ipn-hemorrhage-stack");
    assert_eq!(
        artifact.feature_names.as_deref().unwrap(),
        ModelArtifact::expected_columns()
            .into_iter()
            .map(String::from)
            .collect::<Vec<_>>()
            .as_slice()
    );
    assert!(matches!(
        artifact.estimator,
        Estimator::Stacking {
            passthrough: false,
            ..
        }
    ));
}

#[test]
fn demo_config_uses_reference_thresholds() {
    let config = Config::load(demo_config_path()).unwrap();
    assert_eq!(config.thresholds.low, 10.0);
    assert_eq!(config.thresholds.high, 50.0);
    assert_eq!(config.report.institution, "Xiangya Hospital");
    assert_eq!(config.model.path, demo_model_path());
}

#[test]
fn demo_model_spans_all_three_bands() {
    let service = demo_service();
    let cases = [
        ([0, 0, 0, 0, 60, 0, 0], RiskCategory::Low),
        ([1, 0, 0, 1, 54, 2, 30], RiskCategory::Intermediate),
        ([2, 1, 1, 1, 67, 6, 18], RiskCategory::High),
    ];
    for (values, expected) in cases {
        let resp = service.handle_predict_request(&request(values)).unwrap();
        assert_eq!(resp.assessment.category(), expected, "patient {values:?}");
    }
}

#[test]
fn worse_presentation_scores_higher() {
    let model = ModelArtifact::load(demo_model_path()).unwrap();
    let mild = PatientFeatures::new(0, 0, 0, 0, 45, 0, 10).unwrap();
    let severe = PatientFeatures::new(2, 1, 1, 1, 45, 9, 10).unwrap();
    let p_mild = score(&model, &mild.to_vector()).unwrap();
    let p_severe = score(&model, &severe.to_vector()).unwrap();
    assert!(p_severe > p_mild);
}

#[test]
fn cache_serves_the_same_model_to_every_request() {
    init_logging();
    let cache = ModelCache::new(demo_model_path());
    assert!(!cache.is_loaded());
    let first = cache.get().unwrap();
    let second = cache.get().unwrap();
    assert!(std::sync::Arc::ptr_eq(&first, &second));
    assert_eq!(first.name(), "ipn-hemorrhage-stack");
}

#[test]
fn repeated_requests_give_identical_results() {
    let service = demo_service();
    let a = service.handle_predict_request(&request([1, 1, 0, 0, 70, 3, 21])).unwrap();
    let b = service.handle_predict_request(&request([1, 1, 0, 0, 70, 3, 21])).unwrap();
    assert_eq!(a, b);
}
