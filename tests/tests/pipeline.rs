use std::fs;

use hemrisk::{Config, PredictRequest, RiskError, RiskService};
use hemrisk_core::{ConfigurationError, Feature, RiskCategory, ValidationError};
use tests::{request, service_with, SAMPLE_PATIENT};

#[test]
fn low_probability_lands_in_low_band() {
    let (service, _) = service_with(0.05);
    let resp = service.handle_predict_request(&request([0, 0, 0, 0, 60, 0, 0])).unwrap();
    assert!((resp.assessment.percent() - 5.0).abs() < 1e-9);
    assert_eq!(resp.assessment.category(), RiskCategory::Low);
    assert_eq!(resp.assessment.low_threshold(), 10.0);
    assert_eq!(resp.assessment.high_threshold(), 50.0);
}

#[test]
fn lower_threshold_itself_is_intermediate() {
    let (service, _) = service_with(0.10);
    let resp = service.handle_predict_request(&request(SAMPLE_PATIENT)).unwrap();
    assert_eq!(resp.assessment.percent(), 10.0);
    assert_eq!(resp.assessment.category(), RiskCategory::Intermediate);
}

#[test]
fn upper_threshold_itself_is_high() {
    let (service, _) = service_with(0.50);
    let resp = service.handle_predict_request(&request(SAMPLE_PATIENT)).unwrap();
    assert_eq!(resp.assessment.percent(), 50.0);
    assert_eq!(resp.assessment.category(), RiskCategory::High);
}

#[test]
fn out_of_range_model_output_is_clamped() {
    let (service, _) = service_with(1.5);
    let resp = service.handle_predict_request(&request(SAMPLE_PATIENT)).unwrap();
    assert_eq!(resp.assessment.probability(), 1.0);
    assert_eq!(resp.assessment.percent(), 100.0);
    assert_eq!(resp.assessment.category(), RiskCategory::High);

    let (service, _) = service_with(-0.2);
    let resp = service.handle_predict_request(&request(SAMPLE_PATIENT)).unwrap();
    assert_eq!(resp.assessment.probability(), 0.0);
    assert_eq!(resp.assessment.category(), RiskCategory::Low);
}

#[test]
fn inverted_thresholds_fail_before_the_model_runs() {
    let (service, classifier) = service_with(0.35);
    let req = request(SAMPLE_PATIENT).with_thresholds(60.0, 40.0);
    let err = service.handle_predict_request(&req).unwrap_err();
    assert!(matches!(
        err,
        RiskError::Configuration(ConfigurationError::Inverted { .. })
    ));
    assert_eq!(classifier.calls(), 0);
}

#[test]
fn invalid_input_never_reaches_the_model() {
    let (service, classifier) = service_with(0.35);
    let mut req = request(SAMPLE_PATIENT);
    req.features.set(Feature::OrganFailure, 3.0);
    let err = service.handle_predict_request(&req).unwrap_err();
    assert!(matches!(
        err,
        RiskError::Validation(ValidationError::OutOfRange {
            feature: Feature::OrganFailure,
            ..
        })
    ));

    req.features.age = None;
    assert!(matches!(
        service.handle_predict_request(&req),
        Err(RiskError::Validation(_))
    ));
    assert_eq!(classifier.calls(), 0);
}

#[test]
fn missing_model_is_reported_and_later_requests_recover() {
    let dir = tempfile::tempdir().unwrap();
    let model_path = dir.path().join("best_model_stack.json");
    let mut config = Config::default();
    config.model.path = model_path.clone();
    let service = RiskService::new(config).unwrap();

    let err = service.handle_predict_request(&request(SAMPLE_PATIENT)).unwrap_err();
    assert!(matches!(err, RiskError::ModelUnavailable(_)));
    assert!(err.to_string().contains("best_model_stack.json"));

    fs::copy(tests::demo_model_path(), &model_path).unwrap();
    let resp = service.handle_predict_request(&request(SAMPLE_PATIENT)).unwrap();
    assert!((0.0..=1.0).contains(&resp.assessment.probability()));
}

#[test]
fn failed_request_does_not_disturb_the_next_one() {
    let (service, classifier) = service_with(0.30);
    let bad = request(SAMPLE_PATIENT).with_thresholds(80.0, 20.0);
    assert!(service.handle_predict_request(&bad).is_err());

    let resp = service.handle_predict_request(&request(SAMPLE_PATIENT)).unwrap();
    assert_eq!(resp.assessment.category(), RiskCategory::Intermediate);
    assert_eq!(classifier.calls(), 1);
}

#[test]
fn response_carries_validated_features() {
    let (service, _) = service_with(0.2);
    let resp = service.handle_predict_request(&request(SAMPLE_PATIENT)).unwrap();
    let values: Vec<i64> = resp.features.iter().map(|(_, v)| v).collect();
    assert_eq!(values, SAMPLE_PATIENT.to_vec());
    assert_eq!(resp.session_id.as_str(), "S-0A1B2C3D");
}

#[test]
fn concurrent_requests_share_one_service() {
    let (service, classifier) = service_with(0.42);
    std::thread::scope(|scope| {
        for _ in 0..8 {
            scope.spawn(|| {
                let resp = service.handle_predict_request(&request(SAMPLE_PATIENT)).unwrap();
                assert_eq!(resp.assessment.category(), RiskCategory::Intermediate);
            });
        }
    });
    assert_eq!(classifier.calls(), 8);
}

#[test]
fn json_request_round_trips_through_the_service() {
    let (service, _) = service_with(0.64);
    let req: PredictRequest = serde_json::from_str(
        r#"{"session_id":"S-77AA01FE",
            "features":{"organ_failure":2,"pancreatic_fistula":1,"mdro_infection":1,
                        "bloodstream_infection":0,"age":63.0,"of_duration_days":5,
                        "onset_to_intervention_days":21}}"#,
    )
    .unwrap();
    let resp = service.handle_predict_request(&req).unwrap();

    let json = serde_json::to_value(&resp).unwrap();
    assert_eq!(json["session_id"], "S-77AA01FE");
    assert_eq!(json["assessment"]["category"], "High");
    assert_eq!(json["assessment"]["probability"], 0.64);
    assert_eq!(json["features"]["age"], 63);
}

#[test]
fn fractional_json_input_is_rejected() {
    let (service, _) = service_with(0.64);
    let mut req = request(SAMPLE_PATIENT);
    req.features.of_duration_days = Some(2.5);
    assert!(matches!(
        service.handle_predict_request(&req),
        Err(RiskError::Validation(ValidationError::NotIntegral { .. }))
    ));
}
