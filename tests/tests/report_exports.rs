use std::fs;

use chrono::NaiveDate;
use hemrisk::{Config, RiskService};
use hemrisk_core::Feature;
use hemrisk_report::ExplanationAssets;
use pretty_assertions::assert_eq;
use tests::{request, FixedClassifier, SAMPLE_PATIENT};

fn timestamp() -> chrono::NaiveDateTime {
    NaiveDate::from_ymd_opt(2025, 3, 14)
        .unwrap()
        .and_hms_opt(9, 26, 53)
        .unwrap()
}

#[test]
fn csv_export_is_stable_for_the_same_response() {
    let (service, _) = tests::service_with(0.23461);
    let resp = service.handle_predict_request(&request(SAMPLE_PATIENT)).unwrap();

    let first = service.export_csv(&resp, timestamp()).unwrap();
    let second = service.export_csv(&resp, timestamp()).unwrap();
    assert_eq!(first, second);

    let text = String::from_utf8(first).unwrap();
    let mut lines = text.lines();
    assert_eq!(
        lines.next().unwrap(),
        "Session ID,Timestamp,Probability,Risk (%),Risk category,Low threshold (%),\
         High threshold (%),Organ failure,Pancreatic fistula,Pus MDRO infection,\
         Bloodstream infection,Age,OF duration (days),Onset-to-intervention (days)"
    );
    assert_eq!(
        lines.next().unwrap(),
        "S-0A1B2C3D,2025-03-14 09:26:53,0.2346,23.5,Intermediate,10.0,50.0,1,0,1,0,58,4,27"
    );
    assert_eq!(lines.next(), None);
}

#[test]
fn configured_labels_reach_the_csv_header() {
    let mut config = Config::default();
    config.report.labels = config
        .report
        .labels
        .with_label(Feature::OfDurationDays, "Organ failure, duration (d)");
    let service =
        RiskService::with_classifier(config, std::sync::Arc::new(FixedClassifier::new(0.6)))
            .unwrap();
    let resp = service.handle_predict_request(&request(SAMPLE_PATIENT)).unwrap();
    let text = String::from_utf8(service.export_csv(&resp, timestamp()).unwrap()).unwrap();
    // label contains a comma, so the csv writer quotes it
    assert!(text.contains("\"Organ failure, duration (d)\""));
}

#[test]
fn pdf_export_writes_a_complete_document() {
    let (service, _) = tests::service_with(0.71);
    let resp = service.handle_predict_request(&request(SAMPLE_PATIENT)).unwrap();
    let record = service.report(&resp, timestamp());
    let name = record.file_name(&service.config().report, "pdf");
    assert_eq!(name, "IPN_hemorrhage_report_S-0A1B2C3D.pdf");

    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join(&name);
    fs::write(&path, service.export_pdf(&resp, timestamp())).unwrap();

    let bytes = fs::read(&path).unwrap();
    assert!(bytes.starts_with(b"%PDF-1.4"));
    assert!(bytes.ends_with(b"%%EOF\n"));
    let text = String::from_utf8_lossy(&bytes);
    assert!(text.contains("(Xiangya Hospital)"));
    assert!(text.contains("(Risk category: High)"));
    assert!(text.contains("(Session ID: S-0A1B2C3D)"));
}

#[test]
fn report_fields_follow_the_assessment() {
    let (service, _) = tests::service_with(0.0912);
    let resp = service
        .handle_predict_request(&request(SAMPLE_PATIENT).with_thresholds(5.0, 20.0))
        .unwrap();
    let record = service.report(&resp, timestamp());
    assert_eq!(record.get("Risk (%)"), Some("9.1"));
    assert_eq!(record.get("Risk category"), Some("Intermediate"));
    assert_eq!(record.get("Low threshold (%)"), Some("5.0"));
    assert_eq!(record.get("High threshold (%)"), Some("20.0"));
    assert_eq!(record.get("Age"), Some("58"));
}

#[test]
fn missing_explanation_images_only_warn() {
    let dir = tempfile::tempdir().unwrap();
    fs::write(dir.path().join("summary_plot.png"), b"\x89PNG").unwrap();
    let assets = ExplanationAssets::default().relative_to(dir.path());

    let status = assets.check();
    assert_eq!(status.len(), 2);
    assert!(status[0].present);
    assert!(!status[1].present);

    let warnings: Vec<String> = assets.warnings().iter().map(|w| w.to_string()).collect();
    assert_eq!(warnings, vec!["overall_shap.png not found.".to_string()]);
}
