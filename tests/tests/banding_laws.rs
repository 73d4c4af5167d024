use hemrisk_core::{categorize, RiskCategory};
use proptest::prelude::*;
use tests::{request, service_with, SAMPLE_PATIENT};

fn ordered_thresholds() -> impl Strategy<Value = (f64, f64)> {
    (0.0f64..=100.0, 0.0f64..=100.0).prop_map(|(a, b)| if a <= b { (a, b) } else { (b, a) })
}

proptest! {
    #[test]
    fn category_never_drops_as_risk_rises(
        (lo, hi) in ordered_thresholds(),
        a in 0.0f64..=100.0,
        b in 0.0f64..=100.0,
    ) {
        let (small, large) = if a <= b { (a, b) } else { (b, a) };
        let c_small = categorize(small, lo, hi).unwrap();
        let c_large = categorize(large, lo, hi).unwrap();
        prop_assert!(c_small <= c_large);
    }

    #[test]
    fn service_output_is_always_a_probability(raw in -5.0f64..5.0) {
        let (service, _) = service_with(raw);
        let resp = service.handle_predict_request(&request(SAMPLE_PATIENT)).unwrap();
        let p = resp.assessment.probability();
        prop_assert!((0.0..=1.0).contains(&p));
        prop_assert_eq!(resp.assessment.percent(), p * 100.0);
    }

    #[test]
    fn category_agrees_with_threshold_comparison(
        (lo, hi) in ordered_thresholds(),
        raw in 0.0f64..=1.0,
    ) {
        let (service, _) = service_with(raw);
        let resp = service
            .handle_predict_request(&request(SAMPLE_PATIENT).with_thresholds(lo, hi))
            .unwrap();
        let pct = resp.assessment.percent();
        let expected = if pct < lo {
            RiskCategory::Low
        } else if pct < hi {
            RiskCategory::Intermediate
        } else {
            RiskCategory::High
        };
        prop_assert_eq!(resp.assessment.category(), expected);
    }
}
