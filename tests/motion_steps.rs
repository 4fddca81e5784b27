mod common;

use common::{post_json, test_app};
use step_entry_ledger::module::step_entry::schema::{
    CountMotionStepsRequest, CountMotionStepsResponse,
};
use step_entry_ledger::service::motion_service::{count_steps, AccelSample, StepDetector};

fn sample(x: f64, y: f64, z: f64, timestamp_ms: i64) -> AccelSample {
    AccelSample {
        x,
        y,
        z,
        timestamp_ms,
    }
}

#[test]
fn spaced_vertical_impacts_count_as_steps() {
    let samples = vec![
        sample(0.0, 0.0, 0.0, 0),
        sample(0.0, 0.0, 2.0, 500),
        sample(0.0, 0.0, 0.0, 1000),
        sample(0.0, 0.0, 2.0, 1500),
    ];
    assert_eq!(count_steps(&samples), 3);
}

#[test]
fn first_sample_only_primes_the_detector() {
    let mut detector = StepDetector::new();
    assert!(!detector.process(sample(0.0, 0.0, 5.0, 0)));
    assert_eq!(detector.step_count(), 0);
}

#[test]
fn rapid_impacts_are_debounced() {
    let samples = vec![
        sample(0.0, 0.0, 0.0, 0),
        sample(0.0, 0.0, 2.0, 300),
        // 200ms later, inside the 400ms refractory window.
        sample(0.0, 0.0, 0.0, 500),
    ];
    assert_eq!(count_steps(&samples), 1);
}

#[test]
fn horizontal_shake_is_not_a_step() {
    let samples = vec![sample(0.0, 0.0, 0.0, 0), sample(5.0, 0.0, 0.0, 500)];
    assert_eq!(count_steps(&samples), 0);
}

#[test]
fn weak_movement_is_ignored() {
    let samples = vec![sample(0.0, 0.0, 0.0, 0), sample(0.0, 0.0, 0.9, 500)];
    assert_eq!(count_steps(&samples), 0);
}

#[test]
fn isolated_spike_after_quiet_period_fails_rhythm_check() {
    let mut samples = vec![
        sample(0.0, 0.0, 0.0, 0),
        sample(0.0, 0.0, 2.0, 500),
        sample(0.0, 0.0, 0.0, 1000),
    ];
    // Quiet wiggles push the strong magnitudes out of the rhythm window.
    let mut z = 0.0;
    for i in 0..6 {
        z = if z == 0.0 { 0.01 } else { 0.0 };
        samples.push(sample(0.0, 0.0, z, 1100 + i * 100));
    }
    samples.push(sample(0.0, 0.0, 2.0, 2500));
    assert_eq!(count_steps(&samples), 2);
}

#[tokio::test]
async fn count_endpoint_replays_sample_batch() {
    let app = test_app();
    let req = CountMotionStepsRequest {
        samples: vec![
            sample(0.0, 0.0, 0.0, 0),
            sample(0.0, 0.0, 2.0, 500),
            sample(0.0, 0.0, 0.0, 1000),
        ],
    };
    let (status, resp): (_, CountMotionStepsResponse) =
        post_json(app, "/v1/steps/count", &req).await;
    assert_eq!(status, http::StatusCode::OK);
    assert_eq!(resp.steps, 2);
    assert_eq!(resp.samples_processed, 3);
}
