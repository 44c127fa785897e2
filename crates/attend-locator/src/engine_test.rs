use attend_core::Coordinate;

use super::*;

fn sample(accuracy: f64) -> LocationSample {
    LocationSample::new(
        Coordinate::new(24.7136, 46.6753).expect("valid coordinate"),
        Some(accuracy),
    )
}

fn started() -> Acquisition {
    let mut machine = Acquisition::new(AcquisitionConfig::default());
    machine.handle(Event::Start);
    machine
}

fn tracking_with(accuracy: f64) -> Acquisition {
    let mut machine = started();
    machine.handle(Event::FixSucceeded(sample(accuracy)));
    machine
}

#[test]
fn start_requests_a_quick_low_accuracy_fix() {
    let mut machine = Acquisition::new(AcquisitionConfig::default());
    let command = machine.handle(Event::Start);
    assert_eq!(machine.phase(), &Phase::QuickFix);
    let Command::RequestFix(options) = command else {
        panic!("expected RequestFix, got {command:?}");
    };
    assert!(!options.high_accuracy);
    assert_eq!(options.timeout, Duration::from_secs(5));
    assert_eq!(options.maximum_age, Duration::from_secs(60));
}

#[test]
fn quick_fix_success_starts_tracking() {
    let mut machine = started();
    let command = machine.handle(Event::FixSucceeded(sample(120.0)));
    assert_eq!(machine.phase(), &Phase::Tracking);
    assert_eq!(machine.sample().unwrap().accuracy_meters, Some(120.0));
    let Command::StartWatch(options) = command else {
        panic!("expected StartWatch, got {command:?}");
    };
    assert!(options.high_accuracy);
    assert_eq!(options.maximum_age, Duration::from_secs(10));
}

#[test]
fn quick_fix_failure_escalates_to_high_accuracy() {
    let mut machine = started();
    let command = machine.handle(Event::FixFailed(LocationError::Timeout));
    assert_eq!(machine.phase(), &Phase::HighAccuracyFix);
    assert_eq!(machine.attempt(), 0);
    let Command::RequestFix(options) = command else {
        panic!("expected RequestFix, got {command:?}");
    };
    assert!(options.high_accuracy);
    assert_eq!(options.timeout, Duration::from_secs(30));
    assert_eq!(options.maximum_age, Duration::ZERO);
}

#[test]
fn high_accuracy_timeouts_back_off_then_fail() {
    let mut machine = started();
    machine.handle(Event::FixFailed(LocationError::Timeout));

    let mut delays = Vec::new();
    loop {
        match machine.handle(Event::FixFailed(LocationError::Timeout)) {
            Command::Wait(delay) => {
                delays.push(delay.as_millis());
                let next = machine.handle(Event::BackoffElapsed);
                assert!(matches!(next, Command::RequestFix(_)));
            }
            Command::Continue => break,
            other => panic!("unexpected command {other:?}"),
        }
    }

    assert_eq!(delays, vec![2_000, 4_000, 8_000]);
    assert_eq!(machine.phase(), &Phase::Failed(LocationError::Timeout));
    assert_eq!(machine.attempt(), 3);
}

#[test]
fn failed_state_ignores_late_events() {
    let mut machine = started();
    machine.handle(Event::FixFailed(LocationError::Timeout));
    machine.handle(Event::FixFailed(LocationError::PermissionDenied {
        insecure_origin: false,
    }));
    assert!(matches!(machine.phase(), Phase::Failed(_)));

    assert_eq!(machine.handle(Event::BackoffElapsed), Command::Continue);
    assert_eq!(machine.handle(Event::Start), Command::Continue);
    assert!(matches!(machine.phase(), Phase::Failed(_)));
}

#[test]
fn permission_denied_fails_without_retry() {
    let mut machine = started();
    machine.handle(Event::FixFailed(LocationError::PermissionDenied {
        insecure_origin: true,
    }));
    let command = machine.handle(Event::FixFailed(LocationError::PermissionDenied {
        insecure_origin: true,
    }));
    assert_eq!(command, Command::Continue);
    assert_eq!(
        machine.phase(),
        &Phase::Failed(LocationError::PermissionDenied {
            insecure_origin: true
        })
    );
    assert_eq!(machine.attempt(), 0);
}

#[test]
fn retry_then_success_clears_the_counter() {
    let mut machine = started();
    machine.handle(Event::FixFailed(LocationError::Timeout));
    machine.handle(Event::FixFailed(LocationError::PositionUnavailable(
        "cold start".to_owned(),
    )));
    machine.handle(Event::BackoffElapsed);
    assert_eq!(machine.attempt(), 1);

    machine.handle(Event::FixSucceeded(sample(8.0)));
    assert_eq!(machine.phase(), &Phase::Tracking);
    assert_eq!(machine.attempt(), 0);
}

#[test]
fn manual_retry_resets_attempts_and_restarts_quick_fix() {
    let mut machine = started();
    machine.handle(Event::FixFailed(LocationError::Timeout));
    for _ in 0..3 {
        machine.handle(Event::FixFailed(LocationError::Timeout));
        machine.handle(Event::BackoffElapsed);
    }
    machine.handle(Event::FixFailed(LocationError::Timeout));
    assert!(matches!(machine.phase(), Phase::Failed(_)));

    let command = machine.handle(Event::ManualRetry);
    assert_eq!(machine.phase(), &Phase::QuickFix);
    assert_eq!(machine.attempt(), 0);
    assert_eq!(command, Command::RequestFix(machine.config().quick));
}

#[test]
fn tracking_keeps_the_most_accurate_sample() {
    let mut machine = tracking_with(50.0);
    let mut retained = vec![machine.sample().unwrap().accuracy_meters.unwrap()];
    for accuracy in [30.0, 80.0, 10.0] {
        machine.handle(Event::TrackingSample(sample(accuracy)));
        retained.push(machine.sample().unwrap().accuracy_meters.unwrap());
    }
    assert_eq!(retained, vec![50.0, 30.0, 30.0, 10.0]);
}

#[test]
fn tracking_errors_do_not_change_state() {
    let mut machine = tracking_with(25.0);
    let command = machine.handle(Event::TrackingFailed(LocationError::PositionUnavailable(
        "tunnel".to_owned(),
    )));
    assert_eq!(command, Command::Continue);
    assert_eq!(machine.phase(), &Phase::Tracking);
    assert_eq!(machine.sample().unwrap().accuracy_meters, Some(25.0));
}

#[test]
fn tracking_samples_before_a_fix_are_ignored() {
    let mut machine = started();
    machine.handle(Event::TrackingSample(sample(5.0)));
    assert!(machine.sample().is_none());
    assert_eq!(machine.phase(), &Phase::QuickFix);
}

#[test]
fn max_attempts_is_configurable() {
    let config = AcquisitionConfig {
        max_attempts: 1,
        ..AcquisitionConfig::default()
    };
    let mut machine = Acquisition::new(config);
    machine.handle(Event::Start);
    machine.handle(Event::FixFailed(LocationError::Timeout));
    assert!(matches!(
        machine.handle(Event::FixFailed(LocationError::Timeout)),
        Command::Wait(_)
    ));
    machine.handle(Event::BackoffElapsed);
    assert_eq!(
        machine.handle(Event::FixFailed(LocationError::Timeout)),
        Command::Continue
    );
    assert!(matches!(machine.phase(), Phase::Failed(_)));
}
