//! Attendance command handlers.
//!
//! Each handler builds its own [`AttendanceClient`] from config, talks to the
//! backend and prints a short table or status line to stdout. Denials and
//! backend rejections are returned as errors so the process exits non-zero.

use attend_client::{AttendanceClient, AttendanceDesk, Direction, EventBus};
use attend_core::{Admission, AppConfig, AttendanceRecord, NearestBranch};
use chrono::{DateTime, FixedOffset, Local};

use crate::position::{acquire, fmt_accuracy, PositionArgs};

fn build_client(config: &AppConfig) -> anyhow::Result<AttendanceClient> {
    AttendanceClient::from_config(config)
        .map_err(|e| anyhow::anyhow!("failed to build attendance client: {e}"))
}

fn fmt_time(time: Option<DateTime<FixedOffset>>) -> String {
    time.map_or_else(
        || "\u{2014}".to_string(),
        |t| t.with_timezone(&Local).format("%H:%M:%S").to_string(),
    )
}

fn print_record(record: Option<&AttendanceRecord>) {
    let Some(record) = record else {
        println!("no attendance recorded today");
        return;
    };
    println!("status:    {}", record.status());
    println!("check-in:  {}", fmt_time(record.check_in));
    println!("check-out: {}", fmt_time(record.check_out));
    if let Some(worked) = record.worked() {
        println!(
            "worked:    {}h {:02}m",
            worked.num_hours(),
            worked.num_minutes() % 60
        );
    }
}

fn print_nearest(nearest: &NearestBranch) {
    println!(
        "{} ({}): {:.0} m away, radius {:.0} m, {}",
        nearest.branch.name,
        nearest.branch.id,
        nearest.distance_meters,
        nearest.branch.radius_meters,
        if nearest.in_range() { "in range" } else { "out of range" }
    );
}

/// List every branch from the backend.
///
/// # Errors
///
/// Returns an error if the client cannot be built or the request fails.
pub(crate) async fn run_branches(config: &AppConfig) -> anyhow::Result<()> {
    let branches = build_client(config)?.list_branches().await?;

    if branches.is_empty() {
        println!("no branches configured");
        return Ok(());
    }

    println!("{:<26}{:<24}{:<26}{:>8}", "ID", "NAME", "LOCATION", "RADIUS");
    for branch in &branches {
        let location = branch
            .coordinate
            .map_or_else(|| "\u{2014}".to_string(), |c| c.to_string());
        println!(
            "{:<26}{:<24}{:<26}{:>6.0} m",
            branch.id, branch.name, location, branch.radius_meters
        );
    }

    Ok(())
}

/// Show today's record.
///
/// # Errors
///
/// Returns an error if the client cannot be built or the request fails.
pub(crate) async fn run_today(config: &AppConfig) -> anyhow::Result<()> {
    let record = build_client(config)?.today_record().await?;
    print_record(record.as_ref());
    Ok(())
}

/// Acquire a position and report the nearest branch.
///
/// # Errors
///
/// Returns an error if acquisition or the branch fetch fails.
pub(crate) async fn run_nearest(config: &AppConfig, position: &PositionArgs) -> anyhow::Result<()> {
    let mut desk = AttendanceDesk::new(build_client(config)?, EventBus::new());
    desk.refresh_branches().await?;
    let sample = acquire(position, &config.locator).await?;
    println!(
        "position: {} ±{}",
        sample.coordinate,
        fmt_accuracy(sample.accuracy_meters)
    );

    match desk.nearest(&sample) {
        Some(nearest) => print_nearest(&nearest),
        None => println!("no branch with a known location"),
    }
    Ok(())
}

/// Acquire a position, gate and submit a check-in or check-out.
///
/// With `dry_run` the admission decision is printed and nothing is sent.
///
/// # Errors
///
/// Returns an error if acquisition fails, the gate denies the request or
/// the backend rejects it.
pub(crate) async fn run_check(
    config: &AppConfig,
    position: &PositionArgs,
    direction: Direction,
    dry_run: bool,
) -> anyhow::Result<()> {
    let mut desk = AttendanceDesk::new(build_client(config)?, EventBus::new());
    desk.refresh_branches().await?;
    desk.refresh_record().await?;

    let sample = acquire(position, &config.locator).await?;
    if let Some(nearest) = desk.nearest(&sample) {
        print_nearest(&nearest);
    }

    if dry_run {
        match desk.admission(direction, Some(&sample)) {
            Admission::Allow => println!("dry-run: {direction} would be submitted"),
            Admission::Deny(reason) => println!("dry-run: {direction} denied: {reason}"),
        }
        return Ok(());
    }

    let submission = desk.submit(direction, Some(&sample)).await?;
    println!(
        "{direction} recorded at {} ({})",
        submission.branch.branch.name,
        submission.client_time.to_rfc3339()
    );
    print_record(submission.record.as_ref());
    Ok(())
}
