//! Position sources for commands that need a location.
//!
//! A fix comes either from explicit `--lat/--lon` (served by a
//! [`FixedProvider`]) or from a recorded `--replay` script, and always runs
//! through a [`LocatorSession`] so the configured timeouts and retry policy
//! apply the same way they would against a live device.

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use attend_core::{Coordinate, LocationSample, LocatorSettings};
use attend_locator::{
    AcquisitionConfig, FixedProvider, LocatorSession, LocatorSnapshot, Phase, PositionProvider,
    ReplayProvider, ReplayScript,
};
use clap::Args;

#[derive(Debug, Clone, PartialEq, Args)]
pub struct PositionArgs {
    /// Latitude in decimal degrees
    #[arg(long, allow_hyphen_values = true, requires = "lon", conflicts_with = "replay")]
    pub lat: Option<f64>,
    /// Longitude in decimal degrees
    #[arg(long, allow_hyphen_values = true, requires = "lat")]
    pub lon: Option<f64>,
    /// Reported accuracy radius in meters
    #[arg(long, requires = "lat")]
    pub accuracy: Option<f64>,
    /// JSON script of recorded fixes to play back
    #[arg(long, value_name = "FILE")]
    pub replay: Option<PathBuf>,
}

enum PositionSource {
    Fixed(LocationSample),
    Replay(ReplayScript),
}

impl PositionArgs {
    fn source(&self) -> anyhow::Result<PositionSource> {
        if let Some(path) = &self.replay {
            let script = ReplayScript::from_path(path).map_err(|e| {
                anyhow::anyhow!("failed to read replay script {}: {e}", path.display())
            })?;
            return Ok(PositionSource::Replay(script));
        }
        match (self.lat, self.lon) {
            (Some(lat), Some(lon)) => {
                let coordinate = Coordinate::new(lat, lon)?;
                Ok(PositionSource::Fixed(LocationSample::new(
                    coordinate,
                    self.accuracy,
                )))
            }
            _ => anyhow::bail!("a position is required: pass --lat and --lon, or --replay"),
        }
    }
}

/// Runs acquisition until the first fix or a terminal failure.
///
/// # Errors
///
/// Returns an error if the position arguments are invalid or acquisition
/// fails; the error text is the user-facing location message.
pub(crate) async fn acquire(
    args: &PositionArgs,
    settings: &LocatorSettings,
) -> anyhow::Result<LocationSample> {
    let config = AcquisitionConfig::from(settings);
    let session = match args.source()? {
        PositionSource::Fixed(sample) => {
            LocatorSession::spawn(Arc::new(FixedProvider::new(sample)), config)
        }
        PositionSource::Replay(script) => {
            LocatorSession::spawn(Arc::new(ReplayProvider::new(script)), config)
        }
    };
    let sample = session.wait_for_fix().await?;
    session.cancel();
    Ok(sample)
}

/// Prints every acquisition state change, then optionally keeps tracking.
///
/// # Errors
///
/// Returns an error if the position arguments are invalid or acquisition
/// ends in failure.
pub(crate) async fn run_locate(
    settings: &LocatorSettings,
    args: &PositionArgs,
    track_secs: u64,
) -> anyhow::Result<()> {
    let config = AcquisitionConfig::from(settings);
    match args.source()? {
        PositionSource::Fixed(sample) => {
            observe(Arc::new(FixedProvider::new(sample)), config, track_secs).await
        }
        PositionSource::Replay(script) => {
            observe(Arc::new(ReplayProvider::new(script)), config, track_secs).await
        }
    }
}

async fn observe<P: PositionProvider>(
    provider: Arc<P>,
    config: AcquisitionConfig,
    track_secs: u64,
) -> anyhow::Result<()> {
    let session = LocatorSession::spawn(provider, config);
    let mut updates = session.subscribe();

    loop {
        let snapshot = updates.borrow_and_update().clone();
        print_snapshot(&snapshot);
        if let Some(err) = snapshot.error() {
            anyhow::bail!("{err}");
        }
        if matches!(snapshot.phase, Phase::Tracking) {
            break;
        }
        if updates.changed().await.is_err() {
            anyhow::bail!("location session ended unexpectedly");
        }
    }

    if track_secs > 0 {
        let deadline = tokio::time::sleep(Duration::from_secs(track_secs));
        tokio::pin!(deadline);
        loop {
            tokio::select! {
                () = &mut deadline => break,
                changed = updates.changed() => {
                    if changed.is_err() {
                        break;
                    }
                    print_snapshot(&updates.borrow_and_update());
                }
            }
        }
    }

    session.cancel();
    Ok(())
}

fn print_snapshot(snapshot: &LocatorSnapshot) {
    match &snapshot.sample {
        Some(sample) => println!(
            "{:<22}{:<10}{}  ±{}",
            snapshot.phase.to_string(),
            snapshot.attempt,
            sample.coordinate,
            fmt_accuracy(sample.accuracy_meters)
        ),
        None => println!("{:<22}{:<10}-", snapshot.phase.to_string(), snapshot.attempt),
    }
}

pub(crate) fn fmt_accuracy(accuracy: Option<f64>) -> String {
    accuracy.map_or_else(|| "?".to_string(), |a| format!("{a:.0} m"))
}
