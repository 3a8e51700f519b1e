//! Progress logging for the upload.

use std::time::Duration;

use largeattach_transfer::{SpeedCalculator, UploadProgress};
use tokio::sync::mpsc;
use tracing::info;

/// Logs each progress snapshot until the sender is dropped.
pub async fn log_progress(mut rx: mpsc::UnboundedReceiver<UploadProgress>) {
    let speed = SpeedCalculator::new(None, None);
    speed.add_sample(0);
    let mut last = 0u64;

    while let Some(p) = rx.recv().await {
        speed.add_sample(p.bytes_sent.saturating_sub(last));
        last = p.bytes_sent;

        let remaining = p.total_bytes.saturating_sub(p.bytes_sent);
        info!(
            "uploaded {} of {} bytes ({:.1}%) {} ETA {}",
            p.bytes_sent,
            p.total_bytes,
            p.fraction() * 100.0,
            format_speed(speed.bytes_per_second()),
            format_eta(speed.eta(remaining)),
        );
    }
}

pub fn format_speed(bytes_per_second: f64) -> String {
    const KIB: f64 = 1024.0;
    const MIB: f64 = KIB * 1024.0;
    if bytes_per_second >= MIB {
        format!("{:.1} MiB/s", bytes_per_second / MIB)
    } else if bytes_per_second >= KIB {
        format!("{:.1} KiB/s", bytes_per_second / KIB)
    } else {
        format!("{bytes_per_second:.0} B/s")
    }
}

pub fn format_eta(eta: Option<Duration>) -> String {
    match eta {
        Some(d) => {
            let secs = d.as_secs();
            format!("{}:{:02}", secs / 60, secs % 60)
        }
        None => "--:--".into(),
    }
}
