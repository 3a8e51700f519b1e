use std::sync::Mutex;
use std::time::{Duration, Instant};

use tokio::sync::mpsc;

/// Callback invoked with the cumulative number of bytes accepted.
pub type ProgressCallback = Box<dyn Fn(u64) + Send + Sync>;

/// Snapshot delivered over a progress channel.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct UploadProgress {
    pub bytes_sent: u64,
    pub total_bytes: u64,
}

impl UploadProgress {
    /// Completion ratio in `0.0..=1.0`.
    pub fn fraction(&self) -> f64 {
        if self.total_bytes == 0 {
            return 0.0;
        }
        self.bytes_sent as f64 / self.total_bytes as f64
    }
}

/// Where progress notifications go.
///
/// Notifications are synchronous, in order, and at most one per slice. Each
/// carries a strictly larger byte count than the one before.
pub enum ProgressSink {
    Callback(ProgressCallback),
    Channel(mpsc::UnboundedSender<UploadProgress>),
}

impl ProgressSink {
    /// Wraps a plain closure.
    pub fn callback(f: impl Fn(u64) + Send + Sync + 'static) -> Self {
        ProgressSink::Callback(Box::new(f))
    }

    /// Creates a channel sink and its receiving end.
    pub fn channel() -> (Self, mpsc::UnboundedReceiver<UploadProgress>) {
        let (tx, rx) = mpsc::unbounded_channel();
        (ProgressSink::Channel(tx), rx)
    }

    pub(crate) fn notify(&self, bytes_sent: u64, total_bytes: u64) {
        match self {
            ProgressSink::Callback(cb) => cb(bytes_sent),
            ProgressSink::Channel(tx) => {
                // A dropped receiver only means nobody is watching.
                let _ = tx.send(UploadProgress {
                    bytes_sent,
                    total_bytes,
                });
            }
        }
    }
}

impl std::fmt::Debug for ProgressSink {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ProgressSink::Callback(_) => f.write_str("ProgressSink::Callback"),
            ProgressSink::Channel(_) => f.write_str("ProgressSink::Channel"),
        }
    }
}

// ---------------------------------------------------------------------------
// SpeedCalculator
// ---------------------------------------------------------------------------

struct SpeedSample {
    bytes: u64,
    timestamp: Instant,
}

/// Calculates transfer speed using a sliding window of samples.
pub struct SpeedCalculator {
    inner: Mutex<SpeedInner>,
}

struct SpeedInner {
    samples: Vec<SpeedSample>,
    max_samples: usize,
    window_size: Duration,
}

impl SpeedCalculator {
    /// Creates a new calculator.
    ///
    /// - `window_size`: time window for speed calculation (default 5 s).
    /// - `max_samples`: maximum retained samples (default 100).
    pub fn new(window_size: Option<Duration>, max_samples: Option<usize>) -> Self {
        Self {
            inner: Mutex::new(SpeedInner {
                samples: Vec::new(),
                max_samples: max_samples.unwrap_or(100),
                window_size: window_size.unwrap_or(Duration::from_secs(5)),
            }),
        }
    }

    /// Records `bytes` transferred at the current instant.
    pub fn add_sample(&self, bytes: u64) {
        let mut s = self.inner.lock().unwrap();
        let now = Instant::now();
        s.samples.push(SpeedSample {
            bytes,
            timestamp: now,
        });

        if let Some(cutoff) = now.checked_sub(s.window_size) {
            s.samples.retain(|sample| sample.timestamp >= cutoff);
        }

        if s.samples.len() > s.max_samples {
            let excess = s.samples.len() - s.max_samples;
            s.samples.drain(..excess);
        }
    }

    /// Average speed in bytes/second within the window.
    ///
    /// Returns 0.0 with fewer than 2 samples.
    pub fn bytes_per_second(&self) -> f64 {
        let s = self.inner.lock().unwrap();
        if s.samples.len() < 2 {
            return 0.0;
        }

        let first = &s.samples[0];
        let last = &s.samples[s.samples.len() - 1];
        let elapsed = last.timestamp.duration_since(first.timestamp);
        if elapsed.is_zero() {
            return 0.0;
        }

        // The first sample only marks the start of the window.
        let total_bytes: u64 = s.samples[1..].iter().map(|sample| sample.bytes).sum();
        total_bytes as f64 / elapsed.as_secs_f64()
    }

    /// Estimates time remaining to transfer `remaining_bytes`.
    ///
    /// Returns `None` if speed is zero.
    pub fn eta(&self, remaining_bytes: u64) -> Option<Duration> {
        let speed = self.bytes_per_second();
        if speed <= 0.0 {
            return None;
        }
        Some(Duration::from_secs_f64(remaining_bytes as f64 / speed))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    #[test]
    fn callback_sink_receives_bytes() {
        let seen = Arc::new(Mutex::new(Vec::new()));
        let s = Arc::clone(&seen);
        let sink = ProgressSink::callback(move |n| s.lock().unwrap().push(n));

        sink.notify(10, 100);
        sink.notify(20, 100);
        assert_eq!(*seen.lock().unwrap(), vec![10, 20]);
    }

    #[test]
    fn channel_sink_delivers_snapshots() {
        let (sink, mut rx) = ProgressSink::channel();
        sink.notify(327_680, 1_000_000);

        let p = rx.try_recv().unwrap();
        assert_eq!(p.bytes_sent, 327_680);
        assert_eq!(p.total_bytes, 1_000_000);
        assert!((p.fraction() - 0.32768).abs() < 1e-9);
    }

    #[test]
    fn channel_sink_survives_dropped_receiver() {
        let (sink, rx) = ProgressSink::channel();
        drop(rx);
        // Should not panic.
        sink.notify(1, 2);
    }

    #[test]
    fn fraction_of_empty_total_is_zero() {
        let p = UploadProgress {
            bytes_sent: 0,
            total_bytes: 0,
        };
        assert_eq!(p.fraction(), 0.0);
    }

    #[test]
    fn speed_calculator_no_samples() {
        let calc = SpeedCalculator::new(None, None);
        assert_eq!(calc.bytes_per_second(), 0.0);
        assert!(calc.eta(1000).is_none());
    }

    #[test]
    fn speed_calculator_single_sample() {
        let calc = SpeedCalculator::new(None, None);
        calc.add_sample(100);
        assert_eq!(calc.bytes_per_second(), 0.0);
    }

    #[test]
    fn speed_calculator_multiple_samples() {
        let calc = SpeedCalculator::new(Some(Duration::from_secs(10)), None);
        calc.add_sample(327_680);
        std::thread::sleep(Duration::from_millis(50));
        calc.add_sample(327_680);

        assert!(calc.bytes_per_second() > 0.0);
        let eta = calc.eta(1_000_000).unwrap();
        assert!(eta.as_secs_f64() > 0.0);
    }

    #[test]
    fn speed_calculator_max_samples() {
        let calc = SpeedCalculator::new(Some(Duration::from_secs(60)), Some(5));
        for i in 0..20 {
            calc.add_sample(i * 10);
        }
        let s = calc.inner.lock().unwrap();
        assert!(s.samples.len() <= 5);
    }
}
