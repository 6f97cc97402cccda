//! Step timing - START/END logging around workflow steps

use std::future::Future;
use std::time::{Duration, Instant};

use anyhow::Result;

/// Split a duration into whole hours, minutes and seconds
pub fn split_duration(elapsed: Duration) -> (u64, u64, u64) {
    let total = elapsed.as_secs();
    (total / 3600, (total % 3600) / 60, total % 60)
}

/// Human readable `Hh Mm Ss`
pub fn format_duration(elapsed: Duration) -> String {
    let (h, m, s) = split_duration(elapsed);
    format!("{}h {}m {}s", h, m, s)
}

/// Run a workflow step, logging its start, end, duration and failure
pub async fn timed<T, F>(name: &str, step: F) -> Result<T>
where
    F: Future<Output = Result<T>>,
{
    let start = Instant::now();
    tracing::info!("START - {}", name);

    let result = step.await;
    if let Err(e) = &result {
        tracing::error!("ERROR - {} : {:#}", name, e);
    }

    tracing::info!("END - {}", name);
    tracing::info!(
        "{}() completed in: {}",
        name,
        format_duration(start.elapsed())
    );
    result
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_duration() {
        assert_eq!(format_duration(Duration::from_secs(0)), "0h 0m 0s");
        assert_eq!(format_duration(Duration::from_secs(3725)), "1h 2m 5s");
        assert_eq!(format_duration(Duration::from_millis(59_999)), "0h 0m 59s");
        assert_eq!(split_duration(Duration::from_secs(90_061)), (25, 1, 1));
    }

    #[tokio::test]
    async fn test_timed_passes_results_through() {
        let ok = timed("ok_step", async { Ok::<_, anyhow::Error>(7) }).await;
        assert_eq!(ok.ok(), Some(7));

        let err = timed("bad_step", async { Err::<u8, _>(anyhow::anyhow!("nope")) }).await;
        assert_eq!(err.unwrap_err().to_string(), "nope");
    }
}
