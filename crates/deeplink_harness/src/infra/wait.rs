//! Bounded-wait primitive backing every liveness check in the driver.

use std::thread;
use std::time::{Duration, Instant};

use anyhow::Result;

use crate::domain::errors::DriverError;

/// Poll `probe` at `interval` until it reports true or `timeout` elapses.
///
/// An expired deadline surfaces as [`DriverError::Timeout`] naming `what`
/// was awaited; callers never silently swallow it. Probe errors propagate
/// immediately.
pub fn wait_until(
    what: &str,
    timeout: Duration,
    interval: Duration,
    mut probe: impl FnMut() -> Result<bool>,
) -> Result<()> {
    let deadline = Instant::now() + timeout;
    loop {
        if probe()? {
            return Ok(());
        }
        if Instant::now() >= deadline {
            return Err(DriverError::Timeout {
                what: what.to_owned(),
                millis: timeout.as_millis() as u64,
            }
            .into());
        }
        thread::sleep(interval);
    }
}
