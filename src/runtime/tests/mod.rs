mod session_tests;

use std::time::{Duration, Instant};

/// Poll `condition` every few milliseconds until it holds or `timeout` passes
pub(crate) fn wait_until(timeout: Duration, mut condition: impl FnMut() -> bool) -> bool {
    let deadline = Instant::now() + timeout;
    while Instant::now() < deadline {
        if condition() {
            return true;
        }
        std::thread::sleep(Duration::from_millis(2));
    }
    condition()
}

pub(crate) const WAIT: Duration = Duration::from_secs(5);
