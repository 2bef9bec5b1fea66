//! Cold start detection for Lambda functions.
//!
//! A [`ColdStart`] reports `true` for the first invocation it observes and
//! `false` for every invocation after that. Wrappers share the process-wide
//! instance from [`ColdStart::process`] unless a different one is injected.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, OnceLock};

const INITIALIZATION_TYPE_ENV: &str = "AWS_LAMBDA_INITIALIZATION_TYPE";
const PROVISIONED_CONCURRENCY: &str = "provisioned-concurrency";

static PROCESS_COLD_START: OnceLock<Arc<ColdStart>> = OnceLock::new();

/// Check-and-clear cold start flag.
///
/// # Contract
///
/// Across the lifetime of one instance, [`check`](Self::check) returns
/// `true` at most once, no matter how many threads call it concurrently.
#[derive(Debug)]
pub struct ColdStart {
    pending: AtomicBool,
}

impl ColdStart {
    /// Creates a flag in the cold state.
    pub const fn new() -> Self {
        Self {
            pending: AtomicBool::new(true),
        }
    }

    /// Returns the instance shared by every wrapper in this process.
    pub fn process() -> Arc<ColdStart> {
        PROCESS_COLD_START
            .get_or_init(|| Arc::new(ColdStart::new()))
            .clone()
    }

    /// Checks if this is a cold start and clears the flag.
    ///
    /// If `AWS_LAMBDA_INITIALIZATION_TYPE` is `provisioned-concurrency` the
    /// container was pre-warmed, so the flag is cleared and `false` is
    /// returned even for the first invocation.
    pub fn check(&self) -> bool {
        if std::env::var(INITIALIZATION_TYPE_ENV)
            .map(|v| v == PROVISIONED_CONCURRENCY)
            .unwrap_or(false)
        {
            self.pending.store(false, Ordering::SeqCst);
            return false;
        }

        // First call swaps true -> false and sees true; every later call sees false.
        self.pending.swap(false, Ordering::SeqCst)
    }
}

impl Default for ColdStart {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serial_test::serial;
    use std::sync::atomic::AtomicUsize;

    #[test]
    #[serial]
    fn test_cold_start_first_invocation() {
        let cold_start = ColdStart::new();

        assert!(cold_start.check());
        assert!(!cold_start.check());
        assert!(!cold_start.check());
    }

    #[test]
    #[serial]
    fn test_provisioned_concurrency_not_cold_start() {
        let cold_start = ColdStart::new();

        temp_env::with_var(INITIALIZATION_TYPE_ENV, Some(PROVISIONED_CONCURRENCY), || {
            assert!(!cold_start.check());
        });

        // The flag stays cleared once the variable is gone.
        temp_env::with_var_unset(INITIALIZATION_TYPE_ENV, || {
            assert!(!cold_start.check());
        });
    }

    #[test]
    #[serial]
    fn test_other_initialization_type_is_cold_start() {
        let cold_start = ColdStart::new();

        temp_env::with_var(INITIALIZATION_TYPE_ENV, Some("on-demand"), || {
            assert!(cold_start.check());
            assert!(!cold_start.check());
        });
    }

    #[test]
    #[serial]
    fn test_concurrent_checks_observe_one_cold_start() {
        let cold_start = ColdStart::new();
        let cold_count = AtomicUsize::new(0);

        temp_env::with_var_unset(INITIALIZATION_TYPE_ENV, || {
            std::thread::scope(|scope| {
                for _ in 0..16 {
                    scope.spawn(|| {
                        if cold_start.check() {
                            cold_count.fetch_add(1, Ordering::SeqCst);
                        }
                    });
                }
            });
        });

        assert_eq!(cold_count.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_process_instance_is_shared() {
        assert!(Arc::ptr_eq(&ColdStart::process(), &ColdStart::process()));
    }
}
