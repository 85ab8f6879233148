pub mod builders;
pub mod fake_backend;

use std::sync::Once;
use std::time::Duration;

use tracing_subscriber::{fmt, EnvFilter};

static INIT: Once = Once::new();

/// Launcher logs captured per test; shown only for failing tests unless
/// run with `--nocapture`. `RUST_LOG` overrides the default filter.
pub fn init_tracing() {
    INIT.call_once(|| {
        let filter = EnvFilter::try_from_default_env()
            .unwrap_or_else(|_| EnvFilter::new("envlaunch=debug,warn"));

        fmt()
            .with_env_filter(filter)
            .with_test_writer()
            .with_target(false)
            .init();
    });
}

/// Fails the test if a launch sequence takes longer than a few seconds.
///
/// The fake backend never blocks, so hitting this means the launcher is
/// waiting on something it should not be.
pub async fn with_timeout<F, T>(f: F) -> T
where
    F: std::future::Future<Output = T>,
{
    const LIMIT: Duration = Duration::from_secs(5);
    tokio::time::timeout(LIMIT, f)
        .await
        .unwrap_or_else(|_| panic!("launch sequence did not finish within {LIMIT:?}"))
}
