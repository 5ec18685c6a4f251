//! Log setup for the `docsearch` binary.

use std::sync::Once;
use tracing::Level;
use tracing_subscriber::EnvFilter;

/// Environment variable holding an `EnvFilter` directive string.
pub const LOG_ENV: &str = "DOCSEARCH_LOG";

static INIT: Once = Once::new();

/// Install the global subscriber once; later calls are ignored.
///
/// `DOCSEARCH_LOG` wins over `verbosity`. Logs go to stderr so result rows on
/// stdout stay clean.
pub fn init(verbosity: u8) {
    INIT.call_once(|| {
        let testing = cfg!(test) || std::env::var("NEXTEST").is_ok();
        let fallback = match verbosity {
            _ if testing => Level::DEBUG,
            0 => Level::WARN,
            1 => Level::INFO,
            2 => Level::DEBUG,
            _ => Level::TRACE,
        };
        let filter = EnvFilter::try_from_env(LOG_ENV)
            .unwrap_or_else(|_| EnvFilter::default().add_directive(fallback.into()));

        let builder = tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_ansi(false)
            .with_target(verbosity > 1)
            .compact();

        let installed = if testing {
            builder.with_test_writer().try_init()
        } else {
            builder.with_writer(std::io::stderr).try_init()
        };
        if let Err(e) = installed
            && !testing
        {
            eprintln!("Failed to initialize logging: {}", e);
        }
    });
}
