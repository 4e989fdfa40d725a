use tracing_subscriber::EnvFilter;

/// Guard held by `main` for the lifetime of the process.
pub struct Telemetry;

/// Install the global tracing subscriber.
///
/// `LIKECOUNT_LOG` sets the filter directives (default `info`);
/// `LIKECOUNT_LOG_FORMAT=json` switches to JSON lines. Both streams go to
/// stderr so stdout stays clean for `--dry-run` report output.
pub fn init() -> Telemetry {
    let filter =
        EnvFilter::try_from_env("LIKECOUNT_LOG").unwrap_or_else(|_| EnvFilter::new("info"));
    let json = std::env::var("LIKECOUNT_LOG_FORMAT").is_ok_and(|v| v.eq_ignore_ascii_case("json"));

    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr);
    let result = if json {
        builder.json().try_init()
    } else {
        builder.try_init()
    };
    if let Err(e) = result {
        eprintln!("telemetry init failed: {e}");
    }
    Telemetry
}
