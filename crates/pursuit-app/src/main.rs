use std::process::ExitCode;

use pursuit_app::config::AppConfig;
use pursuit_app::state::AppState;
use pursuit_app::telemetry::init_tracing;

fn main() -> ExitCode {
    // Load .env locally; safe to ignore when not present.
    let _ = dotenvy::dotenv();
    init_tracing();

    let config = AppConfig::from_env();
    tracing::info!(
        mode = ?config.mode,
        preset = ?config.preset,
        policy = ?config.policy,
        feed = %config.feed_addr,
        "starting pursuit controller"
    );

    let state = AppState::new();
    match pursuit_app::run(&config, &state) {
        Ok(report) => {
            if let Some(last) = report.summary.last {
                match serde_json::to_string(&last) {
                    Ok(json) => tracing::info!(ticks = report.summary.ticks, last = %json, "finished"),
                    Err(e) => tracing::warn!(error = %e, "could not encode final aim command"),
                }
            }
            ExitCode::SUCCESS
        }
        Err(e) => {
            tracing::error!(error = %e, "pursuit controller failed");
            ExitCode::FAILURE
        }
    }
}
