//! Typeahead Sample Application Entry Point
//!
//! Types each command-line argument (or a built-in script) into a search
//! box, one keystroke at a time, and reports which searches and draft saves
//! actually ran.

use std::time::Duration;

use fnadapt::timer::TokioScheduler;
use tokio::task::LocalSet;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};
use typeahead::config::AppConfig;
use typeahead::session::Session;

const KEYSTROKE_INTERVAL: Duration = Duration::from_millis(120);

#[tokio::main(flavor = "current_thread")]
async fn main() {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info,typeahead=debug,fnadapt=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = match AppConfig::from_env() {
        Ok(config) => {
            tracing::info!(
                "Configuration loaded: debounce={}ms, throttle={}ms ({:?})",
                config.search.delay_ms,
                config.autosave.delay_ms,
                config.autosave.edge
            );
            config
        }
        Err(e) => {
            tracing::warn!("Failed to load configuration from environment: {e}");
            tracing::info!("Using default configuration");
            AppConfig::default()
        }
    };

    let words: Vec<String> = std::env::args().skip(1).collect();
    let words = if words.is_empty() {
        vec!["rust".to_string(), "rust async".to_string()]
    } else {
        words
    };

    LocalSet::new().run_until(run(config, words)).await;
}

async fn run(config: AppConfig, words: Vec<String>) {
    let scheduler = TokioScheduler::new();
    let session = match Session::new(&config, &scheduler) {
        Ok(session) => session,
        Err(error) => {
            tracing::error!(%error, "failed to build session");
            return;
        }
    };

    for word in &words {
        for (end, _) in word.char_indices().skip(1).chain([(word.len(), ' ')]) {
            if let Err(error) = session.keystroke(&word[..end]) {
                tracing::error!(%error, "keystroke failed");
            }
            tokio::time::sleep(KEYSTROKE_INTERVAL).await;
        }
        // Pause between words so the debounced search can run.
        tokio::time::sleep(config.search.delay() * 2).await;
    }

    while scheduler.pending() > 0 {
        tokio::time::sleep(KEYSTROKE_INTERVAL).await;
    }

    let activity = session.activity();
    tracing::info!(searches = ?activity.searches, saves = ?activity.saves, "session finished");
}
