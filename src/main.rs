use std::panic::AssertUnwindSafe;
use std::sync::Arc;

use futures::FutureExt;
use tokio::io::{self, AsyncBufReadExt, AsyncWriteExt, BufReader};
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

use phrase_core::config::CoreConfig;
use phrase_core::{protocol, PhraseIndex};

fn init_tracing(default_filter: &str) {
    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(default_filter))
        .unwrap_or_else(|_| EnvFilter::new("info"));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

#[tokio::main]
async fn main() {
    let config_path = CoreConfig::default_path();
    let (config, config_error) = match CoreConfig::load(&config_path) {
        Ok(c) => (c, None),
        Err(e) => (CoreConfig::default(), Some(e)),
    };

    init_tracing(&config.log_filter);
    if let Some(e) = config_error {
        error!("{e}; falling back to defaults");
    }

    let index = match PhraseIndex::from_config(&config) {
        Ok(i) => Arc::new(i),
        Err(e) => {
            error!("cannot set up pack source: {e}");
            return;
        }
    };

    info!(
        "phrase-core starting: {} languages from {}",
        config.languages.len(),
        config.pack_root
    );

    let preload = index.clone();
    tokio::spawn(async move {
        preload.ensure_loaded().await;
    });

    let mut lines = BufReader::new(io::stdin()).lines();
    let mut stdout = io::stdout();

    loop {
        let line = match lines.next_line().await {
            Ok(Some(l)) => l,
            Ok(None) => break,
            Err(_) => continue,
        };

        if line.trim().is_empty() {
            continue;
        }

        let result = AssertUnwindSafe(protocol::handle(&index, &line))
            .catch_unwind()
            .await;

        let response = match result {
            Ok(resp) => resp,
            Err(_) => serde_json::json!({
                "status": "error",
                "message": "internal core error"
            })
            .to_string(),
        };

        if stdout.write_all(format!("{response}\n").as_bytes()).await.is_err() {
            break;
        }

        let _ = stdout.flush().await;
    }
}
