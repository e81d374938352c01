pub mod agent;
pub mod config;
pub mod extraction;
pub mod http;
pub mod inference;
pub mod session;
pub mod tabular;
pub mod tools;

#[cfg(test)]
mod test_support;

use std::path::Path;
use std::sync::Arc;

use config::ServiceConfig;
use inference::InferenceClient;
use session::SessionManager;

/// Log file name inside `log_dir`.
const LOG_FILE_NAME: &str = "service.log";

/// Rotated log files kept next to the live one.
const LOG_FILES_KEPT: u32 = 3;

/// Initialize the tracing subscriber.
///
/// With `log_dir` set, existing logs are rotated (service.log → .1 → .2 → .3)
/// and a fresh service.log is opened with a line-flushing writer. Otherwise
/// logs go to stdout. `RUST_LOG` overrides the default filter.
pub fn init_tracing(config: &ServiceConfig) -> std::io::Result<()> {
    use tracing_subscriber::fmt;
    use tracing_subscriber::EnvFilter;

    let default_filter = if config.debug {
        "sheet_analyst=debug,tower_http=debug,info"
    } else {
        "sheet_analyst=info,tower_http=info,warn"
    };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_filter));

    let log_path = match &config.log_dir {
        Some(dir) => {
            std::fs::create_dir_all(dir)?;
            let path = dir.join(LOG_FILE_NAME);
            rotate_log_file(&path, LOG_FILES_KEPT);
            Some(path)
        }
        None => None,
    };

    let builder = fmt::fmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_thread_ids(false);

    match (&log_path, config.json_logs) {
        (Some(path), json) => {
            let file = std::fs::OpenOptions::new()
                .create(true)
                .append(true)
                .open(path)?;
            let writer = FlushingWriter::new(file);
            if json {
                builder.json().with_writer(writer).init();
            } else {
                builder.with_writer(writer).with_ansi(false).init();
            }
        }
        (None, true) => builder.json().init(),
        (None, false) => builder.init(),
    }

    tracing::info!(
        version = env!("CARGO_PKG_VERSION"),
        log_file = ?log_path.as_ref().map(|p| p.display().to_string()),
        pid = std::process::id(),
        "=== {} starting ===",
        config.app_name
    );
    Ok(())
}

/// Rotate log files: `service.log` → `service.log.1` → … → `.{keep}`.
///
/// The oldest file beyond `keep` is deleted. Missing files are skipped.
fn rotate_log_file(base_path: &Path, keep: u32) {
    let _ = std::fs::remove_file(format!("{}.{keep}", base_path.display()));

    for i in (1..keep).rev() {
        let from = format!("{}.{i}", base_path.display());
        let to = format!("{}.{}", base_path.display(), i + 1);
        let _ = std::fs::rename(&from, &to);
    }

    if base_path.exists() {
        let _ = std::fs::rename(base_path, format!("{}.1", base_path.display()));
    }
}

/// A file writer that flushes after every write, so log lines survive a crash.
#[derive(Clone)]
struct FlushingWriter {
    file: Arc<std::sync::Mutex<std::fs::File>>,
}

impl FlushingWriter {
    fn new(file: std::fs::File) -> Self {
        Self {
            file: Arc::new(std::sync::Mutex::new(file)),
        }
    }
}

impl std::io::Write for FlushingWriter {
    fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
        let mut f = self
            .file
            .lock()
            .map_err(|e| std::io::Error::other(format!("lock poisoned: {e}")))?;
        let n = std::io::Write::write(&mut *f, buf)?;
        std::io::Write::flush(&mut *f)?;
        Ok(n)
    }

    fn flush(&mut self) -> std::io::Result<()> {
        let mut f = self
            .file
            .lock()
            .map_err(|e| std::io::Error::other(format!("lock poisoned: {e}")))?;
        std::io::Write::flush(&mut *f)
    }
}

impl<'a> tracing_subscriber::fmt::MakeWriter<'a> for FlushingWriter {
    type Writer = FlushingWriter;

    fn make_writer(&'a self) -> Self::Writer {
        self.clone()
    }
}

// ─── Service ────────────────────────────────────────────────────────────────

/// Build the model client and session manager, then serve until Ctrl+C or
/// SIGTERM.
pub async fn run(config: ServiceConfig) -> std::io::Result<()> {
    let client = InferenceClient::new(config.model.clone())
        .map_err(|e| std::io::Error::other(e.to_string()))?;
    if let Err(e) = config.model.validate() {
        // Still serve: the connection-test route reports the problem
        tracing::warn!(error = %e, "model configuration incomplete");
    }

    std::fs::create_dir_all(&config.upload_dir)?;

    let sessions = SessionManager::new(
        Arc::new(client),
        config.output_dir.clone(),
        config.max_agent_steps,
    )
    .with_max_sessions(config.max_sessions);

    tracing::info!(
        model = %config.model.display_name(),
        provider = ?config.model.provider,
        upload_dir = %config.upload_dir.display(),
        output_dir = %config.output_dir.display(),
        max_agent_steps = config.max_agent_steps,
        max_sessions = config.max_sessions,
        "service configured"
    );

    let bind_addr = config.bind_addr.clone();
    let app = http::build_router(http::AppState::new(sessions, config));

    let listener = tokio::net::TcpListener::bind(&bind_addr).await?;
    tracing::info!(addr = %listener.local_addr()?, "listening");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
}

async fn shutdown_signal() {
    let ctrl_c = async {
        let _ = tokio::signal::ctrl_c().await;
    };

    #[cfg(unix)]
    let terminate = async {
        use tokio::signal::unix::{signal, SignalKind};
        match signal(SignalKind::terminate()) {
            Ok(mut sigterm) => {
                sigterm.recv().await;
            }
            Err(e) => {
                tracing::warn!(error = %e, "SIGTERM handler unavailable");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }
    tracing::info!("shutdown signal received");
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rotate_log_file_keeps_last_three() {
        let dir = tempfile::tempdir().unwrap();
        let base = dir.path().join(LOG_FILE_NAME);
        let suffixed = |i: u32| dir.path().join(format!("{LOG_FILE_NAME}.{i}"));

        for generation in 0..5 {
            std::fs::write(&base, format!("run {generation}")).unwrap();
            rotate_log_file(&base, LOG_FILES_KEPT);
        }

        assert!(!base.exists());
        assert_eq!(std::fs::read_to_string(suffixed(1)).unwrap(), "run 4");
        assert_eq!(std::fs::read_to_string(suffixed(2)).unwrap(), "run 3");
        assert_eq!(std::fs::read_to_string(suffixed(3)).unwrap(), "run 2");
        assert!(!suffixed(4).exists());
    }

    #[test]
    fn test_flushing_writer_writes_through() {
        use std::io::Write;

        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("out.log");
        let file = std::fs::File::create(&path).unwrap();
        let mut writer = FlushingWriter::new(file);

        writer.write_all(b"line one\n").unwrap();
        assert_eq!(std::fs::read_to_string(&path).unwrap(), "line one\n");
    }
}
