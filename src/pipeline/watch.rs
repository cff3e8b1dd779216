// ABOUTME: Watch task reacting to source file changes
// ABOUTME: Debounced filesystem events trigger the matching lint task or a reload notice

use async_trait::async_trait;
use notify::RecursiveMode;
use notify_debouncer_mini::{new_debouncer, DebouncedEvent, DebouncedEventKind};
use std::path::Path;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::mpsc;
use tracing::{debug, error, info, warn};

use crate::pipeline::lint::LintTask;
use crate::runner::{ActionOutput, BuildContext, Result, RunnerError, TaskAction};

const WATCH_DEBOUNCE_MS: u64 = 100;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ChangeKind {
    Script,
    Markup,
    Other,
}

fn classify(path: &Path) -> ChangeKind {
    match path.extension().and_then(|e| e.to_str()) {
        Some("js") => ChangeKind::Script,
        Some("html") => ChangeKind::Markup,
        _ => ChangeKind::Other,
    }
}

/// Watches the application sources in the background. The action itself
/// returns once the watcher is installed so dependent tasks (the dev server)
/// can start.
pub struct WatchTask;

#[async_trait]
impl TaskAction for WatchTask {
    async fn run(&self, ctx: Arc<BuildContext>) -> Result<ActionOutput> {
        let app_dir = ctx.paths().app_dir();
        if !app_dir.exists() {
            return Err(RunnerError::action(format!(
                "Watch directory does not exist: {}",
                app_dir.display()
            )));
        }

        let (tx, rx) = mpsc::unbounded_channel::<DebouncedEvent>();

        let mut debouncer = new_debouncer(
            Duration::from_millis(WATCH_DEBOUNCE_MS),
            move |events: std::result::Result<Vec<DebouncedEvent>, notify::Error>| {
                let events = match events {
                    Ok(evts) => evts,
                    Err(e) => {
                        warn!("Watch error: {}", e);
                        return;
                    }
                };
                for event in events {
                    if event.kind != DebouncedEventKind::Any {
                        continue;
                    }
                    let _ = tx.send(event);
                }
            },
        )
        .map_err(|e| RunnerError::action(format!("Failed to create watcher: {}", e)))?;

        debouncer
            .watcher()
            .watch(&app_dir, RecursiveMode::Recursive)
            .map_err(|e| {
                RunnerError::action(format!("Failed to watch {}: {}", app_dir.display(), e))
            })?;

        info!("Watching {} for changes", app_dir.display());

        let watch_ctx = Arc::clone(&ctx);
        tokio::spawn(async move {
            // The debouncer must stay alive for as long as events flow.
            let _debouncer = debouncer;
            dispatch_changes(rx, watch_ctx).await;
        });

        Ok(ActionOutput::with_message(format!(
            "Watching {}",
            app_dir.display()
        )))
    }
}

async fn dispatch_changes(
    mut rx: mpsc::UnboundedReceiver<DebouncedEvent>,
    ctx: Arc<BuildContext>,
) {
    while let Some(event) = rx.recv().await {
        debug!("Change detected: {}", event.path.display());
        match classify(&event.path) {
            ChangeKind::Script => {
                if let Err(e) = LintTask::scripts().run(Arc::clone(&ctx)).await {
                    error!("{}", e);
                }
            }
            ChangeKind::Markup => {
                if let Err(e) = LintTask::markup().run(Arc::clone(&ctx)).await {
                    error!("{}", e);
                }
            }
            ChangeKind::Other => {
                info!("Changed: {}", event.path.display());
            }
        }
    }
}
