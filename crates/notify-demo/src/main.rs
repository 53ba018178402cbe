//! # Typed Notifications Demo
//!
//! Walks through the typed notification layer end to end:
//!
//! 1. Initialize logging from the environment
//! 2. Register the `MyAppNotifs` catalog with the default center
//! 3. Observe one name synchronously, launches on a queue, and the whole catalog
//! 4. Post a launch and a download notification
//! 5. Try to observe a download with the wrong catalog and show the rejection
//! 6. Dump stats and drop the tokens

use std::time::{Duration, SystemTime, UNIX_EPOCH};

use anyhow::{bail, Context, Result};
use notify_telemetry::{init_logging, TelemetryConfig};
use tokio::sync::mpsc;
use tracing::{info, warn};
use typed_notify::{notification_catalog, NotificationEnum, NotifyError, TypedNotificationCenter};

notification_catalog! {
    /// Notifications the app itself raises.
    #[derive(Debug, Clone)]
    pub enum MyAppNotifs {
        APP_HAS_LAUNCHED => AppHasLaunched { launch_date: u64 },
        APP_DOWNLOADED_DATA => AppDownloadedData { title: String, index: i64 },
        #[allow(dead_code)]
        APP_WILL_CRASH => AppWillCrash(String),
    }
}

notification_catalog! {
    /// An unrelated catalog, used to show a mismatched observer.
    #[derive(Debug, Clone)]
    pub enum MyAppOtherNotifs {
        #[allow(dead_code)]
        SOMETHING_IS_WRONG => SomethingIsWrong,
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let config = TelemetryConfig::from_env().for_service("notify-demo");
    let _logging = init_logging(&config).context("failed to initialize logging")?;

    let center = TypedNotificationCenter::default_center();
    let registered = center
        .register::<MyAppNotifs>()
        .context("failed to register MyAppNotifs")?;
    info!(registered, "Catalog registered");

    // Synchronous observer for one name.
    let download_token = center
        .observe::<MyAppNotifs, _>(MyAppNotifs::APP_DOWNLOADED_DATA, |note| {
            if let MyAppNotifs::AppDownloadedData { title, index } = note {
                info!(%title, index, "Received download");
            }
        })
        .context("failed to observe downloads")?;

    // Launches on a queue, plus the whole catalog, forwarded to this task.
    let (tx, mut rx) = mpsc::unbounded_channel();
    let queue = center.queue("main").context("failed to create delivery queue")?;
    let queued_tx = tx.clone();
    let launch_token = center
        .add_observer::<MyAppNotifs, _>(
            MyAppNotifs::APP_HAS_LAUNCHED,
            None,
            Some(queue),
            move |note, _| {
                if let MyAppNotifs::AppHasLaunched { launch_date } = note {
                    info!(launch_date, "Launch seen on queue");
                }
                let _ = queued_tx.send(note.name());
            },
        )
        .context("failed to observe launches")?;
    let all_token = center
        .observe_all::<MyAppNotifs, _>(move |note, _| {
            let _ = tx.send(note.name());
        })
        .context("failed to observe catalog")?;

    let launch_date = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .context("system clock before UNIX epoch")?
        .as_secs();
    center.post(MyAppNotifs::AppHasLaunched { launch_date })?;
    center.post(MyAppNotifs::AppDownloadedData {
        title: "Test".to_string(),
        index: 5,
    })?;

    // launch (queued) + launch + download (catalog observer)
    for _ in 0..3 {
        let name = tokio::time::timeout(Duration::from_secs(1), rx.recv())
            .await
            .context("timed out waiting for delivery")?
            .context("observer channel closed")?;
        info!(name = %name, "Forwarded delivery");
    }

    match center.observe::<MyAppOtherNotifs, _>(MyAppNotifs::APP_DOWNLOADED_DATA, |note| {
        info!(?note, "Unreachable: mismatched observer fired");
    }) {
        Err(err @ NotifyError::NameNotInCatalog { .. }) => {
            warn!(error = %err, "Mismatched observer rejected at registration");
        }
        Err(err) => return Err(err).context("unexpected registration failure"),
        Ok(_) => bail!("mismatched observer was accepted"),
    }

    let stats = serde_json::to_string(&center.stats()).context("failed to serialize stats")?;
    info!(%stats, "Notification stats");

    drop(download_token);
    drop(launch_token);
    drop(all_token);
    info!(observers = center.bus().observer_count(), "Tokens dropped");

    Ok(())
}
