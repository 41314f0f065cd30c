//! Periodic dashboard update task

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

use std::sync::mpsc::{self, RecvTimeoutError, Sender};
use std::thread::{self, JoinHandle};
use std::time::Duration;
use log::{error, info};

// ---------------------------------------------------------------------------
// DATA STRUCTURES
// ---------------------------------------------------------------------------

/// A thread calling a dashboard update function at a fixed period.
///
/// The thread is stopped and joined when the task is dropped. It is never
/// restarted.
pub struct DashboardTask {
    stop_tx: Sender<()>,
    handle: Option<JoinHandle<()>>,
}

// ---------------------------------------------------------------------------
// IMPLEMENTATIONS
// ---------------------------------------------------------------------------

impl DashboardTask {
    /// Spawn the task, `update` is first called immediately.
    pub fn spawn<F>(period: Duration, mut update: F) -> std::io::Result<Self>
    where
        F: FnMut() + Send + 'static
    {
        let (stop_tx, stop_rx) = mpsc::channel::<()>();

        let handle = thread::Builder::new()
            .name("dashboard".into())
            .spawn(move || loop {
                update();

                // Sleep for the period, waking early if asked to stop
                match stop_rx.recv_timeout(period) {
                    Err(RecvTimeoutError::Timeout) => continue,
                    Ok(()) | Err(RecvTimeoutError::Disconnected) => {
                        info!("Dashboard task stopped");
                        break;
                    }
                }
            })?;

        Ok(Self {
            stop_tx,
            handle: Some(handle),
        })
    }

    /// Stop the task and wait for the thread to exit.
    pub fn stop(mut self) {
        self.shutdown();
    }

    fn shutdown(&mut self) {
        if let Some(handle) = self.handle.take() {
            // The thread may already have gone, in which case there's nobody to tell
            self.stop_tx.send(()).ok();

            if handle.join().is_err() {
                error!("Dashboard task panicked");
            }
        }
    }
}

impl Drop for DashboardTask {
    fn drop(&mut self) {
        self.shutdown();
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use std::sync::{atomic::{AtomicUsize, Ordering}, Arc};

    #[test]
    fn test_dashboard_runs_until_stopped() {
        let count = Arc::new(AtomicUsize::new(0));
        let c = count.clone();

        let task = DashboardTask::spawn(Duration::from_millis(5), move || {
            c.fetch_add(1, Ordering::SeqCst);
        }).unwrap();

        thread::sleep(Duration::from_millis(50));
        task.stop();

        let after_stop = count.load(Ordering::SeqCst);
        assert!(after_stop >= 2);

        thread::sleep(Duration::from_millis(20));
        assert_eq!(count.load(Ordering::SeqCst), after_stop);
    }

    #[test]
    fn test_stop_wakes_long_period() {
        let task = DashboardTask::spawn(Duration::from_secs(3600), || ()).unwrap();
        let start = std::time::Instant::now();
        task.stop();
        assert!(start.elapsed() < Duration::from_secs(5));
    }
}
