//! Background provider thread.
//!
//! Owns all I/O the UI needs: reading the odds snapshot from disk (including
//! re-reads when the scraper rewrites the file underneath us) and fetching
//! preview payloads from the analysis API. Results flow back to the UI as
//! `Delta`s; the UI sends `ProviderCommand`s the other way.

use std::env;
use std::path::PathBuf;
use std::sync::mpsc::{Receiver, Sender};
use std::thread;
use std::time::{Duration, Instant, SystemTime};

use crate::preview_fetch;
use crate::snapshot::load_snapshot;
use crate::state::{Delta, ProviderCommand};

pub fn spawn_provider(tx: Sender<Delta>, cmd_rx: Receiver<ProviderCommand>) {
    thread::spawn(move || {
        let path = snapshot_path();
        let poll_interval = Duration::from_secs(
            env::var("SNAPSHOT_POLL_SECS")
                .ok()
                .and_then(|val| val.parse::<u64>().ok())
                .unwrap_or(5)
                .max(1),
        );

        let mut last_modified: Option<SystemTime> = None;
        let mut last_poll = Instant::now() - poll_interval;

        reload(&path, &tx, &mut last_modified);

        loop {
            thread::sleep(Duration::from_millis(200));

            // Pick up external rewrites of the snapshot without a keypress.
            if last_poll.elapsed() >= poll_interval {
                if snapshot_changed(&path, last_modified) {
                    reload(&path, &tx, &mut last_modified);
                }
                last_poll = Instant::now();
            }

            while let Ok(cmd) = cmd_rx.try_recv() {
                match cmd {
                    ProviderCommand::ReloadSnapshot => {
                        reload(&path, &tx, &mut last_modified);
                    }
                    ProviderCommand::FetchPreview { match_id } => {
                        match preview_fetch::fetch_preview(&match_id) {
                            Ok(preview) => {
                                let _ = tx.send(Delta::SetPreview {
                                    id: match_id,
                                    preview,
                                });
                            }
                            Err(err) => {
                                let _ =
                                    tx.send(Delta::Log(format!("[WARN] Preview error: {err:#}")));
                                let _ = tx.send(Delta::PreviewFailed { id: match_id });
                            }
                        }
                    }
                }
            }
        }
    });
}

pub fn snapshot_path() -> PathBuf {
    env::var("ODDS_SNAPSHOT_FILE")
        .ok()
        .filter(|val| !val.trim().is_empty())
        .map(PathBuf::from)
        .unwrap_or_else(|| PathBuf::from("data.json"))
}

fn snapshot_changed(path: &PathBuf, last_modified: Option<SystemTime>) -> bool {
    let Ok(modified) = std::fs::metadata(path).and_then(|meta| meta.modified()) else {
        return false;
    };
    last_modified != Some(modified)
}

fn reload(path: &PathBuf, tx: &Sender<Delta>, last_modified: &mut Option<SystemTime>) {
    *last_modified = std::fs::metadata(path).and_then(|meta| meta.modified()).ok();
    match load_snapshot(path) {
        Ok(snapshot) => {
            let _ = tx.send(Delta::SetSnapshot {
                upcoming: snapshot.upcoming,
                finished: snapshot.finished,
            });
        }
        Err(err) => {
            let _ = tx.send(Delta::Log(format!("[WARN] Snapshot error: {err:#}")));
            let _ = tx.send(Delta::SetSnapshot {
                upcoming: Vec::new(),
                finished: Vec::new(),
            });
        }
    }
}
