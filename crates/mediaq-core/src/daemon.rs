//! The daemon control loop.
//!
//! A single-threaded loop drives the batch window: wait indefinitely for
//! the first link of a cycle, then bounded waits until the inactivity
//! threshold closes the window, then classify → notify → enrich → order →
//! dispatch, and back to idle. Only the enrichment stage is concurrent.
//! No error escalates out of the loop; the daemon runs until cancellation
//! or until the link source closes.

use tokio_util::sync::CancellationToken;

use crate::config::DaemonConfig;
use crate::enrich::{EnrichService, EnrichSummary};
use crate::link::{Batch, LinkKind};
use crate::order::{self, OrderMode};
use crate::traits::{Fetcher, LinkReceiver, Notifier, PlayerLauncher};
use crate::window::BatchWindow;

/// Events emitted by the daemon for monitoring/logging.
#[derive(Debug, Clone)]
pub enum DaemonEvent<'a> {
    Started {
        wait_period_ms: u128,
    },
    WaitingFirstLink,
    LinkAccepted {
        text: &'a str,
        pending: usize,
    },
    BatchClosed {
        size: usize,
    },
    EnrichmentFinished {
        summary: EnrichSummary,
    },
    Dispatching {
        mode: OrderMode,
        links: &'a [String],
    },
    DispatchFailed {
        error: &'a str,
    },
    SourceClosed,
    Stopped,
}

/// Trait for receiving daemon events (decoupled logging).
pub trait DaemonReporter: Send + Sync {
    fn report(&self, event: DaemonEvent<'_>) {
        let _ = event;
    }
}

/// Reporter that uses the `tracing` crate.
#[derive(Debug, Default, Clone, Copy)]
pub struct TracingDaemonReporter;

impl DaemonReporter for TracingDaemonReporter {
    fn report(&self, event: DaemonEvent<'_>) {
        match event {
            DaemonEvent::Started { wait_period_ms } => {
                tracing::info!(%wait_period_ms, "Daemon started");
            }
            DaemonEvent::WaitingFirstLink => {
                tracing::info!("Waiting for initial link");
            }
            DaemonEvent::LinkAccepted { text, pending } => {
                tracing::info!(link = %text, %pending, "Link accepted");
            }
            DaemonEvent::BatchClosed { size } => {
                tracing::info!(%size, "Batch settled, processing");
            }
            DaemonEvent::EnrichmentFinished { summary } => {
                tracing::info!(
                    spawned = summary.spawned,
                    resolved = summary.resolved,
                    failed = summary.failed,
                    "Enrichment finished"
                );
            }
            DaemonEvent::Dispatching { mode, links } => {
                tracing::info!(%mode, count = links.len(), "Dispatching playlist");
                for link in links {
                    tracing::debug!(%link, "Playlist entry");
                }
            }
            DaemonEvent::DispatchFailed { error } => {
                tracing::error!(%error, "Player dispatch failed");
            }
            DaemonEvent::SourceClosed => {
                tracing::info!("Link source closed, flushing");
            }
            DaemonEvent::Stopped => {
                tracing::info!("Daemon stopped");
            }
        }
    }
}

/// The aggregation daemon, generic over all external collaborators.
pub struct Daemon<R, F, P, N>
where
    R: LinkReceiver,
    F: Fetcher,
    P: PlayerLauncher,
    N: Notifier,
{
    receiver: R,
    enricher: EnrichService<F>,
    launcher: P,
    notifier: N,
    window: BatchWindow,
    config: DaemonConfig,
}

impl<R, F, P, N> Daemon<R, F, P, N>
where
    R: LinkReceiver,
    F: Fetcher + 'static,
    P: PlayerLauncher,
    N: Notifier,
{
    pub fn new(receiver: R, fetcher: F, launcher: P, notifier: N, config: DaemonConfig) -> Self {
        Self {
            receiver,
            enricher: EnrichService::new(fetcher, config.recurse_directories),
            launcher,
            notifier,
            window: BatchWindow::new(config.wait_period),
            config,
        }
    }

    /// Run the daemon loop until cancellation or source close.
    pub async fn run<DR: DaemonReporter>(&mut self, cancel_token: CancellationToken, reporter: &DR) {
        reporter.report(DaemonEvent::Started {
            wait_period_ms: self.config.wait_period.as_millis(),
        });

        loop {
            if !self.window.is_open() {
                // Idle: wait as long as needed for the first link of a cycle.
                reporter.report(DaemonEvent::WaitingFirstLink);
                tokio::select! {
                    () = cancel_token.cancelled() => break,
                    received = self.receiver.recv() => match received {
                        Some((text, at)) => self.accept(text, at, reporter),
                        None => {
                            reporter.report(DaemonEvent::SourceClosed);
                            break;
                        }
                    },
                }
            } else {
                // Collecting: bounded wait until the window is due to close.
                let wait = self
                    .window
                    .time_until_close(tokio::time::Instant::now())
                    .unwrap_or_default();
                tokio::select! {
                    () = cancel_token.cancelled() => break,
                    received = tokio::time::timeout(wait, self.receiver.recv()) => match received {
                        Ok(Some((text, at))) => self.accept(text, at, reporter),
                        Ok(None) => {
                            // Source closed mid-batch: deliver what we have.
                            reporter.report(DaemonEvent::SourceClosed);
                            if let Some(links) = self.window.force_close() {
                                self.process_batch(links, reporter).await;
                            }
                            break;
                        }
                        Err(_elapsed) => {
                            if let Some(links) =
                                self.window.try_close(tokio::time::Instant::now())
                            {
                                self.process_batch(links, reporter).await;
                            }
                        }
                    },
                }
            }
        }

        reporter.report(DaemonEvent::Stopped);
    }

    fn accept<DR: DaemonReporter>(&mut self, text: String, at: tokio::time::Instant, reporter: &DR) {
        reporter.report(DaemonEvent::LinkAccepted {
            text: &text,
            pending: self.window.pending_len() + 1,
        });
        self.window.submit(text, at);
    }

    /// Enrich, order, and dispatch one closed batch. Failures are logged
    /// and the batch is considered consumed either way.
    async fn process_batch<DR: DaemonReporter>(&mut self, links: Vec<String>, reporter: &DR) {
        reporter.report(DaemonEvent::BatchClosed { size: links.len() });

        let mut batch = Batch::from_links(links);

        // One-shot latency notice, before the fetches start.
        if self.config.notify_on_enumerate
            && self.config.recurse_directories
            && batch.contains_kind(LinkKind::Directory)
        {
            self.notifier
                .notify("Directories passed to mediaq. Standby for enumeration")
                .await;
        }

        let summary = self.enricher.enrich(&mut batch).await;
        reporter.report(DaemonEvent::EnrichmentFinished { summary });

        let mode = order::select_mode(&batch, self.config.recurse_directories);
        let ordered = order::apply(mode, batch);
        reporter.report(DaemonEvent::Dispatching {
            mode,
            links: &ordered,
        });

        if let Err(e) = self.launcher.launch(&ordered).await {
            // At-most-once dispatch: no retry, no requeue.
            let error = e.to_string();
            reporter.report(DaemonEvent::DispatchFailed { error: &error });
        }

        self.window.mark_dispatched();
        self.window.reset();
    }
}
