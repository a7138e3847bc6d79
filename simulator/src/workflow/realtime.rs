use crate::bridge::snapshot::SnapshotBridge;
use crate::generator::script::{to_hex, CommandScript};
use crate::workflow::config::WorkflowConfig;
use crate::workflow::runner::{feed_bytes, step};
use anyhow::Context;
use log::{debug, info, warn};
use radarcore::protocol::EncodedFrame;
use radarcore::telemetry::MetricsSnapshot;
use radarcore::{LinkEvent, RadarLink};
use std::future::Future;
use std::io::{IsTerminal, Read, Write};
use std::sync::Arc;
use std::time::Duration;
use tokio::signal;
use tokio::sync::{mpsc, Mutex};
use tokio::time::{self, MissedTickBehavior};

/// Where transmitted frames go in real-time mode.
pub enum FrameSink {
    /// One hex line per frame on stdout.
    Stdout,
    Writer(Box<dyn Write + Send>),
}

impl FrameSink {
    fn write_frame(&mut self, frame: &EncodedFrame) -> anyhow::Result<()> {
        match self {
            FrameSink::Stdout => println!("{}", to_hex(frame.as_bytes())),
            FrameSink::Writer(writer) => {
                frame.send_to(writer).context("writing frame")?;
                writer.flush().context("flushing frame sink")?;
            }
        }
        Ok(())
    }
}

/// Runs the link on the wall clock until Ctrl+C. Raw command bytes piped
/// into stdin reach the byte handler as they arrive.
pub async fn serve(
    config: WorkflowConfig,
    inject: Vec<u8>,
    bridge: Arc<SnapshotBridge>,
    sink: FrameSink,
) -> anyhow::Result<()> {
    let (tx, rx) = mpsc::channel::<u8>(256);
    forward_stdin(tx);

    let shutdown = async { signal::ctrl_c().await.context("awaiting Ctrl+C to exit") };
    let metrics = run_until(config, &inject, rx, bridge.clone(), sink, shutdown).await?;
    bridge.publish_status(&format!(
        "stopped: {} frames sent, {} commands applied, {} ignored",
        metrics.frames_emitted, metrics.commands_applied, metrics.commands_ignored
    ));
    Ok(())
}

fn forward_stdin(tx: mpsc::Sender<u8>) {
    let stdin = std::io::stdin();
    if stdin.is_terminal() {
        return;
    }
    std::thread::spawn(move || {
        for byte in stdin.lock().bytes() {
            match byte {
                Ok(byte) => {
                    if tx.blocking_send(byte).is_err() {
                        break;
                    }
                }
                Err(err) => {
                    warn!("stdin read failed: {}", err);
                    break;
                }
            }
        }
    });
}

/// Drives the link until `shutdown` resolves and returns the final metrics.
///
/// Bytes from `incoming` are handled by their own task. Injected bytes and
/// scheduled commands are applied under the same lock as the tick they
/// precede, so a command due at tick N is in effect for tick N.
pub async fn run_until<F>(
    config: WorkflowConfig,
    inject: &[u8],
    mut incoming: mpsc::Receiver<u8>,
    bridge: Arc<SnapshotBridge>,
    mut sink: FrameSink,
    shutdown: F,
) -> anyhow::Result<MetricsSnapshot>
where
    F: Future<Output = anyhow::Result<()>>,
{
    let mut link = RadarLink::new(config.link, config.simulation.clone(), config.resync);
    feed_bytes(&mut link, inject);
    let period = link.clock().interval();
    let link = Arc::new(Mutex::new(link));

    let byte_link = link.clone();
    let byte_task = tokio::spawn(async move {
        while let Some(byte) = incoming.recv().await {
            let event = byte_link.lock().await.on_byte(byte);
            if let Some(LinkEvent::Command { command, outcome }) = event {
                info!("command {:?} -> {:?}", command, outcome);
            }
        }
    });

    let reader = bridge.handle();
    let poller = tokio::spawn(async move {
        let mut every = time::interval(Duration::from_secs(1));
        loop {
            every.tick().await;
            if let Ok(snapshot) = reader.read() {
                debug!(
                    "consumer view: {} targets, closest {:?}",
                    snapshot.count, snapshot.closest_distance
                );
            }
        }
    });

    let mut script = CommandScript::new(config.commands.clone());
    let mut interval = time::interval(period);
    interval.set_missed_tick_behavior(MissedTickBehavior::Delay);
    tokio::pin!(shutdown);

    bridge.publish_status("real-time link running (Ctrl+C to stop)...");
    loop {
        tokio::select! {
            _ = interval.tick() => {
                let (frame, snapshot) = {
                    let mut guard = link.lock().await;
                    let frame = step(&mut guard, &mut script);
                    (frame, guard.snapshot())
                };
                if let Some(frame) = frame {
                    sink.write_frame(&frame)?;
                }
                if let Err(err) = bridge.publish(&snapshot) {
                    warn!("snapshot publish failed: {}", err);
                }
            }
            result = &mut shutdown => {
                result?;
                break;
            }
        }
    }

    poller.abort();
    byte_task.abort();
    let metrics = link.lock().await.metrics().snapshot();
    Ok(metrics)
}
