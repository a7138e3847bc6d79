use anyhow::Context;
use bridge::snapshot::SnapshotBridge;
use clap::Parser;
use generator::script::parse_hex;
use radarcore::protocol::ResyncPolicy;
use radarcore::simulation::ProfileKind;
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::PathBuf;
use std::sync::Arc;
use tokio::runtime::Builder as TokioBuilder;
use workflow::capture::decode_capture;
use workflow::config::WorkflowConfig;
use workflow::realtime::{serve, FrameSink};
use workflow::runner::Runner;

mod bridge;
mod generator;
mod workflow;

#[derive(Parser)]
#[command(author, version, about = "LD2451 radar link emulator")]
struct Args {
    /// Load a workflow config from YAML
    #[arg(long)]
    workflow: Option<PathBuf>,
    /// Ticks to simulate offline (default 600, i.e. one minute)
    #[arg(long)]
    ticks: Option<u64>,
    #[arg(long)]
    seed: Option<u64>,
    /// constant_speed, near_field_braking, passing_veer or brake_and_veer
    #[arg(long)]
    profile: Option<ProfileKind>,
    /// Try to resynchronise on a header inside rejected frames
    #[arg(long, default_value_t = false)]
    scan_resync: bool,
    /// Raw command bytes in hex, delivered before the first tick
    #[arg(long)]
    inject: Option<String>,
    /// Write transmitted bytes to this file
    #[arg(long)]
    output: Option<PathBuf>,
    /// Decode a captured byte stream instead of simulating
    #[arg(long)]
    decode: Option<PathBuf>,
    /// Print a JSON snapshot after every frame
    #[arg(long, default_value_t = false)]
    json: bool,
    /// Run on the wall clock until Ctrl+C
    #[arg(long, default_value_t = false)]
    serve: bool,
}

fn main() -> anyhow::Result<()> {
    env_logger::init();
    let args = Args::parse();

    let resync = args.scan_resync.then_some(ResyncPolicy::ScanForHeader);
    let workflow_config = match &args.workflow {
        Some(path) => WorkflowConfig::load(path)?,
        None => WorkflowConfig::from_args(600, 0, ProfileKind::default()),
    }
    .with_overrides(args.ticks, args.seed, args.profile, resync);

    if let Some(path) = &args.decode {
        for captured in decode_capture(path, workflow_config.resync)? {
            println!("{}", serde_json::to_string(&captured)?);
        }
        return Ok(());
    }

    let inject = match &args.inject {
        Some(text) => parse_hex(text).context("parsing --inject bytes")?,
        None => Vec::new(),
    };

    if args.serve {
        let bridge = Arc::new(SnapshotBridge::new());
        let sink = match &args.output {
            Some(path) => FrameSink::Writer(Box::new(BufWriter::new(
                File::create(path)
                    .with_context(|| format!("creating output {}", path.display()))?,
            ))),
            None => FrameSink::Stdout,
        };
        let runtime = TokioBuilder::new_multi_thread()
            .enable_all()
            .build()
            .context("creating runtime for the real-time link")?;
        return runtime.block_on(serve(workflow_config, inject, bridge, sink));
    }

    let runner = Runner::new(workflow_config.clone());
    let json = args.json;
    let result = runner.execute_with(&inject, |tick, snapshot| {
        if json {
            match snapshot.to_json() {
                Ok(line) => println!("{{\"tick\":{},\"snapshot\":{}}}", tick, line),
                Err(err) => log::warn!("snapshot serialization failed: {}", err),
            }
        }
    })?;

    println!(
        "Offline run -> ticks {}, frames {}, bytes {}, closest {:?}, config {:?}",
        result.ticks,
        result.frames_emitted,
        result.stream.len(),
        result.snapshot.closest_distance,
        result.config
    );
    println!("Metrics -> {}", serde_json::to_string(&result.metrics)?);

    if let Some(path) = &args.output {
        let mut file =
            File::create(path).with_context(|| format!("creating output {}", path.display()))?;
        file.write_all(&result.stream)
            .with_context(|| format!("writing output {}", path.display()))?;
    }

    Ok(())
}
