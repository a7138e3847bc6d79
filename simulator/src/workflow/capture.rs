use anyhow::Context;
use radarcore::protocol::constants::BAUD_RATE;
use radarcore::protocol::{ResyncPolicy, TelemetryFrame};
use radarcore::RadarController;
use std::fs;
use std::path::Path;

/// Seconds to move one byte at 115200 baud, 8N1.
const BYTE_TIME: f64 = 10.0 / BAUD_RATE as f64;

/// A frame decoded from a capture, stamped with its arrival time.
#[derive(Debug, Clone, serde::Serialize)]
pub struct CapturedFrame {
    pub time: f64,
    pub closest_distance: Option<u8>,
    pub frame: TelemetryFrame,
}

pub fn decode_bytes(bytes: &[u8], policy: ResyncPolicy) -> Vec<CapturedFrame> {
    let mut controller = RadarController::new(policy);
    bytes
        .iter()
        .enumerate()
        .filter_map(|(index, &byte)| {
            let time = (index + 1) as f64 * BYTE_TIME;
            controller.on_byte(byte, time).map(|frame| CapturedFrame {
                time,
                closest_distance: controller.closest_distance(),
                frame,
            })
        })
        .collect()
}

pub fn decode_capture<P: AsRef<Path>>(
    path: P,
    policy: ResyncPolicy,
) -> anyhow::Result<Vec<CapturedFrame>> {
    let path_ref = path.as_ref();
    let bytes =
        fs::read(path_ref).with_context(|| format!("reading capture {}", path_ref.display()))?;
    Ok(decode_bytes(&bytes, policy))
}
