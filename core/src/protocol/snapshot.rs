use crate::prelude::LinkResult;
use crate::protocol::record::TargetRecord;
use serde::{Deserialize, Serialize};

/// Consumer-facing view of one target, in wire units.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TargetView {
    pub distance: u8,
    /// km/h.
    pub speed: u8,
    pub angle: i8,
    pub approaching: bool,
}

impl From<&TargetRecord> for TargetView {
    fn from(record: &TargetRecord) -> Self {
        Self {
            distance: record.distance,
            speed: record.speed,
            angle: record.angle,
            approaching: record.approaching,
        }
    }
}

/// Read-only snapshot handed to rendering, network and safety collaborators.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct LinkSnapshot {
    pub count: usize,
    pub targets: Vec<TargetView>,
    pub closest_distance: Option<u8>,
}

impl LinkSnapshot {
    pub fn from_records(records: &[TargetRecord]) -> Self {
        let targets: Vec<TargetView> = records.iter().map(TargetView::from).collect();
        let closest_distance = targets.iter().map(|target| target.distance).min();
        Self {
            count: targets.len(),
            targets,
            closest_distance,
        }
    }

    pub fn is_clear(&self) -> bool {
        self.count == 0
    }

    pub fn to_json(&self) -> LinkResult<String> {
        Ok(serde_json::to_string(self)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(distance: u8) -> TargetRecord {
        TargetRecord {
            angle: -4,
            distance,
            approaching: true,
            speed: 50,
            snr: 100,
        }
    }

    #[test]
    fn closest_distance_is_minimum() {
        let snapshot = LinkSnapshot::from_records(&[record(80), record(14), record(33)]);
        assert_eq!(snapshot.count, 3);
        assert_eq!(snapshot.closest_distance, Some(14));
    }

    #[test]
    fn empty_snapshot_is_clear() {
        let snapshot = LinkSnapshot::default();
        assert!(snapshot.is_clear());
        assert_eq!(snapshot.closest_distance, None);
    }

    #[test]
    fn snapshot_serializes_to_json() {
        let json = LinkSnapshot::from_records(&[record(9)]).to_json().unwrap();
        assert!(json.contains("\"closest_distance\":9"));
        assert!(json.contains("\"angle\":-4"));
    }
}
