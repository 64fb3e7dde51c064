use std::thread::{self, JoinHandle};

use crossbeam_channel::{bounded, Receiver};

use crate::ingestion::domain::detections::DetectionFrame;
use crate::ingestion::domain::landmark_source::LandmarkSource;
use crate::shared::error::MotionError;

pub type DetectionResult = Result<DetectionFrame, MotionError>;

/// Drains an opened source on its own thread into a bounded channel.
///
/// The thread stops after the first error or once the receiver is gone, and
/// hands the closed source back through the join handle.
pub fn spawn_source_reader(
    mut source: Box<dyn LandmarkSource>,
    capacity: usize,
) -> (Receiver<DetectionResult>, JoinHandle<Box<dyn LandmarkSource>>) {
    let (tx, rx) = bounded(capacity.max(1));
    let handle = thread::spawn(move || {
        for item in source.frames() {
            let failed = item.is_err();
            if tx.send(item).is_err() || failed {
                break;
            }
        }
        source.close();
        source
    });
    (rx, handle)
}
