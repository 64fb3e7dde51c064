use crate::shared::error::MotionError;
use crate::shared::keyframe::{KeyframeOp, KeyframeTarget};

/// Receives keyframe-insert operations in emission order.
///
/// The rendering side applies them as they arrive, so order matters: a
/// later operation on the same target and frame replaces an earlier one.
pub trait KeyframeSink: Send {
    fn insert(&mut self, op: &KeyframeOp) -> Result<(), MotionError>;

    /// Flush anything buffered. Default: no-op.
    fn finish(&mut self) -> Result<(), MotionError> {
        Ok(())
    }
}

/// Keeps every operation in memory.
#[derive(Debug, Default)]
pub struct RecordingSink {
    ops: Vec<KeyframeOp>,
    finished: bool,
}

impl RecordingSink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn ops(&self) -> &[KeyframeOp] {
        &self.ops
    }

    pub fn is_finished(&self) -> bool {
        self.finished
    }

    pub fn count_where(&self, predicate: impl Fn(&KeyframeTarget) -> bool) -> usize {
        self.ops.iter().filter(|op| predicate(&op.target)).count()
    }

    pub fn into_ops(self) -> Vec<KeyframeOp> {
        self.ops
    }
}

impl KeyframeSink for RecordingSink {
    fn insert(&mut self, op: &KeyframeOp) -> Result<(), MotionError> {
        self.ops.push(op.clone());
        Ok(())
    }

    fn finish(&mut self) -> Result<(), MotionError> {
        self.finished = true;
        Ok(())
    }
}
