use crate::shared::constants::DEFAULT_INTENSITY_CYCLE;

/// Per-variant camera intensity, cycled by variant index.
///
/// Variants differ in how strongly the camera reacts to the same recorded
/// motion; nothing here is random.
#[derive(Clone, Debug, PartialEq)]
pub struct IntensitySchedule {
    cycle: Vec<f64>,
}

impl IntensitySchedule {
    /// Falls back to the default cycle when `cycle` is empty.
    pub fn new(cycle: Vec<f64>) -> Self {
        if cycle.is_empty() {
            return Self::default();
        }
        Self { cycle }
    }

    pub fn intensity_for(&self, variant: usize) -> f64 {
        self.cycle[variant % self.cycle.len()]
    }
}

impl Default for IntensitySchedule {
    fn default() -> Self {
        Self {
            cycle: DEFAULT_INTENSITY_CYCLE.to_vec(),
        }
    }
}
