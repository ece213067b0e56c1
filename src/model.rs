//! Value and range of the progress indicator.

use crate::error::{Error, Result};

pub const DEFAULT_MINIMUM: i32 = 0;
pub const DEFAULT_MAXIMUM: i32 = 100;

/// Integer progress value clamped into `[min, max]`, with `max - min >= 1`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ProgressModel {
    min: i32,
    max: i32,
    value: i32,
}

impl Default for ProgressModel {
    fn default() -> Self {
        Self {
            min: DEFAULT_MINIMUM,
            max: DEFAULT_MAXIMUM,
            value: DEFAULT_MINIMUM,
        }
    }
}

impl ProgressModel {
    /// Model over `[min, max]` with the value at `min`.
    pub fn with_range(min: i32, max: i32) -> Result<Self> {
        validate_range(min, max)?;
        Ok(Self {
            min,
            max,
            value: min,
        })
    }

    pub fn value(&self) -> i32 {
        self.value
    }

    pub fn minimum(&self) -> i32 {
        self.min
    }

    pub fn maximum(&self) -> i32 {
        self.max
    }

    /// Store `value` clamped into the range and return what was stored.
    pub fn set_value(&mut self, value: i32) -> i32 {
        self.value = value.clamp(self.min, self.max);
        self.value
    }

    pub fn set_minimum(&mut self, min: i32) -> Result<()> {
        self.set_range(min, self.max)
    }

    pub fn set_maximum(&mut self, max: i32) -> Result<()> {
        self.set_range(self.min, max)
    }

    /// Replace both bounds. On error nothing changes.
    pub fn set_range(&mut self, min: i32, max: i32) -> Result<()> {
        validate_range(min, max)?;
        self.min = min;
        self.max = max;
        self.value = self.value.clamp(min, max);
        Ok(())
    }

    pub fn reset(&mut self) {
        self.value = self.min;
    }

    /// Completion in `[0, 1]`.
    pub fn fraction(&self) -> f64 {
        let span = f64::from(self.max) - f64::from(self.min);
        (f64::from(self.value) - f64::from(self.min)) / span
    }

    /// Degrees of the ring covered by the progress fill.
    pub fn sweep_angle(&self) -> f64 {
        360.0 * self.fraction()
    }

    /// Rounded percentage shown by the label.
    pub fn percent(&self) -> i64 {
        (100.0 * self.fraction()).round() as i64
    }
}

fn validate_range(min: i32, max: i32) -> Result<()> {
    if i64::from(max) - i64::from(min) < 1 {
        return Err(Error::InvalidRange { min, max });
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_range_is_zero_to_hundred() {
        let model = ProgressModel::default();
        assert_eq!((model.minimum(), model.maximum(), model.value()), (0, 100, 0));
        assert_eq!(model.fraction(), 0.0);
    }

    #[test]
    fn set_value_clamps() {
        let mut model = ProgressModel::with_range(-10, 10).unwrap();
        for (input, expected) in [(-50, -10), (-10, -10), (3, 3), (10, 10), (i32::MAX, 10)] {
            assert_eq!(model.set_value(input), expected);
            assert_eq!(model.value(), expected);
        }
    }

    #[test]
    fn reset_returns_to_minimum() {
        let mut model = ProgressModel::default();
        for (min, max) in [(0, 1), (-5, 5), (100, 10_000), (i32::MIN, i32::MAX)] {
            model.set_range(min, max).unwrap();
            model.set_value(max);
            model.reset();
            assert_eq!(model.value(), min);
        }
    }

    #[test]
    fn empty_range_is_rejected_without_side_effects() {
        let mut model = ProgressModel::with_range(0, 200).unwrap();
        model.set_value(50);
        let before = model;

        assert!(matches!(model.set_range(5, 5), Err(Error::InvalidRange { min: 5, max: 5 })));
        assert!(model.set_minimum(200).is_err());
        assert!(model.set_maximum(-1).is_err());
        assert_eq!(model, before);
    }

    #[test]
    fn narrowing_the_range_reclamps_value() {
        let mut model = ProgressModel::with_range(0, 200).unwrap();
        model.set_value(150);
        model.set_maximum(100).unwrap();
        assert_eq!(model.value(), 100);
        model.set_minimum(120).unwrap_err();
        model.set_range(120, 300).unwrap();
        assert_eq!(model.value(), 120);
    }

    #[test]
    fn fraction_accounts_for_offset_minimum() {
        let mut model = ProgressModel::with_range(100, 300).unwrap();
        model.set_value(150);
        assert_eq!(model.fraction(), 0.25);
        assert_eq!(model.sweep_angle(), 90.0);
        assert_eq!(model.percent(), 25);
    }

    #[test]
    fn extreme_range_does_not_overflow() {
        let mut model = ProgressModel::with_range(i32::MIN, i32::MAX).unwrap();
        model.set_value(i32::MAX);
        assert_eq!(model.fraction(), 1.0);
    }
}
