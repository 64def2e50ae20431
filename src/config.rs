//! Construction parameters and bucket-count derivation.

use crate::error::{Result, TableError};

/// Size hint used when the configured hint is zero.
pub const DEFAULT_SIZE_HINT: u32 = 16;

/// Load threshold used when the configured threshold is zero or negative.
pub const DEFAULT_LOAD_THRESHOLD: f32 = 0.8;

/// Sizing for a new table.
///
/// The default value asks for the defaults: a zero `size_hint` becomes
/// [`DEFAULT_SIZE_HINT`] and a non-positive `load_threshold` becomes
/// [`DEFAULT_LOAD_THRESHOLD`].
#[derive(Copy, Clone, Debug, Default, PartialEq)]
pub struct TableConfig {
    pub size_hint: u32,
    pub load_threshold: f32,
}

impl TableConfig {
    pub const fn new(size_hint: u32, load_threshold: f32) -> Self {
        Self {
            size_hint,
            load_threshold,
        }
    }

    pub const fn with_size_hint(mut self, size_hint: u32) -> Self {
        self.size_hint = size_hint;
        self
    }

    pub const fn with_load_threshold(mut self, load_threshold: f32) -> Self {
        self.load_threshold = load_threshold;
        self
    }

    pub fn effective_size_hint(&self) -> u32 {
        if self.size_hint == 0 {
            DEFAULT_SIZE_HINT
        } else {
            self.size_hint
        }
    }

    /// NaN is passed through so that `bucket_count` can reject it.
    pub fn effective_load_threshold(&self) -> f32 {
        if self.load_threshold <= 0.0 {
            DEFAULT_LOAD_THRESHOLD
        } else {
            self.load_threshold
        }
    }

    /// `ceil((size_hint + 1) / load_threshold)` after defaults are applied.
    pub fn bucket_count(&self) -> Result<u32> {
        let threshold = self.effective_load_threshold();
        if !threshold.is_finite() {
            return Err(TableError::InvalidConfiguration(
                "load threshold is not finite",
            ));
        }
        if threshold > 1.0 {
            return Err(TableError::InvalidConfiguration(
                "load threshold exceeds 1.0",
            ));
        }
        let raw = ((f64::from(self.effective_size_hint()) + 1.0) / f64::from(threshold)).ceil();
        if raw < 1.0 {
            return Err(TableError::InvalidConfiguration("bucket count is zero"));
        }
        if raw > f64::from(u32::MAX) {
            return Err(TableError::InvalidConfiguration(
                "bucket count does not fit in u32",
            ));
        }
        Ok(raw as u32)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn zero_values_select_defaults() {
        let c = TableConfig::default();
        assert_eq!(c.effective_size_hint(), DEFAULT_SIZE_HINT);
        assert_eq!(c.effective_load_threshold(), DEFAULT_LOAD_THRESHOLD);
        // ceil(17 / 0.8)
        assert_eq!(c.bucket_count(), Ok(22));
    }

    #[test]
    fn negative_threshold_selects_default() {
        let c = TableConfig::new(4, -3.0);
        assert_eq!(c.effective_load_threshold(), DEFAULT_LOAD_THRESHOLD);
        assert_eq!(c.bucket_count(), Ok(7));
    }

    #[test]
    fn full_threshold_gives_hint_plus_one() {
        let c = TableConfig::new(9, 1.0);
        assert_eq!(c.bucket_count(), Ok(10));
    }

    #[test]
    fn builder_helpers_set_fields() {
        let c = TableConfig::default()
            .with_size_hint(100)
            .with_load_threshold(0.5);
        assert_eq!(c, TableConfig::new(100, 0.5));
        assert_eq!(c.bucket_count(), Ok(202));
    }

    #[test]
    fn degenerate_configurations_rejected() {
        for c in [
            TableConfig::new(1, f32::NAN),
            TableConfig::new(1, f32::INFINITY),
            TableConfig::new(1, 1.5),
            TableConfig::new(u32::MAX, 1.0),
            TableConfig::new(u32::MAX / 2, 0.25),
        ] {
            match c.bucket_count() {
                Err(TableError::InvalidConfiguration(_)) => {}
                other => panic!("{:?} produced {:?}", c, other),
            }
        }
    }
}
