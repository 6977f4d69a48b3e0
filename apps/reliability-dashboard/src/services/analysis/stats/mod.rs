/// Raised when a mean is requested over an empty sequence and no fallback was supplied.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
#[error("cannot average an empty sequence without a default")]
pub struct EmptyAggregationError;

/// Arithmetic mean of `values`, falling back to `default` when there is nothing to average.
///
/// A single value is returned as-is. With no values and no default the call fails with
/// [`EmptyAggregationError`].
pub fn average_with_default(
    values: &[f64],
    default: Option<f64>,
) -> Result<f64, EmptyAggregationError> {
    match values {
        [] => default.ok_or(EmptyAggregationError),
        [only] => Ok(*only),
        _ => Ok(values.iter().sum::<f64>() / values.len() as f64),
    }
}

/// Infallible form used for facet scores: an empty bucket reads as `default`.
pub fn average_or(values: &[f64], default: f64) -> f64 {
    average_with_default(values, Some(default)).unwrap_or(default)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn averages_non_empty_sequences() {
        let mean = average_with_default(&[0.02, 0.05], None).unwrap();
        assert!((mean - 0.035).abs() < 1e-12);

        let mean = average_with_default(&[1.0, 2.0, 3.0, 6.0], Some(-1.0)).unwrap();
        assert!((mean - 3.0).abs() < 1e-12);
    }

    #[test]
    fn single_value_is_returned_unchanged() {
        assert_eq!(average_with_default(&[0.1], None), Ok(0.1));
    }

    #[test]
    fn empty_sequence_uses_default_or_fails() {
        assert_eq!(average_with_default(&[], Some(0.0)), Ok(0.0));
        assert_eq!(average_with_default(&[], Some(4.5)), Ok(4.5));
        assert_eq!(average_with_default(&[], None), Err(EmptyAggregationError));
        assert_eq!(average_or(&[], 0.0), 0.0);
    }

    #[test]
    fn reordering_equal_values_does_not_change_the_mean() {
        let a = average_with_default(&[0.25, 0.5, 0.125], None).unwrap();
        let b = average_with_default(&[0.125, 0.25, 0.5], None).unwrap();
        assert_eq!(a, b);
    }
}
