/// End of the buffered range containing `current_time`, or 0 when the
/// position is not buffered.
pub fn buffered_ahead(current_time: f64, ranges: &[(f64, f64)]) -> f64 {
    ranges
        .iter()
        .find(|(start, end)| *start <= current_time && current_time <= *end)
        .map(|(_, end)| *end)
        .unwrap_or(0.0)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_range_containing_position() {
        let ranges = [(0.0, 12.5), (30.0, 48.0)];
        assert_eq!(buffered_ahead(3.0, &ranges), 12.5);
        assert_eq!(buffered_ahead(30.0, &ranges), 48.0);
    }

    #[test]
    fn test_unbuffered_position() {
        assert_eq!(buffered_ahead(20.0, &[(0.0, 12.5), (30.0, 48.0)]), 0.0);
        assert_eq!(buffered_ahead(0.0, &[]), 0.0);
    }
}
