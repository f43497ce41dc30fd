//! Synthetic raster band generators.
//!
//! Bands are row-major with the top row first, the layout
//! `MemoryRaster` expects.

/// Creates a test grid with predictable values.
///
/// Each cell value is calculated as: `col * 1000 + row`
///
/// This makes it easy to verify which window of a raster was read by
/// checking that grid[row][col] == col * 1000 + row.
///
/// # Example
///
/// ```
/// use test_utils::create_test_grid;
///
/// let grid = create_test_grid(10, 5);
/// assert_eq!(grid.len(), 50); // 10 * 5
/// assert_eq!(grid[0], 0.0);   // col=0, row=0 -> 0*1000 + 0
/// assert_eq!(grid[1], 1000.0); // col=1, row=0 -> 1*1000 + 0
/// assert_eq!(grid[10], 1.0);  // col=0, row=1 -> 0*1000 + 1
/// ```
pub fn create_test_grid(width: usize, height: usize) -> Vec<f64> {
    let mut data = Vec::with_capacity(width * height);
    for row in 0..height {
        for col in 0..width {
            data.push((col * 1000 + row) as f64);
        }
    }
    data
}

/// Every cell set to `value`.
pub fn create_constant_grid(width: usize, height: usize, value: f64) -> Vec<f64> {
    vec![value; width * height]
}

/// Cells numbered `0, 1, 2, ...` in row-major order.
///
/// ```
/// use test_utils::create_ramp_grid;
///
/// assert_eq!(create_ramp_grid(2, 2), vec![0.0, 1.0, 2.0, 3.0]);
/// ```
pub fn create_ramp_grid(width: usize, height: usize) -> Vec<f64> {
    (0..width * height).map(|i| i as f64).collect()
}

/// Copy of `data` with every `stride`-th cell replaced by `no_data`.
///
/// Useful for checking that declared no-data values are skipped.
pub fn with_no_data(data: &[f64], stride: usize, no_data: f64) -> Vec<f64> {
    data.iter()
        .enumerate()
        .map(|(i, &v)| if stride > 0 && i % stride == 0 { no_data } else { v })
        .collect()
}

/// Packs physical values into raw samples for `physical = raw * scale + offset`.
pub fn pack(values: &[f64], scale: f64, offset: f64) -> Vec<f64> {
    values.iter().map(|v| (v - offset) / scale).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_create_test_grid() {
        let grid = create_test_grid(3, 2);
        assert_eq!(grid, vec![0.0, 1000.0, 2000.0, 1.0, 1001.0, 2001.0]);
    }

    #[test]
    fn test_constant_grid() {
        assert_eq!(create_constant_grid(2, 3, 5.0), vec![5.0; 6]);
    }

    #[test]
    fn test_with_no_data() {
        let grid = with_no_data(&[1.0, 2.0, 3.0, 4.0], 2, -9999.0);
        assert_eq!(grid, vec![-9999.0, 2.0, -9999.0, 4.0]);
        assert_eq!(with_no_data(&[1.0], 0, -1.0), vec![1.0]);
    }

    #[test]
    fn test_pack_inverts_scaling() {
        let raw = pack(&[10.0, 12.0], 0.5, 10.0);
        assert_eq!(raw, vec![0.0, 4.0]);
    }
}
