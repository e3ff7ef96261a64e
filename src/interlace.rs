//! Interlaced GIF images store rows in four passes (every 8th row, then every 8th offset by 4,
//! then every 4th offset by 2, then every other row) so a partially-loaded image can be displayed
//! as a coarse preview. This module reorders a raster between that on-disk pass order and normal
//! top-to-bottom row order.

/// Row-start offset and row stride for each of the four interlace passes.
const PASSES: [(usize, usize); 4] = [(0, 8), (4, 8), (2, 4), (1, 2)];

/// Returns the on-disk row order for an image of `height` rows: `row_order[i]` is the logical
/// (top-to-bottom) row stored at disk position `i`.
fn row_order(height: usize) -> Vec<usize> {
	let mut order = Vec::with_capacity(height);
	for &(start, stride) in &PASSES {
		let mut row = start;
		while row < height {
			order.push(row);
			row += stride;
		}
	}
	order
}

/// Reorders `rows` (currently in on-disk interlaced order) into normal top-to-bottom order.
/// `rows` must have exactly as many elements as there are rows in the image.
pub fn deinterlace<T: Clone>(rows: &[T]) -> Vec<T> {
	let order = row_order(rows.len());
	let mut out = rows.to_vec();
	for (disk_pos, &logical_row) in order.iter().enumerate() {
		out[logical_row] = rows[disk_pos].clone();
	}
	out
}

/// Reorders `rows` (currently in normal top-to-bottom order) into on-disk interlaced order.
pub fn interlace<T: Clone>(rows: &[T]) -> Vec<T> {
	let order = row_order(rows.len());
	order.iter().map(|&logical_row| rows[logical_row].clone()).collect()
}
