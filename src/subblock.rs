//! GIF sub-block framing: a run of data is split into chunks of at most 255 bytes, each prefixed
//! by a one-byte length, and terminated by a zero-length chunk. Used for LZW image data and for
//! every extension block's payload.

use crate::error::GifError;

const MAX_SUB_BLOCK_SIZE: usize = 255;

/// Splits `data` into length-prefixed chunks of at most 255 bytes, appending the result (plus the
/// terminating zero-length chunk) to `out`.
pub fn write_chunked(out: &mut Vec<u8>, data: &[u8]) {
	for chunk in data.chunks(MAX_SUB_BLOCK_SIZE) {
		out.push(chunk.len() as u8);
		out.extend_from_slice(chunk);
	}
	out.push(0);
}

/// Reads a chunked run starting at `data[pos]`, returning the reassembled payload and the
/// position just past the terminating zero-length chunk.
pub fn read_chunked(data: &[u8], mut pos: usize) -> Result<(Vec<u8>, usize), GifError> {
	let mut payload = Vec::new();
	loop {
		let &len = data.get(pos).ok_or(GifError::EofTooSoon)?;
		pos += 1;
		if len == 0 {
			break;
		}
		let len = len as usize;
		let chunk = data.get(pos..pos + len).ok_or(GifError::EofTooSoon)?;
		payload.extend_from_slice(chunk);
		pos += len;
	}
	Ok((payload, pos))
}
