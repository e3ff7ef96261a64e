//! LZW decoding where the destination raster doubles as the dictionary: every dictionary entry
//! is just an `(offset, length)` pair naming a substring that already exists in the output, so
//! emitting a code is one bounded memory copy instead of a walk back through a linked list of
//! codes. This is the same trick the reference C decoder this crate's on-disk format matches
//! uses to get a large constant-factor speedup over a classical dictionary-of-Vec<u8> decoder.

use crate::error::GifError;
use crate::lzw::bitio::{BitReader, MAX_CODE_SIZE};

const DICT_SIZE: usize = 4096;
const SENTINEL: u32 = u32::MAX;

/// Reusable scratch dictionary for the output-as-dictionary decoder. Owned by a file handle (see
/// `crate::handle`) and reused across every frame decoded from that handle, since it is pure
/// bookkeeping with no per-frame state that needs to survive between calls.
#[derive(Debug)]
pub struct DecoderScratch {
	offset: Box<[u32; DICT_SIZE]>,
	length: Box<[u32; DICT_SIZE]>,
	extra: Box<[u32; DICT_SIZE]>,
}

impl DecoderScratch {
	pub fn new() -> Self {
		DecoderScratch {
			offset: Box::new([SENTINEL; DICT_SIZE]),
			length: Box::new([0; DICT_SIZE]),
			extra: Box::new([SENTINEL; DICT_SIZE]),
		}
	}

	/// (Re-)initializes the dictionary to hold just the root symbols for a `num_roots`-entry
	/// alphabet. `buf` must have at least `dest_len + num_roots` bytes; the root symbols' literal
	/// byte values are written into the over-allocation pad past `dest_len`.
	fn reset(&mut self, buf: &mut [u8], dest_len: usize, num_roots: usize) {
		for i in 0..num_roots {
			self.offset[i] = (dest_len + i) as u32;
			self.length[i] = 1;
			self.extra[i] = SENTINEL;
			buf[dest_len + i] = i as u8;
		}
		for i in num_roots..DICT_SIZE {
			self.offset[i] = SENTINEL;
			self.length[i] = 0;
			self.extra[i] = SENTINEL;
		}
	}
}

impl Default for DecoderScratch {
	fn default() -> Self {
		Self::new()
	}
}

/// Copies the string named by `code` to `buf[o..]`, lazily materializing a still-pending final
/// byte first if `code`'s entry was created but never referenced since. Returns the number of
/// bytes written (including the lazily-materialized byte, if any).
fn copy_symbol(buf: &mut [u8], o: usize, scratch: &mut DecoderScratch, code: u16) -> usize {
	let idx = code as usize;
	let mut len = scratch.length[idx] as usize;
	let src = scratch.offset[idx] as usize;

	let max_copy = buf.len().saturating_sub(o);
	if len > max_copy {
		len = max_copy;
	}
	if len > 0 {
		buf.copy_within(src..src + len, o);
	}

	let extra = scratch.extra[idx];
	if extra != SENTINEL && o + len < buf.len() {
		let extra_byte = buf[extra as usize];
		buf[o + len] = extra_byte;
		len += 1;
		scratch.offset[idx] = o as u32;
		scratch.extra[idx] = SENTINEL;
		scratch.length[idx] = len as u32;
	}
	len
}

/// Decodes `code_stream` (already de-chunked by `crate::subblock`) into a raster of exactly
/// `dest_len` bytes, using `min_code_size` as the initial LZW code size.
pub fn decode(
	code_stream: &[u8],
	min_code_size: u8,
	dest_len: usize,
	scratch: &mut DecoderScratch,
) -> Result<Vec<u8>, GifError> {
	let k = min_code_size as u32;
	if !(2..=8).contains(&k) {
		return Err(GifError::ImageDefect(format!("unsupported LZW minimum code size {k}")));
	}

	let num_roots = 1usize << k;
	let clear_code = num_roots as u16;
	let eoi = clear_code + 1;

	// over-allocate past dest_len: room for the root symbols plus a little slack so the
	// lazy-completion byte write can never walk off the end of the allocation.
	let pad = num_roots + 8;
	let mut buf = vec![0u8; dest_len + pad];
	scratch.reset(&mut buf, dest_len, num_roots);

	let mut reader = BitReader::new(code_stream);
	let total_bits = code_stream.len() * 8;
	let mut bits_consumed: usize = 0;

	let mut width = k + 1;
	let mut max_code_for_width = (1u16 << width) - 1;
	let mut next_free: u32 = eoi as u32 + 1;
	let mut o: usize = 0;
	let mut prev: Option<u16> = None;

	loop {
		if bits_consumed + width as usize > total_bits {
			return Err(GifError::EofTooSoon);
		}
		let code = reader.read_code(width)?;
		bits_consumed += width as usize;

		if code == clear_code {
			if prev.is_none() {
				continue; // tolerate redundant clears before any data has been seen
			}
			width = k + 1;
			max_code_for_width = (1u16 << width) - 1;
			next_free = eoi as u32 + 1;
			prev = None;
			continue;
		}
		if code == eoi {
			break;
		}

		match prev {
			None => {
				if code >= clear_code {
					return Err(GifError::ImageDefect(format!("first code {code} is not a root symbol")));
				}
				if o < dest_len {
					buf[o] = code as u8;
				}
				o += 1;
				prev = Some(code);
			}
			Some(p) => {
				if (next_free as usize) < DICT_SIZE {
					let known = scratch.offset[code as usize] != SENTINEL;
					let is_kwkwk = code as u32 == next_free;
					if known {
						let copied = copy_symbol(&mut buf, o, scratch, code);
						let ni = next_free as usize;
						scratch.offset[ni] = scratch.offset[p as usize];
						scratch.length[ni] = scratch.length[p as usize];
						scratch.extra[ni] = o as u32;
						o += copied;
					} else if is_kwkwk {
						let copied = copy_symbol(&mut buf, o, scratch, p);
						let first_byte = if o < buf.len() { buf[o] } else { 0 };
						if o + copied < buf.len() {
							buf[o + copied] = first_byte;
						}
						let ni = next_free as usize;
						scratch.offset[ni] = o as u32;
						scratch.length[ni] = scratch.length[p as usize] + 1;
						o += copied + 1;
					} else {
						return Err(GifError::ImageDefect(format!(
							"code {code} references an undefined dictionary entry (next free code is {next_free})"
						)));
					}
					next_free += 1;
					if next_free as u16 > max_code_for_width && width < MAX_CODE_SIZE {
						width += 1;
						max_code_for_width = (1u16 << width) - 1;
					}
				} else {
					// deferred-clear: dictionary is frozen, decode without creating new entries
					if scratch.offset[code as usize] == SENTINEL {
						return Err(GifError::ImageDefect(format!("code {code} is not present in the frozen dictionary")));
					}
					let copied = copy_symbol(&mut buf, o, scratch, code);
					o += copied;
					next_free += 1;
				}
				prev = Some(code);
			}
		}
	}

	buf.truncate(dest_len);
	Ok(buf)
}
