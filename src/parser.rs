//! Reads a complete in-memory GIF byte buffer into a `GifFile`.
//!
//! Every read here is bounds-checked against the buffer length; a short read anywhere past the
//! logical screen descriptor ends parsing cleanly rather than failing the whole file, so a
//! truncated trailing frame still yields whatever frames came before it. The logical screen
//! descriptor itself is the one piece of required structure: without it there is no sensible
//! `GifFile` to hand back, so a short read there is a hard `NoScreenDescriptor` error. The LZW
//! decode itself (once a frame's code stream is fully and correctly framed) keeps the strict
//! failure behavior specified for that component.

use crate::error::GifError;
use crate::interlace;
use crate::lzw::{self, DecoderScratch};
use crate::model::{ColorEntry, ColorMap, ExtensionBlock, Frame, GifFile, ImageDescriptor, EXT_CONTINUATION, GIF_MAX_FRAMES};
use crate::subblock;

const SIG_87A: &[u8; 6] = b"GIF87a";
const SIG_89A: &[u8; 6] = b"GIF89a";

const EXTENSION_INTRODUCER: u8 = 0x21;
const IMAGE_DESCRIPTOR: u8 = 0x2C;
const TRAILER: u8 = 0x3B;

fn take<'a>(data: &'a [u8], pos: &mut usize, n: usize) -> Option<&'a [u8]> {
	let end = pos.checked_add(n)?;
	let slice = data.get(*pos..end)?;
	*pos = end;
	Some(slice)
}

fn take_u8(data: &[u8], pos: &mut usize) -> Option<u8> {
	take(data, pos, 1).map(|s| s[0])
}

fn take_u16le(data: &[u8], pos: &mut usize) -> Option<u16> {
	take(data, pos, 2).map(|s| u16::from_le_bytes([s[0], s[1]]))
}

fn read_color_map(data: &[u8], pos: &mut usize, size_field: u8) -> Option<ColorMap> {
	let count = 2usize << size_field;
	let mut colors = Vec::with_capacity(count);
	for _ in 0..count {
		let rgb = take(data, pos, 3)?;
		colors.push(ColorEntry { r: rgb[0], g: rgb[1], b: rgb[2] });
	}
	Some(ColorMap { colors, sort_flag: false })
}

/// Parses `data` as a complete GIF87a/GIF89a byte buffer, allocating a fresh LZW decoder scratch
/// for the duration of the call. Prefer `parse_with_scratch` when parsing several files in a row
/// (e.g. from a file handle) to reuse one scratch allocation across all of them.
pub fn parse(data: &[u8]) -> Result<GifFile, GifError> {
	let mut scratch = DecoderScratch::new();
	parse_with_scratch(data, &mut scratch)
}

/// Parses `data`, reusing the caller-supplied decoder scratch instead of allocating a new one.
pub fn parse_with_scratch(data: &[u8], dec_scratch: &mut DecoderScratch) -> Result<GifFile, GifError> {
	let mut pos = 0usize;

	let sig = take(data, &mut pos, 6).ok_or(GifError::NotGifFile)?;
	if sig != SIG_87A && sig != SIG_89A {
		return Err(GifError::NotGifFile);
	}

	let width = take_u16le(data, &mut pos).ok_or(GifError::NoScreenDescriptor)?;
	let height = take_u16le(data, &mut pos).ok_or(GifError::NoScreenDescriptor)?;
	let packed = take_u8(data, &mut pos).ok_or(GifError::NoScreenDescriptor)?;
	let background_color_index = take_u8(data, &mut pos).ok_or(GifError::NoScreenDescriptor)?;
	let aspect_ratio = take_u8(data, &mut pos).ok_or(GifError::NoScreenDescriptor)?;

	let has_global_map = packed & 0x80 != 0;
	let color_resolution = ((packed >> 4) & 0x07) + 1;
	let global_size_field = packed & 0x07;

	let mut file = GifFile::new(width, height);
	file.color_resolution = color_resolution;
	file.background_color_index = background_color_index;
	file.aspect_ratio = aspect_ratio;

	if has_global_map {
		match read_color_map(data, &mut pos, global_size_field) {
			Some(mut map) => {
				map.sort_flag = packed & 0x08 != 0;
				file.global_color_map = Some(map);
			}
			None => return Ok(file), // truncated right after the signature: nothing more to parse
		}
	}

	let mut pending_extensions: Vec<ExtensionBlock> = Vec::new();

	loop {
		let Some(record) = take_u8(data, &mut pos) else { break };
		match record {
			TRAILER => break,
			EXTENSION_INTRODUCER => {
				let Some(function) = take_u8(data, &mut pos) else { break };
				let mut first = true;
				loop {
					let Some(len) = take_u8(data, &mut pos) else { break };
					if len == 0 {
						break;
					}
					let Some(payload) = take(data, &mut pos, len as usize) else { break };
					let this_function = if first { function } else { EXT_CONTINUATION };
					pending_extensions.push(ExtensionBlock { function: this_function, payload: payload.to_vec().into_boxed_slice() });
					first = false;
				}
			}
			IMAGE_DESCRIPTOR => {
				if file.frames.len() >= GIF_MAX_FRAMES {
					return Err(GifError::DataTooBig { requested: file.frames.len() + 1, limit: GIF_MAX_FRAMES });
				}

				let Some(left) = take_u16le(data, &mut pos) else { break };
				let Some(top) = take_u16le(data, &mut pos) else { break };
				let Some(iw) = take_u16le(data, &mut pos) else { break };
				let Some(ih) = take_u16le(data, &mut pos) else { break };
				let Some(ipacked) = take_u8(data, &mut pos) else { break };

				let has_local_map = ipacked & 0x80 != 0;
				let interlace_flag = ipacked & 0x40 != 0;
				let sort = ipacked & 0x20 != 0;
				let local_size_field = ipacked & 0x07;

				let local_color_map = if has_local_map {
					match read_color_map(data, &mut pos, local_size_field) {
						Some(mut map) => {
							map.sort_flag = sort;
							Some(map)
						}
						None => break,
					}
				} else {
					None
				};

				let Some(min_code_size) = take_u8(data, &mut pos) else { break };

				let Ok((chunked, new_pos)) = subblock::read_chunked(data, pos) else { break };
				pos = new_pos;

				let dest_len = iw as usize * ih as usize;
				let mut raster = lzw::decode(&chunked, min_code_size, dest_len, dec_scratch)?;

				if interlace_flag && iw > 0 {
					let rows: Vec<&[u8]> = raster.chunks(iw as usize).collect();
					let restored = interlace::deinterlace(&rows);
					raster = restored.into_iter().flatten().copied().collect();
				}

				let descriptor = ImageDescriptor { left, top, width: iw, height: ih, interlace: interlace_flag, local_color_map };
				let extensions = std::mem::take(&mut pending_extensions);
				file.frames.push(Frame { descriptor, raster, extensions });
			}
			_ => break,
		}
	}

	Ok(file)
}
