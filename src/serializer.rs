//! Emits a `GifFile` back out to a GIF89a byte buffer.
//!
//! Encode output is never required to be byte-identical to any particular encoder's output, only
//! pixel-equal on decode; this serializer always writes GIF89a headers (even for files originally
//! parsed as GIF87a) since every GIF87a-only feature it would need to avoid (extensions, local
//! color maps) is itself a GIF89a addition this crate already supports unconditionally.

use crate::error::GifError;
use crate::interlace;
use crate::lzw::{self, EncoderScratch};
use crate::model::{ColorMap, ExtensionBlock, Frame, GifFile, ImageDescriptor, EXT_CONTINUATION};
use crate::subblock;
use byteorder::{LittleEndian, WriteBytesExt};

const SIG_89A: &[u8; 6] = b"GIF89a";
const EXTENSION_INTRODUCER: u8 = 0x21;
const IMAGE_DESCRIPTOR: u8 = 0x2C;
const TRAILER: u8 = 0x3B;

fn write_color_map(out: &mut Vec<u8>, map: &ColorMap) {
	for entry in &map.colors {
		out.push(entry.r);
		out.push(entry.g);
		out.push(entry.b);
	}
}

fn write_extensions(out: &mut Vec<u8>, extensions: &[ExtensionBlock]) {
	let mut i = 0;
	while i < extensions.len() {
		let intro = &extensions[i];
		if intro.function == EXT_CONTINUATION {
			// a continuation with no preceding introducer in this slice: nothing sane to attach
			// it to, so it is dropped rather than emitted as a malformed lone extension.
			i += 1;
			continue;
		}
		out.push(EXTENSION_INTRODUCER);
		out.push(intro.function);
		out.push(intro.payload.len() as u8);
		out.extend_from_slice(&intro.payload);
		i += 1;
		while i < extensions.len() && extensions[i].function == EXT_CONTINUATION {
			out.push(extensions[i].payload.len() as u8);
			out.extend_from_slice(&extensions[i].payload);
			i += 1;
		}
		out.push(0);
	}
}

fn write_frame(out: &mut Vec<u8>, frame: &Frame, file: &GifFile, scratch: &mut EncoderScratch) -> Result<(), GifError> {
	write_extensions(out, &frame.extensions);

	let descriptor = &frame.descriptor;
	out.push(IMAGE_DESCRIPTOR);
	out.write_u16::<LittleEndian>(descriptor.left)?;
	out.write_u16::<LittleEndian>(descriptor.top)?;
	out.write_u16::<LittleEndian>(descriptor.width)?;
	out.write_u16::<LittleEndian>(descriptor.height)?;

	let mut packed = 0u8;
	if let Some(map) = &descriptor.local_color_map {
		packed |= 0x80;
		packed |= map.packed_size_field() & 0x07;
		if map.sort_flag {
			packed |= 0x20;
		}
	}
	if descriptor.interlace {
		packed |= 0x40;
	}
	out.push(packed);

	if let Some(map) = &descriptor.local_color_map {
		write_color_map(out, map);
	}

	let bits_per_pixel = frame.effective_color_map(file).map(|m| m.bits_per_pixel()).unwrap_or(8).max(1);
	let min_code_size = (bits_per_pixel as u8).max(2);
	out.push(min_code_size);

	let pixels = if descriptor.interlace && descriptor.width > 0 {
		let rows: Vec<&[u8]> = frame.raster.chunks(descriptor.width as usize).collect();
		interlace::interlace(&rows).into_iter().flatten().copied().collect()
	} else {
		frame.raster.clone()
	};

	let code_stream = lzw::encode(&pixels, min_code_size, scratch)?;
	subblock::write_chunked(out, &code_stream);

	Ok(())
}

/// Serializes `file` into a freshly-allocated GIF89a byte buffer, allocating a fresh LZW encoder
/// scratch for the duration of the call. Prefer `serialize_with_scratch` when serializing several
/// files in a row (e.g. from a file handle) to reuse one scratch allocation across all of them.
pub fn serialize(file: &GifFile) -> Result<Vec<u8>, GifError> {
	let mut scratch = EncoderScratch::new();
	serialize_with_scratch(file, &mut scratch)
}

/// Serializes `file`, reusing the caller-supplied encoder scratch instead of allocating a new one.
pub fn serialize_with_scratch(file: &GifFile, scratch: &mut EncoderScratch) -> Result<Vec<u8>, GifError> {
	let mut out = Vec::new();
	out.extend_from_slice(SIG_89A);

	out.write_u16::<LittleEndian>(file.width)?;
	out.write_u16::<LittleEndian>(file.height)?;

	let mut packed = 0u8;
	if let Some(map) = &file.global_color_map {
		packed |= 0x80;
		packed |= map.packed_size_field() & 0x07;
		if map.sort_flag {
			packed |= 0x08;
		}
	}
	packed |= ((file.color_resolution.clamp(1, 8) - 1) & 0x07) << 4;
	out.push(packed);
	out.push(file.background_color_index);
	out.push(file.aspect_ratio);

	if let Some(map) = &file.global_color_map {
		write_color_map(&mut out, map);
	}

	for frame in &file.frames {
		write_frame(&mut out, frame, file, scratch)?;
	}

	out.push(TRAILER);
	Ok(out)
}

/// Convenience used by property tests and the public API's `ImageDescriptor`-level validation:
/// every local or global color map a frame relies on must actually be present.
pub fn validate_color_maps(file: &GifFile) -> Result<(), GifError> {
	for frame in &file.frames {
		if frame.effective_color_map(file).is_none() {
			return Err(GifError::NoColorMap);
		}
	}
	Ok(())
}
