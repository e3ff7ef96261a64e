//! End-to-end coverage of the parser/serializer pair and the public file handle API, built around
//! small synthetic GIFs assembled in memory rather than checked-in fixture files.

use animgif::prelude::*;
use claim::assert_matches;

fn gif89a_header(width: u16, height: u16, packed: u8, bg: u8, aspect: u8) -> Vec<u8> {
	let mut out = Vec::new();
	out.extend_from_slice(b"GIF89a");
	out.extend_from_slice(&width.to_le_bytes());
	out.extend_from_slice(&height.to_le_bytes());
	out.push(packed);
	out.push(bg);
	out.push(aspect);
	out
}

fn write_subblocks(out: &mut Vec<u8>, data: &[u8]) {
	for chunk in data.chunks(255) {
		out.push(chunk.len() as u8);
		out.extend_from_slice(chunk);
	}
	out.push(0);
}

/// Minimal LSB-first variable-width code reader, local to this test file since the crate's own
/// `lzw::bitio::BitReader` is `pub(crate)` and unreachable from an external integration test.
struct LsbBitReader<'a> {
	data: &'a [u8],
	bit_pos: usize,
}

impl<'a> LsbBitReader<'a> {
	fn new(data: &'a [u8]) -> Self {
		LsbBitReader { data, bit_pos: 0 }
	}

	fn read_code(&mut self, width: u32) -> u16 {
		let mut code: u16 = 0;
		for i in 0..width {
			let bit_index = self.bit_pos + i as usize;
			let byte = self.data[bit_index / 8];
			let bit = (byte >> (bit_index % 8)) & 1;
			code |= (bit as u16) << i;
		}
		self.bit_pos += width as usize;
		code
	}
}

/// Scenario 1: decode a 2x2 GIF89a with a global [black, white] map and an LZW stream encoding
/// pixels [0,1,1,0].
#[test]
fn decodes_a_minimal_2x2_gif() {
	let mut data = gif89a_header(2, 2, 0x80, 0, 0);
	data.extend_from_slice(&[0, 0, 0, 255, 255, 255]);
	data.push(0x2C);
	data.extend_from_slice(&0u16.to_le_bytes());
	data.extend_from_slice(&0u16.to_le_bytes());
	data.extend_from_slice(&2u16.to_le_bytes());
	data.extend_from_slice(&2u16.to_le_bytes());
	data.push(0x00);
	data.push(2);
	let mut scratch = EncoderScratch::new();
	let stream = encode(&[0, 1, 1, 0], 2, &mut scratch).unwrap();
	write_subblocks(&mut data, &stream);
	data.push(0x3B);

	let file = parse(&data).unwrap();
	assert_eq!(file.frames[0].raster, vec![0, 1, 1, 0]);
}

/// Scenario 2: encoding an all-zero raster must round-trip, and the code stream it produces must
/// be CLEAR, then data codes, then EOI, in that order — checked both by decoding it back and by
/// reading the packed bits directly.
#[test]
fn encodes_a_flat_raster_with_clear_and_eoi() {
	let mut scratch = EncoderScratch::new();
	let pixels = vec![0u8; 8];
	let stream = encode(&pixels, 2, &mut scratch).unwrap();

	let mut dec_scratch = DecoderScratch::new();
	let raster = decode(&stream, 2, pixels.len(), &mut dec_scratch).unwrap();
	assert_eq!(raster, pixels);

	// CLEAR(4) and the first literal(0) are always 3 bits wide (k=2); the stream must start with
	// them and must end with EOI(5) at whatever width the dictionary has grown to by then.
	let clear_code = 4u16;
	let eoi = 5u16;
	let mut reader = LsbBitReader::new(&stream);
	assert_eq!(reader.read_code(3), clear_code);
	assert_eq!(reader.read_code(3), 0);

	// walk the remaining codes at their growing width until EOI is seen, confirming it is the
	// last code in the stream and that no code in between is CLEAR or EOI itself.
	let mut width = 3u32;
	let mut max_code_for_width = (1u16 << width) - 1;
	let mut next_free = eoi + 1;
	loop {
		let code = reader.read_code(width);
		if code == eoi {
			break;
		}
		assert_ne!(code, clear_code, "flat input should never need a mid-stream clear");
		next_free += 1;
		if next_free > max_code_for_width {
			width += 1;
			max_code_for_width = (1u16 << width) - 1;
		}
	}
}

/// Scenario 3: a graphic control extension immediately before a frame attaches a single 0xF9
/// record to that frame.
#[test]
fn graphic_control_extension_attaches_to_the_next_frame() {
	let mut data = gif89a_header(2, 2, 0x80, 0, 0);
	data.extend_from_slice(&[0, 0, 0, 255, 255, 255]);

	data.push(0x21);
	data.push(EXT_GRAPHIC_CONTROL);
	data.push(4);
	data.extend_from_slice(&[0, 10, 0, 0]);
	data.push(0);

	data.push(0x2C);
	data.extend_from_slice(&0u16.to_le_bytes());
	data.extend_from_slice(&0u16.to_le_bytes());
	data.extend_from_slice(&2u16.to_le_bytes());
	data.extend_from_slice(&2u16.to_le_bytes());
	data.push(0x00);
	data.push(2);
	let mut scratch = EncoderScratch::new();
	let stream = encode(&[0, 1, 1, 0], 2, &mut scratch).unwrap();
	write_subblocks(&mut data, &stream);
	data.push(0x3B);

	let file = parse(&data).unwrap();
	assert_eq!(file.frames[0].extensions.len(), 1);
	assert_eq!(file.frames[0].extensions[0].function, EXT_GRAPHIC_CONTROL);
	assert_eq!(file.frames[0].extensions[0].payload.len(), 4);
}

/// Scenario 4: a NETSCAPE2.0 application extension yields two extension records (introducer +
/// one continuation) and is decoded into a loop count.
#[test]
fn netscape_extension_yields_two_records_and_a_loop_count() {
	let mut data = gif89a_header(1, 1, 0x80, 0, 0);
	data.extend_from_slice(&[0, 0, 0, 0, 0, 0]);

	data.push(0x21);
	data.push(EXT_APPLICATION);
	data.push(11);
	data.extend_from_slice(b"NETSCAPE2.0");
	data.push(3);
	data.extend_from_slice(&[0x01, 0x02, 0x00]);
	data.push(0);

	data.push(0x2C);
	data.extend_from_slice(&0u16.to_le_bytes());
	data.extend_from_slice(&0u16.to_le_bytes());
	data.extend_from_slice(&1u16.to_le_bytes());
	data.extend_from_slice(&1u16.to_le_bytes());
	data.push(0x00);
	data.push(2);
	let mut scratch = EncoderScratch::new();
	let stream = encode(&[0], 2, &mut scratch).unwrap();
	write_subblocks(&mut data, &stream);
	data.push(0x3B);

	let file = parse(&data).unwrap();
	assert_eq!(file.frames[0].extensions.len(), 2);
	assert_eq!(file.frames[0].extensions[0].function, EXT_APPLICATION);
	assert_eq!(file.frames[0].extensions[1].function, EXT_CONTINUATION);
	assert_eq!(file.loop_count(), Some(Repeat::Count(2)));
}

/// Scenario 5: an alternating raster is exactly the kind of input that drives the decoder through
/// its KwKwK (code-equals-next-free) case; it must decode without error and round-trip exactly.
#[test]
fn kwkwk_pattern_decodes_cleanly() {
	let pixels = vec![0u8, 1, 0, 1, 0, 1, 0, 1, 0, 1];
	let mut enc_scratch = EncoderScratch::new();
	let stream = encode(&pixels, 2, &mut enc_scratch).unwrap();
	let mut dec_scratch = DecoderScratch::new();
	let raster = decode(&stream, 2, pixels.len(), &mut dec_scratch).unwrap();
	assert_eq!(raster, pixels);
}

/// Scenario 6: an interlaced 1x8 GIF decodes into natural top-to-bottom row order.
#[test]
fn interlaced_image_decodes_into_natural_row_order() {
	let rows: Vec<u8> = (0u8..8).collect();
	let scrambled = interlace(&rows);

	let mut data = gif89a_header(1, 8, 0x80, 0, 0);
	for i in 0..8u8 {
		data.extend_from_slice(&[i, i, i]);
	}
	data.push(0x2C);
	data.extend_from_slice(&0u16.to_le_bytes());
	data.extend_from_slice(&0u16.to_le_bytes());
	data.extend_from_slice(&1u16.to_le_bytes());
	data.extend_from_slice(&8u16.to_le_bytes());
	data.push(0x40);
	data.push(3);

	let mut scratch = EncoderScratch::new();
	let stream = encode(&scrambled, 3, &mut scratch).unwrap();
	write_subblocks(&mut data, &stream);
	data.push(0x3B);

	let file = parse(&data).unwrap();
	assert_eq!(file.frames[0].raster, rows);
}

#[test]
fn rejects_a_non_gif_buffer() {
	let err = parse(b"not a gif at all").unwrap_err();
	assert_matches!(err, GifError::NotGifFile);
}

#[test]
fn full_file_survives_a_handle_based_round_trip() {
	let dir = tempfile::tempdir().unwrap();
	let path = dir.path().join("roundtrip.gif");

	let mut file = GifFile::new(2, 2);
	file.global_color_map = Some(ColorMap {
		colors: vec![ColorEntry { r: 0, g: 0, b: 0 }, ColorEntry { r: 255, g: 255, b: 255 }],
		sort_flag: false,
	});
	let descriptor = ImageDescriptor { left: 0, top: 0, width: 2, height: 2, interlace: false, local_color_map: None };
	let added = file.append_frame(None).unwrap();
	added.descriptor = descriptor;
	added.raster = vec![0, 1, 1, 0];

	let writer = GifWriter::open_write(&path, false).unwrap();
	writer.spew(&file).unwrap();

	let mut reader = GifReader::open_read(&path).unwrap();
	let parsed = reader.slurp().unwrap();
	assert_eq!(parsed.frames[0].raster, vec![0, 1, 1, 0]);
	reader.close().unwrap();
}

#[test]
fn opening_a_missing_file_for_read_fails_with_a_typed_error() {
	let err = GifReader::open_read("/no/such/directory/file.gif").unwrap_err();
	assert_matches!(err, GifError::OpenFailed(_));
}
