//! The in-memory GIF data model: color maps, image descriptors, extension blocks, frames, and the
//! file as a whole. Parsing (`crate::parser`) fills this model in; serializing (`crate::serializer`)
//! walks it back out to bytes.

use crate::error::GifError;

/// Frame list growth is capped here as a denial-of-service backstop against a file that claims an
/// unbounded number of frames; exceeding it is a `DataTooBig` error rather than an unbounded
/// allocation.
pub const GIF_MAX_FRAMES: usize = 20_000;

/// A single RGB palette entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ColorEntry {
	pub r: u8,
	pub g: u8,
	pub b: u8,
}

/// An ordered palette of 2..=256 entries. The color count is always a power of two; the implied
/// bits-per-pixel is `colors.len().trailing_zeros()` (since a power of two has exactly one set
/// bit) and the GIF packed-byte size field is `bits_per_pixel - 1`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ColorMap {
	pub colors: Vec<ColorEntry>,
	pub sort_flag: bool,
}

impl ColorMap {
	/// Allocates a color map of `color_count` entries (must be a power of two in `[2, 256]`),
	/// seeded from `seed` if given, or zeroed otherwise.
	pub fn new(color_count: usize, seed: Option<&[ColorEntry]>) -> Result<Self, GifError> {
		if !(2..=256).contains(&color_count) || !color_count.is_power_of_two() {
			return Err(GifError::ImageDefect(format!("color map size {color_count} is not a power of two in [2, 256]")));
		}
		let mut colors = vec![ColorEntry::default(); color_count];
		if let Some(seed) = seed {
			let n = seed.len().min(color_count);
			colors[..n].copy_from_slice(&seed[..n]);
		}
		Ok(ColorMap { colors, sort_flag: false })
	}

	pub fn bits_per_pixel(&self) -> u32 {
		self.colors.len().trailing_zeros()
	}

	/// The 3-bit size field packed into a GIF color-table-present byte.
	pub fn packed_size_field(&self) -> u8 {
		(self.bits_per_pixel() - 1) as u8
	}
}

/// Placement, dimensions and scan order of one frame's raster.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImageDescriptor {
	pub left: u16,
	pub top: u16,
	pub width: u16,
	pub height: u16,
	pub interlace: bool,
	pub local_color_map: Option<ColorMap>,
}

pub const EXT_GRAPHIC_CONTROL: u8 = 0xF9;
pub const EXT_COMMENT: u8 = 0xFE;
pub const EXT_APPLICATION: u8 = 0xFF;
pub const EXT_PLAIN_TEXT: u8 = 0x01;
pub const EXT_CONTINUATION: u8 = 0x00;

/// One sub-block of extension data, tagged with its function code. A continuation sub-block
/// (function `0x00`) belongs to the nearest preceding non-continuation record in the same frame's
/// list. This flat layout is the source of truth for re-serialization; decoded views like
/// `GraphicControl` are read-only conveniences derived from it on demand.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExtensionBlock {
	pub function: u8,
	pub payload: Box<[u8]>,
}

/// Disposal method from a decoded graphic control extension.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DisposalMethod {
	Unspecified,
	DoNotDispose,
	RestoreToBackground,
	RestoreToPrevious,
	Reserved(u8),
}

impl DisposalMethod {
	fn from_bits(bits: u8) -> Self {
		match bits {
			0 => DisposalMethod::Unspecified,
			1 => DisposalMethod::DoNotDispose,
			2 => DisposalMethod::RestoreToBackground,
			3 => DisposalMethod::RestoreToPrevious,
			other => DisposalMethod::Reserved(other),
		}
	}
}

/// The decoded fields of a graphic control extension (function code `0xF9`), which is always
/// exactly 4 payload bytes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GraphicControl {
	pub disposal: DisposalMethod,
	pub user_input: bool,
	pub delay_time_cs: u16,
	pub transparent_color: Option<u8>,
}

impl GraphicControl {
	/// Decodes a graphic control extension's 4-byte payload. Returns `None` if `payload` is not
	/// exactly 4 bytes, which a caller should treat the same as "no graphic control present".
	pub fn decode(payload: &[u8]) -> Option<Self> {
		if payload.len() != 4 {
			return None;
		}
		let packed = payload[0];
		let transparent_flag = packed & 0x01 != 0;
		Some(GraphicControl {
			disposal: DisposalMethod::from_bits((packed >> 2) & 0x07),
			user_input: packed & 0x02 != 0,
			delay_time_cs: u16::from_le_bytes([payload[1], payload[2]]),
			transparent_color: transparent_flag.then_some(payload[3]),
		})
	}
}

const NETSCAPE_IDENTIFIER: &[u8] = b"NETSCAPE2.0";

/// The NETSCAPE2.0 animation loop count, decoded from an application extension's introducer and
/// continuation sub-blocks.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Repeat {
	/// Loop forever.
	Infinite,
	/// Play the animation this many additional times after the first pass.
	Count(u16),
}

/// One decoded pixel raster together with its placement and the extension records that preceded
/// it in the file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Frame {
	pub descriptor: ImageDescriptor,
	pub raster: Vec<u8>,
	pub extensions: Vec<ExtensionBlock>,
}

impl Frame {
	pub fn new(descriptor: ImageDescriptor) -> Self {
		let len = descriptor.width as usize * descriptor.height as usize;
		Frame { descriptor, raster: vec![0u8; len], extensions: Vec::new() }
	}

	/// The decoded graphic control extension attached to this frame, if any.
	pub fn graphic_control(&self) -> Option<GraphicControl> {
		self.extensions.iter().find(|e| e.function == EXT_GRAPHIC_CONTROL).and_then(|e| GraphicControl::decode(&e.payload))
	}

	/// The color map this frame's pixel indices resolve against: its own local map if it has one,
	/// otherwise the file's global map.
	pub fn effective_color_map<'a>(&'a self, file: &'a GifFile) -> Option<&'a ColorMap> {
		self.descriptor.local_color_map.as_ref().or(file.global_color_map.as_ref())
	}
}

/// A whole GIF file: canvas dimensions, optional global palette, and the ordered list of frames.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GifFile {
	pub width: u16,
	pub height: u16,
	pub color_resolution: u8,
	pub background_color_index: u8,
	pub aspect_ratio: u8,
	pub global_color_map: Option<ColorMap>,
	pub frames: Vec<Frame>,
}

impl GifFile {
	pub fn new(width: u16, height: u16) -> Self {
		GifFile {
			width,
			height,
			color_resolution: 8,
			background_color_index: 0,
			aspect_ratio: 0,
			global_color_map: None,
			frames: Vec::new(),
		}
	}

	/// Appends a new frame, optionally deep-copying `source` (palette, raster, and extension
	/// list) so the new frame shares no heap allocation with it. Returns a reference to the
	/// frame just added.
	pub fn append_frame(&mut self, source: Option<&Frame>) -> Result<&mut Frame, GifError> {
		if self.frames.len() >= GIF_MAX_FRAMES {
			return Err(GifError::DataTooBig { requested: self.frames.len() + 1, limit: GIF_MAX_FRAMES });
		}
		let frame = match source {
			Some(src) => src.clone(),
			None => Frame::new(ImageDescriptor {
				left: 0,
				top: 0,
				width: self.width,
				height: self.height,
				interlace: false,
				local_color_map: None,
			}),
		};
		self.frames.push(frame);
		Ok(self.frames.last_mut().expect("just pushed"))
	}

	/// Drops the most recently appended frame, if any.
	pub fn drop_last_frame(&mut self) {
		self.frames.pop();
	}

	/// The NETSCAPE2.0 animation loop count, if any frame carries one. The raw extension blocks
	/// remain the source of truth; this is purely a read-only convenience over them.
	pub fn loop_count(&self) -> Option<Repeat> {
		for frame in &self.frames {
			let exts = &frame.extensions;
			for pair in exts.windows(2) {
				let [intro, cont] = pair else { continue };
				if intro.function == EXT_APPLICATION
					&& intro.payload.len() >= NETSCAPE_IDENTIFIER.len()
					&& &intro.payload[..NETSCAPE_IDENTIFIER.len()] == NETSCAPE_IDENTIFIER
					&& cont.function == EXT_CONTINUATION
					&& cont.payload.len() == 3
					&& cont.payload[0] == 0x01
				{
					let count = u16::from_le_bytes([cont.payload[1], cont.payload[2]]);
					return Some(if count == 0 { Repeat::Infinite } else { Repeat::Count(count) });
				}
			}
		}
		None
	}
}
