// to get everything this library has to offer with a single `use animgif::prelude::*;`

pub use crate::{
	error::GifError,
	handle::{GifReader, GifWriter},
	interlace::{deinterlace, interlace},
	lzw::{decode, encode, DecoderScratch, EncoderScratch},
	model::{
		ColorEntry, ColorMap, DisposalMethod, ExtensionBlock, Frame, GifFile, GraphicControl, ImageDescriptor, Repeat,
		EXT_APPLICATION, EXT_COMMENT, EXT_CONTINUATION, EXT_GRAPHIC_CONTROL, EXT_PLAIN_TEXT,
	},
	parser::parse,
	serializer::serialize,
};
