use thiserror::Error;

/// The single error surface for the whole crate. Every public operation returns
/// `Result<_, GifError>`; nothing here is ever swallowed internally.
#[derive(Error, Debug)]
pub enum GifError {
	#[error("failed to open GIF file")]
	OpenFailed(#[source] std::io::Error),

	#[error("failed to read GIF data")]
	ReadFailed(#[source] std::io::Error),

	#[error("failed to write GIF data")]
	WriteFailed(#[source] std::io::Error),

	#[error("not a GIF file (missing GIF87a/GIF89a signature)")]
	NotGifFile,

	#[error("missing logical screen descriptor")]
	NoScreenDescriptor,

	#[error("missing image descriptor")]
	NoImageDescriptor,

	#[error("no color map available for this frame")]
	NoColorMap,

	#[error("unexpected record type byte {0:#04x}")]
	WrongRecord(u8),

	#[error("requested size {requested} exceeds the supported limit {limit}")]
	DataTooBig { requested: usize, limit: usize },

	#[error("not enough memory to complete the operation")]
	NotEnoughMemory,

	#[error("failed to close the file handle")]
	CloseFailed(#[source] std::io::Error),

	#[error("file handle is not open for reading")]
	NotReadable,

	#[error("file handle is not open for writing")]
	NotWriteable,

	#[error("malformed LZW code stream: {0}")]
	ImageDefect(String),

	#[error("code stream ended before an end-of-information code was seen")]
	EofTooSoon,

	#[error("disk is full")]
	DiskFull,

	#[error("file handle already has a screen descriptor")]
	HasScreenDescriptor,

	#[error("file handle already has an image descriptor")]
	HasImageDescriptor,

	#[error("GIF I/O error")]
	Io(#[from] std::io::Error),

	#[error("LZW bit packer misuse")]
	BitIo(#[from] crate::lzw::bitio::BitIoError),
}

impl GifError {
	/// A stable, distinct integer per error variant, for callers that want to switch on a code
	/// rather than match the enum (mirrors the flat integer error codes of the C library this
	/// crate's on-disk format is compatible with).
	pub fn code(&self) -> i32 {
		use GifError::*;
		match self {
			OpenFailed(_) => 1,
			ReadFailed(_) | Io(_) => 2,
			WriteFailed(_) => 3,
			NotGifFile => 4,
			NoScreenDescriptor => 5,
			NoImageDescriptor => 6,
			NoColorMap => 7,
			WrongRecord(_) => 8,
			DataTooBig { .. } => 9,
			NotEnoughMemory => 10,
			CloseFailed(_) => 11,
			NotReadable => 12,
			NotWriteable => 13,
			ImageDefect(_) => 14,
			EofTooSoon => 15,
			DiskFull => 16,
			HasScreenDescriptor => 17,
			HasImageDescriptor => 18,
			BitIo(_) => 19,
		}
	}
}
