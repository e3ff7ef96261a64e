//! File handles: the public entry point for reading and writing GIF files against the
//! filesystem, built on top of `parser`/`serializer`/`model`. A handle owns its whole-file buffer
//! and its LZW scratch table (§5's "Resource policy"): every frame decoded or encoded through one
//! handle reuses the same 48 KiB scratch allocation instead of paying for it per frame.

use std::fs;
use std::io;
use std::path::Path;

use crate::error::GifError;
use crate::lzw::{DecoderScratch, EncoderScratch};
use crate::model::GifFile;
use crate::parser;
use crate::serializer;

/// A handle opened for reading. Holds the whole file in memory (per §5, streaming decode with
/// bounded memory is out of scope) plus a reusable LZW decoder scratch table.
pub struct GifReader {
	data: Vec<u8>,
	scratch: DecoderScratch,
}

impl GifReader {
	/// Opens `path` and reads its entire contents into memory. Does not parse anything yet; call
	/// `slurp` to do that.
	pub fn open_read<P: AsRef<Path>>(path: P) -> Result<Self, GifError> {
		let data = fs::read(path).map_err(GifError::OpenFailed)?;
		Ok(GifReader::open_read_bytes(data))
	}

	/// Adopts an already-read buffer as a reader, for callers that obtained the bytes some other
	/// way (a network fetch, an embedded asset, ...).
	pub fn open_read_bytes(data: Vec<u8>) -> Self {
		GifReader { data, scratch: DecoderScratch::new() }
	}

	/// Parses every frame out of the open file.
	pub fn slurp(&mut self) -> Result<GifFile, GifError> {
		if self.data.is_empty() {
			return Err(GifError::NotReadable);
		}
		parser::parse_with_scratch(&self.data, &mut self.scratch)
	}

	/// Releases the handle's resources. Reading is pure-value (`slurp` already returned an owned
	/// `GifFile`), so this just drops the buffer and scratch table; it exists to make the
	/// open/close lifecycle explicit at call sites, mirroring `close-read` in the public
	/// interface.
	pub fn close(self) -> Result<(), GifError> {
		Ok(())
	}
}

/// A handle opened for writing.
pub struct GifWriter {
	path: std::path::PathBuf,
	exclusive: bool,
	scratch: EncoderScratch,
}

impl GifWriter {
	/// Opens `path` for writing. When `exclusive` is true, fails if the file already exists
	/// instead of silently overwriting it.
	pub fn open_write<P: AsRef<Path>>(path: P, exclusive: bool) -> Result<Self, GifError> {
		Ok(GifWriter { path: path.as_ref().to_path_buf(), exclusive, scratch: EncoderScratch::new() })
	}

	/// Serializes `file` and writes it out, closing the handle afterward.
	pub fn spew(self, file: &GifFile) -> Result<(), GifError> {
		let mut scratch = self.scratch;
		let bytes = serializer::serialize_with_scratch(file, &mut scratch)?;

		let mut open_options = fs::OpenOptions::new();
		open_options.write(true).truncate(true).create(true);
		if self.exclusive {
			open_options.create_new(true).create(false);
		}
		let result = open_options.open(&self.path).and_then(|mut f| {
			use io::Write;
			f.write_all(&bytes)
		});

		match result {
			Ok(()) => Ok(()),
			// ENOSPC doesn't have a portable ErrorKind across our MSRV; check the raw OS error
			// instead so a full disk reports disk-full rather than a generic write failure.
			Err(e) if e.raw_os_error() == Some(28) => Err(GifError::DiskFull),
			Err(e) => Err(GifError::WriteFailed(e)),
		}
	}

	/// Releases the handle's resources without writing anything (used when a caller abandons a
	/// write, e.g. after building a partially-valid `GifFile` that failed validation).
	pub fn close(self) -> Result<(), GifError> {
		Ok(())
	}
}
