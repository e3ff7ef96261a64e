pub mod error;
pub mod handle;
pub mod interlace;
pub mod lzw;
pub mod model;
pub mod parser;
pub mod serializer;
pub mod subblock;

pub mod prelude;

pub use error::GifError;
pub use handle::{GifReader, GifWriter};
pub use model::GifFile;
