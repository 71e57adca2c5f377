//! Service layer for I/O and format handling

pub mod format;
pub mod io;

pub use format::OutputFormatHandler;
pub use io::ImageIoService;
