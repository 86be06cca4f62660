use crate::core::library::xs_library::XsLibrary;
use std::error::Error;
use std::fs::File;
use std::io::{self, BufReader, BufWriter, Read, Write};
use std::path::Path;

/// Defines the interface for reading and writing cross-section library files.
///
/// Implementors handle one on-disk format. The cross-section protocol only needs to
/// load a library into identifier-keyed entries and to store one back.
pub trait LibraryFile {
    /// The error type for I/O operations.
    type Error: Error + From<io::Error>;

    /// Reads a library from a reader.
    ///
    /// # Errors
    ///
    /// Returns an error if the content is malformed or the reader fails.
    fn read_from(reader: &mut impl Read) -> Result<XsLibrary, Self::Error>;

    /// Writes a library to a writer.
    ///
    /// # Errors
    ///
    /// Returns an error if the library cannot be encoded or the writer fails.
    fn write_to(library: &XsLibrary, writer: &mut impl Write) -> Result<(), Self::Error>;

    /// Reads a library from a file path.
    ///
    /// The file name becomes the library name unless the format stores one.
    fn read_from_path<P: AsRef<Path>>(path: P) -> Result<XsLibrary, Self::Error> {
        let path = path.as_ref();
        let file = File::open(path)?;
        let mut reader = BufReader::new(file);
        let mut library = Self::read_from(&mut reader)?;
        if library.name().is_empty() {
            if let Some(stem) = path.file_name().and_then(|n| n.to_str()) {
                library.set_name(stem);
            }
        }
        Ok(library)
    }

    /// Writes a library to a file path, creating or truncating the file.
    fn write_to_path<P: AsRef<Path>>(library: &XsLibrary, path: P) -> Result<(), Self::Error> {
        let file = File::create(path)?;
        let mut writer = BufWriter::new(file);
        Self::write_to(library, &mut writer)?;
        writer.flush()?;
        Ok(())
    }
}
