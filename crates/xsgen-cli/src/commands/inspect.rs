use crate::cli::InspectArgs;
use crate::error::{CliError, Result};
use std::fmt::Write as _;
use xsgen::core::io::binary::BinaryLibraryFile;
use xsgen::core::io::traits::LibraryFile;
use xsgen::core::library::xs_library::XsLibrary;

pub fn run(args: InspectArgs) -> Result<()> {
    let library =
        BinaryLibraryFile::read_from_path(&args.file).map_err(|e| CliError::FileParsing {
            path: args.file.clone(),
            source: e.into(),
        })?;
    print!("{}", render(&library));
    Ok(())
}

fn render(library: &XsLibrary) -> String {
    let mut out = String::new();
    let _ = writeln!(
        out,
        "Library `{}`: {} XS ID(s)",
        library.name(),
        library.len()
    );
    for (xs_id, data) in library.entries() {
        let _ = writeln!(out, "  {:<8} {:>10} bytes", xs_id.as_str(), data.len());
    }
    out
}
