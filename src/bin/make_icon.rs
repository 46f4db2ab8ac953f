//! Draws the Inkpad icon and writes it to `./icon.png`.
//!
//! Takes no arguments.  Exit status: 0 on success, 1 if the image could not
//! be encoded, 2 if the file could not be written.

use std::process::ExitCode;

use inkpad::icon;

const EXIT_ENCODE: u8 = 1;
const EXIT_WRITE: u8 = 2;

fn main() -> ExitCode {
    inkpad::logging::init();

    let png = match icon::render().and_then(|pixmap| icon::encode_png(&pixmap)) {
        Ok(png) => png,
        Err(e) => {
            eprintln!("Failed to create PNG data: {e}");
            return ExitCode::from(EXIT_ENCODE);
        }
    };

    let written = std::env::current_dir()
        .map_err(|e| e.to_string())
        .and_then(|dir| icon::write_png(&dir, &png).map_err(|e| e.to_string()));

    match written {
        Ok(path) => {
            println!("Wrote {} to {}", icon::OUTPUT_FILE, path.display());
            ExitCode::SUCCESS
        }
        Err(e) => {
            eprintln!("Failed to write PNG: {e}");
            ExitCode::from(EXIT_WRITE)
        }
    }
}
