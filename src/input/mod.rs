//! Text input: line reading, section location and source opening.

mod lines;
mod remote;
mod section;

pub use lines::LineReader;
pub use remote::fetch_bytes;
pub use section::{SectionStart, seek_section};

use anyhow::{Context, Result};
use std::fs::File;
use std::io::{self, BufRead, BufReader, Cursor};
use tracing::debug;

/// Opens `-` (stdin), an `http(s)://` URL or a local file as a buffered reader.
pub fn open_source(source: &str) -> Result<Box<dyn BufRead>> {
    if source == "-" {
        debug!("Reading cohort from stdin");
        return Ok(Box::new(BufReader::new(io::stdin())));
    }

    if source.starts_with("http://") || source.starts_with("https://") {
        debug!(url = source, "Fetching cohort over HTTP");
        let bytes = fetch_bytes(source).with_context(|| format!("failed to fetch {source}"))?;
        return Ok(Box::new(Cursor::new(bytes)));
    }

    let file = File::open(source).with_context(|| format!("cannot open {source}"))?;
    Ok(Box::new(BufReader::new(file)))
}
