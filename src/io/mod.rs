//! Reading simulation requests and writing batch reports.
//!
//! - [`SimulationInput`]: The request document, in JSON or TOML
//! - [`Report`]: The JSON envelope written after a batch
//!
//! Both sides work on any [`Read`]/[`Write`], so files, stdin and stdout
//! are handled the same way by callers.

use std::fmt;
use std::io::{Read, Write};

pub mod error;
pub mod input;
pub mod report;

pub use error::Error;
pub use input::{ParticleInput, SimulationInput};
pub use report::{ErrorRecord, Report};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Format {
    #[default]
    Json,
    Toml,
}

impl fmt::Display for Format {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Format::Json => write!(f, "JSON"),
            Format::Toml => write!(f, "TOML"),
        }
    }
}

/// Parses a [`SimulationInput`] document from `reader`.
pub fn read_input<R: Read>(mut reader: R, format: Format) -> Result<SimulationInput, Error> {
    let mut text = String::new();
    reader.read_to_string(&mut text)?;

    if text.trim().is_empty() {
        return Err(Error::invalid("input document is empty"));
    }

    let input = match format {
        Format::Json => serde_json::from_str(&text)?,
        Format::Toml => toml::from_str(&text)?,
    };
    Ok(input)
}

/// Writes `report` to `writer` as pretty-printed JSON followed by a newline.
///
/// Only [`Format::Json`] is supported; the envelope may contain `null`s
/// that TOML cannot represent.
pub fn write_report<W: Write>(mut writer: W, report: &Report, format: Format) -> Result<(), Error> {
    match format {
        Format::Json => {
            serde_json::to_writer_pretty(&mut writer, report)?;
            writeln!(writer)?;
            writer.flush()?;
            Ok(())
        }
        Format::Toml => Err(Error::UnsupportedFormat(format)),
    }
}
