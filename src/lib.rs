//! Convert the line paths of an SVG file to fixed-point C coordinate arrays.
//!
//! This can be used e.g. for laser or vector display firmware that reads a
//! table of points at runtime and just draws straight lines between them.
//!
//! Only a small subset of the path syntax is supported: `m`, `M`, `l`, `v`,
//! `h`, `H` and `z`, with single-space separated tokens and comma-joined
//! coordinate pairs. Curves are rejected. Inkscape can convert a path
//! containing curves into a path of only lines.
//!
//! All coordinates of a document are scaled into `0..=resolution` using the
//! bounding box of all paths, with the y axis flipped.
//!
//! You can optionally get serde 1 support by enabling the `serde` feature.

#![deny(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::missing_errors_doc)]
#![allow(clippy::must_use_candidate)]

use std::convert;
use std::iter;
use std::str;

use log::{debug, trace};
use quick_xml::events::attributes::Attribute;
use quick_xml::events::Event;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

pub mod config;
pub mod emit;
mod error;
pub mod path;

pub use crate::config::{DataType, QuantizationConfig};
pub use crate::emit::{emit, EmittedTable, Extent};
pub use crate::error::Error;
pub use crate::path::{interpret, PathError};

/// A `CoordinatePair` consists of an x and y coordinate.
#[derive(Debug, PartialEq, Copy, Clone)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct CoordinatePair {
    pub x: f64,
    pub y: f64,
}

impl CoordinatePair {
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    /// Return this pair moved by a relative offset.
    pub fn offset(self, by: CoordinatePair) -> Self {
        Self::new(self.x + by.x, self.y + by.y)
    }
}

impl convert::From<(f64, f64)> for CoordinatePair {
    fn from(val: (f64, f64)) -> Self {
        Self { x: val.0, y: val.1 }
    }
}

/// The absolute coordinates of one `<path>` element, one per operand.
pub type ResolvedPath = Vec<CoordinatePair>;

/// Parse an SVG string, return the `d` attribute of every path element in
/// document order.
pub fn parse_xml(svg: &str) -> Result<Vec<String>, Error> {
    trace!("parse_xml");

    let mut reader = quick_xml::Reader::from_str(svg);
    reader.trim_text(true);

    let mut paths = Vec::new();
    let mut buf = Vec::new();
    loop {
        match reader.read_event(&mut buf) {
            Ok(Event::Start(ref e)) | Ok(Event::Empty(ref e)) => {
                trace!("parse_xml: Matched start of {:?}", e.name());
                if e.name() == b"path" {
                    trace!("parse_xml: Found path element");
                    // If multiple "d" attributes are present, the first one wins.
                    let path_expr: Option<String> = e
                        .attributes()
                        .filter_map(Result::ok)
                        .find_map(|attr: Attribute| {
                            if attr.key == b"d" {
                                attr.unescaped_value()
                                    .ok()
                                    .and_then(|v| str::from_utf8(&v).map(str::to_string).ok())
                            } else {
                                None
                            }
                        });
                    match path_expr {
                        Some(expr) => paths.push(expr),
                        None => return Err(Error::MissingPathData { index: paths.len() }),
                    }
                }
            }
            Ok(Event::Eof) => {
                trace!("parse_xml: EOF");
                break;
            }
            Ok(_) => {}
            Err(e) => return Err(Error::SvgParse(format!("Error when parsing XML: {}", e))),
        }

        buf.clear();
    }
    trace!("parse_xml: Return {} paths", paths.len());
    Ok(paths)
}

/// Interpret a list of path-data strings. The first failing path aborts the
/// whole document.
pub fn interpret_all<S: AsRef<str>>(exprs: &[S]) -> Result<Vec<ResolvedPath>, Error> {
    interpret_indexed(exprs.iter().map(AsRef::<str>::as_ref).enumerate())
}

/// Interpret `(path element index, path data)` pairs. Errors carry the
/// element index, not the position in `exprs`.
fn interpret_indexed<'a, I>(exprs: I) -> Result<Vec<ResolvedPath>, Error>
where
    I: IntoIterator<Item = (usize, &'a str)>,
{
    exprs
        .into_iter()
        .map(|(index, expr)| {
            let path = interpret(expr).map_err(|source| Error::Path { index, source })?;
            debug!("Path {}: {} points", index, path.len());
            Ok(path)
        })
        .collect()
}

/// Parse an SVG string into one resolved path per `<path>` element.
///
/// With `only` set, just the path element with that (0-based) index is
/// interpreted.
pub fn parse(svg: &str, only: Option<usize>) -> Result<Vec<ResolvedPath>, Error> {
    trace!("parse");

    let path_exprs = parse_xml(svg)?;
    trace!("parse: Found {} path expressions", path_exprs.len());

    match only {
        Some(index) => {
            let expr = path_exprs.get(index).ok_or(Error::PathIndexOutOfRange {
                index,
                count: path_exprs.len(),
            })?;
            interpret_indexed(iter::once((index, expr.as_str())))
        }
        None => interpret_all(&path_exprs),
    }
}

/// Run the whole pipeline: load the paths of an SVG document and quantize
/// them into an [`EmittedTable`].
pub fn convert(
    svg: &str,
    config: &QuantizationConfig,
    only: Option<usize>,
) -> Result<EmittedTable, Error> {
    let paths = parse(svg, only)?;
    emit(&paths, config)
}
