//! Normalization of resolved paths into fixed-point coordinate tables and
//! rendering of those tables as C declarations.

use std::convert::TryFrom;
use std::fmt;

use log::{debug, trace, warn};

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::config::{DataType, QuantizationConfig};
use crate::error::Error;
use crate::{CoordinatePair, ResolvedPath};

/// Axis-aligned bounding box over all points of a document.
#[derive(Debug, PartialEq, Copy, Clone)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Extent {
    pub min_x: f64,
    pub min_y: f64,
    pub max_x: f64,
    pub max_y: f64,
}

impl Extent {
    /// Return the bounding box of `points`, or `None` if there are none.
    pub fn from_points<'a, I>(points: I) -> Option<Self>
    where
        I: IntoIterator<Item = &'a CoordinatePair>,
    {
        let mut points = points.into_iter();
        let first = points.next()?;
        let init = Self {
            min_x: first.x,
            min_y: first.y,
            max_x: first.x,
            max_y: first.y,
        };
        Some(points.fold(init, |ext, p| Self {
            min_x: ext.min_x.min(p.x),
            min_y: ext.min_y.min(p.y),
            max_x: ext.max_x.max(p.x),
            max_y: ext.max_y.max(p.y),
        }))
    }

    pub fn width(&self) -> f64 {
        self.max_x - self.min_x
    }

    pub fn height(&self) -> f64 {
        self.max_y - self.min_y
    }
}

/// The quantized coordinates of a whole document.
///
/// All points are packed into one array per component. `path_lengths` holds
/// the number of points of each path, so that the start and end of every path
/// can be found at runtime.
#[derive(Debug, PartialEq, Clone)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct EmittedTable {
    pub data_type: DataType,
    pub extent: Extent,
    pub path_lengths: Vec<usize>,
    pub x_coords: Vec<i64>,
    pub y_coords: Vec<i64>,
}

/// Scale all paths of a document into the integer range described by
/// `config`.
///
/// X is mapped to `trunc((x - min_x) / width * resolution) + x_offset`. Y is
/// flipped (SVG y grows downwards) and mapped to
/// `resolution - trunc((y - min_y) / height * resolution) + y_offset`.
#[allow(clippy::cast_possible_truncation)]
pub fn emit(paths: &[ResolvedPath], config: &QuantizationConfig) -> Result<EmittedTable, Error> {
    trace!("emit");
    config.validate()?;

    let path_lengths: Vec<usize> = paths.iter().map(Vec::len).collect();
    let extent = Extent::from_points(paths.iter().flatten()).ok_or(Error::EmptyInput)?;
    let (width, height) = (extent.width(), extent.height());
    debug!("emit: Canvas size {} x {}", width, height);
    if width == 0.0 || height == 0.0 {
        return Err(Error::DegenerateExtent { width, height });
    }

    let resolution = i64::from(config.resolution);
    let scale = f64::from(config.resolution);
    let overflow = Error::OffsetOverflow {
        x_offset: config.x_offset,
        y_offset: config.y_offset,
    };
    let scaled = paths
        .iter()
        .flatten()
        .map(|p| {
            let x = (((p.x - extent.min_x) / width * scale) as i64).checked_add(config.x_offset);
            let y = resolution
                .checked_sub(((p.y - extent.min_y) / height * scale) as i64)
                .and_then(|y| y.checked_add(config.y_offset));
            x.zip(y)
        })
        .collect::<Option<Vec<(i64, i64)>>>()
        .ok_or(overflow)?;
    let (x_coords, y_coords): (Vec<i64>, Vec<i64>) = scaled.into_iter().unzip();

    let table = EmittedTable {
        data_type: config.data_type,
        extent,
        path_lengths,
        x_coords,
        y_coords,
    };

    let unfit = table.unfit();
    if unfit.coords > 0 {
        warn!(
            "{} scaled coordinates do not fit into {} (check the offsets)",
            unfit.coords, config.data_type
        );
    }
    if unfit.path_lengths > 0 {
        warn!("{} path lengths do not fit into uint16_t", unfit.path_lengths);
    }
    if unfit.num_paths {
        warn!("{} paths do not fit into uint16_t", table.num_paths());
    }
    if unfit.num_points {
        warn!("{} points do not fit into uint32_t", table.num_points());
    }

    Ok(table)
}

/// Values of an [`EmittedTable`] that do not fit the C type they are
/// declared with.
#[derive(Debug, PartialEq, Eq, Default, Copy, Clone)]
pub struct Unfit {
    /// Scaled x and y values outside the configured data type.
    pub coords: usize,
    /// Path lengths above `uint16_t`.
    pub path_lengths: usize,
    pub num_paths: bool,
    pub num_points: bool,
}

impl Unfit {
    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }
}

impl EmittedTable {
    pub fn num_paths(&self) -> usize {
        self.path_lengths.len()
    }

    pub fn num_points(&self) -> usize {
        self.x_coords.len()
    }

    /// Storage needed by the two coordinate arrays.
    pub fn bytes_used(&self) -> usize {
        self.num_points() * 2 * self.data_type.bytes()
    }

    /// Smallest and largest scaled x value.
    pub fn x_range(&self) -> Option<(i64, i64)> {
        min_max(&self.x_coords)
    }

    /// Smallest and largest scaled y value.
    pub fn y_range(&self) -> Option<(i64, i64)> {
        min_max(&self.y_coords)
    }

    /// Check every declared value against its C type.
    pub fn unfit(&self) -> Unfit {
        let max = self.data_type.max_value();
        let u16_max = usize::from(u16::MAX);
        Unfit {
            coords: self
                .x_coords
                .iter()
                .chain(&self.y_coords)
                .filter(|&&v| u64::try_from(v).map_or(true, |v| v > max))
                .count(),
            path_lengths: self.path_lengths.iter().filter(|&&len| len > u16_max).count(),
            num_paths: self.num_paths() > u16_max,
            num_points: u32::try_from(self.num_points()).is_err(),
        }
    }

    /// Render the C declarations, naming every identifier `<prefix>__<field>`.
    pub fn declarations<'a>(&'a self, prefix: &'a str) -> Declarations<'a> {
        Declarations {
            table: self,
            prefix,
        }
    }

    /// Render the human readable summary printed before the declarations.
    pub fn diagnostics(&self) -> Diagnostics<'_> {
        Diagnostics { table: self }
    }
}

fn min_max(values: &[i64]) -> Option<(i64, i64)> {
    let min = values.iter().min()?;
    let max = values.iter().max()?;
    Some((*min, *max))
}

fn join<T: ToString>(values: &[T]) -> String {
    values
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join(",")
}

/// Format a float with 12 significant digits, always keeping a decimal point
/// or exponent (`10.0`, `0.3`, `1e+20`).
#[allow(clippy::cast_sign_loss)]
fn format_g12(value: f64) -> String {
    const DIGITS: i32 = 12;

    if !value.is_finite() {
        return value.to_string();
    }
    let sci = format!("{:.*e}", (DIGITS - 1) as usize, value);
    let (mantissa, exp) = sci.split_at(sci.find('e').unwrap_or(sci.len()));
    let exp: i32 = exp.trim_start_matches('e').parse().unwrap_or(0);

    let mut out = if exp < -4 || exp >= DIGITS {
        let sign = if exp < 0 { '-' } else { '+' };
        format!("{}e{}{:02}", strip_zeros(mantissa), sign, exp.abs())
    } else {
        strip_zeros(&format!("{:.*}", (DIGITS - 1 - exp) as usize, value)).to_string()
    };
    if !out.contains('.') && !out.contains('e') {
        out.push_str(".0");
    }
    out
}

fn strip_zeros(s: &str) -> &str {
    if s.contains('.') {
        s.trim_end_matches('0').trim_end_matches('.')
    } else {
        s
    }
}

/// `Display` adapter returned by [`EmittedTable::declarations`].
pub struct Declarations<'a> {
    table: &'a EmittedTable,
    prefix: &'a str,
}

impl fmt::Display for Declarations<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let t = self.table;
        let p = self.prefix;
        let ty = t.data_type.c_name();
        // Same header as the legacy generator, so spliced output stays identical.
        writeln!(f, "/* auto generated with svg_to_arr.py */")?;
        writeln!(f, "static uint16_t {}__num_paths = {};", p, t.num_paths())?;
        writeln!(f, "static uint32_t {}__num_points = {};", p, t.num_points())?;
        writeln!(
            f,
            "static uint16_t {}__path_lengths[{}] = {{{}}};",
            p,
            t.num_paths(),
            join(&t.path_lengths)
        )?;
        writeln!(
            f,
            "static {} {}__x_coords[{}] = {{{}}};",
            ty,
            p,
            t.num_points(),
            join(&t.x_coords)
        )?;
        writeln!(
            f,
            "static {} {}__y_coords[{}] = {{{}}};",
            ty,
            p,
            t.num_points(),
            join(&t.y_coords)
        )
    }
}

/// `Display` adapter returned by [`EmittedTable::diagnostics`].
pub struct Diagnostics<'a> {
    table: &'a EmittedTable,
}

impl fmt::Display for Diagnostics<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let t = self.table;
        writeln!(f, "Paths found: {}", t.num_paths())?;
        writeln!(
            f,
            "Canvas size: {} {}",
            format_g12(t.extent.width()),
            format_g12(t.extent.height())
        )?;
        if let (Some((min_x, max_x)), Some((min_y, max_y))) = (t.x_range(), t.y_range()) {
            writeln!(f, "Min x {}", min_x)?;
            writeln!(f, "Max x {}", max_x)?;
            writeln!(f, "Min y {}", min_y)?;
            writeln!(f, "Max y {}", max_y)?;
        }
        writeln!(f, "Bytes used: {}", t.bytes_used())?;
        writeln!(f)?;
        writeln!(f, "OUTPUT:")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn path(points: &[(f64, f64)]) -> ResolvedPath {
        points.iter().map(|&p| p.into()).collect()
    }

    fn two_paths() -> Vec<ResolvedPath> {
        vec![
            path(&[(0., 0.), (10., 0.), (10., 10.), (0., 10.)]),
            path(&[(5., 5.), (2.5, 7.5), (7.5, 2.5)]),
        ]
    }

    fn config(data_type: DataType, resolution: u32) -> QuantizationConfig {
        QuantizationConfig::new(data_type, resolution, 0, 0).unwrap()
    }

    #[test]
    fn test_extent() {
        let paths = two_paths();
        let extent = Extent::from_points(paths.iter().flatten()).unwrap();
        assert_eq!(
            extent,
            Extent {
                min_x: 0.,
                min_y: 0.,
                max_x: 10.,
                max_y: 10.
            }
        );
        assert_eq!(Extent::from_points(&ResolvedPath::new()), None);
    }

    #[test]
    fn test_extent_order_independent() {
        let a = vec![path(&[(3., -1.), (8., 4.)]), path(&[(-2., 6.)])];
        let b = vec![path(&[(-2., 6.)]), path(&[(8., 4.), (3., -1.)])];
        let ext_a = Extent::from_points(a.iter().flatten());
        let ext_b = Extent::from_points(b.iter().flatten());
        assert_eq!(ext_a, ext_b);

        let c = vec![path(&[(-2., 6.)]), path(&[(8., 4.), (3., -1.5)])];
        assert_ne!(ext_a, Extent::from_points(c.iter().flatten()));
    }

    #[test]
    fn test_path_lengths_and_counts() {
        let table = emit(&two_paths(), &config(DataType::U16, 100)).unwrap();
        assert_eq!(table.path_lengths, vec![4, 3]);
        assert_eq!(table.num_paths(), 2);
        assert_eq!(table.num_points(), 7);
        assert_eq!(table.bytes_used(), 28);
    }

    #[test]
    fn test_scaling_and_y_flip() {
        let table = emit(&two_paths(), &config(DataType::U16, 100)).unwrap();
        assert_eq!(table.x_coords, vec![0, 100, 100, 0, 50, 25, 75]);
        assert_eq!(table.y_coords, vec![100, 100, 0, 0, 50, 25, 75]);
    }

    #[test]
    fn test_full_range() {
        let paths = vec![path(&[(0., 0.), (4095., 2000.), (1000., 4095.)])];
        let table = emit(&paths, &config(DataType::U16, 4095)).unwrap();
        assert_eq!(table.x_range(), Some((0, 4095)));
        assert_eq!(table.y_range(), Some((0, 4095)));
    }

    #[test]
    fn test_truncation_not_rounding() {
        let paths = vec![path(&[(0., 0.), (2., 2.), (3., 3.)])];
        let table = emit(&paths, &config(DataType::U8, 100)).unwrap();
        // 2 / 3 * 100 = 66.67
        assert_eq!(table.x_coords, vec![0, 66, 100]);
        assert_eq!(table.y_coords, vec![100, 34, 0]);
    }

    #[test]
    fn test_offsets() {
        let config = QuantizationConfig::new(DataType::U16, 10, 5, -3).unwrap();
        let paths = vec![path(&[(0., 0.), (1., 1.)])];
        let table = emit(&paths, &config).unwrap();
        assert_eq!(table.x_coords, vec![5, 15]);
        assert_eq!(table.y_coords, vec![7, -3]);
    }

    #[test]
    fn test_empty_input() {
        let cfg = config(DataType::U16, 4096);
        match emit(&[], &cfg) {
            Err(Error::EmptyInput) => {}
            other => panic!("Unexpected result: {:?}", other),
        }
        match emit(&[ResolvedPath::new(), ResolvedPath::new()], &cfg) {
            Err(Error::EmptyInput) => {}
            other => panic!("Unexpected result: {:?}", other),
        }
    }

    #[test]
    fn test_degenerate_extent() {
        let cfg = config(DataType::U16, 4096);
        let horizontal = vec![path(&[(0., 5.), (10., 5.)])];
        match emit(&horizontal, &cfg) {
            Err(Error::DegenerateExtent { width, height }) => {
                assert_eq!(width, 10.);
                assert_eq!(height, 0.);
            }
            other => panic!("Unexpected result: {:?}", other),
        }
        let single = vec![path(&[(3., 3.)])];
        assert!(emit(&single, &cfg).is_err());
    }

    #[test]
    fn test_empty_path_keeps_its_slot() {
        let paths = vec![path(&[(0., 0.), (1., 1.)]), ResolvedPath::new()];
        let table = emit(&paths, &config(DataType::U8, 10)).unwrap();
        assert_eq!(table.path_lengths, vec![2, 0]);
        assert_eq!(table.num_points(), 2);
    }

    #[test]
    fn test_declarations() {
        let table = emit(&two_paths(), &config(DataType::U16, 100)).unwrap();
        assert_eq!(
            table.declarations("logo").to_string(),
            "/* auto generated with svg_to_arr.py */\n\
             static uint16_t logo__num_paths = 2;\n\
             static uint32_t logo__num_points = 7;\n\
             static uint16_t logo__path_lengths[2] = {4,3};\n\
             static uint16_t logo__x_coords[7] = {0,100,100,0,50,25,75};\n\
             static uint16_t logo__y_coords[7] = {100,100,0,0,50,25,75};\n"
        );
    }

    #[test]
    fn test_declarations_data_type() {
        let paths = vec![path(&[(0., 0.), (1., 1.)])];
        let table = emit(&paths, &config(DataType::U8, 200)).unwrap();
        let out = table.declarations("img").to_string();
        assert!(out.contains("static uint8_t img__x_coords[2] = {0,200};"));
        assert!(out.contains("static uint8_t img__y_coords[2] = {200,0};"));
        assert!(out.contains("static uint16_t img__path_lengths[1] = {2};"));
    }

    #[test]
    fn test_diagnostics() {
        let table = emit(&two_paths(), &config(DataType::U16, 100)).unwrap();
        assert_eq!(
            table.diagnostics().to_string(),
            "Paths found: 2\n\
             Canvas size: 10.0 10.0\n\
             Min x 0\n\
             Max x 100\n\
             Min y 0\n\
             Max y 100\n\
             Bytes used: 28\n\
             \n\
             OUTPUT:\n"
        );
    }

    #[test]
    fn test_offset_overflow() {
        let paths = vec![path(&[(0., 0.), (1., 1.)])];
        let config = QuantizationConfig::new(DataType::U16, 10, i64::MAX, 0).unwrap();
        match emit(&paths, &config) {
            Err(Error::OffsetOverflow { x_offset, y_offset: 0 }) => assert_eq!(x_offset, i64::MAX),
            other => panic!("Unexpected result: {:?}", other),
        }
        let config = QuantizationConfig::new(DataType::U16, 10, 0, i64::MAX).unwrap();
        assert!(emit(&paths, &config).is_err());

        // The largest offset that still fits is accepted.
        let config = QuantizationConfig::new(DataType::U16, 10, i64::MAX - 10, 0).unwrap();
        let table = emit(&paths, &config).unwrap();
        assert_eq!(table.x_coords, vec![i64::MAX - 10, i64::MAX]);
    }

    #[test]
    fn test_unfit() {
        let table = emit(&two_paths(), &config(DataType::U16, 100)).unwrap();
        assert!(table.unfit().is_empty());

        let config = QuantizationConfig::new(DataType::U8, 255, 1, -1).unwrap();
        let table = emit(&[path(&[(0., 0.), (1., 1.)])], &config).unwrap();
        // x: 1 and 256, y: 254 and -1
        assert_eq!(
            table.unfit(),
            Unfit {
                coords: 2,
                ..Unfit::default()
            }
        );
    }

    #[test]
    fn test_unfit_path_table() {
        let table = EmittedTable {
            data_type: DataType::U16,
            extent: Extent {
                min_x: 0.,
                min_y: 0.,
                max_x: 1.,
                max_y: 1.,
            },
            path_lengths: vec![0; 65_536],
            x_coords: Vec::new(),
            y_coords: Vec::new(),
        };
        let unfit = table.unfit();
        assert!(unfit.num_paths);
        assert_eq!(unfit.path_lengths, 0);

        let table = EmittedTable {
            path_lengths: vec![3, 65_536, 70_000],
            ..table
        };
        let unfit = table.unfit();
        assert!(!unfit.num_paths);
        assert_eq!(unfit.path_lengths, 2);
        assert!(!unfit.num_points);
    }

    #[test]
    fn test_format_g12() {
        assert_eq!(format_g12(10.0), "10.0");
        assert_eq!(format_g12(0.1 + 0.2), "0.3");
        assert_eq!(format_g12(2.5), "2.5");
        assert_eq!(format_g12(1e20), "1e+20");
        assert_eq!(format_g12(123_456_789_012_345.0), "1.23456789012e+14");
        assert_eq!(format_g12(0.0001), "0.0001");
        assert_eq!(format_g12(0.00001), "1e-05");
        assert_eq!(format_g12(1.0 / 3.0), "0.333333333333");
    }

    #[test]
    fn test_diagnostics_canvas_size() {
        let paths = vec![path(&[(0., 0.), (0.1 + 0.2, 1.0 / 3.0)])];
        let table = emit(&paths, &config(DataType::U16, 100)).unwrap();
        assert!(table
            .diagnostics()
            .to_string()
            .contains("Canvas size: 0.3 0.333333333333\n"));
    }

    #[cfg(feature = "serde")]
    #[test]
    fn test_serde() {
        let table = emit(&two_paths(), &config(DataType::U16, 100)).unwrap();
        let json = serde_json::to_string(&table).unwrap();
        let table2: EmittedTable = serde_json::from_str(&json).unwrap();
        assert_eq!(table, table2);
    }
}
