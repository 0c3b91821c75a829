//! FITS access for HESPE products
//!
//! Decoding and encoding go through fitsio-pure. HESPE maps arrive as a
//! binary table whose first cell holds the image and light curves as a stack
//! of image/table HDUs; this module exposes those as [`Image`] and [`Table`]
//! values with cells widened to `f64`. Size keywords of downloaded files are
//! checked before the bytes reach the decoder.

use std::path::Path;

use fitsio::bintable::{
    binary_type_byte_size, parse_tform_binary, read_binary_column, read_binary_row,
    BinaryColumnData, BinaryColumnDescriptor, BinaryColumnType,
};
use fitsio::hdu::{parse_fits, FitsData, Hdu, HduInfo};
use fitsio::header::{header_byte_len, parse_header_blocks, serialize_header};
use fitsio::image::{read_image_physical, serialize_image_f64};
use fitsio::primary::build_primary_header;
use fitsio::BLOCK_SIZE;
use ndarray::{Array1, Array2};
use thiserror::Error;

pub use fitsio::header::Card;
pub use fitsio::value::Value;

/// Largest NAXIS the FITS standard allows
const MAX_AXES: usize = 999;
/// Largest TFIELDS the FITS standard allows
const MAX_FIELDS: usize = 999;

/// Errors from FITS decoding and encoding
#[derive(Debug, Error)]
pub enum FitsError {
    #[error("FITS decoding failed: {0}")]
    Decode(#[from] fitsio::Error),

    #[error("Header value out of range: {0}")]
    OutOfRange(String),

    #[error("Missing required keyword {0}")]
    MissingKeyword(String),

    #[error("No column named {0}")]
    MissingColumn(String),

    #[error("Invalid table: {0}")]
    InvalidTable(String),

    #[error("Invalid image: {0}")]
    InvalidImage(String),

    #[error("No HDU at index {0}")]
    MissingHdu(usize),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Keywords describing data layout. They are regenerated on write and
/// never carried between files.
pub fn is_structural(keyword: &str) -> bool {
    const FIXED: &[&str] = &[
        "SIMPLE", "XTENSION", "BITPIX", "NAXIS", "EXTEND", "PCOUNT", "GCOUNT", "BSCALE", "BZERO",
        "TFIELDS", "END",
    ];
    const INDEXED: &[&str] = &["NAXIS", "TTYPE", "TFORM", "TDIM", "TUNIT"];

    let keyword = keyword.to_ascii_uppercase();
    FIXED.contains(&keyword.as_str())
        || INDEXED.iter().any(|prefix| {
            keyword
                .strip_prefix(prefix)
                .is_some_and(|n| !n.is_empty() && n.chars().all(|c| c.is_ascii_digit()))
        })
}

fn keyword_bytes(keyword: &str) -> [u8; 8] {
    let mut bytes = [b' '; 8];
    for (slot, b) in bytes.iter_mut().zip(keyword.to_ascii_uppercase().bytes()) {
        *slot = b;
    }
    bytes
}

/// Ordered header cards with case-insensitive lookup
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Header {
    cards: Vec<Card>,
}

impl Header {
    pub fn new() -> Self {
        Self::default()
    }

    /// Header from decoded cards, END dropped
    pub fn from_cards(cards: &[Card]) -> Self {
        Self {
            cards: cards.iter().filter(|c| !c.is_end()).cloned().collect(),
        }
    }

    pub fn cards(&self) -> &[Card] {
        &self.cards
    }

    pub fn len(&self) -> usize {
        self.cards.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cards.is_empty()
    }

    /// Value of the first card with this keyword
    pub fn get(&self, keyword: &str) -> Option<&Value> {
        self.cards
            .iter()
            .find(|c| c.keyword_str().eq_ignore_ascii_case(keyword))
            .and_then(|c| c.value.as_ref())
    }

    /// Float or integer value as f64
    pub fn get_f64(&self, keyword: &str) -> Option<f64> {
        match self.get(keyword)? {
            Value::Float(v) => Some(*v),
            Value::Integer(v) => Some(*v as f64),
            _ => None,
        }
    }

    pub fn get_i64(&self, keyword: &str) -> Option<i64> {
        match self.get(keyword)? {
            Value::Integer(v) => Some(*v),
            _ => None,
        }
    }

    /// String value without FITS trailing blanks
    pub fn get_str(&self, keyword: &str) -> Option<&str> {
        match self.get(keyword)? {
            Value::String(s) => Some(s.trim_end()),
            _ => None,
        }
    }

    pub fn contains(&self, keyword: &str) -> bool {
        self.get(keyword).is_some()
    }

    /// Replace the value of an existing keyword or append a new card.
    ///
    /// Keywords are upper-cased and cut to the 8 characters FITS allows.
    pub fn set(&mut self, keyword: &str, value: Value) {
        let key = keyword_bytes(keyword);
        match self.cards.iter_mut().find(|c| c.keyword == key) {
            Some(card) => card.value = Some(value),
            None => self.cards.push(Card {
                keyword: key,
                value: Some(value),
                comment: None,
            }),
        }
    }

    pub fn with(mut self, keyword: &str, value: Value) -> Self {
        self.set(keyword, value);
        self
    }

    pub fn retain<F>(&mut self, predicate: F)
    where
        F: FnMut(&Card) -> bool,
    {
        self.cards.retain(predicate);
    }
}

/// Walk the HDU headers and reject size keywords the decoder cannot hold.
///
/// fitsio-pure sizes buffers straight from NAXIS and PCOUNT, so negative,
/// oversized or overflowing values have to be caught first.
fn check_layout(bytes: &[u8]) -> Result<(), FitsError> {
    let mut offset = 0usize;
    while bytes.len() - offset >= BLOCK_SIZE {
        let remaining = &bytes[offset..];
        let header_len = header_byte_len(remaining)?;
        let cards = parse_header_blocks(&remaining[..header_len])?;
        let header = Header::from_cards(&cards);

        let data_len = data_byte_len(&header)?;
        let padded = data_len
            .div_ceil(BLOCK_SIZE)
            .checked_mul(BLOCK_SIZE)
            .ok_or_else(|| FitsError::OutOfRange(format!("{data_len} data bytes")))?;
        offset = offset
            .checked_add(header_len)
            .and_then(|o| o.checked_add(padded))
            .filter(|end| *end <= bytes.len())
            .ok_or(fitsio::Error::UnexpectedEof)?;
    }
    Ok(())
}

fn count(header: &Header, keyword: &str) -> Result<Option<usize>, FitsError> {
    header
        .get_i64(keyword)
        .map(|v| {
            usize::try_from(v).map_err(|_| FitsError::OutOfRange(format!("{keyword} = {v}")))
        })
        .transpose()
}

/// Data size declared by a header. Missing keywords count as zero here;
/// the decoder reports them.
fn data_byte_len(header: &Header) -> Result<usize, FitsError> {
    let naxis = count(header, "NAXIS")?.unwrap_or(0);
    if naxis > MAX_AXES {
        return Err(FitsError::OutOfRange(format!("NAXIS = {naxis}")));
    }
    if naxis == 0 {
        return Ok(0);
    }
    let overflow = || FitsError::OutOfRange("data size overflows".to_string());

    let mut values = 1usize;
    for axis in 1..=naxis {
        let n = count(header, &format!("NAXIS{axis}"))?.unwrap_or(0);
        values = values.checked_mul(n).ok_or_else(overflow)?;
    }
    let width = header.get_i64("BITPIX").unwrap_or(8).unsigned_abs() as usize / 8;
    let pcount = count(header, "PCOUNT")?.unwrap_or(0);
    let gcount = count(header, "GCOUNT")?.unwrap_or(1).max(1);
    values
        .checked_mul(width)
        .and_then(|v| v.checked_add(pcount))
        .and_then(|v| v.checked_mul(gcount))
        .ok_or_else(overflow)
}

/// Pixel data of an image HDU, widened to f64 with BSCALE/BZERO applied
#[derive(Debug, Clone, PartialEq)]
pub struct Image {
    /// NAXISn values, fastest varying axis first
    axes: Vec<usize>,
    values: Vec<f64>,
}

impl Image {
    pub fn new(axes: Vec<usize>, values: Vec<f64>) -> Result<Self, FitsError> {
        let expected = axes.iter().try_fold(1usize, |acc, n| acc.checked_mul(*n));
        if axes.is_empty() || expected != Some(values.len()) {
            return Err(FitsError::InvalidImage(format!(
                "axes {axes:?} do not hold {} values",
                values.len()
            )));
        }
        Ok(Self { axes, values })
    }

    /// Image from a row-major array; rows become NAXIS2, columns NAXIS1
    pub fn from_array2(array: &Array2<f64>) -> Self {
        let (rows, cols) = array.dim();
        Self {
            axes: vec![cols, rows],
            values: array.iter().copied().collect(),
        }
    }

    pub fn axes(&self) -> &[usize] {
        &self.axes
    }

    pub fn values(&self) -> &[f64] {
        &self.values
    }

    pub fn to_array1(&self) -> Array1<f64> {
        Array1::from(self.values.clone())
    }

    /// Two-dimensional view with shape (NAXIS2, NAXIS1)
    pub fn to_array2(&self) -> Result<Array2<f64>, FitsError> {
        match self.axes.as_slice() {
            [nx, ny] => Array2::from_shape_vec((*ny, *nx), self.values.clone())
                .map_err(|e| FitsError::InvalidImage(e.to_string())),
            other => Err(FitsError::InvalidImage(format!(
                "expected 2 axes, found {}",
                other.len()
            ))),
        }
    }

    /// Single-HDU file holding this image as BITPIX -64.
    ///
    /// Descriptive cards of `header` follow the generated structural ones.
    pub fn to_primary_bytes(&self, header: &Header) -> Result<Vec<u8>, FitsError> {
        let mut cards = build_primary_header(-64, &self.axes)?;
        cards.extend(
            header
                .cards()
                .iter()
                .filter(|c| !is_structural(c.keyword_str()))
                .cloned(),
        );
        let mut bytes = serialize_header(&cards);
        bytes.extend(serialize_image_f64(&self.values));
        Ok(bytes)
    }
}

/// What an HDU carries
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HduKind {
    Empty,
    Image,
    Table,
}

fn numbers(data: BinaryColumnData) -> Result<Vec<f64>, FitsError> {
    Ok(match data {
        BinaryColumnData::Byte(v) => v.into_iter().map(f64::from).collect(),
        BinaryColumnData::Short(v) => v.into_iter().map(f64::from).collect(),
        BinaryColumnData::Int(v) => v.into_iter().map(f64::from).collect(),
        BinaryColumnData::Long(v) => v.into_iter().map(|x| x as f64).collect(),
        BinaryColumnData::Float(v) => v.into_iter().map(f64::from).collect(),
        BinaryColumnData::Double(v) => v,
        _ => return Err(FitsError::InvalidTable("column is not numeric".to_string())),
    })
}

fn parse_tdim(value: &str) -> Result<Vec<usize>, FitsError> {
    value
        .trim()
        .trim_start_matches('(')
        .trim_end_matches(')')
        .split(',')
        .map(|axis| {
            axis.trim()
                .parse::<usize>()
                .map_err(|_| FitsError::InvalidTable(format!("bad TDIM '{value}'")))
        })
        .collect()
}

/// Binary table HDU whose column layout has been checked against NAXIS1
/// and the data size.
pub struct Table<'a> {
    bytes: &'a [u8],
    hdu: &'a Hdu,
    header: Header,
    columns: Vec<BinaryColumnDescriptor>,
    rows: usize,
}

impl<'a> Table<'a> {
    fn new(bytes: &'a [u8], hdu: &'a Hdu) -> Result<Self, FitsError> {
        let HduInfo::BinaryTable {
            naxis1,
            naxis2,
            tfields,
            ..
        } = hdu.info
        else {
            return Err(FitsError::InvalidTable("HDU is not a binary table".to_string()));
        };
        if tfields > MAX_FIELDS {
            return Err(FitsError::OutOfRange(format!("TFIELDS = {tfields}")));
        }
        if naxis1 == 0 && naxis2 > 0 {
            return Err(FitsError::InvalidTable(format!(
                "{naxis2} rows of zero width"
            )));
        }
        let table_len = naxis1
            .checked_mul(naxis2)
            .filter(|len| *len <= hdu.data_len)
            .ok_or_else(|| {
                FitsError::OutOfRange(format!("{naxis2} rows of {naxis1} bytes"))
            })?;

        let header = Header::from_cards(&hdu.cards);
        let mut columns = Vec::new();
        let mut row_width = 0usize;
        for n in 1..=tfields {
            let tform = header
                .get_str(&format!("TFORM{n}"))
                .ok_or_else(|| FitsError::MissingKeyword(format!("TFORM{n}")))?;
            if !tform.is_ascii() {
                return Err(FitsError::InvalidTable(format!("TFORM{n} is not ASCII")));
            }
            let (repeat, col_type) = parse_tform_binary(tform)?;
            let byte_width = match col_type {
                BinaryColumnType::Bit => Some(repeat.div_ceil(8)),
                _ => repeat.checked_mul(binary_type_byte_size(&col_type)),
            }
            .ok_or_else(|| FitsError::OutOfRange(format!("TFORM{n} = {tform}")))?;
            row_width = row_width
                .checked_add(byte_width)
                .ok_or_else(|| FitsError::OutOfRange("row width overflows".to_string()))?;
            columns.push(BinaryColumnDescriptor {
                name: header.get_str(&format!("TTYPE{n}")).map(str::to_string),
                repeat,
                col_type,
                byte_width,
            });
        }
        if row_width != naxis1 {
            return Err(FitsError::InvalidTable(format!(
                "columns span {row_width} bytes but NAXIS1 is {naxis1}"
            )));
        }
        if hdu.data_start.saturating_add(table_len) > bytes.len() {
            return Err(fitsio::Error::UnexpectedEof.into());
        }

        Ok(Self {
            bytes,
            hdu,
            header,
            columns,
            rows: naxis2,
        })
    }

    pub fn header(&self) -> &Header {
        &self.header
    }

    pub fn num_rows(&self) -> usize {
        self.rows
    }

    pub fn num_columns(&self) -> usize {
        self.columns.len()
    }

    /// Position of a column by TTYPE, case-insensitive
    pub fn column_index(&self, name: &str) -> Option<usize> {
        self.columns.iter().position(|c| {
            c.name
                .as_deref()
                .is_some_and(|n| n.trim().eq_ignore_ascii_case(name))
        })
    }

    fn index_of(&self, name: &str) -> Result<usize, FitsError> {
        self.column_index(name)
            .ok_or_else(|| FitsError::MissingColumn(name.to_string()))
    }

    /// All values of a numeric column, rows concatenated
    pub fn column_f64(&self, name: &str) -> Result<Vec<f64>, FitsError> {
        self.column_f64_at(self.index_of(name)?)
    }

    pub fn column_f64_at(&self, index: usize) -> Result<Vec<f64>, FitsError> {
        if index >= self.columns.len() {
            return Err(FitsError::MissingColumn(format!("#{}", index + 1)));
        }
        numbers(read_binary_column(self.bytes, self.hdu, index)?)
    }

    pub fn column_text(&self, name: &str) -> Result<Vec<String>, FitsError> {
        match read_binary_column(self.bytes, self.hdu, self.index_of(name)?)? {
            BinaryColumnData::Ascii(values) => Ok(values),
            _ => Err(FitsError::InvalidTable(format!("column {name} is not text"))),
        }
    }

    /// Cell shape from TDIMn, fastest varying axis first
    pub fn column_dims(&self, index: usize) -> Result<Option<Vec<usize>>, FitsError> {
        self.header
            .get_str(&format!("TDIM{}", index + 1))
            .map(parse_tdim)
            .transpose()
    }

    /// Two-dimensional cell as an array of shape (TDIM2, TDIM1)
    pub fn cell_array2(&self, row: usize, column: &str) -> Result<Array2<f64>, FitsError> {
        let index = self.index_of(column)?;
        if row >= self.rows {
            return Err(FitsError::InvalidTable(format!(
                "row {row} of a {}-row table",
                self.rows
            )));
        }
        let (nx, ny) = match self.column_dims(index)?.as_deref() {
            Some([nx, ny]) => (*nx, *ny),
            other => {
                return Err(FitsError::InvalidTable(format!(
                    "column {column} has dims {other:?}, expected two"
                )))
            }
        };
        let cell = read_binary_row(self.bytes, self.hdu, row)?
            .into_iter()
            .nth(index)
            .ok_or_else(|| FitsError::MissingColumn(column.to_string()))?;
        Array2::from_shape_vec((ny, nx), numbers(cell)?)
            .map_err(|e| FitsError::InvalidTable(format!("column {column}: {e}")))
    }
}

/// A decoded FITS file
pub struct FitsFile {
    bytes: Vec<u8>,
    data: FitsData,
}

impl FitsFile {
    pub fn from_bytes(bytes: Vec<u8>) -> Result<Self, FitsError> {
        check_layout(&bytes)?;
        let data = parse_fits(&bytes)?;
        Ok(Self { bytes, data })
    }

    pub fn open(path: &Path) -> Result<Self, FitsError> {
        Self::from_bytes(std::fs::read(path)?)
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.bytes
    }

    pub fn len(&self) -> usize {
        self.data.len()
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    fn hdu(&self, index: usize) -> Result<&Hdu, FitsError> {
        self.data.get(index).ok_or(FitsError::MissingHdu(index))
    }

    pub fn kind(&self, index: usize) -> Result<HduKind, FitsError> {
        match &self.hdu(index)?.info {
            HduInfo::Primary { naxes, .. } | HduInfo::Image { naxes, .. } if naxes.is_empty() => {
                Ok(HduKind::Empty)
            }
            HduInfo::Primary { .. } | HduInfo::Image { .. } => Ok(HduKind::Image),
            HduInfo::BinaryTable { .. } => Ok(HduKind::Table),
            HduInfo::AsciiTable { .. } => Err(FitsError::InvalidTable(format!(
                "HDU {index} is an ASCII table"
            ))),
        }
    }

    pub fn header(&self, index: usize) -> Result<Header, FitsError> {
        Ok(Header::from_cards(&self.hdu(index)?.cards))
    }

    pub fn image(&self, index: usize) -> Result<Image, FitsError> {
        let hdu = self.hdu(index)?;
        let axes = match &hdu.info {
            HduInfo::Primary { naxes, .. } | HduInfo::Image { naxes, .. } => naxes.clone(),
            _ => return Err(FitsError::InvalidImage(format!("HDU {index} is a table"))),
        };
        if axes.is_empty() {
            return Err(FitsError::InvalidImage(format!("HDU {index} has no data")));
        }
        Image::new(axes, read_image_physical(&self.bytes, hdu)?)
    }

    pub fn table(&self, index: usize) -> Result<Table<'_>, FitsError> {
        Table::new(&self.bytes, self.hdu(index)?)
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use fitsio::bintable::{build_binary_table_cards, serialize_binary_table};
    use ndarray::array;

    /// Table file builder: an empty primary HDU plus one binary table
    #[derive(Default)]
    pub(crate) struct TableFile {
        columns: Vec<BinaryColumnDescriptor>,
        data: Vec<BinaryColumnData>,
        dims: Vec<(usize, String)>,
        extra: Vec<(&'static str, Value)>,
        rows: usize,
    }

    impl TableFile {
        pub(crate) fn new(rows: usize) -> Self {
            Self {
                rows,
                ..Self::default()
            }
        }

        fn column(
            mut self,
            name: &str,
            col_type: BinaryColumnType,
            data: BinaryColumnData,
            len: usize,
        ) -> Self {
            // text cells are `len` characters wide, numeric cells split `len` values over the rows
            let repeat = match col_type {
                BinaryColumnType::Ascii => len,
                _ => len / self.rows.max(1),
            };
            let byte_width = repeat * binary_type_byte_size(&col_type);
            self.columns.push(BinaryColumnDescriptor {
                name: Some(name.to_string()),
                repeat,
                col_type,
                byte_width,
            });
            self.data.push(data);
            self
        }

        pub(crate) fn float32(self, name: &str, values: &[f64]) -> Self {
            let data = BinaryColumnData::Float(values.iter().map(|v| *v as f32).collect());
            self.column(name, BinaryColumnType::Float, data, values.len())
        }

        pub(crate) fn float64(self, name: &str, values: &[f64]) -> Self {
            let data = BinaryColumnData::Double(values.to_vec());
            self.column(name, BinaryColumnType::Double, data, values.len())
        }

        pub(crate) fn text(self, name: &str, width: usize, values: &[&str]) -> Self {
            let data = BinaryColumnData::Ascii(values.iter().map(|s| s.to_string()).collect());
            self.column(name, BinaryColumnType::Ascii, data, width)
        }

        /// TDIM for the most recently added column
        pub(crate) fn dims(mut self, nx: usize, ny: usize) -> Self {
            self.dims.push((self.columns.len(), format!("({nx},{ny})")));
            self
        }

        pub(crate) fn card(mut self, keyword: &'static str, value: Value) -> Self {
            self.extra.push((keyword, value));
            self
        }

        /// Binary table HDU bytes without a primary HDU
        pub(crate) fn hdu_bytes(&self) -> Vec<u8> {
            let mut header = Header::from_cards(
                &build_binary_table_cards(&self.columns, self.rows, 0).unwrap(),
            );
            for (n, tdim) in &self.dims {
                header.set(&format!("TDIM{n}"), Value::String(tdim.clone()));
            }
            for (keyword, value) in &self.extra {
                header.set(keyword, value.clone());
            }
            let mut bytes = serialize_header(header.cards());
            bytes.extend(serialize_binary_table(&self.columns, &self.data, self.rows).unwrap());
            bytes
        }

        pub(crate) fn to_bytes(&self) -> Vec<u8> {
            let mut bytes = empty_primary();
            bytes.extend(self.hdu_bytes());
            bytes
        }

        pub(crate) fn build(&self) -> FitsFile {
            FitsFile::from_bytes(self.to_bytes()).unwrap()
        }
    }

    pub(crate) fn empty_primary() -> Vec<u8> {
        serialize_header(&build_primary_header(8, &[]).unwrap())
    }

    /// Image extension HDU bytes, BITPIX -64
    pub(crate) fn image_extension(image: &Image) -> Vec<u8> {
        let mut header = Header::new()
            .with("XTENSION", Value::String("IMAGE".to_string()))
            .with("BITPIX", Value::Integer(-64))
            .with("NAXIS", Value::Integer(image.axes().len() as i64));
        for (i, n) in image.axes().iter().enumerate() {
            header.set(&format!("NAXIS{}", i + 1), Value::Integer(*n as i64));
        }
        header.set("PCOUNT", Value::Integer(0));
        header.set("GCOUNT", Value::Integer(1));
        let mut bytes = serialize_header(header.cards());
        bytes.extend(serialize_image_f64(image.values()));
        bytes
    }

    fn header_only(cards: &[(&str, Value)]) -> Vec<u8> {
        let header = cards
            .iter()
            .fold(Header::new(), |h, (k, v)| h.with(k, v.clone()));
        serialize_header(header.cards())
    }

    fn image_table() -> TableFile {
        TableFile::new(1)
            .float32("IMAGE", &[0.0, 1.0, 2.0, 3.0, 4.0, 5.0])
            .dims(3, 2)
            .float32("XC", &[-850.0])
            .text("XUNITS", 6, &["arcsec"])
            .card("ORIGIN", Value::String("HESPE".to_string()))
    }

    #[test]
    fn test_header_lookup_is_case_insensitive() {
        let header = Header::new()
            .with("crval1", Value::Float(2.5))
            .with("NAXIS1", Value::Integer(64))
            .with("CTYPE1", Value::String("arcsec  ".to_string()));
        assert_eq!(header.get_f64("CRVAL1"), Some(2.5));
        assert_eq!(header.get_f64("naxis1"), Some(64.0));
        assert_eq!(header.get_i64("NAXIS1"), Some(64));
        assert_eq!(header.get_str("ctype1"), Some("arcsec"));
        assert_eq!(header.cards()[0].keyword_str(), "CRVAL1");
        assert!(!header.contains("CRVAL2"));
    }

    #[test]
    fn test_set_replaces_value() {
        let mut header = Header::new().with("ENERGY_L", Value::Float(6.0));
        header.set("energy_l", Value::Float(12.0));
        assert_eq!(header.len(), 1);
        assert_eq!(header.get_f64("ENERGY_L"), Some(12.0));
    }

    #[test]
    fn test_structural_keywords() {
        assert!(is_structural("NAXIS2"));
        assert!(is_structural("tform12"));
        assert!(is_structural("BITPIX"));
        assert!(!is_structural("NAXISX"));
        assert!(!is_structural("ORIGIN"));
        assert!(!is_structural("TDIMENS"));
    }

    #[test]
    fn test_read_image_table() {
        let file = image_table().build();
        assert_eq!(file.len(), 2);
        assert_eq!(file.kind(0).unwrap(), HduKind::Empty);
        assert_eq!(file.kind(1).unwrap(), HduKind::Table);

        let table = file.table(1).unwrap();
        assert_eq!(table.num_rows(), 1);
        assert_eq!(table.num_columns(), 3);
        assert_eq!(table.header().get_str("ORIGIN"), Some("HESPE"));
        assert_eq!(table.column_f64("xc").unwrap(), vec![-850.0]);
        assert_eq!(table.column_text("XUNITS").unwrap(), vec!["arcsec"]);
        assert_eq!(table.column_dims(0).unwrap(), Some(vec![3, 2]));
        assert_eq!(
            table.cell_array2(0, "IMAGE").unwrap(),
            array![[0.0, 1.0, 2.0], [3.0, 4.0, 5.0]]
        );
    }

    #[test]
    fn test_missing_column() {
        let file = image_table().build();
        let table = file.table(1).unwrap();
        assert!(matches!(
            table.column_f64("ROLL_ANGLE"),
            Err(FitsError::MissingColumn(_))
        ));
        assert!(matches!(
            table.cell_array2(1, "IMAGE"),
            Err(FitsError::InvalidTable(_))
        ));
        assert!(matches!(
            table.column_text("XC"),
            Err(FitsError::InvalidTable(_))
        ));
    }

    #[test]
    fn test_primary_image_bytes() {
        let image = Image::from_array2(&array![[1.5, -2.0], [3.0, 4.25], [0.0, 7.0]]);
        let header = Header::new()
            .with("CRPIX1", Value::Float(1.5))
            .with("NAXIS1", Value::Integer(99))
            .with("DATE-OBS", Value::String("2002-07-23T00:30:00.000".to_string()));
        let file = FitsFile::from_bytes(image.to_primary_bytes(&header).unwrap()).unwrap();

        assert_eq!(file.len(), 1);
        assert_eq!(file.as_bytes().len() % BLOCK_SIZE, 0);
        let read = file.image(0).unwrap();
        assert_eq!(read.axes(), &[2, 3]);
        assert_eq!(read, image);

        let header = file.header(0).unwrap();
        assert_eq!(header.get_i64("NAXIS1"), Some(2));
        assert_eq!(header.get_f64("CRPIX1"), Some(1.5));
        assert_eq!(header.get_str("DATE-OBS"), Some("2002-07-23T00:30:00.000"));
    }

    #[test]
    fn test_image_extension() {
        let counts = Image::new(vec![4], vec![1.0, 2.0, 3.0, 4.0]).unwrap();
        let mut bytes = empty_primary();
        bytes.extend(image_extension(&counts));
        let file = FitsFile::from_bytes(bytes).unwrap();
        assert_eq!(file.kind(1).unwrap(), HduKind::Image);
        assert_eq!(file.image(1).unwrap().to_array1().to_vec(), vec![1.0, 2.0, 3.0, 4.0]);
        assert!(matches!(file.image(0), Err(FitsError::InvalidImage(_))));
        assert!(matches!(file.image(2), Err(FitsError::MissingHdu(2))));
        assert!(file.table(1).is_err());
    }

    #[test]
    fn test_image_axes_must_match_values() {
        assert!(Image::new(vec![2, 2], vec![1.0; 3]).is_err());
        assert!(Image::new(vec![], vec![]).is_err());
        assert!(Image::new(vec![usize::MAX, 2], vec![]).is_err());
        let one_axis = Image::new(vec![3], vec![1.0; 3]).unwrap();
        assert!(matches!(one_axis.to_array2(), Err(FitsError::InvalidImage(_))));
    }

    #[test]
    fn test_overflowing_image_size_rejected() {
        let bytes = header_only(&[
            ("SIMPLE", Value::Logical(true)),
            ("BITPIX", Value::Integer(8)),
            ("NAXIS", Value::Integer(2)),
            ("NAXIS1", Value::Integer(4_000_000_000_000_000_000)),
            ("NAXIS2", Value::Integer(4_000_000_000_000_000_000)),
        ]);
        assert!(matches!(
            FitsFile::from_bytes(bytes),
            Err(FitsError::OutOfRange(_))
        ));
    }

    #[test]
    fn test_axis_count_out_of_range() {
        for naxis in [1_000_000_000_000_000_000, -3] {
            let bytes = header_only(&[
                ("SIMPLE", Value::Logical(true)),
                ("BITPIX", Value::Integer(8)),
                ("NAXIS", Value::Integer(naxis)),
            ]);
            assert!(matches!(
                FitsFile::from_bytes(bytes),
                Err(FitsError::OutOfRange(_))
            ));
        }
    }

    #[test]
    fn test_zero_width_rows_rejected() {
        let mut bytes = empty_primary();
        bytes.extend(header_only(&[
            ("XTENSION", Value::String("BINTABLE".to_string())),
            ("BITPIX", Value::Integer(8)),
            ("NAXIS", Value::Integer(2)),
            ("NAXIS1", Value::Integer(0)),
            ("NAXIS2", Value::Integer(1_000_000_000_000_000_000)),
            ("PCOUNT", Value::Integer(0)),
            ("GCOUNT", Value::Integer(1)),
            ("TFIELDS", Value::Integer(0)),
        ]));
        let file = FitsFile::from_bytes(bytes).unwrap();
        assert!(matches!(file.table(1), Err(FitsError::InvalidTable(_))));
    }

    #[test]
    fn test_column_width_must_match_row() {
        let mut bytes = empty_primary();
        bytes.extend(header_only(&[
            ("XTENSION", Value::String("BINTABLE".to_string())),
            ("BITPIX", Value::Integer(8)),
            ("NAXIS", Value::Integer(2)),
            ("NAXIS1", Value::Integer(4)),
            ("NAXIS2", Value::Integer(1)),
            ("PCOUNT", Value::Integer(0)),
            ("GCOUNT", Value::Integer(1)),
            ("TFIELDS", Value::Integer(1)),
            ("TFORM1", Value::String("4611686018427387904D".to_string())),
        ]));
        bytes.extend(vec![0u8; BLOCK_SIZE]);
        let file = FitsFile::from_bytes(bytes).unwrap();
        assert!(matches!(file.table(1), Err(FitsError::OutOfRange(_))));
    }

    #[test]
    fn test_non_ascii_tform_rejected() {
        let mut bytes = empty_primary();
        bytes.extend(header_only(&[
            ("XTENSION", Value::String("BINTABLE".to_string())),
            ("BITPIX", Value::Integer(8)),
            ("NAXIS", Value::Integer(2)),
            ("NAXIS1", Value::Integer(1)),
            ("NAXIS2", Value::Integer(1)),
            ("PCOUNT", Value::Integer(0)),
            ("GCOUNT", Value::Integer(1)),
            ("TFIELDS", Value::Integer(1)),
            ("TFORM1", Value::String("1\u{e9}".to_string())),
        ]));
        bytes.extend(vec![0u8; BLOCK_SIZE]);
        let file = FitsFile::from_bytes(bytes).unwrap();
        assert!(matches!(file.table(1), Err(FitsError::InvalidTable(_))));
    }

    #[test]
    fn test_truncated_data_rejected() {
        let mut bytes = image_table().to_bytes();
        bytes.truncate(bytes.len() - BLOCK_SIZE);
        assert!(FitsFile::from_bytes(bytes).is_err());
        assert!(FitsFile::from_bytes(vec![b' '; 100]).is_err());
    }
}
