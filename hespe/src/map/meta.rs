//! Map metadata derived from HESPE image tables
//!
//! HESPE image files lack the coordinate keywords a map needs. They are
//! derived from the per-frame columns of the table (first row), the energy
//! band from the flare record and the timestamp in the filename.

use chrono::{DateTime, Utc};

use super::EnergyBand;
use crate::error::{HespeError, Result};
use crate::fits::{is_structural, FitsError, Header, Table, Value};
use crate::time::{format_date_obs, parse_date_obs};

/// Value of TELESCOP and INSTRUME for every HESPE map
pub const RHESSI: &str = "RHESSI";

/// Keywords owned by [`MapMeta`], in the order they are written
const ENRICHED_KEYWORDS: &[&str] = &[
    "ENERGY_L", "ENERGY_H", "TELESCOP", "INSTRUME", "CRVAL1", "CRVAL2", "NAXIS1", "NAXIS2",
    "CRPIX1", "CRPIX2", "CDELT1", "CDELT2", "DATE-OBS", "CTYPE1", "CTYPE2", "CROTA1", "CROTA2",
];

/// Immutable metadata of a RHESSI map.
///
/// `raw` keeps the descriptive cards of the source file that are not
/// replaced by the derived fields.
#[derive(Debug, Clone, PartialEq)]
pub struct MapMeta {
    pub energy: EnergyBand,
    pub telescope: String,
    pub instrument: String,
    /// Reference coordinate (map center) in CTYPE units
    pub crval1: f64,
    pub crval2: f64,
    pub naxis1: usize,
    pub naxis2: usize,
    /// Reference pixel, 1-based
    pub crpix1: f64,
    pub crpix2: f64,
    /// Pixel scale
    pub cdelt1: f64,
    pub cdelt2: f64,
    pub date_obs: DateTime<Utc>,
    pub ctype1: String,
    pub ctype2: String,
    /// Roll angle
    pub crota1: f64,
    pub crota2: f64,
    pub raw: Header,
}

fn first_value(table: &Table, column: &str) -> Result<f64> {
    match table.column_f64(column) {
        Ok(values) => values
            .first()
            .copied()
            .ok_or_else(|| HespeError::Shape("map table has no rows".to_string())),
        Err(FitsError::MissingColumn(name)) => Err(HespeError::MissingColumn(name)),
        Err(e) => Err(e.into()),
    }
}

fn first_text(table: &Table, column: &str) -> Result<String> {
    match table.column_text(column) {
        Ok(values) => values
            .into_iter()
            .next()
            .ok_or_else(|| HespeError::Shape("map table has no rows".to_string())),
        Err(FitsError::MissingColumn(name)) => Err(HespeError::MissingColumn(name)),
        Err(e) => Err(e.into()),
    }
}

fn descriptive_cards(header: &Header) -> Header {
    let mut raw = header.clone();
    raw.retain(|card| {
        let keyword = card.keyword_str();
        !card.is_blank() && !is_structural(keyword) && !ENRICHED_KEYWORDS.contains(&keyword)
    });
    raw
}

impl MapMeta {
    /// Derive map metadata from a HESPE image table.
    ///
    /// `shape` is the (rows, columns) shape of the image cell. The reference
    /// pixel is the image center; coordinates, scale, units and roll come
    /// from the first row of XC/YC, DX/DY, XUNITS/YUNITS and ROLL_ANGLE.
    /// Descriptive cards of the table header are carried over.
    pub fn derive(
        table: &Table,
        shape: (usize, usize),
        energy: EnergyBand,
        date_obs: DateTime<Utc>,
    ) -> Result<Self> {
        let (naxis2, naxis1) = shape;
        let roll = first_value(table, "ROLL_ANGLE")?;
        Ok(Self {
            energy,
            telescope: RHESSI.to_string(),
            instrument: RHESSI.to_string(),
            crval1: first_value(table, "XC")?,
            crval2: first_value(table, "YC")?,
            naxis1,
            naxis2,
            crpix1: (naxis1 as f64 + 1.0) / 2.0,
            crpix2: (naxis2 as f64 + 1.0) / 2.0,
            cdelt1: first_value(table, "DX")?,
            cdelt2: first_value(table, "DY")?,
            date_obs,
            ctype1: first_text(table, "XUNITS")?,
            ctype2: first_text(table, "YUNITS")?,
            crota1: roll,
            crota2: roll,
            raw: descriptive_cards(table.header()),
        })
    }

    /// Full header: carried-over cards followed by the derived keywords
    pub fn to_header(&self) -> Header {
        let mut header = self.raw.clone();
        let text = |s: &str| Value::String(s.to_string());
        header.set("ENERGY_L", Value::Float(self.energy.low));
        header.set("ENERGY_H", Value::Float(self.energy.high));
        header.set("TELESCOP", text(&self.telescope));
        header.set("INSTRUME", text(&self.instrument));
        header.set("CRVAL1", Value::Float(self.crval1));
        header.set("CRVAL2", Value::Float(self.crval2));
        header.set("NAXIS1", Value::Integer(self.naxis1 as i64));
        header.set("NAXIS2", Value::Integer(self.naxis2 as i64));
        header.set("CRPIX1", Value::Float(self.crpix1));
        header.set("CRPIX2", Value::Float(self.crpix2));
        header.set("CDELT1", Value::Float(self.cdelt1));
        header.set("CDELT2", Value::Float(self.cdelt2));
        header.set("DATE-OBS", Value::String(format_date_obs(self.date_obs)));
        header.set("CTYPE1", text(&self.ctype1));
        header.set("CTYPE2", text(&self.ctype2));
        header.set("CROTA1", Value::Float(self.crota1));
        header.set("CROTA2", Value::Float(self.crota2));
        header
    }

    /// Rebuild metadata from an enriched header, e.g. a cached map file.
    ///
    /// NAXIS1/NAXIS2 come from `shape` since FITS readers consume them as
    /// structural keywords.
    pub fn from_header(header: &Header, shape: (usize, usize)) -> Result<Self> {
        let float = |key: &str| {
            header
                .get_f64(key)
                .ok_or_else(|| FitsError::MissingKeyword(key.to_string()))
        };
        let text = |key: &str| {
            header
                .get_str(key)
                .map(str::to_string)
                .ok_or_else(|| FitsError::MissingKeyword(key.to_string()))
        };
        let (naxis2, naxis1) = shape;
        Ok(Self {
            energy: EnergyBand::new(float("ENERGY_L")?, float("ENERGY_H")?),
            telescope: text("TELESCOP")?,
            instrument: text("INSTRUME")?,
            crval1: float("CRVAL1")?,
            crval2: float("CRVAL2")?,
            naxis1,
            naxis2,
            crpix1: float("CRPIX1")?,
            crpix2: float("CRPIX2")?,
            cdelt1: float("CDELT1")?,
            cdelt2: float("CDELT2")?,
            date_obs: parse_date_obs(&text("DATE-OBS")?)?,
            ctype1: text("CTYPE1")?,
            ctype2: text("CTYPE2")?,
            crota1: float("CROTA1")?,
            crota2: float("CROTA2")?,
            raw: descriptive_cards(header),
        })
    }
}
