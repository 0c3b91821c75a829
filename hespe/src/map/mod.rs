//! RHESSI maps built from HESPE image products

mod composite;
mod meta;

use std::fmt;
use std::hash::{Hash, Hasher};

use chrono::{DateTime, Utc};
use ndarray::Array2;

pub use composite::{group_maps_by_energy, CompositeLayer, CompositeMap};
pub use meta::{MapMeta, RHESSI};

use crate::error::{HespeError, Result};
use crate::fits::{FitsFile, Header, Image, Table};

/// Energy band of a map in keV.
///
/// Equality and hashing compare the exact float values so bands can key a
/// map; `-0.0` and `0.0` are the same band.
#[derive(Debug, Clone, Copy, Default)]
pub struct EnergyBand {
    pub low: f64,
    pub high: f64,
}

impl EnergyBand {
    pub fn new(low: f64, high: f64) -> Self {
        Self { low, high }
    }

    fn key(&self) -> (u64, u64) {
        // adding 0.0 folds -0.0 into 0.0
        ((self.low + 0.0).to_bits(), (self.high + 0.0).to_bits())
    }
}

impl PartialEq for EnergyBand {
    fn eq(&self, other: &Self) -> bool {
        self.key() == other.key()
    }
}

impl Eq for EnergyBand {}

impl Hash for EnergyBand {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.key().hash(state);
    }
}

impl fmt::Display for EnergyBand {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{} - {} keV", self.low, self.high)
    }
}

/// Named color tables known to map consumers
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Colormap {
    Rhessi,
    Grayscale,
}

impl Colormap {
    pub fn name(&self) -> &'static str {
        match self {
            Colormap::Rhessi => "rhessi",
            Colormap::Grayscale => "gray",
        }
    }

    /// Look up a colormap by its registry name
    pub fn from_name(name: &str) -> Option<Self> {
        match name {
            "rhessi" => Some(Colormap::Rhessi),
            "gray" | "grey" => Some(Colormap::Grayscale),
            _ => None,
        }
    }
}

/// A RHESSI image with its coordinate and instrument metadata.
///
/// Pixel data is indexed `[row, column]`, i.e. `[y, x]`; NAXIS1 is the
/// number of columns.
#[derive(Debug, Clone, PartialEq)]
pub struct RhessiMap {
    data: Array2<f64>,
    meta: MapMeta,
    cmap: Colormap,
}

impl RhessiMap {
    pub fn new(data: Array2<f64>, meta: MapMeta) -> Result<Self> {
        let (rows, cols) = data.dim();
        if (rows, cols) != (meta.naxis2, meta.naxis1) {
            return Err(HespeError::Shape(format!(
                "data is {cols}x{rows} but header says {}x{}",
                meta.naxis1, meta.naxis2
            )));
        }
        Ok(Self {
            data,
            meta,
            cmap: Colormap::Rhessi,
        })
    }

    /// Build a map from a HESPE image table.
    ///
    /// The image is the IMAGE cell of the first row.
    pub fn from_table(
        table: &Table,
        energy: EnergyBand,
        date_obs: DateTime<Utc>,
    ) -> Result<Self> {
        let data = table.cell_array2(0, "IMAGE")?;
        let meta = MapMeta::derive(table, data.dim(), energy, date_obs)?;
        Self::new(data, meta)
    }

    /// Load a map from the enriched single-image form written by [`to_fits`](Self::to_fits)
    pub fn from_fits(file: &FitsFile) -> Result<Self> {
        let data = file.image(0)?.to_array2()?;
        let meta = MapMeta::from_header(&file.header(0)?, data.dim())?;
        Self::new(data, meta)
    }

    /// Enriched single-image FITS file contents
    pub fn to_fits(&self) -> Result<Vec<u8>> {
        Ok(Image::from_array2(&self.data).to_primary_bytes(&self.meta.to_header())?)
    }

    pub fn data(&self) -> &Array2<f64> {
        &self.data
    }

    pub fn meta(&self) -> &MapMeta {
        &self.meta
    }

    /// Complete header including derived keywords
    pub fn header(&self) -> Header {
        self.meta.to_header()
    }

    pub fn cmap(&self) -> Colormap {
        self.cmap
    }

    pub fn energy_band(&self) -> EnergyBand {
        self.meta.energy
    }

    pub fn date(&self) -> DateTime<Utc> {
        self.meta.date_obs
    }

    /// (NAXIS1, NAXIS2)
    pub fn dimensions(&self) -> (usize, usize) {
        (self.meta.naxis1, self.meta.naxis2)
    }

    /// World coordinate of a pixel center, pixel indices 0-based.
    ///
    /// Linear transform around the reference pixel, roll ignored.
    pub fn pixel_to_world(&self, x: f64, y: f64) -> (f64, f64) {
        let m = &self.meta;
        (
            m.crval1 + (x + 1.0 - m.crpix1) * m.cdelt1,
            m.crval2 + (y + 1.0 - m.crpix2) * m.cdelt2,
        )
    }
}
