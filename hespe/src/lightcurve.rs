//! RHESSI summary light curves
//!
//! A HESPE light curve file stores count rates in the primary image (one row
//! per sample, one column per energy band), the sample times in HESPE seconds
//! in HDU 1 and the band edges in HDU 2.

use chrono::{DateTime, Utc};
use ndarray::{Array2, ArrayView1};

use crate::error::{HespeError, Result};
use crate::fits::{FitsFile, HduKind};
use crate::time::hespe_time_to_utc;

/// Column label for an energy band, e.g. `"6 - 12 keV"`
pub fn band_label(low: f64, high: f64) -> String {
    format!("{low} - {high} keV")
}

/// Time-indexed count rates, one column per energy band
#[derive(Debug, Clone, PartialEq)]
pub struct LightCurve {
    times: Vec<DateTime<Utc>>,
    labels: Vec<String>,
    data: Array2<f64>,
}

impl LightCurve {
    /// `data` has one row per time and one column per label
    pub fn new(times: Vec<DateTime<Utc>>, labels: Vec<String>, data: Array2<f64>) -> Result<Self> {
        if data.dim() != (times.len(), labels.len()) {
            return Err(HespeError::Shape(format!(
                "data is {:?} for {} times and {} labels",
                data.dim(),
                times.len(),
                labels.len()
            )));
        }
        Ok(Self {
            times,
            labels,
            data,
        })
    }

    /// Decode a HESPE light curve file
    pub fn from_fits(file: &FitsFile) -> Result<Self> {
        let counts = file.image(0)?;
        let data = match counts.axes() {
            [n] => Array2::from_shape_vec((*n, 1), counts.values().to_vec())
                .map_err(|e| HespeError::Shape(e.to_string()))?,
            _ => counts.to_array2()?,
        };

        let times = first_column(file, 1)?
            .into_iter()
            .map(hespe_time_to_utc)
            .collect::<Result<Vec<_>>>()?;

        let labels = band_edges(file, 2)?
            .into_iter()
            .map(|(low, high)| band_label(low, high))
            .collect();

        Self::new(times, labels, data)
    }

    pub fn times(&self) -> &[DateTime<Utc>] {
        &self.times
    }

    pub fn labels(&self) -> &[String] {
        &self.labels
    }

    pub fn data(&self) -> &Array2<f64> {
        &self.data
    }

    /// Number of samples
    pub fn len(&self) -> usize {
        self.times.len()
    }

    pub fn is_empty(&self) -> bool {
        self.times.is_empty()
    }

    /// Count rates of one band
    pub fn column(&self, label: &str) -> Option<ArrayView1<'_, f64>> {
        let index = self.labels.iter().position(|l| l == label)?;
        Some(self.data.column(index))
    }

    /// First and last sample time
    pub fn time_range(&self) -> Option<(DateTime<Utc>, DateTime<Utc>)> {
        Some((*self.times.first()?, *self.times.last()?))
    }
}

/// Values of a one-dimensional image or the first table column
fn first_column(file: &FitsFile, index: usize) -> Result<Vec<f64>> {
    match file.kind(index)? {
        HduKind::Image => Ok(file.image(index)?.values().to_vec()),
        HduKind::Table => Ok(file.table(index)?.column_f64_at(0)?),
        HduKind::Empty => Err(HespeError::Shape("light curve time HDU is empty".to_string())),
    }
}

/// (low, high) pairs from an n x 2 image or the first two table columns
fn band_edges(file: &FitsFile, index: usize) -> Result<Vec<(f64, f64)>> {
    match file.kind(index)? {
        HduKind::Image => {
            let edges = file.image(index)?.to_array2()?;
            if edges.ncols() != 2 {
                return Err(HespeError::Shape(format!(
                    "band edges have {} columns",
                    edges.ncols()
                )));
            }
            Ok(edges.rows().into_iter().map(|row| (row[0], row[1])).collect())
        }
        HduKind::Table => {
            let table = file.table(index)?;
            let low = table.column_f64_at(0)?;
            let high = table.column_f64_at(1)?;
            Ok(low.into_iter().zip(high).collect())
        }
        HduKind::Empty => Err(HespeError::Shape("light curve band HDU is empty".to_string())),
    }
}
