//! HESPE record types and product selectors

use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::HespeError;

/// Time-integration strategy a map was generated with
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum IvsType {
    #[default]
    Coarse,
    Fixed,
    Fine,
}

impl IvsType {
    /// Value of the `ivsType` field in flare records
    pub fn as_str(&self) -> &'static str {
        match self {
            IvsType::Coarse => "coarse",
            IvsType::Fixed => "fixed",
            IvsType::Fine => "fine",
        }
    }
}

impl FromStr for IvsType {
    type Err = HespeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "coarse" => Ok(IvsType::Coarse),
            "fixed" => Ok(IvsType::Fixed),
            "fine" => Ok(IvsType::Fine),
            other => Err(HespeError::UnknownIvsType(other.to_string())),
        }
    }
}

impl fmt::Display for IvsType {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Reconstruction domain of a map
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum RayType {
    #[default]
    Photon,
    Electron,
}

impl RayType {
    /// Key of the image list in flare records
    pub fn json_key(&self) -> &'static str {
        match self {
            RayType::Photon => "visBags",
            RayType::Electron => "electron_visBags",
        }
    }
}

impl FromStr for RayType {
    type Err = HespeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "photon" => Ok(RayType::Photon),
            "electron" => Ok(RayType::Electron),
            other => Err(HespeError::UnknownRayType(other.to_string())),
        }
    }
}

/// Image reconstruction algorithm
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum ImageAlgorithm {
    UvSmooth,
    #[default]
    VisClean,
    MemNjit,
    BpMap,
}

impl ImageAlgorithm {
    /// Key of the quicklook URL in image descriptors
    pub fn json_key(&self) -> &'static str {
        match self {
            ImageAlgorithm::UvSmooth => "quicklook",
            ImageAlgorithm::VisClean => "quicklook_visclean",
            ImageAlgorithm::MemNjit => "quicklook_memnjit",
            ImageAlgorithm::BpMap => "quicklook_bpmap",
        }
    }
}

impl FromStr for ImageAlgorithm {
    type Err = HespeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "uvsmooth" => Ok(ImageAlgorithm::UvSmooth),
            "visclean" => Ok(ImageAlgorithm::VisClean),
            "memnjit" => Ok(ImageAlgorithm::MemNjit),
            "bpmap" => Ok(ImageAlgorithm::BpMap),
            other => Err(HespeError::UnknownAlgorithm(other.to_string())),
        }
    }
}

/// One reconstructed image of a flare: quicklook URLs per algorithm plus its
/// energy band in keV.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ImageProductDescriptor {
    #[serde(rename = "lowerEnergy")]
    pub lower_energy: f64,
    #[serde(rename = "upperEnergy")]
    pub upper_energy: f64,
    /// Everything else the server sends, including the quicklook URLs
    #[serde(flatten)]
    pub products: BTreeMap<String, Value>,
}

impl ImageProductDescriptor {
    /// Quicklook (PNG) URL for an algorithm, relative to the image host
    pub fn url(&self, algorithm: ImageAlgorithm) -> Option<&str> {
        self.products
            .get(algorithm.json_key())
            .and_then(Value::as_str)
    }
}

/// All data of a flare event for one integration strategy
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FlareDataRecord {
    #[serde(rename = "ivsType")]
    pub ivs_type: String,
    #[serde(rename = "visBags", default)]
    pub photon_images: Vec<ImageProductDescriptor>,
    #[serde(rename = "electron_visBags", default)]
    pub electron_images: Vec<ImageProductDescriptor>,
    /// Quicklook URL of the light curve plot
    #[serde(default)]
    pub lightcurves: Option<String>,
    #[serde(flatten)]
    pub other: BTreeMap<String, Value>,
}

impl FlareDataRecord {
    pub fn images(&self, ray_type: RayType) -> &[ImageProductDescriptor] {
        match ray_type {
            RayType::Photon => &self.photon_images,
            RayType::Electron => &self.electron_images,
        }
    }
}

/// Entry of the filtered event list
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FlareEventSummary {
    #[serde(rename = "flareId")]
    pub flare_id: u64,
    /// Start time, duration, GOES class and whatever else the server reports
    #[serde(flatten)]
    pub other: BTreeMap<String, Value>,
}

/// Pick the record matching `ivs_type` out of a flare's record list
pub fn select_record(records: Vec<FlareDataRecord>, ivs_type: IvsType) -> crate::Result<FlareDataRecord> {
    records
        .into_iter()
        .find(|record| record.ivs_type == ivs_type.as_str())
        .ok_or_else(|| HespeError::UnsupportedIvsType(ivs_type.as_str().to_string()))
}
