//! Client for the HESPE solar flare database
//!
//! Resolves RHESSI flare events, fetches the image and light curve products
//! HESPE has computed for them, caches map files locally and turns them into
//! [`RhessiMap`], [`LightCurve`] and [`CompositeMap`] values.

mod cache;
mod client;
mod config;
mod error;
pub mod fits;
mod lightcurve;
pub mod map;
mod query;
pub mod time;
mod types;

pub use cache::{filename_for, FileCache};
pub use client::{rewrite_png_url, HespeClient};
pub use config::{
    HespeConfig, CACHE_SUBDIR, DOWNLOAD_DIR_ENV, EVENT_LIST_BASE_URL, FLARE_DATA_BASE_URL,
    IMAGE_DATABASE_BASE_URL,
};
pub use error::{HespeError, Result};
pub use lightcurve::{band_label, LightCurve};
pub use map::{
    group_maps_by_energy, Colormap, CompositeLayer, CompositeMap, EnergyBand, MapMeta, RhessiMap,
};
pub use query::{EventFilter, SortDirection};
pub use time::HESPE_TIME_TO_UNIX_TIME;
pub use types::{
    select_record, FlareDataRecord, FlareEventSummary, ImageAlgorithm, ImageProductDescriptor,
    IvsType, RayType,
};
