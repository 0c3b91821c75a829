//! Blocking client for the HESPE web interface
//!
//! Every call goes straight to the server except map downloads, which are
//! served from the file cache once fetched. No request is retried; the first
//! error aborts the call.

use chrono::{DateTime, Utc};
use indexmap::IndexMap;
use log::{debug, info};
use reqwest::blocking::Client;

use crate::cache::{filename_for, FileCache};
use crate::config::HespeConfig;
use crate::error::{HespeError, Result};
use crate::fits::FitsFile;
use crate::lightcurve::LightCurve;
use crate::map::{group_maps_by_energy, CompositeMap, EnergyBand, RhessiMap};
use crate::query::EventFilter;
use crate::time::{hespe_time_to_utc, timestamp_from_filename, unix_millis};
use crate::types::{
    select_record, FlareDataRecord, FlareEventSummary, ImageAlgorithm, IvsType, RayType,
};

const PNG_SUFFIX: &str = ".png";

/// Turn a quicklook PNG path into the URL of the matching FITS file.
///
/// `"foo.png"` becomes `base + "foo.fits"`; anything not ending in `.png` is
/// rejected.
pub fn rewrite_png_url(base_url: &str, url: &str) -> Result<String> {
    match url.strip_suffix(PNG_SUFFIX) {
        Some(stem) => Ok(format!("{base_url}{stem}.fits")),
        None => Err(HespeError::NotPng(url.to_string())),
    }
}

#[derive(Debug, Clone)]
pub struct HespeClient {
    config: HespeConfig,
    http: Client,
    cache: FileCache,
}

impl HespeClient {
    /// Client with the default endpoints, see [`HespeConfig::default`]
    pub fn new() -> Result<Self> {
        Self::with_config(HespeConfig::default())
    }

    pub fn with_config(config: HespeConfig) -> Result<Self> {
        let http = Client::builder().build()?;
        let cache = FileCache::new(config.cache_dir());
        Ok(Self {
            config,
            http,
            cache,
        })
    }

    pub fn config(&self) -> &HespeConfig {
        &self.config
    }

    pub fn cache(&self) -> &FileCache {
        &self.cache
    }

    fn get_bytes(&self, url: &str) -> Result<Vec<u8>> {
        debug!("GET {url}");
        let response = self.http.get(url).send()?;
        let status = response.status();
        if !status.is_success() {
            return Err(HespeError::HttpStatus {
                url: url.to_string(),
                status: status.as_u16(),
            });
        }
        Ok(response.bytes()?.to_vec())
    }

    /// All records the server holds for a flare, one per integration strategy
    pub fn fetch_flare_records(&self, flare_id: u64) -> Result<Vec<FlareDataRecord>> {
        let url = format!("{}{}", self.config.flare_data_url, flare_id);
        let body = self.get_bytes(&url)?;
        Ok(serde_json::from_slice(&body)?)
    }

    /// The record of a flare for one ivs type
    pub fn fetch_flare_data(&self, flare_id: u64, ivs_type: IvsType) -> Result<FlareDataRecord> {
        select_record(self.fetch_flare_records(flare_id)?, ivs_type)
    }

    /// FITS URL on the image host for a quicklook PNG path
    pub fn fits_url(&self, png_url: &str) -> Result<String> {
        rewrite_png_url(&self.config.image_base_url, png_url)
    }

    /// Download a map file, or read it from the cache when already present.
    ///
    /// On a miss the image table is enriched with coordinate metadata, the
    /// energy band and the observation time encoded in the filename, then
    /// written to the cache as a single-image FITS file.
    pub fn download_as_map(&self, url: &str, energy: EnergyBand) -> Result<RhessiMap> {
        let path = self.cache.path_for(url)?;
        if path.is_file() {
            debug!("cache hit for {}", path.display());
            return RhessiMap::from_fits(&FitsFile::open(&path)?);
        }

        debug!("cache miss for {url}");
        let date_obs = hespe_time_to_utc(timestamp_from_filename(filename_for(url))?)?;
        let source = FitsFile::from_bytes(self.get_bytes(url)?)?;
        let map = RhessiMap::from_table(&source.table(1)?, energy, date_obs)?;
        self.cache.store(url, &map.to_fits()?)?;
        Ok(map)
    }

    /// Every map of a flare for the chosen integration, particle type and
    /// reconstruction algorithm, in server order.
    ///
    /// A descriptor without a URL for `algorithm` or a failed download aborts
    /// the whole batch; maps fetched before the failure stay in the cache.
    pub fn get_maps_of_flareevent(
        &self,
        flare_id: u64,
        ivs_type: IvsType,
        ray_type: RayType,
        algorithm: ImageAlgorithm,
    ) -> Result<Vec<RhessiMap>> {
        let record = self.fetch_flare_data(flare_id, ivs_type)?;
        let descriptors = record.images(ray_type);
        let total = descriptors.len();

        let mut maps = Vec::with_capacity(total);
        for (i, descriptor) in descriptors.iter().enumerate() {
            let png_url = descriptor.url(algorithm).ok_or(HespeError::MissingProduct {
                key: algorithm.json_key(),
            })?;
            let url = self.fits_url(png_url)?;
            let energy = EnergyBand::new(descriptor.lower_energy, descriptor.upper_energy);
            maps.push(self.download_as_map(&url, energy)?);
            info!("downloaded {} of {}", i + 1, total);
        }
        Ok(maps)
    }

    /// Like [`get_maps_of_flareevent`](Self::get_maps_of_flareevent), grouped
    /// into one composite per energy band
    pub fn get_composites_of_flareevent(
        &self,
        flare_id: u64,
        ivs_type: IvsType,
        ray_type: RayType,
        algorithm: ImageAlgorithm,
    ) -> Result<IndexMap<EnergyBand, CompositeMap>> {
        let maps = self.get_maps_of_flareevent(flare_id, ivs_type, ray_type, algorithm)?;
        Ok(group_maps_by_energy(maps))
    }

    /// Summary light curve of a flare. Always fetched fresh, never cached.
    pub fn get_lightcurve_of_flareevent(&self, flare_id: u64) -> Result<LightCurve> {
        let record = self.fetch_flare_data(flare_id, IvsType::Coarse)?;
        let png_url = record
            .lightcurves
            .as_deref()
            .ok_or(HespeError::MissingLightCurve)?;
        let url = self.fits_url(png_url)?;
        let file = FitsFile::from_bytes(self.get_bytes(&url)?)?;
        LightCurve::from_fits(&file)
    }

    /// Events matching a filter
    pub fn query_flareevents(&self, filter: &EventFilter) -> Result<Vec<FlareEventSummary>> {
        let url = filter.to_url(&self.config.event_list_url);
        let body = self.get_bytes(&url)?;
        Ok(serde_json::from_slice(&body)?)
    }

    /// Ids of the events within a time window
    pub fn get_flareevents_between(
        &self,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    ) -> Result<Vec<u64>> {
        let filter = EventFilter::new().date_range(unix_millis(start), unix_millis(end));
        Ok(self
            .query_flareevents(&filter)?
            .into_iter()
            .map(|event| event.flare_id)
            .collect())
    }
}
