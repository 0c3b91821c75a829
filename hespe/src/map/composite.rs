//! Overlays of maps sharing an energy band

use indexmap::IndexMap;

use super::{EnergyBand, RhessiMap};

/// One member of a composite
#[derive(Debug, Clone, PartialEq)]
pub struct CompositeLayer {
    pub map: RhessiMap,
    pub zorder: i32,
    pub alpha: f64,
}

/// Stack of maps blended at the given opacities
#[derive(Debug, Clone, PartialEq, Default)]
pub struct CompositeMap {
    layers: Vec<CompositeLayer>,
}

impl CompositeMap {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_map(&mut self, map: RhessiMap, zorder: i32, alpha: f64) {
        self.layers.push(CompositeLayer { map, zorder, alpha });
    }

    pub fn layers(&self) -> &[CompositeLayer] {
        &self.layers
    }

    pub fn maps(&self) -> impl Iterator<Item = &RhessiMap> {
        self.layers.iter().map(|layer| &layer.map)
    }

    pub fn len(&self) -> usize {
        self.layers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.layers.is_empty()
    }

    /// Sum of all layer opacities
    pub fn total_alpha(&self) -> f64 {
        self.layers.iter().map(|layer| layer.alpha).sum()
    }
}

/// Group maps by energy band and blend each group with equal weights.
///
/// Keys keep the order in which bands first appear. Every member of a group
/// of `n` maps gets alpha `1/n` at z-order 0.
pub fn group_maps_by_energy<I>(maps: I) -> IndexMap<EnergyBand, CompositeMap>
where
    I: IntoIterator<Item = RhessiMap>,
{
    let mut groups: IndexMap<EnergyBand, Vec<RhessiMap>> = IndexMap::new();
    for map in maps {
        groups.entry(map.energy_band()).or_default().push(map);
    }

    groups
        .into_iter()
        .map(|(band, members)| {
            let alpha = 1.0 / members.len() as f64;
            let mut composite = CompositeMap::new();
            for map in members {
                composite.add_map(map, 0, alpha);
            }
            (band, composite)
        })
        .collect()
}
