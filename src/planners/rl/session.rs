//! Per-episode bookkeeping for the learning agent

use crate::infra::{Position, centroid};
use crate::state::{BaseOrientation, FunctionCall, FunctionId, Modifier, Observation, UnitType};

/// Number of refineries the opening asks for
pub const REFINERY_TARGET: usize = 2;

/// Geyser sites closer than this to a refinery or a pending order count as taken
const TAKEN_SITE_RADIUS_SQ: i64 = 16;

/// Ticks before an order that never produced a refinery may be reissued
pub const ORDER_RETRY_TICKS: usize = 24;

/// A refinery order awaiting its structure on screen
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct RefineryOrder {
    site: Position,
    tick: usize,
}

/// Everything the agent caches for one episode; rebuilt on each first tick
#[derive(Debug, Clone)]
pub struct EpisodeSession {
    pub orientation: BaseOrientation,
    /// Command-center centroid as seen on the first tick
    pub command_center: Option<Position>,
    pub ticks: usize,
    ordered_refineries: Vec<RefineryOrder>,
}

impl EpisodeSession {
    pub fn begin(obs: &Observation) -> Self {
        let orientation = BaseOrientation::detect(obs);
        let command_center = obs.screen_unit_type.centroid_of(UnitType::CommandCenter.id());
        tracing::info!(
            "Episode session started: base {:?}, command center {:?}",
            orientation,
            command_center
        );
        Self {
            orientation,
            command_center,
            ticks: 0,
            ordered_refineries: Vec::new(),
        }
    }

    pub fn refineries_ordered(&self) -> usize {
        self.ordered_refineries.len()
    }

    /// Refinery sites currently visible on screen
    pub fn refineries_built(obs: &Observation) -> usize {
        geyser_sites(&obs.unit_pixels(UnitType::Refinery), None).len()
    }

    /// Refinery orders that pre-empt macro-action selection until two refineries stand.
    ///
    /// An order whose refinery has not appeared within `ORDER_RETRY_TICKS` is retried.
    pub fn gas_setup(&mut self, obs: &Observation) -> Option<FunctionCall> {
        let refineries = geyser_sites(&obs.unit_pixels(UnitType::Refinery), None);
        if refineries.len() >= REFINERY_TARGET || !obs.is_available(FunctionId::BuildRefinery) {
            return None;
        }

        let now = self.ticks;
        let pending: Vec<Position> = self
            .ordered_refineries
            .iter()
            .filter(|order| now.saturating_sub(order.tick) < ORDER_RETRY_TICKS)
            .map(|order| order.site)
            .collect();

        let geysers = obs.unit_pixels(UnitType::VespeneGeyser);
        let site = geyser_sites(&geysers, self.command_center)
            .into_iter()
            .find(|site| {
                refineries
                    .iter()
                    .chain(pending.iter())
                    .all(|taken| taken.distance_squared(site) > TAKEN_SITE_RADIUS_SQ)
            })?;

        self.ordered_refineries.push(RefineryOrder { site, tick: now });
        tracing::debug!(
            "Ordering refinery at ({}, {}), {} of {} standing",
            site.x,
            site.y,
            refineries.len(),
            REFINERY_TARGET
        );
        Some(FunctionCall::targeted(
            FunctionId::BuildRefinery,
            Modifier::Queued,
            site,
        ))
    }
}

/// Split a geyser mask into individual geyser centres, nearest to `anchor` first.
///
/// The mask is cut at the widest empty gap along its longer axis; with no gap it is one geyser.
pub fn geyser_sites(geysers: &[Position], anchor: Option<Position>) -> Vec<Position> {
    if geysers.is_empty() {
        return Vec::new();
    }

    let span = |axis: fn(&Position) -> i32| {
        let min = geysers.iter().map(axis).min().unwrap_or(0);
        let max = geysers.iter().map(axis).max().unwrap_or(0);
        max - min
    };
    let axis: fn(&Position) -> i32 = if span(|p| p.x) >= span(|p| p.y) {
        |p| p.x
    } else {
        |p| p.y
    };

    let mut coords: Vec<i32> = geysers.iter().map(axis).collect();
    coords.sort_unstable();
    coords.dedup();
    let cut = coords
        .windows(2)
        .filter(|pair| pair[1] - pair[0] > 1)
        .max_by_key(|pair| pair[1] - pair[0])
        .map(|pair| pair[1]);

    let mut sites: Vec<Position> = match cut {
        Some(cut) => {
            let (low, high): (Vec<Position>, Vec<Position>) =
                geysers.iter().copied().partition(|p| axis(p) < cut);
            [low, high].iter().filter_map(|group| centroid(group)).collect()
        }
        None => centroid(geysers).into_iter().collect(),
    };

    if let Some(anchor) = anchor {
        sites.sort_by_key(|site| site.distance_squared(&anchor));
    }
    sites
}
