//! The slope: a wrapping row of terrain plus every entity standing on it.
//!
//! Terrain evolves through a probabilistic cellular automaton, one growth
//! channel per hazard. Entities (player, Yeti, ICBM, Fire Demon) share the
//! row's coordinate space; their interactions are resolved once per turn in a
//! fixed order by [`Slope::resolve_entities`].
use serde::{Deserialize, Serialize};
use std::fmt;

use crate::config::SlopeConfig;
use crate::constants::NEIGHBORHOOD_SIZE;
use crate::random::RandomSource;
use crate::terrain::{EntityMarker, RowCell, TerrainCell, row_to_string};

/// Why a Yeti was melted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MeltCause {
    /// The player's skis got too close.
    Skis,
    /// It simply melted on its own.
    Spontaneous,
    Icbm,
    Demon,
}

/// Notable entity changes produced while advancing the world.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "event", rename_all = "snake_case")]
pub enum EntityEvent {
    YetiAppeared { pos: i64 },
    YetiMelted { cause: MeltCause },
    IcbmLaunched { pos: i64 },
    IcbmSelfDestructed,
    DemonSummoned { pos: i64 },
    DemonDeparted,
}

impl EntityEvent {
    #[must_use]
    pub const fn message(self) -> &'static str {
        match self {
            Self::YetiAppeared { .. } => "Yikes! A Yeti has appeared on the slope!",
            Self::YetiMelted {
                cause: MeltCause::Skis,
            } => "Your hot skis melted the Yeti!",
            Self::YetiMelted {
                cause: MeltCause::Spontaneous,
            } => "The Yeti melted in the afternoon sun!",
            Self::YetiMelted {
                cause: MeltCause::Icbm,
            } => "The ICBM vaporized the Yeti!",
            Self::YetiMelted {
                cause: MeltCause::Demon,
            } => "The Fire Demon melted the Yeti!",
            Self::IcbmLaunched { .. } => "ICBM launched!",
            Self::IcbmSelfDestructed => "The ICBM found no Yeti and self-destructed.",
            Self::DemonSummoned { .. } => "A Fire Demon rises from the snow!",
            Self::DemonDeparted => "The Fire Demon grew bored and departed.",
        }
    }
}

impl fmt::Display for EntityEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.message())
    }
}

/// Terrain row, growth state and entity positions for one session.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Slope {
    cells: Vec<TerrainCell>,
    length: i64,
    level_num: u64,
    prob_tree: [f64; NEIGHBORHOOD_SIZE],
    prob_ice: [f64; NEIGHBORHOOD_SIZE],
    prob_ground: [f64; NEIGHBORHOOD_SIZE],
    prob_yeti_appearance: f64,
    player_pos: i64,
    yeti_pos: Option<i64>,
    icbm_pos: Option<i64>,
    demon_pos: Option<i64>,
    cfg: SlopeConfig,
    #[serde(skip)]
    events: Vec<EntityEvent>,
}

impl Slope {
    /// Fresh all-snow slope with the player in the middle.
    ///
    /// The configuration is assumed to be validated; a zero length is treated
    /// as a single cell.
    #[must_use]
    pub fn new(cfg: &SlopeConfig) -> Self {
        let cells = vec![TerrainCell::Snow; cfg.length.max(1)];
        let length = i64::try_from(cells.len()).unwrap_or(i64::MAX);
        Self {
            cells,
            length,
            level_num: 0,
            prob_tree: cfg.prob_tree,
            prob_ice: cfg.prob_ice,
            prob_ground: cfg.prob_ground,
            prob_yeti_appearance: cfg.prob_yeti_appearance,
            player_pos: length / 2,
            yeti_pos: None,
            icbm_pos: None,
            demon_pos: None,
            cfg: cfg.clone(),
            events: Vec::new(),
        }
    }

    #[must_use]
    pub const fn length(&self) -> i64 {
        self.length
    }

    #[must_use]
    pub const fn level_num(&self) -> u64 {
        self.level_num
    }

    #[must_use]
    pub fn cells(&self) -> &[TerrainCell] {
        &self.cells
    }

    #[must_use]
    pub const fn player_pos(&self) -> i64 {
        self.player_pos
    }

    #[must_use]
    pub const fn yeti_pos(&self) -> Option<i64> {
        self.yeti_pos
    }

    #[must_use]
    pub const fn icbm_pos(&self) -> Option<i64> {
        self.icbm_pos
    }

    #[must_use]
    pub const fn demon_pos(&self) -> Option<i64> {
        self.demon_pos
    }

    #[must_use]
    pub const fn prob_tree(&self) -> &[f64; NEIGHBORHOOD_SIZE] {
        &self.prob_tree
    }

    #[must_use]
    pub const fn prob_ice(&self) -> &[f64; NEIGHBORHOOD_SIZE] {
        &self.prob_ice
    }

    #[must_use]
    pub const fn prob_ground(&self) -> &[f64; NEIGHBORHOOD_SIZE] {
        &self.prob_ground
    }

    #[must_use]
    pub const fn prob_yeti_appearance(&self) -> f64 {
        self.prob_yeti_appearance
    }

    #[must_use]
    pub const fn config(&self) -> &SlopeConfig {
        &self.cfg
    }

    #[must_use]
    pub const fn wrap(&self, pos: i64) -> i64 {
        pos.rem_euclid(self.length)
    }

    #[allow(clippy::cast_sign_loss, clippy::cast_possible_truncation)]
    const fn index(&self, pos: i64) -> usize {
        self.wrap(pos) as usize
    }

    /// Terrain under a position (wrapped onto the row).
    #[must_use]
    pub fn terrain_at(&self, pos: i64) -> TerrainCell {
        self.cells[self.index(pos)]
    }

    /// Terrain under the player.
    #[must_use]
    pub fn player_terrain(&self) -> TerrainCell {
        self.terrain_at(self.player_pos)
    }

    /// Whether `pos` is present and within `min_distance` of `player_pos`.
    ///
    /// The distance is linear; it does not wrap around the slope.
    #[must_use]
    pub const fn is_near(pos: Option<i64>, player_pos: i64, min_distance: i64) -> bool {
        match pos {
            Some(pos) => (pos - player_pos).abs() <= min_distance,
            None => false,
        }
    }

    /// [`Slope::is_near`] measured against this slope's player.
    #[must_use]
    pub const fn near_player(&self, pos: Option<i64>, min_distance: i64) -> bool {
        Self::is_near(pos, self.player_pos, min_distance)
    }

    /// Uniform random position on the slope.
    pub fn teleport(&self, rng: &mut impl RandomSource) -> i64 {
        self.wrap(rng.random(0, self.length))
    }

    pub fn set_player_pos(&mut self, pos: i64) {
        self.player_pos = self.wrap(pos);
    }

    pub fn set_yeti_pos(&mut self, pos: Option<i64>) {
        self.yeti_pos = pos.map(|p| self.wrap(p));
    }

    pub fn set_terrain(&mut self, pos: i64, cell: TerrainCell) {
        let idx = self.index(pos);
        self.cells[idx] = cell;
    }

    /// Put an ICBM on the slope at `pos`.
    pub fn launch_icbm(&mut self, pos: i64) {
        let pos = self.wrap(pos);
        self.icbm_pos = Some(pos);
        self.events.push(EntityEvent::IcbmLaunched { pos });
    }

    /// Put a Fire Demon on the slope at `pos`.
    pub fn summon_demon(&mut self, pos: i64) {
        let pos = self.wrap(pos);
        self.demon_pos = Some(pos);
        self.events.push(EntityEvent::DemonSummoned { pos });
    }

    /// Drain entity events recorded since the last call.
    pub fn take_events(&mut self) -> Vec<EntityEvent> {
        std::mem::take(&mut self.events)
    }

    fn growth_vector(&self, channel: TerrainCell) -> &[f64; NEIGHBORHOOD_SIZE] {
        match channel {
            TerrainCell::Tree => &self.prob_tree,
            TerrainCell::Ice => &self.prob_ice,
            TerrainCell::Ground | TerrainCell::Snow => &self.prob_ground,
        }
    }

    const fn grown_cell(&self, channel: TerrainCell) -> TerrainCell {
        match channel {
            TerrainCell::Ground if self.cfg.ground_grows_as_ice => TerrainCell::Ice,
            other => other,
        }
    }

    /// Recompute every cell from the previous row.
    ///
    /// Channels are tried in [`TerrainCell::GROWTH_ORDER`]; the first success
    /// wins. Spontaneous growth (no matching neighbor) never lands on the
    /// player's own cell.
    pub fn regenerate(&mut self, rng: &mut impl RandomSource) {
        let previous = self.cells.clone();
        let player_idx = self.index(self.player_pos);
        for idx in 0..previous.len() {
            let mut next = TerrainCell::Snow;
            for channel in TerrainCell::GROWTH_ORDER {
                let neighbors = count_neighbors(&previous, idx, channel);
                let chance = self.growth_vector(channel)[neighbors];
                if rng.percent(chance) && (idx != player_idx || neighbors > 0) {
                    next = self.grown_cell(channel);
                    break;
                }
            }
            self.cells[idx] = next;
        }
        log::trace!(
            "Slope regenerated | level {} trees:{} ice:{} ground:{}",
            self.level_num,
            self.count(TerrainCell::Tree),
            self.count(TerrainCell::Ice),
            self.count(TerrainCell::Ground)
        );
    }

    fn count(&self, cell: TerrainCell) -> usize {
        self.cells.iter().filter(|c| **c == cell).count()
    }

    /// Move the player, regrow the terrain, maybe spawn a Yeti and raise the
    /// difficulty for the next level.
    pub fn advance_level(&mut self, player_speed: i64, rng: &mut impl RandomSource) {
        self.level_num += 1;
        self.player_pos = (self.player_pos + player_speed + self.length).rem_euclid(self.length);
        self.regenerate(rng);

        if self.yeti_pos.is_none() && rng.percent(self.prob_yeti_appearance) {
            match self.yeti_spawn_point(rng) {
                Some(pos) => {
                    log::debug!("Yeti appears | level {} pos {pos}", self.level_num);
                    self.yeti_pos = Some(pos);
                    self.events.push(EntityEvent::YetiAppeared { pos });
                }
                None => log::debug!(
                    "Yeti appearance skipped | no cell farther than {} from {}",
                    self.cfg.min_yeti_appearance_distance,
                    self.player_pos
                ),
            }
        }

        let multiplier = self.cfg.level_multiplier;
        self.prob_tree[0] *= multiplier;
        self.prob_ice[0] *= multiplier;
        self.prob_ground[0] *= multiplier;
        self.prob_yeti_appearance *= multiplier;
    }

    /// Teleport destination for a new Yeti, uniform over every cell farther
    /// than the minimum appearance distance. `None` when no cell qualifies.
    fn yeti_spawn_point(&self, rng: &mut impl RandomSource) -> Option<i64> {
        let min_distance = self.cfg.min_yeti_appearance_distance;
        let candidates: Vec<i64> = (0..self.length)
            .filter(|pos| (pos - self.player_pos).abs() > min_distance)
            .collect();
        if candidates.is_empty() {
            return None;
        }
        let span = i64::try_from(candidates.len()).unwrap_or(i64::MAX);
        let pick = usize::try_from(rng.random(0, span)).unwrap_or(0);
        candidates.get(pick).copied()
    }

    /// Resolve one turn of entity interplay and return how many Yetis melted.
    pub fn resolve_entities(&mut self, rng: &mut impl RandomSource) -> u32 {
        let mut melted = 0;

        if let Some(yeti) = self.yeti_pos {
            let by_skis =
                self.near_player(Some(yeti), 1) && rng.percent(self.cfg.prob_skis_melt_yeti);
            if by_skis || rng.percent(self.cfg.prob_yeti_melt) {
                let cause = if by_skis {
                    MeltCause::Skis
                } else {
                    MeltCause::Spontaneous
                };
                melted += self.melt_yeti(cause);
            }
        }

        if let Some(yeti) = self.yeti_pos {
            let step = if yeti < self.player_pos { 1 } else { -1 };
            let target = self.wrap(yeti + step);
            if self.terrain_at(target) != TerrainCell::Tree {
                self.yeti_pos = Some(target);
            }
        }

        match (self.icbm_pos, self.yeti_pos) {
            (Some(icbm), Some(yeti)) => {
                self.icbm_pos = Some(self.wrap(step_toward(icbm, yeti, self.cfg.icbm_speed)));
            }
            (Some(_), None) => {
                self.icbm_pos = None;
                self.events.push(EntityEvent::IcbmSelfDestructed);
            }
            _ => {}
        }

        match (self.demon_pos, self.yeti_pos) {
            (Some(demon), Some(yeti)) => {
                self.demon_pos = Some(self.wrap(step_toward(demon, yeti, self.cfg.demon_speed)));
            }
            (Some(_), None) => {
                if rng.percent(self.cfg.prob_demon_departs) {
                    self.demon_pos = None;
                    self.events.push(EntityEvent::DemonDeparted);
                }
            }
            _ => {}
        }

        if let (Some(yeti), Some(icbm)) = (self.yeti_pos, self.icbm_pos)
            && (yeti - icbm).abs() <= self.cfg.icbm_range
        {
            self.icbm_pos = None;
            melted += self.melt_yeti(MeltCause::Icbm);
        }

        if let (Some(yeti), Some(demon)) = (self.yeti_pos, self.demon_pos)
            && (yeti - demon).abs() <= 1
        {
            melted += self.melt_yeti(MeltCause::Demon);
        }

        melted
    }

    fn melt_yeti(&mut self, cause: MeltCause) -> u32 {
        log::debug!("Yeti melted | level {} cause {cause:?}", self.level_num);
        self.yeti_pos = None;
        self.events.push(EntityEvent::YetiMelted { cause });
        1
    }

    /// Terrain row with entity markers overlaid; the player is drawn last.
    #[must_use]
    pub fn render_row(&self) -> Vec<RowCell> {
        let mut row: Vec<RowCell> = self.cells.iter().copied().map(RowCell::Terrain).collect();
        let overlays = [
            (self.demon_pos, EntityMarker::Demon),
            (self.icbm_pos, EntityMarker::Icbm),
            (self.yeti_pos, EntityMarker::Yeti),
            (Some(self.player_pos), EntityMarker::Player),
        ];
        for (pos, marker) in overlays {
            if let Some(pos) = pos {
                row[self.index(pos)] = RowCell::Entity(marker);
            }
        }
        row
    }

    /// Display string for the current row.
    #[must_use]
    pub fn snapshot(&self) -> String {
        row_to_string(&self.render_row())
    }
}

/// Number of cells matching `channel` among left, self and right. Edge cells
/// only see two cells; the neighborhood does not wrap.
fn count_neighbors(cells: &[TerrainCell], idx: usize, channel: TerrainCell) -> usize {
    let start = idx.saturating_sub(1);
    let end = (idx + 2).min(cells.len());
    cells[start..end].iter().filter(|c| **c == channel).count()
}

/// Move `from` exactly `speed` cells toward `to`. The step may carry past
/// `to`; sharing a cell counts as lying below it.
const fn step_toward(from: i64, to: i64, speed: i64) -> i64 {
    if to < from {
        from.saturating_sub(speed)
    } else {
        from.saturating_add(speed)
    }
}
