use crate::config::TrackerConfig;
use crate::entity::{EntityState, MotionConfig, Movement, Position};
use crate::filter::FilterConfig;
use crate::sample::{validate_coordinates, validate_id, Metadata, Sample, SampleError};
use crate::view::EntityView;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::time::{Duration, Instant};
use tracing::{debug, info, warn};

mod palette;

pub use palette::{fnv1a_32, palette_color, Rgb, DEFAULT_COLOR, PALETTE};

/// Longest accepted prune sweep period (one day)
pub const MAX_PRUNE_INTERVAL_SECONDS: u64 = 86_400;

/// Registry limits and inactivity handling
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RegistryConfig {
    /// Maximum number of tracked entities; new ids beyond this are rejected
    #[serde(default = "default_max_entities")]
    pub max_entities: usize,

    /// Entities idle longer than this are pruned, and restart filtering if
    /// a sample arrives before the sweep
    #[serde(default = "default_inactivity_timeout")]
    pub inactivity_timeout_seconds: u64,

    /// How often the tracker runs the prune sweep
    #[serde(default = "default_prune_interval")]
    pub prune_interval_seconds: u64,
}

fn default_max_entities() -> usize {
    10
}

fn default_inactivity_timeout() -> u64 {
    30
}

fn default_prune_interval() -> u64 {
    5
}

impl RegistryConfig {
    pub fn inactivity_timeout(&self) -> Duration {
        Duration::from_secs(self.inactivity_timeout_seconds)
    }

    /// Sweep period, held to 1s..=`MAX_PRUNE_INTERVAL_SECONDS`
    pub fn prune_interval(&self) -> Duration {
        Duration::from_secs(self.prune_interval_seconds.clamp(1, MAX_PRUNE_INTERVAL_SECONDS))
    }
}

impl Default for RegistryConfig {
    fn default() -> Self {
        Self {
            max_entities: default_max_entities(),
            inactivity_timeout_seconds: default_inactivity_timeout(),
            prune_interval_seconds: default_prune_interval(),
        }
    }
}

/// What a sample did to the registry
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UpdateOutcome {
    /// New entity created from its first sample
    Created,
    /// Existing entity moved (directly or by starting an animation)
    Moved(Movement),
    /// Existing entity, movement below threshold
    Unchanged,
    /// New id refused because the registry is full
    Rejected,
}

impl UpdateOutcome {
    pub fn needs_redraw(self) -> bool {
        matches!(self, UpdateOutcome::Created | UpdateOutcome::Moved(_))
    }
}

/// Maps identifiers to tracked entities under a population cap
#[derive(Debug, Clone)]
pub struct TrackingRegistry {
    entities: HashMap<String, EntityState>,
    config: RegistryConfig,
    filter: FilterConfig,
    motion: MotionConfig,
}

impl TrackingRegistry {
    pub fn new(config: RegistryConfig, filter: FilterConfig, motion: MotionConfig) -> Self {
        Self {
            entities: HashMap::new(),
            config,
            filter,
            motion,
        }
    }

    pub fn from_config(config: &TrackerConfig) -> Self {
        Self::new(
            config.registry.clone(),
            config.filter.clone(),
            config.motion.clone(),
        )
    }

    /// Registry holding at most `max_entities`, other settings default
    pub fn with_capacity(max_entities: usize) -> Self {
        Self::new(
            RegistryConfig {
                max_entities,
                ..RegistryConfig::default()
            },
            FilterConfig::default(),
            MotionConfig::default(),
        )
    }

    /// Feed a raw sample.
    ///
    /// Returns `Ok(true)` if something needs redrawing, `Ok(false)` if the movement
    /// was ignored or the id was rejected because the registry is full.
    /// Empty ids and non-finite coordinates are errors.
    pub fn update_position(
        &mut self,
        id: &str,
        x: f64,
        y: f64,
        z: f64,
    ) -> Result<bool, SampleError> {
        self.update_position_at(id, x, y, z, Instant::now())
    }

    pub fn update_position_at(
        &mut self,
        id: &str,
        x: f64,
        y: f64,
        z: f64,
        now: Instant,
    ) -> Result<bool, SampleError> {
        self.apply_raw(id, Position::new(x, y, z), now)
            .map(UpdateOutcome::needs_redraw)
    }

    /// Feed a sample and report exactly what happened
    pub fn apply(&mut self, sample: &Sample, now: Instant) -> Result<UpdateOutcome, SampleError> {
        self.apply_raw(&sample.id, Position::new(sample.x, sample.y, sample.z), now)
    }

    fn apply_raw(
        &mut self,
        id: &str,
        position: Position,
        now: Instant,
    ) -> Result<UpdateOutcome, SampleError> {
        validate_id(id)?;
        validate_coordinates(position.x, position.y, position.z)?;

        if let Some(entity) = self.entities.get_mut(id) {
            if entity.idle_for(now) > self.config.inactivity_timeout() {
                debug!(entity_id = %id, "Entity resumed after inactivity, restarting filter");
                entity.restart_tracking();
            }

            return Ok(match entity.apply_sample(position.x, position.y, position.z, now) {
                Movement::Ignored => UpdateOutcome::Unchanged,
                movement => UpdateOutcome::Moved(movement),
            });
        }

        if self.entities.len() >= self.config.max_entities {
            warn!(
                entity_id = %id,
                max_entities = self.config.max_entities,
                "Maximum entities reached, ignoring new entity"
            );
            return Ok(UpdateOutcome::Rejected);
        }

        let entity = EntityState::new(id, position, self.filter.clone(), self.motion.clone(), now);
        self.entities.insert(id.to_string(), entity);
        info!(entity_id = %id, entities = self.entities.len(), "Added new entity");

        Ok(UpdateOutcome::Created)
    }

    /// Attach display metadata. Returns false if the id is not tracked.
    pub fn update_metadata(&mut self, id: &str, metadata: Metadata) -> bool {
        match self.entities.get_mut(id) {
            Some(entity) => {
                entity.set_metadata(metadata);
                true
            }
            None => false,
        }
    }

    /// Display color: palette entry by FNV-1a hash for tracked ids, default otherwise
    pub fn get_color(&self, id: &str) -> Rgb {
        if self.entities.contains_key(id) {
            palette_color(id)
        } else {
            DEFAULT_COLOR
        }
    }

    /// Advance every animation one tick; true while any entity is still animating
    pub fn update_all_animations(&mut self) -> bool {
        self.update_all_animations_at(Instant::now())
    }

    pub fn update_all_animations_at(&mut self, now: Instant) -> bool {
        let mut animating = false;
        for entity in self.entities.values_mut() {
            animating |= entity.update_animation_at(now);
        }
        animating
    }

    /// Remove entities idle longer than `timeout`; returns the removed ids
    pub fn prune_inactive(&mut self, timeout: Duration) -> Vec<String> {
        self.prune_inactive_at(timeout, Instant::now())
    }

    pub fn prune_inactive_at(&mut self, timeout: Duration, now: Instant) -> Vec<String> {
        let mut removed = Vec::new();
        self.entities.retain(|id, entity| {
            let keep = entity.idle_for(now) <= timeout;
            if !keep {
                removed.push(id.clone());
            }
            keep
        });

        for id in &removed {
            info!(entity_id = %id, "Removed inactive entity");
        }
        removed.sort();
        removed
    }

    pub fn get(&self, id: &str) -> Option<&EntityState> {
        self.entities.get(id)
    }

    pub fn contains(&self, id: &str) -> bool {
        self.entities.contains_key(id)
    }

    pub fn remove(&mut self, id: &str) -> Option<EntityState> {
        self.entities.remove(id)
    }

    pub fn len(&self) -> usize {
        self.entities.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entities.is_empty()
    }

    pub fn max_entities(&self) -> usize {
        self.config.max_entities
    }

    pub fn config(&self) -> &RegistryConfig {
        &self.config
    }

    /// All entities, ordered by id
    pub fn get_all_entities(&self) -> Vec<&EntityState> {
        let mut entities: Vec<&EntityState> = self.entities.values().collect();
        entities.sort_by(|a, b| a.id().cmp(b.id()));
        entities
    }

    /// Entities with an update no consumer has processed yet, ordered by id
    pub fn get_entities_with_updates(&self) -> Vec<&EntityState> {
        let mut entities: Vec<&EntityState> =
            self.entities.values().filter(|e| e.is_dirty()).collect();
        entities.sort_by(|a, b| a.id().cmp(b.id()));
        entities
    }

    pub fn mark_processed(&mut self, id: &str) -> bool {
        match self.entities.get_mut(id) {
            Some(entity) => {
                entity.mark_processed();
                true
            }
            None => false,
        }
    }

    pub fn mark_all_processed(&mut self) {
        for entity in self.entities.values_mut() {
            entity.mark_processed();
        }
    }

    pub fn is_animating(&self) -> bool {
        self.entities.values().any(EntityState::is_animating)
    }

    pub fn has_updates(&self) -> bool {
        self.entities.values().any(EntityState::is_dirty)
    }

    /// Render snapshot of every entity, ordered by id
    pub fn views(&self) -> Vec<EntityView> {
        self.get_all_entities()
            .into_iter()
            .map(|entity| EntityView::from_entity(entity, self.get_color(entity.id())))
            .collect()
    }

    pub fn clear(&mut self) {
        self.entities.clear();
    }
}

impl Default for TrackingRegistry {
    fn default() -> Self {
        Self::new(
            RegistryConfig::default(),
            FilterConfig::default(),
            MotionConfig::default(),
        )
    }
}
