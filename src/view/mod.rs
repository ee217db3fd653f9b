use crate::entity::{EntityState, Position};
use crate::registry::Rgb;
use crate::sample::Metadata;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

#[cfg(test)]
mod tests;

/// Everything a renderer needs to draw one entity
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct EntityView {
    pub id: String,

    /// Short on-screen label (last four characters of the id)
    pub label: String,

    pub position: Position,

    /// Position before the last visible change, for trail drawing
    #[serde(skip_serializing_if = "Option::is_none")]
    pub previous: Option<Position>,

    /// Animation target, if still moving
    #[serde(skip_serializing_if = "Option::is_none")]
    pub target: Option<Position>,

    pub color: Rgb,
    pub animating: bool,

    /// True if this frame carries a change not yet rendered
    pub dirty: bool,

    pub metadata: Metadata,
}

impl EntityView {
    pub fn from_entity(entity: &EntityState, color: Rgb) -> Self {
        Self {
            id: entity.id().to_string(),
            label: entity.short_id().to_string(),
            position: entity.position(),
            previous: entity.previous_position(),
            target: entity.target(),
            color,
            animating: entity.is_animating(),
            dirty: entity.is_dirty(),
            metadata: entity.metadata().clone(),
        }
    }

    /// Info line as shown in the entity list: `label : (x, y) | tag | balance`
    pub fn summary(&self) -> String {
        let mut text = format!(
            "{} : ({}, {})",
            self.label,
            self.position.x.trunc() as i64,
            self.position.y.trunc() as i64
        );
        if let Some(tag) = &self.metadata.tag {
            let start = tag.char_indices().rev().nth(7).map(|(i, _)| i).unwrap_or(0);
            text.push_str(&format!(" | {}", &tag[start..]));
        }
        if let Some(balance) = self.metadata.balance {
            text.push_str(&format!(" | {:.2}", balance));
        }
        text
    }
}

/// Render snapshot broadcast once per tick
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Frame {
    pub timestamp: DateTime<Utc>,
    pub entities: Vec<EntityView>,
}

impl Frame {
    pub fn new(entities: Vec<EntityView>) -> Self {
        Self {
            timestamp: Utc::now(),
            entities,
        }
    }

    pub fn entity(&self, id: &str) -> Option<&EntityView> {
        self.entities.iter().find(|e| e.id == id)
    }

    pub fn is_animating(&self) -> bool {
        self.entities.iter().any(|e| e.animating)
    }
}

/// World-to-screen mapping: `screen = center + world * scale`
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct Viewport {
    pub center_x: f64,
    pub center_y: f64,
    pub scale: f64,
}

impl Viewport {
    pub fn new(center_x: f64, center_y: f64, scale: f64) -> Self {
        Self {
            center_x,
            center_y,
            scale,
        }
    }

    pub fn to_screen(&self, position: &Position) -> (f64, f64) {
        (
            self.center_x + position.x * self.scale,
            self.center_y + position.y * self.scale,
        )
    }

    /// Inverse of `to_screen`; `None` for a zero scale
    pub fn to_world(&self, screen_x: f64, screen_y: f64) -> Option<(f64, f64)> {
        if self.scale == 0.0 {
            return None;
        }
        Some((
            (screen_x - self.center_x) / self.scale,
            (screen_y - self.center_y) / self.scale,
        ))
    }
}

impl Default for Viewport {
    fn default() -> Self {
        Self::new(0.0, 0.0, 1.0)
    }
}
