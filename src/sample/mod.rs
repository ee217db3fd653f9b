use serde::{Deserialize, Serialize};

mod validation;

pub use validation::{validate_coordinates, validate_id, SampleError};

/// Sample is one raw position report for a tracked entity.
///
/// Coordinates are in world units as reported by the positioning receiver.
/// `z` is optional on the wire and defaults to 0.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Sample {
    /// Stable identifier (e.g. a tag's hardware address "AA:BB:CC:DD:EE:FF")
    pub id: String,

    pub x: f64,
    pub y: f64,

    #[serde(default)]
    pub z: f64,
}

impl Sample {
    pub fn new(id: impl Into<String>, x: f64, y: f64, z: f64) -> Self {
        Self {
            id: id.into(),
            x,
            y,
            z,
        }
    }

    /// Checks the identifier is non-empty and every coordinate is finite.
    pub fn validate(&self) -> Result<(), SampleError> {
        validate_id(&self.id)?;
        validate_coordinates(self.x, self.y, self.z)
    }
}

/// Metadata attached to an entity by an external lookup
/// (e.g. a card number and account balance).
///
/// Stored and exposed as given; never interpreted.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Metadata {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tag: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub balance: Option<f64>,
}

/// One line of JSON input, tagged by `type`.
///
/// ```
/// use uwb_tracker::sample::InputRecord;
///
/// let rec: InputRecord =
///     serde_json::from_str(r#"{"type":"position","id":"tag-01","x":1.0,"y":2.0}"#).unwrap();
/// assert!(matches!(rec, InputRecord::Position(s) if s.z == 0.0));
/// ```
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum InputRecord {
    Position(Sample),
    Metadata {
        id: String,
        #[serde(flatten)]
        metadata: Metadata,
    },
}
