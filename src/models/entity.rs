//! Catalog entity models
//!
//! The formatted shapes handed to callers, decoded once from raw upstream records.

use serde::{Deserialize, Serialize};

use crate::error::FetchError;
use crate::format::{capitalize, pad_id, tenths};
use crate::source::RawRecord;

// == Entity ==
/// A formatted catalog record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Entity {
    /// Zero-padded id, e.g. `"0025"`
    pub id: String,
    /// Capitalized display name
    pub name: String,
    /// Kilograms with one decimal
    pub weight: String,
    /// Metres with one decimal
    pub height: String,
    /// Capitalized type names in slot order
    pub types: Vec<String>,
    /// Sprite reference from the upstream record, if any
    pub image: Option<String>,
}

impl Entity {
    /// The minimal listing projection.
    pub fn to_ref(&self) -> EntityRef {
        EntityRef {
            id: self.id.clone(),
            name: self.name.clone(),
        }
    }
}

impl TryFrom<RawRecord> for Entity {
    type Error = FetchError;

    /// Rejects records with no usable identity; anything else decodes.
    fn try_from(raw: RawRecord) -> Result<Self, Self::Error> {
        if raw.id == 0 {
            return Err(FetchError::Decode("record id must be positive".to_string()));
        }
        if raw.name.trim().is_empty() {
            return Err(FetchError::Decode(format!("record {} has no name", raw.id)));
        }

        let mut slots = raw.types;
        slots.sort_by_key(|slot| slot.slot);

        Ok(Self {
            id: pad_id(raw.id),
            name: capitalize(raw.name.trim()),
            weight: tenths(raw.weight),
            height: tenths(raw.height),
            types: slots.iter().map(|slot| capitalize(&slot.kind.name)).collect(),
            image: raw.sprites.best().map(str::to_string),
        })
    }
}

// == Entity Ref ==
/// `{ id, name }` projection used for listings and the featured rotation.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct EntityRef {
    pub id: String,
    pub name: String,
}

impl EntityRef {
    pub fn new(id: u32, name: &str) -> Self {
        Self {
            id: pad_id(id),
            name: capitalize(name),
        }
    }
}

// == Featured Set ==
/// The daily rotation, valid for one reference-timezone date.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FeaturedSet {
    /// `YYYY-MM-DD` in the reference timezone
    pub date_key: String,
    /// Shuffled members; callers take a prefix
    pub members: Vec<EntityRef>,
}
