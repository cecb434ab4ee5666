//! NER entity model.
//!
//! # Responsibility
//! - Mirror the wire shape returned by the external NER service.
//! - Provide the "exactly two entities" gate applied before resolution.
//!
//! # Invariants
//! - Entities are transient; they are never persisted.
//! - Labels serialize with the service spelling (`"ACTION ITEM"`), and the
//!   underscore spelling is accepted on input.
//! - Unknown labels decode as `EntityType::Unrecognized` instead of failing.

use serde::{Deserialize, Serialize};

/// Number of entities a response must carry before resolution is attempted.
pub const RESOLVABLE_ENTITY_COUNT: usize = 2;

/// Semantic category attached to an extracted span.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum EntityType {
    #[serde(rename = "ACTION ITEM", alias = "ACTION_ITEM")]
    ActionItem,
    #[serde(rename = "RELATIVE DAY", alias = "RELATIVE_DAY")]
    RelativeDay,
    #[serde(rename = "ABSOLUTE DAY", alias = "ABSOLUTE_DAY")]
    AbsoluteDay,
    #[serde(rename = "ABSOLUTE DATE", alias = "ABSOLUTE_DATE")]
    AbsoluteDate,
    /// Any label outside the set above; ignored by resolution.
    #[serde(other)]
    Unrecognized,
}

impl EntityType {
    /// Returns the label used by the NER service.
    pub fn as_label(self) -> &'static str {
        match self {
            Self::ActionItem => "ACTION ITEM",
            Self::RelativeDay => "RELATIVE DAY",
            Self::AbsoluteDay => "ABSOLUTE DAY",
            Self::AbsoluteDate => "ABSOLUTE DATE",
            Self::Unrecognized => "UNRECOGNIZED",
        }
    }
}

/// A typed span of text recognized in the input sentence.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Entity {
    pub text: String,
    /// Serialized as `type` to match the service payload.
    #[serde(rename = "type")]
    pub kind: EntityType,
}

impl Entity {
    pub fn new(text: impl Into<String>, kind: EntityType) -> Self {
        Self {
            text: text.into(),
            kind,
        }
    }
}

/// Response envelope of `POST /ner`.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct NerResponse {
    pub success: bool,
    #[serde(default)]
    pub data: Vec<Entity>,
}

impl NerResponse {
    /// Returns the entity list only when the response passes the caller gate.
    ///
    /// # Contract
    /// - `success` must be `true`.
    /// - Exactly [`RESOLVABLE_ENTITY_COUNT`] entities must be present.
    pub fn resolvable_entities(&self) -> Option<&[Entity]> {
        if self.success && self.data.len() == RESOLVABLE_ENTITY_COUNT {
            Some(self.data.as_slice())
        } else {
            None
        }
    }
}

/// Status envelope of `GET /` on the NER service.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NerStatus {
    pub success: bool,
    #[serde(default)]
    pub message: String,
}

#[cfg(test)]
mod tests {
    use super::{Entity, EntityType, NerResponse};

    #[test]
    fn labels_accept_spaced_and_underscore_spellings() {
        let spaced: Entity =
            serde_json::from_str(r#"{"text":"call mom","type":"ACTION ITEM"}"#).unwrap();
        let underscored: Entity =
            serde_json::from_str(r#"{"text":"call mom","type":"ACTION_ITEM"}"#).unwrap();
        assert_eq!(spaced, underscored);
        assert_eq!(spaced.kind, EntityType::ActionItem);
    }

    #[test]
    fn serializes_with_service_label() {
        let json = serde_json::to_string(&Entity::new("friday", EntityType::RelativeDay)).unwrap();
        assert_eq!(json, r#"{"text":"friday","type":"RELATIVE DAY"}"#);
        assert_eq!(EntityType::RelativeDay.as_label(), "RELATIVE DAY");
    }

    #[test]
    fn gate_requires_success_and_exactly_two_entities() {
        let two = vec![
            Entity::new("Submit report", EntityType::ActionItem),
            Entity::new("next Monday", EntityType::RelativeDay),
        ];
        let ok = NerResponse {
            success: true,
            data: two.clone(),
        };
        assert_eq!(ok.resolvable_entities().map(<[Entity]>::len), Some(2));

        let failed = NerResponse {
            success: false,
            data: two.clone(),
        };
        assert!(failed.resolvable_entities().is_none());

        let mut three = two;
        three.push(Entity::new("2024-01-01", EntityType::AbsoluteDate));
        let too_many = NerResponse {
            success: true,
            data: three,
        };
        assert!(too_many.resolvable_entities().is_none());
    }

    #[test]
    fn unknown_labels_decode_as_unrecognized() {
        let entity: Entity = serde_json::from_str(r#"{"text":"Ada","type":"PERSON"}"#).unwrap();
        assert_eq!(entity.kind, EntityType::Unrecognized);
    }

    #[test]
    fn missing_data_defaults_to_empty() {
        let response: NerResponse = serde_json::from_str(r#"{"success":false}"#).unwrap();
        assert!(response.data.is_empty());
    }
}
