//! Guesses which vertex attributes carry position, normal and UV data.
//!
//! Captures only record layouts, not semantics. These rules encode the
//! layouts engines use in practice:
//!
//! - `3 x f32` or `3 x u16` (unnormalized) → position
//! - `3 x i8` / `3 x i16`, normalized → normal
//! - `2 x u8` / `2 x u16`, normalized → UV
//!
//! Rules are evaluated in that order and the first match wins, both per
//! attribute and per role (lowest slot index first).

use itertools::Itertools;

use crate::scalar::ComponentType;
use crate::trace::VertexAttribute;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AttributeRole {
    Position,
    Normal,
    TexCoord,
    Unclassified,
}

struct Rule {
    role: AttributeRole,
    size: u32,
    accepts: fn(ComponentType, bool) -> bool,
}

const RULES: [Rule; 3] = [
    Rule {
        role: AttributeRole::Position,
        size: 3,
        accepts: |ty, normalized| {
            ty == ComponentType::F32 || (ty == ComponentType::U16 && !normalized)
        },
    },
    Rule {
        role: AttributeRole::Normal,
        size: 3,
        accepts: |ty, normalized| {
            normalized && matches!(ty, ComponentType::I8 | ComponentType::I16)
        },
    },
    Rule {
        role: AttributeRole::TexCoord,
        size: 2,
        accepts: |ty, normalized| {
            normalized && matches!(ty, ComponentType::U8 | ComponentType::U16)
        },
    },
];

pub fn classify_attribute(attr: &VertexAttribute) -> AttributeRole {
    let Some(&ty) = attr.component_type.known() else {
        return AttributeRole::Unclassified;
    };
    RULES
        .iter()
        .find(|rule| rule.size == attr.size && (rule.accepts)(ty, attr.normalized))
        .map_or(AttributeRole::Unclassified, |rule| rule.role)
}

/// The attribute picked for each role, if any.
#[derive(Debug, Clone, Copy, Default)]
pub struct Classification<'a> {
    pub position: Option<&'a VertexAttribute>,
    pub normal: Option<&'a VertexAttribute>,
    pub tex_coord: Option<&'a VertexAttribute>,
}

pub fn classify(attributes: &[VertexAttribute]) -> Classification<'_> {
    let mut out = Classification::default();
    for attr in attributes.iter().sorted_by_key(|a| a.index) {
        let slot = match classify_attribute(attr) {
            AttributeRole::Position => &mut out.position,
            AttributeRole::Normal => &mut out.normal,
            AttributeRole::TexCoord => &mut out.tex_coord,
            AttributeRole::Unclassified => continue,
        };
        slot.get_or_insert(attr);
    }
    out
}
