//! Canonical records, the normalized shape persisted by the store.

use serde::{Deserialize, Serialize};

/// A playable unit.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Unit {
    pub id: Option<i32>,
    pub name: Option<String>,
    pub description: Option<String>,
    pub tribe_id: Option<i32>,
    pub grade: Option<i16>,
    pub kind: Option<String>,
    pub attack_type: Option<String>,
    pub attack: Option<i64>,
    pub hp: Option<i64>,
    pub attack_speed: Option<f64>,
    pub move_speed: Option<f32>,
    pub range: Option<f32>,
    pub ability_code1: Option<String>,
    pub ability_code2: Option<String>,
    pub ability_code3: Option<String>,
    pub evolves_to: Option<i32>,
    pub summonable: Option<bool>,
    pub tags: Option<Vec<String>>,
}

crate::canonical_record!(Unit, [
    id, name, description, tribe_id, grade, kind, attack_type, attack, hp, attack_speed,
    move_speed, range, ability_code1, ability_code2, ability_code3, evolves_to, summonable, tags,
]);

/// A unit ability.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UnitSkill {
    pub id: Option<String>,
    pub name: Option<String>,
    pub description: Option<String>,
    pub kind: Option<String>,
    pub value: Option<f64>,
    pub duration: Option<f32>,
    pub cooldown: Option<f32>,
    pub targets: Option<Vec<String>>,
}

crate::canonical_record!(UnitSkill, [id, name, description, kind, value, duration, cooldown, targets]);

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Pet {
    pub id: Option<i32>,
    pub name: Option<String>,
    pub grade: Option<i16>,
    pub kind: Option<String>,
    pub ability_code1: Option<String>,
    pub ability_code2: Option<String>,
    pub bonus_value: Option<f64>,
    pub tags: Option<Vec<String>>,
}

crate::canonical_record!(Pet, [id, name, grade, kind, ability_code1, ability_code2, bonus_value, tags]);

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PetSkill {
    pub id: Option<String>,
    pub name: Option<String>,
    pub description: Option<String>,
    pub value: Option<f64>,
    pub max_level: Option<i16>,
}

crate::canonical_record!(PetSkill, [id, name, description, value, max_level]);

/// A collectible artifact (a "treasure" in the game files).
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Artifact {
    pub id: Option<i32>,
    pub name: Option<String>,
    pub description: Option<String>,
    pub rank: Option<i32>,
    pub set_id: Option<i32>,
    pub max_level: Option<i16>,
    pub ability_code1: Option<String>,
    pub ability_code2: Option<String>,
    pub ability_code3: Option<String>,
    pub ability_value1: Option<f64>,
    pub ability_value2: Option<f64>,
    pub ability_value3: Option<f64>,
    pub hidden: Option<bool>,
}

crate::canonical_record!(Artifact, [
    id, name, description, rank, set_id, max_level, ability_code1, ability_code2,
    ability_code3, ability_value1, ability_value2, ability_value3, hidden,
]);

/// Artifacts granting a bonus when collected together.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ArtifactSet {
    pub id: Option<i32>,
    pub name: Option<String>,
    pub members: Option<Vec<i32>>,
    pub ability_code: Option<String>,
    pub ability_value: Option<f64>,
}

crate::canonical_record!(ArtifactSet, [id, name, members, ability_code, ability_value]);

/// One localized text.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Translation {
    pub id: Option<String>,
    pub text: Option<String>,
}

crate::canonical_record!(Translation, [id, text]);

/// A unit tribe. Tribes are fixed and not read from XML.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Tribe {
    pub id: i32,
    pub name: String,
}

impl Tribe {
    pub fn new(id: i32, name: impl Into<String>) -> Self {
        Self { id, name: name.into() }
    }

    /// The five tribes of the game.
    pub fn all() -> Vec<Tribe> {
        vec![
            Tribe::new(1, "Human"),
            Tribe::new(2, "Elf"),
            Tribe::new(3, "Undead"),
            Tribe::new(4, "Orc"),
            Tribe::new(5, "Dungeon"),
        ]
    }
}
