//! Source records as extracted from the game's XML books.
//!
//! Every field is optional text. Typing happens in conversion, driven by each type's
//! mapping descriptor.

use once_cell::sync::Lazy;
use serde::{Deserialize, Serialize};

use super::canonical::{Artifact, ArtifactSet, Pet, PetSkill, Translation, Unit, UnitSkill};
use crate::convert::{FieldMapping, MappedSource, MappingDescriptor, ScalarKind, TypeHint};

// =============================================================================
// Units
// =============================================================================

/// `<unit>` node of `unitbook.xml`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct UnitXml {
    pub id: Option<String>,
    pub name: Option<String>,
    pub desc: Option<String>,
    pub tribe: Option<String>,
    pub grade: Option<String>,
    #[serde(rename = "type")]
    pub unit_type: Option<String>,
    pub attack_type: Option<String>,
    pub attack: Option<String>,
    pub hp: Option<String>,
    pub attack_speed: Option<String>,
    pub move_speed: Option<String>,
    pub range: Option<String>,
    pub skill_code1: Option<String>,
    pub skill_code2: Option<String>,
    pub skill_code3: Option<String>,
    pub evolve_id: Option<String>,
    pub summonable: Option<String>,
    pub tags: Option<String>,
}

crate::source_record!(UnitXml, [
    id, name, desc, tribe, grade, unit_type, attack_type, attack, hp, attack_speed,
    move_speed, range, skill_code1, skill_code2, skill_code3, evolve_id, summonable, tags,
]);

static UNIT_MAPPING: Lazy<MappingDescriptor> = Lazy::new(|| {
    MappingDescriptor::new("UnitXml", "Unit")
        .field(FieldMapping::new("id"))
        .field(FieldMapping::new("name").translate("UNIT_NAME_{id}"))
        .field(FieldMapping::new("desc").maps_to("description").translate("UNIT_DESC_{id}"))
        .field(FieldMapping::new("tribe").maps_to("tribe_id"))
        .field(FieldMapping::new("grade"))
        .field(FieldMapping::new("unit_type").maps_to("kind"))
        .field(FieldMapping::new("attack_type"))
        .field(FieldMapping::new("attack"))
        .field(FieldMapping::new("hp"))
        .field(FieldMapping::new("attack_speed"))
        .field(FieldMapping::new("move_speed"))
        .field(FieldMapping::new("range"))
        .field(FieldMapping::new("skill_code1").maps_to("ability_code1"))
        .field(FieldMapping::new("skill_code2").maps_to("ability_code2"))
        .field(FieldMapping::new("skill_code3").maps_to("ability_code3"))
        .field(FieldMapping::new("evolve_id").maps_to("evolves_to"))
        .field(FieldMapping::new("summonable"))
        .field(FieldMapping::new("tags"))
});

impl MappedSource for UnitXml {
    type Canonical = Unit;

    fn mapping() -> &'static MappingDescriptor {
        &UNIT_MAPPING
    }
}

/// `<unitSkill>` node of `unitbook.xml`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct UnitSkillXml {
    pub id: Option<String>,
    pub name: Option<String>,
    pub desc: Option<String>,
    pub skill_type: Option<String>,
    pub value: Option<String>,
    pub duration: Option<String>,
    pub cooldown: Option<String>,
    pub targets: Option<String>,
}

crate::source_record!(UnitSkillXml, [id, name, desc, skill_type, value, duration, cooldown, targets]);

static UNIT_SKILL_MAPPING: Lazy<MappingDescriptor> = Lazy::new(|| {
    MappingDescriptor::new("UnitSkillXml", "UnitSkill")
        .field(FieldMapping::new("id"))
        .field(FieldMapping::new("name").translate("UNIT_SKILL_NAME_{id}"))
        .field(FieldMapping::new("desc").maps_to("description").translate("UNIT_SKILL_DESC_{id}"))
        .field(FieldMapping::new("skill_type").maps_to("kind"))
        .field(FieldMapping::new("value"))
        .field(FieldMapping::new("duration"))
        .field(FieldMapping::new("cooldown"))
        .field(FieldMapping::new("targets"))
});

impl MappedSource for UnitSkillXml {
    type Canonical = UnitSkill;

    fn mapping() -> &'static MappingDescriptor {
        &UNIT_SKILL_MAPPING
    }
}

// =============================================================================
// Pets
// =============================================================================

/// `<pet>` node of `petbook.xml`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct PetXml {
    pub id: Option<String>,
    pub name: Option<String>,
    pub grade: Option<String>,
    pub pet_type: Option<String>,
    pub skill_code1: Option<String>,
    pub skill_code2: Option<String>,
    pub bonus_value: Option<String>,
    pub tags: Option<String>,
}

crate::source_record!(PetXml, [id, name, grade, pet_type, skill_code1, skill_code2, bonus_value, tags]);

static PET_MAPPING: Lazy<MappingDescriptor> = Lazy::new(|| {
    MappingDescriptor::new("PetXml", "Pet")
        .field(FieldMapping::new("id"))
        .field(FieldMapping::new("name").translate("PET_NAME_{id}"))
        .field(FieldMapping::new("grade"))
        .field(FieldMapping::new("pet_type").maps_to("kind"))
        .field(FieldMapping::new("skill_code1").maps_to("ability_code1"))
        .field(FieldMapping::new("skill_code2").maps_to("ability_code2"))
        .field(FieldMapping::new("bonus_value"))
        .field(FieldMapping::new("tags"))
});

impl MappedSource for PetXml {
    type Canonical = Pet;

    fn mapping() -> &'static MappingDescriptor {
        &PET_MAPPING
    }
}

/// `<petSkill>` node of `petbook.xml`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct PetSkillXml {
    pub id: Option<String>,
    pub name: Option<String>,
    pub desc: Option<String>,
    pub value: Option<String>,
    pub max_level: Option<String>,
}

crate::source_record!(PetSkillXml, [id, name, desc, value, max_level]);

static PET_SKILL_MAPPING: Lazy<MappingDescriptor> = Lazy::new(|| {
    MappingDescriptor::new("PetSkillXml", "PetSkill")
        .field(FieldMapping::new("id"))
        .field(FieldMapping::new("name").translate("PET_SKILL_NAME_{id}"))
        .field(FieldMapping::new("desc").maps_to("description").translate("PET_SKILL_DESC_{id}"))
        .field(FieldMapping::new("value"))
        .field(FieldMapping::new("max_level"))
});

impl MappedSource for PetSkillXml {
    type Canonical = PetSkill;

    fn mapping() -> &'static MappingDescriptor {
        &PET_SKILL_MAPPING
    }
}

// =============================================================================
// Artifacts
// =============================================================================

/// `<treasure>` node of `treasurebook.xml`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ArtifactXml {
    pub id: Option<String>,
    pub name: Option<String>,
    pub desc: Option<String>,
    pub rank: Option<String>,
    pub set_id: Option<String>,
    pub max_level: Option<String>,
    pub skill_code1: Option<String>,
    pub skill_code2: Option<String>,
    pub skill_code3: Option<String>,
    pub skill_value1: Option<String>,
    pub skill_value2: Option<String>,
    pub skill_value3: Option<String>,
    pub hidden: Option<String>,
}

crate::source_record!(ArtifactXml, [
    id, name, desc, rank, set_id, max_level, skill_code1, skill_code2, skill_code3,
    skill_value1, skill_value2, skill_value3, hidden,
]);

static ARTIFACT_MAPPING: Lazy<MappingDescriptor> = Lazy::new(|| {
    MappingDescriptor::new("ArtifactXml", "Artifact")
        .field(FieldMapping::new("id"))
        .field(FieldMapping::new("name").translate("TREASURE_NAME_{id}"))
        .field(FieldMapping::new("desc").maps_to("description").translate("TREASURE_DESC_{id}"))
        // Ranks are stored wide but must fit the game's 16-bit range.
        .field(FieldMapping::new("rank").hint(TypeHint::Scalar(ScalarKind::Short)))
        .field(FieldMapping::new("set_id"))
        .field(FieldMapping::new("max_level"))
        .field(FieldMapping::new("skill_code1").maps_to("ability_code1"))
        .field(FieldMapping::new("skill_code2").maps_to("ability_code2"))
        .field(FieldMapping::new("skill_code3").maps_to("ability_code3"))
        .field(FieldMapping::new("skill_value1").maps_to("ability_value1"))
        .field(FieldMapping::new("skill_value2").maps_to("ability_value2"))
        .field(FieldMapping::new("skill_value3").maps_to("ability_value3"))
        .field(FieldMapping::new("hidden"))
});

impl MappedSource for ArtifactXml {
    type Canonical = Artifact;

    fn mapping() -> &'static MappingDescriptor {
        &ARTIFACT_MAPPING
    }
}

/// `<treasureSet>` node of `treasurebook.xml`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ArtifactSetXml {
    pub id: Option<String>,
    pub name: Option<String>,
    pub members: Option<String>,
    pub bonus_code: Option<String>,
    pub bonus_value: Option<String>,
}

crate::source_record!(ArtifactSetXml, [id, name, members, bonus_code, bonus_value]);

static ARTIFACT_SET_MAPPING: Lazy<MappingDescriptor> = Lazy::new(|| {
    MappingDescriptor::new("ArtifactSetXml", "ArtifactSet")
        .field(FieldMapping::new("id"))
        .field(FieldMapping::new("name").translate("TREASURE_SET_NAME_{id}"))
        .field(FieldMapping::new("members"))
        .field(FieldMapping::new("bonus_code").maps_to("ability_code"))
        .field(FieldMapping::new("bonus_value").maps_to("ability_value"))
});

impl MappedSource for ArtifactSetXml {
    type Canonical = ArtifactSet;

    fn mapping() -> &'static MappingDescriptor {
        &ARTIFACT_SET_MAPPING
    }
}

// =============================================================================
// Translations
// =============================================================================

/// `<text>` node of the translation book, e.g. `<text id="UNIT_NAME_1">Knight</text>`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct TranslationXml {
    pub id: Option<String>,
    pub value: Option<String>,
}

crate::source_record!(TranslationXml, [id, value]);

static TRANSLATION_MAPPING: Lazy<MappingDescriptor> = Lazy::new(|| {
    MappingDescriptor::new("TranslationXml", "Translation")
        .field(FieldMapping::new("id"))
        .field(FieldMapping::new("value").maps_to("text"))
});

impl MappedSource for TranslationXml {
    type Canonical = Translation;

    fn mapping() -> &'static MappingDescriptor {
        &TRANSLATION_MAPPING
    }
}

/// Every mapping descriptor, in load order.
pub fn all_mappings() -> Vec<&'static MappingDescriptor> {
    vec![
        TranslationXml::mapping(),
        UnitSkillXml::mapping(),
        PetSkillXml::mapping(),
        PetXml::mapping(),
        UnitXml::mapping(),
        ArtifactXml::mapping(),
        ArtifactSetXml::mapping(),
    ]
}
