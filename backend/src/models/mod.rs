//! Game data models for the efload pipeline.
//!
//! - [`source`] - loosely-typed records extracted from XML, with their mapping descriptors
//! - [`canonical`] - normalized records written to the store
//! - [`DatasetKind`] - the datasets a load run knows about

pub mod canonical;
pub mod source;

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::LoadError;

pub use canonical::{Artifact, ArtifactSet, Pet, PetSkill, Translation, Tribe, Unit, UnitSkill};
pub use source::{
    all_mappings, ArtifactSetXml, ArtifactXml, PetSkillXml, PetXml, TranslationXml, UnitSkillXml, UnitXml,
};

// =============================================================================
// Datasets
// =============================================================================

/// A named dataset, one per canonical record type.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DatasetKind {
    Tribes,
    Translations,
    UnitSkills,
    PetSkills,
    Pets,
    Units,
    Artifacts,
    ArtifactSets,
}

impl DatasetKind {
    /// Load order. Translations come before every dataset that translates fields.
    pub const LOAD_ORDER: [DatasetKind; 8] = [
        DatasetKind::Tribes,
        DatasetKind::Translations,
        DatasetKind::UnitSkills,
        DatasetKind::PetSkills,
        DatasetKind::Pets,
        DatasetKind::Units,
        DatasetKind::Artifacts,
        DatasetKind::ArtifactSets,
    ];

    pub fn name(&self) -> &'static str {
        match self {
            DatasetKind::Tribes => "tribes",
            DatasetKind::Translations => "translations",
            DatasetKind::UnitSkills => "unit_skills",
            DatasetKind::PetSkills => "pet_skills",
            DatasetKind::Pets => "pets",
            DatasetKind::Units => "units",
            DatasetKind::Artifacts => "artifacts",
            DatasetKind::ArtifactSets => "artifact_sets",
        }
    }

    /// Default XML file and node path, `None` for built-in datasets.
    pub fn default_source(&self) -> Option<(&'static str, &'static str)> {
        match self {
            DatasetKind::Tribes => None,
            DatasetKind::Translations => Some(("book.en.xml", "//text")),
            DatasetKind::UnitSkills => Some(("unitbook.xml", "//unitSkill")),
            DatasetKind::PetSkills => Some(("petbook.xml", "//petSkill")),
            DatasetKind::Pets => Some(("petbook.xml", "//pet")),
            DatasetKind::Units => Some(("unitbook.xml", "//unit")),
            DatasetKind::Artifacts => Some(("treasurebook.xml", "//treasure")),
            DatasetKind::ArtifactSets => Some(("treasurebook.xml", "//treasureSet")),
        }
    }
}

impl fmt::Display for DatasetKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for DatasetKind {
    type Err = LoadError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim().to_lowercase().replace('-', "_");
        DatasetKind::LOAD_ORDER
            .into_iter()
            .find(|kind| kind.name() == wanted)
            .ok_or_else(|| LoadError::UnknownDataset(s.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::convert::{CanonicalRecord, ConversionTables, MappedSource, ModelConverter, NoTranslations, TranslationBook};

    #[test]
    fn test_every_mapping_resolves() {
        assert!(UnitXml::mapping().unresolved_slots::<Unit>().is_empty());
        assert!(UnitSkillXml::mapping().unresolved_slots::<UnitSkill>().is_empty());
        assert!(PetXml::mapping().unresolved_slots::<Pet>().is_empty());
        assert!(PetSkillXml::mapping().unresolved_slots::<PetSkill>().is_empty());
        assert!(ArtifactXml::mapping().unresolved_slots::<Artifact>().is_empty());
        assert!(ArtifactSetXml::mapping().unresolved_slots::<ArtifactSet>().is_empty());
        assert!(TranslationXml::mapping().unresolved_slots::<Translation>().is_empty());
    }

    #[test]
    fn test_descriptors_name_their_canonical_type() {
        assert_eq!(UnitXml::mapping().destination, Unit::TYPE_NAME);
        assert_eq!(ArtifactSetXml::mapping().destination, ArtifactSet::TYPE_NAME);
        assert_eq!(all_mappings().len(), 7);
    }

    #[test]
    fn test_dataset_names_round_trip() {
        for kind in DatasetKind::LOAD_ORDER {
            assert_eq!(kind.name().parse::<DatasetKind>().unwrap(), kind);
        }
        assert_eq!("artifact-sets".parse::<DatasetKind>().unwrap(), DatasetKind::ArtifactSets);
        assert!("dragons".parse::<DatasetKind>().is_err());
    }

    #[test]
    fn test_translations_load_before_translated_datasets() {
        let position = |kind| DatasetKind::LOAD_ORDER.iter().position(|k| *k == kind).unwrap();
        assert!(position(DatasetKind::Translations) < position(DatasetKind::Units));
        assert!(position(DatasetKind::Translations) < position(DatasetKind::Artifacts));
    }

    #[test]
    fn test_unit_conversion() {
        let xml = UnitXml {
            id: Some("101".into()),
            name: Some("unit_101".into()),
            tribe: Some("2".into()),
            grade: Some("3".into()),
            unit_type: Some("ranged".into()),
            attack: Some("1200".into()),
            attack_speed: Some("1.25".into()),
            skill_code1: Some("skill_critical".into()),
            summonable: Some("Y".into()),
            tags: Some("archer|elf_ranger".into()),
            ..Default::default()
        };
        let book: TranslationBook = [("UNIT_NAME_101", "Elven Archer")].into_iter().collect();
        let tables = ConversionTables::new();
        let unit = ModelConverter::new(&tables, &book).convert(&xml).unwrap();

        assert_eq!(unit.id, Some(101));
        assert_eq!(unit.name.as_deref(), Some("Elven Archer"));
        assert_eq!(unit.description, None);
        assert_eq!(unit.tribe_id, Some(2));
        assert_eq!(unit.grade, Some(3));
        assert_eq!(unit.kind.as_deref(), Some("ranged"));
        assert_eq!(unit.attack, Some(1200));
        assert_eq!(unit.attack_speed, Some(1.25));
        assert_eq!(unit.ability_code1.as_deref(), Some("skill_critical"));
        assert_eq!(unit.summonable, Some(true));
        assert_eq!(unit.tags, Some(vec!["archer".to_string(), "elf_ranger".to_string()]));
    }

    #[test]
    fn test_artifact_set_members_and_rank_hint() {
        let tables = ConversionTables::new();
        let converter = ModelConverter::new(&tables, &NoTranslations);

        let set = ArtifactSetXml {
            id: Some("7".into()),
            members: Some("101#102#103".into()),
            ..Default::default()
        };
        let set = converter.convert(&set).unwrap();
        assert_eq!(set.members, Some(vec![101, 102, 103]));

        let artifact = ArtifactXml {
            id: Some("1".into()),
            rank: Some("70000".into()),
            ..Default::default()
        };
        let err = converter.convert(&artifact).unwrap_err();
        assert_eq!(err.field(), Some("rank"));
    }

    #[test]
    fn test_empty_artifact_skill_code_is_null() {
        let tables = ConversionTables::new();
        let converter = ModelConverter::new(&tables, &NoTranslations);
        let artifact = ArtifactXml {
            id: Some("1".into()),
            skill_code3: Some(String::new()),
            ..Default::default()
        };
        let artifact = converter.convert(&artifact).unwrap();
        assert_eq!(artifact.ability_code3, None);
    }

    #[test]
    fn test_tribes() {
        let tribes = Tribe::all();
        assert_eq!(tribes.len(), 5);
        assert_eq!(tribes[4], Tribe::new(5, "Dungeon"));
    }
}
