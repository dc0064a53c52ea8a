//! Load orchestration: extract, convert, persist.
//!
//! # Example
//!
//! ```rust,ignore
//! use efload::config::LoaderConfig;
//! use efload::loader::Loader;
//!
//! let mut loader = Loader::open(LoaderConfig::load(None)?)?;
//! let summary = loader.load_all();
//! println!("{} records persisted", summary.total_persisted());
//! ```

pub mod report;

use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::Value;

use crate::api::logs::{log_error, log_info, log_success, log_warning};
use crate::config::{DatasetSpec, LoaderConfig};
use crate::convert::{ConversionTables, MappedSource, ModelConverter, NoTranslations, TranslationBook, Translator};
use crate::error::{LoadError, LoadResult};
use crate::extract::{extract_file, Extraction};
use crate::models::{
    ArtifactSetXml, ArtifactXml, DatasetKind, PetSkillXml, PetXml, Translation, TranslationXml, Tribe, UnitSkillXml,
    UnitXml,
};
use crate::store::{JsonStore, RecordStore};

pub use report::{BatchReport, DatasetStats, DatasetStatus, LoadSummary, RecordFailure};

/// Runs datasets through extraction, conversion and persistence.
pub struct Loader {
    config: LoaderConfig,
    tables: ConversionTables,
    store: Box<dyn RecordStore>,
    book: TranslationBook,
}

impl Loader {
    /// Loader over an existing store. Translations already stored are used for lookups.
    pub fn new(config: LoaderConfig, store: Box<dyn RecordStore>) -> Self {
        let mut loader = Self {
            config,
            tables: ConversionTables::new(),
            store,
            book: TranslationBook::new(),
        };
        loader.restore_translations();
        loader
    }

    /// Loader persisting to a [`JsonStore`] in the configured store directory.
    pub fn open(config: LoaderConfig) -> LoadResult<Self> {
        let store = JsonStore::open(&config.store_dir)?;
        Ok(Self::new(config, Box::new(store)))
    }

    pub fn config(&self) -> &LoaderConfig {
        &self.config
    }

    pub fn store(&self) -> &dyn RecordStore {
        self.store.as_ref()
    }

    pub fn translations(&self) -> &TranslationBook {
        &self.book
    }

    pub fn into_store(self) -> Box<dyn RecordStore> {
        self.store
    }

    fn restore_translations(&mut self) {
        let dataset = DatasetKind::Translations.name();
        let stored = self.store.page(dataset, 0, self.store.count(dataset));
        self.book.extend_from_records(&stored);
    }

    // =========================================================================
    // Stages
    // =========================================================================

    /// Extract the source records of one dataset.
    pub fn load_xml_data<S: DeserializeOwned>(&self, spec: &DatasetSpec) -> LoadResult<Extraction<S>> {
        let missing = || LoadError::MissingSource(spec.name.to_string());
        let file = self.config.source_file(spec).ok_or_else(missing)?;
        let path = spec.node_path().ok_or_else(missing)??;

        log_info(format!(
            "[Data Load {} Processing] - Initializing data from {} using path {}",
            spec.name,
            file.display(),
            path
        ));

        let extraction = extract_file::<S>(&file, &path)?;

        log_info(format!(
            "[Data Load {} Processing] - Loaded {} entities",
            spec.name,
            extraction.records.len()
        ));
        if !extraction.skipped.is_empty() {
            log_warning(format!(
                "[Data Load {} Processing] - Skipped {} unreadable nodes",
                spec.name,
                extraction.skipped.len()
            ));
        }

        Ok(extraction)
    }

    /// Convert a batch, skipping records that fail.
    pub fn convert_all<S: MappedSource>(&self, records: &[S], translator: &dyn Translator) -> BatchReport<S::Canonical> {
        let mapping = S::mapping();
        let stage = format!("[Data Load {} to {} Conversion]", mapping.source, mapping.destination);
        log_info(format!("{} - Converting models", stage));

        let converter = ModelConverter::new(&self.tables, translator);
        let mut report = BatchReport::new();

        for (index, record) in records.iter().enumerate() {
            match converter.convert_tagged(record, &format!("#{}", index)) {
                Ok(canonical) => report.converted.push(canonical),
                Err(error) => {
                    log_warning(format!("{} - Error converting record {}: {}", stage, index, error));
                    report.failures.push(RecordFailure { index, error });
                }
            }
        }

        log_info(format!("{} - Finished. {}", stage, report.summary()));
        report
    }

    /// Write canonical records to the store.
    ///
    /// Returns how many were written and how many the dataset holds afterwards.
    pub fn persist<C: Serialize>(&mut self, dataset: DatasetKind, records: &[C]) -> LoadResult<(usize, usize)> {
        log_info(format!("[Data Load {} Persist] - Persisting models", dataset));

        let values = records
            .iter()
            .map(serde_json::to_value)
            .collect::<Result<Vec<Value>, _>>()?;
        let written = self.store.persist(dataset.name(), values)?;
        let stored = self.store.count(dataset.name());

        log_info(format!(
            "[Data Load {} Persist] - Finished. Counted {} entities persisted",
            dataset, stored
        ));
        Ok((written, stored))
    }

    /// Extract, convert and persist one XML dataset, translating with the current book.
    pub fn load<S>(&mut self, spec: &DatasetSpec) -> LoadResult<DatasetStats>
    where
        S: MappedSource + DeserializeOwned,
    {
        let extraction = self.load_xml_data::<S>(spec)?;
        let report = self.convert_all(&extraction.records, &self.book);
        self.finish_dataset(spec.name, &extraction, &report)
    }

    fn finish_dataset<S, C: Serialize>(
        &mut self,
        dataset: DatasetKind,
        extraction: &Extraction<S>,
        report: &BatchReport<C>,
    ) -> LoadResult<DatasetStats> {
        let (persisted, stored) = self.persist(dataset, &report.converted)?;
        Ok(DatasetStats {
            extracted: extraction.records.len(),
            skipped: extraction.skipped.len(),
            converted: report.converted.len(),
            failed: report.failures.len(),
            persisted,
            stored,
            ..DatasetStats::new(dataset)
        })
    }

    // =========================================================================
    // Datasets
    // =========================================================================

    /// Persist the built-in tribes.
    pub fn load_tribes(&mut self) -> LoadResult<DatasetStats> {
        let tribes = Tribe::all();
        let (persisted, stored) = self.persist(DatasetKind::Tribes, &tribes)?;
        Ok(DatasetStats {
            extracted: tribes.len(),
            converted: tribes.len(),
            persisted,
            stored,
            ..DatasetStats::new(DatasetKind::Tribes)
        })
    }

    /// Load the translation book. Later datasets translate their fields with it.
    pub fn load_translations(&mut self, spec: &DatasetSpec) -> LoadResult<DatasetStats> {
        let extraction = self.load_xml_data::<TranslationXml>(spec)?;
        let report = self.convert_all(&extraction.records, &NoTranslations);

        self.book.extend_from_translations(&report.converted);
        log_success(format!("Translation book holds {} entries", self.book.len()));

        self.finish_dataset(spec.name, &extraction, &report)
    }

    /// Load one dataset following its configured spec.
    pub fn load_dataset(&mut self, kind: DatasetKind) -> LoadResult<DatasetStats> {
        let spec = self
            .config
            .dataset(kind)
            .cloned()
            .unwrap_or_else(|| DatasetSpec::new(kind));

        match kind {
            DatasetKind::Tribes => self.load_tribes(),
            DatasetKind::Translations => self.load_translations(&spec),
            DatasetKind::UnitSkills => self.load::<UnitSkillXml>(&spec),
            DatasetKind::PetSkills => self.load::<PetSkillXml>(&spec),
            DatasetKind::Pets => self.load::<PetXml>(&spec),
            DatasetKind::Units => self.load::<UnitXml>(&spec),
            DatasetKind::Artifacts => self.load::<ArtifactXml>(&spec),
            DatasetKind::ArtifactSets => self.load::<ArtifactSetXml>(&spec),
        }
    }

    /// Load every enabled dataset in load order.
    ///
    /// A dataset that fails is logged and recorded; the run continues with the next one.
    pub fn load_all(&mut self) -> LoadSummary {
        let mut summary = LoadSummary::begin();
        log_info(format!("Data load beginning (run {})", summary.run_id));

        for kind in DatasetKind::LOAD_ORDER {
            let enabled = self.config.dataset(kind).map_or(true, |spec| spec.enabled);
            if !enabled {
                log_info(format!("[Data Load {}] Disabled, skipping", kind));
                summary.datasets.push(DatasetStats::disabled(kind));
                continue;
            }

            match self.load_dataset(kind) {
                Ok(stats) => summary.datasets.push(stats),
                Err(e) => {
                    log_error(format!("[Data Load {}] Unable to load: {}", kind, e));
                    summary.datasets.push(DatasetStats::failed(kind, e));
                }
            }
        }

        let summary = summary.finish();
        log_success(format!(
            "Data load complete: {} records persisted, {} conversion failures, {} datasets failed",
            summary.total_persisted(),
            summary.total_failures(),
            summary.failed_datasets().len()
        ));
        summary
    }
}

impl TranslationBook {
    /// Add converted translations. Entries without an id are ignored.
    pub fn extend_from_translations(&mut self, translations: &[Translation]) {
        for translation in translations {
            if let Some(id) = &translation.id {
                self.insert(id.clone(), translation.text.clone().unwrap_or_default());
            }
        }
    }

    /// Add translations read back from the store.
    pub fn extend_from_records(&mut self, records: &[Value]) {
        for record in records {
            if let Some(id) = record.get("id").and_then(Value::as_str) {
                let text = record.get("text").and_then(Value::as_str).unwrap_or_default();
                self.insert(id, text);
            }
        }
    }
}
