//! efload CLI - Load Endless Frontier XML books into the canonical store
//!
//! # Main Commands
//!
//! ```bash
//! efload load                          # Load every enabled dataset
//! efload load --dataset units          # Load a single dataset
//! efload serve                         # Start HTTP server (port 3000)
//! efload show units --id 1             # Print stored records
//! ```
//!
//! # Debug Commands (for development)
//!
//! ```bash
//! efload extract unitbook.xml //unit                  # Dump extracted nodes
//! efload convert unitbook.xml //unit --kind units     # Dump converted records
//! efload mappings                                     # Show every mapping descriptor
//! ```

use clap::{Parser, Subcommand};
use efload::extract::{extract_nodes, read_document};
use efload::models::{ArtifactSetXml, ArtifactXml, PetSkillXml, PetXml, TranslationXml, UnitSkillXml, UnitXml};
use efload::{
    all_mappings, extract_file, DatasetKind, JsonStore, LoadError, Loader, LoaderConfig, MappedSource, MemoryStore,
    NodePath, RecordStore, LOG_BROADCASTER,
};
use serde::de::DeserializeOwned;
use serde_json::Value;
use std::path::{Path, PathBuf};

type CliResult<T> = Result<T, Box<dyn std::error::Error>>;

#[derive(Parser)]
#[command(name = "efload")]
#[command(about = "Load Endless Frontier game data from XML books into a canonical store", long_about = None)]
struct Cli {
    /// Config file (default: ./efload.json if present)
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Directory holding the XML books
    #[arg(long, global = true)]
    data_dir: Option<PathBuf>,

    /// Directory of the JSON store
    #[arg(long, global = true)]
    store_dir: Option<PathBuf>,

    /// Emit debug log entries
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Extract, convert and persist datasets
    Load {
        /// Load only this dataset (e.g. units, unit_skills)
        #[arg(short, long)]
        dataset: Option<DatasetKind>,

        /// Run without writing to the store
        #[arg(long)]
        dry_run: bool,
    },

    /// Dump the nodes a path selects from an XML file, as JSON
    Extract {
        /// Input XML file
        file: PathBuf,

        /// Node path, e.g. //unit or /unitbook/unit
        path: NodePath,
    },

    /// Convert the records of an XML file and dump them as JSON
    Convert {
        /// Input XML file
        file: PathBuf,

        /// Node path, e.g. //unit
        path: NodePath,

        /// Dataset the records belong to
        #[arg(short, long)]
        kind: DatasetKind,
    },

    /// Show every mapping descriptor
    Mappings,

    /// Print stored records
    Show {
        /// Dataset name
        dataset: DatasetKind,

        /// Print only the record with this id
        #[arg(long)]
        id: Option<String>,

        #[arg(long, default_value = "0")]
        offset: usize,

        #[arg(long, default_value = "50")]
        limit: usize,
    },

    /// Start HTTP server
    Serve {
        /// Port to listen on
        #[arg(short, long, default_value = "3000")]
        port: u16,
    },
}

#[tokio::main]
async fn main() {
    // Load .env file (if present)
    dotenvy::dotenv().ok();

    let cli = Cli::parse();

    let result = match build_config(&cli) {
        Ok(config) => {
            LOG_BROADCASTER.set_verbose(config.verbose);
            run(cli.command, config).await
        }
        Err(e) => Err(e),
    };

    if let Err(e) = result {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}

/// Defaults, config file and environment, then command line flags.
fn build_config(cli: &Cli) -> CliResult<LoaderConfig> {
    let mut config = LoaderConfig::load(cli.config.as_deref())?;
    if let Some(dir) = &cli.data_dir {
        config.data_dir = dir.clone();
    }
    if let Some(dir) = &cli.store_dir {
        config.store_dir = dir.clone();
    }
    config.verbose |= cli.verbose;
    Ok(config)
}

async fn run(command: Commands, config: LoaderConfig) -> CliResult<()> {
    match command {
        Commands::Load { dataset, dry_run } => cmd_load(config, dataset, dry_run),
        Commands::Extract { file, path } => cmd_extract(&file, &path),
        Commands::Convert { file, path, kind } => cmd_convert(config, &file, &path, kind),
        Commands::Mappings => cmd_mappings(),
        Commands::Show {
            dataset,
            id,
            offset,
            limit,
        } => cmd_show(&config, dataset, id.as_deref(), offset, limit),
        Commands::Serve { port } => cmd_serve(config, port).await,
    }
}

fn cmd_load(config: LoaderConfig, dataset: Option<DatasetKind>, dry_run: bool) -> CliResult<()> {
    let mut loader = if dry_run {
        eprintln!("Dry run: nothing will be written to {}", config.store_dir.display());
        Loader::new(config.clone(), Box::new(dry_run_store(&config)?))
    } else {
        Loader::open(config)?
    };

    match dataset {
        Some(kind) => {
            let stats = loader.load_dataset(kind)?;
            print_json(&stats)?;
        }
        None => {
            let summary = loader.load_all();
            print_json(&summary)?;
            let failed = summary.failed_datasets();
            if !failed.is_empty() {
                let names: Vec<String> = failed.iter().map(ToString::to_string).collect();
                return Err(format!("{} datasets failed: {}", failed.len(), names.join(", ")).into());
            }
        }
    }

    Ok(())
}

/// In-memory store seeded with the stored translations, so dry runs still translate.
fn dry_run_store(config: &LoaderConfig) -> CliResult<MemoryStore> {
    let mut memory = MemoryStore::new();
    if config.store_dir.is_dir() {
        let stored = JsonStore::open(&config.store_dir)?;
        let dataset = DatasetKind::Translations.name();
        let translations = stored.page(dataset, 0, stored.count(dataset));
        if !translations.is_empty() {
            memory.persist(dataset, translations)?;
        }
    }
    Ok(memory)
}

fn cmd_extract(file: &Path, path: &NodePath) -> CliResult<()> {
    eprintln!("Extracting {} from {}", path, file.display());

    let (xml, encoding) = read_document(file)?;
    let nodes = extract_nodes(&xml, path)?;
    eprintln!("   Encoding: {}", encoding);
    eprintln!("   Nodes: {}", nodes.len());

    print_json(&nodes)
}

fn cmd_convert(config: LoaderConfig, file: &Path, path: &NodePath, kind: DatasetKind) -> CliResult<()> {
    let loader = Loader::open(config)?;
    eprintln!(
        "Converting {} from {} ({} translations available)",
        kind,
        file.display(),
        loader.translations().len()
    );

    let records = match kind {
        DatasetKind::Translations => convert_file::<TranslationXml>(&loader, file, path)?,
        DatasetKind::UnitSkills => convert_file::<UnitSkillXml>(&loader, file, path)?,
        DatasetKind::PetSkills => convert_file::<PetSkillXml>(&loader, file, path)?,
        DatasetKind::Pets => convert_file::<PetXml>(&loader, file, path)?,
        DatasetKind::Units => convert_file::<UnitXml>(&loader, file, path)?,
        DatasetKind::Artifacts => convert_file::<ArtifactXml>(&loader, file, path)?,
        DatasetKind::ArtifactSets => convert_file::<ArtifactSetXml>(&loader, file, path)?,
        DatasetKind::Tribes => return Err(LoadError::MissingSource(kind.to_string()).into()),
    };

    print_json(&records)
}

fn convert_file<S>(loader: &Loader, file: &Path, path: &NodePath) -> CliResult<Vec<Value>>
where
    S: MappedSource + DeserializeOwned,
{
    let extraction = extract_file::<S>(file, path)?;
    eprintln!("   {}", extraction.summary());

    let report = loader.convert_all(&extraction.records, loader.translations());
    eprintln!("   Converted: {}", report.summary());

    let records = report
        .converted
        .iter()
        .map(serde_json::to_value)
        .collect::<Result<Vec<_>, _>>()?;
    Ok(records)
}

fn cmd_mappings() -> CliResult<()> {
    print_json(&all_mappings())
}

fn cmd_show(config: &LoaderConfig, dataset: DatasetKind, id: Option<&str>, offset: usize, limit: usize) -> CliResult<()> {
    let store = JsonStore::open(&config.store_dir)?;

    match id {
        Some(id) => {
            let record = store
                .find(dataset.name(), id)
                .ok_or_else(|| format!("No {} record with id {}", dataset, id))?;
            print_json(&record)
        }
        None => {
            eprintln!("{}: {} records stored", dataset, store.count(dataset.name()));
            print_json(&store.page(dataset.name(), offset, limit))
        }
    }
}

async fn cmd_serve(config: LoaderConfig, port: u16) -> CliResult<()> {
    let loader = Loader::open(config)?;
    efload::server::start_server(loader, port).await?;
    Ok(())
}

fn print_json<T: serde::Serialize + ?Sized>(value: &T) -> CliResult<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}
