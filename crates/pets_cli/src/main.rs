//! Command-line caller for the pet records core.
//!
//! # Responsibility
//! - Map catalog actions (list, add sample pet, delete all) onto provider calls.
//! - Keep output deterministic for scripting.
//! - Flags override `PETS_*` environment variables, which override defaults.

use anyhow::{bail, Context, Result};
use clap::{Args, Parser, Subcommand};
use log::info;
use pets_core::{
    init_logging, Gender, Locator, PetField, PetProvider, PetRecord, PetValues, PetsConfig,
    Selection, SqliteStorage,
};
use std::path::PathBuf;

#[derive(Debug, Parser)]
#[command(name = "pets", version, about = "Manage pet records in a local SQLite database")]
struct Cli {
    /// Database file (default `pets.db`); `:memory:` keeps data for this run only.
    #[arg(long, global = true)]
    db: Option<PathBuf>,

    #[arg(long, global = true)]
    authority: Option<String>,

    #[arg(long, global = true)]
    log_level: Option<String>,

    /// Absolute directory for rolling log files.
    #[arg(long, global = true)]
    log_dir: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// List every pet.
    List {
        #[arg(long)]
        json: bool,
    },
    /// Show one pet by id.
    Get { id: i64 },
    /// Insert a new pet.
    Insert(InsertArgs),
    /// Insert the sample pet (Toto, Terrier, male, 7).
    InsertDummy,
    /// Update fields of one pet; omitted fields stay unchanged.
    Update(UpdateArgs),
    /// Delete one pet, or every pet when no id is given.
    Delete { id: Option<i64> },
    /// Delete every pet.
    DeleteAll,
    /// Print the content type of a locator.
    Type { locator: String },
    /// Health check.
    Ping,
}

#[derive(Debug, Args)]
struct InsertArgs {
    #[arg(long)]
    name: String,
    #[arg(long)]
    breed: Option<String>,
    /// unknown|male|female or 0|1|2
    #[arg(long, value_parser = parse_gender)]
    gender: Gender,
    #[arg(long)]
    weight: Option<i64>,
}

#[derive(Debug, Args)]
struct UpdateArgs {
    id: i64,
    #[arg(long)]
    name: Option<String>,
    #[arg(long)]
    breed: Option<String>,
    #[arg(long, value_parser = parse_gender)]
    gender: Option<Gender>,
    #[arg(long)]
    weight: Option<i64>,
}

fn parse_gender(value: &str) -> Result<Gender, String> {
    let value = value.trim().to_ascii_lowercase();
    let parsed = match value.as_str() {
        "unknown" => Some(Gender::Unknown),
        "male" => Some(Gender::Male),
        "female" => Some(Gender::Female),
        code => code.parse().ok().and_then(Gender::from_code),
    };
    parsed.ok_or_else(|| format!("unknown gender `{value}`; expected unknown|male|female|0|1|2"))
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    let config = build_config(&cli)?;

    if let Some(log_dir) = &config.log_dir {
        init_logging(&config.log_level, log_dir)
            .map_err(anyhow::Error::msg)
            .context("failed to initialize logging")?;
    }

    let provider = config
        .open_provider()
        .context("failed to open pet provider")?;
    info!("event=cli_command module=cli status=start");
    run(&provider, cli.command)
}

fn build_config(cli: &Cli) -> Result<PetsConfig> {
    apply_flags(cli, PetsConfig::from_env())
}

fn apply_flags(cli: &Cli, mut config: PetsConfig) -> Result<PetsConfig> {
    if let Some(db) = &cli.db {
        config.db_path = db.clone();
    }
    if let Some(authority) = &cli.authority {
        config.authority = authority.clone();
    }
    if let Some(level) = &cli.log_level {
        config.log_level = level.clone();
    }
    if let Some(log_dir) = &cli.log_dir {
        config.log_dir = Some(log_dir.clone());
    }
    config.validate().context("invalid configuration")?;
    Ok(config)
}

fn run(provider: &PetProvider<SqliteStorage>, command: Command) -> Result<()> {
    match command {
        Command::List { json } => {
            let pets = provider.list_pets()?;
            if json {
                println!("{}", serde_json::to_string_pretty(&pets)?);
            } else {
                println!("The pets table contains {} pets.", pets.len());
                println!("_id - name - breed - gender - weight");
                for pet in &pets {
                    println!("{}", format_pet(pet));
                }
            }
        }
        Command::Get { id } => match provider.get_pet(id)? {
            Some(pet) => println!("{}", format_pet(&pet)),
            None => bail!("no pet with id {id}"),
        },
        Command::Insert(args) => {
            let values = PetValues::new_pet(args.name, args.breed, args.gender, args.weight);
            let created = provider.insert(&provider.router().collection_locator(), &values)?;
            println!("{created}");
        }
        Command::InsertDummy => {
            let created = provider.insert_dummy_pet()?;
            println!("{created}");
        }
        Command::Update(args) => {
            let mut values = PetValues::new();
            if let Some(name) = args.name {
                values.put(PetField::Name, name);
            }
            if let Some(breed) = args.breed {
                values.put(PetField::Breed, breed);
            }
            if let Some(gender) = args.gender {
                values.put(PetField::Gender, gender);
            }
            if let Some(weight) = args.weight {
                values.put(PetField::Weight, weight);
            }
            let locator = provider.router().item_locator(args.id);
            let changed = provider.update(&locator, &values, Selection::all())?;
            println!("{changed}");
        }
        Command::Delete { id } => {
            let locator = match id {
                Some(id) => provider.router().item_locator(id),
                None => provider.router().collection_locator(),
            };
            println!("{}", provider.delete(&locator, Selection::all())?);
        }
        Command::DeleteAll => {
            println!("{}", provider.delete_all_pets()?);
        }
        Command::Type { locator } => {
            let content_type = provider.get_type(&Locator::new(locator))?;
            println!(
                "{} {}",
                content_type,
                content_type.mime_type(provider.router().authority())
            );
        }
        Command::Ping => {
            println!("pets_core ping={}", pets_core::ping());
            println!("pets_core version={}", pets_core::core_version());
        }
    }
    Ok(())
}

fn format_pet(pet: &PetRecord) -> String {
    format!(
        "{} - {} - {} - {} - {}",
        pet.id,
        pet.name,
        pet.breed.as_deref().unwrap_or(""),
        pet.gender,
        pet.weight
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use pets_core::config::MEMORY_DB_PATH;

    fn parse(args: &[&str]) -> Cli {
        Cli::try_parse_from(std::iter::once("pets").chain(args.iter().copied())).unwrap()
    }

    #[test]
    fn parse_gender_accepts_names_and_codes() {
        assert_eq!(parse_gender("Male"), Ok(Gender::Male));
        assert_eq!(parse_gender("2"), Ok(Gender::Female));
        assert_eq!(parse_gender("0"), Ok(Gender::Unknown));
        assert!(parse_gender("3").is_err());
        assert!(parse_gender("cat").is_err());
    }

    #[test]
    fn cli_definition_is_consistent() {
        use clap::CommandFactory;
        Cli::command().debug_assert();
    }

    #[test]
    fn update_command_runs_against_memory_provider() {
        let cli = parse(&["--db", MEMORY_DB_PATH, "list"]);
        let config = apply_flags(&cli, PetsConfig::default()).unwrap();
        assert!(config.is_in_memory());
        let provider = config.open_provider().unwrap();
        let created = provider.insert_dummy_pet().unwrap();
        let id = created.parse_id().unwrap();

        let command = Command::Update(UpdateArgs {
            id,
            name: None,
            breed: None,
            gender: None,
            weight: Some(9),
        });
        run(&provider, command).unwrap();
        assert_eq!(provider.get_pet(id).unwrap().unwrap().weight, 9);
    }

    #[test]
    fn default_config_targets_database_file() {
        let cli = parse(&["list"]);
        let config = apply_flags(&cli, PetsConfig::default()).unwrap();
        assert_eq!(config.db_path, PathBuf::from("pets.db"));
        assert!(!config.is_in_memory());
    }

    #[test]
    fn flags_override_base_config() {
        let base = PetsConfig {
            authority: "org.example.env".to_string(),
            log_level: "debug".to_string(),
            ..PetsConfig::default()
        };
        let cli = parse(&["--authority", "org.example.flag", "ping"]);
        let config = apply_flags(&cli, base).unwrap();
        assert_eq!(config.authority, "org.example.flag");
        assert_eq!(config.log_level, "debug");

        let cli = parse(&["--authority", "a/b", "ping"]);
        assert!(apply_flags(&cli, PetsConfig::default()).is_err());
    }

    #[test]
    fn separate_runs_share_the_database_file() {
        let dir = tempfile::tempdir().unwrap();
        let db = dir.path().join("pets.db");
        let db = db.to_str().unwrap();

        let first = parse(&["--db", db, "insert-dummy"]);
        let config = apply_flags(&first, PetsConfig::default()).unwrap();
        run(&config.open_provider().unwrap(), first.command).unwrap();

        let second = parse(&["--db", db, "update", "1", "--weight", "9"]);
        let config = apply_flags(&second, PetsConfig::default()).unwrap();
        run(&config.open_provider().unwrap(), second.command).unwrap();

        let provider = config.open_provider().unwrap();
        let pets = provider.list_pets().unwrap();
        assert_eq!(pets.len(), 1);
        assert_eq!(pets[0].name, "Toto");
        assert_eq!(pets[0].weight, 9);
    }

    #[test]
    fn format_pet_lists_fields_in_column_order() {
        let pet = PetRecord {
            id: 1,
            name: "Toto".to_string(),
            breed: None,
            gender: Gender::Male,
            weight: 7,
        };
        assert_eq!(format_pet(&pet), "1 - Toto -  - male - 7");
    }
}
