//! Command-line front end for the contact book.
//!
//! # Responsibility
//! - Single initialization path: config, logging, database, registries.
//! - Map subcommands onto registry operations and print the results.

use anyhow::{bail, Context};
use clap::{Parser, Subcommand};
use contactbook_core::db::open_db;
use contactbook_core::{
    core_version, init_from_config, Contact, ContactPatch, ContactRegistry, CoreConfig, Group,
    GroupPatch, GroupRegistry, SqliteKvStore, StorageAdapter,
};
use log::info;
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(name = "contactbook", version, about = "Contact book CLI")]
struct Cli {
    #[arg(long, global = true, help = "SQLite store path (overrides CONTACTBOOK_DB_PATH)")]
    db: Option<PathBuf>,
    #[arg(long, global = true, help = "Output machine-readable JSON")]
    json: bool,
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    Group {
        #[command(subcommand)]
        command: GroupCommands,
    },
    Contact {
        #[command(subcommand)]
        command: ContactCommands,
    },
    /// Print the JSON export envelope.
    Export,
    /// Replace all contacts with the ones in an export file.
    Import { file: PathBuf },
    Version,
}

#[derive(Subcommand, Debug)]
enum GroupCommands {
    Add { name: String },
    List,
    Rename { id: String, name: String },
    Remove { id: String },
}

#[derive(Subcommand, Debug)]
enum ContactCommands {
    Add {
        name: String,
        phone: String,
        #[arg(long, help = "Group name")]
        group: Option<String>,
    },
    List {
        #[arg(long, help = "Only contacts of this group name")]
        group: Option<String>,
        #[arg(long, conflicts_with = "group")]
        ungrouped: bool,
    },
    Edit {
        id: String,
        #[arg(long)]
        name: Option<String>,
        #[arg(long)]
        phone: Option<String>,
        #[arg(long, help = "Group name")]
        group: Option<String>,
        #[arg(long, conflicts_with = "group")]
        ungroup: bool,
    },
    Remove { id: String },
    Search { query: String },
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let mut config = CoreConfig::from_env()?;
    if let Some(db) = cli.db.clone() {
        config.db_path = db;
    }
    init_from_config(&config)?;

    let conn = open_db(&config.db_path)
        .with_context(|| format!("failed to open `{}`", config.db_path.display()))?;
    let storage = StorageAdapter::new(SqliteKvStore::new(&conn));
    let groups = GroupRegistry::new(&storage);
    let contacts = ContactRegistry::new(&storage);
    info!(
        "event=cli_start module=cli status=ok db_path={}",
        config.db_path.display()
    );

    match cli.command {
        Commands::Group { command } => run_group(&groups, command, cli.json),
        Commands::Contact { command } => run_contact(&groups, &contacts, command, cli.json),
        Commands::Export => {
            println!("{}", serde_json::to_string_pretty(&contacts.export_data())?);
            Ok(())
        }
        Commands::Import { file } => {
            let text = std::fs::read_to_string(&file)
                .with_context(|| format!("failed to read `{}`", file.display()))?;
            let payload: serde_json::Value = serde_json::from_str(&text)?;
            let count = contacts.try_import_data(&payload)?;
            println!("imported {count} contacts");
            Ok(())
        }
        Commands::Version => {
            println!("contactbook_core version={}", core_version());
            Ok(())
        }
    }
}

fn run_group(
    groups: &GroupRegistry<'_, SqliteKvStore<'_>>,
    command: GroupCommands,
    json: bool,
) -> anyhow::Result<()> {
    match command {
        GroupCommands::Add { name } => print_groups(&[groups.try_create(&name)?], json),
        GroupCommands::List => print_groups(&groups.get_all(), json),
        GroupCommands::Rename { id, name } => {
            print_groups(&[groups.try_update(&id, &GroupPatch::rename(name))?], json)
        }
        GroupCommands::Remove { id } => {
            groups.try_delete(&id)?;
            println!("removed group {id}");
            Ok(())
        }
    }
}

fn run_contact(
    groups: &GroupRegistry<'_, SqliteKvStore<'_>>,
    contacts: &ContactRegistry<'_, SqliteKvStore<'_>>,
    command: ContactCommands,
    json: bool,
) -> anyhow::Result<()> {
    match command {
        ContactCommands::Add { name, phone, group } => {
            let contact = match group {
                Some(group) => contacts.try_create_by_group_name(&name, &phone, &group)?,
                None => contacts.try_create(&name, &phone, None)?,
            };
            print_contacts(groups, &[contact], json)
        }
        ContactCommands::List { group, ungrouped } => {
            let listed = match (group, ungrouped) {
                (Some(group), _) => contacts.get_by_group_name(&group),
                (None, true) => contacts.get_ungrouped(),
                (None, false) => contacts.get_all(),
            };
            print_contacts(groups, &listed, json)
        }
        ContactCommands::Edit {
            id,
            name,
            phone,
            group,
            ungroup,
        } => {
            let group_id = match (group, ungroup) {
                (Some(group), _) => match groups.find_by_name(&group) {
                    Some(found) => Some(Some(found.id)),
                    None => bail!("group not found: {group}"),
                },
                (None, true) => Some(None),
                (None, false) => None,
            };
            let patch = ContactPatch {
                name,
                phone,
                group_id,
            };
            if patch.is_empty() {
                bail!("nothing to change; pass --name, --phone, --group or --ungroup");
            }
            print_contacts(groups, &[contacts.try_update(&id, &patch)?], json)
        }
        ContactCommands::Remove { id } => {
            contacts.try_delete(&id)?;
            println!("removed contact {id}");
            Ok(())
        }
        ContactCommands::Search { query } => {
            print_contacts(groups, &contacts.search_by_name(&query), json)
        }
    }
}

fn print_groups(items: &[Group], json: bool) -> anyhow::Result<()> {
    if json {
        println!("{}", serde_json::to_string_pretty(items)?);
        return Ok(());
    }
    for group in items {
        println!("{}\t{}", group.id, group.name);
    }
    Ok(())
}

fn print_contacts(
    groups: &GroupRegistry<'_, SqliteKvStore<'_>>,
    items: &[Contact],
    json: bool,
) -> anyhow::Result<()> {
    if json {
        println!("{}", serde_json::to_string_pretty(items)?);
        return Ok(());
    }
    let known = groups.get_all();
    for contact in items {
        let group_name = contact
            .group_id
            .as_deref()
            .and_then(|id| known.iter().find(|group| group.id == id))
            .map_or("(ungrouped)", |group| group.name.as_str());
        println!(
            "{}\t{}\t{}\t{}",
            contact.id, contact.name, contact.phone, group_name
        );
    }
    Ok(())
}
