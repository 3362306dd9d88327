use anyhow::{bail, Context};
use colored::Colorize;
use strand_persist::{Store, StoreConfig};
use strand_types::{BlockId, Commit, Manifest, ProjectId, Revision, SequenceHash};
use tokio::io::AsyncReadExt;
use tracing::debug;

use crate::cli::*;

pub async fn run_command(cli: Cli) -> anyhow::Result<()> {
    let store = Store::new(load_config(&cli)?);
    match cli.command {
        Command::Project(args) => cmd_project(&store, args.command).await,
        Command::Block(args) => cmd_block(&store, args.command).await,
        Command::Sequence(args) => cmd_sequence(&store, args.command).await,
    }
}

fn load_config(cli: &Cli) -> anyhow::Result<StoreConfig> {
    let mut config = match &cli.config {
        Some(path) => StoreConfig::load(path)?,
        None => StoreConfig::default(),
    };
    if let Some(root) = &cli.root {
        let rooted = StoreConfig::rooted(root);
        config.data_dir = rooted.data_dir;
        config.sequence_dir = rooted.sequence_dir;
    }
    debug!(
        data_dir = %config.data_dir.display(),
        sequence_dir = %config.sequence_dir.display(),
        serialize_writes = config.serialize_writes,
        validate_on_create = config.validate_on_create,
        "resolved configuration"
    );
    Ok(config)
}

async fn cmd_project(store: &Store, command: ProjectCommand) -> anyhow::Result<()> {
    match command {
        ProjectCommand::Create { id } => {
            let id = match id {
                Some(id) => ProjectId::parse(id)?,
                None => ProjectId::generate(),
            };
            let manifest = manifest_or_default(id.as_str()).await?;
            let revision = store.project_create(&id, manifest).await?;
            println!("{} Created project {}", "✓".green().bold(), id.as_str().bold());
            if let Some(revision) = revision {
                println!("  Revision: {}", revision.short().yellow());
            }
        }
        ProjectCommand::Get { id, revision } => {
            let revision = parse_revision(revision)?;
            let manifest = store.project_get(&ProjectId::parse(id)?, revision.as_ref()).await?;
            print_json(&manifest)?;
        }
        ProjectCommand::Put { id } => {
            let written = store
                .project_write(&ProjectId::parse(id)?, read_manifest().await?)
                .await?;
            print_json(&written)?;
        }
        ProjectCommand::Merge { id } => {
            let merged = store
                .project_merge(&ProjectId::parse(id)?, read_manifest().await?)
                .await?;
            print_json(&merged)?;
        }
        ProjectCommand::Delete { id } => {
            let id = ProjectId::parse(id)?;
            store.project_delete(&id).await?;
            println!("{} Deleted project {}", "✓".green().bold(), id.as_str().bold());
        }
        ProjectCommand::Save { id, message } => {
            let revision = store.save(&ProjectId::parse(id)?, message.as_deref()).await?;
            println!("{} Saved {}", "✓".green().bold(), revision.short().yellow());
        }
        ProjectCommand::Log { id, oneline } => {
            let log = store.history(&ProjectId::parse(id)?).await?;
            print_log(&log, oneline);
        }
        ProjectCommand::List => {
            for project in store.list_projects().await? {
                println!("{project}");
            }
        }
    }
    Ok(())
}

async fn cmd_block(store: &Store, command: BlockCommand) -> anyhow::Result<()> {
    match command {
        BlockCommand::Create { project, id } => {
            let project = ProjectId::parse(project)?;
            let id = match id {
                Some(id) => BlockId::parse(id)?,
                None => BlockId::generate(),
            };
            let manifest = manifest_or_default(id.as_str()).await?;
            store.block_create(&project, &id, manifest).await?;
            println!(
                "{} Created block {} in {}",
                "✓".green().bold(),
                id.as_str().bold(),
                project.as_str().cyan()
            );
        }
        BlockCommand::Get {
            project,
            id,
            revision,
        } => {
            let revision = parse_revision(revision)?;
            let manifest = store
                .block_get(
                    &ProjectId::parse(project)?,
                    &BlockId::parse(id)?,
                    revision.as_ref(),
                )
                .await?;
            print_json(&manifest)?;
        }
        BlockCommand::Put { project, id } => {
            let written = store
                .block_write(
                    &ProjectId::parse(project)?,
                    &BlockId::parse(id)?,
                    read_manifest().await?,
                )
                .await?;
            print_json(&written)?;
        }
        BlockCommand::Merge { project, id } => {
            let merged = store
                .block_merge(
                    &ProjectId::parse(project)?,
                    &BlockId::parse(id)?,
                    read_manifest().await?,
                )
                .await?;
            print_json(&merged)?;
        }
        BlockCommand::Delete { project, id } => {
            let id = BlockId::parse(id)?;
            let revision = store.block_delete(&ProjectId::parse(project)?, &id).await?;
            println!(
                "{} Deleted block {} ({})",
                "✓".green().bold(),
                id.as_str().bold(),
                revision.short().yellow()
            );
        }
        BlockCommand::Find { id } => {
            let block = BlockId::parse(id.as_str())?;
            match store.find_project_for_block(&block).await? {
                Some(project) => println!("{project}"),
                None => bail!("block {id} is not in any project"),
            }
        }
        BlockCommand::Sequence { project, id } => {
            match store
                .block_sequence(&ProjectId::parse(project)?, &BlockId::parse(id.as_str())?)
                .await?
            {
                Some(sequence) => println!("{sequence}"),
                None => bail!("block {id} has no stored sequence"),
            }
        }
    }
    Ok(())
}

async fn cmd_sequence(store: &Store, command: SequenceCommand) -> anyhow::Result<()> {
    match command {
        SequenceCommand::Put { hash } => {
            let text = read_stdin().await?;
            let sequence = text.trim_end_matches(['\n', '\r']);
            let hash = match hash {
                Some(hash) => {
                    let hash = SequenceHash::parse(&hash)?;
                    store.sequence_write(&hash, sequence).await?;
                    hash
                }
                None => store.sequence_put(sequence).await?,
            };
            println!("{hash}");
        }
        SequenceCommand::Get { hash } => {
            match store.sequence_get(&SequenceHash::parse(&hash)?).await? {
                Some(sequence) => println!("{sequence}"),
                None => bail!("sequence {hash} not found"),
            }
        }
        SequenceCommand::Delete { hash } => {
            store.sequence_delete(&SequenceHash::parse(&hash)?).await?;
            println!("{} Deleted sequence {}", "✓".green().bold(), hash.yellow());
        }
    }
    Ok(())
}

fn parse_revision(revision: Option<String>) -> anyhow::Result<Option<Revision>> {
    Ok(revision.as_deref().map(Revision::parse).transpose()?)
}

async fn read_stdin() -> anyhow::Result<String> {
    let mut text = String::new();
    tokio::io::stdin()
        .read_to_string(&mut text)
        .await
        .context("reading stdin")?;
    Ok(text)
}

async fn read_manifest() -> anyhow::Result<Manifest> {
    let text = read_stdin().await?;
    if text.trim().is_empty() {
        bail!("expected a JSON manifest on stdin");
    }
    Ok(Manifest::from_json(&text)?)
}

/// Manifest from stdin when given, otherwise a minimal one. The id is
/// filled in when missing.
async fn manifest_or_default(id: &str) -> anyhow::Result<Manifest> {
    let text = read_stdin().await?;
    if text.trim().is_empty() {
        return Ok(Manifest::new(id));
    }
    let mut manifest = Manifest::from_json(&text)?;
    if manifest.id().is_none() {
        manifest.set_id(id);
    }
    Ok(manifest)
}

fn print_json<T: serde::Serialize>(value: &T) -> anyhow::Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

fn print_log(log: &[Commit], oneline: bool) {
    for commit in log {
        if oneline {
            println!("{} {}", commit.revision.short().yellow(), commit.message);
        } else {
            println!(
                "{}  {}",
                commit.revision.as_str().yellow().bold(),
                commit.timestamp.to_rfc3339().dimmed()
            );
            println!("  {}", commit.message);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::Parser;
    use std::path::PathBuf;

    #[test]
    fn root_overrides_directories_only() {
        let cli = Cli::try_parse_from(["strand", "--root", "/srv/s", "project", "list"]).unwrap();
        let config = load_config(&cli).unwrap();
        assert_eq!(config.data_dir, PathBuf::from("/srv/s/data"));
        assert_eq!(config.sequence_dir, PathBuf::from("/srv/s/sequences"));
        assert!(config.serialize_writes);
    }

    #[test]
    fn config_file_is_loaded() {
        let dir = tempfile::TempDir::new().unwrap();
        let path = dir.path().join("strand.toml");
        std::fs::write(&path, "author_name = \"lab\"\nvalidate_on_create = true\n").unwrap();
        let cli = Cli::try_parse_from([
            "strand",
            "--config",
            path.to_str().unwrap(),
            "project",
            "list",
        ])
        .unwrap();
        let config = load_config(&cli).unwrap();
        assert_eq!(config.author_name, "lab");
        assert!(config.validate_on_create);
    }

    #[test]
    fn revision_parsing() {
        assert!(parse_revision(None).unwrap().is_none());
        assert!(parse_revision(Some("abc123".into())).unwrap().is_some());
        assert!(parse_revision(Some("not a sha".into())).is_err());
    }
}
