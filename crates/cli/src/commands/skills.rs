//! `tether skills` - skill package management.

use clap::{Parser, Subcommand};
use tether_skills::{
    Action, HttpSource, Lockfile, SkillError, SkillSource, DEFAULT_SOURCE, install, install_root,
    lock_path, plan,
};

use crate::dispatch::init_tracing;
use crate::error::ExitCode;

#[derive(Parser)]
#[command(name = "tether skills", about = "Manage installed skill packages")]
struct SkillsCli {
    /// Registry to fetch from
    #[arg(long, value_name = "URL", default_value = DEFAULT_SOURCE)]
    source: String,

    /// Debug logging
    #[arg(long)]
    verbose: bool,

    #[command(subcommand)]
    command: SkillsCommand,
}

#[derive(Subcommand)]
enum SkillsCommand {
    /// List installed skills
    List,
    /// Install a skill by name
    Install { name: String },
    /// Re-check every installed skill and install newer versions
    Update,
}

pub async fn run(rest: &[String]) -> ExitCode {
    let argv = std::iter::once("tether skills".to_string()).chain(rest.iter().cloned());
    let cli = match SkillsCli::try_parse_from(argv) {
        Ok(cli) => cli,
        Err(e) => {
            let _ = e.print();
            return if e.use_stderr() {
                ExitCode::Usage
            } else {
                ExitCode::Success
            };
        }
    };

    init_tracing(cli.verbose);

    let result = match cli.command {
        SkillsCommand::List => list(),
        SkillsCommand::Install { name } => install_one(&cli.source, &name).await,
        SkillsCommand::Update => update(&cli.source).await,
    };

    match result {
        Ok(()) => ExitCode::Success,
        Err(e) => {
            eprintln!("error: {e}");
            ExitCode::from(&e)
        }
    }
}

fn list() -> Result<(), SkillError> {
    let lock = Lockfile::load(&lock_path()?)?;
    if lock.skills.is_empty() {
        println!("no skills installed");
        return Ok(());
    }
    for (name, locked) in &lock.skills {
        println!("{name} {} ({})", locked.version, locked.source);
    }
    Ok(())
}

async fn install_one(source: &str, name: &str) -> Result<(), SkillError> {
    let registry = HttpSource::new(source)?;
    let manifest = registry.manifest(name).await?;
    let root = install_root()?;

    let locked = install(&registry, &manifest, &root).await?;
    println!("installed {name} {}", locked.version);

    let path = lock_path()?;
    let mut lock = Lockfile::load(&path)?;
    lock.skills.insert(name.to_string(), locked);
    lock.save(&path)
}

async fn update(source: &str) -> Result<(), SkillError> {
    let registry = HttpSource::new(source)?;
    let path = lock_path()?;
    let mut lock = Lockfile::load(&path)?;
    if lock.skills.is_empty() {
        println!("no skills installed");
        return Ok(());
    }

    let mut manifests = Vec::new();
    for name in lock.skills.keys() {
        manifests.push(registry.manifest(name).await?);
    }

    let root = install_root()?;
    let mut changed = 0usize;
    for entry in plan(&manifests, &lock) {
        match entry.action {
            Action::UpToDate => println!("{} {} is up to date", entry.name, entry.version),
            Action::Install | Action::Update { .. } => {
                let Some(manifest) = manifests.iter().find(|m| m.name == entry.name) else {
                    continue;
                };
                let locked = install(&registry, manifest, &root).await?;
                println!("updated {} to {}", entry.name, locked.version);
                lock.skills.insert(entry.name.clone(), locked);
                changed += 1;
            }
        }
    }

    if changed > 0 {
        lock.save(&path)?;
    }
    Ok(())
}
