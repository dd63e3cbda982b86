use std::io::{self, Write};

use anyhow::{bail, Context};
use ark_archive::{ArchiveWriter, Compression};
use ark_sdk::{ArkConfig, ArtifactLoader};
use ark_types::{content_digest, ResourceKind};
use colored::Colorize;
use serde_json::json;

use crate::cli::*;

pub fn run_command(cli: Cli) -> anyhow::Result<()> {
    let config = load_config(&cli)?;
    let format = cli.format;
    match cli.command {
        Command::List(args) => cmd_list(&config, format, args),
        Command::Resolve(args) => cmd_resolve(&config, format, args),
        Command::Cat(args) => cmd_cat(&config, args),
        Command::Pack(args) => cmd_pack(format, args),
        Command::Config(args) => cmd_config(&config, format, args),
    }
}

fn load_config(cli: &Cli) -> anyhow::Result<ArkConfig> {
    let mut config = match &cli.config {
        Some(path) => ArkConfig::load(path)?,
        None => ArkConfig::default(),
    };
    config.apply_env_with(|key| std::env::var(key).ok())?;
    Ok(config)
}

fn loader_with(config: &ArkConfig, sources: &[String]) -> anyhow::Result<ArtifactLoader> {
    let loader = ArtifactLoader::new(config)?;
    for source in sources {
        let report = loader
            .add(source.as_str())
            .with_context(|| format!("ingesting {source}"))?;
        tracing::info!(%source, inserted = report.inserted, skipped = report.skipped, "ingested");
    }
    Ok(loader)
}

fn cmd_list(config: &ArkConfig, format: OutputFormat, args: ListArgs) -> anyhow::Result<()> {
    let loader = loader_with(config, &args.sources)?;
    let naming = loader.naming().clone();
    let resources = loader.loaded_resources();

    match format {
        OutputFormat::Json => {
            let entries: Vec<_> = resources
                .iter()
                .map(|(name, bytes)| {
                    json!({
                        "name": name,
                        "kind": ResourceKind::classify(name, &naming),
                        "size": bytes.len(),
                        "symbolic": naming.to_symbolic(name),
                    })
                })
                .collect();
            println!("{}", serde_json::to_string_pretty(&entries)?);
        }
        OutputFormat::Text => {
            for (name, bytes) in &resources {
                let kind = ResourceKind::classify(name, &naming);
                let label = match naming.to_symbolic(name) {
                    Some(symbolic) => format!("{} ({})", name, symbolic.cyan()),
                    None => name.clone(),
                };
                println!("{:>10}  {:<10}  {}", bytes.len(), kind.to_string().dimmed(), label);
            }
            println!("{} {} artifacts", "✓".green(), resources.len().to_string().bold());
        }
    }
    Ok(())
}

fn cmd_resolve(config: &ArkConfig, format: OutputFormat, args: ResolveArgs) -> anyhow::Result<()> {
    let loader = loader_with(config, &args.sources)?;
    let Some(definition) = loader.resolve(&args.name, false)? else {
        bail!("nothing to resolve for {:?}", args.name);
    };
    let locator = if args.locator {
        loader.resolve_locator(&definition.path)?
    } else {
        None
    };

    match format {
        OutputFormat::Json => {
            let out = json!({
                "name": definition.name,
                "path": definition.path,
                "origin": definition.origin,
                "size": definition.len(),
                "digest": definition.digest(),
                "locator": locator.map(|l| l.to_string()),
            });
            println!("{}", serde_json::to_string_pretty(&out)?);
        }
        OutputFormat::Text => {
            println!("{} {}", "✓".green().bold(), definition.name.bold());
            println!("  Path:   {}", definition.path);
            println!("  Origin: {}", definition.origin.yellow());
            println!("  Size:   {} bytes", definition.len());
            println!("  BLAKE3: {}", definition.digest().dimmed());
            if args.locator {
                match locator {
                    Some(locator) => println!("  Locator: {}", locator.to_string().blue()),
                    None => println!("  Locator: {}", "(none)".dimmed()),
                }
            }
        }
    }
    Ok(())
}

fn cmd_cat(config: &ArkConfig, args: CatArgs) -> anyhow::Result<()> {
    let loader = loader_with(config, &args.sources)?;
    let Some(mut stream) = loader.resolve_stream(&args.path)? else {
        bail!("resource {} not found", args.path);
    };
    let stdout = io::stdout();
    let mut out = stdout.lock();
    io::copy(&mut stream, &mut out).context("writing resource")?;
    out.flush()?;
    Ok(())
}

fn cmd_pack(format: OutputFormat, args: PackArgs) -> anyhow::Result<()> {
    let compression = match args.compression {
        PackCompression::None => Compression::None,
        PackCompression::Gzip => Compression::Gzip,
        PackCompression::Zstd => Compression::Zstd,
    };
    let mut writer = ArchiveWriter::new(compression);
    let files = writer.add_dir_tree(&args.dir)?;
    let bytes = writer.finish_to_bytes()?;
    std::fs::write(&args.output, &bytes)
        .with_context(|| format!("writing {}", args.output.display()))?;

    let digest = content_digest(&bytes);
    match format {
        OutputFormat::Json => println!(
            "{}",
            json!({ "output": args.output, "files": files, "size": bytes.len(), "digest": digest })
        ),
        OutputFormat::Text => println!(
            "{} Packed {} files into {} ({} bytes, {})",
            "✓".green().bold(),
            files,
            args.output.display().to_string().bold(),
            bytes.len(),
            digest[..12].dimmed()
        ),
    }
    Ok(())
}

fn cmd_config(config: &ArkConfig, format: OutputFormat, args: ConfigArgs) -> anyhow::Result<()> {
    let value = serde_json::to_value(config)?;
    let selected = match &args.key {
        Some(key) => lookup(&value, key).with_context(|| format!("unknown key {key}"))?,
        None => &value,
    };

    match (format, &args.key) {
        (OutputFormat::Json, _) => println!("{}", serde_json::to_string_pretty(selected)?),
        (OutputFormat::Text, Some(key)) => println!("{} = {}", key.bold(), selected),
        (OutputFormat::Text, None) => print!("{}", toml::to_string_pretty(config)?),
    }
    Ok(())
}

/// Walk a dotted key such as `chain.local.priority`.
fn lookup<'a>(value: &'a serde_json::Value, key: &str) -> Option<&'a serde_json::Value> {
    key.split('.').try_fold(value, |node, part| node.get(part))
}
