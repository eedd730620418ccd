//! Queries and splits a JSON control catalog.
//!
//! Responsibilities:
//! - answer control, parameter and prose lookups through `CatalogInterface`
//! - split a catalog into one document per control, grouped by directory
//! - join such a directory back into a catalog and report whether anything
//!   changed relative to the source catalog
//!
//! Diagnostics go to stderr through `tracing`; `CATALOG_LOG` takes the usual
//! filter directives and defaults to `warn`.

use anyhow::{Context, Result, bail};
use control_catalog::{
    CatalogError, CatalogInterface, JsonControlIo, MarkdownWriteOptions, load_catalog_from_path,
    save_catalog_to_path,
};
use serde_json::{Map, Value, json};
use std::env;
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

const LOG_ENV: &str = "CATALOG_LOG";
const DEFAULT_FILTER: &str = "warn";

fn main() {
    init_tracing();
    if let Err(err) = run() {
        eprintln!("{err:#}");
        std::process::exit(1);
    }
}

fn init_tracing() {
    let filter = env::var(LOG_ENV)
        .ok()
        .and_then(|directives| EnvFilter::try_new(directives).ok())
        .unwrap_or_else(|| EnvFilter::new(DEFAULT_FILTER));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .without_time()
        .init();
}

fn run() -> Result<()> {
    let args = CliArgs::parse()?;
    let catalog = load_catalog_from_path(&args.catalog_path)?;
    let mut interface = CatalogInterface::new(catalog);

    let output = match args.command {
        Command::Summary => summary(&interface),
        Command::Control(control_id) => control_report(&interface, &control_id)?,
        Command::Param(param_id) => {
            let control = interface.get_control_by_param_id(&param_id).ok_or_else(|| {
                CatalogError::UnknownParam {
                    param_id: param_id.clone(),
                }
            })?;
            json!({ "param": param_id, "control": control.id })
        }
        Command::Find(text) => {
            let hits: Vec<Value> = interface
                .get_all_controls_from_dict()
                .flat_map(|control| CatalogInterface::find_string_in_control(control, &text))
                .map(|(control_id, prose)| json!({ "control": control_id, "prose": prose }))
                .collect();
            Value::Array(hits)
        }
        Command::Split(dir) => {
            let io = JsonControlIo;
            interface.write_catalog_as_markdown(
                &dir,
                &Map::new(),
                &MarkdownWriteOptions::default(),
                &io,
            )?;
            json!({
                "dir": dir.display().to_string(),
                "controls": interface.get_count_of_controls_in_dict(),
            })
        }
        Command::Join { dir, out } => {
            let original = CatalogInterface::new(load_catalog_from_path(&args.catalog_path)?);
            let io = JsonControlIo;
            let joined = interface.read_catalog_from_markdown(&dir, &io)?.clone();
            let equivalent = original.equivalent_to(&joined);
            if let Some(out) = &out {
                save_catalog_to_path(&joined, out)?;
            }
            json!({
                "dir": dir.display().to_string(),
                "controls": interface.get_count_of_controls_in_dict(),
                "equivalent": equivalent,
                "written": out.map(|path| path.display().to_string()),
            })
        }
    };

    println!("{}", serde_json::to_string_pretty(&output)?);
    Ok(())
}

fn summary(interface: &CatalogInterface) -> Value {
    json!({
        "controls": interface.get_count_of_controls_in_dict(),
        "top_level_controls": interface.get_count_of_controls_in_catalog(false),
        "groups": interface.get_group_ids(),
        "sections": interface.get_sections(),
    })
}

fn control_report(interface: &CatalogInterface, control_id: &str) -> Result<Value> {
    let control = interface
        .get_control(control_id)
        .with_context(|| format!("unknown control {control_id}"))?;
    let group = interface.get_group_info_by_control(control_id)?;
    Ok(json!({
        "id": control.id,
        "title": control.title,
        "label": CatalogInterface::get_label(control),
        "group": group,
        "path": interface.get_control_path(control_id)?,
        "dependents": interface.get_dependent_control_ids(control_id)?,
        "params": control.params.iter().map(|param| param.id.as_str()).collect::<Vec<_>>(),
    }))
}

enum Command {
    Summary,
    Control(String),
    Param(String),
    Find(String),
    Split(PathBuf),
    Join { dir: PathBuf, out: Option<PathBuf> },
}

struct CliArgs {
    catalog_path: PathBuf,
    command: Command,
}

impl CliArgs {
    fn parse() -> Result<Self> {
        let mut positionals = Vec::new();
        for arg in env::args().skip(1) {
            match arg.as_str() {
                "-h" | "--help" => usage(),
                _ if arg.starts_with("--") => {
                    eprintln!("Unknown option: {arg}");
                    usage();
                }
                _ => positionals.push(arg),
            }
        }

        let mut positionals = positionals.into_iter();
        let (Some(catalog_path), Some(command)) = (positionals.next(), positionals.next()) else {
            usage();
        };
        let rest: Vec<String> = positionals.collect();

        let command = match (command.as_str(), rest.as_slice()) {
            ("summary", []) => Command::Summary,
            ("control", [id]) => Command::Control(id.clone()),
            ("param", [id]) => Command::Param(id.clone()),
            ("find", [text]) => Command::Find(text.clone()),
            ("split", [dir]) => Command::Split(PathBuf::from(dir)),
            ("join", [dir]) => Command::Join {
                dir: PathBuf::from(dir),
                out: None,
            },
            ("join", [dir, out]) => Command::Join {
                dir: PathBuf::from(dir),
                out: Some(PathBuf::from(out)),
            },
            ("summary" | "control" | "param" | "find" | "split" | "join", _) => {
                bail!("wrong number of arguments for {command}")
            }
            _ => bail!("unknown command: {command}"),
        };

        Ok(Self {
            catalog_path: PathBuf::from(catalog_path),
            command,
        })
    }
}

fn usage() -> ! {
    eprintln!(
        "Usage: catalog-query CATALOG COMMAND [ARGS]\n\nCommands:\n  summary                 Control counts, group ids and part sections.\n  control ID              Group, path, label and dependents of one control.\n  param ID                Control that defines a parameter.\n  find TEXT               Every part prose containing TEXT.\n  split DIR               Write one document per control under DIR.\n  join DIR [OUT]          Read DIR back, compare with CATALOG, optionally save to OUT.\n\nEnvironment:\n  CATALOG_LOG             tracing filter directives (default: warn)."
    );
    std::process::exit(1);
}
