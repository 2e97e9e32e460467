//! `ledgerform` command: render a schema document against a record.
//!
//! ```text
//! ledgerform render --schema meta.json [--record record.json] [--options options.json]
//!                   [--section form] [--notebook notebook] [--rows transactions]
//!                   [--readonly] [--width 80] [--config ledgerform.yaml]
//! ledgerform lookups --schema meta.json
//! ```

use std::io::Write;
use std::path::{Path, PathBuf};

use ledgerform_core::config::EngineConfig;
use ledgerform_core::error::{ConfigError, SchemaError};
use ledgerform_core::form_state::MemoryFormState;
use ledgerform_core::schema::{lookup_sources, OptionsMap, SchemaDocument};
use ledgerform_term_adapter::style::ThemeSpec;
use serde_json::Value;
use tracing::info;

use crate::dynamic_form::DynamicForm;
use crate::notebook::Notebook;
use crate::paint::{paint_form, paint_notebook};

const DEFAULT_WIDTH: usize = 80;

const HELP_TEXT: &str = "\
Render metadata-driven forms as text.

Usage:
  ledgerform render --schema <file> [flags]
  ledgerform lookups --schema <file>

Render flags:
      --schema <file>     metadata document (JSON)
      --record <file>     record values (JSON object)
      --options <file>    options map: field name -> [{value, label}]
      --section <name>    form section to render (default: form)
      --notebook <name>   notebook section to render below the form
      --rows <name>       record array bound to the notebook (default: notebook name)
      --readonly          render every field read-only
      --width <cols>      output width (default: 80)
      --config <file>     engine config (YAML)";

#[derive(Debug, thiserror::Error)]
pub enum CliError {
    #[error("{0}")]
    Usage(String),
    #[error("read {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("parse {path}: {source}")]
    Json {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
    #[error("schema {path}: {source}")]
    Schema {
        path: PathBuf,
        #[source]
        source: SchemaError,
    },
    #[error(transparent)]
    Config(#[from] ConfigError),
    #[error("section '{0}' not found in schema")]
    MissingSection(String),
    #[error("write output: {0}")]
    Output(#[from] std::io::Error),
}

#[derive(Debug, Clone, PartialEq, Eq)]
enum Command {
    Help,
    Render(RenderArgs),
    Lookups { schema: PathBuf },
}

#[derive(Debug, Clone, PartialEq, Eq)]
struct RenderArgs {
    schema: PathBuf,
    record: Option<PathBuf>,
    options: Option<PathBuf>,
    section: String,
    notebook: Option<String>,
    rows: Option<String>,
    readonly: bool,
    width: usize,
    config: Option<PathBuf>,
}

/// Runs the command line. `on_config` sees the effective configuration
/// before any work is done (the binary installs logging there).
pub fn run(
    args: &[String],
    stdout: &mut dyn Write,
    stderr: &mut dyn Write,
    on_config: &mut dyn FnMut(&EngineConfig),
) -> i32 {
    match execute(args, stdout, on_config) {
        Ok(()) => 0,
        Err(err) => {
            let _ = writeln!(stderr, "error: {err}");
            if matches!(err, CliError::Usage(_)) {
                let _ = writeln!(stderr, "\n{HELP_TEXT}");
            }
            1
        }
    }
}

fn execute(
    args: &[String],
    stdout: &mut dyn Write,
    on_config: &mut dyn FnMut(&EngineConfig),
) -> Result<(), CliError> {
    match parse_args(args)? {
        Command::Help => {
            writeln!(stdout, "{HELP_TEXT}")?;
            Ok(())
        }
        Command::Lookups { schema } => {
            let config = EngineConfig::load_default()?;
            on_config(&config);
            let doc = load_schema(&schema)?;
            for section in doc.section_names() {
                let Some(fields) = doc.section(section) else {
                    continue;
                };
                for lookup in lookup_sources(fields.fields()) {
                    writeln!(stdout, "{section}.{}\t{}", lookup.field, lookup.source)?;
                }
            }
            Ok(())
        }
        Command::Render(render) => {
            let config = load_config(render.config.as_deref())?;
            on_config(&config);
            let text = render_document(&render, config)?;
            writeln!(stdout, "{text}")?;
            Ok(())
        }
    }
}

fn render_document(args: &RenderArgs, config: EngineConfig) -> Result<String, CliError> {
    let doc = load_schema(&args.schema)?;
    let record = match &args.record {
        Some(path) => read_json(path)?,
        None => Value::Object(serde_json::Map::new()),
    };
    let options: Option<OptionsMap> = match &args.options {
        Some(path) => {
            let raw = read_json(path)?;
            Some(serde_json::from_value(raw).map_err(|source| CliError::Json {
                path: path.clone(),
                source,
            })?)
        }
        None => None,
    };
    let mut state = MemoryFormState::with_values(record);
    let theme = ThemeSpec::default();

    let fields = doc
        .section(&args.section)
        .ok_or_else(|| CliError::MissingSection(args.section.clone()))?;
    let mut form = DynamicForm::new(config.clone());
    let form_node = form.render(fields, &mut state, options.as_ref(), args.readonly);
    info!(
        section = %args.section,
        fields = form_node.cells.len(),
        readonly = args.readonly,
        "form rendered"
    );
    let mut out = paint_form(&form_node, args.width, theme).trimmed_snapshot();

    if let Some(section) = &args.notebook {
        let columns = doc
            .section(section)
            .ok_or_else(|| CliError::MissingSection(section.clone()))?;
        let rows = args.rows.as_deref().unwrap_or(section);
        let mut notebook = Notebook::new(rows, columns.fields().to_vec()).with_config(config);
        notebook.set_options_map(options);
        let node = notebook.render(&mut state, !args.readonly);
        info!(notebook = rows, rows = node.rows.len(), "notebook rendered");
        if !out.is_empty() {
            out.push_str("\n\n");
        }
        out.push_str(&paint_notebook(&node, args.width, theme).trimmed_snapshot());
    }
    Ok(out)
}

fn load_config(path: Option<&Path>) -> Result<EngineConfig, CliError> {
    let Some(path) = path else {
        return Ok(EngineConfig::load_default()?);
    };
    let mut config = EngineConfig::load(path)?;
    config.apply_env_overrides();
    config.validate()?;
    Ok(config)
}

fn load_schema(path: &Path) -> Result<SchemaDocument, CliError> {
    let raw = read_file(path)?;
    SchemaDocument::from_json_str(&raw).map_err(|source| CliError::Schema {
        path: path.to_path_buf(),
        source,
    })
}

fn read_json(path: &Path) -> Result<Value, CliError> {
    let raw = read_file(path)?;
    serde_json::from_str(&raw).map_err(|source| CliError::Json {
        path: path.to_path_buf(),
        source,
    })
}

fn read_file(path: &Path) -> Result<String, CliError> {
    std::fs::read_to_string(path).map_err(|source| CliError::Read {
        path: path.to_path_buf(),
        source,
    })
}

fn parse_args(args: &[String]) -> Result<Command, CliError> {
    let Some(command) = args.first() else {
        return Ok(Command::Help);
    };
    match command.as_str() {
        "-h" | "--help" | "help" => Ok(Command::Help),
        "render" => parse_render(&args[1..]).map(Command::Render),
        "lookups" => {
            let mut schema = None;
            let mut index = 1;
            while let Some(token) = args.get(index) {
                match token.as_str() {
                    "--schema" => {
                        schema = Some(PathBuf::from(take_value(args, index, "--schema")?));
                        index += 2;
                    }
                    other => {
                        return Err(CliError::Usage(format!("unknown argument for lookups: '{other}'")))
                    }
                }
            }
            let schema = schema.ok_or_else(|| CliError::Usage("--schema is required".into()))?;
            Ok(Command::Lookups { schema })
        }
        other => Err(CliError::Usage(format!("unknown command '{other}'"))),
    }
}

fn parse_render(args: &[String]) -> Result<RenderArgs, CliError> {
    let mut schema = None;
    let mut parsed = RenderArgs {
        schema: PathBuf::new(),
        record: None,
        options: None,
        section: "form".into(),
        notebook: None,
        rows: None,
        readonly: false,
        width: DEFAULT_WIDTH,
        config: None,
    };

    let mut index = 0usize;
    while let Some(token) = args.get(index) {
        match token.as_str() {
            "--readonly" => {
                parsed.readonly = true;
                index += 1;
                continue;
            }
            "--schema" => schema = Some(PathBuf::from(take_value(args, index, "--schema")?)),
            "--record" => parsed.record = Some(PathBuf::from(take_value(args, index, "--record")?)),
            "--options" => {
                parsed.options = Some(PathBuf::from(take_value(args, index, "--options")?));
            }
            "--section" => parsed.section = take_value(args, index, "--section")?,
            "--notebook" => parsed.notebook = Some(take_value(args, index, "--notebook")?),
            "--rows" => parsed.rows = Some(take_value(args, index, "--rows")?),
            "--config" => parsed.config = Some(PathBuf::from(take_value(args, index, "--config")?)),
            "--width" => {
                let raw = take_value(args, index, "--width")?;
                parsed.width = raw
                    .parse::<usize>()
                    .ok()
                    .filter(|width| *width > 0)
                    .ok_or_else(|| CliError::Usage(format!("invalid value '{raw}' for --width")))?;
            }
            other => return Err(CliError::Usage(format!("unknown argument for render: '{other}'"))),
        }
        index += 2;
    }

    parsed.schema = schema.ok_or_else(|| CliError::Usage("--schema is required".into()))?;
    Ok(parsed)
}

fn take_value(args: &[String], index: usize, flag: &str) -> Result<String, CliError> {
    args.get(index + 1)
        .cloned()
        .ok_or_else(|| CliError::Usage(format!("missing value for {flag}")))
}
