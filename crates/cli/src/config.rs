//! `gqlmodel.toml` and the settings resolved from it plus command-line flags.

use std::fs;
use std::path::{Path, PathBuf};

use clap::Args;
use gqlmodel_core::VariableSource;
use serde::Deserialize;
use tracing::debug;

/// Config file looked up in the working directory when `--config` is absent.
pub const CONFIG_FILE: &str = "gqlmodel.toml";

/// Contents of a config file. Relative paths are relative to the file.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Config {
    /// Schema name.
    pub schema: Option<String>,
    /// Directories searched for the schema.
    pub schema_dirs: Vec<PathBuf>,
    /// Where generated files go.
    pub out_dir: Option<PathBuf>,
    /// Operation documents or directories.
    pub operations: Vec<PathBuf>,
    /// Variable source name, parsed when settings are resolved.
    pub variables: Option<String>,
}

impl Config {
    /// Read and parse `path`, resolving its paths against the file's directory.
    pub fn load(path: &Path) -> Result<Self, String> {
        let content = fs::read_to_string(path)
            .map_err(|err| format!("Failed to read {}: {err}", path.display()))?;
        let config: Config = toml::from_str(&content)
            .map_err(|err| format!("Failed to parse {}: {err}", path.display()))?;
        let base = path.parent().unwrap_or_else(|| Path::new("."));
        Ok(config.relative_to(base))
    }

    /// `--config` if given, else `gqlmodel.toml` in `cwd` if it exists.
    pub fn discover(explicit: Option<&Path>, cwd: &Path) -> Result<Option<Self>, String> {
        if let Some(path) = explicit {
            return Self::load(path).map(Some);
        }
        let default = cwd.join(CONFIG_FILE);
        if default.is_file() {
            debug!("Using config {}", default.display());
            return Self::load(&default).map(Some);
        }
        Ok(None)
    }

    fn relative_to(self, base: &Path) -> Self {
        let join = |path: PathBuf| {
            if path.is_absolute() {
                path
            } else {
                base.join(path)
            }
        };
        Self {
            schema: self.schema,
            schema_dirs: self.schema_dirs.into_iter().map(join).collect(),
            out_dir: self.out_dir.map(join),
            operations: self.operations.into_iter().map(join).collect(),
            variables: self.variables,
        }
    }
}

/// Flags shared by `generate` and `check`.
#[derive(Args, Debug, Clone, Default)]
pub struct InputArgs {
    /// Operation documents or directories.
    #[arg(
        value_name = "OPERATIONS",
        help = "Operation documents, or directories searched for *.graphql"
    )]
    pub operations: Vec<PathBuf>,

    /// Schema name.
    #[arg(long, short = 's', help = "Schema name, without the .graphql extension")]
    pub schema: Option<String>,

    /// Directories searched for the schema.
    #[arg(
        long = "schema-dir",
        value_name = "DIR",
        help = "Directory searched for the schema; may be repeated"
    )]
    pub schema_dirs: Vec<PathBuf>,

    /// Explicit config file.
    #[arg(long, value_name = "PATH", help = "Config file. Defaults to ./gqlmodel.toml")]
    pub config: Option<PathBuf>,

    /// Where the `Variables` fields come from.
    #[arg(long, help = "Variable source: auto, declared or bindings")]
    pub variables: Option<VariableSource>,

    /// Operation to pick from multi-operation documents.
    #[arg(long = "operation-name", help = "Operation to use from each document")]
    pub operation_name: Option<String>,
}

/// Everything a run needs, after merging flags over the config file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Settings {
    /// Schema name.
    pub schema: String,
    /// Directories searched for the schema, in order.
    pub schema_dirs: Vec<PathBuf>,
    /// Operation documents or directories.
    pub operations: Vec<PathBuf>,
    /// Output directory; `None` writes next to each document.
    pub out_dir: Option<PathBuf>,
    /// Where the `Variables` fields come from.
    pub variables: VariableSource,
    /// Operation to pick from multi-operation documents.
    pub operation_name: Option<String>,
}

impl Settings {
    /// Flags win over the config; an empty flag list falls back to the config.
    pub fn resolve(
        args: &InputArgs,
        out_dir: Option<PathBuf>,
        config: Option<Config>,
        cwd: &Path,
    ) -> Result<Self, String> {
        let config = config.unwrap_or_default();

        let schema = args
            .schema
            .clone()
            .or(config.schema)
            .ok_or("No schema given. Pass --schema or set `schema` in gqlmodel.toml")?;

        let schema_dirs = first_non_empty(&args.schema_dirs, config.schema_dirs)
            .unwrap_or_else(|| vec![cwd.to_path_buf()]);

        let operations = first_non_empty(&args.operations, config.operations)
            .ok_or("No operation documents given")?;

        let variables = match (args.variables, config.variables) {
            (Some(source), _) => source,
            (None, Some(source)) => source.parse()?,
            (None, None) => VariableSource::default(),
        };

        Ok(Self {
            schema,
            schema_dirs,
            operations,
            out_dir: out_dir.or(config.out_dir),
            variables,
            operation_name: args.operation_name.clone(),
        })
    }
}

fn first_non_empty(flags: &[PathBuf], config: Vec<PathBuf>) -> Option<Vec<PathBuf>> {
    if !flags.is_empty() {
        Some(flags.to_vec())
    } else if !config.is_empty() {
        Some(config)
    } else {
        None
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn load_resolves_paths_against_config_dir() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join(CONFIG_FILE);
        fs::write(
            &path,
            r#"
schema = "starwars"
schema_dirs = ["schemas", "/abs/schemas"]
out_dir = "src/generated"
operations = ["queries"]
variables = "declared"
"#,
        )
        .unwrap();

        let config = Config::load(&path).unwrap();
        assert_eq!(config.schema.as_deref(), Some("starwars"));
        assert_eq!(
            config.schema_dirs,
            vec![dir.path().join("schemas"), PathBuf::from("/abs/schemas")]
        );
        assert_eq!(config.out_dir, Some(dir.path().join("src/generated")));
        assert_eq!(config.operations, vec![dir.path().join("queries")]);
    }

    #[test]
    fn unknown_keys_are_rejected() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join(CONFIG_FILE);
        fs::write(&path, "schemas = \"oops\"\n").unwrap();
        let err = Config::load(&path).unwrap_err();
        assert!(err.starts_with("Failed to parse"));
    }

    #[test]
    fn discover_without_file_is_none() {
        let dir = TempDir::new().unwrap();
        assert_eq!(Config::discover(None, dir.path()).unwrap(), None);
    }

    #[test]
    fn flags_override_config() {
        let args = InputArgs {
            schema: Some("cli".into()),
            operations: vec![PathBuf::from("a.graphql")],
            variables: Some(VariableSource::Bindings),
            ..InputArgs::default()
        };
        let config = Config {
            schema: Some("config".into()),
            schema_dirs: vec![PathBuf::from("schemas")],
            operations: vec![PathBuf::from("queries")],
            out_dir: Some(PathBuf::from("out")),
            variables: Some("declared".into()),
        };
        let settings = Settings::resolve(&args, None, Some(config), Path::new("/work")).unwrap();
        assert_eq!(settings.schema, "cli");
        assert_eq!(settings.schema_dirs, vec![PathBuf::from("schemas")]);
        assert_eq!(settings.operations, vec![PathBuf::from("a.graphql")]);
        assert_eq!(settings.out_dir, Some(PathBuf::from("out")));
        assert_eq!(settings.variables, VariableSource::Bindings);
    }

    #[test]
    fn defaults_without_config() {
        let args = InputArgs {
            schema: Some("api".into()),
            operations: vec![PathBuf::from("q.graphql")],
            ..InputArgs::default()
        };
        let settings = Settings::resolve(&args, None, None, Path::new("/work")).unwrap();
        assert_eq!(settings.schema_dirs, vec![PathBuf::from("/work")]);
        assert_eq!(settings.variables, VariableSource::Auto);
        assert_eq!(settings.out_dir, None);
    }

    #[test]
    fn missing_schema_or_operations_fail() {
        let no_schema = InputArgs {
            operations: vec![PathBuf::from("q.graphql")],
            ..InputArgs::default()
        };
        assert!(Settings::resolve(&no_schema, None, None, Path::new(".")).is_err());

        let no_operations = InputArgs {
            schema: Some("api".into()),
            ..InputArgs::default()
        };
        assert!(Settings::resolve(&no_operations, None, None, Path::new(".")).is_err());
    }

    #[test]
    fn bad_variable_source_in_config_fails() {
        let args = InputArgs {
            schema: Some("api".into()),
            operations: vec![PathBuf::from("q.graphql")],
            ..InputArgs::default()
        };
        let config = Config {
            variables: Some("sometimes".into()),
            ..Config::default()
        };
        let err = Settings::resolve(&args, None, Some(config), Path::new(".")).unwrap_err();
        assert!(err.contains("sometimes"));
    }
}
