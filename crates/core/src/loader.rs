//! Schema lookup, metadata loading and the shared schema cache.
//!
//! A schema named `starwars` lives in `starwars.graphql` inside one of the
//! search directories. An optional `starwars.meta.json` next to it carries
//! type mapping overrides plus extra imports and derives for generated code.

use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::{Arc, PoisonError, RwLock};

use indexmap::IndexMap;
use serde::Deserialize;
use tracing::{debug, warn};

use crate::emit::EmitOptions;
use crate::error::{GenerationError, Warning};
use crate::mapping::NameMapping;
use crate::schema::Schema;

const SCHEMA_EXTENSION: &str = "graphql";
const METADATA_SUFFIX: &str = "meta.json";

/// Contents of a `<name>.meta.json` file.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct Metadata {
    /// Schema type name to Rust type path.
    pub mappings: IndexMap<String, String>,
    /// Extra `use` lines for every generated file.
    pub imports: Vec<String>,
    /// Extra derives for every generated struct.
    pub derives: Vec<String>,
}

impl Metadata {
    /// Parse a metadata document; `path` is only used for the error.
    pub fn parse(path: &Path, text: &str) -> Result<Self, GenerationError> {
        serde_json::from_str(text).map_err(|e| GenerationError::MetadataParse {
            path: path.to_path_buf(),
            message: e.to_string(),
        })
    }

    fn emit_options(&self) -> EmitOptions {
        EmitOptions {
            imports: self.imports.clone(),
            derives: self.derives.clone(),
        }
    }
}

/// A parsed schema together with everything needed to generate against it.
#[derive(Debug, Clone)]
pub struct LoadedSchema {
    /// Schema name without extension.
    pub name: String,
    /// Parsed type graph.
    pub schema: Schema,
    /// Default mappings with the metadata mappings on top.
    pub mapping: NameMapping,
    /// Imports and derives from the metadata.
    pub emit: EmitOptions,
    /// Warnings raised while parsing the SDL.
    pub warnings: Vec<Warning>,
}

impl LoadedSchema {
    /// Build from SDL text and optional metadata, without touching the disk.
    pub fn from_sdl(
        name: &str,
        sdl: &str,
        metadata: Option<Metadata>,
    ) -> Result<Self, GenerationError> {
        let (schema, warnings) = Schema::from_sdl(name, sdl)?;
        for warning in &warnings {
            warn!("{warning}");
        }
        let metadata = metadata.unwrap_or_default();
        Ok(Self {
            name: name.to_string(),
            schema,
            mapping: NameMapping::with_overrides(metadata.mappings.clone()),
            emit: metadata.emit_options(),
            warnings,
        })
    }
}

/// Finds schema files by name across an ordered list of directories.
#[derive(Debug, Clone, Default)]
pub struct SchemaLocator {
    search_dirs: Vec<PathBuf>,
}

impl SchemaLocator {
    /// Search `search_dirs` in the given order.
    pub fn new<I, P>(search_dirs: I) -> Self
    where
        I: IntoIterator<Item = P>,
        P: Into<PathBuf>,
    {
        Self {
            search_dirs: search_dirs.into_iter().map(Into::into).collect(),
        }
    }

    /// Directories searched, in order.
    pub fn search_dirs(&self) -> &[PathBuf] {
        &self.search_dirs
    }

    /// First `<dir>/<name>.graphql` that exists, in search order.
    pub fn locate(&self, name: &str) -> Result<PathBuf, GenerationError> {
        self.search_dirs
            .iter()
            .map(|dir| dir.join(format!("{name}.{SCHEMA_EXTENSION}")))
            .find(|path| path.is_file())
            .ok_or_else(|| GenerationError::SchemaNotFound {
                name: name.to_string(),
                searched: self.search_dirs.clone(),
            })
    }

    /// Locate, read and parse a schema plus its metadata.
    pub fn load(&self, name: &str) -> Result<LoadedSchema, GenerationError> {
        let path = self.locate(name)?;
        debug!("Loading schema '{}' from {}", name, path.display());
        let sdl = read(&path)?;
        let metadata = load_metadata(&path, name)?;
        LoadedSchema::from_sdl(name, &sdl, metadata)
    }
}

fn load_metadata(schema_path: &Path, name: &str) -> Result<Option<Metadata>, GenerationError> {
    let path = schema_path.with_file_name(format!("{name}.{METADATA_SUFFIX}"));
    if !path.is_file() {
        return Ok(None);
    }
    debug!("Loading metadata from {}", path.display());
    let text = read(&path)?;
    Metadata::parse(&path, &text).map(Some)
}

fn read(path: &Path) -> Result<String, GenerationError> {
    fs::read_to_string(path).map_err(|source| GenerationError::Io {
        path: path.to_path_buf(),
        source,
    })
}

/// Loaded schemas by name, shared read-only once loaded.
#[derive(Debug, Default)]
pub struct SchemaCache {
    locator: SchemaLocator,
    entries: RwLock<HashMap<String, Arc<LoadedSchema>>>,
}

impl SchemaCache {
    /// An empty cache loading through `locator`.
    pub fn new(locator: SchemaLocator) -> Self {
        Self {
            locator,
            entries: RwLock::new(HashMap::new()),
        }
    }

    /// Locator used for cache misses.
    pub fn locator(&self) -> &SchemaLocator {
        &self.locator
    }

    /// Cached schema, loading it on first use. Failed loads are not cached.
    pub fn get(&self, name: &str) -> Result<Arc<LoadedSchema>, GenerationError> {
        if let Some(hit) = self
            .entries
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .get(name)
        {
            return Ok(Arc::clone(hit));
        }

        let loaded = Arc::new(self.locator.load(name)?);
        let mut entries = self.entries.write().unwrap_or_else(PoisonError::into_inner);
        // Another thread may have loaded it meanwhile; keep the first.
        Ok(Arc::clone(entries.entry(name.to_string()).or_insert(loaded)))
    }

    /// Number of schemas loaded so far.
    pub fn len(&self) -> usize {
        self.entries
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }

    /// Whether nothing has been loaded yet.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
