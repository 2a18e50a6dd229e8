//! Declaration source: the set of parsed units of a component project.
//!
//! A project directory is scanned the way the TypeScript compiler would
//! scan it: `tsconfig.json` `files`/`include`/`exclude` when present,
//! every `.ts`/`.tsx` file otherwise, following relative `extends`. Units
//! that fail to parse are skipped with a warning rather than aborting the
//! scan; units that are not valid UTF-8 are decoded lossily.

use crate::ast::Module;
use crate::parser::{parse_module, ParseError};
use rustc_hash::FxHashMap;
use serde::Deserialize;
use std::fs;
use std::path::{Component, Path, PathBuf};
use tracing::{debug, warn};

/// Index of a unit inside its [`DeclarationSource`].
pub type UnitId = usize;

/// Errors raised while loading a declaration source.
#[derive(Debug, thiserror::Error)]
pub enum SourceError {
    /// Project directory missing or not a directory
    #[error("Directory not found: {}", .0.display())]
    DirectoryNotFound(PathBuf),

    /// Failed to read a file or directory
    #[error("Failed to read {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Unreadable or invalid compiler configuration
    #[error("Invalid compiler configuration {}: {message}", .path.display())]
    Config { path: PathBuf, message: String },
}

/// The subset of `tsconfig.json` that decides which units belong to a
/// project.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TsConfig {
    /// Base configuration this one inherits from
    #[serde(default)]
    pub extends: Option<String>,

    #[serde(default)]
    pub files: Option<Vec<String>>,

    #[serde(default)]
    pub include: Option<Vec<String>>,

    #[serde(default)]
    pub exclude: Option<Vec<String>>,

    #[serde(default)]
    pub compiler_options: CompilerOptions,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CompilerOptions {
    #[serde(default)]
    pub out_dir: Option<String>,
}

impl TsConfig {
    /// Parse `tsconfig.json` text. Comments and trailing commas are
    /// accepted, as the compiler accepts them.
    pub fn parse(text: &str, path: &Path) -> Result<Self, SourceError> {
        serde_json::from_str(&strip_jsonc(text)).map_err(|e| SourceError::Config {
            path: path.to_path_buf(),
            message: e.to_string(),
        })
    }

    /// Read `tsconfig.json` from a file.
    pub fn from_file(path: &Path) -> Result<Self, SourceError> {
        let text = fs::read_to_string(path).map_err(|e| SourceError::Config {
            path: path.to_path_buf(),
            message: e.to_string(),
        })?;
        Self::parse(&text, path)
    }

    /// Read `tsconfig.json` and merge in the configurations it extends.
    ///
    /// Relative `extends` paths are followed; package references are not.
    /// Inherited paths are rebased onto the directory of `path`.
    pub fn load(path: &Path) -> Result<Self, SourceError> {
        let dir = config_dir(path);
        let mut config = Self::from_file(path)?;
        let mut next = config.extends.take().map(|base| (dir.clone(), base));
        let mut depth = 0;

        while let Some((from, base)) = next.take() {
            if !base.starts_with("./") && !base.starts_with("../") {
                debug!(config = %path.display(), extends = %base, "not following package extends");
                break;
            }
            depth += 1;
            if depth > MAX_EXTENDS_DEPTH {
                return Err(SourceError::Config {
                    path: path.to_path_buf(),
                    message: format!("extends chain deeper than {}", MAX_EXTENDS_DEPTH),
                });
            }

            let mut base_path = normalize_path(&from.join(&base));
            if base_path.extension().is_none() {
                base_path.set_extension("json");
            }
            let mut parent = Self::from_file(&base_path)?;
            let base_dir = config_dir(&base_path);
            parent.rebase(&base_dir, &dir);
            next = parent.extends.take().map(|grand| (base_dir, grand));
            config.inherit(parent);
        }
        Ok(config)
    }

    /// Take every setting this configuration leaves unset from `base`.
    fn inherit(&mut self, base: TsConfig) {
        if self.files.is_none() {
            self.files = base.files;
        }
        if self.include.is_none() {
            self.include = base.include;
        }
        if self.exclude.is_none() {
            self.exclude = base.exclude;
        }
        if self.compiler_options.out_dir.is_none() {
            self.compiler_options.out_dir = base.compiler_options.out_dir;
        }
    }

    fn rebase(&mut self, from: &Path, to: &Path) {
        for entries in [&mut self.files, &mut self.include, &mut self.exclude]
            .into_iter()
            .flatten()
        {
            for entry in entries.iter_mut() {
                *entry = rebase_entry(entry, from, to);
            }
        }
        if let Some(out_dir) = &mut self.compiler_options.out_dir {
            *out_dir = rebase_entry(out_dir, from, to);
        }
    }

    fn patterns(
        entries: &[String],
        path: &Path,
    ) -> Result<Vec<glob::Pattern>, SourceError> {
        entries
            .iter()
            .map(|entry| {
                let entry = entry.trim_start_matches("./").trim_end_matches('/');
                // A bare directory name includes everything below it.
                let has_wildcard = entry.contains('*') || entry.contains('?');
                let has_extension = Path::new(entry).extension().is_some();
                let pattern = if !has_wildcard && !has_extension {
                    format!("{}/**/*", entry)
                } else {
                    entry.to_string()
                };
                glob::Pattern::new(&pattern).map_err(|e| SourceError::Config {
                    path: path.to_path_buf(),
                    message: format!("invalid pattern '{}': {}", entry, e),
                })
            })
            .collect()
    }
}

/// One parsed source unit.
#[derive(Debug, Clone)]
pub struct SourceUnit {
    pub id: UnitId,
    /// Absolute path of the unit
    pub path: PathBuf,
    pub module: Module,
}

impl SourceUnit {
    /// `.d.ts` files, or units that declare nothing but types.
    pub fn is_declaration_only(&self) -> bool {
        is_declaration_file(&self.path) || self.module.is_declaration_only()
    }

    /// Units that belong to third-party packages.
    pub fn is_dependency(&self) -> bool {
        self.path
            .components()
            .any(|c| c.as_os_str() == "node_modules")
    }
}

/// A unit that was found but could not be parsed.
#[derive(Debug, Clone)]
pub struct SkippedUnit {
    pub path: PathBuf,
    pub errors: Vec<ParseError>,
}

/// Parsed, immutable collection of the units of one project.
#[derive(Debug, Clone, Default)]
pub struct DeclarationSource {
    root: PathBuf,
    units: Vec<SourceUnit>,
    by_path: FxHashMap<PathBuf, UnitId>,
    skipped: Vec<SkippedUnit>,
}

impl DeclarationSource {
    /// Scan and parse the project rooted at `dir`.
    pub fn load(dir: impl AsRef<Path>) -> Result<Self, SourceError> {
        let dir = dir.as_ref();
        let root = dir
            .canonicalize()
            .map_err(|_| SourceError::DirectoryNotFound(dir.to_path_buf()))?;
        if !root.is_dir() {
            return Err(SourceError::DirectoryNotFound(dir.to_path_buf()));
        }

        let config_path = root.join("tsconfig.json");
        let config = if config_path.is_file() {
            TsConfig::load(&config_path)?
        } else {
            TsConfig::default()
        };

        let files = collect_files(&root, &config, &config_path)?;
        debug!(root = %root.display(), files = files.len(), "scanning declaration source");

        let mut source = DeclarationSource {
            root,
            ..Default::default()
        };
        for path in files {
            let bytes = fs::read(&path).map_err(|e| SourceError::Io {
                path: path.clone(),
                source: e,
            })?;
            let text = match String::from_utf8(bytes) {
                Ok(text) => text,
                Err(e) => {
                    warn!(unit = %path.display(), "unit is not valid UTF-8; decoding lossily");
                    String::from_utf8_lossy(e.as_bytes()).into_owned()
                }
            };
            source.add_unit(path, &text);
        }
        Ok(source)
    }

    /// Build a source from in-memory units. Relative paths are taken
    /// relative to `root`.
    pub fn from_units<P, S>(root: impl Into<PathBuf>, units: impl IntoIterator<Item = (P, S)>) -> Self
    where
        P: AsRef<Path>,
        S: AsRef<str>,
    {
        let root = normalize_path(&root.into());
        let mut source = DeclarationSource {
            root,
            ..Default::default()
        };
        for (path, text) in units {
            let path = normalize_path(&source.root.join(path.as_ref()));
            source.add_unit(path, text.as_ref());
        }
        source
    }

    fn add_unit(&mut self, path: PathBuf, text: &str) {
        let text = text.strip_prefix('\u{FEFF}').unwrap_or(text);
        match parse_module(text) {
            Ok(module) => {
                let id = self.units.len();
                self.by_path.insert(path.clone(), id);
                self.units.push(SourceUnit { id, path, module });
            }
            Err(errors) => {
                let first = errors.first().map(|e| e.to_string()).unwrap_or_default();
                warn!(unit = %path.display(), error = %first, "skipping unit that failed to parse");
                self.skipped.push(SkippedUnit { path, errors });
            }
        }
    }

    /// Absolute project directory.
    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn units(&self) -> &[SourceUnit] {
        &self.units
    }

    pub fn unit(&self, id: UnitId) -> &SourceUnit {
        &self.units[id]
    }

    pub fn unit_by_path(&self, path: &Path) -> Option<&SourceUnit> {
        self.by_path
            .get(&normalize_path(path))
            .map(|&id| &self.units[id])
    }

    /// Units that were found but skipped because they did not parse.
    pub fn skipped(&self) -> &[SkippedUnit] {
        &self.skipped
    }

    pub fn len(&self) -> usize {
        self.units.len()
    }

    pub fn is_empty(&self) -> bool {
        self.units.is_empty()
    }

    /// Resolve a relative module specifier (`./storage`, `../lib/index.js`)
    /// imported by `from` to a unit of this source.
    ///
    /// Package specifiers are never resolved; they name dependencies.
    pub fn resolve_module(&self, from: UnitId, specifier: &str) -> Option<UnitId> {
        if !specifier.starts_with("./") && !specifier.starts_with("../") && specifier != "." && specifier != ".." {
            return None;
        }
        let dir = self.units[from].path.parent()?;
        let base = normalize_path(&dir.join(specifier));

        let stem = match base.extension().and_then(|e| e.to_str()) {
            Some("js") | Some("jsx") | Some("mjs") | Some("cjs") => base.with_extension(""),
            _ => base.clone(),
        };

        let as_file = |suffix: &str| {
            let mut name = stem.as_os_str().to_os_string();
            name.push(suffix);
            PathBuf::from(name)
        };

        let candidates = [
            base.clone(),
            as_file(".ts"),
            as_file(".tsx"),
            as_file(".d.ts"),
            stem.join("index.ts"),
            stem.join("index.tsx"),
            stem.join("index.d.ts"),
        ];
        candidates
            .iter()
            .find_map(|candidate| self.by_path.get(candidate).copied())
    }
}

fn is_declaration_file(path: &Path) -> bool {
    path.file_name()
        .and_then(|name| name.to_str())
        .map(|name| name.ends_with(".d.ts"))
        .unwrap_or(false)
}

fn is_source_file(path: &Path) -> bool {
    matches!(
        path.extension().and_then(|e| e.to_str()),
        Some("ts") | Some("tsx")
    )
}

const MAX_EXTENDS_DEPTH: usize = 8;

fn config_dir(path: &Path) -> PathBuf {
    path.parent().map(Path::to_path_buf).unwrap_or_default()
}

/// Re-express `entry`, relative to `from`, relative to `to`.
fn rebase_entry(entry: &str, from: &Path, to: &Path) -> String {
    let joined = normalize_path(&from.join(entry));
    let rebased = match joined.strip_prefix(to) {
        Ok(relative) if relative.as_os_str().is_empty() => PathBuf::from("."),
        Ok(relative) => relative.to_path_buf(),
        Err(_) => joined,
    };
    rebased.to_string_lossy().replace('\\', "/")
}

/// Lexically normalize a path (resolve `.` and `..` without touching the
/// file system).
pub fn normalize_path(path: &Path) -> PathBuf {
    let mut out = PathBuf::new();
    for component in path.components() {
        match component {
            Component::CurDir => {}
            Component::ParentDir => {
                if !out.pop() {
                    out.push("..");
                }
            }
            other => out.push(other.as_os_str()),
        }
    }
    out
}

/// Files of the project, sorted for a deterministic unit order.
fn collect_files(root: &Path, config: &TsConfig, config_path: &Path) -> Result<Vec<PathBuf>, SourceError> {
    let out_dir = config
        .compiler_options
        .out_dir
        .as_deref()
        .map(|dir| normalize_path(&root.join(dir)));

    let mut all = Vec::new();
    walk(root, out_dir.as_deref(), &mut all)?;

    let match_options = glob::MatchOptions {
        case_sensitive: true,
        require_literal_separator: true,
        require_literal_leading_dot: false,
    };
    let relative = |path: &Path| -> String {
        path.strip_prefix(root)
            .unwrap_or(path)
            .to_string_lossy()
            .replace('\\', "/")
    };

    let include = match &config.include {
        Some(entries) => Some(TsConfig::patterns(entries, config_path)?),
        // An explicit `files` list without `include` includes nothing else.
        None if config.files.is_some() => Some(Vec::new()),
        None => None,
    };
    let exclude = match &config.exclude {
        Some(entries) => TsConfig::patterns(entries, config_path)?,
        None => Vec::new(),
    };

    let mut files: Vec<PathBuf> = all
        .into_iter()
        .filter(|path| {
            let rel = relative(path);
            let included = match &include {
                Some(patterns) => patterns.iter().any(|p| p.matches_with(&rel, match_options)),
                None => true,
            };
            included && !exclude.iter().any(|p| p.matches_with(&rel, match_options))
        })
        .collect();

    // `files` entries are always part of the project, even when excluded.
    for entry in config.files.iter().flatten() {
        let path = normalize_path(&root.join(entry));
        if path.is_file() && !files.contains(&path) {
            files.push(path);
        }
    }

    files.sort();
    Ok(files)
}

/// Recursively collect source files, skipping hidden directories,
/// `node_modules` and the compiler's output directory.
fn walk(dir: &Path, out_dir: Option<&Path>, files: &mut Vec<PathBuf>) -> Result<(), SourceError> {
    let entries = fs::read_dir(dir).map_err(|e| SourceError::Io {
        path: dir.to_path_buf(),
        source: e,
    })?;

    for entry in entries {
        let entry = entry.map_err(|e| SourceError::Io {
            path: dir.to_path_buf(),
            source: e,
        })?;
        let path = entry.path();

        if path.is_dir() {
            let name = entry.file_name();
            let name = name.to_string_lossy();
            if name.starts_with('.') || name == "node_modules" || Some(path.as_path()) == out_dir {
                continue;
            }
            walk(&path, out_dir, files)?;
        } else if is_source_file(&path) {
            files.push(path);
        }
    }
    Ok(())
}

/// Remove `//` and `/* */` comments and trailing commas from JSON text.
fn strip_jsonc(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    let mut chars = text.chars().peekable();
    let mut in_string = false;

    while let Some(c) = chars.next() {
        if in_string {
            out.push(c);
            match c {
                '\\' => {
                    if let Some(escaped) = chars.next() {
                        out.push(escaped);
                    }
                }
                '"' => in_string = false,
                _ => {}
            }
            continue;
        }

        match c {
            '"' => {
                in_string = true;
                out.push(c);
            }
            '/' if chars.peek() == Some(&'/') => {
                while let Some(&next) = chars.peek() {
                    if next == '\n' {
                        break;
                    }
                    chars.next();
                }
            }
            '/' if chars.peek() == Some(&'*') => {
                chars.next();
                let mut prev = '\0';
                for next in chars.by_ref() {
                    if prev == '*' && next == '/' {
                        break;
                    }
                    prev = next;
                }
            }
            _ => out.push(c),
        }
    }

    remove_trailing_commas(&out)
}

fn remove_trailing_commas(text: &str) -> String {
    let chars: Vec<char> = text.chars().collect();
    let mut out = String::with_capacity(text.len());
    let mut in_string = false;
    let mut i = 0;

    while i < chars.len() {
        let c = chars[i];
        if in_string {
            out.push(c);
            if c == '\\' && i + 1 < chars.len() {
                out.push(chars[i + 1]);
                i += 1;
            } else if c == '"' {
                in_string = false;
            }
        } else if c == '"' {
            in_string = true;
            out.push(c);
        } else if c == ',' {
            let next = chars[i + 1..].iter().find(|ch| !ch.is_whitespace());
            if !matches!(next, Some('}') | Some(']')) {
                out.push(c);
            }
        } else {
            out.push(c);
        }
        i += 1;
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_strip_jsonc() {
        let text = r#"{
            // compiler options
            "compilerOptions": { "outDir": "bin", /* inline */ },
            "include": ["src/**/*", "http://not-a-comment"],
        }"#;
        let config = TsConfig::parse(text, Path::new("tsconfig.json")).unwrap();
        assert_eq!(config.compiler_options.out_dir.as_deref(), Some("bin"));
        assert_eq!(config.include.unwrap()[1], "http://not-a-comment");
    }

    #[test]
    fn test_invalid_config_is_error() {
        let err = TsConfig::parse("{ include: }", Path::new("tsconfig.json")).unwrap_err();
        assert!(matches!(err, SourceError::Config { .. }));
    }

    #[test]
    fn test_normalize_path() {
        assert_eq!(
            normalize_path(Path::new("/a/b/./c/../d.ts")),
            PathBuf::from("/a/b/d.ts")
        );
    }

    #[test]
    fn test_from_units_skips_unparsable() {
        let source = DeclarationSource::from_units(
            "/project",
            [("index.ts", "export class A {}"), ("broken.ts", "class { }")],
        );
        assert_eq!(source.len(), 1);
        assert_eq!(source.skipped().len(), 1);
        assert!(source.unit_by_path(Path::new("/project/index.ts")).is_some());
    }

    #[test]
    fn test_resolve_module_candidates() {
        let source = DeclarationSource::from_units(
            "/project",
            [
                ("index.ts", "import { A } from './lib';"),
                ("lib/index.ts", "export class A {}"),
                ("util.ts", "export interface U {}"),
                ("types.d.ts", "export interface T {}"),
            ],
        );
        let index = source.unit_by_path(Path::new("/project/index.ts")).unwrap().id;
        let lib = source.unit_by_path(Path::new("/project/lib/index.ts")).unwrap().id;
        let util = source.unit_by_path(Path::new("/project/util.ts")).unwrap().id;
        let types = source.unit_by_path(Path::new("/project/types.d.ts")).unwrap().id;

        assert_eq!(source.resolve_module(index, "./lib"), Some(lib));
        assert_eq!(source.resolve_module(index, "./util.js"), Some(util));
        assert_eq!(source.resolve_module(index, "./types"), Some(types));
        assert_eq!(source.resolve_module(lib, "../util"), Some(util));
        assert_eq!(source.resolve_module(index, "@pulumi/pulumi"), None);
        assert!(source.unit(types).is_declaration_only());
    }
}
