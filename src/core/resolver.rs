use std::fmt;
use std::fs;
use std::path::Path;

use crate::error::{GraphError, Result};

/// File name of the module manifest at the checkout root.
pub const MANIFEST_FILE: &str = "go.mod";

const MODULE_KEYWORD: &str = "module";

/// Root import path of a module, e.g. `example.com/project`.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ModulePath {
    path: String,
    prefix: String,
}

impl ModulePath {
    pub fn new(path: impl Into<String>) -> Self {
        let path = path.into();
        let prefix = format!("{}/", path);
        Self { path, prefix }
    }

    pub fn as_str(&self) -> &str {
        &self.path
    }

    /// Prefix shared by the import paths of every package below the root.
    pub fn prefix(&self) -> &str {
        &self.prefix
    }

    /// Relative package path of an in-module import, `None` for anything
    /// else (including the module root itself).
    pub fn strip<'a>(&self, import: &'a str) -> Option<&'a str> {
        import.strip_prefix(self.prefix.as_str())
    }
}

impl fmt::Display for ModulePath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.path)
    }
}

pub struct ModuleResolver;

impl ModuleResolver {
    pub fn new() -> Self {
        Self
    }

    pub fn resolve(&self, root_path: &Path) -> Result<ModulePath> {
        let manifest_path = root_path.join(MANIFEST_FILE);
        let contents =
            fs::read(&manifest_path).map_err(|source| GraphError::ManifestUnreadable {
                path: manifest_path.clone(),
                source,
            })?;

        parse_module_path(&contents)
            .map(ModulePath::new)
            .map_err(|reason| GraphError::ManifestMalformed {
                path: manifest_path,
                reason: reason.to_string(),
            })
    }
}

impl Default for ModuleResolver {
    fn default() -> Self {
        Self::new()
    }
}

/// Pulls the module path out of the first declaration line of a manifest.
///
/// Leading blank and `//` comment lines are skipped. The declaration must be
/// newline-terminated and read `module <path>`, optionally with the path
/// quoted.
pub fn parse_module_path(contents: &[u8]) -> std::result::Result<String, &'static str> {
    let mut rest = contents;
    let line = loop {
        let newline = rest
            .iter()
            .position(|&b| b == b'\n')
            .ok_or("no newline-terminated module declaration")?;
        let line = std::str::from_utf8(&rest[..newline]).map_err(|_| "manifest is not UTF-8")?;
        rest = &rest[newline + 1..];

        let line = line.trim();
        if !line.is_empty() && !line.starts_with("//") {
            break line;
        }
    };

    let mut fields = line.split_whitespace();
    if fields.next() != Some(MODULE_KEYWORD) {
        return Err("first declaration is not 'module'");
    }
    let path = fields.next().ok_or("module declaration has no path")?;
    let path = strip_quotes(path);
    if path.is_empty() {
        return Err("module declaration has an empty path");
    }

    Ok(path.to_string())
}

fn strip_quotes(path: &str) -> &str {
    for quote in ['"', '`'] {
        if let Some(inner) = path
            .strip_prefix(quote)
            .and_then(|rest| rest.strip_suffix(quote))
        {
            return inner;
        }
    }
    path
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_plain_declaration() {
        let parsed = parse_module_path(b"module example.com/project\n\ngo 1.21\n");
        assert_eq!(parsed.as_deref(), Ok("example.com/project"));
    }

    #[test]
    fn skips_leading_comments_and_crlf() {
        let parsed = parse_module_path(b"// generated\r\n\r\nmodule example.com/x\r\n");
        assert_eq!(parsed.as_deref(), Ok("example.com/x"));
    }

    #[test]
    fn unquotes_quoted_paths() {
        assert_eq!(
            parse_module_path(b"module \"example.com/q\"\n").as_deref(),
            Ok("example.com/q")
        );
    }

    #[test]
    fn rejects_missing_terminator_or_path() {
        assert!(parse_module_path(b"module example.com/project").is_err());
        assert!(parse_module_path(b"module\n").is_err());
        assert!(parse_module_path(b"go 1.21\nmodule example.com/x\n").is_err());
        assert!(parse_module_path(b"").is_err());
    }

    #[test]
    fn strip_requires_separator_after_module_path() {
        let module = ModulePath::new("example.com/project");
        assert_eq!(module.strip("example.com/project/a/b"), Some("a/b"));
        assert_eq!(module.strip("example.com/project"), None);
        assert_eq!(module.strip("example.com/projectx/a"), None);
        assert_eq!(module.strip("fmt"), None);
    }
}
