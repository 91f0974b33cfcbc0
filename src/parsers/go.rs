use std::cell::RefCell;
use std::collections::BTreeSet;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::debug;
use tree_sitter::Node as TSNode;

use super::build_context::BuildContext;
use super::common::{extract_text, find_child_by_kind, read_source, TreeSitterParser};
use super::{ImportExtractor, PackageImports, ParseError};

/// Package clause name that `go/build` never treats as a real package.
const DOCUMENTATION_PACKAGE: &str = "documentation";

/// Reads the package clause and imports of every buildable `.go` file in a
/// directory, the way `go/build` does in its default mode: test files,
/// `_`/`.`-prefixed files and files excluded by build constraints for the
/// target do not count, and only the file header (package clause and import
/// declarations) is parsed.
pub struct GoParser {
    parser: RefCell<TreeSitterParser>,
    context: BuildContext,
}

/// What a single file's header declares.
#[derive(Debug)]
struct GoFileHeader {
    package: String,
    imports: Vec<String>,
}

impl GoParser {
    /// Parser that evaluates build constraints for the host platform.
    pub fn new() -> Result<Self, ParseError> {
        Self::with_context(BuildContext::host())
    }

    pub fn with_context(context: BuildContext) -> Result<Self, ParseError> {
        let parser = TreeSitterParser::new(tree_sitter_go::language())?;
        Ok(Self {
            parser: RefCell::new(parser),
            context,
        })
    }

    fn source_files(&self, dir: &Path) -> Result<Vec<PathBuf>, ParseError> {
        let io_err = |path: &Path, source| ParseError::Io {
            path: path.to_path_buf(),
            source,
        };

        let mut files = Vec::new();
        for entry in fs::read_dir(dir).map_err(|err| io_err(dir, err))? {
            let entry = entry.map_err(|err| io_err(dir, err))?;
            let file_name = entry.file_name();
            let Some(name) = file_name.to_str() else {
                continue;
            };
            if !is_go_source_name(name) {
                continue;
            }
            if !self.context.matches_file_name(name) {
                debug!(
                    "Skipping {} (not built for {}/{})",
                    name,
                    self.context.goos(),
                    self.context.goarch()
                );
                continue;
            }

            // Symlinked sources count when they point at a regular file.
            let path = entry.path();
            let metadata = fs::metadata(&path).map_err(|err| io_err(&path, err))?;
            if metadata.is_file() {
                files.push(path);
            }
        }

        files.sort();
        Ok(files)
    }

    fn parse_header(&self, source: &str, file_path: &Path) -> Result<GoFileHeader, ParseError> {
        let tree = self.parser.borrow_mut().parse_source(source, file_path)?;
        let root = tree.root_node();
        let source_bytes = source.as_bytes();

        let mut package = None;
        let mut imports = Vec::new();

        let mut cursor = root.walk();
        for child in root.named_children(&mut cursor) {
            match child.kind() {
                "comment" => {}
                "package_clause" if package.is_none() => {
                    if child.has_error() {
                        return Err(syntax_error(file_path, &child, "malformed package clause"));
                    }
                    package = find_child_by_kind(&child, "package_identifier")
                        .map(|ident| extract_text(&ident, source_bytes).to_string());
                }
                "import_declaration" if package.is_some() => {
                    if child.has_error() {
                        return Err(syntax_error(file_path, &child, "malformed import declaration"));
                    }
                    self.process_import(&child, source_bytes, file_path, &mut imports)?;
                }
                "ERROR"
                    if package.is_none()
                        || extract_text(&child, source_bytes)
                            .trim_start()
                            .starts_with("import") =>
                {
                    return Err(syntax_error(file_path, &child, "unexpected input"));
                }
                // Imports only appear before the first other declaration, so
                // anything else (including unparsable bodies) ends the header.
                _ => break,
            }
        }

        let package = package.ok_or_else(|| ParseError::Syntax {
            file: file_path.to_path_buf(),
            message: "expected 'package' clause".to_string(),
        })?;

        Ok(GoFileHeader { package, imports })
    }

    fn process_import(
        &self,
        import_node: &TSNode,
        source: &[u8],
        file_path: &Path,
        imports: &mut Vec<String>,
    ) -> Result<(), ParseError> {
        if let Some(import_spec_list) = find_child_by_kind(import_node, "import_spec_list") {
            for import_spec in import_spec_list.named_children(&mut import_spec_list.walk()) {
                if import_spec.kind() == "import_spec" {
                    imports.push(self.import_path(&import_spec, source, file_path)?);
                }
            }
        } else if let Some(import_spec) = find_child_by_kind(import_node, "import_spec") {
            imports.push(self.import_path(&import_spec, source, file_path)?);
        }
        Ok(())
    }

    fn import_path(
        &self,
        import_spec: &TSNode,
        source: &[u8],
        file_path: &Path,
    ) -> Result<String, ParseError> {
        let literal = import_spec
            .child_by_field_name("path")
            .map(|path| extract_text(&path, source))
            .unwrap_or("");

        unquote(literal)
            .filter(|path| !path.is_empty())
            .ok_or_else(|| syntax_error(file_path, import_spec, "invalid import path"))
    }
}

impl ImportExtractor for GoParser {
    fn extract_imports(&self, dir: &Path) -> Result<PackageImports, ParseError> {
        let mut package: Option<(String, PathBuf)> = None;
        let mut imports = BTreeSet::new();

        for file_path in self.source_files(dir)? {
            let source = read_source(&file_path)?;
            let builds = self
                .context
                .should_build(&source)
                .map_err(|message| ParseError::Syntax {
                    file: file_path.clone(),
                    message,
                })?;
            if !builds {
                debug!("Skipping {} (build constraint)", file_path.display());
                continue;
            }

            let header = self.parse_header(&source, &file_path)?;
            if header.package == DOCUMENTATION_PACKAGE {
                debug!("Skipping {} (documentation package)", file_path.display());
                continue;
            }

            if let Some((name, first_file)) = &package {
                if *name != header.package {
                    return Err(ParseError::MultiplePackages {
                        dir: dir.to_path_buf(),
                        first: name.clone(),
                        first_file: first_file.clone(),
                        second: header.package,
                        second_file: file_path,
                    });
                }
            } else {
                package = Some((header.package, file_path));
            }

            imports.extend(header.imports);
        }

        if package.is_none() {
            return Ok(PackageImports::NotAPackage);
        }

        Ok(PackageImports::Imports(imports.into_iter().collect()))
    }
}

fn is_go_source_name(name: &str) -> bool {
    name.ends_with(".go")
        && !name.ends_with("_test.go")
        && !name.starts_with('_')
        && !name.starts_with('.')
}

/// Decodes a Go string literal the way `strconv.Unquote` does.
fn unquote(literal: &str) -> Option<String> {
    if let Some(raw) = literal
        .strip_prefix('`')
        .and_then(|rest| rest.strip_suffix('`'))
    {
        return Some(raw.replace('\r', ""));
    }

    let body = literal.strip_prefix('"')?.strip_suffix('"')?;
    let mut bytes = Vec::with_capacity(body.len());
    let mut chars = body.chars();
    while let Some(c) = chars.next() {
        if c != '\\' {
            push_char(&mut bytes, c);
            continue;
        }
        match chars.next()? {
            'a' => bytes.push(0x07),
            'b' => bytes.push(0x08),
            'f' => bytes.push(0x0c),
            'n' => bytes.push(b'\n'),
            'r' => bytes.push(b'\r'),
            't' => bytes.push(b'\t'),
            'v' => bytes.push(0x0b),
            '\\' => bytes.push(b'\\'),
            '"' => bytes.push(b'"'),
            'x' => bytes.push(u8::try_from(escape_value(&mut chars, 16, 2)?).ok()?),
            'u' => push_char(&mut bytes, char::from_u32(escape_value(&mut chars, 16, 4)?)?),
            'U' => push_char(&mut bytes, char::from_u32(escape_value(&mut chars, 16, 8)?)?),
            digit @ '0'..='7' => {
                let rest = escape_value(&mut chars, 8, 2)?;
                let value = digit.to_digit(8)? * 64 + rest;
                bytes.push(u8::try_from(value).ok()?);
            }
            _ => return None,
        }
    }

    String::from_utf8(bytes).ok()
}

fn push_char(bytes: &mut Vec<u8>, c: char) {
    let mut buf = [0; 4];
    bytes.extend_from_slice(c.encode_utf8(&mut buf).as_bytes());
}

fn escape_value(chars: &mut std::str::Chars<'_>, radix: u32, digits: usize) -> Option<u32> {
    let mut value = 0;
    for _ in 0..digits {
        value = value * radix + chars.next()?.to_digit(radix)?;
    }
    Some(value)
}

fn syntax_error(file_path: &Path, node: &TSNode, message: &str) -> ParseError {
    let position = node.start_position();
    ParseError::Syntax {
        file: file_path.to_path_buf(),
        message: format!("{}:{}: {}", position.row + 1, position.column + 1, message),
    }
}
