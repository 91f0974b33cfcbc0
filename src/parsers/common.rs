use std::fs::File;
use std::io::{BufReader, Read};
use std::path::Path;
use tree_sitter::{Language, Node as TSNode, Parser, Tree};

use super::ParseError;

pub struct TreeSitterParser {
    parser: Parser,
}

impl TreeSitterParser {
    pub fn new(language: Language) -> Result<Self, ParseError> {
        let mut parser = Parser::new();
        parser
            .set_language(language)
            .map_err(|err| ParseError::Language(err.to_string()))?;
        Ok(Self { parser })
    }

    pub fn parse_source(&mut self, source: &str, file_path: &Path) -> Result<Tree, ParseError> {
        self.parser
            .parse(source, None)
            .ok_or_else(|| ParseError::Syntax {
                file: file_path.to_path_buf(),
                message: "parser produced no tree".to_string(),
            })
    }
}

/// Buffered read of a whole source file.
pub fn read_source(file_path: &Path) -> Result<String, ParseError> {
    let io_err = |source| ParseError::Io {
        path: file_path.to_path_buf(),
        source,
    };

    let file = File::open(file_path).map_err(io_err)?;
    let file_size = file.metadata().map_err(io_err)?.len() as usize;

    let mut reader = BufReader::with_capacity(file_size.clamp(1, 8192), file);
    let mut content = String::with_capacity(file_size);
    reader.read_to_string(&mut content).map_err(io_err)?;
    Ok(content)
}

pub fn extract_text<'a>(node: &TSNode, source: &'a [u8]) -> &'a str {
    std::str::from_utf8(&source[node.byte_range()]).unwrap_or("")
}

pub fn find_child_by_kind<'a>(node: &'a TSNode, kind: &str) -> Option<TSNode<'a>> {
    for child in node.children(&mut node.walk()) {
        if child.kind() == kind {
            return Some(child);
        }
    }
    None
}
