//! Go build constraints.
//!
//! Decides whether a `.go` file takes part in the build for a target, from
//! its `_GOOS`/`_GOARCH` file name suffixes and its `//go:build` (or legacy
//! `// +build`) header lines. Tags that the context does not know about are
//! false.

use std::env;

const KNOWN_OS: &[&str] = &[
    "aix", "android", "darwin", "dragonfly", "freebsd", "hurd", "illumos", "ios", "js", "linux",
    "nacl", "netbsd", "openbsd", "plan9", "solaris", "wasip1", "windows", "zos",
];

const KNOWN_ARCH: &[&str] = &[
    "386", "amd64", "amd64p32", "arm", "armbe", "arm64", "arm64be", "loong64", "mips", "mipsle",
    "mips64", "mips64le", "mips64p32", "mips64p32le", "ppc", "ppc64", "ppc64le", "riscv",
    "riscv64", "s390", "s390x", "sparc", "sparc64", "wasm",
];

const UNIX_OS: &[&str] = &[
    "aix", "android", "darwin", "dragonfly", "freebsd", "hurd", "illumos", "ios", "linux",
    "netbsd", "openbsd", "solaris",
];

/// Newest `go1.N` release tag that is satisfied.
const GO_RELEASE_MINOR: u32 = 22;

/// Target platform that build constraints are evaluated against. The
/// compiler is always `gc` and cgo is treated as enabled.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BuildContext {
    goos: String,
    goarch: String,
}

impl BuildContext {
    pub fn new(goos: impl Into<String>, goarch: impl Into<String>) -> Self {
        Self {
            goos: goos.into(),
            goarch: goarch.into(),
        }
    }

    /// Context of the machine running the scan.
    pub fn host() -> Self {
        Self::new(go_os(env::consts::OS), go_arch(env::consts::ARCH))
    }

    pub fn goos(&self) -> &str {
        &self.goos
    }

    pub fn goarch(&self) -> &str {
        &self.goarch
    }

    pub fn matches_tag(&self, tag: &str) -> bool {
        if tag == self.goos || tag == self.goarch || tag == "gc" || tag == "cgo" {
            return true;
        }
        match tag {
            "unix" => UNIX_OS.contains(&self.goos.as_str()),
            "linux" => self.goos == "android",
            "solaris" => self.goos == "illumos",
            "darwin" => self.goos == "ios",
            _ => release_minor(tag).is_some_and(|minor| minor <= GO_RELEASE_MINOR),
        }
    }

    /// Applies the `name_GOOS_GOARCH.go`, `name_GOOS.go` and `name_GOARCH.go`
    /// conventions. The part before the first `_` is never a tag.
    pub fn matches_file_name(&self, name: &str) -> bool {
        let stem = name.strip_suffix(".go").unwrap_or(name);
        let stem = stem.strip_suffix("_test").unwrap_or(stem);
        let Some((_, tagged)) = stem.split_once('_') else {
            return true;
        };

        let parts: Vec<&str> = tagged.split('_').collect();
        let n = parts.len();
        if n >= 2 && KNOWN_OS.contains(&parts[n - 2]) && KNOWN_ARCH.contains(&parts[n - 1]) {
            return self.matches_tag(parts[n - 2]) && self.matches_tag(parts[n - 1]);
        }

        let last = parts[n - 1];
        if KNOWN_OS.contains(&last) || KNOWN_ARCH.contains(&last) {
            return self.matches_tag(last);
        }
        true
    }

    /// Evaluates the constraint lines in the leading `//` comments of a file.
    ///
    /// A `//go:build` line takes precedence over `// +build` lines; several
    /// `// +build` lines must all hold. Files without constraints build.
    pub fn should_build(&self, source: &str) -> Result<bool, String> {
        let mut go_build = None;
        let mut plus_build = Vec::new();

        for line in source.lines() {
            let line = line.trim();
            if line.is_empty() {
                continue;
            }
            if !line.starts_with("//") {
                break;
            }

            if let Some(expr) = constraint_body(line, "//go:build") {
                if go_build.is_some() {
                    return Err("multiple //go:build comments".to_string());
                }
                go_build = Some(expr);
            } else if let Some(expr) = constraint_body(line, "// +build") {
                plus_build.push(expr);
            }
        }

        match go_build {
            Some(expr) => self.eval_expr(expr),
            None => Ok(plus_build.iter().all(|line| self.eval_plus_build(line))),
        }
    }

    fn eval_expr(&self, expr: &str) -> Result<bool, String> {
        let tokens = tokenize(expr)?;
        let mut parser = ConstraintParser {
            tokens,
            pos: 0,
            context: self,
        };
        let value = parser.parse_or()?;
        if parser.pos != parser.tokens.len() {
            return Err(format!("unexpected token in //go:build {}", expr));
        }
        Ok(value)
    }

    /// Space-separated options are OR'd, comma-separated terms AND'd.
    fn eval_plus_build(&self, line: &str) -> bool {
        line.split_whitespace().any(|option| {
            option.split(',').all(|term| match term.strip_prefix('!') {
                Some(tag) => !tag.starts_with('!') && !self.matches_tag(tag),
                None => self.matches_tag(term),
            })
        })
    }
}

fn constraint_body<'a>(line: &'a str, prefix: &str) -> Option<&'a str> {
    let rest = line.strip_prefix(prefix)?;
    if rest.is_empty() || rest.starts_with([' ', '\t']) {
        Some(rest.trim())
    } else {
        None
    }
}

fn release_minor(tag: &str) -> Option<u32> {
    let minor = tag.strip_prefix("go1.")?;
    if minor.is_empty() || !minor.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    minor.parse().ok()
}

fn go_os(os: &str) -> &str {
    match os {
        "macos" => "darwin",
        other => other,
    }
}

fn go_arch(arch: &str) -> &str {
    match arch {
        "x86_64" => "amd64",
        "x86" => "386",
        "aarch64" => "arm64",
        "loongarch64" => "loong64",
        "wasm32" => "wasm",
        "powerpc" => "ppc",
        "powerpc64" if cfg!(target_endian = "little") => "ppc64le",
        "powerpc64" => "ppc64",
        "mips" if cfg!(target_endian = "little") => "mipsle",
        "mips64" if cfg!(target_endian = "little") => "mips64le",
        other => other,
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Token<'a> {
    LParen,
    RParen,
    Not,
    And,
    Or,
    Tag(&'a str),
}

fn is_tag_byte(b: u8) -> bool {
    b.is_ascii_alphanumeric() || b == b'_' || b == b'.'
}

fn tokenize(expr: &str) -> Result<Vec<Token<'_>>, String> {
    let bytes = expr.as_bytes();
    let mut tokens = Vec::new();
    let mut i = 0;

    while i < bytes.len() {
        match bytes[i] {
            b' ' | b'\t' => i += 1,
            b'(' => {
                tokens.push(Token::LParen);
                i += 1;
            }
            b')' => {
                tokens.push(Token::RParen);
                i += 1;
            }
            b'!' => {
                tokens.push(Token::Not);
                i += 1;
            }
            b'&' if bytes.get(i + 1) == Some(&b'&') => {
                tokens.push(Token::And);
                i += 2;
            }
            b'|' if bytes.get(i + 1) == Some(&b'|') => {
                tokens.push(Token::Or);
                i += 2;
            }
            b if is_tag_byte(b) => {
                let start = i;
                while i < bytes.len() && is_tag_byte(bytes[i]) {
                    i += 1;
                }
                tokens.push(Token::Tag(&expr[start..i]));
            }
            _ => {
                let c = expr[i..].chars().next().unwrap_or('?');
                return Err(format!("unexpected {:?} in //go:build {}", c, expr));
            }
        }
    }

    Ok(tokens)
}

/// Recursive descent over `||`, `&&`, `!` and parentheses.
struct ConstraintParser<'a, 'c> {
    tokens: Vec<Token<'a>>,
    pos: usize,
    context: &'c BuildContext,
}

impl<'a> ConstraintParser<'a, '_> {
    fn eat(&mut self, token: Token<'a>) -> bool {
        if self.tokens.get(self.pos) == Some(&token) {
            self.pos += 1;
            true
        } else {
            false
        }
    }

    fn parse_or(&mut self) -> Result<bool, String> {
        let mut value = self.parse_and()?;
        while self.eat(Token::Or) {
            let rhs = self.parse_and()?;
            value = value || rhs;
        }
        Ok(value)
    }

    fn parse_and(&mut self) -> Result<bool, String> {
        let mut value = self.parse_not()?;
        while self.eat(Token::And) {
            let rhs = self.parse_not()?;
            value = value && rhs;
        }
        Ok(value)
    }

    fn parse_not(&mut self) -> Result<bool, String> {
        if self.eat(Token::Not) {
            return Ok(!self.parse_not()?);
        }
        self.parse_atom()
    }

    fn parse_atom(&mut self) -> Result<bool, String> {
        match self.tokens.get(self.pos).copied() {
            Some(Token::LParen) => {
                self.pos += 1;
                let value = self.parse_or()?;
                if !self.eat(Token::RParen) {
                    return Err("missing ')' in //go:build".to_string());
                }
                Ok(value)
            }
            Some(Token::Tag(tag)) => {
                self.pos += 1;
                Ok(self.context.matches_tag(tag))
            }
            _ => Err("missing build tag in //go:build".to_string()),
        }
    }
}
