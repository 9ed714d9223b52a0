//! Declaration outline of a rewritten token stream
//!
//! Recognises just enough C++ to follow namespaces, class-like definitions,
//! enums and type aliases. Everything else is skipped, tracking only braces
//! so that scopes are closed at the right `}`.

use cxx_frontend::logging::codes;
use cxx_frontend::scope::{ScopeError, ScopeId, ScopeTree};
use cxx_frontend::tokens::{Token, TokenKind};
use cxx_frontend::{log_debug, log_warning};
use serde::Serialize;
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum EntryKind {
    Namespace,
    Class,
    Struct,
    Union,
    Enum,
    Typedef,
    Alias,
}

impl EntryKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            EntryKind::Namespace => "namespace",
            EntryKind::Class => "class",
            EntryKind::Struct => "struct",
            EntryKind::Union => "union",
            EntryKind::Enum => "enum",
            EntryKind::Typedef => "typedef",
            EntryKind::Alias => "using",
        }
    }

    fn class_key(token: &Token) -> Option<Self> {
        match token.image.as_str() {
            "class" if token.is(TokenKind::Keyword) => Some(EntryKind::Class),
            "struct" if token.is(TokenKind::Keyword) => Some(EntryKind::Struct),
            "union" if token.is(TokenKind::Keyword) => Some(EntryKind::Union),
            _ => None,
        }
    }
}

impl fmt::Display for EntryKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.pad(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct OutlineEntry {
    pub kind: EntryKind,
    /// Fully-qualified name, e.g. `A::B::Widget`
    pub name: String,
    pub line: u32,
}

impl fmt::Display for OutlineEntry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:>5}  {:<9} {}", self.line, self.kind, self.name)
    }
}

/// Result of outlining one translation unit
#[derive(Debug, Clone)]
pub struct Outline {
    pub tree: ScopeTree,
    pub entries: Vec<OutlineEntry>,
}

enum Frame {
    Plain,
    /// Closing this brace returns to the saved scope
    Scope(ScopeId),
}

/// Build the outline of `tokens`, which may or may not end with `Eof`
pub fn build_outline(tokens: &[Token]) -> Result<Outline, ScopeError> {
    let mut builder = OutlineBuilder::new(tokens);
    builder.run()?;
    Ok(Outline {
        tree: builder.tree,
        entries: builder.entries,
    })
}

struct OutlineBuilder<'a> {
    tokens: &'a [Token],
    pos: usize,
    tree: ScopeTree,
    current: ScopeId,
    frames: Vec<Frame>,
    entries: Vec<OutlineEntry>,
}

impl<'a> OutlineBuilder<'a> {
    fn new(tokens: &'a [Token]) -> Self {
        let tree = ScopeTree::new();
        let current = tree.root();
        Self {
            tokens,
            pos: 0,
            tree,
            current,
            frames: Vec::new(),
            entries: Vec::new(),
        }
    }

    fn peek(&self) -> Option<&'a Token> {
        self.peek_nth(0)
    }

    fn peek_nth(&self, n: usize) -> Option<&'a Token> {
        self.tokens.get(self.pos + n).filter(|t| !t.is_eof())
    }

    fn bump(&mut self) -> Option<&'a Token> {
        let token = self.peek()?;
        self.pos += 1;
        Some(token)
    }

    fn eat(&mut self, text: &str) -> bool {
        if self.peek().is_some_and(|t| t.is_symbol(text)) {
            self.pos += 1;
            true
        } else {
            false
        }
    }

    fn previous(&self) -> Option<&'a Token> {
        self.pos.checked_sub(2).and_then(|i| self.tokens.get(i))
    }

    fn run(&mut self) -> Result<(), ScopeError> {
        while let Some(token) = self.bump() {
            match token.image.as_str() {
                "namespace" if token.is(TokenKind::Keyword) => self.namespace(token.begin_line())?,
                "template" if token.is(TokenKind::Keyword) => self.skip_angles(),
                "enum" if token.is(TokenKind::Keyword) => self.enumeration(token.begin_line())?,
                "typedef" if token.is(TokenKind::Keyword) => self.typedef(token.begin_line())?,
                "using" if token.is(TokenKind::Keyword) => self.alias(token.begin_line())?,
                "{" => self.frames.push(Frame::Plain),
                "}" => self.close_brace(token),
                _ => {
                    if let Some(kind) = EntryKind::class_key(token) {
                        if !self.previous().is_some_and(|p| p.is_symbol("friend")) {
                            self.class_like(kind, token.begin_line())?;
                        }
                    }
                }
            }
        }

        if !self.frames.is_empty() {
            log_warning!("Unclosed braces at end of input", "open" => self.frames.len());
        }
        Ok(())
    }

    fn close_brace(&mut self, token: &Token) {
        match self.frames.pop() {
            Some(Frame::Scope(saved)) => self.current = saved,
            Some(Frame::Plain) => {}
            None => log_warning!("Unmatched '}'", "line" => token.begin_line()),
        }
    }

    /// Skip a balanced `<...>` group if one starts here
    fn skip_angles(&mut self) {
        if !self.eat("<") {
            return;
        }
        let mut depth = 1usize;
        while depth > 0 {
            let Some(token) = self.bump() else { return };
            match token.image.as_str() {
                "<" => depth += 1,
                ">" => depth -= 1,
                ">>" => depth = depth.saturating_sub(2),
                _ => {}
            }
        }
    }

    /// `A`, `A::B` or `::A::B`
    fn qualified_name(&mut self) -> Option<String> {
        let start = self.pos;
        let mut name = String::new();

        if self.peek().is_some_and(|t| t.is(TokenKind::ScopeSeparator)) {
            self.pos += 1;
            name.push_str("::");
        }

        loop {
            match self.peek() {
                Some(token) if token.is(TokenKind::Identifier) => {
                    self.pos += 1;
                    name.push_str(&token.image);
                }
                _ => {
                    self.pos = start;
                    return None;
                }
            }

            let separator = self.peek().is_some_and(|t| t.is(TokenKind::ScopeSeparator));
            let continues = self
                .peek_nth(1)
                .is_some_and(|t| t.is(TokenKind::Identifier));
            if separator && continues {
                self.pos += 1;
                name.push_str("::");
            } else {
                return Some(name);
            }
        }
    }

    /// Enter a new scope `name` in `parent`, folding in any earlier scope of the same name
    fn enter(&mut self, parent: ScopeId, name: &str) -> Result<(bool, ScopeId), ScopeError> {
        let prior = self.tree.child(parent, name);
        let scope = self.tree.open(parent, name)?;
        if let Some(prior) = prior {
            self.tree.extend(scope, prior);
        }
        self.tree.put_type_scope(parent, name, scope)?;
        Ok((prior.is_some(), scope))
    }

    fn record(&mut self, kind: EntryKind, name: String, line: u32) {
        log_debug!("Outline entry", "kind" => kind, "name" => name);
        self.entries.push(OutlineEntry { kind, name, line });
    }

    fn display_path(&self, scope: ScopeId) -> String {
        let path = self.tree.qualified_path(scope);
        let trimmed = path.strip_suffix("::").unwrap_or(&path);
        if trimmed.is_empty() || trimmed.ends_with("::") {
            format!("{}(anonymous)", trimmed)
        } else {
            trimmed.to_string()
        }
    }

    fn namespace(&mut self, line: u32) -> Result<(), ScopeError> {
        let name = self.qualified_name().unwrap_or_default();

        // namespace alias
        if self.eat("=") {
            self.skip_statement();
            return Ok(());
        }
        if !self.eat("{") {
            return Ok(());
        }

        let saved = self.current;
        let segments: Vec<&str> = if name.is_empty() {
            vec![""]
        } else {
            name.trim_start_matches("::").split("::").collect()
        };

        for segment in segments {
            let (reopened, scope) = self.enter(self.current, segment)?;
            if !reopened {
                let path = self.display_path(scope);
                self.record(EntryKind::Namespace, path, line);
            }
            self.current = scope;
        }

        self.frames.push(Frame::Scope(saved));
        Ok(())
    }

    fn class_like(&mut self, kind: EntryKind, line: u32) -> Result<(), ScopeError> {
        // template parameter such as `template <class T>`
        if self
            .previous()
            .is_some_and(|p| p.is_symbol("<") || p.is_symbol(","))
        {
            return Ok(());
        }

        let Some(name) = self.qualified_name() else {
            // anonymous class body is handled by the generic brace tracking
            return Ok(());
        };

        let Some(next) = self.peek() else {
            return Ok(());
        };
        let is_final = next.is_identifier("final");
        let declares = next.is_symbol("{") || next.is_symbol(";") || next.is_symbol(":") || is_final;
        if !declares {
            return Ok(());
        }

        let (parent, simple) = match name.rsplit_once("::") {
            Some((qualifier, simple)) => {
                let parent = if qualifier.is_empty() {
                    Some(self.tree.root())
                } else {
                    self.tree.get_scope(self.current, qualifier)
                };
                (parent.unwrap_or(self.current), simple.to_string())
            }
            None => (self.current, name.clone()),
        };

        if next.is_symbol(";") {
            self.pos += 1;
            if self.tree.child(parent, &simple).is_none() {
                self.enter(parent, &simple)?;
            }
            return Ok(());
        }

        // skip `final` and the base clause up to the body
        while let Some(token) = self.peek() {
            if token.is_symbol("{") || token.is_symbol(";") {
                break;
            }
            self.pos += 1;
        }
        if !self.eat("{") {
            self.eat(";");
            return Ok(());
        }

        let (_, scope) = self.enter(parent, &simple)?;
        let path = self.display_path(scope);
        self.record(kind, path, line);

        self.frames.push(Frame::Scope(self.current));
        self.current = scope;
        Ok(())
    }

    fn enumeration(&mut self, line: u32) -> Result<(), ScopeError> {
        if !self.eat("class") {
            self.eat("struct");
        }

        let Some(name) = self.qualified_name() else {
            return Ok(());
        };
        if name.contains("::") {
            return Ok(());
        }

        let is_definition = self
            .peek()
            .is_some_and(|t| t.is_symbol("{") || t.is_symbol(":"));
        if is_definition && !self.tree.has_type(self.current, &name) {
            self.declare_type(&name)?;
            let resolved = self.tree.resolve(self.current, &name);
            self.record(EntryKind::Enum, resolved, line);
        }
        Ok(())
    }

    /// `typedef ... NAME;` including `typedef struct { ... } NAME;` and
    /// function pointer declarators
    fn typedef(&mut self, line: u32) -> Result<(), ScopeError> {
        let depth = self.frames.len();
        let mut names: Vec<String> = Vec::new();
        let mut last_identifier: Option<String> = None;
        let mut declarator_in_parens: Option<String> = None;
        let mut parens = 0usize;
        let mut angles = 0usize;

        while let Some(token) = self.peek() {
            let at_top = self.frames.len() == depth;

            if at_top && parens == 0 && angles == 0 && (token.is_symbol(";") || token.is_symbol(","))
            {
                if let Some(name) = declarator_in_parens.take().or(last_identifier.take()) {
                    names.push(name);
                }
                self.pos += 1;
                if token.is_symbol(";") {
                    break;
                }
                continue;
            }

            if let Some(kind) = EntryKind::class_key(token) {
                self.pos += 1;
                self.class_like(kind, token.begin_line())?;
                continue;
            }

            self.pos += 1;
            match token.image.as_str() {
                "{" => self.frames.push(Frame::Plain),
                "}" => self.close_brace(token),
                "(" if at_top => {
                    parens += 1;
                    let pointer = self
                        .peek()
                        .is_some_and(|t| t.is_symbol("*") || t.is_symbol("&") || t.is_symbol("^"));
                    if parens == 1 && pointer && declarator_in_parens.is_none() {
                        declarator_in_parens = self
                            .tokens
                            .get(self.pos + 1)
                            .filter(|t| t.is(TokenKind::Identifier))
                            .map(|t| t.image.clone());
                    }
                }
                ")" if at_top => parens = parens.saturating_sub(1),
                "<" if at_top && parens == 0 => angles += 1,
                ">" if at_top && parens == 0 => angles = angles.saturating_sub(1),
                ">>" if at_top && parens == 0 => angles = angles.saturating_sub(2),
                _ if at_top && parens == 0 && token.is(TokenKind::Identifier) => {
                    last_identifier = Some(token.image.clone());
                }
                _ => {}
            }
        }

        for name in names {
            self.declare_type(&name)?;
            let resolved = self.tree.resolve(self.current, &name);
            self.record(EntryKind::Typedef, resolved, line);
        }
        Ok(())
    }

    /// `using NAME = ...;`; using-declarations and directives are skipped
    fn alias(&mut self, line: u32) -> Result<(), ScopeError> {
        let is_alias = self.peek().is_some_and(|t| t.is(TokenKind::Identifier))
            && self.peek_nth(1).is_some_and(|t| t.is_symbol("="));
        if !is_alias {
            self.skip_statement();
            return Ok(());
        }

        let name = self.bump().map(|t| t.image.clone()).unwrap_or_default();
        self.skip_statement();

        self.declare_type(&name)?;
        let resolved = self.tree.resolve(self.current, &name);
        self.record(EntryKind::Alias, resolved, line);
        Ok(())
    }

    /// Declare a type name, tolerating redeclaration
    fn declare_type(&mut self, name: &str) -> Result<(), ScopeError> {
        match self.tree.put_type_name(self.current, name) {
            Err(error) if !error.requires_halt() => {
                log_warning!("Type redeclared",
                    "name" => name,
                    "code" => codes::scope::DUPLICATE_TYPE_NAME
                );
                Ok(())
            }
            other => other,
        }
    }

    /// Skip to the `;` ending the current statement at this brace depth
    fn skip_statement(&mut self) {
        let depth = self.frames.len();
        while let Some(token) = self.bump() {
            match token.image.as_str() {
                "{" => self.frames.push(Frame::Plain),
                "}" => self.close_brace(token),
                ";" if self.frames.len() == depth => return,
                _ => {}
            }
        }
    }
}
