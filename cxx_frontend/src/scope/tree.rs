//! Arena of nested scopes with qualified-name lookup

use super::error::{ScopeError, ScopeResult};
use crate::config::constants::compile_time::scope::MAX_SCOPE_DEPTH;
use crate::{log_debug, log_error};
use std::collections::{HashMap, HashSet};
use std::fmt;

const SEPARATOR: &str = "::";

/// Handle to a scope inside the [`ScopeTree`] that issued it
///
/// An id is only meaningful for that tree. Passing it to another tree is a
/// logic error; debug builds panic with a message, other builds may panic on
/// the index or address an unrelated scope.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ScopeId(usize);

#[derive(Debug, Clone)]
struct ScopeData {
    name: String,
    parent: Option<ScopeId>,
    depth: usize,
    types: HashSet<String>,
    children: HashMap<String, ScopeId>,
}

impl ScopeData {
    fn new(name: &str, parent: Option<ScopeId>, depth: usize) -> Self {
        Self {
            name: name.to_string(),
            parent,
            depth,
            types: HashSet::new(),
            children: HashMap::new(),
        }
    }
}

/// All scopes of one translation unit
///
/// Scopes are never removed, so a forward-declared or reopened scope stays
/// reachable for [`ScopeTree::extend`] after its block has been closed.
#[derive(Debug, Clone)]
pub struct ScopeTree {
    scopes: Vec<ScopeData>,
}

fn check_name(name: &str) -> ScopeResult<()> {
    if name.contains(SEPARATOR) {
        let error = ScopeError::invalid_name(name, "name must not contain '::'");
        log_error!(error.error_code(), &error.to_string(), "name" => name);
        return Err(error);
    }
    Ok(())
}

impl ScopeTree {
    pub fn new() -> Self {
        Self {
            scopes: vec![ScopeData::new("", None, 0)],
        }
    }

    pub fn root(&self) -> ScopeId {
        ScopeId(0)
    }

    pub fn scope_count(&self) -> usize {
        self.scopes.len()
    }

    fn data(&self, id: ScopeId) -> &ScopeData {
        self.check_id(id);
        &self.scopes[id.0]
    }

    fn data_mut(&mut self, id: ScopeId) -> &mut ScopeData {
        self.check_id(id);
        &mut self.scopes[id.0]
    }

    fn check_id(&self, id: ScopeId) {
        debug_assert!(
            id.0 < self.scopes.len(),
            "ScopeId({}) was not issued by this ScopeTree ({} scopes)",
            id.0,
            self.scopes.len()
        );
    }

    /// Whether `id` can belong to this tree
    pub fn contains(&self, id: ScopeId) -> bool {
        id.0 < self.scopes.len()
    }

    /// Create a scope named `name` nested in `parent`
    ///
    /// The new scope is not registered in the parent's child map; that is
    /// what [`put_type_scope`](Self::put_type_scope) is for.
    pub fn open(&mut self, parent: ScopeId, name: &str) -> ScopeResult<ScopeId> {
        check_name(name)?;

        let depth = self.data(parent).depth + 1;
        if depth > MAX_SCOPE_DEPTH {
            let error = ScopeError::NestingTooDeep { depth };
            log_error!(error.error_code(), &error.to_string(), "name" => name);
            return Err(error);
        }

        let id = ScopeId(self.scopes.len());
        self.scopes.push(ScopeData::new(name, Some(parent), depth));

        log_debug!("Scope opened",
            "name" => name,
            "parent" => self.qualified_path(parent),
            "depth" => depth
        );

        Ok(id)
    }

    /// Declare a type name; declaring the same name twice in one scope fails
    pub fn put_type_name(&mut self, scope: ScopeId, name: &str) -> ScopeResult<()> {
        check_name(name)?;

        if !self.data_mut(scope).types.insert(name.to_string()) {
            let error = ScopeError::DuplicateType {
                name: name.to_string(),
                scope: self.qualified_path(scope),
            };
            log_error!(error.error_code(), &error.to_string());
            return Err(error);
        }
        Ok(())
    }

    /// Declare a type that introduces `child`, replacing any earlier mapping
    pub fn put_type_scope(&mut self, scope: ScopeId, name: &str, child: ScopeId) -> ScopeResult<()> {
        check_name(name)?;

        let data = self.data_mut(scope);
        data.types.insert(name.to_string());
        data.children.insert(name.to_string(), child);
        Ok(())
    }

    /// Copy the types and child scopes of `other` into `scope`
    pub fn extend(&mut self, scope: ScopeId, other: ScopeId) {
        if scope == other {
            return;
        }

        let source = self.data(other);
        let types: Vec<String> = source.types.iter().cloned().collect();
        let children: Vec<(String, ScopeId)> = source
            .children
            .iter()
            .map(|(name, id)| (name.clone(), *id))
            .collect();

        let target = self.data_mut(scope);
        target.types.extend(types);
        target.children.extend(children);
    }

    /// Find the scope named by a possibly qualified `name`, as seen from `scope`
    ///
    /// Each segment is looked up in the current scope's children, then in
    /// its ancestors'. A leading `::` starts at the root.
    pub fn get_scope(&self, scope: ScopeId, name: &str) -> Option<ScopeId> {
        let (mut current, mut rest) = match name.strip_prefix(SEPARATOR) {
            Some(rest) => (self.root(), rest),
            None => (scope, name),
        };

        loop {
            match rest.split_once(SEPARATOR) {
                Some((head, tail)) => {
                    current = self.lookup(current, head)?;
                    rest = tail;
                }
                None => return self.lookup(current, rest),
            }
        }
    }

    /// Child named `name` of `scope` or of its nearest ancestor that has one
    fn lookup(&self, scope: ScopeId, name: &str) -> Option<ScopeId> {
        let mut current = Some(scope);
        while let Some(id) = current {
            let data = self.data(id);
            if let Some(child) = data.children.get(name) {
                return Some(*child);
            }
            current = data.parent;
        }
        None
    }

    /// Fully-qualified spelling of `name` as seen from `scope`
    ///
    /// When the qualifier of `name` cannot be resolved, the whole name is
    /// appended to the path of `scope`, qualifier included.
    pub fn resolve(&self, scope: ScopeId, name: &str) -> String {
        let Some(index) = name.rfind(SEPARATOR) else {
            return format!("{}{}", self.qualified_path(scope), name);
        };

        let prefix = &name[..index];
        let suffix = &name[index + SEPARATOR.len()..];

        let found = if prefix.is_empty() {
            Some(self.root())
        } else {
            self.get_scope(scope, prefix)
        };

        match found {
            Some(found) => format!("{}{}", self.qualified_path(found), suffix),
            None => {
                log_debug!("Qualifier not found, keeping name as written",
                    "name" => name,
                    "scope" => self.qualified_path(scope)
                );
                format!("{}{}", self.qualified_path(scope), name)
            }
        }
    }

    pub fn is_constructor(&self, scope: ScopeId, name: &str) -> bool {
        self.data(scope).name == name
    }

    /// Enclosing scope; the root closes to itself
    pub fn close(&self, scope: ScopeId) -> ScopeId {
        self.data(scope).parent.unwrap_or(scope)
    }

    pub fn parent(&self, scope: ScopeId) -> Option<ScopeId> {
        self.data(scope).parent
    }

    pub fn name(&self, scope: ScopeId) -> &str {
        &self.data(scope).name
    }

    pub fn depth(&self, scope: ScopeId) -> usize {
        self.data(scope).depth
    }

    pub fn has_type(&self, scope: ScopeId, name: &str) -> bool {
        self.data(scope).types.contains(name)
    }

    /// Child scope registered directly in `scope`, without ancestor fallback
    pub fn child(&self, scope: ScopeId, name: &str) -> Option<ScopeId> {
        self.data(scope).children.get(name).copied()
    }

    /// Declared type names, sorted
    pub fn types(&self, scope: ScopeId) -> Vec<&str> {
        let mut types: Vec<&str> = self.data(scope).types.iter().map(String::as_str).collect();
        types.sort_unstable();
        types
    }

    /// `"A::B::"` for a scope B in A, `""` for the root
    pub fn qualified_path(&self, scope: ScopeId) -> String {
        let mut names = Vec::new();
        let mut current = scope;
        while let Some(parent) = self.data(current).parent {
            names.push(self.data(current).name.as_str());
            current = parent;
        }

        names.iter().rev().fold(String::new(), |mut path, name| {
            path.push_str(name);
            path.push_str(SEPARATOR);
            path
        })
    }

    pub fn scope(&self, id: ScopeId) -> ScopeRef<'_> {
        ScopeRef { tree: self, id }
    }
}

impl Default for ScopeTree {
    fn default() -> Self {
        Self::new()
    }
}

/// Borrowed view of one scope; displays as its qualified path
#[derive(Clone, Copy)]
pub struct ScopeRef<'a> {
    tree: &'a ScopeTree,
    id: ScopeId,
}

impl<'a> ScopeRef<'a> {
    pub fn id(&self) -> ScopeId {
        self.id
    }

    pub fn name(&self) -> &'a str {
        self.tree.name(self.id)
    }

    pub fn parent(&self) -> Option<ScopeRef<'a>> {
        self.tree.parent(self.id).map(|id| self.tree.scope(id))
    }

    pub fn resolve(&self, name: &str) -> String {
        self.tree.resolve(self.id, name)
    }
}

impl fmt::Display for ScopeRef<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.tree.qualified_path(self.id))
    }
}

impl fmt::Debug for ScopeRef<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ScopeRef")
            .field("id", &self.id)
            .field("path", &self.tree.qualified_path(self.id))
            .finish()
    }
}
