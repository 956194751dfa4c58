//! Table and alias resolution scopes
//!
//! A statement gets one *global* scope holding every table, aliased
//! subquery and CTE visible anywhere in it. Each SELECT additionally gets a
//! *local* scope holding only its own FROM and JOIN sources. Lookups try the
//! local scope first.

use std::collections::HashMap;
use std::ops::ControlFlow;

use sqlparser::ast::{
    visit_relations, ObjectName, Query, Select, Statement, TableAlias, TableFactor,
    TableWithJoins, Visit, Visitor,
};

/// A physical `(database, table)` pair
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub(crate) struct TableKey {
    pub database: String,
    pub table: String,
}

impl TableKey {
    /// Split a possibly qualified name. For `a.b.c` the table is `c` and the
    /// database `b`; a leading catalog part is ignored.
    pub fn from_object_name(name: &ObjectName) -> Self {
        let parts = object_name_parts(name);
        let table = parts.last().cloned().unwrap_or_default();
        let database = if parts.len() >= 2 {
            parts[parts.len() - 2].clone()
        } else {
            String::new()
        };
        Self { database, table }
    }
}

/// Identifier values of an object name, in order
pub(crate) fn object_name_parts(name: &ObjectName) -> Vec<String> {
    name.0
        .iter()
        .filter_map(|part| part.as_ident())
        .map(|ident| ident.value.clone())
        .collect()
}

/// Distinct physical tables referenced anywhere below `node`, in order
fn relation_keys<V: Visit>(node: &V) -> Vec<TableKey> {
    let mut keys: Vec<TableKey> = Vec::new();
    let _ = visit_relations(node, |relation| {
        let key = TableKey::from_object_name(relation);
        if !keys.contains(&key) {
            keys.push(key);
        }
        ControlFlow::<()>::Continue(())
    });
    keys
}

/// CTE definitions of a statement and the tables their bodies read
#[derive(Debug, Default)]
pub(crate) struct CteCatalog {
    raw: HashMap<String, Vec<TableKey>>,
}

struct CteCollector {
    raw: HashMap<String, Vec<TableKey>>,
}

impl Visitor for CteCollector {
    type Break = ();

    fn pre_visit_query(&mut self, query: &Query) -> ControlFlow<Self::Break> {
        if let Some(with) = &query.with {
            for cte in &with.cte_tables {
                self.raw
                    .entry(cte.alias.name.value.clone())
                    .or_insert_with(|| relation_keys(&cte.query));
            }
        }
        ControlFlow::Continue(())
    }
}

impl CteCatalog {
    /// Collect every `WITH` definition in the statement, at any depth
    pub fn collect(statement: &Statement) -> Self {
        let mut collector = CteCollector {
            raw: HashMap::new(),
        };
        let _ = statement.visit(&mut collector);
        Self { raw: collector.raw }
    }

    /// Names of all collected CTEs
    pub fn names(&self) -> impl Iterator<Item = &String> {
        self.raw.keys()
    }

    /// The CTE name a table reference points at, if it is one
    fn cte_reference(&self, key: &TableKey) -> Option<&String> {
        if !key.database.is_empty() {
            return None;
        }
        self.raw.get_key_value(&key.table).map(|(name, _)| name)
    }

    /// Replace CTE references by the physical tables behind them
    fn expand_into(&self, keys: &[TableKey], visiting: &mut Vec<String>, out: &mut Vec<TableKey>) {
        for key in keys {
            match self.cte_reference(key) {
                Some(name) if !visiting.contains(name) => {
                    visiting.push(name.clone());
                    if let Some(raw) = self.raw.get(name) {
                        self.expand_into(raw, visiting, out);
                    }
                    visiting.pop();
                }
                // self-reference inside a recursive CTE
                Some(_) => {}
                None => {
                    if !out.contains(key) {
                        out.push(key.clone());
                    }
                }
            }
        }
    }

    /// Physical tables reachable from a subquery
    pub fn base_tables(&self, query: &Query) -> Vec<TableKey> {
        let mut out = Vec::new();
        self.expand_into(&relation_keys(query), &mut Vec::new(), &mut out);
        out
    }

    /// The unique physical table behind a subquery, if there is exactly one
    pub fn single_base(&self, query: &Query) -> Option<TableKey> {
        single(self.base_tables(query))
    }

    /// The unique physical table behind a named CTE
    pub fn cte_base(&self, name: &str) -> Option<TableKey> {
        let raw = self.raw.get(name)?;
        let mut out = Vec::new();
        self.expand_into(raw, &mut vec![name.to_string()], &mut out);
        single(out)
    }
}

fn single(mut keys: Vec<TableKey>) -> Option<TableKey> {
    if keys.len() == 1 {
        keys.pop()
    } else {
        None
    }
}

/// What kind of FROM source an entry came from
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SourceKind {
    Table,
    Subquery,
    Cte,
}

/// Resolution unit for one FROM/JOIN source.
///
/// A derived entry never carries a guessed table name: `table` is empty
/// whenever `is_derived` is set.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScopeEntry {
    pub kind: SourceKind,
    pub database: String,
    pub table: String,
    pub alias: String,
    pub is_derived: bool,
}

impl ScopeEntry {
    fn physical(key: TableKey, alias: Option<String>) -> Self {
        let alias = alias.filter(|a| *a != key.table).unwrap_or_default();
        Self {
            kind: SourceKind::Table,
            database: key.database,
            table: key.table,
            alias,
            is_derived: false,
        }
    }

    fn from_base(kind: SourceKind, base: Option<TableKey>, alias: String) -> Self {
        match base {
            Some(key) => Self {
                kind,
                database: key.database,
                table: key.table,
                alias,
                is_derived: false,
            },
            None => Self {
                kind,
                database: String::new(),
                table: String::new(),
                alias,
                is_derived: true,
            },
        }
    }
}

fn alias_name(alias: &Option<TableAlias>) -> Option<String> {
    alias.as_ref().map(|a| a.name.value.clone())
}

/// Scope key and entry for a table or aliased subquery factor
pub(crate) fn source_entry(
    factor: &TableFactor,
    ctes: &CteCatalog,
) -> Option<(String, ScopeEntry)> {
    match factor {
        TableFactor::Table { name, alias, .. } => {
            let key = TableKey::from_object_name(name);
            let alias = alias_name(alias);
            if let Some(cte) = ctes.cte_reference(&key) {
                let base = ctes.cte_base(cte);
                let alias = alias.unwrap_or_else(|| cte.clone());
                return Some((alias.clone(), ScopeEntry::from_base(SourceKind::Cte, base, alias)));
            }
            let lookup = alias.clone().unwrap_or_else(|| key.table.clone());
            Some((lookup, ScopeEntry::physical(key, alias)))
        }
        TableFactor::Derived {
            subquery, alias, ..
        } => {
            let alias = alias_name(alias)?;
            let base = ctes.single_base(subquery);
            Some((
                alias.clone(),
                ScopeEntry::from_base(SourceKind::Subquery, base, alias),
            ))
        }
        _ => None,
    }
}

/// Alias-or-table-name to entry mapping
#[derive(Debug, Clone, Default)]
pub struct ScopeMap {
    entries: HashMap<String, ScopeEntry>,
}

struct SourceCollector<'c> {
    ctes: &'c CteCatalog,
    tables: Vec<(String, ScopeEntry)>,
    subqueries: Vec<(String, ScopeEntry)>,
}

impl Visitor for SourceCollector<'_> {
    type Break = ();

    fn pre_visit_table_factor(&mut self, factor: &TableFactor) -> ControlFlow<Self::Break> {
        if let Some(source) = source_entry(factor, self.ctes) {
            match factor {
                TableFactor::Derived { .. } => self.subqueries.push(source),
                _ => self.tables.push(source),
            }
        }
        ControlFlow::Continue(())
    }
}

impl ScopeMap {
    /// Every source visible anywhere in the statement: tables first, then
    /// aliased subqueries, then CTE definitions. A key keeps the first
    /// entry inserted for it.
    pub(crate) fn global(statement: &Statement, ctes: &CteCatalog) -> Self {
        let mut collector = SourceCollector {
            ctes,
            tables: Vec::new(),
            subqueries: Vec::new(),
        };
        let _ = statement.visit(&mut collector);

        let mut scope = Self::default();
        for (key, entry) in collector.tables.into_iter().chain(collector.subqueries) {
            scope.insert_if_absent(key, entry);
        }

        let mut cte_names: Vec<&String> = ctes.names().collect();
        cte_names.sort();
        for name in cte_names {
            let entry = ScopeEntry::from_base(SourceKind::Cte, ctes.cte_base(name), name.clone());
            scope.insert_if_absent(name.clone(), entry);
        }
        scope
    }

    /// The immediate FROM and JOIN sources of one SELECT
    pub(crate) fn local(select: &Select, ctes: &CteCatalog) -> Self {
        let mut scope = Self::default();
        for table in &select.from {
            scope.add_table_with_joins(table, ctes);
        }
        scope
    }

    fn add_table_with_joins(&mut self, table: &TableWithJoins, ctes: &CteCatalog) {
        self.add_factor(&table.relation, ctes);
        for join in &table.joins {
            self.add_factor(&join.relation, ctes);
        }
    }

    fn add_factor(&mut self, factor: &TableFactor, ctes: &CteCatalog) {
        if let TableFactor::NestedJoin {
            table_with_joins, ..
        } = factor
        {
            self.add_table_with_joins(table_with_joins, ctes);
        } else if let Some((key, entry)) = source_entry(factor, ctes) {
            self.insert_if_absent(key, entry);
        }
    }

    fn insert_if_absent(&mut self, key: String, entry: ScopeEntry) {
        self.entries.entry(key).or_insert(entry);
    }

    /// Look up an entry by alias or bare table name
    pub fn get(&self, key: &str) -> Option<&ScopeEntry> {
        self.entries.get(key)
    }

    /// The only entry, when the scope holds exactly one
    pub fn sole(&self) -> Option<&ScopeEntry> {
        if self.entries.len() == 1 {
            self.entries.values().next()
        } else {
            None
        }
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// Outcome of resolving a column qualifier
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Resolution<'s> {
    Found(&'s ScopeEntry),
    /// A qualifier was given but names no visible source
    InvalidAlias,
    /// Unqualified with more than one candidate source
    Ambiguous,
    /// Unqualified with no candidate source
    Unresolved,
}

/// The pair of scopes visible from one SELECT
#[derive(Debug, Clone, Copy)]
pub(crate) struct Scopes<'s> {
    pub local: &'s ScopeMap,
    pub global: &'s ScopeMap,
}

impl<'s> Scopes<'s> {
    pub fn lookup(&self, key: &str) -> Option<&'s ScopeEntry> {
        self.local.get(key).or_else(|| self.global.get(key))
    }

    /// Qualifier (local, then global), then the sole local source, then the
    /// sole global source.
    pub fn resolve(&self, qualifier: Option<&str>) -> Resolution<'s> {
        self.resolve_with_fallback(qualifier, None)
    }

    /// Like [`Scopes::resolve`], trying `fallback` for unqualified references
    /// before the sole-source rules.
    pub fn resolve_with_fallback(
        &self,
        qualifier: Option<&str>,
        fallback: Option<&str>,
    ) -> Resolution<'s> {
        if let Some(qualifier) = qualifier {
            return self
                .lookup(qualifier)
                .map_or(Resolution::InvalidAlias, Resolution::Found);
        }
        if let Some(entry) = fallback.and_then(|alias| self.lookup(alias)) {
            return Resolution::Found(entry);
        }
        if let Some(entry) = self.local.sole().or_else(|| self.global.sole()) {
            return Resolution::Found(entry);
        }
        let candidates = if self.local.is_empty() {
            self.global.len()
        } else {
            self.local.len()
        };
        if candidates > 1 {
            Resolution::Ambiguous
        } else {
            Resolution::Unresolved
        }
    }
}

#[cfg(test)]
#[path = "scope_test.rs"]
mod tests;
