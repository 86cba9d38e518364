//! Typed Cypher fragments and their rendering.
//!
//! Compilers assemble a [`CypherQuery`] from clauses and render it once. All
//! names pass through [`Ident`], and run parameters are collected from the tree
//! rather than scraped from the text.

use std::collections::BTreeSet;
use std::fmt;

use super::escape::Ident;

/// Alias each input row is bound to by `UNWIND`.
pub const ROW_ALIAS: &str = "item";

const INDENT: &str = "    ";

/// A value expression.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Expr {
    /// `$name`
    Param(String),
    /// `item.name`
    RowField(String),
    /// `var.key`
    Property { var: String, key: String },
    Var(String),
    Timestamp,
    CountAll,
    ToLower(Box<Expr>),
}

impl Expr {
    pub fn param(name: impl Into<String>) -> Self {
        Self::Param(name.into())
    }

    pub fn row_field(name: impl Into<String>) -> Self {
        Self::RowField(name.into())
    }

    pub fn prop(var: impl Into<String>, key: impl Into<String>) -> Self {
        Self::Property {
            var: var.into(),
            key: key.into(),
        }
    }

    pub fn var(var: impl Into<String>) -> Self {
        Self::Var(var.into())
    }

    pub fn to_lower(self) -> Self {
        Self::ToLower(Box::new(self))
    }

    fn collect_params(&self, out: &mut BTreeSet<String>) {
        match self {
            Expr::Param(name) => {
                out.insert(name.clone());
            }
            Expr::ToLower(inner) => inner.collect_params(out),
            _ => {}
        }
    }
}

impl fmt::Display for Expr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Expr::Param(name) => write!(f, "${}", Ident(name)),
            Expr::RowField(name) => write!(f, "{}.{}", ROW_ALIAS, Ident(name)),
            Expr::Property { var, key } => write!(f, "{}.{}", var, Ident(key)),
            Expr::Var(var) => f.write_str(var),
            Expr::Timestamp => f.write_str("timestamp()"),
            Expr::CountAll => f.write_str("count(*)"),
            Expr::ToLower(inner) => write!(f, "toLower({inner})"),
        }
    }
}

/// A boolean condition used in `WHERE`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Predicate {
    Eq(Expr, Expr),
    Ne(Expr, Expr),
    In(Expr, Expr),
    Contains(Expr, Expr),
    IsNotNull(Expr),
}

impl Predicate {
    fn collect_params(&self, out: &mut BTreeSet<String>) {
        match self {
            Predicate::Eq(a, b) | Predicate::Ne(a, b) | Predicate::In(a, b) | Predicate::Contains(a, b) => {
                a.collect_params(out);
                b.collect_params(out);
            }
            Predicate::IsNotNull(a) => a.collect_params(out),
        }
    }
}

impl fmt::Display for Predicate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Predicate::Eq(a, b) => write!(f, "{a} = {b}"),
            Predicate::Ne(a, b) => write!(f, "{a} <> {b}"),
            Predicate::In(a, b) => write!(f, "{a} IN {b}"),
            Predicate::Contains(a, b) => write!(f, "{a} CONTAINS {b}"),
            Predicate::IsNotNull(a) => write!(f, "{a} IS NOT NULL"),
        }
    }
}

/// `(var:Label {key: value})`
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct NodePattern {
    var: Option<String>,
    labels: Vec<String>,
    props: Vec<(String, Expr)>,
}

impl NodePattern {
    pub fn var(var: impl Into<String>) -> Self {
        Self {
            var: Some(var.into()),
            ..Self::default()
        }
    }

    pub fn anonymous() -> Self {
        Self::default()
    }

    pub fn label(mut self, label: impl Into<String>) -> Self {
        self.labels.push(label.into());
        self
    }

    pub fn property(mut self, key: impl Into<String>, value: Expr) -> Self {
        self.props.push((key.into(), value));
        self
    }
}

impl fmt::Display for NodePattern {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("(")?;
        if let Some(var) = &self.var {
            f.write_str(var)?;
        }
        for label in &self.labels {
            write!(f, ":{}", Ident(label))?;
        }
        if !self.props.is_empty() {
            f.write_str(" {")?;
            for (i, (key, value)) in self.props.iter().enumerate() {
                if i > 0 {
                    f.write_str(", ")?;
                }
                write!(f, "{}: {}", Ident(key), value)?;
            }
            f.write_str("}")?;
        }
        f.write_str(")")
    }
}

/// Arrow direction relative to the node on the left of the pattern.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Arrow {
    /// `(a)-[r]->(b)`
    Outgoing,
    /// `(a)<-[r]-(b)`
    Incoming,
}

/// `-[var:TYPE]->` or `<-[var:TYPE]-`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RelPattern {
    var: Option<String>,
    rel_type: String,
    arrow: Arrow,
}

impl RelPattern {
    pub fn new(var: Option<&str>, rel_type: impl Into<String>, arrow: Arrow) -> Self {
        Self {
            var: var.map(str::to_string),
            rel_type: rel_type.into(),
            arrow,
        }
    }
}

impl fmt::Display for RelPattern {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let var = self.var.as_deref().unwrap_or("");
        match self.arrow {
            Arrow::Outgoing => write!(f, "-[{}:{}]->", var, Ident(&self.rel_type)),
            Arrow::Incoming => write!(f, "<-[{}:{}]-", var, Ident(&self.rel_type)),
        }
    }
}

/// A path pattern: a node followed by zero or more hops.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Pattern {
    start: NodePattern,
    hops: Vec<(RelPattern, NodePattern)>,
}

impl Pattern {
    pub fn node(start: NodePattern) -> Self {
        Self {
            start,
            hops: Vec::new(),
        }
    }

    pub fn hop(mut self, rel: RelPattern, node: NodePattern) -> Self {
        self.hops.push((rel, node));
        self
    }

    fn collect_params(&self, out: &mut BTreeSet<String>) {
        let nodes = std::iter::once(&self.start).chain(self.hops.iter().map(|(_, n)| n));
        for node in nodes {
            for (_, value) in &node.props {
                value.collect_params(out);
            }
        }
    }
}

impl fmt::Display for Pattern {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.start)?;
        for (rel, node) in &self.hops {
            write!(f, "{rel}{node}")?;
        }
        Ok(())
    }
}

/// One item of a `SET` clause.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SetItem {
    Property { var: String, key: String, value: Expr },
    Labels { var: String, labels: Vec<String> },
}

impl SetItem {
    pub fn property(var: impl Into<String>, key: impl Into<String>, value: Expr) -> Self {
        Self::Property {
            var: var.into(),
            key: key.into(),
            value,
        }
    }

    pub fn labels(var: impl Into<String>, labels: &[String]) -> Self {
        Self::Labels {
            var: var.into(),
            labels: labels.to_vec(),
        }
    }
}

impl fmt::Display for SetItem {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SetItem::Property { var, key, value } => write!(f, "{}.{} = {}", var, Ident(key), value),
            SetItem::Labels { var, labels } => {
                f.write_str(var)?;
                for label in labels {
                    write!(f, ":{}", Ident(label))?;
                }
                Ok(())
            }
        }
    }
}

/// A Cypher clause. `Call` holds unit subqueries joined by `UNION`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Clause {
    Unwind {
        list: Expr,
        alias: String,
    },
    Match {
        optional: bool,
        pattern: Pattern,
        predicates: Vec<Predicate>,
    },
    Merge {
        pattern: Pattern,
        on_create: Vec<SetItem>,
    },
    Set(Vec<SetItem>),
    With {
        vars: Vec<String>,
        predicates: Vec<Predicate>,
        limit: Option<Expr>,
    },
    Call(Vec<Vec<Clause>>),
    Delete {
        detach: bool,
        var: String,
    },
    Return(Vec<(Expr, String)>),
}

impl Clause {
    pub fn matching(pattern: Pattern, predicates: Vec<Predicate>) -> Self {
        Self::Match {
            optional: false,
            pattern,
            predicates,
        }
    }

    pub fn optional_matching(pattern: Pattern, predicates: Vec<Predicate>) -> Self {
        Self::Match {
            optional: true,
            pattern,
            predicates,
        }
    }

    pub fn with(vars: &[&str]) -> Self {
        Self::With {
            vars: vars.iter().map(|v| v.to_string()).collect(),
            predicates: Vec::new(),
            limit: None,
        }
    }

    fn collect_params(&self, out: &mut BTreeSet<String>) {
        match self {
            Clause::Unwind { list, .. } => list.collect_params(out),
            Clause::Match { pattern, predicates, .. } => {
                pattern.collect_params(out);
                predicates.iter().for_each(|p| p.collect_params(out));
            }
            Clause::Merge { pattern, on_create } => {
                pattern.collect_params(out);
                on_create.iter().for_each(|s| s.collect_params(out));
            }
            Clause::Set(items) => items.iter().for_each(|s| s.collect_params(out)),
            Clause::With { predicates, limit, .. } => {
                predicates.iter().for_each(|p| p.collect_params(out));
                if let Some(limit) = limit {
                    limit.collect_params(out);
                }
            }
            Clause::Call(branches) => branches
                .iter()
                .flatten()
                .for_each(|c| c.collect_params(out)),
            Clause::Delete { .. } => {}
            Clause::Return(items) => items.iter().for_each(|(e, _)| e.collect_params(out)),
        }
    }

    fn render_into(&self, lines: &mut Vec<String>) {
        match self {
            Clause::Unwind { list, alias } => lines.push(format!("UNWIND {list} AS {alias}")),
            Clause::Match {
                optional,
                pattern,
                predicates,
            } => {
                let keyword = if *optional { "OPTIONAL MATCH" } else { "MATCH" };
                lines.push(format!("{keyword} {pattern}"));
                if !predicates.is_empty() {
                    lines.push(format!("WHERE {}", join(predicates, " AND ")));
                }
            }
            Clause::Merge { pattern, on_create } => {
                lines.push(format!("MERGE {pattern}"));
                if !on_create.is_empty() {
                    lines.push(format!("ON CREATE SET {}", join(on_create, ", ")));
                }
            }
            Clause::Set(items) => match items.as_slice() {
                [single] => lines.push(format!("SET {single}")),
                _ => {
                    lines.push("SET".to_string());
                    let last = items.len().saturating_sub(1);
                    for (i, item) in items.iter().enumerate() {
                        let sep = if i == last { "" } else { "," };
                        lines.push(format!("{INDENT}{item}{sep}"));
                    }
                }
            },
            Clause::With {
                vars,
                predicates,
                limit,
            } => {
                let mut line = format!("WITH {}", vars.join(", "));
                if !predicates.is_empty() {
                    line.push_str(&format!(" WHERE {}", join(predicates, " AND ")));
                }
                if let Some(limit) = limit {
                    line.push_str(&format!(" LIMIT {limit}"));
                }
                lines.push(line);
            }
            Clause::Call(branches) => {
                lines.push("CALL {".to_string());
                for (i, branch) in branches.iter().enumerate() {
                    if i > 0 {
                        lines.push(format!("{INDENT}UNION"));
                    }
                    let mut inner = Vec::new();
                    for clause in branch {
                        clause.render_into(&mut inner);
                    }
                    lines.extend(inner.into_iter().map(|l| format!("{INDENT}{l}")));
                }
                lines.push("}".to_string());
            }
            Clause::Delete { detach, var } => {
                let keyword = if *detach { "DETACH DELETE" } else { "DELETE" };
                lines.push(format!("{keyword} {var}"));
            }
            Clause::Return(items) => {
                let items: Vec<String> = items.iter().map(|(e, alias)| format!("{e} AS {alias}")).collect();
                lines.push(format!("RETURN {}", items.join(", ")));
            }
        }
    }
}

impl SetItem {
    fn collect_params(&self, out: &mut BTreeSet<String>) {
        if let SetItem::Property { value, .. } = self {
            value.collect_params(out);
        }
    }
}

fn join<T: fmt::Display>(items: &[T], sep: &str) -> String {
    items.iter().map(ToString::to_string).collect::<Vec<_>>().join(sep)
}

/// An ordered list of clauses forming one statement.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CypherQuery {
    clauses: Vec<Clause>,
}

impl CypherQuery {
    pub fn new(clauses: Vec<Clause>) -> Self {
        Self { clauses }
    }

    pub fn push(&mut self, clause: Clause) {
        self.clauses.push(clause);
    }

    pub fn clauses(&self) -> &[Clause] {
        &self.clauses
    }

    /// Names of every `$parameter` referenced anywhere in the statement.
    pub fn parameters(&self) -> BTreeSet<String> {
        let mut out = BTreeSet::new();
        for clause in &self.clauses {
            clause.collect_params(&mut out);
        }
        out
    }

    pub fn render(&self) -> String {
        let mut lines = Vec::new();
        for clause in &self.clauses {
            clause.render_into(&mut lines);
        }
        lines.join("\n")
    }
}

impl fmt::Display for CypherQuery {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.render())
    }
}

/// An idempotent `CREATE INDEX IF NOT EXISTS` statement.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum IndexStatement {
    Node { label: String, property: String },
    Relationship { rel_type: String, properties: Vec<String> },
}

impl fmt::Display for IndexStatement {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            IndexStatement::Node { label, property } => write!(
                f,
                "CREATE INDEX IF NOT EXISTS FOR (n:{}) ON (n.{})",
                Ident(label),
                Ident(property)
            ),
            IndexStatement::Relationship { rel_type, properties } => {
                let props: Vec<String> = properties.iter().map(|p| format!("r.{}", Ident(p))).collect();
                write!(
                    f,
                    "CREATE INDEX IF NOT EXISTS FOR ()-[r:{}]-() ON ({})",
                    Ident(rel_type),
                    props.join(", ")
                )
            }
        }
    }
}
