//! Property references: where a schema field takes its value from.

use crate::cypher::Expr;

/// Where a property value comes from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Binding {
    /// Read from each input row (`item.<name>`).
    Row,
    /// Read once from the run parameters (`$<name>`), same value for every row.
    Parameter,
}

/// How a property compares against the other node when used in a matcher.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum MatchMode {
    #[default]
    Exact,
    /// The bound value is a list of candidate keys; one relationship per match.
    OneToMany,
    IgnoreCase,
    /// Case-insensitive substring match.
    Fuzzy,
}

/// Binds a logical property to either a row field or a run parameter.
///
/// Match modes are exclusive by construction: calling [`PropertyRef::ignore_case`]
/// after [`PropertyRef::one_to_many`] replaces the mode rather than combining it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PropertyRef {
    name: String,
    binding: Binding,
    match_mode: MatchMode,
    extra_index: bool,
}

impl PropertyRef {
    /// A property read from `row[name]`.
    pub fn row(name: impl Into<String>) -> Self {
        Self::new(name, Binding::Row)
    }

    /// A property read from the run parameter `name` (`set_in_kwargs`).
    pub fn param(name: impl Into<String>) -> Self {
        Self::new(name, Binding::Parameter)
    }

    fn new(name: impl Into<String>, binding: Binding) -> Self {
        Self {
            name: name.into(),
            binding,
            match_mode: MatchMode::Exact,
            extra_index: false,
        }
    }

    /// Request an index on the field this property is written to.
    pub fn with_extra_index(mut self) -> Self {
        self.extra_index = true;
        self
    }

    pub fn one_to_many(mut self) -> Self {
        self.match_mode = MatchMode::OneToMany;
        self
    }

    pub fn ignore_case(mut self) -> Self {
        self.match_mode = MatchMode::IgnoreCase;
        self
    }

    pub fn fuzzy_and_ignore_case(mut self) -> Self {
        self.match_mode = MatchMode::Fuzzy;
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn binding(&self) -> Binding {
        self.binding
    }

    pub fn match_mode(&self) -> MatchMode {
        self.match_mode
    }

    pub fn extra_index(&self) -> bool {
        self.extra_index
    }

    pub fn is_parameter(&self) -> bool {
        self.binding == Binding::Parameter
    }

    /// The Cypher expression that yields this property's value.
    pub(crate) fn expr(&self) -> Expr {
        match self.binding {
            Binding::Row => Expr::row_field(&self.name),
            Binding::Parameter => Expr::param(&self.name),
        }
    }
}
