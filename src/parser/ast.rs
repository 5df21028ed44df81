//! Abstract syntax tree for mangle command strings

use crate::algebra::EditOp;

/// Byte range in source text
pub type Span = std::ops::Range<usize>;

/// AST node with source location
#[derive(Debug, Clone, PartialEq)]
pub struct Spanned<T> {
    pub node: T,
    pub span: Span,
}

impl<T> Spanned<T> {
    pub fn new(node: T, span: Span) -> Self {
        Self { node, span }
    }
}

/// A fully parsed command string: filter and setter directives in the
/// order they were written.
#[derive(Debug, Clone, PartialEq)]
pub struct Command {
    pub directives: Vec<Spanned<Directive>>,
}

impl Command {
    /// The directive for a filter kind, if the command named one.
    pub fn filter(&self, kind: FilterKind) -> Option<&FilterDirective> {
        self.directives.iter().find_map(|d| match &d.node {
            Directive::Filter(f) if f.kind == kind => Some(f),
            _ => None,
        })
    }

    /// Filter directives with their spans, in command order.
    pub fn filters(&self) -> impl Iterator<Item = (&FilterDirective, &Span)> {
        self.directives.iter().filter_map(|d| match &d.node {
            Directive::Filter(f) => Some((f, &d.span)),
            _ => None,
        })
    }

    /// Setter directives with their spans, in command order.
    pub fn setters(&self) -> impl Iterator<Item = (&SetterKind, &Span)> {
        self.directives.iter().filter_map(|d| match &d.node {
            Directive::Setter(s) => Some((s, &d.span)),
            _ => None,
        })
    }
}

/// Top-level directive in a command string
#[derive(Debug, Clone, PartialEq)]
pub enum Directive {
    /// Entity filter: `b0-2`, `cp*`, `lb1`
    Filter(FilterDirective),
    /// Edit setter: `mu=-10%`, `m='TrueBeam'`, `pa=5.0`
    Setter(SetterKind),
}

/// The six entity filters.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FilterKind {
    Beam,
    ControlPoint,
    Jaw,
    JawBank,
    LeafPair,
    LeafBank,
}

impl FilterKind {
    /// Fixed resolve order. Beam comes first because the control-point and
    /// leaf-pair filters depend on the already-resolved beam list.
    pub const ALL: [FilterKind; 6] = [
        FilterKind::Beam,
        FilterKind::ControlPoint,
        FilterKind::Jaw,
        FilterKind::JawBank,
        FilterKind::LeafPair,
        FilterKind::LeafBank,
    ];

    /// The command-string key for this filter.
    pub fn key(self) -> &'static str {
        match self {
            FilterKind::Beam => "b",
            FilterKind::ControlPoint => "cp",
            FilterKind::Jaw => "j",
            FilterKind::JawBank => "jb",
            FilterKind::LeafPair => "lp",
            FilterKind::LeafBank => "lb",
        }
    }

    /// Human-readable filter name for diagnostics.
    pub fn name(self) -> &'static str {
        match self {
            FilterKind::Beam => "beam",
            FilterKind::ControlPoint => "control point",
            FilterKind::Jaw => "jaw",
            FilterKind::JawBank => "jaw bank",
            FilterKind::LeafPair => "leaf pair",
            FilterKind::LeafBank => "leaf bank",
        }
    }

    /// True for the filters that address MLC leaves.
    pub fn is_leaf_addressing(self) -> bool {
        matches!(self, FilterKind::LeafPair | FilterKind::LeafBank)
    }

    /// True for the filters that address jaw devices.
    pub fn is_jaw_addressing(self) -> bool {
        matches!(self, FilterKind::Jaw | FilterKind::JawBank)
    }
}

/// One filter directive: which filter, and which indices it selects.
#[derive(Debug, Clone, PartialEq)]
pub struct FilterDirective {
    pub kind: FilterKind,
    pub indices: IndexExpr,
}

/// Index selection expression: `*`, or comma-separated singles and ranges.
#[derive(Debug, Clone, PartialEq)]
pub enum IndexExpr {
    Wildcard,
    List(Vec<IndexTerm>),
}

/// One comma-separated term of an index expression
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IndexTerm {
    Single(usize),
    /// Inclusive range `lo-hi`
    Range(usize, usize),
}

/// The five setter kinds with their parsed values. Position setters carry
/// their addressing mode in the variant itself, never resolved by name.
#[derive(Debug, Clone, PartialEq)]
pub enum SetterKind {
    /// `mu=` - meterset edit per selected beam
    Meterset(EditOp),
    /// `m=` - literal machine-name replacement per selected beam
    Machine(String),
    /// `g=` - gantry angle edit per selected control point
    Gantry(EditOp),
    /// `c=` - collimator angle edit per selected control point
    Collimator(EditOp),
    /// `pa=` - literal position for the addressed leaf pairs or jaw banks
    PositionAbsolute(f64),
    /// `pr=` - relative position edit for the addressed leaf pairs or jaw banks
    PositionRelative(EditOp),
}

impl SetterKind {
    /// The command-string key for this setter.
    pub fn key(&self) -> &'static str {
        match self {
            SetterKind::Meterset(_) => "mu=",
            SetterKind::Machine(_) => "m=",
            SetterKind::Gantry(_) => "g=",
            SetterKind::Collimator(_) => "c=",
            SetterKind::PositionAbsolute(_) => "pa=",
            SetterKind::PositionRelative(_) => "pr=",
        }
    }

    /// Human-readable setter name for diagnostics.
    pub fn name(&self) -> &'static str {
        match self {
            SetterKind::Meterset(_) => "MU",
            SetterKind::Machine(_) => "machine",
            SetterKind::Gantry(_) => "gantry",
            SetterKind::Collimator(_) => "collimator",
            SetterKind::PositionAbsolute(_) => "absolute position",
            SetterKind::PositionRelative(_) => "relative position",
        }
    }

    /// True for the two position setters.
    pub fn is_position(&self) -> bool {
        matches!(
            self,
            SetterKind::PositionAbsolute(_) | SetterKind::PositionRelative(_)
        )
    }
}
