//! Core term model: immutable, structurally hashed atoms.
//!
//! An [`Atom`] is a node of a symbolic term tree. Atoms are created once and
//! never mutated; cloning an atom clones a pointer. Every atom caches, at
//! construction, its type, whether it is constant (no free variables,
//! transitively), its depth, its binding index and its structural fingerprint.
//!
//! The set of atom kinds is closed ([`AtomKind`]). Matching dispatches over it
//! in [`crate::matching`], substitution in [`crate::rewrite`], and operator
//! application in [`crate::operator`].
//!
//! # Invariants
//! - Two atoms are structurally equal iff their depths and fingerprints agree.
//! - A lambda's parameter is a bound variable `:n` where `n` is the lambda's
//!   binding index; alpha-equivalent lambdas are therefore equal.
//! - `^TYPE` is its own type; every other atom's type is another atom.
//!
//! # Citations
//! - de Bruijn, "Lambda calculus notation with nameless dummies", Indagationes Mathematicae (1972)
//! - Merkle, "A digital signature based on a conventional encryption function", CRYPTO (1987)

use crate::constants::{
    ANY, BOOLEAN, BOUND_VARIABLE_PREFIX, DOMAIN_APPLY_V0, DOMAIN_LAMBDA_V0, DOMAIN_LITERAL_V0,
    DOMAIN_ROOT_TYPE_V0, DOMAIN_TYPE_UNIVERSE_V0, DOMAIN_VARIABLE_V0, FLOAT, INTEGER, OPREF,
    STRING, SYMBOL, TYPE_UNIVERSE,
};
use crate::fingerprint::{FingerprintBuilder, HashValue};
use crate::operator::{ArgumentListError, Operator};
use crate::outcome::Bindings;
use crate::props::{AlgProp, PropertyError};
use crate::sequence::{AtomSeq, ConstantPool};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::hash::{Hash, Hasher};
use std::sync::{Arc, OnceLock};

/// Leaf value of a literal atom.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Literal {
    Integer(i64),
    String(String),
    Symbol(String),
    Boolean(bool),
    Float(f64),
}

impl Literal {
    fn default_type(&self) -> Atom {
        match self {
            Literal::Integer(_) => Atom::integer_type(),
            Literal::String(_) => Atom::string_type(),
            Literal::Symbol(_) => Atom::symbol_type(),
            Literal::Boolean(_) => Atom::boolean_type(),
            Literal::Float(_) => Atom::float_type(),
        }
    }

    fn feed(&self, fp: FingerprintBuilder) -> FingerprintBuilder {
        match self {
            Literal::Integer(i) => fp.tag(0).u64(*i as u64),
            Literal::String(s) => fp.tag(1).str(s),
            Literal::Symbol(s) => fp.tag(2).str(s),
            Literal::Boolean(b) => fp.tag(3).tag(*b as u8),
            Literal::Float(x) => fp.tag(4).u64(x.to_bits()),
        }
    }
}

impl fmt::Display for Literal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Literal::Integer(i) => write!(f, "{}", i),
            Literal::String(s) => write!(f, "{:?}", s),
            Literal::Symbol(s) => write!(f, "`{}`", s),
            Literal::Boolean(b) => write!(f, "{}", b),
            Literal::Float(x) => write!(f, "{:?}", x),
        }
    }
}

/// A pattern variable, or a bound variable introduced by a lambda.
///
/// Bound variables have a non-zero `index` and are named `:index`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Variable {
    name: String,
    ty: Atom,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    guard: Option<Atom>,
    #[serde(default)]
    index: usize,
}

impl Variable {
    /// Variable name without the `$` sigil; `:n` for bound variables.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Type a subject must match to be bound.
    pub fn ty(&self) -> &Atom {
        &self.ty
    }

    /// Condition that must rewrite to `true` for a binding to be accepted.
    pub fn guard(&self) -> Option<&Atom> {
        self.guard.as_ref()
    }

    /// Whether this is a De Bruijn variable bound by a lambda.
    pub fn is_bound(&self) -> bool {
        self.index > 0
    }

    /// Binding index; 0 for free pattern variables.
    pub fn index(&self) -> usize {
        self.index
    }
}

/// Application of an operator (or any other atom) to an argument.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Application {
    op: Atom,
    arg: Atom,
    /// Formal parameter bindings established when the application was built.
    #[serde(skip)]
    params: Bindings,
}

impl Application {
    /// The applied head: an operator reference, lambda, or other atom.
    pub fn op(&self) -> &Atom {
        &self.op
    }

    /// The argument, usually a sequence.
    pub fn arg(&self) -> &Atom {
        &self.arg
    }

    pub fn params(&self) -> &Bindings {
        &self.params
    }

    /// The operator descriptor, when the head is an operator reference.
    pub fn operator(&self) -> Option<&Operator> {
        self.op.as_operator()
    }

    /// The argument list, when the argument is a sequence.
    pub fn args(&self) -> Option<&AtomSeq> {
        self.arg.as_seq()
    }
}

/// The closed set of atom kinds.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum AtomKind {
    /// `^TYPE`, the type of all root types and of itself.
    TypeUniverse,
    /// A named root type such as `ANY` or `INTEGER`.
    RootType(String),
    Literal {
        value: Literal,
        ty: Atom,
    },
    Variable(Variable),
    Lambda {
        param: Atom,
        body: Atom,
    },
    Seq(AtomSeq),
    Prop(AlgProp),
    OperatorRef(Operator),
    Apply(Application),
}

struct AtomNode {
    kind: AtomKind,
    /// `None` only for the type universe, which is its own type.
    ty: Option<Atom>,
    is_constant: bool,
    depth: usize,
    de_bruijn_index: usize,
    fingerprint: HashValue,
}

/// Immutable, reference-counted term node.
#[derive(Clone, Serialize, Deserialize)]
#[serde(try_from = "AtomKind", into = "AtomKind")]
pub struct Atom(Arc<AtomNode>);

macro_rules! cached_root_type {
    ($(#[$meta:meta])* $fn_name:ident, $name:expr) => {
        $(#[$meta])*
        pub fn $fn_name() -> Atom {
            static CELL: OnceLock<Atom> = OnceLock::new();
            CELL.get_or_init(|| Atom::root_type($name)).clone()
        }
    };
}

impl Atom {
    /// Builds the node for `kind`, computing every cached attribute.
    ///
    /// No normalization or validation happens here; public constructors do
    /// that before delegating.
    pub(crate) fn build(kind: AtomKind) -> Atom {
        let ty = match &kind {
            AtomKind::TypeUniverse => None,
            AtomKind::RootType(_) => Some(Atom::universe()),
            AtomKind::Literal { ty, .. } => Some(ty.clone()),
            AtomKind::Variable(var) => Some(var.ty.clone()),
            AtomKind::Lambda { .. } | AtomKind::Seq(_) | AtomKind::Prop(_) => Some(Atom::any()),
            AtomKind::OperatorRef(_) => Some(Atom::opref_type()),
            AtomKind::Apply(app) => Some(
                app.operator()
                    .and_then(Operator::result_type)
                    .cloned()
                    .unwrap_or_else(Atom::any),
            ),
        };

        let (is_constant, depth, de_bruijn_index) = match &kind {
            AtomKind::TypeUniverse | AtomKind::RootType(_) | AtomKind::Literal { .. } => (true, 0, 0),
            AtomKind::OperatorRef(_) => (true, 0, 0),
            AtomKind::Variable(var) => (var.is_bound(), 0, var.index),
            AtomKind::Lambda { param, body } => (
                body.is_constant(),
                param.depth().max(body.depth()) + 1,
                param.de_bruijn_index(),
            ),
            AtomKind::Seq(seq) => (seq.is_constant(), seq.depth(), seq.de_bruijn_index()),
            AtomKind::Prop(props) => (
                props.is_constant(),
                props.fields().map(|(_, v)| v.depth()).max().unwrap_or(0) + 1,
                props.de_bruijn_index(),
            ),
            AtomKind::Apply(app) => (
                app.op.is_constant() && app.arg.is_constant(),
                app.op.depth().max(app.arg.depth()) + 1,
                app.op.de_bruijn_index().max(app.arg.de_bruijn_index()),
            ),
        };

        let fingerprint = match &kind {
            AtomKind::TypeUniverse => FingerprintBuilder::new(DOMAIN_TYPE_UNIVERSE_V0).finish(),
            AtomKind::RootType(name) => FingerprintBuilder::new(DOMAIN_ROOT_TYPE_V0).str(name).finish(),
            AtomKind::Literal { value, ty } => value
                .feed(FingerprintBuilder::new(DOMAIN_LITERAL_V0))
                .hash(ty.fingerprint())
                .finish(),
            AtomKind::Variable(var) => FingerprintBuilder::new(DOMAIN_VARIABLE_V0)
                .u64(var.index as u64)
                .str(&var.name)
                .hash(var.ty.fingerprint())
                .optional(var.guard.as_ref().map(Atom::fingerprint))
                .finish(),
            AtomKind::Lambda { param, body } => FingerprintBuilder::new(DOMAIN_LAMBDA_V0)
                .hash(param.fingerprint())
                .hash(body.fingerprint())
                .finish(),
            AtomKind::Seq(seq) => *seq.fingerprint(),
            AtomKind::Prop(props) => props.fingerprint(),
            AtomKind::OperatorRef(op) => *op.fingerprint(),
            AtomKind::Apply(app) => FingerprintBuilder::new(DOMAIN_APPLY_V0)
                .hash(app.op.fingerprint())
                .hash(app.arg.fingerprint())
                .finish(),
        };

        Atom(Arc::new(AtomNode {
            kind,
            ty,
            is_constant,
            depth,
            de_bruijn_index,
            fingerprint,
        }))
    }

    /// Validating constructor used when atoms are decoded.
    pub fn from_kind(kind: AtomKind) -> Result<Atom, AtomError> {
        if let AtomKind::Lambda { param, .. } = &kind {
            if !param.as_variable().map_or(false, Variable::is_bound) {
                return Err(AtomError::NotAVariable(param.to_string()));
            }
        }
        Ok(Atom::build(kind))
    }

    /// The type universe `^TYPE`.
    pub fn universe() -> Atom {
        static CELL: OnceLock<Atom> = OnceLock::new();
        CELL.get_or_init(|| Atom::build(AtomKind::TypeUniverse)).clone()
    }

    /// A named root type.
    pub fn root_type(name: impl Into<String>) -> Atom {
        Atom::build(AtomKind::RootType(name.into()))
    }

    cached_root_type!(
        /// `ANY`, which as a pattern matches every subject.
        any,
        ANY
    );
    cached_root_type!(integer_type, INTEGER);
    cached_root_type!(string_type, STRING);
    cached_root_type!(symbol_type, SYMBOL);
    cached_root_type!(boolean_type, BOOLEAN);
    cached_root_type!(float_type, FLOAT);
    cached_root_type!(opref_type, OPREF);

    fn literal(value: Literal) -> Atom {
        let ty = value.default_type();
        Atom::build(AtomKind::Literal { value, ty })
    }

    /// An `INTEGER` literal.
    pub fn integer(value: i64) -> Atom {
        Atom::literal(Literal::Integer(value))
    }

    /// A `STRING` literal.
    pub fn string(value: impl Into<String>) -> Atom {
        Atom::literal(Literal::String(value.into()))
    }

    /// A `SYMBOL` literal.
    pub fn symbol(name: impl Into<String>) -> Atom {
        Atom::literal(Literal::Symbol(name.into()))
    }

    /// A symbol with an explicit type in place of `SYMBOL`.
    pub fn typed_symbol(name: impl Into<String>, ty: Atom) -> Atom {
        Atom::build(AtomKind::Literal {
            value: Literal::Symbol(name.into()),
            ty,
        })
    }

    /// A `BOOLEAN` literal.
    pub fn boolean(value: bool) -> Atom {
        Atom::literal(Literal::Boolean(value))
    }

    /// A `FLOAT` literal.
    pub fn float(value: f64) -> Atom {
        Atom::literal(Literal::Float(value))
    }

    /// Pattern variable `$name` of type `ANY`.
    pub fn var(name: impl Into<String>) -> Atom {
        Atom::typed_var(name, Atom::any())
    }

    /// Pattern variable `$name:ty`.
    pub fn typed_var(name: impl Into<String>, ty: Atom) -> Atom {
        Atom::variable(name.into(), ty, None)
    }

    /// Pattern variable `$name:ty` accepting only bindings for which `guard`
    /// rewrites to `true`.
    pub fn guarded_var(name: impl Into<String>, ty: Atom, guard: Atom) -> Atom {
        Atom::variable(name.into(), ty, Some(guard))
    }

    /// Free variable from parts, used when rebuilding during rewrite.
    pub(crate) fn variable(name: String, ty: Atom, guard: Option<Atom>) -> Atom {
        Atom::build(AtomKind::Variable(Variable {
            name,
            ty,
            guard,
            index: 0,
        }))
    }

    /// De Bruijn variable `:index`.
    pub(crate) fn bound_var(index: usize, ty: Atom, guard: Option<Atom>) -> Atom {
        Atom::build(AtomKind::Variable(Variable {
            name: format!("{}{}", BOUND_VARIABLE_PREFIX, index),
            ty,
            guard,
            index,
        }))
    }

    /// Builds `\param.body`, renaming the parameter to a De Bruijn variable.
    ///
    /// # Errors
    /// `param` must be a free pattern variable.
    pub fn lambda(param: &Atom, body: &Atom) -> Result<Atom, AtomError> {
        let var = param
            .as_variable()
            .filter(|v| !v.is_bound())
            .ok_or_else(|| AtomError::NotAVariable(param.to_string()))?;
        let index = body.de_bruijn_index() + 1;
        let plain = Atom::bound_var(index, var.ty.clone(), None);
        let guard = match &var.guard {
            Some(guard) => Some(guard.rewrite(&Bindings::new().with(var.name(), plain))?.0),
            None => None,
        };
        let bound = Atom::bound_var(index, var.ty.clone(), guard);
        let (body, _) = body.rewrite(&Bindings::new().with(var.name(), bound.clone()))?;
        Ok(Atom::build(AtomKind::Lambda { param: bound, body }))
    }

    /// Wraps a normalized sequence.
    pub fn seq(seq: AtomSeq) -> Atom {
        Atom::build(AtomKind::Seq(seq))
    }

    /// Wraps a property set as an atom.
    pub fn prop(props: AlgProp) -> Atom {
        Atom::build(AtomKind::Prop(props))
    }

    /// Reference to an operator, usable as an application head.
    pub fn operator(op: Operator) -> Atom {
        Atom::build(AtomKind::OperatorRef(op))
    }

    /// Structural application node; no normalization, no handler.
    pub fn apply_as_is(op: Atom, arg: Atom, params: Bindings) -> Atom {
        Atom::build(AtomKind::Apply(Application { op, arg, params }))
    }

    #[inline]
    pub fn kind(&self) -> &AtomKind {
        &self.0.kind
    }

    /// The type of this atom.
    #[inline]
    pub fn ty(&self) -> &Atom {
        self.0.ty.as_ref().unwrap_or(self)
    }

    /// Whether no free variable occurs in this atom.
    #[inline]
    pub fn is_constant(&self) -> bool {
        self.0.is_constant
    }

    #[inline]
    pub fn depth(&self) -> usize {
        self.0.depth
    }

    #[inline]
    pub fn de_bruijn_index(&self) -> usize {
        self.0.de_bruijn_index
    }

    #[inline]
    pub fn fingerprint(&self) -> &HashValue {
        &self.0.fingerprint
    }

    /// Constant children by fingerprint, for sequences and applications over
    /// sequences.
    pub fn constant_pool(&self) -> Option<&ConstantPool> {
        match self.kind() {
            AtomKind::Seq(seq) => Some(seq.constant_pool()),
            AtomKind::Apply(app) => app.arg.constant_pool(),
            _ => None,
        }
    }

    /// Whether both handles point to the same node.
    #[inline]
    pub fn ptr_eq(a: &Atom, b: &Atom) -> bool {
        Arc::ptr_eq(&a.0, &b.0)
    }

    /// The literal value, for literal atoms.
    pub fn as_literal(&self) -> Option<&Literal> {
        match self.kind() {
            AtomKind::Literal { value, .. } => Some(value),
            _ => None,
        }
    }

    /// The value of a boolean literal.
    pub fn as_bool(&self) -> Option<bool> {
        match self.as_literal() {
            Some(Literal::Boolean(b)) => Some(*b),
            _ => None,
        }
    }

    /// The value of an integer literal.
    pub fn as_integer(&self) -> Option<i64> {
        match self.as_literal() {
            Some(Literal::Integer(i)) => Some(*i),
            _ => None,
        }
    }

    /// Variable descriptor, for free and bound variables.
    pub fn as_variable(&self) -> Option<&Variable> {
        match self.kind() {
            AtomKind::Variable(var) => Some(var),
            _ => None,
        }
    }

    /// The sequence, for sequence atoms.
    pub fn as_seq(&self) -> Option<&AtomSeq> {
        match self.kind() {
            AtomKind::Seq(seq) => Some(seq),
            _ => None,
        }
    }

    /// The property set, for property atoms.
    pub fn as_prop(&self) -> Option<&AlgProp> {
        match self.kind() {
            AtomKind::Prop(props) => Some(props),
            _ => None,
        }
    }

    /// The operator descriptor, for operator references.
    pub fn as_operator(&self) -> Option<&Operator> {
        match self.kind() {
            AtomKind::OperatorRef(op) => Some(op),
            _ => None,
        }
    }

    /// The application node, for applications.
    pub fn as_apply(&self) -> Option<&Application> {
        match self.kind() {
            AtomKind::Apply(app) => Some(app),
            _ => None,
        }
    }

    /// Parameter and body, for lambdas.
    pub fn as_lambda(&self) -> Option<(&Atom, &Atom)> {
        match self.kind() {
            AtomKind::Lambda { param, body } => Some((param, body)),
            _ => None,
        }
    }

    /// Whether this atom is the root type `ANY`.
    pub fn is_any(&self) -> bool {
        matches!(self.kind(), AtomKind::RootType(name) if name == ANY)
    }

    /// Kinds that a constant pattern may match without being equal.
    pub(crate) fn is_structured(&self) -> bool {
        matches!(
            self.kind(),
            AtomKind::Seq(_) | AtomKind::Apply(_) | AtomKind::Prop(_)
        )
    }
}

impl TryFrom<AtomKind> for Atom {
    type Error = AtomError;

    fn try_from(kind: AtomKind) -> Result<Self, Self::Error> {
        Atom::from_kind(kind)
    }
}

impl From<Atom> for AtomKind {
    fn from(atom: Atom) -> Self {
        atom.kind().clone()
    }
}

impl From<bool> for Atom {
    fn from(value: bool) -> Self {
        Atom::boolean(value)
    }
}

impl From<i64> for Atom {
    fn from(value: i64) -> Self {
        Atom::integer(value)
    }
}

impl From<f64> for Atom {
    fn from(value: f64) -> Self {
        Atom::float(value)
    }
}

impl From<AtomSeq> for Atom {
    fn from(seq: AtomSeq) -> Self {
        Atom::seq(seq)
    }
}

impl From<AlgProp> for Atom {
    fn from(props: AlgProp) -> Self {
        Atom::prop(props)
    }
}

impl From<Operator> for Atom {
    fn from(op: Operator) -> Self {
        Atom::operator(op)
    }
}

impl PartialEq for Atom {
    #[inline]
    fn eq(&self, other: &Self) -> bool {
        Atom::ptr_eq(self, other)
            || (self.depth() == other.depth() && self.fingerprint() == other.fingerprint())
    }
}

impl Eq for Atom {}

impl Hash for Atom {
    #[inline]
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.fingerprint().hash(state);
    }
}

impl fmt::Display for Atom {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.kind() {
            AtomKind::TypeUniverse => f.write_str(TYPE_UNIVERSE),
            AtomKind::RootType(name) => f.write_str(name),
            AtomKind::Literal { value, ty } => {
                write!(f, "{}", value)?;
                if *ty != value.default_type() {
                    write!(f, ":{}", ty)?;
                }
                Ok(())
            }
            AtomKind::Variable(var) => {
                if !var.is_bound() {
                    f.write_str("$")?;
                }
                f.write_str(&var.name)?;
                if !var.ty.is_any() {
                    write!(f, ":{}", var.ty)?;
                }
                if let Some(guard) = &var.guard {
                    write!(f, "{{{}}}", guard)?;
                }
                Ok(())
            }
            AtomKind::Lambda { param, body } => write!(f, "\\${}.{}", param, body),
            AtomKind::Seq(seq) => write!(f, "{}", seq),
            AtomKind::Prop(props) => write!(f, "%{{{}}}", props),
            AtomKind::OperatorRef(op) => f.write_str(op.name()),
            AtomKind::Apply(app) => match (app.operator(), app.args()) {
                (Some(op), Some(args)) => {
                    write!(f, "{}(", op.name())?;
                    for (i, atom) in args.iter().enumerate() {
                        if i > 0 {
                            f.write_str(", ")?;
                        }
                        write!(f, "{}", atom)?;
                    }
                    f.write_str(")")
                }
                (Some(op), None) => write!(f, "{}({})", op.name(), app.arg),
                (None, _) => write!(f, "{}.{}", app.op, app.arg),
            },
        }
    }
}

impl fmt::Debug for Atom {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Atom({})", self)
    }
}

/// Error raised by fallible atom construction and by rewriting.
#[derive(Debug, Clone)]
pub enum AtomError {
    /// Illegal property specification.
    Property(PropertyError),
    /// Operator or lambda application failed.
    ArgumentList(ArgumentListError),
    /// A variable was required (lambda parameter, formal parameter).
    NotAVariable(String),
}

impl fmt::Display for AtomError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AtomError::Property(err) => write!(f, "illegal property specification: {}", err),
            AtomError::ArgumentList(err) => write!(f, "argument list error: {}", err),
            AtomError::NotAVariable(atom) => write!(f, "expected a variable, got `{}`", atom),
        }
    }
}

impl std::error::Error for AtomError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            AtomError::Property(err) => Some(err),
            AtomError::ArgumentList(err) => Some(err),
            AtomError::NotAVariable(_) => None,
        }
    }
}

impl From<PropertyError> for AtomError {
    fn from(err: PropertyError) -> Self {
        AtomError::Property(err)
    }
}

impl From<ArgumentListError> for AtomError {
    fn from(err: ArgumentListError) -> Self {
        AtomError::ArgumentList(err)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn universe_is_its_own_type() {
        let universe = Atom::universe();
        assert_eq!(universe.ty(), &universe);
        assert_eq!(Atom::any().ty(), &universe);
        assert_eq!(universe.to_string(), "^TYPE");
    }

    #[test]
    fn literals_carry_their_root_type() {
        assert_eq!(Atom::integer(3).ty(), &Atom::integer_type());
        assert_eq!(Atom::string("s").ty(), &Atom::string_type());
        assert_eq!(Atom::boolean(true).ty(), &Atom::boolean_type());
        let color = Atom::root_type("COLOR");
        assert_eq!(Atom::typed_symbol("red", color.clone()).ty(), &color);
    }

    #[test]
    fn structural_equality_ignores_identity() {
        let a = Atom::integer(7);
        let b = Atom::integer(7);
        assert!(!Atom::ptr_eq(&a, &b));
        assert_eq!(a, b);
        assert_ne!(Atom::integer(7), Atom::float(7.0));
        assert_ne!(Atom::symbol("x"), Atom::string("x"));
    }

    #[test]
    fn constancy_and_depth() {
        let x = Atom::var("x");
        assert!(!x.is_constant());
        assert_eq!(x.depth(), 0);
        let seq = Atom::seq(AtomSeq::plain(vec![Atom::integer(1), x]));
        assert!(!seq.is_constant());
        assert_eq!(seq.depth(), 1);
        let nested = Atom::seq(AtomSeq::plain(vec![seq, Atom::integer(2)]));
        assert_eq!(nested.depth(), 2);
    }

    #[test]
    fn lambda_parameter_becomes_bound_variable() {
        let x = Atom::var("x");
        let lambda = Atom::lambda(&x, &Atom::seq(AtomSeq::plain(vec![x.clone()]))).unwrap();
        let (param, body) = lambda.as_lambda().unwrap();
        assert_eq!(param.as_variable().unwrap().name(), ":1");
        assert!(lambda.is_constant());
        assert_eq!(lambda.de_bruijn_index(), 1);
        assert_eq!(body.to_string(), "%(:1)");
        assert_eq!(lambda.to_string(), "\\$:1.%(:1)");
    }

    #[test]
    fn nested_lambdas_get_distinct_indices() {
        let x = Atom::var("x");
        let y = Atom::var("y");
        let inner = Atom::lambda(&y, &Atom::seq(AtomSeq::plain(vec![x.clone(), y.clone()]))).unwrap();
        let outer = Atom::lambda(&x, &inner).unwrap();
        assert_eq!(outer.de_bruijn_index(), 2);
        assert_eq!(outer.to_string(), "\\$:2.\\$:1.%(:2, :1)");
    }

    #[test]
    fn lambda_requires_variable_parameter() {
        let err = Atom::lambda(&Atom::integer(1), &Atom::integer(2)).unwrap_err();
        assert!(matches!(err, AtomError::NotAVariable(_)));
    }

    #[test]
    fn variable_rendering() {
        assert_eq!(Atom::var("x").to_string(), "$x");
        assert_eq!(Atom::typed_var("n", Atom::integer_type()).to_string(), "$n:INTEGER");
        assert_eq!(Atom::symbol("s").to_string(), "`s`");
        assert_eq!(Atom::string("s").to_string(), "\"s\"");
        assert_eq!(Atom::float(1.5).to_string(), "1.5");
    }
}
