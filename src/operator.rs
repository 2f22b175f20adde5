//! Operator descriptors and operator application.
//!
//! An [`Operator`] has a name, an ordered list of formal parameters, declared
//! algebraic properties, an optional result type and an optional native
//! handler. Applying it to an argument list validates the caller's requested
//! properties, normalizes the list according to the declared ones, binds the
//! formal parameters and finally either runs the handler or builds a
//! structural application.
//!
//! Associative normalization, in order: nested applications of the same
//! operator are flattened one level; identities are removed; duplicates are
//! removed if idempotent; an absorber short-circuits to itself; an empty
//! list yields the identity and a singleton yields its element; otherwise the
//! last formal parameter is repeated until the arities agree.
//!
//! # Citations
//! - Baader & Nipkow, "Term Rewriting and All That", Section 10.3 (1998)
//! - Clavel et al., "All About Maude", Chapter 4, "Equational attributes" (2007)

use crate::constants::{DOMAIN_OPERATOR_V0, PARAMETER_COPY_SEPARATOR};
use crate::core::{Atom, AtomError};
use crate::fingerprint::{FingerprintBuilder, HashValue};
use crate::matching::SequenceMatcher;
use crate::outcome::{Bindings, MatchContext, MatchFailure};
use crate::props::{AlgProp, PropField};
use crate::sequence::AtomSeq;
use log::debug;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::fmt;
use std::sync::Arc;

/// Native evaluation hook. Returning `None` declines, in which case a
/// structural application is built.
pub type NativeHandler = Arc<dyn Fn(&HandlerCall<'_>) -> Option<Atom> + Send + Sync>;

/// What a native handler sees.
pub struct HandlerCall<'a> {
    operator: &'a Operator,
    args: &'a AtomSeq,
    params: &'a Bindings,
}

impl<'a> HandlerCall<'a> {
    /// The operator being applied.
    pub fn operator(&self) -> &Operator {
        self.operator
    }

    /// Normalized argument list.
    pub fn args(&self) -> &AtomSeq {
        self.args
    }

    /// Formal parameter bindings, including padding copies (`$x#1`, ...).
    pub fn params(&self) -> &Bindings {
        self.params
    }

    /// The atom bound to a formal parameter.
    pub fn arg(&self, name: &str) -> Option<&Atom> {
        self.params.get(name)
    }

    /// The structural application the handler would otherwise produce.
    pub fn as_is(&self) -> Atom {
        Atom::apply_as_is(
            Atom::operator(self.operator.clone()),
            Atom::seq(self.args.clone()),
            self.params.clone(),
        )
    }
}

struct OperatorDef {
    name: String,
    props: AlgProp,
    params: Vec<Atom>,
    result_type: Option<Atom>,
    fingerprint: HashValue,
    handler: Option<NativeHandler>,
}

#[derive(Clone, Serialize, Deserialize)]
struct OperatorParts {
    name: String,
    #[serde(default)]
    props: AlgProp,
    params: Vec<Atom>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    result_type: Option<Atom>,
}

/// Operator descriptor. Cheap to clone.
///
/// Native handlers are not part of the fingerprint and are not serialized.
#[derive(Clone, Serialize, Deserialize)]
#[serde(try_from = "OperatorParts", into = "OperatorParts")]
pub struct Operator(Arc<OperatorDef>);

/// Builder for [`Operator`].
pub struct OperatorBuilder {
    name: String,
    props: AlgProp,
    params: Vec<Atom>,
    result_type: Option<Atom>,
    handler: Option<NativeHandler>,
}

impl OperatorBuilder {
    /// Declared algebraic properties.
    pub fn props(mut self, props: AlgProp) -> Self {
        self.props = props;
        self
    }

    /// Appends a formal parameter, which must be a pattern variable.
    pub fn param(mut self, param: Atom) -> Self {
        self.params.push(param);
        self
    }

    /// Appends several formal parameters.
    pub fn params(mut self, params: impl IntoIterator<Item = Atom>) -> Self {
        self.params.extend(params);
        self
    }

    /// Type of the applications this operator builds. Defaults to `ANY`.
    pub fn result_type(mut self, ty: Atom) -> Self {
        self.result_type = Some(ty);
        self
    }

    /// Installs a native handler.
    ///
    /// The handler sees the normalized arguments and parameter bindings and
    /// returns `None` to fall back to a structural application.
    pub fn handler<F>(mut self, handler: F) -> Self
    where
        F: Fn(&HandlerCall<'_>) -> Option<Atom> + Send + Sync + 'static,
    {
        self.handler = Some(Arc::new(handler));
        self
    }

    /// # Errors
    /// Every formal parameter must be a free pattern variable.
    pub fn build(self) -> Result<Operator, AtomError> {
        if let Some(bad) = self
            .params
            .iter()
            .find(|p| !p.as_variable().map_or(false, |v| !v.is_bound()))
        {
            return Err(AtomError::NotAVariable(bad.to_string()));
        }
        let fingerprint = self
            .params
            .iter()
            .fold(
                FingerprintBuilder::new(DOMAIN_OPERATOR_V0)
                    .str(&self.name)
                    .hash(&self.props.fingerprint())
                    .u64(self.params.len() as u64),
                |fp, param| fp.hash(param.fingerprint()),
            )
            .optional(self.result_type.as_ref().map(Atom::fingerprint))
            .finish();
        Ok(Operator(Arc::new(OperatorDef {
            name: self.name,
            props: self.props,
            params: self.params,
            result_type: self.result_type,
            fingerprint,
            handler: self.handler,
        })))
    }
}

impl Operator {
    /// Starts an operator declaration with no properties or parameters.
    pub fn builder(name: impl Into<String>) -> OperatorBuilder {
        OperatorBuilder {
            name: name.into(),
            props: AlgProp::none(),
            params: Vec::new(),
            result_type: None,
            handler: None,
        }
    }

    /// Operator name, used when rendering applications.
    pub fn name(&self) -> &str {
        &self.0.name
    }

    /// Declared properties.
    pub fn props(&self) -> &AlgProp {
        &self.0.props
    }

    /// Formal parameters.
    pub fn params(&self) -> &[Atom] {
        &self.0.params
    }

    /// Declared result type, if any.
    pub fn result_type(&self) -> Option<&Atom> {
        self.0.result_type.as_ref()
    }

    /// Whether a native handler is installed.
    pub fn has_handler(&self) -> bool {
        self.0.handler.is_some()
    }

    /// Fingerprint over name, properties, parameters and result type.
    pub fn fingerprint(&self) -> &HashValue {
        &self.0.fingerprint
    }

    /// Applies the operator to `arg`.
    ///
    /// A sequence argument is an argument list; its specified property
    /// fields are the caller's request and must agree with the declaration.
    /// Any other atom is a single argument.
    ///
    /// # Errors
    /// [`ArgumentListError::PropertyMismatch`] when the request disagrees
    /// with the declaration (checked before anything else), and
    /// [`ArgumentListError::Parameters`] when the normalized arguments do not
    /// match the formal parameters.
    pub fn apply(&self, arg: &Atom) -> Result<Atom, AtomError> {
        let args = match arg.as_seq() {
            Some(seq) => {
                self.check_requested(seq.props())?;
                seq.atoms().to_vec()
            }
            None => vec![arg.clone()],
        };

        if !self.props().is_associative() {
            return self.bind_and_dispatch(args, self.params().to_vec());
        }

        let mut flat = Vec::with_capacity(args.len());
        for atom in args {
            match atom.as_apply() {
                Some(app) if app.operator() == Some(self) => match app.args() {
                    Some(inner) => flat.extend(inner.iter().cloned()),
                    None => flat.push(app.arg().clone()),
                },
                _ => flat.push(atom),
            }
        }

        if let Some(identity) = self.props().identity() {
            flat.retain(|atom| atom != identity);
        }
        if self.props().is_idempotent() {
            let mut seen = HashSet::with_capacity(flat.len());
            flat.retain(|atom| seen.insert(atom.clone()));
        }
        if let Some(absorber) = self.props().absorber() {
            if flat.iter().any(|atom| atom == absorber) {
                debug!("{}: absorber `{}` present", self.name(), absorber);
                return Ok(absorber.clone());
            }
        }
        match flat.len() {
            0 => {
                if let Some(identity) = self.props().identity() {
                    debug!("{}: empty argument list, using identity", self.name());
                    return Ok(identity.clone());
                }
            }
            1 => {
                debug!("{}: single argument after normalization", self.name());
                return Ok(flat.swap_remove(0));
            }
            _ => {}
        }

        let params = self.padded_params(flat.len())?;
        self.bind_and_dispatch(flat, params)
    }

    /// Every field the argument list specifies must agree with the
    /// declaration, since the list was already normalized under it.
    fn check_requested(&self, requested: &AlgProp) -> Result<(), ArgumentListError> {
        for property in PropField::ALL {
            let Some(value) = requested.get(property) else {
                continue;
            };
            let declared = match self.props().get(property) {
                Some(declared) => Some(declared.clone()),
                None if property.is_boolean() => Some(Atom::boolean(false)),
                None => None,
            };
            if declared.as_ref() != Some(value) {
                return Err(ArgumentListError::PropertyMismatch {
                    operator: self.name().to_string(),
                    property,
                    requested: value.clone(),
                    declared,
                });
            }
        }
        Ok(())
    }

    /// Formal parameters extended with renamed copies of the last one.
    fn padded_params(&self, arity: usize) -> Result<Vec<Atom>, AtomError> {
        let mut params = self.params().to_vec();
        let Some(last) = params.last().cloned() else {
            return Ok(params);
        };
        let Some(var) = last.as_variable() else {
            return Err(AtomError::NotAVariable(last.to_string()));
        };
        for copy in 1..=arity.saturating_sub(params.len()) {
            let name = format!("{}{}{}", var.name(), PARAMETER_COPY_SEPARATOR, copy);
            let guard = match var.guard() {
                Some(guard) => {
                    let renamed = Atom::variable(name.clone(), var.ty().clone(), None);
                    Some(guard.rewrite(&Bindings::new().with(var.name(), renamed))?.0)
                }
                None => None,
            };
            params.push(Atom::variable(name, var.ty().clone(), guard));
        }
        Ok(params)
    }

    fn bind_and_dispatch(&self, args: Vec<Atom>, params: Vec<Atom>) -> Result<Atom, AtomError> {
        let binds = SequenceMatcher::try_match(&params, &args, &Bindings::new(), &MatchContext::default())
            .into_result()
            .map_err(|failure| ArgumentListError::Parameters {
                operator: self.name().to_string(),
                position: failure.index(),
                failure,
            })?;
        let args = AtomSeq::new(self.props().clone(), args);
        let call = HandlerCall {
            operator: self,
            args: &args,
            params: &binds,
        };
        if let Some(handler) = &self.0.handler {
            if let Some(result) = handler(&call) {
                debug!("{}: handler produced `{}`", self.name(), result);
                return Ok(result);
            }
        }
        Ok(call.as_is())
    }
}

impl Atom {
    /// Applies `op` to `arg`.
    ///
    /// Operator references go through [`Operator::apply`]; lambdas are
    /// beta-reduced; any other head yields a structural application.
    pub fn apply(op: &Atom, arg: &Atom) -> Result<Atom, AtomError> {
        if let Some(operator) = op.as_operator() {
            return operator.apply(arg);
        }
        let Some((param, body)) = op.as_lambda() else {
            return Ok(Atom::apply_as_is(op.clone(), arg.clone(), Bindings::new()));
        };
        let Some(var) = param.as_variable() else {
            return Err(AtomError::NotAVariable(param.to_string()));
        };
        // the bound parameter matches only itself, so match a free copy
        let free = Atom::variable(var.name().to_string(), var.ty().clone(), var.guard().cloned());
        let binds = free
            .try_match(arg, &Bindings::new())
            .into_result()
            .map_err(|failure| ArgumentListError::LambdaParameter {
                lambda: op.clone(),
                failure,
            })?;
        Ok(body.rewrite(&binds)?.0)
    }
}

impl TryFrom<OperatorParts> for Operator {
    type Error = AtomError;

    fn try_from(parts: OperatorParts) -> Result<Self, Self::Error> {
        let builder = Operator::builder(parts.name)
            .props(parts.props)
            .params(parts.params);
        match parts.result_type {
            Some(ty) => builder.result_type(ty).build(),
            None => builder.build(),
        }
    }
}

impl From<Operator> for OperatorParts {
    fn from(op: Operator) -> Self {
        OperatorParts {
            name: op.0.name.clone(),
            props: op.0.props.clone(),
            params: op.0.params.clone(),
            result_type: op.0.result_type.clone(),
        }
    }
}

impl PartialEq for Operator {
    fn eq(&self, other: &Self) -> bool {
        Arc::ptr_eq(&self.0, &other.0)
            || (self.name() == other.name() && self.fingerprint() == other.fingerprint())
    }
}

impl Eq for Operator {}

impl fmt::Debug for Operator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Operator")
            .field("name", &self.name())
            .field("props", &self.props().to_string())
            .field("params", &self.params())
            .field("handler", &self.has_handler())
            .finish()
    }
}

impl fmt::Display for Operator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Operator or lambda application failure.
#[derive(Debug, Clone)]
pub enum ArgumentListError {
    /// The argument list specifies a property the operator does not
    /// declare. `declared` is `None` for an undeclared absorber or identity.
    PropertyMismatch {
        operator: String,
        property: PropField,
        requested: Atom,
        declared: Option<Atom>,
    },
    /// The normalized arguments do not match the formal parameters.
    Parameters {
        operator: String,
        position: Option<usize>,
        failure: MatchFailure,
    },
    /// The argument does not match the lambda's parameter.
    LambdaParameter { lambda: Atom, failure: MatchFailure },
}

impl ArgumentListError {
    /// Failing argument position, when the error came from a positional match.
    pub fn position(&self) -> Option<usize> {
        match self {
            ArgumentListError::Parameters { position, .. } => *position,
            _ => None,
        }
    }

    /// Underlying match failure, if any.
    pub fn failure(&self) -> Option<&MatchFailure> {
        match self {
            ArgumentListError::PropertyMismatch { .. } => None,
            ArgumentListError::Parameters { failure, .. }
            | ArgumentListError::LambdaParameter { failure, .. } => Some(failure),
        }
    }
}

impl fmt::Display for ArgumentListError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ArgumentListError::PropertyMismatch {
                operator,
                property,
                requested,
                declared,
            } => match declared {
                Some(declared) => write!(
                    f,
                    "{}: requested {} `{}` but the operator declares `{}`",
                    operator, property, requested, declared
                ),
                None => write!(
                    f,
                    "{}: requested {} `{}` but the operator declares none",
                    operator, property, requested
                ),
            },
            ArgumentListError::Parameters {
                operator,
                position: Some(position),
                failure,
            } => write!(f, "{}: argument {} rejected: {}", operator, position, failure),
            ArgumentListError::Parameters {
                operator,
                position: None,
                failure,
            } => write!(f, "{}: arguments rejected: {}", operator, failure),
            ArgumentListError::LambdaParameter { lambda, failure } => {
                write!(f, "{}: argument rejected: {}", lambda, failure)
            }
        }
    }
}

impl std::error::Error for ArgumentListError {}
