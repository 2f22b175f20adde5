//! Substitution of bindings into atoms.
//!
//! Rewriting replaces every variable bound in a [`Bindings`] set by its
//! binding and rebuilds the atoms above it through their normalizing
//! constructors, so a rewritten sequence is re-canonicalized and a rewritten
//! application is re-applied (including its native handler, if any).
//!
//! # Invariants
//! - An atom with nothing to substitute is returned as the same instance,
//!   with `changed == false`.
//! - Atoms are never mutated in place.

use crate::core::{Atom, AtomError, AtomKind};
use crate::outcome::Bindings;
use crate::props::{AlgProp, PropField};
use crate::sequence::AtomSeq;

impl Atom {
    /// Substitutes `binds` into this atom.
    ///
    /// Returns the rewritten atom and whether anything changed.
    ///
    /// # Errors
    /// Rebuilding can fail when a substituted property set becomes illegal or
    /// a re-applied operator rejects its new arguments.
    pub fn rewrite(&self, binds: &Bindings) -> Result<(Atom, bool), AtomError> {
        // bound variables are constant but still substitutable during beta reduction
        if binds.is_empty() || (self.is_constant() && self.de_bruijn_index() == 0) {
            return Ok((self.clone(), false));
        }
        match self.kind() {
            AtomKind::Variable(var) => {
                if let Some(bound) = binds.get(var.name()) {
                    return Ok((bound.clone(), true));
                }
                if var.is_bound() {
                    return Ok((self.clone(), false));
                }
                let (ty, ty_changed) = var.ty().rewrite(binds)?;
                let (guard, guard_changed) = match var.guard() {
                    Some(guard) => {
                        let (guard, changed) = guard.rewrite(binds)?;
                        (Some(guard), changed)
                    }
                    None => (None, false),
                };
                if ty_changed || guard_changed {
                    Ok((Atom::variable(var.name().to_string(), ty, guard), true))
                } else {
                    Ok((self.clone(), false))
                }
            }
            AtomKind::Lambda { param, body } => {
                let (body, changed) = body.rewrite(binds)?;
                if changed {
                    Ok((
                        Atom::build(AtomKind::Lambda {
                            param: param.clone(),
                            body,
                        }),
                        true,
                    ))
                } else {
                    Ok((self.clone(), false))
                }
            }
            AtomKind::Seq(seq) => match seq.rewrite(binds)? {
                (seq, true) => Ok((Atom::seq(seq), true)),
                (_, false) => Ok((self.clone(), false)),
            },
            AtomKind::Prop(props) => match props.rewrite(binds)? {
                (props, true) => Ok((Atom::prop(props), true)),
                (_, false) => Ok((self.clone(), false)),
            },
            AtomKind::Apply(app) => {
                let (op, op_changed) = app.op().rewrite(binds)?;
                let (arg, arg_changed) = app.arg().rewrite(binds)?;
                if op_changed || arg_changed {
                    Ok((Atom::apply(&op, &arg)?, true))
                } else {
                    Ok((self.clone(), false))
                }
            }
            AtomKind::TypeUniverse
            | AtomKind::RootType(_)
            | AtomKind::Literal { .. }
            | AtomKind::OperatorRef(_) => Ok((self.clone(), false)),
        }
    }
}

impl AtomSeq {
    /// Substitutes `binds` into the elements and properties, re-normalizing
    /// when anything changed.
    pub fn rewrite(&self, binds: &Bindings) -> Result<(AtomSeq, bool), AtomError> {
        if binds.is_empty() || (self.is_constant() && self.de_bruijn_index() == 0) {
            return Ok((self.clone(), false));
        }
        let (props, mut changed) = self.props().rewrite(binds)?;
        let mut atoms = Vec::with_capacity(self.len());
        for atom in self.iter() {
            let (atom, atom_changed) = atom.rewrite(binds)?;
            changed |= atom_changed;
            atoms.push(atom);
        }
        if changed {
            Ok((AtomSeq::new(props, atoms), true))
        } else {
            Ok((self.clone(), false))
        }
    }
}

impl AlgProp {
    /// Substitutes `binds` into every field, re-validating the result.
    pub fn rewrite(&self, binds: &Bindings) -> Result<(AlgProp, bool), AtomError> {
        if binds.is_empty() || (self.is_constant() && self.de_bruijn_index() == 0) {
            return Ok((self.clone(), false));
        }
        let mut builder = self.to_builder();
        let mut changed = false;
        for field in PropField::ALL {
            if let Some(value) = self.get(field) {
                let (value, field_changed) = value.rewrite(binds)?;
                if field_changed {
                    builder = builder.set(field, Some(value));
                    changed = true;
                }
            }
        }
        if changed {
            Ok((builder.build()?, true))
        } else {
            Ok((self.clone(), false))
        }
    }
}
