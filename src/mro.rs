/*
 * Copyright (c) Meta Platforms, Inc. and affiliates.
 *
 * This source code is licensed under the MIT license found in the
 * LICENSE file in the root directory of this source tree.
 */

//! C3 linearization of the class graph.
//!
//! Computed once per class at construction time and stored with it, so a
//! classification call only ever walks a precomputed order. You can read
//! about the algorithm and a worked-through example here:
//! https://en.wikipedia.org/wiki/C3_linearization

use std::fmt;

use dupe::Dupe;
use itertools::Itertools;
use vec1::Vec1;

use crate::class::Class;

/// A class's ancestors in resolution order, after the C3 merge. The class
/// itself is not included and sits implicitly at the front.
///
/// `Inconsistent` marks a hierarchy with no consistent monotonic
/// linearization. Such classes stay representable, and poison every
/// subclass, but are rejected as lookup targets.
#[derive(Debug)]
pub enum Mro {
    Resolved(Vec<Class>),
    Inconsistent,
}

impl fmt::Display for Mro {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Mro::Resolved(xs) => {
                write!(f, "[{}]", xs.iter().map(Class::name).join(", "))
            }
            Mro::Inconsistent => f.write_str("inconsistent"),
        }
    }
}

impl Mro {
    /// Linearize a class from its direct bases, each already linearized.
    ///
    /// Builds one chain per base (that base's linearization, headed by the
    /// base itself) plus one chain of the direct bases in declaration order,
    /// then merges them.
    pub fn linearize(bases: &[Class]) -> Self {
        let mut chains = Vec::new();
        for base in bases {
            match base.ancestors() {
                Mro::Resolved(ancestors) => {
                    chains.push(AncestorChain::from_base_and_ancestors(
                        base.dupe(),
                        ancestors.iter().rev().map(Dupe::dupe).collect(),
                    ));
                }
                Mro::Inconsistent => return Mro::Inconsistent,
            }
        }
        let direct = match Vec1::try_from_vec(bases.iter().rev().map(Dupe::dupe).collect()) {
            Ok(direct) => direct,
            Err(_) => return Mro::Resolved(Vec::new()),
        };
        chains.push(AncestorChain(direct));
        match merge(chains) {
            Some(ancestors) => Mro::Resolved(ancestors),
            None => Mro::Inconsistent,
        }
    }

    pub fn is_resolved(&self) -> bool {
        matches!(self, Mro::Resolved(_))
    }

    /// Ancestors in order; empty for inconsistent hierarchies.
    pub(crate) fn classes(&self) -> std::slice::Iter<'_, Class> {
        match self {
            Mro::Resolved(xs) => xs.iter(),
            Mro::Inconsistent => [].iter(),
        }
    }
}

/// One chain in the C3 merge: a base's linearization, or the list of direct
/// bases. Chains are stored in reverse so the merge can be pop()-based, and
/// use `Vec1` so an emptied chain drops out as the merge progresses.
struct AncestorChain(Vec1<Class>);

impl AncestorChain {
    fn from_base_and_ancestors(base: Class, ancestors_reversed: Vec<Class>) -> Self {
        AncestorChain(Vec1::from_vec_push(ancestors_reversed, base))
    }
}

/// The merge step: repeatedly select the head of some chain that appears in
/// no chain's tail, then strip it from every chain. `None` when no head
/// qualifies, meaning the hierarchy is not linearizable.
fn merge(mut chains: Vec<AncestorChain>) -> Option<Vec<Class>> {
    let mut ancestors = Vec::new();
    while !chains.is_empty() {
        let mut selected = None;
        for candidate_chain in &chains {
            let candidate = candidate_chain.0.last();
            let in_tail = chains
                .iter()
                .any(|chain| chain.0.iter().rev().skip(1).any(|c| c == candidate));
            if !in_tail {
                selected = Some(candidate.dupe());
                break;
            }
        }
        let selected = selected?;
        let mut emptied = Vec::new();
        for (idx, chain) in chains.iter_mut().enumerate() {
            if chain.0.last() == &selected && chain.0.pop().is_err() {
                // The chain held only the selected class; drop it whole.
                emptied.push(idx);
            }
        }
        for (offset, idx) in emptied.into_iter().enumerate() {
            chains.remove(idx - offset);
        }
        ancestors.push(selected);
    }
    Some(ancestors)
}
