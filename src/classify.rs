/*
 * Copyright (c) Meta Platforms, Inc. and affiliates.
 *
 * This source code is licensed under the MIT license found in the
 * LICENSE file in the root directory of this source tree.
 */

//! The resolution engine: predicts where an attribute access would land.
//!
//! One algorithm per (target kind, operation) pair, all the same shape:
//! consult candidates in priority order, return the first definitive
//! outcome, fall through to "not found". Hooks are invoked only where the
//! outcome of a real access could differ, and a hook signaling a missing
//! attribute is consumed as fall-through rather than surfaced.
//!
//! The tie-breaks, which govern all four algorithms: a read-write accessor
//! anywhere in the kind's linearization outranks the target's own storage;
//! a read-only accessor is outranked by own storage but outranks plain
//! values later in the same chain; a user-defined override hook outranks
//! everything.

use std::fmt;

use parse_display::Display;
use parse_display::FromStr;
use serde::Serialize;
use serde::Serializer;
use tracing::debug;
use tracing::trace;

use crate::accessor::Classification;
use crate::accessor::HookCtx;
use crate::accessor::HookOutcome;
use crate::accessor::Stored;
use crate::class::Class;
use crate::class::HookSlot;
use crate::class::HookSlotKind;
use crate::class::OverrideCtx;
use crate::class::Target;
use crate::error::ClassifyError;

/// The access being classified.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display, FromStr, Serialize)]
#[display(style = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum Operation {
    Read,
    Write,
    Delete,
}

impl Operation {
    /// Parse an operation given as text, the form collaborators hand over.
    pub fn parse(s: &str) -> Result<Self, ClassifyError> {
        s.parse()
            .map_err(|_| ClassifyError::InvalidOperation(s.to_owned()))
    }
}

/// Where the effective definition of an attribute was found.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Location {
    /// A class's own attribute map.
    ClassStorage(String),
    /// An instance's own attribute map.
    InstanceStorage(String),
    /// A reserved hook slot, named by its owning class.
    Hook(String, HookSlotKind),
    /// No definition anywhere in the consulted chains.
    NotFound,
}

impl fmt::Display for Location {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Location::ClassStorage(name) | Location::InstanceStorage(name) => {
                write!(f, "{name}.own-storage")
            }
            Location::Hook(owner, slot) => write!(f, "{owner}.{slot}"),
            Location::NotFound => f.write_str("not found"),
        }
    }
}

impl Serialize for Location {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

/// The outcome of one classification: what the access would be treated as,
/// and where the effective definition lives.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Verdict {
    pub classification: Classification,
    pub location: Location,
}

impl Verdict {
    fn new(classification: Classification, location: Location) -> Self {
        Self {
            classification,
            location,
        }
    }
}

impl fmt::Display for Verdict {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {})", self.classification, self.location)
    }
}

/// Predict how accessing `name` on `target` with `operation` would resolve,
/// without performing the access. The class graph is not mutated; at most a
/// handful of get hooks are invoked to tell outcomes apart.
pub fn classify(
    target: Target<'_>,
    name: &str,
    operation: Operation,
) -> Result<Verdict, ClassifyError> {
    check_target(target)?;
    check_name(name)?;
    debug!(subject = target.display_name(), name, op = %operation, "classify");
    let verdict = match operation {
        Operation::Read => classify_read(target, name)?,
        Operation::Write => classify_mutation(target, name, HookSlotKind::OverrideSet, false)?,
        Operation::Delete => classify_mutation(target, name, HookSlotKind::OverrideDelete, true)?,
    };
    trace!(%verdict, "classified");
    Ok(verdict)
}

fn check_target(target: Target<'_>) -> Result<(), ClassifyError> {
    let not_participant = |cls: &Class| ClassifyError::InvalidTarget {
        target: target.display_name().to_owned(),
        reason: format!("class `{}` has no consistent linearization", cls.name()),
    };
    match target {
        Target::Class(c) => {
            if !c.is_linearizable() {
                return Err(not_participant(c));
            }
            if let Some(m) = c.metakind() {
                if !m.is_linearizable() {
                    return Err(not_participant(m));
                }
            }
        }
        Target::Instance(i) => {
            if !i.class().is_linearizable() {
                return Err(not_participant(i.class()));
            }
        }
    }
    Ok(())
}

fn check_name(name: &str) -> Result<(), ClassifyError> {
    let mut chars = name.chars();
    let valid = match chars.next() {
        Some(c) if c.is_ascii_alphabetic() || c == '_' => {
            chars.all(|c| c.is_ascii_alphanumeric() || c == '_')
        }
        _ => false,
    };
    if valid {
        Ok(())
    } else {
        Err(ClassifyError::InvalidName(name.to_owned()))
    }
}

/// A probe collapsed to the two outcomes the algorithm branches on; a hook
/// failure has already been converted to an error.
enum Probe {
    Resolved,
    Missing,
}

/// Invoke a value's get hook to learn whether a real read would succeed.
/// A value without a get hook cannot veto anything.
fn probe_get(
    value: &Stored,
    found_at: &Class,
    ctx: HookCtx<'_>,
    name: &str,
) -> Result<Probe, ClassifyError> {
    let Some(hook) = value.get_hook() else {
        return Ok(Probe::Resolved);
    };
    match hook(ctx) {
        HookOutcome::Resolved => Ok(Probe::Resolved),
        HookOutcome::Missing => Ok(Probe::Missing),
        HookOutcome::Fail(cause) => Err(ClassifyError::HookInvocation {
            owner: found_at.name().to_owned(),
            hook: "get".to_owned(),
            name: name.to_owned(),
            cause,
        }),
    }
}

fn run_override(
    slot: &HookSlot,
    owner: &Class,
    target: Target<'_>,
    name: &str,
) -> Result<Probe, ClassifyError> {
    match slot.run(OverrideCtx { target, name }) {
        HookOutcome::Resolved => Ok(Probe::Resolved),
        HookOutcome::Missing => Ok(Probe::Missing),
        HookOutcome::Fail(cause) => Err(ClassifyError::HookInvocation {
            owner: owner.name().to_owned(),
            hook: HookSlotKind::OverrideGet.to_string(),
            name: name.to_owned(),
            cause,
        }),
    }
}

/// First definition of `name` along a class's linearization.
fn find_field<'a>(cls: &'a Class, name: &str) -> Option<(&'a Class, &'a Stored)> {
    cls.linearization()
        .find_map(|c| c.field(name).map(|v| (c, v)))
}

/// First class along the linearization carrying the given hook slot.
fn find_slot<'a>(kind: &'a Class, slot: HookSlotKind) -> Option<(&'a Class, &'a HookSlot)> {
    kind.linearization()
        .find_map(|c| c.hook_slot(slot).map(|s| (c, s)))
}

fn class_storage(owner: &Class) -> Location {
    Location::ClassStorage(owner.name().to_owned())
}

fn own_storage(target: Target<'_>) -> Location {
    match target {
        Target::Class(c) => Location::ClassStorage(c.name().to_owned()),
        Target::Instance(i) => Location::InstanceStorage(i.display_name().to_owned()),
    }
}

fn hook_location(owner: &Class, slot: HookSlotKind) -> Location {
    Location::Hook(owner.name().to_owned(), slot)
}

/// Read resolution. Classes and instances share the shape: the kind's chain
/// is consulted around the target's own storage, with the single asymmetry
/// that an instance's own storage is a direct membership test while a class
/// walks its own linearization.
fn classify_read(target: Target<'_>, name: &str) -> Result<Verdict, ClassifyError> {
    let kind = target.kind();

    // A user-defined override-get replaces resolution outright. Only the
    // first slot along the chain counts; a system-provided slot found first
    // shadows anything deeper.
    if let Some(kind) = kind {
        if let Some((owner, slot)) = find_slot(kind, HookSlotKind::OverrideGet) {
            if slot.is_user_defined() {
                trace!(owner = owner.name(), "override-get engaged");
                return match run_override(slot, owner, target, name)? {
                    Probe::Resolved => Ok(Verdict::new(
                        Classification::Plain,
                        hook_location(owner, HookSlotKind::OverrideGet),
                    )),
                    Probe::Missing => Ok(read_fallback(Some(kind))),
                };
            }
        }
    }

    // First definition of `name` along the kind's chain.
    let kind_hit = kind.and_then(|k| find_field(k, name).map(|(owner, v)| (k, owner, v)));

    // A read-write accessor on the kind dominates the target's own storage.
    if let Some((kind, owner, value)) = kind_hit {
        if value.is_read_write_accessor() {
            let ctx = HookCtx {
                receiver: Some(target),
                through: kind,
            };
            return match probe_get(value, owner, ctx, name)? {
                Probe::Resolved => Ok(Verdict::new(
                    Classification::ReadWriteAccessor,
                    class_storage(owner),
                )),
                Probe::Missing => Ok(read_fallback(Some(kind))),
            };
        }
    }

    // The target's own storage.
    match target {
        Target::Instance(instance) => {
            // Own storage wins over a read-only accessor here; it already
            // lost to a read-write accessor above. This is the deliberate
            // asymmetry between instances and classes.
            if instance.own(name).is_some() {
                return Ok(Verdict::new(
                    Classification::Plain,
                    Location::InstanceStorage(instance.display_name().to_owned()),
                ));
            }
        }
        Target::Class(cls) => {
            // A class consults its own linearization, not just its own map.
            if let Some((owner, value)) = find_field(cls, name) {
                if value.has_get_hook() {
                    let ctx = HookCtx {
                        receiver: None,
                        through: cls,
                    };
                    return match probe_get(value, owner, ctx, name)? {
                        Probe::Resolved => {
                            Ok(Verdict::new(value.classification(), class_storage(owner)))
                        }
                        Probe::Missing => Ok(read_fallback(kind)),
                    };
                }
                // Plain, or write-only: reads treat both as plain.
                return Ok(Verdict::new(Classification::Plain, class_storage(owner)));
            }
        }
    }

    // Fall back to the kind-chain hit: a read-only accessor fires its get
    // hook, anything else reads as plain.
    if let Some((kind, owner, value)) = kind_hit {
        if value.is_read_only_accessor() {
            let ctx = HookCtx {
                receiver: Some(target),
                through: kind,
            };
            return match probe_get(value, owner, ctx, name)? {
                Probe::Resolved => Ok(Verdict::new(
                    Classification::ReadOnlyAccessor,
                    class_storage(owner),
                )),
                Probe::Missing => Ok(read_fallback(Some(kind))),
            };
        }
        return Ok(Verdict::new(Classification::Plain, class_storage(owner)));
    }

    Ok(read_fallback(kind))
}

/// Terminal step of every read: a fallback-get hook on the kind still
/// answers, otherwise the attribute is nowhere.
fn read_fallback(kind: Option<&Class>) -> Verdict {
    if let Some(kind) = kind {
        if let Some((owner, _)) = find_slot(kind, HookSlotKind::FallbackGet) {
            return Verdict::new(
                Classification::Plain,
                hook_location(owner, HookSlotKind::FallbackGet),
            );
        }
    }
    Verdict::new(Classification::Plain, Location::NotFound)
}

/// Write and delete resolution. A class target plays the instance role with
/// its metakind as the kind, so one algorithm serves both.
fn classify_mutation(
    target: Target<'_>,
    name: &str,
    override_slot: HookSlotKind,
    removes: bool,
) -> Result<Verdict, ClassifyError> {
    if let Some(kind) = target.kind() {
        // A user-defined override hook intercepts the whole operation; it
        // is reported, never invoked.
        if let Some((owner, slot)) = find_slot(kind, override_slot) {
            if slot.is_user_defined() {
                return Ok(Verdict::new(
                    Classification::Plain,
                    hook_location(owner, override_slot),
                ));
            }
        }

        // Only the first definition along the chain matters: an accessor
        // with set or delete capability captures the operation, anything
        // else leaves it to the target's own storage.
        if let Some((owner, value)) = find_field(kind, name) {
            if value.has_set_or_delete_hook() {
                return Ok(Verdict::new(value.classification(), class_storage(owner)));
            }
        }
    }

    if removes && !target.own_contains(name) {
        // Nothing to remove.
        return Ok(Verdict::new(Classification::Plain, Location::NotFound));
    }
    Ok(Verdict::new(Classification::Plain, own_storage(target)))
}
