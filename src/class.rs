/*
 * Copyright (c) Meta Platforms, Inc. and affiliates.
 *
 * This source code is licensed under the MIT license found in the
 * LICENSE file in the root directory of this source tree.
 */

//! The modeled object graph: classes, instances and hook slots.
//!
//! All entities are read-only inputs to a classification call. A `Class` is
//! cheap to clone and immutable after construction; its linearization is
//! computed once at build time and stored with it.

use std::fmt;
use std::fmt::Debug;
use std::hash::Hash;
use std::hash::Hasher;
use std::iter;
use std::sync::Arc;

use dupe::Dupe;
use parse_display::Display;
use starlark_map::small_map::SmallMap;

use crate::accessor::HookOutcome;
use crate::accessor::Stored;
use crate::mro::Mro;

/// Where a hook slot came from. Only user-defined override hooks
/// short-circuit resolution; system-provided defaults are transparent.
#[derive(Debug, Clone, Copy, Dupe, PartialEq, Eq)]
pub enum HookOrigin {
    UserDefined,
    SystemProvided,
}

/// The reserved hook slots a class may carry.
#[derive(Debug, Clone, Copy, Dupe, PartialEq, Eq, Hash, Display)]
pub enum HookSlotKind {
    #[display("override-get")]
    OverrideGet,
    #[display("override-set")]
    OverrideSet,
    #[display("override-delete")]
    OverrideDelete,
    #[display("fallback-get")]
    FallbackGet,
}

/// Context handed to an override-get hook when it is probed.
pub struct OverrideCtx<'a> {
    pub target: Target<'a>,
    pub name: &'a str,
}

pub type OverrideFn = Arc<dyn Fn(OverrideCtx<'_>) -> HookOutcome + Send + Sync>;

/// A whole-operation interceptor installed on a class. Of the four slots
/// only override-get is ever invoked; the others are reported by presence.
#[derive(Clone)]
pub struct HookSlot {
    origin: HookOrigin,
    run: OverrideFn,
}

impl HookSlot {
    pub fn new(
        origin: HookOrigin,
        run: impl Fn(OverrideCtx<'_>) -> HookOutcome + Send + Sync + 'static,
    ) -> Self {
        Self {
            origin,
            run: Arc::new(run),
        }
    }

    /// A user-defined slot whose hook always resolves. Enough for slots that
    /// are only ever reported, never invoked.
    pub fn user_defined() -> Self {
        Self::new(HookOrigin::UserDefined, |_| HookOutcome::Resolved)
    }

    pub fn origin(&self) -> HookOrigin {
        self.origin
    }

    pub fn is_user_defined(&self) -> bool {
        self.origin == HookOrigin::UserDefined
    }

    pub(crate) fn run(&self, ctx: OverrideCtx<'_>) -> HookOutcome {
        (self.run)(ctx)
    }
}

impl Debug for HookSlot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("HookSlot")
            .field("origin", &self.origin)
            .finish_non_exhaustive()
    }
}

/// A named class in the modeled object graph.
#[derive(Clone, Dupe)]
pub struct Class(Arc<ClassInner>);

struct ClassInner {
    name: String,
    fields: SmallMap<String, Stored>,
    bases: Vec<Class>,
    metakind: Option<Class>,
    /// Ancestors in linearized order, excluding the class itself.
    ancestors: Mro,
    override_get: Option<HookSlot>,
    override_set: Option<HookSlot>,
    override_delete: Option<HookSlot>,
    fallback_get: Option<HookSlot>,
}

impl PartialEq for Class {
    fn eq(&self, other: &Self) -> bool {
        // Names are unique within a modeled graph.
        self.0.name == other.0.name
    }
}

impl Eq for Class {}

impl Hash for Class {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.0.name.hash(state)
    }
}

impl fmt::Display for Class {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0.name)
    }
}

impl Debug for Class {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Class")
            .field("name", &self.0.name)
            .field("bases", &self.0.bases.iter().map(Class::name).collect::<Vec<_>>())
            .finish_non_exhaustive()
    }
}

impl Class {
    pub fn builder(name: impl Into<String>) -> ClassBuilder {
        ClassBuilder {
            name: name.into(),
            bases: Vec::new(),
            metakind: None,
            fields: SmallMap::new(),
            override_get: None,
            override_set: None,
            override_delete: None,
            fallback_get: None,
        }
    }

    pub fn name(&self) -> &str {
        &self.0.name
    }

    pub fn bases(&self) -> &[Class] {
        &self.0.bases
    }

    /// The kind of this class, consulted when the class itself is the
    /// lookup target. Absent means a kind that defines nothing.
    pub fn metakind(&self) -> Option<&Class> {
        self.0.metakind.as_ref()
    }

    pub fn ancestors(&self) -> &Mro {
        &self.0.ancestors
    }

    /// The class's own attribute map entry, not consulting ancestors.
    pub fn field(&self, name: &str) -> Option<&Stored> {
        self.0.fields.get(name)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.0.fields.contains_key(name)
    }

    /// This class followed by its ancestors, in resolution order. Empty of
    /// ancestors when the hierarchy is inconsistent; callers reject such
    /// classes as targets before walking.
    pub fn linearization(&self) -> impl Iterator<Item = &Class> {
        iter::once(self).chain(self.0.ancestors.classes())
    }

    pub fn is_linearizable(&self) -> bool {
        self.0.ancestors.is_resolved()
    }

    pub fn hook_slot(&self, kind: HookSlotKind) -> Option<&HookSlot> {
        match kind {
            HookSlotKind::OverrideGet => self.0.override_get.as_ref(),
            HookSlotKind::OverrideSet => self.0.override_set.as_ref(),
            HookSlotKind::OverrideDelete => self.0.override_delete.as_ref(),
            HookSlotKind::FallbackGet => self.0.fallback_get.as_ref(),
        }
    }
}

/// Builder for [`Class`]. The linearization is computed at `build` time from
/// the (already linearized) bases and stored with the class.
pub struct ClassBuilder {
    name: String,
    bases: Vec<Class>,
    metakind: Option<Class>,
    fields: SmallMap<String, Stored>,
    override_get: Option<HookSlot>,
    override_set: Option<HookSlot>,
    override_delete: Option<HookSlot>,
    fallback_get: Option<HookSlot>,
}

impl ClassBuilder {
    pub fn base(mut self, base: &Class) -> Self {
        self.bases.push(base.dupe());
        self
    }

    pub fn metakind(mut self, kind: &Class) -> Self {
        self.metakind = Some(kind.dupe());
        self
    }

    pub fn field(mut self, name: impl Into<String>, value: Stored) -> Self {
        self.fields.insert(name.into(), value);
        self
    }

    pub fn override_get(mut self, slot: HookSlot) -> Self {
        self.override_get = Some(slot);
        self
    }

    pub fn override_set(mut self, slot: HookSlot) -> Self {
        self.override_set = Some(slot);
        self
    }

    pub fn override_delete(mut self, slot: HookSlot) -> Self {
        self.override_delete = Some(slot);
        self
    }

    pub fn fallback_get(mut self, slot: HookSlot) -> Self {
        self.fallback_get = Some(slot);
        self
    }

    pub fn build(self) -> Class {
        let ancestors = Mro::linearize(&self.bases);
        Class(Arc::new(ClassInner {
            name: self.name,
            fields: self.fields,
            bases: self.bases,
            metakind: self.metakind,
            ancestors,
            override_get: self.override_get,
            override_set: self.override_set,
            override_delete: self.override_delete,
            fallback_get: self.fallback_get,
        }))
    }
}

/// An object belonging to exactly one class, with its own attribute map
/// independent of any class's storage.
#[derive(Debug)]
pub struct Instance {
    class: Class,
    name: Option<String>,
    storage: SmallMap<String, Stored>,
}

impl Instance {
    pub fn new(class: &Class) -> Self {
        Self {
            class: class.dupe(),
            name: None,
            storage: SmallMap::new(),
        }
    }

    pub fn named(class: &Class, name: impl Into<String>) -> Self {
        Self {
            class: class.dupe(),
            name: Some(name.into()),
            storage: SmallMap::new(),
        }
    }

    pub fn class(&self) -> &Class {
        &self.class
    }

    /// Store into the instance's own attribute map.
    pub fn store(&mut self, name: impl Into<String>, value: Stored) {
        self.storage.insert(name.into(), value);
    }

    /// The instance's own attribute map entry, never consulting the class.
    pub fn own(&self, name: &str) -> Option<&Stored> {
        self.storage.get(name)
    }

    /// The name used in reported locations; anonymous instances report as
    /// "instance".
    pub fn display_name(&self) -> &str {
        self.name.as_deref().unwrap_or("instance")
    }
}

/// A lookup target: a class object or an instance of one.
#[derive(Debug, Clone, Copy)]
pub enum Target<'a> {
    Class(&'a Class),
    Instance(&'a Instance),
}

impl<'a> Target<'a> {
    /// The kind consulted during resolution: an instance's class, or a
    /// class's metakind. The class-on-class case is what makes the four
    /// algorithms uniform.
    pub fn kind(self) -> Option<&'a Class> {
        match self {
            Target::Class(c) => c.metakind(),
            Target::Instance(i) => Some(i.class()),
        }
    }

    pub fn display_name(self) -> &'a str {
        match self {
            Target::Class(c) => c.name(),
            Target::Instance(i) => i.display_name(),
        }
    }

    /// Membership in the target's own attribute map only.
    pub(crate) fn own_contains(self, name: &str) -> bool {
        match self {
            Target::Class(c) => c.contains(name),
            Target::Instance(i) => i.own(name).is_some(),
        }
    }
}
