/*
 * Copyright (c) Meta Platforms, Inc. and affiliates.
 *
 * This source code is licensed under the MIT license found in the
 * LICENSE file in the root directory of this source tree.
 */

//! Capability predicates over stored attribute values.
//!
//! A stored value is either plain or an accessor exposing some subset of
//! {get, set, delete} hooks. Everything the resolution engine needs to know
//! about a value derives from which hooks are present, never from where the
//! value is stored.

use std::fmt;
use std::fmt::Debug;
use std::sync::Arc;

use parse_display::Display;
use serde::Serialize;

use crate::class::Class;
use crate::class::Target;

/// What a hook reported when the engine probed it.
pub enum HookOutcome {
    /// The hook produced a value; the access would succeed.
    Resolved,
    /// The hook signaled that the attribute is missing. This is a normal
    /// negative result: the engine falls through to its next step.
    Missing,
    /// The hook failed for a reason other than a missing attribute.
    /// Fatal; surfaced to the caller unchanged.
    Fail(anyhow::Error),
}

/// Context handed to an accessor hook when the engine probes it.
pub struct HookCtx<'a> {
    /// The object the access goes through. `None` for an unbound probe.
    pub receiver: Option<Target<'a>>,
    /// The class the lookup is resolving through.
    pub through: &'a Class,
}

pub type HookFn = Arc<dyn Fn(HookCtx<'_>) -> HookOutcome + Send + Sync>;

/// A capability-bearing handler that intercepts attribute access. Which of
/// the three hooks are present determines how an access dispatches; the
/// engine only ever invokes the get hook, and only to learn whether a read
/// would succeed.
#[derive(Clone, Default)]
pub struct Accessor {
    get: Option<HookFn>,
    set: Option<HookFn>,
    delete: Option<HookFn>,
}

impl Accessor {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_get(
        mut self,
        f: impl Fn(HookCtx<'_>) -> HookOutcome + Send + Sync + 'static,
    ) -> Self {
        self.get = Some(Arc::new(f));
        self
    }

    pub fn with_set(
        mut self,
        f: impl Fn(HookCtx<'_>) -> HookOutcome + Send + Sync + 'static,
    ) -> Self {
        self.set = Some(Arc::new(f));
        self
    }

    pub fn with_delete(
        mut self,
        f: impl Fn(HookCtx<'_>) -> HookOutcome + Send + Sync + 'static,
    ) -> Self {
        self.delete = Some(Arc::new(f));
        self
    }

    pub fn has_get(&self) -> bool {
        self.get.is_some()
    }

    pub fn has_set(&self) -> bool {
        self.set.is_some()
    }

    pub fn has_delete(&self) -> bool {
        self.delete.is_some()
    }

    pub(crate) fn get_hook(&self) -> Option<&HookFn> {
        self.get.as_ref()
    }
}

impl Debug for Accessor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Accessor")
            .field("get", &self.get.is_some())
            .field("set", &self.set.is_some())
            .field("delete", &self.delete.is_some())
            .finish()
    }
}

/// A value stored in a class or instance attribute map.
#[derive(Clone)]
pub enum Stored {
    /// An ordinary value, returned or replaced directly. Carries a printable
    /// representation for diagnostics.
    Plain(String),
    /// An accessor whose hooks intercept access.
    Accessor(Accessor),
}

impl Stored {
    pub fn plain(repr: impl Into<String>) -> Self {
        Stored::Plain(repr.into())
    }

    /// True iff the value exposes a get hook.
    pub fn has_get_hook(&self) -> bool {
        match self {
            Stored::Plain(_) => false,
            Stored::Accessor(a) => a.has_get(),
        }
    }

    /// True iff the value exposes a set hook or a delete hook; either counts.
    pub fn has_set_or_delete_hook(&self) -> bool {
        match self {
            Stored::Plain(_) => false,
            Stored::Accessor(a) => a.has_set() || a.has_delete(),
        }
    }

    /// A get hook but no set or delete hook (a non-data accessor).
    pub fn is_read_only_accessor(&self) -> bool {
        self.has_get_hook() && !self.has_set_or_delete_hook()
    }

    /// Both a get hook and a set or delete hook (a data accessor).
    pub fn is_read_write_accessor(&self) -> bool {
        self.has_get_hook() && self.has_set_or_delete_hook()
    }

    /// Four-way classification, derived purely from hook presence.
    pub fn classification(&self) -> Classification {
        match (self.has_get_hook(), self.has_set_or_delete_hook()) {
            (false, false) => Classification::Plain,
            (true, false) => Classification::ReadOnlyAccessor,
            (false, true) => Classification::WriteOnlyAccessor,
            (true, true) => Classification::ReadWriteAccessor,
        }
    }

    pub(crate) fn get_hook(&self) -> Option<&HookFn> {
        match self {
            Stored::Plain(_) => None,
            Stored::Accessor(a) => a.get_hook(),
        }
    }
}

impl Debug for Stored {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Stored::Plain(repr) => f.debug_tuple("Plain").field(repr).finish(),
            Stored::Accessor(a) => Debug::fmt(a, f),
        }
    }
}

/// How an access to a value would be treated, derived from its hooks.
///
/// Reads never report `WriteOnlyAccessor`: a value without a get hook is
/// treated as plain on the read path. Writes and deletes report the
/// accessor's full capability when it captures the operation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display, Serialize)]
pub enum Classification {
    #[display("plain")]
    #[serde(rename = "plain")]
    Plain,
    #[display("read-only accessor")]
    #[serde(rename = "read-only accessor")]
    ReadOnlyAccessor,
    #[display("write-only accessor")]
    #[serde(rename = "write-only accessor")]
    WriteOnlyAccessor,
    #[display("read-write accessor")]
    #[serde(rename = "read-write accessor")]
    ReadWriteAccessor,
}
