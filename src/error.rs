/*
 * Copyright (c) Meta Platforms, Inc. and affiliates.
 *
 * This source code is licensed under the MIT license found in the
 * LICENSE file in the root directory of this source tree.
 */

//! Error taxonomy of the classifier.
//!
//! The three precondition errors surface before any hook runs; a hook
//! failure aborts mid-algorithm with its cause attached. A hook signaling
//! "missing" is not an error: the engine consumes it as fall-through and it
//! never reaches the caller.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum ClassifyError {
    /// The target does not participate in the modeled object system.
    #[error("invalid target `{target}`: {reason}")]
    InvalidTarget { target: String, reason: String },

    /// The attribute name is not a valid identifier.
    #[error("invalid attribute name `{0}`")]
    InvalidName(String),

    /// The operation is not one of read, write, delete.
    #[error("invalid operation `{0}` (expected read, write or delete)")]
    InvalidOperation(String),

    /// A probed hook failed with something other than a missing attribute.
    #[error("hook `{hook}` on `{owner}` failed while probing `{name}`")]
    HookInvocation {
        owner: String,
        hook: String,
        name: String,
        #[source]
        cause: anyhow::Error,
    },
}
