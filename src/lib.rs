/*
 * Copyright (c) Meta Platforms, Inc. and affiliates.
 *
 * This source code is licensed under the MIT license found in the
 * LICENSE file in the root directory of this source tree.
 */

#![warn(clippy::all)]
#![allow(clippy::match_like_matches_macro)]
#![allow(clippy::needless_lifetimes)]
#![allow(clippy::new_without_default)]
#![deny(clippy::cloned_instead_of_copied)]
#![deny(clippy::derive_partial_eq_without_eq)]
#![deny(clippy::inefficient_to_string)]
#![deny(clippy::str_to_string)]
#![deny(clippy::string_to_string)]

//! Predicts how a named-attribute access on a class or an instance would
//! resolve, without performing it.
//!
//! The modeled object system supports multiple inheritance with a C3-style
//! linearized ancestor order, per-instance storage distinct from per-class
//! storage, accessor values that intercept reads/writes/deletes through
//! hooks, and whole-operation override hooks. Given a target, an attribute
//! name and an operation, [`classify::classify`] reports what the access
//! would be treated as and where the effective definition lives.

pub mod accessor;
pub mod class;
pub mod classify;
pub mod error;
pub mod mro;
