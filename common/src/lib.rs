// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Data model and error types shared by all onyx crates.
//!
//! Nothing in this crate talks to the network.  The types here are value
//! snapshots of provider state (`SecurityGroup`, `IngressRule`) plus the
//! small amount of pure logic the reconciler is built on: the rule catalog
//! and the rule-ownership predicate.

pub mod error;
pub mod model;
pub mod rules;

pub use error::Error;
