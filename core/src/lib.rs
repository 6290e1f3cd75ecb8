// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Core logic for onyx: security-group discovery, operator selection, the
//! rule reconciliation engine, and the ECS/autoscaling operations.
//!
//! Everything here is written against the provider traits in [`provider`],
//! so the whole crate is exercised in tests with in-memory fakes.  The
//! `onyx-aws` crate supplies the real implementations.

pub mod discovery;
pub mod display;
pub mod ecs;
pub mod provider;
pub mod reconcile;
pub mod sandstorm;
pub mod selection;

#[cfg(test)]
pub(crate) mod fakes;
