// Copyright 2026 the Unveil Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Registered element data model.
//!
//! Each registered element has:
//!
//! - An identity ([`ElementId`]), a generational handle that goes stale once
//!   the element leaves the document.
//! - A [`Category`] fixed at registration ([`Plain`](Category::Plain) or
//!   [`Emphasized`](Category::Emphasized)).
//! - An enumeration index: its registration position, fixed for its
//!   lifetime and used to order staggered reveals.
//! - A [`Phase`] in the reveal lifecycle.
//! - A [`VisualState`](crate::visual::VisualState) and optional
//!   [`Flourish`](crate::visual::Flourish), mutated only through
//!   [`ElementStore::set_visual`] and [`ElementStore::set_flourish`].
//!
//! Style mutations mark [`dirty`](crate::dirty) channels which
//! [`ElementStore::take_changes`] turns into [`StyleChanges`].

mod changes;
mod id;
mod store;

pub use changes::StyleChanges;
pub use id::ElementId;
pub use store::{Category, ElementStore, Phase};
