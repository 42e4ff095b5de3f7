// Copyright 2026 the Unveil Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Dirty-tracking channel constants.
//!
//! Every style mutation made through the
//! [`ElementStore`](crate::element::ElementStore) marks one or more channels
//! in an [`understory_dirty`] tracker. Elements have no parent/child
//! relationship, so every channel is local-only: marking an element never
//! marks anything else.
//!
//! [`ElementStore::take_changes`](crate::element::ElementStore::take_changes)
//! drains all channels and surfaces the result as
//! [`StyleChanges`](crate::element::StyleChanges) for presenters.

use understory_dirty::Channel;

/// Opacity changed.
pub const OPACITY: Channel = Channel::new(0);

/// Offset or scale changed.
pub const TRANSFORM: Channel = Channel::new(1);

/// Transition timing changed.
pub const TRANSITION: Channel = Channel::new(2);

/// A flourish animation was attached.
pub const FLOURISH: Channel = Channel::new(3);
