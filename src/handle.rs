//! Stable handles into the world's body and joint stores.
//!
//! Contacts and joints hold body handles (index + generation counter)
//! instead of owning back-pointers. `slotmap` provides the generational-index
//! guarantee, so a handle outliving its body resolves to "not found"
//! instead of dangling.

use slotmap::new_key_type;

new_key_type! {
    /// Handle to a [`crate::body::Body`] owned by a [`crate::world::World`].
    pub struct BodyHandle;

    /// Handle to a joint owned by a [`crate::world::World`].
    pub struct JointHandle;
}

/// Identifies one fixture within a body's fixture list.
///
/// Fixtures don't outlive their body and are never removed individually in
/// the core API (a body's fixture list is fixed after construction), so a
/// plain index is sufficient here, unlike bodies and joints, which the
/// world creates and destroys independently and so need generational
/// handles.
pub type FixtureIndex = usize;

/// A fixture, addressed by the body that owns it and its index within that
/// body's fixture list.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct FixtureHandle {
    /// Owning body.
    pub body: BodyHandle,
    /// Index into [`crate::body::Body::fixtures`].
    pub fixture: FixtureIndex,
}

impl FixtureHandle {
    /// Construct a handle from a body handle and fixture index.
    pub fn new(body: BodyHandle, fixture: FixtureIndex) -> Self {
        Self { body, fixture }
    }
}
