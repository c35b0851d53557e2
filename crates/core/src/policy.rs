//! Ownership and visibility policy shared by boards and posts.
//!
//! Pure decision functions: no I/O, no side effects. A resource is readable
//! when it is public or owned by the requester; it is mutable only by its
//! owner, regardless of visibility. Posts are read through their parent
//! board's visibility but mutated by the post's own owner.

use crate::error::CoreError;
use crate::types::DbId;

/// A resource with a single owning user.
pub trait Owned {
    fn owner_id(&self) -> DbId;
}

/// A resource that can additionally be flagged public.
pub trait Visible: Owned {
    fn is_public(&self) -> bool;
}

/// `public OR owner_id == requester`.
pub fn can_access<R: Visible + ?Sized>(resource: &R, requester_id: DbId) -> bool {
    resource.is_public() || resource.owner_id() == requester_id
}

/// `owner_id == requester`. There is no public-mutate exception.
pub fn can_mutate<R: Owned + ?Sized>(resource: &R, requester_id: DbId) -> bool {
    resource.owner_id() == requester_id
}

/// [`can_access`] as a `Result`, for use with `?` in handlers.
pub fn ensure_access<R: Visible + ?Sized>(
    resource: &R,
    requester_id: DbId,
    entity: &'static str,
) -> Result<(), CoreError> {
    if can_access(resource, requester_id) {
        Ok(())
    } else {
        Err(CoreError::Forbidden(format!(
            "You do not have access to this {entity}"
        )))
    }
}

/// [`can_mutate`] as a `Result`, for use with `?` in handlers.
pub fn ensure_mutate<R: Owned + ?Sized>(
    resource: &R,
    requester_id: DbId,
    entity: &'static str,
) -> Result<(), CoreError> {
    if can_mutate(resource, requester_id) {
        Ok(())
    } else {
        Err(CoreError::Forbidden(format!(
            "Only the owner can modify this {entity}"
        )))
    }
}
