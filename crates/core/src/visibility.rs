//! Contact-data visibility policy.
//!
//! Personal contact fields on a request (the holder's phone number) are
//! visible only to administrators and to the holder themselves. Every read
//! path that can reach another member must project requests through this
//! policy; it is the only access-control guarantee for contact data, not a
//! formatting nicety.

use crate::roles::ROLE_ADMIN;
use crate::types::DbId;

/// Fixed marker substituted for redacted contact fields.
pub const REDACTED_CONTACT: &str = "[redacted]";

/// Whether `viewer` may see the holder's contact fields on a request.
pub fn can_view_contact(viewer_id: DbId, viewer_role: &str, holder_id: DbId) -> bool {
    viewer_role == ROLE_ADMIN || viewer_id == holder_id
}

/// Project a contact field for the given viewer: the real value for the
/// holder and administrators, the redaction marker for everyone else.
pub fn project_contact(
    contact: &str,
    viewer_id: DbId,
    viewer_role: &str,
    holder_id: DbId,
) -> String {
    if can_view_contact(viewer_id, viewer_role, holder_id) {
        contact.to_string()
    } else {
        REDACTED_CONTACT.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::roles::{ROLE_ADMIN, ROLE_MEMBER};

    #[test]
    fn admin_sees_contact() {
        assert!(can_view_contact(99, ROLE_ADMIN, 7));
        assert_eq!(project_contact("+255700000000", 99, ROLE_ADMIN, 7), "+255700000000");
    }

    #[test]
    fn holder_sees_own_contact() {
        assert!(can_view_contact(7, ROLE_MEMBER, 7));
        assert_eq!(project_contact("+255700000000", 7, ROLE_MEMBER, 7), "+255700000000");
    }

    #[test]
    fn other_members_see_the_marker() {
        assert!(!can_view_contact(8, ROLE_MEMBER, 7));
        let projected = project_contact("+255700000000", 8, ROLE_MEMBER, 7);
        assert_eq!(projected, REDACTED_CONTACT);
        assert!(!projected.contains("255700000000"));
    }

    #[test]
    fn unknown_role_is_treated_as_non_admin() {
        assert!(!can_view_contact(8, "guest", 7));
    }
}
