//! Status enums mapping to SMALLINT lookup tables.
//!
//! Each enum variant's discriminant matches the seed data order (1-based)
//! in the corresponding `*_statuses` database table. The lifecycle rules in
//! [`crate::lifecycle`] are written against these enums; the `db` crate
//! stores the raw ids.

use std::fmt;

/// Status ID type matching SMALLINT/SMALLSERIAL in the database.
pub type StatusId = i16;

macro_rules! define_status_enum {
    (
        $(#[$meta:meta])*
        $name:ident {
            $( $(#[$vmeta:meta])* $variant:ident = $val:expr => $label:expr ),+ $(,)?
        }
    ) => {
        $(#[$meta])*
        #[repr(i16)]
        #[derive(Debug, Clone, Copy, PartialEq, Eq)]
        pub enum $name {
            $( $(#[$vmeta])* $variant = $val ),+
        }

        impl $name {
            /// Return the database status ID.
            pub fn id(self) -> StatusId {
                self as StatusId
            }

            /// Look up a variant from its database status ID.
            pub fn from_id(id: StatusId) -> Option<Self> {
                $(
                    if id == $val {
                        return Some(Self::$variant);
                    }
                )+
                None
            }

            /// Human-facing lowercase label, matching the lookup-table `name` column.
            pub fn as_str(self) -> &'static str {
                match self {
                    $( Self::$variant => $label, )+
                }
            }
        }

        impl From<$name> for StatusId {
            fn from(value: $name) -> Self {
                value as StatusId
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(self.as_str())
            }
        }
    };
}

define_status_enum! {
    /// Room availability status.
    ///
    /// `Available`, `Occupied`, and `Requested` are derived exclusively from
    /// the request ledger; `Maintenance` is the administrative override.
    RoomStatus {
        Available = 1 => "available",
        Occupied = 2 => "occupied",
        Requested = 3 => "requested",
        Maintenance = 4 => "maintenance",
    }
}

define_status_enum! {
    /// Key request lifecycle status.
    RequestStatus {
        Pending = 1 => "pending",
        Approved = 2 => "approved",
        Rejected = 3 => "rejected",
        Returned = 4 => "returned",
    }
}

define_status_enum! {
    /// Return-approval sub-state of a key request.
    ///
    /// `Approved` is terminal and implies the request itself is `Returned`;
    /// `Rejected` allows the holder to signal return intent again.
    ReturnStatus {
        None = 1 => "none",
        PendingApproval = 2 => "pending_approval",
        Approved = 3 => "approved",
        Rejected = 4 => "rejected",
    }
}

impl RequestStatus {
    /// A request counts against the holder's single active key while it is
    /// pending or approved.
    pub fn is_active(self) -> bool {
        matches!(self, RequestStatus::Pending | RequestStatus::Approved)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn room_status_ids_match_seed_data() {
        assert_eq!(RoomStatus::Available.id(), 1);
        assert_eq!(RoomStatus::Occupied.id(), 2);
        assert_eq!(RoomStatus::Requested.id(), 3);
        assert_eq!(RoomStatus::Maintenance.id(), 4);
    }

    #[test]
    fn request_status_ids_match_seed_data() {
        assert_eq!(RequestStatus::Pending.id(), 1);
        assert_eq!(RequestStatus::Approved.id(), 2);
        assert_eq!(RequestStatus::Rejected.id(), 3);
        assert_eq!(RequestStatus::Returned.id(), 4);
    }

    #[test]
    fn return_status_ids_match_seed_data() {
        assert_eq!(ReturnStatus::None.id(), 1);
        assert_eq!(ReturnStatus::PendingApproval.id(), 2);
        assert_eq!(ReturnStatus::Approved.id(), 3);
        assert_eq!(ReturnStatus::Rejected.id(), 4);
    }

    #[test]
    fn from_id_round_trips() {
        for status in [
            RequestStatus::Pending,
            RequestStatus::Approved,
            RequestStatus::Rejected,
            RequestStatus::Returned,
        ] {
            assert_eq!(RequestStatus::from_id(status.id()), Some(status));
        }
        assert_eq!(RequestStatus::from_id(0), None);
        assert_eq!(RequestStatus::from_id(99), None);
    }

    #[test]
    fn status_into_status_id() {
        let id: StatusId = RoomStatus::Maintenance.into();
        assert_eq!(id, 4);
    }

    #[test]
    fn labels_are_lowercase_snake_case() {
        assert_eq!(RoomStatus::Available.as_str(), "available");
        assert_eq!(ReturnStatus::PendingApproval.as_str(), "pending_approval");
        assert_eq!(format!("{}", RequestStatus::Returned), "returned");
    }

    #[test]
    fn only_pending_and_approved_are_active() {
        assert!(RequestStatus::Pending.is_active());
        assert!(RequestStatus::Approved.is_active());
        assert!(!RequestStatus::Rejected.is_active());
        assert!(!RequestStatus::Returned.is_active());
    }
}
