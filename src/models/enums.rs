use crate::db::DatabaseError;
use serde::{Deserialize, Serialize};

/// Macro to generate enum with as_str + std::str::FromStr pattern.
/// The string form is what goes into the database and over the wire.
macro_rules! str_enum {
    ($name:ident { $($variant:ident => $s:literal),+ $(,)? }) => {
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
        pub enum $name {
            $(#[serde(rename = $s)] $variant),+
        }

        impl $name {
            pub fn as_str(&self) -> &'static str {
                match self {
                    $(Self::$variant => $s),+
                }
            }
        }

        impl std::str::FromStr for $name {
            type Err = DatabaseError;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                match s {
                    $($s => Ok(Self::$variant)),+,
                    _ => Err(DatabaseError::InvalidEnum {
                        field: stringify!($name).into(),
                        value: s.into(),
                    }),
                }
            }
        }
    };
}

str_enum!(Role {
    Patient => "PATIENT",
    Doctor => "DOCTOR",
    Asha => "ASHA",
    Pharmacist => "PHARMACIST",
    Admin => "ADMIN",
});

str_enum!(AppointmentStatus {
    Pending => "PENDING",
    Approved => "APPROVED",
    Completed => "COMPLETED",
    Cancelled => "CANCELLED",
});

str_enum!(PrescriptionStatus {
    Pending => "PENDING",
    Dispensed => "DISPENSED",
});

str_enum!(ReorderStatus {
    Pending => "PENDING",
    Ordered => "ORDERED",
    Received => "RECEIVED",
});

str_enum!(FollowUpStatus {
    Pending => "PENDING",
    Completed => "COMPLETED",
    Cancelled => "CANCELLED",
});

str_enum!(Severity {
    Minor => "MINOR",
    Severe => "SEVERE",
});

str_enum!(Urgency {
    Low => "LOW",
    Medium => "MEDIUM",
    High => "HIGH",
});
