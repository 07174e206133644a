//! Serde roundtrip tests for the types that cross crate and process
//! boundaries (session projection, CLI JSON output).

use chrono::{TimeZone, Utc};
use pretty_assertions::assert_eq;
use qc_core::{Action, Page, Role, UserIdentity, UserStatus};

macro_rules! roundtrip {
    ($name:ident, $ty:ty, $instance:expr) => {
        #[test]
        fn $name() {
            let val: $ty = $instance;
            let json_str = serde_json::to_string_pretty(&val).unwrap();
            let recovered: $ty = serde_json::from_str(&json_str).unwrap();
            assert_eq!(recovered, val, "serde roundtrip failed for {}", stringify!($ty));
        }
    };
}

roundtrip!(
    full_identity_roundtrip,
    UserIdentity,
    UserIdentity {
        id: "1017".into(),
        first_name: Some("Lin".into()),
        last_name: Some("Okafor".into()),
        username: Some("lin".into()),
        email: Some("lin@example.com".into()),
        role: Role::Moderator,
        status: UserStatus::Blocked,
        is_creator: true,
        created_at: Some(Utc.with_ymd_and_hms(2024, 1, 5, 8, 30, 0).unwrap()),
        updated_at: None,
    }
);

roundtrip!(
    minimal_identity_roundtrip,
    UserIdentity,
    UserIdentity::new("7", Role::Finance)
);

roundtrip!(page_roundtrip, Page, Page::Statistics);
roundtrip!(action_roundtrip, Action, Action::ChangeCreatorVerification);

#[test]
fn identity_serializes_id_as_string() {
    let value = serde_json::to_value(UserIdentity::new("7", Role::Admin)).unwrap();
    assert_eq!(value["id"], "7");
    assert_eq!(value["role"], "admin");
    assert_eq!(value["status"], "active");
}
