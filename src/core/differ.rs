use crate::domain::change::{FieldChange, FieldChanges};
use crate::domain::model::{ExternalRecord, InternalRecord};

pub const FIRST_NAME: &str = "firstName";
pub const LAST_NAME: &str = "lastName";
pub const EMAIL: &str = "email";
pub const MEMBER_ID: &str = "memberId";
pub const ACTIVE: &str = "active";

/// Fields proposed for a record that does not exist yet. Names are always
/// listed; email only when non-blank and member id only when present.
pub fn diff_new(external: &ExternalRecord) -> FieldChanges {
    let mut changes = FieldChanges::new();
    changes.insert(FieldChange::new(FIRST_NAME, None, Some(external.first_name.clone())));
    changes.insert(FieldChange::new(LAST_NAME, None, Some(external.last_name.clone())));

    if let Some(email) = external.email.as_deref().filter(|e| !e.trim().is_empty()) {
        changes.insert(FieldChange::new(EMAIL, None, Some(email.to_string())));
    }
    if let Some(member_id) = external.member_id {
        changes.insert(FieldChange::new(MEMBER_ID, None, Some(member_id.to_string())));
    }

    changes
}

/// Fields that differ between a stored record and its matched row. Comparison
/// is exact: a blank email is not the same as a missing one.
pub fn diff_update(existing: &InternalRecord, external: &ExternalRecord) -> FieldChanges {
    let mut changes = FieldChanges::new();

    push_if_changed(
        &mut changes,
        FIRST_NAME,
        Some(existing.first_name.clone()),
        Some(external.first_name.clone()),
    );
    push_if_changed(
        &mut changes,
        LAST_NAME,
        Some(existing.last_name.clone()),
        Some(external.last_name.clone()),
    );
    push_if_changed(&mut changes, EMAIL, existing.email.clone(), external.email.clone());
    push_if_changed(
        &mut changes,
        MEMBER_ID,
        existing.member_id.map(|id| id.to_string()),
        external.member_id.map(|id| id.to_string()),
    );

    changes
}

pub fn diff_deactivate() -> FieldChanges {
    let mut changes = FieldChanges::new();
    changes.insert(FieldChange::new(
        ACTIVE,
        Some(true.to_string()),
        Some(false.to_string()),
    ));
    changes
}

fn push_if_changed(
    changes: &mut FieldChanges,
    field: &str,
    old_value: Option<String>,
    new_value: Option<String>,
) {
    if old_value != new_value {
        changes.insert(FieldChange::new(field, old_value, new_value));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::model::RecordId;

    fn stored(member_id: Option<i64>, email: Option<&str>) -> InternalRecord {
        InternalRecord {
            id: RecordId(1),
            member_id,
            first_name: "John".to_string(),
            last_name: "Doe".to_string(),
            email: email.map(str::to_string),
            active: true,
        }
    }

    #[test]
    fn test_diff_new_full_record() {
        let changes = diff_new(&ExternalRecord::new(Some(123), "John", "Doe", Some("j@x.com")));

        assert_eq!(
            changes.fields().collect::<Vec<_>>(),
            vec![FIRST_NAME, LAST_NAME, EMAIL, MEMBER_ID]
        );
        assert!(changes.iter().all(|c| c.old_value.is_none()));
        assert_eq!(changes.get(MEMBER_ID).unwrap().new_value.as_deref(), Some("123"));
    }

    #[test]
    fn test_diff_new_omits_blank_email_and_missing_id() {
        let changes = diff_new(&ExternalRecord::new(None, "John", "Doe", Some("   ")));
        assert_eq!(changes.fields().collect::<Vec<_>>(), vec![FIRST_NAME, LAST_NAME]);

        let changes = diff_new(&ExternalRecord::new(None, "John", "Doe", None));
        assert_eq!(changes.len(), 2);
    }

    #[test]
    fn test_diff_update_only_email() {
        let changes = diff_update(
            &stored(Some(123), Some("old@x.com")),
            &ExternalRecord::new(Some(123), "John", "Doe", Some("new@x.com")),
        );

        assert_eq!(changes.len(), 1);
        let email = changes.get(EMAIL).unwrap();
        assert_eq!(email.old_value.as_deref(), Some("old@x.com"));
        assert_eq!(email.new_value.as_deref(), Some("new@x.com"));
    }

    #[test]
    fn test_diff_update_identical_is_empty() {
        let changes = diff_update(
            &stored(Some(123), Some("j@x.com")),
            &ExternalRecord::new(Some(123), "John", "Doe", Some("j@x.com")),
        );
        assert!(changes.is_empty());
    }

    #[test]
    fn test_diff_update_blank_differs_from_absent() {
        let changes = diff_update(
            &stored(None, None),
            &ExternalRecord::new(None, "John", "Doe", Some("")),
        );

        let email = changes.get(EMAIL).unwrap();
        assert_eq!(email.old_value, None);
        assert_eq!(email.new_value.as_deref(), Some(""));
    }

    #[test]
    fn test_diff_update_member_id_sides() {
        let gained = diff_update(&stored(None, None), &ExternalRecord::new(Some(7), "John", "Doe", None));
        let member_id = gained.get(MEMBER_ID).unwrap();
        assert_eq!(member_id.old_value, None);
        assert_eq!(member_id.new_value.as_deref(), Some("7"));

        let lost = diff_update(&stored(Some(7), None), &ExternalRecord::new(None, "John", "Doe", None));
        let member_id = lost.get(MEMBER_ID).unwrap();
        assert_eq!(member_id.old_value.as_deref(), Some("7"));
        assert_eq!(member_id.new_value, None);
    }

    #[test]
    fn test_diff_update_field_order() {
        let changes = diff_update(
            &stored(Some(1), Some("a@x.com")),
            &ExternalRecord::new(Some(2), "Jon", "Dough", Some("b@x.com")),
        );
        assert_eq!(
            changes.fields().collect::<Vec<_>>(),
            vec![FIRST_NAME, LAST_NAME, EMAIL, MEMBER_ID]
        );
    }

    #[test]
    fn test_diff_deactivate_is_fixed() {
        let changes = diff_deactivate();
        assert_eq!(changes.len(), 1);
        let active = changes.get(ACTIVE).unwrap();
        assert_eq!(active.old_value.as_deref(), Some("true"));
        assert_eq!(active.new_value.as_deref(), Some("false"));
    }
}
