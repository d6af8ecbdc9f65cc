use persondb_core::{Person, PersonValidationError};
use serde_json::json;

#[test]
fn person_new_is_unsaved_without_address() {
    let person = Person::new("john", "john@example.com");

    assert_eq!(person.id, 0);
    assert!(!person.is_persisted());
    assert_eq!(person.address, None);
    assert!(person.with_id(3).is_persisted());
}

#[test]
fn validate_requires_name_and_email() {
    assert_eq!(Person::new("john", "john@example.com").validate(), Ok(()));
    assert_eq!(
        Person::new(" ", "john@example.com").validate(),
        Err(PersonValidationError::EmptyName)
    );
    assert_eq!(
        Person::new("john", "").validate(),
        Err(PersonValidationError::EmptyEmail)
    );
}

#[test]
fn validate_does_not_check_email_format() {
    assert!(Person::new("john", "not-an-email").validate().is_ok());
}

#[test]
fn serialization_uses_row_field_names() {
    let person = Person::new("john", "john@example.com")
        .with_id(7)
        .with_address("add 1");

    let value = serde_json::to_value(&person).unwrap();
    assert_eq!(
        value,
        json!({
            "Id": 7,
            "Name": "john",
            "Email": "john@example.com",
            "Address": "add 1",
        })
    );
}

#[test]
fn deserialization_defaults_id_and_address() {
    let person: Person =
        serde_json::from_value(json!({ "Name": "john", "Email": "john@example.com" })).unwrap();

    assert_eq!(person, Person::new("john", "john@example.com"));
}
