//! Snapshot export/import round trip. Runs in its own process because the
//! import replaces the entire store.

#![cfg(feature = "serde")]

use reg_store::{AccessRights, Registry, ValueType};

#[test]
fn test_snapshot_restores_keys_and_values() {
    let key = Registry::local_machine()
        .create_subkey_with("SOFTWARE\\snapshot_test", AccessRights::ALL)
        .unwrap();
    key.set_string("kept", "still here").unwrap();
    key.set_dword("count", 12, false).unwrap();
    key.create_subkey("nested").unwrap();

    let snapshot = Registry::export_snapshot().unwrap();

    // Mutate the live store after the snapshot was taken.
    key.delete_subkey("nested").unwrap();
    key.delete_value("kept").unwrap();
    key.set_string("extra", "added later").unwrap();

    Registry::import_snapshot(&snapshot).unwrap();

    let restored = Registry::local_machine()
        .open_subkey("SOFTWARE\\snapshot_test")
        .unwrap();
    assert_eq!(
        restored.get_value("kept", String::new()).unwrap(),
        "still here"
    );
    assert_eq!(restored.get_value("count", 0i32).unwrap(), 12);
    assert_eq!(restored.value_type("kept").unwrap(), ValueType::String);
    assert!(restored.open_subkey("nested").is_ok());
    // The post-snapshot value is gone again.
    assert!(restored.raw_value("extra").unwrap().is_none());
}

#[test]
fn test_import_rejects_malformed_snapshot() {
    let err = Registry::import_snapshot("not json").unwrap_err();
    assert!(matches!(
        err,
        reg_store::RegistryError::InvalidArgument(_)
    ));
}
