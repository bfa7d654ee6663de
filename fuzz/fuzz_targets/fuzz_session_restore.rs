#![no_main]

use arbitrary::Arbitrary;
use libfuzzer_sys::fuzz_target;
use vellum_rbac::{CredentialKey, CredentialStore, MemoryCredentialStore, Session};
use vellum_types::Identity;

/// Arbitrary persisted credentials, each key absent or any string.
#[derive(Debug, Arbitrary)]
struct Persisted {
    token: Option<String>,
    refresh_token: Option<String>,
    identity: Option<String>,
    /// Start from a signed-in session to check restore resets it.
    signed_in_before: bool,
}

fuzz_target!(|input: Persisted| {
    let mut store = MemoryCredentialStore::new();
    for (key, value) in [
        (CredentialKey::Token, &input.token),
        (CredentialKey::RefreshToken, &input.refresh_token),
        (CredentialKey::Identity, &input.identity),
    ] {
        if let Some(value) = value {
            store.set(key, value).unwrap();
        }
    }

    let mut session = Session::new();
    if input.signed_in_before {
        session.login(
            Identity::new("0", "Previous", "prev@example.com", None),
            Vec::new(),
        );
    }

    let restored = session.restore(&mut store);

    // Should never panic, and the flag must agree with the session.
    assert_eq!(restored, session.is_authenticated());
    assert_eq!(restored, session.identity().is_some());
    assert!(session.permissions().is_empty());

    let has_token = input.token.as_deref().is_some_and(|t| !t.is_empty());
    let parsed = input
        .identity
        .as_deref()
        .and_then(|raw| serde_json::from_str::<Identity>(raw).ok());

    match (has_token, input.identity.is_some(), parsed) {
        (true, _, Some(identity)) => {
            assert!(restored);
            assert_eq!(session.identity(), Some(&identity));
        }
        (true, true, None) => {
            // Unparsable identity: fail closed and wipe everything.
            assert!(!restored);
            assert!(store.is_empty());
        }
        _ => assert!(!restored),
    }
});
