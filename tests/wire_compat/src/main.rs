fn main() {
    println!("Run `cargo test -p wire-compat` to execute wire compatibility tests.");
}

#[cfg(test)]
mod tests {
    use std::fs;
    use std::path::PathBuf;

    use chrono::{TimeZone, Utc};
    use largeattach_protocol::{
        AttachmentType, BodyType, CreateUploadSessionRequest, DraftMessage, Importance,
        SliceOutcome, UploadSession,
    };

    /// Returns the path to the fixtures directory.
    fn fixtures_dir() -> PathBuf {
        PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("fixtures")
    }

    fn fixture_bytes(name: &str) -> Vec<u8> {
        let path = fixtures_dir().join(name);
        fs::read(&path).unwrap_or_else(|e| panic!("failed to read fixture {}: {e}", path.display()))
    }

    /// Loads a fixture JSON file and returns it as a `serde_json::Value`.
    fn load_fixture(name: &str) -> serde_json::Value {
        serde_json::from_slice(&fixture_bytes(name))
            .unwrap_or_else(|e| panic!("failed to parse fixture {name}: {e}"))
    }

    /// Deserializes a fixture into a Rust type, re-serializes it, and compares
    /// the JSON values (order-independent).
    fn roundtrip_test<T>(name: &str) -> T
    where
        T: serde::de::DeserializeOwned + serde::Serialize,
    {
        let fixture = load_fixture(name);
        let parsed: T = serde_json::from_value(fixture.clone())
            .unwrap_or_else(|e| panic!("failed to deserialize {name}: {e}"));
        let reserialized = serde_json::to_value(&parsed)
            .unwrap_or_else(|e| panic!("failed to re-serialize {name}: {e}"));

        assert_eq!(
            fixture, reserialized,
            "roundtrip mismatch for {name}:\n  wire: {fixture}\n  Rust: {reserialized}"
        );
        parsed
    }

    #[test]
    fn fixture_upload_session() {
        let session: UploadSession = roundtrip_test("upload_session.json");
        assert!(session.upload_url.contains("authtoken="));
        assert_eq!(
            session.expiration_date_time,
            Utc.with_ymd_and_hms(2030, 9, 25, 1, 9, 30).unwrap()
        );
        assert_eq!(session.next_expected_range().map(|r| r.start), Some(0));
    }

    #[test]
    fn fixture_create_upload_session_request() {
        let req: CreateUploadSessionRequest = roundtrip_test("create_upload_session_request.json");
        let item = req.attachment_item;
        assert_eq!(item.attachment_type, AttachmentType::File);
        assert_eq!(item.name, "flower");
        assert_eq!(item.size, 3_483_322);
        assert_eq!(item.content_type.as_deref(), Some("image/jpeg"));
        assert_eq!(item.is_inline, Some(false));
    }

    #[test]
    fn fixture_draft_message() {
        let draft: DraftMessage = roundtrip_test("draft_message.json");
        assert_eq!(draft.importance, Importance::Low);
        assert_eq!(draft.body.content_type, BodyType::Html);
        assert_eq!(draft.to_recipients.len(), 2);
        assert_eq!(
            draft.to_recipients[1].email_address.name.as_deref(),
            Some("Megan Bowen")
        );
    }

    #[test]
    fn fixture_partial_response() {
        let outcome = SliceOutcome::interpret(202, &fixture_bytes("partial_response.json"), None);
        let SliceOutcome::Partial {
            next_expected_ranges,
            expiration_date_time,
        } = outcome
        else {
            panic!("expected a partial outcome");
        };
        assert_eq!(next_expected_ranges, vec!["327680-"]);
        let exp = expiration_date_time.expect("expiration present");
        assert_eq!(exp.timestamp(), Utc.with_ymd_and_hms(2030, 9, 25, 1, 9, 30).unwrap().timestamp());
    }

    #[test]
    fn fixture_partial_response_applies_to_session() {
        let mut session: UploadSession = serde_json::from_value(load_fixture("upload_session.json")).unwrap();
        let SliceOutcome::Partial {
            next_expected_ranges,
            expiration_date_time,
        } = SliceOutcome::interpret(202, &fixture_bytes("partial_response.json"), None)
        else {
            panic!("expected a partial outcome");
        };
        session.apply_partial(next_expected_ranges, expiration_date_time);
        assert_eq!(session.next_expected_range().map(|r| r.start), Some(327_680));
    }

    #[test]
    fn fixture_complete_response() {
        let location = Some("https://outlook.office.com/api/v2.0/Users('d3b9214b')/Messages('AAMkADI5')/Attachments('AAMkADI5AAAAAAEMAAAw')".to_string());
        let outcome =
            SliceOutcome::interpret(201, &fixture_bytes("complete_response.json"), location.clone());
        let SliceOutcome::Complete(item) = outcome else {
            panic!("expected a completed outcome");
        };
        assert_eq!(item.id.as_deref(), Some("AAMkADI5AAAAAAEMAAAw"));
        assert_eq!(item.location, location);
        assert_eq!(item.body["Size"], 3_483_322);
    }
}
