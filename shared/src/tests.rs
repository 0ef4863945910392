#[cfg(test)]
mod tests {
    use std::collections::HashSet;
    use uuid::Uuid;
    use crate::models::{FetchedVote, VoteRecord, VoteResponse};
    use crate::voter::{mint_voter_id, resolve_voter_identity, VoterId};

    fn is_canonical_uuid(id: &VoterId) -> bool {
        Uuid::parse_str(id.as_str())
            .map(|uuid| uuid.hyphenated().to_string() == id.as_str())
            .unwrap_or(false)
    }

    #[test]
    fn test_cookie_value_is_returned_verbatim() {
        for value in ["X", "not-a-uuid", "  spaced  ", "6f1c0a52-ZZZZ", ""] {
            let resolved = resolve_voter_identity(Some(value)).unwrap();
            assert_eq!(resolved.id.as_str(), value);
            assert!(!resolved.minted);
        }
    }

    #[test]
    fn test_missing_cookie_mints_canonical_uuid() {
        let resolved = resolve_voter_identity(None).unwrap();
        assert!(resolved.minted);
        assert!(is_canonical_uuid(&resolved.id));
        assert_eq!(resolved.id.as_str().len(), 36);

        let parsed = Uuid::parse_str(resolved.id.as_str()).unwrap();
        assert_eq!(parsed.get_version_num(), 4);
    }

    #[test]
    fn test_minted_ids_are_fresh() {
        let ids: HashSet<_> = (0..256).map(|_| mint_voter_id().unwrap()).collect();
        assert_eq!(ids.len(), 256);
    }

    #[test]
    fn test_canonical_uuid_check() {
        assert!(is_canonical_uuid(&VoterId::from("67e55044-10b1-426f-9247-bb680e5fe0c8")));
        assert!(!is_canonical_uuid(&VoterId::from("67E55044-10B1-426F-9247-BB680E5FE0C8")));
        assert!(!is_canonical_uuid(&VoterId::from("67e5504410b1426f9247bb680e5fe0c8")));
        assert!(!is_canonical_uuid(&VoterId::from("voter-123")));
    }

    #[test]
    fn test_vote_record_wire_shape() {
        let record = VoteRecord::new(VoterId::from("voter-123"), "a");
        let value = serde_json::to_value(&record).unwrap();
        assert_eq!(value, serde_json::json!({"voter_id": "voter-123", "vote": "a"}));
    }

    #[test]
    fn test_vote_response_decoding() {
        let decoded: VoteResponse = serde_json::from_str(r#"{"vote":"b"}"#).unwrap();
        assert_eq!(decoded.vote, "b");

        assert!(serde_json::from_str::<VoteResponse>(r#"{"result":"b"}"#).is_err());
        assert!(serde_json::from_str::<VoteResponse>(r#"{"vote":1}"#).is_err());
        assert!(serde_json::from_str::<VoteResponse>("not json").is_err());
    }

    #[test]
    fn test_fetched_vote_values() {
        assert_eq!(FetchedVote::Recorded("a".into()).value(), "a");
        assert_eq!(FetchedVote::Recorded(String::new()).value(), "");
        assert_eq!(FetchedVote::NoRecord.value(), "");
        assert_eq!(FetchedVote::Unavailable.value(), "");
        assert!(FetchedVote::Recorded(String::new()).is_recorded());
        assert!(!FetchedVote::Unavailable.is_recorded());
    }
}
