//! Assertion and response assembly.

use chrono::{DateTime, Utc};

use crate::types::{
    Assertion, Attribute, AttributeQuery, AttributeStatement, Conditions, Issuer, Response,
    Subject,
};

/// Builds the unsigned assertion answering `query`.
///
/// The subject is copied verbatim from the query, the validity window starts
/// at `now`, and the audience is the querying relying party. An empty
/// attribute set produces no attribute statement.
#[must_use]
pub fn build_assertion(
    id: String,
    entity_id: &str,
    query: &AttributeQuery,
    attributes: Vec<Attribute>,
    now: DateTime<Utc>,
) -> Assertion {
    let conditions = Conditions::starting_at(now).with_audience(query.issuer.clone());
    let assertion = Assertion::new(
        id,
        Issuer::entity(entity_id),
        now,
        Subject::new(query.name_id.clone()),
        conditions,
    );

    if attributes.is_empty() {
        assertion
    } else {
        assertion.with_attribute_statement(AttributeStatement::from_attributes(attributes))
    }
}

/// Wraps `assertion` in a successful response correlated to `query`.
#[must_use]
pub fn build_response(
    id: String,
    entity_id: &str,
    query: &AttributeQuery,
    assertion: Assertion,
    now: DateTime<Utc>,
) -> Response {
    Response::success(id, query.id.clone(), Issuer::entity(entity_id), now, assertion)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{NameId, NameIdFormat};
    use chrono::{Duration, TimeZone};

    fn query() -> AttributeQuery {
        AttributeQuery::new(
            "q1",
            "sp1",
            NameId::new("alice")
                .with_format(NameIdFormat::Unspecified)
                .with_sp_name_qualifier("sp1"),
        )
    }

    #[test]
    fn assertion_fields_follow_query() {
        let now = Utc.with_ymd_and_hms(2024, 3, 1, 12, 0, 0).unwrap();
        let query = query();
        let assertion = build_assertion(
            "_a1".to_string(),
            "https://aa.example.com",
            &query,
            vec![Attribute::single("email", "alice@example.com")],
            now,
        );

        assert_eq!(assertion.id, "_a1");
        assert_eq!(assertion.issue_instant, now);
        assert_eq!(assertion.issuer.value, "https://aa.example.com");
        assert_eq!(assertion.subject.name_id, query.name_id);
        assert_eq!(assertion.conditions.not_before, now);
        assert_eq!(assertion.conditions.not_on_or_after, now + Duration::minutes(5));
        assert_eq!(assertion.conditions.audience_restrictions[0].audiences, vec!["sp1"]);
        assert!(assertion.signature.is_none());

        let statement = assertion.attribute_statement.unwrap();
        assert_eq!(statement.values_of("email"), Some(&["alice@example.com".to_string()][..]));
    }

    #[test]
    fn empty_attribute_set_omits_statement() {
        let assertion = build_assertion("_a1".to_string(), "aa", &query(), Vec::new(), Utc::now());
        assert!(assertion.attribute_statement.is_none());
    }

    #[test]
    fn response_shares_instant_and_correlates() {
        let now = Utc::now();
        let query = query();
        let assertion = build_assertion("_a1".to_string(), "aa", &query, Vec::new(), now);
        let response = build_response("_r1".to_string(), "aa", &query, assertion, now);

        assert_eq!(response.in_response_to, "q1");
        assert_eq!(response.issue_instant, response.assertion.issue_instant);
        assert_eq!(response.issuer, response.assertion.issuer);
        assert!(response.is_success());
    }
}
