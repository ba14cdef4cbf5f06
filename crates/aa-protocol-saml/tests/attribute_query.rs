//! Attribute query pipeline tests.
//!
//! Collaborators are instrumented with call counters so the tests can check
//! that a failing stage stops everything after it.

use std::collections::HashSet;
use std::io::Write;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use aa_protocol_saml::codec::assertion_signing_form;
use aa_protocol_saml::query::{FixedClock, IdGenerator};
use aa_protocol_saml::signature::{AssertionSigner, XmlSignature};
use aa_protocol_saml::{
    Assertion, Attribute, AttributeQueryHandler, AttributeRetriever, AuthenticatedUser,
    QueryOutcome, ResponderConfig, RetrieverError, SamlError, SamlResult, StaticAttributeRetriever,
    XmlSigner,
};
use base64::Engine;
use chrono::{Duration, TimeZone, Utc};

const KEY_PEM: &str = include_str!("fixtures/signing_key.pem");
const CERT_PEM: &str = include_str!("fixtures/signing_cert.pem");
const ENTITY_ID: &str = "https://aa.example.com";
const UNSPECIFIED: &str = "urn:oasis:names:tc:SAML:1.1:nameid-format:unspecified";

// Instrumented collaborators

struct CountingRetriever {
    inner: Option<StaticAttributeRetriever>,
    calls: AtomicUsize,
    last_user: std::sync::Mutex<Option<AuthenticatedUser>>,
}

impl CountingRetriever {
    fn with_alice() -> Self {
        Self {
            inner: Some(StaticAttributeRetriever::default().with_subject(
                "alice",
                vec![Attribute::single("email", "alice@example.com")],
            )),
            calls: AtomicUsize::new(0),
            last_user: std::sync::Mutex::new(None),
        }
    }

    fn failing() -> Self {
        Self {
            inner: None,
            ..Self::with_alice()
        }
    }

    fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait::async_trait]
impl AttributeRetriever for CountingRetriever {
    async fn retrieve(&self, user: &AuthenticatedUser) -> Result<Vec<Attribute>, RetrieverError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        *self.last_user.lock().unwrap() = Some(user.clone());
        match &self.inner {
            Some(store) => store.retrieve(user).await,
            None => Err(RetrieverError::Backend("directory unreachable".to_string())),
        }
    }
}

struct CountingSigner {
    inner: Option<XmlSigner>,
    calls: AtomicUsize,
}

impl CountingSigner {
    fn working() -> Self {
        Self {
            inner: Some(XmlSigner::from_pem(KEY_PEM, Some(CERT_PEM)).unwrap()),
            calls: AtomicUsize::new(0),
        }
    }

    fn failing() -> Self {
        Self {
            inner: None,
            calls: AtomicUsize::new(0),
        }
    }

    fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

impl AssertionSigner for CountingSigner {
    fn sign(&self, assertion: &Assertion) -> SamlResult<XmlSignature> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        match &self.inner {
            Some(signer) => signer.sign(assertion),
            None => Err(SamlError::SignatureCreation("key store locked".to_string())),
        }
    }
}

struct SequentialIds(AtomicUsize);

impl IdGenerator for SequentialIds {
    fn new_id(&self) -> String {
        format!("_id{}", self.0.fetch_add(1, Ordering::SeqCst))
    }
}

/// Accepts `budget` bytes, then fails every write.
struct FailingSink {
    written: Vec<u8>,
    budget: usize,
}

impl Write for FailingSink {
    fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
        if self.budget == 0 {
            return Err(std::io::Error::new(
                std::io::ErrorKind::ConnectionReset,
                "client went away",
            ));
        }
        let n = buf.len().min(self.budget);
        self.written.extend_from_slice(&buf[..n]);
        self.budget -= n;
        Ok(n)
    }

    fn flush(&mut self) -> std::io::Result<()> {
        Ok(())
    }
}

fn query_xml(id: &str, issuer: &str, subject: &str) -> String {
    format!(
        r#"<?xml version="1.0" encoding="UTF-8"?>
<soap:Envelope xmlns:soap="http://schemas.xmlsoap.org/soap/envelope/">
  <soap:Body>
    <samlp:AttributeQuery xmlns:samlp="urn:oasis:names:tc:SAML:2.0:protocol"
        xmlns:saml="urn:oasis:names:tc:SAML:2.0:assertion"
        ID="{id}" Version="2.0" IssueInstant="2024-03-01T12:00:00Z">
      <saml:Issuer>{issuer}</saml:Issuer>
      <saml:Subject>
        <saml:NameID Format="{UNSPECIFIED}">{subject}</saml:NameID>
      </saml:Subject>
    </samlp:AttributeQuery>
  </soap:Body>
</soap:Envelope>"#
    )
}

fn handler(
    retriever: &Arc<CountingRetriever>,
    signer: &Arc<CountingSigner>,
) -> AttributeQueryHandler {
    AttributeQueryHandler::new(ResponderConfig {
        entity_id: ENTITY_ID.to_string(),
        retriever: retriever.clone(),
        signer: signer.clone(),
    })
}

#[tokio::test]
async fn end_to_end_alice_query() {
    let retriever = Arc::new(CountingRetriever::with_alice());
    let signer = Arc::new(CountingSigner::working());
    let handler = handler(&retriever, &signer);
    let body = query_xml("q1", "sp1", "alice");

    let response = handler.process(body.as_bytes()).await.unwrap();

    assert_eq!(response.in_response_to, "q1");
    assert!(response.is_success());
    assert_eq!(response.issuer.value, ENTITY_ID);

    let assertion = &response.assertion;
    assert_eq!(assertion.subject.name_id.value, "alice");
    assert_eq!(assertion.subject.name_id.format.as_deref(), Some(UNSPECIFIED));
    assert_eq!(
        assertion.conditions.audience_restrictions[0].audiences,
        vec!["sp1".to_string()]
    );

    let statement = assertion.attribute_statement.as_ref().unwrap();
    assert_eq!(statement.attributes.len(), 1);
    assert_eq!(
        statement.values_of("email"),
        Some(&["alice@example.com".to_string()][..])
    );
    assert!(assertion.is_signed());

    let user = retriever.last_user.lock().unwrap().clone().unwrap();
    assert_eq!(user.name, "alice");
    assert_eq!(user.format.as_deref(), Some(UNSPECIFIED));
}

#[tokio::test]
async fn end_to_end_wire_response() {
    let retriever = Arc::new(CountingRetriever::with_alice());
    let signer = Arc::new(CountingSigner::working());
    let handler = handler(&retriever, &signer);

    let mut sink = Vec::new();
    let outcome = handler
        .respond(query_xml("q1", "sp1", "alice").as_bytes(), &mut sink)
        .await;
    assert!(outcome.is_done());

    let xml = String::from_utf8(sink).unwrap();
    assert!(xml.starts_with("<?xml version=\"1.0\" encoding=\"UTF-8\"?>"));
    assert!(xml.contains(r#"InResponseTo="q1""#));
    assert!(xml.contains("urn:oasis:names:tc:SAML:2.0:status:Success"));
    assert!(xml.contains("<saml:Audience>sp1</saml:Audience>"));
    assert!(xml.contains(">alice</saml:NameID>"));
    assert!(xml.contains(
        r#"<saml:Attribute Name="email"><saml:AttributeValue>alice@example.com</saml:AttributeValue></saml:Attribute>"#
    ));
    assert!(xml.contains("<ds:SignatureValue>"));
}

#[tokio::test]
async fn in_response_to_echoes_every_query_id() {
    let retriever = Arc::new(CountingRetriever::with_alice());
    let signer = Arc::new(CountingSigner::working());
    let handler = handler(&retriever, &signer);

    for id in ["q1", "_5f1c", "id-with.dots", "Z"] {
        let response = handler
            .process(query_xml(id, "sp1", "alice").as_bytes())
            .await
            .unwrap();
        assert_eq!(response.in_response_to, id);
    }
}

#[tokio::test]
async fn validity_window_is_anchored_at_one_instant() {
    let now = Utc.with_ymd_and_hms(2024, 3, 1, 12, 0, 0).unwrap();
    let retriever = Arc::new(CountingRetriever::with_alice());
    let signer = Arc::new(CountingSigner::working());
    let handler = handler(&retriever, &signer).with_clock(FixedClock(now));

    let response = handler
        .process(query_xml("q1", "https://sp.example.org", "alice").as_bytes())
        .await
        .unwrap();
    let conditions = &response.assertion.conditions;

    assert_eq!(response.issue_instant, now);
    assert_eq!(response.assertion.issue_instant, now);
    assert_eq!(conditions.not_before, now);
    assert_eq!(conditions.not_on_or_after - conditions.not_before, Duration::minutes(5));
    assert_eq!(
        conditions.audience_restrictions[0].audiences,
        vec!["https://sp.example.org".to_string()]
    );
}

#[tokio::test]
async fn ids_never_repeat_across_queries() {
    let retriever = Arc::new(CountingRetriever::with_alice());
    let signer = Arc::new(CountingSigner::working());
    let handler = handler(&retriever, &signer);
    let body = query_xml("q1", "sp1", "alice");

    let mut seen = HashSet::new();
    for _ in 0..5 {
        let response = handler.process(body.as_bytes()).await.unwrap();
        assert!(seen.insert(response.id));
        assert!(seen.insert(response.assertion.id));
    }
}

#[tokio::test]
async fn ids_come_from_the_injected_generator() {
    let retriever = Arc::new(CountingRetriever::with_alice());
    let signer = Arc::new(CountingSigner::working());
    let handler =
        handler(&retriever, &signer).with_id_generator(SequentialIds(AtomicUsize::new(0)));

    let response = handler
        .process(query_xml("q1", "sp1", "alice").as_bytes())
        .await
        .unwrap();

    assert_eq!(response.assertion.id, "_id0");
    assert_eq!(response.id, "_id1");
    let signature = response.assertion.signature.unwrap();
    assert_eq!(signature.reference_uri, "#_id0");
}

#[tokio::test]
async fn malformed_xml_invokes_no_collaborator() {
    let retriever = Arc::new(CountingRetriever::with_alice());
    let signer = Arc::new(CountingSigner::working());
    let handler = handler(&retriever, &signer);

    for body in [
        "",
        "not xml at all",
        "<soap:Envelope><soap:Body><samlp:AttributeQuery ID=\"q1\">",
        "<soap:Envelope><soap:Body></soap:Envelope>",
    ] {
        let mut sink = Vec::new();
        let outcome = handler.respond(body.as_bytes(), &mut sink).await;

        let err = outcome.error().unwrap();
        assert!(matches!(outcome, QueryOutcome::Failed(_)));
        assert_eq!(err.http_status(), 400);
        assert!(sink.is_empty());
    }

    assert_eq!(retriever.calls(), 0);
    assert_eq!(signer.calls(), 0);
}

#[tokio::test]
async fn rejected_query_never_reaches_the_store() {
    let retriever = Arc::new(CountingRetriever::with_alice());
    let signer = Arc::new(CountingSigner::working());
    let handler = handler(&retriever, &signer);
    let body = query_xml("q1", "sp1", "alice").replace("Version=\"2.0\"", "Version=\"1.1\"");

    let err = handler.process(body.as_bytes()).await.unwrap_err();

    assert!(matches!(err, SamlError::InvalidRequest(_)));
    assert_eq!(retriever.calls(), 0);
    assert_eq!(signer.calls(), 0);
}

#[tokio::test]
async fn retriever_failure_skips_signer() {
    let retriever = Arc::new(CountingRetriever::failing());
    let signer = Arc::new(CountingSigner::working());
    let handler = handler(&retriever, &signer);

    let mut sink = Vec::new();
    let outcome = handler
        .respond(query_xml("q1", "sp1", "alice").as_bytes(), &mut sink)
        .await;

    match outcome {
        QueryOutcome::Failed(SamlError::AttributeResolution(detail)) => {
            assert!(detail.contains("directory unreachable"));
        }
        other => panic!("expected resolution failure, got {other:?}"),
    }
    assert_eq!(retriever.calls(), 1);
    assert_eq!(signer.calls(), 0);
    assert!(sink.is_empty());
}

#[tokio::test]
async fn unknown_subject_is_a_resolution_failure() {
    let retriever = Arc::new(CountingRetriever::with_alice());
    let signer = Arc::new(CountingSigner::working());
    let handler = handler(&retriever, &signer);

    let err = handler
        .process(query_xml("q1", "sp1", "mallory").as_bytes())
        .await
        .unwrap_err();

    assert!(matches!(err, SamlError::AttributeResolution(_)));
    assert_eq!(err.http_status(), 500);
    assert_eq!(signer.calls(), 0);
}

#[tokio::test]
async fn signer_failure_writes_nothing() {
    let retriever = Arc::new(CountingRetriever::with_alice());
    let signer = Arc::new(CountingSigner::failing());
    let handler = handler(&retriever, &signer);

    let mut sink = Vec::new();
    let outcome = handler
        .respond(query_xml("q1", "sp1", "alice").as_bytes(), &mut sink)
        .await;

    assert!(matches!(
        outcome,
        QueryOutcome::Failed(SamlError::SignatureCreation(_))
    ));
    assert_eq!(retriever.calls(), 1);
    assert_eq!(signer.calls(), 1);
    assert!(sink.is_empty());
}

#[tokio::test]
async fn sink_failure_after_output_started_is_partial() {
    let retriever = Arc::new(CountingRetriever::with_alice());
    let signer = Arc::new(CountingSigner::working());
    let handler = handler(&retriever, &signer);

    let mut sink = FailingSink {
        written: Vec::new(),
        budget: 64,
    };
    let outcome = handler
        .respond(query_xml("q1", "sp1", "alice").as_bytes(), &mut sink)
        .await;

    assert!(matches!(
        outcome,
        QueryOutcome::PartiallyWritten(SamlError::Encoding(_))
    ));
    assert_eq!(sink.written.len(), 64);
    assert!(sink.written.starts_with(b"<?xml"));
}

#[tokio::test]
async fn delivered_assertion_signature_verifies() {
    let retriever = Arc::new(CountingRetriever::with_alice());
    let signer = Arc::new(CountingSigner::working());
    let handler = handler(&retriever, &signer);

    let response = handler
        .process(query_xml("q1", "sp1", "alice").as_bytes())
        .await
        .unwrap();
    let mut assertion = response.assertion;
    let signature = assertion.signature.take().unwrap();
    let engine = base64::engine::general_purpose::STANDARD;

    let digest = aa_crypto::sha256(&assertion_signing_form(&assertion).unwrap());
    assert_eq!(signature.digest_value, engine.encode(digest));

    let public_key = XmlSigner::from_pem(KEY_PEM, None).unwrap().public_key_der();
    aa_crypto::rsa_verify(
        &public_key,
        signature.signed_info().as_bytes(),
        &engine.decode(&signature.signature_value).unwrap(),
        aa_crypto::RsaAlgorithm::Rs256,
    )
    .unwrap();
    assert!(signature.x509_certificate.is_some());
}

fn between<'a>(xml: &'a str, open: &str, close: &str) -> &'a str {
    let start = xml.find(open).unwrap();
    let end = xml[start..].find(close).unwrap() + start + close.len();
    &xml[start..end]
}

fn inner_text<'a>(xml: &'a str, tag: &str) -> &'a str {
    let open = format!("<{tag}>");
    let start = xml.find(&open).unwrap() + open.len();
    let end = xml[start..].find(&format!("</{tag}>")).unwrap() + start;
    &xml[start..end]
}

#[tokio::test]
async fn signature_verifies_over_sent_bytes() {
    let store = StaticAttributeRetriever::default().with_subject(
        "carol",
        vec![Attribute::single("postalAddress", "1 Main St\r\nSpringfield")],
    );
    let handler = AttributeQueryHandler::new(ResponderConfig {
        entity_id: ENTITY_ID.to_string(),
        retriever: Arc::new(store),
        signer: Arc::new(XmlSigner::from_pem(KEY_PEM, Some(CERT_PEM)).unwrap()),
    });

    let mut sink = Vec::new();
    let outcome = handler
        .respond(query_xml("q1", "sp1", "carol").as_bytes(), &mut sink)
        .await;
    assert!(outcome.is_done());
    let xml = String::from_utf8(sink).unwrap();
    assert!(!xml.contains('\r'));

    let assertion = between(&xml, "<saml:Assertion", "</saml:Assertion>");
    let signature = between(assertion, "<ds:Signature", "</ds:Signature>");
    let unsigned = assertion.replacen(signature, "", 1);
    let engine = base64::engine::general_purpose::STANDARD;

    let digest = aa_crypto::sha256(unsigned.as_bytes());
    assert_eq!(inner_text(signature, "ds:DigestValue"), engine.encode(digest));

    let signed_info = between(signature, "<ds:SignedInfo", "</ds:SignedInfo>");
    let public_key = XmlSigner::from_pem(KEY_PEM, None).unwrap().public_key_der();
    aa_crypto::rsa_verify(
        &public_key,
        signed_info.as_bytes(),
        &engine
            .decode(inner_text(signature, "ds:SignatureValue"))
            .unwrap(),
        aa_crypto::RsaAlgorithm::Rs256,
    )
    .unwrap();
}
