//! End-to-end enrollment flows against a mocked CA.

use base64::engine::general_purpose::STANDARD as B64;
use base64::Engine as _;
use tessera::{CaClient, FileWallet, IdentityManager, SoftwareKeyProvider, TesseraError, Wallet};
use wiremock::matchers::{body_partial_json, header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn self_signed(common_name: &str) -> String {
    let key = rcgen::KeyPair::generate().unwrap();
    let mut params = rcgen::CertificateParams::default();
    let mut dn = rcgen::DistinguishedName::new();
    dn.push(rcgen::DnType::CommonName, common_name);
    params.distinguished_name = dn;
    params.self_signed(&key).unwrap().pem()
}

fn enroll_response(cert_pem: &str) -> ResponseTemplate {
    ResponseTemplate::new(200).set_body_json(serde_json::json!({
        "success": true,
        "result": {
            "Cert": B64.encode(cert_pem),
            "ServerInfo": { "CAChain": B64.encode(self_signed("ca-org1")) }
        },
        "errors": []
    }))
}

fn basic_auth(id: &str, secret: &str) -> String {
    format!("Basic {}", B64.encode(format!("{id}:{secret}")))
}

#[tokio::test]
async fn test_register_and_enroll_populates_wallet_once() {
    let server = MockServer::start().await;

    // Admin bootstrap enrollment
    Mock::given(method("POST"))
        .and(path("/api/v1/enroll"))
        .and(header("Authorization", basic_auth("admin", "adminpw")))
        .respond_with(enroll_response(&self_signed("admin")))
        .expect(1)
        .mount(&server)
        .await;

    // Registration of the new user, CA-generated secret
    Mock::given(method("POST"))
        .and(path("/api/v1/register"))
        .respond_with(ResponseTemplate::new(201).set_body_json(serde_json::json!({
            "success": true,
            "result": { "secret": "GenSecret99" },
            "errors": []
        })))
        .expect(1)
        .mount(&server)
        .await;

    // User enrollment with the generated secret
    Mock::given(method("POST"))
        .and(path("/api/v1/enroll"))
        .and(header("Authorization", basic_auth("hsm-user11", "GenSecret99")))
        .respond_with(enroll_response(&self_signed("hsm-user11")))
        .expect(1)
        .mount(&server)
        .await;

    let dir = tempfile::tempdir().unwrap();
    let wallet = FileWallet::open(dir.path()).unwrap();
    let ca = CaClient::builder(server.uri()).ca_name("ca-org1").build();
    let manager = IdentityManager::new(ca, wallet, SoftwareKeyProvider::new());

    // Admin setup is idempotent
    assert!(manager.ensure_enrolled("admin", "adminpw", "Org1MSP").await.unwrap());
    assert!(!manager.ensure_enrolled("admin", "adminpw", "Org1MSP").await.unwrap());

    // Register + enroll the user; second call is a no-op. The mock expect
    // counts verify that registration and enrollment each ran exactly once.
    assert!(manager.ensure_user("hsm-user11", "Org1MSP", "admin").await.unwrap());
    assert!(!manager.ensure_user("hsm-user11", "Org1MSP", "admin").await.unwrap());

    assert!(manager.wallet().exists("hsm-user11").unwrap());
    let identity = manager.wallet().get("hsm-user11").unwrap();
    assert_eq!(identity.msp_id, "Org1MSP");
    assert!(identity.serial.is_some());
}

#[tokio::test]
async fn test_tls_enrollment_is_distinct_and_not_stored() {
    let server = MockServer::start().await;
    let signing_cert = self_signed("admin");
    let tls_cert = self_signed("admin-tls");

    Mock::given(method("POST"))
        .and(path("/api/v1/enroll"))
        .and(body_partial_json(serde_json::json!({ "profile": "tls" })))
        .respond_with(enroll_response(&tls_cert))
        .expect(1)
        .mount(&server)
        .await;

    Mock::given(method("POST"))
        .and(path("/api/v1/enroll"))
        .respond_with(enroll_response(&signing_cert))
        .mount(&server)
        .await;

    let dir = tempfile::tempdir().unwrap();
    let wallet = FileWallet::open(dir.path()).unwrap();
    let ca = CaClient::builder(server.uri()).build();
    let manager = IdentityManager::new(ca, wallet, SoftwareKeyProvider::new());

    manager.ensure_enrolled("admin", "adminpw", "Org1MSP").await.unwrap();
    let credential = manager.tls_enroll("admin", "adminpw").await.unwrap();

    // Transport certificate is not the signing certificate, and the wallet
    // gained no new entries from the TLS enrollment.
    let identity = manager.wallet().get("admin").unwrap();
    assert_ne!(credential.certificate, identity.certificate);
    assert!(credential.key.contains("PRIVATE KEY"));
    assert_eq!(manager.wallet().labels().unwrap(), vec!["admin".to_string()]);
}

#[tokio::test]
async fn test_duplicate_registration_surfaces() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/v1/enroll"))
        .respond_with(enroll_response(&self_signed("admin")))
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/api/v1/register"))
        .respond_with(ResponseTemplate::new(500).set_body_json(serde_json::json!({
            "success": false,
            "result": null,
            "errors": [{ "code": 63, "message": "Identity 'hsm-user11' is already registered" }]
        })))
        .mount(&server)
        .await;

    let dir = tempfile::tempdir().unwrap();
    let wallet = FileWallet::open(dir.path()).unwrap();
    let ca = CaClient::builder(server.uri()).build();
    let manager = IdentityManager::new(ca, wallet, SoftwareKeyProvider::new());

    manager.ensure_enrolled("admin", "adminpw", "Org1MSP").await.unwrap();
    let err = manager
        .register_user("hsm-user11", None, "admin")
        .await
        .unwrap_err();
    assert!(matches!(err, TesseraError::DuplicateIdentity { id } if id == "hsm-user11"));
}

#[tokio::test]
async fn test_re_enroll_replaces_wallet_entry() {
    let server = MockServer::start().await;
    let first = self_signed("user");
    let second = self_signed("user");

    Mock::given(method("POST"))
        .and(path("/api/v1/enroll"))
        .respond_with(enroll_response(&first))
        .expect(1)
        .up_to_n_times(1)
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/api/v1/enroll"))
        .respond_with(enroll_response(&second))
        .expect(1)
        .mount(&server)
        .await;

    let dir = tempfile::tempdir().unwrap();
    let wallet = FileWallet::open(dir.path()).unwrap();
    let ca = CaClient::builder(server.uri()).build();
    let manager = IdentityManager::new(ca, wallet, SoftwareKeyProvider::new());

    manager.enroll_to_wallet("user", "pw", "Org1MSP").await.unwrap();
    assert_eq!(manager.wallet().get("user").unwrap().certificate, first);

    manager.re_enroll("user", "pw", "Org1MSP").await.unwrap();
    assert_eq!(manager.wallet().get("user").unwrap().certificate, second);
}
