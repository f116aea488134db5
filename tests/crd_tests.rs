//! # CRD Tests
//!
//! Wire format of the CertCheck resource and the generated CRD.

use cert_check_controller::crd::{CertCheck, CertCheckStatus, CertificateStatus};
use kube::core::{CustomResourceExt, SelectorExt};
use std::collections::BTreeMap;

#[test]
fn test_crd_metadata() {
    let crd = CertCheck::crd();
    assert_eq!(crd.metadata.name.as_deref(), Some("certchecks.sre.amsy810.dev"));
    assert_eq!(crd.spec.group, "sre.amsy810.dev");
    assert_eq!(crd.spec.names.kind, "CertCheck");
    assert_eq!(crd.spec.scope, "Namespaced");
    assert_eq!(
        crd.spec.names.short_names.as_deref(),
        Some(&["cc".to_string()][..])
    );

    let version = &crd.spec.versions[0];
    assert_eq!(version.name, "v1beta1");
    assert!(version
        .subresources
        .as_ref()
        .and_then(|s| s.status.as_ref())
        .is_some());
}

#[test]
fn test_crd_serializes_to_yaml() {
    let yaml = serde_yaml::to_string(&CertCheck::crd()).unwrap();
    assert!(yaml.contains("kind: CustomResourceDefinition"));
    assert!(yaml.contains("targetCertsCount"));
    assert!(yaml.contains("threshold"));
}

#[test]
fn test_deserialize_full_resource() {
    let cc: CertCheck = serde_yaml::from_str(
        r#"
apiVersion: sre.amsy810.dev/v1beta1
kind: CertCheck
metadata:
  name: ingress-certs
  namespace: web
spec:
  threshold: 30
  selector:
    matchLabels:
      app: ingress
    matchExpressions:
      - key: tier
        operator: In
        values: [edge, public]
"#,
    )
    .unwrap();

    assert_eq!(cc.spec.threshold, 30);
    let selector = cc.label_selector().unwrap();
    let labels = BTreeMap::from([
        ("app".to_string(), "ingress".to_string()),
        ("tier".to_string(), "edge".to_string()),
    ]);
    assert!(selector.matches(&labels));
    let labels = BTreeMap::from([
        ("app".to_string(), "ingress".to_string()),
        ("tier".to_string(), "internal".to_string()),
    ]);
    assert!(!selector.matches(&labels));
}

#[test]
fn test_minimal_spec_defaults() {
    let cc: CertCheck = serde_json::from_value(serde_json::json!({
        "apiVersion": "sre.amsy810.dev/v1beta1",
        "kind": "CertCheck",
        "metadata": { "name": "all", "namespace": "web" },
        "spec": {}
    }))
    .unwrap();

    assert_eq!(cc.spec.threshold, 0);
    assert!(cc.spec.selector.is_none());
    assert!(cc.label_selector().unwrap().matches(&BTreeMap::new()));
}

#[test]
fn test_status_wire_format() {
    let status = CertCheckStatus {
        target_certs_count: 1,
        certificates: vec![CertificateStatus {
            name: "site-tls".to_string(),
            not_before: "2024-01-01T00:00:00Z".to_string(),
            not_after: "2025-01-01T00:00:00Z".to_string(),
            active: false,
        }],
        observed_generation: Some(4),
    };

    let value = serde_json::to_value(&status).unwrap();
    assert_eq!(value["targetCertsCount"], 1);
    assert_eq!(value["certificates"][0]["name"], "site-tls");
    assert_eq!(value["certificates"][0]["notBefore"], "2024-01-01T00:00:00Z");
    assert_eq!(value["certificates"][0]["notAfter"], "2025-01-01T00:00:00Z");
    assert_eq!(value["certificates"][0]["active"], false);
    assert_eq!(value["observedGeneration"], 4);
}
