//! Dialect probing and caching.

use a1pms_client::{A1ClientFactory, A1Error};
use a1pms_core::{ProtocolType, Ric, RicConfig};
use a1pms_testkit::{ric_config, MockCall, MockClientBuilder};
use assert_matches::assert_matches;

#[tokio::test]
async fn test_last_candidate_detected_and_cached() {
    let builder = MockClientBuilder::new();
    builder.ric("ric1").set_speaks(ProtocolType::StdV1);
    let factory = builder.factory();
    let ric = Ric::new(ric_config("ric1"));

    let client = factory.create_client(&ric).await.unwrap();
    assert_eq!(client.protocol(), ProtocolType::StdV1);
    assert_eq!(ric.protocol(), ProtocolType::StdV1);
    assert_eq!(
        builder.ric("ric1").probes(),
        vec![
            ProtocolType::SdnrOnap,
            ProtocolType::SdncOsc,
            ProtocolType::OscV1,
            ProtocolType::StdV1
        ]
    );

    // Cached: no further probing.
    builder.ric("ric1").clear_calls();
    let again = factory.create_client(&ric).await.unwrap();
    assert_eq!(again.protocol(), ProtocolType::StdV1);
    assert!(builder.ric("ric1").probes().is_empty());
}

#[tokio::test]
async fn test_first_answering_candidate_wins() {
    let builder = MockClientBuilder::new();
    builder.ric("ric1").set_speaks(ProtocolType::SdncOsc);
    let ric = Ric::new(ric_config("ric1"));

    let client = builder.factory().create_client(&ric).await.unwrap();
    assert_eq!(client.protocol(), ProtocolType::SdncOsc);
    assert_eq!(
        builder.ric("ric1").probes(),
        vec![ProtocolType::SdnrOnap, ProtocolType::SdncOsc]
    );
}

#[tokio::test]
async fn test_detection_failure_leaves_protocol_unknown() {
    let builder = MockClientBuilder::new();
    builder.ric("ric1").set_reachable(false);
    let ric = Ric::new(ric_config("ric1"));

    let result = builder.factory().create_client(&ric).await;
    assert_matches!(result, Err(A1Error::ProtocolDetectionFailed { ric, last }) => {
        assert_eq!(ric, "ric1");
        assert_matches!(*last, A1Error::Transport { .. });
    });
    assert_eq!(ric.protocol(), ProtocolType::Unknown);
    assert_eq!(builder.ric("ric1").probes().len(), 4);
}

#[tokio::test]
async fn test_configured_protocol_skips_probing() {
    let builder = MockClientBuilder::new();
    builder.ric("ric1").set_speaks(ProtocolType::SdncOnap);
    let mut config = RicConfig::new("ric1", "http://ric1:8085");
    config.protocol = Some(ProtocolType::SdncOnap);
    let ric = Ric::new(config);

    let client = builder.factory().create_client(&ric).await.unwrap();
    assert_eq!(client.protocol(), ProtocolType::SdncOnap);
    assert_eq!(builder.ric("ric1").count(&MockCall::Probe(ProtocolType::SdncOnap)), 0);
}

#[tokio::test]
async fn test_custom_probe_order() {
    let builder = MockClientBuilder::new();
    builder.ric("ric1").set_speaks(ProtocolType::StdV1_1);
    let factory = A1ClientFactory::new(builder.clone()).with_probe_order([ProtocolType::StdV1_1]);
    let ric = Ric::new(ric_config("ric1"));

    assert_eq!(factory.create_client(&ric).await.unwrap().protocol(), ProtocolType::StdV1_1);
    assert_eq!(builder.ric("ric1").probes(), vec![ProtocolType::StdV1_1]);
}

#[tokio::test]
async fn test_reset_protocol_forces_new_probe() {
    let builder = MockClientBuilder::new();
    let factory = builder.factory();
    let ric = Ric::new(ric_config("ric1"));
    factory.create_client(&ric).await.unwrap();

    builder.ric("ric1").set_speaks(ProtocolType::OscV1);
    ric.reset_protocol();
    builder.ric("ric1").clear_calls();

    assert_eq!(factory.create_client(&ric).await.unwrap().protocol(), ProtocolType::OscV1);
    assert_eq!(builder.ric("ric1").probes().len(), 3);
}
