// SPDX-License-Identifier: PolyForm-Noncommercial-1.0.0
// Copyright (c) 2025 Sylvex. All rights reserved.

//! # Service Integration Tests
//!
//! Integration tests for the async `SessionService` wrapper:
//!
//! - Operations routed through the blocking pool
//! - Concurrent detection rejection
//! - Operation timeouts
//! - Shared metrics

use std::time::Duration;

use sunbridge_core::{
    DetectionError, DeviceHandle, InverterSession, SessionError, SessionOptions, SessionService,
    SessionState,
};
use sunbridge_tests::prelude::*;

fn service(sdk: &MockSdk) -> SessionService {
    init_test_logging();
    SessionService::new(InverterSession::new(sdk.boxed(), SessionOptions::default()))
}

// =============================================================================
// Basic Flow
// =============================================================================

#[tokio::test]
async fn test_service_full_flow() {
    let sdk = BusFixtures::two_inverters();
    let ini = DriverConfigFixture::new();
    let service = service(&sdk);

    service.initialize(ini.path()).await.unwrap();
    service.detect_devices(Some(2)).await.unwrap();

    let devices = service.get_devices().await.unwrap();
    assert_eq!(devices.len(), 2);

    let snapshot = service
        .get_device_data(BusFixtures::INVERTER_NAME)
        .await
        .unwrap();
    snapshot.assert_reading("Pac", 1520.0);

    let info = service
        .get_channel_info(BusFixtures::INVERTER_NAME, "Plimit")
        .await
        .unwrap();
    assert_eq!(info.range(), BusFixtures::plimit_range());

    service
        .set_channel_value(DeviceHandle::new(BusFixtures::INVERTER_HANDLE), "Plimit", 2500.0)
        .await
        .unwrap()
        .assert_written();

    service.shutdown().await.unwrap();
    service.shutdown().await.unwrap();
    assert_eq!(service.try_state(), Some(SessionState::Closed));
    assert!(!sdk.is_master_up());
}

#[tokio::test]
async fn test_service_errors_pass_through() {
    let sdk = BusFixtures::single_inverter();
    let service = service(&sdk);

    let result = service.get_devices().await;
    assert!(matches!(result, Err(SessionError::NotInitialized)));
    assert!(sdk.calls().is_empty());
}

#[tokio::test]
async fn test_service_clones_share_session() {
    let sdk = BusFixtures::single_inverter();
    let ini = DriverConfigFixture::new();
    let service = service(&sdk);
    let clone = service.clone();

    service.initialize(ini.path()).await.unwrap();
    clone.detect_devices(None).await.unwrap();

    assert_eq!(clone.get_devices().await.unwrap().len(), 1);
    assert_eq!(service.metrics().detections_total, 1);
}

// =============================================================================
// Concurrent Detection
// =============================================================================

#[tokio::test]
async fn test_service_concurrent_detection_rejected() {
    let sdk = BusFixtures::single_inverter().with_detection_delay(Duration::from_millis(200));
    let ini = DriverConfigFixture::new();
    let service = service(&sdk);
    service.initialize(ini.path()).await.unwrap();

    let (first, second) = tokio::join!(service.detect_devices(None), service.detect_devices(None));

    assert!(first.is_ok());
    assert!(matches!(
        second,
        Err(SessionError::Detection(DetectionError::InProgress))
    ));
    assert_eq!(sdk.call_count("start_detection"), 1);
    assert!(!service.is_detecting());
}

#[tokio::test]
async fn test_service_detection_flag_reset_after_failure() {
    let sdk = BusFixtures::single_inverter().with_detection_status(-42);
    let ini = DriverConfigFixture::new();
    let service = service(&sdk);
    service.initialize(ini.path()).await.unwrap();

    assert!(service.detect_devices(None).await.is_err());
    assert!(!service.is_detecting());

    // A second pass is accepted and reaches the bus.
    assert!(service.detect_devices(None).await.is_err());
    assert_eq!(sdk.call_count("start_detection"), 2);
}

#[tokio::test]
async fn test_service_detection_flag_reset_after_precondition_error() {
    let sdk = BusFixtures::single_inverter();
    let service = service(&sdk);

    let result = service.detect_devices(None).await;
    assert!(matches!(result, Err(SessionError::NotInitialized)));
    assert!(!service.is_detecting());
}

// =============================================================================
// Timeouts
// =============================================================================

#[tokio::test]
async fn test_service_operation_timeout() {
    let sdk = BusFixtures::single_inverter().with_detection_delay(Duration::from_millis(300));
    let ini = DriverConfigFixture::new();
    let service = service(&sdk).with_timeout(Duration::from_millis(50));
    assert_eq!(service.timeout(), Some(Duration::from_millis(50)));

    service.initialize(ini.path()).await.unwrap();

    let result = service.detect_devices(None).await;
    match result {
        Err(ref e @ SessionError::Timeout { .. }) => assert!(e.is_retryable()),
        other => panic!("Expected timeout, got {:?}", other),
    }

    // The bus call keeps running; the session is busy until it returns.
    assert!(service.is_detecting());
    assert_eq!(service.try_state(), None);

    tokio::time::sleep(Duration::from_millis(400)).await;
    assert!(!service.is_detecting());
    assert_eq!(service.try_state(), Some(SessionState::Ready));
    assert_eq!(service.get_devices().await.unwrap().len(), 1);
}

#[tokio::test]
async fn test_service_shutdown_ignores_timeout() {
    let sdk = BusFixtures::single_inverter();
    let ini = DriverConfigFixture::new();
    let service = service(&sdk).with_timeout(Duration::from_millis(50));

    service.initialize(ini.path()).await.unwrap();
    service.shutdown().await.unwrap();

    assert!(!sdk.is_master_up());
}

// =============================================================================
// Metrics
// =============================================================================

#[tokio::test]
async fn test_service_metrics_without_lock() {
    let sdk = BusFixtures::single_inverter();
    let ini = DriverConfigFixture::new();
    let service = service(&sdk);

    service.initialize(ini.path()).await.unwrap();
    service.detect_devices(None).await.unwrap();
    service
        .get_device_data(BusFixtures::INVERTER_NAME)
        .await
        .unwrap();
    service
        .set_channel_value(BusFixtures::INVERTER_NAME, "Plimit", 1e6)
        .await
        .unwrap()
        .assert_rejected(BusFixtures::plimit_range());

    let metrics = service.metrics();
    assert_eq!(metrics.detections_total, 1);
    assert_eq!(metrics.polls_total, 1);
    assert_eq!(metrics.channels_read, 4);
    assert_eq!(metrics.writes_rejected, 1);

    let json = serde_json::to_value(&metrics).unwrap();
    assert_eq!(json["polls_total"], 1);
}
