use std::collections::HashMap;
use std::time::Duration;

use chrono::{DateTime, Utc};
use tokio::time::MissedTickBehavior;
use tracing::{debug, error, info};

use crate::config::TrackerConfig;
use crate::kismet::{DeviceEntry, DeviceQuery, KismetClient, KismetError};
use crate::models::{DeviceLocation, DeviceRecord, ZoneIndex};

use super::sink::{DeviceSighting, DeviceSink};

/// Sniffed wifi traffic says nothing about charge level.
const PLACEHOLDER_BATTERY: u8 = 100;

/// What one poll cycle did.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CycleSummary {
    /// Device entries in the reply
    pub devices: usize,
    /// Sightings forwarded to the sink
    pub updates: usize,
}

/// Periodically queries a Kismet server and forwards fresh, located
/// sightings of allow-listed devices to a sink.
pub struct KismetPoller<S> {
    client: KismetClient,
    query: DeviceQuery,
    interval: Duration,
    zones: ZoneIndex,
    sink: S,
    /// Newest accepted timestamp per MAC, written only when a sighting
    /// is forwarded
    last_seen: HashMap<String, DateTime<Utc>>,
}

impl<S: DeviceSink> KismetPoller<S> {
    pub fn new(client: KismetClient, tracker: &TrackerConfig, zones: ZoneIndex, sink: S) -> Self {
        if tracker.ssids.is_empty() && tracker.clients.is_empty() {
            error!("No SSIDs and no clients configured; the scanner will run but match nothing");
        } else {
            info!(
                "Scanner initialized for {} SSID(s) and {} client(s)",
                tracker.ssids.len(),
                tracker.clients.len()
            );
        }
        Self {
            client,
            query: DeviceQuery::new(&tracker.ssids, &tracker.clients),
            interval: Duration::from_secs(tracker.scan_interval),
            zones,
            sink,
            last_seen: HashMap::new(),
        }
    }

    pub fn sink(&self) -> &S {
        &self.sink
    }

    /// Poll forever at the configured interval. A cycle that outlasts the
    /// interval delays the next tick instead of bursting to catch up.
    pub async fn run(&mut self) {
        let mut ticker = tokio::time::interval(self.interval);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
        loop {
            ticker.tick().await;
            self.poll_once().await;
        }
    }

    /// One scan cycle. Failures are logged, never fatal; the next cycle
    /// starts from the same cache state.
    pub async fn poll_once(&mut self) -> CycleSummary {
        let summary = self.scan().await;
        info!(
            "Kismet scan finished: {} device(s), {} update(s)",
            summary.devices, summary.updates
        );
        summary
    }

    async fn scan(&mut self) -> CycleSummary {
        debug!("Preparing kismet query");
        let reply = match self.client.recent_devices(self.interval, &self.query).await {
            Ok(reply) => reply,
            Err(KismetError::Server { status, message }) => {
                error!("Kismet query failed with status {}: {}", status, message);
                return CycleSummary::default();
            }
            Err(KismetError::Parse(message)) => {
                error!("Got an error in the kismet reply: {}", message);
                return CycleSummary::default();
            }
            Err(err) => {
                error!("Error connecting to kismet instance: {}", err);
                return CycleSummary::default();
            }
        };
        if reply.is_empty() {
            error!("Kismet reply contained no devices");
            return CycleSummary::default();
        }

        let now = Utc::now();
        let mut summary = CycleSummary {
            devices: reply.len(),
            updates: 0,
        };
        for value in reply {
            let entry: DeviceEntry = match serde_json::from_value(value) {
                Ok(entry) => entry,
                Err(err) => {
                    error!("Skipping undecodable device entry: {}", err);
                    continue;
                }
            };
            debug!("Found device {}", entry.macaddr);
            if self.track(entry.into_record(), now) {
                summary.updates += 1;
            }
        }
        summary
    }

    /// Apply the location and staleness gates; forward to the sink when
    /// both pass. Returns whether the sighting was forwarded.
    fn track(&mut self, record: DeviceRecord, now: DateTime<Utc>) -> bool {
        let fix = match record.location {
            DeviceLocation::Valid(fix) => fix,
            DeviceLocation::Missing => {
                error!("{}: Location information missing", record.mac);
                return false;
            }
            DeviceLocation::Invalid(reason) => {
                error!("{}: GPS data invalid: {}", record.mac, reason);
                return false;
            }
        };

        // A first sighting without a timestamp counts as observed right now;
        // a re-sighting must carry one to prove it is newer.
        let previous = self.last_seen.get(&record.mac).copied();
        let observed = match record.last_seen {
            Some(observed) => observed,
            None if previous.is_none() => now,
            None => {
                debug!("{}: reply carries no timestamp, already reported", record.mac);
                return false;
            }
        };
        if let Some(previous) = previous {
            if observed <= previous {
                debug!("{}: already reported at {}", record.mac, previous);
                return false;
            }
        }
        debug!("Updating {} at ({}, {})", record.mac, fix.latitude, fix.longitude);
        self.last_seen.insert(record.mac.clone(), observed);

        let location_name = self
            .zones
            .active_zone(fix.latitude, fix.longitude, fix.accuracy.unwrap_or(0.0))
            .map(|zone| zone.name.clone());
        self.sink.see(DeviceSighting {
            dev_id: record.mac.clone(),
            latitude: fix.latitude,
            longitude: fix.longitude,
            location_name,
            gps_accuracy: fix.accuracy,
            battery: PLACEHOLDER_BATTERY,
            mac: record.mac,
            host_name: record.name,
            attributes: HashMap::new(),
            picture: None,
        });
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Zone;
    use mockito::{Mock, ServerGuard};
    use serde_json::json;

    const DEVICES_PATH: &str = "/devices/last-time/-30/devices.json";

    #[derive(Debug, Default)]
    struct RecordingSink {
        sightings: Vec<DeviceSighting>,
    }

    impl DeviceSink for RecordingSink {
        fn see(&mut self, sighting: DeviceSighting) {
            self.sightings.push(sighting);
        }
    }

    fn located_device(last_time: Option<i64>) -> serde_json::Value {
        let mut device = json!({
            "kismet.device.base.macaddr": "AA:BB:CC:DD:EE:FF",
            "kismet.device.base.name": "MyPhone",
            "dot11.probedssid.location": 1,
            "dot11.probedssid.gps": {
                "kismet.common.location.loc_valid": 1,
                "kismet.common.location.avg_lat": 37_774_900,
                "kismet.common.location.avg_lon": -122_419_400,
                "kismet.common.location.fix": 12.5
            }
        });
        if let Some(ts) = last_time {
            device["kismet.device.base.last_time"] = json!(ts);
        }
        device
    }

    async fn mock_reply(server: &mut ServerGuard, body: serde_json::Value) -> Mock {
        server
            .mock("POST", DEVICES_PATH)
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(body.to_string())
            .create_async()
            .await
    }

    fn poller_for(url: &str) -> KismetPoller<RecordingSink> {
        poller_with_zones(url, ZoneIndex::default())
    }

    fn poller_with_zones(url: &str, zones: ZoneIndex) -> KismetPoller<RecordingSink> {
        let tracker = TrackerConfig {
            scan_interval: 30,
            ssids: Vec::new(),
            clients: vec!["aa:bb:cc:dd:ee:ff".to_string()],
        };
        KismetPoller::new(
            KismetClient::new(url, "kismet", "kismet"),
            &tracker,
            zones,
            RecordingSink::default(),
        )
    }

    #[tokio::test]
    async fn located_device_produces_one_sighting() {
        let mut server = mockito::Server::new_async().await;
        let mock = mock_reply(&mut server, json!([located_device(None)])).await;

        let mut poller = poller_for(&server.url());
        let summary = poller.poll_once().await;

        assert_eq!(summary.devices, 1);
        assert_eq!(summary.updates, 1);
        let sightings = &poller.sink().sightings;
        assert_eq!(sightings.len(), 1);
        let sighting = &sightings[0];
        assert_eq!(sighting.dev_id, "AA:BB:CC:DD:EE:FF");
        assert_eq!(sighting.mac, "AA:BB:CC:DD:EE:FF");
        assert_eq!(sighting.host_name, "MyPhone");
        assert!((sighting.latitude - 37.7749).abs() < 1e-6);
        assert!((sighting.longitude + 122.4194).abs() < 1e-6);
        assert_eq!(sighting.gps_accuracy, Some(12.5));
        assert_eq!(sighting.battery, 100);
        assert_eq!(sighting.location_name, None);
        assert!(sighting.attributes.is_empty());
        assert_eq!(sighting.picture, None);
        mock.assert_async().await;
    }

    #[tokio::test]
    async fn repeated_timestamp_is_reported_once() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("POST", DEVICES_PATH)
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(json!([located_device(Some(1_700_000_100))]).to_string())
            .expect(2)
            .create_async()
            .await;

        let mut poller = poller_for(&server.url());
        poller.poll_once().await;
        let second = poller.poll_once().await;

        assert_eq!(second.devices, 1);
        assert_eq!(second.updates, 0);
        assert_eq!(poller.sink().sightings.len(), 1);
        mock.assert_async().await;
    }

    #[tokio::test]
    async fn replayed_payload_without_timestamp_is_reported_once() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("POST", DEVICES_PATH)
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(json!([located_device(None)]).to_string())
            .expect(2)
            .create_async()
            .await;

        let mut poller = poller_for(&server.url());
        let first = poller.poll_once().await;
        let second = poller.poll_once().await;

        assert_eq!(first.updates, 1);
        assert_eq!(second.updates, 0);
        assert_eq!(poller.sink().sightings.len(), 1);
        mock.assert_async().await;
    }

    #[tokio::test]
    async fn newer_timestamp_is_reported_again() {
        let mut server = mockito::Server::new_async().await;
        let first = mock_reply(&mut server, json!([located_device(Some(1_700_000_100))])).await;

        let mut poller = poller_for(&server.url());
        poller.poll_once().await;

        first.remove_async().await;
        mock_reply(&mut server, json!([located_device(Some(1_700_000_200))])).await;
        let second = poller.poll_once().await;

        assert_eq!(second.updates, 1);
        assert_eq!(poller.sink().sightings.len(), 2);
    }

    #[tokio::test]
    async fn stale_timestamp_is_ignored() {
        let mut server = mockito::Server::new_async().await;
        let first = mock_reply(&mut server, json!([located_device(Some(1_700_000_200))])).await;

        let mut poller = poller_for(&server.url());
        poller.poll_once().await;

        first.remove_async().await;
        mock_reply(&mut server, json!([located_device(Some(1_700_000_100))])).await;
        let second = poller.poll_once().await;

        assert_eq!(second.updates, 0);
        assert_eq!(poller.sink().sightings.len(), 1);
    }

    #[tokio::test]
    async fn server_error_cycle_reports_nothing() {
        let mut server = mockito::Server::new_async().await;
        let failing = server
            .mock("POST", DEVICES_PATH)
            .with_status(500)
            .with_body("boom")
            .create_async()
            .await;

        let mut poller = poller_for(&server.url());
        let summary = poller.poll_once().await;
        assert_eq!(summary, CycleSummary::default());
        assert!(poller.sink().sightings.is_empty());

        // The failed cycle must not have touched the staleness cache
        failing.remove_async().await;
        mock_reply(&mut server, json!([located_device(Some(1_700_000_100))])).await;
        let recovered = poller.poll_once().await;
        assert_eq!(recovered.updates, 1);
    }

    #[tokio::test]
    async fn connection_refused_yields_no_sightings() {
        let mut poller = poller_for("http://127.0.0.1:9");
        let summary = poller.poll_once().await;

        assert_eq!(summary, CycleSummary::default());
        assert!(poller.sink().sightings.is_empty());
    }

    #[tokio::test]
    async fn invalid_location_flag_suppresses_the_sighting() {
        let mut server = mockito::Server::new_async().await;
        let mut device = located_device(None);
        device["dot11.probedssid.gps"]["kismet.common.location.loc_valid"] = json!(0);
        mock_reply(&mut server, json!([device])).await;

        let mut poller = poller_for(&server.url());
        let summary = poller.poll_once().await;

        assert_eq!(summary.devices, 1);
        assert_eq!(summary.updates, 0);
        assert!(poller.sink().sightings.is_empty());
    }

    #[tokio::test]
    async fn empty_reply_is_an_error_not_a_panic() {
        let mut server = mockito::Server::new_async().await;
        mock_reply(&mut server, json!([])).await;

        let mut poller = poller_for(&server.url());
        let summary = poller.poll_once().await;

        assert_eq!(summary, CycleSummary::default());
    }

    #[tokio::test]
    async fn garbled_reply_body_reports_nothing() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("POST", DEVICES_PATH)
            .with_status(200)
            .with_body("{}")
            .create_async()
            .await;

        let mut poller = poller_for(&server.url());
        let summary = poller.poll_once().await;

        assert_eq!(summary, CycleSummary::default());
        assert!(poller.sink().sightings.is_empty());
    }

    #[tokio::test]
    async fn undecodable_entries_do_not_poison_the_cycle() {
        let mut server = mockito::Server::new_async().await;
        let body = json!([
            {"kismet.device.base.macaddr": 12345},
            located_device(None)
        ]);
        mock_reply(&mut server, body).await;

        let mut poller = poller_for(&server.url());
        let summary = poller.poll_once().await;

        assert_eq!(summary.devices, 2);
        assert_eq!(summary.updates, 1);
        assert_eq!(poller.sink().sightings.len(), 1);
    }

    #[tokio::test]
    async fn sighting_inside_a_zone_carries_its_name() {
        let mut server = mockito::Server::new_async().await;
        mock_reply(&mut server, json!([located_device(None)])).await;

        let zones = ZoneIndex::new(vec![Zone::new("home", 37.7749, -122.4194, 100.0)]);
        let mut poller = poller_with_zones(&server.url(), zones);
        poller.poll_once().await;

        let sightings = &poller.sink().sightings;
        assert_eq!(sightings.len(), 1);
        assert_eq!(sightings[0].location_name.as_deref(), Some("home"));
    }
}
