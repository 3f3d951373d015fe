use serde::Serialize;
use tracing::debug;

pub const FIELD_MACADDR: &str = "kismet.device.base.macaddr";
pub const FIELD_NAME: &str = "kismet.device.base.name";
pub const FIELD_LAST_TIME: &str = "kismet.device.base.last_time";

const ADVERTISED_GPS_FIELD: &str = "dot11.device/dot11.device.last_beaconed_ssid_record\
/dot11.advertisedssid.location/kismet.common.location.avg_loc";
const PROBED_GPS_FIELD: &str = "dot11.device/dot11.device.last_probed_ssid_record\
/dot11.probedssid.location/kismet.common.location.avg_loc";

/// Server-side filter and field projection for the device summary endpoint.
#[derive(Debug, Clone, Serialize)]
pub struct DeviceQuery {
    /// Field/pattern pairs the server matches with its regex engine
    pub regex: Vec<(String, String)>,
    /// Fields the server projects into the reply
    pub fields: Vec<String>,
}

impl DeviceQuery {
    /// One matcher per configured SSID and client MAC. GPS fields are only
    /// requested for the list kinds actually in use, which keeps the reply
    /// small on busy servers.
    pub fn new(ssids: &[String], clients: &[String]) -> Self {
        let mut regex = Vec::with_capacity(ssids.len() + clients.len());
        for ssid in ssids {
            debug!("Adding SSID {}", ssid);
            regex.push((FIELD_NAME.to_string(), ssid.clone()));
        }
        for client in clients {
            debug!("Adding client {}", client);
            regex.push((FIELD_MACADDR.to_string(), client.to_uppercase()));
        }

        let mut fields = vec![
            FIELD_MACADDR.to_string(),
            FIELD_NAME.to_string(),
            FIELD_LAST_TIME.to_string(),
        ];
        if !ssids.is_empty() {
            fields.push(ADVERTISED_GPS_FIELD.to_string());
        }
        if !clients.is_empty() {
            fields.push(PROBED_GPS_FIELD.to_string());
        }

        Self { regex, fields }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn one_matcher_per_ssid_and_client() {
        let query = DeviceQuery::new(
            &["MyPhone.*".to_string()],
            &["aa:bb:cc:dd:ee:ff".to_string()],
        );
        assert_eq!(
            query.regex,
            vec![
                (FIELD_NAME.to_string(), "MyPhone.*".to_string()),
                (FIELD_MACADDR.to_string(), "AA:BB:CC:DD:EE:FF".to_string()),
            ]
        );
    }

    #[test]
    fn projection_tracks_configured_lists() {
        let ssids_only = DeviceQuery::new(&["Net".to_string()], &[]);
        assert_eq!(ssids_only.fields.len(), 4);
        assert!(ssids_only.fields[3].contains("advertisedssid"));

        let clients_only = DeviceQuery::new(&[], &["aa:bb:cc:dd:ee:ff".to_string()]);
        assert_eq!(clients_only.fields.len(), 4);
        assert!(clients_only.fields[3].contains("probedssid"));

        let both = DeviceQuery::new(&["Net".to_string()], &["aa:bb:cc:dd:ee:ff".to_string()]);
        assert_eq!(both.fields.len(), 5);
    }

    #[test]
    fn serializes_as_field_pattern_pairs() {
        let query = DeviceQuery::new(&[], &["aa:bb:cc:dd:ee:ff".to_string()]);
        let encoded = serde_json::to_string(&query).unwrap();
        assert!(encoded.contains(r#"["kismet.device.base.macaddr","AA:BB:CC:DD:EE:FF"]"#));
        assert!(encoded.starts_with(r#"{"regex":"#));
    }
}
