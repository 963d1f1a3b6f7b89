//! Collection export with simple filters, as JSON or CSV.

use anyhow::{Context, Result};
use clap::ValueEnum;
use hangar_core::models::{
    AircraftRecord, CommunicationLogEntry, InventoryItem, InventoryStatus, MessagePriority,
    MessageStatus,
};
use hangar_store::{Session, StorageResult};
use serde::Serialize;
use serde_json::Value;
use std::path::Path;

const AIRCRAFT_COLUMNS: [&str; 8] = [
    "aircraft_id",
    "type",
    "latitude",
    "longitude",
    "altitude",
    "speed",
    "heading",
    "last_update",
];
const INVENTORY_COLUMNS: [&str; 5] = ["item_id", "item_name", "quantity", "status", "last_updated"];
const COMMUNICATION_COLUMNS: [&str; 6] =
    ["id", "timestamp", "message_type", "priority", "message", "status"];

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum Collection {
    Aircraft,
    Inventory,
    Communications,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, ValueEnum)]
pub enum ExportFormat {
    #[default]
    Json,
    Csv,
}

/// Filters applied after a full read; an empty list means "no filter".
#[derive(Debug, Clone, Default)]
pub struct ExportFilter {
    pub statuses: Vec<InventoryStatus>,
    /// Case-insensitive match against item name or id.
    pub search: Option<String>,
    pub aircraft_types: Vec<String>,
    pub priorities: Vec<MessagePriority>,
    pub message_statuses: Vec<MessageStatus>,
}

impl ExportFilter {
    pub fn inventory(&self, items: Vec<InventoryItem>) -> Vec<InventoryItem> {
        let needle = self.search.as_ref().map(|s| s.to_lowercase());
        items
            .into_iter()
            .filter(|item| self.statuses.is_empty() || self.statuses.contains(&item.status))
            .filter(|item| match &needle {
                Some(needle) => {
                    item.item_name.to_lowercase().contains(needle)
                        || item.item_id.to_lowercase().contains(needle)
                }
                None => true,
            })
            .collect()
    }

    pub fn aircraft(&self, aircraft: Vec<AircraftRecord>) -> Vec<AircraftRecord> {
        aircraft
            .into_iter()
            .filter(|a| {
                self.aircraft_types.is_empty()
                    || self
                        .aircraft_types
                        .iter()
                        .any(|t| t.eq_ignore_ascii_case(&a.aircraft_type))
            })
            .collect()
    }

    pub fn communications(&self, entries: Vec<CommunicationLogEntry>) -> Vec<CommunicationLogEntry> {
        entries
            .into_iter()
            .filter(|e| self.priorities.is_empty() || self.priorities.contains(&e.priority))
            .filter(|e| {
                self.message_statuses.is_empty() || self.message_statuses.contains(&e.status)
            })
            .collect()
    }
}

/// The filtered contents of one collection.
#[derive(Debug, Clone)]
pub enum Records {
    Aircraft(Vec<AircraftRecord>),
    Inventory(Vec<InventoryItem>),
    Communications(Vec<CommunicationLogEntry>),
}

impl Records {
    pub fn len(&self) -> usize {
        match self {
            Records::Aircraft(r) => r.len(),
            Records::Inventory(r) => r.len(),
            Records::Communications(r) => r.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn to_json(&self) -> serde_json::Result<Value> {
        match self {
            Records::Aircraft(r) => serde_json::to_value(r),
            Records::Inventory(r) => serde_json::to_value(r),
            Records::Communications(r) => serde_json::to_value(r),
        }
    }

    /// One header row, then one row per record in column order.
    pub fn to_csv(&self) -> Result<Vec<u8>> {
        match self {
            Records::Aircraft(r) => write_csv(&AIRCRAFT_COLUMNS, r),
            Records::Inventory(r) => write_csv(&INVENTORY_COLUMNS, r),
            Records::Communications(r) => write_csv(&COMMUNICATION_COLUMNS, r),
        }
    }

    pub fn render(&self, format: ExportFormat) -> Result<Vec<u8>> {
        match format {
            ExportFormat::Json => {
                let mut out = serde_json::to_vec_pretty(&self.to_json()?)?;
                out.push(b'\n');
                Ok(out)
            }
            ExportFormat::Csv => self.to_csv(),
        }
    }

    /// Render and write to `path`, replacing any existing file.
    pub async fn write_file(&self, format: ExportFormat, path: &Path) -> Result<()> {
        let rendered = self.render(format)?;
        tokio::fs::write(path, rendered)
            .await
            .with_context(|| format!("writing export to {}", path.display()))
    }
}

fn write_csv<T: Serialize>(columns: &[&str], records: &[T]) -> Result<Vec<u8>> {
    let mut writer = csv::WriterBuilder::new()
        .has_headers(false)
        .from_writer(Vec::new());
    writer.write_record(columns)?;
    for record in records {
        writer.serialize(record)?;
    }
    Ok(writer.into_inner().map_err(|e| e.into_error())?)
}

/// Read a whole collection and filter it.
pub async fn collect(
    session: &Session,
    collection: Collection,
    filter: &ExportFilter,
) -> StorageResult<Records> {
    let records = match collection {
        Collection::Aircraft => Records::Aircraft(filter.aircraft(session.list_aircraft().await?)),
        Collection::Inventory => {
            Records::Inventory(filter.inventory(session.list_inventory().await?))
        }
        Collection::Communications => Records::Communications(
            filter.communications(session.list_communications(None).await?),
        ),
    };
    Ok(records)
}

/// Read a whole collection, filter it, and render it as a JSON array.
pub async fn export(
    session: &Session,
    collection: Collection,
    filter: &ExportFilter,
) -> Result<Value> {
    Ok(collect(session, collection, filter).await?.to_json()?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use hangar_core::models::NewCommunication;
    use hangar_store::{open, StoreConfig};

    fn items() -> Vec<InventoryItem> {
        vec![
            InventoryItem::new("INV001", "Engine Parts", 5, InventoryStatus::Available),
            InventoryItem::new("INV002", "Avionics", 1, InventoryStatus::InUse),
            InventoryItem::new("INV003", "Landing Gear", 0, InventoryStatus::Maintenance),
        ]
    }

    fn entry(id: i64, priority: MessagePriority, status: MessageStatus) -> CommunicationLogEntry {
        CommunicationLogEntry {
            id,
            timestamp: Utc::now(),
            message_type: "Status Update".into(),
            priority,
            message: format!("message {id}"),
            status,
        }
    }

    #[test]
    fn test_empty_filter_keeps_everything() {
        assert_eq!(ExportFilter::default().inventory(items()).len(), 3);
    }

    #[test]
    fn test_inventory_status_and_search() {
        let filter = ExportFilter {
            statuses: vec![InventoryStatus::Available, InventoryStatus::Maintenance],
            ..Default::default()
        };
        let ids: Vec<_> = filter.inventory(items()).into_iter().map(|i| i.item_id).collect();
        assert_eq!(ids, ["INV001", "INV003"]);

        let filter = ExportFilter {
            search: Some("gear".into()),
            ..Default::default()
        };
        assert_eq!(filter.inventory(items())[0].item_id, "INV003");

        let filter = ExportFilter {
            search: Some("inv002".into()),
            ..Default::default()
        };
        assert_eq!(filter.inventory(items())[0].item_name, "Avionics");
    }

    #[test]
    fn test_aircraft_type_filter() {
        let aircraft = vec![
            AircraftRecord::new("AC001", "F-22", 30.0, -90.0),
            AircraftRecord::new("AC002", "KC-135", 31.0, -91.0),
        ];
        let filter = ExportFilter {
            aircraft_types: vec!["kc-135".into()],
            ..Default::default()
        };
        let kept = filter.aircraft(aircraft);
        assert_eq!(kept.len(), 1);
        assert_eq!(kept[0].aircraft_id, "AC002");
    }

    #[test]
    fn test_communication_status_filter() {
        let entries = vec![
            entry(1, MessagePriority::High, MessageStatus::Pending),
            entry(2, MessagePriority::High, MessageStatus::Acknowledged),
            entry(3, MessagePriority::Low, MessageStatus::Pending),
        ];
        let filter = ExportFilter {
            message_statuses: vec![MessageStatus::Pending],
            ..Default::default()
        };
        let ids: Vec<_> = filter.communications(entries.clone()).iter().map(|e| e.id).collect();
        assert_eq!(ids, [1, 3]);

        let filter = ExportFilter {
            priorities: vec![MessagePriority::High],
            message_statuses: vec![MessageStatus::Pending],
            ..Default::default()
        };
        let ids: Vec<_> = filter.communications(entries).iter().map(|e| e.id).collect();
        assert_eq!(ids, [1]);
    }

    #[test]
    fn test_inventory_csv_columns_and_rows() {
        let records = Records::Inventory(items());
        let csv = String::from_utf8(records.render(ExportFormat::Csv).unwrap()).unwrap();
        let lines: Vec<_> = csv.lines().collect();

        assert_eq!(lines[0], "item_id,item_name,quantity,status,last_updated");
        assert_eq!(lines[1], "INV001,Engine Parts,5,Available,");
        assert_eq!(lines[2], "INV002,Avionics,1,In Use,");
        assert_eq!(lines.len(), 4);
    }

    #[test]
    fn test_empty_csv_keeps_header() {
        let csv = Records::Aircraft(Vec::new()).to_csv().unwrap();
        assert_eq!(
            String::from_utf8(csv).unwrap(),
            "aircraft_id,type,latitude,longitude,altitude,speed,heading,last_update\n"
        );
    }

    #[test]
    fn test_communication_csv_quotes_commas() {
        let mut logged = entry(7, MessagePriority::Medium, MessageStatus::Received);
        logged.message = "hold short, runway 27".into();
        let csv = Records::Communications(vec![logged]).to_csv().unwrap();
        let csv = String::from_utf8(csv).unwrap();

        let row = csv.lines().nth(1).unwrap();
        assert!(row.starts_with("7,"));
        assert!(row.ends_with(",Status Update,Medium,\"hold short, runway 27\",Received"));
    }

    #[tokio::test]
    async fn test_export_communications_by_priority() {
        let dir = tempfile::tempdir().unwrap();
        let session = open(&StoreConfig::file_only(dir.path())).await;
        for (priority, message) in [
            (MessagePriority::High, "engine fire"),
            (MessagePriority::Low, "weather clear"),
            (MessagePriority::High, "intercept"),
        ] {
            let entry =
                NewCommunication::new("Emergency Alert", priority, message, MessageStatus::Received);
            session.append_communication(&entry).await.unwrap();
        }

        let filter = ExportFilter {
            priorities: vec![MessagePriority::High],
            ..Default::default()
        };
        let value = export(&session, Collection::Communications, &filter).await.unwrap();
        let rows = value.as_array().unwrap();
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0]["message"], "intercept");
        assert_eq!(rows[1]["priority"], "High");

        let records = collect(&session, Collection::Communications, &filter).await.unwrap();
        assert_eq!(records.len(), 2);
        let csv = String::from_utf8(records.render(ExportFormat::Csv).unwrap()).unwrap();
        assert_eq!(csv.lines().count(), 3);

        let path = dir.path().join("comms.csv");
        records.write_file(ExportFormat::Csv, &path).await.unwrap();
        assert_eq!(std::fs::read_to_string(&path).unwrap(), csv);

        session.close().await.unwrap();
    }
}
