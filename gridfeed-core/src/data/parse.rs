//! Load and trade parsers: NYISO CSV text → tagged records.
//!
//! Both parsers resolve every local timestamp to UTC before grouping, so the
//! repeated fall-back hour produces distinct rows instead of being merged.

use super::provider::DataError;
use super::table::{group_sum, parse_number, Pivot, Table};
use crate::domain::{Measurement, Record, RecordTags};
use crate::tz::{self, DstHint};
use chrono::{DateTime, NaiveDateTime, Utc};
use std::collections::HashMap;

/// Signature shared by both parsers.
pub type Parser = fn(&str, &RecordTags) -> Result<Vec<Record>, DataError>;

pub const LOAD_TIMESTAMP: &str = "Time Stamp";
pub const LOAD_TIME_ZONE: &str = "Time Zone";
pub const LOAD_ZONE_NAME: &str = "Name";
pub const LOAD_VALUE: &str = "Load";

pub const TRADE_TIMESTAMP: &str = "Timestamp";
pub const TRADE_INTERFACE: &str = "Interface Name";
pub const TRADE_FLOW: &str = "Flow (MWH)";

/// A neighboring balancing authority and its scheduled tie-line interfaces.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Neighbor {
    pub name: &'static str,
    pub interfaces: &'static [&'static str],
}

/// Scheduled interfaces that cross the NYISO boundary. Internal interfaces
/// in the same file never count toward imports or exports.
pub const EXTERNAL_NEIGHBORS: [Neighbor; 4] = [
    Neighbor {
        name: "HQ",
        interfaces: &["SCH - HQ - NY", "SCH - HQ_CEDARS", "SCH - HQ_IMPORT_EXPORT"],
    },
    Neighbor {
        name: "ISONE",
        interfaces: &["SCH - NE - NY", "SCH - NPX_1385", "SCH - NPX_CSC"],
    },
    Neighbor {
        name: "IESO",
        interfaces: &["SCH - OH - NY"],
    },
    Neighbor {
        name: "PJM",
        interfaces: &[
            "SCH - PJ - NY",
            "SCH - PJM_HTP",
            "SCH - PJM_NEPTUNE",
            "SCH - PJM_VFT",
        ],
    },
];

/// All external interfaces, neighbor by neighbor.
pub fn external_interfaces() -> Vec<&'static str> {
    EXTERNAL_NEIGHBORS
        .iter()
        .flat_map(|n| n.interfaces.iter().copied())
        .collect()
}

/// Assigns DST sides to repeated local times when the file has no zone column.
///
/// Files are chronological, so when a (local time, series) pair appears more
/// than once the first occurrence is daylight time and later ones are
/// standard time. A pair seen only once gets no hint and falls back to
/// standard time in `tz::utcify`.
struct RepeatTracker {
    counts: HashMap<(NaiveDateTime, String), (usize, usize)>,
}

impl RepeatTracker {
    fn new<'a>(keys: impl IntoIterator<Item = (NaiveDateTime, &'a str)>) -> Self {
        let mut counts: HashMap<(NaiveDateTime, String), (usize, usize)> = HashMap::new();
        for (local, series) in keys {
            counts.entry((local, series.to_string())).or_default().0 += 1;
        }
        Self { counts }
    }

    fn hint(&mut self, local: NaiveDateTime, series: &str) -> Option<DstHint> {
        let (total, seen) = self.counts.get_mut(&(local, series.to_string()))?;
        *seen += 1;
        match (*total, *seen) {
            (1, _) => None,
            (_, 1) => Some(DstHint::Daylight),
            _ => Some(DstHint::Standard),
        }
    }
}

/// Parse the timestamp column of every row up front.
fn local_timestamps(table: &Table, ts_col: usize) -> Result<Vec<NaiveDateTime>, DataError> {
    table
        .rows()
        .map(|row| Ok(tz::parse_local_timestamp(row.get(ts_col).unwrap_or_default())?))
        .collect()
}

/// Total load per timestamp, summed across zones.
///
/// Blank `Load` cells count as zero, so a timestamp whose cells are all blank
/// still yields a record with `load: 0.0`.
pub fn parse_load(content: &str, tags: &RecordTags) -> Result<Vec<Record>, DataError> {
    let table = Table::from_csv(content)?;
    let ts_col = table.column(LOAD_TIMESTAMP)?;
    let load_col = table.column(LOAD_VALUE)?;
    let tz_col = table.optional_column(LOAD_TIME_ZONE);
    let name_col = table.optional_column(LOAD_ZONE_NAME);

    let locals = local_timestamps(&table, ts_col)?;
    let mut tracker = match (tz_col, name_col) {
        (None, Some(i)) => Some(RepeatTracker::new(
            locals
                .iter()
                .zip(table.rows())
                .map(|(local, row)| (*local, row.get(i).unwrap_or_default())),
        )),
        _ => None,
    };
    let mut pairs: Vec<(DateTime<Utc>, f64)> = Vec::with_capacity(table.len());

    for (local, row) in locals.into_iter().zip(table.rows()) {
        let hint = match (tz_col, name_col, tracker.as_mut()) {
            (Some(i), _, _) => DstHint::from_abbreviation(row.get(i).unwrap_or_default()),
            (None, Some(i), Some(t)) => t.hint(local, row.get(i).unwrap_or_default()),
            _ => None,
        };
        let timestamp = tz::utcify(local, hint)?;
        let load = parse_number(row, load_col, LOAD_VALUE)?;
        pairs.push((timestamp, load.unwrap_or(0.0)));
    }

    Ok(group_sum(pairs)
        .into_iter()
        .map(|(timestamp, load)| Record::new(timestamp, Measurement::Load(load), tags))
        .collect())
}

/// Imports and exports per timestamp across external interfaces.
///
/// Emits an `imp_MW` record (sum of positive flows) followed by an `exp_MW`
/// record (magnitude of the sum of negative flows) for every timestamp.
/// Blank flow cells still register their timestamp and interface but
/// contribute nothing to either sum.
pub fn parse_trade(content: &str, tags: &RecordTags) -> Result<Vec<Record>, DataError> {
    let table = Table::from_csv(content)?;
    let ts_col = table.column(TRADE_TIMESTAMP)?;
    let iface_col = table.column(TRADE_INTERFACE)?;
    let flow_col = table.column(TRADE_FLOW)?;

    let locals = local_timestamps(&table, ts_col)?;
    let mut tracker = RepeatTracker::new(
        locals
            .iter()
            .zip(table.rows())
            .map(|(local, row)| (*local, row.get(iface_col).unwrap_or_default())),
    );
    let mut entries = Vec::with_capacity(table.len());

    for (local, row) in locals.into_iter().zip(table.rows()) {
        let interface = row.get(iface_col).unwrap_or_default();
        let timestamp = tz::utcify(local, tracker.hint(local, interface))?;
        let flow = parse_number(row, flow_col, TRADE_FLOW)?;
        entries.push((timestamp, interface.to_string(), flow));
    }

    let pivot = Pivot::build(entries)?;
    let interfaces = external_interfaces();
    let rows = pivot.project(&interfaces)?;

    let mut records = Vec::with_capacity(rows.len() * 2);
    for (timestamp, flows) in rows {
        let (imports, exports) = split_flows(flows);
        records.push(Record::new(timestamp, Measurement::ImportMw(imports), tags));
        records.push(Record::new(timestamp, Measurement::ExportMw(exports), tags));
    }
    Ok(records)
}

/// (sum of positive flows, |sum of negative flows|). Missing cells are skipped.
pub fn split_flows(flows: impl IntoIterator<Item = Option<f64>>) -> (f64, f64) {
    let (imports, exports) = flows
        .into_iter()
        .flatten()
        .fold((0.0, 0.0), |(imp, exp), f| {
            if f > 0.0 {
                (imp + f, exp)
            } else if f < 0.0 {
                (imp, exp + f)
            } else {
                (imp, exp)
            }
        });
    (imports, f64::abs(exports))
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn utc(y: i32, m: u32, d: u32, h: u32, min: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(y, m, d, h, min, 0).unwrap()
    }

    /// Trade CSV with every external interface at `flow` except the overrides.
    fn trade_csv(rows: &[(&str, &[(&str, f64)])]) -> String {
        let mut out = String::from("Timestamp,Interface Name,Point ID,Flow (MWH)\n");
        for (ts, overrides) in rows {
            for iface in external_interfaces() {
                let flow = overrides
                    .iter()
                    .find(|(name, _)| *name == iface)
                    .map(|(_, f)| *f)
                    .unwrap_or(0.0);
                out.push_str(&format!("{ts},{iface},1,{flow}\n"));
            }
        }
        out
    }

    #[test]
    fn allow_list_has_eleven_interfaces_in_four_groups() {
        assert_eq!(EXTERNAL_NEIGHBORS.len(), 4);
        assert_eq!(external_interfaces().len(), 11);
        for neighbor in EXTERNAL_NEIGHBORS {
            assert!(!neighbor.interfaces.is_empty() && neighbor.interfaces.len() <= 4);
        }
    }

    #[test]
    fn load_sums_zones_per_timestamp() {
        let csv = "\
\"Time Stamp\",\"Time Zone\",\"Name\",\"PTID\",\"Load\"
01/01/2021 00:05:00,EST,CAPITL,61757,120.0
01/01/2021 00:05:00,EST,CENTRL,61754,130.0
01/01/2021 00:10:00,EST,CAPITL,61757,121.5
";
        let records = parse_load(csv, &RecordTags::default()).unwrap();
        assert_eq!(records.len(), 2);
        assert_eq!(records[0].timestamp, utc(2021, 1, 1, 5, 5));
        assert_eq!(records[0].measurement, Measurement::Load(250.0));
        assert_eq!(records[0].ba_name, "NYISO");
        assert_eq!(records[1].timestamp, utc(2021, 1, 1, 5, 10));
        assert_eq!(records[1].value(), 121.5);
    }

    #[test]
    fn load_output_is_sorted_even_if_input_is_not() {
        let csv = "Time Stamp,Load\n01/01/2021 00:10:00,2\n01/01/2021 00:05:00,1\n";
        let records = parse_load(csv, &RecordTags::default()).unwrap();
        assert!(records[0].timestamp < records[1].timestamp);
    }

    #[test]
    fn load_keeps_repeated_fall_back_hour_distinct() {
        let csv = "\
Time Stamp,Time Zone,Name,Load
11/07/2021 01:00:00,EDT,CAPITL,100
11/07/2021 01:00:00,EST,CAPITL,90
";
        let records = parse_load(csv, &RecordTags::default()).unwrap();
        assert_eq!(records.len(), 2);
        assert_eq!(records[0].timestamp, utc(2021, 11, 7, 5, 0));
        assert_eq!(records[0].value(), 100.0);
        assert_eq!(records[1].timestamp, utc(2021, 11, 7, 6, 0));
        assert_eq!(records[1].value(), 90.0);
    }

    #[test]
    fn load_without_zone_column_uses_occurrence_order() {
        let csv = "\
Time Stamp,Name,Load
11/07/2021 01:00:00,CAPITL,100
11/07/2021 01:00:00,CENTRL,1
11/07/2021 01:00:00,CAPITL,90
";
        let records = parse_load(csv, &RecordTags::default()).unwrap();
        assert_eq!(records.len(), 2);
        assert_eq!(records[0].value(), 101.0);
        assert_eq!(records[1].value(), 90.0);
    }

    #[test]
    fn load_single_ambiguous_time_without_zone_column_is_standard() {
        let csv = "Time Stamp,Name,Load\n11/07/2021 01:00:00,CAPITL,100\n";
        let records = parse_load(csv, &RecordTags::default()).unwrap();
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].timestamp, utc(2021, 11, 7, 6, 0));
    }

    #[test]
    fn load_blank_cells_count_as_zero() {
        let csv = "Time Stamp,Load\n01/01/2021 00:05:00,\n01/01/2021 00:10:00,5\n";
        let records = parse_load(csv, &RecordTags::default()).unwrap();
        assert_eq!(records.len(), 2);
        assert_eq!(records[0].timestamp, utc(2021, 1, 1, 5, 5));
        assert_eq!(records[0].measurement, Measurement::Load(0.0));
        assert_eq!(records[1].measurement, Measurement::Load(5.0));
    }

    #[test]
    fn load_missing_column_is_data_shape_error() {
        let err = parse_load("Timestamp,Load\n01/01/2021 00:05:00,1\n", &RecordTags::default())
            .unwrap_err();
        assert!(matches!(err, DataError::MissingColumn(c) if c == "Time Stamp"));
    }

    #[test]
    fn load_bad_timestamp_is_error() {
        let err = parse_load("Time Stamp,Load\nnot a time,1\n", &RecordTags::default()).unwrap_err();
        assert!(matches!(err, DataError::InvalidTimestamp(_)));
    }

    #[test]
    fn load_header_only_is_empty() {
        let records = parse_load("Time Stamp,Load\n", &RecordTags::default()).unwrap();
        assert!(records.is_empty());
    }

    #[test]
    fn trade_splits_imports_and_exports() {
        let csv = trade_csv(&[(
            "01/01/2021 00:05:00",
            &[("SCH - HQ - NY", 50.0), ("SCH - NE - NY", -30.0)],
        )]);
        let records = parse_trade(&csv, &RecordTags::default()).unwrap();
        assert_eq!(records.len(), 2);
        assert_eq!(records[0].timestamp, utc(2021, 1, 1, 5, 5));
        assert_eq!(records[0].measurement, Measurement::ImportMw(50.0));
        assert_eq!(records[1].timestamp, utc(2021, 1, 1, 5, 5));
        assert_eq!(records[1].measurement, Measurement::ExportMw(30.0));
    }

    #[test]
    fn trade_ignores_internal_interfaces() {
        let mut csv = trade_csv(&[("01/01/2021 00:05:00", &[("SCH - PJM_HTP", 10.0)])]);
        csv.push_str("01/01/2021 00:05:00,CENTRAL EAST,2,5000\n");
        csv.push_str("01/01/2021 00:05:00,TOTAL EAST,3,-7000\n");
        let records = parse_trade(&csv, &RecordTags::default()).unwrap();
        assert_eq!(records[0].value(), 10.0);
        assert_eq!(records[1].value(), 0.0);
    }

    #[test]
    fn trade_missing_interface_is_error() {
        let csv = "Timestamp,Interface Name,Flow (MWH)\n01/01/2021 00:05:00,SCH - HQ - NY,5\n";
        let err = parse_trade(csv, &RecordTags::default()).unwrap_err();
        assert!(matches!(err, DataError::MissingPivotColumn(_)));
    }

    #[test]
    fn trade_missing_interface_column_is_error() {
        let err = parse_trade("Timestamp,Flow (MWH)\n", &RecordTags::default()).unwrap_err();
        assert!(matches!(err, DataError::MissingColumn(c) if c == "Interface Name"));
    }

    #[test]
    fn trade_sparse_cells_contribute_nothing() {
        let mut csv = trade_csv(&[("01/01/2021 00:05:00", &[("SCH - OH - NY", 7.0)])]);
        csv.push_str("01/01/2021 00:10:00,SCH - OH - NY,1,-4\n");
        let records = parse_trade(&csv, &RecordTags::default()).unwrap();
        assert_eq!(records.len(), 4);
        assert_eq!(records[2].measurement, Measurement::ImportMw(0.0));
        assert_eq!(records[3].measurement, Measurement::ExportMw(4.0));
    }

    #[test]
    fn trade_fall_back_hour_repeats_are_distinct() {
        let csv = trade_csv(&[
            ("11/07/2021 01:00", &[("SCH - HQ - NY", 1.0)]),
            ("11/07/2021 01:00", &[("SCH - HQ - NY", 2.0)]),
        ]);
        let records = parse_trade(&csv, &RecordTags::default()).unwrap();
        assert_eq!(records.len(), 4);
        assert_eq!(records[0].timestamp, utc(2021, 11, 7, 5, 0));
        assert_eq!(records[0].value(), 1.0);
        assert_eq!(records[2].timestamp, utc(2021, 11, 7, 6, 0));
        assert_eq!(records[2].value(), 2.0);
    }

    #[test]
    fn trade_single_ambiguous_time_is_standard() {
        let csv = trade_csv(&[("11/07/2021 01:00", &[("SCH - HQ - NY", 3.0)])]);
        let records = parse_trade(&csv, &RecordTags::default()).unwrap();
        assert_eq!(records.len(), 2);
        assert_eq!(records[0].timestamp, utc(2021, 11, 7, 6, 0));
        assert_eq!(records[0].value(), 3.0);
    }

    #[test]
    fn trade_blank_interface_column_is_not_missing() {
        let csv = trade_csv(&[("01/01/2021 00:05:00", &[("SCH - HQ - NY", 100.0)])])
            .replace("SCH - PJM_VFT,1,0\n", "SCH - PJM_VFT,1,\n");
        assert!(csv.contains("SCH - PJM_VFT,1,\n"));
        let records = parse_trade(&csv, &RecordTags::default()).unwrap();
        assert_eq!(records.len(), 2);
        assert_eq!(records[0].measurement, Measurement::ImportMw(100.0));
        assert_eq!(records[1].measurement, Measurement::ExportMw(0.0));
    }

    #[test]
    fn trade_all_blank_timestamp_keeps_its_pair() {
        let mut csv = trade_csv(&[("01/01/2021 00:05:00", &[("SCH - NE - NY", -8.0)])]);
        for iface in external_interfaces() {
            csv.push_str(&format!("01/01/2021 00:10:00,{iface},1,\n"));
        }
        let records = parse_trade(&csv, &RecordTags::default()).unwrap();
        assert_eq!(records.len(), 4);
        assert_eq!(records[1].measurement, Measurement::ExportMw(8.0));
        assert_eq!(records[2].timestamp, utc(2021, 1, 1, 5, 10));
        assert_eq!(records[2].measurement, Measurement::ImportMw(0.0));
        assert_eq!(records[3].measurement, Measurement::ExportMw(0.0));
    }

    #[test]
    fn trade_tags_follow_options() {
        use crate::domain::{Frequency, Market};
        let csv = trade_csv(&[("01/01/2021 00:05:00", &[])]);
        let tags = RecordTags::new(Frequency::Hourly, Market::DayAheadHourly);
        let records = parse_trade(&csv, &tags).unwrap();
        assert!(records
            .iter()
            .all(|r| r.freq == Frequency::Hourly && r.market == Market::DayAheadHourly));
    }

    #[test]
    fn split_flows_signs() {
        assert_eq!(
            split_flows([Some(50.0), Some(-30.0), None, Some(0.0), Some(5.0), Some(-2.5)]),
            (55.0, 32.5)
        );
        assert_eq!(split_flows([None, None]), (0.0, 0.0));
        assert_eq!(split_flows(std::iter::empty()), (0.0, 0.0));
    }
}
