//! Terminal rendering for patients and readings.

use chrono::NaiveDate;
use sencare_core::{ClinicalReading, PatientDetail, PatientRecord, SyncReport};
use std::fmt::Write;

pub(crate) const DISPLAY_DATE: &str = "%d-%m-%Y";

/// Accepts `YYYY-MM-DD` or the displayed `DD-MM-YYYY`.
pub(crate) fn parse_date(raw: &str) -> Result<NaiveDate, String> {
    let raw = raw.trim();
    NaiveDate::parse_from_str(raw, "%Y-%m-%d")
        .or_else(|_| NaiveDate::parse_from_str(raw, DISPLAY_DATE))
        .map_err(|_| format!("expected YYYY-MM-DD or DD-MM-YYYY, got {raw:?}"))
}

pub(crate) fn patient_line(p: &PatientRecord) -> String {
    format!(
        "{:<32}  {:<24}  {:>3}  {:<16}  {}",
        p.id, p.name, p.age, p.contact, p.condition
    )
}

pub(crate) fn patient_table(patients: &[PatientRecord]) -> String {
    if patients.is_empty() {
        return "No patients found.".into();
    }
    let mut out = format!(
        "{:<32}  {:<24}  {:>3}  {:<16}  {}\n",
        "ID", "NAME", "AGE", "CONTACT", "CONDITION"
    );
    for p in patients {
        out.push_str(&patient_line(p));
        out.push('\n');
    }
    out
}

/// Readings ordered by date for display; ties keep store order.
pub(crate) fn sorted_by_date(readings: &[ClinicalReading]) -> Vec<&ClinicalReading> {
    let mut sorted: Vec<_> = readings.iter().collect();
    sorted.sort_by_key(|r| r.date);
    sorted
}

pub(crate) fn reading_table(readings: &[ClinicalReading]) -> String {
    if readings.is_empty() {
        return "No clinical data available.".into();
    }
    let mut out = format!(
        "{:<32}  {:<10}  {:<18}  {:>8}  {}\n",
        "ID", "DATE", "TEST", "VALUE", "CONDITION"
    );
    for r in sorted_by_date(readings) {
        let _ = writeln!(
            out,
            "{:<32}  {:<10}  {:<18}  {:>8}  {}",
            r.id,
            r.date.format(DISPLAY_DATE),
            r.test_type.as_str(),
            r.value,
            r.condition
        );
    }
    out
}

pub(crate) fn detail(d: &PatientDetail) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "Name:      {}", d.record.name);
    let _ = writeln!(out, "ID:        {}", d.record.id);
    let _ = writeln!(out, "Age:       {}", d.record.age);
    let _ = writeln!(out, "Contact:   {}", d.record.contact);
    let _ = writeln!(out, "Condition: {}", d.condition);
    out.push('\n');
    match &d.readings {
        Some(readings) => out.push_str(&reading_table(readings)),
        None => out.push_str("Clinical data could not be loaded."),
    }
    out
}

pub(crate) fn sync_note(report: &SyncReport) -> Option<String> {
    match report {
        SyncReport::Updated { to, .. } => Some(format!("Patient condition is now {to}.")),
        SyncReport::Failed(msg) => Some(format!(
            "Warning: the patient's condition could not be updated ({msg}). Run `sencare resync` to retry."
        )),
        SyncReport::NoReadings | SyncReport::Unchanged(_) => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use sencare_core::{Condition, TestType};

    fn reading(id: &str, y: i32, m: u32, d: u32) -> ClinicalReading {
        ClinicalReading {
            id: id.into(),
            test_type: TestType::HeartRate,
            value: 72.0,
            date: NaiveDate::from_ymd_opt(y, m, d).unwrap(),
            condition: Condition::Normal,
        }
    }

    #[test]
    fn test_parse_date_accepts_both_orders() {
        let expected = NaiveDate::from_ymd_opt(2024, 10, 1).unwrap();
        assert_eq!(parse_date("2024-10-01"), Ok(expected));
        assert_eq!(parse_date("01-10-2024"), Ok(expected));
        assert!(parse_date("10/01/2024").is_err());
    }

    #[test]
    fn test_readings_sorted_by_date_without_touching_input() {
        let readings = vec![
            reading("b", 2024, 10, 3),
            reading("a", 2024, 9, 30),
            reading("c", 2024, 10, 3),
        ];
        let ids: Vec<_> = sorted_by_date(&readings).iter().map(|r| r.id.as_str()).collect();
        assert_eq!(ids, ["a", "b", "c"]);
        assert_eq!(readings[0].id, "b");
    }

    #[test]
    fn test_reading_table_uses_day_first_dates() {
        let table = reading_table(&[reading("r1", 2024, 3, 9)]);
        assert!(table.contains("09-03-2024"), "{table}");
        assert!(table.contains("Heart Rate"));
    }

    #[test]
    fn test_sync_note_only_for_changes_and_failures() {
        assert_eq!(sync_note(&SyncReport::Unchanged(Condition::Normal)), None);
        assert_eq!(sync_note(&SyncReport::NoReadings), None);
        assert!(sync_note(&SyncReport::Failed("timed out".into()))
            .unwrap()
            .contains("timed out"));
    }
}
