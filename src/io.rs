use crate::model::{EmployeeRecord, Holiday, RangeRecord};
use crate::report::EmployeeSummary;
use crate::schedule::ScheduleExport;
use crate::scheduler::Scheduler;
use anyhow::{bail, Context};
use csv::{ReaderBuilder, WriterBuilder};
use serde_json::Value;
use std::fs;
use std::path::Path;

/// Charge les employés depuis un fichier JSON (liste d'enregistrements) ou CSV,
/// selon l'extension. La validation métier est faite par le scheduler.
pub fn load_employees<P: AsRef<Path>>(path: P) -> anyhow::Result<Vec<EmployeeRecord>> {
    let path = path.as_ref();
    match path.extension().and_then(|s| s.to_str()) {
        Some(ext) if ext.eq_ignore_ascii_case("csv") => import_employees_csv(path),
        _ => load_employees_json(path),
    }
}

pub fn load_employees_json<P: AsRef<Path>>(path: P) -> anyhow::Result<Vec<EmployeeRecord>> {
    let path = path.as_ref();
    let data = fs::read(path).with_context(|| format!("reading {}", path.display()))?;
    let records: Vec<EmployeeRecord> = serde_json::from_slice(&data)
        .with_context(|| format!("parsing employees {}", path.display()))?;
    Ok(records)
}

/// Import CSV, header
/// `name,email[,id][,country][,observes_sabbath][,position_percentage][,blocked_days][,blocked_ranges]`.
/// `blocked_days` : dates séparées par `;` ; `blocked_ranges` : `début..fin` (ou `début/fin`) séparés par `;`.
pub fn import_employees_csv<P: AsRef<Path>>(path: P) -> anyhow::Result<Vec<EmployeeRecord>> {
    let mut rdr = ReaderBuilder::new()
        .has_headers(true)
        .flexible(true)
        .from_path(path)?;
    let mut out = Vec::new();
    for rec in rdr.records() {
        let rec = rec?;
        let name = rec.get(0).context("missing name")?.trim();
        let mut record = EmployeeRecord::new(name);
        record.email = rec.get(1).unwrap_or("").trim().to_string();

        let field = |i: usize| rec.get(i).map(str::trim).filter(|s| !s.is_empty());
        record.id = field(2).map(str::to_string);
        if let Some(country) = field(3) {
            record.country = country.to_string();
        }
        if let Some(flag) = field(4) {
            record.observes_sabbath = parse_bool(flag)
                .with_context(|| format!("invalid observes_sabbath value for {name}"))?;
        }
        if let Some(pct) = field(5) {
            record.position_percentage = pct
                .parse()
                .with_context(|| format!("invalid position_percentage value for {name}"))?;
        }
        if let Some(days) = field(6) {
            record.blocked_days = split_list(days).map(str::to_string).collect();
        }
        if let Some(ranges) = field(7) {
            record.blocked_ranges = parse_ranges(ranges)
                .with_context(|| format!("invalid blocked_ranges value for {name}"))?;
        }
        out.push(record);
    }
    Ok(out)
}

fn parse_bool(s: &str) -> anyhow::Result<bool> {
    match s.to_ascii_lowercase().as_str() {
        "true" | "1" | "yes" | "y" | "oui" => Ok(true),
        "false" | "0" | "no" | "n" | "non" => Ok(false),
        _ => bail!("expected boolean"),
    }
}

fn split_list(raw: &str) -> impl Iterator<Item = &str> {
    raw.split(';').map(str::trim).filter(|chunk| !chunk.is_empty())
}

fn parse_ranges(raw: &str) -> anyhow::Result<Vec<RangeRecord>> {
    split_list(raw)
        .map(|chunk| {
            let (start, end) = chunk
                .split_once("..")
                .or_else(|| chunk.split_once('/'))
                .with_context(|| format!("expected start..end, got {chunk}"))?;
            Ok(RangeRecord {
                start: start.trim().to_string(),
                end: end.trim().to_string(),
            })
        })
        .collect()
}

/// Jours fériés : liste plate, ou regroupés `{année: {mois: [..]}}`.
pub fn load_holidays<P: AsRef<Path>>(path: P) -> anyhow::Result<Vec<Holiday>> {
    let path = path.as_ref();
    let data = fs::read(path).with_context(|| format!("reading {}", path.display()))?;
    let value: Value = serde_json::from_slice(&data)
        .with_context(|| format!("parsing holidays {}", path.display()))?;
    parse_holidays(value).with_context(|| format!("reading holidays {}", path.display()))
}

pub fn parse_holidays(value: Value) -> anyhow::Result<Vec<Holiday>> {
    let mut holidays: Vec<Holiday> = match value {
        Value::Array(list) => serde_json::from_value(Value::Array(list))?,
        Value::Object(years) => {
            let mut out = Vec::new();
            for (year, months) in years {
                if year.parse::<i32>().is_err() {
                    bail!("unexpected key {year} in clustered holidays");
                }
                let Value::Object(months) = months else {
                    bail!("year {year} must map month names to holiday lists");
                };
                for (_, list) in months {
                    let mut batch: Vec<Holiday> = serde_json::from_value(list)?;
                    out.append(&mut batch);
                }
            }
            out
        }
        _ => bail!("holidays must be a list or a year/month mapping"),
    };
    holidays.sort_by_key(|h| h.date);
    Ok(holidays)
}

/// Export JSON `{date: {code: nom}}`
pub fn export_schedule_json<P: AsRef<Path>>(path: P, export: &ScheduleExport) -> anyhow::Result<()> {
    let s = serde_json::to_string_pretty(export)?;
    fs::write(path, s)?;
    Ok(())
}

/// Export CSV des affectations: header `date,duty,employee_id,employee_name,weight,holiday`
pub fn export_assignments_csv<P: AsRef<Path>>(path: P, scheduler: &Scheduler) -> anyhow::Result<()> {
    let mut w = WriterBuilder::new().has_headers(true).from_path(path)?;
    w.write_record(["date", "duty", "employee_id", "employee_name", "weight", "holiday"])?;
    for a in scheduler.schedule().assignments() {
        let name = scheduler
            .find_employee(&a.employee)
            .map(|e| e.name.as_str())
            .unwrap_or("");
        let date = a.key.date.to_string();
        let weight = a.weight.to_string();
        w.write_record([
            date.as_str(),
            a.key.duty.code(),
            a.employee.as_str(),
            name,
            weight.as_str(),
            if a.holiday { "yes" } else { "no" },
        ])?;
    }
    w.flush()?;
    Ok(())
}

/// Export CSV de la synthèse: header `id,name,WD,Th,WE,B,HO,total,points`
pub fn export_summary_csv<P: AsRef<Path>>(path: P, rows: &[EmployeeSummary]) -> anyhow::Result<()> {
    let mut w = WriterBuilder::new().has_headers(true).from_path(path)?;
    write_summary(&mut w, rows)?;
    w.flush()?;
    Ok(())
}

pub fn summary_to_csv_string(rows: &[EmployeeSummary]) -> anyhow::Result<String> {
    let mut w = WriterBuilder::new().has_headers(true).from_writer(Vec::new());
    write_summary(&mut w, rows)?;
    let bytes = w.into_inner().map_err(|e| e.into_error())?;
    Ok(String::from_utf8(bytes)?)
}

fn write_summary<W: std::io::Write>(
    w: &mut csv::Writer<W>,
    rows: &[EmployeeSummary],
) -> anyhow::Result<()> {
    w.write_record(["id", "name", "WD", "Th", "WE", "B", "HO", "total", "points"])?;
    for row in rows {
        let mut buffers: [itoa::Buffer; 6] = Default::default();
        let [wd, th, we, b, ho, total] = &mut buffers;
        let points = row.points.to_string();
        w.write_record([
            row.id.as_str(),
            row.name.as_str(),
            wd.format(row.weekday),
            th.format(row.thursday),
            we.format(row.weekend),
            b.format(row.backup),
            ho.format(row.holiday),
            total.format(row.total),
            points.as_str(),
        ])?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn clustered_and_flat_holidays_parse_alike() {
        let flat = serde_json::json!([
            { "name": "Sukkot", "date": "2025-10-07", "type": "national", "country": "Israel" },
            { "name": "Offsite", "date": "2025-09-18", "type": "company" }
        ]);
        let clustered = serde_json::json!({
            "2025": {
                "September": [ { "name": "Offsite", "date": "2025-09-18", "type": "company" } ],
                "October": [ { "name": "Sukkot", "date": "2025-10-07", "type": "national", "country": "Israel" } ]
            }
        });
        let a = parse_holidays(flat).unwrap();
        let b = parse_holidays(clustered).unwrap();
        assert_eq!(a, b);
        assert_eq!(a[0].label, "Offsite");
        assert!(!a[0].blocking);
    }

    #[test]
    fn unknown_holiday_type_falls_back_to_custom() {
        let v = serde_json::json!([{ "name": "Team day", "date": "2025-09-30", "type": "team" }]);
        let h = parse_holidays(v).unwrap();
        assert_eq!(h[0].category, crate::model::HolidayCategory::Custom);
    }

    #[test]
    fn ranges_accept_both_separators() {
        let r = parse_ranges("2025-09-01..2025-09-03; 2025-10-01/2025-10-02").unwrap();
        assert_eq!(r.len(), 2);
        assert_eq!(r[1].end, "2025-10-02");
        assert!(parse_ranges("2025-09-01").is_err());
    }
}
