use crate::config::{DutyWeights, LocaleConfig};
use crate::model::{DutyType, Holiday};
use crate::scheduler::SchedError;
use chrono::{Datelike, NaiveDate};
use std::collections::BTreeMap;

/// Jour calendaire et créneaux requis, dans l'ordre d'attribution.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CalendarDay {
    pub date: NaiveDate,
    pub slots: Vec<DutyType>,
    pub holiday: Option<Holiday>,
}

impl CalendarDay {
    pub fn is_holiday(&self) -> bool {
        self.holiday.is_some()
    }

    /// Poids d'un créneau : un jour férié pèse comme `Holiday`, sauf le backup.
    pub fn slot_weight(&self, duty: DutyType, weights: &DutyWeights) -> f64 {
        if self.is_holiday() && duty != DutyType::Backup {
            weights.weight(DutyType::Holiday)
        } else {
            weights.weight(duty)
        }
    }
}

/// Classe les dates en créneaux selon le calendrier local et les jours fériés.
#[derive(Debug, Clone, Default)]
pub struct Classifier {
    locale: LocaleConfig,
    holidays: BTreeMap<NaiveDate, Holiday>,
}

impl Classifier {
    /// En cas de doublon sur une date, le premier jour férié est retenu.
    pub fn new(locale: LocaleConfig, holidays: &[Holiday]) -> Self {
        let mut by_date = BTreeMap::new();
        for h in holidays {
            by_date.entry(h.date).or_insert_with(|| h.clone());
        }
        Self {
            locale,
            holidays: by_date,
        }
    }

    pub fn classify(&self, date: NaiveDate) -> CalendarDay {
        let holiday = self.holidays.get(&date).cloned();
        if holiday.as_ref().is_some_and(|h| h.blocking) {
            return CalendarDay {
                date,
                slots: Vec::new(),
                holiday,
            };
        }

        let weekday = date.weekday();
        let slots = if self.locale.is_weekend(weekday) {
            vec![DutyType::Weekend, DutyType::Backup]
        } else if self.locale.thursday == Some(weekday) {
            vec![DutyType::Thursday]
        } else {
            vec![DutyType::Weekday]
        };

        CalendarDay {
            date,
            slots,
            holiday,
        }
    }
}

/// Période demandée : mois d'une année, ou intervalle explicite (bornes incluses).
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DateRange {
    Months { year: i32, months: Vec<u32> },
    Span { start: NaiveDate, end: NaiveDate },
}

impl DateRange {
    pub fn months(year: i32, months: impl IntoIterator<Item = u32>) -> Self {
        Self::Months {
            year,
            months: months.into_iter().collect(),
        }
    }

    pub fn span(start: NaiveDate, end: NaiveDate) -> Self {
        Self::Span { start, end }
    }

    /// Liste chronologique des jours couverts.
    pub fn days(&self) -> Result<Vec<NaiveDate>, SchedError> {
        match self {
            DateRange::Span { start, end } => {
                if end < start {
                    return Err(SchedError::Configuration(format!(
                        "date range ends ({end}) before it starts ({start})"
                    )));
                }
                Ok(start.iter_days().take_while(|d| d <= end).collect())
            }
            DateRange::Months { year, months } => {
                if months.is_empty() {
                    return Err(SchedError::Configuration("no month requested".into()));
                }
                let mut months = months.clone();
                months.sort_unstable();
                months.dedup();
                let mut out = Vec::new();
                for month in months {
                    out.extend(month_days(*year, month)?);
                }
                Ok(out)
            }
        }
    }
}

pub fn month_days(year: i32, month: u32) -> Result<Vec<NaiveDate>, SchedError> {
    let first = NaiveDate::from_ymd_opt(year, month, 1).ok_or_else(|| {
        SchedError::Configuration(format!("invalid month {year}-{month:02}"))
    })?;
    Ok(first
        .iter_days()
        .take_while(|d| d.month() == month)
        .collect())
}
