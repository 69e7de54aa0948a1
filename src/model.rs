use crate::scheduler::SchedError;
use chrono::{Datelike, NaiveDate, Weekday};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::fmt;
use std::str::FromStr;

/// Identifiant fort pour Employee
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct EmployeeId(String);

impl EmployeeId {
    pub fn new<S: AsRef<str>>(s: S) -> Self {
        Self(s.as_ref().to_owned())
    }
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for EmployeeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Plage de dates bloquées, bornes incluses [start, end].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct BlockedRange {
    pub start: NaiveDate,
    pub end: NaiveDate,
}

impl BlockedRange {
    pub fn new(start: NaiveDate, end: NaiveDate) -> Result<Self, String> {
        if end < start {
            return Err(format!("blocked range ends ({end}) before it starts ({start})"));
        }
        Ok(Self { start, end })
    }

    pub fn contains(&self, date: NaiveDate) -> bool {
        self.start <= date && date <= self.end
    }

    pub fn overlaps(&self, other: &BlockedRange) -> bool {
        self.start <= other.end && other.start <= self.end
    }
}

/// Employé validé, prêt pour la planification.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Employee {
    pub id: EmployeeId,
    pub name: String,
    pub email: String,
    pub country: String,
    pub observes_sabbath: bool,
    /// Taux d'occupation, dans ]0, 100].
    pub position_percentage: u8,
    pub blocked_days: BTreeSet<NaiveDate>,
    pub blocked_ranges: Vec<BlockedRange>,
}

impl Employee {
    /// Employé à 100 %, sans blocage ; l'identifiant reprend le nom.
    pub fn new<N: Into<String>, E: Into<String>>(name: N, email: E) -> Self {
        let name = name.into();
        Self {
            id: EmployeeId::new(&name),
            name,
            email: email.into(),
            country: default_country(),
            observes_sabbath: false,
            position_percentage: 100,
            blocked_days: BTreeSet::new(),
            blocked_ranges: Vec::new(),
        }
    }

    pub fn with_id<S: AsRef<str>>(mut self, id: S) -> Self {
        self.id = EmployeeId::new(id);
        self
    }

    pub fn observing_sabbath(mut self) -> Self {
        self.observes_sabbath = true;
        self
    }

    /// Ajoute un jour bloqué ; `false` s'il l'était déjà.
    pub fn block_day(&mut self, date: NaiveDate) -> bool {
        self.blocked_days.insert(date)
    }

    /// Ajoute une plage bloquée en refusant tout chevauchement avec les plages existantes.
    pub fn add_blocked_range(&mut self, range: BlockedRange) -> Result<(), SchedError> {
        if let Some(existing) = self.blocked_ranges.iter().find(|r| r.overlaps(&range)) {
            return Err(SchedError::Validation {
                record: self.id.to_string(),
                reason: format!(
                    "blocked range {}..{} overlaps {}..{}",
                    range.start, range.end, existing.start, existing.end
                ),
            });
        }
        self.blocked_ranges.push(range);
        self.blocked_ranges.sort_by_key(|r| r.start);
        Ok(())
    }

    pub fn is_blocked(&self, date: NaiveDate) -> bool {
        self.blocked_days.contains(&date) || self.blocked_ranges.iter().any(|r| r.contains(date))
    }

    /// Règles de chargement : nom et identifiant non vides, taux dans ]0, 100],
    /// plages bloquées ordonnées et disjointes.
    pub fn validate(&self) -> Result<(), SchedError> {
        let invalid = |reason: String| SchedError::Validation {
            record: self.label(),
            reason,
        };

        if self.name.trim().is_empty() {
            return Err(invalid("name cannot be empty".into()));
        }
        if self.id.as_str().trim().is_empty() {
            return Err(invalid("id cannot be blank".into()));
        }
        if self.position_percentage == 0 || self.position_percentage > 100 {
            return Err(invalid(format!(
                "position_percentage must be in (0, 100], got {}",
                self.position_percentage
            )));
        }
        for (i, range) in self.blocked_ranges.iter().enumerate() {
            if range.end < range.start {
                return Err(invalid(format!(
                    "blocked range ends ({}) before it starts ({})",
                    range.end, range.start
                )));
            }
            if let Some(other) = self.blocked_ranges[i + 1..].iter().find(|r| r.overlaps(range)) {
                return Err(invalid(format!(
                    "blocked range {}..{} overlaps {}..{}",
                    range.start, range.end, other.start, other.end
                )));
            }
        }
        Ok(())
    }

    fn label(&self) -> String {
        match (self.id.as_str().trim(), self.name.trim()) {
            ("", "") => "<unnamed>".to_string(),
            ("", name) => name.to_string(),
            (id, _) => id.to_string(),
        }
    }
}

fn default_country() -> String {
    "Israel".to_string()
}

fn default_position() -> i64 {
    100
}

/// Plage telle qu'écrite dans les fichiers sources (dates non encore validées).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RangeRecord {
    pub start: String,
    pub end: String,
}

/// Enregistrement brut d'un employé (JSON/CSV), validé par [`EmployeeRecord::validate`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EmployeeRecord {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    pub name: String,
    #[serde(default)]
    pub email: String,
    #[serde(default = "default_country")]
    pub country: String,
    #[serde(default)]
    pub observes_sabbath: bool,
    #[serde(default = "default_position")]
    pub position_percentage: i64,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub blocked_days: Vec<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub blocked_ranges: Vec<RangeRecord>,
}

impl EmployeeRecord {
    pub fn new<N: Into<String>>(name: N) -> Self {
        Self {
            id: None,
            name: name.into(),
            email: String::new(),
            country: default_country(),
            observes_sabbath: false,
            position_percentage: default_position(),
            blocked_days: Vec::new(),
            blocked_ranges: Vec::new(),
        }
    }

    fn label(&self) -> String {
        match &self.id {
            Some(id) if !id.trim().is_empty() => id.trim().to_string(),
            _ if !self.name.trim().is_empty() => self.name.trim().to_string(),
            _ => "<unnamed>".to_string(),
        }
    }

    pub fn validate(&self) -> Result<Employee, SchedError> {
        let invalid = |reason: String| SchedError::Validation {
            record: self.label(),
            reason,
        };

        let name = self.name.trim();
        let id = match self.id.as_deref().map(str::trim) {
            Some(id) => EmployeeId::new(id),
            None => EmployeeId::new(name),
        };
        let position_percentage = u8::try_from(self.position_percentage).map_err(|_| {
            invalid(format!(
                "position_percentage must be in (0, 100], got {}",
                self.position_percentage
            ))
        })?;

        let mut blocked_days = BTreeSet::new();
        for raw in &self.blocked_days {
            let date = parse_iso(raw).map_err(&invalid)?;
            blocked_days.insert(date);
        }

        let mut blocked_ranges = Vec::with_capacity(self.blocked_ranges.len());
        for raw in &self.blocked_ranges {
            let start = parse_iso(&raw.start).map_err(&invalid)?;
            let end = parse_iso(&raw.end).map_err(&invalid)?;
            blocked_ranges.push(BlockedRange::new(start, end).map_err(&invalid)?);
        }
        blocked_ranges.sort_by_key(|r| r.start);

        let employee = Employee {
            id,
            name: name.to_string(),
            email: self.email.trim().to_string(),
            country: self.country.trim().to_string(),
            observes_sabbath: self.observes_sabbath,
            position_percentage,
            blocked_days,
            blocked_ranges,
        };
        employee.validate()?;
        Ok(employee)
    }
}

impl From<&Employee> for EmployeeRecord {
    fn from(e: &Employee) -> Self {
        Self {
            id: Some(e.id.to_string()),
            name: e.name.clone(),
            email: e.email.clone(),
            country: e.country.clone(),
            observes_sabbath: e.observes_sabbath,
            position_percentage: i64::from(e.position_percentage),
            blocked_days: e.blocked_days.iter().map(|d| d.to_string()).collect(),
            blocked_ranges: e
                .blocked_ranges
                .iter()
                .map(|r| RangeRecord {
                    start: r.start.to_string(),
                    end: r.end.to_string(),
                })
                .collect(),
        }
    }
}

pub(crate) fn parse_iso(raw: &str) -> Result<NaiveDate, String> {
    NaiveDate::parse_from_str(raw.trim(), "%Y-%m-%d").map_err(|_| format!("invalid date: {raw}"))
}

/// Type de permanence ; le code court est celui des fichiers de planning.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum DutyType {
    #[serde(rename = "WD", alias = "weekday")]
    Weekday,
    #[serde(rename = "Th", alias = "thursday")]
    Thursday,
    #[serde(rename = "WE", alias = "weekend")]
    Weekend,
    #[serde(rename = "B", alias = "backup")]
    Backup,
    #[serde(rename = "HO", alias = "holiday")]
    Holiday,
}

impl DutyType {
    pub const ALL: [DutyType; 5] = [
        DutyType::Weekday,
        DutyType::Thursday,
        DutyType::Weekend,
        DutyType::Backup,
        DutyType::Holiday,
    ];

    pub fn code(self) -> &'static str {
        match self {
            DutyType::Weekday => "WD",
            DutyType::Thursday => "Th",
            DutyType::Weekend => "WE",
            DutyType::Backup => "B",
            DutyType::Holiday => "HO",
        }
    }

    pub(crate) fn index(self) -> usize {
        match self {
            DutyType::Weekday => 0,
            DutyType::Thursday => 1,
            DutyType::Weekend => 2,
            DutyType::Backup => 3,
            DutyType::Holiday => 4,
        }
    }

    /// Créneaux couverts par la règle du shabbat.
    pub fn is_weekend_slot(self) -> bool {
        matches!(self, DutyType::Weekend | DutyType::Backup)
    }
}

impl fmt::Display for DutyType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}

impl FromStr for DutyType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        DutyType::ALL
            .into_iter()
            .find(|d| d.code().eq_ignore_ascii_case(s))
            .or_else(|| match s.to_ascii_lowercase().as_str() {
                "weekday" => Some(DutyType::Weekday),
                "thursday" => Some(DutyType::Thursday),
                "weekend" => Some(DutyType::Weekend),
                "backup" => Some(DutyType::Backup),
                "holiday" => Some(DutyType::Holiday),
                _ => None,
            })
            .ok_or_else(|| format!("unknown duty type: {s}"))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum HolidayCategory {
    National,
    Company,
    #[default]
    #[serde(other)]
    Custom,
}

/// Jour férié. Non bloquant par défaut : il ne change que la pondération.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Holiday {
    pub date: NaiveDate,
    #[serde(alias = "name")]
    pub label: String,
    #[serde(default, alias = "type")]
    pub category: HolidayCategory,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub country: Option<String>,
    #[serde(default)]
    pub blocking: bool,
}

impl Holiday {
    pub fn new<L: Into<String>>(date: NaiveDate, label: L, category: HolidayCategory) -> Self {
        Self {
            date,
            label: label.into(),
            category,
            country: None,
            blocking: false,
        }
    }

    pub fn validate(&self) -> Result<(), SchedError> {
        if self.label.trim().is_empty() {
            return Err(SchedError::Validation {
                record: format!("holiday {}", self.date),
                reason: "label cannot be empty".into(),
            });
        }
        Ok(())
    }
}

/// Clé d'une affectation : un type de permanence un jour donné.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct AssignmentKey {
    pub date: NaiveDate,
    pub duty: DutyType,
}

impl AssignmentKey {
    pub fn new(date: NaiveDate, duty: DutyType) -> Self {
        Self { date, duty }
    }

    pub fn weekday(&self) -> Weekday {
        self.date.weekday()
    }
}

impl fmt::Display for AssignmentKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.date, self.duty)
    }
}

/// Affectation réalisée, avec le poids qu'elle a rapporté.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Assignment {
    pub key: AssignmentKey,
    pub employee: EmployeeId,
    pub weight: f64,
    #[serde(default)]
    pub holiday: bool,
}
