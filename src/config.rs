use crate::model::DutyType;
use crate::scheduler::SchedError;
use anyhow::Context;
use chrono::Weekday;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fs;
use std::path::Path;

/// Table des poids validée : un poids fini et positif par type de permanence.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DutyWeights([f64; 5]);

impl DutyWeights {
    pub fn from_table(table: &BTreeMap<DutyType, f64>) -> Result<Self, SchedError> {
        let mut weights = [0.0; 5];
        for duty in DutyType::ALL {
            let Some(&w) = table.get(&duty) else {
                return Err(SchedError::Configuration(format!(
                    "duty weight table is missing {duty}"
                )));
            };
            if !w.is_finite() || w < 0.0 {
                return Err(SchedError::Configuration(format!(
                    "weight for {duty} must be a finite non-negative number, got {w}"
                )));
            }
            weights[duty.index()] = w;
        }
        Ok(Self(weights))
    }

    pub fn weight(&self, duty: DutyType) -> f64 {
        self.0[duty.index()]
    }
}

impl Default for DutyWeights {
    fn default() -> Self {
        Self([1.0, 1.5, 2.0, 0.5, 3.0])
    }
}

pub fn default_weight_table() -> BTreeMap<DutyType, f64> {
    let weights = DutyWeights::default();
    DutyType::ALL
        .into_iter()
        .map(|d| (d, weights.weight(d)))
        .collect()
}

/// Calendrier local : jours de week-end et jour « jeudi ».
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LocaleConfig {
    pub weekend: Vec<Weekday>,
    pub thursday: Option<Weekday>,
}

impl Default for LocaleConfig {
    fn default() -> Self {
        Self {
            weekend: vec![Weekday::Fri, Weekday::Sat],
            thursday: Some(Weekday::Thu),
        }
    }
}

impl LocaleConfig {
    pub fn is_weekend(&self, day: Weekday) -> bool {
        self.weekend.contains(&day)
    }
}

/// Configuration d'un run. Tous les champs ont une valeur par défaut.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    pub weights: BTreeMap<DutyType, f64>,
    pub locale: LocaleConfig,
    /// Préfère un autre employé pour le second créneau d'un même jour quand c'est possible.
    pub prefer_distinct_same_day: bool,
    /// Pondère le départage au nombre d'affectations par le taux d'occupation.
    pub position_weighting: bool,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            weights: default_weight_table(),
            locale: LocaleConfig::default(),
            prefer_distinct_same_day: true,
            position_weighting: false,
        }
    }
}

impl EngineConfig {
    /// Valide la configuration et renvoie la table des poids.
    pub fn validate(&self) -> Result<DutyWeights, SchedError> {
        let weights = DutyWeights::from_table(&self.weights)?;
        if let Some(thursday) = self.locale.thursday {
            if self.locale.is_weekend(thursday) {
                return Err(SchedError::Configuration(format!(
                    "{thursday} cannot be both the thursday duty day and a weekend day"
                )));
            }
        }
        Ok(weights)
    }

    pub fn load<P: AsRef<Path>>(path: P) -> anyhow::Result<Self> {
        let path = path.as_ref();
        let data = fs::read(path).with_context(|| format!("reading {}", path.display()))?;
        let config: EngineConfig = serde_json::from_slice(&data)
            .with_context(|| format!("parsing config {}", path.display()))?;
        Ok(config)
    }
}
