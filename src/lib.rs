#![forbid(unsafe_code)]
//! Permanence — répartition de permanences par points pondérés (sans BD).
//!
//! - Calendrier : semaine, jeudi, week-end + backup, jours fériés pondérés.
//! - Attribution gloutonne déterministe au plus petit solde de points.
//! - Échanges manuels atomiques avec correction des soldes.
//! - Stockage fichiers (JSON/CSV) en périphérie.

pub mod balance;
pub mod calendar;
pub mod config;
pub mod io;
pub mod model;
pub mod notification;
pub mod report;
pub mod schedule;
pub mod scheduler;
pub mod storage;

pub use balance::BalanceTracker;
pub use calendar::{CalendarDay, Classifier, DateRange};
pub use config::{DutyWeights, EngineConfig, LocaleConfig};
pub use model::{
    Assignment, AssignmentKey, BlockedRange, DutyType, Employee, EmployeeId, EmployeeRecord,
    Holiday, HolidayCategory, RangeRecord,
};
pub use notification::{prepare_swap_notices, NoticeRenderer, SwapNotice, TextNotice};
pub use report::{summarize, EmployeeSummary};
pub use schedule::{Schedule, ScheduleDocument, ScheduleExport, ScheduleState};
pub use scheduler::{Conflict, ConflictKind, RunReport, SchedError, Scheduler};
pub use storage::{JsonStorage, Storage};
