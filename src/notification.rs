use crate::model::{Assignment, AssignmentKey, Employee};
use crate::scheduler::Scheduler;
use anyhow::{Context, Result};
use tracing::warn;

/// Avis d'échange destiné à un employé (envoi hors de la bibliothèque).
#[derive(Debug, Clone)]
pub struct SwapNotice {
    pub employee_id: String,
    pub email: String,
    pub content: String,
}

/// Permet de customiser le rendu du message (texte, mail, etc.).
pub trait NoticeRenderer {
    fn render(&self, employee: &Employee, taken: &Assignment, released: &Assignment) -> String;
}

/// Gabarit texte simple.
#[derive(Debug, Default, Clone, Copy)]
pub struct TextNotice;

impl NoticeRenderer for TextNotice {
    fn render(&self, employee: &Employee, taken: &Assignment, released: &Assignment) -> String {
        format!(
            "Hello {name},\n\nA schedule swap has been applied.\nYou now hold {taken_duty} on {taken_date} (previously {released_duty} on {released_date}).\n\nPlease update your calendar.\n",
            name = employee.name,
            taken_duty = taken.key.duty,
            taken_date = taken.key.date,
            released_duty = released.key.duty,
            released_date = released.key.date,
        )
    }
}

/// Prépare les avis pour les deux employés d'un échange déjà appliqué.
/// Les employés sans adresse sont ignorés ; un échange avec soi-même n'en produit aucun.
pub fn prepare_swap_notices(
    scheduler: &Scheduler,
    first: AssignmentKey,
    second: AssignmentKey,
    renderer: &dyn NoticeRenderer,
) -> Result<Vec<SwapNotice>> {
    let schedule = scheduler.schedule();
    let a = schedule
        .get(&first)
        .with_context(|| format!("no assignment {first}"))?;
    let b = schedule
        .get(&second)
        .with_context(|| format!("no assignment {second}"))?;

    if a.employee == b.employee {
        return Ok(Vec::new());
    }

    let mut out = Vec::new();
    for (taken, released) in [(a, b), (b, a)] {
        let employee = scheduler
            .find_employee(&taken.employee)
            .with_context(|| format!("unknown employee {}", taken.employee))?;
        if employee.email.is_empty() {
            warn!(employee = %employee.id, "no email address, notice skipped");
            continue;
        }
        out.push(SwapNotice {
            employee_id: employee.id.to_string(),
            email: employee.email.clone(),
            content: renderer.render(employee, taken, released),
        });
    }
    Ok(out)
}
