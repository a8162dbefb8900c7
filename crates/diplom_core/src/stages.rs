use crate::{FunnelVariant, ItemStore, RunState};

/// Funnel stages in dependency order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum FunnelStage {
    Goals,
    Tasks,
    Document,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct StageVisibility {
    pub goals: bool,
    pub tasks: bool,
    pub document: bool,
}

impl StageVisibility {
    pub fn is_visible(&self, stage: FunnelStage) -> bool {
        match stage {
            FunnelStage::Goals => self.goals,
            FunnelStage::Tasks => self.tasks,
            FunnelStage::Document => self.document,
        }
    }

    pub fn visible_stages(&self) -> Vec<FunnelStage> {
        [FunnelStage::Goals, FunnelStage::Tasks, FunnelStage::Document]
            .into_iter()
            .filter(|stage| self.is_visible(*stage))
            .collect()
    }
}

/// Derives which stages are revealed.
///
/// Tasks need at least one goal, then either a task or an elapsed settle delay.
/// The document stage exists only in the document variant, follows the first
/// task and is never shown ahead of the task stage.
pub fn stage_visibility(
    items: &ItemStore,
    run: &RunState,
    tasks_settled: bool,
    variant: FunnelVariant,
) -> StageVisibility {
    let has_goals = !items.goals().is_empty();
    let has_tasks = !items.tasks().is_empty();

    let goals = has_goals || *run == RunState::Running;
    let tasks = has_goals && (tasks_settled || has_tasks);
    StageVisibility {
        goals,
        tasks,
        document: tasks && has_tasks && variant == FunnelVariant::Document,
    }
}
