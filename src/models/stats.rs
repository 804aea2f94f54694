use super::{Deliverable, ProjectListItem, ProjectStatus, Resource, TaskStatus, Technology};

/// Task totals for one project, split by status
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TaskCounts {
    pub todo: i64,
    pub in_progress: i64,
    pub review: i64,
    pub done: i64,
    pub overdue: i64,
}

impl TaskCounts {
    pub fn add(&mut self, status: TaskStatus, count: i64) {
        match status {
            TaskStatus::Todo => self.todo += count,
            TaskStatus::InProgress => self.in_progress += count,
            TaskStatus::Review => self.review += count,
            TaskStatus::Done => self.done += count,
        }
    }

    pub fn total(&self) -> i64 {
        self.todo + self.in_progress + self.review + self.done
    }

    pub fn open(&self) -> i64 {
        self.total() - self.done
    }

    /// Whole percent of tasks done, rounded down. Zero when there are no tasks.
    pub fn completion_percent(&self) -> u16 {
        let total = self.total();
        if total == 0 {
            return 0;
        }
        (self.done * 100 / total) as u16
    }
}

/// Everything the overview page shows for one project
#[derive(Debug, Clone)]
pub struct ProjectCard {
    pub item: ProjectListItem,
    pub counts: TaskCounts,
    pub deliverables: Vec<Deliverable>,
    pub technologies: Vec<Technology>,
    pub resources: Vec<Resource>,
}

impl ProjectCard {
    pub fn new(item: ProjectListItem) -> Self {
        Self {
            item,
            counts: TaskCounts::default(),
            deliverables: Vec::new(),
            technologies: Vec::new(),
            resources: Vec::new(),
        }
    }

    pub fn id(&self) -> i32 {
        self.item.project.id
    }
}

/// Header figures for the overview page
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DashboardStats {
    pub total_projects: usize,
    pub active_projects: usize,
    pub open_tasks: i64,
    pub overdue_tasks: i64,
    pub completion_percent: u16,
}

impl DashboardStats {
    pub fn compute(cards: &[ProjectCard]) -> Self {
        let mut all = TaskCounts::default();
        for card in cards {
            all.todo += card.counts.todo;
            all.in_progress += card.counts.in_progress;
            all.review += card.counts.review;
            all.done += card.counts.done;
            all.overdue += card.counts.overdue;
        }

        Self {
            total_projects: cards.len(),
            active_projects: cards
                .iter()
                .filter(|c| c.item.project.status() == ProjectStatus::Active)
                .count(),
            open_tasks: all.open(),
            overdue_tasks: all.overdue,
            completion_percent: all.completion_percent(),
        }
    }
}
