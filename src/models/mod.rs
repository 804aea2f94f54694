/// Declares an enum stored as a `TEXT` column with a `CHECK` constraint.
///
/// Generates `ALL`, `as_str`, `label`, `FromStr` and `Display`.
macro_rules! text_enum {
    (
        $(#[$meta:meta])*
        $name:ident {
            $($variant:ident => ($db:literal, $label:literal)),+ $(,)?
        }
    ) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
        pub enum $name {
            $($variant),+
        }

        impl $name {
            pub const ALL: &'static [$name] = &[$($name::$variant),+];

            pub fn as_str(&self) -> &'static str {
                match self {
                    $($name::$variant => $db),+
                }
            }

            pub fn label(&self) -> &'static str {
                match self {
                    $($name::$variant => $label),+
                }
            }
        }

        impl std::str::FromStr for $name {
            type Err = crate::error::AppError;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                match s {
                    $($db => Ok($name::$variant),)+
                    other => Err(crate::error::AppError::Validation(format!(
                        "unknown {} '{}'",
                        stringify!($name),
                        other
                    ))),
                }
            }
        }

        impl std::fmt::Display for $name {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                f.write_str(self.label())
            }
        }
    };
}

mod user;
mod client;
mod project;
mod task;
mod deliverable;
mod resource;
mod technology;
mod calendar_event;
mod setting;
mod stats;

pub use user::{User, UserRole};
pub use client::Client;
pub use project::{Project, ProjectListItem, ProjectStatus};
pub use task::{Task, TaskListItem, TaskPriority, TaskStatus};
pub use deliverable::{Deliverable, DeliverableStatus};
pub use resource::{Resource, ResourceKind};
pub use technology::Technology;
pub use calendar_event::CalendarEvent;
pub use setting::{Setting, COMPANY_NAME, DEFAULT_TASK_FILTER};
pub use stats::{DashboardStats, ProjectCard, TaskCounts};

