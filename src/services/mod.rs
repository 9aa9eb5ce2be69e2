//! Scheduling services: slot grid, view builders, navigation, workflow, session

pub mod agenda;
pub mod clock;
pub mod navigation;
pub mod session;
pub mod slots;
pub mod workflow;

pub use agenda::AgendaService;
pub use clock::{Clock, FixedClock, SystemClock};
pub use navigation::{NavigationBounds, NavigationController, RebuildTicket};
pub use session::{RebuildOutcome, SchedulingSession};
pub use workflow::WorkflowResolver;
