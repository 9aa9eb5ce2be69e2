//! Workshop Agenda console
//!
//! Prints the agenda of the configured booking backend.
//!
//! Usage: `workshop-agenda [day|week|month] [pages-forward]`

use std::sync::Arc;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use workshop_agenda::{
    backend::{BookingBackend, HttpBookingBackend, MemoryBookingBackend},
    config::{AppConfig, BackendKind},
    models::{AgendaView, ClassifiedSlot, Granularity, SlotState, WorkflowMode},
    presenter::ConsolePresenter,
    services::{Clock, RebuildOutcome, SchedulingSession, SystemClock},
};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load environment variables from .env file
    dotenvy::dotenv().ok();

    let config = AppConfig::load()?;

    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| format!("workshop_agenda={}", config.logging.level).into());

    if config.logging.format == "json" {
        tracing_subscriber::registry()
            .with(filter)
            .with(tracing_subscriber::fmt::layer().json())
            .init();
    } else {
        tracing_subscriber::registry()
            .with(filter)
            .with(tracing_subscriber::fmt::layer())
            .init();
    }

    tracing::info!("Starting Workshop Agenda v{}", env!("CARGO_PKG_VERSION"));

    let mut args = std::env::args().skip(1);
    let granularity = match args.next().as_deref() {
        None | Some("day") => Granularity::Day,
        Some("week") => Granularity::Week,
        Some("month") => Granularity::Month,
        Some(other) => anyhow::bail!("Unknown view '{}', expected day, week or month", other),
    };
    let pages: u32 = args.next().map(|p| p.parse()).transpose()?.unwrap_or(0);

    let clock: Arc<dyn Clock> = Arc::new(SystemClock);
    let backend: Arc<dyn BookingBackend> = match config.backend.kind {
        BackendKind::Http => {
            tracing::info!(url = %config.backend.base_url, "Using HTTP booking backend");
            Arc::new(HttpBookingBackend::new(&config.backend)?)
        }
        BackendKind::Memory => {
            tracing::info!("Using in-memory booking backend");
            Arc::new(MemoryBookingBackend::new(Arc::clone(&clock)))
        }
    };

    let mut session = SchedulingSession::open(
        backend,
        Arc::new(ConsolePresenter),
        clock,
        WorkflowMode::CreateNew,
        &config.agenda,
    );

    let mut outcome = session.switch_granularity(granularity).await;
    for _ in 0..pages {
        outcome = session.next().await;
    }

    if outcome != RebuildOutcome::Applied {
        anyhow::bail!("Could not build the agenda: {:?}", outcome);
    }
    if let Some(view) = session.current_view() {
        print_view(view);
    }

    Ok(())
}

fn slot_line(slot: &ClassifiedSlot) -> String {
    let status = match (slot.state(), &slot.reservation) {
        (SlotState::Occupied, Some(reservation)) => reservation.brief(),
        (SlotState::Occupied, None) => "taken".to_string(),
        (SlotState::Past, _) => "past".to_string(),
        (SlotState::Available, _) => "free".to_string(),
    };
    format!("  {}  {}", slot.label(), status)
}

fn print_view(view: &AgendaView) {
    match view {
        AgendaView::Day { date, slots } => {
            println!("{}", date.format("%A %d %B %Y"));
            for slot in slots {
                println!("{}", slot_line(slot));
            }
        }
        AgendaView::Week { days } => {
            for day in days {
                if let Some(date) = day.date {
                    println!("{} {}", day.day_name, date.format("%d/%m"));
                }
                for slot in &day.slots {
                    println!("{}", slot_line(slot));
                }
            }
        }
        AgendaView::Month(month) => {
            println!("{}", month.title);
            println!("{}", month.weekday_header.join(" "));
            let cells: Vec<String> = month
                .days
                .iter()
                .map(|d| match d.day_number {
                    Some(n) if d.is_today => format!("[{:>2}]", n),
                    Some(n) => format!(" {:>2} ", n),
                    None => "    ".to_string(),
                })
                .collect();
            for row in cells.chunks(7) {
                println!("{}", row.join(""));
            }
        }
    }
}
