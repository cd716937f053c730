// crates/metapool-cli/src/commands/epoch.rs
//
// `metapool epoch`: the current epoch boundary as projected from recent
// block times.

use chrono::Utc;

use crate::commands::Context;
use crate::output::{emit, FieldRow};

/// Run the epoch command.
pub async fn run(ctx: &Context) -> Result<(), Box<dyn std::error::Error>> {
    let now = Utc::now();
    let epoch = ctx.clock.current_epoch(now).await?;
    let remaining_ms = epoch.ms_until_end(now);

    let rows = vec![
        FieldRow::new("Ends at", epoch.ends_at().format("%Y-%m-%d %H:%M:%S UTC")),
        FieldRow::new(
            "Remaining",
            format!("{}h {}m", remaining_ms / 3_600_000, remaining_ms % 3_600_000 / 60_000),
        ),
        FieldRow::new(
            "Epoch length",
            format!("{:.2} hours", epoch.duration_ms() as f64 / 3_600_000.0),
        ),
    ];

    emit(ctx.format, &rows, &epoch);
    Ok(())
}
