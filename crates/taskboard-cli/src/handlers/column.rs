use crate::cli::{FilterArgs, ShowArgs};
use crate::context::CliContext;
use crate::output::{self, ColumnsReport};
use taskboard_sync::BoardController;

fn report(controller: &BoardController) -> ColumnsReport {
    let report = ColumnsReport::new(
        &controller.board().id,
        controller.filter(),
        controller.columns(),
    );
    for column in report.failed_columns() {
        tracing::warn!(
            "Column {} failed to load: {}",
            column.status_id,
            column.error.as_deref().unwrap_or_default()
        );
    }
    report
}

/// First page of every visible column. Columns that fail to load are still
/// listed, with their error.
pub async fn handle_columns(ctx: &CliContext) -> anyhow::Result<()> {
    let controller = ctx.controller();
    controller.mount_visible();
    controller.load_all().await;
    output::print_report(&report(controller))
}

pub async fn handle_show(ctx: &CliContext, args: ShowArgs) -> anyhow::Result<()> {
    let controller = ctx.controller();
    let partition = controller.mount(&args.status_id)?;
    for (_, outcome) in controller.load_all().await {
        outcome?;
    }
    for _ in 1..args.pages.max(1) {
        if controller.load_more(&args.status_id).await?.is_none() {
            break;
        }
    }
    output::print_report(&partition.view())
}

pub async fn handle_filter(ctx: &CliContext, args: FilterArgs) -> anyhow::Result<()> {
    let controller = ctx.controller();
    let filter = args.to_filter();
    controller.mount_visible();
    if controller.set_filter(filter).await.is_empty() {
        controller.load_all().await;
    }
    output::print_report(&report(controller))
}
