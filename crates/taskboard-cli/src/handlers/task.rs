use crate::cli::MoveArgs;
use crate::context::CliContext;
use crate::output::{self, MoveReport};

pub async fn handle_move(ctx: &CliContext, args: MoveArgs) -> anyhow::Result<()> {
    let from = ctx.stored_task(&args.task_id)?.status_id;
    let controller = ctx.controller();
    controller.board().require_status(&args.to)?;

    let source = controller.mount(&from)?;
    controller.mount(&args.to)?;
    for (_, outcome) in controller.load_all().await {
        outcome?;
    }
    // The task may sit past the first page of its column.
    while !source.contains(&args.task_id) {
        if controller.load_more(&from).await?.is_none() {
            break;
        }
    }

    let moved = controller
        .on_drop_accepted(&args.task_id, &from, &args.to)
        .await?;
    ctx.save().await?;
    tracing::info!("Moved task {} from {} to {}", moved.id, from, args.to);

    output::print_report(&MoveReport {
        task: moved,
        from_status_id: from,
        to_status_id: args.to,
    })
}
