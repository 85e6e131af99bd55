//! JSON reports printed by the commands.
//!
//! Every command prints exactly one line: a report wrapped in [`Envelope`]
//! on stdout, or an envelope carrying only `error` on stderr.

use serde::Serialize;
use taskboard_domain::{FilterState, StatusId, Task};
use taskboard_sync::PartitionView;

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct Envelope<'a, T: Serialize> {
    success: bool,
    api_version: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    data: Option<&'a T>,
    #[serde(skip_serializing_if = "Option::is_none")]
    error: Option<&'a str>,
}

impl<'a, T: Serialize> Envelope<'a, T> {
    fn new(data: Option<&'a T>, error: Option<&'a str>) -> Self {
        Self {
            success: error.is_none(),
            api_version: env!("CARGO_PKG_VERSION"),
            data,
            error,
        }
    }
}

/// The mounted columns of a board, in board order.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ColumnsReport {
    pub board_id: String,
    pub filter: FilterState,
    pub count: usize,
    /// Tasks held across all columns.
    pub loaded: usize,
    /// Server totals summed across all columns.
    pub total: u64,
    pub columns: Vec<PartitionView>,
}

impl ColumnsReport {
    pub fn new(board_id: &str, filter: FilterState, columns: Vec<PartitionView>) -> Self {
        Self {
            board_id: board_id.to_string(),
            filter,
            count: columns.len(),
            loaded: columns.iter().map(|c| c.items.len()).sum(),
            total: columns.iter().map(|c| c.display_total).sum(),
            columns,
        }
    }

    pub fn failed_columns(&self) -> impl Iterator<Item = &PartitionView> {
        self.columns.iter().filter(|c| c.error.is_some())
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MoveReport {
    pub task: Task,
    pub from_status_id: StatusId,
    pub to_status_id: StatusId,
}

pub fn print_report<T: Serialize>(report: &T) -> anyhow::Result<()> {
    println!("{}", serde_json::to_string(&Envelope::new(Some(report), None))?);
    Ok(())
}

/// Print an error envelope to stderr and exit with status 1.
pub fn exit_with_error(message: &str) -> ! {
    match serde_json::to_string(&Envelope::<()>::new(None, Some(message))) {
        Ok(json) => eprintln!("{}", json),
        Err(_) => eprintln!("{}", message),
    }
    std::process::exit(1);
}
