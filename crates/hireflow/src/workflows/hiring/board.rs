use serde::Serialize;

use super::domain::{ApplicationRecord, ApplicationStatus};
use super::repository::ApplicationStatusView;

/// One kanban column.
#[derive(Debug, Clone, Serialize)]
pub struct BoardColumn {
    pub status: ApplicationStatus,
    pub label: &'static str,
    pub count: usize,
    pub applications: Vec<ApplicationStatusView>,
}

#[derive(Debug, Clone, Serialize)]
pub struct PipelineBoard {
    pub columns: Vec<BoardColumn>,
}

impl PipelineBoard {
    /// Group applications by stage. Every stage gets a column, in pipeline order,
    /// and cards within a column keep their input order.
    pub fn from_records(records: &[ApplicationRecord]) -> Self {
        let columns = ApplicationStatus::ordered()
            .into_iter()
            .map(|status| {
                let applications: Vec<ApplicationStatusView> = records
                    .iter()
                    .filter(|record| record.status == status)
                    .map(ApplicationRecord::status_view)
                    .collect();

                BoardColumn {
                    status,
                    label: status.display_name(),
                    count: applications.len(),
                    applications,
                }
            })
            .collect();

        Self { columns }
    }

    pub fn column(&self, status: ApplicationStatus) -> Option<&BoardColumn> {
        self.columns.iter().find(|column| column.status == status)
    }
}
