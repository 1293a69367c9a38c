//! Board and sprint resolution through the JIRA Agile API.

use tracing::{debug, info, instrument};

use super::client::JiraClient;
use super::error::{ApiError, Result};
use super::types::{AgilePage, Board, Sprint};

/// Page size requested from the Agile API listing endpoints.
const AGILE_PAGE_SIZE: u32 = 50;

impl JiraClient {
    /// Get a board by ID.
    ///
    /// Calls `GET /rest/agile/1.0/board/{boardId}`. A 404 becomes
    /// [`ApiError::NotFound`].
    #[instrument(skip(self))]
    pub async fn get_board(&self, board_id: u64) -> Result<Board> {
        let url = self.endpoint(&format!("/rest/agile/1.0/board/{}", board_id));
        self.get_json(&url).await.map_err(|e| match e.status() {
            Some(404) => ApiError::NotFound(format!("board {}", board_id)),
            _ => e,
        })
    }

    /// List every board attached to a project.
    ///
    /// Follows the Agile paging envelope until `isLast` or an empty page.
    #[instrument(skip(self))]
    pub async fn list_boards(&self, project_key_or_id: &str) -> Result<Vec<Board>> {
        let mut boards = Vec::new();
        let mut start_at = 0u32;

        loop {
            let url = self.endpoint(&format!(
                "/rest/agile/1.0/board?projectKeyOrId={}&startAt={}&maxResults={}",
                urlencoding::encode(project_key_or_id),
                start_at,
                AGILE_PAGE_SIZE
            ));
            let page: AgilePage<Board> = self.get_json(&url).await?;
            let count = page.values.len() as u32;
            boards.extend(page.values);

            if count == 0 || page.is_last.unwrap_or(true) {
                break;
            }
            start_at = page.start_at + count;
        }

        debug!(count = boards.len(), "Boards listed");
        Ok(boards)
    }

    /// Resolve the board a sprint report should use.
    ///
    /// An explicit board ID is fetched and must exist. Otherwise the
    /// project's boards are listed and a Scrum board is preferred, then the
    /// lexically first name.
    pub async fn resolve_board(
        &self,
        project_key_or_id: Option<&str>,
        board_id: Option<u64>,
    ) -> Result<Board> {
        if let Some(id) = board_id {
            let board = self.get_board(id).await?;
            info!(board = %board, "Using configured board");
            return Ok(board);
        }

        let project = project_key_or_id
            .filter(|p| !p.trim().is_empty())
            .ok_or_else(|| ApiError::NotFound("board: no project or board id given".to_string()))?;

        let boards = self.list_boards(project).await?;
        let board = pick_preferred_board(boards)
            .ok_or_else(|| ApiError::NotFound(format!("No boards found for project {}", project)))?;

        info!(board = %board, project, "Resolved board");
        Ok(board)
    }

    /// Get the active sprint on a board.
    ///
    /// Calls `GET /rest/agile/1.0/board/{boardId}/sprint?state=active` and
    /// returns the first entry.
    #[instrument(skip(self))]
    pub async fn active_sprint(&self, board_id: u64) -> Result<Sprint> {
        let url = self.endpoint(&format!(
            "/rest/agile/1.0/board/{}/sprint?state=active",
            board_id
        ));
        let page: AgilePage<Sprint> = self.get_json(&url).await?;

        let sprint = page.values.into_iter().next().ok_or_else(|| {
            ApiError::NotFound(format!("No active sprint found on board {}", board_id))
        })?;

        info!(sprint = %sprint, "Resolved active sprint");
        Ok(sprint)
    }
}

/// Pick the board to report on: Scrum boards first, then by name.
pub fn pick_preferred_board(mut boards: Vec<Board>) -> Option<Board> {
    boards.sort_by(|a, b| {
        (!a.is_scrum(), a.name.as_str()).cmp(&(!b.is_scrum(), b.name.as_str()))
    });
    boards.into_iter().next()
}
