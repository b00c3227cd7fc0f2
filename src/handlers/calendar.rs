use std::sync::Arc;

use axum::extract::{Path, State};
use axum::http::header;
use axum::response::{IntoResponse, Response};

use crate::auth::TenantScoped;
use crate::errors::AppError;
use crate::services::appointments;
use crate::state::AppState;

// GET /appointment/:id/calendar.ics
pub async fn download_ics(
    State(state): State<Arc<AppState>>,
    TenantScoped(ctx): TenantScoped,
    Path(id): Path<String>,
) -> Result<Response, AppError> {
    let ics = {
        let conn = state.conn()?;
        appointments::calendar_export(&conn, &ctx, &id)?
    };

    let filename = format!("appointment-{id}.ics");
    Ok((
        [
            (header::CONTENT_TYPE, "text/calendar; charset=utf-8".to_string()),
            (
                header::CONTENT_DISPOSITION,
                format!("attachment; filename=\"{filename}\""),
            ),
        ],
        ics,
    )
        .into_response())
}
