// Request handlers: parse the form, call the store / scoring / charts,
// render a view. Failures are reduced to a notice on the page.

use super::views::{
    format_score, EntriesView, HomeView, NewEntryView, Notice, NoticeLevel, RankRow,
    ResultFormView, ResultView, WinnerView,
};
use super::{ApiResponse, AppState};
use crate::charts::render_charts;
use crate::entry::{ActualForm, GuessForm, GuessRecord};
use crate::error::TombolaError;
use crate::scoring::select_winner;
use askama::Template;
use axum::{
    extract::{rejection::FormRejection, Query, State},
    http::StatusCode,
    response::{Html, IntoResponse, Json, Redirect, Response},
    Form,
};
use serde::Deserialize;
use tracing::{error, info, warn};

fn render<T: Template>(status: StatusCode, view: T) -> Response {
    match view.render() {
        Ok(html) => (status, Html(html)).into_response(),
        Err(e) => {
            error!("template error: {}", e);
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Html(format!("Template error: {}", e)),
            )
                .into_response()
        }
    }
}

fn status_for(err: &TombolaError) -> StatusCode {
    if err.is_user_error() {
        StatusCode::UNPROCESSABLE_ENTITY
    } else {
        StatusCode::INTERNAL_SERVER_ERROR
    }
}

// ============================================================================
// Pages
// ============================================================================

#[derive(Debug, Default, Deserialize)]
pub struct HomeQuery {
    pub notice: Option<String>,
}

/// GET / - landing page
pub async fn home(Query(query): Query<HomeQuery>) -> Response {
    let notice = query.notice.as_deref().and_then(Notice::from_code);
    render(StatusCode::OK, HomeView { notice })
}

/// GET /new - guess form
pub async fn new_entry_form() -> Response {
    render(
        StatusCode::OK,
        NewEntryView {
            notice: None,
            form: GuessForm::default(),
        },
    )
}

/// POST /new - validate and append a guess
pub async fn submit_guess(
    State(state): State<AppState>,
    form: std::result::Result<Form<GuessForm>, FormRejection>,
) -> Response {
    let Form(form) = match form {
        Ok(form) => form,
        Err(rejection) => {
            warn!("guess form rejected: {}", rejection.body_text());
            return render(
                rejection.status(),
                NewEntryView {
                    notice: Some(Notice::error(rejection.body_text())),
                    form: GuessForm::default(),
                },
            );
        }
    };

    let stored = form
        .validate()
        .and_then(|record| state.store.append(&record).map(|_| record));

    match stored {
        Ok(record) => {
            info!(name = %record.name, "guess submitted");
            Redirect::to("/?notice=submitted").into_response()
        }
        Err(e) => {
            warn!("guess rejected: {}", e);
            render(
                status_for(&e),
                NewEntryView {
                    notice: Some(Notice::error(&e)),
                    form,
                },
            )
        }
    }
}

/// GET /result - actual outcome form
pub async fn result_form() -> Response {
    render(
        StatusCode::OK,
        ResultFormView {
            notice: None,
            form: ActualForm::default(),
        },
    )
}

/// POST /result - score every guess and show the winner with charts
pub async fn show_result(
    State(state): State<AppState>,
    form: std::result::Result<Form<ActualForm>, FormRejection>,
) -> Response {
    let Form(form) = match form {
        Ok(form) => form,
        Err(rejection) => {
            warn!("result form rejected: {}", rejection.body_text());
            return render(
                rejection.status(),
                ResultFormView {
                    notice: Some(Notice::error(rejection.body_text())),
                    form: ActualForm::default(),
                },
            );
        }
    };

    let computed = form.parse().and_then(|actual| {
        let standings = select_winner(state.store.as_ref(), &actual)?;
        let charts = render_charts(&standings.entries, &actual, standings.winner)?;
        Ok((standings, charts))
    });

    let (standings, charts) = match computed {
        Ok(result) => result,
        Err(e) => {
            warn!("result not computed: {}", e);
            return render(
                status_for(&e),
                ResultFormView {
                    notice: Some(Notice::error(&e)),
                    form,
                },
            );
        }
    };

    let notice = standings
        .require_winner()
        .err()
        .map(|e| Notice::new(NoticeLevel::Info, e.to_string()));

    let winner = standings.winner_entry().zip(standings.winner_score()).map(|(record, score)| {
        info!(name = %record.name, score, "winner selected");
        WinnerView {
            record: record.clone(),
            score: format_score(score),
        }
    });

    let rows = standings
        .ranked()
        .into_iter()
        .enumerate()
        .map(|(rank, (position, record, score))| RankRow {
            rank: rank + 1,
            record: record.clone(),
            score: format_score(score),
            is_winner: standings.winner == Some(position),
        })
        .collect();

    render(
        StatusCode::OK,
        ResultView {
            notice,
            winner,
            rows,
            charts,
        },
    )
}

/// GET /entries - every stored guess, raw text
pub async fn list_entries(State(state): State<AppState>) -> Response {
    match state.store.read_all() {
        Ok(entries) => render(
            StatusCode::OK,
            EntriesView {
                notice: None,
                entries,
            },
        ),
        Err(e) => {
            error!("listing entries failed: {}", e);
            render(
                status_for(&e),
                EntriesView {
                    notice: Some(Notice::error(&e)),
                    entries: Vec::new(),
                },
            )
        }
    }
}

/// GET /delete - wipe the store, no confirmation
pub async fn delete_all(State(state): State<AppState>) -> Response {
    match state.store.clear() {
        Ok(()) => {
            warn!(store = %state.store.describe(), "all entries deleted");
            Redirect::to("/?notice=deleted").into_response()
        }
        Err(e) => {
            error!("delete failed: {}", e);
            render(
                status_for(&e),
                HomeView {
                    notice: Some(Notice::error(&e)),
                },
            )
        }
    }
}

// ============================================================================
// JSON API
// ============================================================================

/// GET /api/health - Health check
pub async fn health_check() -> impl IntoResponse {
    Json(ApiResponse::ok("OK"))
}

/// GET /api/entries - raw entries as JSON
pub async fn api_entries(State(state): State<AppState>) -> Response {
    match state.store.read_all() {
        Ok(entries) => (StatusCode::OK, Json(ApiResponse::ok(entries))).into_response(),
        Err(e) => {
            error!("reading entries for api failed: {}", e);
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(ApiResponse::<Vec<GuessRecord>>::failed(e.to_string())),
            )
                .into_response()
        }
    }
}
