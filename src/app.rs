use axum::{
    Form, Json, Router,
    extract::{FromRequest, Multipart, Query, Request, State},
    http::{StatusCode, header},
    response::{Html, IntoResponse, Response},
    routing::get,
};
use chrono::{SecondsFormat, Utc};
use log::{error, info, warn};
use std::collections::HashMap;
use std::sync::Arc;
use tokio::net::TcpListener;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

use crate::config::FormConfig;
use crate::downloader;
use crate::handler::{SubmissionHandler, SubmissionResponse};
use crate::store::{FileRowStore, MemoryRowStore, RowStore};
use crate::workbook::HeaderStyle;

pub struct AppState {
    handler: Arc<SubmissionHandler>,
}

/// Pick the row store the configuration asks for
///
/// With a data directory, workbooks are files under it (the directory is
/// created if needed). Without one, an in-memory workbook is registered for
/// the configured store id, unless the id is still the placeholder.
pub fn build_store(config: &FormConfig) -> std::io::Result<Arc<dyn RowStore>> {
    match &config.data_dir {
        Some(dir) => {
            std::fs::create_dir_all(dir)?;
            info!("using file row store in {}", dir.display());
            Ok(Arc::new(FileRowStore::new(dir)))
        }
        None => {
            info!("using in-memory row store");
            let mut store = MemoryRowStore::new();
            if config.is_configured() {
                store = store.with_workbook(&config.store_id);
            }
            Ok(Arc::new(store))
        }
    }
}

pub fn router(handler: Arc<SubmissionHandler>) -> Router {
    let app_state = Arc::new(AppState { handler });

    Router::new()
        .route("/", get(serve_status).post(submit_form))
        .route("/info", get(get_setup_info))
        .route("/export.csv", get(export_csv))
        .route("/export.xlsx", get(export_xlsx))
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
        .with_state(app_state)
}

pub async fn run(config: FormConfig) -> Result<(), Box<dyn std::error::Error>> {
    let store = build_store(&config)?;
    let addr = config.addr.clone();

    if !config.is_configured() {
        error!("store id is not configured, submissions will be rejected");
    }

    let handler = Arc::new(SubmissionHandler::new(config, store));
    let app = router(handler);

    let listener = TcpListener::bind(&addr).await?;
    info!("listening on http://{}", addr);
    axum::serve(listener, app).await?;

    Ok(())
}

async fn serve_status(State(state): State<Arc<AppState>>) -> Html<String> {
    Html(status_page(state.handler.config()))
}

/// Static page confirming the endpoint is up and whether the store id is set
pub fn status_page(config: &FormConfig) -> String {
    let configured = if config.is_configured() {
        "Configured"
    } else {
        "Not configured"
    };

    format!(
        r#"<html>
  <body style="font-family: Arial, sans-serif; padding: 20px;">
    <h2>Form intake is running</h2>
    <p>This endpoint is ready to receive form submissions.</p>
    <p><strong>Timestamp:</strong> {}</p>
    <p><strong>Store ID:</strong> {}</p>
  </body>
</html>
"#,
        Utc::now().to_rfc3339_opts(SecondsFormat::Millis, true),
        configured
    )
}

async fn submit_form(
    State(state): State<Arc<AppState>>,
    Query(query): Query<HashMap<String, String>>,
    request: Request,
) -> Json<SubmissionResponse> {
    // Body fields take precedence over query parameters of the same name
    let mut params = query;
    params.extend(body_params(request).await);

    let response = on_blocking_pool(&state, move |handler| handler.handle(&params))
        .await
        .unwrap_or_else(SubmissionResponse::error_message);

    Json(response)
}

/// Text fields of a form-urlencoded or multipart body; anything else is empty
async fn body_params(request: Request) -> HashMap<String, String> {
    let is_multipart = request
        .headers()
        .get(header::CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .is_some_and(|ct| ct.starts_with("multipart/form-data"));

    if !is_multipart {
        return match Form::<HashMap<String, String>>::from_request(request, &()).await {
            Ok(Form(body)) => body,
            Err(_) => HashMap::new(),
        };
    }

    let mut params = HashMap::new();
    let mut multipart = match Multipart::from_request(request, &()).await {
        Ok(multipart) => multipart,
        Err(e) => {
            warn!("unreadable multipart body: {}", e);
            return params;
        }
    };

    loop {
        let field = match multipart.next_field().await {
            Ok(Some(field)) => field,
            Ok(None) => break,
            Err(e) => {
                warn!("stopped reading multipart body: {}", e);
                break;
            }
        };
        // File uploads are not form values
        if field.file_name().is_some() {
            continue;
        }
        let Some(name) = field.name().map(str::to_string) else {
            continue;
        };
        match field.text().await {
            Ok(value) => {
                params.insert(name, value);
            }
            Err(e) => warn!("skipping multipart field {}: {}", name, e),
        }
    }

    params
}

/// Run `f` against the handler on tokio's blocking pool
///
/// Row stores do file I/O and hold std locks, so none of their calls run on
/// the async workers.
async fn on_blocking_pool<T, F>(state: &AppState, f: F) -> Result<T, String>
where
    T: Send + 'static,
    F: FnOnce(&SubmissionHandler) -> T + Send + 'static,
{
    let handler = state.handler.clone();
    tokio::task::spawn_blocking(move || f(&handler))
        .await
        .map_err(|e| {
            error!("blocking task failed: {}", e);
            format!("Internal error: {}", e)
        })
}

async fn get_setup_info(State(state): State<Arc<AppState>>) -> Response {
    let info = on_blocking_pool(&state, |handler| {
        handler.setup_info().map_err(|e| e.to_string())
    })
    .await
    .and_then(|info| info);

    match info {
        Ok(info) => Json(info).into_response(),
        Err(e) => (
            StatusCode::SERVICE_UNAVAILABLE,
            Json(serde_json::json!({ "error": e })),
        )
            .into_response(),
    }
}

async fn export_csv(State(state): State<Arc<AppState>>) -> Response {
    let table_name = state.handler.config().table_name.clone();
    let csv = on_blocking_pool(&state, |handler| {
        handler
            .rows()
            .map(|rows| downloader::to_csv(&rows))
            .map_err(|e| e.to_string())
    })
    .await
    .and_then(|csv| csv);

    match csv {
        Ok(csv) => download(
            "text/csv; charset=utf-8",
            &format!("{}.csv", table_name),
            csv.into_bytes(),
        ),
        Err(e) => export_error(e),
    }
}

async fn export_xlsx(State(state): State<Arc<AppState>>) -> Response {
    let table_name = state.handler.config().table_name.clone();
    let sheet_name = table_name.clone();
    let xlsx = on_blocking_pool(&state, move |handler| {
        let rows = handler.rows().map_err(|e| e.to_string())?;
        downloader::to_xlsx(&sheet_name, &rows, Some(&HeaderStyle::default()))
            .map_err(|e| e.to_string())
    })
    .await
    .and_then(|xlsx| xlsx);

    match xlsx {
        Ok(bytes) => download(
            "application/vnd.openxmlformats-officedocument.spreadsheetml.sheet",
            &format!("{}.xlsx", table_name),
            bytes,
        ),
        Err(e) => export_error(e),
    }
}

fn download(content_type: &'static str, filename: &str, body: Vec<u8>) -> Response {
    (
        [
            (header::CONTENT_TYPE, content_type.to_string()),
            (
                header::CONTENT_DISPOSITION,
                format!("attachment; filename=\"{}\"", filename),
            ),
        ],
        body,
    )
        .into_response()
}

fn export_error(message: String) -> Response {
    error!("export failed: {}", message);
    (
        StatusCode::SERVICE_UNAVAILABLE,
        Json(serde_json::json!({ "error": message })),
    )
        .into_response()
}
