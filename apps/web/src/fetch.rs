use beyond_the_arc_core::dataset::{DatasetKind, Datasets};
use beyond_the_arc_core::error::{DashboardError, Result};
use futures_util::future::try_join_all;
use wasm_bindgen::JsCast;
use wasm_bindgen_futures::JsFuture;
use web_sys::{Request, RequestInit, RequestMode, Response, Window};

use crate::config::{describe, DashboardConfig};

/// Fetches every dataset at once. The first failure aborts the whole load.
pub async fn fetch_datasets(window: &Window, config: &DashboardConfig) -> Result<Datasets> {
    let requests = DatasetKind::ALL.into_iter().map(|kind| async move {
        let body = fetch_text(window, &config.dataset_url(kind)).await?;
        Ok::<_, DashboardError>((kind, body))
    });
    let bodies = try_join_all(requests).await?;
    Datasets::from_texts(bodies)
}

async fn fetch_text(window: &Window, url: &str) -> Result<String> {
    let failed = |reason: String| DashboardError::Fetch {
        path: url.to_string(),
        reason,
    };

    let opts = RequestInit::new();
    opts.set_method("GET");
    opts.set_mode(RequestMode::SameOrigin);

    let request =
        Request::new_with_str_and_init(url, &opts).map_err(|error| failed(describe(&error)))?;

    let response_value = JsFuture::from(window.fetch_with_request(&request))
        .await
        .map_err(|error| failed(describe(&error)))?;

    let response = response_value
        .dyn_into::<Response>()
        .map_err(|_| failed("not a Response".to_string()))?;
    if !response.ok() {
        return Err(failed(format!("HTTP {}", response.status())));
    }

    let text = response.text().map_err(|error| failed(describe(&error)))?;
    let body = JsFuture::from(text)
        .await
        .map_err(|error| failed(describe(&error)))?;

    log::debug!("fetched {url}");
    body.as_string()
        .ok_or_else(|| failed("body is not text".to_string()))
}
