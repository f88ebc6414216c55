use beyond_the_arc_core::dataset::DatasetKind;
use beyond_the_arc_core::transition::DEFAULT_DURATION_MS;
use serde::Deserialize;
use wasm_bindgen::JsValue;
use web_sys::Document;

pub const CONFIG_ELEMENT_ID: &str = "dashboard-config";

/// Page-level overrides, read from
/// `<script id="dashboard-config" type="application/json">`.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct DashboardConfig {
    /// Directory the datasets are fetched from, relative to the page.
    pub data_base: String,
    pub transition_ms: f64,
    /// Width used when a container measures as zero (hidden on load).
    pub fallback_width: f64,
    pub debug: bool,
}

impl Default for DashboardConfig {
    fn default() -> Self {
        Self {
            data_base: "data".to_string(),
            transition_ms: DEFAULT_DURATION_MS,
            fallback_width: 720.0,
            debug: false,
        }
    }
}

impl DashboardConfig {
    /// Falls back to defaults when the element is absent or malformed.
    pub fn from_document(document: &Document) -> Self {
        let Some(text) = document
            .get_element_by_id(CONFIG_ELEMENT_ID)
            .and_then(|element| element.text_content())
        else {
            return Self::default();
        };
        match Self::from_js(&text) {
            Ok(config) => config,
            Err(error) => {
                log::warn!("ignoring #{CONFIG_ELEMENT_ID}: {error}");
                Self::default()
            }
        }
    }

    fn from_js(text: &str) -> Result<Self, String> {
        let value = js_sys::JSON::parse(text).map_err(|error| describe(&error))?;
        serde_wasm_bindgen::from_value(value).map_err(|error| error.to_string())
    }

    pub fn dataset_url(&self, kind: DatasetKind) -> String {
        let base = self.data_base.trim_end_matches('/');
        if base.is_empty() {
            kind.file_name().to_string()
        } else {
            format!("{base}/{}", kind.file_name())
        }
    }

    pub fn log_level(&self) -> log::LevelFilter {
        if self.debug {
            log::LevelFilter::Debug
        } else {
            log::LevelFilter::Info
        }
    }
}

/// Best-effort text for a thrown JavaScript value.
pub fn describe(value: &JsValue) -> String {
    value
        .as_string()
        .or_else(|| {
            js_sys::JSON::stringify(value)
                .ok()
                .and_then(|text| text.as_string())
        })
        .unwrap_or_else(|| format!("{value:?}"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_urls_match_page_relative_paths() {
        let config = DashboardConfig::default();
        for kind in DatasetKind::ALL {
            assert_eq!(config.dataset_url(kind), kind.path());
        }
    }

    #[test]
    fn base_path_is_joined_once() {
        let config = DashboardConfig {
            data_base: "/static/data/".to_string(),
            ..DashboardConfig::default()
        };
        assert_eq!(
            config.dataset_url(DatasetKind::TeamMap),
            "/static/data/team_map.json"
        );
    }

    #[test]
    fn partial_json_keeps_defaults() {
        let config: DashboardConfig = serde_json::from_str(r#"{"transitionMs": 250}"#).unwrap();
        assert!((config.transition_ms - 250.0).abs() < f64::EPSILON);
        assert_eq!(config.data_base, "data");
        assert!(!config.debug);
    }
}
