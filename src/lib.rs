// Copyright 2026 Hypermesh Foundation. All rights reserved.
// Media Mix Simulation Suite

pub mod types;
pub mod benchmarks;
pub mod config;
pub mod rounding;
pub mod adjustment;
pub mod performance;
pub mod allocation;
pub mod scenario;
pub mod grading;
pub mod recommendation;
pub mod insights;
pub mod validation;
pub mod mix_generator;
pub mod planner;
pub mod simulation;

pub use types::*;
pub use benchmarks::{BenchmarkError, BenchmarkStore};
pub use config::{EngineConfig, RatioPolicy};
pub use grading::calculate_efficiency_grade;
pub use simulation::{MediaMixSimulation, SimulationError, SimulationReport, SimulationRequest};

use wasm_bindgen::prelude::*;

use crate::mix_generator::MediaMixRequest;
use crate::planner::PlanRequest;

fn js_error(err: impl std::fmt::Display) -> JsValue {
    JsValue::from_str(&err.to_string())
}

// ─── WASM Interface ──────────────────────────────────────────────────────────

/// Browser-facing handle owning a benchmark store and configuration.
#[wasm_bindgen]
pub struct MediaMixSimulator {
    store: BenchmarkStore,
    config: EngineConfig,
}

#[wasm_bindgen]
impl MediaMixSimulator {
    /// Simulator over the built-in benchmark dataset.
    #[wasm_bindgen(constructor)]
    pub fn new() -> Result<MediaMixSimulator, JsValue> {
        #[cfg(target_arch = "wasm32")]
        std::panic::set_hook(Box::new(console_error_panic_hook::hook));

        let store = BenchmarkStore::builtin().map_err(js_error)?;
        Ok(Self { store, config: EngineConfig::default() })
    }

    /// Simulator over a caller-supplied benchmark document.
    pub fn from_benchmarks_json(json: &str) -> Result<MediaMixSimulator, JsValue> {
        let store = BenchmarkStore::from_json(json).map_err(js_error)?;
        Ok(Self { store, config: EngineConfig::default() })
    }

    /// Replace the engine configuration from a JSON document.
    pub fn configure(&mut self, json: &str) -> Result<(), JsValue> {
        self.config = EngineConfig::from_json(json).map_err(js_error)?;
        Ok(())
    }

    /// Run a full simulation. `request` is a `SimulationRequest` object.
    pub fn run(&self, request: JsValue) -> Result<JsValue, JsValue> {
        let request: SimulationRequest = serde_wasm_bindgen::from_value(request)?;
        let report = MediaMixSimulation::new(&self.store, &self.config)
            .run(&request)
            .map_err(js_error)?;
        Ok(serde_wasm_bindgen::to_value(&report).unwrap_or(JsValue::NULL))
    }

    /// Goal-driven automatic channel mix. `request` is a `MediaMixRequest`.
    pub fn generate_mix(&self, request: JsValue) -> Result<JsValue, JsValue> {
        let request: MediaMixRequest = serde_wasm_bindgen::from_value(request)?;
        let mix = mix_generator::generate_media_mix(
            &self.store,
            &self.config.default_revenue_per_conversion,
            &request,
        );
        Ok(serde_wasm_bindgen::to_value(&mix).unwrap_or(JsValue::NULL))
    }

    /// Budget plan for a conversion target. `request` is a `PlanRequest`.
    pub fn plan(&self, request: JsValue) -> Result<JsValue, JsValue> {
        let request: PlanRequest = serde_wasm_bindgen::from_value(request)?;
        let plan = planner::plan_for_target(&self.store, &request).map_err(js_error)?;
        Ok(serde_wasm_bindgen::to_value(&plan).unwrap_or(JsValue::NULL))
    }

    pub fn efficiency_grade(&self, avg_cpa: f64, avg_roas: f64, total_conversions: f64) -> String {
        calculate_efficiency_grade(avg_cpa, avg_roas, total_conversions).to_string()
    }

    pub fn industries(&self) -> JsValue {
        let industries: Vec<&str> = self.store.industries().collect();
        serde_wasm_bindgen::to_value(&industries).unwrap_or(JsValue::NULL)
    }
}
