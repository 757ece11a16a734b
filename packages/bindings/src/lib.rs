use napi::Result as NapiResult;
use napi_derive::napi;

/// Convert any Display error into a napi::Error.
fn to_napi_error(e: impl std::fmt::Display) -> napi::Error {
    napi::Error::from_reason(e.to_string())
}

// ---------------------------------------------------------------------------
// Pro forma engine
// ---------------------------------------------------------------------------

#[napi]
pub fn run_pro_forma(input_json: String) -> NapiResult<String> {
    let input: proforma_core::proforma::ProFormaInput =
        serde_json::from_str(&input_json).map_err(to_napi_error)?;
    let output = proforma_core::proforma::compute_pro_forma(&input).map_err(to_napi_error)?;
    serde_json::to_string(&output).map_err(to_napi_error)
}

#[napi]
pub fn resolve_unit_mix(input_json: String) -> NapiResult<String> {
    #[derive(serde::Deserialize)]
    struct MixRequest {
        total_units: u32,
        categories: Vec<proforma_core::mix::UnitCategory>,
    }
    let request: MixRequest = serde_json::from_str(&input_json).map_err(to_napi_error)?;
    let output = proforma_core::mix::resolve_unit_mix(request.total_units, &request.categories)
        .map_err(to_napi_error)?;
    serde_json::to_string(&output).map_err(to_napi_error)
}

// ---------------------------------------------------------------------------
// Analysis sweeps
// ---------------------------------------------------------------------------

#[napi]
pub fn solve_break_even(input_json: String) -> NapiResult<String> {
    let input: proforma_core::breakeven::BreakEvenInput =
        serde_json::from_str(&input_json).map_err(to_napi_error)?;
    let output = proforma_core::breakeven::solve_break_even(&input).map_err(to_napi_error)?;
    serde_json::to_string(&output).map_err(to_napi_error)
}

#[napi]
pub fn run_stress_tests(input_json: String) -> NapiResult<String> {
    let input: proforma_core::stress::StressTestInput =
        serde_json::from_str(&input_json).map_err(to_napi_error)?;
    let output = proforma_core::stress::run_stress_tests(&input).map_err(to_napi_error)?;
    serde_json::to_string(&output).map_err(to_napi_error)
}

// ---------------------------------------------------------------------------
// Waterfalls
// ---------------------------------------------------------------------------

#[napi]
pub fn returns_waterfall(input_json: String) -> NapiResult<String> {
    let input: proforma_core::proforma::ProFormaInput =
        serde_json::from_str(&input_json).map_err(to_napi_error)?;
    let run = proforma_core::proforma::compute_pro_forma(&input).map_err(to_napi_error)?;
    let output = proforma_core::waterfall::returns_waterfall(&input, &run.result);
    serde_json::to_string(&output).map_err(to_napi_error)
}
