//! Market context embedded into the chat system prompt.
//!
//! Unlike [`DataSnapshot`](crate::domain::DataSnapshot), missing values stay
//! `null` so the model can tell "no data" from "zero".

use serde::Serialize;

use crate::domain::{CombinedData, IndicatorKey};
use crate::series::{calculate_yoy, latest_value};

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CurrentData {
    pub treasury2y: Option<f64>,
    pub treasury10y: Option<f64>,
    pub fed_funds_rate: Option<f64>,
    pub cpi: Option<f64>,
    #[serde(rename = "cpiYoY")]
    pub cpi_yoy: Option<f64>,
    pub nonfarm_payroll: Option<f64>,
    pub vix: Option<f64>,
    pub sp500: Option<f64>,
    pub hy_spread: Option<f64>,
    pub sahm_rule: Option<f64>,
    pub unemployment: Option<f64>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DerivedData {
    /// Latest 10Y minus latest 2Y (not date-aligned, not rounded).
    pub yield_spread: Option<f64>,
    pub real_rate: Option<f64>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ChatContext {
    pub current_data: CurrentData,
    pub derived: DerivedData,
}

pub fn build_chat_context(data: &CombinedData) -> ChatContext {
    let latest = |key: IndicatorKey| latest_value(data.series(key)).map(|p| p.value);

    let treasury2y = latest(IndicatorKey::Treasury2y);
    let treasury10y = latest(IndicatorKey::Treasury10y);
    let fed_funds_rate = latest(IndicatorKey::FedFundsRate);
    let cpi_yoy = latest_value(&calculate_yoy(data.series(IndicatorKey::Cpi))).map(|p| p.value);

    let yield_spread = treasury10y.zip(treasury2y).map(|(long, short)| long - short);
    let real_rate = fed_funds_rate.zip(cpi_yoy).map(|(ff, yoy)| ff - yoy);

    ChatContext {
        current_data: CurrentData {
            treasury2y,
            treasury10y,
            fed_funds_rate,
            cpi: latest(IndicatorKey::Cpi),
            cpi_yoy,
            nonfarm_payroll: latest(IndicatorKey::NonfarmPayroll),
            vix: latest(IndicatorKey::Vix),
            sp500: latest(IndicatorKey::Sp500),
            hy_spread: latest(IndicatorKey::HySpread),
            sahm_rule: latest(IndicatorKey::SahmRule),
            unemployment: latest(IndicatorKey::Unemployment),
        },
        derived: DerivedData {
            yield_spread,
            real_rate,
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::snapshot::tests::sample_data;

    #[test]
    fn missing_values_stay_null() {
        let context = build_chat_context(&CombinedData::default());
        let value = serde_json::to_value(&context).unwrap();
        assert!(value["currentData"]["vix"].is_null());
        assert!(value["currentData"]["cpiYoY"].is_null());
        assert!(value["derived"]["realRate"].is_null());
    }

    #[test]
    fn derived_values_use_latest_prints() {
        let context = build_chat_context(&sample_data());
        let spread = context.derived.yield_spread.unwrap();
        assert!((spread - (4.25 - 4.7)).abs() < 1e-12);
        let real = context.derived.real_rate.unwrap();
        assert!((real - (5.33 - 12.0)).abs() < 1e-12);
        assert_eq!(context.current_data.unemployment, None);
        assert_eq!(context.current_data.sp500, Some(5431.6));
    }
}
