use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::debug;

/// The user-visible chart specification, replacing or augmenting the
/// default chart of the host view.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "chartType", rename_all = "lowercase")]
pub enum ChartOverride {
    Line { series: Vec<Series> },
    Bar { data: Vec<DataPoint> },
    Pie { data: Vec<DataPoint> },
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Series {
    pub ticker: String,
    pub history: Vec<PricePoint>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct PricePoint {
    pub date: String,
    pub close: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct DataPoint {
    pub label: String,
    pub value: f64,
}

/// Map a tool result onto a chart shape, when the tool is one the chart
/// layer recognizes.
pub fn chart_from_tool_result(tool: &str, result: &Value) -> Option<ChartOverride> {
    match tool {
        "FactSet_GlobalPrices" => line_from_prices(result),
        "FactSet_Fundamentals" => labeled_rows(result).map(|data| ChartOverride::Bar { data }),
        "FactSet_SegmentActuals" => labeled_rows(result).map(|data| ChartOverride::Pie { data }),
        _ => None,
    }
}

/// Merge an incoming override into the current one.
///
/// Line charts union by series ticker: new tickers are appended, existing
/// tickers keep their first-written history for the turn. Categorical
/// charts (and kind changes) replace the override wholesale.
pub fn merge_override(current: &mut Option<ChartOverride>, incoming: ChartOverride) {
    match (current.as_mut(), incoming) {
        (
            Some(ChartOverride::Line { series }),
            ChartOverride::Line {
                series: incoming_series,
            },
        ) => {
            for new_series in incoming_series {
                if series.iter().any(|s| s.ticker == new_series.ticker) {
                    debug!("keeping existing series for {}", new_series.ticker);
                } else {
                    series.push(new_series);
                }
            }
        }
        (_, incoming) => *current = Some(incoming),
    }
}

/// Build line series from price rows shaped like
/// `{"data": [{"requestId": "NVDA-US", "date": ..., "close": ...}, ...]}`,
/// grouping rows by the ticker prefix of `requestId`.
fn line_from_prices(result: &Value) -> Option<ChartOverride> {
    let rows = result.get("data")?.as_array()?;
    let mut series: Vec<Series> = Vec::new();

    for row in rows {
        let Some(request_id) = row.get("requestId").and_then(Value::as_str) else {
            continue;
        };
        let ticker = ticker_from_request_id(request_id);
        let Some(date) = row.get("date").and_then(Value::as_str) else {
            continue;
        };
        let Some(close) = row.get("close").and_then(Value::as_f64) else {
            continue;
        };

        let point = PricePoint {
            date: date.to_string(),
            close,
        };
        match series.iter_mut().find(|s| s.ticker == ticker) {
            Some(existing) => existing.history.push(point),
            None => series.push(Series {
                ticker: ticker.to_string(),
                history: vec![point],
            }),
        }
    }

    if series.is_empty() {
        None
    } else {
        Some(ChartOverride::Line { series })
    }
}

/// Build `{label, value}` rows from result payloads shaped like
/// `{"data": [{"label": ..., "value": ...}, ...]}` with `metric`/`name`
/// accepted as label fallbacks.
fn labeled_rows(result: &Value) -> Option<Vec<DataPoint>> {
    let rows = result.get("data")?.as_array()?;
    let data: Vec<DataPoint> = rows
        .iter()
        .filter_map(|row| {
            let label = row
                .get("label")
                .or_else(|| row.get("metric"))
                .or_else(|| row.get("name"))
                .and_then(Value::as_str)?;
            let value = row.get("value").and_then(Value::as_f64)?;
            Some(DataPoint {
                label: label.to_string(),
                value,
            })
        })
        .collect();

    if data.is_empty() {
        None
    } else {
        Some(data)
    }
}

/// Identifiers come back as `TICKER-REGION` (`NVDA-US`); the chart keys on
/// the ticker alone.
fn ticker_from_request_id(request_id: &str) -> &str {
    request_id.split('-').next().unwrap_or(request_id)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn prices_group_by_ticker() {
        let result = json!({"data": [
            {"requestId": "NVDA-US", "date": "2024-01-01", "close": 500.0},
            {"requestId": "NVDA-US", "date": "2024-01-02", "close": 510.0},
            {"requestId": "AMD-US", "date": "2024-01-01", "close": 140.0},
        ]});

        let Some(ChartOverride::Line { series }) =
            chart_from_tool_result("FactSet_GlobalPrices", &result)
        else {
            panic!("expected a line chart");
        };
        assert_eq!(series.len(), 2);
        assert_eq!(series[0].ticker, "NVDA");
        assert_eq!(series[0].history.len(), 2);
        assert_eq!(series[1].ticker, "AMD");
    }

    #[test]
    fn unknown_tool_maps_to_nothing() {
        assert_eq!(
            chart_from_tool_result("WebSearch", &json!({"data": []})),
            None
        );
    }

    #[test]
    fn line_merge_is_first_write_wins_per_ticker() {
        let mut current = Some(ChartOverride::Line {
            series: vec![Series {
                ticker: "NVDA".to_string(),
                history: vec![PricePoint {
                    date: "2024-01-01".to_string(),
                    close: 500.0,
                }],
            }],
        });

        merge_override(
            &mut current,
            ChartOverride::Line {
                series: vec![
                    Series {
                        ticker: "NVDA".to_string(),
                        history: vec![],
                    },
                    Series {
                        ticker: "AMD".to_string(),
                        history: vec![PricePoint {
                            date: "2024-01-01".to_string(),
                            close: 140.0,
                        }],
                    },
                ],
            },
        );

        let Some(ChartOverride::Line { series }) = current else {
            panic!("expected a line chart");
        };
        assert_eq!(series.len(), 2);
        // NVDA kept its original history.
        assert_eq!(series[0].history.len(), 1);
    }

    #[test]
    fn kind_change_replaces() {
        let mut current = Some(ChartOverride::Line { series: vec![] });
        merge_override(
            &mut current,
            ChartOverride::Pie {
                data: vec![DataPoint {
                    label: "Datacenter".to_string(),
                    value: 0.8,
                }],
            },
        );
        assert!(matches!(current, Some(ChartOverride::Pie { .. })));
    }
}
