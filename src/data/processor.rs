//! Data Processor Module
//! Filters the loaded table by city and groups it into chart series.

use crate::data::GasTable;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

/// The set of cities currently ticked in the checklist.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Selection(BTreeSet<String>);

impl Selection {
    pub fn contains(&self, city: &str) -> bool {
        self.0.contains(city)
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl<S: Into<String>> FromIterator<S> for Selection {
    fn from_iter<I: IntoIterator<Item = S>>(iter: I) -> Self {
        Self(iter.into_iter().map(Into::into).collect())
    }
}

/// A single observation on the chart.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PricePoint {
    pub date: NaiveDate,
    pub price: f64,
}

/// One line on the chart, labelled with its city.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Series {
    pub label: String,
    pub points: Vec<PricePoint>,
}

/// Everything the renderer needs to draw one chart.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ChartDescription {
    pub series: Vec<Series>,
}

impl ChartDescription {
    pub fn is_empty(&self) -> bool {
        self.series.is_empty()
    }

    /// Earliest and latest date across all series.
    pub fn date_range(&self) -> Option<(NaiveDate, NaiveDate)> {
        let mut dates = self.series.iter().flat_map(|s| s.points.iter().map(|p| p.date));
        let first = dates.next()?;
        Some(dates.fold((first, first), |(lo, hi), d| (lo.min(d), hi.max(d))))
    }

    /// Lowest and highest price across all series.
    pub fn price_range(&self) -> Option<(f64, f64)> {
        let mut prices = self.series.iter().flat_map(|s| s.points.iter().map(|p| p.price));
        let first = prices.next()?;
        Some(prices.fold((first, first), |(lo, hi), p| (lo.min(p), hi.max(p))))
    }
}

/// Turns a table plus a selection into a chart description.
pub struct DataProcessor;

impl DataProcessor {
    /// Keep rows whose city is selected, one series per city.
    ///
    /// Series follow the order in which each city first appears in the table;
    /// points within a series are sorted by date, ties keep file order.
    pub fn render(table: &GasTable, selection: &Selection) -> ChartDescription {
        if selection.is_empty() || table.is_empty() {
            return ChartDescription::default();
        }

        let mut series: Vec<Series> = Vec::new();
        for record in table.records() {
            if !selection.contains(&record.city) {
                continue;
            }

            let point = PricePoint {
                date: record.date,
                price: record.price,
            };
            match series.iter_mut().find(|s| s.label == record.city) {
                Some(existing) => existing.points.push(point),
                None => series.push(Series {
                    label: record.city.clone(),
                    points: vec![point],
                }),
            }
        }

        for s in &mut series {
            // sort_by_key is stable
            s.points.sort_by_key(|p| p.date);
        }

        ChartDescription { series }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::loader::GasRecord;

    fn record(date: (i32, u32, u32), price: f64, city: &str) -> GasRecord {
        let date = NaiveDate::from_ymd_opt(date.0, date.1, date.2).unwrap();
        GasRecord {
            date_stamp: date.format("%Y%m%d").to_string(),
            time: "08:00".to_string(),
            price,
            address: "123 Main".to_string(),
            city: city.to_string(),
            date,
        }
    }

    fn sample_table() -> GasTable {
        GasTable::from_records(vec![
            record((2024, 1, 3), 4.70, "SAN LEANDRO"),
            record((2024, 1, 2), 4.60, "NEWARK"),
            record((2024, 1, 1), 4.50, "NEWARK"),
            record((2024, 1, 1), 4.65, "SAN LEANDRO"),
            record((2024, 1, 2), 4.55, "NEWARK"),
            record((2024, 1, 2), 4.40, "RICHMOND"),
        ])
    }

    fn labels(chart: &ChartDescription) -> Vec<&str> {
        chart.series.iter().map(|s| s.label.as_str()).collect()
    }

    #[test]
    fn empty_selection_yields_no_series() {
        let chart = DataProcessor::render(&sample_table(), &Selection::default());
        assert!(chart.is_empty());
    }

    #[test]
    fn unknown_city_yields_no_series() {
        let selection: Selection = ["OAKLAND"].into_iter().collect();
        let chart = DataProcessor::render(&sample_table(), &selection);
        assert!(chart.is_empty());
    }

    #[test]
    fn one_series_per_selected_city_present() {
        let selection: Selection = ["NEWARK", "RICHMOND", "OAKLAND"].into_iter().collect();
        let chart = DataProcessor::render(&sample_table(), &selection);
        assert_eq!(labels(&chart), vec!["NEWARK", "RICHMOND"]);
    }

    #[test]
    fn series_follow_table_encounter_order() {
        let selection: Selection = ["NEWARK", "SAN LEANDRO"].into_iter().collect();
        let chart = DataProcessor::render(&sample_table(), &selection);
        assert_eq!(labels(&chart), vec!["SAN LEANDRO", "NEWARK"]);
    }

    #[test]
    fn points_sorted_by_date_and_stable_on_ties() {
        let selection: Selection = ["NEWARK"].into_iter().collect();
        let chart = DataProcessor::render(&sample_table(), &selection);

        let prices: Vec<f64> = chart.series[0].points.iter().map(|p| p.price).collect();
        assert_eq!(prices, vec![4.50, 4.60, 4.55]);
        assert!(chart.series[0]
            .points
            .windows(2)
            .all(|w| w[0].date <= w[1].date));
    }

    #[test]
    fn render_is_idempotent() {
        let table = sample_table();
        let selection: Selection = ["NEWARK", "SAN LEANDRO", "RICHMOND"].into_iter().collect();
        assert_eq!(
            DataProcessor::render(&table, &selection),
            DataProcessor::render(&table, &selection)
        );
    }

    #[test]
    fn ranges_cover_all_series() {
        let selection: Selection = ["NEWARK", "RICHMOND"].into_iter().collect();
        let chart = DataProcessor::render(&sample_table(), &selection);

        assert_eq!(
            chart.date_range(),
            Some((
                NaiveDate::from_ymd_opt(2024, 1, 1).unwrap(),
                NaiveDate::from_ymd_opt(2024, 1, 2).unwrap()
            ))
        );
        assert_eq!(chart.price_range(), Some((4.40, 4.60)));
        assert_eq!(ChartDescription::default().price_range(), None);
    }

    #[test]
    fn selection_deserializes_from_checklist_value() {
        let selection: Selection = serde_json::from_str(r#"["NEWARK","NEWARK","RICHMOND"]"#).unwrap();
        assert!(selection.contains("NEWARK"));
        assert!(selection.contains("RICHMOND"));
        assert_eq!(
            serde_json::to_value(&selection).unwrap(),
            serde_json::json!(["NEWARK", "RICHMOND"])
        );
    }
}
