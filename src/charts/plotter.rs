//! Chart Plotter Module
//! Colours and axis bounds shared by the chart renderer.

use crate::data::ChartDescription;
use chrono::{Datelike, NaiveDate};
use plotters::style::RGBColor;
use std::ops::Range;

/// Series colours, assigned by series index.
pub const PALETTE: [RGBColor; 10] = [
    RGBColor(99, 110, 250),  // Blue
    RGBColor(239, 85, 59),   // Red
    RGBColor(0, 204, 150),   // Green
    RGBColor(171, 99, 250),  // Purple
    RGBColor(255, 161, 90),  // Orange
    RGBColor(25, 211, 243),  // Cyan
    RGBColor(255, 102, 146), // Pink
    RGBColor(182, 232, 128), // Light Green
    RGBColor(255, 151, 255), // Magenta
    RGBColor(254, 203, 82),  // Yellow
];

/// Fraction of the price span added above and below the data.
const PRICE_PADDING: f64 = 0.05;

/// Plot-space bounds. x is measured in days since the common era.
#[derive(Debug, Clone, PartialEq)]
pub struct AxisBounds {
    pub x: Range<i32>,
    pub y: Range<f64>,
}

pub struct ChartPlotter;

impl ChartPlotter {
    pub fn series_color(series_index: usize) -> RGBColor {
        PALETTE[series_index % PALETTE.len()]
    }

    pub fn day_number(date: NaiveDate) -> i32 {
        date.num_days_from_ce()
    }

    /// Tick label for an x value; blank outside the calendar.
    pub fn format_day(day: i32) -> String {
        NaiveDate::from_num_days_from_ce_opt(day)
            .map(|d| d.format("%Y-%m-%d").to_string())
            .unwrap_or_default()
    }

    /// Bounds covering every point, never zero-width.
    pub fn axis_bounds(chart: &ChartDescription) -> AxisBounds {
        let x = match chart.date_range() {
            Some((lo, hi)) if lo == hi => {
                let day = Self::day_number(lo);
                day - 1..day + 1
            }
            Some((lo, hi)) => Self::day_number(lo)..Self::day_number(hi),
            None => 0..1,
        };

        let y = match chart.price_range() {
            Some((lo, hi)) => {
                let span = hi - lo;
                let pad = if span > 0.0 {
                    span * PRICE_PADDING
                } else {
                    (lo.abs() * PRICE_PADDING).max(0.1)
                };
                lo - pad..hi + pad
            }
            None => 0.0..1.0,
        };

        AxisBounds { x, y }
    }
}
