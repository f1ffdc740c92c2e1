//! Dashboard query/render layer.
//!
//! A registry maps a selection key to a canned aggregate query plus chart
//! metadata. Rendering executes the query against the warehouse views and
//! produces a plotly-style bar-chart figure as JSON; the interactive chart
//! itself is a collaborator (a plotly loader in the emitted HTML consumes
//! the figure spec).

use std::fs;
use std::path::Path;

use serde_json::{json, Value};

use crate::{Warehouse, WarehouseError};

/// One canned bar chart: the query to run and how to label it.
#[derive(Debug, Clone, Copy)]
pub struct PlotDetails {
    pub query: &'static str,
    pub x: &'static str,
    pub y: &'static str,
    pub x_label: &'static str,
    pub y_label: &'static str,
    pub title: &'static str,
    /// Column rendered as the value annotation on each bar.
    pub text: &'static str,
}

const SELECTIONS: &[(&str, PlotDetails)] = &[
    (
        "per_month",
        PlotDetails {
            query: "SELECT * FROM per_month_revenues",
            x: "release_month",
            y: "total_revenue",
            x_label: "Release Month",
            y_label: "Average Revenue",
            title: "Most fruitful months",
            text: "total_revenue",
        },
    ),
    (
        "genres",
        PlotDetails {
            query: "SELECT * FROM genre_revenues LIMIT 30",
            x: "genre",
            y: "total_revenue",
            x_label: "Genre",
            y_label: "Total Revenue",
            title: "Most fruitful genres",
            text: "total_revenue",
        },
    ),
    (
        "actors",
        PlotDetails {
            query: "SELECT * FROM actors_revenues LIMIT 30",
            x: "actor",
            y: "total_revenue",
            x_label: "Actor",
            y_label: "Total Revenue",
            title: "Most successful actors",
            text: "total_revenue",
        },
    ),
    (
        "countries",
        PlotDetails {
            query: "SELECT * FROM country_revenue LIMIT 30",
            x: "country",
            y: "total_revenue",
            x_label: "Country",
            y_label: "Total Revenue",
            title: "Most successful countries",
            text: "total_revenue",
        },
    ),
    (
        "directors",
        PlotDetails {
            query: "SELECT * FROM directors_revenues LIMIT 30",
            x: "director",
            y: "total_revenue",
            x_label: "Director",
            y_label: "Total Revenue",
            title: "Most successful directors",
            text: "total_revenue",
        },
    ),
    (
        "movies",
        PlotDetails {
            query: "SELECT * FROM movies_revenues LIMIT 30",
            x: "title",
            y: "total_revenue",
            x_label: "Movie title",
            y_label: "Total Revenue",
            title: "Most fruitful movies",
            text: "total_revenue",
        },
    ),
    (
        "rating",
        PlotDetails {
            query: "SELECT * FROM per_rating_revenues",
            x: "rating",
            y: "total_revenue",
            x_label: "Age rating type",
            y_label: "Total Revenue",
            title: "Most fruitful age ratings",
            text: "total_revenue",
        },
    ),
    (
        "per_year",
        PlotDetails {
            query: "SELECT * FROM per_year_revenues",
            x: "release_year",
            y: "total_revenue",
            x_label: "Release year",
            y_label: "Average Revenue",
            title: "Most fruitful years",
            text: "total_revenue",
        },
    ),
    (
        "writers",
        PlotDetails {
            query: "SELECT * FROM writers_revenues LIMIT 30",
            x: "writer",
            y: "total_revenue",
            x_label: "Writer",
            y_label: "Total Revenue",
            title: "Most successful writers",
            text: "total_revenue",
        },
    ),
];

/// Registry lookup for one selection key.
pub fn plot_details(key: &str) -> Option<&'static PlotDetails> {
    SELECTIONS
        .iter()
        .find(|(name, _)| *name == key)
        .map(|(_, details)| details)
}

/// All selection keys, in registry order.
pub fn selection_keys() -> Vec<&'static str> {
    SELECTIONS.iter().map(|(name, _)| *name).collect()
}

impl Warehouse {
    /// Execute the canned query for `key` and build the bar-chart figure:
    /// value annotations on each bar, x labels rotated -90°, fixed
    /// 1250x700 canvas, currency-formatted hover tooltip.
    pub fn render_dashboard(&self, key: &str) -> Result<Value, WarehouseError> {
        let details =
            plot_details(key).ok_or_else(|| WarehouseError::UnknownSelection(key.to_string()))?;
        let (columns, rows) = self.query_json(details.query)?;

        let series = |name: &str| -> Result<Vec<Value>, WarehouseError> {
            let index = columns.iter().position(|column| column == name).ok_or_else(|| {
                WarehouseError::NoSuchColumn {
                    table: details.query.to_string(),
                    column: name.to_string(),
                }
            })?;
            Ok(rows.iter().map(|row| row[index].clone()).collect())
        };

        Ok(json!({
            "data": [{
                "type": "bar",
                "x": series(details.x)?,
                "y": series(details.y)?,
                "text": series(details.text)?,
                "texttemplate": "%{text:.2s}",
                "textposition": "outside",
                "hovertemplate": "%{x}: %{y:,.0f} $<extra></extra>",
            }],
            "layout": {
                "title": { "text": details.title },
                "xaxis": { "title": { "text": details.x_label }, "tickangle": -90 },
                "yaxis": { "title": { "text": details.y_label } },
                "height": 700,
                "width": 1250,
                "margin": { "l": 50, "r": 50, "t": 100, "b": 100 },
            },
        }))
    }
}

/// Write a figure as a standalone HTML page that loads plotly from its CDN.
pub fn write_html(figure: &Value, path: &Path) -> Result<(), WarehouseError> {
    let page = format!(
        "<!DOCTYPE html>\n<html>\n<head>\n\
         <meta charset=\"utf-8\"/>\n\
         <script src=\"https://cdn.plot.ly/plotly-2.32.0.min.js\"></script>\n\
         </head>\n<body>\n<div id=\"chart\"></div>\n<script>\n\
         const figure = {figure};\n\
         Plotly.newPlot(\"chart\", figure.data, figure.layout);\n\
         </script>\n</body>\n</html>\n"
    );
    fs::write(path, page)?;
    Ok(())
}
