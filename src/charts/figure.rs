//! Plotly-compatible figure descriptions.
//!
//! The server only describes charts; the browser draws them with plotly.js
//! (`Plotly.react(el, figure.data, figure.layout)`). Field names therefore
//! follow plotly's JSON schema.

use serde::Serialize;

const BG_COLOR: &str = "#111111";
const FG_COLOR: &str = "#f2f5fa";
const GRID_COLOR: &str = "#283442";

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Figure {
    pub data: Vec<Trace>,
    pub layout: Layout,
}

impl Figure {
    pub fn new(title: impl Into<String>) -> Self {
        Self {
            data: Vec::new(),
            layout: Layout::dark(title),
        }
    }

    pub fn with_trace(mut self, trace: Trace) -> Self {
        self.data.push(trace);
        self
    }

    pub fn with_axes(mut self, x_title: impl Into<String>, y_title: impl Into<String>) -> Self {
        self.layout.xaxis = Some(Axis::titled(x_title));
        self.layout.yaxis = Some(Axis::titled(y_title));
        self
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum Trace {
    Pie {
        labels: Vec<String>,
        values: Vec<f64>,
    },
    Bar {
        name: String,
        x: Vec<String>,
        y: Vec<f64>,
        text: Vec<String>,
    },
    Box {
        name: String,
        y: Vec<f64>,
        boxpoints: BoxPoints,
    },
    Scatter {
        name: String,
        x: Vec<f64>,
        y: Vec<f64>,
        mode: ScatterMode,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum BoxPoints {
    All,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ScatterMode {
    Lines,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum BarMode {
    Stack,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Title {
    pub text: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Font {
    pub color: &'static str,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Axis {
    pub title: Title,
    pub gridcolor: &'static str,
}

impl Axis {
    fn titled(text: impl Into<String>) -> Self {
        Self {
            title: Title { text: text.into() },
            gridcolor: GRID_COLOR,
        }
    }
}

/// Layout with the dark dashboard palette.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Layout {
    pub title: Title,
    pub paper_bgcolor: &'static str,
    pub plot_bgcolor: &'static str,
    pub font: Font,
    pub showlegend: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub barmode: Option<BarMode>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub xaxis: Option<Axis>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub yaxis: Option<Axis>,
}

impl Layout {
    pub fn dark(title: impl Into<String>) -> Self {
        Self {
            title: Title { text: title.into() },
            paper_bgcolor: BG_COLOR,
            plot_bgcolor: BG_COLOR,
            font: Font { color: FG_COLOR },
            showlegend: true,
            barmode: None,
            xaxis: None,
            yaxis: None,
        }
    }
}
