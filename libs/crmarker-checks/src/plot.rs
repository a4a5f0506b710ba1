// Plot checks over the plotting library's active figures
use anyhow::{Context, Result};
use crmarker_common::CheckResult;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;
use tracing::debug;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Spine {
    pub name: String,
    pub visible: bool,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Axis {
    pub visible: bool,
    /// Visibility of each tick mark on this axis
    pub ticks: Vec<bool>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Axes {
    /// False once the axis display has been switched off
    pub axis_on: bool,
    pub spines: Vec<Spine>,
    pub xaxis: Axis,
    pub yaxis: Axis,
}

impl Axes {
    /// Axes as freshly created: four visible spines, visible ticks on both axes
    pub fn standard() -> Self {
        let spines = ["left", "right", "top", "bottom"]
            .iter()
            .map(|name| Spine { name: name.to_string(), visible: true })
            .collect();
        let axis = Axis { visible: true, ticks: vec![true; 5] };
        Self {
            axis_on: true,
            spines,
            xaxis: axis.clone(),
            yaxis: axis,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Figure {
    pub axes: Vec<Axes>,
    /// Whether the figure background patch is drawn
    pub patch_visible: bool,
    /// Rendered image bytes as produced by the plotting library
    #[serde(default)]
    pub image: Vec<u8>,
}

impl Figure {
    pub fn save(&self, path: &Path) -> Result<()> {
        fs::write(path, &self.image)
            .with_context(|| format!("Failed to write figure to {}", path.display()))
    }
}

/// The plotting library's registry of open figures
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct FigureSet {
    pub figures: Vec<Figure>,
}

impl FigureSet {
    pub fn new(figures: Vec<Figure>) -> Self {
        Self { figures }
    }

    pub fn len(&self) -> usize {
        self.figures.len()
    }

    pub fn is_empty(&self) -> bool {
        self.figures.is_empty()
    }
}

#[derive(Debug, Clone)]
pub struct PlotCheck<'a> {
    pub result: CheckResult,
    pub figure: Option<&'a Figure>,
    pub axes: Option<&'a Axes>,
}

/// Require exactly one open figure and save it to `output_file`
///
/// With several figures the check fails but the first figure and its first
/// axes are still handed back for inspection.
pub fn check_single_plot<'a>(figures: &'a FigureSet, output_file: &Path) -> Result<PlotCheck<'a>> {
    let first = figures.figures.first();
    let axes = first.and_then(|figure| figure.axes.first());

    let result = match figures.len() {
        0 => CheckResult::failure(
            "Your code did not produce a plot. Make sure you create a figure and plot your data on it.",
        ),
        1 => {
            if let Some(figure) = first {
                figure.save(output_file)?;
                debug!(path = %output_file.display(), "Saved plot artifact");
            }
            CheckResult::ok()
        }
        n => CheckResult::failure(format!(
            "Your code produced {} plots, but it should produce exactly one.",
            n
        )),
    };

    Ok(PlotCheck { result, figure: first, axes })
}

/// True when the plot shows no axes, spines or ticks
pub fn check_bare(figure: &Figure, axes: &Axes) -> bool {
    if !axes.axis_on && !figure.patch_visible {
        return true;
    }
    let spines_hidden = axes.spines.iter().all(|spine| !spine.visible);
    let ticks_hidden = [&axes.xaxis, &axes.yaxis]
        .iter()
        .filter(|axis| axis.visible)
        .all(|axis| axis.ticks.iter().all(|tick| !tick));
    spines_hidden && ticks_hidden
}
