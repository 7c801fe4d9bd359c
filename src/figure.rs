use plotly::{
    common::{Font, Marker, Mode, Title},
    layout::{Axis, Layout},
    Configuration, Plot, Scatter,
};

use crate::lightcurve::LightCurve;

/// Point color for odd TIC identifiers (red)
pub const ODD_COLOR: &str = "#d9534f";
/// Point color for even TIC identifiers (black)
pub const EVEN_COLOR: &str = "#292b2c";

pub fn point_color(tic: u64) -> &'static str {
    if tic % 2 == 1 {
        ODD_COLOR
    } else {
        EVEN_COLOR
    }
}

/// Builds the interactive scatter figure of one normalized light curve
///
/// Fixed 800x300 canvas, centered title, wheel zoom active on load; pan,
/// box zoom, reset and save come with the standard mode bar.
pub fn lightcurve_figure(lightcurve: &LightCurve, title: &str, point_color: &'static str) -> Plot {
    let trace = Scatter::new(lightcurve.time.clone(), lightcurve.flux.clone())
        .mode(Mode::Markers)
        .marker(Marker::new().size(3).color(point_color));
    let layout = Layout::new()
        .width(800)
        .height(300)
        .title(Title::new(title).font(Font::new().size(14)).x(0.5))
        .x_axis(
            Axis::new()
                .title(Title::new("Time (BJD - 2457000)").font(Font::new().size(14)))
                .tick_font(Font::new().size(10)),
        )
        .y_axis(
            Axis::new()
                .title(Title::new("Normalized Flux").font(Font::new().size(12)))
                .tick_font(Font::new().size(10)),
        );
    let mut plot = Plot::new();
    plot.add_trace(trace);
    plot.set_layout(layout);
    plot.set_configuration(Configuration::new().scroll_zoom(true));
    plot
}
