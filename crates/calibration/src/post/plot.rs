use eframe::egui;
use egui_plot::{Legend, Line, LineStyle, Plot, PlotPoints, Points};

use super::{Figure, Style};

impl Figure {
    /// Opens a blocking window displaying the figure.
    ///
    /// # Errors
    ///
    /// Returns an error if the native window cannot be created.
    pub fn show(self) -> Result<(), eframe::Error> {
        let options = eframe::NativeOptions::default();
        let title = self.title.clone();

        eframe::run_native(
            &title,
            options,
            Box::new(move |_cc| Ok(Box::new(FigureApp { figure: self }))),
        )
    }
}

struct FigureApp {
    figure: Figure,
}

impl eframe::App for FigureApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        egui::CentralPanel::default().show(ctx, |ui| {
            ui.heading(&self.figure.title);
            Plot::new("figure")
                .legend(Legend::default())
                .x_axis_label(self.figure.x_label.clone())
                .y_axis_label(self.figure.y_label.clone())
                .show(ui, |plot_ui| {
                    for series in &self.figure.series {
                        let points: PlotPoints = series.points.iter().copied().collect();
                        match series.style {
                            Style::Line => plot_ui.line(Line::new(points).name(&series.label)),
                            Style::Dashed => plot_ui.line(
                                Line::new(points)
                                    .name(&series.label)
                                    .style(LineStyle::dashed_loose()),
                            ),
                            Style::Markers => {
                                plot_ui.points(Points::new(points).name(&series.label).radius(3.0));
                            }
                        }
                    }
                });
        });
    }
}
