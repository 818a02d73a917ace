pub mod figure;
pub mod plot;
pub mod view3d;

use anyhow::anyhow;
use eframe::egui;

use crate::charts::Figure;
use figure::FigureApp;

/// Something that can show a figure to the user.
pub trait Renderer {
    /// Show `figure`, returning once the user is done with it.
    fn show(&mut self, figure: Figure) -> anyhow::Result<()>;
}

/// Opens one native window per figure and blocks until it is closed.
pub struct WindowRenderer {
    pub window_size: [f32; 2],
}

impl Renderer for WindowRenderer {
    fn show(&mut self, figure: Figure) -> anyhow::Result<()> {
        let options = eframe::NativeOptions {
            viewport: egui::ViewportBuilder::default()
                .with_inner_size(self.window_size)
                .with_min_inner_size([480.0, 320.0]),
            run_and_return: true,
            ..Default::default()
        };

        let title = figure.title.clone();
        eframe::run_native(
            &title,
            options,
            Box::new(|_cc| Ok(Box::new(FigureApp::new(figure)))),
        )
        .map_err(|e| anyhow!("rendering '{title}' failed: {e}"))
    }
}
