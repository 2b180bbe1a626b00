use std::time::Instant;

/// The `egui` re-export for building native GUIs with the eframe framework.
use eframe::egui::{self, Align2, Color32, FontId, Key, Vec2};
/// The `egui_plot` crate for plotting the FPS history.
use egui_plot::{Line, Plot, PlotPoints};

use crate::simulation::Simulation;
use crate::storage::Rgb;

const TITLE: &str = "Bouncing Circles";
const PANEL_WIDTH: f32 = 220.0;

impl From<Rgb> for Color32 {
    fn from(c: Rgb) -> Self {
        Color32::from_rgb(c.r, c.g, c.b)
    }
}

/// Window around a [`Simulation`]: steps it once per frame, draws the
/// circles and keeps the frame statistics.
///
/// Keys: `Space` pauses, `F` toggles the FPS overlay, `Escape` quits.
pub struct ViewerApp {
    sim: Simulation,
    running: bool,
    show_fps: bool,
    last_frame: Instant,
}

impl ViewerApp {
    pub fn new(sim: Simulation) -> Self {
        Self {
            sim,
            running: true,
            show_fps: true,
            last_frame: Instant::now(),
        }
    }

    fn handle_keys(&mut self, ctx: &egui::Context) {
        let (quit, pause, fps) = ctx.input(|i| {
            (
                i.key_pressed(Key::Escape),
                i.key_pressed(Key::Space),
                i.key_pressed(Key::F),
            )
        });
        if quit {
            ctx.send_viewport_cmd(egui::ViewportCommand::Close);
        }
        if pause {
            self.running = !self.running;
        }
        if fps {
            self.show_fps = !self.show_fps;
        }
    }

    fn side_panel(&self, ctx: &egui::Context) {
        egui::SidePanel::right("stats_panel")
            .exact_width(PANEL_WIDTH)
            .show(ctx, |ui| {
                ui.heading("Simulation");
                ui.label(format!("Particles: {}", self.sim.particles().len()));
                ui.label(format!("Workers: {}", self.sim.engine().workers()));
                ui.label(format!("Seed: {}", self.sim.seed()));
                ui.label(format!("Ticks: {}", self.sim.ticks()));

                let collisions = self.sim.last_collisions();
                ui.label(format!("Colliding pairs: {}", collisions.pairs));
                if let Some(tick) = self.sim.stats().average_tick_time() {
                    ui.label(format!("Avg tick: {:.3} ms", tick.as_secs_f64() * 1000.0));
                }
                if !self.running {
                    ui.label("Paused (Space to resume)");
                }

                ui.separator();
                ui.label("FPS (one sample per second)");
                let points: Vec<[f64; 2]> = self
                    .sim
                    .stats()
                    .history()
                    .enumerate()
                    .map(|(i, fps)| [i as f64, fps as f64])
                    .collect();
                Plot::new("fps_history")
                    .height(160.0)
                    .allow_scroll(false)
                    .allow_drag(false)
                    .show(ui, |plot_ui| {
                        if !points.is_empty() {
                            plot_ui.line(Line::new(PlotPoints::from(points)));
                        }
                    });
            });
    }

    fn arena_view(&self, ctx: &egui::Context) {
        egui::CentralPanel::default()
            .frame(egui::Frame::none().fill(Color32::BLACK))
            .show(ctx, |ui| {
                let painter = ui.painter();
                let rect = ui.max_rect();
                let params = self.sim.params();

                // Scale from the arena to the drawing area:
                let scale_x = rect.width() / params.width as f32;
                let scale_y = rect.height() / params.height as f32;
                let scale = scale_x.min(scale_y);

                for p in self.sim.particles().iter() {
                    let pos = rect.min + Vec2::new(p.x * scale, p.y * scale);
                    painter.circle_filled(pos, params.radius * scale, Color32::from(p.color));
                }

                if self.show_fps {
                    painter.text(
                        rect.min + Vec2::splat(10.0),
                        Align2::LEFT_TOP,
                        format!("FPS: {}", self.sim.stats().displayed_fps()),
                        FontId::monospace(18.0),
                        Color32::WHITE,
                    );
                }
            });
    }
}

impl eframe::App for ViewerApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        let frame_start = Instant::now();
        self.handle_keys(ctx);

        let tick_time = self.running.then(|| self.sim.step().tick_time);

        self.side_panel(ctx);
        self.arena_view(ctx);

        let frame_time = frame_start.duration_since(self.last_frame);
        self.last_frame = frame_start;
        self.sim.record_frame(frame_time, tick_time);

        match self.sim.frame_delay(frame_start.elapsed()) {
            Some(delay) => ctx.request_repaint_after(delay),
            None => ctx.request_repaint(),
        }
    }
}

impl Drop for ViewerApp {
    fn drop(&mut self) {
        log::info!("{}", self.sim.stats().summary());
    }
}

/// Opens the window and blocks until it is closed.
pub fn run(sim: Simulation) -> eframe::Result<()> {
    let params = sim.params();
    let native_options = eframe::NativeOptions {
        viewport: egui::ViewportBuilder::default()
            .with_title(TITLE)
            .with_inner_size([params.width as f32 + PANEL_WIDTH, params.height as f32]),
        ..Default::default()
    };

    eframe::run_native(
        TITLE,
        native_options,
        Box::new(move |_cc| Ok(Box::new(ViewerApp::new(sim)))),
    )
}
