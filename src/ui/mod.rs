//! Debug overlay drawn with egui on top of the scene.

pub mod renderer;

use crate::renderer::pipeline::FillMode;
use crate::scene::director::SceneDirector;

#[derive(Debug, Clone, PartialEq)]
pub struct DebugOverlay
{
        pub visible: bool,
        pub ui_scale: f32,
        pub fill_mode: FillMode,
}

impl DebugOverlay
{
        pub fn new(visible: bool) -> Self
        {
                Self {
                        visible,
                        ui_scale: 1.0,
                        fill_mode: FillMode::Fill,
                }
        }

        pub fn toggle(&mut self)
        {
                self.visible = !self.visible;
                log::info!("Debug overlay {}", if self.visible { "shown" } else { "hidden" });
        }

        pub fn show(
                &mut self,
                ctx: &egui::Context,
                director: &mut SceneDirector,
        )
        {
                egui::Area::new("hint".into())
                        .fixed_pos(egui::pos2(10.0, 10.0))
                        .show(ctx, |ui| {
                                ui.label("Press [F1] to toggle the debug panel");
                        });

                if !self.visible
                {
                        return;
                }

                let mut scale = self.ui_scale;

                egui::Window::new("Scene")
                        .anchor(egui::Align2::RIGHT_TOP, [0.0, 0.0])
                        .default_width(300.0)
                        .show(ctx, |ui| {
                                egui::Grid::new("scene_grid")
                                        .num_columns(2)
                                        .spacing([40.0, 4.0])
                                        .show(ui, |ui| {
                                                ui.label("Phase");
                                                ui.label(format!("{:?}", director.phase()));
                                                ui.end_row();

                                                ui.label("Font");
                                                ui.label(director.fonts().describe());
                                                ui.end_row();

                                                ui.label("Text");
                                                ui.label(format!(
                                                        "{:?} ({}/{})",
                                                        director.text().value(),
                                                        director.text().len(),
                                                        director.text().max_len()
                                                ));
                                                ui.end_row();

                                                ui.label("Rebuilds");
                                                ui.label(director.text_meshes().rebuilds().to_string());
                                                ui.end_row();

                                                ui.label("Frames");
                                                ui.label(director.render_loop().frames().to_string());
                                                ui.end_row();

                                                ui.label("Nodes");
                                                ui.label(director.group().len().to_string());
                                                ui.end_row();

                                                ui.label("Geometry");
                                                ui.label(format!(
                                                        "{} live, {} disposed",
                                                        director.resources().live_count(),
                                                        director.resources().disposed_count()
                                                ));
                                                ui.end_row();
                                        });

                                ui.separator();

                                ui.checkbox(&mut director.spin_mut().enabled, "Spin");

                                ui.horizontal(|ui| {
                                        ui.radio_value(&mut self.fill_mode, FillMode::Fill, "Fill");
                                        ui.radio_value(&mut self.fill_mode, FillMode::Wireframe, "Wireframe");
                                });

                                if let Some(camera) = director.camera_mut()
                                {
                                        camera.ui(ui);
                                }

                                ui.separator();

                                ui.horizontal(|ui| {
                                        if ui.button("-").clicked()
                                        {
                                                scale = (scale - 0.1).max(0.5);
                                        }
                                        if ui.button("+").clicked()
                                        {
                                                scale = (scale + 0.1).min(3.0);
                                        }

                                        ui.label(format!("UI Scale: {:.1}", scale));
                                });
                        });

                self.ui_scale = scale;
        }
}
