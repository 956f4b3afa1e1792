// ============================================================================
// VIEWER APP — egui application state, sidebar controls, canvas
// ============================================================================
//
// One texture is resident at a time. Opening a file runs the whole pipeline
// (decode, GPU upload, shader rebuild) to completion before any live state is
// replaced, so a failed open leaves the current view fully intact.

use std::path::Path;
use std::rc::Rc;
use std::sync::Arc;

use eframe::egui;
use egui::mutex::Mutex;

use crate::gpu::shaders::synthesize_fragment_parts;
use crate::gpu::{self, FrameParams, GpuTexture, TileRenderer};
use crate::layout::{LayoutParams, ViewMode, compute_layout};
use crate::swizzle::SwizzleState;
use crate::texture::TextureData;
use crate::zoom::{self, ZOOM_MAX, ZOOM_MIN};
use crate::{io, log_err, log_info};

struct LoadedTexture {
    data: TextureData,
    gpu: GpuTexture,
}

pub struct ViewerApp {
    gl: Rc<glow::Context>,
    renderer: Arc<Mutex<TileRenderer>>,
    texture: Option<LoadedTexture>,

    layout: LayoutParams,
    swizzle: SwizzleState,
    show_advanced: bool,
    /// Compile/link error of the last failed shader rebuild; the previous
    /// program keeps drawing while this is shown.
    shader_error: Option<String>,
    load_error: Option<String>,

    /// Persistent mip policy: -1 = auto, otherwise the forced level.
    mipmap_level: i32,
    linear_filter: bool,
    /// -1 = texture default, 0 = force off, 1 = force on.
    override_blend: i8,
    override_srgb: i8,
    clear_color: [f32; 3],

    zoom: f64,
    /// Pan offset in physical pixels.
    trans: [f64; 2],
    /// Fit-to-window requested; applied once the canvas size is known.
    pending_fit: bool,
    last_canvas_px: [f32; 2],
}

impl ViewerApp {
    pub fn new(cc: &eframe::CreationContext<'_>, path: Option<std::path::PathBuf>) -> Self {
        let gl = cc
            .gl
            .clone()
            .expect("eframe was not compiled with the glow backend");

        let defaults = ViewDefaults::default();
        let mut app = Self {
            gl,
            renderer: Arc::new(Mutex::new(TileRenderer::new())),
            texture: None,
            layout: LayoutParams::default(),
            swizzle: SwizzleState::default(),
            show_advanced: false,
            shader_error: None,
            load_error: None,
            mipmap_level: defaults.mipmap_level,
            linear_filter: defaults.linear_filter,
            override_blend: -1,
            override_srgb: -1,
            clear_color: [0.45, 0.55, 0.6],
            zoom: defaults.zoom,
            trans: defaults.trans,
            pending_fit: false,
            last_canvas_px: [0.0, 0.0],
        };
        if let Some(path) = path {
            app.open(&path, &cc.egui_ctx);
        }
        app
    }

    /// Open a texture file, replacing the current one only on full success.
    fn open(&mut self, path: &Path, ctx: &egui::Context) {
        match self.try_open(path) {
            Ok(()) => {
                self.load_error = None;
                ctx.send_viewport_cmd(egui::ViewportCommand::Title(window_title(path)));
                log_info!("Loaded {}", path.display());
            }
            Err(e) => {
                log_err!("Loading {} failed: {}", path.display(), e);
                self.load_error = Some(e);
            }
        }
    }

    fn try_open(&mut self, path: &Path) -> Result<(), String> {
        let data = io::load_texture(path)?;
        let gpu_tex = gpu::texture::create(&self.gl, &data)?;

        let mut swizzle = SwizzleState {
            simple: data.default_swizzle.clone().unwrap_or_else(|| "rgba".into()),
            ..Default::default()
        };
        swizzle.refresh_expression();

        let parts = synthesize_fragment_parts(&data);
        if let Err(e) =
            self.renderer
                .lock()
                .rebuild_program(&self.gl, &parts, &swizzle.expression)
        {
            gpu::texture::destroy(&self.gl, &gpu_tex);
            return Err(e);
        }

        // everything succeeded: now the old resources may die
        if let Some(old) = self.texture.take() {
            gpu::texture::destroy(&self.gl, &old.gpu);
        }
        gpu::texture::set_filter(&self.gl, &gpu_tex, self.linear_filter);

        let next = post_load_view(data.is_cubemap(), self.mipmap_level);
        self.swizzle = swizzle;
        self.show_advanced = false;
        self.shader_error = None;
        self.layout.array_index = 0;
        self.layout.spacing = next.spacing;
        self.mipmap_level = next.mipmap_level;
        self.texture = Some(LoadedTexture {
            data,
            gpu: gpu_tex,
        });
        if next.fit_to_window {
            self.pending_fit = true;
        }
        Ok(())
    }

    /// Rebuild the fragment shader from the current swizzle. A failure keeps
    /// the previous program and surfaces the driver's log in the UI.
    fn update_shaders(&mut self) {
        let Some(tex) = &self.texture else {
            return;
        };
        self.swizzle.refresh_expression();
        let parts = synthesize_fragment_parts(&tex.data);
        match self
            .renderer
            .lock()
            .rebuild_program(&self.gl, &parts, &self.swizzle.expression)
        {
            Ok(()) => self.shader_error = None,
            Err(e) => {
                log_err!("{}", e);
                self.shader_error = Some(e);
            }
        }
    }

    fn reset_view(&mut self) {
        self.zoom = 1.0;
        self.trans = [10.0, 10.0];
    }

    fn apply_fit(&mut self) {
        let Some(tex) = &self.texture else {
            self.pending_fit = false;
            return;
        };
        let [w, h] = self.last_canvas_px;
        if w <= 0.0 || h <= 0.0 {
            // canvas not sized yet; try again next frame
            return;
        }
        let (tw, th) = tex.data.size();
        let (zoom, tx, ty) = zoom::fit_to_view(w as f64, h as f64, tw, th, tex.data.is_cubemap());
        self.zoom = zoom;
        self.trans = [tx, ty];
        self.pending_fit = false;
    }

    fn set_advanced(&mut self, on: bool) {
        self.show_advanced = on;
        self.swizzle.use_simple = !on;
        if !on {
            // back to the simple form: it becomes authoritative again
            self.update_shaders();
        }
    }

    // ------------------------------------------------------------------
    // Sidebar
    // ------------------------------------------------------------------

    fn sidebar(&mut self, ui: &mut egui::Ui) {
        ui.heading("Texture");
        if ui.button("Open…").clicked()
            && let Some(path) = io::pick_texture_file()
        {
            let ctx = ui.ctx().clone();
            self.open(&path, &ctx);
        }
        if let Some(err) = &self.load_error {
            ui.colored_label(egui::Color32::RED, err);
        }

        let Some(info) = self.texture.as_ref().map(|t| TextureInfo::of(&t.data)) else {
            ui.label("No texture loaded.");
            return;
        };
        ui.label(&info.summary);
        ui.separator();

        if info.is_cube {
            ui.label("Cubemap Cross");
            ui.add(
                egui::Slider::new(&mut self.layout.cross_variant, 0..=3u8).text("Rotation"),
            );
        } else {
            let prev_mode = self.layout.view_mode;
            egui::ComboBox::from_label("View Mode")
                .selected_text(self.layout.view_mode.label())
                .show_ui(ui, |ui| {
                    for mode in ViewMode::ALL {
                        ui.selectable_value(&mut self.layout.view_mode, mode, mode.label());
                    }
                });
            if prev_mode == ViewMode::Single && self.layout.view_mode != ViewMode::Single {
                // multi-tile views need roughly twice the room
                self.zoom *= 0.5;
            }

            match self.layout.view_mode {
                ViewMode::MipmapsCompact | ViewMode::MipmapsRow | ViewMode::MipmapsColumn => {
                    ui.checkbox(&mut self.layout.same_size, "Show all mips at full size");
                    ui.horizontal(|ui| {
                        ui.label("Spacing");
                        ui.add(
                            egui::DragValue::new(&mut self.layout.spacing).clamp_range(0..=32),
                        );
                    });
                }
                ViewMode::Tiled => {
                    ui.horizontal(|ui| {
                        ui.label("Tiles");
                        ui.add(
                            egui::DragValue::new(&mut self.layout.num_tiles[0])
                                .clamp_range(1..=64),
                        );
                        ui.label("x");
                        ui.add(
                            egui::DragValue::new(&mut self.layout.num_tiles[1])
                                .clamp_range(1..=64),
                        );
                    });
                }
                ViewMode::Single => {}
            }
        }

        if info.is_array {
            ui.add(
                egui::Slider::new(&mut self.layout.array_index, 0..=info.layers - 1)
                    .text("Array Layer"),
            );
        }

        // the grid views pin a level per tile, so the persistent policy only
        // applies in the full-texture views
        let uses_mip_policy = info.is_cube
            || matches!(self.layout.view_mode, ViewMode::Single | ViewMode::Tiled);
        if info.mips > 1 && uses_mip_policy {
            let (w, h) = (info.width, info.height);
            ui.add(
                egui::Slider::new(&mut self.mipmap_level, -1..=info.mips - 1)
                    .text("Mip Level")
                    .custom_formatter(move |n, _| {
                        if n < 0.0 {
                            "Auto".to_string()
                        } else {
                            let lvl = n as u32;
                            format!("{} ({}x{})", lvl, (w >> lvl).max(1), (h >> lvl).max(1))
                        }
                    }),
            );
        }

        let prev_filter = self.linear_filter;
        egui::ComboBox::from_label("Filtering")
            .selected_text(if self.linear_filter { "Linear" } else { "Nearest" })
            .show_ui(ui, |ui| {
                ui.selectable_value(&mut self.linear_filter, false, "Nearest");
                ui.selectable_value(&mut self.linear_filter, true, "Linear");
            });
        if self.linear_filter != prev_filter
            && let Some(tex) = &self.texture
        {
            gpu::texture::set_filter(&self.gl, &tex.gpu, self.linear_filter);
        }

        ui.separator();
        ui.add(
            egui::Slider::new(&mut self.zoom, ZOOM_MIN..=ZOOM_MAX)
                .logarithmic(true)
                .text("Zoom")
                .custom_formatter(|n, _| format!("{:.1}%", n * 100.0)),
        );
        if ui.button("Fit to Window").clicked() {
            self.pending_fit = true;
        }
        ui.horizontal(|ui| {
            if ui.button("Reset Zoom").clicked() {
                self.zoom = 1.0;
            }
            if ui.button("Reset Position").clicked() {
                self.trans = [10.0, 10.0];
            }
        });

        ui.separator();
        ui.horizontal(|ui| {
            ui.label("Swizzle");
            let response = ui.add_enabled(
                self.swizzle.use_simple,
                egui::TextEdit::singleline(&mut self.swizzle.simple).desired_width(60.0),
            );
            if response.changed() {
                self.swizzle.sanitize_simple();
                self.update_shaders();
            }
        });
        let mut advanced = self.show_advanced;
        if ui.checkbox(&mut advanced, "Advanced GLSL editor").changed() {
            self.set_advanced(advanced);
        }

        ui.separator();
        override_combo(ui, "Alpha Blending", &mut self.override_blend);
        override_combo(ui, "sRGB Decoding", &mut self.override_srgb);
        ui.horizontal(|ui| {
            ui.label("Background");
            ui.color_edit_button_rgb(&mut self.clear_color);
        });
    }

    fn advanced_window(&mut self, ctx: &egui::Context) {
        if !self.show_advanced {
            return;
        }
        let mut open = true;
        egui::Window::new("Swizzle Expression")
            .open(&mut open)
            .default_width(360.0)
            .show(ctx, |ui| {
                if let Some(tex) = &self.texture {
                    // generated context the expression runs after
                    let parts = synthesize_fragment_parts(&tex.data);
                    ui.monospace(parts.sample_and_normalize.trim_end());
                }
                ui.add(
                    egui::TextEdit::multiline(&mut self.swizzle.expression)
                        .code_editor()
                        .desired_rows(4),
                );
                if ui.button("Apply").clicked() {
                    self.update_shaders();
                }
                if let Some(err) = &self.shader_error {
                    ui.colored_label(egui::Color32::RED, err);
                }
            });
        if !open {
            self.set_advanced(false);
        }
    }

    // ------------------------------------------------------------------
    // Canvas
    // ------------------------------------------------------------------

    fn canvas(&mut self, ui: &mut egui::Ui) {
        let (rect, response) =
            ui.allocate_exact_size(ui.available_size(), egui::Sense::click_and_drag());
        let ppp = ui.ctx().pixels_per_point();
        self.last_canvas_px = [rect.width() * ppp, rect.height() * ppp];
        if self.pending_fit {
            self.apply_fit();
        }

        if response.dragged() {
            let delta = response.drag_delta();
            self.trans[0] += (delta.x * ppp) as f64;
            self.trans[1] += (delta.y * ppp) as f64;
        }
        if response.hovered() {
            let scroll = ui.input(|i| i.scroll_delta.y);
            if scroll > 0.0 {
                self.zoom = zoom::step(self.zoom, true);
            } else if scroll < 0.0 {
                self.zoom = zoom::step(self.zoom, false);
            }
        }
        if !ui.ctx().wants_keyboard_input() && ui.input(|i| i.key_pressed(egui::Key::R)) {
            self.reset_view();
        }

        let (tiles, blend, srgb, texture) = match &self.texture {
            Some(tex) => (
                compute_layout(&tex.data, &self.layout),
                resolve_override(self.override_blend, tex.data.traits.has_alpha),
                resolve_override(self.override_srgb, tex.data.traits.is_srgb),
                Some(tex.gpu),
            ),
            None => (Vec::new(), false, false, None),
        };
        let params = FrameParams {
            zoom: self.zoom as f32,
            pan: [self.trans[0] as f32, self.trans[1] as f32],
            clear_color: self.clear_color,
            blend,
            srgb,
            mipmap_level: self.mipmap_level,
            cross_variant: self.layout.cross_variant,
            tiles,
            texture,
        };

        let renderer = self.renderer.clone();
        ui.painter().add(egui::PaintCallback {
            rect,
            callback: Arc::new(egui_glow::CallbackFn::new(move |info, painter| {
                let vp = info.viewport_in_pixels();
                renderer.lock().paint(
                    painter.gl(),
                    [vp.width_px as f32, vp.height_px as f32],
                    &params,
                );
            })),
        });
    }
}

impl eframe::App for ViewerApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        egui::SidePanel::left("controls")
            .default_width(230.0)
            .show(ctx, |ui| {
                egui::ScrollArea::vertical().show(ui, |ui| self.sidebar(ui));
            });
        self.advanced_window(ctx);
        egui::CentralPanel::default()
            .frame(egui::Frame::none())
            .show(ctx, |ui| self.canvas(ui));
    }

    fn on_exit(&mut self, gl: Option<&glow::Context>) {
        if let Some(gl) = gl {
            if let Some(tex) = self.texture.take() {
                gpu::texture::destroy(gl, &tex.gpu);
            }
            self.renderer.lock().destroy(gl);
        }
    }
}

/// Sidebar metadata snapshot, gathered up front so the controls below can
/// borrow `self` mutably.
struct TextureInfo {
    summary: String,
    is_cube: bool,
    is_array: bool,
    layers: i32,
    mips: i32,
    width: u32,
    height: u32,
}

impl TextureInfo {
    fn of(data: &TextureData) -> Self {
        let mut summary = format!(
            "{}x{}, {} mip levels\n{}",
            data.width, data.height, data.mip_count, data.format_name
        );
        if data.is_array {
            summary.push_str(&format!("\n{} layers", data.layers));
        }
        if data.is_cubemap() {
            summary.push_str("\nCubemap");
        }
        let mut flags = Vec::new();
        if data.traits.has_alpha {
            flags.push("alpha");
        }
        if data.traits.is_srgb {
            flags.push("sRGB");
        }
        if data.traits.int_format.is_some() {
            flags.push("integer");
        }
        if !flags.is_empty() {
            summary.push('\n');
            summary.push_str(&flags.join(", "));
        }
        Self {
            summary,
            is_cube: data.is_cubemap(),
            is_array: data.is_array,
            layers: data.layers.max(1) as i32,
            mips: data.mip_count as i32,
            width: data.width,
            height: data.height,
        }
    }
}

/// View-state changes a successful load applies. Only a cubemap touches
/// zoom/pan (through a deferred fit-to-window); any other texture keeps the
/// current view so reloads and comparisons stay in place.
struct PostLoadView {
    spacing: i32,
    mipmap_level: i32,
    fit_to_window: bool,
}

fn post_load_view(is_cube: bool, mipmap_level: i32) -> PostLoadView {
    PostLoadView {
        spacing: if is_cube { 0 } else { 2 },
        // a forced level from the previous texture may not exist here
        mipmap_level: if mipmap_level >= 0 { 0 } else { mipmap_level },
        fit_to_window: is_cube,
    }
}

/// Startup values for the view controls.
struct ViewDefaults {
    mipmap_level: i32,
    linear_filter: bool,
    zoom: f64,
    trans: [f64; 2],
}

impl Default for ViewDefaults {
    fn default() -> Self {
        Self {
            mipmap_level: -1,
            linear_filter: false,
            zoom: 1.0,
            trans: [10.0, 10.0],
        }
    }
}

/// Three-state override: -1 follows the texture's own trait.
fn resolve_override(value: i8, texture_default: bool) -> bool {
    match value {
        0 => false,
        1 => true,
        _ => texture_default,
    }
}

fn override_combo(ui: &mut egui::Ui, label: &str, value: &mut i8) {
    let text = |v: i8| match v {
        0 => "Force Off",
        1 => "Force On",
        _ => "Texture Default",
    };
    egui::ComboBox::from_label(label)
        .selected_text(text(*value))
        .show_ui(ui, |ui| {
            for v in [-1i8, 0, 1] {
                ui.selectable_value(value, v, text(v));
            }
        });
}

fn window_title(path: &Path) -> String {
    let name = path
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string());
    format!("Texture Viewer - {}", name)
}

#[cfg(test)]
mod tests {
    use super::*;

    // Pins the context-handle type to what eframe's glow backend hands out.
    #[allow(dead_code)]
    fn gl_handle(cc: &eframe::CreationContext<'_>) -> Option<Rc<glow::Context>> {
        cc.gl.clone()
    }

    #[test]
    fn startup_uses_nearest_filtering_and_auto_mips() {
        let d = ViewDefaults::default();
        assert!(!d.linear_filter);
        assert_eq!(d.mipmap_level, -1);
        assert_eq!(d.zoom, 1.0);
        assert_eq!(d.trans, [10.0, 10.0]);
    }

    #[test]
    fn plain_texture_load_keeps_the_view() {
        let next = post_load_view(false, -1);
        assert!(!next.fit_to_window);
        assert_eq!(next.spacing, 2);
        assert_eq!(next.mipmap_level, -1);
    }

    #[test]
    fn cubemap_load_fits_and_drops_spacing() {
        let next = post_load_view(true, -1);
        assert!(next.fit_to_window);
        assert_eq!(next.spacing, 0);
    }

    #[test]
    fn forced_mip_level_resets_on_load() {
        assert_eq!(post_load_view(false, 3).mipmap_level, 0);
        assert_eq!(post_load_view(false, -1).mipmap_level, -1);
    }

    #[test]
    fn override_resolution() {
        assert!(!resolve_override(0, true));
        assert!(resolve_override(1, false));
        assert!(resolve_override(-1, true));
        assert!(!resolve_override(-1, false));
    }

    #[test]
    fn title_uses_file_name_only() {
        assert_eq!(
            window_title(Path::new("/tmp/foo/bricks.png")),
            "Texture Viewer - bricks.png"
        );
    }

    #[test]
    fn info_summary_mentions_shape() {
        let data = TextureData {
            width: 64,
            height: 64,
            mip_count: 7,
            layers: 4,
            is_array: true,
            format_name: "Png (Rgba8, sRGB)".into(),
            ..Default::default()
        };
        let info = TextureInfo::of(&data);
        assert!(info.summary.contains("64x64"));
        assert!(info.summary.contains("7 mip levels"));
        assert!(info.summary.contains("4 layers"));
        assert!(info.is_array);
        assert_eq!(info.layers, 4);
    }
}
