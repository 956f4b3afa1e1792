// ============================================================================
// TILE RENDERER — shader program lifecycle + per-frame tile drawing
// ============================================================================
//
// Owns the one current shader program and the quad geometry buffers, and
// draws the layout engine's tile list inside egui's paint callback. A
// program rebuild only replaces the current program after a successful link,
// so a failed rebuild leaves the previous (working) program in place.

use glow::HasContext;

use super::shaders::{self, FragmentParts};
use super::texture::{self, GpuTexture};
use crate::layout::{DrawTile, cube_corner_coords};
use crate::log_err;

/// Everything the paint callback needs, snapshotted per frame.
pub struct FrameParams {
    pub zoom: f32,
    /// Pan offset in physical pixels.
    pub pan: [f32; 2],
    pub clear_color: [f32; 3],
    pub blend: bool,
    pub srgb: bool,
    /// Persistent mip policy; tiles with a concrete level override it
    /// transiently for their own draw.
    pub mipmap_level: i32,
    pub cross_variant: u8,
    pub tiles: Vec<DrawTile>,
    pub texture: Option<GpuTexture>,
}

pub struct TileRenderer {
    program: Option<glow::Program>,
    vao: Option<glow::VertexArray>,
    vbo: Option<glow::Buffer>,
    u_mvp: Option<glow::UniformLocation>,
}

// one quad vertex = vec2 position + vec4 texcoord
const FLOATS_PER_VERTEX: usize = 6;
const VERTEX_STRIDE: i32 = (FLOATS_PER_VERTEX * std::mem::size_of::<f32>()) as i32;

impl TileRenderer {
    pub fn new() -> Self {
        Self {
            program: None,
            vao: None,
            vbo: None,
            u_mvp: None,
        }
    }

    /// Compile and link a fresh program for the given fragment pieces and
    /// swizzle expression. On success it becomes current and is activated;
    /// on failure the previous program (if any) stays untouched. Stage
    /// shader objects are released either way.
    pub fn rebuild_program(
        &mut self,
        gl: &glow::Context,
        parts: &FragmentParts,
        swizzle: &str,
    ) -> Result<(), String> {
        let vertex = compile_stage(gl, glow::VERTEX_SHADER, &shaders::vertex_source(), "Vertex")?;
        let fragment = match compile_stage(
            gl,
            glow::FRAGMENT_SHADER,
            &parts.assemble(swizzle),
            "Fragment",
        ) {
            Ok(s) => s,
            Err(e) => {
                unsafe { gl.delete_shader(vertex) };
                return Err(e);
            }
        };

        let link_result = unsafe {
            let program = match gl.create_program() {
                Ok(p) => p,
                Err(e) => {
                    gl.delete_shader(vertex);
                    gl.delete_shader(fragment);
                    return Err(format!("Couldn't create a new shader program: {e}"));
                }
            };
            gl.attach_shader(program, vertex);
            gl.attach_shader(program, fragment);
            gl.link_program(program);
            let result = if gl.get_program_link_status(program) {
                Ok(program)
            } else {
                let log = gl.get_program_info_log(program);
                gl.detach_shader(program, vertex);
                gl.detach_shader(program, fragment);
                gl.delete_program(program);
                Err(format!("Linking shader program failed: {log}"))
            };
            // the stage objects aren't needed once the program is linked
            // (or abandoned)
            gl.delete_shader(vertex);
            gl.delete_shader(fragment);
            result
        };
        let program = link_result?;

        unsafe {
            if let Some(old) = self.program.take() {
                gl.delete_program(old);
            }
            self.program = Some(program);
            gl.use_program(Some(program));
            self.u_mvp = gl.get_uniform_location(program, "u_mvp");
            if let Some(tex0) = gl.get_uniform_location(program, "tex0") {
                gl.uniform_1_i32(Some(&tex0), 0);
            }
            self.configure_geometry(gl, program);
        }
        Ok(())
    }

    /// (Re)bind the quad VAO with the program's attribute locations.
    unsafe fn configure_geometry(&mut self, gl: &glow::Context, program: glow::Program) {
        unsafe {
            if self.vao.is_none() {
                self.vao = gl.create_vertex_array().ok();
                self.vbo = gl.create_buffer().ok();
            }
            let (Some(vao), Some(vbo)) = (self.vao, self.vbo) else {
                return;
            };
            gl.bind_vertex_array(Some(vao));
            gl.bind_buffer(glow::ARRAY_BUFFER, Some(vbo));
            if let Some(a_pos) = gl.get_attrib_location(program, "a_pos") {
                gl.enable_vertex_attrib_array(a_pos);
                gl.vertex_attrib_pointer_f32(a_pos, 2, glow::FLOAT, false, VERTEX_STRIDE, 0);
            }
            if let Some(a_tex) = gl.get_attrib_location(program, "a_texCoord") {
                gl.enable_vertex_attrib_array(a_tex);
                gl.vertex_attrib_pointer_f32(a_tex, 4, glow::FLOAT, false, VERTEX_STRIDE, 8);
            }
            gl.bind_vertex_array(None);
        }
    }

    pub fn has_program(&self) -> bool {
        self.program.is_some()
    }

    /// Draw one frame's worth of tiles. Runs inside egui's paint callback,
    /// which has already set viewport and scissor to the canvas area.
    pub fn paint(&mut self, gl: &glow::Context, viewport_px: [f32; 2], params: &FrameParams) {
        unsafe {
            let [r, g, b] = params.clear_color;
            gl.clear_color(r, g, b, 1.0);
            gl.clear(glow::COLOR_BUFFER_BIT);

            let (Some(program), Some(tex)) = (self.program, params.texture) else {
                // nothing to draw (or no valid program yet): leave the
                // cleared canvas
                return;
            };
            let (Some(vao), Some(vbo)) = (self.vao, self.vbo) else {
                return;
            };

            gl.enable(glow::TEXTURE_CUBE_MAP_SEAMLESS);
            if params.blend {
                gl.enable(glow::BLEND);
                gl.blend_func(glow::SRC_ALPHA, glow::ONE_MINUS_SRC_ALPHA);
            } else {
                gl.disable(glow::BLEND);
            }
            if params.srgb {
                gl.enable(glow::FRAMEBUFFER_SRGB);
            } else {
                gl.disable(glow::FRAMEBUFFER_SRGB);
            }

            gl.use_program(Some(program));
            let mvp = ortho_mvp(viewport_px, params.zoom, params.pan);
            gl.uniform_matrix_4_f32_slice(self.u_mvp.as_ref(), false, &mvp);

            gl.active_texture(glow::TEXTURE0);
            gl.bind_texture(tex.target, Some(tex.handle));
            gl.bind_vertex_array(Some(vao));
            gl.bind_buffer(glow::ARRAY_BUFFER, Some(vbo));

            for tile in &params.tiles {
                let level = if tile.mip_level < 0 {
                    params.mipmap_level
                } else {
                    tile.mip_level
                };
                texture::apply_mip_policy(gl, &tex, level, false);

                let verts = tile_vertices(tile, params.cross_variant);
                gl.buffer_data_u8_slice(
                    glow::ARRAY_BUFFER,
                    bytemuck::cast_slice(&verts),
                    glow::STREAM_DRAW,
                );
                gl.draw_arrays(glow::TRIANGLE_FAN, 0, 4);
            }

            gl.bind_vertex_array(None);
            // make sure this is off again or egui's own pass will look wrong
            gl.disable(glow::FRAMEBUFFER_SRGB);
        }
    }

    /// Release all GL objects. Called at shutdown, before the context dies.
    pub fn destroy(&mut self, gl: &glow::Context) {
        unsafe {
            if let Some(program) = self.program.take() {
                gl.delete_program(program);
            }
            if let Some(vao) = self.vao.take() {
                gl.delete_vertex_array(vao);
            }
            if let Some(vbo) = self.vbo.take() {
                gl.delete_buffer(vbo);
            }
        }
        self.u_mvp = None;
    }
}

/// Compile one shader stage; on failure the shader object is deleted and the
/// error names the stage and carries the driver's info log.
fn compile_stage(
    gl: &glow::Context,
    stage: u32,
    source: &str,
    stage_name: &str,
) -> Result<glow::Shader, String> {
    unsafe {
        let shader = gl
            .create_shader(stage)
            .map_err(|e| format!("Couldn't create {stage_name} shader object: {e}"))?;
        gl.shader_source(shader, source);
        gl.compile_shader(shader);
        if gl.get_shader_compile_status(shader) {
            Ok(shader)
        } else {
            let log = gl.get_shader_info_log(shader);
            gl.delete_shader(shader);
            log_err!("Shader source that failed to compile:\n{source}");
            Err(format!("Compiling {stage_name} shader failed: {log}"))
        }
    }
}

/// Column-major orthographic projection matching the canvas pixels,
/// composed with the pan/zoom transform: screen = zoom * p + pan.
/// Pan is applied after scaling, so dragging moves the image by the same
/// number of screen pixels at every zoom level.
fn ortho_mvp(viewport_px: [f32; 2], zoom: f32, pan: [f32; 2]) -> [f32; 16] {
    let [w, h] = viewport_px;
    [
        2.0 * zoom / w, 0.0, 0.0, 0.0, //
        0.0, -2.0 * zoom / h, 0.0, 0.0, //
        0.0, 0.0, 1.0, 0.0, //
        2.0 * pan[0] / w - 1.0, 1.0 - 2.0 * pan[1] / h, 0.0, 1.0,
    ]
}

/// Expand a tile into its 4 quad vertices (position + 4-component texcoord),
/// in fan order: top-left, bottom-left, bottom-right, top-right.
fn tile_vertices(tile: &DrawTile, cross_variant: u8) -> [f32; 4 * FLOATS_PER_VERTEX] {
    let [x, y] = tile.pos;
    let [w, h] = tile.size;
    let positions = [[x, y], [x, y + h], [x + w, y + h], [x + w, y]];

    let tex_coords = match tile.face {
        Some(face) => cube_corner_coords(
            face,
            cross_variant,
            tile.array_index as f32,
            tile.tex_coord_max,
        ),
        None => {
            let layer = tile.array_index as f32;
            let [s, t] = tile.tex_coord_max;
            [
                [0.0, 0.0, layer, 0.0],
                [0.0, t, layer, 0.0],
                [s, t, layer, 0.0],
                [s, 0.0, layer, 0.0],
            ]
        }
    };

    let mut verts = [0.0f32; 4 * FLOATS_PER_VERTEX];
    for i in 0..4 {
        let base = i * FLOATS_PER_VERTEX;
        verts[base..base + 2].copy_from_slice(&positions[i]);
        verts[base + 2..base + 6].copy_from_slice(&tex_coords[i]);
    }
    verts
}
