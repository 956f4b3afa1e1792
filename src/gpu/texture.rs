// ============================================================================
// GPU TEXTURE — GL-side texture wrapper: upload, filtering, mip policy
// ============================================================================

use glow::HasContext;

use crate::texture::TextureData;

/// GL handle plus the two bits of metadata every draw needs.
#[derive(Clone, Copy)]
pub struct GpuTexture {
    pub handle: glow::Texture,
    /// GL target: TEXTURE_2D, TEXTURE_2D_ARRAY, TEXTURE_CUBE_MAP or
    /// TEXTURE_CUBE_MAP_ARRAY.
    pub target: u32,
    pub num_mips: i32,
}

/// Pick the GL texture target for a texture's shape.
pub fn target_for(cubemap: bool, array: bool) -> u32 {
    match (cubemap, array) {
        (true, true) => glow::TEXTURE_CUBE_MAP_ARRAY,
        (true, false) => glow::TEXTURE_CUBE_MAP,
        (false, true) => glow::TEXTURE_2D_ARRAY,
        (false, false) => glow::TEXTURE_2D,
    }
}

/// (internal format, pixel format, component type) for a texture's traits.
/// Integer data is 16-bit from our decoders; everything else is RGBA8,
/// with the sRGB internal format when the source is sRGB-encoded.
fn gl_formats(tex: &TextureData) -> (i32, u32, u32) {
    if tex.traits.int_format.is_some() {
        (
            glow::RGBA16UI as i32,
            glow::RGBA_INTEGER,
            glow::UNSIGNED_SHORT,
        )
    } else if tex.traits.is_srgb {
        (glow::SRGB8_ALPHA8 as i32, glow::RGBA, glow::UNSIGNED_BYTE)
    } else {
        (glow::RGBA8 as i32, glow::RGBA, glow::UNSIGNED_BYTE)
    }
}

/// Upload a decoded texture to the GPU.
///
/// Only mip level 0 surfaces are uploaded; when the resource advertises a
/// mip chain the remaining levels are generated on the GPU. On failure no
/// GL object is left allocated.
pub fn create(gl: &glow::Context, tex: &TextureData) -> Result<GpuTexture, String> {
    let target = target_for(tex.is_cubemap(), tex.is_array);
    let (internal, format, ty) = gl_formats(tex);

    let handle = unsafe { gl.create_texture() }
        .map_err(|e| format!("Couldn't create GL texture object: {e}"))?;

    let w = tex.width as i32;
    let h = tex.height as i32;
    let layers = tex.layers.max(1) as i32;

    unsafe {
        gl.bind_texture(target, Some(handle));
        gl.pixel_store_i32(glow::UNPACK_ALIGNMENT, 1);

        match target {
            glow::TEXTURE_2D => {
                let Some(surf) = tex.surfaces.first() else {
                    gl.delete_texture(handle);
                    return Err("Texture has no decoded surface".to_string());
                };
                gl.tex_image_2d(target, 0, internal, w, h, 0, format, ty, Some(&surf.data));
            }
            glow::TEXTURE_CUBE_MAP => {
                for surf in &tex.surfaces {
                    gl.tex_image_2d(
                        glow::TEXTURE_CUBE_MAP_POSITIVE_X + surf.face,
                        0,
                        internal,
                        w,
                        h,
                        0,
                        format,
                        ty,
                        Some(&surf.data),
                    );
                }
            }
            glow::TEXTURE_2D_ARRAY | glow::TEXTURE_CUBE_MAP_ARRAY => {
                let faces = if tex.is_cubemap() { 6 } else { 1 };
                gl.tex_image_3d(
                    target,
                    0,
                    internal,
                    w,
                    h,
                    layers * faces,
                    0,
                    format,
                    ty,
                    None,
                );
                for surf in &tex.surfaces {
                    let slice = surf.layer as i32 * faces + surf.face as i32;
                    gl.tex_sub_image_3d(
                        target,
                        0,
                        0,
                        0,
                        slice,
                        surf.width as i32,
                        surf.height as i32,
                        1,
                        format,
                        ty,
                        glow::PixelUnpackData::Slice(&surf.data),
                    );
                }
            }
            _ => unreachable!(),
        }

        gl.tex_parameter_i32(target, glow::TEXTURE_WRAP_S, glow::REPEAT as i32);
        gl.tex_parameter_i32(target, glow::TEXTURE_WRAP_T, glow::REPEAT as i32);

        if tex.mip_count > 1 {
            gl.generate_mipmap(target);
        }

        let err = gl.get_error();
        if err != glow::NO_ERROR {
            gl.delete_texture(handle);
            return Err(format!("GL error {err:#06x} while uploading texture"));
        }
    }

    Ok(GpuTexture {
        handle,
        target,
        num_mips: tex.mip_count as i32,
    })
}

/// Switch between nearest and linear sampling; the minification filter gets
/// the matching mipmap variant when the texture has more than one level.
pub fn set_filter(gl: &glow::Context, tex: &GpuTexture, linear: bool) {
    let filter = if linear { glow::LINEAR } else { glow::NEAREST } as i32;
    unsafe {
        gl.bind_texture(tex.target, Some(tex.handle));
        if tex.num_mips == 1 {
            gl.tex_parameter_i32(tex.target, glow::TEXTURE_MIN_FILTER, filter);
            gl.tex_parameter_i32(tex.target, glow::TEXTURE_MAG_FILTER, filter);
        } else {
            let mip_filter = if linear {
                glow::LINEAR_MIPMAP_LINEAR
            } else {
                glow::NEAREST_MIPMAP_NEAREST
            } as i32;
            gl.tex_parameter_i32(tex.target, glow::TEXTURE_MIN_FILTER, mip_filter);
            gl.tex_parameter_i32(tex.target, glow::TEXTURE_MAG_FILTER, filter);
        }
    }
}

/// Resolve the mip policy into (base level, max level).
///
/// A negative request means auto: the full chain stays available and the
/// hardware picks per fragment. A concrete request is clamped to the last
/// level and pins both ends to it, which forces exactly that level.
pub fn resolve_mip_policy(requested: i32, num_mips: i32) -> (i32, i32) {
    let level = requested.min(num_mips - 1);
    if level < 0 {
        (0, num_mips - 1)
    } else {
        (level, level)
    }
}

/// Apply a mip policy to the bound texture. `requested` may be a transient
/// per-draw override; callers keep their persistent setting untouched.
/// No-op for single-mip textures.
pub fn apply_mip_policy(gl: &glow::Context, tex: &GpuTexture, requested: i32, bind: bool) {
    if tex.num_mips == 1 {
        return;
    }
    let (base, max) = resolve_mip_policy(requested, tex.num_mips);
    unsafe {
        if bind {
            gl.bind_texture(tex.target, Some(tex.handle));
        }
        gl.tex_parameter_i32(tex.target, glow::TEXTURE_BASE_LEVEL, base);
        gl.tex_parameter_i32(tex.target, glow::TEXTURE_MAX_LEVEL, max);
    }
}

/// Release the GL texture object.
pub fn destroy(gl: &glow::Context, tex: &GpuTexture) {
    unsafe {
        gl.delete_texture(tex.handle);
    }
}
