// ============================================================================
// TEXTURE DECODING — file formats -> TextureData
// ============================================================================
//
// Everything goes through the `image` crate. Beyond plain 2D images, two
// file-level conventions produce the richer GPU shapes:
//   * animated GIFs become 2D array textures, one layer per frame
//   * an exact 1x6 vertical strip of squares becomes a cubemap, faces
//     ordered +X, -X, +Y, -Y, +Z, -Z top to bottom
// 16-bit sources are kept at full precision and uploaded as unsigned-integer
// data; the shader synthesizer adds the normalization divide.

use std::fs::File;
use std::io::BufReader;
use std::path::{Path, PathBuf};

use image::codecs::gif::GifDecoder;
use image::{AnimationDecoder, ColorType, ImageFormat};
use rfd::FileDialog;

use crate::log_info;
use crate::texture::{FormatTraits, IntFormat, Surface, TextureData};

/// File extensions offered in the open dialog (lowercase).
pub const SUPPORTED_EXTENSIONS: &[&str] = &[
    "png", "jpg", "jpeg", "webp", "bmp", "tga", "gif", "ico", "tiff", "tif",
];

/// Show the native file dialog and return the picked path, if any.
pub fn pick_texture_file() -> Option<PathBuf> {
    FileDialog::new()
        .add_filter("Images", SUPPORTED_EXTENSIONS)
        .add_filter("All Files", &["*"])
        .pick_file()
}

/// Decode a texture file into a `TextureData`.
///
/// Never touches any live GPU or UI state; callers only swap in the result
/// after it (and the subsequent GPU upload) succeeded.
pub fn load_texture(path: &Path) -> Result<TextureData, String> {
    let ext = path
        .extension()
        .and_then(|e| e.to_str())
        .unwrap_or("")
        .to_lowercase();

    if ext == "gif" {
        let frames = decode_gif_frames(path)?;
        if frames.len() > 1 {
            return build_gif_array(path, frames);
        }
        // single-frame GIFs take the plain 2D path below
    }

    let img = image::open(path)
        .map_err(|e| format!("Couldn't decode {}: {}", path.display(), e))?;
    let color = img.color();
    let width = img.width();
    let height = img.height();
    if width == 0 || height == 0 {
        return Err(format!("{} has zero-sized dimensions", path.display()));
    }

    // 8-bit content is assumed sRGB-encoded; wider content is kept at
    // 16 bits per channel and displayed through an integer sampler
    let wide = matches!(
        color,
        ColorType::L16 | ColorType::La16 | ColorType::Rgb16 | ColorType::Rgba16
    );
    let (bytes, bytes_per_pixel, traits) = if wide {
        let rgba = img.into_rgba16();
        let raw = rgba.into_raw();
        let traits = FormatTraits {
            has_alpha: color.has_alpha(),
            premultiplied_alpha: false,
            is_srgb: false,
            int_format: Some(IntFormat {
                unsigned: true,
                normalize_divisor: "65535.0",
            }),
        };
        (bytemuck::cast_slice::<u16, u8>(&raw).to_vec(), 8usize, traits)
    } else {
        let rgba = img.into_rgba8();
        let traits = FormatTraits {
            has_alpha: color.has_alpha(),
            premultiplied_alpha: false,
            is_srgb: true,
            int_format: None,
        };
        (rgba.into_raw(), 4usize, traits)
    };

    let mut tex = TextureData {
        name: path.display().to_string(),
        format_name: format_label(path, color, &traits),
        width,
        height,
        mip_count: 1,
        layers: 1,
        is_array: false,
        cube_faces: 0,
        default_swizzle: Some(default_swizzle(&traits).to_string()),
        traits,
        surfaces: Vec::new(),
    };

    if height == width * 6 {
        // 1x6 strip of squares: treat as an unfolded cubemap
        let face_bytes = width as usize * width as usize * bytes_per_pixel;
        tex.height = width;
        tex.cube_faces = 6;
        tex.surfaces = (0..6u32)
            .map(|face| Surface {
                layer: 0,
                face,
                width,
                height: width,
                data: bytes[face as usize * face_bytes..(face as usize + 1) * face_bytes]
                    .to_vec(),
            })
            .collect();
        log_info!("{}: interpreting 1x6 strip as cubemap", path.display());
    } else {
        tex.surfaces = vec![Surface {
            layer: 0,
            face: 0,
            width,
            height,
            data: bytes,
        }];
    }

    // integer formats can't have mips generated on the GPU, so they stay
    // single-level
    if tex.traits.int_format.is_none() {
        tex.mip_count = TextureData::full_mip_chain(tex.width, tex.height);
    }

    Ok(tex)
}

/// All frames of a GIF, fully composited, as RGBA8 buffers.
fn decode_gif_frames(path: &Path) -> Result<Vec<image::RgbaImage>, String> {
    let file =
        File::open(path).map_err(|e| format!("Couldn't open {}: {}", path.display(), e))?;
    let decoder = GifDecoder::new(BufReader::new(file))
        .map_err(|e| format!("Couldn't decode {}: {}", path.display(), e))?;
    let frames = decoder
        .into_frames()
        .collect_frames()
        .map_err(|e| format!("GIF frame decode error in {}: {}", path.display(), e))?;
    Ok(frames.into_iter().map(|f| f.into_buffer()).collect())
}

/// Pack an animated GIF's frames into a 2D array texture, layer per frame.
fn build_gif_array(path: &Path, frames: Vec<image::RgbaImage>) -> Result<TextureData, String> {
    let width = frames[0].width();
    let height = frames[0].height();
    if width == 0 || height == 0 {
        return Err(format!("{} has zero-sized frames", path.display()));
    }

    let mut surfaces = Vec::with_capacity(frames.len());
    for (layer, frame) in frames.into_iter().enumerate() {
        if frame.dimensions() != (width, height) {
            return Err(format!(
                "{}: frame {} is {}x{}, expected {}x{}",
                path.display(),
                layer,
                frame.width(),
                frame.height(),
                width,
                height
            ));
        }
        surfaces.push(Surface {
            layer: layer as u32,
            face: 0,
            width,
            height,
            data: frame.into_raw(),
        });
    }

    let layers = surfaces.len() as u32;
    log_info!(
        "{}: animated GIF, {} frames as array layers",
        path.display(),
        layers
    );

    let traits = FormatTraits {
        has_alpha: true,
        premultiplied_alpha: false,
        is_srgb: true,
        int_format: None,
    };
    Ok(TextureData {
        name: path.display().to_string(),
        format_name: format!("GIF ({layers} frames, Rgba8, sRGB)"),
        width,
        height,
        mip_count: TextureData::full_mip_chain(width, height),
        layers,
        is_array: true,
        cube_faces: 0,
        default_swizzle: Some(default_swizzle(&traits).to_string()),
        traits,
        surfaces,
    })
}

/// Swizzle hint for the simple editor: pin alpha to 1 for opaque sources so
/// the blend toggle can't dim them.
fn default_swizzle(traits: &FormatTraits) -> &'static str {
    if traits.has_alpha { "rgba" } else { "rgb1" }
}

/// Human-readable format description, e.g. "Png (Rgba8, sRGB)".
fn format_label(path: &Path, color: ColorType, traits: &FormatTraits) -> String {
    let srgb = if traits.is_srgb { ", sRGB" } else { "" };
    match ImageFormat::from_path(path) {
        Ok(fmt) => format!("{fmt:?} ({color:?}{srgb})"),
        Err(_) => format!("{color:?}{srgb}"),
    }
}
