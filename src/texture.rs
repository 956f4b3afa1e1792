// ============================================================================
// TEXTURE RESOURCE — decoded pixel data + format metadata
// ============================================================================
//
// A `TextureData` is what the decoder (io.rs) produces and what everything
// else consumes: the layout engine reads its geometry, the shader synthesizer
// reads its format traits, and gpu/texture.rs uploads its surfaces.

/// Integer-format trait: sampled values need an explicit normalization
/// division in the fragment shader before they are displayable.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct IntFormat {
    /// Unsigned integer components (`usampler*`) vs signed (`isampler*`).
    pub unsigned: bool,
    /// GLSL literal the sampled vector is divided by, e.g. "255.0" for
    /// 8-bit data stored in an integer format.
    pub normalize_divisor: &'static str,
}

/// Format traits that affect how a texture is drawn.
#[derive(Clone, Debug, Default)]
pub struct FormatTraits {
    pub has_alpha: bool,
    pub premultiplied_alpha: bool,
    pub is_srgb: bool,
    /// `Some` for integer formats (GL_RGBA_INTEGER-style data).
    pub int_format: Option<IntFormat>,
}

/// One decoded image plane: a single (face, layer) at mip level 0.
/// Pixel bytes are tightly packed RGBA8 or RGBA16 (native endian).
#[derive(Clone, Debug)]
pub struct Surface {
    pub layer: u32,
    pub face: u32,
    pub width: u32,
    pub height: u32,
    pub data: Vec<u8>,
}

/// A decoded texture resource. At most one of these is GPU-resident at a
/// time; replacement only happens after the successor fully validated.
#[derive(Clone, Debug, Default)]
pub struct TextureData {
    /// Full path of the source file, for display.
    pub name: String,
    /// Human-readable format description, e.g. "PNG (RGBA8, sRGB)".
    pub format_name: String,
    /// Base (mip 0) dimensions.
    pub width: u32,
    pub height: u32,
    /// Number of mip levels available on the GPU resource.
    pub mip_count: u32,
    /// Array layer count (1 unless `is_array`).
    pub layers: u32,
    /// Whether the GPU resource is an array texture (a 1-layer array is
    /// still sampled through an array sampler type).
    pub is_array: bool,
    /// 0 for non-cubemaps, 6 for cubemaps.
    pub cube_faces: u32,
    pub traits: FormatTraits,
    /// Decoder-provided swizzle hint, e.g. "rrr1" for single-channel data.
    pub default_swizzle: Option<String>,
    pub surfaces: Vec<Surface>,
}

impl TextureData {
    pub fn is_cubemap(&self) -> bool {
        self.cube_faces > 0
    }

    /// Base dimensions as floats, the unit the layout engine works in.
    pub fn size(&self) -> (f32, f32) {
        (self.width as f32, self.height as f32)
    }

    /// Dimensions of the given mip level (each level halves, floor, min 1).
    pub fn mip_size(&self, level: u32) -> (f32, f32) {
        let w = (self.width >> level).max(1);
        let h = (self.height >> level).max(1);
        (w as f32, h as f32)
    }

    /// Number of levels in a complete mip chain down to 1x1.
    pub fn full_mip_chain(width: u32, height: u32) -> u32 {
        let max_dim = width.max(height).max(1);
        32 - max_dim.leading_zeros()
    }
}
