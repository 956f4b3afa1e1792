// ============================================================================
// GPU SHADERS — fixed GLSL fragments + per-texture fragment synthesis
// ============================================================================
//
// The fragment shader is assembled from fixed pieces plus three generated
// strings that depend on the texture: the version directive (with the
// cube-array extension when needed), the sampler uniform declaration, and
// the sample + normalize statement. The user's swizzle expression slots in
// between the sample statement and the epilogue. Concatenation order is
// fixed; nothing here ever reorders the parts.

use crate::texture::TextureData;

/// GLSL version the synthesized programs target. Cubemap-array samplers are
/// core only from 400, so below that the extension directive is required.
const GLSL_VERSION: u32 = 330;
const VERSION_DIRECTIVE: &str = "#version 330 core\n";
const CUBE_ARRAY_EXTENSION: &str = "#extension GL_ARB_texture_cube_map_array : enable\n";

/// Vertex stage: pass-through quad with a 4-component texture coordinate
/// (face direction and/or array layer ride in the extra components).
const VERTEX_BODY: &str = "\
in vec2 a_pos;
in vec4 a_texCoord;
uniform mat4 u_mvp;
out vec4 texCoord;
void main()
{
	gl_Position = u_mvp * vec4(a_pos, 0.0, 1.0);
	texCoord = a_texCoord;
}
";

const FRAG_PREAMBLE: &str = "\
in vec4 texCoord;
out vec4 OutColor;
void main()
{
";

// single-space indent so it reads well in the advanced swizzle editor
const FRAG_EPILOGUE: &str = "\n OutColor = c;\n}\n";

/// The generated, texture-dependent pieces of the fragment shader.
pub struct FragmentParts {
    /// Version directive, plus the cube-array extension right after it
    /// when the sampler type needs one.
    pub version: String,
    /// e.g. "uniform usampler2DArray tex0;\n"
    pub sampler_uniform: String,
    /// Samples `tex0` with the right coordinate slice and, for integer
    /// formats, divides by the normalization divisor; always ends with
    /// `vec4 c` holding the displayable color.
    pub sample_and_normalize: String,
}

impl FragmentParts {
    /// Full fragment source with the swizzle expression spliced in.
    pub fn assemble(&self, swizzle: &str) -> String {
        [
            self.version.as_str(),
            self.sampler_uniform.as_str(),
            FRAG_PREAMBLE,
            self.sample_and_normalize.as_str(),
            swizzle,
            FRAG_EPILOGUE,
        ]
        .concat()
    }
}

/// Complete vertex shader source.
pub fn vertex_source() -> String {
    format!("{VERSION_DIRECTIVE}{VERTEX_BODY}")
}

/// Build the texture-dependent fragment pieces from the texture's traits.
pub fn synthesize_fragment_parts(tex: &TextureData) -> FragmentParts {
    let int_format = tex.traits.int_format;

    let mut sampler_base = "sampler2D";
    // components of the texCoord slice: 2 for .st, 3 for .stp, 4 for .stpq
    let mut num_tex_coords = 2;
    let type_prefix = match int_format {
        Some(f) if f.unsigned => "u",
        Some(_) => "i",
        None => "",
    };
    let mut type_postfix = "";

    let mut version = VERSION_DIRECTIVE.to_string();
    if tex.is_cubemap() {
        sampler_base = "samplerCube";
        num_tex_coords = 3;
        if tex.is_array && GLSL_VERSION < 400 {
            // the extension directive must come after #version, never before
            version.push_str(CUBE_ARRAY_EXTENSION);
        }
    }
    if tex.is_array {
        type_postfix = "Array";
        num_tex_coords += 1;
    }

    let sampler_uniform = format!("uniform {type_prefix}{sampler_base}{type_postfix} tex0;\n");

    let coords = &"stpq"[..num_tex_coords];
    let sample_and_normalize = match int_format {
        Some(f) => {
            // integer textures need normalization to display something useful
            format!(
                " {type_prefix}vec4 v = texture( tex0, texCoord.{coords} );\n vec4 c = vec4(v) / {};\n",
                f.normalize_divisor
            )
        }
        None => format!(" vec4 c = texture( tex0, texCoord.{coords} );\n"),
    };

    FragmentParts {
        version,
        sampler_uniform,
        sample_and_normalize,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::texture::{FormatTraits, IntFormat, TextureData};

    fn traits_tex(cube: bool, array: bool, int_format: Option<IntFormat>) -> TextureData {
        TextureData {
            width: 64,
            height: 64,
            mip_count: 1,
            layers: if array { 4 } else { 1 },
            is_array: array,
            cube_faces: if cube { 6 } else { 0 },
            traits: FormatTraits {
                int_format,
                ..Default::default()
            },
            ..Default::default()
        }
    }

    const U8: IntFormat = IntFormat {
        unsigned: true,
        normalize_divisor: "255.0",
    };

    #[test]
    fn float_2d_has_no_int_machinery() {
        let parts = synthesize_fragment_parts(&traits_tex(false, false, None));
        assert_eq!(parts.sampler_uniform, "uniform sampler2D tex0;\n");
        assert_eq!(
            parts.sample_and_normalize,
            " vec4 c = texture( tex0, texCoord.st );\n"
        );
        let src = parts.assemble("c = vec4(c.r, c.g, c.b, c.a);\n");
        assert!(!src.contains("usampler"));
        assert!(!src.contains(") / "));
    }

    #[test]
    fn unsigned_int_2d_gets_prefix_and_normalization() {
        let parts = synthesize_fragment_parts(&traits_tex(false, false, Some(U8)));
        assert_eq!(parts.sampler_uniform, "uniform usampler2D tex0;\n");
        assert_eq!(
            parts.sample_and_normalize,
            " uvec4 v = texture( tex0, texCoord.st );\n vec4 c = vec4(v) / 255.0;\n"
        );
    }

    #[test]
    fn signed_int_prefix() {
        let signed = IntFormat {
            unsigned: false,
            normalize_divisor: "127.0",
        };
        let parts = synthesize_fragment_parts(&traits_tex(false, false, Some(signed)));
        assert_eq!(parts.sampler_uniform, "uniform isampler2D tex0;\n");
        assert!(parts.sample_and_normalize.starts_with(" ivec4 v ="));
    }

    #[test]
    fn coordinate_slices_per_target() {
        let slice = |cube, array| {
            synthesize_fragment_parts(&traits_tex(cube, array, None)).sample_and_normalize
        };
        assert!(slice(false, false).contains("texCoord.st )"));
        assert!(slice(false, true).contains("texCoord.stp )"));
        assert!(slice(true, false).contains("texCoord.stp )"));
        assert!(slice(true, true).contains("texCoord.stpq )"));
    }

    #[test]
    fn sampler_type_names() {
        let name = |cube, array, int| {
            synthesize_fragment_parts(&traits_tex(cube, array, int)).sampler_uniform
        };
        assert_eq!(name(false, true, None), "uniform sampler2DArray tex0;\n");
        assert_eq!(name(true, false, None), "uniform samplerCube tex0;\n");
        assert_eq!(name(true, true, None), "uniform samplerCubeArray tex0;\n");
        assert_eq!(name(true, false, Some(U8)), "uniform usamplerCube tex0;\n");
    }

    #[test]
    fn cube_array_extension_follows_version() {
        let parts = synthesize_fragment_parts(&traits_tex(true, true, None));
        assert_eq!(
            parts.version,
            "#version 330 core\n#extension GL_ARB_texture_cube_map_array : enable\n"
        );
        // non-cube-array textures get no extension
        let plain = synthesize_fragment_parts(&traits_tex(true, false, None));
        assert_eq!(plain.version, "#version 330 core\n");
    }

    #[test]
    fn assembled_order_is_fixed() {
        let parts = synthesize_fragment_parts(&traits_tex(false, false, None));
        let swizzle = "c = vec4(c.b, c.g, c.r, 1.0);\n";
        let src = parts.assemble(swizzle);
        let version_at = src.find("#version").unwrap();
        let sampler_at = src.find("uniform sampler2D").unwrap();
        let main_at = src.find("void main").unwrap();
        let sample_at = src.find("vec4 c = texture").unwrap();
        let swizzle_at = src.find(swizzle.trim_end()).unwrap();
        let out_at = src.find("OutColor = c;").unwrap();
        assert!(version_at < sampler_at);
        assert!(sampler_at < main_at);
        assert!(main_at < sample_at);
        assert!(sample_at < swizzle_at);
        assert!(swizzle_at < out_at);
    }

    #[test]
    fn vertex_source_starts_with_version() {
        let src = vertex_source();
        assert!(src.starts_with("#version 330 core\n"));
        assert!(src.contains("texCoord = a_texCoord;"));
    }
}
