// ============================================================================
// SWIZZLE MODEL — simple 4-letter shorthand and raw GLSL expression
// ============================================================================
//
// Two coexisting representations of the channel remapping:
//   * `simple`     — up to four characters out of rgba / xyzw / 0 / 1
//   * `expression` — free-form GLSL that assigns the 4-vector `c`
//
// `use_simple` says which one drives shader generation. Compilation is
// one-directional: editing the simple form regenerates the expression, never
// the other way around.

use crate::log_warn;

/// Characters accepted by the simple swizzle input field.
pub const VALID_SIMPLE_CHARS: &str = "rgbaRGBAxyzwXYZW01";

#[derive(Clone, Debug)]
pub struct SwizzleState {
    /// Simple shorthand, at most 4 characters. May be shorter — missing
    /// channels take their positional defaults.
    pub simple: String,
    /// GLSL completing the fragment shader: one or more statements ending in
    /// an assignment to `c`.
    pub expression: String,
    /// Whether `simple` is the authoritative representation.
    pub use_simple: bool,
}

impl Default for SwizzleState {
    fn default() -> Self {
        Self {
            simple: String::new(),
            expression: String::new(),
            use_simple: true,
        }
    }
}

impl SwizzleState {
    /// Regenerate `expression` from `simple` if the simple form is
    /// authoritative. The only mutation path for `expression` in that mode.
    pub fn refresh_expression(&mut self) {
        if self.use_simple {
            self.expression = compile_simple(&self.simple);
        }
    }

    /// Drop characters the simple field doesn't accept and cap at 4.
    /// Used as an edit filter on the text input.
    pub fn sanitize_simple(&mut self) {
        self.simple.retain(|c| VALID_SIMPLE_CHARS.contains(c));
        self.simple.truncate(4);
    }
}

/// Compile the 4-letter shorthand into a GLSL assignment to `c`.
///
/// Channel mapping (case-insensitive): r/x, g/y, b/z, a/w select the source
/// channel, '0' and '1' are constants. A short input leaves the remaining
/// channels at their positional defaults: 0.0 for red/green/blue, 1.0 for
/// alpha. Invalid characters are warned about and keep the default, so this
/// never fails.
pub fn compile_simple(simple: &str) -> String {
    let mut args = ["0.0", "0.0", "0.0", "1.0"];
    for (i, ch) in simple.chars().take(4).enumerate() {
        match ch.to_ascii_lowercase() {
            '0' => args[i] = "0.0",
            '1' => args[i] = "1.0",
            'r' | 'x' => args[i] = "c.r",
            'g' | 'y' => args[i] = "c.g",
            'b' | 'z' => args[i] = "c.b",
            'a' | 'w' => args[i] = "c.a",
            _ => log_warn!("Invalid character {:?} in swizzle!", ch),
        }
    }
    format!("c = vec4({}, {}, {}, {});\n", args[0], args[1], args[2], args[3])
}
