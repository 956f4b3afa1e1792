// ============================================================================
// mipview CLI — argument parsing + headless metadata inspection
// ============================================================================
//
// Usage examples:
//   mipview texture.png              (open the viewer on a file)
//   mipview --info texture.png       (print metadata, no window)

use clap::Parser;

use crate::io::load_texture;

/// Interactive viewer for mipmapped, array and cubemap textures.
#[derive(Parser, Debug)]
#[command(
    name = "mipview",
    about = "Interactive texture viewer",
    long_about = "View image files with per-mip-level inspection, channel swizzling,\n\
                  array-layer selection and unfolded cubemap display. Animated GIFs\n\
                  load as array textures (one layer per frame); a 1x6 vertical strip\n\
                  of squares loads as a cubemap.\n\n\
                  Example:\n  \
                  mipview texture.png\n  \
                  mipview --info skybox.png"
)]
pub struct CliArgs {
    /// Texture file to open. When omitted, the viewer starts empty and a
    /// file can be opened from the sidebar.
    pub path: Option<std::path::PathBuf>,

    /// Print the decoded texture's metadata to stdout and exit without
    /// opening a window.
    #[arg(long)]
    pub info: bool,
}

/// Decode the given file and print its metadata. Returns the OS exit code:
/// `0` on success, `1` when no path was given or decoding failed.
pub fn run_info(args: &CliArgs) -> i32 {
    let Some(path) = &args.path else {
        eprintln!("error: --info requires a file path.");
        return 1;
    };

    match info_report(path) {
        Ok(report) => {
            print!("{}", report);
            0
        }
        Err(e) => {
            eprintln!("error: {}", e);
            1
        }
    }
}

/// The metadata text `--info` prints.
fn info_report(path: &std::path::Path) -> Result<String, String> {
    let tex = load_texture(path)?;

    let mut out = String::new();
    out.push_str(&format!("{}\n", tex.name));
    out.push_str(&format!("  format:   {}\n", tex.format_name));
    out.push_str(&format!("  size:     {}x{}\n", tex.width, tex.height));
    out.push_str(&format!("  mips:     {}\n", tex.mip_count));
    if tex.is_array {
        out.push_str(&format!("  layers:   {}\n", tex.layers));
    }
    if tex.is_cubemap() {
        out.push_str("  cubemap:  6 faces\n");
    }
    if let Some(swizzle) = &tex.default_swizzle {
        out.push_str(&format!("  swizzle:  {}\n", swizzle));
    }
    Ok(out)
}
