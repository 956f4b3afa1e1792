// ============================================================================
// VIEW LAYOUT ENGINE — per-tile geometry for every viewing mode
// ============================================================================
//
// `compute_layout` turns (texture metadata, view settings) into an ordered
// list of `DrawTile`s; the renderer draws them verbatim. Cubemaps override
// whatever view mode is set and always use the unfolded cross layout.

use crate::texture::TextureData;

/// How a non-cubemap texture is presented.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ViewMode {
    Single,
    MipmapsCompact,
    MipmapsRow,
    MipmapsColumn,
    Tiled,
}

impl ViewMode {
    pub const ALL: [ViewMode; 5] = [
        ViewMode::Single,
        ViewMode::MipmapsCompact,
        ViewMode::MipmapsRow,
        ViewMode::MipmapsColumn,
        ViewMode::Tiled,
    ];

    pub fn label(self) -> &'static str {
        match self {
            ViewMode::Single => "Single",
            ViewMode::MipmapsCompact => "MipMaps Compact",
            ViewMode::MipmapsRow => "MipMaps in Row",
            ViewMode::MipmapsColumn => "MipMaps in Column",
            ViewMode::Tiled => "Tiled",
        }
    }
}

/// The six cubemap faces, in GL face order.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum CubeFace {
    XPos = 0,
    XNeg = 1,
    YPos = 2,
    YNeg = 3,
    ZPos = 4,
    ZNeg = 5,
}

/// The four side faces of the cross's middle row, in default display order.
const MIDDLE_FACES: [CubeFace; 4] = [
    CubeFace::XNeg,
    CubeFace::ZPos,
    CubeFace::XPos,
    CubeFace::ZNeg,
];

/// Per-face basis: each of X, Y, Z is `cu*u + cv*v + c0` with quad-local
/// (u, v) in [-1, 1]^2. Kept as data so the face ordering stays fixed.
/// Indexed by `CubeFace as usize`; inner index 0 = X, 1 = Y, 2 = Z;
/// innermost = [cu, cv, c0].
const FACE_BASES: [[[f32; 3]; 3]; 6] = [
    // +X: ( 1, -v, -u)
    [[0.0, 0.0, 1.0], [0.0, -1.0, 0.0], [-1.0, 0.0, 0.0]],
    // -X: (-1, -v,  u)
    [[0.0, 0.0, -1.0], [0.0, -1.0, 0.0], [1.0, 0.0, 0.0]],
    // +Y: ( u,  1,  v)
    [[1.0, 0.0, 0.0], [0.0, 0.0, 1.0], [0.0, 1.0, 0.0]],
    // -Y: ( u, -1, -v)
    [[1.0, 0.0, 0.0], [0.0, 0.0, -1.0], [0.0, -1.0, 0.0]],
    // +Z: ( u, -v,  1)
    [[1.0, 0.0, 0.0], [0.0, -1.0, 0.0], [0.0, 0.0, 1.0]],
    // -Z: (-u, -v, -1)
    [[-1.0, 0.0, 0.0], [0.0, -1.0, 0.0], [0.0, 0.0, -1.0]],
];

/// View settings the layout depends on.
#[derive(Clone, Copy, Debug)]
pub struct LayoutParams {
    pub view_mode: ViewMode,
    /// Render every mip at the base mip's footprint instead of native size.
    pub same_size: bool,
    /// Pixel gap between tiles.
    pub spacing: i32,
    /// Replication counts for Tiled mode (x, y).
    pub num_tiles: [i32; 2],
    /// Which of the four side faces leads the cross's middle row (0-3).
    pub cross_variant: u8,
    /// Selected array layer.
    pub array_index: i32,
}

impl Default for LayoutParams {
    fn default() -> Self {
        Self {
            view_mode: ViewMode::Single,
            same_size: true,
            spacing: 2,
            num_tiles: [2, 2],
            cross_variant: 0,
            array_index: 0,
        }
    }
}

/// One quad to draw: where, how big, and what to sample.
#[derive(Clone, Copy, Debug)]
pub struct DrawTile {
    /// Concrete mip level, or -1 to use the persistent mip policy.
    pub mip_level: i32,
    /// `Some` for cubemap faces.
    pub face: Option<CubeFace>,
    pub array_index: i32,
    /// Top-left corner in texture-pixel space.
    pub pos: [f32; 2],
    pub size: [f32; 2],
    /// Upper texture coordinate; (tilesX, tilesY) in Tiled mode so the
    /// repeat-wrapping sampler tiles the image.
    pub tex_coord_max: [f32; 2],
}

impl DrawTile {
    fn plain(mip_level: i32, array_index: i32, pos: [f32; 2], size: [f32; 2]) -> Self {
        Self {
            mip_level,
            face: None,
            array_index,
            pos,
            size,
            tex_coord_max: [1.0, 1.0],
        }
    }
}

/// Compute the draw list for the current view settings.
pub fn compute_layout(tex: &TextureData, params: &LayoutParams) -> Vec<DrawTile> {
    let array_index = params.array_index.clamp(0, tex.layers.max(1) as i32 - 1);
    if tex.is_cubemap() {
        return cross_layout(tex, params, array_index);
    }

    let (tex_w, tex_h) = tex.size();
    let num_mips = tex.mip_count as i32;
    let spacing = params.spacing as f32;

    match params.view_mode {
        ViewMode::Single => {
            vec![DrawTile::plain(-1, array_index, [0.0, 0.0], [tex_w, tex_h])]
        }
        ViewMode::Tiled => {
            let tiles_x = params.num_tiles[0].max(1) as f32;
            let tiles_y = params.num_tiles[1].max(1) as f32;
            let mut tile = DrawTile::plain(
                -1,
                array_index,
                [0.0, 0.0],
                [tex_w * tiles_x, tex_h * tiles_y],
            );
            tile.tex_coord_max = [tiles_x, tiles_y];
            vec![tile]
        }
        ViewMode::MipmapsRow | ViewMode::MipmapsColumn => {
            let in_row = params.view_mode == ViewMode::MipmapsRow;
            let mut tiles = Vec::with_capacity(num_mips as usize);
            let mut pos_x = 0.0;
            let mut pos_y = 0.0;
            for i in 0..num_mips {
                let size = if params.same_size {
                    [tex_w, tex_h]
                } else {
                    let (w, h) = tex.mip_size(i as u32);
                    [w, h]
                };
                tiles.push(DrawTile::plain(i, array_index, [pos_x, pos_y], size));
                if in_row {
                    pos_x += spacing + size[0];
                } else {
                    pos_y += spacing + size[1];
                }
            }
            tiles
        }
        ViewMode::MipmapsCompact => {
            if params.same_size {
                compact_same_size(tex, array_index, spacing)
            } else {
                compact_native_size(tex, array_index, params.spacing)
            }
        }
    }
}

/// Same-size compact grid: roughly square tile arrangement, serpentine so
/// consecutive mips stay edge-adjacent across row boundaries.
fn compact_same_size(tex: &TextureData, array_index: i32, spacing: f32) -> Vec<DrawTile> {
    let (tex_w, tex_h) = tex.size();
    let num_mips = tex.mip_count as i32;
    // about as wide as high, rounded up: displays are wide, so prefer
    // more tiles horizontally
    let num_hor = (num_mips as f32 * tex_h / tex_w).sqrt().ceil() as i32;
    let mut tiles = Vec::with_capacity(num_mips as usize);
    let mut pos_x = 0.0;
    let mut pos_y = 0.0;
    let mut h_offset = tex_w + spacing;
    let v_offset = tex_h + spacing;
    for i in 0..num_mips {
        tiles.push(DrawTile::plain(i, array_index, [pos_x, pos_y], [tex_w, tex_h]));
        if (i + 1) % num_hor == 0 {
            pos_y += v_offset;
            // flip horizontal direction every row so the next mip lands
            // directly below the last one instead of at the row start
            h_offset = -h_offset;
        } else {
            pos_x += h_offset;
        }
    }
    tiles
}

/// Native-size compact layout: step direction chosen once from the base
/// aspect ratio, then alternating per mip. Spacing is limited to half the
/// current mip dimension so it doesn't dwarf the smallest mips, but kept at
/// 2px minimum (unless the configured spacing is smaller than that).
fn compact_native_size(tex: &TextureData, array_index: i32, spacing: i32) -> Vec<DrawTile> {
    let (tex_w, tex_h) = tex.size();
    let num_mips = tex.mip_count as i32;
    let to_right = tex_w / tex_h <= 1.2; // otherwise step downward first
    let min_space = 2.0_f32.min(spacing as f32);
    let spacing = spacing as f32;

    let mut tiles = Vec::with_capacity(num_mips as usize);
    let mut pos_x = 0.0;
    let mut pos_y = 0.0;
    for i in 0..num_mips {
        let (w, h) = tex.mip_size(i as u32);
        tiles.push(DrawTile::plain(i, array_index, [pos_x, pos_y], [w, h]));
        if (to_right && i & 1 == 0) || (!to_right && i & 1 == 1) {
            pos_x += min_space.max(spacing.min(w * 0.5)) + w;
        } else {
            pos_y += min_space.max(spacing.min(h * 0.5)) + h;
        }
    }
    tiles
}

/// Cubemap cross: +Y on top, the four side faces across the middle (order
/// rotatable via `cross_variant`), -Y on the bottom.
fn cross_layout(tex: &TextureData, params: &LayoutParams, array_index: i32) -> Vec<DrawTile> {
    let (tex_w, tex_h) = tex.size(); // equal for cubemaps
    let offset = tex_w + params.spacing as f32;
    let size = [tex_w, tex_h];
    let face_tile = |face, pos| DrawTile {
        mip_level: -1,
        face: Some(face),
        array_index,
        pos,
        size,
        tex_coord_max: [1.0, 1.0],
    };

    let mut tiles = Vec::with_capacity(6);
    tiles.push(face_tile(CubeFace::YPos, [offset, 0.0]));
    let start = params.cross_variant as usize;
    for i in 0..4 {
        let face = MIDDLE_FACES[(start + i) % 4];
        tiles.push(face_tile(face, [i as f32 * offset, offset]));
    }
    tiles.push(face_tile(CubeFace::YNeg, [offset, 2.0 * offset]));
    tiles
}

/// Texture coordinates for the four corners of a cubemap face tile, in the
/// renderer's corner order (min/min, min/max, max/max, max/min).
///
/// The quad-local [0,1] coordinates are mapped to [-1,1] and pushed through
/// the face's fixed basis; the array layer rides in the 4th component. For
/// rotated cross variants the top and bottom tiles' corners are cycled so
/// they stay visually consistent with the rotated middle row.
pub fn cube_corner_coords(
    face: CubeFace,
    cross_variant: u8,
    array_index: f32,
    tex_coord_max: [f32; 2],
) -> [[f32; 4]; 4] {
    let min = [-1.0, -1.0];
    let max = [
        tex_coord_max[0] * 2.0 - 1.0,
        tex_coord_max[1] * 2.0 - 1.0,
    ];
    let corners = [
        [min[0], min[1]],
        [min[0], max[1]],
        [max[0], max[1]],
        [max[0], min[1]],
    ];

    let basis = &FACE_BASES[face as usize];
    let mut coords = [[0.0f32; 4]; 4];
    for (i, [u, v]) in corners.into_iter().enumerate() {
        for comp in 0..3 {
            let [cu, cv, c0] = basis[comp];
            coords[i][comp] = cu * u + cv * v + c0;
        }
        coords[i][3] = array_index;
    }

    if cross_variant > 0 && matches!(face, CubeFace::YPos | CubeFace::YNeg) {
        let steps = if face == CubeFace::YPos {
            cross_variant as usize
        } else {
            4 - cross_variant as usize
        };
        let mut rotated = [[0.0f32; 4]; 4];
        for i in 0..4 {
            rotated[i] = coords[(i + steps) % 4];
        }
        coords = rotated;
    }

    coords
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::texture::TextureData;

    fn tex_2d(width: u32, height: u32, mip_count: u32) -> TextureData {
        TextureData {
            width,
            height,
            mip_count,
            layers: 1,
            ..Default::default()
        }
    }

    fn cube_tex(size: u32) -> TextureData {
        TextureData {
            width: size,
            height: size,
            mip_count: 1,
            layers: 1,
            cube_faces: 6,
            ..Default::default()
        }
    }

    #[test]
    fn single_mode_is_one_full_tile() {
        let tex = tex_2d(200, 100, 8);
        let tiles = compute_layout(&tex, &LayoutParams::default());
        assert_eq!(tiles.len(), 1);
        assert_eq!(tiles[0].mip_level, -1);
        assert_eq!(tiles[0].pos, [0.0, 0.0]);
        assert_eq!(tiles[0].size, [200.0, 100.0]);
        assert_eq!(tiles[0].tex_coord_max, [1.0, 1.0]);
    }

    #[test]
    fn tiled_mode_scales_footprint_and_tex_coords() {
        let tex = tex_2d(64, 32, 1);
        let params = LayoutParams {
            view_mode: ViewMode::Tiled,
            num_tiles: [3, 2],
            ..Default::default()
        };
        let tiles = compute_layout(&tex, &params);
        assert_eq!(tiles.len(), 1);
        assert_eq!(tiles[0].size, [192.0, 64.0]);
        assert_eq!(tiles[0].tex_coord_max, [3.0, 2.0]);
    }

    #[test]
    fn row_layout_same_size_offsets() {
        let tex = tex_2d(64, 64, 3);
        let params = LayoutParams {
            view_mode: ViewMode::MipmapsRow,
            same_size: true,
            spacing: 2,
            ..Default::default()
        };
        let tiles = compute_layout(&tex, &params);
        assert_eq!(tiles.len(), 3);
        for (i, t) in tiles.iter().enumerate() {
            assert_eq!(t.mip_level, i as i32);
            assert_eq!(t.pos, [i as f32 * 66.0, 0.0]);
            assert_eq!(t.size, [64.0, 64.0]);
        }
    }

    #[test]
    fn column_layout_native_size_shrinks_per_mip() {
        let tex = tex_2d(64, 64, 3);
        let params = LayoutParams {
            view_mode: ViewMode::MipmapsColumn,
            same_size: false,
            spacing: 4,
            ..Default::default()
        };
        let tiles = compute_layout(&tex, &params);
        assert_eq!(tiles[0].size, [64.0, 64.0]);
        assert_eq!(tiles[1].size, [32.0, 32.0]);
        assert_eq!(tiles[2].size, [16.0, 16.0]);
        assert_eq!(tiles[1].pos, [0.0, 68.0]);
        assert_eq!(tiles[2].pos, [0.0, 104.0]);
    }

    fn adjacent(a: &DrawTile, b: &DrawTile) -> bool {
        // share an edge: aligned on one axis and touching (modulo spacing)
        // on the other
        let dx = (a.pos[0] - b.pos[0]).abs();
        let dy = (a.pos[1] - b.pos[1]).abs();
        (dy == 0.0 && dx <= a.size[0] + 2.0) || (dx == 0.0 && dy <= a.size[1] + 2.0)
    }

    #[test]
    fn compact_same_size_is_serpentine_adjacent() {
        for num_mips in 2..=10u32 {
            let tex = tex_2d(256, 256, num_mips);
            let params = LayoutParams {
                view_mode: ViewMode::MipmapsCompact,
                same_size: true,
                spacing: 2,
                ..Default::default()
            };
            let tiles = compute_layout(&tex, &params);
            assert_eq!(tiles.len(), num_mips as usize);
            for w in tiles.windows(2) {
                assert!(
                    adjacent(&w[0], &w[1]),
                    "mips {} and {} not adjacent for {} mips: {:?} {:?}",
                    w[0].mip_level,
                    w[1].mip_level,
                    num_mips,
                    w[0].pos,
                    w[1].pos
                );
            }
        }
    }

    #[test]
    fn compact_native_size_direction_preference() {
        // square-ish: steps right first
        let tex = tex_2d(64, 64, 3);
        let params = LayoutParams {
            view_mode: ViewMode::MipmapsCompact,
            same_size: false,
            spacing: 2,
            ..Default::default()
        };
        let tiles = compute_layout(&tex, &params);
        assert_eq!(tiles[1].pos, [66.0, 0.0]);
        assert_eq!(tiles[2].pos, [66.0, 34.0]);

        // wide: steps down first
        let tex = tex_2d(256, 64, 3);
        let tiles = compute_layout(&tex, &params);
        assert_eq!(tiles[1].pos, [0.0, 66.0]);
        assert_eq!(tiles[2].pos, [130.0, 66.0]);
    }

    #[test]
    fn compact_native_size_spacing_clamps_for_tiny_mips() {
        // 8x8 base: mip 1 is 4x4, so spacing 32 clamps to half the tile (2),
        // which is also the minimum
        let tex = tex_2d(8, 8, 4);
        let params = LayoutParams {
            view_mode: ViewMode::MipmapsCompact,
            same_size: false,
            spacing: 32,
            ..Default::default()
        };
        let tiles = compute_layout(&tex, &params);
        // step right after mip 0: spacing min(32, 8*0.5)=4, max(2, 4)=4
        assert_eq!(tiles[1].pos, [12.0, 0.0]);
        // step down after mip 1 (4x4): min(32, 2)=2, max(2, 2)=2
        assert_eq!(tiles[2].pos, [12.0, 6.0]);
    }

    #[test]
    fn cross_layout_always_six_distinct_faces() {
        let tex = cube_tex(64);
        for variant in 0..4u8 {
            let params = LayoutParams {
                cross_variant: variant,
                spacing: 0,
                // cubemaps override the view mode entirely
                view_mode: ViewMode::Tiled,
                ..Default::default()
            };
            let tiles = compute_layout(&tex, &params);
            assert_eq!(tiles.len(), 6);
            let mut seen = [false; 6];
            for t in &tiles {
                let face = t.face.expect("cross tile without face");
                assert!(!seen[face as usize], "face {face:?} emitted twice");
                seen[face as usize] = true;
            }
        }
    }

    #[test]
    fn cross_layout_positions() {
        let tex = cube_tex(64);
        let params = LayoutParams {
            spacing: 0,
            ..Default::default()
        };
        let tiles = compute_layout(&tex, &params);
        assert_eq!(tiles[0].face, Some(CubeFace::YPos));
        assert_eq!(tiles[0].pos, [64.0, 0.0]);
        // default middle row order: X-, Z+, X+, Z-
        let middle: Vec<_> = tiles[1..5].iter().map(|t| t.face.unwrap()).collect();
        assert_eq!(
            middle,
            [CubeFace::XNeg, CubeFace::ZPos, CubeFace::XPos, CubeFace::ZNeg]
        );
        for (i, t) in tiles[1..5].iter().enumerate() {
            assert_eq!(t.pos, [i as f32 * 64.0, 64.0]);
        }
        assert_eq!(tiles[5].face, Some(CubeFace::YNeg));
        assert_eq!(tiles[5].pos, [64.0, 128.0]);
    }

    #[test]
    fn cross_variant_rotates_middle_row() {
        let tex = cube_tex(16);
        let params = LayoutParams {
            cross_variant: 2,
            spacing: 0,
            ..Default::default()
        };
        let tiles = compute_layout(&tex, &params);
        let middle: Vec<_> = tiles[1..5].iter().map(|t| t.face.unwrap()).collect();
        assert_eq!(
            middle,
            [CubeFace::XPos, CubeFace::ZNeg, CubeFace::XNeg, CubeFace::ZPos]
        );
    }

    #[test]
    fn cube_corners_follow_face_bases() {
        // +X face, corner (u,v) = (-1,-1): (1, -v, -u) = (1, 1, 1)
        let coords = cube_corner_coords(CubeFace::XPos, 0, 0.0, [1.0, 1.0]);
        assert_eq!(coords[0], [1.0, 1.0, 1.0, 0.0]);
        // corner (u,v) = (1,1): (1, -1, -1)
        assert_eq!(coords[2], [1.0, -1.0, -1.0, 0.0]);

        // -Z face, corner (u,v) = (-1,-1): (-u, -v, -1) = (1, 1, -1)
        let coords = cube_corner_coords(CubeFace::ZNeg, 0, 0.0, [1.0, 1.0]);
        assert_eq!(coords[0], [1.0, 1.0, -1.0, 0.0]);
    }

    #[test]
    fn cube_corners_carry_array_layer() {
        let coords = cube_corner_coords(CubeFace::YPos, 0, 3.0, [1.0, 1.0]);
        for c in coords {
            assert_eq!(c[3], 3.0);
        }
    }

    #[test]
    fn cube_corner_rotation_only_affects_caps() {
        let plain = cube_corner_coords(CubeFace::XPos, 0, 0.0, [1.0, 1.0]);
        let rotated = cube_corner_coords(CubeFace::XPos, 3, 0.0, [1.0, 1.0]);
        assert_eq!(plain, rotated);

        // top cap rotates by `variant` steps, bottom by 4 - variant
        let top0 = cube_corner_coords(CubeFace::YPos, 0, 0.0, [1.0, 1.0]);
        let top1 = cube_corner_coords(CubeFace::YPos, 1, 0.0, [1.0, 1.0]);
        for i in 0..4 {
            assert_eq!(top1[i], top0[(i + 1) % 4]);
        }
        let bot0 = cube_corner_coords(CubeFace::YNeg, 0, 0.0, [1.0, 1.0]);
        let bot1 = cube_corner_coords(CubeFace::YNeg, 1, 0.0, [1.0, 1.0]);
        for i in 0..4 {
            assert_eq!(bot1[i], bot0[(i + 3) % 4]);
        }
    }

    #[test]
    fn array_index_is_clamped() {
        let mut tex = tex_2d(32, 32, 1);
        tex.layers = 4;
        tex.is_array = true;
        let params = LayoutParams {
            array_index: 99,
            ..Default::default()
        };
        let tiles = compute_layout(&tex, &params);
        assert_eq!(tiles[0].array_index, 3);
        let params = LayoutParams {
            array_index: -5,
            ..Default::default()
        };
        assert_eq!(compute_layout(&tex, &params)[0].array_index, 0);
    }
}
