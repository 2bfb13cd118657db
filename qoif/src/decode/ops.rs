// OP: 0b01
#[inline(always)]
pub(crate) const fn apply_diff([r, g, b, a]: [u8; 4], byte: u8) -> [u8; 4] {
    let dr = ((byte >> 4) & 0b11).wrapping_sub(2);
    let dg = ((byte >> 2) & 0b11).wrapping_sub(2);
    let db = (byte & 0b11).wrapping_sub(2);

    [
        r.wrapping_add(dr),
        g.wrapping_add(dg),
        b.wrapping_add(db),
        a,
    ]
}

// OP: 0b10
#[inline(always)]
pub(crate) const fn apply_luma([r, g, b, a]: [u8; 4], byte: u8, rg_bg_diffs: u8) -> [u8; 4] {
    let dg = (byte & 0b0011_1111).wrapping_sub(32);
    let dr = ((rg_bg_diffs >> 4) & 0b1111).wrapping_sub(8).wrapping_add(dg);
    let db = (rg_bg_diffs & 0b1111).wrapping_sub(8).wrapping_add(dg);

    [
        r.wrapping_add(dr),
        g.wrapping_add(dg),
        b.wrapping_add(db),
        a,
    ]
}
