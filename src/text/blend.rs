use crate::foundation::error::{StudioError, StudioResult};

/// Source-over of a premultiplied overlay onto a straight-alpha destination, in place.
pub(crate) fn over_premul_onto_straight(dst: &mut [u8], src_premul: &[u8]) -> StudioResult<()> {
    if dst.len() != src_premul.len() || !dst.len().is_multiple_of(4) {
        return Err(StudioError::invalid_buffer(
            "over_premul_onto_straight expects equal-length rgba8 buffers",
        ));
    }

    for (d, s) in dst.chunks_exact_mut(4).zip(src_premul.chunks_exact(4)) {
        let sa = u16::from(s[3]);
        if sa == 0 {
            continue;
        }
        if sa == 255 {
            d.copy_from_slice(s);
            continue;
        }

        let da = u16::from(d[3]);
        let inv = 255 - sa;
        let out_a = sa + mul_div255(da, inv);
        if out_a == 0 {
            d.copy_from_slice(&[0, 0, 0, 0]);
            continue;
        }
        for i in 0..3 {
            let dc = mul_div255(mul_div255(u16::from(d[i]), da), inv);
            let premul = u16::from(s[i]) + dc;
            d[i] = unpremul(premul, out_a);
        }
        d[3] = out_a.min(255) as u8;
    }
    Ok(())
}

fn unpremul(c: u16, a: u16) -> u8 {
    ((u32::from(c) * 255 + u32::from(a) / 2) / u32::from(a)).min(255) as u8
}

fn mul_div255(x: u16, y: u16) -> u16 {
    (((u32::from(x) * u32::from(y)) + 127) / 255) as u16
}

#[cfg(test)]
#[path = "../../tests/unit/text/blend.rs"]
mod tests;
