use std::collections::BTreeMap;

use arbitrary::{Arbitrary, Unstructured};

use crate::{Frame, JoinPair};

const MAX_ROWS: usize = 16;
const MAX_COLUMNS: usize = 6;

pub fn arb_frame_with_columns(
    u: &mut Unstructured<'_>,
    columns: Vec<String>,
) -> arbitrary::Result<Frame> {
    let mut rows = BTreeMap::new();
    for _ in 0..u.int_in_range(0..=MAX_ROWS)? {
        // a narrow label space so that joins overlap
        let label = format!("m{}.mtx", u.int_in_range(0..=2 * MAX_ROWS)?);
        let values = (0..columns.len())
            .map(|_| u.arbitrary::<f64>())
            .collect::<arbitrary::Result<Vec<_>>>()?;
        rows.insert(label, values);
    }
    Ok(Frame { columns, rows })
}

fn arb_columns(u: &mut Unstructured<'_>, prefix: &str) -> arbitrary::Result<Vec<String>> {
    let width = u.int_in_range(1..=MAX_COLUMNS)?;
    Ok((0..width).map(|j| format!("{}{}", prefix, j)).collect())
}

impl<'a> Arbitrary<'a> for Frame {
    fn arbitrary(u: &mut Unstructured<'a>) -> arbitrary::Result<Self> {
        let columns = arb_columns(u, "c")?;
        arb_frame_with_columns(u, columns)
    }
}

impl<'a> Arbitrary<'a> for JoinPair {
    fn arbitrary(u: &mut Unstructured<'a>) -> arbitrary::Result<Self> {
        let left = arb_columns(u, "c")?;
        // "c0" may show up on both sides and exercise the suffixing
        let prefix = if u.arbitrary()? { "c" } else { "d" };
        let right = arb_columns(u, prefix)?;
        Ok(JoinPair(
            arb_frame_with_columns(u, left)?,
            arb_frame_with_columns(u, right)?,
        ))
    }
}
