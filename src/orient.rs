//! Left/right anatomical labels from the header affines.

use nalgebra::Matrix4;

/// Labels drawn beside the axial panel: (left edge, right edge).
/// Empty strings mean the orientation could not be determined.
pub type OrientationLabels = (&'static str, &'static str);

/// Decide left/right labels from the signs of qform[0,0] and sform[0,0].
///
/// Two sequential passes: the qform sign decides first, then a nonzero
/// sform sign overrides it. This is an intentional priority order (sform
/// wins whenever it carries a sign), not a vote; keep the override
/// structure rather than collapsing it into a table.
pub fn resolve(qform: &Matrix4<f64>, sform: &Matrix4<f64>) -> OrientationLabels {
    let qx = qform[(0, 0)];
    let sx = sform[(0, 0)];

    let mut labels: OrientationLabels = if qx < 0.0 {
        ("R", "L")
    } else if qx > 0.0 {
        ("L", "R")
    } else {
        ("", "")
    };

    // sform pass, later wins; a zero sform keeps the qform decision
    if sx < 0.0 {
        labels = ("R", "L");
    } else if sx > 0.0 {
        labels = ("L", "R");
    }

    labels
}

#[cfg(test)]
mod tests {
    use super::*;

    fn with_x(v: f64) -> Matrix4<f64> {
        let mut m = Matrix4::zeros();
        m[(0, 0)] = v;
        m
    }

    #[test]
    fn qform_decides_when_sform_is_zero() {
        assert_eq!(resolve(&with_x(-1.0), &with_x(0.0)), ("R", "L"));
        assert_eq!(resolve(&with_x(1.5), &with_x(0.0)), ("L", "R"));
    }

    #[test]
    fn sform_decides_when_qform_is_zero() {
        assert_eq!(resolve(&with_x(0.0), &with_x(1.0)), ("L", "R"));
        assert_eq!(resolve(&with_x(0.0), &with_x(-2.0)), ("R", "L"));
    }

    #[test]
    fn sform_overrides_a_disagreeing_qform() {
        assert_eq!(resolve(&with_x(1.0), &with_x(-1.0)), ("R", "L"));
        assert_eq!(resolve(&with_x(-1.0), &with_x(1.0)), ("L", "R"));
    }

    #[test]
    fn agreeing_signs_agree() {
        assert_eq!(resolve(&with_x(-1.0), &with_x(-1.0)), ("R", "L"));
        assert_eq!(resolve(&with_x(1.0), &with_x(1.0)), ("L", "R"));
    }

    #[test]
    fn both_zero_is_unlabeled() {
        assert_eq!(resolve(&with_x(0.0), &with_x(0.0)), ("", ""));
    }
}
