//! Tests for rigid inverse mapping and pixel sampling

#[cfg(test)]
mod tests {
    use ndarray::{Array2, array};
    use quadstitch::math::interpolation::{
        InverseRigid, bilinear, nearest_mask, warp_channel, warp_mask,
    };

    // Tests a rotation keeps every point at its distance from the center
    // Verified by flipping the sign of the sine term in source_of
    #[test]
    fn test_rotation_preserves_radius() {
        let mapping = InverseRigid::new((10.0, 12.0), (0.0, 0.0), 17.0);
        for &(r, c) in &[(0.0, 0.0), (10.0, 12.0), (4.5, 20.25), (-3.0, 7.0)] {
            let (sr, sc) = mapping.source_of(r, c);
            let before = (r - 10.0).hypot(c - 12.0);
            let after = (sr - 10.0).hypot(sc - 12.0);
            assert!((before - after).abs() < 1e-9, "({r}, {c})");
        }
    }

    // Tests a quarter turn renders a point right of center above it
    // Verified by rotating clockwise
    #[test]
    fn test_quarter_turn_direction() {
        let mapping = InverseRigid::new((5.0, 5.0), (0.0, 0.0), 90.0);
        let (r, c) = mapping.source_of(2.0, 5.0);
        assert!((r - 5.0).abs() < 1e-9 && (c - 8.0).abs() < 1e-9, "({r}, {c})");
    }

    // Tests a pure shift moves output pixels by the shift
    // Verified by applying the shift before the rotation center
    #[test]
    fn test_pure_shift() {
        let mapping = InverseRigid::new((0.0, 0.0), (2.0, -1.0), 0.0);
        assert_eq!(mapping.source_of(5.0, 5.0), (3.0, 6.0));
    }

    // Tests bilinear sampling blends neighbours and reads zero outside
    // Verified by rounding to the nearest pixel
    #[test]
    fn test_bilinear() {
        let data: ndarray::Array2<f64> = array![[0.0, 1.0], [2.0, 3.0]];
        let view = data.view();
        assert!((bilinear(&view, 0.5, 0.5) - 1.5).abs() < 1e-12);
        assert!((bilinear(&view, 1.0, 0.0) - 2.0).abs() < 1e-12);
        assert!((bilinear(&view, 0.0, 1.5) - 0.5).abs() < 1e-12);
        assert!(bilinear(&view, -1.5, 0.0).abs() < f64::EPSILON);
        assert!(bilinear(&view, 0.0, 9.0).abs() < f64::EPSILON);
    }

    // Tests nearest-neighbour mask sampling rounds and is false outside
    // Verified by truncating instead of rounding
    #[test]
    fn test_nearest_mask() {
        let mask = array![[false, true], [true, false]];
        let view = mask.view();
        assert!(nearest_mask(&view, 0.4, 0.6));
        assert!(!nearest_mask(&view, 0.6, 0.6));
        assert!(!nearest_mask(&view, -0.6, 1.0));
        assert!(!nearest_mask(&view, 0.0, 2.0));
    }

    // Tests warping keeps the canvas shape and moves content
    // Verified by returning the source unchanged
    #[test]
    fn test_warp_shift() {
        let mut data = Array2::<f64>::zeros((6, 6));
        let mut mask = Array2::from_elem((6, 6), false);
        if let (Some(v), Some(m)) = (data.get_mut((1, 1)), mask.get_mut((1, 1))) {
            *v = 1.0;
            *m = true;
        }
        let mapping = InverseRigid::new((2.5, 2.5), (2.0, 3.0), 0.0);

        let warped = warp_channel(&data.view(), &mapping);
        let warped_mask = warp_mask(&mask.view(), &mapping);
        assert_eq!(warped.dim(), (6, 6));
        assert!((warped.get((3, 4)).copied().unwrap_or(0.0) - 1.0).abs() < 1e-12);
        assert!(warped.get((1, 1)).copied().unwrap_or(1.0).abs() < f64::EPSILON);
        assert_eq!(warped_mask.iter().filter(|&&m| m).count(), 1);
        assert_eq!(warped_mask.get((3, 4)), Some(&true));
    }
}
