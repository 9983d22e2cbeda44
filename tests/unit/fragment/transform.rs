//! Tests for per-fragment transforms and their gene encoding

#[cfg(test)]
mod tests {
    use quadstitch::StitchError;
    use quadstitch::fragment::transform::{GENE_COUNT, GENES_PER_FRAGMENT};
    use quadstitch::fragment::{PositionLabel, Transform, TransformVector};

    fn sample() -> TransformVector {
        TransformVector::new([
            Transform::new(0.01, -0.02, 1.5),
            Transform::new(-0.03, 0.0, -2.0),
            Transform::new(0.0, 0.04, 0.25),
            Transform::new(0.05, 0.05, -4.0),
        ])
    }

    // Tests genes are laid out as tx, ty, angle per quadrant in canonical order
    // Verified by interleaving all translations before angles
    #[test]
    fn test_gene_layout() {
        let genes = sample().to_genes();
        assert_eq!(genes.len(), GENE_COUNT);
        assert_eq!(
            genes.get(GENES_PER_FRAGMENT..2 * GENES_PER_FRAGMENT),
            Some([-0.03, 0.0, -2.0].as_slice())
        );
        assert_eq!(TransformVector::from_genes(&genes), sample());
    }

    // Tests get and set address the labelled slot
    // Verified by indexing set with a shifted label
    #[test]
    fn test_get_set() {
        let mut v = TransformVector::IDENTITY;
        v.set(PositionLabel::LowerLeft, Transform::new(0.1, 0.2, 3.0));

        assert_eq!(v.get(PositionLabel::LowerLeft), Transform::new(0.1, 0.2, 3.0));
        assert_eq!(v.get(PositionLabel::UpperLeft), Transform::IDENTITY);
        let labels: Vec<PositionLabel> = v.iter().map(|(label, _)| label).collect();
        assert_eq!(labels, PositionLabel::ALL.to_vec());
    }

    // Tests non-finite components fail validation
    // Verified by checking only translations
    #[test]
    fn test_validate_rejects_non_finite() {
        assert!(sample().validate("warm_start").is_ok());

        let mut bad = sample();
        bad.set(PositionLabel::UpperRight, Transform::new(0.0, 0.0, f64::NAN));
        assert!(!bad.is_finite());
        assert!(matches!(
            bad.validate("warm_start"),
            Err(StitchError::InvalidParameter {
                parameter: "warm_start",
                ..
            })
        ));
    }

    // Tests translations scale with the canvas shape
    // Verified by swapping rows and columns
    #[test]
    fn test_pixel_offset() {
        let t = Transform::new(0.5, -0.25, 0.0);
        assert_eq!(t.pixel_offset((200, 100)), (-50.0, 50.0));
    }

    // Tests maximum deviation separates translation from angle
    // Verified by mixing angle into the translation maximum
    #[test]
    fn test_max_deviation() {
        let (shift, angle) = sample().max_deviation(&TransformVector::IDENTITY);
        assert!((shift - 0.05).abs() < 1e-12);
        assert!((angle - 4.0).abs() < 1e-12);
        assert_eq!(sample().max_deviation(&sample()), (0.0, 0.0));
    }
}
