//! Tests for candidate ranking and elitist replacement

#[cfg(test)]
mod tests {
    use quadstitch::fragment::transform::GENE_COUNT;
    use quadstitch::genetic::{Candidate, Population};

    fn candidate(tag: f64, cost: f64) -> Candidate {
        Candidate::new([tag; GENE_COUNT], cost)
    }

    fn costs(population: &Population) -> Vec<f64> {
        population.members().iter().map(|c| c.cost).collect()
    }

    // Tests non-finite costs are stored as infinity and ranked last
    // Verified by storing NaN unchanged
    #[test]
    fn test_non_finite_ranked_last() {
        let population = Population::from_candidates(vec![
            candidate(0.0, f64::NAN),
            candidate(1.0, 3.0),
            candidate(2.0, f64::NEG_INFINITY),
            candidate(3.0, 1.0),
        ]);

        assert_eq!(costs(&population), vec![1.0, 3.0, f64::INFINITY, f64::INFINITY]);
        assert_eq!(population.viable().len(), 2);
        assert!(!candidate(0.0, f64::NAN).is_viable());
    }

    // Tests replacement keeps the best members and the requested size
    // Verified by appending offspring without sorting
    #[test]
    fn test_replace_weakest() {
        let population = Population::from_candidates(vec![
            candidate(0.0, 2.0),
            candidate(1.0, 5.0),
            candidate(2.0, 9.0),
        ]);
        let next = population.replace_weakest(vec![candidate(3.0, 4.0), candidate(4.0, 10.0)], 3);

        assert_eq!(costs(&next), vec![2.0, 4.0, 5.0]);
        assert_eq!(next.len(), 3);
        assert_eq!(next.best().map(|c| c.genes), Some([0.0; GENE_COUNT]));
    }

    // Tests equal costs keep their existing order
    // Verified by using an unstable sort
    #[test]
    fn test_ties_keep_incumbent_first() {
        let population = Population::from_candidates(vec![candidate(7.0, 1.0)]);
        let next = population.replace_weakest(vec![candidate(8.0, 1.0)], 1);
        assert_eq!(next.best().map(|c| c.genes), Some([7.0; GENE_COUNT]));
    }

    // Tests an empty population has no best
    // Verified by returning a default candidate
    #[test]
    fn test_empty() {
        let population = Population::default();
        assert!(population.is_empty());
        assert!(population.best().is_none());
    }
}
