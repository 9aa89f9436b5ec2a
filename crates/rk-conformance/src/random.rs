use rand::Rng;
use rk_tensor::{Dense2D, Shape};

/// A buffer of values drawn uniformly from `[-1, 1)`.
pub fn random_buffer<R: Rng + ?Sized>(shape: Shape, rng: &mut R) -> Dense2D {
    Dense2D::from_fn(shape, |_, _| rng.gen_range(-1.0f32..1.0))
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    #[test]
    fn test_random_buffer_range_and_seed() {
        let mut rng = StdRng::seed_from_u64(7);
        let a = random_buffer(Shape::new(4, 5), &mut rng);
        assert_eq!(a.shape(), Shape::new(4, 5));
        assert!(a.data().iter().all(|v| (-1.0..1.0).contains(v)));

        let mut rng = StdRng::seed_from_u64(7);
        let b = random_buffer(Shape::new(4, 5), &mut rng);
        assert_eq!(a, b);
    }
}
