use campfire_ngin::data_structures::particles::{self, ParticleBounds};
use rand::{SeedableRng, rngs::StdRng};

#[test]
fn field_has_one_scale_per_position() {
    let field = particles::generate(40, &ParticleBounds::default());
    assert_eq!(field.len(), 40);
    assert_eq!(field.positions().len(), 40);
    assert_eq!(field.scales().len(), 40);
}

#[test]
fn particles_stay_inside_their_bounds() {
    let bounds = ParticleBounds::default();
    let mut rng = StdRng::seed_from_u64(2024);
    let field = particles::generate_with(&mut rng, 500, &bounds);
    for (position, scale) in field.positions().iter().zip(field.scales()) {
        assert!(bounds.contains(*position), "{:?} outside {:?}", position, bounds);
        assert!((0.0..1.0).contains(scale), "scale {} out of range", scale);
    }
}

#[test]
fn default_bounds_match_the_campfire() {
    let field = particles::generate(200, &ParticleBounds::default());
    for [x, y, z] in field.positions() {
        assert!((0.3 - 1e-5..=0.5 + 1e-5).contains(x));
        assert!((0.0..=2.0 + 1e-5).contains(y));
        assert!((0.6 - 1e-5..=0.8 + 1e-5).contains(z));
    }
}

#[test]
fn empty_field_is_not_an_error() {
    let field = particles::generate(0, &ParticleBounds::default());
    assert!(field.is_empty());
    assert!(field.to_raw().is_empty());
}

#[test]
fn custom_bounds_are_respected() {
    let bounds = ParticleBounds {
        center_x: -3.0,
        center_z: 10.0,
        spread_x: 4.0,
        spread_z: 1.0,
        height_span: 0.5,
    };
    let field = particles::generate_with(&mut StdRng::seed_from_u64(1), 100, &bounds);
    assert!(field.positions().iter().all(|p| bounds.contains(*p)));
}
