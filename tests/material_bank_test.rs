use campfire_ngin::{
    error::EffectError,
    materials::{
        Blending, MaterialBank, ShaderProgram, Side, UniformKind, UniformValue, names,
        program::{self, ProgramKind},
    },
};

#[test]
fn schema_defaults_fill_missing_uniforms() {
    let mut bank = MaterialBank::new();
    let fire = bank.create_material(&program::FIRE, &[]).unwrap();
    assert_eq!(
        bank.uniform(fire, names::SCALE).unwrap(),
        UniformValue::Float(0.6)
    );
    assert_eq!(bank.uniform(fire, names::TIME).unwrap(), UniformValue::Float(0.0));

    let outline = bank.create_material(&program::OUTLINE, &[]).unwrap();
    assert_eq!(
        bank.uniform(outline, names::THICKNESS).unwrap(),
        UniformValue::Float(0.015)
    );
    assert_eq!(
        bank.uniform(outline, names::OUTLINE_COLOR).unwrap(),
        UniformValue::Color([0.0, 0.0, 0.0])
    );
}

#[test]
fn unknown_initial_uniform_is_rejected() {
    let mut bank = MaterialBank::new();
    let result = bank.create_material(
        &program::TOON_FILL,
        &[("thickness", UniformValue::Float(0.1))],
    );
    assert!(matches!(result, Err(EffectError::UnknownUniform { name, .. }) if name == "thickness"));
    assert!(bank.is_empty());
}

#[test]
fn unknown_uniform_write_leaves_material_untouched() {
    let mut bank = MaterialBank::new();
    let particles = bank.particle_field(1.5, 100.0).unwrap();
    let before = bank.get(particles).unwrap().clone();

    let err = bank
        .set_uniform(particles, "opacity", UniformValue::Float(0.5))
        .unwrap_err();

    assert!(matches!(err, EffectError::UnknownUniform { .. }));
    let after = bank.get(particles).unwrap();
    assert_eq!(after.revision(), before.revision());
    assert_eq!(after.uniforms(), before.uniforms());
    assert_eq!(after.pack(), before.pack());
}

#[test]
fn mistyped_write_is_rejected() {
    let mut bank = MaterialBank::new();
    let toon = bank.toon_fill([5.0, 5.0, 5.0], [1.0, 0.5, 0.0]).unwrap();

    let err = bank
        .set_uniform(toon, names::BASE_COLOR, UniformValue::Float(1.0))
        .unwrap_err();

    assert!(matches!(
        err,
        EffectError::UniformTypeMismatch {
            expected: UniformKind::Color,
            found: UniformKind::Float,
            ..
        }
    ));
    assert_eq!(
        bank.uniform(toon, names::BASE_COLOR).unwrap(),
        UniformValue::Color([1.0, 0.5, 0.0])
    );
}

#[test]
fn stale_handle_is_reported() {
    let mut other = MaterialBank::new();
    other.fire(0.6).unwrap();
    let stale = other.fire(0.6).unwrap();

    let mut bank = MaterialBank::new();
    bank.fire(0.6).unwrap();
    assert!(matches!(
        bank.set_uniform(stale, names::TIME, 1.0f32),
        Err(EffectError::UnknownMaterial(_))
    ));
}

#[test]
fn policies_match_each_effect() {
    let check = |program: &ShaderProgram, blending, depth_write, side, transparent| {
        let policy = program.policy;
        assert_eq!(policy.blending, blending, "{}", program.label);
        assert_eq!(policy.depth_write, depth_write, "{}", program.label);
        assert_eq!(policy.side, side, "{}", program.label);
        assert_eq!(policy.transparent, transparent, "{}", program.label);
    };
    check(&program::FIRE, Blending::Additive, false, Side::Double, true);
    check(&program::TOON_FILL, Blending::Opaque, true, Side::Front, false);
    check(&program::OUTLINE, Blending::Opaque, true, Side::Back, false);
    let particles = program::program(ProgramKind::ParticleField).policy;
    assert_eq!(particles.blending, Blending::Additive);
    assert!(!particles.depth_write);
    assert!(particles.transparent);
}

#[test]
fn only_fire_and_fireflies_follow_the_clock() {
    let mut bank = MaterialBank::new();
    let fire = bank.fire(0.6).unwrap();
    bank.toon_fill([5.0, 5.0, 5.0], [1.0, 1.0, 1.0]).unwrap();
    let particles = bank.particle_field(1.0, 100.0).unwrap();
    bank.basic([0.2, 0.4, 0.2]).unwrap();

    assert_eq!(bank.time_dependent(), vec![fire, particles]);

    bank.set_time(12.0);
    assert_eq!(bank.uniform(fire, names::TIME).unwrap(), UniformValue::Float(12.0));
    assert_eq!(
        bank.uniform(particles, names::TIME).unwrap(),
        UniformValue::Float(12.0)
    );
}

#[test]
fn particle_pixel_ratio_never_exceeds_two() {
    let mut bank = MaterialBank::new();
    let particles = bank.particle_field(3.0, 100.0).unwrap();
    assert_eq!(
        bank.uniform(particles, names::PIXEL_RATIO).unwrap(),
        UniformValue::Float(2.0)
    );

    bank.set_uniform(particles, names::PIXEL_RATIO, UniformValue::Float(5.0))
        .unwrap();
    assert_eq!(
        bank.uniform(particles, names::PIXEL_RATIO).unwrap(),
        UniformValue::Float(2.0)
    );

    bank.set_uniform(particles, names::PIXEL_RATIO, UniformValue::Float(1.25))
        .unwrap();
    assert_eq!(
        bank.uniform(particles, names::PIXEL_RATIO).unwrap(),
        UniformValue::Float(1.25)
    );
}
