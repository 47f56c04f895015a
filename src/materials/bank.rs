//! The effect material bank.
//!
//! The bank owns every [`Material`]. Everything else refers to materials by
//! [`MaterialHandle`] and writes uniforms through the bank, which checks each
//! write against the program schema.

use crate::{
    error::{EffectError, Result},
    materials::{
        program::{self, RenderPolicy, ShaderProgram, names},
        uniform::{UniformMap, UniformValue},
    },
};

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct MaterialHandle(usize);

impl MaterialHandle {
    pub fn index(&self) -> usize {
        self.0
    }
}

#[derive(Debug, Clone)]
pub struct Material {
    pub label: String,
    program: &'static ShaderProgram,
    uniforms: UniformMap,
    policy: RenderPolicy,
    /// Bumped on every uniform write so the renderer only uploads dirty blocks.
    revision: u64,
}

impl Material {
    pub fn program(&self) -> &'static ShaderProgram {
        self.program
    }

    pub fn uniforms(&self) -> &UniformMap {
        &self.uniforms
    }

    pub fn uniform(&self, name: &str) -> Option<&UniformValue> {
        self.uniforms.get(name)
    }

    pub fn policy(&self) -> RenderPolicy {
        self.policy
    }

    pub fn revision(&self) -> u64 {
        self.revision
    }

    /// Uniform block contents in schema order.
    pub fn pack(&self) -> Vec<[f32; 4]> {
        let mut slots: Vec<[f32; 4]> = self
            .program
            .schema
            .iter()
            .filter_map(|decl| {
                self.uniforms
                    .get(decl.name)
                    .unwrap_or(&decl.default)
                    .to_slot()
            })
            .collect();
        if slots.is_empty() {
            slots.push([0.0; 4]);
        }
        slots
    }

    fn write(&mut self, name: &str, value: UniformValue) -> Result<()> {
        let program = self.program;
        let decl = program
            .declares(name)
            .ok_or_else(|| EffectError::UnknownUniform {
                material: self.label.clone(),
                name: name.to_string(),
            })?;
        if decl.kind() != value.kind() {
            return Err(EffectError::UniformTypeMismatch {
                name: name.to_string(),
                expected: decl.kind(),
                found: value.kind(),
            });
        }
        self.uniforms.set(name, decl.bounded(value));
        self.revision += 1;
        Ok(())
    }
}

#[derive(Debug, Default)]
pub struct MaterialBank {
    materials: Vec<Material>,
}

impl MaterialBank {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a material of `program` with its default policy.
    ///
    /// Every initial uniform must be declared by the program; declared
    /// uniforms left out start at their schema default.
    pub fn create_material(
        &mut self,
        program: &'static ShaderProgram,
        initial_uniforms: &[(&str, UniformValue)],
    ) -> Result<MaterialHandle> {
        self.create_material_with_policy(program, initial_uniforms, program.policy)
    }

    pub fn create_material_with_policy(
        &mut self,
        program: &'static ShaderProgram,
        initial_uniforms: &[(&str, UniformValue)],
        policy: RenderPolicy,
    ) -> Result<MaterialHandle> {
        let mut material = Material {
            label: program.label.to_string(),
            program,
            uniforms: UniformMap::new(),
            policy,
            revision: 0,
        };
        for decl in program.schema {
            material.uniforms.set(decl.name, decl.default);
        }
        for (name, value) in initial_uniforms {
            material.write(name, *value)?;
        }
        let handle = MaterialHandle(self.materials.len());
        log::debug!("created {} material as {:?}", program.label, handle);
        self.materials.push(material);
        Ok(handle)
    }

    pub fn set_uniform(
        &mut self,
        handle: MaterialHandle,
        name: &str,
        value: impl Into<UniformValue>,
    ) -> Result<()> {
        self.materials
            .get_mut(handle.0)
            .ok_or(EffectError::UnknownMaterial(handle))?
            .write(name, value.into())
    }

    pub fn uniform(&self, handle: MaterialHandle, name: &str) -> Result<UniformValue> {
        let material = self.get(handle).ok_or(EffectError::UnknownMaterial(handle))?;
        material
            .uniform(name)
            .copied()
            .ok_or_else(|| EffectError::UnknownUniform {
                material: material.label.clone(),
                name: name.to_string(),
            })
    }

    pub fn get(&self, handle: MaterialHandle) -> Option<&Material> {
        self.materials.get(handle.0)
    }

    pub fn iter(&self) -> impl Iterator<Item = (MaterialHandle, &Material)> {
        self.materials
            .iter()
            .enumerate()
            .map(|(i, material)| (MaterialHandle(i), material))
    }

    pub fn len(&self) -> usize {
        self.materials.len()
    }

    pub fn is_empty(&self) -> bool {
        self.materials.is_empty()
    }

    /// Materials whose program reads the clock.
    pub fn time_dependent(&self) -> Vec<MaterialHandle> {
        self.iter()
            .filter(|(_, material)| material.program.is_time_dependent())
            .map(|(handle, _)| handle)
            .collect()
    }

    /// Pushes `elapsed` into the `time` uniform of every time-dependent material.
    pub fn set_time(&mut self, elapsed: f32) {
        for material in self
            .materials
            .iter_mut()
            .filter(|material| material.program.is_time_dependent())
        {
            if let Err(e) = material.write(names::TIME, UniformValue::Float(elapsed)) {
                log::warn!("skipping time update: {}", e);
            }
        }
    }

    pub fn basic(&mut self, base_color: [f32; 3]) -> Result<MaterialHandle> {
        self.create_material(
            &program::BASIC,
            &[(names::BASE_COLOR, UniformValue::Color(base_color))],
        )
    }

    pub fn fire(&mut self, scale: f32) -> Result<MaterialHandle> {
        self.create_material(&program::FIRE, &[(names::SCALE, UniformValue::Float(scale))])
    }

    pub fn particle_field(&mut self, pixel_ratio: f32, point_size: f32) -> Result<MaterialHandle> {
        self.create_material(
            &program::PARTICLE_FIELD,
            &[
                (names::PIXEL_RATIO, UniformValue::Float(pixel_ratio)),
                (names::POINT_SIZE, UniformValue::Float(point_size)),
            ],
        )
    }

    pub fn toon_fill(
        &mut self,
        light_direction: [f32; 3],
        base_color: [f32; 3],
    ) -> Result<MaterialHandle> {
        self.create_material(
            &program::TOON_FILL,
            &[
                (names::LIGHT_DIRECTION, UniformValue::Vec3(light_direction)),
                (names::BASE_COLOR, UniformValue::Color(base_color)),
            ],
        )
    }

    pub fn outline(
        &mut self,
        light_direction: [f32; 3],
        outline_color: [f32; 3],
        thickness: f32,
    ) -> Result<MaterialHandle> {
        self.create_material(
            &program::OUTLINE,
            &[
                (names::LIGHT_DIRECTION, UniformValue::Vec3(light_direction)),
                (names::OUTLINE_COLOR, UniformValue::Color(outline_color)),
                (names::THICKNESS, UniformValue::Float(thickness)),
            ],
        )
    }
}
