//! Typed uniform values and the ordered uniform map of a material.

/// Opaque reference to a texture owned by the graphics context.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct TextureHandle(pub u32);

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum UniformKind {
    Float,
    Vec3,
    Color,
    Texture,
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub enum UniformValue {
    Float(f32),
    Vec3([f32; 3]),
    /// Linear RGB.
    Color([f32; 3]),
    Texture(TextureHandle),
}

impl UniformValue {
    pub fn kind(&self) -> UniformKind {
        match self {
            UniformValue::Float(_) => UniformKind::Float,
            UniformValue::Vec3(_) => UniformKind::Vec3,
            UniformValue::Color(_) => UniformKind::Color,
            UniformValue::Texture(_) => UniformKind::Texture,
        }
    }

    pub fn as_float(&self) -> Option<f32> {
        match self {
            UniformValue::Float(v) => Some(*v),
            _ => None,
        }
    }

    /// The 16 byte slot this value occupies in a material's uniform block.
    ///
    /// Textures are bound separately and have no slot.
    pub fn to_slot(&self) -> Option<[f32; 4]> {
        match self {
            UniformValue::Float(v) => Some([*v, 0.0, 0.0, 0.0]),
            UniformValue::Vec3([x, y, z]) => Some([*x, *y, *z, 0.0]),
            UniformValue::Color([r, g, b]) => Some([*r, *g, *b, 1.0]),
            UniformValue::Texture(_) => None,
        }
    }
}

impl From<f32> for UniformValue {
    fn from(v: f32) -> Self {
        UniformValue::Float(v)
    }
}

/// Uniform name to value, kept in insertion order.
///
/// Materials are small (a handful of uniforms) so a linear scan beats
/// hashing here and keeps the packing order stable.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct UniformMap {
    entries: Vec<(String, UniformValue)>,
}

impl UniformMap {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, name: &str) -> Option<&UniformValue> {
        self.entries
            .iter()
            .find(|(key, _)| key == name)
            .map(|(_, value)| value)
    }

    /// Inserts or replaces `name`, returning the previous value.
    pub fn set(&mut self, name: &str, value: UniformValue) -> Option<UniformValue> {
        match self.entries.iter_mut().find(|(key, _)| key == name) {
            Some((_, slot)) => Some(std::mem::replace(slot, value)),
            None => {
                self.entries.push((name.to_string(), value));
                None
            }
        }
    }

    pub fn contains(&self, name: &str) -> bool {
        self.get(name).is_some()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &UniformValue)> {
        self.entries.iter().map(|(k, v)| (k.as_str(), v))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn set_replaces_in_place() {
        let mut map = UniformMap::new();
        map.set("time", UniformValue::Float(0.0));
        map.set("scale", UniformValue::Float(0.6));
        assert_eq!(
            map.set("time", UniformValue::Float(2.0)),
            Some(UniformValue::Float(0.0))
        );
        let names: Vec<_> = map.iter().map(|(k, _)| k).collect();
        assert_eq!(names, ["time", "scale"]);
        assert_eq!(map.get("time"), Some(&UniformValue::Float(2.0)));
    }

    #[test]
    fn colours_pack_with_opaque_alpha() {
        assert_eq!(
            UniformValue::Color([0.1, 0.2, 0.3]).to_slot(),
            Some([0.1, 0.2, 0.3, 1.0])
        );
        assert_eq!(UniformValue::Texture(TextureHandle(3)).to_slot(), None);
    }
}
