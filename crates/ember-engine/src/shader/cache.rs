use std::collections::HashMap;
use std::fmt;

use crate::device::Device;
use crate::error::{Error, Result};

/// Lazily populated `name -> location` map for one linked program.
///
/// Only successful lookups are cached; a missing uniform is re-queried on every
/// call. The owning program must call [`invalidate`](Self::invalidate) when its
/// program object is destroyed or replaced.
#[derive(Debug)]
pub struct UniformCache<L> {
    locations: HashMap<String, L>,
}

impl<L: Clone + fmt::Debug> UniformCache<L> {
    pub fn new() -> Self {
        Self {
            locations: HashMap::new(),
        }
    }

    /// Returns the location of `name` in `program`, querying the device at most
    /// once per name.
    pub fn resolve<D>(&mut self, device: &mut D, program: D::Program, name: &str) -> Result<L>
    where
        D: Device<Location = L>,
    {
        if let Some(location) = self.locations.get(name) {
            return Ok(location.clone());
        }

        let Some(location) = device.uniform_location(program, name) else {
            return Err(Error::UniformNotFound {
                name: name.to_string(),
            });
        };

        log::trace!("uniform `{name}` resolved to {location:?}");
        self.locations.insert(name.to_string(), location.clone());
        Ok(location)
    }

    /// Drops every cached location.
    pub fn invalidate(&mut self) {
        self.locations.clear();
    }

    pub fn contains(&self, name: &str) -> bool {
        self.locations.contains_key(name)
    }

    pub fn len(&self) -> usize {
        self.locations.len()
    }

    pub fn is_empty(&self) -> bool {
        self.locations.is_empty()
    }
}

impl<L: Clone + fmt::Debug> Default for UniformCache<L> {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::device::mock::MockDevice;
    use crate::device::StageKind;

    fn linked(dev: &mut MockDevice) -> u32 {
        let vs = dev.compile_stage(StageKind::Vertex, "void main() {}").unwrap();
        let fs = dev.compile_stage(StageKind::Fragment, "void main() {}").unwrap();
        dev.link_program(vs, fs).unwrap()
    }

    #[test]
    fn first_resolve_queries_once_then_hits() {
        let mut dev = MockDevice::new();
        let program = linked(&mut dev);
        let mut cache = UniformCache::new();

        let first = cache.resolve(&mut dev, program, "m_model").unwrap();
        assert_eq!(dev.location_queries.len(), 1);

        for _ in 0..5 {
            let again = cache.resolve(&mut dev, program, "m_model").unwrap();
            assert_eq!(again, first);
        }
        assert_eq!(dev.location_queries.len(), 1);
        assert_eq!(cache.len(), 1);
    }

    #[test]
    fn one_entry_per_distinct_name() {
        let mut dev = MockDevice::new();
        let program = linked(&mut dev);
        let mut cache = UniformCache::new();

        for name in ["a", "b", "a", "c", "b"] {
            cache.resolve(&mut dev, program, name).unwrap();
        }

        assert_eq!(cache.len(), 3);
        assert_eq!(dev.location_queries, vec!["a", "b", "c"]);
    }

    #[test]
    fn missing_uniform_is_never_cached() {
        let mut dev = MockDevice::new().without_uniform("m_missing");
        let program = linked(&mut dev);
        let mut cache = UniformCache::new();

        for _ in 0..3 {
            let err = cache.resolve(&mut dev, program, "m_missing").unwrap_err();
            assert_eq!(err.to_string(), "uniform not found: `m_missing`");
        }

        assert!(cache.is_empty());
        assert_eq!(dev.location_queries.len(), 3);
    }

    #[test]
    fn missing_uniform_resolves_once_it_appears() {
        let mut dev = MockDevice::new().without_uniform("m_late");
        let program = linked(&mut dev);
        let mut cache = UniformCache::new();

        assert!(cache.resolve(&mut dev, program, "m_late").is_err());
        dev.missing_uniforms.clear();

        let location = cache.resolve(&mut dev, program, "m_late").unwrap();
        assert_eq!(Some(location), dev.location_of("m_late"));
        assert!(cache.contains("m_late"));
    }

    #[test]
    fn invalidate_forces_a_fresh_query() {
        let mut dev = MockDevice::new();
        let program = linked(&mut dev);
        let mut cache = UniformCache::new();

        cache.resolve(&mut dev, program, "m_projection").unwrap();
        cache.invalidate();
        assert!(cache.is_empty());

        cache.resolve(&mut dev, program, "m_projection").unwrap();
        assert_eq!(dev.location_queries.len(), 2);
    }
}
