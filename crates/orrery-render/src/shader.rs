//! Shader module registry.

use log::{debug, info};
use std::{collections::HashMap, sync::Arc};
use wgpu::{ShaderModuleDescriptor, ShaderSource};

use crate::orbit_wgsl;

/// Named cache of compiled shader modules, so the render and compute paths
/// share one compilation of the orbit code.
pub struct ShaderLibrary {
    modules: HashMap<String, Arc<wgpu::ShaderModule>>,
}

impl ShaderLibrary {
    pub fn new() -> Self {
        Self {
            modules: HashMap::new(),
        }
    }

    /// Compile `source` and register it under `name`, replacing any previous
    /// module with that name.
    pub fn load_from_source(
        &mut self,
        device: &wgpu::Device,
        name: &str,
        source: &str,
    ) -> Arc<wgpu::ShaderModule> {
        debug!("Loading shader '{}' from source", name);

        let module = Arc::new(device.create_shader_module(ShaderModuleDescriptor {
            label: Some(name),
            source: ShaderSource::Wgsl(source.into()),
        }));

        if self
            .modules
            .insert(name.to_string(), module.clone())
            .is_some()
        {
            info!("Replaced shader '{}'", name);
        } else {
            info!("Loaded shader '{}'", name);
        }
        module
    }

    /// Compile `body` prefixed with the orbit preamble. Returns the cached
    /// module if `name` is already loaded.
    pub fn load_with_orbit(
        &mut self,
        device: &wgpu::Device,
        name: &str,
        body: &str,
    ) -> Arc<wgpu::ShaderModule> {
        if let Some(module) = self.get(name) {
            return module;
        }
        self.load_from_source(device, name, &orbit_wgsl::compose(body))
    }

    pub fn get(&self, name: &str) -> Option<Arc<wgpu::ShaderModule>> {
        self.modules.get(name).cloned()
    }

    pub fn len(&self) -> usize {
        self.modules.len()
    }

    pub fn is_empty(&self) -> bool {
        self.modules.is_empty()
    }
}

impl Default for ShaderLibrary {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::targets::tests::create_test_device;

    #[test]
    fn test_new_library_is_empty() {
        let library = ShaderLibrary::new();
        assert!(library.is_empty());
        assert!(library.get("anything").is_none());
    }

    #[test]
    fn test_load_with_orbit_caches_by_name() {
        let Some((device, _queue)) = create_test_device() else {
            return;
        };
        let mut library = ShaderLibrary::new();
        let body = "@compute @workgroup_size(1) fn main() { _ = orbit_position(0.1, 0.9, 0.0, 0.0, 0.0, 0.0, 0.0); }";
        let first = library.load_with_orbit(&device, "cached", body);
        let second = library.load_with_orbit(&device, "cached", body);
        assert!(Arc::ptr_eq(&first, &second));
        assert_eq!(library.len(), 1);
    }
}
