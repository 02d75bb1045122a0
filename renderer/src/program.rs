//====================================================================

use std::sync::{
    atomic::{AtomicU32, Ordering},
    Arc,
};

use rustc_hash::FxHashMap;

use crate::{
    error::RenderError,
    shared::SharedRenderResources,
    tools::{self, PipelineStages},
};

//====================================================================

static CURRENT_PROGRAM_ID: AtomicU32 = AtomicU32::new(0);

#[derive(Clone, Copy, Debug, Hash, PartialEq, Eq)]
pub struct ProgramId(pub u32);

pub const VERTEX_ENTRY: &str = "vs_main";
pub const FRAGMENT_ENTRY: &str = "fs_main";

/// WGSL source of a two stage program. The vertex module must expose
/// `vs_main` and the fragment module `fs_main`. Texture slot `n` is bind
/// group `n`, laid out as texture at binding 0 and sampler at binding 1.
#[derive(Clone, Copy, Debug)]
pub struct ProgramSource<'a> {
    pub label: &'a str,
    pub vertex: &'a str,
    pub fragment: &'a str,
    pub texture_slots: u32,
}

#[derive(Clone, Copy, Debug, Hash, PartialEq, Eq)]
pub enum Topology {
    PointList,
    LineList,
    LineStrip,
    TriangleList,
    TriangleStrip,
}

impl From<Topology> for wgpu::PrimitiveTopology {
    fn from(value: Topology) -> Self {
        match value {
            Topology::PointList => wgpu::PrimitiveTopology::PointList,
            Topology::LineList => wgpu::PrimitiveTopology::LineList,
            Topology::LineStrip => wgpu::PrimitiveTopology::LineStrip,
            Topology::TriangleList => wgpu::PrimitiveTopology::TriangleList,
            Topology::TriangleStrip => wgpu::PrimitiveTopology::TriangleStrip,
        }
    }
}

//====================================================================

pub struct ShaderProgram {
    id: ProgramId,
    label: String,
    layout: wgpu::PipelineLayout,
    vertex: wgpu::ShaderModule,
    fragment: wgpu::ShaderModule,
    texture_slots: u32,

    pipelines: FxHashMap<Topology, Arc<wgpu::RenderPipeline>>,
}

impl ShaderProgram {
    pub fn compile(
        device: &wgpu::Device,
        config: &wgpu::SurfaceConfiguration,
        shared: &SharedRenderResources,
        source: &ProgramSource,
    ) -> Result<Self, RenderError> {
        log::debug!(
            "Compiling program '{}' with {} texture slot(s)",
            source.label,
            source.texture_slots
        );

        device.push_error_scope(wgpu::ErrorFilter::Validation);

        let vertex = tools::shader_module(
            device,
            &format!("{} vertex module", source.label),
            source.vertex,
        );
        let fragment = tools::shader_module(
            device,
            &format!("{} fragment module", source.label),
            source.fragment,
        );

        let bind_group_layouts =
            vec![shared.texture_bind_group_layout(); source.texture_slots as usize];

        let layout = device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
            label: Some(&format!("{} layout", source.label)),
            bind_group_layouts: &bind_group_layouts,
            push_constant_ranges: &[],
        });

        if let Some(error) = pollster::block_on(device.pop_error_scope()) {
            return Err(RenderError::ProgramCompile {
                label: source.label.to_string(),
                message: error.to_string(),
            });
        }

        let mut program = Self {
            id: ProgramId(CURRENT_PROGRAM_ID.fetch_add(1, Ordering::Relaxed)),
            label: source.label.to_string(),
            layout,
            vertex,
            fragment,
            texture_slots: source.texture_slots,
            pipelines: FxHashMap::default(),
        };

        // Link both stages now so interface mismatches are compile errors
        program.pipeline(device, config, Topology::TriangleList)?;

        Ok(program)
    }

    #[inline]
    pub fn id(&self) -> ProgramId {
        self.id
    }

    #[inline]
    pub fn label(&self) -> &str {
        &self.label
    }

    #[inline]
    pub fn texture_slots(&self) -> u32 {
        self.texture_slots
    }

    pub fn pipeline(
        &mut self,
        device: &wgpu::Device,
        config: &wgpu::SurfaceConfiguration,
        topology: Topology,
    ) -> Result<Arc<wgpu::RenderPipeline>, RenderError> {
        if let Some(pipeline) = self.pipelines.get(&topology) {
            return Ok(pipeline.clone());
        }

        log::debug!("Creating {:?} pipeline for program '{}'", topology, self.label);

        device.push_error_scope(wgpu::ErrorFilter::Validation);

        let pipeline = tools::create_pipeline(
            device,
            config,
            &format!("{} {:?} pipeline", self.label, topology),
            &self.layout,
            &[],
            PipelineStages {
                vertex: &self.vertex,
                vertex_entry: VERTEX_ENTRY,
                fragment: &self.fragment,
                fragment_entry: FRAGMENT_ENTRY,
            },
            tools::RenderPipelineDescriptor {
                primitive: wgpu::PrimitiveState {
                    topology: topology.into(),
                    ..Default::default()
                },
                ..Default::default()
            },
        );

        if let Some(error) = pollster::block_on(device.pop_error_scope()) {
            return Err(RenderError::ProgramCompile {
                label: self.label.clone(),
                message: error.to_string(),
            });
        }

        let pipeline = Arc::new(pipeline);
        self.pipelines.insert(topology, pipeline.clone());

        Ok(pipeline)
    }
}

//====================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_topology_maps_to_wgpu() {
        assert_eq!(
            wgpu::PrimitiveTopology::from(Topology::TriangleList),
            wgpu::PrimitiveTopology::TriangleList
        );
        assert_eq!(
            wgpu::PrimitiveTopology::from(Topology::LineStrip),
            wgpu::PrimitiveTopology::LineStrip
        );
        assert_eq!(
            wgpu::PrimitiveTopology::from(Topology::PointList),
            wgpu::PrimitiveTopology::PointList
        );
    }
}

//====================================================================
