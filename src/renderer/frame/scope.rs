//! Scoped render passes.
//!
//! A [`PassScope`] is the only way the frame passes draw. It opens one wgpu
//! render pass for one [`PassDesc`], accepts only pipelines built with the
//! pass's depth mode, and ends the pass when dropped. Nothing set inside a
//! scope survives it.

use smallvec::SmallVec;

use crate::renderer::core::ScopedPipeline;
use crate::renderer::frame::plan::{LoadPolicy, PassDesc};

/// Attachments resolved for one pass.
pub struct PassAttachments<'a> {
    pub colors: SmallVec<[&'a wgpu::TextureView; 3]>,
    pub depth: Option<&'a wgpu::TextureView>,
    pub clear_color: wgpu::Color,
}

pub struct PassScope<'e> {
    desc: PassDesc,
    pass: wgpu::RenderPass<'e>,
}

impl<'e> PassScope<'e> {
    pub fn begin(
        encoder: &'e mut wgpu::CommandEncoder,
        desc: PassDesc,
        attachments: &PassAttachments<'_>,
    ) -> Self {
        let (color_load, depth_load) = match desc.load {
            LoadPolicy::Clear => (
                wgpu::LoadOp::Clear(attachments.clear_color),
                wgpu::LoadOp::Clear(1.0),
            ),
            LoadPolicy::Load => (wgpu::LoadOp::Load, wgpu::LoadOp::Load),
        };

        let color_attachments: SmallVec<[Option<wgpu::RenderPassColorAttachment<'_>>; 3]> =
            attachments
                .colors
                .iter()
                .map(|view| {
                    Some(wgpu::RenderPassColorAttachment {
                        view,
                        resolve_target: None,
                        ops: wgpu::Operations {
                            load: color_load,
                            store: wgpu::StoreOp::Store,
                        },
                        depth_slice: None,
                    })
                })
                .collect();

        let depth_stencil_attachment =
            attachments
                .depth
                .map(|view| wgpu::RenderPassDepthStencilAttachment {
                    view,
                    depth_ops: Some(wgpu::Operations {
                        load: depth_load,
                        store: wgpu::StoreOp::Store,
                    }),
                    stencil_ops: None,
                });

        let pass = encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
            label: Some(desc.kind.label()),
            color_attachments: &color_attachments,
            depth_stencil_attachment,
            timestamp_writes: None,
            occlusion_query_set: None,
            multiview_mask: None,
        });

        Self { desc, pass }
    }

    #[inline]
    #[must_use]
    pub fn desc(&self) -> &PassDesc {
        &self.desc
    }

    /// Binds `pipeline`; its depth test must be the one the pass declares.
    pub fn set_pipeline(&mut self, pipeline: &ScopedPipeline) {
        debug_assert_eq!(
            pipeline.depth,
            self.desc.depth,
            "pipeline depth mode does not match pass {}",
            self.desc.kind.label()
        );
        self.pass.set_pipeline(&pipeline.pipeline);
    }

    pub fn set_bind_group(&mut self, index: u32, group: &wgpu::BindGroup) {
        self.pass.set_bind_group(index, group, &[]);
    }

    /// Raw pass for draw calls.
    #[inline]
    pub fn raw(&mut self) -> &mut wgpu::RenderPass<'e> {
        &mut self.pass
    }
}
