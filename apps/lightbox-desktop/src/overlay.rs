use lightbox_common::SurfaceSize;
use lightbox_render_wgpu::OverlayPass;

/// Tessellated egui output waiting for the next frame.
struct Prepared {
    paint_jobs: Vec<egui::ClippedPrimitive>,
    textures_delta: egui::TexturesDelta,
    pixels_per_point: f32,
}

/// Paints the debug UI on top of the scene, inside the frame's encoder.
pub struct DebugOverlay {
    renderer: egui_wgpu::Renderer,
    pending: Option<Prepared>,
}

impl DebugOverlay {
    pub fn new(device: &wgpu::Device, format: wgpu::TextureFormat) -> Self {
        Self {
            renderer: egui_wgpu::Renderer::new(device, format, None, 1, false),
            pending: None,
        }
    }

    /// Queue egui output for the next [`OverlayPass::paint`].
    pub fn prepare(&mut self, ctx: &egui::Context, output: egui::FullOutput) {
        let pixels_per_point = output.pixels_per_point;
        let paint_jobs = ctx.tessellate(output.shapes, pixels_per_point);
        let textures_delta = match self.pending.take() {
            // a frame was skipped: keep its texture uploads and frees
            Some(mut stale) => {
                stale.textures_delta.append(output.textures_delta);
                stale.textures_delta
            }
            None => output.textures_delta,
        };
        self.pending = Some(Prepared {
            paint_jobs,
            textures_delta,
            pixels_per_point,
        });
    }
}

impl OverlayPass for DebugOverlay {
    fn paint(
        &mut self,
        device: &wgpu::Device,
        queue: &wgpu::Queue,
        encoder: &mut wgpu::CommandEncoder,
        view: &wgpu::TextureView,
        size: SurfaceSize,
    ) -> u32 {
        let Some(prepared) = self.pending.take() else {
            return 0;
        };

        let screen_descriptor = egui_wgpu::ScreenDescriptor {
            size_in_pixels: [size.width, size.height],
            pixels_per_point: prepared.pixels_per_point,
        };

        for (id, image_delta) in &prepared.textures_delta.set {
            self.renderer.update_texture(device, queue, *id, image_delta);
        }
        self.renderer.update_buffers(
            device,
            queue,
            encoder,
            &prepared.paint_jobs,
            &screen_descriptor,
        );
        {
            let mut pass = encoder
                .begin_render_pass(&wgpu::RenderPassDescriptor {
                    label: Some("egui_pass"),
                    color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                        view,
                        resolve_target: None,
                        ops: wgpu::Operations {
                            load: wgpu::LoadOp::Load,
                            store: wgpu::StoreOp::Store,
                        },
                    })],
                    depth_stencil_attachment: None,
                    ..Default::default()
                })
                .forget_lifetime();
            self.renderer
                .render(&mut pass, &prepared.paint_jobs, &screen_descriptor);
        }
        for id in &prepared.textures_delta.free {
            self.renderer.free_texture(id);
        }

        prepared.paint_jobs.len() as u32
    }
}
